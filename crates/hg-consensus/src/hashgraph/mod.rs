//! # Virtual Voting
//!
//! Computes rounds, witnesses and fame over the linked event graph and turns
//! every decided round into an ordered, timestamped batch of consensus events.
//!
//! ## Round state
//!
//! `D` is the last decided round and `W_D` its decided witnesses (judges and
//! the witnesses whose fame was decided against them). Only events that have
//! not reached consensus, plus `W_D`, take part in round computation, so the
//! metadata of every live event is a pure function of `(D, W_D, events)`.
//! After a round is decided the metadata of all remaining events is
//! recomputed against the new `(D, W_D)`.
//!
//! ## Restart
//!
//! A snapshot restores `D`, the judges and the consensus tips. Events are
//! stored but not voted on until every judge of `D` arrived; then the tips'
//! ancestors are marked as consensus and voting resumes.

pub(crate) mod ancient;
pub(crate) mod election;
pub(crate) mod ordering;
pub mod phase;
pub(crate) mod voting;

pub use phase::ConsensusPhase;

use crate::config::ConsensusConfig;
use crate::domain::event::{EventDescriptor, PlatformEvent};
use crate::domain::round::{ConsensusEvent, ConsensusRound, ConsensusSnapshot, JudgeId};
use crate::domain::window::{EventWindow, ROUND_FIRST, ROUND_GENESIS};
use crate::error::{ConsensusError, ConsensusResult};
use crate::graph::arena::{EventArena, EventIndex};
use crate::graph::linked_event::{ConsensusData, VotingMetadata};
use crate::ports::outbound::RosterLookup;
use ancient::AncientCalculator;
use election::{RoundElection, VoteContext};
use ordering::{consensus_sort, judge_whitener, median_received_time, whiten, OrderingNode};
use shared_types::{Hash, HashDisplay, Timestamp};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};
use voting::{compute_last_see, creator_weight, strongly_seen_by};

/// Creation-time medians above this are clamped before they become
/// consensus timestamps, so per-transaction increments never saturate.
pub const MAX_CONSENSUS_TIME: Timestamp = Timestamp::from_nanos(u64::MAX / 2);

/// Voting state over the events of an [`EventArena`].
///
/// The core never owns events: the caller inserts them into the arena,
/// links them, and hands over the index in topological order.
pub struct ConsensusCore<R: RosterLookup> {
    config: ConsensusConfig,
    rosters: Arc<R>,
    phase: ConsensusPhase,

    last_decided_round: u64,
    /// `W_D`, sorted by (creator, hash)
    decided_witnesses: Vec<EventIndex>,
    decided_judges: Vec<JudgeId>,
    decided_others: Vec<JudgeId>,

    /// Snapshot witnesses not received yet, with their judge flag
    pending_witnesses: HashMap<Hash, bool>,
    /// Snapshot consensus tips not received yet
    pending_tips: HashSet<Hash>,

    /// Live events without consensus, in insertion order
    non_consensus: Vec<EventIndex>,
    witnesses_by_round: BTreeMap<u64, Vec<EventIndex>>,
    election: RoundElection,
    ancient: AncientCalculator,

    next_consensus_number: u64,
    last_consensus_time: Option<Timestamp>,
    consensus_tips: Vec<EventDescriptor>,
}

impl<R: RosterLookup> ConsensusCore<R> {
    pub fn new(config: ConsensusConfig, rosters: Arc<R>) -> Self {
        let ancient = AncientCalculator::new(config.rounds_non_ancient, config.rounds_expired);
        Self {
            config,
            rosters,
            phase: ConsensusPhase::SteadyState,
            last_decided_round: ROUND_GENESIS,
            decided_witnesses: Vec::new(),
            decided_judges: Vec::new(),
            decided_others: Vec::new(),
            pending_witnesses: HashMap::new(),
            pending_tips: HashSet::new(),
            non_consensus: Vec::new(),
            witnesses_by_round: BTreeMap::new(),
            election: RoundElection::new(ROUND_FIRST),
            ancient,
            next_consensus_number: 0,
            last_consensus_time: None,
            consensus_tips: Vec::new(),
        }
    }

    pub fn phase(&self) -> &ConsensusPhase {
        &self.phase
    }

    pub fn waiting_for_init_judges(&self) -> bool {
        self.phase.is_bootstrapping()
    }

    pub fn last_decided_round(&self) -> u64 {
        self.last_decided_round
    }

    pub fn next_consensus_number(&self) -> u64 {
        self.next_consensus_number
    }

    /// Window in force after the last decided round.
    pub fn event_window(&self) -> EventWindow {
        self.ancient.event_window(self.last_decided_round)
    }

    /// Snapshot of the last decided round, `None` before the first one.
    pub fn snapshot(&self) -> Option<ConsensusSnapshot> {
        (self.last_decided_round != ROUND_GENESIS).then(|| self.build_snapshot())
    }

    /// Events held without consensus, in the order they were added.
    pub fn pre_consensus_events(&self, arena: &EventArena) -> Vec<Arc<PlatformEvent>> {
        self.non_consensus
            .iter()
            .filter_map(|index| arena.get(*index))
            .filter(|event| !event.reached_consensus())
            .map(|event| Arc::clone(event.event()))
            .collect()
    }

    /// Add a linked event and return every round it allowed to decide.
    pub fn add_event(&mut self, arena: &mut EventArena, index: EventIndex) -> Vec<ConsensusRound> {
        let Some(event) = arena.get(index) else {
            return Vec::new();
        };
        let hash = *event.hash();
        let last_see = compute_last_see(arena, event, index);
        if let Some(event) = arena.get_mut(index) {
            event.last_see = last_see;
        }
        self.non_consensus.push(index);

        if self.phase.is_bootstrapping() {
            if self.phase.judge_arrived(&hash, index) {
                self.finish_bootstrap(arena);
                return self.decide_rounds(arena);
            }
            debug!(
                hash = %HashDisplay(&hash),
                missing = self.phase.missing_judges(),
                "[hg-consensus] Holding event until init judges arrive"
            );
            return Vec::new();
        }

        let mut changed = false;
        if let Some(is_judge) = self.pending_witnesses.remove(&hash) {
            self.register_decided_witness(arena, index, is_judge);
            changed = true;
        }
        if self.pending_tips.remove(&hash) {
            mark_snapshot_consensus(arena, [index]);
            changed = true;
        }
        if changed {
            self.recalculate(arena);
        } else {
            self.assign_metadata(arena, index);
        }
        self.decide_rounds(arena)
    }

    /// Replace the voting state with the one captured in `snapshot`.
    ///
    /// The caller clears the arena: no event survives a snapshot load.
    pub fn load_snapshot(&mut self, snapshot: &ConsensusSnapshot) -> ConsensusResult<()> {
        snapshot.validate()?;
        if snapshot.round < self.last_decided_round {
            return Err(ConsensusError::SnapshotRegression {
                current_round: self.last_decided_round,
                snapshot_round: snapshot.round,
            });
        }

        self.reset();
        self.last_decided_round = snapshot.round;
        self.ancient.restore(&snapshot.minimum_judge_info_list);
        self.next_consensus_number = snapshot.next_consensus_number;
        self.last_consensus_time = Some(snapshot.consensus_timestamp);
        self.consensus_tips = snapshot.consensus_tips.clone();
        self.decided_judges = snapshot.judges.clone();
        self.decided_others = snapshot.other_witnesses.clone();

        self.pending_tips = snapshot.consensus_tips.iter().map(|tip| tip.hash).collect();
        self.pending_witnesses = snapshot
            .judges
            .iter()
            .map(|judge| (judge.hash, true))
            .chain(snapshot.other_witnesses.iter().map(|other| (other.hash, false)))
            .collect();
        self.phase = ConsensusPhase::bootstrapping(
            snapshot.round,
            snapshot.judges.iter().map(|judge| &judge.hash),
        );
        self.election = RoundElection::new(snapshot.round + 1);

        info!(
            round = snapshot.round,
            judges = snapshot.judges.len(),
            next_consensus_number = snapshot.next_consensus_number,
            "[hg-consensus] Snapshot loaded, waiting for init judges"
        );
        Ok(())
    }

    /// Forget indices the arena no longer holds.
    pub fn prune_dead(&mut self, arena: &EventArena) {
        self.non_consensus.retain(|index| arena.contains(*index));
        self.decided_witnesses.retain(|index| arena.contains(*index));
        for witnesses in self.witnesses_by_round.values_mut() {
            witnesses.retain(|index| arena.contains(*index));
        }
        self.witnesses_by_round.retain(|_, witnesses| !witnesses.is_empty());
        self.election.retain_live(arena);
        if let ConsensusPhase::Bootstrapping { found, .. } = &mut self.phase {
            found.retain(|index| arena.contains(*index));
        }
    }

    fn reset(&mut self) {
        self.phase = ConsensusPhase::SteadyState;
        self.last_decided_round = ROUND_GENESIS;
        self.decided_witnesses.clear();
        self.decided_judges.clear();
        self.decided_others.clear();
        self.pending_witnesses.clear();
        self.pending_tips.clear();
        self.non_consensus.clear();
        self.witnesses_by_round.clear();
        self.election = RoundElection::new(ROUND_FIRST);
        self.ancient.clear();
        self.next_consensus_number = 0;
        self.last_consensus_time = None;
        self.consensus_tips.clear();
    }

    fn finish_bootstrap(&mut self, arena: &mut EventArena) {
        let judge_round = match &self.phase {
            ConsensusPhase::Bootstrapping { judge_round, .. } => *judge_round,
            ConsensusPhase::SteadyState => return,
        };
        self.phase = ConsensusPhase::SteadyState;

        let stored = self.non_consensus.clone();
        let mut tips = Vec::new();
        for index in stored {
            let Some(hash) = arena.get(index).map(|event| *event.hash()) else {
                continue;
            };
            if let Some(is_judge) = self.pending_witnesses.remove(&hash) {
                self.register_decided_witness(arena, index, is_judge);
            }
            if self.pending_tips.remove(&hash) {
                tips.push(index);
            }
        }
        mark_snapshot_consensus(arena, tips);

        info!(
            round = judge_round,
            witnesses = self.decided_witnesses.len(),
            missing_tips = self.pending_tips.len(),
            "[hg-consensus] Init judges found, resuming consensus"
        );
        self.recalculate(arena);
    }

    /// Pin a snapshot witness to the last decided round.
    fn register_decided_witness(&mut self, arena: &mut EventArena, index: EventIndex, is_judge: bool) {
        if let Some(event) = arena.get_mut(index) {
            event.voting = VotingMetadata {
                round: Some(self.last_decided_round),
                witness: true,
                famous: Some(is_judge),
                judge: is_judge,
            };
        }
        self.decided_witnesses.push(index);
        sort_by_creator_and_hash(arena, &mut self.decided_witnesses);
    }

    /// Recompute the metadata of every non-consensus event against the
    /// current `(D, W_D)` and restart the election of `D + 1`.
    fn recalculate(&mut self, arena: &mut EventArena) {
        self.non_consensus
            .retain(|index| arena.get(*index).is_some_and(|e| !e.reached_consensus()));
        self.witnesses_by_round.clear();
        self.election = RoundElection::new(self.last_decided_round + 1);

        for index in &self.non_consensus {
            if self.decided_witnesses.contains(index) {
                continue;
            }
            if let Some(event) = arena.get_mut(*index) {
                event.voting = VotingMetadata::default();
            }
        }
        for index in self.non_consensus.clone() {
            self.assign_metadata(arena, index);
        }
    }

    fn assign_metadata(&mut self, arena: &mut EventArena, index: EventIndex) {
        if self.decided_witnesses.contains(&index) {
            return;
        }
        let Some(event) = arena.get(index) else {
            return;
        };

        let decided = self.last_decided_round;
        let lowest_round = decided.max(ROUND_FIRST);
        let parent_round = |parent: EventIndex| -> Option<u64> {
            if self.decided_witnesses.contains(&parent) {
                return Some(decided);
            }
            let parent = arena.get(parent)?;
            if parent.reached_consensus() {
                return None;
            }
            parent.round_created().filter(|round| *round >= lowest_round)
        };
        let self_parent_round = event.self_parent().and_then(parent_round);
        let other_parent_round = event.other_parent().and_then(parent_round);

        let round = match self_parent_round.max(other_parent_round) {
            None => (decided == ROUND_GENESIS).then_some(ROUND_FIRST),
            Some(parent_max) => {
                let previous: &[EventIndex] = if parent_max == decided {
                    &self.decided_witnesses
                } else {
                    self.witnesses_by_round
                        .get(&parent_max)
                        .map(Vec::as_slice)
                        .unwrap_or(&[])
                };
                let roster = self.rosters.roster_for_round(parent_max);
                let seen = strongly_seen_by(arena, event, previous, &roster);
                if roster.is_supermajority(creator_weight(arena, &seen, &roster)) {
                    Some(parent_max + 1)
                } else {
                    Some(parent_max)
                }
            }
        };
        let witness = match round {
            Some(round) => self_parent_round.map_or(true, |parent| parent < round),
            None => false,
        };

        if let Some(event) = arena.get_mut(index) {
            event.voting = VotingMetadata {
                round,
                witness,
                famous: None,
                judge: false,
            };
        }
        let (Some(round), true) = (round, witness) else {
            return;
        };

        self.witnesses_by_round.entry(round).or_default().push(index);
        let Some(event) = arena.get(index) else {
            return;
        };
        let ctx = VoteContext {
            arena: &*arena,
            witnesses_by_round: &self.witnesses_by_round,
            rosters: self.rosters.as_ref(),
            coin_freq: self.config.coin_freq,
        };
        let election_round = self.election.round();
        if round == election_round {
            self.election.add_candidate(&ctx, index, event);
        } else if round > election_round {
            self.election.cast_votes(&ctx, index, event, round);
        }
    }

    fn decide_rounds(&mut self, arena: &mut EventArena) -> Vec<ConsensusRound> {
        let mut rounds = Vec::new();
        while !self.phase.is_bootstrapping() && self.election.all_decided() {
            let decisions: Vec<(EventIndex, bool)> = self.election.decisions().collect();
            for (index, famous) in decisions {
                if let Some(event) = arena.get_mut(index) {
                    event.voting.famous = Some(famous);
                }
            }
            if !self.election.any_famous() {
                if self.election.take_no_famous_report() {
                    warn!(
                        round = self.election.round(),
                        witnesses = self.election.candidates().len(),
                        "[hg-consensus] Every witness decided but none is famous"
                    );
                }
                break;
            }
            rounds.push(self.decide_round(arena));
        }
        rounds
    }

    fn decide_round(&mut self, arena: &mut EventArena) -> ConsensusRound {
        let round = self.election.round();
        let judges: Vec<(EventIndex, JudgeId, u64)> = self
            .election
            .judges()
            .iter()
            .map(|candidate| (candidate.index, candidate.id(), candidate.birth_round))
            .collect();
        let judge_indices: Vec<EventIndex> = judges.iter().map(|(index, _, _)| *index).collect();
        let judge_ids: Vec<JudgeId> = judges.iter().map(|(_, id, _)| *id).collect();
        let other_ids: Vec<JudgeId> = self
            .election
            .candidates()
            .iter()
            .filter(|candidate| !judge_indices.contains(&candidate.index))
            .map(|candidate| candidate.id())
            .collect();
        for index in &judge_indices {
            if let Some(judge) = arena.get_mut(*index) {
                judge.voting.judge = true;
            }
        }

        let whitener = judge_whitener(judge_ids.iter().map(|id| &id.hash));
        let mut medians: HashMap<EventIndex, Timestamp> = HashMap::new();
        let nodes: Vec<OrderingNode> = self
            .received_in(arena, &judge_indices)
            .into_iter()
            .filter_map(|index| {
                let event = arena.get(index)?;
                let median_time = median_received_time(arena, event, index, &judge_indices)
                    .unwrap_or_else(|| event.time_created());
                medians.insert(index, median_time);
                Some(OrderingNode {
                    index,
                    median_time,
                    whitened: whiten(event.hash(), &whitener),
                    parents: event.parents().collect(),
                })
            })
            .collect();

        let increment = self.config.min_trans_timestamp_incr_nanos;
        let mut events = Vec::with_capacity(nodes.len());
        for index in consensus_sort(nodes) {
            let Some(linked) = arena.get(index) else {
                continue;
            };
            let median = medians
                .get(&index)
                .copied()
                .unwrap_or_else(|| linked.time_created())
                .min(MAX_CONSENSUS_TIME);
            let timestamp = match self.last_consensus_time {
                Some(last) => median.max(last.plus_nanos(increment)),
                None => median,
            };
            let transactions = linked.event().transaction_count() as u64;
            self.last_consensus_time =
                Some(timestamp.plus_nanos(transactions.saturating_sub(1).saturating_mul(increment)));

            let parent_hashes: Vec<Hash> = linked
                .parents()
                .filter_map(|parent| arena.get(parent).map(|p| *p.hash()))
                .collect();
            self.consensus_tips.retain(|tip| !parent_hashes.contains(&tip.hash));
            self.consensus_tips.push(linked.descriptor());

            events.push(ConsensusEvent {
                event: Arc::clone(linked.event()),
                consensus_order: self.next_consensus_number,
                consensus_timestamp: timestamp,
                round_received: round,
            });
            if let Some(linked) = arena.get_mut(index) {
                linked.consensus = ConsensusData {
                    reached: true,
                    round_received: Some(round),
                    order: Some(self.next_consensus_number),
                    timestamp: Some(timestamp),
                };
            }
            self.next_consensus_number += 1;
        }

        let consensus_timestamp = match events.last() {
            Some(last) => last.consensus_timestamp,
            None => {
                let timestamp = match self.last_consensus_time {
                    Some(last) => last.plus_nanos(increment),
                    None => median_creation_time(arena, &judge_indices).min(MAX_CONSENSUS_TIME),
                };
                self.last_consensus_time = Some(timestamp);
                timestamp
            }
        };

        let minimum_judge_birth_round = judges
            .iter()
            .map(|(_, _, birth_round)| *birth_round)
            .min()
            .unwrap_or(ROUND_FIRST);
        self.ancient.round_decided(round, minimum_judge_birth_round);
        let event_window = self.ancient.event_window(round);

        self.last_decided_round = round;
        self.decided_witnesses = self.election.candidates().iter().map(|c| c.index).collect();
        sort_by_creator_and_hash(arena, &mut self.decided_witnesses);
        self.decided_judges = judge_ids.clone();
        self.decided_others = other_ids;
        let snapshot = self.build_snapshot();

        info!(
            round,
            events = events.len(),
            judges = judge_ids.len(),
            window = %event_window,
            "[hg-consensus] Round decided"
        );

        self.recalculate(arena);

        ConsensusRound {
            round_num: round,
            events,
            judges: judge_ids,
            event_window,
            snapshot,
            consensus_timestamp,
            freeze_round: false,
        }
    }

    /// Non-consensus events that are ancestors of every judge, in insertion
    /// order.
    fn received_in(&self, arena: &EventArena, judges: &[EventIndex]) -> Vec<EventIndex> {
        let mut common: Option<HashSet<EventIndex>> = None;
        for judge in judges.iter().filter(|judge| arena.contains(**judge)) {
            let ancestors = non_consensus_ancestors(arena, *judge);
            common = Some(match common {
                None => ancestors,
                Some(current) => current.intersection(&ancestors).copied().collect(),
            });
        }
        let common = common.unwrap_or_default();
        self.non_consensus
            .iter()
            .copied()
            .filter(|index| common.contains(index))
            .collect()
    }

    fn build_snapshot(&self) -> ConsensusSnapshot {
        ConsensusSnapshot {
            round: self.last_decided_round,
            judges: self.decided_judges.clone(),
            other_witnesses: self.decided_others.clone(),
            minimum_judge_info_list: self.ancient.list().to_vec(),
            next_consensus_number: self.next_consensus_number,
            consensus_timestamp: self.last_consensus_time.unwrap_or(Timestamp::EPOCH),
            consensus_tips: self.consensus_tips.clone(),
        }
    }
}

/// Ancestors of `start`, itself included, that have not reached consensus.
fn non_consensus_ancestors(arena: &EventArena, start: EventIndex) -> HashSet<EventIndex> {
    let mut visited = HashSet::new();
    let mut stack = vec![start];
    while let Some(index) = stack.pop() {
        let Some(event) = arena.get(index) else {
            continue;
        };
        if event.reached_consensus() || !visited.insert(index) {
            continue;
        }
        stack.extend(event.parents());
    }
    visited
}

/// Mark `tips` and all their ancestors as having reached consensus before
/// the loaded snapshot. No order or timestamp is assigned.
fn mark_snapshot_consensus(arena: &mut EventArena, tips: impl IntoIterator<Item = EventIndex>) {
    let mut stack: Vec<EventIndex> = tips.into_iter().collect();
    while let Some(index) = stack.pop() {
        let Some(event) = arena.get_mut(index) else {
            continue;
        };
        if event.consensus.reached {
            continue;
        }
        event.consensus.reached = true;
        stack.extend(event.parents());
    }
}

fn sort_by_creator_and_hash(arena: &EventArena, indices: &mut [EventIndex]) {
    indices.sort_by_key(|index| arena.get(*index).map(|event| (event.creator(), *event.hash())));
}

fn median_creation_time(arena: &EventArena, events: &[EventIndex]) -> Timestamp {
    let mut times: Vec<Timestamp> = events
        .iter()
        .filter_map(|index| arena.get(*index))
        .map(|event| event.time_created())
        .collect();
    times.sort();
    times.get(times.len() / 2).copied().unwrap_or(Timestamp::EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::roster::{Roster, RosterHistory};
    use crate::graph::linked_event::LinkedEvent;
    use shared_types::NodeId;

    const NODES: u64 = 4;

    struct Harness {
        arena: EventArena,
        core: ConsensusCore<RosterHistory>,
        latest: HashMap<u64, EventIndex>,
        clock: u64,
    }

    impl Harness {
        fn new() -> Self {
            let roster = Roster::uniform((1..=NODES).map(NodeId), 10).unwrap();
            Self {
                arena: EventArena::new(),
                core: ConsensusCore::new(
                    ConsensusConfig::for_testing(),
                    Arc::new(RosterHistory::new(ROUND_FIRST, roster)),
                ),
                latest: HashMap::new(),
                clock: 0,
            }
        }

        /// Event by `creator` on top of its own latest and `other`'s latest.
        fn add(&mut self, creator: u64, other: Option<u64>) -> (EventIndex, Vec<ConsensusRound>) {
            self.clock += 1_000;
            let self_parent = self.latest.get(&creator).copied();
            let other_parent = other.and_then(|o| self.latest.get(&o).copied());
            let parents: Vec<EventDescriptor> = self_parent
                .iter()
                .chain(other_parent.iter())
                .map(|p| self.arena.get(*p).unwrap().descriptor())
                .collect();
            let generation = self_parent
                .iter()
                .chain(other_parent.iter())
                .map(|p| self.arena.get(*p).unwrap().generation())
                .max()
                .unwrap_or(0)
                + 1;
            let event = Arc::new(PlatformEvent::new(
                NodeId(creator),
                Timestamp::from_nanos(self.clock),
                1,
                parents,
                vec![vec![creator as u8]],
                vec![],
            ));
            let index = self
                .arena
                .insert(LinkedEvent::new(event, self_parent, other_parent, generation));
            self.latest.insert(creator, index);
            let rounds = self.core.add_event(&mut self.arena, index);
            (index, rounds)
        }

        /// Every node gossips with its right neighbour, `layers` times.
        fn gossip(&mut self, layers: usize) -> Vec<ConsensusRound> {
            let mut rounds = Vec::new();
            for _ in 0..layers {
                for creator in 1..=NODES {
                    let other = creator % NODES + 1;
                    let (_, decided) = self.add(creator, Some(other));
                    rounds.extend(decided);
                }
            }
            rounds
        }
    }

    #[test]
    fn test_genesis_events_are_round_one_witnesses() {
        let mut harness = Harness::new();
        for creator in 1..=NODES {
            let (index, rounds) = harness.add(creator, None);
            assert!(rounds.is_empty());
            let event = harness.arena.get(index).unwrap();
            assert_eq!(event.round_created(), Some(ROUND_FIRST));
            assert!(event.is_witness());
        }
        assert_eq!(harness.core.pre_consensus_events(&harness.arena).len(), NODES as usize);
        assert!(harness.core.snapshot().is_none());
        assert_eq!(harness.core.event_window(), EventWindow::genesis());
    }

    #[test]
    fn test_rounds_advance_and_decide_in_order() {
        let mut harness = Harness::new();
        for creator in 1..=NODES {
            harness.add(creator, None);
        }
        let rounds = harness.gossip(40);

        assert!(rounds.len() >= 3, "only {} rounds decided", rounds.len());
        let mut order = 0;
        let mut last_time: Option<Timestamp> = None;
        for (position, round) in rounds.iter().enumerate() {
            assert_eq!(round.round_num, position as u64 + 1);
            assert!(!round.judges.is_empty());
            assert_eq!(round.snapshot.round, round.round_num);
            for event in &round.events {
                assert_eq!(event.consensus_order, order);
                if let Some(last) = last_time {
                    assert!(event.consensus_timestamp > last);
                }
                last_time = Some(event.consensus_timestamp);
                order += 1;
            }
        }
        assert_eq!(harness.core.next_consensus_number(), order);
        assert_eq!(
            harness.core.last_decided_round(),
            rounds.last().unwrap().round_num
        );
    }

    #[test]
    fn test_snapshot_load_waits_for_judges() {
        let mut harness = Harness::new();
        for creator in 1..=NODES {
            harness.add(creator, None);
        }
        let rounds = harness.gossip(30);
        assert!(rounds.len() >= 2);
        let snapshot = rounds[rounds.len() - 1].snapshot.clone();
        let older = rounds[rounds.len() - 2].snapshot.clone();

        let mut restarted = Harness::new();
        restarted.core.load_snapshot(&snapshot).unwrap();
        assert!(restarted.core.waiting_for_init_judges());
        assert_eq!(restarted.core.last_decided_round(), snapshot.round);
        assert_eq!(
            restarted.core.phase().missing_judges(),
            snapshot.judges.len()
        );

        assert_eq!(
            restarted.core.load_snapshot(&older),
            Err(ConsensusError::SnapshotRegression {
                current_round: snapshot.round,
                snapshot_round: older.round,
            })
        );
    }

    #[test]
    fn test_prune_dead_forgets_removed_events() {
        let mut harness = Harness::new();
        let (first, _) = harness.add(1, None);
        harness.add(2, None);
        harness.arena.remove(first);
        harness.core.prune_dead(&harness.arena);
        assert_eq!(harness.core.pre_consensus_events(&harness.arena).len(), 1);
    }
}
