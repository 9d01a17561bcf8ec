//! Fame election for the witnesses of the round pending consensus
//!
//! Witnesses of later rounds vote on every undecided candidate as they are
//! added. Votes are kept per candidate so that a candidate discovered after
//! some voters can catch up retroactively.

use crate::domain::event::BirthRound;
use crate::domain::round::JudgeId;
use crate::graph::arena::{EventArena, EventIndex};
use crate::graph::linked_event::LinkedEvent;
use crate::hashgraph::voting::{sees, strongly_seen_by};
use crate::ports::outbound::RosterLookup;
use shared_types::{Hash, NodeId};
use std::collections::{BTreeMap, HashMap};

/// Byte of the voter hash whose low bit is the coin flip.
const COIN_BYTE: usize = 16;

#[derive(Clone, Debug)]
pub(crate) struct Candidate {
    pub(crate) index: EventIndex,
    pub(crate) creator: NodeId,
    pub(crate) hash: Hash,
    pub(crate) birth_round: u64,
    pub(crate) famous: Option<bool>,
    votes: HashMap<EventIndex, bool>,
}

impl Candidate {
    pub(crate) fn id(&self) -> JudgeId {
        JudgeId::new(self.creator, self.hash)
    }
}

/// Read-only view of the graph a vote is computed against.
pub(crate) struct VoteContext<'a, R: RosterLookup + ?Sized> {
    pub(crate) arena: &'a EventArena,
    pub(crate) witnesses_by_round: &'a BTreeMap<u64, Vec<EventIndex>>,
    pub(crate) rosters: &'a R,
    pub(crate) coin_freq: u64,
}

#[derive(Clone, Debug)]
pub(crate) struct RoundElection {
    round: u64,
    candidates: Vec<Candidate>,
    no_famous_reported: bool,
}

impl RoundElection {
    pub(crate) fn new(round: u64) -> Self {
        Self {
            round,
            candidates: Vec::new(),
            no_famous_reported: false,
        }
    }

    pub(crate) fn round(&self) -> u64 {
        self.round
    }

    pub(crate) fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Fame decisions made so far, in candidate order.
    pub(crate) fn decisions(&self) -> impl Iterator<Item = (EventIndex, bool)> + '_ {
        self.candidates
            .iter()
            .filter_map(|c| c.famous.map(|famous| (c.index, famous)))
    }

    /// Every known candidate decided, at least one of them.
    pub(crate) fn all_decided(&self) -> bool {
        !self.candidates.is_empty() && self.candidates.iter().all(|c| c.famous.is_some())
    }

    pub(crate) fn any_famous(&self) -> bool {
        self.candidates.iter().any(|c| c.famous == Some(true))
    }

    /// Report "decided without a famous witness" once per election.
    pub(crate) fn take_no_famous_report(&mut self) -> bool {
        !std::mem::replace(&mut self.no_famous_reported, true)
    }

    /// Famous candidates, one per creator (lowest hash among forks), by creator.
    pub(crate) fn judges(&self) -> Vec<&Candidate> {
        let mut by_creator: BTreeMap<NodeId, &Candidate> = BTreeMap::new();
        for candidate in self.candidates.iter().filter(|c| c.famous == Some(true)) {
            match by_creator.get(&candidate.creator) {
                Some(current) if current.hash <= candidate.hash => {}
                _ => {
                    by_creator.insert(candidate.creator, candidate);
                }
            }
        }
        by_creator.into_values().collect()
    }

    /// Register a witness of the election round and let the voters already
    /// known vote on it, lowest round first.
    pub(crate) fn add_candidate<R: RosterLookup + ?Sized>(
        &mut self,
        ctx: &VoteContext<'_, R>,
        index: EventIndex,
        event: &LinkedEvent,
    ) {
        let has_weight = ctx.rosters.roster_for_round(self.round).weight(event.creator()) > 0;
        self.candidates.push(Candidate {
            index,
            creator: event.creator(),
            hash: *event.hash(),
            birth_round: event.birth_round(),
            famous: if has_weight { None } else { Some(false) },
            votes: HashMap::new(),
        });
        if !has_weight {
            return;
        }

        let position = self.candidates.len() - 1;
        for (voter_round, voters) in ctx.witnesses_by_round.range(self.round + 1..) {
            for voter in voters {
                if self.candidates[position].famous.is_some() {
                    return;
                }
                let Some(voter_event) = ctx.arena.get(*voter) else {
                    continue;
                };
                let strongly_seen = self.strongly_seen_witnesses(ctx, voter_event, *voter_round);
                self.vote_on(ctx, position, *voter, voter_event, *voter_round, &strongly_seen);
            }
        }
    }

    /// A witness of a later round votes on every undecided candidate.
    pub(crate) fn cast_votes<R: RosterLookup + ?Sized>(
        &mut self,
        ctx: &VoteContext<'_, R>,
        voter: EventIndex,
        voter_event: &LinkedEvent,
        voter_round: u64,
    ) {
        if voter_round <= self.round || self.candidates.iter().all(|c| c.famous.is_some()) {
            return;
        }
        let strongly_seen = self.strongly_seen_witnesses(ctx, voter_event, voter_round);
        for position in 0..self.candidates.len() {
            if self.candidates[position].famous.is_none() {
                self.vote_on(ctx, position, voter, voter_event, voter_round, &strongly_seen);
            }
        }
    }

    /// Witnesses of the previous round strongly seen by a voter. Empty for
    /// first-round voters, which vote on plain visibility.
    fn strongly_seen_witnesses<R: RosterLookup + ?Sized>(
        &self,
        ctx: &VoteContext<'_, R>,
        voter_event: &LinkedEvent,
        voter_round: u64,
    ) -> Vec<EventIndex> {
        if voter_round == self.round + 1 {
            return Vec::new();
        }
        let previous = voter_round - 1;
        let Some(witnesses) = ctx.witnesses_by_round.get(&previous) else {
            return Vec::new();
        };
        let roster = ctx.rosters.roster_for_round(previous);
        strongly_seen_by(ctx.arena, voter_event, witnesses, &roster)
    }

    fn vote_on<R: RosterLookup + ?Sized>(
        &mut self,
        ctx: &VoteContext<'_, R>,
        position: usize,
        voter: EventIndex,
        voter_event: &LinkedEvent,
        voter_round: u64,
        strongly_seen: &[EventIndex],
    ) {
        let round = self.round;
        let candidate = &mut self.candidates[position];

        if voter_round == round + 1 {
            let index = candidate.index;
            let vote = ctx
                .arena
                .get(index)
                .is_some_and(|c| sees(ctx.arena, voter_event, index, c));
            candidate.votes.insert(voter, vote);
            return;
        }

        let roster = ctx.rosters.roster_for_round(voter_round - 1);
        let (mut yes, mut no) = (0u64, 0u64);
        for witness in strongly_seen {
            let Some(vote) = candidate.votes.get(witness) else {
                continue;
            };
            let weight = ctx
                .arena
                .get(*witness)
                .map_or(0, |w| roster.weight(w.creator()));
            if *vote {
                yes = yes.saturating_add(weight);
            } else {
                no = no.saturating_add(weight);
            }
        }
        let majority = yes >= no;
        let supermajority = roster.is_supermajority(if majority { yes } else { no });

        let distance = voter_round - round;
        if distance % ctx.coin_freq != 0 {
            if supermajority {
                candidate.famous = Some(majority);
            }
            candidate.votes.insert(voter, majority);
        } else {
            let vote = if supermajority {
                majority
            } else {
                voter_event.hash()[COIN_BYTE] & 1 == 1
            };
            candidate.votes.insert(voter, vote);
        }
    }

    /// Forget candidates and votes whose events were freed.
    pub(crate) fn retain_live(&mut self, arena: &EventArena) {
        self.candidates.retain(|c| arena.contains(c.index));
        for candidate in &mut self.candidates {
            candidate.votes.retain(|voter, _| arena.contains(*voter));
        }
    }
}
