//! Output contract of the consensus engine
//!
//! Checks over accumulated engine output. Simulations run them after every
//! scenario; an operator can run them over a recorded stream.

use crate::domain::event::BirthRound;
use crate::domain::output::OutputCollector;
use crate::domain::round::ConsensusRound;
use crate::domain::window::EventWindow;
use shared_types::{Hash, HashDisplay, Timestamp};
use std::collections::HashSet;
use thiserror::Error;

/// A broken output guarantee.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("Event {hash} reached consensus without being emitted as pre-consensus first")]
    MissingPreConsensus { hash: String },

    #[error("Event {hash} emitted as pre-consensus more than once")]
    DuplicatePreConsensus { hash: String },

    #[error("Ancient event {hash} neither reached consensus nor was reported stale")]
    LostEvent { hash: String },

    #[error("Consensus timestamp not increasing at order {order}: {previous} then {current}")]
    TimestampNotIncreasing {
        order: u64,
        previous: Timestamp,
        current: Timestamp,
    },

    #[error("Consensus order gap: expected {expected}, found {found}")]
    OrderGap { expected: u64, found: u64 },

    #[error("Round sequence broken: {previous} followed by {current}")]
    RoundGap { previous: u64, current: u64 },

    #[error("Round {round} differs between runs: {detail}")]
    ConsensusMismatch { round: u64, detail: String },

    #[error("No common round to compare")]
    NothingToCompare,
}

fn display(hash: &Hash) -> String {
    HashDisplay(hash).to_string()
}

/// Every consensus event was emitted as pre-consensus exactly once, in an
/// earlier or the same batch.
pub fn validate_pre_consensus_completeness(
    output: &OutputCollector,
) -> Result<(), InvariantViolation> {
    let mut emitted: HashSet<Hash> = HashSet::new();
    for batch in output.batches() {
        for event in &batch.pre_consensus_events {
            if !emitted.insert(*event.hash()) {
                return Err(InvariantViolation::DuplicatePreConsensus {
                    hash: display(event.hash()),
                });
            }
        }
        for event in batch.consensus_rounds.iter().flat_map(|r| &r.events) {
            if !emitted.contains(event.hash()) {
                return Err(InvariantViolation::MissingPreConsensus {
                    hash: display(event.hash()),
                });
            }
        }
    }
    Ok(())
}

/// Every emitted event that is ancient under `window` either reached
/// consensus or was reported stale.
pub fn validate_no_lost_events(
    output: &OutputCollector,
    window: &EventWindow,
) -> Result<(), InvariantViolation> {
    let accounted: HashSet<Hash> = output
        .consensus_events()
        .map(|e| *e.hash())
        .chain(output.stale_events().map(|e| *e.hash()))
        .collect();

    match output
        .pre_consensus_events()
        .filter(|e| window.is_ancient_round(e.birth_round()))
        .find(|e| !accounted.contains(e.hash()))
    {
        Some(lost) => Err(InvariantViolation::LostEvent {
            hash: display(lost.hash()),
        }),
        None => Ok(()),
    }
}

/// Consensus timestamps strictly increase and consensus orders are
/// consecutive across all rounds.
pub fn validate_consensus_timestamps(output: &OutputCollector) -> Result<(), InvariantViolation> {
    let mut previous: Option<(u64, Timestamp)> = None;
    for event in output.consensus_events() {
        if let Some((order, time)) = previous {
            if event.consensus_order != order + 1 {
                return Err(InvariantViolation::OrderGap {
                    expected: order + 1,
                    found: event.consensus_order,
                });
            }
            if event.consensus_timestamp <= time {
                return Err(InvariantViolation::TimestampNotIncreasing {
                    order: event.consensus_order,
                    previous: time,
                    current: event.consensus_timestamp,
                });
            }
        }
        previous = Some((event.consensus_order, event.consensus_timestamp));
    }
    Ok(())
}

/// Round numbers increase by exactly one.
pub fn validate_round_sequence(output: &OutputCollector) -> Result<(), InvariantViolation> {
    let mut previous: Option<u64> = None;
    for round in output.consensus_rounds() {
        if let Some(prev) = previous {
            if round.round_num != prev + 1 {
                return Err(InvariantViolation::RoundGap {
                    previous: prev,
                    current: round.round_num,
                });
            }
        }
        previous = Some(round.round_num);
    }
    Ok(())
}

/// Rounds present in both runs carry the same events, orders and timestamps.
pub fn validate_same_consensus(
    expected: &[ConsensusRound],
    actual: &[ConsensusRound],
) -> Result<(), InvariantViolation> {
    let mut compared = 0;
    for round in actual {
        let Some(reference) = expected.iter().find(|r| r.round_num == round.round_num) else {
            continue;
        };
        compare_rounds(reference, round)?;
        compared += 1;
    }
    if compared == 0 {
        return Err(InvariantViolation::NothingToCompare);
    }
    Ok(())
}

fn compare_rounds(
    expected: &ConsensusRound,
    actual: &ConsensusRound,
) -> Result<(), InvariantViolation> {
    let mismatch = |detail: String| InvariantViolation::ConsensusMismatch {
        round: actual.round_num,
        detail,
    };

    if expected.events.len() != actual.events.len() {
        return Err(mismatch(format!(
            "{} events vs {}",
            expected.events.len(),
            actual.events.len()
        )));
    }
    for (e, a) in expected.events.iter().zip(&actual.events) {
        if e.hash() != a.hash() {
            return Err(mismatch(format!(
                "order {} holds {} vs {}",
                e.consensus_order,
                display(e.hash()),
                display(a.hash())
            )));
        }
        if e.consensus_order != a.consensus_order || e.consensus_timestamp != a.consensus_timestamp
        {
            return Err(mismatch(format!(
                "event {} at ({}, {}) vs ({}, {})",
                display(e.hash()),
                e.consensus_order,
                e.consensus_timestamp,
                a.consensus_order,
                a.consensus_timestamp
            )));
        }
    }
    if expected.judges != actual.judges {
        return Err(mismatch("judges differ".to_string()));
    }
    if expected.consensus_timestamp != actual.consensus_timestamp {
        return Err(mismatch(format!(
            "round timestamp {} vs {}",
            expected.consensus_timestamp, actual.consensus_timestamp
        )));
    }
    if expected.event_window != actual.event_window {
        return Err(mismatch(format!(
            "window {} vs {}",
            expected.event_window, actual.event_window
        )));
    }
    Ok(())
}
