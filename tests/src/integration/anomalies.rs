//! # Malformed and Out of Window Events
//!
//! Events whose parents cannot be linked are still linked without them and
//! counted. Duplicates and ancient events produce no output. An event nobody
//! builds on is reported stale once the window passes it.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{engine_for, Simulation};
    use hg_consensus::domain::invariants::{validate_consensus_timestamps, validate_no_lost_events};
    use hg_consensus::test_utils::{EventEmitter, SIMULATION_START};
    use hg_consensus::{
        BirthRound, ConsensusEngineApi, EventDescriptor, PlatformEvent, MAX_CONSENSUS_TIME,
    };
    use shared_types::{NodeId, Timestamp};
    use std::sync::Arc;

    fn event(
        creator: u64,
        millis: u64,
        birth_round: u64,
        parents: Vec<EventDescriptor>,
    ) -> Arc<PlatformEvent> {
        Arc::new(PlatformEvent::new(
            NodeId(creator),
            SIMULATION_START.plus_nanos(millis * 1_000_000),
            birth_round,
            parents,
            vec![],
            vec![],
        ))
    }

    #[test]
    fn test_unlinkable_parents_are_counted() {
        let emitter = EventEmitter::new(4, 1);
        let mut engine = engine_for(&emitter).unwrap();

        let root = event(1, 10, 1, vec![]);
        let missing = event(2, 20, 1, vec![EventDescriptor::new([0xAB; 32], NodeId(2), 1)]);
        let wrong_birth_round = event(3, 30, 1, vec![EventDescriptor::new(*root.hash(), NodeId(1), 2)]);
        let backwards = event(1, 5, 1, vec![root.descriptor()]);

        let mut surfaced = Vec::new();
        for event in [&root, &missing, &wrong_birth_round, &backwards] {
            let output = engine.add_event(Arc::clone(event)).unwrap();
            surfaced.extend(output.pre_consensus_events);
        }

        let counts = engine.anomaly_counts();
        assert_eq!(counts.missing_parents, 1);
        assert_eq!(counts.birth_round_mismatches, 1);
        assert_eq!(counts.time_created_mismatches, 1);
        assert_eq!(counts.total(), 3);

        assert_eq!(surfaced.len(), 4);
        assert_eq!(engine.linked_event_count(), 4);
    }

    #[test]
    fn test_duplicate_event_is_ignored() {
        let mut sim = Simulation::new(4, 2).unwrap();
        sim.run(30).unwrap();

        let repeat = Arc::clone(sim.emitter.emitted().last().unwrap());
        let linked = sim.engine.linked_event_count();
        assert!(sim.engine.add_event(repeat).unwrap().is_empty());
        assert_eq!(sim.engine.linked_event_count(), linked);
        assert_eq!(sim.engine.anomaly_counts().total(), 0);
    }

    #[test]
    fn test_ancient_event_is_dropped() {
        let mut sim = Simulation::new(4, 3).unwrap();
        assert!(sim.run_until_round(9, 6_000).unwrap());
        assert!(sim.engine.event_window().ancient_threshold() > 1);

        let linked = sim.engine.linked_event_count();
        let ancient = event(1, 1, 1, vec![]);
        assert!(sim.engine.add_event(ancient).unwrap().is_empty());
        assert_eq!(sim.engine.linked_event_count(), linked);
        sim.check_invariants().unwrap();
    }

    #[test]
    fn test_window_only_moves_forward() {
        let mut sim = Simulation::new(4, 4).unwrap();
        assert!(sim.run_until_round(9, 6_000).unwrap());

        let windows: Vec<_> = sim.rounds().iter().map(|r| r.event_window).collect();
        for pair in windows.windows(2) {
            assert!(pair[0].latest_consensus_round() < pair[1].latest_consensus_round());
            assert!(pair[0].ancient_threshold() <= pair[1].ancient_threshold());
            assert!(pair[0].expired_threshold() <= pair[1].expired_threshold());
        }
        let emitted = sim.emitter.emitted().len();
        assert_eq!(sim.engine.linked_event_count(), emitted as u64);
        assert!(sim.engine.live_event_count() < emitted);
    }

    #[test]
    fn test_event_without_descendants_is_reported_stale_once() {
        let mut sim = Simulation::new(4, 5).unwrap();
        let side = event(5, 1, 1, vec![]);
        let output = sim.engine.add_event(Arc::clone(&side)).unwrap();
        assert_eq!(output.pre_consensus_events, vec![Arc::clone(&side)]);
        sim.output.add(output);

        assert!(sim.run_until_round(12, 9_000).unwrap());
        assert!(sim.engine.event_window().ancient_threshold() > side.birth_round());

        let stale: Vec<_> = sim
            .output
            .stale_events()
            .filter(|e| e.hash() == side.hash())
            .collect();
        assert_eq!(stale.len(), 1);
        assert!(sim.output.consensus_events().all(|e| e.hash() != side.hash()));
        validate_no_lost_events(&sim.output, &sim.engine.event_window()).unwrap();
        sim.check_invariants().unwrap();
    }

    #[test]
    fn test_creation_times_near_the_end_of_time_keep_timestamps_increasing() {
        let start = Timestamp::from_nanos(u64::MAX - 120 * 1_000_000_000);
        let emitter = EventEmitter::new(4, 6).starting_at(start);
        let engine = engine_for(&emitter).unwrap();
        let mut sim = Simulation::with_engine(emitter, engine);

        assert!(sim.run_until_round(4, 4_000).unwrap());
        validate_consensus_timestamps(&sim.output).unwrap();
        for event in sim.output.consensus_events() {
            assert!(event.consensus_timestamp >= MAX_CONSENSUS_TIME);
            assert!(event.consensus_timestamp < start);
        }
    }
}
