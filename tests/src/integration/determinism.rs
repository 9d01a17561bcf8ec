//! # Determinism
//!
//! Consensus is a function of the event set: arrival order within a
//! topological order must not matter, and an engine restarted from a round
//! snapshot must continue with exactly the rounds the original produced.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{
        engine_for, feed, rounds, shuffle_layers, Simulation,
    };
    use hg_consensus::domain::invariants::{
        validate_consensus_timestamps, validate_pre_consensus_completeness,
        validate_round_sequence, validate_same_consensus,
    };
    use hg_consensus::{ConsensusEngineApi, ConsensusError, ConsensusSnapshot};
    use std::sync::Arc;

    #[test]
    fn test_arrival_order_within_layers_does_not_matter() {
        let mut sim = Simulation::new(4, 10).unwrap();
        let layers = sim.run_layers(150).unwrap();
        let expected = sim.rounds();
        assert!(expected.len() >= 3);

        for seed in [1, 2, 3] {
            let mut engine = engine_for(&sim.emitter).unwrap();
            let output = feed(&mut engine, shuffle_layers(&layers, seed)).unwrap();
            let actual = rounds(&output);

            assert_eq!(actual.len(), expected.len());
            validate_same_consensus(&expected, &actual).unwrap();
            assert_eq!(output.consensus_hashes(), sim.output.consensus_hashes());
            validate_pre_consensus_completeness(&output).unwrap();
        }
    }

    #[test]
    fn test_restart_from_snapshot_continues_identically() {
        let mut sim = Simulation::new(4, 11).unwrap();
        assert!(sim.run_until_round(10, 6_000).unwrap());
        let original = sim.rounds();

        let restart_round = original[original.len() - 4].round_num;
        let snapshot = original[original.len() - 4].snapshot.clone();
        let snapshot = ConsensusSnapshot::from_bytes(&snapshot.to_bytes().unwrap()).unwrap();

        let mut restarted = engine_for(&sim.emitter).unwrap();
        restarted.out_of_band_snapshot_update(&snapshot).unwrap();
        assert!(restarted.waiting_for_init_judges());
        assert_eq!(restarted.last_decided_round(), restart_round);

        let output = feed(&mut restarted, sim.emitter.emitted().iter().cloned()).unwrap();
        assert!(!restarted.waiting_for_init_judges());

        let replayed = rounds(&output);
        assert_eq!(replayed.first().map(|r| r.round_num), Some(restart_round + 1));
        assert_eq!(replayed.len(), 3);
        validate_same_consensus(&original, &replayed).unwrap();

        validate_pre_consensus_completeness(&output).unwrap();
        validate_consensus_timestamps(&output).unwrap();
        validate_round_sequence(&output).unwrap();
        assert_eq!(
            replayed.first().and_then(|r| r.events.first()).map(|e| e.consensus_order),
            Some(snapshot.next_consensus_number)
        );
    }

    #[test]
    fn test_snapshot_regression_and_invalid_snapshot_rejected() {
        let mut sim = Simulation::new(4, 12).unwrap();
        assert!(sim.run_until_round(4, 4_000).unwrap());
        let original = sim.rounds();
        let newer = original[original.len() - 1].snapshot.clone();
        let older = original[original.len() - 2].snapshot.clone();

        let mut engine = engine_for(&sim.emitter).unwrap();
        engine.out_of_band_snapshot_update(&newer).unwrap();
        assert!(matches!(
            engine.out_of_band_snapshot_update(&older),
            Err(ConsensusError::SnapshotRegression { .. })
        ));

        let empty = ConsensusSnapshot {
            judges: vec![],
            ..newer.clone()
        };
        assert!(matches!(
            engine.out_of_band_snapshot_update(&empty),
            Err(ConsensusError::InvalidSnapshot { .. })
        ));
        assert_eq!(engine.last_decided_round(), newer.round);
    }

    #[test]
    fn test_restarted_engine_matches_live_engine_output_going_forward() {
        let mut sim = Simulation::new(5, 13).unwrap();
        assert!(sim.run_until_round(6, 6_000).unwrap());
        let snapshot = sim.engine.snapshot().unwrap();
        let history: Vec<_> = sim.emitter.emitted().to_vec();

        let mut restarted = engine_for(&sim.emitter).unwrap();
        restarted.out_of_band_snapshot_update(&snapshot).unwrap();
        feed(&mut restarted, history.iter().cloned()).unwrap();

        let before = sim.output.round_count();
        sim.run(400).unwrap();
        let live = sim.rounds().split_off(before);
        assert!(!live.is_empty());

        let fresh = &sim.emitter.emitted()[history.len()..];
        let output = feed(&mut restarted, fresh.iter().map(Arc::clone)).unwrap();
        validate_same_consensus(&live, &rounds(&output)).unwrap();
    }
}
