//! # Freeze Handling
//!
//! Once a decided round reaches the freeze time the engine emits that round
//! flagged as the freeze round and nothing after it.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{engine_with, feed, Simulation};
    use hg_consensus::domain::invariants::{
        validate_consensus_timestamps, validate_pre_consensus_completeness,
        validate_same_consensus,
    };
    use hg_consensus::test_utils::{EventEmitter, SIMULATION_START};
    use hg_consensus::{
        BirthRound, ConsensusEngineApi, FreezeCheckHolder, PlatformEvent, SharedConsensusEngine,
    };
    use std::sync::Arc;

    const ONE_SECOND: u64 = 1_000_000_000;

    fn frozen_simulation(seed: u64) -> (Simulation<FreezeCheckHolder>, Arc<FreezeCheckHolder>) {
        let emitter = EventEmitter::new(4, seed);
        let holder = Arc::new(FreezeCheckHolder::new());
        let engine = engine_with(emitter.roster_history().unwrap(), Arc::clone(&holder)).unwrap();
        (Simulation::with_engine(emitter, engine), holder)
    }

    #[test]
    fn test_freeze_round_is_the_last_round() {
        let (mut sim, holder) = frozen_simulation(20);
        let freeze_time = SIMULATION_START.plus_nanos(ONE_SECOND);
        holder.set_freeze_time(Some(freeze_time));

        for _ in 0..4_000 {
            if sim.engine.is_frozen() {
                break;
            }
            sim.step().unwrap();
        }
        assert!(sim.engine.is_frozen());

        let rounds = sim.rounds();
        let (last, earlier) = rounds.split_last().unwrap();
        assert!(last.freeze_round);
        assert!(last.consensus_timestamp >= freeze_time);
        for round in earlier {
            assert!(!round.freeze_round);
            assert!(round.consensus_timestamp < freeze_time);
        }
        validate_pre_consensus_completeness(&sim.output).unwrap();
        validate_consensus_timestamps(&sim.output).unwrap();

        let decided = sim.engine.last_decided_round();
        let linked = sim.engine.linked_event_count();
        for _ in 0..50 {
            let output = sim.engine.add_event(sim.emitter.next_event()).unwrap();
            assert!(output.is_empty());
        }
        assert_eq!(sim.engine.last_decided_round(), decided);
        assert_eq!(sim.engine.linked_event_count(), linked);
    }

    #[test]
    fn test_freeze_inside_a_batch_of_several_rounds() {
        let mut live = Simulation::new(4, 23).unwrap();
        assert!(live.run_until_round(6, 6_000).unwrap());
        let decided = live.rounds();
        let freeze_time = decided[2].consensus_timestamp;

        // later birth rounds wait in the future buffer, so the last
        // first-round event decides every round in one call
        let (current, future): (Vec<Arc<PlatformEvent>>, Vec<Arc<PlatformEvent>>) = live
            .emitter
            .emitted()
            .iter()
            .cloned()
            .partition(|event| event.birth_round() == 1);

        let holder = Arc::new(FreezeCheckHolder::new());
        holder.set_freeze_time(Some(freeze_time));
        let mut engine =
            engine_with(live.emitter.roster_history().unwrap(), Arc::clone(&holder)).unwrap();

        let buffered = feed(&mut engine, future.iter().cloned()).unwrap();
        assert_eq!(buffered.round_count(), 0);
        assert_eq!(engine.future_event_count(), future.len());

        let output = feed(&mut engine, current).unwrap();
        let batches: Vec<_> = output
            .batches()
            .iter()
            .filter(|batch| !batch.consensus_rounds.is_empty())
            .collect();
        assert_eq!(batches.len(), 1);

        let kept = &batches[0].consensus_rounds;
        assert_eq!(kept.len(), 3);
        assert!(kept[..2].iter().all(|round| !round.freeze_round));
        assert!(kept[2].freeze_round);
        validate_same_consensus(&decided[..3], kept).unwrap();
        assert!(engine.is_frozen());
    }

    #[test]
    fn test_distant_freeze_time_changes_nothing() {
        let (mut sim, holder) = frozen_simulation(21);
        holder.set_freeze_time(Some(SIMULATION_START.plus_nanos(3_600 * ONE_SECOND)));

        assert!(sim.run_until_round(3, 4_000).unwrap());

        assert!(sim.rounds().iter().all(|round| !round.freeze_round));
        assert!(!sim.engine.is_frozen());
    }

    #[test]
    fn test_shared_engine_reports_freeze() {
        let mut emitter = EventEmitter::new(4, 22);
        let holder = Arc::new(FreezeCheckHolder::new());
        let engine = engine_with(emitter.roster_history().unwrap(), Arc::clone(&holder)).unwrap();
        let shared = SharedConsensusEngine::new(engine);
        holder.set_freeze_time(Some(SIMULATION_START));

        for _ in 0..4_000 {
            if shared.is_frozen() {
                break;
            }
            let output = shared.add_event(emitter.next_event()).unwrap();
            emitter.observe(&output);
        }
        assert!(shared.is_frozen());
        assert!(shared.with_engine(|engine| engine.is_frozen()));
    }
}
