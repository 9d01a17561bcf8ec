//! # Telemetry
//!
//! Engine metrics land in the process-wide registry and are exposed through
//! `hg-telemetry` next to the host metrics.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::Simulation;
    use hg_telemetry::{encode_metrics, init_logging, TelemetryConfig, TelemetryError};

    #[test]
    fn test_engine_metrics_are_exposed() {
        let mut sim = Simulation::new(4, 30).unwrap();
        assert!(sim.run_until_round(1, 2_000).unwrap());

        let text = encode_metrics().unwrap();
        assert!(text.contains("hg_consensus_events_added_total"));
        assert!(text.contains("hg_consensus_rounds_decided_total"));
        assert!(text.contains("hg_consensus_pre_consensus_events_total"));
    }

    #[test]
    fn test_logging_initializes_once() {
        let config = TelemetryConfig {
            console_output: false,
            log_level: "hg_consensus=debug,warn".to_string(),
            ..TelemetryConfig::default()
        };
        let first = init_logging(&config);
        assert!(first.is_ok() || matches!(first, Err(TelemetryError::LoggingInit(_))));
        assert!(matches!(
            init_logging(&config),
            Err(TelemetryError::LoggingInit(_))
        ));

        let mut sim = Simulation::new(4, 31).unwrap();
        sim.run(50).unwrap();
    }
}
