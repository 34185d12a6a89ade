use std::time::Duration;

use metrics::{counter, histogram};

use crate::models::InteractionType;

/// Metric names emitted by the library; no recorder is installed here.
#[derive(Debug, Clone, Copy)]
pub struct MatchMetrics {
    pub store_operations_total: &'static str,
    pub store_operation_duration: &'static str,

    pub rankings_total: &'static str,
    pub ranking_duration: &'static str,
    pub candidates_scored: &'static str,
    pub candidates_returned: &'static str,

    pub interactions_recorded_total: &'static str,

    pub errors_total: &'static str,
}

impl Default for MatchMetrics {
    fn default() -> Self {
        Self {
            store_operations_total: "nikah_match_store_operations_total",
            store_operation_duration: "nikah_match_store_operation_duration_seconds",

            rankings_total: "nikah_match_rankings_total",
            ranking_duration: "nikah_match_ranking_duration_seconds",
            candidates_scored: "nikah_match_candidates_scored",
            candidates_returned: "nikah_match_candidates_returned",

            interactions_recorded_total: "nikah_match_interactions_recorded_total",

            errors_total: "nikah_match_errors_total",
        }
    }
}

impl MatchMetrics {
    /// Record one store round-trip
    pub fn record_store_operation(&self, operation: &'static str, duration: Duration, success: bool) {
        let status = if success { "success" } else { "error" };

        counter!(self.store_operations_total, "operation" => operation, "status" => status).increment(1);
        histogram!(self.store_operation_duration, "operation" => operation).record(duration.as_secs_f64());
    }

    /// Record a completed ranking request
    #[allow(clippy::cast_precision_loss)]
    pub fn record_ranking(&self, scored: usize, returned: usize, duration: Duration) {
        counter!(self.rankings_total).increment(1);
        histogram!(self.ranking_duration).record(duration.as_secs_f64());
        histogram!(self.candidates_scored).record(scored as f64);
        histogram!(self.candidates_returned).record(returned as f64);
    }

    /// Record an appended interaction
    pub fn record_interaction(&self, interaction_type: InteractionType) {
        counter!(self.interactions_recorded_total, "type" => interaction_type.as_str()).increment(1);
    }

    /// Record error metrics
    pub fn record_error(&self, error_kind: &'static str, operation: &'static str) {
        counter!(self.errors_total, "type" => error_kind, "operation" => operation).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_are_prefixed() {
        let metrics = MatchMetrics::default();
        for name in [
            metrics.store_operations_total,
            metrics.store_operation_duration,
            metrics.rankings_total,
            metrics.ranking_duration,
            metrics.candidates_scored,
            metrics.candidates_returned,
            metrics.interactions_recorded_total,
            metrics.errors_total,
        ] {
            assert!(name.starts_with("nikah_match_"), "{name}");
        }
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        let metrics = MatchMetrics::default();
        metrics.record_store_operation("profiles.get_by_key", Duration::from_millis(3), true);
        metrics.record_ranking(40, 20, Duration::from_millis(12));
        metrics.record_interaction(InteractionType::Message);
        metrics.record_error("timeout", "profiles.query");
    }
}
