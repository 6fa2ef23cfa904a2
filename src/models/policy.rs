use serde::{Deserialize, Serialize};

/// Construction strictness and compatibility switches for the domain.
///
/// Both flags default to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingPolicy {
    /// Reject slots whose start or end lies before "now", and schedules whose
    /// date lies before today, at construction time.
    #[serde(default)]
    pub reject_past_timestamps_on_construct: bool,
    /// Report a non-positive reschedule duration as `NOT_AVAILABLE` instead of
    /// `INVALID_DURATION`.
    #[serde(default)]
    pub legacy_duration_error_kind: bool,
}

impl SchedulingPolicy {
    pub fn strict() -> Self {
        Self {
            reject_past_timestamps_on_construct: true,
            ..Self::default()
        }
    }
}
