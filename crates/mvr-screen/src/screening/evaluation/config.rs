use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_ACCIDENT_THRESHOLD: u32 = 2;
pub(crate) const DEFAULT_UNINSPECTED_VEHICLE_THRESHOLD: u32 = 2;

/// Count thresholds for the repeated-occurrence rules of the standard policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyThresholds {
    pub accident_threshold: u32,
    pub uninspected_vehicle_threshold: u32,
}

impl Default for PolicyThresholds {
    fn default() -> Self {
        Self {
            accident_threshold: DEFAULT_ACCIDENT_THRESHOLD,
            uninspected_vehicle_threshold: DEFAULT_UNINSPECTED_VEHICLE_THRESHOLD,
        }
    }
}
