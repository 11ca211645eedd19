//! Values that cross the session boundary.

use crate::grade::AccuracyGrade;
use crate::matcher::TargetMatch;

/// One timestamped angular-velocity reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Seconds on the source's own monotonic time base.
    pub timestamp_s: f64,
    /// Rotation rate about the platter axis in rad/s.
    pub angular_velocity_z: f64,
}

impl Sample {
    pub const fn new(timestamp_s: f64, angular_velocity_z: f64) -> Self {
        Self {
            timestamp_s,
            angular_velocity_z,
        }
    }
}

/// Everything a presentation layer reads after a sample, copied out so
/// readers never observe a half-updated window.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub display_rpm: f64,
    pub raw_rpm: f64,
    pub smoothed_rpm: f64,
    pub rotation_deg: f64,
    pub current_match: Option<TargetMatch>,
    pub graph_match: Option<TargetMatch>,
    pub is_stable: bool,
    pub grade: AccuracyGrade,
    /// Oldest first.
    pub deviation_history: Vec<f64>,
    pub jump_index: Option<usize>,
    /// Samples accepted since the session started.
    pub samples: u64,
}
