use crate::config::DEFAULT_CUT_MINUTES;

use serde::{Deserialize, Serialize};

/// Persisted warden configuration: a single JSON object with the automatic
/// cut interval in minutes.
///
/// The field is deliberately required rather than defaulted: a file missing
/// it is treated as corrupt and rewritten with the default, so the on-disk
/// state is always complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WardenConfig {
    /// Automatic cut interval in minutes. Must be positive.
    pub cut_time_minutes: u64,
}

impl Default for WardenConfig {
    fn default() -> Self {
        Self {
            cut_time_minutes: DEFAULT_CUT_MINUTES,
        }
    }
}

impl WardenConfig {
    /// Returns `true` if the interval satisfies the positive-integer
    /// constraint.
    pub fn is_valid(&self) -> bool {
        self.cut_time_minutes > 0
    }
}
