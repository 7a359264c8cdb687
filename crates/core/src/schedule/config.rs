//! Schedule configuration.

use serde::{Deserialize, Serialize};

/// Configuration for slot allocation and batch runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Daily publish slots as 24-hour "HH:MM", ascending.
    #[serde(default = "default_slots")]
    pub slots: Vec<String>,

    /// Offset of the reference time zone from UTC, in minutes.
    /// The default (+08:00) has no daylight saving transitions.
    #[serde(default = "default_offset")]
    pub utc_offset_minutes: i32,

    /// Upload limit for a batch run when the caller gives none.
    #[serde(default = "default_limit")]
    pub default_limit: usize,
}

fn default_slots() -> Vec<String> {
    ["00:00", "08:00", "12:00", "16:00"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_offset() -> i32 {
    8 * 60
}

fn default_limit() -> usize {
    10
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            slots: default_slots(),
            utc_offset_minutes: default_offset(),
            default_limit: default_limit(),
        }
    }
}
