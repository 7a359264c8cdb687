//! Publication slot allocation.
//!
//! Publish timestamps are always placed on one of a fixed list of daily
//! time-of-day slots in a reference time zone. Feeding the allocator its own
//! output produces a strictly increasing sequence of slot instants.

mod allocator;
mod config;

pub use allocator::SlotAllocator;
pub use config::ScheduleConfig;

use thiserror::Error;

/// Errors raised while building a slot allocator.
///
/// These are configuration errors: a malformed slot list is never recovered
/// from at runtime.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("slot list is empty")]
    NoSlots,

    #[error("invalid slot '{0}': expected 24-hour HH:MM")]
    InvalidSlot(String),

    #[error("slots must be strictly ascending: '{slot}' follows '{previous}'")]
    NotAscending { previous: String, slot: String },

    #[error("invalid UTC offset: {0} minutes")]
    InvalidOffset(i32),
}
