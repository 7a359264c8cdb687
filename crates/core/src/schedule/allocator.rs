//! Slot allocator implementation.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc};

use super::config::ScheduleConfig;
use super::ScheduleError;

/// Computes the next publish instant on a fixed daily slot grid.
#[derive(Debug, Clone)]
pub struct SlotAllocator {
    slots: Vec<NaiveTime>,
    zone: FixedOffset,
}

impl SlotAllocator {
    /// Build an allocator from "HH:MM" slot strings and a UTC offset in minutes.
    pub fn new<S: AsRef<str>>(slots: &[S], utc_offset_minutes: i32) -> Result<Self, ScheduleError> {
        if slots.is_empty() {
            return Err(ScheduleError::NoSlots);
        }

        let zone = FixedOffset::east_opt(utc_offset_minutes.saturating_mul(60))
            .ok_or(ScheduleError::InvalidOffset(utc_offset_minutes))?;

        let mut parsed: Vec<NaiveTime> = Vec::with_capacity(slots.len());
        for raw in slots {
            let raw = raw.as_ref();
            let time = parse_slot(raw)?;
            if let Some(previous) = parsed.last() {
                if time <= *previous {
                    return Err(ScheduleError::NotAscending {
                        previous: previous.format("%H:%M").to_string(),
                        slot: raw.to_string(),
                    });
                }
            }
            parsed.push(time);
        }

        Ok(Self {
            slots: parsed,
            zone,
        })
    }

    pub fn from_config(config: &ScheduleConfig) -> Result<Self, ScheduleError> {
        Self::new(&config.slots, config.utc_offset_minutes)
    }

    /// The reference time zone.
    pub fn zone(&self) -> FixedOffset {
        self.zone
    }

    pub fn slots(&self) -> &[NaiveTime] {
        &self.slots
    }

    /// Next slot after the last committed instant, or after "now" when nothing
    /// has been committed yet.
    pub fn next_slot(&self, last_committed: Option<DateTime<Utc>>) -> DateTime<Utc> {
        self.next_slot_at(last_committed, Utc::now())
    }

    /// Same as [`next_slot`](Self::next_slot) with an explicit "now".
    pub fn next_slot_at(
        &self,
        last_committed: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> DateTime<Utc> {
        self.next_slot_after(last_committed.unwrap_or(now))
    }

    /// First configured slot strictly after `baseline`.
    pub fn next_slot_after(&self, baseline: DateTime<Utc>) -> DateTime<Utc> {
        let date = baseline.with_timezone(&self.zone).date_naive();

        for slot in &self.slots {
            let candidate = self.local_to_instant(date.and_time(*slot));
            if candidate > baseline {
                return candidate;
            }
        }

        let next_day = date.succ_opt().unwrap_or(NaiveDate::MAX);
        self.first_slot_on(next_day)
    }

    /// First configured slot on a calendar date of the reference zone.
    pub fn first_slot_on(&self, date: NaiveDate) -> DateTime<Utc> {
        // Non-empty by construction.
        let first = self.slots[0];
        self.local_to_instant(date.and_time(first))
    }

    /// Interpret a wall-clock time in the reference zone.
    pub fn local_to_instant(&self, local: NaiveDateTime) -> DateTime<Utc> {
        let offset = TimeDelta::seconds(i64::from(self.zone.local_minus_utc()));
        Utc.from_utc_datetime(&(local - offset))
    }

    pub fn to_local(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        instant.with_timezone(&self.zone)
    }

    /// "YYYY-MM-DD HH:MM" in the reference zone.
    pub fn format_local(&self, instant: DateTime<Utc>) -> String {
        self.to_local(instant).format("%Y-%m-%d %H:%M").to_string()
    }
}

fn parse_slot(raw: &str) -> Result<NaiveTime, ScheduleError> {
    let invalid = || ScheduleError::InvalidSlot(raw.to_string());

    let (hour, minute) = raw.trim().split_once(':').ok_or_else(invalid)?;
    let hour: u32 = hour.parse().map_err(|_| invalid())?;
    let minute: u32 = minute.parse().map_err(|_| invalid())?;

    NaiveTime::from_hms_opt(hour, minute, 0)
        .filter(|_| hour < 24 && minute < 60)
        .ok_or_else(invalid)
}
