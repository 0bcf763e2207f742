//! Source of "now" for the booking form.
//!
//! The controller reads the clock for two things only: the initial date and
//! time shown in a fresh draft, and the "today" that the past-date check
//! compares against. Hosts pass `SystemClock`; tests pin the date with
//! `FixedClock`.

use chrono::{DateTime, FixedOffset, Local};

pub trait Clock {
    /// Current wall-clock time in the user's local offset.
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Reads the device's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Always returns the instant it was built with.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}
