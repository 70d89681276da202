use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A race or lap time. Ordered by total centiseconds; fields only break ties
/// between out-of-range spellings of the same duration (`0:60.00`, `1:00.00`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Time {
    pub minutes: u8,
    pub seconds: u8,
    pub cents: u8,
}

impl Time {
    /// Time stored in blank record slots.
    pub const BLANK: Time = Time::new(9, 59, 99);

    pub const fn new(minutes: u8, seconds: u8, cents: u8) -> Self {
        Self {
            minutes,
            seconds,
            cents,
        }
    }

    pub fn total_cents(&self) -> u32 {
        (u32::from(self.minutes) * 60 + u32::from(self.seconds)) * 100 + u32::from(self.cents)
    }

    /// In-game notation, e.g. `1’02”53`.
    pub fn pretty(&self) -> String {
        format!("{}’{:02}”{:02}", self.minutes, self.seconds, self.cents)
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::BLANK
    }
}

impl Ord for Time {
    fn cmp(&self, other: &Self) -> Ordering {
        self.total_cents()
            .cmp(&other.total_cents())
            .then_with(|| {
                (self.minutes, self.seconds, self.cents).cmp(&(
                    other.minutes,
                    other.seconds,
                    other.cents,
                ))
            })
    }
}

impl PartialOrd for Time {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}.{:02}", self.minutes, self.seconds, self.cents)
    }
}
