//! Time-of-day buckets for grouping due tasks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Named shift a task belongs to. `ALL` is the presentation order used by
/// day boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shift {
    Opening,
    Midday,
    Closing,
}

impl Shift {
    pub const ALL: [Shift; 3] = [Shift::Opening, Shift::Midday, Shift::Closing];

    pub fn as_str(self) -> &'static str {
        match self {
            Shift::Opening => "opening",
            Shift::Midday => "midday",
            Shift::Closing => "closing",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|shift| shift.as_str() == s)
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
