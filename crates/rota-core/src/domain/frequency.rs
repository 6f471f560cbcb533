//! Recurrence rules.
//!
//! # 閉じた Frequency バリアント
//! 頻度を文字列で持つと、未知の値が「毎日due」へ暗黙にフォールバックする
//! 事故が起こりうるため、ここでは閉じた enum として表現します。
//! 未知の頻度はそもそも構築できず、永続化層からの復元時に
//! `Frequency::from_parts` が Configuration エラーとして弾きます。
//!
//! 曜日番号はエンジン内部で Sunday=0..Saturday=6 に固定し、
//! chrono との変換は境界（`Weekday::from_date`）でのみ行います。

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::RotaError;

/// Day of week, engine-internal numbering: Sunday = 0 .. Saturday = 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weekday {
    Sunday = 0,
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Sunday,
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    /// Engine-internal index (Sunday = 0).
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Boundary conversion from chrono's calendar.
    pub fn from_date(date: NaiveDate) -> Self {
        match date.weekday() {
            chrono::Weekday::Sun => Weekday::Sunday,
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Weekday::Sunday => "sunday",
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|day| day.as_str() == s)
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How often a task recurs. Weekly carries its weekday structurally, so
/// "weekly without a day" is unrepresentable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly { day: Weekday },
    Monthly,
}

impl Frequency {
    /// Kind discriminant as stored in persisted rows.
    pub fn kind(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly { .. } => "weekly",
            Frequency::Monthly => "monthly",
        }
    }

    pub fn weekly_day(&self) -> Option<Weekday> {
        match self {
            Frequency::Weekly { day } => Some(*day),
            _ => None,
        }
    }

    /// Rebuild a Frequency from its persisted (kind, weekly_day) pair.
    ///
    /// This is the decode boundary where malformed definitions surface as
    /// Configuration errors instead of silently defaulting. Both directions
    /// of the weekly/day pairing are enforced.
    pub fn from_parts(kind: &str, weekly_day: Option<Weekday>) -> Result<Self, RotaError> {
        match (kind, weekly_day) {
            ("daily", None) => Ok(Frequency::Daily),
            ("weekly", Some(day)) => Ok(Frequency::Weekly { day }),
            ("monthly", None) => Ok(Frequency::Monthly),
            ("weekly", None) => Err(RotaError::configuration(
                "weekly frequency requires a weekly day",
            )),
            ("daily", Some(day)) | ("monthly", Some(day)) => Err(RotaError::configuration(format!(
                "{kind} frequency does not take a weekly day (got {day})",
            ))),
            (other, _) => Err(RotaError::configuration(format!(
                "unknown frequency kind: {other}",
            ))),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Weekly { day } => write!(f, "weekly({day})"),
            other => f.write_str(other.kind()),
        }
    }
}
