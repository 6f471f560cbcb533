//! Completion records: the append-only audit log.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{CompletionId, DefinitionId};
use super::keys::{Actor, EvidenceRef, VenueId};

/// One instance of a task being satisfied on one calendar day.
///
/// Design:
/// - Records are append-only. "Is this task done today" is derived from
///   record existence, never tracked as a mutable flag.
/// - The only permitted mutation is adding the sign-off pair, and that is
///   monotonic: once set it is never cleared or overwritten.
/// - `day` is the calendar day being satisfied, stored explicitly. It is
///   decoupled from `completed_at`, which is the instant the record was
///   written (a closing task logged just after midnight still counts for
///   the day the shift belonged to).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub id: CompletionId,
    pub definition_id: DefinitionId,
    pub venue_id: VenueId,
    pub day: NaiveDate,
    pub completed_by: Actor,
    pub completed_at: DateTime<Utc>,
    /// Numeric reading (ppm, °C) when the definition demands one.
    pub reading: Option<f64>,
    pub evidence: Option<EvidenceRef>,
    pub notes: Option<String>,
    /// True when produced by auto-tick correlation instead of a person.
    pub is_auto: bool,
    pub signed_off_by: Option<Actor>,
    pub signed_off_at: Option<DateTime<Utc>>,
}

impl CompletionRecord {
    /// Apply a reviewer attestation. Returns false if the record was
    /// already signed off; the original reviewer and timestamp stand.
    /// Both fields are set together, so `signed_off_at` being present
    /// always implies `signed_off_by` is too.
    pub fn sign_off(&mut self, reviewer: &Actor, at: DateTime<Utc>) -> bool {
        if self.signed_off_at.is_some() {
            return false;
        }
        self.signed_off_by = Some(reviewer.clone());
        self.signed_off_at = Some(at);
        true
    }

    pub fn is_signed_off(&self) -> bool {
        self.signed_off_at.is_some()
    }
}

/// Caller-supplied portion of a manual completion: who did it and what
/// they brought back. The tracker fills in ids, day and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionSpec {
    pub completed_by: Actor,
    #[serde(default)]
    pub reading: Option<f64>,
    #[serde(default)]
    pub evidence: Option<EvidenceRef>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CompletionSpec {
    pub fn by(actor: impl Into<String>) -> Self {
        Self {
            completed_by: Actor::new(actor),
            reading: None,
            evidence: None,
            notes: None,
        }
    }

    pub fn with_reading(mut self, reading: f64) -> Self {
        self.reading = Some(reading);
        self
    }

    pub fn with_evidence(mut self, evidence: EvidenceRef) -> Self {
        self.evidence = Some(evidence);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}
