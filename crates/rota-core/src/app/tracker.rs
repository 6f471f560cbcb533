//! Completion tracking: the only write path for manual completion records.
//! Synthetic records go through the correlator's materialize step instead.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::recurrence::due_on;
use crate::domain::{
    CompletionRecord, CompletionSpec, DefinitionId, RotaError, SourceKey, VenueId,
};
use crate::ports::{Clock, CompletionStore, DefinitionStore, IdGenerator};

/// Daily completion state for a venue: how many due tasks are satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayStatus {
    pub done: usize,
    pub total: usize,
}

impl DayStatus {
    pub fn is_complete(&self) -> bool {
        self.done >= self.total
    }
}

/// Records manual completions and derives day/month state from the log.
///
/// "Done" is always computed from record existence. There is no mutable
/// done-flag anywhere, so concurrent writers can only ever add evidence,
/// never contradict each other.
pub struct CompletionTracker {
    definitions: Arc<dyn DefinitionStore>,
    completions: Arc<dyn CompletionStore>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl CompletionTracker {
    pub fn new(
        definitions: Arc<dyn DefinitionStore>,
        completions: Arc<dyn CompletionStore>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            definitions,
            completions,
            ids,
            clock,
        }
    }

    /// Append a manual completion for (definition, day).
    ///
    /// The definition must exist but may be retired: completing a task the
    /// same day it was deactivated is legitimate. A definition that demands
    /// a quantitative reading rejects the call outright when none (or a
    /// non-finite one) is supplied, and nothing is written.
    pub async fn record(
        &self,
        definition_id: &DefinitionId,
        day: NaiveDate,
        spec: CompletionSpec,
    ) -> Result<CompletionRecord, RotaError> {
        let definition = self
            .definitions
            .get(definition_id)
            .await?
            .ok_or(RotaError::DefinitionNotFound(*definition_id))?;

        if definition.requires_reading && spec.reading.is_none() {
            return Err(RotaError::validation("reading required"));
        }
        if let Some(reading) = spec.reading
            && !reading.is_finite()
        {
            return Err(RotaError::validation("reading must be a finite number"));
        }

        let record = CompletionRecord {
            id: self.ids.generate_completion_id(),
            definition_id: definition.id,
            venue_id: definition.venue_id.clone(),
            day,
            completed_by: spec.completed_by,
            completed_at: self.clock.now(),
            reading: spec.reading,
            evidence: spec.evidence,
            notes: spec.notes,
            is_auto: false,
            signed_off_by: None,
            signed_off_at: None,
        };
        self.completions.append(record.clone()).await?;
        debug!(
            definition = %record.definition_id,
            day = %day,
            by = %record.completed_by,
            "manual completion recorded"
        );
        Ok(record)
    }

    /// Done/total over the tasks due on `day`.
    ///
    /// A due task counts as done when at least one record exists for it on
    /// that day, or when its auto-tick source is in `auto_satisfied` (the
    /// correlator's resolved set). Duplicate records never double-count:
    /// membership is per definition, not per record.
    pub async fn day_status(
        &self,
        venue: &VenueId,
        day: NaiveDate,
        auto_satisfied: &HashSet<SourceKey>,
    ) -> Result<DayStatus, RotaError> {
        let active = self.definitions.list_active(venue).await?;
        let due = due_on(&active, day);

        let recorded: HashSet<DefinitionId> = self
            .completions
            .list_for_day(venue, day)
            .await?
            .into_iter()
            .map(|record| record.definition_id)
            .collect();

        let done = due
            .iter()
            .filter(|definition| {
                recorded.contains(&definition.id)
                    || definition
                        .auto_tick_source
                        .as_ref()
                        .is_some_and(|source| auto_satisfied.contains(source))
            })
            .count();

        Ok(DayStatus {
            done,
            total: due.len(),
        })
    }

    /// Every completion record in the given month, ordered by
    /// `completed_at`. A pure range query for calendar and report views.
    pub async fn month_records(
        &self,
        venue: &VenueId,
        year: i32,
        month: u32,
    ) -> Result<Vec<CompletionRecord>, RotaError> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| RotaError::validation(format!("invalid month {year}-{month:02}")))?;
        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        let last = NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .ok_or_else(|| RotaError::validation(format!("invalid month {year}-{month:02}")))?
            - chrono::Duration::days(1);

        self.completions.list_range(venue, first, last).await
    }
}
