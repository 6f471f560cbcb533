//! In-memory completion log (tests and embedded use).

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::Mutex;

use crate::domain::{Actor, CompletionId, CompletionRecord, DefinitionId, RotaError, VenueId};
use crate::ports::{CompletionStore, SignOffOutcome};

/// Vec-backed append-only CompletionStore. Clone shares the underlying log.
///
/// All mutation happens under one lock, which is what makes
/// `append_auto_once` atomic here.
#[derive(Clone, Default)]
pub struct InMemoryCompletionStore {
    rows: Arc<Mutex<Vec<CompletionRecord>>>,
}

impl InMemoryCompletionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn log_order(rows: &mut [CompletionRecord]) {
    // completed_at, id as tiebreak so equal instants stay deterministic.
    rows.sort_by(|a, b| a.completed_at.cmp(&b.completed_at).then_with(|| a.id.cmp(&b.id)));
}

#[async_trait]
impl CompletionStore for InMemoryCompletionStore {
    async fn append(&self, record: CompletionRecord) -> Result<(), RotaError> {
        self.rows.lock().await.push(record);
        Ok(())
    }

    async fn list_for_day(
        &self,
        venue: &VenueId,
        day: NaiveDate,
    ) -> Result<Vec<CompletionRecord>, RotaError> {
        let rows = self.rows.lock().await;
        let mut out: Vec<CompletionRecord> = rows
            .iter()
            .filter(|r| &r.venue_id == venue && r.day == day)
            .cloned()
            .collect();
        drop(rows);
        log_order(&mut out);
        Ok(out)
    }

    async fn list_range(
        &self,
        venue: &VenueId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CompletionRecord>, RotaError> {
        let rows = self.rows.lock().await;
        let mut out: Vec<CompletionRecord> = rows
            .iter()
            .filter(|r| &r.venue_id == venue && r.day >= from && r.day <= to)
            .cloned()
            .collect();
        drop(rows);
        log_order(&mut out);
        Ok(out)
    }

    async fn append_auto_once(&self, record: CompletionRecord) -> Result<bool, RotaError> {
        let mut rows = self.rows.lock().await;
        let exists = rows
            .iter()
            .any(|r| r.is_auto && r.definition_id == record.definition_id && r.day == record.day);
        if exists {
            return Ok(false);
        }
        rows.push(record);
        Ok(true)
    }

    async fn sign_off(
        &self,
        ids: &[CompletionId],
        reviewer: &Actor,
        at: DateTime<Utc>,
    ) -> Result<SignOffOutcome, RotaError> {
        let wanted: HashSet<&CompletionId> = ids.iter().collect();
        let mut rows = self.rows.lock().await;

        let mut outcome = SignOffOutcome {
            matched: 0,
            newly_signed: 0,
        };
        for row in rows.iter_mut() {
            if wanted.contains(&row.id) {
                outcome.matched += 1;
                if row.sign_off(reviewer, at) {
                    outcome.newly_signed += 1;
                }
            }
        }
        Ok(outcome)
    }

    async fn list_for_definition_day(
        &self,
        definition: &DefinitionId,
        day: NaiveDate,
    ) -> Result<Vec<CompletionRecord>, RotaError> {
        let rows = self.rows.lock().await;
        let mut out: Vec<CompletionRecord> = rows
            .iter()
            .filter(|r| &r.definition_id == definition && r.day == day)
            .cloned()
            .collect();
        drop(rows);
        log_order(&mut out);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{Clock, FixedClock, IdGenerator, UlidGenerator};
    use chrono::TimeZone;

    fn clock() -> FixedClock {
        FixedClock::new(Utc.with_ymd_and_hms(2026, 2, 24, 9, 0, 0).unwrap())
    }

    fn record(day: NaiveDate, is_auto: bool) -> CompletionRecord {
        let ids = UlidGenerator::new(clock());
        CompletionRecord {
            id: ids.generate_completion_id(),
            definition_id: DefinitionId::from_ulid(ulid::Ulid::new()),
            venue_id: VenueId::new("cafe-001"),
            day,
            completed_by: if is_auto {
                Actor::system()
            } else {
                Actor::new("alice")
            },
            completed_at: clock().now(),
            reading: None,
            evidence: None,
            notes: None,
            is_auto,
            signed_off_by: None,
            signed_off_at: None,
        }
    }

    #[tokio::test]
    async fn append_auto_once_dedupes_per_definition_day() {
        let store = InMemoryCompletionStore::new();
        let day = NaiveDate::from_ymd_opt(2026, 2, 24).unwrap();
        let first = record(day, true);
        let definition_id = first.definition_id;

        assert!(store.append_auto_once(first).await.unwrap());

        let mut second = record(day, true);
        second.definition_id = definition_id;
        assert!(!store.append_auto_once(second).await.unwrap());

        let rows = store
            .list_for_definition_day(&definition_id, day)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn auto_dedupe_does_not_block_other_days_or_definitions() {
        let store = InMemoryCompletionStore::new();
        let day = NaiveDate::from_ymd_opt(2026, 2, 24).unwrap();
        let next_day = day + chrono::Duration::days(1);

        let first = record(day, true);
        let definition_id = first.definition_id;
        assert!(store.append_auto_once(first).await.unwrap());

        // Same definition, next day: allowed.
        let mut tomorrow = record(next_day, true);
        tomorrow.definition_id = definition_id;
        assert!(store.append_auto_once(tomorrow).await.unwrap());

        // Different definition, same day: allowed.
        assert!(store.append_auto_once(record(day, true)).await.unwrap());
    }

    #[tokio::test]
    async fn sign_off_counts_matches_and_new_signatures() {
        let store = InMemoryCompletionStore::new();
        let day = NaiveDate::from_ymd_opt(2026, 2, 24).unwrap();
        let a = record(day, false);
        let b = record(day, false);
        let (id_a, id_b) = (a.id, b.id);
        store.append(a).await.unwrap();
        store.append(b).await.unwrap();

        let reviewer = Actor::new("manager-dana");
        let first = store
            .sign_off(&[id_a, id_b], &reviewer, clock().now())
            .await
            .unwrap();
        assert_eq!(first, SignOffOutcome { matched: 2, newly_signed: 2 });

        // Re-applying matches both but signs nothing new.
        let again = store
            .sign_off(&[id_a, id_b], &reviewer, clock().now() + chrono::Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(again, SignOffOutcome { matched: 2, newly_signed: 0 });
    }

    #[tokio::test]
    async fn list_range_is_inclusive_on_both_ends() {
        let store = InMemoryCompletionStore::new();
        let feb_1 = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let feb_28 = NaiveDate::from_ymd_opt(2026, 2, 28).unwrap();
        let mar_1 = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();

        store.append(record(feb_1, false)).await.unwrap();
        store.append(record(feb_28, false)).await.unwrap();
        store.append(record(mar_1, false)).await.unwrap();

        let venue = VenueId::new("cafe-001");
        let in_feb = store.list_range(&venue, feb_1, feb_28).await.unwrap();
        assert_eq!(in_feb.len(), 2);
    }
}
