//! Auto-tick correlation: inferring completion from external activity.
//!
//! A task that declares an `auto_tick_source` is satisfied for a day when
//! the external activity log says that activity happened. The correlator
//! resolves those facts through the ActivitySignals port and, for durable
//! reporting, materializes synthetic completion records.
//!
//! Failure posture: the activity subsystem going dark must not take the
//! day board with it. Signal errors are logged and read as "not
//! satisfied"; only our own store errors propagate.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::recurrence::is_due;
use crate::domain::{Actor, CompletionRecord, RotaError, SourceKey, VenueId};
use crate::ports::{ActivitySignals, Clock, CompletionStore, DefinitionStore, IdGenerator};

pub struct AutoTickCorrelator {
    definitions: Arc<dyn DefinitionStore>,
    completions: Arc<dyn CompletionStore>,
    signals: Arc<dyn ActivitySignals>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl AutoTickCorrelator {
    pub fn new(
        definitions: Arc<dyn DefinitionStore>,
        completions: Arc<dyn CompletionStore>,
        signals: Arc<dyn ActivitySignals>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            definitions,
            completions,
            signals,
            ids,
            clock,
        }
    }

    /// Which auto-tick sources are satisfied for (venue, day)?
    ///
    /// Checks each distinct source key declared by the venue's active
    /// definitions. An unreachable signal source downgrades to "not
    /// satisfied" with a warning.
    pub async fn resolve(
        &self,
        venue: &VenueId,
        day: NaiveDate,
    ) -> Result<HashSet<SourceKey>, RotaError> {
        let active = self.definitions.list_active(venue).await?;
        // BTreeSet: dedupe and give the probe loop a stable order.
        let declared: BTreeSet<SourceKey> = active
            .iter()
            .filter_map(|definition| definition.auto_tick_source.clone())
            .collect();

        let mut satisfied = HashSet::new();
        for source in declared {
            match self.signals.occurred(venue, &source, day).await {
                Ok(true) => {
                    satisfied.insert(source);
                }
                Ok(false) => {}
                Err(error) => {
                    warn!(
                        venue = %venue,
                        source = %source,
                        %error,
                        "signal lookup failed; treating as not satisfied"
                    );
                }
            }
        }
        Ok(satisfied)
    }

    /// Write synthetic records for every task due on `day` whose source
    /// resolved satisfied. At most one auto record per (task, day) can ever
    /// exist: the store's `append_auto_once` is atomic, so concurrent and
    /// repeated polling is safe. Returns only the records created by this
    /// call.
    pub async fn materialize(
        &self,
        venue: &VenueId,
        day: NaiveDate,
    ) -> Result<Vec<CompletionRecord>, RotaError> {
        let satisfied = self.resolve(venue, day).await?;
        if satisfied.is_empty() {
            return Ok(Vec::new());
        }

        let mut created = Vec::new();
        for definition in self.definitions.list_active(venue).await? {
            let Some(source) = &definition.auto_tick_source else {
                continue;
            };
            // A satisfied signal on a day the task is not due proves
            // nothing about the task; skip it.
            if !satisfied.contains(source) || !is_due(&definition, day) {
                continue;
            }

            let record = CompletionRecord {
                id: self.ids.generate_completion_id(),
                definition_id: definition.id,
                venue_id: venue.clone(),
                day,
                completed_by: Actor::system(),
                completed_at: self.clock.now(),
                reading: None,
                evidence: None,
                notes: None,
                is_auto: true,
                signed_off_by: None,
                signed_off_at: None,
            };
            if self.completions.append_auto_once(record.clone()).await? {
                debug!(
                    definition = %record.definition_id,
                    source = %source,
                    day = %day,
                    "auto-tick completion materialized"
                );
                created.push(record);
            }
        }
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DefinitionSpec, Frequency, Shift, TaskDefinition, Weekday};
    use crate::impls::{
        FailingSignals, InMemoryCompletionStore, InMemoryDefinitionStore, StaticSignals,
    };
    use crate::ports::{FixedClock, UlidGenerator};
    use chrono::{TimeZone, Utc};

    fn clock() -> FixedClock {
        FixedClock::new(Utc.with_ymd_and_hms(2026, 2, 24, 9, 0, 0).unwrap())
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 24).unwrap()
    }

    fn venue() -> VenueId {
        VenueId::new("cafe-001")
    }

    struct Fixture {
        definitions: Arc<InMemoryDefinitionStore>,
        completions: Arc<InMemoryCompletionStore>,
    }

    fn fixture() -> Fixture {
        Fixture {
            definitions: Arc::new(InMemoryDefinitionStore::new()),
            completions: Arc::new(InMemoryCompletionStore::new()),
        }
    }

    fn correlator(fx: &Fixture, signals: Arc<dyn ActivitySignals>) -> AutoTickCorrelator {
        AutoTickCorrelator::new(
            fx.definitions.clone(),
            fx.completions.clone(),
            signals,
            Arc::new(UlidGenerator::new(clock())),
            Arc::new(clock()),
        )
    }

    async fn seed(fx: &Fixture, spec: DefinitionSpec) -> TaskDefinition {
        let ids = UlidGenerator::new(clock());
        let def =
            TaskDefinition::from_spec(ids.generate_definition_id(), venue(), spec, clock().now());
        fx.definitions.insert(def.clone()).await.unwrap();
        def
    }

    fn temp_check() -> SourceKey {
        SourceKey::new("temp_check")
    }

    #[tokio::test]
    async fn resolve_returns_satisfied_sources_only() {
        let fx = fixture();
        seed(
            &fx,
            DefinitionSpec::new("Fridge temps", Frequency::Daily, Shift::Opening)
                .auto_ticked_by(temp_check()),
        )
        .await;
        seed(
            &fx,
            DefinitionSpec::new("Goods in review", Frequency::Daily, Shift::Midday)
                .auto_ticked_by(SourceKey::new("goods_in")),
        )
        .await;

        let signals = StaticSignals::new().with_fact(venue(), temp_check(), day());
        let correlator = correlator(&fx, Arc::new(signals));

        let satisfied = correlator.resolve(&venue(), day()).await.unwrap();
        assert!(satisfied.contains(&temp_check()));
        assert!(!satisfied.contains(&SourceKey::new("goods_in")));
        assert_eq!(satisfied.len(), 1);
    }

    #[tokio::test]
    async fn resolve_dedupes_shared_source_keys() {
        let fx = fixture();
        seed(
            &fx,
            DefinitionSpec::new("Fridge temps", Frequency::Daily, Shift::Opening)
                .auto_ticked_by(temp_check()),
        )
        .await;
        seed(
            &fx,
            DefinitionSpec::new("Freezer temps", Frequency::Daily, Shift::Opening)
                .auto_ticked_by(temp_check()),
        )
        .await;

        let signals = StaticSignals::new().with_fact(venue(), temp_check(), day());
        let correlator = correlator(&fx, Arc::new(signals));

        let satisfied = correlator.resolve(&venue(), day()).await.unwrap();
        assert_eq!(satisfied.len(), 1);
    }

    #[tokio::test]
    async fn unreachable_signal_source_downgrades_to_not_satisfied() {
        let fx = fixture();
        seed(
            &fx,
            DefinitionSpec::new("Fridge temps", Frequency::Daily, Shift::Opening)
                .auto_ticked_by(temp_check()),
        )
        .await;

        let correlator = correlator(&fx, Arc::new(FailingSignals::new("activity api down")));

        // Never an error, just an empty resolved set.
        let satisfied = correlator.resolve(&venue(), day()).await.unwrap();
        assert!(satisfied.is_empty());

        let created = correlator.materialize(&venue(), day()).await.unwrap();
        assert!(created.is_empty());
    }

    #[tokio::test]
    async fn materialize_writes_one_synthetic_record_per_task_day() {
        let fx = fixture();
        let def = seed(
            &fx,
            DefinitionSpec::new("Fridge temps", Frequency::Daily, Shift::Opening)
                .auto_ticked_by(temp_check()),
        )
        .await;

        let signals = StaticSignals::new().with_fact(venue(), temp_check(), day());
        let correlator = correlator(&fx, Arc::new(signals));

        let first = correlator.materialize(&venue(), day()).await.unwrap();
        assert_eq!(first.len(), 1);
        assert!(first[0].is_auto);
        assert_eq!(first[0].completed_by, Actor::system());
        assert_eq!(first[0].day, day());

        // Polling again creates nothing: idempotent per (task, day).
        let second = correlator.materialize(&venue(), day()).await.unwrap();
        assert!(second.is_empty());

        let rows = fx
            .completions
            .list_for_definition_day(&def.id, day())
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn materialize_skips_tasks_not_due_that_day() {
        let fx = fixture();
        seed(
            &fx,
            DefinitionSpec::new(
                "Thursday dishwasher gauge",
                Frequency::Weekly {
                    day: Weekday::Thursday,
                },
                Shift::Midday,
            )
            .auto_ticked_by(temp_check()),
        )
        .await;

        // Signal fired on a Tuesday; the weekly task is not due.
        let signals = StaticSignals::new().with_fact(venue(), temp_check(), day());
        let correlator = correlator(&fx, Arc::new(signals));

        let created = correlator.materialize(&venue(), day()).await.unwrap();
        assert!(created.is_empty());
    }

    #[tokio::test]
    async fn manual_and_auto_records_coexist_in_the_log() {
        let fx = fixture();
        let def = seed(
            &fx,
            DefinitionSpec::new("Fridge temps", Frequency::Daily, Shift::Opening)
                .auto_ticked_by(temp_check()),
        )
        .await;

        // A keen opener logged it by hand before the poll ran.
        let ids = UlidGenerator::new(clock());
        fx.completions
            .append(CompletionRecord {
                id: ids.generate_completion_id(),
                definition_id: def.id,
                venue_id: venue(),
                day: day(),
                completed_by: Actor::new("alice"),
                completed_at: clock().now(),
                reading: None,
                evidence: None,
                notes: None,
                is_auto: false,
                signed_off_by: None,
                signed_off_at: None,
            })
            .await
            .unwrap();

        let signals = StaticSignals::new().with_fact(venue(), temp_check(), day());
        let correlator = correlator(&fx, Arc::new(signals));
        let created = correlator.materialize(&venue(), day()).await.unwrap();
        assert_eq!(created.len(), 1);

        // Both the manual and the synthetic record stay visible.
        let rows = fx
            .completions
            .list_for_definition_day(&def.id, day())
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.iter().filter(|r| r.is_auto).count(), 1);
    }
}
