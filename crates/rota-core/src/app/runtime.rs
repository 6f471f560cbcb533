//! Runtime - エンジンの組み立てと操作窓口
//!
//! # 使用例
//! ```ignore
//! let runtime = Runtime::builder()
//!     .definitions(definitions)
//!     .completions(completions)
//!     .signals(signals)
//!     .build()?;
//! runtime.seed_defaults(&venue).await?;
//! let board = runtime.day_board(&venue, runtime.today()).await?;
//! ```
//!
//! # Fail-fast 設計
//! - build() 時に必須ポート（両ストア）の有無をチェック
//! - 不足があれば BuildError を返す
//! - clock / ids / signals は省略時に既定実装で埋める

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use super::autotick::AutoTickCorrelator;
use super::board::{bucket_by_shift, ShiftBoard};
use super::catalog;
use super::recurrence::due_on;
use super::signoff::SignoffAuditor;
use super::tracker::{CompletionTracker, DayStatus};
use crate::domain::{
    Actor, CompletionId, CompletionRecord, CompletionSpec, DefinitionId, DefinitionSpec,
    RotaError, SourceKey, TaskDefinition, VenueId,
};
use crate::impls::NoSignals;
use crate::ports::{
    ActivitySignals, Clock, CompletionStore, DefinitionStore, IdGenerator, SignOffOutcome,
    SystemClock, UlidGenerator,
};

/// BuildError はランタイム構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing stores: {0:?}. These ports must be supplied before build().")]
    MissingStores(Vec<&'static str>),
}

/// RuntimeBuilder は Runtime を構築
pub struct RuntimeBuilder {
    definitions: Option<Arc<dyn DefinitionStore>>,
    completions: Option<Arc<dyn CompletionStore>>,
    signals: Option<Arc<dyn ActivitySignals>>,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Arc<dyn IdGenerator>>,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            definitions: None,
            completions: None,
            signals: None,
            clock: None,
            ids: None,
        }
    }

    pub fn definitions(mut self, store: Arc<dyn DefinitionStore>) -> Self {
        self.definitions = Some(store);
        self
    }

    pub fn completions(mut self, store: Arc<dyn CompletionStore>) -> Self {
        self.completions = Some(store);
        self
    }

    /// Optional: venues without auto-tick run on the NoSignals default.
    pub fn signals(mut self, signals: Arc<dyn ActivitySignals>) -> Self {
        self.signals = Some(signals);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Wire everything up. Both stores are required; everything else
    /// defaults (SystemClock, ULID generation over the chosen clock,
    /// NoSignals).
    pub fn build(self) -> Result<Runtime, BuildError> {
        let mut missing = Vec::new();
        if self.definitions.is_none() {
            missing.push("definitions");
        }
        if self.completions.is_none() {
            missing.push("completions");
        }
        if !missing.is_empty() {
            return Err(BuildError::MissingStores(missing));
        }
        // Presence of both stores was just checked.
        let definitions = self.definitions.unwrap();
        let completions = self.completions.unwrap();

        let clock: Arc<dyn Clock> = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let ids: Arc<dyn IdGenerator> = self
            .ids
            .unwrap_or_else(|| Arc::new(UlidGenerator::new(clock.clone())));
        let signals: Arc<dyn ActivitySignals> =
            self.signals.unwrap_or_else(|| Arc::new(NoSignals));

        let tracker = CompletionTracker::new(
            definitions.clone(),
            completions.clone(),
            ids.clone(),
            clock.clone(),
        );
        let correlator = AutoTickCorrelator::new(
            definitions.clone(),
            completions.clone(),
            signals,
            ids.clone(),
            clock.clone(),
        );
        let auditor = SignoffAuditor::new(completions.clone(), clock.clone());

        Ok(Runtime {
            definitions,
            completions,
            clock,
            ids,
            tracker,
            correlator,
            auditor,
        })
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Runtime はエンジン全体の操作窓口
///
/// The surrounding application holds one of these per process and calls
/// it from request handlers and the auto-tick poll. Every method is safe
/// to call concurrently.
pub struct Runtime {
    definitions: Arc<dyn DefinitionStore>,
    completions: Arc<dyn CompletionStore>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    tracker: CompletionTracker,
    correlator: AutoTickCorrelator,
    auditor: SignoffAuditor,
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime").finish_non_exhaustive()
    }
}

impl Runtime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Today per the runtime clock (UTC calendar day).
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // --- definitions ---

    /// Seed the shipped baseline catalog for a venue.
    ///
    /// Refuses with AlreadySeeded when the venue has any active
    /// definitions, so a double-tap on onboarding cannot produce a double
    /// catalog. Callers that really want a second batch add definitions
    /// individually.
    pub async fn seed_defaults(&self, venue: &VenueId) -> Result<Vec<TaskDefinition>, RotaError> {
        if !self.definitions.list_active(venue).await?.is_empty() {
            return Err(RotaError::AlreadySeeded(venue.clone()));
        }

        let now = self.clock.now();
        let mut seeded = Vec::new();
        for spec in catalog::baseline() {
            let definition = TaskDefinition::from_spec(
                self.ids.generate_definition_id(),
                venue.clone(),
                spec,
                now,
            );
            self.definitions.insert(definition.clone()).await?;
            seeded.push(definition);
        }
        info!(
            venue = %venue,
            count = seeded.len(),
            version = catalog::CATALOG_VERSION,
            "baseline catalog seeded"
        );
        Ok(seeded)
    }

    /// Author one definition for a venue.
    pub async fn add_definition(
        &self,
        venue: &VenueId,
        spec: DefinitionSpec,
    ) -> Result<TaskDefinition, RotaError> {
        let definition = TaskDefinition::from_spec(
            self.ids.generate_definition_id(),
            venue.clone(),
            spec,
            self.clock.now(),
        );
        self.definitions.insert(definition.clone()).await?;
        Ok(definition)
    }

    pub async fn definition(
        &self,
        id: &DefinitionId,
    ) -> Result<Option<TaskDefinition>, RotaError> {
        self.definitions.get(id).await
    }

    pub async fn list_active(&self, venue: &VenueId) -> Result<Vec<TaskDefinition>, RotaError> {
        self.definitions.list_active(venue).await
    }

    pub async fn list_all(&self, venue: &VenueId) -> Result<Vec<TaskDefinition>, RotaError> {
        self.definitions.list_all(venue).await
    }

    pub async fn activate(&self, id: &DefinitionId) -> Result<TaskDefinition, RotaError> {
        self.definitions.set_active(id, true, self.clock.now()).await
    }

    pub async fn deactivate(&self, id: &DefinitionId) -> Result<TaskDefinition, RotaError> {
        self.definitions
            .set_active(id, false, self.clock.now())
            .await
    }

    // --- day views ---

    /// The venue's due tasks for `day`, bucketed by shift and
    /// presentation-ordered.
    pub async fn day_board(&self, venue: &VenueId, day: NaiveDate) -> Result<ShiftBoard, RotaError> {
        let active = self.definitions.list_active(venue).await?;
        Ok(bucket_by_shift(due_on(&active, day)))
    }

    /// Done/total for the day, auto-tick aware: resolves satisfied signal
    /// sources first and counts them alongside stored records.
    pub async fn day_status(&self, venue: &VenueId, day: NaiveDate) -> Result<DayStatus, RotaError> {
        let auto_satisfied = self.correlator.resolve(venue, day).await?;
        self.tracker.day_status(venue, day, &auto_satisfied).await
    }

    /// Raw records for a venue-day, ordered by `completed_at`.
    pub async fn day_records(
        &self,
        venue: &VenueId,
        day: NaiveDate,
    ) -> Result<Vec<CompletionRecord>, RotaError> {
        self.completions.list_for_day(venue, day).await
    }

    pub async fn month_records(
        &self,
        venue: &VenueId,
        year: i32,
        month: u32,
    ) -> Result<Vec<CompletionRecord>, RotaError> {
        self.tracker.month_records(venue, year, month).await
    }

    // --- completions ---

    pub async fn record_completion(
        &self,
        definition_id: &DefinitionId,
        day: NaiveDate,
        spec: CompletionSpec,
    ) -> Result<CompletionRecord, RotaError> {
        self.tracker.record(definition_id, day, spec).await
    }

    // --- auto-tick ---

    pub async fn resolve_auto_ticks(
        &self,
        venue: &VenueId,
        day: NaiveDate,
    ) -> Result<HashSet<SourceKey>, RotaError> {
        self.correlator.resolve(venue, day).await
    }

    pub async fn materialize_auto_ticks(
        &self,
        venue: &VenueId,
        day: NaiveDate,
    ) -> Result<Vec<CompletionRecord>, RotaError> {
        self.correlator.materialize(venue, day).await
    }

    // --- sign-off ---

    pub async fn sign_off(
        &self,
        ids: &[CompletionId],
        reviewer: &Actor,
    ) -> Result<SignOffOutcome, RotaError> {
        self.auditor.sign_off(ids, reviewer).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Frequency, Shift, Weekday};
    use crate::impls::{InMemoryCompletionStore, InMemoryDefinitionStore, StaticSignals};
    use crate::ports::FixedClock;
    use chrono::{TimeZone, Utc};

    fn venue() -> VenueId {
        VenueId::new("cafe-001")
    }

    fn clock() -> FixedClock {
        FixedClock::new(Utc.with_ymd_and_hms(2026, 2, 24, 9, 0, 0).unwrap())
    }

    fn runtime_with(signals: Option<Arc<dyn ActivitySignals>>) -> Runtime {
        let mut builder = Runtime::builder()
            .definitions(Arc::new(InMemoryDefinitionStore::new()))
            .completions(Arc::new(InMemoryCompletionStore::new()))
            .clock(Arc::new(clock()));
        if let Some(signals) = signals {
            builder = builder.signals(signals);
        }
        builder.build().expect("runtime builds")
    }

    #[test]
    fn build_without_stores_lists_what_is_missing() {
        let err = Runtime::builder().build().unwrap_err();
        let BuildError::MissingStores(missing) = err;
        assert_eq!(missing, vec!["definitions", "completions"]);

        let err = Runtime::builder()
            .definitions(Arc::new(InMemoryDefinitionStore::new()))
            .build()
            .unwrap_err();
        let BuildError::MissingStores(missing) = err;
        assert_eq!(missing, vec!["completions"]);
    }

    #[tokio::test]
    async fn seed_defaults_populates_once_then_refuses() {
        let runtime = runtime_with(None);

        let seeded = runtime.seed_defaults(&venue()).await.unwrap();
        assert!(seeded.len() >= 25);
        assert_eq!(
            runtime.list_active(&venue()).await.unwrap().len(),
            seeded.len()
        );

        let err = runtime.seed_defaults(&venue()).await.unwrap_err();
        assert!(matches!(err, RotaError::AlreadySeeded(v) if v == venue()));
    }

    #[tokio::test]
    async fn day_board_follows_the_calendar() {
        let runtime = runtime_with(None);
        runtime.seed_defaults(&venue()).await.unwrap();

        // Tuesday: no Thursday tasks anywhere on the board.
        let tuesday = NaiveDate::from_ymd_opt(2026, 2, 24).unwrap();
        let board = runtime.day_board(&venue(), tuesday).await.unwrap();
        assert!(board
            .iter()
            .all(|(_, tasks)| tasks.iter().all(|t| t.name != "Hood and filter degrease")));

        // Thursday: the hood degrease shows up in closing.
        let thursday = NaiveDate::from_ymd_opt(2026, 2, 26).unwrap();
        let board = runtime.day_board(&venue(), thursday).await.unwrap();
        assert!(board
            .tasks(Shift::Closing)
            .iter()
            .any(|t| t.name == "Hood and filter degrease"));
        assert!(!board.is_empty());
    }

    #[tokio::test]
    async fn signal_fact_makes_the_task_done_without_manual_completion() {
        let day = NaiveDate::from_ymd_opt(2026, 2, 24).unwrap();
        let signals =
            StaticSignals::new().with_fact(venue(), SourceKey::new("temp_check"), day);
        let runtime = runtime_with(Some(Arc::new(signals)));

        runtime
            .add_definition(
                &venue(),
                DefinitionSpec::new("Fridge temps", Frequency::Daily, Shift::Opening)
                    .auto_ticked_by(SourceKey::new("temp_check")),
            )
            .await
            .unwrap();

        let resolved = runtime.resolve_auto_ticks(&venue(), day).await.unwrap();
        assert!(resolved.contains(&SourceKey::new("temp_check")));

        // recordCompletion was never called, yet the day reads done.
        let status = runtime.day_status(&venue(), day).await.unwrap();
        assert_eq!(status.done, 1);
        assert_eq!(status.total, 1);
    }

    #[tokio::test]
    async fn activate_deactivate_round_trip_through_the_facade() {
        let runtime = runtime_with(None);
        let def = runtime
            .add_definition(
                &venue(),
                DefinitionSpec::new(
                    "Window boxes watered",
                    Frequency::Weekly {
                        day: Weekday::Friday,
                    },
                    Shift::Opening,
                ),
            )
            .await
            .unwrap();

        let retired = runtime.deactivate(&def.id).await.unwrap();
        assert!(!retired.is_active);
        assert!(runtime.list_active(&venue()).await.unwrap().is_empty());
        assert_eq!(runtime.list_all(&venue()).await.unwrap().len(), 1);

        let restored = runtime.activate(&def.id).await.unwrap();
        assert!(restored.is_active);
        assert_eq!(runtime.list_active(&venue()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn default_signals_answer_nothing() {
        let runtime = runtime_with(None);
        runtime
            .add_definition(
                &venue(),
                DefinitionSpec::new("Fridge temps", Frequency::Daily, Shift::Opening)
                    .auto_ticked_by(SourceKey::new("temp_check")),
            )
            .await
            .unwrap();

        let day = runtime.today();
        assert!(runtime
            .resolve_auto_ticks(&venue(), day)
            .await
            .unwrap()
            .is_empty());
    }
}
