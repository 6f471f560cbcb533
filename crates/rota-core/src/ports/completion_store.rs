//! CompletionStore port - 完了ログの永続化
//!
//! # 設計原則
//! - 追記専用。既存レコードの上書き・削除は API に存在しない
//! - 唯一の「拡張」は sign-off フィールドの単調な付与
//! - auto レコードの重複排除はストア側でアトミックに行う
//!   （check-then-insert を呼び出し側に任せると並行ポーリングで競合する）

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Actor, CompletionId, CompletionRecord, DefinitionId, RotaError, VenueId};

/// Result of a batch sign-off pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignOffOutcome {
    /// How many of the supplied ids exist.
    pub matched: usize,
    /// How many records were signed off by this call (previously unsigned).
    pub newly_signed: usize,
}

/// CompletionStore は完了レコードの追記専用ログを所有
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数スレッドから使える）
#[async_trait]
pub trait CompletionStore: Send + Sync {
    /// Append one record. Never overwrites; duplicate (task, day) manual
    /// records are legitimate and all retained.
    async fn append(&self, record: CompletionRecord) -> Result<(), RotaError>;

    /// Records for one venue-day, ordered by `completed_at`.
    async fn list_for_day(
        &self,
        venue: &VenueId,
        day: NaiveDate,
    ) -> Result<Vec<CompletionRecord>, RotaError>;

    /// Records with `day` in `[from, to]` inclusive, ordered by
    /// `completed_at`. Calendar and report views use this.
    async fn list_range(
        &self,
        venue: &VenueId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CompletionRecord>, RotaError>;

    /// Insert a synthetic (`is_auto`) record unless one already exists for
    /// the same (definition, day). Returns true when the record was
    /// inserted. Must be atomic within the store, so repeated or
    /// concurrent polling can never produce two auto records for one
    /// task-day.
    async fn append_auto_once(&self, record: CompletionRecord) -> Result<bool, RotaError>;

    /// Set the sign-off pair on every matched record whose sign-off is
    /// still null. Already-signed records keep their original reviewer and
    /// timestamp. Unknown ids are counted out via `matched`, not errors;
    /// the auditor decides when an all-miss batch becomes NotFound.
    async fn sign_off(
        &self,
        ids: &[CompletionId],
        reviewer: &Actor,
        at: DateTime<Utc>,
    ) -> Result<SignOffOutcome, RotaError>;

    /// Records for one definition-day regardless of `is_auto`, ordered by
    /// `completed_at`. Drill-down views use this.
    async fn list_for_definition_day(
        &self,
        definition: &DefinitionId,
        day: NaiveDate,
    ) -> Result<Vec<CompletionRecord>, RotaError>;
}
