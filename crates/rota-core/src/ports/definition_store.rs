//! DefinitionStore port - タスク定義カタログの永続化
//!
//! # 設計原則
//! - 定義は追記 + is_active トグルのみ（削除は公開しない）
//! - 一覧系は sort_order 順で返す
//! - 壊れた行は一覧では skip-and-log、単一取得では Configuration エラー

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{DefinitionId, RotaError, TaskDefinition, VenueId};

/// DefinitionStore は venue ごとのタスク定義カタログを所有
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数スレッドから使える）
#[async_trait]
pub trait DefinitionStore: Send + Sync {
    /// Append a new definition. IDs are assigned by the caller through the
    /// IdGenerator port, so stores never mint identity.
    async fn insert(&self, definition: TaskDefinition) -> Result<(), RotaError>;

    async fn get(&self, id: &DefinitionId) -> Result<Option<TaskDefinition>, RotaError>;

    /// Active definitions for a venue, ordered by `sort_order` (name as a
    /// stable tiebreak). Malformed persisted rows are skipped and logged so
    /// one bad definition never hides the rest of the day's catalog.
    async fn list_active(&self, venue: &VenueId) -> Result<Vec<TaskDefinition>, RotaError>;

    /// Every definition for a venue including retired ones, same ordering.
    /// History and admin views use this.
    async fn list_all(&self, venue: &VenueId) -> Result<Vec<TaskDefinition>, RotaError>;

    /// Toggle `is_active`, stamping `updated_at = at` on an actual change.
    /// Idempotent; errors with DefinitionNotFound when the id does not
    /// exist. Returns the definition as stored afterwards. Stores take the
    /// timestamp as an argument so they stay clock-free.
    async fn set_active(
        &self,
        id: &DefinitionId,
        active: bool,
        at: DateTime<Utc>,
    ) -> Result<TaskDefinition, RotaError>;
}
