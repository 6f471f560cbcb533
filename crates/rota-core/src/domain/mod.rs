//! Domain model (IDs, keys, recurrence rules, records, errors).
//!
//! モジュール構成:
//! - ids / keys: 型安全な識別子
//! - frequency / shift: スケジュール語彙（閉じた enum）
//! - definition / completion: テンプレートと完了ログ
//! - errors: エラー分類

pub mod completion;
pub mod definition;
pub mod errors;
pub mod frequency;
pub mod ids;
pub mod keys;
pub mod shift;

pub use completion::{CompletionRecord, CompletionSpec};
pub use definition::{DefinitionSpec, TaskDefinition};
pub use errors::RotaError;
pub use frequency::{Frequency, Weekday};
pub use ids::{CompletionId, DefinitionId, Id, IdMarker};
pub use keys::{Actor, EvidenceRef, SourceKey, VenueId};
pub use shift::Shift;
