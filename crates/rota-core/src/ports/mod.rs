//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部システム（バッキングストア、活動ログ、時刻、ID 生成）
//! へのインターフェースを提供し、実装の詳細を隠蔽します。
//!
//! # 設計原則
//! - バッキングストアが source of truth（正本）
//! - 活動ログは read-only の外部事実（このエンジンは所有しない）
//! - 時刻と ID 生成は trait 経由（テストで差し替え可能）

pub mod clock;
pub mod completion_store;
pub mod definition_store;
pub mod id_generator;
pub mod signal_source;

// 主要な trait を再エクスポート
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::completion_store::{CompletionStore, SignOffOutcome};
pub use self::definition_store::DefinitionStore;
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::signal_source::{ActivitySignals, SignalUnavailable};
