//! Impls - 実装（開発用・テスト用）
//!
//! このモジュールには ports の実装を含めます。
//!
//! # 含まれる実装
//! - **InMemoryDefinitionStore / InMemoryCompletionStore**: テストと組み込み用
//! - **NoSignals / StaticSignals / FailingSignals**: 活動ログの簡易アダプタ
//!
//! # 本番用実装
//! 本番用のストア実装は別クレートに配置します：
//! - `rota-sqlite`: SqliteStore（DefinitionStore + CompletionStore）

pub mod inmem_completions;
pub mod inmem_definitions;
pub mod signals;

// 主要な型を再エクスポート
pub use self::inmem_completions::InMemoryCompletionStore;
pub use self::inmem_definitions::InMemoryDefinitionStore;
pub use self::signals::{FailingSignals, NoSignals, StaticSignals};
