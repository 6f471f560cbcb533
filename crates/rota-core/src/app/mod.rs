//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **Runtime / RuntimeBuilder**: エンジンの組み立てと操作窓口
//! - **recurrence**: 頻度 × 日付の判定（純粋関数）
//! - **board**: シフト別のタスクボード構築
//! - **CompletionTracker**: 完了記録と日次ステータス
//! - **AutoTickCorrelator**: 活動ログからの自動完了
//! - **SignoffAuditor**: マネージャーによるサインオフ
//! - **AutoTickLoop**: 自動完了のポーリングループ
//! - **catalog**: 出荷時の基本タスクカタログ

pub mod autotick;
pub mod board;
pub mod catalog;
pub mod poll_loop;
pub mod recurrence;
pub mod runtime;
pub mod signoff;
pub mod tracker;

// 主要な型を再エクスポート
pub use self::autotick::AutoTickCorrelator;
pub use self::board::{bucket_by_shift, ShiftBoard};
pub use self::poll_loop::{AutoTickLoop, DEFAULT_POLL_INTERVAL};
pub use self::recurrence::{due_on, is_due};
pub use self::runtime::{BuildError, Runtime, RuntimeBuilder};
pub use self::signoff::SignoffAuditor;
pub use self::tracker::{CompletionTracker, DayStatus};
