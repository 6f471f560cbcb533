//! rota-sqlite
//!
//! SQLite-backed production stores for the Rota engine.
//!
//! # モジュール構成
//! - **schema**: DDL とスキーマバージョン管理
//! - **store**: `SqliteStore`（DefinitionStore / CompletionStore の実装）
//!
//! 単一ファイルの SQLite が venue 数百規模までの想定負荷を十分に捌くため、
//! 本番ストアはこのクレートに置き、rota-core 側はポートだけを知ります。

mod schema;
mod store;

pub use schema::CURRENT_SCHEMA_VERSION;
pub use store::SqliteStore;
