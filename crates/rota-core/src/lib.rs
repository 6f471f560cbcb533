//! rota-core
//!
//! Core building blocks for the Rota compliance-task engine.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, keys, frequency, shift, definition, completion, errors）
//! - **ports**: 抽象化レイヤー（DefinitionStore, CompletionStore, ActivitySignals, Clock, IdGenerator）
//! - **app**: アプリケーションロジック（runtime, recurrence, board, tracker, autotick, signoff, poll_loop）
//! - **impls**: 実装（InMemoryDefinitionStore など開発用。本番ストアは rota-sqlite）

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;
