//! Error taxonomy.
//!
//! # エラー分類
//! - **Configuration**: 永続化された定義が壊れている（未知の頻度など）。
//!   即時に表面化し、暗黙の補正はしない。
//! - **Validation**: 呼び出し側の入力が業務ルールに反する。レコードは
//!   一切書き込まれない。
//! - **DefinitionNotFound / CompletionsNotFound**: 参照された ID が存在しない。
//! - **AlreadySeeded**: venue に既にアクティブなカタログがある。
//! - **SignalUnavailable**: 外部アクティビティソースに到達できない。
//!   通常は correlator 内部で握りつぶされ、ここまで昇格するのは
//!   呼び出し側が明示的に変換した場合のみ。
//! - **Store**: バッキングストアの I/O 障害。

use thiserror::Error;

use super::ids::DefinitionId;
use super::keys::VenueId;

#[derive(Debug, Error)]
pub enum RotaError {
    #[error("configuration: {0}")]
    Configuration(String),

    #[error("validation: {0}")]
    Validation(String),

    #[error("task definition not found: {0}")]
    DefinitionNotFound(DefinitionId),

    #[error("no completion records matched any of the {0} supplied ids")]
    CompletionsNotFound(usize),

    #[error("venue {0} already has active task definitions")]
    AlreadySeeded(VenueId),

    #[error("activity signal source unavailable: {0}")]
    SignalUnavailable(String),

    #[error("store: {0}")]
    Store(String),
}

impl RotaError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_lowercase_and_specific() {
        let err = RotaError::validation("reading required");
        assert_eq!(err.to_string(), "validation: reading required");

        let err = RotaError::AlreadySeeded(VenueId::new("cafe-001"));
        assert_eq!(
            err.to_string(),
            "venue cafe-001 already has active task definitions"
        );

        let err = RotaError::CompletionsNotFound(3);
        assert_eq!(
            err.to_string(),
            "no completion records matched any of the 3 supplied ids"
        );
    }
}
