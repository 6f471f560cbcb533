//! ActivitySignals port - 外部アクティビティログへの読み取り専用窓
//!
//! 温度記録や納品記録など、別サブシステムが持つ事実を
//! 「venue V で day D に activity X が起きたか」という bool だけに絞って
//! 参照します。pull 型で、イベント購読はしません。

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{RotaError, SourceKey, VenueId};

/// The signal source could not answer. The correlator downgrades this to
/// "assume not satisfied" and logs it; it never reaches callers unless a
/// caller queries the port directly.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct SignalUnavailable(pub String);

/// Promotion for callers that query the port directly instead of going
/// through the correlator.
impl From<SignalUnavailable> for RotaError {
    fn from(error: SignalUnavailable) -> Self {
        RotaError::SignalUnavailable(error.0)
    }
}

/// ActivitySignals は外部アクティビティの発生事実を返す
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数スレッドから使える）
#[async_trait]
pub trait ActivitySignals: Send + Sync {
    /// Did activity `key` occur for `venue` on `day`?
    async fn occurred(
        &self,
        venue: &VenueId,
        key: &SourceKey,
        day: NaiveDate,
    ) -> Result<bool, SignalUnavailable>;
}
