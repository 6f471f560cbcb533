//! Reviewer sign-off over completion records.
//!
//! Sign-off is an audit attestation, not a toggle: it can be granted once
//! per record and never revoked. Batches are best-effort because the
//! reviewing UI may hold stale ids from a list that refreshed underneath
//! the selection.

use std::sync::Arc;

use tracing::info;

use crate::domain::{Actor, CompletionId, RotaError};
use crate::ports::{Clock, CompletionStore, SignOffOutcome};

pub struct SignoffAuditor {
    completions: Arc<dyn CompletionStore>,
    clock: Arc<dyn Clock>,
}

impl SignoffAuditor {
    pub fn new(completions: Arc<dyn CompletionStore>, clock: Arc<dyn Clock>) -> Self {
        Self { completions, clock }
    }

    /// Attest every record in `ids` that exists and is not yet signed off.
    ///
    /// Already-signed records keep their original reviewer and timestamp.
    /// Ids that do not exist are skipped; the call only fails with
    /// CompletionsNotFound when a non-empty batch matches nothing at all.
    /// An empty batch is a no-op.
    pub async fn sign_off(
        &self,
        ids: &[CompletionId],
        reviewer: &Actor,
    ) -> Result<SignOffOutcome, RotaError> {
        if ids.is_empty() {
            return Ok(SignOffOutcome {
                matched: 0,
                newly_signed: 0,
            });
        }

        let outcome = self
            .completions
            .sign_off(ids, reviewer, self.clock.now())
            .await?;
        if outcome.matched == 0 {
            return Err(RotaError::CompletionsNotFound(ids.len()));
        }

        info!(
            reviewer = %reviewer,
            supplied = ids.len(),
            matched = outcome.matched,
            newly_signed = outcome.newly_signed,
            "sign-off batch applied"
        );
        Ok(outcome)
    }
}
