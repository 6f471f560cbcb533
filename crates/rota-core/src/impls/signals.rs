//! Trivial ActivitySignals adapters.
//!
//! Production deployments adapt the real activity subsystems behind the
//! port; these cover venues without correlation, demos and tests.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{SourceKey, VenueId};
use crate::ports::{ActivitySignals, SignalUnavailable};

/// Answers "did not occur" for everything. The builder default for venues
/// that do not use auto-tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSignals;

#[async_trait]
impl ActivitySignals for NoSignals {
    async fn occurred(
        &self,
        _venue: &VenueId,
        _key: &SourceKey,
        _day: NaiveDate,
    ) -> Result<bool, SignalUnavailable> {
        Ok(false)
    }
}

/// Fixed fact set, built up front. Demos and tests seed the facts they
/// need; anything absent simply did not occur.
#[derive(Debug, Clone, Default)]
pub struct StaticSignals {
    facts: HashSet<(VenueId, SourceKey, NaiveDate)>,
}

impl StaticSignals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fact(mut self, venue: VenueId, key: SourceKey, day: NaiveDate) -> Self {
        self.facts.insert((venue, key, day));
        self
    }
}

#[async_trait]
impl ActivitySignals for StaticSignals {
    async fn occurred(
        &self,
        venue: &VenueId,
        key: &SourceKey,
        day: NaiveDate,
    ) -> Result<bool, SignalUnavailable> {
        Ok(self
            .facts
            .contains(&(venue.clone(), key.clone(), day)))
    }
}

/// Always unavailable. Exercises the correlator's downgrade path.
#[derive(Debug, Clone)]
pub struct FailingSignals {
    message: String,
}

impl FailingSignals {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl ActivitySignals for FailingSignals {
    async fn occurred(
        &self,
        _venue: &VenueId,
        _key: &SourceKey,
        _day: NaiveDate,
    ) -> Result<bool, SignalUnavailable> {
        Err(SignalUnavailable(self.message.clone()))
    }
}
