//! In-memory definition store (tests and embedded use).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::{DefinitionId, RotaError, TaskDefinition, VenueId};
use crate::ports::DefinitionStore;

/// HashMap-backed DefinitionStore. Clone shares the underlying map.
#[derive(Clone, Default)]
pub struct InMemoryDefinitionStore {
    rows: Arc<Mutex<HashMap<DefinitionId, TaskDefinition>>>,
}

impl InMemoryDefinitionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn catalog_order(rows: &mut [TaskDefinition]) {
    // sort_order first, name as a stable human-readable tiebreak.
    rows.sort_by(|a, b| {
        a.sort_order
            .cmp(&b.sort_order)
            .then_with(|| a.name.cmp(&b.name))
    });
}

#[async_trait]
impl DefinitionStore for InMemoryDefinitionStore {
    async fn insert(&self, definition: TaskDefinition) -> Result<(), RotaError> {
        let mut rows = self.rows.lock().await;
        if rows.contains_key(&definition.id) {
            return Err(RotaError::store(format!(
                "duplicate definition id {}",
                definition.id
            )));
        }
        rows.insert(definition.id, definition);
        Ok(())
    }

    async fn get(&self, id: &DefinitionId) -> Result<Option<TaskDefinition>, RotaError> {
        Ok(self.rows.lock().await.get(id).cloned())
    }

    async fn list_active(&self, venue: &VenueId) -> Result<Vec<TaskDefinition>, RotaError> {
        let rows = self.rows.lock().await;
        let mut out: Vec<TaskDefinition> = rows
            .values()
            .filter(|d| &d.venue_id == venue && d.is_active)
            .cloned()
            .collect();
        drop(rows);
        catalog_order(&mut out);
        Ok(out)
    }

    async fn list_all(&self, venue: &VenueId) -> Result<Vec<TaskDefinition>, RotaError> {
        let rows = self.rows.lock().await;
        let mut out: Vec<TaskDefinition> = rows
            .values()
            .filter(|d| &d.venue_id == venue)
            .cloned()
            .collect();
        drop(rows);
        catalog_order(&mut out);
        Ok(out)
    }

    async fn set_active(
        &self,
        id: &DefinitionId,
        active: bool,
        at: DateTime<Utc>,
    ) -> Result<TaskDefinition, RotaError> {
        let mut rows = self.rows.lock().await;
        let definition = rows
            .get_mut(id)
            .ok_or(RotaError::DefinitionNotFound(*id))?;
        definition.set_active(active, at);
        Ok(definition.clone())
    }
}
