//! Task definitions (recurring compliance task templates).

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::frequency::Frequency;
use super::ids::DefinitionId;
use super::keys::{SourceKey, VenueId};
use super::shift::Shift;

/// A recurring compliance task template for one venue.
///
/// Definitions are append-only: retiring a task flips `is_active` off so
/// historical completion records stay attributable. There is no delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDefinition {
    pub id: DefinitionId,
    pub venue_id: VenueId,
    pub name: String,
    /// Free-form location tag ("walk-in fridge", "pot wash").
    pub area: String,
    pub frequency: Frequency,
    pub shift: Shift,
    /// Target time of day within the shift, if the task has one.
    pub scheduled_time: Option<NaiveTime>,
    /// Free-text instructions shown to staff.
    pub method: String,
    /// True when a numeric reading (ppm, temperature) must be supplied
    /// before the task can be marked complete.
    pub requires_reading: bool,
    /// Free-form role name, or "any".
    pub responsible_role: String,
    /// Activity-type key whose external log satisfies this task, if any.
    pub auto_tick_source: Option<SourceKey>,
    /// Presentation order within the shift. Not required to be unique.
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskDefinition {
    pub fn from_spec(
        id: DefinitionId,
        venue_id: VenueId,
        spec: DefinitionSpec,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            venue_id,
            name: spec.name,
            area: spec.area,
            frequency: spec.frequency,
            shift: spec.shift,
            scheduled_time: spec.scheduled_time,
            method: spec.method,
            requires_reading: spec.requires_reading,
            responsible_role: spec.responsible_role,
            auto_tick_source: spec.auto_tick_source,
            sort_order: spec.sort_order,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Toggle visibility for due-date computation. Returns false when the
    /// flag already had the requested value (idempotent; `updated_at` is
    /// only touched on an actual change).
    pub fn set_active(&mut self, active: bool, at: DateTime<Utc>) -> bool {
        if self.is_active == active {
            return false;
        }
        self.is_active = active;
        self.updated_at = at;
        true
    }
}

/// Input shape for authoring a definition. Everything the caller may omit
/// carries a serde default so catalogs and API payloads stay terse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefinitionSpec {
    pub name: String,
    #[serde(default)]
    pub area: String,
    pub frequency: Frequency,
    pub shift: Shift,
    #[serde(default)]
    pub scheduled_time: Option<NaiveTime>,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub requires_reading: bool,
    #[serde(default = "DefinitionSpec::default_role")]
    pub responsible_role: String,
    #[serde(default)]
    pub auto_tick_source: Option<SourceKey>,
    #[serde(default)]
    pub sort_order: i32,
}

impl DefinitionSpec {
    pub fn new(name: impl Into<String>, frequency: Frequency, shift: Shift) -> Self {
        Self {
            name: name.into(),
            area: String::new(),
            frequency,
            shift,
            scheduled_time: None,
            method: String::new(),
            requires_reading: false,
            responsible_role: Self::default_role(),
            auto_tick_source: None,
            sort_order: 0,
        }
    }

    fn default_role() -> String {
        "any".to_string()
    }

    pub fn in_area(mut self, area: impl Into<String>) -> Self {
        self.area = area.into();
        self
    }

    pub fn at(mut self, time: NaiveTime) -> Self {
        self.scheduled_time = Some(time);
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_reading_required(mut self) -> Self {
        self.requires_reading = true;
        self
    }

    pub fn for_role(mut self, role: impl Into<String>) -> Self {
        self.responsible_role = role.into();
        self
    }

    pub fn auto_ticked_by(mut self, source: SourceKey) -> Self {
        self.auto_tick_source = Some(source);
        self
    }

    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ulid::Ulid;

    fn fixed_now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-02-20T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn from_spec_starts_active_with_matching_timestamps() {
        let spec = DefinitionSpec::new(
            "Sanitizer concentration check",
            Frequency::Daily,
            Shift::Opening,
        )
        .with_reading_required()
        .with_sort_order(40);

        let def = TaskDefinition::from_spec(
            DefinitionId::from_ulid(Ulid::new()),
            VenueId::new("cafe-001"),
            spec,
            fixed_now(),
        );

        assert!(def.is_active);
        assert!(def.requires_reading);
        assert_eq!(def.created_at, def.updated_at);
        assert_eq!(def.responsible_role, "any");
    }

    #[test]
    fn set_active_is_idempotent_and_touches_updated_at_on_change() {
        let spec = DefinitionSpec::new("Pest check", Frequency::Daily, Shift::Opening);
        let mut def = TaskDefinition::from_spec(
            DefinitionId::from_ulid(Ulid::new()),
            VenueId::new("cafe-001"),
            spec,
            fixed_now(),
        );

        let later = fixed_now() + chrono::Duration::hours(1);
        assert!(def.set_active(false, later));
        assert!(!def.is_active);
        assert_eq!(def.updated_at, later);

        // Repeating the same toggle changes nothing.
        let even_later = later + chrono::Duration::hours(1);
        assert!(!def.set_active(false, even_later));
        assert_eq!(def.updated_at, later);
    }

    #[test]
    fn spec_deserializes_with_defaults() {
        let json = r#"
        {
          "name": "Hood degrease",
          "frequency": { "kind": "weekly", "day": "thursday" },
          "shift": "closing"
        }"#;
        let spec: DefinitionSpec = serde_json::from_str(json).expect("deserialize");
        assert_eq!(spec.responsible_role, "any");
        assert_eq!(spec.sort_order, 0);
        assert!(spec.scheduled_time.is_none());
        assert!(!spec.requires_reading);
    }
}
