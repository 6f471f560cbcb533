//! Baseline task catalog.
//!
//! The product ships a versioned starter rota for new venues: the daily
//! hygiene set across all three shifts plus the weekly and monthly deep
//! cleans. Venues prune and extend it after seeding; the catalog itself
//! is pure data.

use chrono::NaiveTime;

use crate::domain::{DefinitionSpec, Frequency, Shift, SourceKey, Weekday};

/// Bumped whenever the shipped baseline changes shape or content.
pub const CATALOG_VERSION: u32 = 1;

/// Activity key for temperature log entries recorded by the monitoring
/// subsystem.
pub const SOURCE_TEMP_CHECK: &str = "temp_check";

/// Activity key for goods-receiving entries recorded at the back door.
pub const SOURCE_GOODS_IN: &str = "goods_in";

// All catalog times are literals; from_hms_opt cannot fail for them.
fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

fn weekly(day: Weekday) -> Frequency {
    Frequency::Weekly { day }
}

/// The shipped baseline specs, in seed order.
pub fn baseline() -> Vec<DefinitionSpec> {
    vec![
        // --- opening ---
        DefinitionSpec::new("Walk-in & fridge temperature check", Frequency::Daily, Shift::Opening)
            .in_area("walk-in fridge")
            .at(hm(6, 30))
            .with_method("Record every unit on the temperature log; flag anything above 5°C.")
            .auto_ticked_by(SourceKey::new(SOURCE_TEMP_CHECK))
            .with_sort_order(10),
        DefinitionSpec::new("Freezer temperature check", Frequency::Daily, Shift::Opening)
            .in_area("freezer room")
            .at(hm(6, 35))
            .with_method("All freezers at -18°C or below; defrost anything icing up.")
            .auto_ticked_by(SourceKey::new(SOURCE_TEMP_CHECK))
            .with_sort_order(20),
        DefinitionSpec::new("Handwash stations stocked", Frequency::Daily, Shift::Opening)
            .in_area("kitchen")
            .with_method("Soap, blue roll and hot water at every station.")
            .with_sort_order(30),
        DefinitionSpec::new("Sanitizer concentration check", Frequency::Daily, Shift::Opening)
            .in_area("kitchen")
            .at(hm(7, 0))
            .with_method("Test with a strip; 200ppm quat or per product label.")
            .with_reading_required()
            .with_sort_order(40),
        DefinitionSpec::new("Surfaces sanitized before prep", Frequency::Daily, Shift::Opening)
            .in_area("prep benches")
            .with_method("Two-stage clean on every food contact surface.")
            .with_sort_order(50),
        DefinitionSpec::new("Date checks and discards", Frequency::Daily, Shift::Opening)
            .in_area("all storage")
            .with_method("Pull anything past its use-by; log waste as you go.")
            .for_role("kitchen-lead")
            .with_sort_order(60),
        DefinitionSpec::new("Pest activity check", Frequency::Daily, Shift::Opening)
            .in_area("dry store & bin area")
            .with_method("Check traps; look for droppings or gnawing damage.")
            .with_sort_order(70),
        DefinitionSpec::new("Probe thermometer calibration", weekly(Weekday::Monday), Shift::Opening)
            .in_area("kitchen")
            .with_method("Ice-water test; record the offset, replace beyond ±1°C.")
            .with_reading_required()
            .with_sort_order(80),
        DefinitionSpec::new("Allergen matrix review", weekly(Weekday::Wednesday), Shift::Opening)
            .in_area("pass")
            .with_method("Confirm the matrix matches the current menu and supplier subs.")
            .for_role("kitchen-lead")
            .with_sort_order(90),
        DefinitionSpec::new("First-aid and burns kit audit", Frequency::Monthly, Shift::Opening)
            .in_area("office")
            .with_method("Restock against the contents card; check expiry dates.")
            .for_role("kitchen-lead")
            .with_sort_order(100),
        // --- midday ---
        DefinitionSpec::new("Hot-hold temperature check", Frequency::Daily, Shift::Midday)
            .in_area("pass")
            .at(hm(12, 0))
            .with_method("Probe each held item; 63°C minimum, reheat or bin below that.")
            .with_reading_required()
            .with_sort_order(10),
        DefinitionSpec::new("Cold display temperature check", Frequency::Daily, Shift::Midday)
            .in_area("front counter")
            .at(hm(12, 30))
            .with_method("Display units at 5°C or below; note door seals.")
            .with_reading_required()
            .with_sort_order(20),
        DefinitionSpec::new("Goods receiving log review", Frequency::Daily, Shift::Midday)
            .in_area("back door")
            .with_method("Every delivery checked in, probed and chilled promptly.")
            .auto_ticked_by(SourceKey::new(SOURCE_GOODS_IN))
            .with_sort_order(30),
        DefinitionSpec::new("Wiping cloths rotation", Frequency::Daily, Shift::Midday)
            .in_area("kitchen")
            .with_method("Fresh cloths out; used ones to the sanitizer bucket.")
            .with_sort_order(40),
        DefinitionSpec::new("Dishwasher rinse temperature", weekly(Weekday::Thursday), Shift::Midday)
            .in_area("pot wash")
            .with_method("Run a cycle with the gauge; 82°C rinse or test strip.")
            .with_reading_required()
            .with_sort_order(50),
        // --- closing ---
        DefinitionSpec::new("Cooking equipment degreased", Frequency::Daily, Shift::Closing)
            .in_area("line")
            .with_method("Grills, fryers and flat-tops cleaned and wiped down.")
            .with_sort_order(10),
        DefinitionSpec::new("Food wrapped, labelled and dated", Frequency::Daily, Shift::Closing)
            .in_area("walk-in fridge")
            .at(hm(21, 30))
            .with_method("Everything covered, day-dotted and stacked off the floor.")
            .with_sort_order(20),
        DefinitionSpec::new("Floors swept and mopped", Frequency::Daily, Shift::Closing)
            .in_area("kitchen & pot wash")
            .with_method("Move the mats; get under the line and behind bins.")
            .with_sort_order(30),
        DefinitionSpec::new("Bins emptied and area secured", Frequency::Daily, Shift::Closing)
            .in_area("bin area")
            .with_method("Lids closed, area hosed if soiled, gate locked.")
            .with_sort_order(40),
        DefinitionSpec::new("Pot wash cleared and sanitized", Frequency::Daily, Shift::Closing)
            .in_area("pot wash")
            .with_method("Sinks drained and cleaned; machine emptied and left open.")
            .with_sort_order(50),
        DefinitionSpec::new("Gas and appliances shut down", Frequency::Daily, Shift::Closing)
            .in_area("line")
            .at(hm(22, 0))
            .with_method("Valves off, pilots checked, marked sockets off.")
            .for_role("kitchen-lead")
            .with_sort_order(60),
        DefinitionSpec::new("Overnight fridge temperature log", Frequency::Daily, Shift::Closing)
            .in_area("walk-in fridge")
            .at(hm(22, 0))
            .with_method("Final reading on every unit before lights out.")
            .with_reading_required()
            .with_sort_order(70),
        DefinitionSpec::new("Hood and filter degrease", weekly(Weekday::Thursday), Shift::Closing)
            .in_area("extraction hood")
            .with_method("Filters through the dishwasher; hood interior degreased.")
            .with_sort_order(80),
        DefinitionSpec::new("Walk-in deep clean", weekly(Weekday::Monday), Shift::Closing)
            .in_area("walk-in fridge")
            .with_method("Empty a bay at a time; shelves out, seals scrubbed.")
            .with_sort_order(90),
        DefinitionSpec::new("Ice machine clean and sanitize", weekly(Weekday::Tuesday), Shift::Closing)
            .in_area("bar")
            .with_method("Empty, sanitize the bin and scoop, run a flush cycle.")
            .with_sort_order(100),
        DefinitionSpec::new("Dry store shelves and rotation", weekly(Weekday::Friday), Shift::Closing)
            .in_area("dry store")
            .with_method("Wipe shelves; first-in-first-out on all stock.")
            .with_sort_order(110),
        DefinitionSpec::new("Drains and gullies flush", weekly(Weekday::Sunday), Shift::Closing)
            .in_area("kitchen")
            .with_method("Strainers out and cleaned; flush with sanitizer.")
            .with_sort_order(120),
        DefinitionSpec::new("Oven deep clean", Frequency::Monthly, Shift::Closing)
            .in_area("line")
            .with_method("Full strip-down clean of ovens and combi trays.")
            .with_sort_order(130),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn baseline_covers_every_shift() {
        let specs = baseline();
        assert!(specs.len() >= 25, "baseline shrank to {}", specs.len());
        for shift in Shift::ALL {
            assert!(
                specs.iter().any(|s| s.shift == shift),
                "no {shift} tasks in baseline"
            );
        }
    }

    #[test]
    fn baseline_names_are_unique() {
        let specs = baseline();
        let names: HashSet<&str> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names.len(), specs.len());
    }

    #[test]
    fn baseline_includes_weekly_and_monthly_sets() {
        let specs = baseline();
        assert!(specs
            .iter()
            .any(|s| matches!(s.frequency, Frequency::Weekly { .. })));
        assert!(specs.iter().any(|s| s.frequency == Frequency::Monthly));
    }

    #[test]
    fn auto_tick_sources_come_from_the_known_set() {
        let known = [SOURCE_TEMP_CHECK, SOURCE_GOODS_IN];
        for spec in baseline() {
            if let Some(source) = &spec.auto_tick_source {
                assert!(known.contains(&source.as_str()), "unknown source {source}");
            }
        }
    }

    #[test]
    fn reading_tasks_explain_the_measurement_in_method() {
        // Every reading-required task needs instructions staff can follow.
        for spec in baseline() {
            if spec.requires_reading {
                assert!(!spec.method.is_empty(), "{} has no method", spec.name);
            }
        }
    }
}
