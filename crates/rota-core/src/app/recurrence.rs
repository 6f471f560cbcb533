//! Due-date evaluation.
//!
//! Pure functions: no I/O, no clock access, no side effects. Callers pass
//! the calendar date in. A retired definition is never due, so history
//! screens can evaluate old dates against the full catalog safely.

use chrono::{Datelike, NaiveDate};

use crate::domain::{Frequency, TaskDefinition, Weekday};

/// Is `definition` due on `date`?
///
/// - daily: every date
/// - weekly: the date's weekday equals the definition's day
/// - monthly: the first of the month (a mid-month seed waits for the next
///   natural occurrence rather than firing immediately)
pub fn is_due(definition: &TaskDefinition, date: NaiveDate) -> bool {
    if !definition.is_active {
        return false;
    }
    match definition.frequency {
        Frequency::Daily => true,
        Frequency::Weekly { day } => Weekday::from_date(date) == day,
        Frequency::Monthly => date.day() == 1,
    }
}

/// Filter `definitions` down to the ones due on `date`, preserving input
/// order.
pub fn due_on(definitions: &[TaskDefinition], date: NaiveDate) -> Vec<TaskDefinition> {
    definitions
        .iter()
        .filter(|definition| is_due(definition, date))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DefinitionId, DefinitionSpec, Shift, VenueId};
    use chrono::{DateTime, Utc};
    use rstest::rstest;
    use ulid::Ulid;

    fn definition(frequency: Frequency) -> TaskDefinition {
        let now = DateTime::parse_from_rfc3339("2026-01-05T07:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        TaskDefinition::from_spec(
            DefinitionId::from_ulid(Ulid::new()),
            VenueId::new("cafe-001"),
            DefinitionSpec::new("Hood degrease", frequency, Shift::Closing),
            now,
        )
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case::weekday(date(2026, 2, 24))]
    #[case::weekend(date(2026, 2, 28))]
    #[case::month_start(date(2026, 3, 1))]
    #[case::leap_day(date(2028, 2, 29))]
    fn daily_tasks_are_due_every_date(#[case] on: NaiveDate) {
        assert!(is_due(&definition(Frequency::Daily), on));
    }

    #[test]
    fn weekly_thursday_is_due_exactly_once_in_a_week() {
        let def = definition(Frequency::Weekly {
            day: Weekday::Thursday,
        });

        // Week of Monday 2026-02-23 through Sunday 2026-03-01.
        let week = (0..7).map(|offset| date(2026, 2, 23) + chrono::Duration::days(offset));
        let due: Vec<NaiveDate> = week.filter(|d| is_due(&def, *d)).collect();

        assert_eq!(due, vec![date(2026, 2, 26)]);
    }

    #[rstest]
    #[case::sunday(Weekday::Sunday, date(2026, 3, 1))]
    #[case::monday(Weekday::Monday, date(2026, 2, 23))]
    #[case::saturday(Weekday::Saturday, date(2026, 2, 28))]
    fn weekly_tasks_follow_their_declared_day(#[case] day: Weekday, #[case] expected: NaiveDate) {
        let def = definition(Frequency::Weekly { day });
        for offset in 0..7 {
            let on = date(2026, 2, 23) + chrono::Duration::days(offset);
            assert_eq!(is_due(&def, on), on == expected, "offset {offset}");
        }
    }

    #[rstest]
    #[case::first_true(date(2026, 2, 1), true)]
    #[case::second_false(date(2026, 2, 2), false)]
    #[case::mid_month_false(date(2026, 2, 15), false)]
    #[case::last_false(date(2026, 2, 28), false)]
    #[case::next_first_true(date(2026, 3, 1), true)]
    fn monthly_tasks_are_due_on_the_first_only(#[case] on: NaiveDate, #[case] expected: bool) {
        assert_eq!(is_due(&definition(Frequency::Monthly), on), expected);
    }

    #[test]
    fn retired_definitions_are_never_due() {
        let mut def = definition(Frequency::Daily);
        def.set_active(false, def.created_at + chrono::Duration::days(1));
        assert!(!is_due(&def, date(2026, 2, 24)));
    }

    #[test]
    fn due_on_preserves_input_order() {
        let daily_a = definition(Frequency::Daily);
        let thursday = definition(Frequency::Weekly {
            day: Weekday::Thursday,
        });
        let daily_b = definition(Frequency::Daily);
        let defs = vec![daily_a.clone(), thursday, daily_b.clone()];

        // 2026-02-24 is a Tuesday: the Thursday task drops out.
        let due = due_on(&defs, date(2026, 2, 24));
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].id, daily_a.id);
        assert_eq!(due[1].id, daily_b.id);
    }
}
