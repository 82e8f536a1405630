use chrono::{Datelike, Duration, NaiveDate};
use proptest::prelude::*;
use routine_tui::routine::{
    can_mutate, occurs_on, resolve_occurrences, validate, Collection, Frequency, MemoryStore,
    MutationPolicy, Routine, RoutineDraft, RoutineStore,
};
use routine_tui::ValidationError;

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn single(frequency: &str, start: NaiveDate) -> Routine {
    let mut c = Collection::new();
    let id = c.add(
        validate(&RoutineDraft::new("08:00", "r", frequency)).unwrap(),
        start,
    );
    c.get(id).unwrap().clone()
}

/// Dates between 2000 and roughly 2040.
fn any_date() -> impl Strategy<Value = NaiveDate> {
    (0i64..15_000).prop_map(|offset| date("2000-01-01") + Duration::days(offset))
}

proptest! {
    #[test]
    fn daily_occurs_exactly_from_start(start in any_date(), day in any_date()) {
        let r = single("daily", start);
        prop_assert_eq!(occurs_on(&r, day), day >= start);
    }

    #[test]
    fn weekly_occurs_every_seventh_day(start in any_date(), offset in -400i64..400) {
        let r = single("weekly", start);
        let day = start + Duration::days(offset);
        prop_assert_eq!(occurs_on(&r, day), offset >= 0 && offset % 7 == 0);
    }

    #[test]
    fn monthly_matches_anchor_day_without_clamping(start in any_date(), day in any_date()) {
        let r = single("monthly", start);
        prop_assert_eq!(occurs_on(&r, day), day >= start && day.day() == start.day());
    }

    #[test]
    fn compatible_gate_on_cycle_ignores_lower_bound(start in any_date(), weeks in -50i64..50) {
        let r = single("weekly", start);
        let day = start + Duration::weeks(weeks);
        prop_assert!(can_mutate(day, &r));
        prop_assert_eq!(MutationPolicy::Strict.permits(day, &r), weeks >= 0);
    }

    #[test]
    fn resolve_is_stable_for_equal_times(n in 1usize..12, day in any_date()) {
        let mut c = Collection::new();
        for i in 0..n {
            c.add(
                validate(&RoutineDraft::new("12:00", format!("r{i}"), "daily")).unwrap(),
                date("2000-01-01"),
            );
        }
        let first: Vec<String> = resolve_occurrences(day, &c).iter().map(|r| r.content.clone()).collect();
        let second: Vec<String> = resolve_occurrences(day, &c).iter().map(|r| r.content.clone()).collect();
        let expected: Vec<String> = (0..n).map(|i| format!("r{i}")).collect();
        prop_assert_eq!(&first, &expected);
        prop_assert_eq!(first, second);
    }
}

#[test]
fn monthly_on_31st_over_a_year() {
    let r = single("monthly", date("2024-01-31"));
    let mut day = date("2024-01-31");
    let mut hits = Vec::new();
    while day < date("2025-01-01") {
        if occurs_on(&r, day) {
            hits.push(day.month());
        }
        day += Duration::days(1);
    }
    assert_eq!(hits, [1, 3, 5, 7, 8, 10, 12]);
}

#[test]
fn once_and_daily_tie_scenario() {
    let store = MemoryStore::with_document(
        r#"{"routines": [
            {"time": "09:00", "content": "A", "frequency": "once", "start_date": "2024-05-01", "dates": ["2024-05-01"]},
            {"time": "09:00", "content": "B", "frequency": "daily", "start_date": "2024-04-20"}
        ], "repeating_routines": []}"#,
    );
    let c = store.load().unwrap();
    let names: Vec<&str> = resolve_occurrences(date("2024-05-01"), &c)
        .iter()
        .map(|r| r.content.as_str())
        .collect();
    assert_eq!(names, ["A", "B"]);
}

#[test]
fn weekly_scenario() {
    let mut c = Collection::new();
    c.add(
        validate(&RoutineDraft::new("10:00", "W", "weekly")).unwrap(),
        date("2024-05-01"),
    );
    assert_eq!(resolve_occurrences(date("2024-05-08"), &c).len(), 1);
    assert!(resolve_occurrences(date("2024-05-07"), &c).is_empty());
}

#[test]
fn gate_and_validation_scenarios() {
    let daily = single("daily", date("2024-04-20"));
    assert!(can_mutate(date("2024-04-25"), &daily));
    assert_eq!(
        validate(&RoutineDraft::new("9:00", "x", "daily")),
        Err(ValidationError::InvalidTimeFormat("9:00".into()))
    );
}

#[test]
fn delete_saves_reduced_collection() {
    let store = MemoryStore::new();
    let mut c = store.load().unwrap();
    let keep = c.add(
        validate(&RoutineDraft::new("07:00", "keep", "daily")).unwrap(),
        date("2024-05-01"),
    );
    let gone = c.add(
        validate(&RoutineDraft::new("08:00", "gone", "daily")).unwrap(),
        date("2024-05-01"),
    );
    store.save(&c).unwrap();

    c.remove(gone).unwrap();
    store.save(&c).unwrap();
    assert_eq!(store.save_count(), 2);

    let reloaded = store.load().unwrap();
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded.routines()[0].content, "keep");
    assert_eq!(c.get(keep).map(|r| r.frequency), Some(Frequency::Daily));
    assert!(resolve_occurrences(date("2024-06-01"), &reloaded)
        .iter()
        .all(|r| r.content != "gone"));
}
