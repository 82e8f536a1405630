//! Which routines fall on a given calendar date.
//!
//! All arithmetic is on whole days (`NaiveDate`); time of day never takes
//! part in a date comparison. Monthly routines are not clamped to the end of
//! short months, so a routine anchored on the 31st skips every month without
//! a 31st.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};

use super::routine::{Collection, Frequency, Routine};

/// Signed whole-day distance from the anchor to `date`.
pub(crate) fn days_since_start(routine: &Routine, date: NaiveDate) -> i64 {
    (date - routine.start_date).num_days()
}

pub(crate) fn on_weekly_cycle(routine: &Routine, date: NaiveDate) -> bool {
    days_since_start(routine, date).rem_euclid(7) == 0
}

pub(crate) fn on_monthly_anchor(routine: &Routine, date: NaiveDate) -> bool {
    date.day() == routine.start_date.day()
}

/// Whether `routine` produces an occurrence on `date`.
pub fn occurs_on(routine: &Routine, date: NaiveDate) -> bool {
    match routine.frequency {
        Frequency::Once => routine.once_dates.contains(&date),
        Frequency::Daily => date >= routine.start_date,
        Frequency::Weekly => date >= routine.start_date && on_weekly_cycle(routine, date),
        Frequency::Monthly => date >= routine.start_date && on_monthly_anchor(routine, date),
    }
}

/// Occurrences on `date`, ascending by time. Equal times keep collection order.
pub fn resolve_occurrences(date: NaiveDate, collection: &Collection) -> Vec<&Routine> {
    let mut matches: Vec<&Routine> = collection.iter().filter(|r| occurs_on(r, date)).collect();
    matches.sort_by_key(|r| r.time);
    matches
}

/// Days of `year`/`month` carrying at least one occurrence.
pub fn occurrence_days(year: i32, month: u32, collection: &Collection) -> HashSet<u32> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return HashSet::new();
    };
    first
        .iter_days()
        .take_while(|d| d.month() == month)
        .filter(|d| collection.iter().any(|r| occurs_on(r, *d)))
        .map(|d| d.day())
        .collect()
}
