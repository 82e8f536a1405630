//! Edit/delete eligibility for a routine on the selected date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::MutationNotPermitted;

use super::recurrence::{occurs_on, on_monthly_anchor, on_weekly_cycle};
use super::routine::{Frequency, Routine};

/// How strictly the gate ties mutation to actual occurrences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationPolicy {
    /// `Once` is always mutable; weekly and monthly routines are mutable on
    /// any cycle day, including days before the anchor date.
    #[default]
    Compatible,
    /// Mutable exactly on the days the routine occurs.
    Strict,
}

impl MutationPolicy {
    pub fn permits(self, date: NaiveDate, routine: &Routine) -> bool {
        match self {
            MutationPolicy::Compatible => match routine.frequency {
                Frequency::Once => true,
                Frequency::Daily => date >= routine.start_date,
                Frequency::Weekly => on_weekly_cycle(routine, date),
                Frequency::Monthly => on_monthly_anchor(routine, date),
            },
            MutationPolicy::Strict => occurs_on(routine, date),
        }
    }
}

/// Gate decision under the default policy.
pub fn can_mutate(date: NaiveDate, routine: &Routine) -> bool {
    MutationPolicy::Compatible.permits(date, routine)
}

pub fn ensure_mutable(
    policy: MutationPolicy,
    date: NaiveDate,
    routine: &Routine,
) -> Result<(), MutationNotPermitted> {
    if policy.permits(date, routine) {
        Ok(())
    } else {
        Err(MutationNotPermitted {
            id: routine.id,
            frequency: routine.frequency,
            date,
        })
    }
}
