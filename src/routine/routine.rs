use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{RoutineError, RoutineResult, ValidationError};

/// Session-scoped identity of a routine. Assigned by [`Collection`] on load
/// or insert and never written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoutineId(pub u64);

impl fmt::Display for RoutineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Once,
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub const ALL: [Frequency; 4] = [
        Frequency::Once,
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Monthly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Once => "once",
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }

    /// Next value in form-cycling order, wrapping around.
    pub fn next(&self) -> Self {
        match self {
            Frequency::Once => Frequency::Daily,
            Frequency::Daily => Frequency::Weekly,
            Frequency::Weekly => Frequency::Monthly,
            Frequency::Monthly => Frequency::Once,
        }
    }

    pub fn is_periodic(&self) -> bool {
        !matches!(self, Frequency::Once)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = ValidationError;

    /// Exact, case-sensitive match on the stored labels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Frequency::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidFrequency(s.to_string()))
    }
}

/// Wall-clock time of day, always `HH:MM` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoutineTime(NaiveTime);

impl RoutineTime {
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(RoutineTime)
    }

    pub fn as_naive(&self) -> NaiveTime {
        self.0
    }
}

impl FromStr for RoutineTime {
    type Err = ValidationError;

    /// Strict `HH:MM`: zero-padded, 24-hour, nothing else around it.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidTimeFormat(s.to_string());
        let bytes = s.as_bytes();
        if bytes.len() != 5 || bytes[2] != b':' {
            return Err(invalid());
        }
        let digits = [bytes[0], bytes[1], bytes[3], bytes[4]];
        if !digits.iter().all(u8::is_ascii_digit) {
            return Err(invalid());
        }
        let [h1, h2, m1, m2] = digits.map(|b| u32::from(b - b'0'));
        RoutineTime::from_hm(h1 * 10 + h2, m1 * 10 + m2).ok_or_else(invalid)
    }
}

impl RoutineTime {
    /// Looser `H:M` form found in older data files: one or two digits on
    /// each side of the colon. Entry points still go through `FromStr`.
    pub fn parse_stored(s: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidTimeFormat(s.to_string());
        let (hour, minute) = s.split_once(':').ok_or_else(invalid)?;
        let field = |part: &str| {
            if (1..=2).contains(&part.len()) && part.bytes().all(|b| b.is_ascii_digit()) {
                part.parse::<u32>().ok()
            } else {
                None
            }
        };
        match (field(hour), field(minute)) {
            (Some(h), Some(m)) => RoutineTime::from_hm(h, m).ok_or_else(invalid),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for RoutineTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0.hour(), self.0.minute())
    }
}

impl Serialize for RoutineTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RoutineTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        RoutineTime::parse_stored(&raw).map_err(serde::de::Error::custom)
    }
}

/// The validated, editable part of a routine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineFields {
    pub time: RoutineTime,
    pub content: String,
    pub frequency: Frequency,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routine {
    pub id: RoutineId,
    pub time: RoutineTime,
    pub content: String,
    pub frequency: Frequency,
    /// Anchor for periodic recurrence; provenance only for `Once`.
    pub start_date: NaiveDate,
    /// Occurrence dates for `Once`. Kept unread on periodic routines that
    /// used to be one-off.
    pub once_dates: Vec<NaiveDate>,
}

impl Routine {
    pub fn display_line(&self) -> String {
        format!("{} - {}", self.time, self.content)
    }

    fn apply(&mut self, fields: RoutineFields) {
        self.time = fields.time;
        self.content = fields.content;
        self.frequency = fields.frequency;
        // Dates outlive a switch to a periodic frequency; they are only read
        // while the routine is `Once`.
        if !self.frequency.is_periodic() && self.once_dates.is_empty() {
            self.once_dates.push(self.start_date);
        }
    }
}

/// Ordered set of routines plus the reserved `repeating_routines` payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    routines: Vec<Routine>,
    reserved: Vec<serde_json::Value>,
    next_id: u64,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a collection from stored routines, keeping their order.
    pub(crate) fn from_parts(routines: Vec<Routine>, reserved: Vec<serde_json::Value>) -> Self {
        let next_id = routines.iter().map(|r| r.id.0).max().unwrap_or(0);
        Self {
            routines,
            reserved,
            next_id,
        }
    }

    pub(crate) fn next_id(&mut self) -> RoutineId {
        self.next_id += 1;
        RoutineId(self.next_id)
    }

    pub fn routines(&self) -> &[Routine] {
        &self.routines
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Routine> {
        self.routines.iter()
    }

    pub fn len(&self) -> usize {
        self.routines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routines.is_empty()
    }

    pub fn reserved(&self) -> &[serde_json::Value] {
        &self.reserved
    }

    pub fn get(&self, id: RoutineId) -> Option<&Routine> {
        self.routines.iter().find(|r| r.id == id)
    }

    /// Periodic definitions in collection order.
    pub fn periodic(&self) -> impl Iterator<Item = &Routine> {
        self.routines.iter().filter(|r| r.frequency.is_periodic())
    }

    /// Append a new routine anchored on `start_date`.
    pub fn add(&mut self, fields: RoutineFields, start_date: NaiveDate) -> RoutineId {
        let id = self.next_id();
        let once_dates = if fields.frequency.is_periodic() {
            Vec::new()
        } else {
            vec![start_date]
        };
        self.routines.push(Routine {
            id,
            time: fields.time,
            content: fields.content,
            frequency: fields.frequency,
            start_date,
            once_dates,
        });
        id
    }

    /// Replace time, content and frequency. The anchor date never changes.
    pub fn update(&mut self, id: RoutineId, fields: RoutineFields) -> RoutineResult<()> {
        let routine = self
            .routines
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(RoutineError::NotFound(id))?;
        routine.apply(fields);
        Ok(())
    }

    pub fn remove(&mut self, id: RoutineId) -> RoutineResult<Routine> {
        let pos = self
            .routines
            .iter()
            .position(|r| r.id == id)
            .ok_or(RoutineError::NotFound(id))?;
        Ok(self.routines.remove(pos))
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Routine;
    type IntoIter = std::slice::Iter<'a, Routine>;

    fn into_iter(self) -> Self::IntoIter {
        self.routines.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn fields(time: &str, content: &str, frequency: Frequency) -> RoutineFields {
        RoutineFields {
            time: time.parse().unwrap(),
            content: content.to_string(),
            frequency,
        }
    }

    #[test]
    fn time_parses_strict_hh_mm() {
        assert_eq!("09:05".parse::<RoutineTime>().unwrap().to_string(), "09:05");
        assert_eq!("23:59".parse::<RoutineTime>().unwrap().to_string(), "23:59");
        for bad in ["9:00", "24:00", "12:60", "12-00", " 12:00", "12:00 ", "", "ab:cd"] {
            assert_eq!(
                bad.parse::<RoutineTime>(),
                Err(ValidationError::InvalidTimeFormat(bad.to_string())),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn stored_times_may_be_unpadded() {
        for (raw, padded) in [("9:00", "09:00"), ("7:5", "07:05"), ("23:59", "23:59")] {
            assert_eq!(RoutineTime::parse_stored(raw).unwrap().to_string(), padded);
        }
        for bad in ["900", "24:00", "9:60", ":30", "9:", "123:00", "9:00 ", "+9:00"] {
            assert!(RoutineTime::parse_stored(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn frequency_labels_are_exact() {
        assert_eq!("weekly".parse::<Frequency>().unwrap(), Frequency::Weekly);
        assert!("Weekly".parse::<Frequency>().is_err());
        assert!("yearly".parse::<Frequency>().is_err());
        assert_eq!(Frequency::Monthly.next(), Frequency::Once);
    }

    #[test]
    fn add_assigns_increasing_ids_and_once_dates() {
        let mut c = Collection::new();
        let a = c.add(fields("09:00", "A", Frequency::Once), date("2024-05-01"));
        let b = c.add(fields("10:00", "B", Frequency::Daily), date("2024-05-01"));
        assert!(b > a);
        assert_eq!(c.get(a).unwrap().once_dates, vec![date("2024-05-01")]);
        assert!(c.get(b).unwrap().once_dates.is_empty());
    }

    #[test]
    fn update_keeps_anchor_and_maintains_once_dates() {
        let mut c = Collection::new();
        let id = c.add(fields("09:00", "A", Frequency::Daily), date("2024-05-01"));

        c.update(id, fields("07:30", "A2", Frequency::Once)).unwrap();
        let r = c.get(id).unwrap();
        assert_eq!(r.start_date, date("2024-05-01"));
        assert_eq!(r.once_dates, vec![date("2024-05-01")]);
        assert_eq!(r.time.to_string(), "07:30");

        c.update(id, fields("07:30", "A2", Frequency::Weekly)).unwrap();
        assert_eq!(c.get(id).unwrap().once_dates, vec![date("2024-05-01")]);
    }

    #[test]
    fn switching_once_to_daily_keeps_dates() {
        let mut c = Collection::new();
        let id = c.add(fields("09:00", "A", Frequency::Once), date("2024-05-01"));
        c.update(id, fields("09:00", "A", Frequency::Daily)).unwrap();
        c.update(id, fields("09:00", "A", Frequency::Once)).unwrap();
        assert_eq!(c.get(id).unwrap().once_dates, vec![date("2024-05-01")]);
    }

    #[test]
    fn remove_unknown_id_is_not_found() {
        let mut c = Collection::new();
        let id = c.add(fields("09:00", "A", Frequency::Daily), date("2024-05-01"));
        c.remove(id).unwrap();
        assert!(c.is_empty());
        assert!(matches!(c.remove(id), Err(RoutineError::NotFound(_))));
    }

    #[test]
    fn ids_stay_unique_after_removal() {
        let mut c = Collection::new();
        let a = c.add(fields("09:00", "A", Frequency::Daily), date("2024-05-01"));
        c.remove(a).unwrap();
        let b = c.add(fields("09:00", "B", Frequency::Daily), date("2024-05-01"));
        assert_ne!(a, b);
    }
}
