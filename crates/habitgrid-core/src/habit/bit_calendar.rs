//! Month-chunked completion bitmap.
//!
//! Each calendar month is one `u32` whose bit `day - 1` is set when that day
//! was completed. Chunks are keyed `"YYYY-MM"`, created on first write and
//! never removed. The persisted form is the same map, so an existing store
//! of `{"2026-10": 5}` means October 1st and 3rd are done.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::calendar::{days_in_month, DAYS_PER_WEEK};
use crate::error::ValidationError;

/// Key of one month chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkKey {
    year: i32,
    month: u32,
}

impl ChunkKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Bits that may be set in this chunk: one per day of the month.
    pub fn valid_mask(&self) -> u32 {
        let days = days_in_month(self.year, self.month);
        if days >= u32::BITS {
            u32::MAX
        } else {
            (1u32 << days) - 1
        }
    }
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for ChunkKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidChunkKey(s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if month.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        ChunkKey::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for ChunkKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ChunkKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Completion flags of seven consecutive days, oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WeekBits([bool; DAYS_PER_WEEK]);

impl WeekBits {
    pub fn new(bits: [bool; DAYS_PER_WEEK]) -> Self {
        Self(bits)
    }

    pub fn is_set(&self, slot: usize) -> bool {
        self.0.get(slot).copied().unwrap_or(false)
    }

    /// Completed slots in `0..=last`.
    pub fn count_through(&self, last: usize) -> usize {
        self.0.iter().take(last + 1).filter(|bit| **bit).count()
    }

    pub fn count(&self) -> usize {
        self.count_through(DAYS_PER_WEEK - 1)
    }

    pub fn as_array(&self) -> &[bool; DAYS_PER_WEEK] {
        &self.0
    }
}

impl FromStr for WeekBits {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidWeekBits(s.to_string());
        if s.chars().count() != DAYS_PER_WEEK {
            return Err(invalid());
        }
        let mut bits = [false; DAYS_PER_WEEK];
        for (slot, c) in s.chars().enumerate() {
            bits[slot] = match c {
                '0' => false,
                '1' => true,
                _ => return Err(invalid()),
            };
        }
        Ok(Self(bits))
    }
}

impl fmt::Display for WeekBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.0 {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Per-habit completion record, one bitmask per month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<ChunkKey, u32>", into = "BTreeMap<ChunkKey, u32>")]
pub struct BitCalendar {
    chunks: BTreeMap<ChunkKey, u32>,
}

impl BitCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` when nothing was ever recorded for the month of `date`.
    pub fn get(&self, date: NaiveDate) -> Option<bool> {
        self.chunks
            .get(&ChunkKey::of(date))
            .map(|bits| bits & day_bit(date) != 0)
    }

    /// Sets or clears `date`. Writes after `today` are ignored and return
    /// `false`.
    pub fn set(&mut self, date: NaiveDate, value: bool, today: NaiveDate) -> bool {
        if date > today {
            tracing::debug!(%date, %today, "ignoring write to a future date");
            return false;
        }
        let chunk = self.chunks.entry(ChunkKey::of(date)).or_insert(0);
        if value {
            *chunk |= day_bit(date);
        } else {
            *chunk &= !day_bit(date);
        }
        true
    }

    /// Flips `date` and returns the new value, `None` for a future date.
    pub fn toggle(&mut self, date: NaiveDate, today: NaiveDate) -> Option<bool> {
        if date > today {
            tracing::debug!(%date, %today, "ignoring toggle of a future date");
            return None;
        }
        let chunk = self.chunks.entry(ChunkKey::of(date)).or_insert(0);
        *chunk ^= day_bit(date);
        Some(*chunk & day_bit(date) != 0)
    }

    /// One '0'/'1' per day from `start` to `end` inclusive. Days in months
    /// without data read as '0'. Empty when `start > end`.
    pub fn slice(&self, start: NaiveDate, end: NaiveDate) -> String {
        if start > end {
            return String::new();
        }
        start
            .iter_days()
            .take_while(|day| *day <= end)
            .map(|day| if self.get(day) == Some(true) { '1' } else { '0' })
            .collect()
    }

    /// The seven days starting at `start`.
    pub fn week_bits(&self, start: NaiveDate) -> WeekBits {
        WeekBits(std::array::from_fn(|slot| {
            self.get(start + Duration::days(slot as i64)) == Some(true)
        }))
    }

    pub fn chunk(&self, key: ChunkKey) -> Option<u32> {
        self.chunks.get(&key).copied()
    }

    pub fn chunks(&self) -> impl Iterator<Item = (ChunkKey, u32)> + '_ {
        self.chunks.iter().map(|(key, bits)| (*key, *bits))
    }

    pub fn completed_days(&self) -> u32 {
        self.chunks.values().map(|bits| bits.count_ones()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

fn day_bit(date: NaiveDate) -> u32 {
    1 << date.day0()
}

impl From<BTreeMap<ChunkKey, u32>> for BitCalendar {
    fn from(raw: BTreeMap<ChunkKey, u32>) -> Self {
        let chunks = raw
            .into_iter()
            .map(|(key, bits)| {
                let masked = bits & key.valid_mask();
                if masked != bits {
                    tracing::debug!(chunk = %key, bits, "dropping bits past the end of the month");
                }
                (key, masked)
            })
            .collect();
        Self { chunks }
    }
}

impl From<BitCalendar> for BTreeMap<ChunkKey, u32> {
    fn from(calendar: BitCalendar) -> Self {
        calendar.chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn get_distinguishes_missing_chunk_from_unset_bit() {
        let today = date(2026, 10, 14);
        let mut cal = BitCalendar::new();
        assert_eq!(cal.get(date(2026, 10, 1)), None);

        cal.set(date(2026, 10, 3), true, today);
        assert_eq!(cal.get(date(2026, 10, 3)), Some(true));
        assert_eq!(cal.get(date(2026, 10, 1)), Some(false));
        assert_eq!(cal.get(date(2026, 9, 30)), None);
    }

    #[test]
    fn set_uses_day_minus_one_bit() {
        let today = date(2026, 10, 14);
        let mut cal = BitCalendar::new();
        cal.set(date(2026, 10, 1), true, today);
        cal.set(date(2026, 10, 3), true, today);
        assert_eq!(cal.chunk(ChunkKey::new(2026, 10).unwrap()), Some(0b101));

        cal.set(date(2026, 10, 1), false, today);
        assert_eq!(cal.chunk(ChunkKey::new(2026, 10).unwrap()), Some(0b100));
    }

    #[test]
    fn future_writes_are_ignored() {
        let today = date(2026, 10, 14);
        let mut cal = BitCalendar::new();
        assert!(!cal.set(date(2026, 10, 15), true, today));
        assert_eq!(cal.get(date(2026, 10, 15)), None);
        assert_eq!(cal.toggle(date(2026, 11, 1), today), None);
        assert!(cal.is_empty());

        assert!(cal.set(today, true, today));
        assert_eq!(cal.get(today), Some(true));
    }

    #[test]
    fn toggle_returns_new_value() {
        let today = date(2026, 10, 14);
        let mut cal = BitCalendar::new();
        assert_eq!(cal.toggle(date(2026, 10, 2), today), Some(true));
        assert_eq!(cal.toggle(date(2026, 10, 2), today), Some(false));
        assert_eq!(cal.get(date(2026, 10, 2)), Some(false));
    }

    #[test]
    fn slice_spans_months_and_fills_missing_chunks() {
        let today = date(2026, 10, 14);
        let mut cal = BitCalendar::new();
        cal.set(date(2026, 9, 29), true, today);
        cal.set(date(2026, 10, 2), true, today);

        // 2026-08 has no chunk at all
        assert_eq!(cal.slice(date(2026, 8, 30), date(2026, 8, 31)), "00");
        assert_eq!(cal.slice(date(2026, 9, 28), date(2026, 10, 3)), "010010");
        assert_eq!(cal.slice(date(2026, 10, 2), date(2026, 10, 2)), "1");
        assert_eq!(cal.slice(date(2026, 10, 3), date(2026, 10, 2)), "");
    }

    #[test]
    fn week_bits_match_slice() {
        let today = date(2026, 10, 14);
        let mut cal = BitCalendar::new();
        cal.set(date(2026, 10, 11), true, today);
        cal.set(date(2026, 10, 13), true, today);
        let start = date(2026, 10, 11);
        let bits = cal.week_bits(start);
        assert_eq!(bits.to_string(), cal.slice(start, date(2026, 10, 17)));
        assert_eq!(bits.count(), 2);
        assert_eq!(bits.count_through(1), 1);
    }

    #[test]
    fn week_bits_parse_rejects_bad_input() {
        assert_eq!("0101000".parse::<WeekBits>().unwrap().count(), 2);
        assert!("010100".parse::<WeekBits>().is_err());
        assert!("01010a0".parse::<WeekBits>().is_err());
    }

    #[test]
    fn serializes_as_month_key_map() {
        let today = date(2026, 10, 14);
        let mut cal = BitCalendar::new();
        cal.set(date(2026, 10, 1), true, today);
        cal.set(date(2026, 10, 3), true, today);
        cal.set(date(2026, 2, 28), true, today);

        let json = serde_json::to_string(&cal).unwrap();
        assert_eq!(json, r#"{"2026-02":134217728,"2026-10":5}"#);

        let back: BitCalendar = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cal);
    }

    #[test]
    fn deserialize_masks_bits_past_month_end() {
        // bit 29 would be February 30th
        let cal: BitCalendar = serde_json::from_str(r#"{"2026-02": 536870913}"#).unwrap();
        assert_eq!(cal.chunk(ChunkKey::new(2026, 2).unwrap()), Some(1));
        assert!(serde_json::from_str::<BitCalendar>(r#"{"2026-13": 1}"#).is_err());
        assert!(serde_json::from_str::<BitCalendar>(r#"{"2026-1": 1}"#).is_err());
    }

    proptest! {
        #[test]
        fn slice_length_is_days_between_plus_one(
            start_offset in 0i64..800,
            span in 0i64..200,
            marks in proptest::collection::vec(0i64..1000, 0..40),
        ) {
            let base = date(2025, 1, 1);
            let today = base + Duration::days(1000);
            let mut cal = BitCalendar::new();
            for m in marks {
                cal.set(base + Duration::days(m), true, today);
            }
            let start = base + Duration::days(start_offset);
            let end = start + Duration::days(span);
            prop_assert_eq!(cal.slice(start, end).len() as i64, span + 1);
        }

        #[test]
        fn double_toggle_restores_bit(offset in 0i64..400, preset in any::<bool>()) {
            let today = date(2026, 10, 14);
            let day = today - Duration::days(offset);
            let mut cal = BitCalendar::new();
            cal.set(day, preset, today);
            let before = cal.get(day);
            cal.toggle(day, today);
            cal.toggle(day, today);
            prop_assert_eq!(cal.get(day), before);
        }

        #[test]
        fn future_set_leaves_no_data(ahead in 1i64..400) {
            let today = date(2026, 10, 14);
            let day = today + Duration::days(ahead);
            let mut cal = BitCalendar::new();
            let before = cal.get(day);
            cal.set(day, true, today);
            prop_assert_eq!(cal.get(day), before);
        }
    }
}
