//! Calendar-day bucketing for record timestamps.
//!
//! One convention holds everywhere in tally: a record belongs to the
//! *local* calendar day of its timestamp. [`day_key`] is the single place
//! that conversion happens; streaks, trends, and the dashboard all group
//! through it. Day arithmetic is `NaiveDate` arithmetic, so consecutive
//! days differ by exactly one regardless of month or year boundaries.

use chrono::{DateTime, Local, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};

use crate::types::Record;

/// Convert a millisecond timestamp to its local calendar day.
///
/// Returns `None` only for timestamps outside chrono's representable
/// range; callers skip such records.
pub fn day_key(timestamp_ms: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(timestamp_ms).map(|dt| dt.with_timezone(&Local).date_naive())
}

/// Count records per local day within an inclusive timestamp window.
///
/// Only days with at least one record appear in the output; callers that
/// need zero-filled windows seed the map with [`seed_window`] first and
/// fold with [`fold_seeded`]. An inverted window yields an empty map.
pub fn counts_by_day(records: &[Record], start_ms: i64, end_ms: i64) -> BTreeMap<NaiveDate, u32> {
    let mut counts = BTreeMap::new();
    for record in records {
        if record.timestamp_ms < start_ms || record.timestamp_ms > end_ms {
            continue;
        }
        if let Some(day) = day_key(record.timestamp_ms) {
            *counts.entry(day).or_insert(0) += 1;
        }
    }
    counts
}

/// Build a zero-filled map covering `len` days ending at `end` inclusive.
pub fn seed_window(end: NaiveDate, len: usize) -> BTreeMap<NaiveDate, u32> {
    let mut map = BTreeMap::new();
    let mut day = end;
    for _ in 0..len {
        map.insert(day, 0);
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    map
}

/// Fold records into a pre-seeded day map, incrementing only days already
/// present. Records on days outside the seeded window are ignored.
pub fn fold_seeded(counts: &mut BTreeMap<NaiveDate, u32>, records: &[Record]) {
    for record in records {
        if let Some(day) = day_key(record.timestamp_ms) {
            if let Some(count) = counts.get_mut(&day) {
                *count += 1;
            }
        }
    }
}

/// Number of distinct local days with at least one record in the
/// inclusive timestamp window.
pub fn distinct_day_count(records: &[Record], start_ms: i64, end_ms: i64) -> usize {
    let mut days = BTreeSet::new();
    for record in records {
        if record.timestamp_ms < start_ms || record.timestamp_ms > end_ms {
            continue;
        }
        if let Some(day) = day_key(record.timestamp_ms) {
            days.insert(day);
        }
    }
    days.len()
}
