//! Consecutive-day streak calculation.

use chrono::NaiveDate;
use std::collections::BTreeSet;

use super::buckets::day_key;
use crate::types::Record;

/// Current and longest consecutive-day streaks for a record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreakSummary {
    /// Consecutive active days ending today or yesterday (0 if neither
    /// day is active)
    pub current: u32,
    /// Longest run of consecutive active days ever
    pub longest: u32,
}

/// Compute streaks from a record snapshot.
///
/// `today` anchors the current streak: if the most recent active day is
/// neither `today` nor the day before it, the current streak is 0.
/// Multiple records on one day count as a single active day. The result
/// depends only on the inputs, so re-running with an unchanged snapshot
/// and anchor yields the same summary.
pub fn calculate(records: &[Record], today: NaiveDate) -> StreakSummary {
    let days: BTreeSet<NaiveDate> = records
        .iter()
        .filter_map(|r| day_key(r.timestamp_ms))
        .collect();

    if days.is_empty() {
        return StreakSummary::default();
    }

    let days: Vec<NaiveDate> = days.into_iter().collect();

    // Longest: one pass over the sorted unique days.
    let mut longest = 1u32;
    let mut run = 1u32;
    for pair in days.windows(2) {
        if (pair[1] - pair[0]).num_days() == 1 {
            run += 1;
        } else {
            longest = longest.max(run);
            run = 1;
        }
    }
    longest = longest.max(run);

    // Current: walk back from the most recent active day, but only if the
    // chain reaches today or yesterday.
    let last = *days.last().expect("non-empty");
    let mut current = 0u32;
    if matches!((today - last).num_days(), 0 | 1) {
        current = 1;
        for i in (1..days.len()).rev() {
            if (days[i] - days[i - 1]).num_days() == 1 {
                current += 1;
            } else {
                break;
            }
        }
    }

    StreakSummary { current, longest }
}
