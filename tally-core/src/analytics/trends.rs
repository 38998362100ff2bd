//! Time-series and distribution aggregates for chart rendering.
//!
//! Every function here is a pure transform over a record snapshot. The
//! outputs carry raw `NaiveDate` / timestamp keys; date formatting is the
//! display layer's job. Attribute values that fail to parse are skipped
//! silently, one data point at a time: partially-filled attributes are a
//! normal state, not an error.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::buckets::{day_key, fold_seeded, seed_window};
use crate::types::Record;

/// One day of a fixed trend window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendPoint {
    /// Local calendar day
    pub day: NaiveDate,
    /// Records on that day
    pub count: u32,
}

/// Occurrence counts for one event over an inclusive time range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeCounts {
    /// Total matching records
    pub total: u32,
    /// Distinct active local days
    pub distinct_days: u32,
    /// Matching record timestamps, ascending (for calendar day markers)
    pub timestamps: Vec<i64>,
}

/// Record counts for the 7 days ending at `today`, oldest first.
///
/// Always exactly 7 entries; days without records stay at zero.
pub fn weekly_trend(records: &[Record], today: NaiveDate) -> Vec<TrendPoint> {
    let mut counts = seed_window(today, 7);
    fold_seeded(&mut counts, records);
    counts
        .into_iter()
        .map(|(day, count)| TrendPoint { day, count })
        .collect()
}

/// Per-day record counts for the trailing 28 days ending at `today`,
/// zero-filled, for calendar-grid heatmaps.
pub fn monthly_heatmap(records: &[Record], today: NaiveDate) -> BTreeMap<NaiveDate, u32> {
    let mut counts = seed_window(today, 28);
    fold_seeded(&mut counts, records);
    counts
}

/// Occurrence counts for one event within an inclusive timestamp window.
///
/// An inverted window yields an empty result.
pub fn range_counts(
    records: &[Record],
    event_id: &str,
    start_ms: i64,
    end_ms: i64,
) -> RangeCounts {
    let mut timestamps: Vec<i64> = records
        .iter()
        .filter(|r| {
            r.event_id == event_id && r.timestamp_ms >= start_ms && r.timestamp_ms <= end_ms
        })
        .map(|r| r.timestamp_ms)
        .collect();
    timestamps.sort_unstable();

    let distinct_days = timestamps
        .iter()
        .filter_map(|ts| day_key(*ts))
        .collect::<std::collections::BTreeSet<_>>()
        .len() as u32;

    RangeCounts {
        total: timestamps.len() as u32,
        distinct_days,
        timestamps,
    }
}

/// Extract a numeric time series for one attribute.
///
/// Emits `(timestamp, value)` for every record whose stored value parses
/// as a finite number, ascending by timestamp. Missing and unparseable
/// values are skipped.
pub fn numeric_series(records: &[Record], attribute_id: &str) -> Vec<(i64, f64)> {
    let mut series: Vec<(i64, f64)> = records
        .iter()
        .filter_map(|r| {
            let value = r.attributes.get(attribute_id)?;
            let parsed: f64 = value.trim().parse().ok()?;
            parsed.is_finite().then_some((r.timestamp_ms, parsed))
        })
        .collect();
    series.sort_by_key(|(ts, _)| *ts);
    series
}

/// Count stored values for one attribute.
///
/// For multi-value attributes the stored string is a comma-separated
/// label list: each trimmed, non-empty token counts once, so one record
/// selecting three options contributes three increments across three
/// keys. Single-value attributes count the raw stored string.
pub fn distribution(
    records: &[Record],
    attribute_id: &str,
    multi_value: bool,
) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();
    for record in records {
        let Some(value) = record.attributes.get(attribute_id) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        if multi_value {
            for token in value.split(',') {
                let token = token.trim();
                if !token.is_empty() {
                    *counts.entry(token.to_string()).or_insert(0) += 1;
                }
            }
        } else {
            *counts.entry(value.clone()).or_insert(0) += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn ms(date: NaiveDate, h: u32) -> i64 {
        Local
            .from_local_datetime(&date.and_hms_opt(h, 0, 0).unwrap())
            .unwrap()
            .timestamp_millis()
    }

    fn rec(event: &str, ts: i64) -> Record {
        Record::new(event, ts)
    }

    fn rec_attr(ts: i64, attr: &str, value: &str) -> Record {
        let mut r = Record::new("ev", ts);
        r.attributes.insert(attr.to_string(), value.to_string());
        r
    }

    #[test]
    fn test_weekly_trend_zero_fill() {
        let today = d(2024, 3, 10);
        let records = vec![
            rec("ev", ms(d(2024, 3, 10), 9)),
            rec("ev", ms(d(2024, 3, 10), 21)),
            rec("ev", ms(d(2024, 3, 5), 12)),
            // Outside the window.
            rec("ev", ms(d(2024, 3, 1), 12)),
        ];
        let trend = weekly_trend(&records, today);
        assert_eq!(trend.len(), 7);
        assert_eq!(trend.first().unwrap().day, d(2024, 3, 4));
        assert_eq!(trend.last().unwrap().day, today);
        assert_eq!(trend.iter().map(|p| p.count).sum::<u32>(), 3);
        assert_eq!(trend.last().unwrap().count, 2);
    }

    #[test]
    fn test_weekly_trend_empty() {
        let trend = weekly_trend(&[], d(2024, 3, 10));
        assert_eq!(trend.len(), 7);
        assert!(trend.iter().all(|p| p.count == 0));
    }

    #[test]
    fn test_monthly_heatmap_window() {
        let today = d(2024, 3, 10);
        let records = vec![
            rec("ev", ms(d(2024, 2, 12), 12)), // oldest day in window
            rec("ev", ms(d(2024, 2, 11), 12)), // one day too old
        ];
        let heatmap = monthly_heatmap(&records, today);
        assert_eq!(heatmap.len(), 28);
        assert_eq!(heatmap[&d(2024, 2, 12)], 1);
        assert!(!heatmap.contains_key(&d(2024, 2, 11)));
        assert_eq!(heatmap.values().sum::<u32>(), 1);
    }

    #[test]
    fn test_range_counts_scopes_event_and_window() {
        let day = d(2024, 3, 1);
        let t1 = ms(day, 9);
        let t2 = ms(day, 21);
        let records = vec![
            rec("a", t2),
            rec("a", t1),
            rec("b", ms(day, 10)),
            rec("a", ms(d(2024, 4, 1), 10)),
        ];
        let counts = range_counts(&records, "a", t1, t2);
        assert_eq!(counts.total, 2);
        assert_eq!(counts.distinct_days, 1);
        assert_eq!(counts.timestamps, vec![t1, t2]);
    }

    #[test]
    fn test_range_counts_inverted_window() {
        let records = vec![rec("a", ms(d(2024, 3, 1), 9))];
        let counts = range_counts(&records, "a", 100, 0);
        assert_eq!(counts, RangeCounts::default());
    }

    #[test]
    fn test_numeric_series_skips_bad_values() {
        let day = d(2024, 3, 1);
        let records = vec![
            rec_attr(ms(day, 9), "amount", "5"),
            rec_attr(ms(day, 10), "amount", "abc"),
            rec_attr(ms(day, 11), "amount", "7.5"),
            rec_attr(ms(day, 12), "amount", "NaN"),
            rec("ev", ms(day, 13)),
        ];
        let series = numeric_series(&records, "amount");
        assert_eq!(
            series,
            vec![(ms(day, 9), 5.0), (ms(day, 11), 7.5)]
        );
    }

    #[test]
    fn test_numeric_series_sorted_by_timestamp() {
        let day = d(2024, 3, 1);
        let records = vec![
            rec_attr(ms(day, 12), "amount", "3"),
            rec_attr(ms(day, 8), "amount", "1"),
        ];
        let series = numeric_series(&records, "amount");
        assert_eq!(series[0].1, 1.0);
        assert_eq!(series[1].1, 3.0);
    }

    #[test]
    fn test_distribution_single_value() {
        let day = d(2024, 3, 1);
        let records = vec![
            rec_attr(ms(day, 9), "type", "Food"),
            rec_attr(ms(day, 10), "type", "Food"),
            rec_attr(ms(day, 11), "type", "Transit"),
        ];
        let dist = distribution(&records, "type", false);
        assert_eq!(dist["Food"], 2);
        assert_eq!(dist["Transit"], 1);
    }

    #[test]
    fn test_distribution_multi_value_fan_out() {
        let day = d(2024, 3, 1);
        let records = vec![
            rec_attr(ms(day, 9), "tags", "Red,Blue"),
            rec_attr(ms(day, 10), "tags", "Red, Green ,"),
        ];
        let dist = distribution(&records, "tags", true);
        assert_eq!(dist["Red"], 2);
        assert_eq!(dist["Blue"], 1);
        assert_eq!(dist["Green"], 1);
        // One record with N options contributes N increments.
        assert_eq!(dist.values().sum::<u32>(), 4);
    }

    #[test]
    fn test_distribution_missing_attribute() {
        let records = vec![rec("ev", ms(d(2024, 3, 1), 9))];
        assert!(distribution(&records, "type", false).is_empty());
    }

    #[test]
    fn test_aggregates_idempotent() {
        let today = d(2024, 3, 10);
        let records = vec![
            rec_attr(ms(d(2024, 3, 9), 9), "amount", "5"),
            rec_attr(ms(d(2024, 3, 10), 9), "tags", "A,B"),
        ];
        assert_eq!(weekly_trend(&records, today), weekly_trend(&records, today));
        assert_eq!(
            monthly_heatmap(&records, today),
            monthly_heatmap(&records, today)
        );
        assert_eq!(
            distribution(&records, "tags", true),
            distribution(&records, "tags", true)
        );
        assert_eq!(
            numeric_series(&records, "amount"),
            numeric_series(&records, "amount")
        );
    }
}
