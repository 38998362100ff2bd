//! Dashboard aggregates for the home/overview display.
//!
//! One snapshot pass produces everything the overview renders: totals,
//! the 7-day trend, category breakdown, the 28-day activity grid,
//! streaks, and time-of-day patterns.

use chrono::{DateTime, Datelike, Local, NaiveDate, Timelike};
use std::collections::{BTreeMap, HashMap};

use super::buckets::day_key;
use super::streaks::{self, StreakSummary};
use super::trends::{self, TrendPoint};
use crate::types::{Event, EventCategory, Record};

/// Aggregate statistics for the overview display.
#[derive(Debug, Clone, Default)]
pub struct DashboardStats {
    /// Number of defined events
    pub total_events: usize,
    /// Number of records ever logged
    pub total_records: usize,
    /// Records logged on the local calendar day of the reference time
    pub today_records: usize,
    /// Record counts for the last 7 days, oldest first
    pub weekly_trend: Vec<TrendPoint>,
    /// Record count per event category, descending
    pub category_distribution: Vec<(EventCategory, u32)>,
    /// Per-day counts for the trailing 28 days (calendar heatmap)
    pub daily_activity: BTreeMap<NaiveDate, u32>,
    /// Consecutive-day streaks across all events
    pub streaks: StreakSummary,
    /// Hour of day (0-23, local) with the most records
    pub peak_hour: u8,
    /// Weekday with the most records (0 = Monday ... 6 = Sunday)
    pub busiest_weekday: u8,
}

impl DashboardStats {
    /// Compute dashboard aggregates from an event/record snapshot.
    pub fn collect(events: &[Event], records: &[Record], now: DateTime<Local>) -> Self {
        let today = now.date_naive();

        let today_records = records
            .iter()
            .filter(|r| day_key(r.timestamp_ms) == Some(today))
            .count();

        // Category breakdown via the owning event; records whose event is
        // gone (mid-delete snapshot) are skipped.
        let category_by_event: HashMap<&str, EventCategory> = events
            .iter()
            .map(|e| (e.id.as_str(), e.category))
            .collect();
        let mut category_counts: BTreeMap<&'static str, (EventCategory, u32)> = BTreeMap::new();
        for record in records {
            if let Some(category) = category_by_event.get(record.event_id.as_str()) {
                category_counts
                    .entry(category.as_str())
                    .or_insert((*category, 0))
                    .1 += 1;
            }
        }
        let mut category_distribution: Vec<(EventCategory, u32)> =
            category_counts.into_values().collect();
        category_distribution.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.as_str().cmp(b.0.as_str())));

        // Hourly and weekday distributions in local time.
        let mut hourly = [0u32; 24];
        let mut weekday = [0u32; 7];
        for record in records {
            if let Some(ts) = DateTime::from_timestamp_millis(record.timestamp_ms) {
                let local = ts.with_timezone(&Local);
                hourly[local.hour() as usize] += 1;
                weekday[local.weekday().num_days_from_monday() as usize] += 1;
            }
        }
        let peak_hour = max_index(&hourly) as u8;
        let busiest_weekday = max_index(&weekday) as u8;

        DashboardStats {
            total_events: events.len(),
            total_records: records.len(),
            today_records,
            weekly_trend: trends::weekly_trend(records, today),
            category_distribution,
            daily_activity: trends::monthly_heatmap(records, today),
            streaks: streaks::calculate(records, today),
            peak_hour,
            busiest_weekday,
        }
    }
}

/// Index of the largest value; first wins on ties, 0 for all-zero input.
fn max_index(values: &[u32]) -> usize {
    values
        .iter()
        .enumerate()
        .max_by(|(ia, a), (ib, b)| a.cmp(b).then(ib.cmp(ia)))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn local(y: i32, m: u32, d: u32, h: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn rec(event: &str, at: DateTime<Local>) -> Record {
        Record::new(event, at.timestamp_millis())
    }

    #[test]
    fn test_empty_snapshot() {
        let stats = DashboardStats::collect(&[], &[], local(2024, 3, 10, 12));
        assert_eq!(stats.total_events, 0);
        assert_eq!(stats.total_records, 0);
        assert_eq!(stats.today_records, 0);
        assert_eq!(stats.weekly_trend.len(), 7);
        assert_eq!(stats.daily_activity.len(), 28);
        assert_eq!(stats.streaks, StreakSummary::default());
    }

    #[test]
    fn test_totals_and_today() {
        let now = local(2024, 3, 10, 18);
        let mut run = Event::new("Run", EventCategory::Health, 0);
        run.id = "run".to_string();
        let events = vec![run];
        let records = vec![
            rec("run", local(2024, 3, 10, 7)),
            rec("run", local(2024, 3, 10, 20)),
            rec("run", local(2024, 3, 9, 7)),
        ];
        let stats = DashboardStats::collect(&events, &records, now);
        assert_eq!(stats.total_events, 1);
        assert_eq!(stats.total_records, 3);
        assert_eq!(stats.today_records, 2);
        assert_eq!(stats.streaks.current, 2);
    }

    #[test]
    fn test_category_distribution_sorted() {
        let mut run = Event::new("Run", EventCategory::Health, 0);
        run.id = "run".to_string();
        let mut read = Event::new("Read", EventCategory::Learning, 0);
        read.id = "read".to_string();
        let events = vec![run, read];
        let records = vec![
            rec("run", local(2024, 3, 9, 7)),
            rec("read", local(2024, 3, 9, 8)),
            rec("read", local(2024, 3, 9, 9)),
            rec("gone", local(2024, 3, 9, 10)),
        ];
        let stats = DashboardStats::collect(&events, &records, local(2024, 3, 10, 12));
        assert_eq!(
            stats.category_distribution,
            vec![
                (EventCategory::Learning, 2),
                (EventCategory::Health, 1),
            ]
        );
    }

    #[test]
    fn test_peak_hour_and_weekday() {
        // 2024-03-09 is a Saturday.
        let records = vec![
            rec("ev", local(2024, 3, 9, 7)),
            rec("ev", local(2024, 3, 9, 7)),
            rec("ev", local(2024, 3, 8, 21)),
        ];
        let stats = DashboardStats::collect(&[], &records, local(2024, 3, 10, 12));
        assert_eq!(stats.peak_hour, 7);
        assert_eq!(stats.busiest_weekday, 5);
    }

    #[test]
    fn test_max_index_ties_and_empty() {
        assert_eq!(max_index(&[0, 0, 0]), 0);
        assert_eq!(max_index(&[1, 3, 3]), 1);
        assert_eq!(max_index(&[]), 0);
    }
}
