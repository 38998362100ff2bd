//! Achievement badges derived from the record history.
//!
//! Badges are recomputed from the full snapshot on every request and never
//! persisted, so deleting records can re-lock a badge.

use chrono::{DateTime, Local, NaiveDate, Timelike};

use super::streaks;
use crate::types::Record;

/// The badge catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BadgeKind {
    /// First record ever logged
    FirstStep,
    /// 3-day streak
    Streak3,
    /// 7-day streak
    Streak7,
    /// 10 records total
    Total10,
    /// 100 records total
    Total100,
    /// A record logged between 04:00 and 08:00 local
    EarlyBird,
    /// A record logged between 23:00 and 03:00 local
    NightOwl,
}

impl BadgeKind {
    /// All badges, in display order.
    pub fn all() -> &'static [BadgeKind] {
        &[
            BadgeKind::FirstStep,
            BadgeKind::Streak3,
            BadgeKind::Streak7,
            BadgeKind::Total10,
            BadgeKind::Total100,
            BadgeKind::EarlyBird,
            BadgeKind::NightOwl,
        ]
    }

    /// Returns the display name for this badge
    pub fn display_name(&self) -> &'static str {
        match self {
            BadgeKind::FirstStep => "First Step",
            BadgeKind::Streak3 => "Three in a Row",
            BadgeKind::Streak7 => "Full Week",
            BadgeKind::Total10 => "Ten Logged",
            BadgeKind::Total100 => "Century",
            BadgeKind::EarlyBird => "Early Bird",
            BadgeKind::NightOwl => "Night Owl",
        }
    }

    /// Returns the unlock condition, for display.
    pub fn description(&self) -> &'static str {
        match self {
            BadgeKind::FirstStep => "Log your first record",
            BadgeKind::Streak3 => "Log records on 3 consecutive days",
            BadgeKind::Streak7 => "Log records on 7 consecutive days",
            BadgeKind::Total10 => "Log 10 records in total",
            BadgeKind::Total100 => "Log 100 records in total",
            BadgeKind::EarlyBird => "Log a record between 4am and 8am",
            BadgeKind::NightOwl => "Log a record between 11pm and 3am",
        }
    }
}

/// Unlock state of one badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeStatus {
    pub kind: BadgeKind,
    pub unlocked: bool,
    /// When the badge was earned, where derivable (FirstStep only)
    pub unlocked_at_ms: Option<i64>,
}

/// Evaluate the whole badge catalog against a record snapshot.
pub fn evaluate(records: &[Record], today: NaiveDate) -> Vec<BadgeStatus> {
    let total = records.len();
    let first_ts = records.iter().map(|r| r.timestamp_ms).min();
    let longest_streak = streaks::calculate(records, today).longest;

    let mut early_bird = false;
    let mut night_owl = false;
    for record in records {
        let Some(ts) = DateTime::from_timestamp_millis(record.timestamp_ms) else {
            continue;
        };
        let hour = ts.with_timezone(&Local).hour();
        if (4..8).contains(&hour) {
            early_bird = true;
        }
        if hour >= 23 || hour < 3 {
            night_owl = true;
        }
    }

    BadgeKind::all()
        .iter()
        .map(|&kind| {
            let (unlocked, unlocked_at_ms) = match kind {
                BadgeKind::FirstStep => (total >= 1, first_ts),
                BadgeKind::Streak3 => (longest_streak >= 3, None),
                BadgeKind::Streak7 => (longest_streak >= 7, None),
                BadgeKind::Total10 => (total >= 10, None),
                BadgeKind::Total100 => (total >= 100, None),
                BadgeKind::EarlyBird => (early_bird, None),
                BadgeKind::NightOwl => (night_owl, None),
            };
            BadgeStatus {
                kind,
                unlocked,
                unlocked_at_ms: if unlocked { unlocked_at_ms } else { None },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn rec_at(date: NaiveDate, h: u32) -> Record {
        let ts = Local
            .from_local_datetime(&date.and_hms_opt(h, 0, 0).unwrap())
            .unwrap()
            .timestamp_millis();
        Record::new("ev", ts)
    }

    fn status(badges: &[BadgeStatus], kind: BadgeKind) -> BadgeStatus {
        *badges.iter().find(|b| b.kind == kind).unwrap()
    }

    #[test]
    fn test_no_records_nothing_unlocked() {
        let badges = evaluate(&[], d(2024, 3, 10));
        assert_eq!(badges.len(), BadgeKind::all().len());
        assert!(badges.iter().all(|b| !b.unlocked));
    }

    #[test]
    fn test_first_step_carries_earliest_timestamp() {
        let records = vec![rec_at(d(2024, 3, 2), 12), rec_at(d(2024, 3, 1), 12)];
        let badges = evaluate(&records, d(2024, 3, 10));
        let first = status(&badges, BadgeKind::FirstStep);
        assert!(first.unlocked);
        assert_eq!(first.unlocked_at_ms, Some(records[1].timestamp_ms));
    }

    #[test]
    fn test_streak_badges() {
        let records: Vec<Record> = (1..=3).map(|day| rec_at(d(2024, 3, day), 12)).collect();
        let badges = evaluate(&records, d(2024, 3, 10));
        assert!(status(&badges, BadgeKind::Streak3).unlocked);
        assert!(!status(&badges, BadgeKind::Streak7).unlocked);
    }

    #[test]
    fn test_total_badges() {
        let records: Vec<Record> = (0..10).map(|i| rec_at(d(2024, 3, 1), i % 4 + 9)).collect();
        let badges = evaluate(&records, d(2024, 3, 10));
        assert!(status(&badges, BadgeKind::Total10).unlocked);
        assert!(!status(&badges, BadgeKind::Total100).unlocked);
    }

    #[test]
    fn test_time_of_day_badges() {
        let records = vec![rec_at(d(2024, 3, 1), 5), rec_at(d(2024, 3, 2), 23)];
        let badges = evaluate(&records, d(2024, 3, 10));
        assert!(status(&badges, BadgeKind::EarlyBird).unlocked);
        assert!(status(&badges, BadgeKind::NightOwl).unlocked);

        let daytime = vec![rec_at(d(2024, 3, 1), 12)];
        let badges = evaluate(&daytime, d(2024, 3, 10));
        assert!(!status(&badges, BadgeKind::EarlyBird).unlocked);
        assert!(!status(&badges, BadgeKind::NightOwl).unlocked);
    }
}
