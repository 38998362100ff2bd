//! Analytics engine for tally
//!
//! Pure, synchronous transforms over record snapshots:
//! - Calendar-day bucketing ([`buckets`])
//! - Consecutive-day streaks ([`streaks`])
//! - Trend series and attribute distributions ([`trends`])
//! - Overview aggregates ([`dashboard`])
//! - Achievement badges ([`badges`])
//!
//! Nothing here touches the database, the clock, or any shared state:
//! callers fetch a snapshot from [`crate::Database`], pass it in together
//! with an explicit reference date, and render the returned values.
//! Repeated calls with the same snapshot and reference date produce
//! identical output, which the UIs rely on for stable re-renders.

pub mod badges;
pub mod buckets;
pub mod dashboard;
pub mod streaks;
pub mod trends;

pub use badges::{evaluate as evaluate_badges, BadgeKind, BadgeStatus};
pub use buckets::{counts_by_day, day_key, distinct_day_count, seed_window};
pub use dashboard::DashboardStats;
pub use streaks::{calculate as calculate_streaks, StreakSummary};
pub use trends::{
    distribution, monthly_heatmap, numeric_series, range_counts, weekly_trend, RangeCounts,
    TrendPoint,
};
