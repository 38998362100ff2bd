//! tally - habit tracking and statistics CLI
//!
//! The terminal front end for the tally core: event and record CRUD plus
//! rendered dashboards, streaks, trends, and badges. All aggregates come
//! from `tally_core::analytics`; this binary only formats them.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::io::Write;
use std::str::FromStr;

use tally_core::analytics::{self, BadgeStatus, DashboardStats, StreakSummary, TrendPoint};
use tally_core::mirror::SyncMirror;
use tally_core::types::{
    AttributeType, Event, EventCategory, Record, RecordFilter,
};
use tally_core::{Config, Database};

#[derive(Parser, Debug)]
#[command(name = "tally")]
#[command(about = "Track habits and events, see streaks and trends")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage trackable events
    Event {
        #[command(subcommand)]
        command: EventCommand,
    },
    /// Log a record against an event
    Log {
        /// Event id or name
        event: String,
        /// Free-text note
        #[arg(long, default_value = "")]
        note: String,
        /// Attribute value, NAME=VALUE (repeatable)
        #[arg(long = "attr", value_name = "NAME=VALUE")]
        attrs: Vec<String>,
        /// Timestamp (RFC 3339, "YYYY-MM-DD HH:MM" local, or epoch ms);
        /// defaults to now
        #[arg(long)]
        at: Option<String>,
    },
    /// List records, newest first
    Records {
        /// Restrict to one event (id or name)
        #[arg(long)]
        event: Option<String>,
        /// Maximum rows to show
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// Delete a record by id instead of listing
        #[arg(long, value_name = "ID")]
        delete: Option<i64>,
    },
    /// Show statistics (global dashboard, or one event with --event)
    Stats {
        /// Event id or name
        #[arg(long)]
        event: Option<String>,
    },
    /// Show achievement badges
    Badges,
    /// Export records
    Export {
        /// Restrict to one event (id or name)
        #[arg(long)]
        event: Option<String>,
        /// Output format: json or csv
        #[arg(long, default_value = "json")]
        format: String,
        /// Output path (stdout if omitted)
        #[arg(long)]
        out: Option<std::path::PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum EventCommand {
    /// Create an event
    Add {
        name: String,
        /// Icon identifier
        #[arg(long, default_value = "")]
        icon: String,
        /// ARGB color, hex (e.g. FF64B5F6)
        #[arg(long, default_value = "FF90CAF9")]
        color: String,
        /// Category: daily, health, finance, learning, entertainment
        #[arg(long, default_value = "daily")]
        category: String,
        /// Grouping label
        #[arg(long, default_value = "default")]
        group: String,
        /// Offer for one-tap logging
        #[arg(long)]
        quick: bool,
    },
    /// List all events
    List,
    /// Delete an event and all of its records
    Rm {
        /// Event id or name
        event: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load().context("failed to load configuration")?;
    let _log_guard = tally_core::logging::init(&config.logging).ok();

    let db = Database::open(&Config::database_path()).context("failed to open database")?;
    db.migrate().context("failed to run migrations")?;

    let mirror = SyncMirror::from_config(&config.mirror).unwrap_or_else(|e| {
        eprintln!("warning: mirror disabled: {}", e);
        None
    });

    match cli.command {
        Command::Event { command } => run_event(&db, mirror.as_ref(), command),
        Command::Log {
            event,
            note,
            attrs,
            at,
        } => run_log(&db, mirror.as_ref(), &event, note, &attrs, at.as_deref()),
        Command::Records {
            event,
            limit,
            delete,
        } => run_records(&db, mirror.as_ref(), event.as_deref(), limit, delete),
        Command::Stats { event } => run_stats(&db, event.as_deref()),
        Command::Badges => run_badges(&db),
        Command::Export { event, format, out } => {
            run_export(&db, event.as_deref(), &format, out.as_deref())
        }
    }
}

// ============================================
// Commands
// ============================================

fn run_event(db: &Database, mirror: Option<&SyncMirror>, command: EventCommand) -> Result<()> {
    match command {
        EventCommand::Add {
            name,
            icon,
            color,
            category,
            group,
            quick,
        } => {
            let category = EventCategory::from_str(&category)
                .map_err(|e| anyhow::anyhow!("invalid --category: {}", e))?;
            let mut event = Event::new(&name, category, Local::now().timestamp_millis());
            event.icon = icon;
            event.color = parse_color(&color).context("invalid --color")?;
            event.group_name = group;
            event.is_quick_record = quick;

            db.upsert_event(&event)?;
            if let Some(mirror) = mirror {
                mirror.event_saved(&event);
            }
            println!("Created event {} ({})", event.name, event.id);
            Ok(())
        }
        EventCommand::List => {
            let events = db.list_events()?;
            if events.is_empty() {
                println!("No events yet. Create one with `tally event add <name>`.");
                return Ok(());
            }
            for event in events {
                println!(
                    "{:<36}  {:<16} {:<13} {}",
                    event.id,
                    event.name,
                    event.category.display_name(),
                    if event.is_quick_record { "quick" } else { "" }
                );
            }
            Ok(())
        }
        EventCommand::Rm { event } => {
            let event = resolve_event(db, &event)?;
            db.delete_event(&event.id)?;
            if let Some(mirror) = mirror {
                mirror.event_deleted(&event.id);
            }
            println!("Deleted event {} and its records", event.name);
            Ok(())
        }
    }
}

fn run_log(
    db: &Database,
    mirror: Option<&SyncMirror>,
    event: &str,
    note: String,
    attrs: &[String],
    at: Option<&str>,
) -> Result<()> {
    let event = resolve_event(db, event)?;
    let timestamp_ms = match at {
        Some(spec) => parse_timestamp(spec)?,
        None => Local::now().timestamp_millis(),
    };

    let mut record = Record::new(&event.id, timestamp_ms);
    record.note = note;
    record.attributes = parse_attrs(&event, attrs)?;

    let id = db.insert_record(&record)?;
    record.id = id;
    if let Some(mirror) = mirror {
        mirror.record_saved(&record);
    }
    println!(
        "Logged {} at {} (record {})",
        event.name,
        format_ts(timestamp_ms),
        id
    );
    Ok(())
}

fn run_records(
    db: &Database,
    mirror: Option<&SyncMirror>,
    event: Option<&str>,
    limit: usize,
    delete: Option<i64>,
) -> Result<()> {
    if let Some(id) = delete {
        let filter = RecordFilter::default();
        let record = db
            .list_records(&filter)?
            .into_iter()
            .find(|r| r.id == id)
            .with_context(|| format!("record {} not found", id))?;
        db.delete_record(id)?;
        if let Some(mirror) = mirror {
            mirror.record_deleted(&record.event_id, record.timestamp_ms);
        }
        println!("Deleted record {}", id);
        return Ok(());
    }

    let event = match event {
        Some(spec) => Some(resolve_event(db, spec)?),
        None => None,
    };
    let records = db.list_records(&RecordFilter {
        event_id: event.as_ref().map(|e| e.id.clone()),
        limit: Some(limit),
        ..Default::default()
    })?;

    if records.is_empty() {
        println!("No records.");
        return Ok(());
    }

    let names: HashMap<String, String> = db
        .list_events()?
        .into_iter()
        .map(|e| (e.id, e.name))
        .collect();

    for record in records {
        let name = names
            .get(&record.event_id)
            .map(String::as_str)
            .unwrap_or(record.event_id.as_str());
        let note = if record.note.is_empty() {
            String::new()
        } else {
            format!("  \"{}\"", record.note)
        };
        println!(
            "{:>6}  {}  {:<16}{}",
            record.id,
            format_ts(record.timestamp_ms),
            name,
            note
        );
    }
    Ok(())
}

fn run_stats(db: &Database, event: Option<&str>) -> Result<()> {
    let now = Local::now();
    match event {
        Some(spec) => {
            let event = resolve_event(db, spec)?;
            let records = db.list_records(&RecordFilter {
                event_id: Some(event.id.clone()),
                ..Default::default()
            })?;
            print_event_stats(&event, &records, now);
        }
        None => {
            let events = db.list_events()?;
            let records = db.list_records(&RecordFilter::default())?;
            let stats = DashboardStats::collect(&events, &records, now);
            print_dashboard(&stats);
        }
    }
    Ok(())
}

fn run_badges(db: &Database) -> Result<()> {
    let records = db.list_records(&RecordFilter::default())?;
    let badges = analytics::evaluate_badges(&records, Local::now().date_naive());

    println!();
    for badge in &badges {
        print_badge(badge);
    }
    println!();
    Ok(())
}

fn run_export(
    db: &Database,
    event: Option<&str>,
    format: &str,
    out: Option<&std::path::Path>,
) -> Result<()> {
    let event = match event {
        Some(spec) => Some(resolve_event(db, spec)?),
        None => None,
    };
    let records = db.list_records(&RecordFilter {
        event_id: event.as_ref().map(|e| e.id.clone()),
        ..Default::default()
    })?;

    let output: Box<dyn Write> = match out {
        Some(path) => Box::new(std::fs::File::create(path).context("failed to create output")?),
        None => Box::new(std::io::stdout()),
    };

    match format {
        "json" => export_json(records, output)?,
        "csv" => export_csv(records, output)?,
        other => bail!("unknown export format: {}. Use 'json' or 'csv'", other),
    }
    Ok(())
}

fn export_json(records: Vec<Record>, mut output: Box<dyn Write>) -> Result<()> {
    serde_json::to_writer_pretty(&mut output, &records).context("failed to write JSON")?;
    writeln!(output)?;
    Ok(())
}

fn export_csv(records: Vec<Record>, output: Box<dyn Write>) -> Result<()> {
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record(["id", "event_id", "timestamp_ms", "note", "attributes"])?;
    for record in records {
        writer.write_record([
            record.id.to_string(),
            record.event_id.clone(),
            record.timestamp_ms.to_string(),
            record.note.clone(),
            serde_json::to_string(&record.attributes)?,
        ])?;
    }
    writer.flush()?;
    Ok(())
}

// ============================================
// Rendering
// ============================================

fn print_dashboard(stats: &DashboardStats) {
    println!();
    println!("╭{}╮", "─".repeat(50));
    println!("│{:^50}│", "TALLY DASHBOARD");
    println!("╰{}╯", "─".repeat(50));
    println!();

    if stats.total_records == 0 {
        println!("  No records yet. Log one with `tally log <event>`.");
        println!();
        return;
    }

    println!("SUMMARY");
    println!(
        "   Events:  {:<10} Records: {:<10} Today: {}",
        stats.total_events, stats.total_records, stats.today_records
    );
    println!();

    print_streaks(&stats.streaks);

    println!("LAST 7 DAYS");
    print_trend_bars(&stats.weekly_trend);
    println!();

    if !stats.category_distribution.is_empty() {
        println!("BY CATEGORY");
        for (category, count) in &stats.category_distribution {
            println!("   {:<14} {}", category.display_name(), count);
        }
        println!();
    }

    println!("ACTIVITY (28 DAYS)");
    print_heatmap(stats.daily_activity.values().copied().collect::<Vec<_>>());
    println!();

    println!(
        "   Peak hour: {:02}:00   Busiest day: {}",
        stats.peak_hour,
        weekday_name(stats.busiest_weekday)
    );
    println!();
}

fn print_event_stats(event: &Event, records: &[Record], now: DateTime<Local>) {
    let today = now.date_naive();

    println!();
    println!("╭{}╮", "─".repeat(50));
    println!("│{:^50}│", event.name.to_uppercase());
    println!("╰{}╯", "─".repeat(50));
    println!();

    if records.is_empty() {
        println!("  No records for this event yet.");
        println!();
        return;
    }

    println!("   Total records: {}", records.len());
    println!();

    print_streaks(&analytics::calculate_streaks(records, today));

    println!("LAST 7 DAYS");
    print_trend_bars(&analytics::weekly_trend(records, today));
    println!();

    println!("ACTIVITY (28 DAYS)");
    let heatmap = analytics::monthly_heatmap(records, today);
    print_heatmap(heatmap.values().copied().collect::<Vec<_>>());
    println!();

    for attr in &event.attributes {
        if attr.kind.is_numeric() {
            let series = analytics::numeric_series(records, &attr.id);
            if series.is_empty() {
                continue;
            }
            let values: Vec<f64> = series.iter().map(|(_, v)| *v).collect();
            let sum: f64 = values.iter().sum();
            let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let unit = attr.unit.as_deref().unwrap_or("");
            println!("{}", attr.name.to_uppercase());
            println!(
                "   {} points   avg {:.1}{}   min {:.1}{}   max {:.1}{}",
                series.len(),
                sum / values.len() as f64,
                unit,
                min,
                unit,
                max,
                unit
            );
            println!();
        } else if attr.kind.is_categorical() {
            let dist =
                analytics::distribution(records, &attr.id, attr.kind.is_multi_value());
            if dist.is_empty() {
                continue;
            }
            let mut entries: Vec<(String, u32)> = dist.into_iter().collect();
            entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
            println!("{}", attr.name.to_uppercase());
            for (label, count) in entries {
                println!("   {:<16} {}", label, count);
            }
            println!();
        }
    }
}

fn print_streaks(streaks: &StreakSummary) {
    println!("STREAKS");
    println!(
        "   Current: {} day{}   Longest: {} day{}",
        streaks.current,
        plural(streaks.current),
        streaks.longest,
        plural(streaks.longest)
    );
    println!();
}

fn print_trend_bars(trend: &[TrendPoint]) {
    let max = trend.iter().map(|p| p.count).max().unwrap_or(0).max(1);
    for point in trend {
        let width = (point.count * 30 / max) as usize;
        println!(
            "   {}  {:<30}  {}",
            point.day.format("%m-%d"),
            "█".repeat(width),
            point.count
        );
    }
}

fn print_heatmap(counts: Vec<u32>) {
    // Four rows of seven days, oldest first.
    for week in counts.chunks(7) {
        print!("   ");
        for &count in week {
            let cell = match count {
                0 => "··",
                1 => "▪ ",
                2..=3 => "▪▪",
                _ => "██",
            };
            print!("{} ", cell);
        }
        println!();
    }
}

fn print_badge(badge: &BadgeStatus) {
    let mark = if badge.unlocked { "★" } else { "☆" };
    let when = badge
        .unlocked_at_ms
        .map(|ts| format!("  (since {})", format_ts(ts)))
        .unwrap_or_default();
    println!(
        " {} {:<14} {}{}",
        mark,
        badge.kind.display_name(),
        badge.kind.description(),
        when
    );
}

// ============================================
// Parsing helpers
// ============================================

fn resolve_event(db: &Database, id_or_name: &str) -> Result<Event> {
    db.find_event(id_or_name)?
        .with_context(|| format!("no event matching '{}'", id_or_name))
}

/// Parse an ARGB hex color, accepting RRGGBB (opaque) or AARRGGBB.
fn parse_color(spec: &str) -> Result<u32> {
    let hex = spec.trim_start_matches('#');
    let value = u32::from_str_radix(hex, 16)
        .with_context(|| format!("'{}' is not a hex color", spec))?;
    Ok(match hex.len() {
        6 => 0xFF00_0000 | value,
        8 => value,
        _ => bail!("expected RRGGBB or AARRGGBB, got '{}'", spec),
    })
}

/// Parse a timestamp spec: RFC 3339, local "YYYY-MM-DD HH:MM", or epoch ms.
fn parse_timestamp(spec: &str) -> Result<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(spec) {
        return Ok(dt.timestamp_millis());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(spec, "%Y-%m-%d %H:%M") {
        if let Some(local) = Local.from_local_datetime(&naive).single() {
            return Ok(local.timestamp_millis());
        }
    }
    if let Ok(ms) = spec.parse::<i64>() {
        return Ok(ms);
    }
    bail!("could not parse timestamp '{}'", spec)
}

/// Parse `NAME=VALUE` attribute arguments against the event's definitions.
fn parse_attrs(event: &Event, attrs: &[String]) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();
    for spec in attrs {
        let (name, value) = spec
            .split_once('=')
            .with_context(|| format!("expected NAME=VALUE, got '{}'", spec))?;
        let def = event
            .attributes
            .iter()
            .find(|a| a.name == name || a.id == name)
            .with_context(|| format!("event '{}' has no attribute '{}'", event.name, name))?;
        if def.kind == AttributeType::Switch && !matches!(value, "true" | "false") {
            bail!("attribute '{}' expects true or false", name);
        }
        map.insert(def.id.clone(), value.to_string());
    }
    Ok(map)
}

fn format_ts(timestamp_ms: i64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}

fn weekday_name(index: u8) -> &'static str {
    match index {
        0 => "Monday",
        1 => "Tuesday",
        2 => "Wednesday",
        3 => "Thursday",
        4 => "Friday",
        5 => "Saturday",
        6 => "Sunday",
        _ => "Unknown",
    }
}

fn plural(n: u32) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("64B5F6").unwrap(), 0xFF64_B5F6);
        assert_eq!(parse_color("#8064B5F6").unwrap(), 0x8064_B5F6);
        assert!(parse_color("xyz").is_err());
        assert!(parse_color("FFF").is_err());
    }

    #[test]
    fn test_parse_timestamp_epoch_ms() {
        assert_eq!(parse_timestamp("1700000000000").unwrap(), 1_700_000_000_000);
        assert!(parse_timestamp("not a time").is_err());
    }

    #[test]
    fn test_parse_timestamp_rfc3339() {
        let ms = parse_timestamp("2024-03-01T09:00:00Z").unwrap();
        assert_eq!(ms, 1_709_283_600_000);
    }

    #[test]
    fn test_parse_attrs() {
        let mut event = Event::new("Run", EventCategory::Health, 0);
        let def = tally_core::types::AttributeDefinition::new(
            "Distance",
            AttributeType::Number,
        );
        let id = def.id.clone();
        event.attributes.push(def);

        let parsed = parse_attrs(&event, &["Distance=5".to_string()]).unwrap();
        assert_eq!(parsed[&id], "5");

        assert!(parse_attrs(&event, &["Pace=4".to_string()]).is_err());
        assert!(parse_attrs(&event, &["Distance".to_string()]).is_err());
    }

    #[test]
    fn test_weekday_name() {
        assert_eq!(weekday_name(0), "Monday");
        assert_eq!(weekday_name(6), "Sunday");
    }
}
