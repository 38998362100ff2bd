//! # tally-core
//!
//! Core library for tally - a personal habit and event tracker.
//!
//! This library provides:
//! - Domain types for events, records, and attributes
//! - Database storage layer with SQLite
//! - A pure analytics engine (streaks, trends, distributions, badges)
//! - Best-effort remote mirroring of local writes
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Architecture
//!
//! The store hands out point-in-time record snapshots; the analytics
//! engine is a set of pure transforms over those snapshots with an
//! explicit reference date, so every aggregate is deterministic and
//! recomputed fresh per request. Display layers only format what the
//! engine returns.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tally_core::{Config, Database};
//!
//! // Load configuration
//! let config = Config::load().expect("failed to load config");
//!
//! // Open database
//! let db = Database::open(&Config::database_path()).expect("failed to open database");
//! db.migrate().expect("failed to run migrations");
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use db::Database;
pub use error::{Error, Result};
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod mirror;
pub mod types;
