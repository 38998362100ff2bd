//! Best-effort remote mirroring of local writes
//!
//! Every local write can be shadowed to a hosted backend so other devices
//! see the same data. The mirror is strictly fire-and-forget: each push
//! is attempted exactly once, a failure is logged and discarded, and the
//! local operation has already succeeded by the time the mirror runs.
//! There is no queue, no retry, and no redelivery.

mod client;

pub use client::{MirrorClient, MirrorEvent, MirrorRecord};

use crate::config::MirrorConfig;
use crate::error::Result;
use crate::types::{Event, Record};

/// Blocking facade over [`MirrorClient`] for synchronous callers.
///
/// All push methods swallow transport errors; they only surface through
/// `tracing::warn!`.
pub struct SyncMirror {
    client: MirrorClient,
    runtime: tokio::runtime::Runtime,
}

impl SyncMirror {
    /// Create a sync mirror from configuration
    ///
    /// Returns None if the mirror is not enabled or not properly configured.
    pub fn from_config(config: &MirrorConfig) -> Result<Option<Self>> {
        if !config.is_ready() {
            return Ok(None);
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| crate::error::Error::Mirror(format!("failed to create runtime: {}", e)))?;

        let client = MirrorClient::new(config.clone())?;
        Ok(Some(Self { client, runtime }))
    }

    /// Mirror a created or updated event (blocking, best-effort)
    pub fn event_saved(&self, event: &Event) {
        let user_id = self.client.user_id().to_string();
        let result = match MirrorEvent::from_event(event, &user_id) {
            Ok(wire) => self.runtime.block_on(self.client.push_event(&wire)),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            tracing::warn!(event_id = %event.id, error = %e, "Failed to mirror event");
        }
    }

    /// Mirror an event deletion (blocking, best-effort)
    pub fn event_deleted(&self, event_id: &str) {
        if let Err(e) = self.runtime.block_on(self.client.delete_event(event_id)) {
            tracing::warn!(event_id, error = %e, "Failed to mirror event deletion");
        }
    }

    /// Mirror a created record (blocking, best-effort)
    pub fn record_saved(&self, record: &Record) {
        let result = match MirrorRecord::from_record(record) {
            Ok(wire) => self.runtime.block_on(self.client.push_record(&wire)),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            tracing::warn!(
                event_id = %record.event_id,
                timestamp = record.timestamp_ms,
                error = %e,
                "Failed to mirror record"
            );
        }
    }

    /// Mirror a record deletion (blocking, best-effort)
    pub fn record_deleted(&self, event_id: &str, timestamp_ms: i64) {
        if let Err(e) = self
            .runtime
            .block_on(self.client.delete_record(event_id, timestamp_ms))
        {
            tracing::warn!(event_id, timestamp = timestamp_ms, error = %e, "Failed to mirror record deletion");
        }
    }

    /// Check backend reachability (blocking)
    pub fn health_check(&self) -> bool {
        self.runtime
            .block_on(self.client.health_check())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirror_disabled_config() {
        let config = MirrorConfig::default();
        let mirror = SyncMirror::from_config(&config).unwrap();
        assert!(mirror.is_none());
    }

    #[test]
    fn test_mirror_enabled_but_incomplete_config() {
        // Enabled but missing server_url: not ready, so no mirror is built.
        let config = MirrorConfig {
            enabled: true,
            user_id: Some("u-1".to_string()),
            ..Default::default()
        };
        assert!(SyncMirror::from_config(&config).unwrap().is_none());
    }
}
