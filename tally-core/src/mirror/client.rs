//! HTTP client for the remote mirror backend
//!
//! The backend exposes a thin REST surface over the same two tables the
//! local store keeps: `events` and `event_records`. Row filters are
//! passed PostgREST-style (`?id=eq.<uuid>`).

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;

use crate::config::MirrorConfig;
use crate::error::{Error, Result};
use crate::types::{Event, Record};

/// Wire representation of an event row.
#[derive(Debug, Serialize)]
pub struct MirrorEvent<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub icon: &'a str,
    pub color: u32,
    pub category: &'a str,
    pub created_at: i64,
    pub creator_id: &'a str,
    pub attributes: String,
}

impl<'a> MirrorEvent<'a> {
    pub fn from_event(event: &'a Event, user_id: &'a str) -> Result<Self> {
        Ok(Self {
            id: &event.id,
            name: &event.name,
            icon: &event.icon,
            color: event.color,
            category: event.category.as_str(),
            created_at: event.created_at_ms,
            creator_id: user_id,
            attributes: serde_json::to_string(&event.attributes)?,
        })
    }
}

/// Wire representation of a record row. The backend assigns its own id;
/// deletes are keyed by `(event_id, timestamp)`.
#[derive(Debug, Serialize)]
pub struct MirrorRecord<'a> {
    pub event_id: &'a str,
    pub timestamp: i64,
    pub note: &'a str,
    pub attributes: String,
}

impl<'a> MirrorRecord<'a> {
    pub fn from_record(record: &'a Record) -> Result<Self> {
        Ok(Self {
            event_id: &record.event_id,
            timestamp: record.timestamp_ms,
            note: &record.note,
            attributes: serde_json::to_string(&record.attributes)?,
        })
    }
}

/// HTTP client for the mirror backend
pub struct MirrorClient {
    config: MirrorConfig,
    http_client: reqwest::Client,
    base_url: String,
}

impl MirrorClient {
    /// Create a new mirror client from configuration
    ///
    /// Returns an error if the configuration is invalid or missing required fields.
    pub fn new(config: MirrorConfig) -> Result<Self> {
        config.validate()?;

        let base_url = config
            .server_url
            .clone()
            .ok_or_else(|| Error::Config("mirror.server_url is required".to_string()))?
            .trim_end_matches('/')
            .to_string();

        // Build default headers
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        // Add authorization header
        if let Some(api_key) = &config.api_key {
            let auth_value = format!("Bearer {}", api_key);
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&auth_value)
                    .map_err(|e| Error::Config(format!("invalid api_key: {}", e)))?,
            );
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
            base_url,
        })
    }

    /// The account id attached to mirrored writes.
    pub fn user_id(&self) -> &str {
        self.config.user_id.as_deref().unwrap_or("")
    }

    /// Push an event row
    pub async fn push_event(&self, event: &MirrorEvent<'_>) -> Result<()> {
        let url = format!("{}/events", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .json(event)
            .send()
            .await
            .map_err(|e| Error::Mirror(format!("HTTP request failed: {}", e)))?;
        check_status(response).await
    }

    /// Delete an event row by id
    pub async fn delete_event(&self, event_id: &str) -> Result<()> {
        let url = format!("{}/events", self.base_url);
        let response = self
            .http_client
            .delete(&url)
            .query(&[("id", format!("eq.{}", event_id))])
            .send()
            .await
            .map_err(|e| Error::Mirror(format!("HTTP request failed: {}", e)))?;
        check_status(response).await
    }

    /// Push a record row
    pub async fn push_record(&self, record: &MirrorRecord<'_>) -> Result<()> {
        let url = format!("{}/event_records", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .json(record)
            .send()
            .await
            .map_err(|e| Error::Mirror(format!("HTTP request failed: {}", e)))?;
        check_status(response).await
    }

    /// Delete a record row by event id and timestamp
    pub async fn delete_record(&self, event_id: &str, timestamp_ms: i64) -> Result<()> {
        let url = format!("{}/event_records", self.base_url);
        let response = self
            .http_client
            .delete(&url)
            .query(&[
                ("event_id", format!("eq.{}", event_id)),
                ("timestamp", format!("eq.{}", timestamp_ms)),
            ])
            .send()
            .await
            .map_err(|e| Error::Mirror(format!("HTTP request failed: {}", e)))?;
        check_status(response).await
    }

    /// Check if the mirror backend is reachable
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url);

        match self.http_client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }
}

async fn check_status(response: reqwest::Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown".to_string());
        Err(Error::Mirror(format!(
            "API error ({}): {}",
            status, error_text
        )))
    }
}
