//! Core domain types for tally
//!
//! These types form the canonical data model shared by the storage layer,
//! the analytics engine, and the consuming UIs.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Event** | A user-defined trackable habit or category ("Running", "Journal") |
//! | **Record** | One timestamped occurrence logged against an Event |
//! | **Attribute** | A typed field a user attaches to an Event's records (number, select, rating, ...) |
//! | **Category** | A coarse grouping of Events used for dashboard breakdowns |
//! | **Streak** | A run of consecutive local calendar days each containing at least one Record |
//!
//! Attribute values are stored string-encoded on each record, keyed by the
//! attribute definition's id. The encoding depends on the attribute type:
//! numbers and ratings as decimal strings, switches as `"true"`/`"false"`,
//! single selects as the option label, multi selects as a comma-separated
//! label list. The analytics layer treats unparseable values as absent.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================
// Event category
// ============================================

/// Coarse grouping for events, used on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Daily,
    Health,
    Finance,
    Learning,
    Entertainment,
}

impl EventCategory {
    /// Returns the display name for this category
    pub fn display_name(&self) -> &'static str {
        match self {
            EventCategory::Daily => "Daily",
            EventCategory::Health => "Health",
            EventCategory::Finance => "Finance",
            EventCategory::Learning => "Learning",
            EventCategory::Entertainment => "Entertainment",
        }
    }

    /// Returns the identifier used in database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Daily => "daily",
            EventCategory::Health => "health",
            EventCategory::Finance => "finance",
            EventCategory::Learning => "learning",
            EventCategory::Entertainment => "entertainment",
        }
    }

    /// All categories, in display order.
    pub fn all() -> &'static [EventCategory] {
        &[
            EventCategory::Daily,
            EventCategory::Health,
            EventCategory::Finance,
            EventCategory::Learning,
            EventCategory::Entertainment,
        ]
    }
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EventCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" | "Daily" => Ok(EventCategory::Daily),
            "health" | "Health" => Ok(EventCategory::Health),
            "finance" | "Finance" => Ok(EventCategory::Finance),
            "learning" | "Learning" => Ok(EventCategory::Learning),
            "entertainment" | "Entertainment" => Ok(EventCategory::Entertainment),
            _ => Err(format!("unknown event category: {}", s)),
        }
    }
}

// ============================================
// Attributes
// ============================================

/// The value type of a user-defined attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    /// Decimal number, optionally with a display unit
    Number,
    /// One option label out of a fixed set
    SingleSelect,
    /// Comma-separated option labels out of a fixed set
    MultiSelect,
    /// Short free text
    Text,
    /// Long free text
    LongText,
    /// Boolean toggle, stored as "true"/"false"
    Switch,
    /// Star rating, stored as an integer string
    Rating,
}

impl AttributeType {
    /// Returns the identifier used in stored attribute configs
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeType::Number => "number",
            AttributeType::SingleSelect => "single_select",
            AttributeType::MultiSelect => "multi_select",
            AttributeType::Text => "text",
            AttributeType::LongText => "long_text",
            AttributeType::Switch => "switch",
            AttributeType::Rating => "rating",
        }
    }

    /// Whether a stored value for this type is a comma-separated label list.
    pub fn is_multi_value(&self) -> bool {
        matches!(self, AttributeType::MultiSelect)
    }

    /// Whether values of this type chart as a numeric series.
    pub fn is_numeric(&self) -> bool {
        matches!(self, AttributeType::Number)
    }

    /// Whether values of this type chart as a label distribution.
    pub fn is_categorical(&self) -> bool {
        matches!(
            self,
            AttributeType::SingleSelect | AttributeType::MultiSelect | AttributeType::Rating
        )
    }
}

impl std::fmt::Display for AttributeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AttributeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "number" => Ok(AttributeType::Number),
            "single_select" => Ok(AttributeType::SingleSelect),
            "multi_select" => Ok(AttributeType::MultiSelect),
            "text" => Ok(AttributeType::Text),
            "long_text" => Ok(AttributeType::LongText),
            "switch" => Ok(AttributeType::Switch),
            "rating" => Ok(AttributeType::Rating),
            _ => Err(format!("unknown attribute type: {}", s)),
        }
    }
}

/// One selectable option of a single/multi select attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeOption {
    /// Option label, also the stored value
    pub label: String,
    /// ARGB color for chart rendering
    pub color: u32,
}

/// A user-defined attribute attached to an event.
///
/// Definitions are stored as a JSON array on the owning event row; record
/// rows reference them by `id` in their attribute map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeDefinition {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// Display name ("Amount", "Mood")
    pub name: String,
    /// Value type
    pub kind: AttributeType,
    /// Options for select types (empty otherwise)
    #[serde(default)]
    pub options: Vec<AttributeOption>,
    /// Optional help text
    #[serde(default)]
    pub description: String,
    /// Whether the attribute must be filled on every record
    #[serde(default)]
    pub required: bool,
    /// Display unit for numbers ("ml", "min")
    #[serde(default)]
    pub unit: Option<String>,
    /// Pre-filled value in entry forms
    #[serde(default)]
    pub default_value: Option<String>,
}

impl AttributeDefinition {
    /// Create a definition with a fresh id and no options.
    pub fn new(name: impl Into<String>, kind: AttributeType) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            kind,
            options: Vec::new(),
            description: String::new(),
            required: false,
            unit: None,
            default_value: None,
        }
    }
}

// ============================================
// Event
// ============================================

/// A user-defined trackable habit or category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// Display name
    pub name: String,
    /// Icon identifier, interpreted by the display layer
    pub icon: String,
    /// ARGB background color
    pub color: u32,
    /// Dashboard category
    pub category: EventCategory,
    /// Creation time, milliseconds since epoch
    pub created_at_ms: i64,
    /// Whether the user created this event (vs. a preset)
    pub is_custom: bool,
    /// Whether the event is offered for one-tap logging
    pub is_quick_record: bool,
    /// Attribute definitions for this event's records
    #[serde(default)]
    pub attributes: Vec<AttributeDefinition>,
    /// User-chosen grouping label
    pub group_name: String,
}

impl Event {
    /// Create an event with a fresh id and defaults.
    pub fn new(name: impl Into<String>, category: EventCategory, created_at_ms: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            icon: String::new(),
            color: 0xFF90_CAF9,
            category,
            created_at_ms,
            is_custom: true,
            is_quick_record: false,
            attributes: Vec::new(),
            group_name: "default".to_string(),
        }
    }

    /// Look up an attribute definition by id.
    pub fn attribute(&self, id: &str) -> Option<&AttributeDefinition> {
        self.attributes.iter().find(|a| a.id == id)
    }
}

// ============================================
// Record
// ============================================

/// One timestamped occurrence logged against an event.
///
/// A record's timestamp is immutable once created; the only mutation the
/// rest of the system observes is deletion, after which the record simply
/// no longer appears in query snapshots. All aggregates recompute from the
/// full current snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Row id (assigned by the database on insert)
    pub id: i64,
    /// Owning event id
    pub event_id: String,
    /// Occurrence time, milliseconds since epoch
    pub timestamp_ms: i64,
    /// Free-text note, may be empty
    pub note: String,
    /// Attribute-definition id -> string-encoded value
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl Record {
    /// Create an unsaved record (id 0 until inserted).
    pub fn new(event_id: impl Into<String>, timestamp_ms: i64) -> Self {
        Self {
            id: 0,
            event_id: event_id.into(),
            timestamp_ms,
            note: String::new(),
            attributes: HashMap::new(),
        }
    }
}

// ============================================
// Queries
// ============================================

/// Filter for listing records.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// Restrict to one event
    pub event_id: Option<String>,
    /// Inclusive lower bound, milliseconds since epoch
    pub since_ms: Option<i64>,
    /// Inclusive upper bound, milliseconds since epoch
    pub until_ms: Option<i64>,
    /// Maximum number of rows (newest first)
    pub limit: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_category_roundtrip() {
        for cat in EventCategory::all() {
            assert_eq!(EventCategory::from_str(cat.as_str()).unwrap(), *cat);
        }
        assert!(EventCategory::from_str("bogus").is_err());
    }

    #[test]
    fn test_attribute_type_roundtrip() {
        let kinds = [
            AttributeType::Number,
            AttributeType::SingleSelect,
            AttributeType::MultiSelect,
            AttributeType::Text,
            AttributeType::LongText,
            AttributeType::Switch,
            AttributeType::Rating,
        ];
        for kind in kinds {
            assert_eq!(AttributeType::from_str(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn test_attribute_type_classification() {
        assert!(AttributeType::Number.is_numeric());
        assert!(!AttributeType::Rating.is_numeric());
        assert!(AttributeType::MultiSelect.is_multi_value());
        assert!(AttributeType::Rating.is_categorical());
        assert!(!AttributeType::Text.is_categorical());
    }

    #[test]
    fn test_attribute_definition_json_roundtrip() {
        let mut def = AttributeDefinition::new("Type", AttributeType::SingleSelect);
        def.options.push(AttributeOption {
            label: "Food".to_string(),
            color: 0xFFEF_5350,
        });
        let json = serde_json::to_string(&def).unwrap();
        let back: AttributeDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "Type");
        assert_eq!(back.kind, AttributeType::SingleSelect);
        assert_eq!(back.options.len(), 1);
    }

    #[test]
    fn test_event_attribute_lookup() {
        let mut event = Event::new("Spending", EventCategory::Finance, 0);
        let def = AttributeDefinition::new("Amount", AttributeType::Number);
        let id = def.id.clone();
        event.attributes.push(def);
        assert!(event.attribute(&id).is_some());
        assert!(event.attribute("missing").is_none());
    }
}
