//! Draft values handed to the persister

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A snapshot of in-progress edits
///
/// The persister clones and stores drafts but never looks inside them,
/// except through [`Draft::has_content`] (or a predicate configured on
/// [`crate::AutosaveConfig`]) to decide whether a save is worth making.
pub trait Draft: Clone + Send + Sync + 'static {
    /// Textual fields consulted by the default content check
    fn text_fields(&self) -> Vec<&str>;

    /// True when at least one textual field is non-blank
    fn has_content(&self) -> bool {
        self.text_fields().iter().any(|field| !field.trim().is_empty())
    }
}

impl Draft for String {
    fn text_fields(&self) -> Vec<&str> {
        vec![self.as_str()]
    }
}

/// The event form being edited
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub venue: String,
    pub starts_at: Option<DateTime<Utc>>,
    pub capacity: Option<u32>,
}

#[derive(Debug, Error)]
pub enum DraftFieldError {
    #[error("unknown field: {0} (expected title, description, venue, starts_at or capacity)")]
    UnknownField(String),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl EventDraft {
    /// Set one field from its textual form
    ///
    /// An empty value clears optional fields.
    pub fn set_field(&mut self, name: &str, value: &str) -> Result<(), DraftFieldError> {
        let value = value.trim();
        match name.trim() {
            "title" => self.title = value.to_string(),
            "description" => self.description = value.to_string(),
            "venue" => self.venue = value.to_string(),
            "starts_at" => {
                self.starts_at = if value.is_empty() {
                    None
                } else {
                    let parsed = DateTime::parse_from_rfc3339(value).map_err(|e| {
                        DraftFieldError::InvalidValue {
                            field: "starts_at",
                            reason: e.to_string(),
                        }
                    })?;
                    Some(parsed.with_timezone(&Utc))
                };
            }
            "capacity" => {
                self.capacity = if value.is_empty() {
                    None
                } else {
                    let parsed = value.parse().map_err(|e: std::num::ParseIntError| {
                        DraftFieldError::InvalidValue {
                            field: "capacity",
                            reason: e.to_string(),
                        }
                    })?;
                    Some(parsed)
                };
            }
            other => return Err(DraftFieldError::UnknownField(other.to_string())),
        }
        Ok(())
    }
}

impl Draft for EventDraft {
    fn text_fields(&self) -> Vec<&str> {
        vec![
            self.title.as_str(),
            self.description.as_str(),
            self.venue.as_str(),
        ]
    }
}
