// 🔧 Entry Model - one flagged repair order
// Identity (id) never changes; every other field is replaced wholesale on edit

use crate::error::ValidationError;
use crate::validation::{is_valid_date, parse_hours};
use serde::{Deserialize, Serialize};

/// A flat rate hour entry, exactly as persisted and exported
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Stable identity (UUID v4 for entries created here)
    pub id: String,

    /// Repair-order reference, trimmed
    pub ro: String,

    /// Canonical `YYYY-MM-DD`
    pub date: String,

    #[serde(default)]
    pub description: String,

    /// Hours flagged, finite and `>= 0`
    pub hours: f64,
}

/// Fresh collision-resistant identifier
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Raw form values as the presentation layer collects them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryDraft {
    pub ro: String,
    pub date: String,
    pub description: String,
    pub hours: String,
}

/// Draft that passed validation, ready to become (part of) an Entry
#[derive(Debug, Clone, PartialEq)]
pub struct ValidFields {
    pub ro: String,
    pub date: String,
    pub description: String,
    pub hours: f64,
}

impl EntryDraft {
    pub fn new(
        ro: impl Into<String>,
        date: impl Into<String>,
        description: impl Into<String>,
        hours: impl Into<String>,
    ) -> Self {
        EntryDraft {
            ro: ro.into(),
            date: date.into(),
            description: description.into(),
            hours: hours.into(),
        }
    }

    /// Prefill a draft from an existing entry (edit form)
    pub fn from_entry(entry: &Entry) -> Self {
        EntryDraft {
            ro: entry.ro.clone(),
            date: entry.date.clone(),
            description: entry.description.clone(),
            hours: entry.hours.to_string(),
        }
    }

    /// Trim and validate. First failing field wins: ro, then date, then hours.
    pub fn validate(&self) -> Result<ValidFields, ValidationError> {
        let ro = self.ro.trim();
        if ro.is_empty() {
            return Err(ValidationError::MissingRo);
        }

        if !is_valid_date(&self.date) {
            return Err(ValidationError::InvalidDate);
        }

        let hours = parse_hours(&self.hours).ok_or(ValidationError::InvalidHours)?;

        Ok(ValidFields {
            ro: ro.to_string(),
            date: self.date.clone(),
            description: self.description.trim().to_string(),
            hours,
        })
    }
}

impl ValidFields {
    pub fn into_entry(self, id: String) -> Entry {
        Entry {
            id,
            ro: self.ro,
            date: self.date,
            description: self.description,
            hours: self.hours,
        }
    }
}

/// Sort newest date first.
///
/// Stable: entries sharing a date keep their relative order, so callers that
/// put new rows at the front get "new before existing" for free.
pub fn sort_by_date_desc(entries: &mut [Entry]) {
    entries.sort_by(|a, b| b.date.cmp(&a.date));
}
