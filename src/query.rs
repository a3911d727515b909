// 🔎 Query Engine - filtered view + totals
// Pure functions, recomputed from scratch whenever entries or criteria change

use crate::entry::Entry;
use crate::validation::{hours_or_zero, is_valid_date};
use tracing::debug;

/// Transient filter inputs. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Free text matched against RO and description
    pub query: String,
    /// Inclusive lower bound; ignored when empty or not a valid date
    pub from: String,
    /// Inclusive upper bound; ignored when empty or not a valid date
    pub to: String,
}

impl FilterCriteria {
    pub fn new(query: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        FilterCriteria {
            query: query.into(),
            from: from.into(),
            to: to.into(),
        }
    }

    /// True when no predicate would exclude anything
    pub fn is_unfiltered(&self) -> bool {
        self.query.trim().is_empty()
            && active_bound(&self.from).is_none()
            && active_bound(&self.to).is_none()
    }

    /// Does `entry` pass every active predicate?
    pub fn matches(&self, entry: &Entry) -> bool {
        let needle = self.query.trim().to_lowercase();
        let text_ok = needle.is_empty()
            || format!("{} {}", entry.ro, entry.description)
                .to_lowercase()
                .contains(&needle);

        // Canonical dates are fixed-width and zero-padded: string order == date order
        let from_ok = active_bound(&self.from).map_or(true, |from| entry.date.as_str() >= from);
        let to_ok = active_bound(&self.to).map_or(true, |to| entry.date.as_str() <= to);

        text_ok && from_ok && to_ok
    }
}

fn active_bound(bound: &str) -> Option<&str> {
    if is_valid_date(bound) {
        Some(bound)
    } else {
        None
    }
}

/// Entries passing `criteria`, input order kept
pub fn filtered(entries: &[Entry], criteria: &FilterCriteria) -> Vec<Entry> {
    entries
        .iter()
        .filter(|e| criteria.matches(e))
        .cloned()
        .collect()
}

/// Sum of hours; anything non-numeric counts as zero
pub fn total(entries: &[Entry]) -> f64 {
    entries.iter().map(|e| hours_or_zero(e.hours)).sum()
}

/// Two decimals, as every display shows hours
pub fn format_hours(hours: f64) -> String {
    format!("{:.2}", hours_or_zero(hours))
}

// ============================================================================
// SUMMARY
// ============================================================================

/// The figures shown above the entry table, plus the view they describe
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub view: Vec<Entry>,
    pub total_all: f64,
    pub total_filtered: f64,
    pub count: usize,
}

pub fn summarize(entries: &[Entry], criteria: &FilterCriteria) -> Summary {
    let view = filtered(entries, criteria);
    let summary = Summary {
        total_all: total(entries),
        total_filtered: total(&view),
        count: view.len(),
        view,
    };

    debug!(
        "Recomputed view: {}/{} entries, {:.2} hours",
        summary.count,
        entries.len(),
        summary.total_filtered
    );
    summary
}
