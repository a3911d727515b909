// 📦 Import/Export Codec
// JSON = full-fidelity round trip; CSV = the filtered view, for spreadsheets

use crate::entry::{new_id, sort_by_date_desc, Entry};
use crate::error::ImportError;
use crate::validation::is_valid_date;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const CSV_HEADER: &str = "RO,Date,Description,Hours Flagged";

// ============================================================================
// EXPORT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn mime(&self) -> &str {
        match self {
            ExportFormat::Csv => "text/csv;charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }

    pub fn extension(&self) -> &str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    /// `flat_rate_hours_<unix-millis>.<ext>`
    pub fn file_name(&self, at: DateTime<Utc>) -> String {
        format!("flat_rate_hours_{}.{}", at.timestamp_millis(), self.extension())
    }
}

/// CSV of the given rows, in the given order.
///
/// The header line is plain; every data field is quoted. Lines are joined with
/// `\n` and there is no trailing newline.
pub fn to_csv(entries: &[Entry]) -> String {
    let mut lines = Vec::with_capacity(entries.len() + 1);
    lines.push(CSV_HEADER.to_string());

    for entry in entries {
        let fields = [
            entry.ro.clone(),
            entry.date.clone(),
            entry.description.clone(),
            entry.hours.to_string(),
        ];
        let row: Vec<String> = fields.iter().map(|f| quote_field(f)).collect();
        lines.push(row.join(","));
    }

    lines.join("\n")
}

fn quote_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Pretty-printed JSON array of every entry, ids included
pub fn to_json(entries: &[Entry]) -> Result<String> {
    serde_json::to_string_pretty(entries).context("Failed to serialize entries")
}

/// Write an export next to the others in `dir`, returning the file path
pub fn write_export(
    dir: &Path,
    format: ExportFormat,
    contents: &str,
    at: DateTime<Utc>,
) -> Result<PathBuf> {
    let path = dir.join(format.file_name(at));
    fs::write(&path, contents)
        .with_context(|| format!("Failed to write export {}", path.display()))?;
    Ok(path)
}

// ============================================================================
// IMPORT
// ============================================================================

/// Only `.json` files are offered to the importer
pub fn is_importable(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Read an import file once
pub fn read_import(path: &Path) -> Result<String> {
    if !is_importable(path) {
        anyhow::bail!("{} is not a .json file", path.display());
    }

    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Parse foreign JSON and merge it in front of `existing`.
///
/// Rows are normalized leniently: bad dates become `today`, a missing RO
/// becomes empty, unusable hours become 0. An id that is falsy or already
/// taken gets a fresh one. Only a non-array document or a `null` row rejects
/// the whole import.
pub fn import_json(
    text: &str,
    existing: &[Entry],
    today: &str,
) -> Result<Vec<Entry>, ImportError> {
    let rows = parse_rows(text)?;
    let mut taken: HashSet<String> = existing.iter().map(|e| e.id.clone()).collect();

    let mut merged = Vec::with_capacity(rows.len() + existing.len());
    for (index, row) in rows.iter().enumerate() {
        let entry = normalize_row(row, today, &mut taken)
            .ok_or_else(|| ImportError::ParseFailure(format!("row {} is null", index)))?;
        merged.push(entry);
    }
    merged.extend(existing.iter().cloned());

    sort_by_date_desc(&mut merged);
    Ok(merged)
}

/// Rebuild a stored snapshot row by row.
///
/// Same cleanup as an import, except unusable rows are skipped instead of
/// failing the lot. Returns the entries and how many rows were skipped.
pub fn recover_snapshot(text: &str, today: &str) -> Result<(Vec<Entry>, usize), ImportError> {
    let rows = parse_rows(text)?;
    let mut taken = HashSet::new();

    let mut entries = Vec::with_capacity(rows.len());
    let mut skipped = 0;
    for row in &rows {
        if !row.is_object() {
            skipped += 1;
            continue;
        }
        if let Some(entry) = normalize_row(row, today, &mut taken) {
            entries.push(entry);
        }
    }

    sort_by_date_desc(&mut entries);
    Ok((entries, skipped))
}

fn parse_rows(text: &str) -> Result<Vec<Value>, ImportError> {
    let data: Value =
        serde_json::from_str(text).map_err(|e| ImportError::ParseFailure(e.to_string()))?;

    match data {
        Value::Array(rows) => Ok(rows),
        _ => Err(ImportError::NotAnArray),
    }
}

fn normalize_row(row: &Value, today: &str, taken: &mut HashSet<String>) -> Option<Entry> {
    if row.is_null() {
        return None;
    }

    let field = |name: &str| row.get(name).unwrap_or(&Value::Null);

    let mut id = if is_truthy(field("id")) {
        coerce_text(field("id"))
    } else {
        new_id()
    };
    while !taken.insert(id.clone()) {
        id = new_id();
    }

    let date = match field("date") {
        Value::String(s) if is_valid_date(s) => s.clone(),
        _ => today.to_string(),
    };

    Some(Entry {
        id,
        ro: coerce_text(field("ro")).trim().to_string(),
        date,
        description: coerce_text(field("description")),
        hours: coerce_hours(field("hours")),
    })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text coercion; `null` becomes empty
fn coerce_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Numeric coercion with an explicit zero default.
///
/// Negative and non-finite results also fall back to zero so imported rows
/// honour the `hours >= 0` invariant.
fn coerce_hours(value: &Value) -> f64 {
    let hours = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) if s.trim().is_empty() => 0.0,
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    };

    if hours.is_finite() && hours >= 0.0 {
        hours
    } else {
        0.0
    }
}
