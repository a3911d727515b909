// Flat Rate Hour Tracker - Core Library
// Exposes the entry store, query engine and codec to the binary and tests

pub mod codec;
pub mod db;
pub mod entry;
pub mod error;
pub mod presets;
pub mod query;
pub mod store;
pub mod validation;

// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
pub mod ui;

// Re-export commonly used types
pub use codec::{
    import_json, is_importable, read_import, to_csv, to_json, write_export, ExportFormat,
    CSV_HEADER,
};
pub use db::{KeyValueStore, MemorySlot, SqliteSlot, STORAGE_KEY};
pub use entry::{new_id, sort_by_date_desc, Entry, EntryDraft};
pub use error::{ImportError, StorageError, StoreError, ValidationError};
pub use presets::{local_today, start_of_week, DateRange, QuickRange};
pub use query::{filtered, format_hours, summarize, total, FilterCriteria, Summary};
pub use store::EntryStore;
pub use validation::{hours_or_zero, is_valid_date, is_valid_hours, parse_hours};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
