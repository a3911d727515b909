// 📒 Entry Store - the one mutable thing in the system
// Sorted by date descending; every successful mutation persists the whole set

use crate::codec;
use crate::db::{KeyValueStore, STORAGE_KEY};
use crate::entry::{new_id, sort_by_date_desc, Entry, EntryDraft};
use crate::error::{StorageError, StoreError};
use crate::presets::{format_date, local_today};
use tracing::{debug, info, warn};

pub struct EntryStore<S: KeyValueStore> {
    slot: S,
    entries: Vec<Entry>,
}

impl<S: KeyValueStore> EntryStore<S> {
    /// Load the persisted snapshot.
    ///
    /// Never fails: a missing, unreadable or corrupt snapshot starts an empty
    /// collection (and logs why). Rows are cleaned up one at a time, so a
    /// single bad row costs only that row.
    pub fn load(slot: S) -> Self {
        let today = format_date(local_today());
        let entries = match slot.read(STORAGE_KEY) {
            Ok(Some(json)) => match codec::recover_snapshot(&json, &today) {
                Ok((entries, skipped)) => {
                    if skipped > 0 {
                        warn!("Skipped {} unusable snapshot rows", skipped);
                    }
                    entries
                }
                Err(e) => {
                    warn!("Discarding unparsable snapshot: {:?}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Could not read snapshot, starting empty: {}", e);
                Vec::new()
            }
        };

        info!("Loaded {} entries", entries.len());
        EntryStore { slot, entries }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Give back the backend (tests inspect what was persisted)
    pub fn into_slot(self) -> S {
        self.slot
    }

    // ========================================================================
    // MUTATIONS
    // ========================================================================

    pub fn create(&mut self, draft: &EntryDraft) -> Result<Entry, StoreError> {
        let entry = draft.validate()?.into_entry(new_id());

        let mut next = Vec::with_capacity(self.entries.len() + 1);
        next.push(entry.clone());
        next.extend(self.entries.iter().cloned());
        sort_by_date_desc(&mut next);

        self.commit(next)?;
        info!(id = %entry.id, ro = %entry.ro, date = %entry.date, "Entry created");
        Ok(entry)
    }

    pub fn update(&mut self, id: &str, draft: &EntryDraft) -> Result<Entry, StoreError> {
        let fields = draft.validate()?;

        let index = self.position(id)?;
        let updated = fields.into_entry(id.to_string());

        let mut next = self.entries.clone();
        next[index] = updated.clone();
        sort_by_date_desc(&mut next);

        self.commit(next)?;
        info!(id = %id, "Entry updated");
        Ok(updated)
    }

    pub fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        let index = self.position(id)?;

        let mut next = self.entries.clone();
        next.remove(index);

        self.commit(next)?;
        info!(id = %id, "Entry deleted");
        Ok(())
    }

    /// Drop everything. Callers must have asked the user first.
    pub fn clear_all(&mut self) -> Result<(), StoreError> {
        self.commit(Vec::new())?;
        info!("All entries cleared");
        Ok(())
    }

    /// Merge an exported JSON document into the store; all or nothing
    pub fn import_json(&mut self, text: &str, today: &str) -> Result<usize, StoreError> {
        let merged = codec::import_json(text, &self.entries, today)?;
        let imported = merged.len() - self.entries.len();

        self.commit(merged)?;
        info!("Imported {} entries", imported);
        Ok(imported)
    }

    fn position(&self, id: &str) -> Result<usize, StoreError> {
        self.entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Persist `next`, then adopt it. A failed write leaves state untouched.
    fn commit(&mut self, next: Vec<Entry>) -> Result<(), StoreError> {
        let json = serde_json::to_string(&next).map_err(StorageError::from)?;
        self.slot.write(STORAGE_KEY, &json)?;

        debug!("Persisted {} entries", next.len());
        self.entries = next;
        Ok(())
    }
}
