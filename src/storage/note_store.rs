use std::collections::HashSet;

use tracing::{debug, warn};

use super::backend::Backend;
use super::record::{decode_notes, encode_notes};
use crate::entity::Note;
use crate::error::StoreError;

/// Key used when no other key is configured.
pub const DEFAULT_STORAGE_KEY: &str = "floating-notes";

/// The authoritative in-memory note collection, mirrored to a backend.
///
/// Persistence is whole-collection: every mutation re-serializes and writes
/// all notes. A failed write is logged and remembered, never returned to the
/// mutating caller; the in-memory notes stay authoritative until the next
/// successful save.
pub struct NoteStore<B: Backend> {
    backend: B,
    key: String,
    notes: Vec<Note>,
    last_save_error: Option<StoreError>,
    /// Set while the backend could not be read. Writes are refused so the
    /// unread data is never overwritten.
    load_error: Option<StoreError>,
}

impl<B: Backend> NoteStore<B> {
    /// Open the store, loading whatever the backend holds.
    ///
    /// Malformed data is discarded: the key is removed from the backend and
    /// the store starts empty. When the backend itself cannot be read, the
    /// store starts empty in memory only and keeps its hands off the key
    /// until a [`NoteStore::reload`] succeeds.
    pub fn open(backend: B, key: impl Into<String>) -> Self {
        let mut store = Self {
            backend,
            key: key.into(),
            notes: Vec::new(),
            last_save_error: None,
            load_error: None,
        };

        match store.load() {
            Ok(notes) => {
                debug!(key = %store.key, count = notes.len(), "loaded notes");
                store.notes = notes;
            }
            Err(e @ StoreError::Corrupt(_)) => {
                warn!(key = %store.key, error = %e, "discarding unreadable notes");
                if let Err(e) = store.backend.remove(&store.key) {
                    warn!(key = %store.key, error = %e, "failed to clear unreadable notes");
                }
            }
            Err(e) => {
                warn!(key = %store.key, error = %e, "notes not loaded; writes held back");
                store.load_error = Some(e);
            }
        }

        store
    }

    /// Replace the in-memory notes with what the backend holds now, picking
    /// up writes made by other processes.
    ///
    /// Unsaved changes are written first; if that write fails the in-memory
    /// notes are kept and the error returned. Malformed backing data is
    /// overwritten with the in-memory notes.
    pub fn reload(&mut self) -> Result<(), StoreError> {
        if self.load_error.is_none() && self.is_dirty() {
            self.save()?;
        }

        match self.load() {
            Ok(notes) => {
                debug!(key = %self.key, count = notes.len(), "reloaded notes");
                self.notes = notes;
                self.load_error = None;
                self.last_save_error = None;
                Ok(())
            }
            Err(e @ StoreError::Corrupt(_)) => {
                self.load_error = None;
                warn!(
                    key = %self.key,
                    error = %e,
                    "replacing unreadable notes with the in-memory copy"
                );
                self.save()
            }
            Err(e) => Err(e),
        }
    }

    /// Read and decode the backing data. A missing key is an empty collection.
    pub fn load(&self) -> Result<Vec<Note>, StoreError> {
        let raw = self
            .backend
            .get(&self.key)
            .map_err(|e| StoreError::Unreadable(e.to_string()))?;

        match raw {
            None => Ok(Vec::new()),
            Some(raw) => decode_notes(&raw).map(dedupe_ids),
        }
    }

    /// Serialize and write the full collection. Refused while the backend
    /// could not be read.
    pub fn save(&mut self) -> Result<(), StoreError> {
        if let Some(e) = &self.load_error {
            return Err(e.clone());
        }
        let json = encode_notes(&self.notes)?;
        self.backend
            .set(&self.key, &json)
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        self.last_save_error = None;
        Ok(())
    }

    fn persist(&mut self) {
        if let Err(e) = self.save() {
            warn!(key = %self.key, error = %e, "notes kept in memory only");
            self.last_save_error = Some(e);
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// True when the last write failed and memory is ahead of the backend.
    pub fn is_dirty(&self) -> bool {
        self.last_save_error.is_some()
    }

    pub fn last_save_error(&self) -> Option<&StoreError> {
        self.last_save_error.as_ref()
    }

    /// Why the backend could not be read at open, if it could not.
    pub fn load_error(&self) -> Option<&StoreError> {
        self.load_error.as_ref()
    }

    /// Replace the whole collection.
    pub fn replace_all(&mut self, notes: Vec<Note>) {
        self.notes = dedupe_ids(notes);
        self.persist();
    }

    /// Replace the note with the same id, or insert it first (newest first).
    pub fn upsert(&mut self, note: Note) {
        match self.notes.iter().position(|n| n.id == note.id) {
            Some(pos) => self.notes[pos] = note,
            None => self.notes.insert(0, note),
        }
        self.persist();
    }

    /// Remove a note. A missing id changes nothing and writes nothing.
    pub fn remove(&mut self, id: &str) -> Option<Note> {
        let pos = self.notes.iter().position(|n| n.id == id)?;
        let removed = self.notes.remove(pos);
        self.persist();
        Some(removed)
    }

    /// Edit notes in place as one critical section, then persist once.
    ///
    /// The closure sees a slice, so it can change notes but not add or
    /// remove them.
    pub fn update<F, T>(&mut self, f: F) -> T
    where
        F: FnOnce(&mut [Note]) -> T,
    {
        let out = f(&mut self.notes);
        self.persist();
        out
    }
}

/// Keep the first note for each id.
fn dedupe_ids(notes: Vec<Note>) -> Vec<Note> {
    let mut seen = HashSet::new();
    notes
        .into_iter()
        .filter(|note| {
            let fresh = seen.insert(note.id.clone());
            if !fresh {
                warn!(note_id = %note.id, "dropping note with duplicate id");
            }
            fresh
        })
        .collect()
}
