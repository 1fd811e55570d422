//! Note lifecycle: creation with duplicate detection, deletion, and the
//! user-facing reminder toggle.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::entity::{generate_id, Note, Reminder, UNTITLED};
use crate::error::{FloatnotesError, Result};
use crate::storage::{Backend, NoteStore};

/// Input for [`NoteController::create_note`].
#[derive(Debug, Clone, Default)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub reminder_date: Option<NaiveDate>,
    pub reminder_time: Option<NaiveTime>,
}

impl NewNote {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_reminder(mut self, date: NaiveDate, time: NaiveTime) -> Self {
        self.reminder_date = Some(date);
        self.reminder_time = Some(time);
        self
    }
}

/// Whether the user may re-arm a reminder whose instant has already passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RearmPolicy {
    #[default]
    RejectPast,
    AllowPast,
}

impl std::fmt::Display for RearmPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RearmPolicy::RejectPast => write!(f, "reject_past"),
            RearmPolicy::AllowPast => write!(f, "allow_past"),
        }
    }
}

impl std::str::FromStr for RearmPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "reject_past" => Ok(RearmPolicy::RejectPast),
            "allow_past" => Ok(RearmPolicy::AllowPast),
            _ => Err(format!("Invalid rearm policy: {}", s)),
        }
    }
}

/// What a toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Armed,
    Disarmed,
    /// The note has no reminder configured; nothing changed.
    NoReminder,
    /// Re-arming refused because the target instant has passed.
    Expired,
    NotFound,
}

pub struct NoteController<B: Backend> {
    store: NoteStore<B>,
    policy: RearmPolicy,
}

impl<B: Backend> NoteController<B> {
    pub fn new(store: NoteStore<B>, policy: RearmPolicy) -> Self {
        Self { store, policy }
    }

    pub fn store(&self) -> &NoteStore<B> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut NoteStore<B> {
        &mut self.store
    }

    pub fn notes(&self) -> &[Note] {
        self.store.notes()
    }

    pub fn policy(&self) -> RearmPolicy {
        self.policy
    }

    /// Existing note whose title and content match after trimming and
    /// case-folding.
    pub fn find_duplicate(&self, title: &str, content: &str) -> Option<&Note> {
        self.store
            .notes()
            .iter()
            .find(|note| note.same_text_as(title, content))
    }

    /// Create and persist a note.
    ///
    /// Rejected when both title and content are blank, when only one reminder
    /// field is given, or when a note with the same normalized title and
    /// content already exists. The check compares the title as given; a
    /// blank title is only replaced by [`UNTITLED`] afterwards.
    pub fn create_note(&mut self, new: NewNote) -> Result<Note> {
        if new.title.trim().is_empty() && new.content.trim().is_empty() {
            return Err(FloatnotesError::EmptyNote);
        }

        let reminder = match (new.reminder_date, new.reminder_time) {
            (Some(date), Some(time)) => Some(Reminder::new(date, time)),
            (None, None) => None,
            _ => {
                return Err(FloatnotesError::InvalidReminder(
                    "a reminder needs both a date and a time".to_string(),
                ))
            }
        };

        if let Some(existing) = self.find_duplicate(&new.title, &new.content) {
            return Err(FloatnotesError::Duplicate {
                existing_id: existing.id.clone(),
            });
        }

        let title = if new.title.trim().is_empty() {
            UNTITLED.to_string()
        } else {
            new.title
        };

        let note = Note::new(self.fresh_id(), title, new.content, reminder);
        info!(note_id = %note.id, armed = note.reminder_active, "created note");
        self.store.upsert(note.clone());
        Ok(note)
    }

    /// Delete a note. Unknown ids are not an error.
    pub fn delete_note(&mut self, id: &str) -> Option<Note> {
        let removed = self.store.remove(id);
        match &removed {
            Some(_) => info!(note_id = %id, "deleted note"),
            None => debug!(note_id = %id, "delete of unknown note ignored"),
        }
        removed
    }

    /// Flip a note's reminder between armed and disarmed.
    ///
    /// Only notes with a configured reminder change. Re-arming a reminder
    /// whose instant is at or before `now` is refused under
    /// [`RearmPolicy::RejectPast`].
    pub fn toggle_reminder(&mut self, id: &str, now: DateTime<Local>) -> ToggleOutcome {
        let Some(note) = self.store.get(id) else {
            return ToggleOutcome::NotFound;
        };
        let Some(target) = note.target_instant() else {
            return ToggleOutcome::NoReminder;
        };

        let outcome = if note.reminder_active {
            ToggleOutcome::Disarmed
        } else if self.policy == RearmPolicy::RejectPast && target <= now {
            return ToggleOutcome::Expired;
        } else {
            ToggleOutcome::Armed
        };

        let mut updated = note.clone();
        updated.reminder_active = outcome == ToggleOutcome::Armed;
        self.store.upsert(updated);
        info!(note_id = %id, ?outcome, "toggled reminder");
        outcome
    }

    /// Resolve a user-supplied id: exact match first, then a unique prefix.
    pub fn resolve_id(&self, query: &str) -> Result<String> {
        let query = query.trim();
        if let Some(note) = self.store.get(query) {
            return Ok(note.id.clone());
        }

        let mut matches = self
            .store
            .notes()
            .iter()
            .filter(|note| !query.is_empty() && note.id.starts_with(query));
        match (matches.next(), matches.next()) {
            (Some(note), None) => Ok(note.id.clone()),
            (Some(_), Some(_)) => Err(FloatnotesError::AmbiguousId(query.to_string())),
            _ => Err(FloatnotesError::NoteNotFound(query.to_string())),
        }
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = generate_id(Utc::now());
            if self.store.get(&id).is_none() {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryBackend, DEFAULT_STORAGE_KEY};
    use chrono::TimeDelta;

    fn controller(policy: RearmPolicy) -> NoteController<MemoryBackend> {
        let store = NoteStore::open(MemoryBackend::new(), DEFAULT_STORAGE_KEY);
        NoteController::new(store, policy)
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn time(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    #[test]
    fn test_create_keeps_text_as_typed() {
        let mut c = controller(RearmPolicy::default());
        let note = c.create_note(NewNote::new("  Milk ", "Buy MILK")).unwrap();

        assert_eq!(note.title, "  Milk ");
        assert_eq!(note.content, "Buy MILK");
        assert!(!note.reminder_active);
        assert_eq!(c.notes().len(), 1);
    }

    #[test]
    fn test_duplicate_rejected_across_case_and_whitespace() {
        let mut c = controller(RearmPolicy::default());
        let first = c.create_note(NewNote::new("Milk", "Buy milk")).unwrap();

        let err = c
            .create_note(NewNote::new("  mILK", "buy milk  "))
            .unwrap_err();
        match err {
            FloatnotesError::Duplicate { existing_id } => assert_eq!(existing_id, first.id),
            other => panic!("expected Duplicate, got {:?}", other),
        }
        assert_eq!(c.notes().len(), 1);
    }

    #[test]
    fn test_same_title_different_content_is_allowed() {
        let mut c = controller(RearmPolicy::default());
        c.create_note(NewNote::new("Milk", "Buy milk")).unwrap();
        c.create_note(NewNote::new("Milk", "Buy oat milk")).unwrap();
        assert_eq!(c.notes().len(), 2);
    }

    #[test]
    fn test_blank_title_gets_placeholder() {
        let mut c = controller(RearmPolicy::default());
        let note = c.create_note(NewNote::new("   ", "just content")).unwrap();
        assert_eq!(note.title, UNTITLED);
    }

    #[test]
    fn test_blank_titles_compare_before_placeholder() {
        let mut c = controller(RearmPolicy::default());
        c.create_note(NewNote::new("", "same")).unwrap();
        c.create_note(NewNote::new("", "same")).unwrap();
        assert_eq!(c.notes().len(), 2);

        assert!(matches!(
            c.create_note(NewNote::new("untitled NOTE", "Same")),
            Err(FloatnotesError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_empty_note_rejected() {
        let mut c = controller(RearmPolicy::default());
        assert!(matches!(
            c.create_note(NewNote::new(" ", "\n")),
            Err(FloatnotesError::EmptyNote)
        ));
        assert!(c.notes().is_empty());
    }

    #[test]
    fn test_half_reminder_rejected() {
        let mut c = controller(RearmPolicy::default());
        let mut new = NewNote::new("t", "c");
        new.reminder_date = Some(date("2024-01-01"));

        assert!(matches!(
            c.create_note(new),
            Err(FloatnotesError::InvalidReminder(_))
        ));
    }

    #[test]
    fn test_reminder_arms_on_create() {
        let mut c = controller(RearmPolicy::default());
        let note = c
            .create_note(NewNote::new("t", "c").with_reminder(date("2024-01-01"), time("09:00")))
            .unwrap();
        assert!(note.reminder_active);
    }

    #[test]
    fn test_ids_unique_for_rapid_creation() {
        let mut c = controller(RearmPolicy::default());
        for i in 0..200 {
            c.create_note(NewNote::new(format!("note {}", i), "")).unwrap();
        }
        let mut ids: Vec<&str> = c.notes().iter().map(|n| n.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 200);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut c = controller(RearmPolicy::default());
        let note = c.create_note(NewNote::new("t", "c")).unwrap();

        assert!(c.delete_note(&note.id).is_some());
        assert!(c.delete_note(&note.id).is_none());
        assert!(c.notes().is_empty());
    }

    #[test]
    fn test_toggle_without_reminder_is_noop() {
        let mut c = controller(RearmPolicy::default());
        let note = c.create_note(NewNote::new("t", "c")).unwrap();

        assert_eq!(
            c.toggle_reminder(&note.id, Local::now()),
            ToggleOutcome::NoReminder
        );
        assert_eq!(c.store().get(&note.id).unwrap(), &note);
    }

    #[test]
    fn test_toggle_unknown_id() {
        let mut c = controller(RearmPolicy::default());
        assert_eq!(
            c.toggle_reminder("missing", Local::now()),
            ToggleOutcome::NotFound
        );
    }

    #[test]
    fn test_toggle_round_trip_for_future_reminder() {
        let mut c = controller(RearmPolicy::RejectPast);
        let note = c
            .create_note(NewNote::new("t", "c").with_reminder(date("2024-01-01"), time("09:00")))
            .unwrap();
        let before = note.target_instant().unwrap() - TimeDelta::hours(1);

        assert_eq!(c.toggle_reminder(&note.id, before), ToggleOutcome::Disarmed);
        assert!(!c.store().get(&note.id).unwrap().reminder_active);
        assert_eq!(c.toggle_reminder(&note.id, before), ToggleOutcome::Armed);
        assert!(c.store().get(&note.id).unwrap().reminder_active);
    }

    #[test]
    fn test_reject_past_refuses_rearm() {
        let mut c = controller(RearmPolicy::RejectPast);
        let note = c
            .create_note(NewNote::new("t", "c").with_reminder(date("2024-01-01"), time("09:00")))
            .unwrap();
        let after = note.target_instant().unwrap() + TimeDelta::minutes(5);

        assert_eq!(c.toggle_reminder(&note.id, after), ToggleOutcome::Disarmed);
        assert_eq!(c.toggle_reminder(&note.id, after), ToggleOutcome::Expired);
        assert!(!c.store().get(&note.id).unwrap().reminder_active);
    }

    #[test]
    fn test_allow_past_rearms() {
        let mut c = controller(RearmPolicy::AllowPast);
        let note = c
            .create_note(NewNote::new("t", "c").with_reminder(date("2024-01-01"), time("09:00")))
            .unwrap();
        let after = note.target_instant().unwrap() + TimeDelta::minutes(5);

        assert_eq!(c.toggle_reminder(&note.id, after), ToggleOutcome::Disarmed);
        assert_eq!(c.toggle_reminder(&note.id, after), ToggleOutcome::Armed);
        assert!(c.store().get(&note.id).unwrap().reminder_active);
    }

    #[test]
    fn test_resolve_id_prefix() {
        let mut c = controller(RearmPolicy::default());
        let a = c.create_note(NewNote::new("a", "")).unwrap();

        assert_eq!(c.resolve_id(&a.id).unwrap(), a.id);
        assert_eq!(c.resolve_id(&a.id[..a.id.len() - 3]).unwrap(), a.id);
        assert!(matches!(
            c.resolve_id("nope"),
            Err(FloatnotesError::NoteNotFound(_))
        ));
        assert!(matches!(
            c.resolve_id(""),
            Err(FloatnotesError::NoteNotFound(_))
        ));
    }

    #[test]
    fn test_resolve_id_ambiguous() {
        let mut c = controller(RearmPolicy::default());
        c.store_mut().replace_all(vec![
            Note::new("17-aaa".to_string(), "a".to_string(), String::new(), None),
            Note::new("17-aab".to_string(), "b".to_string(), String::new(), None),
        ]);

        assert!(matches!(
            c.resolve_id("17-aa"),
            Err(FloatnotesError::AmbiguousId(_))
        ));
        assert_eq!(c.resolve_id("17-aab").unwrap(), "17-aab");
    }

    #[test]
    fn test_rearm_policy_parse() {
        assert_eq!("allow-past".parse::<RearmPolicy>().unwrap(), RearmPolicy::AllowPast);
        assert_eq!("REJECT_PAST".parse::<RearmPolicy>().unwrap(), RearmPolicy::RejectPast);
        assert!("sometimes".parse::<RearmPolicy>().is_err());
    }
}
