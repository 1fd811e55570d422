// src/entity/note.rs
use chrono::{DateTime, Local, TimeDelta, Utc};
use uuid::Uuid;

use super::Reminder;

/// Title stored when a note is created with a blank title.
pub const UNTITLED: &str = "Untitled note";

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub reminder: Option<Reminder>,
    pub reminder_active: bool,
}

impl Note {
    /// Create a note. The reminder starts armed whenever one is given.
    pub fn new(id: String, title: String, content: String, reminder: Option<Reminder>) -> Self {
        Self {
            id,
            title,
            content,
            created_at: Utc::now(),
            reminder_active: reminder.is_some(),
            reminder,
        }
    }

    /// True while the reminder is configured and still eligible to fire.
    pub fn is_armed(&self) -> bool {
        self.reminder_active && self.reminder.is_some()
    }

    pub fn target_instant(&self) -> Option<DateTime<Local>> {
        self.reminder.as_ref().map(Reminder::target_instant)
    }

    /// Armed and `now` falls in `[target, target + window)`.
    pub fn is_due(&self, now: DateTime<Local>, window: TimeDelta) -> bool {
        if !self.is_armed() {
            return false;
        }
        match self.target_instant() {
            Some(target) => {
                let elapsed = now.signed_duration_since(target);
                elapsed >= TimeDelta::zero() && elapsed < window
            }
            None => false,
        }
    }

    pub fn disarm(&mut self) {
        self.reminder_active = false;
    }

    /// Compare against a candidate title/content pair after trimming and
    /// case-folding both sides.
    pub fn same_text_as(&self, title: &str, content: &str) -> bool {
        normalize(&self.title) == normalize(title) && normalize(&self.content) == normalize(content)
    }
}

/// Comparison form of a text field. Stored values are never normalized.
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// `<unix millis>-<9 random hex chars>`.
pub fn generate_id(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", now.timestamp_millis(), &suffix[..9])
}
