//! Wire format of the persisted note collection.
//!
//! The backing key holds a JSON array of [`NoteRecord`]s. Decoding is an
//! explicit, typed step: every timestamp, date and time is parsed into a
//! real value, and any failure turns the whole blob into
//! [`StoreError::Corrupt`].

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::entity::{parse_reminder_date, parse_reminder_time, Note, Reminder};
use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_time: Option<String>,
    #[serde(default)]
    pub is_reminder_active: bool,
}

impl From<&Note> for NoteRecord {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id.clone(),
            title: note.title.clone(),
            content: note.content.clone(),
            created_at: note.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            reminder_date: note.reminder.as_ref().map(Reminder::date_label),
            reminder_time: note.reminder.as_ref().map(Reminder::time_label),
            is_reminder_active: note.is_armed(),
        }
    }
}

impl TryFrom<NoteRecord> for Note {
    type Error = StoreError;

    fn try_from(record: NoteRecord) -> Result<Self, Self::Error> {
        if record.id.trim().is_empty() {
            return Err(StoreError::Corrupt("note with an empty id".to_string()));
        }

        let created_at = DateTime::parse_from_rfc3339(&record.created_at)
            .map_err(|e| {
                StoreError::Corrupt(format!(
                    "note {}: bad createdAt '{}': {}",
                    record.id, record.created_at, e
                ))
            })?
            .with_timezone(&Utc);

        let reminder = match (&record.reminder_date, &record.reminder_time) {
            (Some(date), Some(time)) => {
                let date = parse_reminder_date(date)
                    .map_err(|e| StoreError::Corrupt(format!("note {}: {}", record.id, e)))?;
                let time = parse_reminder_time(time)
                    .map_err(|e| StoreError::Corrupt(format!("note {}: {}", record.id, e)))?;
                Some(Reminder::new(date, time))
            }
            (None, None) => None,
            _ => {
                warn!(note_id = %record.id, "dropping half-configured reminder");
                None
            }
        };

        Ok(Note {
            id: record.id,
            title: record.title,
            content: record.content,
            created_at,
            reminder_active: record.is_reminder_active && reminder.is_some(),
            reminder,
        })
    }
}

/// Decode a stored blob into notes.
pub fn decode_notes(raw: &str) -> Result<Vec<Note>, StoreError> {
    let records: Vec<NoteRecord> =
        serde_json::from_str(raw).map_err(|e| StoreError::Corrupt(e.to_string()))?;
    records.into_iter().map(Note::try_from).collect()
}

/// Encode the full collection.
pub fn encode_notes(notes: &[Note]) -> Result<String, StoreError> {
    let records: Vec<NoteRecord> = notes.iter().map(NoteRecord::from).collect();
    serde_json::to_string(&records).map_err(|e| StoreError::WriteFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    #[test]
    fn test_decode_legacy_blob() {
        // Older blobs carry full ISO timestamps in reminderDate.
        let raw = r#"[{
            "id": "1704099600000-k3j5h2l1q",
            "title": "Milk",
            "content": "Buy milk",
            "createdAt": "2023-12-31T18:00:00.000Z",
            "reminderDate": "2024-01-01T00:00:00.000Z",
            "reminderTime": "09:00",
            "isReminderActive": true
        }]"#;

        let notes = decode_notes(raw).unwrap();
        assert_eq!(notes.len(), 1);
        let note = &notes[0];
        assert_eq!(note.id, "1704099600000-k3j5h2l1q");
        assert!(note.reminder_active);
        let reminder = note.reminder.unwrap();
        assert_eq!(reminder.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(reminder.time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
    }

    #[test]
    fn test_encode_omits_absent_reminder() {
        let note = Note::new("1-a".to_string(), "t".to_string(), "c".to_string(), None);
        let json = encode_notes(&[note]).unwrap();

        assert!(!json.contains("reminderDate"));
        assert!(!json.contains("reminderTime"));
        assert!(json.contains("\"isReminderActive\":false"));
        assert!(json.contains("\"createdAt\""));
    }

    #[test]
    fn test_encode_reminder_fields() {
        let reminder = Reminder::parse("2024-01-01", "09:00").unwrap();
        let note = Note::new("1-a".to_string(), "t".to_string(), "c".to_string(), Some(reminder));
        let json = encode_notes(&[note]).unwrap();

        assert!(json.contains("\"reminderDate\":\"2024-01-01\""));
        assert!(json.contains("\"reminderTime\":\"09:00\""));
        assert!(json.contains("\"isReminderActive\":true"));
    }

    #[test]
    fn test_active_flag_forced_off_without_reminder() {
        let raw = r#"[{"id":"1-a","title":"t","content":"c","createdAt":"2024-01-01T00:00:00Z","isReminderActive":true}]"#;
        let notes = decode_notes(raw).unwrap();
        assert!(!notes[0].reminder_active);
    }

    #[test]
    fn test_half_configured_reminder_is_dropped() {
        let raw = r#"[{"id":"1-a","title":"t","content":"c","createdAt":"2024-01-01T00:00:00Z","reminderDate":"2024-01-01","isReminderActive":true}]"#;
        let notes = decode_notes(raw).unwrap();
        assert!(notes[0].reminder.is_none());
        assert!(!notes[0].reminder_active);
    }

    #[test]
    fn test_bad_timestamp_is_corrupt() {
        let raw = r#"[{"id":"1-a","title":"t","content":"c","createdAt":"yesterday"}]"#;
        assert!(matches!(decode_notes(raw), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_bad_time_is_corrupt() {
        let raw = r#"[{"id":"1-a","title":"t","content":"c","createdAt":"2024-01-01T00:00:00Z","reminderDate":"2024-01-01","reminderTime":"noon"}]"#;
        assert!(matches!(decode_notes(raw), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_invalid_json_is_corrupt() {
        assert!(matches!(decode_notes("{not json"), Err(StoreError::Corrupt(_))));
        assert!(matches!(decode_notes("{}"), Err(StoreError::Corrupt(_))));
    }
}
