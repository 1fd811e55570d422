mod note;
mod reminder;

pub use note::{generate_id, normalize, Note, UNTITLED};
pub use reminder::{parse_reminder_date, parse_reminder_time, Reminder};
