//! Reminder engine: polls the note collection and fires due reminders.
//!
//! A reminder is due when `now` lies in `[target, target + due_window)`.
//! Firing delivers a notification and disarms the note in the same scan, so
//! later scans inside the window no longer see it as armed. Delivery is best
//! effort: a reminder that could not be shown is disarmed all the same.

use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::entity::Note;
use crate::error::{FloatnotesError, Result};
use crate::notify::{reminder_title, NotificationGateway};
use crate::storage::{Backend, NoteStore};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_DUE_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub poll_interval: Duration,
    pub due_window: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            due_window: DEFAULT_DUE_WINDOW,
        }
    }
}

impl EngineConfig {
    /// Validated config. The window must cover at least two polls so jitter
    /// cannot make a scan skip over it.
    pub fn new(poll_interval: Duration, due_window: Duration) -> Result<Self> {
        let config = Self {
            poll_interval,
            due_window,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(FloatnotesError::Config(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        let min_window = self.poll_interval.checked_mul(2).ok_or_else(|| {
            FloatnotesError::Config(format!(
                "poll interval ({}s) is too large",
                self.poll_interval.as_secs()
            ))
        })?;
        if self.due_window < min_window {
            return Err(FloatnotesError::Config(format!(
                "due window ({}s) must be at least twice the poll interval ({}s)",
                self.due_window.as_secs(),
                self.poll_interval.as_secs()
            )));
        }
        Ok(())
    }

    fn window(&self) -> TimeDelta {
        TimeDelta::from_std(self.due_window).unwrap_or(TimeDelta::MAX)
    }

    /// The armed reminder that will come due next, if any. Reminders whose
    /// window has already closed are skipped.
    pub fn next_due<'a>(
        &self,
        notes: &'a [Note],
        now: DateTime<Local>,
    ) -> Option<(&'a Note, DateTime<Local>)> {
        let window = self.window();
        notes
            .iter()
            .filter(|note| note.is_armed())
            .filter_map(|note| note.target_instant().map(|target| (note, target)))
            .filter(|(_, target)| now.signed_duration_since(*target) < window)
            .min_by_key(|(_, target)| *target)
    }
}

/// Outcome of one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Ids of the notes whose reminder fired, in collection order.
    pub fired: Vec<String>,
    pub delivered: usize,
    pub undelivered: usize,
}

impl ScanReport {
    pub fn is_empty(&self) -> bool {
        self.fired.is_empty()
    }
}

pub struct ReminderEngine<G> {
    gateway: G,
    config: EngineConfig,
}

impl<G: NotificationGateway> ReminderEngine<G> {
    pub fn new(gateway: G, config: EngineConfig) -> Self {
        Self { gateway, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    pub fn into_gateway(self) -> G {
        self.gateway
    }

    pub fn is_due(&self, note: &Note, now: DateTime<Local>) -> bool {
        note.is_due(now, self.config.window())
    }

    /// Scan against the current local time.
    pub fn scan<B: Backend>(&mut self, store: &mut NoteStore<B>) -> ScanReport {
        self.scan_at(store, Local::now())
    }

    /// Fire every reminder due at `now`, then disarm them with one save.
    pub fn scan_at<B: Backend>(
        &mut self,
        store: &mut NoteStore<B>,
        now: DateTime<Local>,
    ) -> ScanReport {
        let due: Vec<(String, String, String)> = store
            .notes()
            .iter()
            .filter(|note| self.is_due(note, now))
            .map(|note| (note.id.clone(), note.title.clone(), note.content.clone()))
            .collect();

        if due.is_empty() {
            debug!(notes = store.len(), "scan found nothing due");
            return ScanReport::default();
        }

        let mut report = ScanReport::default();
        for (id, title, content) in due {
            match self.gateway.deliver(&reminder_title(&title), &content) {
                Ok(()) => {
                    report.delivered += 1;
                    info!(note_id = %id, "reminder delivered");
                }
                Err(e) => {
                    report.undelivered += 1;
                    warn!(note_id = %id, error = %e, "reminder fired without a notification");
                }
            }
            report.fired.push(id);
        }

        let fired = &report.fired;
        store.update(|notes| {
            for note in notes.iter_mut().filter(|n| fired.contains(&n.id)) {
                note.disarm();
            }
        });

        report
    }
}
