//! Runs the reminder engine as a periodic task over a shared controller.
//!
//! The controller lives behind a `tokio::sync::Mutex`; each scan and each
//! user mutation takes the lock for one whole-collection critical section and
//! never holds it across an `.await`. Every tick re-reads the backend first,
//! so notes written by other processes are scanned and never overwritten.

use std::sync::Arc;

use chrono::{DateTime, Local};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::engine::ReminderEngine;
use crate::lifecycle::NoteController;
use crate::notify::{request_permission_once, NotificationGateway};
use crate::storage::Backend;

pub type SharedController<B> = Arc<Mutex<NoteController<B>>>;

pub fn shared<B: Backend>(controller: NoteController<B>) -> SharedController<B> {
    Arc::new(Mutex::new(controller))
}

/// A running reminder loop. Dropping it without [`Session::shutdown`] leaves
/// the task running until the runtime stops.
pub struct Session<G> {
    cancel: CancellationToken,
    handle: JoinHandle<ReminderEngine<G>>,
}

impl<G> Session<G>
where
    G: NotificationGateway + Send + 'static,
{
    /// Start polling with the system clock. Must be called inside a tokio
    /// runtime.
    pub fn start<B>(controller: SharedController<B>, engine: ReminderEngine<G>) -> Self
    where
        B: Backend + Send + 'static,
    {
        Self::start_with_clock(controller, engine, Local::now)
    }

    /// Start polling, reading "now" from `clock` on every tick.
    ///
    /// Notification permission is requested here, once, and only if it was
    /// never asked before. The first scan runs immediately.
    pub fn start_with_clock<B, C>(
        controller: SharedController<B>,
        mut engine: ReminderEngine<G>,
        clock: C,
    ) -> Self
    where
        B: Backend + Send + 'static,
        C: Fn() -> DateTime<Local> + Send + 'static,
    {
        let permission = request_permission_once(engine.gateway_mut());
        info!(
            %permission,
            poll_secs = engine.config().poll_interval.as_secs(),
            "reminder session started"
        );

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(engine.config().poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let mut controller = controller.lock().await;
                        let store = controller.store_mut();
                        if let Err(e) = store.reload() {
                            warn!(error = %e, "scanning notes without a fresh read");
                        }
                        let report = engine.scan_at(store, clock());
                        if !report.is_empty() {
                            info!(
                                fired = report.fired.len(),
                                delivered = report.delivered,
                                "reminders fired"
                            );
                        }
                    }
                }
            }

            info!("reminder session stopped");
            engine
        });

        Self { cancel, handle }
    }

    /// Token that stops the loop when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop the loop and hand the engine back.
    pub async fn shutdown(self) -> Option<ReminderEngine<G>> {
        self.cancel.cancel();
        match self.handle.await {
            Ok(engine) => Some(engine),
            Err(e) => {
                warn!(error = %e, "reminder task ended abnormally");
                None
            }
        }
    }
}
