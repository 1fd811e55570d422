//! Notification gateway: permission state and delivery.
//!
//! Delivery is best effort. Callers treat [`NotifyError`] as "the user was
//! not visibly notified", never as a reason to stop.

#[cfg(feature = "desktop")]
mod desktop;
mod memory;
mod terminal;

#[cfg(feature = "desktop")]
pub use desktop::DesktopGateway;
pub use memory::{Delivery, MemoryGateway};
pub use terminal::TerminalGateway;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Granted,
    Denied,
    /// Never asked.
    #[default]
    Default,
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Permission::Granted => write!(f, "granted"),
            Permission::Denied => write!(f, "denied"),
            Permission::Default => write!(f, "default"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("Notifications unavailable: permission is {0}")]
    PermissionNotGranted(Permission),

    #[error("Notifications unavailable: {0}")]
    Unavailable(String),
}

pub trait NotificationGateway {
    fn permission(&self) -> Permission;

    /// Ask the platform for permission and return the resulting state.
    fn request_permission(&mut self) -> Permission;

    fn deliver(&mut self, title: &str, body: &str) -> Result<(), NotifyError>;
}

impl<G: NotificationGateway + ?Sized> NotificationGateway for Box<G> {
    fn permission(&self) -> Permission {
        (**self).permission()
    }

    fn request_permission(&mut self) -> Permission {
        (**self).request_permission()
    }

    fn deliver(&mut self, title: &str, body: &str) -> Result<(), NotifyError> {
        (**self).deliver(title, body)
    }
}

/// Ask for permission only if it was never asked before.
pub fn request_permission_once<G: NotificationGateway + ?Sized>(gateway: &mut G) -> Permission {
    match gateway.permission() {
        Permission::Default => gateway.request_permission(),
        settled => settled,
    }
}

/// Title shown for a fired reminder.
pub fn reminder_title(note_title: &str) -> String {
    format!("Reminder: {}", note_title)
}

/// Gateway for setups with notifications switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGateway;

impl NotificationGateway for DisabledGateway {
    fn permission(&self) -> Permission {
        Permission::Denied
    }

    fn request_permission(&mut self) -> Permission {
        Permission::Denied
    }

    fn deliver(&mut self, _title: &str, _body: &str) -> Result<(), NotifyError> {
        Err(NotifyError::PermissionNotGranted(Permission::Denied))
    }
}
