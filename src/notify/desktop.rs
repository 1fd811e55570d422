use notify_rust::Notification;

use super::{NotificationGateway, NotifyError, Permission};

/// Native desktop notifications through the platform notification server.
pub struct DesktopGateway {
    app_name: String,
    icon: String,
    permission: Permission,
}

impl DesktopGateway {
    pub fn new(app_name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            icon: icon.into(),
            permission: Permission::Default,
        }
    }
}

impl NotificationGateway for DesktopGateway {
    fn permission(&self) -> Permission {
        self.permission
    }

    // Notification servers do not gate on consent; asking always grants.
    fn request_permission(&mut self) -> Permission {
        self.permission = Permission::Granted;
        self.permission
    }

    fn deliver(&mut self, title: &str, body: &str) -> Result<(), NotifyError> {
        if self.permission != Permission::Granted {
            return Err(NotifyError::PermissionNotGranted(self.permission));
        }
        Notification::new()
            .summary(title)
            .body(body)
            .appname(&self.app_name)
            .icon(&self.icon)
            .show()
            .map(|_| ())
            .map_err(|e| NotifyError::Unavailable(e.to_string()))
    }
}
