use std::io::{self, Write};

use super::{NotificationGateway, NotifyError, Permission};

/// Prints notifications to a writer (stdout by default).
pub struct TerminalGateway<W: Write> {
    out: W,
    app_name: String,
}

impl TerminalGateway<io::Stdout> {
    pub fn stdout(app_name: impl Into<String>) -> Self {
        Self::new(io::stdout(), app_name)
    }
}

impl<W: Write> TerminalGateway<W> {
    pub fn new(out: W, app_name: impl Into<String>) -> Self {
        Self {
            out,
            app_name: app_name.into(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_notification(&mut self, title: &str, body: &str) -> io::Result<()> {
        // Bell character so terminals can flag the window.
        writeln!(self.out, "\x07[{}] {}", self.app_name, title)?;
        for line in body.lines() {
            writeln!(self.out, "    {}", line)?;
        }
        self.out.flush()
    }
}

impl<W: Write> NotificationGateway for TerminalGateway<W> {
    fn permission(&self) -> Permission {
        Permission::Granted
    }

    fn request_permission(&mut self) -> Permission {
        Permission::Granted
    }

    fn deliver(&mut self, title: &str, body: &str) -> Result<(), NotifyError> {
        self.write_notification(title, body)
            .map_err(|e| NotifyError::Unavailable(e.to_string()))
    }
}
