use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{NotificationGateway, NotifyError, Permission};

/// A notification that was handed to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub title: String,
    pub body: String,
}

#[derive(Debug)]
struct State {
    permission: Permission,
    request_answer: Permission,
    supported: bool,
    requests: usize,
    deliveries: Vec<Delivery>,
}

/// Records deliveries instead of showing them. Clones share state.
#[derive(Debug, Clone)]
pub struct MemoryGateway {
    state: Arc<Mutex<State>>,
}

impl MemoryGateway {
    pub fn granted() -> Self {
        Self::with_permission(Permission::Granted)
    }

    pub fn with_permission(permission: Permission) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                permission,
                request_answer: permission,
                supported: true,
                requests: 0,
                deliveries: Vec::new(),
            })),
        }
    }

    /// Permission a future `request_permission` call resolves to.
    pub fn answer_requests_with(&self, answer: Permission) {
        self.lock().request_answer = answer;
    }

    /// Simulate a platform without any notification capability.
    pub fn set_supported(&self, supported: bool) {
        self.lock().supported = supported;
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.lock().deliveries.clone()
    }

    pub fn request_count(&self) -> usize {
        self.lock().requests
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NotificationGateway for MemoryGateway {
    fn permission(&self) -> Permission {
        self.lock().permission
    }

    fn request_permission(&mut self) -> Permission {
        let mut state = self.lock();
        state.requests += 1;
        let answer = state.request_answer;
        state.permission = answer;
        answer
    }

    fn deliver(&mut self, title: &str, body: &str) -> Result<(), NotifyError> {
        let mut state = self.lock();
        if !state.supported {
            return Err(NotifyError::Unavailable(
                "platform has no notification support".to_string(),
            ));
        }
        if state.permission != Permission::Granted {
            return Err(NotifyError::PermissionNotGranted(state.permission));
        }
        state.deliveries.push(Delivery {
            title: title.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
