use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use super::{Notifier, NotifyError};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Authorization {
    #[default]
    NotDetermined,
    Denied,
    Authorized,
    /// Quiet delivery allowed without an explicit grant.
    Provisional,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AlertSetting {
    Enabled,
    Disabled,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NotificationStatus {
    pub authorization: Authorization,
    pub alerts: AlertSetting,
}

/// Outcome of one `NotificationGate::send`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Delivered,
    Failed,
    NotAuthorized(Authorization),
    AlertsDisabled,
}

/// Transport for notifications (D-Bus in production, fakes in tests).
pub trait NotificationBackend: Send + Sync + 'static {
    fn request_authorization(&self) -> Result<Authorization, NotifyError>;
    fn deliver(&self, title: &str, body: &str) -> Result<(), NotifyError>;
}

/// Whether a notification may be shown under `status`.
/// `None` means go ahead.
pub fn decide(status: NotificationStatus) -> Option<Decision> {
    match status.authorization {
        Authorization::Authorized | Authorization::Provisional => {}
        other => return Some(Decision::NotAuthorized(other)),
    }
    match status.alerts {
        AlertSetting::Enabled => None,
        AlertSetting::Disabled => Some(Decision::AlertsDisabled),
    }
}

pub struct NotificationGate<B: NotificationBackend> {
    backend: Arc<B>,
    authorization: Arc<Mutex<Authorization>>,
    alerts: AlertSetting,
}

impl<B: NotificationBackend> NotificationGate<B> {
    pub fn new(backend: B, alerts_enabled: bool) -> Self {
        Self {
            backend: Arc::new(backend),
            authorization: Arc::new(Mutex::new(Authorization::NotDetermined)),
            alerts: if alerts_enabled {
                AlertSetting::Enabled
            } else {
                AlertSetting::Disabled
            },
        }
    }

    pub fn status(&self) -> NotificationStatus {
        let authorization = self
            .authorization
            .lock()
            .map(|a| *a)
            .unwrap_or(Authorization::NotDetermined);
        NotificationStatus {
            authorization,
            alerts: self.alerts,
        }
    }

    /// Ask the backend for permission in the background.
    ///
    /// The handle may be dropped; the result is stored for later `send` calls.
    pub fn request_permission(&self) -> JoinHandle<Authorization> {
        let backend = self.backend.clone();
        let slot = self.authorization.clone();
        thread::spawn(move || {
            let granted = match backend.request_authorization() {
                Ok(a) => {
                    log::info!("notification authorization: {a:?}");
                    a
                }
                Err(e) => {
                    log::warn!("notification authorization request failed: {e}");
                    Authorization::Denied
                }
            };
            if let Ok(mut a) = slot.lock() {
                *a = granted;
            }
            granted
        })
    }

    /// Show a notification in the background if authorized.
    pub fn send(&self, title: &str, message: &str) -> JoinHandle<Decision> {
        let backend = self.backend.clone();
        let status = self.status();
        let title = title.to_string();
        let message = message.to_string();
        thread::spawn(move || deliver(backend.as_ref(), status, &title, &message))
    }
}

fn deliver<B: NotificationBackend>(
    backend: &B,
    status: NotificationStatus,
    title: &str,
    message: &str,
) -> Decision {
    if let Some(skip) = decide(status) {
        match skip {
            Decision::AlertsDisabled => log::debug!("alert notifications are disabled"),
            _ => log::debug!(
                "notifications not authorized ({:?}), dropping {title:?}",
                status.authorization
            ),
        }
        return skip;
    }

    match backend.deliver(title, message) {
        Ok(()) => Decision::Delivered,
        Err(e) => {
            log::warn!("notification {title:?} not delivered: {e}");
            Decision::Failed
        }
    }
}

impl<B: NotificationBackend> Notifier for NotificationGate<B> {
    fn notify(&self, title: &str, message: &str) {
        // Fire and forget.
        drop(self.send(title, message));
    }
}
