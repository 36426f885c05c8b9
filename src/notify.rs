//! Best-effort desktop notifications.
//!
//! [`NotificationGate`] checks authorization before handing a message to its
//! backend and never blocks the caller: permission requests and deliveries
//! run on short-lived threads and only log their outcome.

mod dbus;
mod gate;

pub use dbus::DbusBackend;
pub use gate::{
    AlertSetting, Authorization, Decision, NotificationBackend, NotificationGate,
    NotificationStatus, decide,
};

/// Something that can show a short message to the user.
pub trait Notifier {
    fn notify(&self, title: &str, message: &str);
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("session bus: {0}")]
    Bus(#[from] zbus::Error),

    #[error("notifications are disabled")]
    Disabled,
}
