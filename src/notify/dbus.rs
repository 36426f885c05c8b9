//! freedesktop.org notification service over the session bus.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use zbus::blocking::Connection;
use zbus::proxy;
use zvariant::Value;

use super::NotifyError;
use super::gate::{Authorization, NotificationBackend};

const APP_NAME: &str = "platter";
const APP_ICON: &str = "audio-x-generic";
const EXPIRE_MS: i32 = 5000;

#[proxy(
    interface = "org.freedesktop.Notifications",
    default_service = "org.freedesktop.Notifications",
    default_path = "/org/freedesktop/Notifications"
)]
trait Notifications {
    #[allow(clippy::too_many_arguments)]
    fn notify(
        &self,
        app_name: &str,
        replaces_id: u32,
        app_icon: &str,
        summary: &str,
        body: &str,
        actions: &[&str],
        hints: HashMap<&str, &Value<'_>>,
        expire_timeout: i32,
    ) -> zbus::Result<u32>;

    fn get_capabilities(&self) -> zbus::Result<Vec<String>>;
}

/// Sends notifications to whatever notification daemon owns the bus name.
///
/// Each notification replaces the previous one, so skipping through an
/// album does not stack up popups.
pub struct DbusBackend {
    enabled: bool,
    connection: Mutex<Option<Connection>>,
    last_id: AtomicU32,
}

impl DbusBackend {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            connection: Mutex::new(None),
            last_id: AtomicU32::new(0),
        }
    }

    fn connection(&self) -> Result<Connection, NotifyError> {
        let mut slot = self
            .connection
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(c) = slot.as_ref() {
            return Ok(c.clone());
        }
        let c = Connection::session()?;
        *slot = Some(c.clone());
        Ok(c)
    }
}

/// A server that can render a body gets full alerts; one that cannot only
/// shows summaries, which is treated as provisional.
pub(super) fn authorization_from_capabilities(caps: &[String]) -> Authorization {
    if caps.iter().any(|c| c == "body") {
        Authorization::Authorized
    } else {
        Authorization::Provisional
    }
}

impl NotificationBackend for DbusBackend {
    fn request_authorization(&self) -> Result<Authorization, NotifyError> {
        if !self.enabled {
            return Ok(Authorization::Denied);
        }
        let conn = self.connection()?;
        let proxy = NotificationsProxyBlocking::new(&conn)?;
        let caps = proxy.get_capabilities()?;
        Ok(authorization_from_capabilities(&caps))
    }

    fn deliver(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        if !self.enabled {
            return Err(NotifyError::Disabled);
        }
        let conn = self.connection()?;
        let proxy = NotificationsProxyBlocking::new(&conn)?;
        let hints: HashMap<&str, &Value<'_>> = HashMap::new();
        let id = proxy.notify(
            APP_NAME,
            self.last_id.load(Ordering::Relaxed),
            APP_ICON,
            title,
            body,
            &[],
            hints,
            EXPIRE_MS,
        )?;
        self.last_id.store(id, Ordering::Relaxed);
        Ok(())
    }
}
