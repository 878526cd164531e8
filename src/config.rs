use serde_derive::Deserialize;

use crate::identity::{HomeId, MobileDeviceId, Resolved};

const DEFAULT_NAME: &str = "Presence";
const DEFAULT_INTERVAL_SECONDS: u64 = 10;

#[derive(Deserialize, Debug, Clone)]
pub struct AppConfig {
    pub name: Option<String>,
    pub email: String,
    pub password: String,
    pub home_id: Option<u64>,
    pub device_id: Option<u64>,
    /// Polling interval in seconds, only used by `watch`.
    pub interval: Option<u64>,
}

impl AppConfig {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_NAME)
    }

    pub fn interval_seconds(&self) -> u64 {
        self.interval
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_INTERVAL_SECONDS)
    }

    // Zero means "discover", same as leaving the key out.
    pub fn home(&self) -> Resolved<HomeId> {
        Resolved::from_raw(self.home_id.map(HomeId))
    }

    pub fn device(&self) -> Resolved<MobileDeviceId> {
        Resolved::from_raw(self.device_id.map(MobileDeviceId))
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            username: self.email.clone(),
            password: self.password.clone(),
        }
    }
}

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
