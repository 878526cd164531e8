use std::time::Duration;

use log::{debug, error, info};
use tokio::time::MissedTickBehavior;

use crate::accessory::PresenceAccessory;
use crate::api::TadoApi;

/// Drives the read path on a fixed interval and reports presence changes.
pub struct Poller<A> {
    accessory: PresenceAccessory<A>,
    interval: Duration,
    last: Option<bool>,
}

impl<A: TadoApi> Poller<A> {
    pub fn new(accessory: PresenceAccessory<A>, interval: Duration) -> Self {
        Poller {
            accessory,
            interval,
            last: None,
        }
    }

    pub async fn run(&mut self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.poll_once().await;
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Stopping presence polling");
                    break;
                }
            }
        }
    }

    /// Returns the presence when it differs from the previous successful poll.
    pub async fn poll_once(&mut self) -> Option<bool> {
        match self.accessory.get_presence().await {
            Ok(is_home) if self.last != Some(is_home) => {
                info!("Presence is now {}", if is_home { "home" } else { "away" });
                self.last = Some(is_home);
                Some(is_home)
            }
            Ok(_) => {
                debug!("Presence unchanged");
                None
            }
            Err(err) => {
                error!("Polling presence failed: {}", err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use reqwest::Method;
    use serde_json::{Value, json};
    use std::sync::Mutex;

    use super::*;
    use crate::identity::{HomeId, MobileDeviceId, Resolved};

    /// Pinned home and device; the state endpoint replays a script.
    struct ScriptedTado {
        states: Mutex<Vec<Option<&'static str>>>,
    }

    #[async_trait]
    impl TadoApi for ScriptedTado {
        async fn get(&self, path: &str) -> Option<Value> {
            match path {
                "homes/1/mobileDevices/2/geolocationConfig" => Some(json!({
                    "home": { "geolocation": { "latitude": 1.0, "longitude": 2.0 } },
                    "desiredAccuracy": 10
                })),
                "homes/1/state" => {
                    let presence = self.states.lock().unwrap().remove(0)?;
                    Some(json!({ "presence": presence }))
                }
                _ => None,
            }
        }

        async fn send(&self, _method: Method, _path: &str, _body: Value) -> Option<Value> {
            Some(Value::Null)
        }
    }

    #[tokio::test]
    async fn test_poll_reports_changes_only() {
        let api = ScriptedTado {
            states: Mutex::new(vec![
                Some("HOME"),
                Some("HOME"),
                None,
                Some("AWAY"),
                Some("HOME"),
            ]),
        };
        let accessory = PresenceAccessory::new(
            api,
            Resolved::Resolved(HomeId(1)),
            Resolved::Resolved(MobileDeviceId(2)),
        );
        let mut poller = Poller::new(accessory, Duration::from_secs(10));

        assert_eq!(poller.poll_once().await, Some(true));
        assert_eq!(poller.poll_once().await, None);
        // Failed pull keeps the cached value, so no change either.
        assert_eq!(poller.poll_once().await, None);
        assert_eq!(poller.poll_once().await, Some(false));
        assert_eq!(poller.poll_once().await, Some(true));
    }
}
