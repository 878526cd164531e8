//! The home/away switch backed by a fake tado mobile device.
//!
//! Every read and write first walks the same setup chain: find the home,
//! find or create the fake device (pushing its settings once), load the
//! geolocation config. Each step is a no-op once it has succeeded, so after
//! the first call only the actual presence sync talks to the service.
//!
//! Methods take `&mut self`; the accessory expects one caller at a time.

use chrono::Utc;
use log::{debug, error, info, warn};
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::{TadoApi, home_path, mobile_device_path, mobile_devices_path};
use crate::error::PresenceError;
use crate::geo::{ALTERNATE_LOCATION, AwayJitter, random_accuracy};
use crate::identity::{HomeId, MobileDeviceId, Provisioning, Resolved};
use crate::models::{
    AcquisitionMode, CreateMobileDeviceRequest, CreatedMobileDevice, Geolocation,
    GeolocationConfig, GeolocationFix, HomePresence, HomeState, HomesResponse, MobileDevice,
    MobileDeviceSettings, PresenceUpdate,
};

/// Result of a best-effort remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Applied,
    /// The service was unavailable, nothing changed remotely.
    Skipped,
}

impl Delivery {
    fn from_response<T>(response: &Option<T>) -> Self {
        match response {
            Some(_) => Delivery::Applied,
            None => Delivery::Skipped,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushOutcome {
    /// `None` when the settings were already pushed on an earlier call.
    pub settings: Option<Delivery>,
    pub fix: Delivery,
    pub presence: Delivery,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessoryInfo {
    pub manufacturer: &'static str,
    pub model: &'static str,
    pub serial_number: String,
}

#[derive(Debug, Default)]
struct DeviceScan {
    fake: Option<MobileDeviceId>,
    geo_tracked_others: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FakeDevice {
    id: MobileDeviceId,
    settings: Option<Delivery>,
}

struct Target {
    home: HomeId,
    device: MobileDeviceId,
    settings: Option<Delivery>,
    geolocation: GeolocationConfig,
}

pub struct PresenceAccessory<A> {
    api: A,
    home: Resolved<HomeId>,
    device: Resolved<MobileDeviceId>,
    provisioning: Provisioning,
    geolocation: Option<GeolocationConfig>,
    away_jitter: Option<AwayJitter>,
    is_home: bool,
}

impl<A: TadoApi> PresenceAccessory<A> {
    pub fn new(api: A, home: Resolved<HomeId>, device: Resolved<MobileDeviceId>) -> Self {
        PresenceAccessory {
            api,
            home,
            device,
            provisioning: Provisioning::Unprovisioned,
            geolocation: None,
            away_jitter: None,
            is_home: true,
        }
    }

    /// Serial is only known up front when the home is pinned in the configuration.
    pub fn info(&self) -> AccessoryInfo {
        let serial_number = match self.home.id() {
            Some(home) => home.to_string(),
            None => "SingleHome".to_string(),
        };
        AccessoryInfo {
            manufacturer: "tado",
            model: "Home/Away Switch",
            serial_number,
        }
    }

    pub async fn get_presence(&mut self) -> Result<bool, PresenceError> {
        debug!("get_presence");
        let target = self.setup().await?;
        if target.settings == Some(Delivery::Skipped) {
            warn!("Fake device settings were not applied, reading presence anyway");
        }
        self.pull_actual_presence(target.home).await;
        Ok(self.is_home)
    }

    /// Moves the fake device home or away and tells the service. The local
    /// state follows `is_home` even when the pushes did not get through.
    pub async fn set_presence(&mut self, is_home: bool) -> Result<PushOutcome, PresenceError> {
        debug!("set_presence: {}", is_home);
        let target = self.setup().await?;

        let location = if is_home {
            target.geolocation.home.geolocation
        } else {
            // TODO: project the away point from away_jitter instead of the fixed fallback
            debug!("Away jitter {:?} not applied", self.away_jitter);
            ALTERNATE_LOCATION
        };
        let fix = self.move_fake_device_to(&target, location).await;
        let presence = self.push_new_presence(target.home, is_home).await;

        self.is_home = is_home;
        Ok(PushOutcome {
            settings: target.settings,
            fix,
            presence,
        })
    }

    async fn setup(&mut self) -> Result<Target, PresenceError> {
        let home = self.resolve_home().await?;
        let device = self.ensure_fake_device(home).await?;
        let geolocation = self.ensure_geolocation_config(home, device.id).await?;
        Ok(Target {
            home,
            device: device.id,
            settings: device.settings,
            geolocation,
        })
    }

    async fn resolve_home(&mut self) -> Result<HomeId, PresenceError> {
        if let Some(home) = self.home.id() {
            return Ok(home);
        }

        info!("Discovering home_id");
        let response: HomesResponse = self
            .get_json("me")
            .await
            .ok_or(PresenceError::HomesUnavailable)?;

        // Log every candidate so the operator can pick one.
        for home in &response.homes {
            info!("Found home '{}' (home_id: {})", home.name, home.id);
        }

        match response.homes.as_slice() {
            [] => {
                warn!("No homes found");
                Err(PresenceError::NoHomes)
            }
            [home] => {
                self.home = Resolved::Resolved(home.id);
                Ok(home.id)
            }
            homes => {
                warn!("Found multiple homes");
                Err(PresenceError::AmbiguousHome { count: homes.len() })
            }
        }
    }

    async fn ensure_fake_device(&mut self, home: HomeId) -> Result<FakeDevice, PresenceError> {
        if let Some(id) = self.device.id() {
            let settings = self.provision(home, id).await;
            return Ok(FakeDevice { id, settings });
        }

        let scan = self.scan_mobile_devices(home).await;
        if !scan.geo_tracked_others.is_empty() {
            warn!(
                "Found other mobile device(s) that have geotracking enabled. It is recommended to turn it off (device: {})",
                scan.geo_tracked_others.join(", ")
            );
        }
        if let Some(id) = scan.fake {
            self.device = Resolved::Resolved(id);
            let settings = self.provision(home, id).await;
            return Ok(FakeDevice { id, settings });
        }

        info!("Creating a fake mobile device");
        let created: CreatedMobileDevice = self
            .send_json(
                Method::POST,
                &mobile_devices_path(home),
                &CreateMobileDeviceRequest::fake_device(),
            )
            .await
            .ok_or(PresenceError::DeviceCreation)?;

        info!("New mobile device created with device_id: {}", created.id);
        self.device = Resolved::Resolved(created.id);
        // Settings went along with the creation request.
        self.provisioning = Provisioning::Provisioned;
        Ok(FakeDevice {
            id: created.id,
            settings: Some(Delivery::Applied),
        })
    }

    async fn scan_mobile_devices(&self, home: HomeId) -> DeviceScan {
        let path = mobile_devices_path(home);
        let Some(entries) = self.get_json::<Vec<Value>>(&path).await else {
            return DeviceScan::default();
        };

        // One odd entry must not hide the fake device next to it.
        let devices = entries
            .into_iter()
            .filter_map(|entry| decode::<MobileDevice>(&path, entry));

        let mut scan = DeviceScan::default();
        for device in devices {
            if device.is_fake() {
                info!("Found fake device '{}' (device_id: {})", device.name, device.id);
                match scan.fake {
                    None => scan.fake = Some(device.id),
                    Some(adopted) => debug!(
                        "Ignoring additional fake device {}, keeping {}",
                        device.id, adopted
                    ),
                }
            } else if device.settings.geo_tracking_enabled {
                scan.geo_tracked_others.push(device.name);
            }
        }
        scan
    }

    /// Pushes the fake device settings, at most once per process lifetime.
    async fn provision(&mut self, home: HomeId, device: MobileDeviceId) -> Option<Delivery> {
        if self.provisioning == Provisioning::Provisioned {
            return None;
        }
        // Marked up front: a failed push is not retried on the next cycle.
        self.provisioning = Provisioning::Provisioned;

        let response = self
            .send_value(
                Method::PUT,
                &mobile_device_path(home, device, "settings"),
                &MobileDeviceSettings::fake_device(),
            )
            .await;
        let delivery = Delivery::from_response(&response);
        if delivery == Delivery::Skipped {
            warn!("Could not apply settings to fake device {}", device);
        }
        Some(delivery)
    }

    async fn ensure_geolocation_config(
        &mut self,
        home: HomeId,
        device: MobileDeviceId,
    ) -> Result<GeolocationConfig, PresenceError> {
        if let Some(config) = &self.geolocation {
            return Ok(config.clone());
        }

        let Some(config) = self
            .get_json::<GeolocationConfig>(&mobile_device_path(home, device, "geolocationConfig"))
            .await
        else {
            error!(
                "Could not retrieve geolocation configuration for home {} and device {}",
                home, device
            );
            return Err(PresenceError::GeolocationConfig);
        };

        self.away_jitter = Some(AwayJitter::random(&mut rand::thread_rng()));
        self.geolocation = Some(config.clone());
        Ok(config)
    }

    async fn move_fake_device_to(&self, target: &Target, location: Geolocation) -> Delivery {
        let accuracy = random_accuracy(
            &mut rand::thread_rng(),
            target.geolocation.desired_accuracy,
        );
        let now = Utc::now();
        let fix = GeolocationFix {
            geolocation: location,
            accuracy,
            acquisition_mode: AcquisitionMode::Geofencing,
            timestamp: now,
            location_timestamp: now,
        };

        debug!("Moving fake device to {:?} (accuracy {} m)", location, accuracy);
        let response = self
            .send_value(
                Method::PUT,
                &mobile_device_path(target.home, target.device, "geolocationFix"),
                &fix,
            )
            .await;
        Delivery::from_response(&response)
    }

    async fn push_new_presence(&self, home: HomeId, is_home: bool) -> Delivery {
        let update = PresenceUpdate {
            home_presence: HomePresence::from_home(is_home),
        };

        debug!("Updating presence to {:?}", update.home_presence);
        let response = self
            .send_value(Method::PUT, &format!("{}/presence", home_path(home)), &update)
            .await;
        Delivery::from_response(&response)
    }

    async fn pull_actual_presence(&mut self, home: HomeId) -> Delivery {
        let state = self
            .get_json::<HomeState>(&format!("{}/state", home_path(home)))
            .await;
        match &state {
            Some(state) => self.is_home = state.is_home(),
            None => error!("Failed to get actual state from API"),
        }
        Delivery::from_response(&state)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        let value = self.api.get(path).await?;
        decode(path, value)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &impl Serialize,
    ) -> Option<T> {
        let value = self.send_value(method, path, body).await?;
        decode(path, value)
    }

    async fn send_value(&self, method: Method, path: &str, body: &impl Serialize) -> Option<Value> {
        let body = match serde_json::to_value(body) {
            Ok(body) => body,
            Err(err) => {
                error!("Could not encode body for {}: {}", path, err);
                return None;
            }
        };
        let response = self.api.send(method, path, body).await;
        debug!("{} -> {:?}", path, response);
        response
    }
}

fn decode<T: DeserializeOwned>(path: &str, value: Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            error!("Unexpected response from {}: {}", path, err);
            None
        }
    }
}
