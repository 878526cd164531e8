//! Wire payloads of the tado v2 API, as far as presence simulation needs them.

use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};

use crate::identity::{HomeId, MobileDeviceId};

/// Model tag that marks the mobile device this accessory owns.
pub const FAKE_PHONE_MODEL: &str = "FakePhone1,1";

#[derive(Deserialize, Debug, Clone)]
pub struct HomeEntry {
    pub id: HomeId,
    pub name: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct HomesResponse {
    #[serde(default)]
    pub homes: Vec<HomeEntry>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub low_battery_reminder: bool,
    pub away_mode_reminder: bool,
    pub home_mode_reminder: bool,
    pub open_window_reminder: bool,
    pub energy_savings_report_reminder: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MobileDeviceSettings {
    pub geo_tracking_enabled: bool,
    #[serde(default)]
    pub on_demand_log_retrieval_enabled: bool,
    #[serde(default = "NotificationSettings::silent")]
    pub push_notifications: NotificationSettings,
}

impl NotificationSettings {
    pub fn silent() -> Self {
        NotificationSettings {
            low_battery_reminder: false,
            away_mode_reminder: false,
            home_mode_reminder: false,
            open_window_reminder: false,
            energy_savings_report_reminder: false,
        }
    }
}

impl MobileDeviceSettings {
    /// Tracking on, every reminder off.
    pub fn fake_device() -> Self {
        MobileDeviceSettings {
            geo_tracking_enabled: true,
            on_demand_log_retrieval_enabled: false,
            push_notifications: NotificationSettings::silent(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct DeviceMetadata {
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub os_version: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub locale: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MobileDevice {
    pub id: MobileDeviceId,
    pub name: String,
    /// Web and legacy clients come without settings; they don't track.
    #[serde(default)]
    pub settings: MobileDeviceSettings,
    #[serde(default)]
    pub device_metadata: DeviceMetadata,
}

impl MobileDevice {
    pub fn is_fake(&self) -> bool {
        self.device_metadata.model == FAKE_PHONE_MODEL
    }
}

/// What the service answers to a device creation; only the id matters.
#[derive(Deserialize, Debug, Clone)]
pub struct CreatedMobileDevice {
    pub id: MobileDeviceId,
}

#[derive(Serialize, Debug, Clone)]
pub struct TadoAppMetadata {
    pub version: String,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeviceMetadata {
    pub device: DeviceMetadata,
    pub tado_app: TadoAppMetadata,
}

#[derive(Serialize, Debug, Clone)]
pub struct CreateMobileDeviceRequest {
    pub name: String,
    pub metadata: CreateDeviceMetadata,
    pub settings: MobileDeviceSettings,
}

impl CreateMobileDeviceRequest {
    pub fn fake_device() -> Self {
        CreateMobileDeviceRequest {
            name: "HomeBridge".to_string(),
            metadata: CreateDeviceMetadata {
                device: DeviceMetadata {
                    platform: "Android".to_string(),
                    os_version: "13.3.7".to_string(),
                    model: FAKE_PHONE_MODEL.to_string(),
                    locale: "en".to_string(),
                },
                tado_app: TadoAppMetadata {
                    version: "0.1 (0001)".to_string(),
                },
            },
            settings: MobileDeviceSettings::fake_device(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct Geolocation {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GeoHome {
    pub geolocation: Geolocation,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GeolocationConfig {
    pub home: GeoHome,
    /// Meters.
    pub desired_accuracy: f64,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AcquisitionMode {
    Geofencing,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GeolocationFix {
    pub geolocation: Geolocation,
    pub accuracy: u32,
    pub acquisition_mode: AcquisitionMode,
    pub timestamp: DateTime<Utc>,
    pub location_timestamp: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HomePresence {
    Home,
    Away,
}

impl HomePresence {
    pub fn from_home(is_home: bool) -> Self {
        if is_home {
            HomePresence::Home
        } else {
            HomePresence::Away
        }
    }
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PresenceUpdate {
    pub home_presence: HomePresence,
}

/// Only `HOME` counts as home; any other value the service reports is away.
#[derive(Deserialize, Debug, Clone)]
pub struct HomeState {
    #[serde(default)]
    pub presence: String,
}

impl HomeState {
    pub fn is_home(&self) -> bool {
        self.presence == "HOME"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_request_wire_format() {
        let value = serde_json::to_value(CreateMobileDeviceRequest::fake_device()).unwrap();
        assert_eq!(value["metadata"]["device"]["model"], "FakePhone1,1");
        assert_eq!(value["metadata"]["device"]["osVersion"], "13.3.7");
        assert_eq!(value["metadata"]["tadoApp"]["version"], "0.1 (0001)");
        assert_eq!(value["settings"]["geoTrackingEnabled"], true);
        assert_eq!(
            value["settings"]["pushNotifications"]["energySavingsReportReminder"],
            false
        );
    }

    #[test]
    fn test_mobile_device_is_fake() {
        let devices: Vec<MobileDevice> = serde_json::from_value(json!([
            {
                "id": 1,
                "name": "Pixel",
                "settings": { "geoTrackingEnabled": true },
                "deviceMetadata": { "platform": "Android", "osVersion": "14", "model": "Pixel 8", "locale": "de" }
            },
            {
                "id": 2,
                "name": "HomeBridge",
                "settings": { "geoTrackingEnabled": true },
                "deviceMetadata": { "platform": "Android", "osVersion": "13.3.7", "model": "FakePhone1,1", "locale": "en" }
            }
        ]))
        .unwrap();
        assert!(!devices[0].is_fake());
        assert!(devices[1].is_fake());
        assert_eq!(devices[1].id, MobileDeviceId(2));
    }

    #[test]
    fn test_mobile_device_without_settings() {
        let device: MobileDevice = serde_json::from_value(json!({
            "id": 7,
            "name": "Web client",
            "deviceMetadata": { "model": "Browser" }
        }))
        .unwrap();
        assert!(!device.settings.geo_tracking_enabled);
        assert!(!device.is_fake());
    }

    #[test]
    fn test_presence_update_wire_format() {
        let away = PresenceUpdate {
            home_presence: HomePresence::from_home(false),
        };
        assert_eq!(serde_json::to_value(away).unwrap(), json!({"homePresence": "AWAY"}));
    }

    #[test]
    fn test_home_state_presence() {
        let state: HomeState = serde_json::from_value(json!({"presence": "HOME"})).unwrap();
        assert!(state.is_home());
        let state: HomeState = serde_json::from_value(json!({"presence": "AWAY"})).unwrap();
        assert!(!state.is_home());
        let state: HomeState = serde_json::from_value(json!({})).unwrap();
        assert!(!state.is_home());
    }
}
