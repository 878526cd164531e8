use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::Method;
use serde_json::Value;

use crate::config::Credentials;

pub const API_PREFIX: &str = "https://my.tado.com/api/v2/";

const REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// Remote side of the accessory. A `None` means the call did not work out,
/// whatever the reason; the implementation logs the details.
#[async_trait]
pub trait TadoApi: Send + Sync {
    async fn get(&self, path: &str) -> Option<Value>;

    async fn send(&self, method: Method, path: &str, body: Value) -> Option<Value>;
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    credentials: Credentials,
    prefix: String,
}

impl HttpClient {
    pub fn new(credentials: Credentials) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .build()?;

        Ok(HttpClient {
            client,
            credentials,
            prefix: API_PREFIX.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.prefix, path)
    }

    fn auth_query(&self) -> [(&str, &str); 2] {
        [
            ("username", self.credentials.username.as_str()),
            ("password", self.credentials.password.as_str()),
        ]
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Value, reqwest::Error> {
        let response = request
            .query(&self.auth_query())
            .send()
            .await?
            .error_for_status()?;

        // Some PUTs answer with an empty body.
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(value),
            Err(err) => {
                debug!("Response body is not JSON ({}), ignoring it", err);
                Ok(Value::Null)
            }
        }
    }
}

#[async_trait]
impl TadoApi for HttpClient {
    async fn get(&self, path: &str) -> Option<Value> {
        debug!("GET {}", path);
        match self.execute(self.client.get(self.url(path))).await {
            Ok(value) => Some(value),
            Err(err) => {
                error!("Error while calling GET {}: {}", path, err);
                None
            }
        }
    }

    async fn send(&self, method: Method, path: &str, body: Value) -> Option<Value> {
        debug!("{} {}", method, path);
        let request = self.client.request(method.clone(), self.url(path)).json(&body);
        match self.execute(request).await {
            Ok(value) => Some(value),
            Err(err) => {
                error!("Error while calling {} {}: {}", method, path, err);
                None
            }
        }
    }
}

pub fn home_path(home: impl std::fmt::Display) -> String {
    format!("homes/{}", home)
}

pub fn mobile_devices_path(home: impl std::fmt::Display) -> String {
    format!("homes/{}/mobileDevices", home)
}

pub fn mobile_device_path(
    home: impl std::fmt::Display,
    device: impl std::fmt::Display,
    leaf: &str,
) -> String {
    format!("homes/{}/mobileDevices/{}/{}", home, device, leaf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HttpClient {
        HttpClient::new(Credentials {
            username: "me@example.com".to_string(),
            password: "hunter2".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_url() {
        assert_eq!(client().url("me"), "https://my.tado.com/api/v2/me");
    }

    #[test]
    fn test_auth_query() {
        let client = client();
        let query = client.auth_query();
        assert_eq!(query[0], ("username", "me@example.com"));
        assert_eq!(query[1], ("password", "hunter2"));
    }

    #[test]
    fn test_paths() {
        assert_eq!(home_path(1), "homes/1");
        assert_eq!(mobile_devices_path(1), "homes/1/mobileDevices");
        assert_eq!(
            mobile_device_path(1, 2, "geolocationFix"),
            "homes/1/mobileDevices/2/geolocationFix"
        );
    }
}
