use thiserror::Error;

/// Failures that abort a whole read or write. Transport errors never show up
/// here, the api layer logs them and hands back nothing.
#[derive(Debug, Error)]
pub enum PresenceError {
    #[error("no homes found for this account")]
    NoHomes,
    #[error("ambiguous home selection: account has {count} homes, set home_id in the configuration")]
    AmbiguousHome { count: usize },
    #[error("failed to retrieve homes")]
    HomesUnavailable,
    #[error("failed to create fake device")]
    DeviceCreation,
    #[error("failed to retrieve geolocation configuration")]
    GeolocationConfig,
}

impl PresenceError {
    /// Operator has to change the configuration, retrying won't help.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            PresenceError::NoHomes | PresenceError::AmbiguousHome { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_families() {
        assert!(PresenceError::NoHomes.is_configuration());
        assert!(PresenceError::AmbiguousHome { count: 2 }.is_configuration());
        assert!(!PresenceError::HomesUnavailable.is_configuration());
        assert!(!PresenceError::DeviceCreation.is_configuration());
        assert!(!PresenceError::GeolocationConfig.is_configuration());
    }
}
