use std::fmt;

use serde_derive::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HomeId(pub u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MobileDeviceId(pub u64);

impl fmt::Display for HomeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for MobileDeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An identifier that is either known or still has to be looked up remotely.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Resolved<T> {
    Unresolved,
    Resolved(T),
}

impl<T> Resolved<T> {
    pub fn get(&self) -> Option<&T> {
        match self {
            Resolved::Unresolved => None,
            Resolved::Resolved(id) => Some(id),
        }
    }
}

impl<T: Copy> Resolved<T> {
    pub fn id(&self) -> Option<T> {
        self.get().copied()
    }
}

pub trait RawId {
    fn raw(&self) -> u64;
}

impl RawId for HomeId {
    fn raw(&self) -> u64 {
        self.0
    }
}

impl RawId for MobileDeviceId {
    fn raw(&self) -> u64 {
        self.0
    }
}

impl<T: RawId> Resolved<T> {
    /// Remote ids are positive, so a zero coming from configuration counts as unset.
    pub fn from_raw(id: Option<T>) -> Self {
        match id {
            Some(id) if id.raw() > 0 => Resolved::Resolved(id),
            _ => Resolved::Unresolved,
        }
    }
}

/// Whether the fake device settings were pushed during this process lifetime.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Provisioning {
    Unprovisioned,
    Provisioned,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_unresolved() {
        assert_eq!(Resolved::from_raw(Some(HomeId(0))), Resolved::Unresolved);
        assert_eq!(Resolved::<HomeId>::from_raw(None), Resolved::Unresolved);
        assert_eq!(
            Resolved::from_raw(Some(MobileDeviceId(7))).id(),
            Some(MobileDeviceId(7))
        );
    }
}
