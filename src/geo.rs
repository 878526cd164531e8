use rand::Rng;

use crate::models::Geolocation;

/// Where the fake device goes when the switch is turned off.
pub const ALTERNATE_LOCATION: Geolocation = Geolocation {
    latitude: 48.168310,
    longitude: 11.537140,
};

const MIN_AWAY_DISTANCE_M: f64 = 10_000.0;
const MAX_AWAY_DISTANCE_M: f64 = 50_000.0;

/// Distance and bearing for an away point around home.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AwayJitter {
    pub distance_m: f64,
    pub bearing_deg: u16,
}

impl AwayJitter {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        AwayJitter {
            distance_m: rng.gen_range(MIN_AWAY_DISTANCE_M..MAX_AWAY_DISTANCE_M),
            bearing_deg: rng.gen_range(0..=359),
        }
    }
}

/// Accuracy radius for a fix, somewhere in
/// `[ceil(desired / 2), ceil(1.5 * desired)]`.
pub fn random_accuracy<R: Rng + ?Sized>(rng: &mut R, desired_accuracy: f64) -> u32 {
    let desired = desired_accuracy.max(0.0);
    let spread = rng.gen_range(0.0_f64..1.0) * desired;
    (spread + desired / 2.0).ceil() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_accuracy_bounds() {
        let mut rng = rand::thread_rng();
        for desired in [10.0_f64, 100.0, 1000.0] {
            let low = (desired / 2.0).ceil() as u32;
            let high = (desired * 1.5).ceil() as u32;
            for _ in 0..1000 {
                let accuracy = random_accuracy(&mut rng, desired);
                assert!(
                    (low..=high).contains(&accuracy),
                    "{} outside [{}, {}]",
                    accuracy,
                    low,
                    high
                );
            }
        }
    }

    #[test]
    fn test_random_accuracy_zero() {
        let mut rng = rand::thread_rng();
        assert_eq!(random_accuracy(&mut rng, 0.0), 0);
    }

    #[test]
    fn test_away_jitter_bounds() {
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            let jitter = AwayJitter::random(&mut rng);
            assert!(jitter.distance_m >= 10_000.0 && jitter.distance_m < 50_000.0);
            assert!(jitter.bearing_deg <= 359);
        }
    }
}
