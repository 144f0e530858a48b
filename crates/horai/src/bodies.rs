//! Celestial bodies and their daily motion.
//!
//! Bodies are a closed set; name lookups go through [`Body::from_str`] and
//! fail on anything outside it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::HoraiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    Chiron,
}

impl Body {
    pub const ALL: [Body; 11] = [
        Body::Sun,
        Body::Moon,
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
        Body::Pluto,
        Body::Chiron,
    ];

    /// The seven bodies visible to the naked eye, in weekday-ruler order.
    pub const TRADITIONAL: [Body; 7] = [
        Body::Sun,
        Body::Moon,
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Body::Sun => "sun",
            Body::Moon => "moon",
            Body::Mercury => "mercury",
            Body::Venus => "venus",
            Body::Mars => "mars",
            Body::Jupiter => "jupiter",
            Body::Saturn => "saturn",
            Body::Uranus => "uranus",
            Body::Neptune => "neptune",
            Body::Pluto => "pluto",
            Body::Chiron => "chiron",
        }
    }

    /// Swiss Ephemeris planet number (SE_SUN = 0 ... SE_CHIRON = 15).
    pub fn swiss_code(self) -> u32 {
        match self {
            Body::Sun => 0,
            Body::Moon => 1,
            Body::Mercury => 2,
            Body::Venus => 3,
            Body::Mars => 4,
            Body::Jupiter => 5,
            Body::Saturn => 6,
            Body::Uranus => 7,
            Body::Neptune => 8,
            Body::Pluto => 9,
            Body::Chiron => 15,
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Body {
    type Err = HoraiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Body::ALL
            .iter()
            .copied()
            .find(|b| b.name() == lower)
            .ok_or_else(|| HoraiError::UnknownBody {
                name: s.to_string(),
                valid: Body::ALL.iter().map(|b| b.name().to_string()).collect(),
            })
    }
}

/// Observed range of a body's apparent motion in degrees per day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailySpeed {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

impl DailySpeed {
    pub const fn new(min: f64, max: f64, avg: f64) -> Self {
        Self { min, max, avg }
    }
}

const DEFAULT_SPEEDS: &[(Body, DailySpeed)] = &[
    (Body::Moon, DailySpeed::new(12.0, 15.0, 13.0)),
    (Body::Sun, DailySpeed::new(0.95, 1.05, 1.0)),
    (Body::Mercury, DailySpeed::new(0.95, 1.35, 1.0)),
    (Body::Venus, DailySpeed::new(0.6, 1.3, 1.0)),
    (Body::Mars, DailySpeed::new(0.4, 0.8, 0.5)),
    (Body::Jupiter, DailySpeed::new(0.03, 0.12, 0.083)),
    (Body::Saturn, DailySpeed::new(0.02, 0.08, 0.033)),
    (Body::Uranus, DailySpeed::new(0.01, 0.02, 0.011)),
    (Body::Neptune, DailySpeed::new(0.005, 0.007, 0.006)),
    (Body::Pluto, DailySpeed::new(0.002, 0.004, 0.003)),
    (Body::Chiron, DailySpeed::new(0.1, 1.0, 0.3)),
];

/// Per-body daily speeds used to size ingress search steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedTable {
    speeds: BTreeMap<Body, DailySpeed>,
}

impl SpeedTable {
    pub fn new(speeds: BTreeMap<Body, DailySpeed>) -> Self {
        Self { speeds }
    }

    pub fn get(&self, body: Body) -> Option<&DailySpeed> {
        self.speeds.get(&body)
    }

    pub fn set(&mut self, body: Body, speed: DailySpeed) {
        self.speeds.insert(body, speed);
    }

    /// Maximum daily speed for `body`, failing when the table has no usable entry.
    pub fn max_speed(&self, body: Body) -> Result<f64, HoraiError> {
        let speed = self.get(body).ok_or(HoraiError::MissingSpeed(body))?.max;
        if !speed.is_finite() || speed <= 0.0 {
            return Err(HoraiError::InvalidSpeed { body, speed });
        }
        Ok(speed)
    }

    pub fn validate(&self) -> Result<(), HoraiError> {
        for body in self.speeds.keys() {
            self.max_speed(*body)?;
        }
        Ok(())
    }
}

impl Default for SpeedTable {
    fn default() -> Self {
        Self {
            speeds: DEFAULT_SPEEDS.iter().copied().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_body_names() {
        assert_eq!("moon".parse::<Body>().unwrap(), Body::Moon);
        assert_eq!(" Saturn ".parse::<Body>().unwrap(), Body::Saturn);
        assert!(matches!(
            "vulcan".parse::<Body>(),
            Err(HoraiError::UnknownBody { .. })
        ));
    }

    #[test]
    fn test_default_speeds_cover_every_body() {
        let table = SpeedTable::default();
        for body in Body::ALL {
            assert!(table.max_speed(body).unwrap() > 0.0, "{body}");
        }
        assert_eq!(table.get(Body::Moon).unwrap().max, 15.0);
    }

    #[test]
    fn test_missing_and_invalid_speed() {
        let mut table = SpeedTable::new(BTreeMap::new());
        assert!(matches!(
            table.max_speed(Body::Mars),
            Err(HoraiError::MissingSpeed(Body::Mars))
        ));
        table.set(Body::Mars, DailySpeed::new(0.0, 0.0, 0.0));
        assert!(table.validate().is_err());
    }
}
