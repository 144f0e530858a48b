//! Angular separation between two ecliptic longitudes.

use serde::{Deserialize, Serialize};

/// A signed angle in decimal degrees together with its unsigned
/// degree/minute/second breakdown.
///
/// The sexagesimal fields are always derived from `raw`; build values with
/// [`AngularPosition::from_degrees`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngularPosition {
    pub degrees: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub raw: f64,
}

impl AngularPosition {
    pub fn from_degrees(raw: f64) -> Self {
        let abs = raw.abs();
        let degrees = abs.floor();
        let fraction_minutes = (abs - degrees) * 60.0;
        let minutes = fraction_minutes.floor();
        let seconds = ((fraction_minutes - minutes) * 60.0).floor();

        Self {
            degrees: degrees as u32,
            // Guard against float residue pushing a field to 60.
            minutes: (minutes as u32).min(59),
            seconds: (seconds as u32).min(59),
            raw,
        }
    }

    pub fn is_negative(&self) -> bool {
        self.raw < 0.0
    }
}

/// Signed difference `lon_a - lon_b`.
///
/// The result is not folded into ±180°: a separation of 350° stays 350°.
pub fn angle_between(lon_a: f64, lon_b: f64) -> AngularPosition {
    AngularPosition::from_degrees(lon_a - lon_b)
}
