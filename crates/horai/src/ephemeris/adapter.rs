use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use solar_positioning::{spa, Horizon, SunriseResult};
use std::env;
use std::path::{Path, PathBuf};
use swisseph::swe::{calc_ut, julday};

use crate::bodies::Body;
use crate::ephemeris::provider::{EphemerisError, EphemerisProvider};
use crate::ephemeris::types::{BodyPosition, GeoLocation};

// Swiss Ephemeris flag bits
const FLG_SWIEPH: u32 = 2;
const FLG_MOSEPH: u32 = 4;
const FLG_SPEED: u32 = 256;
const GREG_CAL: u32 = 1;

/// TT - UT1 in seconds, close enough for rise/set to the minute this century.
pub const DEFAULT_DELTA_T: f64 = 69.0;

/// Ephemeris provider backed by the Swiss Ephemeris for body positions and
/// the NREL SPA algorithm for sunrise and sunset.
pub struct SwissEphemerisAdapter {
    ephemeris_path: Option<PathBuf>,
    delta_t: f64,
}

impl SwissEphemerisAdapter {
    /// Create a new adapter with optional ephemeris path.
    ///
    /// Falls back to `SWISS_EPHEMERIS_PATH`; with neither set, the built-in
    /// Moshier theory is used and no data files are needed.
    pub fn new(ephemeris_path: Option<PathBuf>) -> Result<Self, EphemerisError> {
        let path = ephemeris_path.or_else(|| env::var("SWISS_EPHEMERIS_PATH").ok().map(PathBuf::from));

        if let Some(path) = &path {
            if !path.exists() {
                return Err(EphemerisError::FileNotFound {
                    path: path.display().to_string(),
                    message: "Ephemeris path does not exist. Please ensure Swiss Ephemeris data files are installed.".to_string(),
                });
            }
            // The C library picks this up the first time it opens a data file.
            env::set_var("SE_EPHE_PATH", path);
            log::debug!("Swiss Ephemeris data path: {}", path.display());
        } else {
            log::debug!("No Swiss Ephemeris data path, using Moshier ephemeris");
        }

        Ok(Self {
            ephemeris_path: path,
            delta_t: DEFAULT_DELTA_T,
        })
    }

    pub fn with_delta_t(mut self, delta_t: f64) -> Self {
        self.delta_t = delta_t;
        self
    }

    pub fn ephemeris_path(&self) -> Option<&Path> {
        self.ephemeris_path.as_deref()
    }

    fn flags(&self) -> u32 {
        let source = if self.ephemeris_path.is_some() {
            FLG_SWIEPH
        } else {
            FLG_MOSEPH
        };
        source | FLG_SPEED
    }

    fn rise_and_set(
        &self,
        date: NaiveDate,
        location: &GeoLocation,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), EphemerisError> {
        if !location.is_valid() {
            return Err(EphemerisError::InvalidLocation {
                lat: location.lat,
                lon: location.lon,
                message: "latitude must be within ±90° and longitude within ±180°".to_string(),
            });
        }
        let day = date.and_time(chrono::NaiveTime::MIN).and_utc();
        let result = spa::sunrise_sunset_for_horizon(
            day,
            location.lat,
            location.lon,
            self.delta_t,
            Horizon::SunriseSunset,
        )
        .map_err(|e| EphemerisError::InvalidLocation {
            lat: location.lat,
            lon: location.lon,
            message: e.to_string(),
        })?;

        match result {
            SunriseResult::RegularDay { sunrise, sunset, .. } => Ok((sunrise, sunset)),
            SunriseResult::AllDay { .. } => Err(EphemerisError::NoSunset {
                date,
                lat: location.lat,
                lon: location.lon,
            }),
            SunriseResult::AllNight { .. } => Err(EphemerisError::NoSunrise {
                date,
                lat: location.lat,
                lon: location.lon,
            }),
        }
    }
}

impl EphemerisProvider for SwissEphemerisAdapter {
    fn position_of(&self, instant: DateTime<Utc>, body: Body) -> Result<BodyPosition, EphemerisError> {
        let jd = datetime_to_julian_day(instant);
        let result = calc_ut(jd, body.swiss_code(), self.flags()).map_err(|e| {
            EphemerisError::CalculationFailed {
                body,
                datetime: instant,
                message: format!("Swiss Ephemeris error: {}", e),
            }
        })?;

        let out = result.out;
        Ok(BodyPosition {
            longitude: out[0].rem_euclid(360.0),
            latitude: out[1],
            speed: out[3],
        })
    }

    fn sunrise_of(&self, date: NaiveDate, location: &GeoLocation) -> Result<DateTime<Utc>, EphemerisError> {
        self.rise_and_set(date, location).map(|(rise, _)| rise)
    }

    fn sunset_of(&self, date: NaiveDate, location: &GeoLocation) -> Result<DateTime<Utc>, EphemerisError> {
        self.rise_and_set(date, location).map(|(_, set)| set)
    }
}

/// Convert UTC datetime to Julian Day
fn datetime_to_julian_day(dt: DateTime<Utc>) -> f64 {
    let seconds = dt.second() as f64 + dt.nanosecond() as f64 / 1e9;
    let hour_decimal = dt.hour() as f64 + dt.minute() as f64 / 60.0 + seconds / 3600.0;
    julday(dt.year(), dt.month() as i32, dt.day() as i32, hour_decimal, GREG_CAL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_julian_day_of_j2000() {
        let dt = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        assert!((datetime_to_julian_day(dt) - 2_451_545.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_path_is_rejected() {
        let result = SwissEphemerisAdapter::new(Some(PathBuf::from("/definitely/not/here")));
        assert!(matches!(result, Err(EphemerisError::FileNotFound { .. })));
    }

    #[test]
    fn test_invalid_location_for_rise_set() {
        let adapter = SwissEphemerisAdapter {
            ephemeris_path: None,
            delta_t: DEFAULT_DELTA_T,
        };
        let date = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        let result = adapter.sunrise_of(date, &GeoLocation::new(95.0, 0.0));
        assert!(matches!(result, Err(EphemerisError::InvalidLocation { .. })));
    }
}
