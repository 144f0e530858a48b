use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::bodies::Body;
use crate::ephemeris::types::{BodyPosition, GeoLocation};

/// Errors that can occur while querying an ephemeris
#[derive(Error, Debug)]
pub enum EphemerisError {
    #[error("Ephemeris file not found at path: {path}. {message}")]
    FileNotFound { path: String, message: String },
    #[error("Failed to calculate position for {body} at {datetime}: {message}")]
    CalculationFailed {
        body: Body,
        datetime: DateTime<Utc>,
        message: String,
    },
    #[error("The sun does not rise on {date} at ({lat}, {lon})")]
    NoSunrise { date: NaiveDate, lat: f64, lon: f64 },
    #[error("The sun does not set on {date} at ({lat}, {lon})")]
    NoSunset { date: NaiveDate, lat: f64, lon: f64 },
    #[error("Invalid location ({lat}, {lon}): {message}")]
    InvalidLocation { lat: f64, lon: f64, message: String },
}

/// Source of body positions and solar rise/set instants.
///
/// Implementations are treated as deterministic oracles: the searches call
/// them repeatedly and never cache or second-guess their answers.
pub trait EphemerisProvider {
    fn position_of(&self, instant: DateTime<Utc>, body: Body) -> Result<BodyPosition, EphemerisError>;

    fn sunrise_of(&self, date: NaiveDate, location: &GeoLocation) -> Result<DateTime<Utc>, EphemerisError>;

    fn sunset_of(&self, date: NaiveDate, location: &GeoLocation) -> Result<DateTime<Utc>, EphemerisError>;
}

impl<P: EphemerisProvider + ?Sized> EphemerisProvider for &P {
    fn position_of(&self, instant: DateTime<Utc>, body: Body) -> Result<BodyPosition, EphemerisError> {
        (**self).position_of(instant, body)
    }

    fn sunrise_of(&self, date: NaiveDate, location: &GeoLocation) -> Result<DateTime<Utc>, EphemerisError> {
        (**self).sunrise_of(date, location)
    }

    fn sunset_of(&self, date: NaiveDate, location: &GeoLocation) -> Result<DateTime<Utc>, EphemerisError> {
        (**self).sunset_of(date, location)
    }
}
