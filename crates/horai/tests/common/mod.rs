#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use horai::ephemeris::{BodyPosition, EphemerisError, EphemerisProvider, GeoLocation};
use horai::Body;
use std::cell::Cell;
use std::collections::HashMap;

/// Bodies moving at constant speed from a fixed epoch, with sunrise and
/// sunset at fixed UTC times of day.
pub struct LinearEphemeris {
    epoch: DateTime<Utc>,
    motion: HashMap<Body, (f64, f64)>,
    sunrise: NaiveTime,
    sunset: NaiveTime,
    calls: Cell<usize>,
}

impl LinearEphemeris {
    pub fn new(epoch: DateTime<Utc>) -> Self {
        Self {
            epoch,
            motion: HashMap::new(),
            sunrise: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            sunset: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            calls: Cell::new(0),
        }
    }

    /// Place `body` at `longitude` at the epoch, moving `speed` degrees a day.
    pub fn with_body(mut self, body: Body, longitude: f64, speed: f64) -> Self {
        self.motion.insert(body, (longitude, speed));
        self
    }

    pub fn with_daylight(mut self, sunrise: NaiveTime, sunset: NaiveTime) -> Self {
        self.sunrise = sunrise;
        self.sunset = sunset;
        self
    }

    pub fn longitude_at(&self, instant: DateTime<Utc>, body: Body) -> f64 {
        let (lon0, speed) = self.motion[&body];
        let days = (instant - self.epoch).num_microseconds().unwrap() as f64 / 86_400_000_000.0;
        (lon0 + speed * days).rem_euclid(360.0)
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl EphemerisProvider for LinearEphemeris {
    fn position_of(&self, instant: DateTime<Utc>, body: Body) -> Result<BodyPosition, EphemerisError> {
        self.calls.set(self.calls.get() + 1);
        let (_, speed) = self.motion.get(&body).ok_or_else(|| EphemerisError::CalculationFailed {
            body,
            datetime: instant,
            message: "body not modelled".to_string(),
        })?;
        Ok(BodyPosition {
            longitude: self.longitude_at(instant, body),
            latitude: 0.0,
            speed: *speed,
        })
    }

    fn sunrise_of(&self, date: NaiveDate, _location: &GeoLocation) -> Result<DateTime<Utc>, EphemerisError> {
        Ok(date.and_time(self.sunrise).and_utc())
    }

    fn sunset_of(&self, date: NaiveDate, _location: &GeoLocation) -> Result<DateTime<Utc>, EphemerisError> {
        Ok(date.and_time(self.sunset).and_utc())
    }
}

pub fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}
