//! Planetary hours.
//!
//! Sunrise to sunset is split into twelve equal day hours and sunset to the
//! next sunrise into twelve equal night hours. Rulers follow the Chaldean
//! rotation starting from the ruler of the weekday, and the night hours
//! carry on the rotation where the day hours leave off.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::bodies::Body;
use crate::ephemeris::{EphemerisProvider, GeoLocation};
use crate::error::HoraiError;

/// Ruler order used for successive hours, and the ruler of each weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulerRotation {
    pub sequence: [Body; 7],
    /// Monday first.
    pub weekday_rulers: [Body; 7],
}

impl RulerRotation {
    pub fn chaldean() -> Self {
        Self {
            sequence: [
                Body::Sun,
                Body::Venus,
                Body::Mercury,
                Body::Moon,
                Body::Saturn,
                Body::Jupiter,
                Body::Mars,
            ],
            weekday_rulers: [
                Body::Moon,
                Body::Mars,
                Body::Mercury,
                Body::Jupiter,
                Body::Venus,
                Body::Saturn,
                Body::Sun,
            ],
        }
    }

    pub fn day_ruler(&self, weekday: Weekday) -> Body {
        self.weekday_rulers[weekday.num_days_from_monday() as usize]
    }

    /// Twenty-four consecutive rulers starting at `day_ruler`.
    fn rulers_from(&self, day_ruler: Body) -> Result<Vec<Body>, HoraiError> {
        let start = self
            .sequence
            .iter()
            .position(|b| *b == day_ruler)
            .ok_or(HoraiError::RulerNotInRotation(day_ruler))?;
        Ok(self.sequence.iter().cycle().skip(start).take(24).copied().collect())
    }
}

impl Default for RulerRotation {
    fn default() -> Self {
        Self::chaldean()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanetaryHour {
    /// 1-12 are day hours, 13-24 night hours.
    pub index: u8,
    pub ruler: Body,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl PlanetaryHour {
    pub fn contains(&self, instant: DateTime<FixedOffset>) -> bool {
        self.start <= instant && instant < self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourDivision {
    pub day_hours: Vec<PlanetaryHour>,
    pub night_hours: Vec<PlanetaryHour>,
    pub day_ruler: Body,
}

impl HourDivision {
    pub fn hours(&self) -> impl Iterator<Item = &PlanetaryHour> {
        self.day_hours.iter().chain(self.night_hours.iter())
    }

    /// The hour containing `instant`, if it falls between sunrise and the
    /// next sunrise.
    pub fn find_hour(&self, instant: DateTime<FixedOffset>) -> Option<&PlanetaryHour> {
        self.hours().find(|h| h.contains(instant))
    }
}

fn span(label: &'static str, from: DateTime<FixedOffset>, to: DateTime<FixedOffset>) -> Result<Duration, HoraiError> {
    let length = to - from;
    if length <= Duration::zero() {
        return Err(HoraiError::InvalidSpan {
            span: label,
            message: format!("{from} is not before {to}"),
        });
    }
    Ok(length)
}

/// Twelve contiguous hours covering `span` from `from`. Boundaries sit at
/// `from + span * i / 12`, so the last hour ends exactly at `from + span`;
/// lengths differ by at most a nanosecond when the span does not divide evenly.
fn build_hours(
    first_index: u8,
    from: DateTime<FixedOffset>,
    span: Duration,
    rulers: &[Body],
) -> Vec<PlanetaryHour> {
    let boundary = |i: i32| from + span * i / 12;
    rulers
        .iter()
        .zip(0..)
        .map(|(ruler, i)| PlanetaryHour {
            index: first_index + i as u8,
            ruler: *ruler,
            start: boundary(i),
            end: boundary(i + 1),
        })
        .collect()
}

/// Divide a day and the following night into planetary hours.
///
/// The weekday, and so the first ruler, is taken from `rise` in its own
/// offset.
pub fn partition(
    rise: DateTime<FixedOffset>,
    set: DateTime<FixedOffset>,
    next_rise: DateTime<FixedOffset>,
    rotation: &RulerRotation,
) -> Result<HourDivision, HoraiError> {
    let day_span = span("day", rise, set)?;
    let night_span = span("night", set, next_rise)?;

    let day_ruler = rotation.day_ruler(rise.weekday());
    let rulers = rotation.rulers_from(day_ruler)?;

    let day_hours = build_hours(1, rise, day_span, &rulers[..12]);
    let night_hours = build_hours(13, set, night_span, &rulers[12..]);

    log::debug!(
        "{} day ruler {day_ruler}: day hour {}, night hour {}",
        rise.weekday(),
        day_span / 12,
        night_span / 12
    );

    Ok(HourDivision {
        day_hours,
        night_hours,
        day_ruler,
    })
}

/// Planetary hours for the local `date`, with sunrise, sunset and the next
/// sunrise taken from `provider` and expressed in `offset`.
pub fn planetary_hours_for_date<P: EphemerisProvider + ?Sized>(
    provider: &P,
    date: NaiveDate,
    location: &GeoLocation,
    offset: FixedOffset,
    rotation: &RulerRotation,
) -> Result<HourDivision, HoraiError> {
    let next_date = date.succ_opt().ok_or_else(|| HoraiError::InvalidSpan {
        span: "night",
        message: format!("no day follows {date}"),
    })?;
    let rise = provider.sunrise_of(date, location)?.with_timezone(&offset);
    let set = provider.sunset_of(date, location)?.with_timezone(&offset);
    let next_rise = provider.sunrise_of(next_date, location)?.with_timezone(&offset);
    partition(rise, set, next_rise, rotation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chaldean_weekday_rulers() {
        let r = RulerRotation::chaldean();
        assert_eq!(r.day_ruler(Weekday::Sun), Body::Sun);
        assert_eq!(r.day_ruler(Weekday::Mon), Body::Moon);
        assert_eq!(r.day_ruler(Weekday::Tue), Body::Mars);
        assert_eq!(r.day_ruler(Weekday::Wed), Body::Mercury);
        assert_eq!(r.day_ruler(Weekday::Thu), Body::Jupiter);
        assert_eq!(r.day_ruler(Weekday::Fri), Body::Venus);
        assert_eq!(r.day_ruler(Weekday::Sat), Body::Saturn);
    }

    #[test]
    fn test_rulers_wrap_around_rotation() {
        let r = RulerRotation::chaldean();
        let rulers = r.rulers_from(Body::Mars).unwrap();
        assert_eq!(rulers.len(), 24);
        assert_eq!(&rulers[..3], &[Body::Mars, Body::Sun, Body::Venus]);
    }

    #[test]
    fn test_next_day_ruler_follows_from_hour_24() {
        // The hour after the 24th belongs to the next weekday's ruler.
        let r = RulerRotation::chaldean();
        for day in [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ] {
            let rulers = r.rulers_from(r.day_ruler(day)).unwrap();
            let last = rulers[23];
            let pos = r.sequence.iter().position(|b| *b == last).unwrap();
            assert_eq!(r.sequence[(pos + 1) % 7], r.day_ruler(day.succ()));
        }
    }

    #[test]
    fn test_unknown_ruler_is_rejected() {
        let mut r = RulerRotation::chaldean();
        r.weekday_rulers[0] = Body::Pluto;
        assert!(matches!(
            r.rulers_from(r.day_ruler(Weekday::Mon)),
            Err(HoraiError::RulerNotInRotation(Body::Pluto))
        ));
    }
}
