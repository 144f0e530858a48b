//! Ingress search: when does a body reach a given ecliptic longitude?
//!
//! Longitude is periodic and moves at a varying (sometimes negative) rate,
//! so there is no closed-form inverse. The search steps forward by the time
//! the body would need at its maximum daily speed, which undershoots for
//! direct motion, and repeats until the body sits within tolerance of the
//! target. Steps shrink after a few cycles to damp oscillation near
//! stations. The loop is bounded by `max_cycles` and by the search end, not
//! by any convergence guarantee.
//!
//! Arrival counts from either side: a body still short of the target but
//! within tolerance has arrived. Steps sized from the maximum speed
//! undershoot and rarely cross the target, so requiring the far side would
//! cost extra cycles for nothing.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::bodies::{Body, SpeedTable};
use crate::ephemeris::EphemerisProvider;
use crate::error::HoraiError;

const MICROS_PER_DAY: f64 = 86_400_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IngressOptions {
    /// Degrees either side of the target that count as arrival.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_max_cycles")]
    pub max_cycles: u32,
}

fn default_tolerance() -> f64 {
    0.5
}

fn default_max_cycles() -> u32 {
    200
}

impl Default for IngressOptions {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            max_cycles: default_max_cycles(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy)]
struct SearchState {
    instant: DateTime<Utc>,
    cycle: u32,
    allow_backward: bool,
}

/// Multiplier applied to the body's maximum speed on a given cycle.
fn backoff(cycle: u32) -> f64 {
    if cycle > 12 {
        6.0
    } else if cycle > 7 {
        3.0
    } else {
        1.0
    }
}

fn days_to_duration(days: f64) -> Option<Duration> {
    let micros = (days * MICROS_PER_DAY).round();
    if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(Duration::microseconds(micros as i64))
}

pub struct IngressSearch<'a, P: ?Sized> {
    provider: &'a P,
    speeds: &'a SpeedTable,
    options: IngressOptions,
}

impl<'a, P: EphemerisProvider + ?Sized> IngressSearch<'a, P> {
    pub fn new(provider: &'a P, speeds: &'a SpeedTable, options: IngressOptions) -> Self {
        Self {
            provider,
            speeds,
            options,
        }
    }

    /// Find the instant `body` reaches `target_degrees`, starting at `start`
    /// and never stepping past `end`.
    ///
    /// With `prefer_backward`, the first step may go back in time when the
    /// target lies closer behind the body than ahead of it; every later step
    /// is forward. Returns `Ok(None)` when the search would pass `end` or the
    /// cycle budget runs out first.
    pub fn find(
        &self,
        body: Body,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        target_degrees: f64,
        prefer_backward: bool,
    ) -> Result<Option<DateTime<Utc>>, HoraiError> {
        if start > end {
            return Err(HoraiError::InvalidRange { start, end });
        }
        let max_speed = self.speeds.max_speed(body)?;
        let target = target_degrees.rem_euclid(360.0);
        let tolerance = self.options.tolerance;

        let mut state = SearchState {
            instant: start,
            cycle: 1,
            allow_backward: prefer_backward,
        };

        loop {
            let lon = self.provider.position_of(state.instant, body)?.longitude.rem_euclid(360.0);
            let forward = (target - lon).rem_euclid(360.0);
            let backward = (lon - target).rem_euclid(360.0);

            if forward <= tolerance || backward <= tolerance {
                log::debug!(
                    "{body} reached {target:.4}° (at {lon:.4}°) on {} after {} cycle(s)",
                    state.instant,
                    state.cycle
                );
                return Ok(Some(state.instant));
            }
            if state.cycle >= self.options.max_cycles {
                log::warn!(
                    "{body} ingress to {target:.4}° did not converge in {} cycles (last {lon:.4}°)",
                    self.options.max_cycles
                );
                return Ok(None);
            }

            let direction = if state.allow_backward && backward < forward {
                Direction::Backward
            } else {
                Direction::Forward
            };
            let rate = max_speed * backoff(state.cycle);
            let days = match direction {
                Direction::Forward => forward / rate,
                Direction::Backward => -backward / rate,
            };
            log::debug!(
                "{body} cycle {}: at {lon:.4}°, {direction:?} {days:.5} days",
                state.cycle
            );

            let projected = match days_to_duration(days).and_then(|d| state.instant.checked_add_signed(d)) {
                Some(t) if t <= end => t,
                _ => {
                    log::debug!("{body} ingress to {target:.4}° lies beyond {end}");
                    return Ok(None);
                }
            };

            state = SearchState {
                instant: projected,
                cycle: state.cycle + 1,
                allow_backward: false,
            };
        }
    }

    /// The instant `body` enters the sign after the one it occupies at `start`.
    pub fn next_sign(
        &self,
        body: Body,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, HoraiError> {
        let lon = self.provider.position_of(start, body)?.longitude;
        self.find(body, start, end, next_sign_boundary(lon), false)
    }
}

/// Start of the sign after the one containing `longitude`, in [0, 360).
pub fn next_sign_boundary(longitude: f64) -> f64 {
    let lon = longitude.rem_euclid(360.0);
    (((lon / 30.0).floor() + 1.0) * 30.0).rem_euclid(360.0)
}

/// Free-function form of [`IngressSearch::find`].
#[allow(clippy::too_many_arguments)]
pub fn find_ingress<P: EphemerisProvider + ?Sized>(
    provider: &P,
    speeds: &SpeedTable,
    options: IngressOptions,
    body: Body,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    target_degrees: f64,
    prefer_backward: bool,
) -> Result<Option<DateTime<Utc>>, HoraiError> {
    IngressSearch::new(provider, speeds, options).find(body, start, end, target_degrees, prefer_backward)
}

/// Free-function form of [`IngressSearch::next_sign`].
pub fn next_sign_ingress<P: EphemerisProvider + ?Sized>(
    provider: &P,
    speeds: &SpeedTable,
    options: IngressOptions,
    body: Body,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, HoraiError> {
    IngressSearch::new(provider, speeds, options).next_sign(body, start, end)
}
