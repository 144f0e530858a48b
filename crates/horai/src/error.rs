use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::bodies::Body;
use crate::ephemeris::EphemerisError;

/// Errors raised by the timing computations.
///
/// "No aspect", "ingress not found" and "no planetary hour" are ordinary
/// outcomes and are returned as `None`, never as one of these.
#[derive(Error, Debug)]
pub enum HoraiError {
    #[error("Aspect table is empty")]
    EmptyAspectTable,
    #[error("Aspect {aspect} has base angle {angle}, expected a value in [0, 180]")]
    InvalidBaseAngle { aspect: String, angle: f64 },
    #[error("Aspect {aspect} has invalid orb {orb} for {key}")]
    InvalidOrb { aspect: String, key: String, orb: f64 },
    #[error("No daily speed configured for {0}")]
    MissingSpeed(Body),
    #[error("Daily speed for {body} must be positive and finite, got {speed}")]
    InvalidSpeed { body: Body, speed: f64 },
    #[error("Search range starts at {start} which is after its end {end}")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("Sampling increment must be positive, got {0}")]
    InvalidIncrement(chrono::Duration),
    #[error("Invalid {span} span for planetary hours: {message}")]
    InvalidSpan { span: &'static str, message: String },
    #[error("Day ruler {0} does not appear in the ruler rotation")]
    RulerNotInRotation(Body),
    #[error("Unknown body: {name}. Valid bodies: {valid:?}")]
    UnknownBody { name: String, valid: Vec<String> },
    #[error("Unknown aspect: {name}. Valid aspects: {valid:?}")]
    UnknownAspect { name: String, valid: Vec<String> },
    #[error(transparent)]
    Ephemeris(#[from] EphemerisError),
}
