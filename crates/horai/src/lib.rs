//! Astrological timing over an ephemeris: aspects between bodies, aspect
//! searches across a time window, ingress times and planetary hours.
//!
//! Positions and sunrise/sunset come from an [`EphemerisProvider`]; the
//! reference tables (orbs, speeds, ruler rotation) are plain values handed
//! to each operation.

pub mod angle;
pub mod aspects;
pub mod bodies;
pub mod ephemeris;
pub mod error;
pub mod hours;
pub mod ingress;

pub use angle::{angle_between, AngularPosition};
pub use aspects::{
    aspects_for_positions, match_aspect, multi_body_search, search_range, summarize, AspectKind, AspectMatch,
    AspectTable, SearchSummary, Timeline,
};
pub use bodies::{Body, DailySpeed, SpeedTable};
pub use ephemeris::{EphemerisError, EphemerisProvider, GeoLocation, SwissEphemerisAdapter};
pub use error::HoraiError;
pub use hours::{partition, planetary_hours_for_date, HourDivision, PlanetaryHour, RulerRotation};
pub use ingress::{find_ingress, next_sign_boundary, next_sign_ingress, IngressOptions, IngressSearch};
