use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};
use clap::{Args, Parser, Subcommand};
use horai::aspects::AspectKind;
use horai::bodies::Body;
use horai::ephemeris::GeoLocation;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub(crate) struct Cli {
    /// Config file (default: horai.toml, then configs/horai.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Swiss Ephemeris data directory. Overrides [ephemeris] path in the config.
    #[arg(long, global = true)]
    pub ephemeris: Option<PathBuf>,

    /// Print compact JSON instead of pretty-printed.
    #[arg(long, global = true)]
    pub compact: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Aspects between bodies at a single instant.
    Aspects(AspectsArgs),
    /// Sample aspects over a window and summarize each pair.
    Search(SearchArgs),
    /// When a body reaches a longitude.
    Ingress(IngressArgs),
    /// Planetary hours for a local date.
    Hours(HoursArgs),
}

#[derive(Args, Debug)]
pub(crate) struct AspectsArgs {
    /// Instant (RFC 3339, `YYYY-MM-DDTHH:MM` in UTC, or `YYYY-MM-DD`). Defaults to now.
    #[arg(long, value_parser = parse_instant)]
    pub at: Option<DateTime<Utc>>,

    /// Comma-separated bodies (default: all).
    #[arg(long, value_delimiter = ',', value_parser = parse_body)]
    pub bodies: Vec<Body>,

    /// Comma-separated aspects to consider (default: all).
    #[arg(long, value_delimiter = ',', value_parser = parse_aspect)]
    pub aspects: Vec<AspectKind>,

    /// Include pairs that form no aspect.
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub(crate) struct SearchArgs {
    /// Window start.
    #[arg(long, value_parser = parse_instant)]
    pub from: DateTime<Utc>,

    /// Window end.
    #[arg(long, value_parser = parse_instant)]
    pub to: DateTime<Utc>,

    /// First body of each pair (default: the seven traditional bodies).
    #[arg(long, value_delimiter = ',', value_parser = parse_body)]
    pub bodies_a: Vec<Body>,

    /// Second body of each pair (default: same as --bodies-a).
    #[arg(long, value_delimiter = ',', value_parser = parse_body)]
    pub bodies_b: Vec<Body>,

    #[arg(long, value_delimiter = ',', value_parser = parse_aspect)]
    pub aspects: Vec<AspectKind>,

    /// Sampling step in minutes.
    #[arg(long, default_value_t = 60)]
    pub increment_minutes: i64,

    /// Drop pairs that never formed an aspect.
    #[arg(long)]
    pub matched_only: bool,
}

#[derive(Args, Debug)]
pub(crate) struct IngressArgs {
    #[arg(long, value_parser = parse_body)]
    pub body: Body,

    /// Target longitude in degrees.
    #[arg(long, allow_hyphen_values = true, required_unless_present = "next_sign", conflicts_with = "next_sign")]
    pub target: Option<f64>,

    /// Target the start of the next sign instead of a fixed longitude.
    #[arg(long)]
    pub next_sign: bool,

    /// Search start. Defaults to now.
    #[arg(long, value_parser = parse_instant)]
    pub from: Option<DateTime<Utc>>,

    /// Give up after this many days.
    #[arg(long, default_value_t = 30)]
    pub days: i64,

    /// Allow the first step to go back in time when the target is closer behind.
    #[arg(long)]
    pub backward: bool,

    /// Override [ingress] tolerance in degrees.
    #[arg(long)]
    pub tolerance: Option<f64>,
}

#[derive(Args, Debug)]
pub(crate) struct HoursArgs {
    /// Local date (YYYY-MM-DD). Defaults to today in --offset.
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// UTC offset of the observer, e.g. +02:00. Defaults to the system offset.
    #[arg(long, allow_hyphen_values = true, value_parser = parse_offset)]
    pub offset: Option<FixedOffset>,

    #[command(flatten)]
    pub place: PlaceArgs,

    /// Also report the hour containing this instant.
    #[arg(long, value_parser = parse_instant)]
    pub at: Option<DateTime<Utc>>,
}

#[derive(Args, Debug)]
pub(crate) struct PlaceArgs {
    /// Observer as `lat,lon` in degrees.
    #[arg(long, allow_hyphen_values = true, value_parser = parse_geo, conflicts_with = "location")]
    pub geo: Option<GeoLocation>,

    /// Named location from the config's [[locations]].
    #[arg(long)]
    pub location: Option<String>,
}

pub(crate) fn parse_instant(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("unrecognized instant '{s}' (expected RFC 3339 or YYYY-MM-DD[THH:MM])"))
}

pub(crate) fn parse_body(s: &str) -> Result<Body, String> {
    s.parse::<Body>().map_err(|e| e.to_string())
}

pub(crate) fn parse_aspect(s: &str) -> Result<AspectKind, String> {
    s.parse::<AspectKind>().map_err(|e| e.to_string())
}

pub(crate) fn parse_offset(s: &str) -> Result<FixedOffset, String> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return Ok(Utc.fix());
    }
    s.parse::<FixedOffset>()
        .map_err(|e| format!("invalid offset '{s}': {e}"))
}

pub(crate) fn parse_geo(s: &str) -> Result<GeoLocation, String> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| format!("expected lat,lon but got '{s}'"))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("bad latitude '{lat}': {e}"))?;
    let lon: f64 = lon.trim().parse().map_err(|e| format!("bad longitude '{lon}': {e}"))?;
    let location = GeoLocation::new(lat, lon);
    if !location.is_valid() {
        return Err(format!("location out of range: {lat},{lon}"));
    }
    Ok(location)
}
