mod args;

use anyhow::Context;
use args::{AspectsArgs, Cli, Command, HoursArgs, IngressArgs, PlaceArgs, SearchArgs};
use chrono::{DateTime, Duration, FixedOffset, Local, Offset, Utc};
use clap::Parser;
use horai::aspects::{
    aspects_for_positions, multi_body_search, AspectKind, AspectTable, BodyLongitude, PairAspect, PairSummary,
};
use horai::bodies::Body;
use horai::ephemeris::{EphemerisProvider, GeoLocation, SwissEphemerisAdapter};
use horai::hours::{planetary_hours_for_date, HourDivision, PlanetaryHour, RulerRotation};
use horai::ingress::{next_sign_boundary, IngressSearch};
use horai_config::{load_settings, HoraiSettings};
use serde::Serialize;

#[derive(Serialize)]
struct AspectsReport {
    at: DateTime<Utc>,
    positions: Vec<BodyLongitude>,
    aspects: Vec<PairAspect>,
}

#[derive(Serialize)]
struct SearchReport {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    increment_minutes: i64,
    pairs: Vec<PairSummary>,
}

#[derive(Serialize)]
struct IngressReport {
    body: Body,
    target: f64,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    /// `None` when the body does not get there inside the window.
    instant: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
struct HoursReport {
    location: GeoLocation,
    division: HourDivision,
    #[serde(skip_serializing_if = "Option::is_none")]
    current: Option<PlanetaryHour>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let settings = load_settings(cli.config.as_deref())?;
    match &settings.source {
        Some(path) => log::info!("Loaded config from {}", path.display()),
        None => log::info!("No config file found, using built-in tables"),
    }

    let ephemeris_path = cli.ephemeris.clone().or_else(|| settings.ephemeris_path.clone());
    let provider = SwissEphemerisAdapter::new(ephemeris_path).context("Failed to open ephemeris")?;

    let json = match cli.command {
        Command::Aspects(args) => to_json(&run_aspects(&provider, &settings, args)?, cli.compact)?,
        Command::Search(args) => to_json(&run_search(&provider, &settings, args)?, cli.compact)?,
        Command::Ingress(args) => to_json(&run_ingress(&provider, &settings, args)?, cli.compact)?,
        Command::Hours(args) => to_json(&run_hours(&provider, &settings, args)?, cli.compact)?,
    };
    println!("{json}");
    Ok(())
}

fn to_json<T: Serialize>(value: &T, compact: bool) -> anyhow::Result<String> {
    let text = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    Ok(text)
}

fn aspect_table(settings: &HoraiSettings, kinds: &[AspectKind]) -> anyhow::Result<AspectTable> {
    if kinds.is_empty() {
        return Ok(settings.aspects.clone());
    }
    Ok(settings.aspects.restricted_to(kinds)?)
}

fn run_aspects<P: EphemerisProvider>(
    provider: &P,
    settings: &HoraiSettings,
    args: AspectsArgs,
) -> anyhow::Result<AspectsReport> {
    let at = args.at.unwrap_or_else(Utc::now);
    let bodies = if args.bodies.is_empty() {
        Body::ALL.to_vec()
    } else {
        args.bodies
    };
    let table = aspect_table(settings, &args.aspects)?;

    let positions = bodies
        .iter()
        .map(|&body| {
            let pos = provider.position_of(at, body)?;
            Ok(BodyLongitude {
                body,
                longitude: pos.longitude,
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut aspects = aspects_for_positions(&positions, &table);
    if !args.all {
        aspects.retain(|p| p.aspect.is_some());
    }
    Ok(AspectsReport { at, positions, aspects })
}

fn run_search<P: EphemerisProvider>(
    provider: &P,
    settings: &HoraiSettings,
    args: SearchArgs,
) -> anyhow::Result<SearchReport> {
    let bodies_a = if args.bodies_a.is_empty() {
        Body::TRADITIONAL.to_vec()
    } else {
        args.bodies_a
    };
    let bodies_b = if args.bodies_b.is_empty() {
        bodies_a.clone()
    } else {
        args.bodies_b
    };
    let table = aspect_table(settings, &args.aspects)?;
    let increment = Duration::minutes(args.increment_minutes);

    log::info!(
        "Searching {} x {} bodies from {} to {} every {} min",
        bodies_a.len(),
        bodies_b.len(),
        args.from,
        args.to,
        args.increment_minutes
    );
    let mut pairs = multi_body_search(provider, args.from, args.to, &bodies_a, &bodies_b, &table, increment)?;
    if args.matched_only {
        pairs.retain(|p| p.summary.first.is_some());
    }

    Ok(SearchReport {
        from: args.from,
        to: args.to,
        increment_minutes: args.increment_minutes,
        pairs,
    })
}

fn run_ingress<P: EphemerisProvider>(
    provider: &P,
    settings: &HoraiSettings,
    args: IngressArgs,
) -> anyhow::Result<IngressReport> {
    let from = args.from.unwrap_or_else(Utc::now);
    let to = from
        .checked_add_signed(Duration::days(args.days))
        .ok_or_else(|| anyhow::anyhow!("--days {} overflows the calendar", args.days))?;

    let mut options = settings.ingress;
    if let Some(tolerance) = args.tolerance {
        options.tolerance = tolerance;
    }
    let search = IngressSearch::new(provider, &settings.speeds, options);

    let (target, instant) = if args.next_sign {
        let target = next_sign_boundary(provider.position_of(from, args.body)?.longitude);
        (target, search.find(args.body, from, to, target, false)?)
    } else {
        let target = args
            .target
            .ok_or_else(|| anyhow::anyhow!("--target is required without --next-sign"))?;
        (target.rem_euclid(360.0), search.find(args.body, from, to, target, args.backward)?)
    };

    if instant.is_none() {
        log::warn!("{} does not reach {target:.2}° between {from} and {to}", args.body);
    }
    Ok(IngressReport {
        body: args.body,
        target,
        from,
        to,
        instant,
    })
}

fn resolve_place(settings: &HoraiSettings, place: &PlaceArgs) -> anyhow::Result<GeoLocation> {
    if let Some(geo) = place.geo {
        return Ok(geo);
    }
    if let Some(name) = &place.location {
        return settings.named_location(name).ok_or_else(|| {
            let known: Vec<&str> = settings.locations.iter().map(|l| l.name.as_str()).collect();
            anyhow::anyhow!("Unknown location '{name}'. Configured locations: {known:?}")
        });
    }
    settings.location.ok_or_else(|| {
        anyhow::anyhow!("No location: pass --geo lat,lon or --location <name>, or set [location] in the config")
    })
}

fn run_hours<P: EphemerisProvider>(
    provider: &P,
    settings: &HoraiSettings,
    args: HoursArgs,
) -> anyhow::Result<HoursReport> {
    let location = resolve_place(settings, &args.place)?;
    let offset: FixedOffset = args.offset.unwrap_or_else(|| Local::now().offset().fix());
    let date = args
        .date
        .unwrap_or_else(|| Utc::now().with_timezone(&offset).date_naive());

    let division = planetary_hours_for_date(provider, date, &location, offset, &RulerRotation::chaldean())
        .with_context(|| {
            format!(
                "Failed to compute planetary hours for {date} at {},{}",
                location.lat, location.lon
            )
        })?;
    let current = args
        .at
        .and_then(|at| division.find_hour(at.with_timezone(&offset)).copied());

    Ok(HoursReport {
        location,
        division,
        current,
    })
}
