use horai::aspects::{AspectKind, AspectTable, OrbTable};
use horai::bodies::{Body, DailySpeed, SpeedTable};
use horai::ephemeris::GeoLocation;
use horai::ingress::IngressOptions;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Paths tried, in order, when no config file is named explicitly.
pub const DEFAULT_CONFIG_PATHS: [&str; 2] = ["horai.toml", "configs/horai.toml"];

#[derive(Debug, Clone)]
pub struct NamedLocation {
    pub name: String,
    pub location: GeoLocation,
}

/// Fully resolved and validated settings.
#[derive(Debug, Clone)]
pub struct HoraiSettings {
    /// File the settings came from; `None` when running on defaults.
    pub source: Option<PathBuf>,
    pub location: Option<GeoLocation>,
    pub ephemeris_path: Option<PathBuf>,
    pub aspects: AspectTable,
    pub speeds: SpeedTable,
    pub ingress: IngressOptions,
    pub locations: Vec<NamedLocation>,
}

impl Default for HoraiSettings {
    fn default() -> Self {
        Self {
            source: None,
            location: None,
            ephemeris_path: None,
            aspects: AspectTable::traditional(),
            speeds: SpeedTable::default(),
            ingress: IngressOptions::default(),
            locations: Vec::new(),
        }
    }
}

impl HoraiSettings {
    /// Look up a `[[locations]]` entry by name, ignoring case.
    pub fn named_location(&self, name: &str) -> Option<GeoLocation> {
        self.locations
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(name.trim()))
            .map(|l| l.location)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct LocationToml {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct EphemerisToml {
    #[serde(default)]
    path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
struct OrbToml {
    #[serde(default)]
    default: Option<f64>,
    #[serde(default)]
    bodies: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct SpeedToml {
    min: f64,
    max: f64,
    avg: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct NamedLocationToml {
    name: String,
    lat: f64,
    lon: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RootConfigToml {
    #[serde(default)]
    location: Option<LocationToml>,
    #[serde(default)]
    ephemeris: EphemerisToml,
    #[serde(default)]
    orbs: BTreeMap<String, OrbToml>,
    #[serde(default)]
    speeds: BTreeMap<String, SpeedToml>,
    #[serde(default)]
    ingress: IngressOptions,
    #[serde(default)]
    locations: Vec<NamedLocationToml>,
}

/// Read the config text from `explicit`, or from the first default path that
/// exists. An explicit path that cannot be read is an error; finding no
/// default file is not.
pub fn read_config_text(explicit: Option<&Path>) -> anyhow::Result<Option<(PathBuf, String)>> {
    if let Some(path) = explicit {
        let text = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Could not read config {}: {e}", path.display()))?;
        return Ok(Some((path.to_path_buf(), text)));
    }
    for p in &DEFAULT_CONFIG_PATHS {
        if let Ok(text) = fs::read_to_string(p) {
            return Ok(Some((PathBuf::from(p), text)));
        }
    }
    Ok(None)
}

/// Load settings from `explicit` or the default paths, falling back to the
/// built-in tables when no file is found.
pub fn load_settings(explicit: Option<&Path>) -> anyhow::Result<HoraiSettings> {
    match read_config_text(explicit)? {
        Some((path, text)) => {
            let mut settings =
                parse_settings(&text).map_err(|e| anyhow::anyhow!("Invalid config {}: {e}", path.display()))?;
            settings.source = Some(path);
            Ok(settings)
        }
        None => Ok(HoraiSettings::default()),
    }
}

/// Parse and validate settings from TOML text.
pub fn parse_settings(text: &str) -> anyhow::Result<HoraiSettings> {
    let root: RootConfigToml = toml::from_str(text).map_err(|e| anyhow::anyhow!("Failed to parse TOML: {e}"))?;
    let RootConfigToml {
        location,
        ephemeris,
        orbs,
        speeds,
        ingress,
        locations,
    } = root;

    let location = location.map(|l| check_location("[location]", l.lat, l.lon)).transpose()?;

    let aspects = resolve_aspects(orbs)?;
    aspects.validate()?;

    let speeds = resolve_speeds(speeds)?;
    speeds.validate()?;

    if !ingress.tolerance.is_finite() || ingress.tolerance < 0.0 {
        anyhow::bail!("ingress.tolerance must be a non-negative number, got {}", ingress.tolerance);
    }
    if ingress.max_cycles == 0 {
        anyhow::bail!("ingress.max_cycles must be at least 1");
    }

    let mut named = Vec::with_capacity(locations.len());
    for l in locations {
        if named.iter().any(|n: &NamedLocation| n.name.eq_ignore_ascii_case(&l.name)) {
            anyhow::bail!("Duplicate location name: {}", l.name);
        }
        let location = check_location(&l.name, l.lat, l.lon)?;
        named.push(NamedLocation {
            name: l.name,
            location,
        });
    }

    Ok(HoraiSettings {
        source: None,
        location,
        ephemeris_path: ephemeris.path,
        aspects,
        speeds,
        ingress,
        locations: named,
    })
}

fn check_location(label: &str, lat: f64, lon: f64) -> anyhow::Result<GeoLocation> {
    let location = GeoLocation::new(lat, lon);
    if !location.is_valid() {
        anyhow::bail!("Location {label} out of range: lat {lat}, lon {lon}");
    }
    Ok(location)
}

/// Overlay `[orbs.<aspect>]` sections onto the traditional table.
fn resolve_aspects(orbs: BTreeMap<String, OrbToml>) -> anyhow::Result<AspectTable> {
    let mut table = AspectTable::traditional();
    for (name, orb) in orbs {
        let kind: AspectKind = name.parse()?;
        let definition = table
            .get_mut(kind)
            .ok_or_else(|| anyhow::anyhow!("Aspect {kind} is not in the table"))?;
        // A new default resets every body before the listed overrides apply.
        let mut resolved = match orb.default {
            Some(default) => OrbTable::uniform(default),
            None => definition.orbs.clone(),
        };
        for (body, value) in orb.bodies {
            let body: Body = body.parse()?;
            resolved.bodies.insert(body, value);
        }
        definition.orbs = resolved;
    }
    Ok(table)
}

/// Overlay `[speeds.<body>]` sections onto the default speed table.
fn resolve_speeds(speeds: BTreeMap<String, SpeedToml>) -> anyhow::Result<SpeedTable> {
    let mut table = SpeedTable::default();
    for (name, speed) in speeds {
        let body: Body = name.parse()?;
        if speed.min > speed.max {
            anyhow::bail!("speeds.{name}: min {} exceeds max {}", speed.min, speed.max);
        }
        table.set(body, DailySpeed::new(speed.min, speed.max, speed.avg));
    }
    Ok(table)
}
