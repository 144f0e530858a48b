use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::angle::AngularPosition;
use crate::bodies::Body;
use crate::error::HoraiError;

/// The recognised angular relationships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectKind {
    Conjunction,
    Opposition,
    Square,
    Trine,
    Sextile,
    Semisquare,
}

impl AspectKind {
    /// Matching priority: the first kind whose window contains an angle wins.
    pub const PRIORITY: [AspectKind; 6] = [
        AspectKind::Conjunction,
        AspectKind::Opposition,
        AspectKind::Square,
        AspectKind::Trine,
        AspectKind::Sextile,
        AspectKind::Semisquare,
    ];

    pub fn base_angle(self) -> f64 {
        match self {
            AspectKind::Conjunction => 0.0,
            AspectKind::Opposition => 180.0,
            AspectKind::Square => 90.0,
            AspectKind::Trine => 120.0,
            AspectKind::Sextile => 60.0,
            AspectKind::Semisquare => 30.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AspectKind::Conjunction => "conjunction",
            AspectKind::Opposition => "opposition",
            AspectKind::Square => "square",
            AspectKind::Trine => "trine",
            AspectKind::Sextile => "sextile",
            AspectKind::Semisquare => "semisquare",
        }
    }

    pub fn glyph(self) -> char {
        match self {
            AspectKind::Conjunction => '☌',
            AspectKind::Opposition => '☍',
            AspectKind::Square => '□',
            AspectKind::Trine => '△',
            AspectKind::Sextile => '⚹',
            AspectKind::Semisquare => '∠',
        }
    }

    fn default_orb(self) -> f64 {
        match self {
            AspectKind::Conjunction
            | AspectKind::Opposition
            | AspectKind::Square
            | AspectKind::Trine => 10.0,
            AspectKind::Sextile => 6.0,
            AspectKind::Semisquare => 3.0,
        }
    }
}

impl fmt::Display for AspectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AspectKind {
    type Err = HoraiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        AspectKind::PRIORITY
            .iter()
            .copied()
            .find(|k| k.name() == lower || k.name()[..3] == lower)
            .ok_or_else(|| HoraiError::UnknownAspect {
                name: s.to_string(),
                valid: AspectKind::PRIORITY.iter().map(|k| k.name().to_string()).collect(),
            })
    }
}

/// Orb tolerances in degrees, keyed by body, with a fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbTable {
    pub default: f64,
    #[serde(default)]
    pub bodies: BTreeMap<Body, f64>,
}

impl OrbTable {
    /// A table giving every body the same orb.
    pub fn uniform(orb: f64) -> Self {
        Self {
            default: orb,
            bodies: Body::ALL.iter().map(|b| (*b, orb)).collect(),
        }
    }

    /// Orb for a pair: the larger of the two bodies' orbs, or the table
    /// default when either body has no entry.
    pub fn orb_for(&self, body_a: Body, body_b: Body) -> f64 {
        match (self.bodies.get(&body_a), self.bodies.get(&body_b)) {
            (Some(a), Some(b)) => a.max(*b),
            _ => self.default,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectDefinition {
    pub kind: AspectKind,
    pub base_angle: f64,
    pub orbs: OrbTable,
}

impl AspectDefinition {
    pub fn new(kind: AspectKind, orbs: OrbTable) -> Self {
        Self {
            kind,
            base_angle: kind.base_angle(),
            orbs,
        }
    }

    /// Whether `separation` lies within `[base - orb, base + orb]` for the pair.
    pub fn window_contains(&self, separation: f64, body_a: Body, body_b: Body) -> bool {
        let orb = self.orbs.orb_for(body_a, body_b);
        separation >= self.base_angle - orb && separation <= self.base_angle + orb
    }

    fn validate(&self) -> Result<(), HoraiError> {
        if !(0.0..=180.0).contains(&self.base_angle) {
            return Err(HoraiError::InvalidBaseAngle {
                aspect: self.kind.to_string(),
                angle: self.base_angle,
            });
        }
        let entries = std::iter::once(("default".to_string(), self.orbs.default))
            .chain(self.orbs.bodies.iter().map(|(b, o)| (b.to_string(), *o)));
        for (key, orb) in entries {
            if !orb.is_finite() || orb < 0.0 {
                return Err(HoraiError::InvalidOrb {
                    aspect: self.kind.to_string(),
                    key,
                    orb,
                });
            }
        }
        Ok(())
    }
}

/// Aspect definitions in matching order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectTable {
    definitions: Vec<AspectDefinition>,
}

impl AspectTable {
    /// Builds a validated table. Order of `definitions` is the match priority.
    pub fn new(definitions: Vec<AspectDefinition>) -> Result<Self, HoraiError> {
        let table = Self { definitions };
        table.validate()?;
        Ok(table)
    }

    /// The six classical aspects with their customary orbs.
    pub fn traditional() -> Self {
        Self {
            definitions: AspectKind::PRIORITY
                .iter()
                .map(|k| AspectDefinition::new(*k, OrbTable::uniform(k.default_orb())))
                .collect(),
        }
    }

    pub fn definitions(&self) -> &[AspectDefinition] {
        &self.definitions
    }

    pub fn get(&self, kind: AspectKind) -> Option<&AspectDefinition> {
        self.definitions.iter().find(|d| d.kind == kind)
    }

    pub fn get_mut(&mut self, kind: AspectKind) -> Option<&mut AspectDefinition> {
        self.definitions.iter_mut().find(|d| d.kind == kind)
    }

    /// Keeps only the listed kinds, preserving table order.
    pub fn restricted_to(&self, kinds: &[AspectKind]) -> Result<Self, HoraiError> {
        Self::new(
            self.definitions
                .iter()
                .filter(|d| kinds.contains(&d.kind))
                .cloned()
                .collect(),
        )
    }

    pub fn validate(&self) -> Result<(), HoraiError> {
        if self.definitions.is_empty() {
            return Err(HoraiError::EmptyAspectTable);
        }
        self.definitions.iter().try_for_each(AspectDefinition::validate)
    }
}

impl Default for AspectTable {
    fn default() -> Self {
        Self::traditional()
    }
}

/// A matched aspect. `orb.raw` is the measured separation minus the base
/// angle, so it is negative when the separation is below exact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AspectMatch {
    pub aspect: AspectKind,
    pub orb: AngularPosition,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orb_for_takes_larger_of_pair() {
        let mut orbs = OrbTable::uniform(6.0);
        orbs.bodies.insert(Body::Sun, 8.0);
        assert_eq!(orbs.orb_for(Body::Sun, Body::Moon), 8.0);
        assert_eq!(orbs.orb_for(Body::Moon, Body::Sun), 8.0);
    }

    #[test]
    fn test_orb_for_falls_back_when_either_missing() {
        let mut bodies = BTreeMap::new();
        bodies.insert(Body::Sun, 12.0);
        let orbs = OrbTable { default: 4.0, bodies };
        assert_eq!(orbs.orb_for(Body::Sun, Body::Pluto), 4.0);
        assert_eq!(orbs.orb_for(Body::Sun, Body::Sun), 12.0);
    }

    #[test]
    fn test_traditional_table_is_valid() {
        let table = AspectTable::traditional();
        assert!(table.validate().is_ok());
        let kinds: Vec<_> = table.definitions().iter().map(|d| d.kind).collect();
        assert_eq!(kinds, AspectKind::PRIORITY);
        for def in table.definitions() {
            assert!((0.0..=180.0).contains(&def.base_angle));
            assert!(def.orbs.default >= 0.0);
            assert!(def.orbs.bodies.values().all(|o| *o >= 0.0));
        }
        assert_eq!(table.get(AspectKind::Sextile).unwrap().orbs.default, 6.0);
        assert_eq!(table.get(AspectKind::Semisquare).unwrap().orbs.default, 3.0);
    }

    #[test]
    fn test_invalid_tables_are_rejected() {
        assert!(matches!(
            AspectTable::new(vec![]),
            Err(HoraiError::EmptyAspectTable)
        ));

        let mut def = AspectDefinition::new(AspectKind::Trine, OrbTable::uniform(5.0));
        def.base_angle = 200.0;
        assert!(matches!(
            AspectTable::new(vec![def]),
            Err(HoraiError::InvalidBaseAngle { .. })
        ));

        let def = AspectDefinition::new(AspectKind::Trine, OrbTable::uniform(-1.0));
        assert!(matches!(
            AspectTable::new(vec![def]),
            Err(HoraiError::InvalidOrb { .. })
        ));
    }

    #[test]
    fn test_parse_aspect_kind() {
        assert_eq!("opposition".parse::<AspectKind>().unwrap(), AspectKind::Opposition);
        assert_eq!("sex".parse::<AspectKind>().unwrap(), AspectKind::Sextile);
        assert!("quincunx".parse::<AspectKind>().is_err());
    }
}
