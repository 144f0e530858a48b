use serde::{Deserialize, Serialize};

use crate::angle::{angle_between, AngularPosition};
use crate::aspects::types::{AspectMatch, AspectTable};
use crate::bodies::Body;

/// Classify a measured angle against the aspect table.
///
/// Definitions are tried in table order and the first window containing
/// `|angle.raw|` wins, even if a later aspect would be tighter.
pub fn match_aspect(
    angle: &AngularPosition,
    body_a: Body,
    body_b: Body,
    aspects: &AspectTable,
) -> Option<AspectMatch> {
    let separation = angle.raw.abs();
    aspects
        .definitions()
        .iter()
        .find(|def| def.window_contains(separation, body_a, body_b))
        .map(|def| AspectMatch {
            aspect: def.kind,
            orb: AngularPosition::from_degrees(separation - def.base_angle),
        })
}

/// A body's longitude at the instant of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyLongitude {
    pub body: Body,
    pub longitude: f64,
}

/// Aspect (or its absence) between an ordered pair of bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairAspect {
    pub from: Body,
    pub to: Body,
    pub angle: AngularPosition,
    pub aspect: Option<AspectMatch>,
}

/// Aspects between every ordered pair of distinct bodies in a chart snapshot.
pub fn aspects_for_positions(positions: &[BodyLongitude], aspects: &AspectTable) -> Vec<PairAspect> {
    let mut pairs = Vec::with_capacity(positions.len() * positions.len().saturating_sub(1));
    for a in positions {
        for b in positions {
            if a.body == b.body {
                continue;
            }
            let angle = angle_between(a.longitude, b.longitude);
            pairs.push(PairAspect {
                from: a.body,
                to: b.body,
                angle,
                aspect: match_aspect(&angle, a.body, b.body, aspects),
            });
        }
    }
    pairs
}
