//! Sampling aspect search over a time window.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::angle::angle_between;
use crate::aspects::matcher::match_aspect;
use crate::aspects::types::{AspectMatch, AspectTable};
use crate::bodies::Body;
use crate::ephemeris::EphemerisProvider;
use crate::error::HoraiError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineSample {
    pub instant: DateTime<Utc>,
    pub aspect: Option<AspectMatch>,
}

impl TimelineSample {
    pub fn is_match(&self) -> bool {
        self.aspect.is_some()
    }
}

/// Samples of the aspect between two bodies, in time order.
///
/// The first sample is at the requested start and the last at the requested
/// end, whether or not the end falls on the sampling grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub body_a: Body,
    pub body_b: Body,
    pub samples: Vec<TimelineSample>,
}

impl Timeline {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.samples.iter().any(|s| s.instant == instant)
    }

    pub fn matches(&self) -> impl Iterator<Item = &TimelineSample> {
        self.samples.iter().filter(|s| s.is_match())
    }
}

/// Condensed view of a [`Timeline`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchSummary {
    /// Both the first and the last sample matched.
    pub full: bool,
    pub first: Option<TimelineSample>,
    pub last: Option<TimelineSample>,
    /// Matching sample with the lowest signed orb.
    pub min: Option<TimelineSample>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairSummary {
    pub from: Body,
    pub to: Body,
    pub summary: SearchSummary,
}

fn sample<P: EphemerisProvider + ?Sized>(
    provider: &P,
    instant: DateTime<Utc>,
    body_a: Body,
    body_b: Body,
    aspects: &AspectTable,
) -> Result<TimelineSample, HoraiError> {
    let pos_a = provider.position_of(instant, body_a)?;
    let pos_b = provider.position_of(instant, body_b)?;
    let angle = angle_between(pos_a.longitude, pos_b.longitude);
    let aspect = match_aspect(&angle, body_a, body_b, aspects);
    log::trace!("{body_a}-{body_b} at {instant}: {:.5}° -> {:?}", angle.raw, aspect.map(|m| m.aspect));
    Ok(TimelineSample { instant, aspect })
}

fn check_window(start: DateTime<Utc>, end: DateTime<Utc>, increment: Duration) -> Result<(), HoraiError> {
    if start > end {
        return Err(HoraiError::InvalidRange { start, end });
    }
    if increment <= Duration::zero() {
        return Err(HoraiError::InvalidIncrement(increment));
    }
    Ok(())
}

/// Sample the aspect between `body_a` and `body_b` every `increment` from
/// `start` while before `end`, then once more exactly at `end`.
pub fn search_range<P: EphemerisProvider + ?Sized>(
    provider: &P,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    body_a: Body,
    body_b: Body,
    aspects: &AspectTable,
    increment: Duration,
) -> Result<Timeline, HoraiError> {
    check_window(start, end, increment)?;

    let mut samples = Vec::new();
    let mut current = start;
    while current < end {
        samples.push(sample(provider, current, body_a, body_b, aspects)?);
        current += increment;
    }
    samples.push(sample(provider, end, body_a, body_b, aspects)?);

    log::debug!(
        "{body_a}-{body_b}: {} samples from {start} to {end}, {} matched",
        samples.len(),
        samples.iter().filter(|s| s.is_match()).count()
    );

    Ok(Timeline {
        body_a,
        body_b,
        samples,
    })
}

/// Orders matches by signed orb, most negative first, then by time.
/// Unmatched samples sort last.
fn by_signed_orb(a: &TimelineSample, b: &TimelineSample) -> Ordering {
    match (a.aspect, b.aspect) {
        (Some(ma), Some(mb)) => ma.orb.raw.total_cmp(&mb.orb.raw).then(a.instant.cmp(&b.instant)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.instant.cmp(&b.instant),
    }
}

pub fn summarize(timeline: &Timeline) -> SearchSummary {
    let full = matches!(
        (timeline.samples.first(), timeline.samples.last()),
        (Some(f), Some(l)) if f.is_match() && l.is_match()
    );
    let first = timeline.matches().next().copied();
    let last = timeline.matches().last().copied();
    let min = timeline.matches().min_by(|a, b| by_signed_orb(a, b)).copied();

    SearchSummary {
        full,
        first,
        last,
        min,
    }
}

/// Search and summarize every ordered pair `(a, b)` with `a` from `bodies_a`,
/// `b` from `bodies_b` and `a != b`.
pub fn multi_body_search<P: EphemerisProvider + ?Sized>(
    provider: &P,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    bodies_a: &[Body],
    bodies_b: &[Body],
    aspects: &AspectTable,
    increment: Duration,
) -> Result<Vec<PairSummary>, HoraiError> {
    check_window(start, end, increment)?;

    let mut summaries = Vec::new();
    for &from in bodies_a {
        for &to in bodies_b {
            if from == to {
                continue;
            }
            let timeline = search_range(provider, start, end, from, to, aspects, increment)?;
            summaries.push(PairSummary {
                from,
                to,
                summary: summarize(&timeline),
            });
        }
    }
    Ok(summaries)
}
