// Segment endpoint resolution: arrowheads stop at the circle they point
// into, and segments that cross a circle or an earlier segment they were
// not meant to touch get nudged sideways in small fixed steps.

use std::collections::{BTreeMap, BTreeSet};

use super::types::{Diagnostic, DiagnosticKind, SegmentLayout};
use crate::config::LayoutConfig;
use crate::error::SceneError;
use crate::geometry::collision::{circle_entry, line_intersects_circle, segments_intersect};
use crate::geometry::primitives::COINCIDENT_EPS;
use crate::geometry::{Circle, Segment, Vector2};
use crate::ir::{Scene, SceneSegment};
use crate::log::{debug, warn};

enum Obstruction<'a> {
    Circle(&'a Circle),
    Segment(&'a Segment),
}

impl Obstruction<'_> {
    /// Point the nudge moves away from.
    fn reference_point(&self) -> Vector2 {
        match self {
            Obstruction::Circle(circle) => circle.center,
            Obstruction::Segment(segment) => segment.midpoint(),
        }
    }

    fn describe(&self) -> String {
        match self {
            Obstruction::Circle(circle) => format!("circle `{}`", circle.id),
            Obstruction::Segment(segment) => format!("segment `{}`", segment.id),
        }
    }
}

/// Resolve every scene segment in order. Earlier segments are obstacles for
/// later ones.
pub(super) fn resolve_segments(
    scene: &Scene,
    config: &LayoutConfig,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Vec<SegmentLayout>, SceneError> {
    let mut resolved: Vec<SegmentLayout> = Vec::with_capacity(scene.segments().len());
    for item in scene.segments() {
        let layout = resolve_segment(item, scene.circles(), &resolved, config, diagnostics)?;
        resolved.push(layout);
    }
    Ok(resolved)
}

fn resolve_segment(
    item: &SceneSegment,
    circles: &BTreeMap<String, Circle>,
    previous: &[SegmentLayout],
    config: &LayoutConfig,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<SegmentLayout, SceneError> {
    let requested = &item.segment;
    let unit = requested.unit_direction()?;
    let target = target_circle(item, circles);
    let intended = intended_contacts(requested, target, circles);

    let end = resolve_end(requested, requested.start, target, config.arrow_clearance);
    let base = requested.with_endpoints(requested.start, end)?;
    let layout = |segment: Segment, nudges: u32| SegmentLayout {
        segment,
        requested: requested.clone(),
        target: target.map(|c| c.id.clone()),
        arrow: item.arrow,
        nudges,
    };

    let Some(blocker) = first_obstruction(&base, circles, &intended, previous) else {
        return Ok(layout(base, 0));
    };

    let mut normal = unit.perpendicular(false);
    if (blocker.reference_point() - requested.start).dot(normal) > 0.0 {
        normal = -normal;
    }
    debug!(
        segment = %requested.id,
        blocker = %blocker.describe(),
        "nudging segment"
    );

    for attempt in 1..=config.nudge_attempts {
        let start = requested.start + normal * (config.nudge_step * f64::from(attempt));
        let end = resolve_end(requested, start, target, config.arrow_clearance);
        let Ok(candidate) = requested.with_endpoints(start, end) else {
            continue;
        };
        if first_obstruction(&candidate, circles, &intended, previous).is_none() {
            return Ok(layout(candidate, attempt));
        }
    }

    let diagnostic = Diagnostic::new(
        DiagnosticKind::SegmentNudgeFailed,
        requested.id.clone(),
        format!(
            "still crosses {} after {} nudges of {}px",
            blocker.describe(),
            config.nudge_attempts,
            config.nudge_step
        ),
    );
    warn!(%diagnostic, "segment left colliding");
    diagnostics.push(diagnostic);
    Ok(layout(base, 0))
}

/// The circle an arrow points into: the explicit owner, or else the disk
/// containing the end point with the nearest center (ties go to the
/// smallest id).
fn target_circle<'a>(
    item: &SceneSegment,
    circles: &'a BTreeMap<String, Circle>,
) -> Option<&'a Circle> {
    if !item.arrow {
        return None;
    }
    if let Some(id) = &item.owner_circle_id {
        return circles.get(id);
    }
    let end = item.segment.end;
    circles
        .values()
        .filter(|circle| circle.contains(end))
        .fold(None, |best: Option<&Circle>, circle| match best {
            Some(b) if b.center.distance(end) <= circle.center.distance(end) => Some(b),
            _ => Some(circle),
        })
}

/// Circles the segment may legitimately touch: its target and any disk
/// holding one of its requested endpoints.
fn intended_contacts(
    requested: &Segment,
    target: Option<&Circle>,
    circles: &BTreeMap<String, Circle>,
) -> BTreeSet<String> {
    let mut ids: BTreeSet<String> = circles
        .values()
        .filter(|c| c.contains(requested.start) || c.contains(requested.end))
        .map(|c| c.id.clone())
        .collect();
    if let Some(target) = target {
        ids.insert(target.id.clone());
    }
    ids
}

/// End point that stops `clearance` short of where the segment from
/// `start` enters `target`. Unchanged when there is nothing to shorten.
fn resolve_end(
    requested: &Segment,
    start: Vector2,
    target: Option<&Circle>,
    clearance: f64,
) -> Vector2 {
    let end = requested.end;
    let Some(circle) = target else {
        return end;
    };
    let Ok(trial) = requested.with_endpoints(start, end) else {
        return end;
    };
    let Some(t) = circle_entry(&trial, circle) else {
        return end;
    };
    let Ok(unit) = trial.unit_direction() else {
        return end;
    };
    let stop = start + trial.direction() * t - unit * clearance;
    if (stop - start).dot(unit) <= COINCIDENT_EPS {
        return end;
    }
    stop
}

fn first_obstruction<'a>(
    segment: &Segment,
    circles: &'a BTreeMap<String, Circle>,
    intended: &BTreeSet<String>,
    previous: &'a [SegmentLayout],
) -> Option<Obstruction<'a>> {
    let circle = circles
        .values()
        .filter(|c| !intended.contains(&c.id))
        .find(|c| line_intersects_circle(segment, c));
    if let Some(circle) = circle {
        return Some(Obstruction::Circle(circle));
    }
    previous
        .iter()
        .map(|prev| &prev.segment)
        .filter(|other| !other.shares_endpoint(segment))
        .find(|other| segments_intersect(segment, other))
        .map(Obstruction::Segment)
}
