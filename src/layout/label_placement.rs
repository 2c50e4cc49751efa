// Label placement and collision avoidance.
//
// Each label picks one of a small fixed set of candidate offsets around its
// anchor. Candidates are scored by weighted overlap with circles, segments
// and the labels already placed, plus a tiny bias toward the preferred
// direction. Labels are handled in scene order, so the result is
// reproducible and each placed label is an obstacle for the next.

use std::collections::BTreeMap;

use super::types::{Diagnostic, DiagnosticKind, LabelLayout, SegmentLayout};
use crate::config::LayoutConfig;
use crate::error::SceneError;
use crate::geometry::collision::{
    box_inside_circle, circle_box_overlap_area, overlap_area, point_in_box,
    segment_box_clip_length,
};
use crate::geometry::{BoundingBox, Circle, Label, Vector2};
use crate::ir::{LabelRequest, Scene};
use crate::log::{debug, warn};
use crate::text_metrics::{LabelMetrics, label_metrics};
use crate::theme::Theme;

const WEIGHT_CIRCLE_OVERLAP: f64 = 1.6;
const WEIGHT_LABEL_OVERLAP: f64 = 1.0;
const WEIGHT_SEGMENT_OVERLAP: f64 = 0.45;
/// Minimum width of the band around a stroke that counts as covered.
const SEGMENT_BAND_MIN: f64 = 2.0;
const SCORE_EPS: f64 = 1e-9;

/// Compass directions in evaluation order: N, NE, E, SE, S, SW, W, NW.
const COMPASS: [(f64, f64); 8] = [
    (0.0, -1.0),
    (std::f64::consts::FRAC_1_SQRT_2, -std::f64::consts::FRAC_1_SQRT_2),
    (1.0, 0.0),
    (std::f64::consts::FRAC_1_SQRT_2, std::f64::consts::FRAC_1_SQRT_2),
    (0.0, 1.0),
    (-std::f64::consts::FRAC_1_SQRT_2, std::f64::consts::FRAC_1_SQRT_2),
    (-1.0, 0.0),
    (-std::f64::consts::FRAC_1_SQRT_2, -std::f64::consts::FRAC_1_SQRT_2),
];

#[derive(Debug, Clone, Copy)]
struct Candidate {
    offset: Vector2,
    position: Vector2,
    bounds: BoundingBox,
    collision: f64,
    tie_break: f64,
}

impl Candidate {
    fn total(&self) -> f64 {
        self.collision + self.tie_break
    }
}

/// Where a label hangs from and which way it would rather go.
struct Attachment {
    anchor: Vector2,
    preferred: Vector2,
    /// Distance from the anchor to the owner's outline.
    reach: f64,
}

struct Obstacles<'a> {
    circles: &'a BTreeMap<String, Circle>,
    segments: &'a [SegmentLayout],
    placed: Vec<BoundingBox>,
}

impl Obstacles<'_> {
    /// Weighted overlap of `bounds` with everything on the canvas, as a
    /// fraction of the label's own area. A box wholly inside a disk that
    /// also holds the anchor is free, so labels can sit inside an
    /// enclosing cavity.
    fn penalty(&self, bounds: &BoundingBox, anchor: Vector2) -> f64 {
        let mut overlap = 0.0;
        for circle in self.circles.values() {
            if circle.contains(anchor) && box_inside_circle(bounds, circle) {
                continue;
            }
            overlap += circle_box_overlap_area(circle, bounds) * WEIGHT_CIRCLE_OVERLAP;
        }
        for seg in self.segments {
            let band = seg.segment.style.stroke_width.max(SEGMENT_BAND_MIN);
            overlap += segment_box_clip_length(&seg.segment, bounds) * band * WEIGHT_SEGMENT_OVERLAP;
        }
        for placed in &self.placed {
            overlap += overlap_area(bounds, placed) * WEIGHT_LABEL_OVERLAP;
        }
        overlap / bounds.area().max(1.0)
    }
}

/// Place every label of `scene` in order.
pub(super) fn place_labels(
    scene: &Scene,
    segments: &[SegmentLayout],
    theme: &Theme,
    config: &LayoutConfig,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Vec<LabelLayout>, SceneError> {
    let canvas = BoundingBox {
        x: 0.0,
        y: 0.0,
        width: scene.canvas().width,
        height: scene.canvas().height,
    };
    let mut obstacles = Obstacles {
        circles: scene.circles(),
        segments,
        placed: Vec::with_capacity(scene.labels().len()),
    };
    let mut placed = Vec::with_capacity(scene.labels().len());

    for request in scene.labels() {
        let attachment = attachment_for(request, scene, segments)?;
        let metrics = label_metrics(&request.text, request.is_vector, theme, config);
        let offsets = if request.candidate_offsets.is_empty() {
            let distance = attachment.reach + config.base_offset_factor * metrics.height();
            COMPASS
                .iter()
                .map(|&(x, y)| Vector2::new(x, y) * distance)
                .collect()
        } else {
            request.candidate_offsets.clone()
        };
        let label = Label::new(
            request.owner_id.clone(),
            attachment.anchor,
            request.text.clone(),
            request.is_vector,
            offsets,
        )?;

        let explicit = !request.candidate_offsets.is_empty();
        let best = choose_candidate(&label, &attachment, &metrics, &canvas, &obstacles, config, explicit);
        let Some(best) = best else {
            continue;
        };

        debug!(
            owner = %label.owner_id,
            x = best.position.x,
            y = best.position.y,
            score = best.collision,
            "placed label"
        );
        if best.collision > SCORE_EPS {
            let diagnostic = Diagnostic::new(
                DiagnosticKind::LabelOverlap,
                label.owner_id.clone(),
                format!(
                    "label `{}` placed with collision score {:.3}; every candidate overlaps",
                    label.text, best.collision
                ),
            );
            warn!(%diagnostic, "label overlap tolerated");
            diagnostics.push(diagnostic);
        }

        obstacles.placed.push(best.bounds);
        placed.push(LabelLayout {
            label,
            offset: best.offset,
            position: best.position,
            bounds: best.bounds,
            metrics,
            collision_score: best.collision,
            color: request.color.clone(),
        });
    }

    Ok(placed)
}

fn attachment_for(
    request: &LabelRequest,
    scene: &Scene,
    segments: &[SegmentLayout],
) -> Result<Attachment, SceneError> {
    if let Some(circle) = scene.circle(&request.owner_id) {
        return Ok(Attachment {
            anchor: circle.center,
            preferred: Vector2::new(0.0, -1.0),
            reach: circle.radius,
        });
    }
    let Some(seg) = segments.iter().find(|s| s.segment.id == request.owner_id) else {
        return Err(SceneError::UnknownOwner {
            id: request.owner_id.clone(),
        });
    };
    let unit = seg.segment.unit_direction()?;
    Ok(Attachment {
        anchor: seg.segment.midpoint(),
        preferred: upper_normal(unit),
        reach: 0.0,
    })
}

/// Perpendicular on the upper side of a direction; the right side when the
/// direction is vertical.
fn upper_normal(unit: Vector2) -> Vector2 {
    let normal = unit.perpendicular(false);
    if normal.y > 1e-9 || (normal.y.abs() <= 1e-9 && normal.x < 0.0) {
        -normal
    } else {
        normal
    }
}

fn choose_candidate(
    label: &Label,
    attachment: &Attachment,
    metrics: &LabelMetrics,
    canvas: &BoundingBox,
    obstacles: &Obstacles<'_>,
    config: &LayoutConfig,
    explicit: bool,
) -> Option<Candidate> {
    let clamp = point_in_box(label.anchor, canvas);
    let count = label.candidate_offsets.len().max(1) as f64;
    let mut best: Option<Candidate> = None;

    for (idx, offset) in label.candidate_offsets.iter().enumerate() {
        let mut position = label.anchor + *offset;
        if clamp {
            position = clamp_center_to_canvas(position, metrics, canvas);
        }
        let bounds = BoundingBox::centered(position, metrics.width, metrics.height());
        let preference = if explicit {
            idx as f64 / count
        } else {
            direction_distance(*offset, attachment.preferred)
        };
        let candidate = Candidate {
            offset: *offset,
            position,
            bounds,
            collision: obstacles.penalty(&bounds, label.anchor),
            tie_break: preference * config.tie_break_weight,
        };
        if best.is_none_or(|current| candidate_better(&candidate, &current)) {
            best = Some(candidate);
        }
    }
    best
}

/// 0 when `offset` points along `preferred`, 1 when opposite.
fn direction_distance(offset: Vector2, preferred: Vector2) -> f64 {
    match offset.normalize() {
        Ok(unit) => (1.0 - unit.dot(preferred)) / 2.0,
        Err(_) => 1.0,
    }
}

/// Strictly better; ties keep the earlier candidate.
fn candidate_better(candidate: &Candidate, best: &Candidate) -> bool {
    candidate.total() + SCORE_EPS < best.total()
}

fn clamp_center_to_canvas(center: Vector2, metrics: &LabelMetrics, canvas: &BoundingBox) -> Vector2 {
    let half_w = metrics.width / 2.0;
    let half_h = metrics.height() / 2.0;
    let min_x = canvas.x + half_w;
    let max_x = canvas.right() - half_w;
    let min_y = canvas.y + half_h;
    let max_y = canvas.bottom() - half_h;
    let x = if max_x < min_x {
        canvas.center().x
    } else {
        center.x.clamp(min_x, max_x)
    };
    let y = if max_y < min_y {
        canvas.center().y
    } else {
        center.y.clamp(min_y, max_y)
    };
    Vector2::new(x, y)
}
