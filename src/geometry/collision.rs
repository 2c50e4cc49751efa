// Collision predicates. Every overlap decision in the crate goes through
// the four predicates at the top of this file; the helpers below them only
// measure how much two primitives overlap once a predicate says they do.

use super::primitives::{BoundingBox, Circle, Segment};
use super::vector::Vector2;

/// Does the segment cross the circle's boundary?
///
/// Solves `|f + t*d|^2 = r^2` with `f = start - center`, `d = end - start`
/// and reports a hit when either root lies in `[0, 1]`. A segment lying
/// entirely inside the disk never reaches the boundary and does not count.
pub fn line_intersects_circle(seg: &Segment, circle: &Circle) -> bool {
    let (start, end) = canonical_endpoints(seg.start, seg.end);
    circle_roots(start, end, circle)
        .map(|(t1, t2)| (0.0..=1.0).contains(&t1) || (0.0..=1.0).contains(&t2))
        .unwrap_or(false)
}

/// Proper crossing test; collinear overlap is not an intersection.
pub fn segments_intersect(a: &Segment, b: &Segment) -> bool {
    let (pa, pb, pc, pd) = (a.start, a.end, b.start, b.end);
    ccw(pa, pc, pd) != ccw(pb, pc, pd) && ccw(pa, pb, pc) != ccw(pa, pb, pd)
}

pub fn boxes_overlap(a: &BoundingBox, b: &BoundingBox) -> bool {
    let separated =
        a.right() < b.x || b.right() < a.x || a.bottom() < b.y || b.bottom() < a.y;
    !separated
}

pub fn point_in_box(p: Vector2, bbox: &BoundingBox) -> bool {
    p.x >= bbox.x && p.x <= bbox.right() && p.y >= bbox.y && p.y <= bbox.bottom()
}

/// Parameters `t1 <= t2` where the infinite line through `start`/`end`
/// meets the circle, or `None` when it misses.
fn circle_roots(start: Vector2, end: Vector2, circle: &Circle) -> Option<(f64, f64)> {
    let d = end - start;
    let f = start - circle.center;
    let a = d.dot(d);
    if a <= f64::EPSILON {
        return None;
    }
    let b = 2.0 * f.dot(d);
    let c = f.dot(f) - circle.radius * circle.radius;
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt = discriminant.sqrt();
    Some(((-b - sqrt) / (2.0 * a), (-b + sqrt) / (2.0 * a)))
}

/// Parameter along `seg` where it first enters `circle` from outside.
pub fn circle_entry(seg: &Segment, circle: &Circle) -> Option<f64> {
    if circle.contains(seg.start) {
        return None;
    }
    let (t1, _) = circle_roots(seg.start, seg.end, circle)?;
    (0.0..=1.0).contains(&t1).then_some(t1)
}

fn canonical_endpoints(a: Vector2, b: Vector2) -> (Vector2, Vector2) {
    if lex_greater(a, b) { (b, a) } else { (a, b) }
}

fn lex_greater(a: Vector2, b: Vector2) -> bool {
    a.x > b.x || (a.x == b.x && a.y > b.y)
}

/// Signed area of the triangle `abc`, computed on a canonical ordering of
/// the points so every permutation rounds identically.
fn orientation(a: Vector2, b: Vector2, c: Vector2) -> f64 {
    let mut pts = [a, b, c];
    let mut odd = false;
    for (i, j) in [(0, 1), (1, 2), (0, 1)] {
        if lex_greater(pts[i], pts[j]) {
            pts.swap(i, j);
            odd = !odd;
        }
    }
    let cross = (pts[1] - pts[0]).cross(pts[2] - pts[0]);
    if odd { -cross } else { cross }
}

fn ccw(a: Vector2, b: Vector2, c: Vector2) -> bool {
    orientation(a, b, c) > 0.0
}

/// Closest point of `bbox` to `point` (the point itself when inside).
pub fn closest_point_in_box(point: Vector2, bbox: &BoundingBox) -> Vector2 {
    Vector2::new(
        point.x.clamp(bbox.x, bbox.right()),
        point.y.clamp(bbox.y, bbox.bottom()),
    )
}

/// Distance-to-center test between a disk and a box.
pub fn circle_intersects_box(circle: &Circle, bbox: &BoundingBox) -> bool {
    if point_in_box(circle.center, bbox) {
        return true;
    }
    closest_point_in_box(circle.center, bbox).distance(circle.center) < circle.radius
}

/// True when the whole box sits inside the disk, clear of its outline.
pub fn box_inside_circle(bbox: &BoundingBox, circle: &Circle) -> bool {
    bbox.corners()
        .iter()
        .all(|corner| corner.distance(circle.center) < circle.radius)
}

pub fn segment_intersects_box(seg: &Segment, bbox: &BoundingBox) -> bool {
    if point_in_box(seg.start, bbox) || point_in_box(seg.end, bbox) {
        return true;
    }
    box_edges(bbox, seg).iter().any(|edge| segments_intersect(seg, edge))
}

fn box_edges(bbox: &BoundingBox, like: &Segment) -> Vec<Segment> {
    let corners = bbox.corners();
    (0..4)
        .map(|i| Segment {
            id: like.id.clone(),
            start: corners[i],
            end: corners[(i + 1) % 4],
            style: like.style.clone(),
        })
        .collect()
}

/// Area shared by two boxes (zero when they only touch).
pub fn overlap_area(a: &BoundingBox, b: &BoundingBox) -> f64 {
    if !boxes_overlap(a, b) {
        return 0.0;
    }
    let x0 = a.x.max(b.x);
    let y0 = a.y.max(b.y);
    let x1 = a.right().min(b.right());
    let y1 = a.bottom().min(b.bottom());
    (x1 - x0).max(0.0) * (y1 - y0).max(0.0)
}

/// Approximate area shared by a disk and a box: the overlap with the disk's
/// bounding square scaled by the disk/square area ratio.
pub fn circle_box_overlap_area(circle: &Circle, bbox: &BoundingBox) -> f64 {
    if !circle_intersects_box(circle, bbox) {
        return 0.0;
    }
    overlap_area(&circle.bounds(), bbox) * std::f64::consts::FRAC_PI_4
}

/// Length of the part of `seg` lying inside `bbox` (Liang-Barsky clip).
pub fn segment_box_clip_length(seg: &Segment, bbox: &BoundingBox) -> f64 {
    if !segment_intersects_box(seg, bbox) {
        return 0.0;
    }
    let d = seg.direction();
    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;
    let checks = [
        (-d.x, seg.start.x - bbox.x),
        (d.x, bbox.right() - seg.start.x),
        (-d.y, seg.start.y - bbox.y),
        (d.y, bbox.bottom() - seg.start.y),
    ];
    for (p, q) in checks {
        if p.abs() <= f64::EPSILON {
            if q < 0.0 {
                return 0.0;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
    }
    if t1 <= t0 {
        return 0.0;
    }
    (t1 - t0) * d.magnitude()
}
