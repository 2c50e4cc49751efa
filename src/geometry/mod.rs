//! Pure 2D geometry: vectors, validated primitives and the collision
//! predicates every layout decision is built on.

pub mod collision;
pub mod primitives;
pub mod vector;

pub use collision::{boxes_overlap, line_intersects_circle, point_in_box, segments_intersect};
pub use primitives::{BoundingBox, Circle, CircleStyle, Label, Segment, SegmentStyle};
pub use vector::Vector2;
