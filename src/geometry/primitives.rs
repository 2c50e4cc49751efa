use super::vector::Vector2;
use crate::error::{DegenerateVectorError, InvalidGeometryError};
use serde::{Deserialize, Serialize};

/// Segment endpoints closer than this are considered coincident.
pub const COINCIDENT_EPS: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CircleStyle {
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub dashed: bool,
}

/// A charged sphere, cavity or point marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub id: String,
    pub center: Vector2,
    pub radius: f64,
    pub style: CircleStyle,
}

impl Circle {
    pub fn new(
        id: impl Into<String>,
        center: Vector2,
        radius: f64,
    ) -> Result<Self, InvalidGeometryError> {
        let id = id.into();
        if !center.is_finite() || !radius.is_finite() {
            return Err(InvalidGeometryError::new(id, "non-finite coordinates"));
        }
        if radius < 0.0 {
            return Err(InvalidGeometryError::new(
                id,
                format!("negative radius {radius}"),
            ));
        }
        Ok(Self {
            id,
            center,
            radius,
            style: CircleStyle::default(),
        })
    }

    pub fn with_style(mut self, style: CircleStyle) -> Self {
        self.style = style;
        self
    }

    /// True when `point` lies inside the disk or on its boundary.
    pub fn contains(&self, point: Vector2) -> bool {
        point.distance(self.center) <= self.radius + COINCIDENT_EPS
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox {
            x: self.center.x - self.radius,
            y: self.center.y - self.radius,
            width: self.radius * 2.0,
            height: self.radius * 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SegmentStyle {
    pub dashed: bool,
    /// Falls back to the theme's line color when unset.
    pub color: Option<String>,
    pub stroke_width: f64,
}

impl Default for SegmentStyle {
    fn default() -> Self {
        Self {
            dashed: false,
            color: None,
            stroke_width: 1.5,
        }
    }
}

/// A vector arrow or plain connecting line.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub id: String,
    pub start: Vector2,
    pub end: Vector2,
    pub style: SegmentStyle,
}

impl Segment {
    pub fn new(
        id: impl Into<String>,
        start: Vector2,
        end: Vector2,
        style: SegmentStyle,
    ) -> Result<Self, InvalidGeometryError> {
        let id = id.into();
        if !start.is_finite() || !end.is_finite() {
            return Err(InvalidGeometryError::new(id, "non-finite coordinates"));
        }
        if start.approx_eq(end, COINCIDENT_EPS) {
            return Err(InvalidGeometryError::new(id, "segment start equals end"));
        }
        if style.stroke_width < 0.0 {
            return Err(InvalidGeometryError::new(id, "negative stroke width"));
        }
        Ok(Self {
            id,
            start,
            end,
            style,
        })
    }

    /// Same id and style, new endpoints. Re-validates.
    pub fn with_endpoints(&self, start: Vector2, end: Vector2) -> Result<Self, InvalidGeometryError> {
        Segment::new(self.id.clone(), start, end, self.style.clone())
    }

    pub fn direction(&self) -> Vector2 {
        self.end - self.start
    }

    pub fn unit_direction(&self) -> Result<Vector2, DegenerateVectorError> {
        self.direction().normalize()
    }

    pub fn midpoint(&self) -> Vector2 {
        self.start.lerp(self.end, 0.5)
    }

    pub fn shares_endpoint(&self, other: &Segment) -> bool {
        [self.start, self.end]
            .iter()
            .any(|p| p.approx_eq(other.start, COINCIDENT_EPS) || p.approx_eq(other.end, COINCIDENT_EPS))
    }
}

/// Axis-aligned box used for label collision only.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Result<Self, InvalidGeometryError> {
        if ![x, y, width, height].iter().all(|v| v.is_finite()) {
            return Err(InvalidGeometryError::new("bbox", "non-finite coordinates"));
        }
        if width < 0.0 || height < 0.0 {
            return Err(InvalidGeometryError::new(
                "bbox",
                format!("negative size {width}x{height}"),
            ));
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Box of the given size centered on `center`. Negative sizes clamp to zero.
    pub fn centered(center: Vector2, width: f64, height: f64) -> Self {
        let width = width.max(0.0);
        let height = height.max(0.0);
        Self {
            x: center.x - width / 2.0,
            y: center.y - height / 2.0,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Vector2 {
        Vector2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn corners(&self) -> [Vector2; 4] {
        [
            Vector2::new(self.x, self.y),
            Vector2::new(self.right(), self.y),
            Vector2::new(self.right(), self.bottom()),
            Vector2::new(self.x, self.bottom()),
        ]
    }
}

/// A text label attached to a circle or segment.
///
/// `candidate_offsets` are relative to `anchor`; the optimizer picks one.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub anchor: Vector2,
    pub text: String,
    pub is_vector: bool,
    pub owner_id: String,
    pub candidate_offsets: Vec<Vector2>,
}

impl Label {
    pub fn new(
        owner_id: impl Into<String>,
        anchor: Vector2,
        text: impl Into<String>,
        is_vector: bool,
        candidate_offsets: Vec<Vector2>,
    ) -> Result<Self, InvalidGeometryError> {
        let owner_id = owner_id.into();
        if !anchor.is_finite() || candidate_offsets.iter().any(|o| !o.is_finite()) {
            return Err(InvalidGeometryError::new(owner_id, "non-finite label anchor"));
        }
        Ok(Self {
            anchor,
            text: text.into(),
            is_vector,
            owner_id,
            candidate_offsets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_rejects_negative_radius() {
        let err = Circle::new("c", Vector2::new(0.0, 0.0), -1.0).unwrap_err();
        assert_eq!(err.id, "c");
        assert!(Circle::new("p", Vector2::new(0.0, 0.0), 0.0).is_ok());
    }

    #[test]
    fn segment_rejects_coincident_endpoints() {
        let p = Vector2::new(10.0, 10.0);
        let err = Segment::new("s", p, p + Vector2::new(1e-7, 0.0), SegmentStyle::default())
            .unwrap_err();
        assert_eq!(err.id, "s");
        assert!(Segment::new("s", p, p + Vector2::new(1e-3, 0.0), SegmentStyle::default()).is_ok());
    }

    #[test]
    fn segment_rejects_nan() {
        let err = Segment::new(
            "s",
            Vector2::new(f64::NAN, 0.0),
            Vector2::new(1.0, 0.0),
            SegmentStyle::default(),
        );
        assert!(err.is_err());
    }

    #[test]
    fn bbox_rejects_negative_size() {
        assert!(BoundingBox::new(0.0, 0.0, -1.0, 2.0).is_err());
        assert!(BoundingBox::new(0.0, 0.0, 0.0, 0.0).is_ok());
    }

    #[test]
    fn bbox_centered_geometry() {
        let b = BoundingBox::centered(Vector2::new(10.0, 20.0), 4.0, 6.0);
        assert_eq!(b.x, 8.0);
        assert_eq!(b.y, 17.0);
        assert_eq!(b.right(), 12.0);
        assert_eq!(b.bottom(), 23.0);
        assert_eq!(b.center(), Vector2::new(10.0, 20.0));
    }

    #[test]
    fn shared_endpoint_detection() {
        let style = SegmentStyle::default();
        let a = Segment::new("a", Vector2::new(0.0, 0.0), Vector2::new(10.0, 0.0), style.clone()).unwrap();
        let b = Segment::new("b", Vector2::new(0.0, 0.0), Vector2::new(0.0, 10.0), style.clone()).unwrap();
        let c = Segment::new("c", Vector2::new(5.0, 5.0), Vector2::new(9.0, 9.0), style).unwrap();
        assert!(a.shares_endpoint(&b));
        assert!(!a.shares_endpoint(&c));
    }
}
