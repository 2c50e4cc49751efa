use crate::error::{InvalidGeometryError, SceneError};
use crate::geometry::{Circle, CircleStyle, Segment, SegmentStyle, Vector2};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    pub background: Option<String>,
}

/// A segment as requested by the caller, before endpoint resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSegment {
    pub segment: Segment,
    /// Circle the arrow points into. When unset the engine infers it from
    /// the end point.
    pub owner_circle_id: Option<String>,
    /// Plain connecting lines set this to false: no marker, no shortening.
    pub arrow: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelRequest {
    pub owner_id: String,
    pub text: String,
    pub is_vector: bool,
    /// Explicit candidates relative to the anchor; empty means the
    /// optimizer generates its own eight.
    pub candidate_offsets: Vec<Vector2>,
    pub color: Option<String>,
}

impl LabelRequest {
    pub fn new(owner_id: impl Into<String>, text: impl Into<String>, is_vector: bool) -> Self {
        Self {
            owner_id: owner_id.into(),
            text: text.into(),
            is_vector,
            candidate_offsets: Vec::new(),
            color: None,
        }
    }
}

/// Validated, immutable diagram request. Build one with [`SceneBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    canvas: Canvas,
    circles: BTreeMap<String, Circle>,
    segments: Vec<SceneSegment>,
    labels: Vec<LabelRequest>,
}

impl Scene {
    pub fn builder(width: f64, height: f64) -> SceneBuilder {
        SceneBuilder::new(width, height)
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn circles(&self) -> &BTreeMap<String, Circle> {
        &self.circles
    }

    pub fn segments(&self) -> &[SceneSegment] {
        &self.segments
    }

    pub fn labels(&self) -> &[LabelRequest] {
        &self.labels
    }

    pub fn circle(&self, id: &str) -> Option<&Circle> {
        self.circles.get(id)
    }

    pub fn segment(&self, id: &str) -> Option<&SceneSegment> {
        self.segments.iter().find(|s| s.segment.id == id)
    }

    pub fn has_primitive(&self, id: &str) -> bool {
        self.circles.contains_key(id) || self.segment(id).is_some()
    }

    /// Every label owner and arrow target must name an existing primitive.
    pub fn validate_owners(&self) -> Result<(), SceneError> {
        for seg in &self.segments {
            if let Some(owner) = &seg.owner_circle_id
                && !self.circles.contains_key(owner)
            {
                return Err(SceneError::UnknownOwner { id: owner.clone() });
            }
        }
        for label in &self.labels {
            if !self.has_primitive(&label.owner_id) {
                return Err(SceneError::UnknownOwner {
                    id: label.owner_id.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Collects primitives and validates them all at [`SceneBuilder::build`].
///
/// Construction errors are deferred: the first one is kept and returned by
/// `build`, so calls can be chained freely.
#[derive(Debug, Clone)]
pub struct SceneBuilder {
    width: f64,
    height: f64,
    background: Option<String>,
    circles: Vec<Circle>,
    segments: Vec<SceneSegment>,
    labels: Vec<LabelRequest>,
    error: Option<InvalidGeometryError>,
}

impl SceneBuilder {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            background: None,
            circles: Vec::new(),
            segments: Vec::new(),
            labels: Vec::new(),
            error: None,
        }
    }

    pub fn background(mut self, color: impl Into<String>) -> Self {
        self.background = Some(color.into());
        self
    }

    pub fn circle(self, id: &str, center: impl Into<Vector2>, radius: f64) -> Self {
        self.styled_circle(id, center, radius, CircleStyle::default())
    }

    pub fn styled_circle(
        mut self,
        id: &str,
        center: impl Into<Vector2>,
        radius: f64,
        style: CircleStyle,
    ) -> Self {
        match Circle::new(id, center.into(), radius) {
            Ok(circle) => self.circles.push(circle.with_style(style)),
            Err(err) => self.record(err),
        }
        self
    }

    /// Arrow from `start` to `end`, optionally pointing into `owner_circle_id`.
    pub fn vector(
        self,
        id: &str,
        start: impl Into<Vector2>,
        end: impl Into<Vector2>,
        owner_circle_id: Option<&str>,
    ) -> Self {
        self.segment_with(
            id,
            start,
            end,
            SegmentStyle::default(),
            owner_circle_id,
            true,
        )
    }

    /// Plain line without an arrowhead.
    pub fn line(self, id: &str, start: impl Into<Vector2>, end: impl Into<Vector2>) -> Self {
        let style = SegmentStyle {
            dashed: true,
            ..SegmentStyle::default()
        };
        self.segment_with(id, start, end, style, None, false)
    }

    pub fn segment_with(
        mut self,
        id: &str,
        start: impl Into<Vector2>,
        end: impl Into<Vector2>,
        style: SegmentStyle,
        owner_circle_id: Option<&str>,
        arrow: bool,
    ) -> Self {
        match Segment::new(id, start.into(), end.into(), style) {
            Ok(segment) => self.segments.push(SceneSegment {
                segment,
                owner_circle_id: owner_circle_id.map(str::to_string),
                arrow,
            }),
            Err(err) => self.record(err),
        }
        self
    }

    pub fn label(self, owner_id: &str, text: &str) -> Self {
        self.label_with(LabelRequest::new(owner_id, text, false))
    }

    pub fn vector_label(self, owner_id: &str, text: &str) -> Self {
        self.label_with(LabelRequest::new(owner_id, text, true))
    }

    pub fn label_with(mut self, label: LabelRequest) -> Self {
        if label.candidate_offsets.iter().any(|o| !o.is_finite()) {
            self.record(InvalidGeometryError::new(
                label.owner_id.clone(),
                "non-finite candidate offset",
            ));
        }
        self.labels.push(label);
        self
    }

    fn record(&mut self, err: InvalidGeometryError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    pub fn build(self) -> Result<Scene, SceneError> {
        if let Some(err) = self.error {
            return Err(err.into());
        }
        if !self.width.is_finite() || !self.height.is_finite() || self.width < 0.0 || self.height < 0.0
        {
            return Err(InvalidGeometryError::new(
                "canvas",
                format!("invalid canvas size {}x{}", self.width, self.height),
            )
            .into());
        }

        let mut seen = HashSet::new();
        let ids = self
            .circles
            .iter()
            .map(|c| &c.id)
            .chain(self.segments.iter().map(|s| &s.segment.id));
        for id in ids {
            if !seen.insert(id.as_str()) {
                return Err(SceneError::DuplicateId { id: id.clone() });
            }
        }

        let scene = Scene {
            canvas: Canvas {
                width: self.width,
                height: self.height,
                background: self.background,
            },
            circles: self
                .circles
                .into_iter()
                .map(|c| (c.id.clone(), c))
                .collect(),
            segments: self.segments,
            labels: self.labels,
        };
        scene.validate_owners()?;
        Ok(scene)
    }
}
