use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::{BoundingBox, Circle, Label, Segment, Vector2};
use crate::text_metrics::LabelMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// A label had to be placed with a positive collision score.
    LabelOverlap,
    /// A segment still crosses something after the bounded nudge loop.
    SegmentNudgeFailed,
    /// Found by the SVG verifier: an arrow crosses a circle it does not touch.
    CircleCrossing,
    /// Found by the SVG verifier: two arrows cross.
    SegmentCrossing,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::LabelOverlap => "label-overlap",
            DiagnosticKind::SegmentNudgeFailed => "segment-nudge-failed",
            DiagnosticKind::CircleCrossing => "circle-crossing",
            DiagnosticKind::SegmentCrossing => "segment-crossing",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-fatal layout warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub owner_id: String,
    pub detail: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, owner_id: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            owner_id: owner_id.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.kind, self.owner_id, self.detail)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentLayout {
    /// Final endpoints after shortening and nudging.
    pub segment: Segment,
    /// Endpoints as given in the scene.
    pub requested: Segment,
    /// Circle the arrowhead stops at, if any.
    pub target: Option<String>,
    pub arrow: bool,
    /// Perpendicular nudges applied; zero when the segment was clear.
    pub nudges: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelLayout {
    pub label: Label,
    /// Chosen candidate offset relative to `label.anchor`.
    pub offset: Vector2,
    /// Center of the label box.
    pub position: Vector2,
    pub bounds: BoundingBox,
    pub metrics: LabelMetrics,
    /// 0 is a perfect placement; higher means overlap was tolerated.
    pub collision_score: f64,
    pub color: Option<String>,
}

impl LabelLayout {
    /// Box of the glyph line, below any overhead-arrow space.
    pub fn glyph_bounds(&self) -> BoundingBox {
        BoundingBox {
            x: self.bounds.x,
            y: self.bounds.y + self.metrics.arrow_gap,
            width: self.bounds.width,
            height: self.metrics.glyph_height,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub width: f64,
    pub height: f64,
    pub background: Option<String>,
    pub circles: BTreeMap<String, Circle>,
    pub segments: Vec<SegmentLayout>,
    pub labels: Vec<LabelLayout>,
    pub diagnostics: Vec<Diagnostic>,
}
