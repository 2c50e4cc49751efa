use crate::error::{ParseError, SceneLoadError};
use crate::geometry::{CircleStyle, SegmentStyle, Vector2};
use crate::ir::{LabelRequest, Scene};
use serde::Deserialize;

/// A point written either as `{"x": .., "y": ..}` or as `[x, y]`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum PointSpec {
    Object { x: f64, y: f64 },
    Pair([f64; 2]),
}

impl From<PointSpec> for Vector2 {
    fn from(point: PointSpec) -> Self {
        match point {
            PointSpec::Object { x, y } => Vector2::new(x, y),
            PointSpec::Pair([x, y]) => Vector2::new(x, y),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CanvasSpec {
    width: f64,
    height: f64,
    background: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CircleSpec {
    id: String,
    center: PointSpec,
    radius: f64,
    #[serde(default)]
    style: CircleStyle,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SegmentSpec {
    id: String,
    start: PointSpec,
    end: PointSpec,
    owner_circle_id: Option<String>,
    #[serde(default = "default_arrow")]
    arrow: bool,
    #[serde(default)]
    style: SegmentStyle,
}

fn default_arrow() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LabelSpec {
    owner_id: String,
    text: String,
    #[serde(default)]
    is_vector: bool,
    #[serde(default)]
    candidate_offsets: Vec<PointSpec>,
    color: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SceneDocument {
    canvas: CanvasSpec,
    #[serde(default)]
    circles: Vec<CircleSpec>,
    #[serde(default)]
    segments: Vec<SegmentSpec>,
    #[serde(default)]
    labels: Vec<LabelSpec>,
}

/// Decode a scene document and validate it into a [`Scene`].
///
/// Strict JSON is tried first; JSON5 (comments, trailing commas) is the
/// fallback. When both fail the JSON error is reported.
pub fn parse_scene(input: &str) -> Result<Scene, SceneLoadError> {
    let doc = decode(input)?;
    Ok(build_scene(doc)?)
}

fn decode(input: &str) -> Result<SceneDocument, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::Invalid("empty scene document".to_string()));
    }
    match serde_json::from_str::<SceneDocument>(input) {
        Ok(doc) => Ok(doc),
        Err(json_err) => json5::from_str::<SceneDocument>(input).map_err(|_| json_err.into()),
    }
}

fn build_scene(doc: SceneDocument) -> Result<Scene, crate::error::SceneError> {
    let mut builder = Scene::builder(doc.canvas.width, doc.canvas.height);
    if let Some(background) = doc.canvas.background {
        builder = builder.background(background);
    }
    for circle in doc.circles {
        builder = builder.styled_circle(&circle.id, circle.center, circle.radius, circle.style);
    }
    for seg in doc.segments {
        builder = builder.segment_with(
            &seg.id,
            seg.start,
            seg.end,
            seg.style,
            seg.owner_circle_id.as_deref(),
            seg.arrow,
        );
    }
    for label in doc.labels {
        builder = builder.label_with(LabelRequest {
            owner_id: label.owner_id,
            text: label.text,
            is_vector: label.is_vector,
            candidate_offsets: label.candidate_offsets.into_iter().map(Vector2::from).collect(),
            color: label.color,
        });
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SceneError;

    #[test]
    fn parses_full_document() {
        let scene = parse_scene(
            r##"{
                "canvas": { "width": 400, "height": 300, "background": "#fafafa" },
                "circles": [
                    { "id": "q", "center": { "x": 100, "y": 100 }, "radius": 50 },
                    { "id": "cavity", "center": [300, 100], "radius": 20, "style": { "dashed": true } }
                ],
                "segments": [
                    { "id": "E", "start": [100, 100], "end": [300, 100], "ownerCircleId": "cavity",
                      "style": { "color": "#c00", "strokeWidth": 2 } },
                    { "id": "r", "start": [100, 100], "end": [100, 50], "arrow": false,
                      "style": { "dashed": true } }
                ],
                "labels": [
                    { "ownerId": "q", "text": "+Q" },
                    { "ownerId": "E", "text": "E", "isVector": true }
                ]
            }"##,
        )
        .unwrap();
        assert_eq!(scene.canvas().background.as_deref(), Some("#fafafa"));
        assert!(scene.circle("cavity").unwrap().style.dashed);
        let e = scene.segment("E").unwrap();
        assert_eq!(e.owner_circle_id.as_deref(), Some("cavity"));
        assert!(e.arrow);
        assert_eq!(e.segment.style.stroke_width, 2.0);
        assert!(!e.segment.style.dashed);
        let r = scene.segment("r").unwrap();
        assert!(!r.arrow);
        assert_eq!(r.segment.style.stroke_width, 1.5);
        assert!(scene.labels()[1].is_vector);
    }

    #[test]
    fn accepts_json5() {
        let scene = parse_scene(
            r#"{
                // comments and trailing commas are fine
                canvas: { width: 100, height: 100, },
                circles: [ { id: "a", center: [50, 50], radius: 5 }, ],
            }"#,
        )
        .unwrap();
        assert_eq!(scene.circles().len(), 1);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = parse_scene("{ \"canvas\": ").unwrap_err();
        assert!(matches!(err, SceneLoadError::Parse(ParseError::Json(_))));
        let err = parse_scene("{ \"circles\": [] }").unwrap_err();
        assert!(matches!(err, SceneLoadError::Parse(_)));
        let err = parse_scene("   ").unwrap_err();
        assert!(matches!(err, SceneLoadError::Parse(ParseError::Invalid(_))));
    }

    #[test]
    fn degenerate_segment_is_a_scene_error() {
        let err = parse_scene(
            r#"{ "canvas": { "width": 10, "height": 10 },
                 "segments": [ { "id": "s", "start": [1, 1], "end": [1, 1] } ] }"#,
        )
        .unwrap_err();
        match err {
            SceneLoadError::Scene(SceneError::InvalidGeometry(e)) => assert_eq!(e.id, "s"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn dangling_owner_is_a_scene_error() {
        let err = parse_scene(
            r#"{ "canvas": { "width": 10, "height": 10 },
                 "labels": [ { "ownerId": "ghost", "text": "x" } ] }"#,
        )
        .unwrap_err();
        match err {
            SceneLoadError::Scene(SceneError::UnknownOwner { id }) => assert_eq!(id, "ghost"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
