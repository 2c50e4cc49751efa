#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod log;
pub mod parser;
pub mod render;
pub mod text_metrics;
pub mod theme;
pub mod verify;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig, TextMeasurement};
pub use error::{
    DegenerateVectorError, InvalidGeometryError, ParseError, SceneError, SceneLoadError,
};
pub use geometry::{
    BoundingBox, Circle, Label, Segment, SegmentStyle, Vector2, boxes_overlap,
    line_intersects_circle, point_in_box, segments_intersect,
};
pub use ir::{Scene, SceneBuilder};
pub use layout::{Diagnostic, DiagnosticKind, Layout, compute_layout};
pub use parser::parse_scene;
pub use render::render_svg;
pub use theme::Theme;
pub use verify::verify_svg;

use serde::Serialize;

/// What a caller gets back for one scene: the SVG plus any collision
/// shortfalls the layout had to accept.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderOutput {
    pub svg: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Lay out and render a scene. The SVG is produced even when
/// `diagnostics` is non-empty.
pub fn render_scene(scene: &Scene, config: &Config) -> Result<RenderOutput, SceneError> {
    let layout = compute_layout(scene, &config.theme, &config.layout)?;
    let svg = render_svg(&layout, &config.theme);
    Ok(RenderOutput {
        svg,
        diagnostics: layout.diagnostics,
    })
}

/// [`render_scene`] on a JSON (or JSON5) scene document.
pub fn render_scene_json(input: &str, config: &Config) -> Result<RenderOutput, SceneLoadError> {
    let scene = parse_scene(input)?;
    Ok(render_scene(&scene, config)?)
}
