pub(crate) mod label_placement;
mod routing;
pub(crate) mod types;
pub use types::*;

use crate::config::LayoutConfig;
use crate::error::SceneError;
use crate::ir::Scene;
use crate::log::debug;
use crate::theme::Theme;

/// Turn a scene into a fully positioned layout.
///
/// Runs in one synchronous pass: owner validation, segment resolution
/// (arrowhead shortening plus the bounded nudge loop), then label
/// placement in scene order. Collision shortfalls are reported in
/// `Layout::diagnostics`; the only hard failures are dangling owners and
/// degenerate segments that slipped past construction.
pub fn compute_layout(
    scene: &Scene,
    theme: &Theme,
    config: &LayoutConfig,
) -> Result<Layout, SceneError> {
    scene.validate_owners()?;
    debug!(
        circles = scene.circles().len(),
        segments = scene.segments().len(),
        labels = scene.labels().len(),
        "laying out scene"
    );

    let mut diagnostics = Vec::new();
    let segments = routing::resolve_segments(scene, config, &mut diagnostics)?;
    let labels = label_placement::place_labels(scene, &segments, theme, config, &mut diagnostics)?;

    let canvas = scene.canvas();
    Ok(Layout {
        width: canvas.width,
        height: canvas.height,
        background: canvas.background.clone(),
        circles: scene.circles().clone(),
        segments,
        labels,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vector2;

    fn layout(scene: &Scene) -> Layout {
        compute_layout(scene, &Theme::textbook(), &LayoutConfig::default()).unwrap()
    }

    #[test]
    fn charge_with_field_arrow() {
        let scene = Scene::builder(400.0, 200.0)
            .circle("sphere", (100.0, 100.0), 50.0)
            .circle("probe", (200.0, 100.0), 20.0)
            .vector("E", (100.0, 100.0), (200.0, 100.0), None)
            .label("sphere", "+Q")
            .vector_label("E", "E")
            .build()
            .unwrap();
        let layout = layout(&scene);
        assert_eq!(layout.circles.len(), 2);
        assert!(layout.segments[0].segment.end.approx_eq(Vector2::new(178.0, 100.0), 1e-9));
        assert_eq!(layout.labels.len(), 2);
        assert!(layout.diagnostics.is_empty(), "{:?}", layout.diagnostics);
    }

    #[test]
    fn circles_are_passed_through_unchanged() {
        let scene = Scene::builder(200.0, 200.0)
            .circle("a", (50.0, 50.0), 10.0)
            .build()
            .unwrap();
        let layout = layout(&scene);
        assert_eq!(&layout.circles, scene.circles());
        assert!(layout.segments.is_empty());
        assert!(layout.labels.is_empty());
    }

    #[test]
    fn layout_is_deterministic() {
        let scene = Scene::builder(300.0, 300.0)
            .circle("a", (150.0, 150.0), 30.0)
            .vector("v1", (150.0, 150.0), (260.0, 150.0), None)
            .vector("v2", (150.0, 150.0), (150.0, 40.0), None)
            .label("a", "A")
            .vector_label("v1", "F1")
            .vector_label("v2", "F2")
            .build()
            .unwrap();
        assert_eq!(layout(&scene), layout(&scene));
    }
}
