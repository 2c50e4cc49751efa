use crate::config::RenderConfig;
use crate::layout::{LabelLayout, Layout, SegmentLayout};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

/// Arrowhead size in user units, independent of stroke width.
const MARKER_SIZE: f64 = 5.0;
const CIRCLE_STROKE_WIDTH: f64 = 1.5;
const OVERHEAD_ARROW_STROKE: f64 = 1.0;

/// Serialize a layout as SVG. Never fails and makes no layout decisions:
/// whatever collisions the layout carries are drawn as-is.
pub fn render_svg(layout: &Layout, theme: &Theme) -> String {
    let mut svg = String::new();
    let width = layout.width;
    let height = layout.height;

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));

    let background = layout.background.as_deref().unwrap_or(&theme.background);
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        escape_xml(background)
    ));

    let marker_colors = marker_colors(&layout.segments, theme);
    if !marker_colors.is_empty() {
        svg.push_str("<defs>");
        for (idx, color) in marker_colors.iter().enumerate() {
            svg.push_str(&format!(
                "<marker id=\"arrow-{idx}\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"{MARKER_SIZE}\" markerHeight=\"{MARKER_SIZE}\" markerUnits=\"userSpaceOnUse\" orient=\"auto\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{}\"/></marker>",
                escape_xml(color)
            ));
        }
        svg.push_str("</defs>");
    }

    for circle in layout.circles.values() {
        let fill = circle.style.fill.as_deref().unwrap_or(&theme.circle_fill);
        let stroke = circle.style.stroke.as_deref().unwrap_or(&theme.circle_stroke);
        let dash = if circle.style.dashed {
            " stroke-dasharray=\"4 3\""
        } else {
            ""
        };
        svg.push_str(&format!(
            "<circle id=\"{}\" cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{CIRCLE_STROKE_WIDTH}\"{dash}/>",
            escape_xml(&circle.id),
            circle.center.x,
            circle.center.y,
            circle.radius,
            escape_xml(fill),
            escape_xml(stroke),
        ));
    }

    for seg in &layout.segments {
        let color = segment_color(seg, theme);
        let dash = if seg.segment.style.dashed {
            " stroke-dasharray=\"6 4\""
        } else {
            ""
        };
        let marker = if seg.arrow {
            let idx = marker_colors.iter().position(|c| c == color).unwrap_or(0);
            format!(" marker-end=\"url(#arrow-{idx})\"")
        } else {
            String::new()
        };
        svg.push_str(&format!(
            "<line id=\"{}\" x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"{}\"{dash}{marker}/>",
            escape_xml(&seg.segment.id),
            seg.segment.start.x,
            seg.segment.start.y,
            seg.segment.end.x,
            seg.segment.end.y,
            escape_xml(color),
            seg.segment.style.stroke_width,
        ));
    }

    for label in &layout.labels {
        svg.push_str(&label_svg(label, theme));
    }

    svg.push_str("</svg>");
    svg
}

fn segment_color<'a>(seg: &'a SegmentLayout, theme: &'a Theme) -> &'a str {
    seg.segment.style.color.as_deref().unwrap_or(&theme.line_color)
}

/// Distinct arrow colors in order of first use; one marker per color.
fn marker_colors(segments: &[SegmentLayout], theme: &Theme) -> Vec<String> {
    let mut colors: Vec<String> = Vec::new();
    for seg in segments.iter().filter(|s| s.arrow) {
        let color = segment_color(seg, theme);
        if !colors.iter().any(|c| c == color) {
            colors.push(color.to_string());
        }
    }
    colors
}

fn label_svg(label: &LabelLayout, theme: &Theme) -> String {
    let glyph = label.glyph_bounds();
    let x = label.position.x;
    let baseline = glyph.y + theme.font_size;
    let fill = label.color.as_deref().unwrap_or(&theme.text_color);

    let mut text = format!(
        "<text data-owner=\"{}\" x=\"{x:.2}\" y=\"{baseline:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
        escape_xml(&label.label.owner_id),
        escape_xml(&theme.font_family),
        theme.font_size,
        escape_xml(fill),
        escape_xml(&label.label.text)
    );

    if label.label.is_vector {
        text.push_str(&overhead_arrow_svg(label, theme, fill));
    }
    text
}

/// Short arrow drawn just above the glyphs: vector notation.
fn overhead_arrow_svg(label: &LabelLayout, theme: &Theme, color: &str) -> String {
    let half = (label.metrics.width / 2.0).max(theme.font_size * 0.3);
    let x0 = label.position.x - half;
    let x1 = label.position.x + half;
    let y = label.bounds.y + label.metrics.arrow_gap * 0.55;
    let head = theme.font_size * 0.18;
    format!(
        "<path d=\"M {x0:.2} {y:.2} L {x1:.2} {y:.2} M {:.2} {:.2} L {x1:.2} {y:.2} L {:.2} {:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{OVERHEAD_ARROW_STROKE}\" stroke-linecap=\"round\" stroke-linejoin=\"round\"/>",
        x1 - head,
        y - head * 0.6,
        x1 - head,
        y + head * 0.6,
        escape_xml(color)
    )
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size();
    let scale = render_cfg.scale.max(0.1);
    let width = (size.width() * scale).ceil() as u32;
    let height = (size.height() * scale).ceil() as u32;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap_mut,
    );
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig) -> Result<()> {
    Err(anyhow::anyhow!(
        "PNG output requires the `png` feature"
    ))
}

pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
