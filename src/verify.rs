//! Check an already-rendered SVG for collisions.
//!
//! Circles, lines and text are re-parsed from the markup and fed through the
//! same predicates the layout engine uses, so any SVG (not only ours) can
//! be audited.

use crate::config::LayoutConfig;
use crate::geometry::collision::{line_intersects_circle, overlap_area, segments_intersect};
use crate::geometry::{BoundingBox, Circle, Segment, SegmentStyle, Vector2};
use crate::layout::{Diagnostic, DiagnosticKind};
use crate::text_metrics::approximate_text_width;
use crate::theme::Theme;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<(circle|line)\b([^>]*?)/?>").expect("valid shape regex"));
static TEXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<text\b([^>]*)>(.*?)</text>").expect("valid text regex"));
static ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*"([^"]*)""#).expect("valid attribute regex")
});
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

/// How close an arrow end may get to a circle it points into.
const ENDPOINT_TOLERANCE: f64 = 4.0;
/// Text overlap below this many square pixels is rounding noise.
const TEXT_OVERLAP_EPS: f64 = 0.5;

struct Arrow {
    segment: Segment,
}

struct TextBox {
    owner: String,
    text: String,
    bounds: BoundingBox,
}

/// Collision report for `svg`. Empty means clean.
pub fn verify_svg(svg: &str) -> Vec<Diagnostic> {
    let (circles, arrows) = parse_shapes(svg);
    let texts = parse_texts(svg);
    let mut diagnostics = Vec::new();

    for arrow in &arrows {
        let seg = &arrow.segment;
        for circle in &circles {
            let touches_start = seg.start.distance(circle.center) <= circle.radius + ENDPOINT_TOLERANCE;
            let touches_end = seg.end.distance(circle.center) <= circle.radius + ENDPOINT_TOLERANCE;
            if touches_start || touches_end {
                continue;
            }
            if line_intersects_circle(seg, circle) {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::CircleCrossing,
                    seg.id.clone(),
                    format!("arrow crosses circle `{}`", circle.id),
                ));
            }
        }
    }

    for (idx, later) in arrows.iter().enumerate() {
        for earlier in &arrows[..idx] {
            if later.segment.shares_endpoint(&earlier.segment) {
                continue;
            }
            if segments_intersect(&later.segment, &earlier.segment) {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::SegmentCrossing,
                    later.segment.id.clone(),
                    format!("arrow crosses arrow `{}`", earlier.segment.id),
                ));
            }
        }
    }

    for (idx, later) in texts.iter().enumerate() {
        for earlier in &texts[..idx] {
            let area = overlap_area(&later.bounds, &earlier.bounds);
            if area > TEXT_OVERLAP_EPS {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::LabelOverlap,
                    later.owner.clone(),
                    format!(
                        "text `{}` overlaps `{}` by {:.1}px²",
                        later.text, earlier.text, area
                    ),
                ));
            }
        }
    }

    diagnostics
}

fn attributes(raw: &str) -> HashMap<&str, &str> {
    ATTR_RE
        .captures_iter(raw)
        .filter_map(|caps| Some((caps.get(1)?.as_str(), caps.get(2)?.as_str())))
        .collect()
}

fn number(attrs: &HashMap<&str, &str>, key: &str) -> Option<f64> {
    attrs.get(key)?.trim().trim_end_matches("px").parse().ok()
}

fn parse_shapes(svg: &str) -> (Vec<Circle>, Vec<Arrow>) {
    let mut circles = Vec::new();
    let mut arrows = Vec::new();
    for (idx, caps) in SHAPE_RE.captures_iter(svg).enumerate() {
        let (Some(kind), Some(raw)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let attrs = attributes(raw.as_str());
        let id = attrs
            .get("id")
            .map(|id| unescape_xml(id))
            .unwrap_or_else(|| format!("{}-{idx}", kind.as_str()));
        match kind.as_str() {
            "circle" => {
                let center = Vector2::new(
                    number(&attrs, "cx").unwrap_or(0.0),
                    number(&attrs, "cy").unwrap_or(0.0),
                );
                if let Ok(circle) = Circle::new(id, center, number(&attrs, "r").unwrap_or(0.0)) {
                    circles.push(circle);
                }
            }
            _ => {
                if !attrs.contains_key("marker-end") {
                    continue;
                }
                let start = Vector2::new(
                    number(&attrs, "x1").unwrap_or(0.0),
                    number(&attrs, "y1").unwrap_or(0.0),
                );
                let end = Vector2::new(
                    number(&attrs, "x2").unwrap_or(0.0),
                    number(&attrs, "y2").unwrap_or(0.0),
                );
                if let Ok(segment) = Segment::new(id, start, end, SegmentStyle::default()) {
                    arrows.push(Arrow { segment });
                }
            }
        }
    }
    (circles, arrows)
}

/// Text boxes use the same approximate metrics as label placement.
fn parse_texts(svg: &str) -> Vec<TextBox> {
    let metrics = LayoutConfig::default();
    let default_font_size = Theme::textbook().font_size;
    let mut texts = Vec::new();
    for (idx, caps) in TEXT_RE.captures_iter(svg).enumerate() {
        let (Some(raw), Some(body)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let attrs = attributes(raw.as_str());
        let text = unescape_xml(&TAG_RE.replace_all(body.as_str(), ""));
        let font_size = number(&attrs, "font-size").unwrap_or(default_font_size);
        let x = number(&attrs, "x").unwrap_or(0.0);
        let baseline = number(&attrs, "y").unwrap_or(0.0);
        let width = approximate_text_width(&text, font_size, metrics.glyph_width_factor);
        let left = match attrs.get("text-anchor").copied() {
            Some("middle") => x - width / 2.0,
            Some("end") => x - width,
            _ => x,
        };
        let owner = attrs
            .get("data-owner")
            .or_else(|| attrs.get("id"))
            .map(|owner| unescape_xml(owner))
            .unwrap_or_else(|| format!("text-{idx}"));
        texts.push(TextBox {
            owner,
            text,
            bounds: BoundingBox {
                x: left,
                y: baseline - font_size,
                width,
                height: font_size * metrics.label_line_height,
            },
        });
    }
    texts
}

fn unescape_xml(input: &str) -> String {
    input
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text_metrics::label_metrics;

    #[test]
    fn clean_svg_has_no_findings() {
        let svg = r##"<svg><circle id="a" cx="100" cy="100" r="20"/><line id="v" x1="100" y1="100" x2="200" y2="100" marker-end="url(#arrow-0)"/><text x="100" y="60" text-anchor="middle" font-size="16">A</text></svg>"##;
        assert!(verify_svg(svg).is_empty());
    }

    #[test]
    fn arrow_through_circle_is_reported() {
        let svg = r##"<svg><circle id="wall" cx="150" cy="100" r="20"/><line id="v" x1="50" y1="100" x2="250" y2="100" marker-end="url(#a)"/></svg>"##;
        let findings = verify_svg(svg);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, DiagnosticKind::CircleCrossing);
        assert_eq!(findings[0].owner_id, "v");
    }

    #[test]
    fn text_boxes_match_label_metrics() {
        let svg = r#"<svg><text x="100" y="60" text-anchor="middle">+Q</text></svg>"#;
        let texts = parse_texts(svg);
        let expected = label_metrics("+Q", false, &Theme::textbook(), &LayoutConfig::default());
        assert_eq!(texts[0].bounds.width, expected.width);
        assert_eq!(texts[0].bounds.height, expected.height());
        assert_eq!(texts[0].bounds.x, 100.0 - expected.width / 2.0);
    }

    #[test]
    fn plain_lines_are_ignored() {
        let svg = r##"<svg><circle id="wall" cx="150" cy="100" r="20"/><line id="guide" x1="50" y1="100" x2="250" y2="100"/></svg>"##;
        assert!(verify_svg(svg).is_empty());
    }

    #[test]
    fn crossing_arrows_are_reported() {
        let svg = r##"<svg><line id="a" x1="0" y1="0" x2="100" y2="100" marker-end="url(#m)"/><line id="b" x1="0" y1="100" x2="100" y2="0" marker-end="url(#m)"/></svg>"##;
        let findings = verify_svg(svg);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, DiagnosticKind::SegmentCrossing);
        assert_eq!(findings[0].owner_id, "b");
    }

    #[test]
    fn overlapping_text_is_reported() {
        let svg = r##"<svg><text data-owner="p" x="50" y="50" text-anchor="middle" font-size="16">q</text><text data-owner="p2" x="52" y="52" text-anchor="middle" font-size="16">E</text></svg>"##;
        let findings = verify_svg(svg);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, DiagnosticKind::LabelOverlap);
        assert_eq!(findings[0].owner_id, "p2");
    }
}
