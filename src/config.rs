use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How label widths are estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextMeasurement {
    /// Character count times an average glyph width. Deterministic everywhere.
    #[default]
    Approximate,
    /// Real glyph advances from an installed font, falling back to the
    /// approximation when the font cannot be loaded.
    Font,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Average glyph width per em. Slightly generous so boxes never undershoot.
    pub glyph_width_factor: f64,
    pub label_line_height: f64,
    /// Candidate distance from the anchor, in label box heights.
    pub base_offset_factor: f64,
    /// Gap left between an arrowhead and the circle it points into.
    pub arrow_clearance: f64,
    pub nudge_step: f64,
    pub nudge_attempts: u32,
    pub tie_break_weight: f64,
    /// Space reserved above vector labels for the overhead arrow, in ems.
    pub overhead_arrow_gap: f64,
    pub text_measurement: TextMeasurement,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            glyph_width_factor: 0.6,
            label_line_height: 1.2,
            base_offset_factor: 1.5,
            arrow_clearance: 2.0,
            nudge_step: 5.0,
            nudge_attempts: 6,
            tie_break_weight: 1e-3,
            overhead_arrow_gap: 0.4,
            text_measurement: TextMeasurement::Approximate,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// PNG rasterization scale.
    pub scale: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { scale: 2.0 }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::textbook(),
            layout: LayoutConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f64>,
    text_color: Option<String>,
    line_color: Option<String>,
    circle_stroke: Option<String>,
    circle_fill: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    glyph_width_factor: Option<f64>,
    label_line_height: Option<f64>,
    base_offset_factor: Option<f64>,
    arrow_clearance: Option<f64>,
    nudge_step: Option<f64>,
    nudge_attempts: Option<u32>,
    tie_break_weight: Option<f64>,
    overhead_arrow_gap: Option<f64>,
    text_measurement: Option<TextMeasurement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    scale: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    render: Option<RenderConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "modern" => config.theme = Theme::modern(),
            "textbook" | "default" => config.theme = Theme::textbook(),
            other => anyhow::bail!("unknown theme `{other}`"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.circle_stroke {
            config.theme.circle_stroke = v;
        }
        if let Some(v) = vars.circle_fill {
            config.theme.circle_fill = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
    }

    if let Some(layout) = parsed.layout {
        let target = &mut config.layout;
        if let Some(v) = layout.glyph_width_factor {
            target.glyph_width_factor = v;
        }
        if let Some(v) = layout.label_line_height {
            target.label_line_height = v;
        }
        if let Some(v) = layout.base_offset_factor {
            target.base_offset_factor = v;
        }
        if let Some(v) = layout.arrow_clearance {
            target.arrow_clearance = v;
        }
        if let Some(v) = layout.nudge_step {
            target.nudge_step = v;
        }
        if let Some(v) = layout.nudge_attempts {
            target.nudge_attempts = v;
        }
        if let Some(v) = layout.tie_break_weight {
            target.tie_break_weight = v;
        }
        if let Some(v) = layout.overhead_arrow_gap {
            target.overhead_arrow_gap = v;
        }
        if let Some(v) = layout.text_measurement {
            target.text_measurement = v;
        }
    }

    if let Some(render) = parsed.render
        && let Some(v) = render.scale
    {
        config.render.scale = v;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_yields_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.layout.nudge_attempts, 6);
        assert_eq!(config.layout.arrow_clearance, 2.0);
        assert_eq!(config.theme.font_size, 16.0);
    }

    #[test]
    fn overrides_are_merged() {
        let config = parse_config(
            r##"{
                "theme": "modern",
                "themeVariables": { "fontSize": 20, "background": "#FAFAFA" },
                "layout": { "nudgeStep": 3.5, "textMeasurement": "font" },
                "render": { "scale": 1.0 }
            }"##,
        )
        .unwrap();
        assert_eq!(config.theme.font_size, 20.0);
        assert_eq!(config.theme.line_color, Theme::modern().line_color);
        assert_eq!(config.theme.background, "#FAFAFA");
        assert_eq!(config.layout.nudge_step, 3.5);
        assert_eq!(config.layout.nudge_attempts, 6);
        assert_eq!(config.layout.text_measurement, TextMeasurement::Font);
        assert_eq!(config.render.scale, 1.0);
    }

    #[test]
    fn unknown_theme_is_an_error() {
        assert!(parse_config(r#"{ "theme": "neon" }"#).is_err());
    }
}
