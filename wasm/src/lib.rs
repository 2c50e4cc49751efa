use diagram_layout::{Config, Theme, render_scene_json};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SceneRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f64>,
}

fn build_config(options: SceneRenderOptions) -> Config {
    let mut config = Config::default();
    if options.theme.as_deref() == Some("modern") {
        config.theme = Theme::modern();
    }
    if let Some(font_family) = options.font_family {
        config.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        config.theme.font_size = font_size;
    }
    config
}

fn render(scene_json: &str, options_json: Option<String>) -> Result<String, String> {
    let options = match options_json {
        Some(raw_options) => serde_json::from_str::<SceneRenderOptions>(&raw_options)
            .map_err(|error| error.to_string())?,
        None => SceneRenderOptions::default(),
    };
    let output =
        render_scene_json(scene_json, &build_config(options)).map_err(|error| error.to_string())?;
    serde_json::to_string(&output).map_err(|error| error.to_string())
}

/// Render a scene document; returns `{"svg": .., "diagnostics": [..]}` as JSON.
#[wasm_bindgen]
pub fn render_scene_svg(scene_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    render(scene_json, options_json).map_err(|error| JsValue::from_str(&error))
}
