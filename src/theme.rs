use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f64,
    pub text_color: String,
    pub line_color: String,
    pub circle_stroke: String,
    pub circle_fill: String,
    pub background: String,
}

impl Theme {
    /// Black-on-white, serif labels: the look of a printed physics problem.
    pub fn textbook() -> Self {
        Self {
            font_family: "\"Times New Roman\", Times, serif".to_string(),
            font_size: 16.0,
            text_color: "#000000".to_string(),
            line_color: "#000000".to_string(),
            circle_stroke: "#000000".to_string(),
            circle_fill: "none".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            text_color: "#1C2430".to_string(),
            line_color: "#7A8AA6".to_string(),
            circle_stroke: "#C7D2E5".to_string(),
            circle_fill: "#F8FAFF".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::textbook()
    }
}
