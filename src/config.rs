use crate::theme::{CategoryColors, Palette};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Thickness of one lane, i.e. the bar height before rotation.
    pub lane_width: f32,
    /// Extra room between neighbouring lanes.
    pub lane_spacing: f32,
    /// Width of the decade label column on the left.
    pub header_width: f32,
    /// Drawing units per year along the time axis.
    pub year_height: f32,
    pub border_width: f32,
    /// Shortest drawn bar, used for figures whose start and end coincide.
    pub min_bar_length: f32,
    pub century_dividers: bool,
    pub future_mask: bool,
}

impl LayoutConfig {
    pub fn decade_height(&self) -> f32 {
        self.year_height * 10.0
    }

    pub fn lane_pitch(&self) -> f32 {
        self.lane_width + self.lane_spacing
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            lane_width: 30.0,
            lane_spacing: 0.0,
            header_width: 60.0,
            year_height: 3.0,
            border_width: 1.0,
            min_bar_length: 3.0,
            century_dividers: true,
            future_mask: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub background: String,
    pub border_color: String,
    pub font_family: String,
    pub max_font_size: f32,
    pub min_font_size: f32,
    /// Physical unit suffix for the root SVG width/height. Empty means px.
    pub svg_units: String,
    /// Raster scale factor applied by the PNG conversion backend.
    pub png_scale: f32,
    pub magick_binary: String,
    pub divider_dash: Vec<f32>,
    pub future_color: String,
    pub decade_label_border: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background: "white".to_string(),
            border_color: "black".to_string(),
            font_family: "DejaVu Sans, Arial, sans-serif".to_string(),
            max_font_size: 16.0,
            min_font_size: 4.0,
            svg_units: "mm".to_string(),
            png_scale: 1.0,
            magick_binary: "convert".to_string(),
            divider_dash: vec![5.0, 5.0],
            future_color: "gray".to_string(),
            decade_label_border: "lightgray".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub palette: Palette,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    palette: Option<HashMap<String, ColorsFile>>,
    fallback: Option<ColorsFile>,
    /// Drop the built-in category colors before applying `palette`.
    replace_palette: Option<bool>,
    layout: Option<LayoutConfigFile>,
    render: Option<RenderConfigFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ColorsFile {
    background: Option<String>,
    foreground: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    lane_width: Option<f32>,
    lane_spacing: Option<f32>,
    header_width: Option<f32>,
    year_height: Option<f32>,
    border_width: Option<f32>,
    min_bar_length: Option<f32>,
    century_dividers: Option<bool>,
    future_mask: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    background: Option<String>,
    border_color: Option<String>,
    font_family: Option<String>,
    max_font_size: Option<f32>,
    min_font_size: Option<f32>,
    svg_units: Option<String>,
    png_scale: Option<f32>,
    magick_binary: Option<String>,
    divider_dash: Option<Vec<f32>>,
    future_color: Option<String>,
    decade_label_border: Option<String>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = serde_json::from_str(contents)?;
    let mut config = Config::default();

    if parsed.replace_palette.unwrap_or(false) {
        config.palette = Palette::empty();
    }
    if let Some(entries) = parsed.palette {
        for (tag, colors) in entries {
            let key = tag.trim().trim_start_matches(':').to_ascii_lowercase();
            let current = config
                .palette
                .entries
                .get(&key)
                .cloned()
                .unwrap_or_else(|| config.palette.fallback.clone());
            config.palette.entries.insert(key, merge_colors(current, colors));
        }
    }
    if let Some(fallback) = parsed.fallback {
        config.palette.fallback = merge_colors(config.palette.fallback.clone(), fallback);
    }

    if let Some(layout) = parsed.layout {
        let target = &mut config.layout;
        if let Some(v) = layout.lane_width {
            target.lane_width = v.max(1.0);
        }
        if let Some(v) = layout.lane_spacing {
            target.lane_spacing = v.max(0.0);
        }
        if let Some(v) = layout.header_width {
            target.header_width = v.max(0.0);
        }
        if let Some(v) = layout.year_height {
            target.year_height = v.max(0.1);
        }
        if let Some(v) = layout.border_width {
            target.border_width = v.max(0.0);
        }
        if let Some(v) = layout.min_bar_length {
            target.min_bar_length = v.max(0.0);
        }
        if let Some(v) = layout.century_dividers {
            target.century_dividers = v;
        }
        if let Some(v) = layout.future_mask {
            target.future_mask = v;
        }
    }

    if let Some(render) = parsed.render {
        let target = &mut config.render;
        if let Some(v) = render.background {
            target.background = v;
        }
        if let Some(v) = render.border_color {
            target.border_color = v;
        }
        if let Some(v) = render.font_family {
            target.font_family = v;
        }
        if let Some(v) = render.max_font_size {
            target.max_font_size = v.max(1.0);
        }
        if let Some(v) = render.min_font_size {
            target.min_font_size = v.max(1.0);
        }
        if let Some(v) = render.svg_units {
            target.svg_units = v;
        }
        if let Some(v) = render.png_scale {
            target.png_scale = v.max(0.01);
        }
        if let Some(v) = render.magick_binary {
            target.magick_binary = v;
        }
        if let Some(v) = render.divider_dash {
            target.divider_dash = v;
        }
        if let Some(v) = render.future_color {
            target.future_color = v;
        }
        if let Some(v) = render.decade_label_border {
            target.decade_label_border = v;
        }
    }

    Ok(config)
}

fn merge_colors(mut base: CategoryColors, file: ColorsFile) -> CategoryColors {
    if let Some(v) = file.background {
        base.background = v;
    }
    if let Some(v) = file.foreground {
        base.foreground = v;
    }
    base
}
