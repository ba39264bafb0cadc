use crate::config::RenderConfig;
use crate::error::ChartResult;
use crate::text_metrics::{self, ASCENT_RATIO, DESCENT_RATIO};

use super::{
    DrawingProvider, Fill, Gravity, PathCommand, Stroke, TextPosition, TextSettings, Transform,
    XAlign, YAlign, rotated_extent, warn_unsupported,
};

/// Horizontal breathing room between a text block's border and its text.
const TEXT_PAD_X: f32 = 2.0;

/// Writes SVG markup directly. The canvas is a single top-left-origin
/// coordinate system, so gravity-anchored blocks are converted to absolute
/// coordinates as they are drawn.
#[derive(Debug, Clone)]
pub struct SvgProvider {
    width: f32,
    height: f32,
    units: String,
    background: String,
    font_family: String,
    min_font_size: f32,
    max_font_size: f32,
    body: String,
    border: Option<(f32, String)>,
}

impl SvgProvider {
    pub fn new(width: f32, height: f32, config: &RenderConfig) -> Self {
        Self {
            width,
            height,
            units: config.svg_units.clone(),
            background: config.background.clone(),
            font_family: config.font_family.clone(),
            min_font_size: config.min_font_size,
            max_font_size: config.max_font_size,
            body: String::new(),
            border: None,
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// The finished document as text.
    pub fn to_svg(&self) -> String {
        let mut svg = String::new();
        let (w, h) = (self.width, self.height);
        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" width=\"{w}{units}\" height=\"{h}{units}\" viewBox=\"0 0 {w} {h}\">",
            units = self.units,
        ));
        svg.push_str(&format!(
            "<rect x=\"0\" y=\"0\" width=\"{w}\" height=\"{h}\" fill=\"{}\"/>",
            escape_xml(&self.background)
        ));
        svg.push_str(&self.body);
        if let Some((thickness, color)) = &self.border {
            let inset = thickness / 2.0;
            svg.push_str(&format!(
                "<rect x=\"{inset:.2}\" y=\"{inset:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{thickness:.2}\"/>",
                (w - thickness).max(0.0),
                (h - thickness).max(0.0),
                escape_xml(color)
            ));
        }
        svg.push_str("</svg>");
        svg
    }

    fn transform_attr(&self, transform: Option<&Transform>, block: (f32, f32, f32, f32)) -> String {
        let Some(transform) = transform else {
            return String::new();
        };
        match transform {
            Transform::Rotate { degrees, origin } => {
                let (cx, cy) =
                    origin.unwrap_or((block.0 + block.2 / 2.0, block.1 + block.3 / 2.0));
                format!(" transform=\"rotate({degrees:.2} {cx:.2} {cy:.2})\"")
            }
            Transform::Matrix([a, b, c, d, e, f]) => {
                format!(" transform=\"matrix({a} {b} {c} {d} {e} {f})\"")
            }
            other => {
                warn_unsupported("svg", other);
                String::new()
            }
        }
    }
}

impl DrawingProvider for SvgProvider {
    fn set_border(&mut self, thickness: f32, color: &str) -> &mut Self {
        self.border = Some((thickness, color.to_string()));
        self
    }

    fn draw_path(&mut self, path: &[PathCommand], stroke: &Stroke) -> &mut Self {
        let d = path_data(path);
        if d.is_empty() {
            return self;
        }
        self.body.push_str(&format!(
            "<path d=\"{d}\" fill=\"none\" stroke=\"{}\"{}/>",
            escape_xml(stroke.color()),
            dash_attr(stroke)
        ));
        self
    }

    fn draw_rectangle(
        &mut self,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        stroke: &Stroke,
        fill: &Fill,
    ) -> &mut Self {
        let (x, width) = (x1.min(x2), (x2 - x1).abs());
        let (y, height) = (y1.min(y2), (y2 - y1).abs());
        self.body.push_str(&format!(
            "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{width:.2}\" height=\"{height:.2}\" fill=\"{}\" stroke=\"{}\"{}/>",
            escape_xml(fill.as_paint()),
            escape_xml(stroke.color()),
            dash_attr(stroke)
        ));
        self
    }

    fn draw_text(
        &mut self,
        position: &TextPosition,
        text: &str,
        settings: &TextSettings,
        transform: Option<&Transform>,
    ) -> &mut Self {
        let (w, h) = (position.width, position.height);
        let canvas = (self.width, self.height);
        let offset = (position.x, position.y);
        let (x, y) = match transform {
            // Without a pivot the turned block is anchored by its bounding
            // box, like a rotated label composited with -gravity.
            Some(Transform::Rotate {
                degrees,
                origin: None,
            }) => {
                let (rw, rh) = rotated_extent(*degrees, (w, h));
                let (bx, by) = position.gravity().place(canvas, (rw, rh), offset);
                (bx + (rw - w) / 2.0, by + (rh - h) / 2.0)
            }
            _ => position.gravity().place(canvas, (w, h), offset),
        };
        let attr = self.transform_attr(transform, (x, y, w, h));

        let mut block = format!("<g class=\"text-block\"{attr}>");

        let border = settings.border();
        let inset = border.map(|(t, _)| t).unwrap_or(0.0);
        if settings.background.is_some() || border.is_some() {
            let fill = settings.background.as_deref().unwrap_or("none");
            // Stroke centered half a band in, so the whole border stays inside w x h.
            let (stroke, stroke_width) = match border {
                Some((t, color)) => (color, t),
                None => ("none", 0.0),
            };
            let half = stroke_width / 2.0;
            block.push_str(&format!(
                "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{stroke_width:.2}\"/>",
                x + half,
                y + half,
                (w - stroke_width).max(0.0),
                (h - stroke_width).max(0.0),
                escape_xml(fill),
                escape_xml(stroke)
            ));
        }

        let inner = (x + inset, y + inset, (w - 2.0 * inset).max(0.0), (h - 2.0 * inset).max(0.0));
        let font_size = text_metrics::fit_font_size(
            text,
            (inner.2 - 2.0 * TEXT_PAD_X).max(1.0),
            inner.3,
            &self.font_family,
            self.min_font_size,
            self.max_font_size,
        );
        let gravity = settings.text_gravity();
        let (text_x, anchor) = match gravity.horizontal() {
            XAlign::Left => (inner.0 + TEXT_PAD_X, "start"),
            XAlign::Middle => (inner.0 + inner.2 / 2.0, "middle"),
            XAlign::Right => (inner.0 + inner.2 - TEXT_PAD_X, "end"),
        };
        let baseline = text_baseline(gravity, inner.1, inner.3, font_size);

        block.push_str(&format!(
            "<text x=\"{text_x:.2}\" y=\"{baseline:.2}\" text-anchor=\"{anchor}\" font-family=\"{}\" font-size=\"{font_size:.2}\" fill=\"{}\">{}</text>",
            escape_xml(&self.font_family),
            escape_xml(settings.text_color()),
            escape_xml(text)
        ));
        block.push_str("</g>");

        tracing::trace!(text, x, y, w, h, gravity = gravity.magick_name(), "svg text block");
        self.body.push_str(&block);
        self
    }

    fn build(self) -> ChartResult<Vec<u8>> {
        Ok(self.to_svg().into_bytes())
    }
}

/// Baseline for a line of `font_size` text aligned inside a box spanning
/// `top..top + height`.
fn text_baseline(gravity: Gravity, top: f32, height: f32, font_size: f32) -> f32 {
    match gravity.vertical() {
        YAlign::Top => top + font_size * ASCENT_RATIO,
        YAlign::Center => top + height / 2.0 + font_size * (ASCENT_RATIO - DESCENT_RATIO) / 2.0,
        YAlign::Bottom => top + height - font_size * DESCENT_RATIO,
    }
}

fn path_data(path: &[PathCommand]) -> String {
    path.iter()
        .map(|command| match command {
            PathCommand::MoveTo(x, y) => format!("M {x:.2} {y:.2}"),
            PathCommand::LineTo(x, y) => format!("L {x:.2} {y:.2}"),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn dash_attr(stroke: &Stroke) -> String {
    match stroke.dashes() {
        Some(pattern) => {
            let values: Vec<String> = pattern.iter().map(|v| format!("{v}")).collect();
            format!(" stroke-dasharray=\"{}\"", values.join(","))
        }
        None => String::new(),
    }
}

pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
