use crate::config::RenderConfig;
use crate::error::{ChartError, ChartResult};

use super::{
    DrawingProvider, Fill, PathCommand, Stroke, SvgProvider, TextPosition, TextSettings, Transform,
};

/// Records everything through an [`SvgProvider`] and rasterizes the finished
/// document with resvg.
#[derive(Debug, Clone)]
pub struct PngProvider {
    svg: SvgProvider,
    scale: f32,
    font_family: String,
}

impl PngProvider {
    pub fn new(width: f32, height: f32, config: &RenderConfig) -> Self {
        Self {
            svg: SvgProvider::new(width, height, config),
            scale: config.png_scale,
            font_family: config.font_family.clone(),
        }
    }

    /// The markup that will be rasterized.
    pub fn to_svg(&self) -> String {
        self.svg.to_svg()
    }
}

impl DrawingProvider for PngProvider {
    fn set_border(&mut self, thickness: f32, color: &str) -> &mut Self {
        self.svg.set_border(thickness, color);
        self
    }

    fn draw_path(&mut self, path: &[PathCommand], stroke: &Stroke) -> &mut Self {
        self.svg.draw_path(path, stroke);
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
        self.svg.draw_rectangle(x1, y1, x2, y2, stroke, fill);
        self
    }

    fn draw_text(
        &mut self,
        position: &TextPosition,
        text: &str,
        settings: &TextSettings,
        transform: Option<&Transform>,
    ) -> &mut Self {
        self.svg.draw_text(position, text, settings, transform);
        self
    }

    fn build(self) -> ChartResult<Vec<u8>> {
        let target_width = (self.svg.width() * self.scale).round().max(1.0);
        let target_height = (self.svg.height() * self.scale).round().max(1.0);
        rasterize_svg(
            &self.svg.to_svg(),
            target_width as u32,
            target_height as u32,
            &self.font_family,
        )
    }
}

/// Renders `svg` into a `width` x `height` PNG, stretching the document's
/// own size (which may carry physical units) to fit.
pub fn rasterize_svg(svg: &str, width: u32, height: u32, font_family: &str) -> ChartResult<Vec<u8>> {
    let mut opt = usvg::Options::default();
    if let Some(first) = font_family.split(',').next() {
        opt.font_family = first.trim().trim_matches('"').to_string();
    }
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)
        .map_err(|e| ChartError::backend("png", format!("failed to parse svg: {e}")))?;
    let size = tree.size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| ChartError::backend("png", "failed to allocate pixmap"))?;

    let transform = resvg::tiny_skia::Transform::from_scale(
        width as f32 / size.width(),
        height as f32 / size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    let bytes = pixmap
        .encode_png()
        .map_err(|e| ChartError::backend("png", format!("failed to encode png: {e}")))?;
    tracing::debug!(width, height, bytes = bytes.len(), "rasterized svg");
    Ok(bytes)
}
