//! Backend-neutral drawing commands.
//!
//! A chart is issued as a short, ordered sequence of primitive calls against
//! a [`DrawingProvider`]. Every backend must put the same text block on the
//! same pixels, so alignment is expressed once, as an ImageMagick-style
//! [`Gravity`], and backends without a gravity concept resolve it to absolute
//! coordinates with [`Gravity::place`].

pub mod magick;
#[cfg(feature = "png")]
pub mod png;
pub mod svg;

use serde::{Deserialize, Serialize};

use crate::config::RenderConfig;
use crate::error::ChartResult;

pub use magick::MagickProvider;
#[cfg(feature = "png")]
pub use png::PngProvider;
pub use svg::SvgProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum XAlign {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YAlign {
    Top,
    Center,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gravity {
    NorthWest,
    North,
    NorthEast,
    West,
    Center,
    East,
    SouthWest,
    South,
    SouthEast,
}

impl Gravity {
    /// Resolves a possibly partial alignment. The table is not
    /// symmetric: a lone `Center` leans west while a lone `Middle` leans
    /// north.
    pub fn from_alignment(x: Option<XAlign>, y: Option<YAlign>) -> Self {
        use XAlign::*;
        use YAlign::*;
        match (x, y) {
            (None, None) => Gravity::NorthWest,
            (None, Some(Top)) => Gravity::North,
            (None, Some(Center)) => Gravity::West,
            (None, Some(Bottom)) => Gravity::South,
            (Some(Left), None) => Gravity::West,
            (Some(Left), Some(Top)) => Gravity::NorthWest,
            (Some(Left), Some(Center)) => Gravity::West,
            (Some(Left), Some(Bottom)) => Gravity::SouthWest,
            (Some(Middle), None) => Gravity::North,
            (Some(Middle), Some(Top)) => Gravity::North,
            (Some(Middle), Some(Center)) => Gravity::Center,
            (Some(Middle), Some(Bottom)) => Gravity::South,
            (Some(Right), None) => Gravity::East,
            (Some(Right), Some(Top)) => Gravity::NorthEast,
            (Some(Right), Some(Center)) => Gravity::East,
            (Some(Right), Some(Bottom)) => Gravity::SouthEast,
        }
    }

    pub fn horizontal(self) -> XAlign {
        match self {
            Gravity::NorthWest | Gravity::West | Gravity::SouthWest => XAlign::Left,
            Gravity::North | Gravity::Center | Gravity::South => XAlign::Middle,
            Gravity::NorthEast | Gravity::East | Gravity::SouthEast => XAlign::Right,
        }
    }

    pub fn vertical(self) -> YAlign {
        match self {
            Gravity::NorthWest | Gravity::North | Gravity::NorthEast => YAlign::Top,
            Gravity::West | Gravity::Center | Gravity::East => YAlign::Center,
            Gravity::SouthWest | Gravity::South | Gravity::SouthEast => YAlign::Bottom,
        }
    }

    pub fn magick_name(self) -> &'static str {
        match self {
            Gravity::NorthWest => "NorthWest",
            Gravity::North => "North",
            Gravity::NorthEast => "NorthEast",
            Gravity::West => "West",
            Gravity::Center => "Center",
            Gravity::East => "East",
            Gravity::SouthWest => "SouthWest",
            Gravity::South => "South",
            Gravity::SouthEast => "SouthEast",
        }
    }

    pub fn from_magick_name(name: &str) -> Option<Self> {
        let gravity = match name.to_ascii_lowercase().as_str() {
            "northwest" => Gravity::NorthWest,
            "north" => Gravity::North,
            "northeast" => Gravity::NorthEast,
            "west" => Gravity::West,
            "center" => Gravity::Center,
            "east" => Gravity::East,
            "southwest" => Gravity::SouthWest,
            "south" => Gravity::South,
            "southeast" => Gravity::SouthEast,
            _ => return None,
        };
        Some(gravity)
    }

    /// Top-left corner of a `size` block composited onto a `canvas` with this
    /// gravity and `offset`, following ImageMagick's `-gravity -geometry`
    /// rules: offsets push away from the anchored edge, and are relative to
    /// the center on a centered axis.
    pub fn place(self, canvas: (f32, f32), size: (f32, f32), offset: (f32, f32)) -> (f32, f32) {
        let x = match self.horizontal() {
            XAlign::Left => offset.0,
            XAlign::Middle => (canvas.0 - size.0) / 2.0 + offset.0,
            XAlign::Right => canvas.0 - size.0 - offset.0,
        };
        let y = match self.vertical() {
            YAlign::Top => offset.1,
            YAlign::Center => (canvas.1 - size.1) / 2.0 + offset.1,
            YAlign::Bottom => canvas.1 - size.1 - offset.1,
        };
        (x, y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(f32, f32),
    LineTo(f32, f32),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stroke {
    pub color: Option<String>,
    /// Alternating draw and skip lengths.
    pub dash_pattern: Option<Vec<f32>>,
}

impl Stroke {
    pub fn solid(color: impl Into<String>) -> Self {
        Self {
            color: Some(color.into()),
            dash_pattern: None,
        }
    }

    pub fn dashed(color: impl Into<String>, pattern: Vec<f32>) -> Self {
        Self {
            color: Some(color.into()),
            dash_pattern: Some(pattern),
        }
    }

    pub fn color(&self) -> &str {
        self.color.as_deref().unwrap_or("black")
    }

    pub fn dashes(&self) -> Option<&[f32]> {
        self.dash_pattern.as_deref().filter(|pattern| !pattern.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fill {
    pub color: Option<String>,
}

impl Fill {
    pub fn none() -> Self {
        Self { color: None }
    }

    pub fn color(color: impl Into<String>) -> Self {
        Self {
            color: Some(color.into()),
        }
    }

    pub fn as_paint(&self) -> &str {
        self.color.as_deref().unwrap_or("none")
    }
}

/// Where a text block goes. `(x, y)` is an offset from the canvas edge (or
/// center) selected by the alignment; unset axes resolve through
/// [`Gravity::from_alignment`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextPosition {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub x_align: Option<XAlign>,
    pub y_align: Option<YAlign>,
}

impl TextPosition {
    pub fn gravity(&self) -> Gravity {
        Gravity::from_alignment(self.x_align, self.y_align)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextSettings {
    pub border_thickness: f32,
    pub border_color: Option<String>,
    pub background: Option<String>,
    pub color: Option<String>,
    pub text_x_align: Option<XAlign>,
    pub text_y_align: Option<YAlign>,
}

impl TextSettings {
    pub fn text_gravity(&self) -> Gravity {
        Gravity::from_alignment(self.text_x_align, self.text_y_align)
    }

    pub fn text_color(&self) -> &str {
        self.color.as_deref().unwrap_or("black")
    }

    /// Border band width, zero when no border color is set.
    pub fn border(&self) -> Option<(f32, &str)> {
        match self.border_color.as_deref() {
            Some(color) if self.border_thickness > 0.0 => Some((self.border_thickness, color)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    /// Clockwise rotation in degrees. Without `origin` the turned block is
    /// placed by its bounding box, the way a rotated label is composited.
    Rotate {
        degrees: f32,
        origin: Option<(f32, f32)>,
    },
    /// `[a, b, c, d, tx, ty]`, SVG `matrix()` order.
    Matrix([f32; 6]),
    /// Recognized, not implemented by any backend.
    Scale { sx: f32, sy: f32 },
    /// Recognized, not implemented by any backend.
    Translate { dx: f32, dy: f32 },
}

impl Transform {
    pub fn is_supported(&self) -> bool {
        matches!(self, Transform::Rotate { .. } | Transform::Matrix(_))
    }
}

/// Bounding box of a `size` block turned by `degrees`.
pub fn rotated_extent(degrees: f32, size: (f32, f32)) -> (f32, f32) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());
    (
        size.0 * cos + size.1 * sin,
        size.0 * sin + size.1 * cos,
    )
}

pub(crate) fn warn_unsupported(backend: &str, transform: &Transform) {
    tracing::warn!(backend, transform = ?transform, "transform is not supported; ignoring");
}

pub trait DrawingProvider {
    /// Border around the whole canvas, painted on top of everything at
    /// build time and inside the canvas bounds.
    fn set_border(&mut self, thickness: f32, color: &str) -> &mut Self;

    fn draw_path(&mut self, path: &[PathCommand], stroke: &Stroke) -> &mut Self;

    fn draw_rectangle(
        &mut self,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        stroke: &Stroke,
        fill: &Fill,
    ) -> &mut Self;

    fn draw_text(
        &mut self,
        position: &TextPosition,
        text: &str,
        settings: &TextSettings,
        transform: Option<&Transform>,
    ) -> &mut Self;

    fn build(self) -> ChartResult<Vec<u8>>
    where
        Self: Sized;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Svg,
    #[cfg(feature = "png")]
    Png,
    Magick,
}

impl Backend {
    pub fn name(self) -> &'static str {
        match self {
            Backend::Svg => "svg",
            #[cfg(feature = "png")]
            Backend::Png => "png",
            Backend::Magick => "magick",
        }
    }

    pub fn create(self, width: f32, height: f32, config: &RenderConfig) -> Provider {
        match self {
            Backend::Svg => Provider::Svg(SvgProvider::new(width, height, config)),
            #[cfg(feature = "png")]
            Backend::Png => Provider::Png(PngProvider::new(width, height, config)),
            Backend::Magick => Provider::Magick(MagickProvider::new(width, height, config)),
        }
    }
}

/// Closed set of backends behind one [`DrawingProvider`].
#[derive(Debug)]
pub enum Provider {
    Svg(SvgProvider),
    #[cfg(feature = "png")]
    Png(PngProvider),
    Magick(MagickProvider),
}

macro_rules! dispatch {
    ($self:ident, $inner:ident => $call:expr) => {
        match $self {
            Provider::Svg($inner) => {
                $call;
            }
            #[cfg(feature = "png")]
            Provider::Png($inner) => {
                $call;
            }
            Provider::Magick($inner) => {
                $call;
            }
        }
    };
}

impl DrawingProvider for Provider {
    fn set_border(&mut self, thickness: f32, color: &str) -> &mut Self {
        dispatch!(self, p => p.set_border(thickness, color));
        self
    }

    fn draw_path(&mut self, path: &[PathCommand], stroke: &Stroke) -> &mut Self {
        dispatch!(self, p => p.draw_path(path, stroke));
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
        dispatch!(self, p => p.draw_rectangle(x1, y1, x2, y2, stroke, fill));
        self
    }

    fn draw_text(
        &mut self,
        position: &TextPosition,
        text: &str,
        settings: &TextSettings,
        transform: Option<&Transform>,
    ) -> &mut Self {
        dispatch!(self, p => p.draw_text(position, text, settings, transform));
        self
    }

    fn build(self) -> ChartResult<Vec<u8>> {
        match self {
            Provider::Svg(p) => p.build(),
            #[cfg(feature = "png")]
            Provider::Png(p) => p.build(),
            Provider::Magick(p) => p.build(),
        }
    }
}
