#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod data;
pub mod draw;
pub mod error;
pub mod ir;
pub mod layout;
pub mod layout_dump;
#[cfg(feature = "cli")]
pub mod logging;
pub mod render;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig};
pub use draw::{Backend, DrawingProvider};
pub use error::{ChartError, ChartResult};
pub use ir::{Category, Figure};
pub use layout::{Layout, assign_lanes, compute_layout};
pub use render::{RenderOptions, draw_chart, render_chart, render_chart_with};
pub use theme::{CategoryColors, Palette};
