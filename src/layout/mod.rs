pub mod grid;
pub mod lanes;
pub(crate) mod types;
pub use grid::DecadeSpan;
pub use lanes::{LaneAssignment, assign_lanes};
pub use types::*;

use crate::config::LayoutConfig;
use crate::error::{ChartError, ChartResult};
use crate::ir::Figure;
use crate::theme::Palette;

/// Rejects inputs the layout cannot place: an empty list, or a figure that
/// ends before it starts.
pub fn validate_figures(figures: &[Figure]) -> ChartResult<()> {
    if figures.is_empty() {
        return Err(ChartError::NoData);
    }
    if let Some(bad) = figures.iter().find(|figure| !figure.is_valid()) {
        return Err(ChartError::DegenerateInterval {
            name: bad.name.clone(),
            start_year: bad.start_year,
            end_year: bad.end_year,
        });
    }
    Ok(())
}

/// Earliest start year and latest end year over all figures.
pub fn year_domain(figures: &[Figure]) -> ChartResult<(i32, i32)> {
    let start = figures.iter().map(|f| f.start_year).min();
    let end = figures.iter().map(|f| f.end_year).max();
    match (start, end) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(ChartError::NoData),
    }
}

pub fn canvas_size(span: &DecadeSpan, lane_count: usize, config: &LayoutConfig) -> (f32, f32) {
    let width = config.header_width + lane_count.max(1) as f32 * config.lane_pitch();
    let height = config.decade_height() * span.len() as f32;
    (width, height)
}

pub fn compute_layout(
    figures: &[Figure],
    palette: &Palette,
    config: &LayoutConfig,
    current_year: i32,
) -> ChartResult<Layout> {
    validate_figures(figures)?;
    let (start_year, end_year) = year_domain(figures)?;
    let lanes = assign_lanes(figures);
    Ok(compute_layout_with_lanes(
        figures,
        &lanes,
        palette,
        config,
        current_year,
        (start_year, end_year),
    ))
}

pub fn compute_layout_with_lanes(
    figures: &[Figure],
    lanes: &LaneAssignment,
    palette: &Palette,
    config: &LayoutConfig,
    current_year: i32,
    (start_year, end_year): (i32, i32),
) -> Layout {
    let span = DecadeSpan::covering(start_year, end_year);
    let lane_count = lanes.lane_count().max(1);
    let (width, height) = canvas_size(&span, lane_count, config);
    let decade_height = config.decade_height();
    let effective_end_year = span.effective_end_year();

    let decades: Vec<DecadeRow> = span
        .iter()
        .enumerate()
        .map(|(idx, decade)| DecadeRow {
            decade,
            label: format!("{}", decade * 10),
            x: 0.0,
            y_from_bottom: idx as f32 * decade_height,
            width: config.header_width,
            height: decade_height,
        })
        .collect();

    let dividers = if config.century_dividers {
        span.iter()
            .enumerate()
            .filter(|(_, decade)| decade.rem_euclid(10) == 0)
            .map(|(idx, decade)| DividerLayout {
                year: decade * 10,
                x1: 0.0,
                x2: config.header_width,
                y: (span.len() - idx) as f32 * decade_height,
            })
            .collect()
    } else {
        Vec::new()
    };

    let bars = lanes
        .iter()
        .map(|(index, lane)| {
            let figure = &figures[index];
            let length = (figure.span_years() as f32 * config.year_height).max(config.min_bar_length);
            // A padded bar that would run past the first year is pulled back up.
            let top = config.year_height * (effective_end_year - figure.end_year) as f32;
            let y = top.min(height - length).max(0.0);
            BarLayout {
                index,
                name: figure.name.clone(),
                lane,
                start_year: figure.start_year,
                end_year: figure.end_year,
                x: config.header_width + lane as f32 * config.lane_pitch(),
                y,
                width: length,
                height: config.lane_width,
                colors: palette.colors_for(&figure.category).clone(),
            }
        })
        .collect();

    let future_mask = if config.future_mask && effective_end_year > current_year {
        let bottom = (effective_end_year - current_year) as f32 * config.year_height;
        Some(MaskLayout {
            x1: config.header_width,
            y1: 0.0,
            x2: width,
            y2: bottom.clamp(0.0, height),
        })
    } else {
        None
    };

    Layout {
        width,
        height,
        start_year,
        end_year,
        effective_end_year,
        lane_count,
        decades,
        dividers,
        bars,
        future_mask,
    }
}
