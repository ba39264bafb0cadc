use crate::layout::Layout;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub start_year: i32,
    pub end_year: i32,
    pub effective_end_year: i32,
    pub lane_count: usize,
    pub decades: Vec<i32>,
    pub dividers: Vec<DividerDump>,
    pub bars: Vec<BarDump>,
    pub future_mask: Option<[f32; 4]>,
}

#[derive(Debug, Serialize)]
pub struct DividerDump {
    pub year: i32,
    pub y: f32,
}

#[derive(Debug, Serialize)]
pub struct BarDump {
    pub name: String,
    pub lane: usize,
    pub start_year: i32,
    pub end_year: i32,
    /// Upright box on the canvas, after the 90 degree turn.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub background: String,
    pub foreground: String,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout) -> Self {
        let bars = layout
            .bars
            .iter()
            .map(|bar| BarDump {
                name: bar.name.clone(),
                lane: bar.lane,
                start_year: bar.start_year,
                end_year: bar.end_year,
                x: bar.x,
                y: bar.y,
                width: bar.height,
                height: bar.width,
                background: bar.colors.background.clone(),
                foreground: bar.colors.foreground.clone(),
            })
            .collect();

        LayoutDump {
            width: layout.width,
            height: layout.height,
            start_year: layout.start_year,
            end_year: layout.end_year,
            effective_end_year: layout.effective_end_year,
            lane_count: layout.lane_count,
            decades: layout.decades.iter().map(|row| row.decade).collect(),
            dividers: layout
                .dividers
                .iter()
                .map(|d| DividerDump { year: d.year, y: d.y })
                .collect(),
            bars,
            future_mask: layout
                .future_mask
                .as_ref()
                .map(|m| [m.x1, m.y1, m.x2, m.y2]),
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &Layout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout);
    serde_json::to_writer_pretty(writer, &dump)?;
    tracing::debug!(path = %path.display(), "wrote layout dump");
    Ok(())
}
