use crate::config::Config;
use crate::draw::{
    Backend, DrawingProvider, Fill, PathCommand, Provider, Stroke, TextPosition, TextSettings,
    Transform, XAlign, YAlign,
};
use crate::error::ChartResult;
use crate::ir::Figure;
use crate::layout::{Layout, compute_layout};
use anyhow::Result;
use chrono::Datelike;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Year the future mask starts from.
    pub current_year: i32,
    /// Upper bound for the external image tool, if that backend is used.
    pub timeout: Option<Duration>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            current_year: current_year(),
            timeout: None,
        }
    }
}

pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Lays out `figures` and renders them through `backend`.
pub fn render_chart(
    figures: &[Figure],
    backend: Backend,
    config: &Config,
    options: &RenderOptions,
) -> ChartResult<Vec<u8>> {
    render_chart_with(figures, config, options, |width, height| {
        let mut provider = backend.create(width, height, &config.render);
        if let Provider::Magick(magick) = &mut provider {
            magick.set_timeout(options.timeout);
        }
        provider
    })
}

/// Same as [`render_chart`] with a caller-supplied provider, created once the
/// canvas size is known.
pub fn render_chart_with<P, F>(
    figures: &[Figure],
    config: &Config,
    options: &RenderOptions,
    make_provider: F,
) -> ChartResult<Vec<u8>>
where
    P: DrawingProvider,
    F: FnOnce(f32, f32) -> P,
{
    let layout = compute_layout(figures, &config.palette, &config.layout, options.current_year)?;
    tracing::info!(
        figures = figures.len(),
        lanes = layout.lane_count,
        width = layout.width,
        height = layout.height,
        "computed timeline layout"
    );
    let mut provider = make_provider(layout.width, layout.height);
    draw_chart(&layout, &mut provider, config);
    provider.build()
}

/// Issues every drawing command for `layout`, in paint order: border, decade
/// labels, century dividers, figure bars, then the future mask.
pub fn draw_chart<P: DrawingProvider>(layout: &Layout, provider: &mut P, config: &Config) {
    provider.set_border(config.layout.border_width, &config.render.border_color);

    let label_settings = TextSettings {
        border_thickness: 1.0,
        border_color: Some(config.render.decade_label_border.clone()),
        text_x_align: Some(XAlign::Middle),
        text_y_align: Some(YAlign::Center),
        ..TextSettings::default()
    };
    for row in &layout.decades {
        let position = TextPosition {
            x: row.x,
            y: row.y_from_bottom,
            width: row.width,
            height: row.height,
            x_align: Some(XAlign::Left),
            y_align: Some(YAlign::Bottom),
        };
        provider.draw_text(&position, &row.label, &label_settings, None);
    }

    let divider_stroke = Stroke::dashed("black", config.render.divider_dash.clone());
    for divider in &layout.dividers {
        provider.draw_path(
            &[
                PathCommand::MoveTo(divider.x1, divider.y),
                PathCommand::LineTo(divider.x2, divider.y),
            ],
            &divider_stroke,
        );
    }

    for bar in &layout.bars {
        let position = TextPosition {
            x: bar.x,
            y: bar.y,
            width: bar.width,
            height: bar.height,
            x_align: None,
            y_align: None,
        };
        let settings = TextSettings {
            border_thickness: config.layout.border_width,
            border_color: Some("black".to_string()),
            background: Some(bar.colors.background.clone()),
            color: Some(bar.colors.foreground.clone()),
            text_x_align: Some(XAlign::Middle),
            text_y_align: Some(YAlign::Center),
        };
        let rotate = Transform::Rotate {
            degrees: 90.0,
            origin: Some(bar.rotation_origin()),
        };
        provider.draw_text(&position, &bar.name, &settings, Some(&rotate));
    }

    if let Some(mask) = &layout.future_mask {
        let color = config.render.future_color.as_str();
        provider.draw_rectangle(
            mask.x1,
            mask.y1,
            mask.x2,
            mask.y2,
            &Stroke::solid(color),
            &Fill::color(color),
        );
    }
}

pub fn write_output(bytes: &[u8], output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, bytes)?;
            tracing::info!(path = %path.display(), bytes = bytes.len(), "wrote chart");
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            lock.write_all(bytes)?;
            lock.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChartError;
    use crate::ir::Category;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Border(f32, String),
        Path(Vec<PathCommand>, Stroke),
        Rect(f32, f32, f32, f32),
        Text(TextPosition, String, TextSettings, Option<Transform>),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
    }

    impl DrawingProvider for Recorder {
        fn set_border(&mut self, thickness: f32, color: &str) -> &mut Self {
            self.calls.push(Call::Border(thickness, color.to_string()));
            self
        }

        fn draw_path(&mut self, path: &[PathCommand], stroke: &Stroke) -> &mut Self {
            self.calls.push(Call::Path(path.to_vec(), stroke.clone()));
            self
        }

        fn draw_rectangle(
            &mut self,
            x1: f32,
            y1: f32,
            x2: f32,
            y2: f32,
            _stroke: &Stroke,
            _fill: &Fill,
        ) -> &mut Self {
            self.calls.push(Call::Rect(x1, y1, x2, y2));
            self
        }

        fn draw_text(
            &mut self,
            position: &TextPosition,
            text: &str,
            settings: &TextSettings,
            transform: Option<&Transform>,
        ) -> &mut Self {
            self.calls.push(Call::Text(
                position.clone(),
                text.to_string(),
                settings.clone(),
                transform.cloned(),
            ));
            self
        }

        fn build(self) -> ChartResult<Vec<u8>> {
            Ok(format!("{:?}", self.calls).into_bytes())
        }
    }

    fn options(year: i32) -> RenderOptions {
        RenderOptions {
            current_year: year,
            timeout: None,
        }
    }

    fn record(figures: &[Figure], year: i32) -> Vec<Call> {
        let config = Config::default();
        let layout = compute_layout(figures, &config.palette, &config.layout, year).unwrap();
        let mut recorder = Recorder::default();
        draw_chart(&layout, &mut recorder, &config);
        recorder.calls
    }

    #[test]
    fn commands_are_issued_in_paint_order() {
        let figures = vec![
            Figure::new("Victoria", 1819, 1901, Category::Political),
            Figure::new("Living", 1990, 2026, Category::Music),
        ];
        let calls = record(&figures, 2026);
        let kinds: Vec<&str> = calls
            .iter()
            .map(|call| match call {
                Call::Border(..) => "border",
                Call::Path(..) => "path",
                Call::Rect(..) => "rect",
                Call::Text(_, _, _, None) => "label",
                Call::Text(_, _, _, Some(_)) => "bar",
            })
            .collect();
        let mut expected = vec!["border"];
        // 1810s..2020s
        expected.extend(std::iter::repeat_n("label", 22));
        expected.extend(["path", "path", "bar", "bar", "rect"]);
        assert_eq!(kinds, expected);
    }

    #[test]
    fn bars_are_rotated_about_their_lane() {
        let figures = vec![Figure::new("Frank", 1920, 1935, Category::Philosophy)];
        let calls = record(&figures, 2026);
        let bar = calls
            .iter()
            .find_map(|call| match call {
                Call::Text(position, text, settings, Some(transform)) if text == "Frank" => {
                    Some((position.clone(), settings.clone(), transform.clone()))
                }
                _ => None,
            })
            .unwrap();
        let (position, settings, transform) = bar;
        // Chart ends at 1940, five years above Frank's end.
        assert_eq!((position.x, position.y), (60.0, 15.0));
        assert_eq!((position.width, position.height), (45.0, 30.0));
        assert_eq!(settings.background.as_deref(), Some("#9900CC"));
        assert_eq!(settings.color.as_deref(), Some("white"));
        assert_eq!(
            transform,
            Transform::Rotate {
                degrees: 90.0,
                origin: Some((75.0, 30.0))
            }
        );
    }

    #[test]
    fn decade_labels_anchor_bottom_left() {
        let figures = vec![Figure::new("Frank", 1920, 1935, Category::Philosophy)];
        let calls = record(&figures, 2026);
        let labels: Vec<(String, f32)> = calls
            .iter()
            .filter_map(|call| match call {
                Call::Text(position, text, _, None) => {
                    assert_eq!(position.x_align, Some(XAlign::Left));
                    assert_eq!(position.y_align, Some(YAlign::Bottom));
                    Some((text.clone(), position.y))
                }
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec![("1920".to_string(), 0.0), ("1930".to_string(), 30.0)]);
    }

    #[test]
    fn empty_input_fails_before_provider_is_created() {
        let mut created = false;
        let err = render_chart_with(&[], &Config::default(), &options(2026), |_, _| {
            created = true;
            Recorder::default()
        })
        .unwrap_err();
        assert!(matches!(err, ChartError::NoData));
        assert!(!created);
    }

    #[test]
    fn injected_provider_receives_canvas_size() {
        let figures = vec![Figure::new("Frank", 1920, 1935, Category::Philosophy)];
        let mut size = (0.0, 0.0);
        render_chart_with(&figures, &Config::default(), &options(2026), |w, h| {
            size = (w, h);
            Recorder::default()
        })
        .unwrap();
        assert_eq!(size, (90.0, 60.0));
    }

    #[test]
    fn svg_backend_end_to_end() {
        let figures = vec![
            Figure::new("Frank", 1920, 1935, Category::Philosophy),
            Figure::new("Annie", 1952, 2000, Category::Economics),
        ];
        let bytes = render_chart(&figures, Backend::Svg, &Config::default(), &options(2026)).unwrap();
        let svg = String::from_utf8(bytes).unwrap();
        assert!(svg.contains(">Frank</text>"));
        assert!(svg.contains(">Annie</text>"));
        assert!(svg.contains(">1920</text>"));
        assert!(svg.contains(">1990</text>"));
        assert!(!svg.contains(">2000</text>"));
    }
}
