use horizhist::draw::{
    DrawingProvider, Gravity, MagickProvider, SvgProvider, TextPosition, TextSettings, Transform,
    XAlign, YAlign, rotated_extent,
};
use horizhist::{
    Backend, Category, ChartError, Config, Figure, LayoutConfig, Palette, RenderConfig,
    RenderOptions, assign_lanes, compute_layout, render_chart,
};

fn options(year: i32) -> RenderOptions {
    RenderOptions {
        current_year: year,
        timeout: None,
    }
}

fn frank_and_annie() -> Vec<Figure> {
    vec![
        Figure::new("Frank", 1920, 1935, Category::Philosophy),
        Figure::new("Annie", 1952, 2000, Category::Economics),
    ]
}

fn render_svg(figures: &[Figure]) -> String {
    let bytes = render_chart(figures, Backend::Svg, &Config::default(), &options(2026))
        .expect("svg render failed");
    String::from_utf8(bytes).expect("svg is utf-8")
}

/// Value of `name="..."` in the first element of `markup` carrying it.
fn attr(markup: &str, name: &str) -> f32 {
    let key = format!(" {name}=\"");
    let start = markup.find(&key).expect("attribute present") + key.len();
    let end = start + markup[start..].find('"').expect("closing quote");
    markup[start..end].parse().expect("numeric attribute")
}

#[test]
fn frank_and_annie_share_a_lane() {
    let figures = frank_and_annie();
    let lanes = assign_lanes(&figures);
    assert_eq!(lanes.lane_count(), 1);
    assert_eq!(lanes.as_slice(), &[0, 0]);

    let layout = compute_layout(&figures, &Palette::classic(), &LayoutConfig::default(), 2026)
        .expect("layout");
    let labels: Vec<&str> = layout.decades.iter().map(|row| row.label.as_str()).collect();
    assert_eq!(
        labels,
        vec!["1920", "1930", "1940", "1950", "1960", "1970", "1980", "1990"]
    );

    let svg = render_svg(&figures);
    assert!(svg.starts_with("<svg"));
    assert!(svg.ends_with("</svg>"));
    assert!(svg.contains(">Frank</text>"));
    assert!(svg.contains(">Annie</text>"));
}

#[test]
fn overlapping_figures_need_one_lane_each() {
    let figures: Vec<Figure> = (0..6)
        .map(|i| Figure::new(format!("F{i}"), 1900, 2000, Category::Science))
        .collect();
    assert_eq!(assign_lanes(&figures).lane_count(), 6);

    let disjoint: Vec<Figure> = (0..6)
        .map(|i| Figure::new(format!("D{i}"), 1800 + i * 20, 1810 + i * 20, Category::Art))
        .collect();
    assert_eq!(assign_lanes(&disjoint).lane_count(), 1);
}

#[test]
fn decade_count_covers_both_ends() {
    let figures = vec![Figure::new("Span", 1985, 2010, Category::Music)];
    let layout = compute_layout(&figures, &Palette::classic(), &LayoutConfig::default(), 2026)
        .expect("layout");
    assert_eq!(layout.decades.len(), 3);
    assert_eq!(layout.height, 90.0);
}

#[test]
fn unknown_category_uses_fallback_colors() {
    let figures = vec![Figure::new(
        "Paracelsus",
        1493,
        1541,
        Category::from_token("alchemy"),
    )];
    let svg = render_svg(&figures);
    assert!(svg.contains("fill=\"lightgray\""));
    assert!(svg.contains("fill=\"black\">Paracelsus</text>"));
}

#[test]
fn degenerate_interval_is_rejected() {
    let figures = vec![Figure::new("Backwards", 1950, 1900, Category::Science)];
    let err = render_chart(&figures, Backend::Svg, &Config::default(), &options(2026))
        .expect_err("start after end");
    assert!(matches!(err, ChartError::DegenerateInterval { .. }));
}

#[test]
fn rendering_is_deterministic() {
    let figures = vec![
        Figure::new("A", 1800, 1850, Category::Science),
        Figure::new("B", 1820, 1890, Category::Writing),
        Figure::new("C", 1840, 1860, Category::Political),
        Figure::new("D", 1855, 1900, Category::Music),
    ];
    assert_eq!(render_svg(&figures), render_svg(&figures));
}

const CANVAS: (f32, f32) = (200.0, 100.0);
const BLOCK: (f32, f32) = (40.0, 20.0);

fn all_alignments() -> Vec<(Option<XAlign>, Option<YAlign>)> {
    let x_aligns = [None, Some(XAlign::Left), Some(XAlign::Middle), Some(XAlign::Right)];
    let y_aligns = [None, Some(YAlign::Top), Some(YAlign::Center), Some(YAlign::Bottom)];
    x_aligns
        .iter()
        .flat_map(|x| y_aligns.iter().map(move |y| (*x, *y)))
        .collect()
}

fn block_at(x_align: Option<XAlign>, y_align: Option<YAlign>) -> TextPosition {
    TextPosition {
        x: 10.0,
        y: 6.0,
        width: BLOCK.0,
        height: BLOCK.1,
        x_align,
        y_align,
    }
}

fn unitless() -> RenderConfig {
    RenderConfig {
        svg_units: String::new(),
        ..RenderConfig::default()
    }
}

/// The first text block of an SVG document, from its `<g` tag onwards.
fn svg_block(
    position: &TextPosition,
    settings: &TextSettings,
    transform: Option<&Transform>,
) -> String {
    let mut svg = SvgProvider::new(CANVAS.0, CANVAS.1, &unitless());
    svg.draw_text(position, "Block", settings, transform);
    let markup = svg.to_svg();
    let start = markup.find("<g class=\"text-block\"").expect("text block");
    markup[start..].to_string()
}

fn magick_args(
    position: &TextPosition,
    settings: &TextSettings,
    transform: Option<&Transform>,
) -> Vec<String> {
    let mut magick = MagickProvider::new(CANVAS.0, CANVAS.1, &unitless());
    magick.draw_text(position, "Block", settings, transform);
    magick.arguments()
}

fn flag_values<'a>(args: &'a [String], flag: &str) -> Vec<&'a str> {
    args.windows(2)
        .filter(|pair| pair[0] == flag)
        .map(|pair| pair[1].as_str())
        .collect()
}

fn parse_pair(value: &str, separator: char) -> (f32, f32) {
    let (a, b) = value.split_once(separator).expect("two values");
    (a.parse().expect("first value"), b.parse().expect("second value"))
}

/// Gravity and `-geometry` offset used to composite the block.
fn magick_anchor(args: &[String]) -> (Gravity, (f32, f32)) {
    let composite = args
        .iter()
        .position(|arg| arg == "-composite")
        .expect("composite");
    assert_eq!(args[composite - 4], "-gravity");
    assert_eq!(args[composite - 2], "-geometry");
    let gravity = Gravity::from_magick_name(&args[composite - 3]).expect("gravity name");
    let geometry = &args[composite - 1];
    let split = geometry[1..].find(['+', '-']).expect("two offsets") + 1;
    let offset = (
        geometry[..split].parse().expect("x offset"),
        geometry[split..].parse().expect("y offset"),
    );
    (gravity, offset)
}

/// Label size and border band of the composited block. The first `-size`
/// is the canvas.
fn magick_label(args: &[String]) -> ((f32, f32), f32) {
    let size = parse_pair(flag_values(args, "-size")[1], 'x');
    let border = flag_values(args, "-border")
        .first()
        .map(|value| parse_pair(value, 'x').0)
        .unwrap_or(0.0);
    (size, border)
}

fn assert_close(a: (f32, f32), b: (f32, f32), context: &str) {
    assert!(
        (a.0 - b.0).abs() < 0.05 && (a.1 - b.1).abs() < 0.05,
        "{context}: {a:?} != {b:?}"
    );
}

#[test]
fn text_blocks_land_on_the_same_box_in_every_backend() {
    let settings = TextSettings {
        background: Some("red".to_string()),
        ..TextSettings::default()
    };
    for (x_align, y_align) in all_alignments() {
        let position = block_at(x_align, y_align);
        let block = svg_block(&position, &settings, None);
        let svg_corner = (attr(&block, "x"), attr(&block, "y"));

        let args = magick_args(&position, &settings, None);
        let (gravity, offset) = magick_anchor(&args);
        let magick_corner = gravity.place(CANVAS, BLOCK, offset);

        assert_eq!(
            svg_corner, magick_corner,
            "mismatch for {x_align:?}/{y_align:?}"
        );
    }
}

#[test]
fn bordered_blocks_keep_their_outer_size_in_every_backend() {
    let settings = TextSettings {
        border_thickness: 2.0,
        border_color: Some("black".to_string()),
        background: Some("red".to_string()),
        ..TextSettings::default()
    };
    for (x_align, y_align) in all_alignments() {
        let context = format!("{x_align:?}/{y_align:?}");
        let position = block_at(x_align, y_align);

        // The stroke is centred on the rect edge, so the outer box grows by
        // half the band on every side.
        let block = svg_block(&position, &settings, None);
        let band = attr(&block, "stroke-width");
        let svg_outer = (
            (attr(&block, "x") - band / 2.0, attr(&block, "y") - band / 2.0),
            (attr(&block, "width") + band, attr(&block, "height") + band),
        );

        let args = magick_args(&position, &settings, None);
        let ((label_w, label_h), border) = magick_label(&args);
        let magick_size = (label_w + 2.0 * border, label_h + 2.0 * border);
        assert_eq!(magick_size, BLOCK, "{context}");
        let (gravity, offset) = magick_anchor(&args);
        let magick_corner = gravity.place(CANVAS, magick_size, offset);

        assert_close(svg_outer.0, magick_corner, &context);
        assert_close(svg_outer.1, BLOCK, &context);
    }
}

/// Bounding box of an SVG rect turned by the `rotate(a cx cy)` on its group.
fn svg_rotated_box(block: &str) -> ((f32, f32), (f32, f32)) {
    let start = block.find("rotate(").expect("rotate") + "rotate(".len();
    let end = start + block[start..].find(')').expect("closing paren");
    let values: Vec<f32> = block[start..end]
        .split_whitespace()
        .map(|v| v.parse().expect("rotate value"))
        .collect();
    let (degrees, cx, cy) = (values[0], values[1], values[2]);
    let (x, y) = (attr(block, "x"), attr(block, "y"));
    let (w, h) = (attr(block, "width"), attr(block, "height"));
    let (sin, cos) = degrees.to_radians().sin_cos();
    let corners = [(x, y), (x + w, y), (x, y + h), (x + w, y + h)].map(|(px, py)| {
        let (dx, dy) = (px - cx, py - cy);
        (cx + dx * cos - dy * sin, cy + dx * sin + dy * cos)
    });
    let min_x = corners.iter().map(|c| c.0).fold(f32::INFINITY, f32::min);
    let min_y = corners.iter().map(|c| c.1).fold(f32::INFINITY, f32::min);
    let max_x = corners.iter().map(|c| c.0).fold(f32::NEG_INFINITY, f32::max);
    let max_y = corners.iter().map(|c| c.1).fold(f32::NEG_INFINITY, f32::max);
    ((min_x, min_y), (max_x - min_x, max_y - min_y))
}

#[test]
fn rotated_blocks_land_where_the_rotated_label_is_composited() {
    let settings = TextSettings {
        background: Some("red".to_string()),
        ..TextSettings::default()
    };
    for degrees in [90.0, 30.0] {
        let rotate = Transform::Rotate {
            degrees,
            origin: None,
        };
        for (x_align, y_align) in all_alignments() {
            let context = format!("{degrees} {x_align:?}/{y_align:?}");
            let position = block_at(x_align, y_align);

            let block = svg_block(&position, &settings, Some(&rotate));
            let (svg_corner, svg_size) = svg_rotated_box(&block);

            let args = magick_args(&position, &settings, Some(&rotate));
            assert_eq!(flag_values(&args, "-rotate"), vec![format!("{degrees}")]);
            let (label, _) = magick_label(&args);
            let turned = rotated_extent(degrees, label);
            let (gravity, offset) = magick_anchor(&args);
            let magick_corner = gravity.place(CANVAS, turned, offset);

            assert_close(svg_size, turned, &context);
            assert_close(svg_corner, magick_corner, &context);
        }
    }
}

#[cfg(feature = "png")]
#[test]
fn png_backend_produces_png_bytes() {
    let bytes = render_chart(&frank_and_annie(), Backend::Png, &Config::default(), &options(2026))
        .expect("png render failed");
    assert_eq!(&bytes[..4], &[0x89, b'P', b'N', b'G']);
}

#[cfg(unix)]
#[test]
fn failing_image_tool_is_a_backend_error() {
    let mut config = Config::default();
    config.render.magick_binary = "false".to_string();
    let err = render_chart(&frank_and_annie(), Backend::Magick, &config, &options(2026))
        .expect_err("tool exits non-zero");
    assert!(matches!(err, ChartError::Backend { backend: "magick", .. }));
}
