use crate::config::{Config, load_config};
use crate::data::{load_figures, select_figures};
use crate::draw::Backend;
use crate::ir::Category;
use crate::layout::compute_layout;
use crate::layout_dump::write_layout_dump;
use crate::logging::init_logging;
use crate::render::{RenderOptions, current_year, render_chart, write_output};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "horizhist", version, about = "Horizontal timeline charts of historical figures")]
pub struct Args {
    /// Figure names to chart; a leading ':' selects a whole category (':science')
    #[arg(value_name = "FIGURES")]
    pub figures: Vec<String>,

    /// Figure file or directory of figure files (repeatable)
    #[arg(short = 'd', long = "data", default_value = "data")]
    pub data: Vec<PathBuf>,

    /// Output file. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (palette, layout and render settings)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Year treated as "now" for living figures and the future mask
    #[arg(long = "current-year")]
    pub current_year: Option<i32>,

    /// Seconds to wait for the ImageMagick process
    #[arg(long = "timeout")]
    pub timeout: Option<u64>,

    /// Write the computed layout as JSON
    #[arg(long = "dumpLayout")]
    pub dump_layout: Option<PathBuf>,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Magick,
}

impl OutputFormat {
    pub fn backend(self) -> Result<Backend> {
        match self {
            OutputFormat::Svg => Ok(Backend::Svg),
            #[cfg(feature = "png")]
            OutputFormat::Png => Ok(Backend::Png),
            #[cfg(not(feature = "png"))]
            OutputFormat::Png => Err(anyhow::anyhow!(
                "PNG output requires the 'png' feature; try -e magick"
            )),
            OutputFormat::Magick => Ok(Backend::Magick),
        }
    }
}

/// Splits positional selectors into figure names and `:category` tags.
pub fn split_selectors(selectors: &[String]) -> (Vec<String>, Vec<Category>) {
    let mut names = Vec::new();
    let mut categories = Vec::new();
    for selector in selectors {
        if selector.starts_with(':') {
            categories.push(Category::from_token(selector));
        } else {
            names.push(selector.clone());
        }
    }
    (names, categories)
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    run_with_args(args)
}

pub fn run_with_args(args: Args) -> Result<()> {
    let config: Config = load_config(args.config.as_deref())?;
    let options = RenderOptions {
        current_year: args.current_year.unwrap_or_else(current_year),
        timeout: args.timeout.map(Duration::from_secs),
    };

    let loaded = load_figures(&args.data, options.current_year)?;
    let (names, categories) = split_selectors(&args.figures);
    let figures = select_figures(loaded, &names, &categories);
    for name in &names {
        if !figures.iter().any(|figure| &figure.name == name) {
            tracing::warn!(%name, "no figure with this name in the data files");
        }
    }
    if figures.is_empty() {
        return Err(anyhow::anyhow!("No figures matched the selection"));
    }

    if let Some(path) = args.dump_layout.as_deref() {
        let layout = compute_layout(
            &figures,
            &config.palette,
            &config.layout,
            options.current_year,
        )?;
        write_layout_dump(path, &layout)?;
    }

    let backend = args.output_format.backend()?;
    let bytes = render_chart(&figures, backend, &config, &options)?;
    write_output(&bytes, args.output.as_deref())?;
    Ok(())
}
