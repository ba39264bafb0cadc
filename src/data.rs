//! Figure files and selection.

use crate::error::{ChartError, ChartResult};
use crate::ir::{Category, Figure};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct FigureFile {
    #[serde(default, alias = ":figures")]
    figures: Vec<FigureRecord>,
}

#[derive(Debug, Deserialize)]
struct FigureRecord {
    #[serde(alias = ":name")]
    name: String,
    #[serde(alias = "birth_year", alias = ":birth_year")]
    start_year: i32,
    #[serde(default, alias = "death_year", alias = ":death_year")]
    end_year: Option<i32>,
    #[serde(default, alias = ":category")]
    category: Option<String>,
}

impl FigureRecord {
    fn into_figure(self, current_year: i32) -> Figure {
        Figure {
            name: self.name,
            start_year: self.start_year,
            end_year: self.end_year.unwrap_or(current_year),
            category: self
                .category
                .as_deref()
                .map(Category::from_token)
                .unwrap_or_default(),
        }
    }
}

/// Figure file syntax, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json5,
}

impl Format {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yml" | "yaml" => Some(Format::Yaml),
            "json" | "json5" => Some(Format::Json5),
            _ => None,
        }
    }
}

/// Parses one figure document. Figures without an end year are still alive
/// and end at `current_year`.
pub fn parse_figures(contents: &str, format: Format, current_year: i32) -> ChartResult<Vec<Figure>> {
    let file: FigureFile = match format {
        Format::Yaml => serde_yaml::from_str(contents)?,
        Format::Json5 => json5::from_str(contents)?,
    };
    Ok(file
        .figures
        .into_iter()
        .map(|record| record.into_figure(current_year))
        .collect())
}

pub fn load_file(path: &Path, current_year: i32) -> ChartResult<Vec<Figure>> {
    let format = Format::from_path(path).ok_or_else(|| {
        ChartError::data(path.display().to_string(), "unsupported file extension")
    })?;
    let contents = std::fs::read_to_string(path)?;
    let figures = parse_figures(&contents, format, current_year)
        .map_err(|e| ChartError::data(path.display().to_string(), e.to_string()))?;
    tracing::debug!(path = %path.display(), figures = figures.len(), "loaded figure file");
    Ok(figures)
}

/// Loads every figure file under `paths`. Directories contribute their
/// `*.yml`, `*.yaml`, `*.json` and `*.json5` files in name order; they are
/// not searched recursively.
pub fn load_figures(paths: &[PathBuf], current_year: i32) -> ChartResult<Vec<Figure>> {
    let mut figures = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut files: Vec<PathBuf> = std::fs::read_dir(path)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && Format::from_path(p).is_some())
                .collect();
            files.sort();
            for file in files {
                figures.extend(load_file(&file, current_year)?);
            }
        } else {
            figures.extend(load_file(path, current_year)?);
        }
    }
    Ok(figures)
}

/// Keeps figures named in `names` or tagged with one of `categories`. With
/// both lists empty every figure is kept.
pub fn select_figures(figures: Vec<Figure>, names: &[String], categories: &[Category]) -> Vec<Figure> {
    if names.is_empty() && categories.is_empty() {
        return figures;
    }
    figures
        .into_iter()
        .filter(|figure| names.contains(&figure.name) || categories.contains(&figure.category))
        .collect()
}
