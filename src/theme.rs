use crate::ir::Category;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const FALLBACK_BACKGROUND: &str = "lightgray";
pub const FALLBACK_FOREGROUND: &str = "black";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryColors {
    pub background: String,
    pub foreground: String,
}

impl CategoryColors {
    pub fn new(background: impl Into<String>, foreground: impl Into<String>) -> Self {
        Self {
            background: background.into(),
            foreground: foreground.into(),
        }
    }
}

/// Category to color pair lookup. Tags missing from `entries` always
/// resolve to `fallback`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Palette {
    pub entries: HashMap<String, CategoryColors>,
    pub fallback: CategoryColors,
}

impl Palette {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
            fallback: CategoryColors::new(FALLBACK_BACKGROUND, FALLBACK_FOREGROUND),
        }
    }

    pub fn classic() -> Self {
        let pairs = [
            (Category::Political, "#66CCFF", "black"),
            (Category::Cultural, "#009999", "white"),
            (Category::Religious, "#000099", "white"),
            (Category::Explorer, "#9999FF", "white"),
            (Category::Science, "#00CC00", "black"),
            (Category::Invention, "#66FFCC", "black"),
            (Category::Business, "#009900", "white"),
            (Category::Economics, "darkgray", "white"),
            (Category::Philosophy, "#9900CC", "white"),
            (Category::Art, "#FF00FF", "black"),
            (Category::Writing, "#FF0000", "black"),
            (Category::Music, "#FF9933", "black"),
            (Category::Entertainment, "#FFFF00", "black"),
            (Category::Sports, "#996600", "white"),
        ];
        let mut palette = Self::empty();
        for (category, background, foreground) in pairs {
            palette.insert(&category, CategoryColors::new(background, foreground));
        }
        palette
    }

    pub fn insert(&mut self, category: &Category, colors: CategoryColors) {
        self.entries.insert(category.as_str().to_string(), colors);
    }

    pub fn colors_for(&self, category: &Category) -> &CategoryColors {
        match self.entries.get(category.as_str()) {
            Some(colors) => colors,
            None => &self.fallback,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::classic()
    }
}
