use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Political,
    Cultural,
    Religious,
    Explorer,
    Science,
    Invention,
    Business,
    Economics,
    Philosophy,
    Art,
    Writing,
    Music,
    Entertainment,
    Sports,
    /// Any tag the palette does not know about. Rendered with fallback colors.
    Other(String),
}

impl Category {
    pub fn from_token(token: &str) -> Self {
        let token = token.trim().trim_start_matches(':');
        match token.to_ascii_lowercase().as_str() {
            "political" => Self::Political,
            "cultural" => Self::Cultural,
            "religious" => Self::Religious,
            "explorer" => Self::Explorer,
            "science" => Self::Science,
            "invention" => Self::Invention,
            "business" => Self::Business,
            "economics" => Self::Economics,
            "philosophy" => Self::Philosophy,
            "art" => Self::Art,
            "writing" => Self::Writing,
            "music" => Self::Music,
            "entertainment" => Self::Entertainment,
            "sports" => Self::Sports,
            _ => Self::Other(token.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Political => "political",
            Self::Cultural => "cultural",
            Self::Religious => "religious",
            Self::Explorer => "explorer",
            Self::Science => "science",
            Self::Invention => "invention",
            Self::Business => "business",
            Self::Economics => "economics",
            Self::Philosophy => "philosophy",
            Self::Art => "art",
            Self::Writing => "writing",
            Self::Music => "music",
            Self::Entertainment => "entertainment",
            Self::Sports => "sports",
            Self::Other(tag) => tag.as_str(),
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_token(&raw))
    }
}

/// One timeline subject. Two figures with identical fields are still
/// distinct entries; layout code refers to them by slice position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Figure {
    pub name: String,
    pub start_year: i32,
    pub end_year: i32,
    #[serde(default)]
    pub category: Category,
}

impl Figure {
    pub fn new(name: impl Into<String>, start_year: i32, end_year: i32, category: Category) -> Self {
        Self {
            name: name.into(),
            start_year,
            end_year,
            category,
        }
    }

    pub fn span_years(&self) -> i32 {
        self.end_year - self.start_year
    }

    pub fn is_valid(&self) -> bool {
        self.start_year <= self.end_year
    }
}
