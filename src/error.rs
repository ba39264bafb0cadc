use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("no data to render")]
    NoData,

    #[error("degenerate interval for {name}: start year {start_year} is after end year {end_year}")]
    DegenerateInterval {
        name: String,
        start_year: i32,
        end_year: i32,
    },

    #[error("{backend} backend failed: {message}")]
    Backend {
        backend: &'static str,
        message: String,
    },

    #[error("invalid data file {path}: {message}")]
    Data { path: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json5(#[from] json5::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type ChartResult<T> = Result<T, ChartError>;

impl ChartError {
    pub fn backend(backend: &'static str, message: impl Into<String>) -> Self {
        Self::Backend {
            backend,
            message: message.into(),
        }
    }

    pub fn data(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Data {
            path: path.into(),
            message: message.into(),
        }
    }
}
