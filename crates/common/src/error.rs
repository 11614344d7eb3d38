use thiserror::Error;

/// Failure modes of a single provider adapter call.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("provider returned no data")]
    Empty,

    #[error("series '{0}' not supported by this provider")]
    UnsupportedSeries(String),
}

#[derive(Debug, Error)]
pub enum Error {
    /// Every provider in the configured order failed or returned empty.
    /// The router never substitutes synthetic data for a missing series.
    #[error("all providers exhausted for series '{series}' (tried: {})", tried.join(", "))]
    ProvidersExhausted {
        series: String,
        tried: Vec<String>,
        #[source]
        last: Option<ProviderError>,
    },

    #[error("series '{0}' is not registered")]
    UnknownSeries(String),

    /// Stored history is too thin to evaluate an indicator.
    #[error("insufficient data for {indicator}: {detail}")]
    InsufficientData { indicator: String, detail: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn insufficient(indicator: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::InsufficientData {
            indicator: indicator.into(),
            detail: detail.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
