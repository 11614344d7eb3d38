use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::ProviderError;
use crate::types::Series;

/// Optional date window for a fetch. Providers that only serve spot data
/// (e.g. Bluelytics `/latest`) may ignore it.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl FetchRange {
    pub fn since(start: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }
}

/// Abstraction over one upstream data source.
///
/// Each adapter maps logical series ids to its own provider-specific query
/// and returns a normalized `Series`. Only the `ProviderRouter` in
/// `crates/providers` should select between adapters; callers above it ask
/// for a logical series and get whichever source answered first.
#[async_trait]
pub trait SeriesProvider: Send + Sync {
    /// Registry name used in `PREFERRED_PROVIDERS` (e.g. "BCRA").
    fn name(&self) -> &'static str;

    /// Fetch the series within the range. Must return `ProviderError::Empty`
    /// rather than an empty-but-Ok series.
    async fn fetch(&self, series_id: &str, range: FetchRange) -> Result<Series, ProviderError>;
}
