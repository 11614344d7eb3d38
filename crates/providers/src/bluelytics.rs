use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use common::{FetchRange, ProviderError, Series, SeriesPoint, SeriesProvider};

const BLUE_API: &str = "https://api.bluelytics.com.ar/v2";

/// Bluelytics client for the parallel ("blue") and official USD/ARS rates.
/// Only the `/latest` endpoint is used, so each fetch yields a single point.
pub struct BluelyticsProvider {
    base_url: String,
    http: Client,
}

impl BluelyticsProvider {
    pub fn new() -> Self {
        Self::with_base(BLUE_API)
    }

    pub fn with_base(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: crate::http_client(),
        }
    }

    fn rate_kind(series_id: &str) -> Option<&'static str> {
        match series_id {
            "USDARS_PARALLEL" => Some("blue"),
            "USDARS_OFFICIAL_BLUELYTICS" => Some("oficial"),
            _ => None,
        }
    }
}

impl Default for BluelyticsProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SeriesProvider for BluelyticsProvider {
    fn name(&self) -> &'static str {
        "BLUELYTICS"
    }

    async fn fetch(&self, series_id: &str, _range: FetchRange) -> Result<Series, ProviderError> {
        let kind = Self::rate_kind(series_id)
            .ok_or_else(|| ProviderError::UnsupportedSeries(series_id.to_string()))?;

        let url = format!("{}/latest", self.base_url);
        debug!(series = series_id, kind, "Bluelytics request");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ProviderError::Network(format!("HTTP {status} for {url}")));
        }

        let body: LatestResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let quote = match kind {
            "blue" => body.blue,
            _ => body.oficial,
        };
        let value = quote
            .and_then(|q| q.value_avg)
            .ok_or_else(|| ProviderError::Parse(format!("value_avg missing for '{kind}'")))?;

        let ts = body
            .last_update
            .as_deref()
            .and_then(parse_last_update)
            .unwrap_or_else(Utc::now);

        Ok(Series::new(series_id, vec![SeriesPoint { ts, value }]))
    }
}

/// `last_update` comes as ISO-8601 with an offset, e.g.
/// "2025-10-29T19:45:59.078713-03:00".
fn parse_last_update(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

// ─── Response types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct LatestResponse {
    oficial: Option<Quote>,
    blue: Option<Quote>,
    last_update: Option<String>,
}

#[derive(Deserialize)]
struct Quote {
    value_avg: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_latest_payload_shape() {
        let body = r#"{
            "oficial": {"value_avg": 1050.0, "value_sell": 1070.0, "value_buy": 1030.0},
            "blue": {"value_avg": 1275.0, "value_sell": 1285.0, "value_buy": 1265.0},
            "last_update": "2025-10-29T19:45:59.078713-03:00"
        }"#;
        let parsed: LatestResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.blue.unwrap().value_avg, Some(1275.0));
        assert!(parse_last_update(parsed.last_update.as_deref().unwrap()).is_some());
    }

    #[test]
    fn rate_kind_mapping() {
        assert_eq!(BluelyticsProvider::rate_kind("USDARS_PARALLEL"), Some("blue"));
        assert_eq!(
            BluelyticsProvider::rate_kind("USDARS_OFFICIAL_BLUELYTICS"),
            Some("oficial")
        );
        assert!(BluelyticsProvider::rate_kind("RESERVES_USD").is_none());
    }
}
