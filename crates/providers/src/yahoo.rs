use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use common::{FetchRange, ProviderError, Series, SeriesPoint, SeriesProvider};

const YAHOO_BASE: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance spot FX client (v8 chart endpoint). Daily closes only;
/// Yahoo has no USD/ARS forward curve.
pub struct YahooFxProvider {
    base_url: String,
    http: Client,
}

const YAHOO_TICKERS: &[(&str, &str)] = &[("USDARS_OFFICIAL", "ARS=X")];

impl YahooFxProvider {
    pub fn new() -> Self {
        Self::with_base(YAHOO_BASE)
    }

    pub fn with_base(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: crate::http_client(),
        }
    }

    fn ticker(series_id: &str) -> Option<&'static str> {
        YAHOO_TICKERS
            .iter()
            .find(|(id, _)| *id == series_id)
            .map(|(_, t)| *t)
    }
}

impl Default for YahooFxProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SeriesProvider for YahooFxProvider {
    fn name(&self) -> &'static str {
        "YAHOOFX"
    }

    async fn fetch(&self, series_id: &str, range: FetchRange) -> Result<Series, ProviderError> {
        let ticker = Self::ticker(series_id)
            .ok_or_else(|| ProviderError::UnsupportedSeries(series_id.to_string()))?;

        // Yahoo takes a relative range; fetch a year and trim client-side.
        let url = format!("{}/{ticker}?range=1y&interval=1d", self.base_url);
        debug!(series = series_id, ticker, "Yahoo FX request");

        let resp = self
            .http
            .get(&url)
            .header("User-Agent", "Mozilla/5.0 (compatible; macrowatch/0.1)")
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ProviderError::Network(format!("HTTP {status} for {url}")));
        }

        let body: ChartResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let result = body
            .chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| {
                ProviderError::Parse(
                    body.chart
                        .error
                        .map(|e| e.description)
                        .unwrap_or_else(|| "empty chart result".to_string()),
                )
            })?;

        let closes = result
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .unwrap_or_default();

        let mut points = Vec::with_capacity(result.timestamp.len());
        for (epoch, close) in result.timestamp.iter().zip(closes) {
            let Some(value) = close else { continue };
            let Some(ts) = Utc.timestamp_opt(*epoch, 0).single() else {
                continue;
            };
            if range.start.is_some_and(|s| ts < s) || range.end.is_some_and(|e| ts > e) {
                continue;
            }
            points.push(SeriesPoint { ts, value });
        }

        if points.is_empty() {
            return Err(ProviderError::Empty);
        }
        Ok(Series::new(series_id, points))
    }
}

// ─── Response types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Deserialize)]
struct ChartError {
    description: String,
}

#[derive(Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
}

#[derive(Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_chart_payload_shape() {
        let body = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1735689600, 1735776000],
                    "indicators": {"quote": [{"close": [1180.5, null]}]}
                }],
                "error": null
            }
        }"#;
        let parsed: ChartResponse = serde_json::from_str(body).unwrap();
        let result = &parsed.chart.result.as_ref().unwrap()[0];
        assert_eq!(result.timestamp.len(), 2);
        assert_eq!(result.indicators.quote[0].close[0], Some(1180.5));
    }

    #[test]
    fn only_spot_series_supported() {
        assert_eq!(YahooFxProvider::ticker("USDARS_OFFICIAL"), Some("ARS=X"));
        assert!(YahooFxProvider::ticker("NDF_3M").is_none());
    }
}
