use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use common::{FetchRange, ProviderError, Series, SeriesPoint, SeriesProvider};

/// Client for the national statistics API (datos.gob.ar series endpoint),
/// which fronts INDEC CPI series. Series are addressed by string slug.
pub struct IndecProvider {
    base_url: String,
    http: Client,
}

const INDEC_SERIES: &[(&str, &str)] = &[
    ("CPI_HEADLINE", "ipc_nivel_general_nacional"),
    ("CPI_CORE", "ipc_nucleo_nivel_general_nacional"),
];

impl IndecProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: crate::http_client(),
        }
    }

    fn slug(series_id: &str) -> Option<&'static str> {
        INDEC_SERIES
            .iter()
            .find(|(id, _)| *id == series_id)
            .map(|(_, slug)| *slug)
    }

    fn url(&self, slug: &str, range: FetchRange) -> String {
        let mut url = format!("{}/?ids={slug}&format=json", self.base_url);
        if let Some(start) = range.start {
            url.push_str(&format!("&start_date={}", start.format("%Y-%m-%d")));
        }
        if let Some(end) = range.end {
            url.push_str(&format!("&end_date={}", end.format("%Y-%m-%d")));
        }
        url
    }
}

#[async_trait]
impl SeriesProvider for IndecProvider {
    fn name(&self) -> &'static str {
        "INDEC"
    }

    async fn fetch(&self, series_id: &str, range: FetchRange) -> Result<Series, ProviderError> {
        let slug = Self::slug(series_id)
            .ok_or_else(|| ProviderError::UnsupportedSeries(series_id.to_string()))?;

        let url = self.url(slug, range);
        debug!(series = series_id, %url, "INDEC request");

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

        let body: IndecResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let mut points = Vec::with_capacity(body.data.len());
        for (date, value) in body.data {
            let Some(value) = value else { continue };
            let ts = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| Utc.from_utc_datetime(&dt))
                .ok_or_else(|| ProviderError::Parse(format!("bad date '{date}'")))?;
            points.push(SeriesPoint { ts, value });
        }

        if points.is_empty() {
            return Err(ProviderError::Empty);
        }
        Ok(Series::new(series_id, points))
    }
}

// ─── Response types ───────────────────────────────────────────────────────────

/// Rows arrive as `[["2025-01-01", 123.4], ...]`; values may be null while a
/// period is provisional.
#[derive(Deserialize)]
struct IndecResponse {
    #[serde(default)]
    data: Vec<(String, Option<f64>)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_indec_payload_shape() {
        let body = r#"{"data": [["2025-01-01", 7620.3], ["2025-02-01", null], ["2025-03-01", 7998.1]]}"#;
        let parsed: IndecResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.data.len(), 3);
        assert_eq!(parsed.data[0].1, Some(7620.3));
        assert!(parsed.data[1].1.is_none());
    }

    #[test]
    fn url_includes_date_window() {
        let p = IndecProvider::new("https://example.test/series");
        let range = FetchRange {
            start: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            end: Some(Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap()),
        };
        let url = p.url("ipc_nivel_general_nacional", range);
        assert!(url.contains("start_date=2024-01-01"));
        assert!(url.contains("end_date=2024-12-31"));
    }
}
