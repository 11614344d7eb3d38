use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use common::{FetchRange, ProviderError, Series, SeriesPoint, SeriesProvider};

/// REST client for the BCRA "Monetarias" statistics API.
///
/// Series are addressed by numeric id; the endpoint ignores date filters and
/// returns the full history, so the range is applied client-side.
pub struct BcraProvider {
    base_url: String,
    http: Client,
}

/// Logical series id to BCRA numeric variable id.
const BCRA_SERIES: &[(&str, &str)] = &[
    ("USDARS_OFFICIAL", "5"), // wholesale reference rate
    ("RESERVES_USD", "1"),    // international reserves
    ("POLICY_RATE", "28"),    // LELIQ policy rate
];

impl BcraProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: crate::http_client(),
        }
    }

    fn variable_id(series_id: &str) -> Option<&'static str> {
        BCRA_SERIES
            .iter()
            .find(|(id, _)| *id == series_id)
            .map(|(_, sid)| *sid)
    }
}

#[async_trait]
impl SeriesProvider for BcraProvider {
    fn name(&self) -> &'static str {
        "BCRA"
    }

    async fn fetch(&self, series_id: &str, range: FetchRange) -> Result<Series, ProviderError> {
        let sid = Self::variable_id(series_id)
            .ok_or_else(|| ProviderError::UnsupportedSeries(series_id.to_string()))?;

        let url = format!("{}/{sid}", self.base_url);
        debug!(series = series_id, %url, "BCRA request");

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

        let body: BcraResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let detalle = body
            .results
            .into_iter()
            .next()
            .map(|r| r.detalle)
            .unwrap_or_default();

        let mut points = Vec::with_capacity(detalle.len());
        for row in detalle {
            let (Some(fecha), Some(valor)) = (row.fecha, row.valor) else {
                continue;
            };
            let ts = parse_bcra_date(&fecha)
                .ok_or_else(|| ProviderError::Parse(format!("bad fecha '{fecha}'")))?;
            if range.start.is_some_and(|s| ts < s) || range.end.is_some_and(|e| ts > e) {
                continue;
            }
            points.push(SeriesPoint { ts, value: valor });
        }

        if points.is_empty() {
            return Err(ProviderError::Empty);
        }
        Ok(Series::new(series_id, points))
    }
}

/// BCRA dates come as "YYYY-MM-DD", occasionally with a time component.
fn parse_bcra_date(raw: &str) -> Option<chrono::DateTime<Utc>> {
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&d.and_hms_opt(0, 0, 0)?));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|dt| Utc.from_utc_datetime(&dt))
}

// ─── Response types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct BcraResponse {
    #[serde(default)]
    results: Vec<BcraResult>,
}

#[derive(Deserialize)]
struct BcraResult {
    #[serde(default)]
    detalle: Vec<BcraRow>,
}

#[derive(Deserialize)]
struct BcraRow {
    fecha: Option<String>,
    valor: Option<f64>,
}
