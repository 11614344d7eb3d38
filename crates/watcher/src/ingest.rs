use std::path::Path;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tracing::info;

use common::{series_spec, Error, Result, Series, SeriesPoint};
use store::Store;

/// Load observations for a registered series from a `date,value` CSV file.
///
/// This is the ingestion route for series without a live provider (EMBI and
/// CDS levels come from terminal or vendor exports): the router reports
/// `ProvidersExhausted` for them and this verb fills the store instead.
pub async fn ingest_csv(store: &Store, series_id: &str, path: &Path) -> Result<usize> {
    let spec = series_spec(series_id)
        .ok_or_else(|| Error::UnknownSeries(series_id.to_string()))?;

    let raw = std::fs::read_to_string(path)?;
    let series = parse_csv(series_id, &raw)?;

    store.upsert_meta(std::slice::from_ref(spec)).await?;
    let stored = store.upsert_points(series_id, series.points()).await?;
    info!(series = series_id, points = stored, "CSV ingest complete");
    Ok(stored)
}

/// Parse `date,value` rows. Dates are `YYYY-MM-DD` or RFC 3339. Blank lines,
/// `#` comments and a leading header row are skipped; any other malformed row
/// is an error naming the line.
pub fn parse_csv(series_id: &str, raw: &str) -> Result<Series> {
    if series_spec(series_id).is_none() {
        return Err(Error::UnknownSeries(series_id.to_string()));
    }

    let mut points = Vec::new();
    for (idx, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((date_raw, value_raw)) = line.split_once(',') else {
            return Err(Error::Other(format!(
                "line {}: expected 'date,value', got '{line}'",
                idx + 1
            )));
        };
        let date_raw = date_raw.trim();
        let value_raw = value_raw.trim();

        if idx == 0 && parse_date(date_raw).is_none() && value_raw.parse::<f64>().is_err() {
            continue; // header row
        }

        let ts = parse_date(date_raw)
            .ok_or_else(|| Error::Other(format!("line {}: bad date '{date_raw}'", idx + 1)))?;
        let value: f64 = value_raw
            .parse()
            .map_err(|_| Error::Other(format!("line {}: bad value '{value_raw}'", idx + 1)))?;
        points.push(SeriesPoint { ts, value });
    }

    if points.is_empty() {
        return Err(Error::Other("no data rows in CSV".to_string()));
    }
    Ok(Series::new(series_id, points))
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&d.and_hms_opt(0, 0, 0)?));
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_skipping_header_and_comments() {
        let raw = "date,value\n# vendor export\n2025-05-01,1520.0\n2025-06-10,1455.5\n";
        let series = parse_csv("EMBI_AR", raw).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.latest().unwrap().value, 1455.5);
    }

    #[test]
    fn malformed_row_errors_with_line_number() {
        let raw = "2025-05-01,1520.0\n2025-05-02,not-a-number\n";
        let err = parse_csv("EMBI_AR", raw).unwrap_err();
        assert!(err.to_string().contains("line 2"), "got: {err}");
    }

    #[test]
    fn unregistered_series_is_rejected() {
        let err = parse_csv("NOT_A_SERIES", "2025-05-01,1.0\n").unwrap_err();
        assert!(matches!(err, Error::UnknownSeries(_)));
    }

    #[test]
    fn empty_file_is_an_error() {
        assert!(parse_csv("EMBI_AR", "date,value\n").is_err());
    }

    #[tokio::test]
    async fn ingested_embi_history_feeds_the_trend_reading() {
        let store = Store::connect("sqlite::memory:").await.unwrap();
        store.init_schema().await.unwrap();

        // No adapter serves EMBI; a vendor CSV is the supported route.
        let raw = "date,value\n2025-05-01,1700.0\n2025-06-10,1450.0\n";
        let series = parse_csv("EMBI_AR", raw).unwrap();
        store
            .upsert_points("EMBI_AR", series.points())
            .await
            .unwrap();

        let reading = triggers::features::embi(&store).await.unwrap();
        assert_eq!(reading.level_bps, 1450.0);
        assert_eq!(reading.trend_30d_bps, -250.0);
    }
}
