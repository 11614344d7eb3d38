use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use sqlx::Row;
use tracing::info;

use common::{Error, Result, Series, SeriesPoint, SeriesSpec, TriggerState};

/// SQLite-backed storage for series data and the watcher state marker.
///
/// Single-writer assumption: one process owns the database file at a time.
/// All writes are idempotent upserts keyed by (series_id, ts).
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (and create if missing) the database at `url`.
    pub async fn connect(url: &str) -> Result<Self> {
        let opts = SqliteConnectOptions::from_str(url)
            .map_err(|e| Error::Config(format!("bad DATABASE_URL '{url}': {e}")))?
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(opts).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the schema if it does not exist. Safe to re-run.
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS dim_series (
                series_id TEXT PRIMARY KEY,
                name      TEXT NOT NULL,
                freq      TEXT NOT NULL,
                source    TEXT NOT NULL,
                units     TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS fact_series (
                series_id TEXT NOT NULL,
                ts        TEXT NOT NULL,
                value     REAL NOT NULL,
                PRIMARY KEY (series_id, ts)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS state_tracking (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("database schema ready");
        Ok(())
    }

    /// Upsert series metadata rows.
    pub async fn upsert_meta(&self, specs: &[SeriesSpec]) -> Result<()> {
        for spec in specs {
            sqlx::query(
                r#"
                INSERT INTO dim_series (series_id, name, freq, source, units)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT (series_id) DO UPDATE SET
                    name = excluded.name,
                    freq = excluded.freq,
                    source = excluded.source,
                    units = excluded.units
                "#,
            )
            .bind(spec.id)
            .bind(spec.name)
            .bind(spec.freq.to_string())
            .bind(spec.source)
            .bind(spec.unit)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    /// Upsert observation rows for a series. Re-ingesting identical rows is a
    /// no-op; a changed value for an existing timestamp overwrites it.
    pub async fn upsert_points(&self, series_id: &str, points: &[SeriesPoint]) -> Result<usize> {
        for p in points {
            sqlx::query(
                r#"
                INSERT INTO fact_series (series_id, ts, value)
                VALUES (?1, ?2, ?3)
                ON CONFLICT (series_id, ts) DO UPDATE SET value = excluded.value
                "#,
            )
            .bind(series_id)
            .bind(p.ts.to_rfc3339())
            .bind(p.value)
            .execute(&self.pool)
            .await?;
        }
        Ok(points.len())
    }

    /// Latest observation for a series, if any.
    pub async fn latest(&self, series_id: &str) -> Result<Option<SeriesPoint>> {
        let row = sqlx::query(
            r#"
            SELECT ts, value FROM fact_series
            WHERE series_id = ?1
            ORDER BY ts DESC LIMIT 1
            "#,
        )
        .bind(series_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(point_from_row).transpose()
    }

    /// Latest observation at or before `ts`.
    pub async fn value_at_or_before(
        &self,
        series_id: &str,
        ts: DateTime<Utc>,
    ) -> Result<Option<SeriesPoint>> {
        let row = sqlx::query(
            r#"
            SELECT ts, value FROM fact_series
            WHERE series_id = ?1 AND ts <= ?2
            ORDER BY ts DESC LIMIT 1
            "#,
        )
        .bind(series_id)
        .bind(ts.to_rfc3339())
        .fetch_optional(&self.pool)
        .await?;

        row.map(point_from_row).transpose()
    }

    /// Load up to `limit` most recent observations, oldest first.
    pub async fn load_series(&self, series_id: &str, limit: i64) -> Result<Series> {
        let rows = sqlx::query(
            r#"
            SELECT ts, value FROM fact_series
            WHERE series_id = ?1
            ORDER BY ts DESC LIMIT ?2
            "#,
        )
        .bind(series_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let points = rows
            .into_iter()
            .map(point_from_row)
            .collect::<Result<Vec<_>>>()?;
        Ok(Series::new(series_id, points))
    }

    /// Number of stored observations for a series.
    pub async fn count(&self, series_id: &str) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM fact_series WHERE series_id = ?1")
            .bind(series_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get::<i64, _>("n"))
    }

    /// Last overall trigger state saved by the watcher, if any.
    pub async fn last_overall_state(&self) -> Result<Option<TriggerState>> {
        let row = sqlx::query("SELECT value FROM state_tracking WHERE key = 'last_overall_state'")
            .fetch_optional(&self.pool)
            .await?;

        match row {
            None => Ok(None),
            Some(r) => {
                let raw: String = r.get("value");
                raw.parse()
                    .map(Some)
                    .map_err(|e: String| Error::Other(format!("corrupt state marker: {e}")))
            }
        }
    }

    /// Persist the latest overall trigger state for transition detection.
    pub async fn save_overall_state(&self, state: TriggerState) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO state_tracking (key, value, updated_at)
            VALUES ('last_overall_state', ?1, ?2)
            ON CONFLICT (key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(state.to_string())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn point_from_row(row: sqlx::sqlite::SqliteRow) -> Result<SeriesPoint> {
    let raw_ts: String = row.get("ts");
    let ts = DateTime::parse_from_rfc3339(&raw_ts)
        .map_err(|e| Error::Other(format!("corrupt timestamp '{raw_ts}': {e}")))?
        .with_timezone(&Utc);
    Ok(SeriesPoint {
        ts,
        value: row.get("value"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    async fn memory_store() -> Store {
        let store = Store::connect("sqlite::memory:").await.unwrap();
        store.init_schema().await.unwrap();
        store
    }

    fn pt(day: u32, value: f64) -> SeriesPoint {
        SeriesPoint {
            ts: Utc.with_ymd_and_hms(2025, 6, day, 0, 0, 0).unwrap(),
            value,
        }
    }

    #[tokio::test]
    async fn upsert_is_idempotent() {
        let store = memory_store().await;
        let points = vec![pt(1, 100.0), pt(2, 101.0)];

        store.upsert_points("RESERVES_USD", &points).await.unwrap();
        store.upsert_points("RESERVES_USD", &points).await.unwrap();

        assert_eq!(store.count("RESERVES_USD").await.unwrap(), 2);
        assert_eq!(
            store.latest("RESERVES_USD").await.unwrap().unwrap().value,
            101.0
        );
    }

    #[tokio::test]
    async fn upsert_overwrites_value_for_same_timestamp() {
        let store = memory_store().await;
        store.upsert_points("X", &[pt(1, 1.0)]).await.unwrap();
        store.upsert_points("X", &[pt(1, 2.0)]).await.unwrap();

        assert_eq!(store.count("X").await.unwrap(), 1);
        assert_eq!(store.latest("X").await.unwrap().unwrap().value, 2.0);
    }

    #[tokio::test]
    async fn at_or_before_returns_closest_prior_observation() {
        let store = memory_store().await;
        store
            .upsert_points("X", &[pt(1, 1.0), pt(10, 10.0), pt(20, 20.0)])
            .await
            .unwrap();

        let asof = Utc.with_ymd_and_hms(2025, 6, 15, 0, 0, 0).unwrap();
        let p = store.value_at_or_before("X", asof).await.unwrap().unwrap();
        assert_eq!(p.value, 10.0);
    }

    #[tokio::test]
    async fn load_series_is_chronological() {
        let store = memory_store().await;
        store
            .upsert_points("X", &[pt(3, 3.0), pt(1, 1.0), pt(2, 2.0)])
            .await
            .unwrap();

        let series = store.load_series("X", 100).await.unwrap();
        let values: Vec<f64> = series.points().iter().map(|p| p.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[tokio::test]
    async fn state_marker_round_trips() {
        let store = memory_store().await;
        assert!(store.last_overall_state().await.unwrap().is_none());

        store.save_overall_state(TriggerState::Yellow).await.unwrap();
        assert_eq!(
            store.last_overall_state().await.unwrap(),
            Some(TriggerState::Yellow)
        );

        store.save_overall_state(TriggerState::Red).await.unwrap();
        assert_eq!(
            store.last_overall_state().await.unwrap(),
            Some(TriggerState::Red)
        );
    }
}
