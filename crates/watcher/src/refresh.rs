use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{error, info, warn};

use common::{series_spec, Error, FetchRange, Result, SeriesPoint, REGISTRY};
use providers::{ndf, ProviderRouter};
use store::Store;

/// Refresh groups mirroring the CLI verbs. Each group names the logical
/// series it keeps fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshGroup {
    Fx,
    Reserves,
    Cpi,
    Embi,
    Ndf,
    Policy,
}

impl RefreshGroup {
    pub const ALL: [RefreshGroup; 6] = [
        RefreshGroup::Fx,
        RefreshGroup::Reserves,
        RefreshGroup::Cpi,
        RefreshGroup::Embi,
        RefreshGroup::Ndf,
        RefreshGroup::Policy,
    ];

    /// Series fetched through the provider router for this group. The NDF
    /// group is synthetic and handled separately.
    fn routed_series(self) -> &'static [&'static str] {
        match self {
            RefreshGroup::Fx => &[
                "USDARS_OFFICIAL",
                "USDARS_PARALLEL",
                "USDARS_OFFICIAL_BLUELYTICS",
            ],
            RefreshGroup::Reserves => &["RESERVES_USD"],
            RefreshGroup::Cpi => &["CPI_HEADLINE", "CPI_CORE"],
            RefreshGroup::Embi => &["EMBI_AR", "CDS_ARG_5Y_USD"],
            RefreshGroup::Policy => &["POLICY_RATE"],
            RefreshGroup::Ndf => &[],
        }
    }
}

impl std::fmt::Display for RefreshGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefreshGroup::Fx => write!(f, "fx"),
            RefreshGroup::Reserves => write!(f, "reserves"),
            RefreshGroup::Cpi => write!(f, "cpi"),
            RefreshGroup::Embi => write!(f, "embi"),
            RefreshGroup::Ndf => write!(f, "ndf"),
            RefreshGroup::Policy => write!(f, "policy"),
        }
    }
}

impl std::str::FromStr for RefreshGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fx" => Ok(RefreshGroup::Fx),
            "reserves" => Ok(RefreshGroup::Reserves),
            "cpi" => Ok(RefreshGroup::Cpi),
            "embi" => Ok(RefreshGroup::Embi),
            "ndf" => Ok(RefreshGroup::Ndf),
            "policy" => Ok(RefreshGroup::Policy),
            other => Err(format!("unknown refresh group '{other}'")),
        }
    }
}

/// Outcome of one refresh pass.
#[derive(Debug, Default)]
pub struct RefreshSummary {
    pub points_stored: usize,
    /// Series that could not be refreshed this pass, with the failure text.
    pub failures: Vec<(String, String)>,
}

/// Drives the provider router for every registered series and persists the
/// results. One series failing never aborts the rest of the pass; the
/// failure is recorded in the summary and the loop moves on.
pub struct Refresher {
    router: Arc<ProviderRouter>,
    store: Store,
    /// Assumed USD funding rate for the synthetic NDF parity leg.
    usd_rate: f64,
}

impl Refresher {
    const DEFAULT_USD_RATE: f64 = 0.05;

    pub fn new(router: Arc<ProviderRouter>, store: Store) -> Self {
        Self {
            router,
            store,
            usd_rate: Self::DEFAULT_USD_RATE,
        }
    }

    /// Refresh every group sequentially. Providers are queried one at a
    /// time; the router short-circuits on first success.
    pub async fn refresh_all(&self) -> Result<RefreshSummary> {
        self.store.upsert_meta(REGISTRY).await?;

        let mut summary = RefreshSummary::default();
        for group in RefreshGroup::ALL {
            self.refresh_group_into(group, &mut summary).await?;
        }

        if summary.failures.is_empty() {
            info!(points = summary.points_stored, "refresh complete");
        } else {
            warn!(
                points = summary.points_stored,
                failed = ?summary.failures.iter().map(|(s, _)| s).collect::<Vec<_>>(),
                "refresh completed with failures"
            );
        }
        Ok(summary)
    }

    /// Refresh a single group (CLI `refresh --group`).
    pub async fn refresh_group(&self, group: RefreshGroup) -> Result<RefreshSummary> {
        self.store.upsert_meta(REGISTRY).await?;
        let mut summary = RefreshSummary::default();
        self.refresh_group_into(group, &mut summary).await?;
        Ok(summary)
    }

    async fn refresh_group_into(
        &self,
        group: RefreshGroup,
        summary: &mut RefreshSummary,
    ) -> Result<()> {
        if group == RefreshGroup::Ndf {
            return self.refresh_ndf(summary).await;
        }

        let range = FetchRange::since(Utc::now() - Duration::days(400));
        for &series_id in group.routed_series() {
            debug_assert!(series_spec(series_id).is_some());
            match self.router.fetch(series_id, range).await {
                Ok(series) => {
                    let stored = self.store.upsert_points(series_id, series.points()).await?;
                    info!(series = series_id, points = stored, "series refreshed");
                    summary.points_stored += stored;
                }
                Err(e @ Error::ProvidersExhausted { .. }) => {
                    error!(series = series_id, error = %e, "series refresh failed");
                    summary.failures.push((series_id.to_string(), e.to_string()));
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Build the synthetic NDF curve from stored spot, rates and stress
    /// inputs. Skipped (recorded as a failure) when no spot is stored yet.
    async fn refresh_ndf(&self, summary: &mut RefreshSummary) -> Result<()> {
        let Some(spot) = self.store.latest("USDARS_OFFICIAL").await? else {
            summary
                .failures
                .push(("NDF".to_string(), "no spot rate stored".to_string()));
            return Ok(());
        };

        // Policy rate is published as an annualized percentage.
        let ars_rate = self
            .store
            .latest("POLICY_RATE")
            .await?
            .map(|p| p.value / 100.0);
        let usd_rate = ars_rate.map(|_| self.usd_rate);

        let cds = self.store.latest("CDS_ARG_5Y_USD").await?.map(|p| p.value);
        let embi = self.store.latest("EMBI_AR").await?.map(|p| p.value);
        let stress = ndf::state_multiplier(cds, embi);

        for tenor in ndf::TENORS {
            let value = ndf::synthetic_forward(spot.value, ars_rate, usd_rate, tenor, stress);
            let stored = self
                .store
                .upsert_points(tenor.series_id, &[SeriesPoint { ts: spot.ts, value }])
                .await?;
            summary.points_stored += stored;
        }
        info!(spot = spot.value, stress, "synthetic NDF curve refreshed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use common::{ProviderError, Series, SeriesProvider, TriggerState};

    struct OneSeriesProvider;

    #[async_trait]
    impl SeriesProvider for OneSeriesProvider {
        fn name(&self) -> &'static str {
            "FAKE"
        }

        async fn fetch(
            &self,
            series_id: &str,
            _range: FetchRange,
        ) -> std::result::Result<Series, ProviderError> {
            if series_id != "USDARS_OFFICIAL" {
                return Err(ProviderError::UnsupportedSeries(series_id.to_string()));
            }
            Ok(Series::new(
                series_id,
                vec![SeriesPoint {
                    ts: Utc::now(),
                    value: 1000.0,
                }],
            ))
        }
    }

    async fn memory_store() -> Store {
        let store = Store::connect("sqlite::memory:").await.unwrap();
        store.init_schema().await.unwrap();
        store
    }

    #[tokio::test]
    async fn one_failing_series_does_not_abort_the_pass() {
        let store = memory_store().await;
        let router = Arc::new(ProviderRouter::new(
            vec![Arc::new(OneSeriesProvider)],
            vec!["FAKE".to_string()],
        ));
        let refresher = Refresher::new(router, store.clone());

        let summary = refresher.refresh_group(RefreshGroup::Fx).await.unwrap();

        // USDARS_OFFICIAL stored; the other two FX series exhausted but recorded.
        assert_eq!(summary.points_stored, 1);
        assert_eq!(summary.failures.len(), 2);
        assert_eq!(store.count("USDARS_OFFICIAL").await.unwrap(), 1);

        // Nothing fabricated for the failed series.
        assert_eq!(store.count("USDARS_PARALLEL").await.unwrap(), 0);

        // State marker untouched by refresh.
        assert_eq!(store.last_overall_state().await.unwrap(), None::<TriggerState>);
    }

    #[tokio::test]
    async fn ndf_refresh_needs_a_stored_spot() {
        let store = memory_store().await;
        let router = Arc::new(ProviderRouter::new(vec![], vec![]));
        let refresher = Refresher::new(router, store.clone());

        let summary = refresher.refresh_group(RefreshGroup::Ndf).await.unwrap();
        assert_eq!(summary.points_stored, 0);
        assert_eq!(summary.failures.len(), 1);
    }

    #[tokio::test]
    async fn ndf_refresh_builds_four_tenors_from_spot() {
        let store = memory_store().await;
        store
            .upsert_points(
                "USDARS_OFFICIAL",
                &[SeriesPoint {
                    ts: Utc::now(),
                    value: 1000.0,
                }],
            )
            .await
            .unwrap();

        let router = Arc::new(ProviderRouter::new(vec![], vec![]));
        let refresher = Refresher::new(router, store.clone());
        let summary = refresher.refresh_group(RefreshGroup::Ndf).await.unwrap();

        assert_eq!(summary.points_stored, 4);
        let f1m = store.latest("NDF_1M").await.unwrap().unwrap().value;
        let f12m = store.latest("NDF_12M").await.unwrap().unwrap().value;
        assert!(f1m > 1000.0);
        assert!(f12m > f1m, "longer tenor carries more premium");
    }

    #[test]
    fn refresh_group_parses_cli_names() {
        assert_eq!("fx".parse::<RefreshGroup>().unwrap(), RefreshGroup::Fx);
        assert_eq!("ndf".parse::<RefreshGroup>().unwrap(), RefreshGroup::Ndf);
        assert!("bogus".parse::<RefreshGroup>().is_err());
    }
}
