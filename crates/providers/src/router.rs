use std::sync::Arc;

use tracing::{info, warn};

use common::{Error, FetchRange, ProviderError, Result, Series, SeriesProvider};

/// Ordered-fallback router over the provider adapters.
///
/// For each fetch the configured provider order is walked once: the first
/// adapter returning a non-empty series wins and later adapters are never
/// called. Failing or empty providers are logged and bypassed, not retried.
/// When the whole list is exhausted the caller gets
/// `Error::ProvidersExhausted` — never fabricated data.
pub struct ProviderRouter {
    adapters: Vec<Arc<dyn SeriesProvider>>,
    order: Vec<String>,
}

impl ProviderRouter {
    pub fn new(adapters: Vec<Arc<dyn SeriesProvider>>, order: Vec<String>) -> Self {
        Self { adapters, order }
    }

    fn adapter(&self, name: &str) -> Option<&Arc<dyn SeriesProvider>> {
        self.adapters.iter().find(|a| a.name() == name)
    }

    /// Fetch a logical series through the fallback chain.
    pub async fn fetch(&self, series_id: &str, range: FetchRange) -> Result<Series> {
        let mut tried = Vec::new();
        let mut last_error: Option<ProviderError> = None;

        for name in &self.order {
            let Some(adapter) = self.adapter(name) else {
                // Names in PREFERRED_PROVIDERS that no adapter claims are
                // skipped silently, matching the configured-order contract.
                continue;
            };
            tried.push(name.clone());

            match adapter.fetch(series_id, range).await {
                Ok(series) if !series.is_empty() => {
                    info!(
                        provider = name.as_str(),
                        series = series_id,
                        points = series.len(),
                        "provider fetch succeeded"
                    );
                    return Ok(series);
                }
                Ok(_) => {
                    warn!(
                        provider = name.as_str(),
                        series = series_id,
                        "provider returned empty series, trying next"
                    );
                    last_error = Some(ProviderError::Empty);
                }
                Err(ProviderError::UnsupportedSeries(_)) => {
                    // Not an error worth alarming on: this adapter simply
                    // does not carry the series.
                    info!(
                        provider = name.as_str(),
                        series = series_id,
                        "series not supported by provider, trying next"
                    );
                }
                Err(e) => {
                    warn!(
                        provider = name.as_str(),
                        series = series_id,
                        error = %e,
                        "provider fetch failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(Error::ProvidersExhausted {
            series: series_id.to_string(),
            tried,
            last: last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use common::SeriesPoint;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted adapter counting how often it was asked.
    struct FakeProvider {
        name: &'static str,
        outcome: Outcome,
        calls: AtomicUsize,
    }

    enum Outcome {
        Points(usize),
        Fail,
        Empty,
    }

    impl FakeProvider {
        fn new(name: &'static str, outcome: Outcome) -> Arc<Self> {
            Arc::new(Self {
                name,
                outcome,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SeriesProvider for FakeProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn fetch(
            &self,
            series_id: &str,
            _range: FetchRange,
        ) -> Result<Series, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.outcome {
                Outcome::Points(n) => {
                    let points = (0..n)
                        .map(|i| SeriesPoint {
                            ts: Utc::now() - chrono::Duration::days(i as i64),
                            value: 100.0 + i as f64,
                        })
                        .collect();
                    Ok(Series::new(series_id, points))
                }
                Outcome::Fail => Err(ProviderError::Network("connection refused".into())),
                Outcome::Empty => Err(ProviderError::Empty),
            }
        }
    }

    fn router(adapters: Vec<Arc<FakeProvider>>, order: &[&str]) -> ProviderRouter {
        ProviderRouter::new(
            adapters
                .into_iter()
                .map(|a| a as Arc<dyn SeriesProvider>)
                .collect(),
            order.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[tokio::test]
    async fn first_successful_provider_short_circuits() {
        let a = FakeProvider::new("A", Outcome::Points(3));
        let b = FakeProvider::new("B", Outcome::Points(5));
        let r = router(vec![a.clone(), b.clone()], &["A", "B"]);

        let series = r.fetch("USDARS_OFFICIAL", FetchRange::default()).await.unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(a.calls(), 1);
        assert_eq!(b.calls(), 0, "later provider must not be invoked");
    }

    #[tokio::test]
    async fn failing_provider_is_bypassed_not_retried() {
        let a = FakeProvider::new("A", Outcome::Fail);
        let b = FakeProvider::new("B", Outcome::Points(2));
        let r = router(vec![a.clone(), b.clone()], &["A", "B"]);

        let series = r.fetch("RESERVES_USD", FetchRange::default()).await.unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(a.calls(), 1, "no retry against a failing provider");
        assert_eq!(b.calls(), 1);
    }

    #[tokio::test]
    async fn empty_result_falls_through() {
        let a = FakeProvider::new("A", Outcome::Empty);
        let b = FakeProvider::new("B", Outcome::Points(1));
        let r = router(vec![a, b.clone()], &["A", "B"]);

        let series = r.fetch("CPI_CORE", FetchRange::default()).await.unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(b.calls(), 1);
    }

    #[tokio::test]
    async fn exhaustion_surfaces_aggregate_error() {
        let a = FakeProvider::new("A", Outcome::Fail);
        let b = FakeProvider::new("B", Outcome::Empty);
        let r = router(vec![a, b], &["A", "B"]);

        let err = r.fetch("EMBI_AR", FetchRange::default()).await.unwrap_err();
        match err {
            Error::ProvidersExhausted { series, tried, last } => {
                assert_eq!(series, "EMBI_AR");
                assert_eq!(tried, vec!["A".to_string(), "B".to_string()]);
                assert!(matches!(last, Some(ProviderError::Empty)));
            }
            other => panic!("expected ProvidersExhausted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_names_in_order_are_skipped() {
        let b = FakeProvider::new("B", Outcome::Points(1));
        let r = router(vec![b.clone()], &["NOPE", "B"]);

        let series = r.fetch("USDARS_PARALLEL", FetchRange::default()).await.unwrap();
        assert_eq!(series.len(), 1);
    }

    #[tokio::test]
    async fn order_controls_precedence() {
        let a = FakeProvider::new("A", Outcome::Points(3));
        let b = FakeProvider::new("B", Outcome::Points(5));
        let r = router(vec![a.clone(), b.clone()], &["B", "A"]);

        let series = r.fetch("USDARS_OFFICIAL", FetchRange::default()).await.unwrap();
        assert_eq!(series.len(), 5);
        assert_eq!(a.calls(), 0);
    }
}
