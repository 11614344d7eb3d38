pub mod bcra;
pub mod bluelytics;
pub mod indec;
pub mod ndf;
pub mod router;
pub mod yahoo;

pub use bcra::BcraProvider;
pub use bluelytics::BluelyticsProvider;
pub use indec::IndecProvider;
pub use router::ProviderRouter;
pub use yahoo::YahooFxProvider;

use std::sync::Arc;
use std::time::Duration;

use common::{Config, SeriesProvider};

/// Per-HTTP-call timeout shared by all adapters.
pub(crate) const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .use_rustls_tls()
        .timeout(HTTP_TIMEOUT)
        .build()
        .expect("Failed to build HTTP client")
}

/// Build the full adapter set and the router over it, ordered by
/// `config.preferred_providers`.
pub fn build_router(config: &Config) -> ProviderRouter {
    let adapters: Vec<Arc<dyn SeriesProvider>> = vec![
        Arc::new(BcraProvider::new(&config.bcra_api_base)),
        Arc::new(IndecProvider::new(&config.indec_api_base)),
        Arc::new(BluelyticsProvider::new()),
        Arc::new(YahooFxProvider::new()),
    ];
    ProviderRouter::new(adapters, config.preferred_providers.clone())
}
