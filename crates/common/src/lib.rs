pub mod config;
pub mod error;
pub mod provider;
pub mod registry;
pub mod types;

pub use config::Config;
pub use error::{Error, ProviderError, Result};
pub use provider::{FetchRange, SeriesProvider};
pub use registry::{series_spec, SeriesSpec, REGISTRY};
pub use types::*;
