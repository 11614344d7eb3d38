/// All configuration loaded from environment variables at startup.
/// Missing required variables cause an immediate panic with a clear message.
#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_url: String,

    // Provider routing
    /// Comma-separated provider precedence, e.g. "BCRA,INDEC,BLUELYTICS,YAHOOFX".
    pub preferred_providers: Vec<String>,
    pub bcra_api_base: String,
    pub indec_api_base: String,
    /// Reserved for the TradingEconomics forward-curve route ("user:token" format).
    pub trading_econ_api_key: Option<String>,

    // Watcher
    pub watch_interval_secs: u64,

    // Dashboard API
    pub api_port: u16,

    // Gate thresholds file path
    pub gates_config_path: String,
}

pub const DEFAULT_PROVIDER_ORDER: &str = "BCRA,INDEC,BLUELYTICS,YAHOOFX";

const DEFAULT_BCRA_BASE: &str = "https://api.bcra.gob.ar/estadisticas/v4.0/Monetarias";
const DEFAULT_INDEC_BASE: &str = "https://apis.datos.gob.ar/series/api/series";

impl Config {
    /// Load all configuration from environment variables.
    /// Loads `.env` if present. Panics on any missing required variable.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        let preferred_providers = optional_env("PREFERRED_PROVIDERS")
            .unwrap_or_else(|| DEFAULT_PROVIDER_ORDER.to_string())
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();

        Config {
            database_url: required_env("DATABASE_URL"),
            preferred_providers,
            bcra_api_base: optional_env("BCRA_API_BASE")
                .unwrap_or_else(|| DEFAULT_BCRA_BASE.to_string()),
            indec_api_base: optional_env("INDEC_API_BASE")
                .unwrap_or_else(|| DEFAULT_INDEC_BASE.to_string()),
            trading_econ_api_key: optional_env("TRADING_ECON_API_KEY"),
            watch_interval_secs: optional_env("WATCH_INTERVAL_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(600),
            api_port: optional_env("API_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            gates_config_path: optional_env("GATES_CONFIG_PATH")
                .unwrap_or_else(|| "config/gates.toml".to_string()),
        }
    }
}

fn required_env(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| {
        panic!("Required environment variable '{key}' is not set. Check your .env file.")
    })
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
