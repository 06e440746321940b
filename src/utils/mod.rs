use dirs::home_dir;
use std::sync::Once;
use std::{env, path::PathBuf};

const DEFAULT_DIR_NAME: &str = ".intake";
const DRAFTS_DIR: &str = "drafts";
const LEADS_DIR: &str = "leads";

static TRACING_INIT: Once = Once::new();

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter =
            EnvFilter::from_default_env().add_directive("intake_core=info".parse().unwrap());

        fmt().with_env_filter(filter).init();
    });
}

/// Returns the application-specific data directory, defaulting to `~/.intake`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("INTAKE_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Directory holding stashed one-time restore drafts.
pub fn drafts_dir() -> PathBuf {
    app_data_dir().join(DRAFTS_DIR)
}

/// Directory where accepted lead records are written.
pub fn leads_dir() -> PathBuf {
    app_data_dir().join(LEADS_DIR)
}
