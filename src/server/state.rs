//! Application state management

use crate::serving::ServingContext;

use super::ServerConfig;

/// Application state shared across handlers.
///
/// Built once before the listener starts; handlers only read it.
pub struct AppState {
    pub config: ServerConfig,
    pub serving: ServingContext,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    /// Load every artifact named by `config`.
    pub fn load(config: ServerConfig) -> Self {
        let serving = ServingContext::load(&config.artifact_paths());
        Self::with_serving(config, serving)
    }

    pub fn with_serving(config: ServerConfig, serving: ServingContext) -> Self {
        Self {
            config,
            serving,
            started_at: chrono::Utc::now(),
        }
    }

    pub fn uptime_secs(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }
}
