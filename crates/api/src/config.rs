use crate::auth::jwt::JwtConfig;

/// Plan-based capacity limits.
///
/// Exceeding one surfaces as `CAPACITY_EXCEEDED` with an upgrade
/// call-to-action, distinct from plain validation errors.
#[derive(Debug, Clone)]
pub struct PlanLimits {
    /// Maximum participants per workshop (default: `50`).
    pub max_participants_per_workshop: i64,
    /// Maximum workshops per facilitator (default: `20`).
    pub max_workshops_per_facilitator: i64,
}

/// Connection settings for the clustering model endpoint.
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    /// Base URL of an OpenAI-compatible API (default: `https://api.openai.com/v1`).
    pub base_url: String,
    /// API key; empty means clustering is effectively disabled upstream.
    pub api_key: String,
    /// Model name (default: `gpt-4o-mini`).
    pub model: String,
    /// Whole-request timeout in seconds (default: `60`).
    pub timeout_secs: u64,
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Interval between WebSocket heartbeat pings in seconds (default: `30`).
    pub ws_heartbeat_secs: u64,
    /// JWT token configuration (secret shared with the identity provider).
    pub jwt: JwtConfig,
    /// Plan capacity limits.
    pub limits: PlanLimits,
    /// Clustering model endpoint settings.
    pub cluster: ClusterConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                        |
    /// |-------------------------------|--------------------------------|
    /// | `HOST`                        | `0.0.0.0`                      |
    /// | `PORT`                        | `3000`                         |
    /// | `CORS_ORIGINS`                | `http://localhost:5173`        |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                           |
    /// | `SHUTDOWN_TIMEOUT_SECS`       | `30`                           |
    /// | `WS_HEARTBEAT_SECS`           | `30`                           |
    /// | `MAX_PARTICIPANTS_PER_WORKSHOP` | `50`                         |
    /// | `MAX_WORKSHOPS_PER_FACILITATOR` | `20`                         |
    /// | `CLUSTER_API_URL`             | `https://api.openai.com/v1`    |
    /// | `CLUSTER_API_KEY`             | empty                          |
    /// | `CLUSTER_MODEL`               | `gpt-4o-mini`                  |
    /// | `CLUSTER_TIMEOUT_SECS`        | `60`                           |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs = env_u64("REQUEST_TIMEOUT_SECS", 30);
        let shutdown_timeout_secs = env_u64("SHUTDOWN_TIMEOUT_SECS", 30);
        let ws_heartbeat_secs = env_u64("WS_HEARTBEAT_SECS", 30);

        let limits = PlanLimits {
            max_participants_per_workshop: env_u64("MAX_PARTICIPANTS_PER_WORKSHOP", 50) as i64,
            max_workshops_per_facilitator: env_u64("MAX_WORKSHOPS_PER_FACILITATOR", 20) as i64,
        };

        let cluster = ClusterConfig {
            base_url: std::env::var("CLUSTER_API_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".into()),
            api_key: std::env::var("CLUSTER_API_KEY").unwrap_or_default(),
            model: std::env::var("CLUSTER_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into()),
            timeout_secs: env_u64("CLUSTER_TIMEOUT_SECS", 60),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            ws_heartbeat_secs,
            jwt: JwtConfig::from_env(),
            limits,
            cluster,
        }
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .unwrap_or_else(|_| panic!("{name} must be a valid u64"))
}
