//! REST server configuration.

use axum::http::HeaderValue;

pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:8000";

/// Origins of the local frontend dev servers.
pub const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "http://localhost",
    "http://127.0.0.1:5173",
];

/// Server settings resolved at startup.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    addr: String,
    cors_origins: Vec<HeaderValue>,
}

impl ServerConfig {
    /// Build a configuration from optional raw values.
    ///
    /// `cors_origins` is a comma-separated list; blank entries are ignored and a missing or
    /// blank list falls back to [`DEFAULT_CORS_ORIGINS`].
    ///
    /// # Errors
    ///
    /// Returns an error if an origin is not a valid header value.
    pub fn from_values(addr: Option<String>, cors_origins: Option<String>) -> anyhow::Result<Self> {
        let addr = addr
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| DEFAULT_REST_ADDR.to_string());

        let mut origins: Vec<String> = cors_origins
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();
        if origins.is_empty() {
            origins = DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect();
        }

        let cors_origins = origins
            .iter()
            .map(|o| {
                HeaderValue::from_str(o)
                    .map_err(|e| anyhow::anyhow!("invalid CORS origin '{o}': {e}"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Self { addr, cors_origins })
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn cors_origins(&self) -> &[HeaderValue] {
        &self.cors_origins
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_REST_ADDR.to_string(),
            cors_origins: DEFAULT_CORS_ORIGINS
                .iter()
                .map(|o| HeaderValue::from_static(o))
                .collect(),
        }
    }
}
