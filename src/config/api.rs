//! Lost Ark open-API configuration constants and types.

/// Configuration for the market REST client
/// (This is the runtime struct used by the Http Client)
pub struct MarketApiConfig {
    pub timeout_ms: u64,
    pub retries: u32,
    pub backoff_ms: u64,
}

impl Default for MarketApiConfig {
    fn default() -> Self {
        Self {
            timeout_ms: API.client.timeout_ms,
            retries: API.client.retries,
            backoff_ms: API.client.backoff_ms,
        }
    }
}

/// Configuration for REST API limits
pub struct RestLimits {
    /// Pause between consecutive market queries (the API rate-limits per minute)
    pub request_pause_ms: u64,
    /// Maximum number of pages to walk for a paged (grade-filtered) query
    pub max_pages: u32,
}

/// Default values for the Rest Client
pub struct ClientDefaults {
    pub timeout_ms: u64,
    pub retries: u32,
    pub backoff_ms: u64,
}

/// The Master Configuration Struct
pub struct ApiConfig {
    pub base_url: &'static str,
    /// Environment variable holding the bearer token
    pub key_env_var: &'static str,
    pub limits: RestLimits,
    pub client: ClientDefaults,
}

pub const API: ApiConfig = ApiConfig {
    base_url: "https://developer-lostark.game.onstove.com",
    key_env_var: "LOSTARK_API_KEY",
    limits: RestLimits {
        request_pause_ms: 150,
        max_pages: 10,
    },
    client: ClientDefaults {
        timeout_ms: 5000,
        retries: 3,
        backoff_ms: 2000,
    },
};
