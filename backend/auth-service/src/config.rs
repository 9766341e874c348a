/// Configuration management
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub server_host: String,
    #[serde(default = "default_port")]
    pub server_port: u16,
    pub database_url: String,
    /// Shared HMAC secret; every verifying service must hold the same value.
    pub jwt_secret_key: String,
    /// Pre-shared key gating internal-token issuance. Distinct from the
    /// signing secret on purpose: leaking it only allows minting tokens
    /// with the fixed INTERNAL_SERVICE role, never arbitrary users.
    pub internal_api_key: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }
}
