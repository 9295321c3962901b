use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Engine configuration: transport endpoint and timing knobs.
///
/// Loaded from `config/sigma.toml` with `SIGMA_`-prefixed environment
/// overrides; the defaults cover local use.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Hostname or IP the verifier binds and the prover dials.
    pub host: String,
    /// Port number.
    pub port: u16,
    /// Per-move timeout in seconds on the prover side.
    pub timeout_secs: u64,
    /// Idle session lifetime in seconds on the verifier side.
    pub session_ttl_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 50051,
            timeout_secs: 10,
            session_ttl_secs: 300,
        }
    }
}

impl EngineConfig {
    /// Loads configuration from the TOML file and environment variables.
    ///
    /// Configuration priority: environment variables > TOML file > defaults.
    #[allow(clippy::result_large_err)]
    pub fn from_env() -> figment::error::Result<Self> {
        use figment::providers::{Env, Format, Serialized, Toml};
        use figment::Figment;

        Figment::from(Serialized::defaults(EngineConfig::default()))
            .merge(Toml::file("config/sigma.toml"))
            .merge(Env::prefixed("SIGMA_"))
            .extract()
    }

    /// The socket address the verifier listens on.
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port).parse().map_err(|_| {
            Error::InvalidParams(format!(
                "invalid listen address {}:{}",
                self.host, self.port
            ))
        })
    }

    /// The endpoint URL the prover dials.
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Bound on each prover-side exchange.
    pub fn move_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Verifier-side idle session lifetime.
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_give_a_valid_listen_addr() {
        let config = EngineConfig::default();
        assert!(config.listen_addr().is_ok());
        assert_eq!(config.endpoint(), "http://127.0.0.1:50051");
    }

    #[test]
    fn bad_host_is_rejected() {
        let config = EngineConfig {
            host: "not a host".to_string(),
            ..EngineConfig::default()
        };
        assert!(config.listen_addr().is_err());
    }
}
