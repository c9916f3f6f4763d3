use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Gateway configuration.
///
/// The `Service` can be configured programmatically through its public
/// fields, or from the environment via [`GatewayConfig::load`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Address the HTTP listener binds to.
    pub bind_address: String,
    /// X.509 certificate for serving TLS. Requires `key_file`.
    pub cert_file: Option<PathBuf>,
    /// Private key for serving TLS. Requires `cert_file`.
    pub key_file: Option<PathBuf>,
    /// Expose the runtime variable dump at /debug/vars.
    pub expvar: bool,
    /// Expose the profiling routes under /debug/pprof.
    pub pprof: bool,
    /// Default per-request timeout when no `timeout` parameter is supplied.
    pub default_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:4001".to_string(),
            cert_file: None,
            key_file: None,
            expvar: false,
            pprof: false,
            default_timeout: Duration::from_secs(10),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let bind_address =
            std::env::var("GATEWAY_BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:4001".to_string());

        let cert_file = std::env::var("GATEWAY_CERT_FILE").ok().map(PathBuf::from);
        let key_file = std::env::var("GATEWAY_KEY_FILE").ok().map(PathBuf::from);

        let expvar = flag_var("GATEWAY_EXPVAR");
        let pprof = flag_var("GATEWAY_PPROF");

        let default_timeout = std::env::var("GATEWAY_REQUEST_TIMEOUT")
            .ok()
            .and_then(|s| humantime::parse_duration(&s).ok())
            .unwrap_or_else(|| Duration::from_secs(10));

        let config = GatewayConfig {
            bind_address,
            cert_file,
            key_file,
            expvar,
            pprof,
            default_timeout,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_address.is_empty() {
            return Err(ConfigError::ValidationError(
                "bind address cannot be empty".to_string(),
            ));
        }

        if self.cert_file.is_some() != self.key_file.is_some() {
            return Err(ConfigError::ValidationError(
                "cert_file and key_file must be set together".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether the listener should serve TLS.
    pub fn tls_enabled(&self) -> bool {
        self.cert_file.is_some() && self.key_file.is_some()
    }
}

fn flag_var(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default() {
        GatewayConfig::default().validate().unwrap();
    }

    #[test]
    fn test_validate_cert_without_key() {
        let config = GatewayConfig {
            cert_file: Some(PathBuf::from("/tmp/cert.pem")),
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(!config.tls_enabled());
    }

    #[test]
    fn test_tls_enabled() {
        let config = GatewayConfig {
            cert_file: Some(PathBuf::from("/tmp/cert.pem")),
            key_file: Some(PathBuf::from("/tmp/key.pem")),
            ..Default::default()
        };
        config.validate().unwrap();
        assert!(config.tls_enabled());
    }

    // The GATEWAY_* variables are process-global; this is the only test in
    // the binary that touches them.
    #[test]
    fn test_load_from_env() {
        std::env::set_var("GATEWAY_BIND_ADDRESS", "127.0.0.1:7001");
        std::env::set_var("GATEWAY_EXPVAR", "true");
        std::env::set_var("GATEWAY_PPROF", "0");
        std::env::set_var("GATEWAY_REQUEST_TIMEOUT", "30s");

        let config = GatewayConfig::load();

        std::env::remove_var("GATEWAY_BIND_ADDRESS");
        std::env::remove_var("GATEWAY_EXPVAR");
        std::env::remove_var("GATEWAY_PPROF");
        std::env::remove_var("GATEWAY_REQUEST_TIMEOUT");

        let config = config.unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:7001");
        assert!(config.expvar);
        assert!(!config.pprof);
        assert_eq!(config.default_timeout, Duration::from_secs(30));
        assert!(config.cert_file.is_none());
    }

    #[test]
    fn test_validate_empty_bind_address() {
        let config = GatewayConfig {
            bind_address: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
