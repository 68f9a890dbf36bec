/// Configuration management for the quorum resolver
use crate::{
    error::{ResolverError, ResolverResult},
    identity::FanOut,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;

/// Main service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub service: ServiceConfig,
    pub resolver: ResolverConfig,
    pub discovery: DiscoveryConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
}

/// Resolution behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    pub did_method: String,
    /// Fixed resolution endpoint (direct mode)
    pub resolver_url: Option<String>,
    pub fan_out: FanOut,
    /// Query a random subset of this many endpoints instead of all of them
    pub selection_count: Option<usize>,
}

/// Where endpoints come from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DiscoveryConfig {
    Static {
        endpoints: HashMap<String, Vec<String>>,
    },
    Consortium,
}

/// Outbound HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> ResolverResult<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from any variable source
    pub fn from_lookup<F>(var: F) -> ResolverResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let hostname = var("RESOLVER_HOSTNAME").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = var("RESOLVER_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse()
            .map_err(|_| ResolverError::Validation("Invalid port number".to_string()))?;

        let did_method = var("RESOLVER_DID_METHOD").unwrap_or_else(|| "bloc".to_string());
        let resolver_url = var("RESOLVER_URL").filter(|s| !s.is_empty());
        let fan_out = match var("RESOLVER_FAN_OUT").as_deref() {
            None | Some("sequential") => FanOut::Sequential,
            Some("concurrent") => FanOut::Concurrent,
            Some(other) => {
                return Err(ResolverError::Validation(format!(
                    "Invalid fan-out mode: {}",
                    other
                )))
            }
        };
        let selection_count = var("RESOLVER_SELECTION_COUNT")
            .map(|v| {
                v.parse::<usize>().map_err(|_| {
                    ResolverError::Validation(format!("Invalid selection count: {}", v))
                })
            })
            .transpose()?;

        let discovery = match var("RESOLVER_DISCOVERY").as_deref() {
            None | Some("static") => DiscoveryConfig::Static {
                endpoints: parse_static_endpoints(
                    &var("RESOLVER_STATIC_ENDPOINTS").unwrap_or_default(),
                )?,
            },
            Some("consortium") => DiscoveryConfig::Consortium,
            Some(other) => {
                return Err(ResolverError::Validation(format!(
                    "Invalid discovery type: {}",
                    other
                )))
            }
        };

        let user_agent = var("RESOLVER_HTTP_USER_AGENT")
            .unwrap_or_else(|| format!("quorum-resolver/{}", env!("CARGO_PKG_VERSION")));
        let timeout_secs = var("RESOLVER_HTTP_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        let log_level = var("RUST_LOG").unwrap_or_else(|| "info".to_string());

        Ok(AppConfig {
            service: ServiceConfig { hostname, port },
            resolver: ResolverConfig {
                did_method,
                resolver_url,
                fan_out,
                selection_count,
            },
            discovery,
            http: HttpConfig {
                user_agent,
                timeout_secs,
            },
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> ResolverResult<()> {
        if self.service.hostname.is_empty() {
            return Err(ResolverError::Validation("Hostname cannot be empty".to_string()));
        }

        if self.resolver.did_method.is_empty() || self.resolver.did_method.contains(':') {
            return Err(ResolverError::Validation(format!(
                "Invalid DID method: {:?}",
                self.resolver.did_method
            )));
        }

        if let Some(url) = &self.resolver.resolver_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ResolverError::Validation(format!(
                    "Resolver URL must be http(s): {}",
                    url
                )));
            }
        }

        if self.resolver.selection_count == Some(0) {
            return Err(ResolverError::Validation(
                "Selection count must be at least 1".to_string(),
            ));
        }

        if self.http.timeout_secs == 0 {
            return Err(ResolverError::Validation(
                "HTTP timeout must be at least 1 second".to_string(),
            ));
        }

        Ok(())
    }
}

/// Parse `domain=url1,url2;domain2=url3`
fn parse_static_endpoints(raw: &str) -> ResolverResult<HashMap<String, Vec<String>>> {
    let mut endpoints: HashMap<String, Vec<String>> = HashMap::new();

    for group in raw.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        let (domain, urls) = group.split_once('=').ok_or_else(|| {
            ResolverError::Validation(format!("Invalid static endpoint entry: {}", group))
        })?;

        endpoints.entry(domain.trim().to_string()).or_default().extend(
            urls.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
        );
    }

    Ok(endpoints)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.service.port, 8080);
        assert_eq!(config.resolver.did_method, "bloc");
        assert_eq!(config.resolver.fan_out, FanOut::Sequential);
        assert!(config.resolver.resolver_url.is_none());
        assert!(matches!(config.discovery, DiscoveryConfig::Static { ref endpoints } if endpoints.is_empty()));
        config.validate().unwrap();
    }

    #[test]
    fn test_static_endpoints() {
        let config = AppConfig::from_lookup(lookup(&[
            (
                "RESOLVER_STATIC_ENDPOINTS",
                "example.com=https://a.example.com, https://b.example.com;other.org=https://o.org",
            ),
            ("RESOLVER_FAN_OUT", "concurrent"),
            ("RESOLVER_SELECTION_COUNT", "2"),
        ]))
        .unwrap();

        let DiscoveryConfig::Static { endpoints } = &config.discovery else {
            panic!("expected static discovery");
        };
        assert_eq!(
            endpoints["example.com"],
            vec!["https://a.example.com", "https://b.example.com"]
        );
        assert_eq!(endpoints["other.org"], vec!["https://o.org"]);
        assert_eq!(config.resolver.fan_out, FanOut::Concurrent);
        assert_eq!(config.resolver.selection_count, Some(2));
    }

    #[test]
    fn test_invalid_values() {
        assert!(AppConfig::from_lookup(lookup(&[("RESOLVER_PORT", "http")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("RESOLVER_FAN_OUT", "majority")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("RESOLVER_STATIC_ENDPOINTS", "example.com")])).is_err());

        let config = AppConfig::from_lookup(lookup(&[("RESOLVER_SELECTION_COUNT", "0")])).unwrap();
        assert!(config.validate().is_err());

        let config = AppConfig::from_lookup(lookup(&[("RESOLVER_URL", "ftp://resolver")])).unwrap();
        assert!(config.validate().is_err());
    }
}
