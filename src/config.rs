use std::net::Ipv4Addr;
use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

use crate::normalize::DefaultPolicy;

/// Candidate upstream base URLs, probed in this order.
pub const DEFAULT_ENDPOINTS: &[&str] = &[
    "https://ff.garena.com/api/player",
    "https://freefire.garena.com/api/player",
    "https://api.garena.com/freefire/player",
    "https://mshop.garenanow.com/api/shop/apps/roles",
    "https://mshop.garenanow.com/api/auth/player_id_login",
    "https://mshop.garenanow.com/api/shop/pay/init",
    "https://mshop.garenanow.com/api/player",
    "https://ff.garena.com/api/v1/player",
    "https://freefire.garena.com/api/v1/player",
    "https://ff.garena.com/player",
    "https://freefire.garena.com/player",
    "https://garena.com/freefire/player",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not valid: {reason}")]
    Invalid { var: &'static str, reason: String },
    #[error("UPSTREAM_ENDPOINTS contains no endpoints")]
    NoEndpoints,
    #[error("endpoint `{0}` is not an absolute http(s) URL")]
    BadEndpoint(String),
}

/// Browser-like request headers sent with every upstream probe.
/// Upstreams reject requests that do not look like they came from the web shop.
#[derive(Debug, Clone)]
pub struct HeaderTemplate {
    pub headers: Vec<(&'static str, String)>,
}

impl Default for HeaderTemplate {
    fn default() -> Self {
        let headers = [
            (
                "user-agent",
                concat!(
                    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 ",
                    "(KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                ),
            ),
            ("accept", "application/json, text/plain, */*"),
            ("accept-language", "en-US,en;q=0.9"),
            ("connection", "keep-alive"),
            ("sec-fetch-dest", "empty"),
            ("sec-fetch-mode", "cors"),
            ("sec-fetch-site", "cross-site"),
            ("origin", "https://freefire.garena.com"),
            ("referer", "https://freefire.garena.com/"),
            ("x-requested-with", "XMLHttpRequest"),
        ];

        Self {
            headers: headers
                .into_iter()
                .map(|(name, value)| (name, value.to_string()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: Ipv4Addr,
    pub port: u16,
    pub endpoints: Vec<String>,
    pub headers: HeaderTemplate,
    pub probe_timeout: Duration,
    pub connectivity_timeout: Duration,
    pub connectivity_sample: usize,
    pub max_concurrent_probes: usize,
    pub allowed_origins: AllowedOrigins,
    pub frontend_url: Option<String>,
    pub static_dir: Option<String>,
    pub policy: DefaultPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::UNSPECIFIED,
            port: 3000,
            endpoints: DEFAULT_ENDPOINTS.iter().map(|e| e.to_string()).collect(),
            headers: HeaderTemplate::default(),
            probe_timeout: Duration::from_secs(10),
            connectivity_timeout: Duration::from_secs(5),
            connectivity_sample: 3,
            max_concurrent_probes: 64,
            allowed_origins: AllowedOrigins::List(vec!["http://localhost:3000".to_string()]),
            frontend_url: None,
            static_dir: None,
            policy: DefaultPolicy::Neutral,
        }
    }
}

impl Config {
    /// Reads configuration from the process environment (after `.env` has been loaded).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Unset or blank keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Config::default();

        if let Some(host) = get("HOST") {
            config.host = host.parse().map_err(|_| ConfigError::Invalid {
                var: "HOST",
                reason: format!("`{host}` is not an IPv4 address"),
            })?;
        }

        if let Some(port) = get("PORT") {
            config.port = parse_positive("PORT", &port)?;
        }

        if let Some(raw) = get("UPSTREAM_ENDPOINTS") {
            config.endpoints = raw.split(',').map(str::to_string).collect();
        }
        config.endpoints = clean_endpoints(config.endpoints)?;

        if let Some(secs) = get("PROBE_TIMEOUT_SECS") {
            config.probe_timeout =
                Duration::from_secs(parse_positive("PROBE_TIMEOUT_SECS", &secs)?);
        }

        if let Some(secs) = get("CONNECTIVITY_TIMEOUT_SECS") {
            config.connectivity_timeout =
                Duration::from_secs(parse_positive("CONNECTIVITY_TIMEOUT_SECS", &secs)?);
        }

        if let Some(n) = get("CONNECTIVITY_SAMPLE") {
            config.connectivity_sample = parse_positive("CONNECTIVITY_SAMPLE", &n)?;
        }

        if let Some(n) = get("MAX_CONCURRENT_PROBES") {
            config.max_concurrent_probes = parse_positive("MAX_CONCURRENT_PROBES", &n)?;
        }

        if let Some(origins) = get("CORS_ALLOWED_ORIGINS") {
            config.allowed_origins = parse_origins(&origins);
        }

        config.frontend_url = get("FRONTEND_URL");
        config.static_dir = get("STATIC_DIR");

        if let Some(policy) = get("MISSING_FIELD_POLICY") {
            config.policy = policy.parse().map_err(|reason| ConfigError::Invalid {
                var: "MISSING_FIELD_POLICY",
                reason,
            })?;
        }

        Ok(config)
    }
}

fn parse_positive<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match raw.parse::<T>() {
        Ok(n) if n > T::default() => Ok(n),
        _ => Err(ConfigError::Invalid {
            var,
            reason: format!("`{raw}` is not a positive number"),
        }),
    }
}

/// Trims, validates and de-duplicates endpoints while keeping first-seen order.
fn clean_endpoints(raw: Vec<String>) -> Result<Vec<String>, ConfigError> {
    let mut endpoints: Vec<String> = Vec::with_capacity(raw.len());

    for entry in raw {
        let entry = entry.trim().trim_end_matches('/').to_string();
        if entry.is_empty() {
            continue;
        }

        match Url::parse(&entry) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
            _ => return Err(ConfigError::BadEndpoint(entry)),
        }

        if !endpoints.contains(&entry) {
            endpoints.push(entry);
        }
    }

    if endpoints.is_empty() {
        return Err(ConfigError::NoEndpoints);
    }

    Ok(endpoints)
}

fn parse_origins(raw: &str) -> AllowedOrigins {
    let origins: Vec<String> = raw
        .split(',')
        .map(|o| o.trim().trim_end_matches('/').to_string())
        .filter(|o| !o.is_empty())
        .collect();

    if origins.iter().any(|o| o == "*") {
        AllowedOrigins::Any
    } else {
        AllowedOrigins::List(origins)
    }
}
