//! Explicit client configuration: API location, page size and the route
//! prefixes a routing middleware guards.
use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

fn default_base_url() -> String {
    "https://api.ananbada.store".to_string()
}

fn default_page_size() -> u32 {
    12
}

fn default_with_credentials() -> bool {
    true
}

fn default_auth_paths() -> Vec<String> {
    vec!["/login".to_string(), "/signup".to_string()]
}

fn default_protected_paths() -> Vec<String> {
    ["/cart", "/booking", "/bookingList", "/bookingResult"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Everything the feed and its HTTP collaborator need at construction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedConfig {
    /// Scheme and host of the booking API, without a trailing path.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Items requested per listing page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Keep cookies between requests.
    #[serde(default = "default_with_credentials")]
    pub with_credentials: bool,
    /// Pages only meant for signed-out users.
    #[serde(default = "default_auth_paths")]
    pub auth_paths: Vec<String>,
    /// Pages that require a signed-in user.
    #[serde(default = "default_protected_paths")]
    pub protected_paths: Vec<String>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_size: default_page_size(),
            with_credentials: default_with_credentials(),
            auth_paths: default_auth_paths(),
            protected_paths: default_protected_paths(),
        }
    }
}

impl FeedConfig {
    /// Parse a YAML document; absent fields keep their defaults.
    pub fn from_yaml_str(raw: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(raw).context("parse feed config")?;
        if config.page_size == 0 {
            anyhow::bail!("page_size must be positive");
        }
        Ok(config)
    }

    /// Read and parse a YAML file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config at {}", path.display()))?;
        Self::from_yaml_str(&raw)
    }
}

/// How a routing middleware should treat a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// Login/signup pages.
    Auth,
    /// Pages behind a session.
    Protected,
    /// Everything else.
    Public,
}

impl RouteAccess {
    /// Classify `path` against the configured prefixes.
    ///
    /// A prefix matches the path itself or any sub-path, so `/booking`
    /// covers `/booking/12` but not `/bookingList`.
    pub fn classify(config: &FeedConfig, path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        if config.auth_paths.iter().any(|p| prefix_matches(p, path)) {
            Self::Auth
        } else if config.protected_paths.iter().any(|p| prefix_matches(p, path)) {
            Self::Protected
        } else {
            Self::Public
        }
    }
}

fn prefix_matches(prefix: &str, path: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
