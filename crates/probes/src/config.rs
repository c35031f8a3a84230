//! Probe configuration
//!
//! Everything a probe needs is carried in an explicit [`ProbeConfig`] built
//! once at process start. Environment lookups only happen in
//! [`ProbeConfig::from_env`]; the probes themselves never read the
//! environment.

use std::time::Duration;

use clap::ValueEnum;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{ProbeError, ProbeResult};

/// Environment variable naming the remote WebDriver endpoint
pub const SELENIUM_URL_ENV: &str = "SELENIUM_URL";

/// Environment variable naming the base URL of the service under health check
pub const BASE_URL_ENV: &str = "BASE_URL";

pub const DEFAULT_SELENIUM_URL: &str = "http://localhost:4444/wd/hub";
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_TARGET_URL: &str = "https://example.com";
pub const DEFAULT_EXPECTED_TITLE: &str = "Example Domain";

/// How much a probe asserts beyond its primary check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Strictness {
    /// Browser: heading text must be non-empty. Health: payload `status` must be `ok`.
    Strict,
    /// Browser: title check only. Health: status code only.
    Loose,
}

impl Strictness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strictness::Strict => "strict",
            Strictness::Loose => "loose",
        }
    }
}

/// How browser capabilities are declared when creating a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CapabilityStyle {
    /// W3C `capabilities.alwaysMatch` only
    OptionsOnly,
    /// W3C capabilities plus a `desiredCapabilities` descriptor
    Legacy,
}

/// Configuration for the browser title probe
#[derive(Debug, Clone)]
pub struct BrowserProbeConfig {
    /// Remote WebDriver endpoint (Selenium Grid hub or a driver)
    pub selenium_url: String,

    /// Page the browser is sent to
    pub target_url: String,

    /// Substring the page title must contain
    pub expected_title: String,

    /// Tag name of the element that must be present
    pub heading_tag: String,

    /// Upper bound for each wait condition
    pub wait_timeout: Duration,

    /// Delay between condition checks
    pub poll_interval: Duration,

    pub strictness: Strictness,

    pub capabilities: CapabilityStyle,

    /// Arguments passed to Chrome
    pub browser_args: Vec<String>,
}

impl Default for BrowserProbeConfig {
    fn default() -> Self {
        Self {
            selenium_url: DEFAULT_SELENIUM_URL.to_string(),
            target_url: DEFAULT_TARGET_URL.to_string(),
            expected_title: DEFAULT_EXPECTED_TITLE.to_string(),
            heading_tag: "h1".to_string(),
            wait_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(500),
            strictness: Strictness::Strict,
            capabilities: CapabilityStyle::OptionsOnly,
            browser_args: default_browser_args(),
        }
    }
}

/// Headless, with sandboxing and /dev/shm usage disabled for containers
pub fn default_browser_args() -> Vec<String> {
    ["--headless=new", "--no-sandbox", "--disable-dev-shm-usage"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Configuration for the health endpoint probe
#[derive(Debug, Clone)]
pub struct HealthProbeConfig {
    /// Base URL of the service
    pub base_url: String,

    /// Path appended to the base URL
    pub path: String,

    /// Timeout for the whole request
    pub request_timeout: Duration,

    pub strictness: Strictness,
}

impl Default for HealthProbeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            path: "/health".to_string(),
            request_timeout: Duration::from_secs(5),
            strictness: Strictness::Loose,
        }
    }
}

impl HealthProbeConfig {
    /// Full URL of the health endpoint
    pub fn health_url(&self) -> ProbeResult<Url> {
        let base = self.base_url.trim_end_matches('/');
        let path = self.path.trim_start_matches('/');
        let joined = format!("{}/{}", base, path);
        Url::parse(&joined)
            .map_err(|e| ProbeError::InvalidConfig(format!("health url {}: {}", joined, e)))
    }
}

/// Configuration for a full probe run
#[derive(Debug, Clone, Default)]
pub struct ProbeConfig {
    pub browser: BrowserProbeConfig,
    pub health: HealthProbeConfig,
}

impl ProbeConfig {
    /// Build a configuration from the process environment, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(SELENIUM_URL_ENV).filter(|v| !v.is_empty()) {
            config.browser.selenium_url = url;
        }
        if let Some(url) = lookup(BASE_URL_ENV).filter(|v| !v.is_empty()) {
            config.health.base_url = url;
        }

        config
    }
}
