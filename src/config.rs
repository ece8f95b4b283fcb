use crate::dates::DateLocale;
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use url::Url;

/// Top-level configuration. The built-in default carries the real Orweja
/// endpoints and a browser-like client identity, so the binary runs with no
/// config file at all; a TOML file overrides any section.
#[derive(Debug, Clone, Deserialize)]
pub struct KalenderConfig {
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<EndpointConfig>,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub parse: ParseConfig,
}

impl Default for KalenderConfig {
    fn default() -> Self {
        Self {
            endpoints: default_endpoints(),
            fetch: FetchConfig::default(),
            parse: ParseConfig::default(),
        }
    }
}

impl KalenderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.endpoints.is_empty() {
            bail!("at least one endpoint must be configured");
        }

        for endpoint in &self.endpoints {
            match endpoint.mode {
                EndpointMode::Http => {
                    let Some(url) = endpoint.url.as_deref() else {
                        bail!("endpoint.url is required for http mode");
                    };
                    Url::parse(url).with_context(|| format!("invalid endpoint url {url}"))?;
                }
                EndpointMode::File => {
                    if endpoint.path.is_none() {
                        bail!("endpoint.path is required for file mode");
                    }
                }
            }
        }

        if self.fetch.timeout_secs == 0 {
            bail!("fetch.timeout_secs must be greater than zero");
        }
        if self.parse.container_selectors.is_empty() {
            bail!("parse.container_selectors must not be empty");
        }

        Ok(())
    }
}

/// One network (or fixture-file) location scraped for event data. Endpoints
/// are tried in declared order; the first that yields records wins.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    #[serde(default)]
    pub mode: EndpointMode,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl EndpointConfig {
    pub fn http(url: impl Into<String>) -> Self {
        Self {
            mode: EndpointMode::Http,
            url: Some(url.into()),
            path: None,
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            mode: EndpointMode::File,
            url: None,
            path: Some(path.into()),
        }
    }

    /// Human-readable name for logs and reports.
    pub fn describe(&self) -> String {
        match self.mode {
            EndpointMode::Http => self.url.clone().unwrap_or_else(|| "<missing url>".into()),
            EndpointMode::File => self
                .path
                .as_ref()
                .map(|p| format!("file://{}", p.display()))
                .unwrap_or_else(|| "<missing path>".into()),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EndpointMode {
    #[default]
    Http,
    File,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u8,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            retry_attempts: default_retry_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            user_agent: default_user_agent(),
            headers: BTreeMap::new(),
        }
    }
}

/// How strategy results combine within one endpoint. The endpoint chain
/// itself always stops at the first endpoint with records.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ParsePolicy {
    #[default]
    Union,
    FirstSuccess,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParseConfig {
    #[serde(default)]
    pub policy: ParsePolicy,
    #[serde(default = "default_container_selectors")]
    pub container_selectors: Vec<String>,
    #[serde(default = "default_item_selectors")]
    pub item_selectors: Vec<String>,
    #[serde(default = "default_min_columns")]
    pub min_columns: usize,
    #[serde(default)]
    pub date_locale: DateLocale,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            policy: ParsePolicy::default(),
            container_selectors: default_container_selectors(),
            item_selectors: default_item_selectors(),
            min_columns: default_min_columns(),
            date_locale: DateLocale::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<KalenderConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: KalenderConfig = toml::from_str(&text)
        .with_context(|| format!("failed to parse toml in {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(config)
}

fn default_endpoints() -> Vec<EndpointConfig> {
    // The calendar has moved more than once; older locations stay listed as
    // fallbacks behind the current one.
    vec![
        EndpointConfig::http("https://my.orweja.nl/home/kalender/1"),
        EndpointConfig::http("https://my.orweja.nl/home/kalender"),
        EndpointConfig::http("https://www.orweja.nl/kalender"),
    ]
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retry_attempts() -> u8 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_user_agent() -> String {
    // The site rejects unidentified clients, so present a realistic browser.
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 \
     (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1"
        .to_string()
}

fn default_container_selectors() -> Vec<String> {
    ["main", "#main", "#content", "div.content", "div.kalender"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_item_selectors() -> Vec<String> {
    [
        ".event-item",
        ".kalender-item",
        "li.event",
        "article.event",
        "div.wedstrijd",
        "[data-event]",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_min_columns() -> usize {
    2
}
