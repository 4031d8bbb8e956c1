//! Widget configuration.
//!
//! Sources, lowest priority first: built-in defaults, a config file,
//! `WIDGET_` prefixed environment variables (`__` separates sections, e.g.
//! `WIDGET_PAGE__HOSTNAME`), then command-line flags.

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use url::Url;

use crate::error::{Error, Result};

#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Hostname of the page embedding the widget
    #[arg(long, env = "CHAT_HOSTNAME")]
    pub hostname: Option<String>,

    /// Chat endpoint URL, bypassing hostname-based selection
    #[arg(long, env = "CHAT_ENDPOINT")]
    pub endpoint: Option<String>,

    /// File used as local storage for the session token
    #[arg(long, env = "CHAT_STORAGE_FILE")]
    pub storage_file: Option<String>,

    /// Probe the backend health endpoint and exit
    #[arg(long)]
    pub health: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WidgetConfig {
    pub endpoint: EndpointConfig,
    pub page: PageConfig,
    pub storage: StorageConfig,
    pub notifications: NotificationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EndpointConfig {
    /// Base used when the page is served from a loopback host.
    pub dev_base: String,
    /// Base used everywhere else.
    pub production_base: String,
    pub chat_path: String,
    pub health_path: String,
    /// Full chat URL that replaces hostname-based selection.
    #[serde(default)]
    pub override_url: Option<String>,
    /// Request timeout; the HTTP client default applies when unset.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PageConfig {
    pub hostname: String,
    pub title: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Key under which the session token is stored.
    pub key: String,
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationConfig {
    /// How long a notification stays visible.
    pub ttl_ms: u64,
}

impl NotificationConfig {
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

/// Whether `hostname` names the local machine.
#[must_use]
pub fn is_loopback(hostname: &str) -> bool {
    let host = hostname.trim().trim_start_matches('[').trim_end_matches(']');
    host.eq_ignore_ascii_case("localhost")
        || host.parse::<IpAddr>().is_ok_and(|ip| ip.is_loopback())
}

/// Join `path` onto `base`, keeping any path already on the base.
fn append_path(base: &str, path: &str) -> Result<Url> {
    let mut url = Url::parse(base)?;
    let joined = format!(
        "{}/{}",
        url.path().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    url.set_path(&joined);
    Ok(url)
}

impl EndpointConfig {
    /// Base URL for a page served from `hostname`.
    #[must_use]
    pub fn base_for(&self, hostname: &str) -> &str {
        if is_loopback(hostname) {
            &self.dev_base
        } else {
            &self.production_base
        }
    }

    /// Chat endpoint for a page served from `hostname`.
    ///
    /// `chat_path` is appended to the base, so a base carrying a path prefix
    /// (`https://host/bot`) keeps it.
    pub fn chat_url(&self, hostname: &str) -> Result<Url> {
        if let Some(url) = &self.override_url {
            return Ok(Url::parse(url)?);
        }
        append_path(self.base_for(hostname), &self.chat_path)
    }

    /// Health endpoint on the same server as [`EndpointConfig::chat_url`].
    ///
    /// With an override ending in `chat_path`, the part before it is the
    /// base; any other override only contributes its origin.
    pub fn health_url(&self, hostname: &str) -> Result<Url> {
        let Some(url) = &self.override_url else {
            return append_path(self.base_for(hostname), &self.health_path);
        };
        let mut base = Url::parse(url)?;
        let prefix = base
            .path()
            .strip_suffix(self.chat_path.trim_end_matches('/'))
            .unwrap_or("")
            .to_string();
        base.set_path(&prefix);
        base.set_query(None);
        base.set_fragment(None);
        append_path(base.as_str(), &self.health_path)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl WidgetConfig {
    pub fn load() -> Result<Self> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli = Cli::try_parse_from(args).map_err(|e| Error::Config(e.to_string()))?;
        Self::from_cli(&cli)
    }

    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("endpoint.dev_base", "http://localhost:5000")?
            .set_default("endpoint.production_base", "https://chat.example.com")?
            .set_default("endpoint.chat_path", "/api/chat")?
            .set_default("endpoint.health_path", "/api/health")?
            .set_default("page.hostname", "localhost")?
            .set_default("page.title", "IMOBOT Spare Parts Assistant")?
            .set_default("storage.key", "imobot_session_id")?
            .set_default("storage.path", ".parts-chat/local-storage.json")?
            .set_default("notifications.ttl_ms", 4000)?;

        builder = match &cli.config {
            Some(path) => builder.add_source(File::from(PathBuf::from(path)).required(true)),
            None => builder.add_source(File::with_name("widget").required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix("WIDGET")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(hostname) = &cli.hostname {
            builder = builder.set_override("page.hostname", hostname.as_str())?;
        }
        if let Some(endpoint) = &cli.endpoint {
            builder = builder.set_override("endpoint.override_url", endpoint.as_str())?;
        }
        if let Some(path) = &cli.storage_file {
            builder = builder.set_override("storage.path", path.as_str())?;
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Chat endpoint for the configured page hostname.
    pub fn chat_url(&self) -> Result<Url> {
        self.endpoint.chat_url(&self.page.hostname)
    }

    /// Health endpoint for the configured page hostname.
    pub fn health_url(&self) -> Result<Url> {
        self.endpoint.health_url(&self.page.hostname)
    }
}
