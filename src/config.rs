//! Layered application configuration.
//!
//! Priority: CLI flag > CLI env var > `COACH_*` env vars > config file >
//! built-in defaults.

use std::path::Path;
use std::time::Duration;

use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use url::Url;

/// Config file picked up from the working directory when no path is given.
const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Address of the hosted coaching endpoint.
const DEFAULT_CHAT_URL: &str = "https://empowering-educators-with-ai-driven-9h0h.onrender.com/chat";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Address to bind
    #[arg(long, env = "BIND_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Chat endpoint URL
    #[arg(long, env = "CHAT_URL")]
    pub chat_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub widget: WidgetConfig,
    pub assets: AssetsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Absolute http(s) URL the widget posts messages to.
    pub chat_url: String,
    /// Request timeout; unset means wait indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            chat_url: DEFAULT_CHAT_URL.to_string(),
            timeout_secs: None,
        }
    }
}

impl BackendConfig {
    /// Parse and check `chat_url`.
    pub fn endpoint(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.chat_url).map_err(|e| {
            ConfigError::Message(format!("backend.chat_url {:?}: {e}", self.chat_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Message(format!(
                "backend.chat_url must be http(s), got {:?}",
                url.scheme()
            )));
        }
        Ok(url)
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// Delay before the gallery is scrolled into view after new resources.
    pub scroll_delay_ms: u64,
    /// Idle time after which a page session is dropped (recreated on next send).
    pub session_ttl_secs: u64,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            scroll_delay_ms: 500,
            session_ttl_secs: 30 * 60,
        }
    }
}

impl WidgetConfig {
    #[must_use]
    pub fn scroll_delay(&self) -> Duration {
        Duration::from_millis(self.scroll_delay_ms)
    }

    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Directory served under `/static`.
    pub static_dir: String,
    /// Script URL of the htmx bundle referenced by the page.
    pub htmx_src: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            static_dir: "static".to_string(),
            htmx_src: "/static/vendor/htmx-2.0.8.min.js".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli = Cli::try_parse_from(args).map_err(|e| ConfigError::Message(e.to_string()))?;

        // 1. Defaults
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        // 2. Config file (explicit path, else ./config.yaml if present)
        let file = cli.config.clone().or_else(|| {
            Path::new(DEFAULT_CONFIG_FILE)
                .exists()
                .then(|| DEFAULT_CONFIG_FILE.to_string())
        });
        if let Some(path) = file {
            builder = builder.add_source(File::with_name(&path));
        }

        // 3. Environment, e.g. COACH_SERVER__PORT=8000
        builder = builder.add_source(
            Environment::with_prefix("COACH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // 4. CLI flags (and their clap env vars) win over everything
        if let Some(host) = cli.host {
            builder = builder.set_override("server.host", host)?;
        }
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(url) = cli.chat_url {
            builder = builder.set_override("backend.chat_url", url)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.backend.endpoint()?;
        Ok(cfg)
    }

    /// `host:port` to bind.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
