use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "altawater.toml",
    "config/altawater.toml",
    "crates/config/altawater.toml",
    "../altawater.toml",
    "../config/altawater.toml",
];

/// Plain variable hosting platforms use to hand the bot its token.
pub const BOT_TOKEN_ENV: &str = "BOT_TOKEN";
/// Plain variable hosting platforms use to assign the listener port.
pub const PORT_ENV: &str = "PORT";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub telegram: TelegramConfig,
    pub delivery: DeliveryConfig,
}

/// Keep-alive listener used by uptime probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// Connection settings for the Telegram Bot API.
///
/// ```
/// use altawater_config::TelegramConfig;
///
/// let telegram = TelegramConfig::default();
/// assert_eq!(telegram.api_base_url, "https://api.telegram.org");
/// assert_eq!(telegram.poll_timeout_seconds, 30);
/// assert!(telegram.bot_token.is_none());
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: Option<String>,
    #[serde(default = "TelegramConfig::default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "TelegramConfig::default_poll_timeout")]
    pub poll_timeout_seconds: u64,
    #[serde(default = "TelegramConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default = "TelegramConfig::default_poll_retry_delay")]
    pub poll_retry_delay_ms: u64,
}

impl TelegramConfig {
    fn default_api_base_url() -> String {
        "https://api.telegram.org".to_string()
    }

    const fn default_poll_timeout() -> u64 {
        30
    }

    // Long polls hold the request open, so the client timeout has to outlast them.
    const fn default_request_timeout() -> u64 {
        40
    }

    const fn default_poll_retry_delay() -> u64 {
        1_000
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            api_base_url: Self::default_api_base_url(),
            poll_timeout_seconds: Self::default_poll_timeout(),
            request_timeout_seconds: Self::default_request_timeout(),
            poll_retry_delay_ms: Self::default_poll_retry_delay(),
        }
    }
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("poll_timeout_seconds", &self.poll_timeout_seconds)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .field("poll_retry_delay_ms", &self.poll_retry_delay_ms)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Plain-text word residents send to ask for a delivery.
    #[serde(default = "DeliveryConfig::default_request_keyword")]
    pub request_keyword: String,
}

impl DeliveryConfig {
    fn default_request_keyword() -> String {
        "water".to_string()
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            request_keyword: Self::default_request_keyword(),
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use altawater_config::load;
///
/// std::env::remove_var("ALTAWATER_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let mut builder = config::Config::builder()
        .set_default("http.address", defaults.http.address.clone())?
        .set_default("http.port", i64::from(defaults.http.port))?
        .set_default(
            "telegram.api_base_url",
            defaults.telegram.api_base_url.clone(),
        )?
        .set_default(
            "telegram.poll_timeout_seconds",
            i64::try_from(defaults.telegram.poll_timeout_seconds).unwrap_or(i64::MAX),
        )?
        .set_default(
            "telegram.request_timeout_seconds",
            i64::try_from(defaults.telegram.request_timeout_seconds).unwrap_or(i64::MAX),
        )?
        .set_default(
            "telegram.poll_retry_delay_ms",
            i64::try_from(defaults.telegram.poll_retry_delay_ms).unwrap_or(i64::MAX),
        )?
        .set_default(
            "delivery.request_keyword",
            defaults.delivery.request_keyword.clone(),
        )?;

    let environment_overrides = config::Environment::with_prefix("ALTAWATER").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("ALTAWATER_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via ALTAWATER_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let mut config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    apply_platform_overrides(&mut config)?;

    debug!(?config, "loaded bot configuration");
    Ok(config)
}

fn apply_platform_overrides(config: &mut AppConfig) -> anyhow::Result<()> {
    config.telegram.bot_token = config
        .telegram
        .bot_token
        .take()
        .filter(|token| !token.trim().is_empty());

    if config.telegram.bot_token.is_none() {
        if let Ok(token) = std::env::var(BOT_TOKEN_ENV) {
            if !token.trim().is_empty() {
                debug!("using bot token from {BOT_TOKEN_ENV}");
                config.telegram.bot_token = Some(token.trim().to_string());
            }
        }
    }

    if let Ok(port) = std::env::var(PORT_ENV) {
        config.http.port = port
            .trim()
            .parse()
            .with_context(|| format!("invalid {PORT_ENV} value {port:?}"))?;
    }

    let keyword = config.delivery.request_keyword.trim().to_lowercase();
    anyhow::ensure!(
        !keyword.is_empty(),
        "invalid configuration: delivery.request_keyword must not be empty"
    );
    config.delivery.request_keyword = keyword;

    Ok(())
}
