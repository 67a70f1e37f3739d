//! Configuration management.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default engine endpoint.
pub const DEFAULT_ENGINE_URL: &str = "ws://127.0.0.1:9030/mixer";
/// Default delay between a config snapshot and the slider measurement.
pub const DEFAULT_LAYOUT_SETTLE_MS: u64 = 10;

/// Configuration structure that matches the TOML file format.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    engine: EngineConfig,
    #[serde(default)]
    ui: UiConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EngineConfig {
    #[serde(default = "default_engine_url")]
    url: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            url: default_engine_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UiConfig {
    #[serde(default = "default_layout_settle_ms")]
    layout_settle_ms: u64,
    #[serde(default = "default_window_width")]
    window_width: f32,
    #[serde(default = "default_window_height")]
    window_height: f32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            layout_settle_ms: default_layout_settle_ms(),
            window_width: default_window_width(),
            window_height: default_window_height(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    /// If not set, uses RUST_LOG environment variable or defaults to "info"
    log_level: Option<String>,
}

fn default_engine_url() -> String {
    DEFAULT_ENGINE_URL.to_string()
}

fn default_layout_settle_ms() -> u64 {
    DEFAULT_LAYOUT_SETTLE_MS
}

fn default_window_width() -> f32 {
    1280.0
}

fn default_window_height() -> f32 {
    720.0
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// WebSocket URL of the audio engine
    pub engine_url: String,
    /// Delay before measuring slider geometry after a config snapshot
    pub layout_settle: Duration,
    /// Initial window size
    pub window_size: [f32; 2],
    /// Log level (if set, used when RUST_LOG is not)
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_file(ConfigFile {
            engine: EngineConfig::default(),
            ui: UiConfig::default(),
            logging: LoggingConfig::default(),
        })
    }
}

/// Command-line overrides, applied on top of everything else.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub engine_url: Option<String>,
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration with full priority chain: CLI args > env vars > config files > defaults.
    ///
    /// Config files are searched in this order:
    /// 1. `config.toml` in user config directory (~/.config/mixdesk/ on Linux)
    /// 2. `.mixdesk.toml` in current directory
    /// 3. the file passed on the command line, if any
    pub fn load(overrides: ConfigOverrides) -> anyhow::Result<Self> {
        let user_config = directories::ProjectDirs::from("", "", "mixdesk")
            .map(|dirs| dirs.config_dir().join("config.toml"));
        let local_config = std::env::current_dir()
            .ok()
            .map(|d| d.join(".mixdesk.toml"));

        let mut files: Vec<PathBuf> = user_config.into_iter().chain(local_config).collect();
        if let Some(path) = overrides.config_file.clone() {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            files.push(path);
        }

        Self::from_figment(Self::figment(&files, &overrides))
    }

    /// Build the layered figment: defaults < files (in order) < `MIXDESK_*` env < overrides.
    fn figment(files: &[PathBuf], overrides: &ConfigOverrides) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(ConfigFile {
            engine: EngineConfig::default(),
            ui: UiConfig::default(),
            logging: LoggingConfig::default(),
        }));

        for path in files.iter().filter(|p| p.exists()) {
            figment = figment.merge(Toml::file(path));
        }

        // MIXDESK_ENGINE__URL -> engine.url
        figment = figment.merge(Env::prefixed("MIXDESK_").split("__"));

        if let Some(ref url) = overrides.engine_url {
            figment = figment.merge(Serialized::default("engine.url", url));
        }
        if let Some(ref level) = overrides.log_level {
            figment = figment.merge(Serialized::default("logging.log_level", level));
        }

        figment
    }

    fn from_figment(figment: Figment) -> anyhow::Result<Self> {
        let config_file: ConfigFile = figment.extract()?;
        Ok(Self::from_file(config_file))
    }

    fn from_file(file: ConfigFile) -> Self {
        Self {
            engine_url: file.engine.url,
            layout_settle: Duration::from_millis(file.ui.layout_settle_ms),
            window_size: [file.ui.window_width, file.ui.window_height],
            log_level: file.logging.log_level,
        }
    }
}
