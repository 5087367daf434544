use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use validator::Validate;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Settings {
    #[validate(nested)]
    pub server: ServerSettings,
    #[validate(nested)]
    pub models: ModelSettings,
    #[validate(nested)]
    pub assets: AssetSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ServerSettings {
    #[validate(length(min = 1))]
    pub host: String,
    #[validate(range(min = 1))]
    pub port: u16,
    #[validate(range(min = 1, max = 256))]
    pub workers: Option<usize>,
    /// Allowed CORS origins; empty means any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ModelSettings {
    #[validate(length(min = 1))]
    pub dir: String,
    #[validate(length(min = 1))]
    pub gdm_file: String,
    #[validate(length(min = 1))]
    pub child_file: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AssetSettings {
    #[validate(length(min = 1))]
    pub frontend_dir: String,
    /// Answer missing assets with 404 instead of 200
    #[serde(default)]
    pub strict_not_found: bool,
}

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Compact,
    Pretty,
}

impl LogFormat {
    /// Parse a format name, falling back to compact for anything unknown
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("pretty") {
            LogFormat::Pretty
        } else {
            LogFormat::Compact
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// Filter directive, e.g. `info` or `maternal_risk=debug,actix_web=info`
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
}

impl LoggingSettings {
    /// Apply `LOG_LEVEL` and `LOG_FORMAT` on top of the configured values
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(std::env::var("LOG_LEVEL").ok(), std::env::var("LOG_FORMAT").ok())
    }

    fn with_overrides(self, level: Option<String>, format: Option<String>) -> Self {
        Self {
            level: level.filter(|l| !l.trim().is_empty()).unwrap_or(self.level),
            format: format.map(|f| LogFormat::from_name(&f)).unwrap_or(self.format),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> LogFormat { LogFormat::Compact }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Built-in defaults
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with MATERNAL_)
    /// 5. `PORT` and `MODELS_DIR` as set by hosting platforms
    pub fn load() -> Result<Self, ConfigError> {
        let settings = with_defaults(Config::builder())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., MATERNAL__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?;

        let settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = with_defaults(Config::builder())?
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }
}

fn with_defaults(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
    builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8000)?
        .set_default("models.dir", "models")?
        .set_default("models.gdm_file", "gdm_classifier_small.txt")?
        .set_default("models.child_file", "child_outcome_model_full.txt")?
        .set_default("assets.frontend_dir", "frontend")?
        .set_default("assets.strict_not_found", false)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "compact")
}

fn environment() -> Environment {
    Environment::with_prefix("MATERNAL")
        .prefix_separator("__")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("server.cors_origins")
        .try_parsing(true)
}

/// Apply the plain variables hosting platforms set
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let port = env::var("PORT").ok().and_then(|p| p.parse::<u16>().ok());
    let models_dir = env::var("MODELS_DIR").ok();

    let mut builder = Config::builder().add_source(settings);

    if let Some(port) = port {
        builder = builder.set_override("server.port", port as i64)?;
    }
    if let Some(dir) = models_dir {
        builder = builder.set_override("models.dir", dir)?;
    }

    builder.build()
}
