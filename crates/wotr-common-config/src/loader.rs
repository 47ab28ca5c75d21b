//! Configuration file loading and parsing.

use crate::types::WotrConfig;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

/// Config directory inside a project.
pub const CONFIG_DIR: &str = ".wotr";

/// Config file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.yaml";

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },
}

/// Configuration loader.
pub struct ConfigLoader {
    base_path: PathBuf,
}

fn env_var_pattern() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| {
        regex::Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").expect("env var pattern is valid")
    })
}

impl ConfigLoader {
    /// Create a loader for the given project directory.
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            base_path: project_dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the config file this loader reads.
    pub fn config_path(&self) -> PathBuf {
        self.base_path.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Load configuration from `.wotr/config.yaml`.
    pub fn load(&self) -> Result<WotrConfig, ConfigError> {
        let config_path = self.config_path();

        if !config_path.exists() {
            return Ok(WotrConfig::default());
        }

        self.load_file(&config_path)
    }

    /// Load configuration from an explicit file. Unlike [`load`](Self::load)
    /// a missing file is an error.
    pub fn load_file(&self, path: &Path) -> Result<WotrConfig, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let expanded = self.expand_env_vars(&contents)?;

        let config: WotrConfig = serde_yaml::from_str(&expanded).map_err(|e| {
            ConfigError::ParseError {
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            }
        })?;

        self.validate(&config)?;
        Ok(config)
    }

    /// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
    fn expand_env_vars(&self, content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();

        for cap in env_var_pattern().captures_iter(content) {
            let full_match = &cap[0];
            let var_name = &cap[1];
            let default = cap.get(2).map(|m| m.as_str());

            let value = match std::env::var(var_name) {
                Ok(v) => v,
                Err(_) => match default {
                    Some(d) => d.to_string(),
                    None => {
                        return Err(ConfigError::EnvVarNotFound {
                            var: var_name.to_string(),
                        })
                    }
                },
            };

            result = result.replace(full_match, &value);
        }

        Ok(result)
    }

    /// Validate configuration values.
    pub fn validate(&self, config: &WotrConfig) -> Result<(), ConfigError> {
        let invalid = |message: &str| {
            Err(ConfigError::ValidationError {
                message: message.to_string(),
            })
        };

        if config.atlas.card_width == 0 || config.atlas.card_height == 0 {
            return invalid("atlas card_width and card_height must be greater than 0");
        }

        if !(0.0..=1.0).contains(&config.symbols.threshold) {
            return invalid("symbols.threshold must be between 0.0 and 1.0");
        }

        if !(0.0..=1.0).contains(&config.symbols.edge_threshold) {
            return invalid("symbols.edge_threshold must be between 0.0 and 1.0");
        }

        if config.symbols.scales.is_empty() {
            return invalid("symbols.scales must not be empty");
        }

        if config.symbols.scales.iter().any(|s| *s <= 0.0) {
            return invalid("symbols.scales must all be positive");
        }

        if config.ocr.psm > 13 {
            return invalid("ocr.psm must be between 0 and 13");
        }

        Ok(())
    }

    /// Save configuration to file.
    pub fn save(&self, config: &WotrConfig) -> Result<(), ConfigError> {
        let config_dir = self.base_path.join(CONFIG_DIR);
        std::fs::create_dir_all(&config_dir)?;

        let yaml = serde_yaml::to_string(config).map_err(|e| ConfigError::ParseError {
            line: None,
            message: e.to_string(),
        })?;

        std::fs::write(config_dir.join(CONFIG_FILE), yaml)?;
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(std::env::current_dir().unwrap_or_default())
    }
}
