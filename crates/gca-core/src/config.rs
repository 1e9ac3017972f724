//! Runtime configuration for generation and the model provider.
//!
//! Load order: `.gca/config.toml` → environment variables → defaults.
//! Command-line flags are applied on top by the binary.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors from loading the runtime configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GcaConfig {
    pub generation: GenerationConfig,
    pub provider: ProviderConfig,
}

/// Settings for the generate → validate → regenerate loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Self-correction attempts allowed after the first generation.
    pub max_retries: usize,
    /// Target UI framework named in the system directive (e.g. "Angular", "React").
    pub framework: String,
    /// Exit non-zero when the loop ends best-effort with residual errors.
    pub fail_on_residual: bool,
    /// Sampling temperature for the initial generation.
    pub temperature: f32,
    /// Sampling temperature for correction requests.
    pub correction_temperature: f32,
    /// Answer from the built-in offline fixture instead of calling a provider.
    pub demo: bool,
}

/// Which completion service to call and how.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Provider name: `openai` (any OpenAI-compatible endpoint) or `anthropic`.
    pub name: String,
    /// Model override; the provider default applies when unset.
    pub model: Option<String>,
    /// Base URL override for OpenAI-compatible endpoints (Groq, local proxies).
    pub base_url: Option<String>,
    /// Environment variable holding the API key; the provider default applies when unset.
    pub api_key_env: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            framework: "Angular".to_string(),
            fail_on_residual: false,
            temperature: 0.2,
            correction_temperature: 0.15,
            demo: false,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: "openai".to_string(),
            model: None,
            base_url: None,
            api_key_env: None,
        }
    }
}

/// Helper to parse an env var and apply it to a config field.
fn env_override<T: std::str::FromStr>(var: &str, target: &mut T) {
    if let Ok(v) = std::env::var(var)
        && let Ok(n) = v.parse()
    {
        *target = n;
    }
}

fn env_override_opt(var: &str, target: &mut Option<String>) {
    if let Ok(v) = std::env::var(var)
        && !v.trim().is_empty()
    {
        *target = Some(v);
    }
}

impl GcaConfig {
    /// Path of the config file for a project root.
    pub fn path(project_root: &Path) -> PathBuf {
        project_root.join(".gca").join("config.toml")
    }

    /// Load config from `.gca/config.toml` in the project root, with env var overrides.
    /// Falls back to defaults if no config file exists.
    pub fn load(project_root: &Path) -> Result<Self, ConfigError> {
        let config_path = Self::path(project_root);

        let mut config: Self = if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Io {
                    path: config_path.clone(),
                    source,
                })?;
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: config_path.clone(),
                source,
            })?
        } else {
            Self::default()
        };

        // Environment variable overrides
        env_override("GCA_MAX_RETRIES", &mut config.generation.max_retries);
        env_override("GCA_FRAMEWORK", &mut config.generation.framework);
        env_override(
            "GCA_FAIL_ON_RESIDUAL",
            &mut config.generation.fail_on_residual,
        );
        env_override("GCA_DEMO", &mut config.generation.demo);
        env_override("GCA_PROVIDER", &mut config.provider.name);
        env_override_opt("GCA_MODEL", &mut config.provider.model);
        env_override_opt("GCA_BASE_URL", &mut config.provider.base_url);

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("temperature", self.generation.temperature),
            (
                "correction_temperature",
                self.generation.correction_temperature,
            ),
        ] {
            if !(0.0..=2.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{name} ({value}) must be between 0 and 2"
                )));
            }
        }
        if self.generation.framework.trim().is_empty() {
            return Err(ConfigError::Invalid("framework must not be empty".into()));
        }
        Ok(())
    }
}
