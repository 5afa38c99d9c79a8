use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ThemewizConfig {
    pub version: u32,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub generator: Option<GeneratorConfig>,
}

impl Default for ThemewizConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            session: SessionConfig::default(),
            generator: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default = "default_step_debounce_ms")]
    pub step_debounce_ms: u64,
    #[serde(default = "default_theme_debounce_ms")]
    pub theme_debounce_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            file: None,
            step_debounce_ms: default_step_debounce_ms(),
            theme_debounce_ms: default_theme_debounce_ms(),
        }
    }
}

/// External program that answers generation requests.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GeneratorConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

fn default_step_debounce_ms() -> u64 {
    500
}

fn default_theme_debounce_ms() -> u64 {
    2000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    500
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not resolve home directory for config path")]
    HomeDirectoryUnavailable,
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {message}")]
    Validation { message: String },
}

/// `~/.config/themewiz`, shared by the config, the session and diagnostics.
pub fn resolve_config_dir() -> Option<PathBuf> {
    let base_dirs = BaseDirs::new()?;
    Some(base_dirs.home_dir().join(".config").join("themewiz"))
}

pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    let dir = resolve_config_dir().ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(dir.join("config.toml"))
}

pub fn load_config(path: &Path) -> Result<ThemewizConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed: ThemewizConfig = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_config(&parsed)?;
    Ok(parsed)
}

/// A missing file yields the defaults; a present but broken one is an error.
pub fn load_config_or_default(path: &Path) -> Result<ThemewizConfig, ConfigError> {
    if !path.exists() {
        return Ok(ThemewizConfig::default());
    }
    load_config(path)
}

pub fn validate_config(config: &ThemewizConfig) -> Result<(), ConfigError> {
    if config.version != CONFIG_VERSION {
        return Err(ConfigError::Validation {
            message: format!("version must be {CONFIG_VERSION}"),
        });
    }

    if config
        .session
        .file
        .as_ref()
        .is_some_and(|file| file.as_os_str().is_empty())
    {
        return Err(ConfigError::Validation {
            message: "session.file must be non-empty when set".to_string(),
        });
    }

    if let Some(generator) = &config.generator {
        if generator.program.trim().is_empty() {
            return Err(ConfigError::Validation {
                message: "generator.program must be non-empty".to_string(),
            });
        }

        if generator.max_attempts == 0 {
            return Err(ConfigError::Validation {
                message: "generator.max_attempts must be at least 1".to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_config_from_toml(raw: &str) -> Result<ThemewizConfig, ConfigError> {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        fs::write(file.path(), raw).expect("write temp config");
        load_config(file.path())
    }

    #[test]
    fn accepts_minimal_config_with_defaults() {
        let config = load_config_from_toml("version = 1\n").expect("valid config");
        assert_eq!(config, ThemewizConfig::default());
        assert_eq!(config.session.step_debounce_ms, 500);
        assert_eq!(config.session.theme_debounce_ms, 2000);
    }

    #[test]
    fn accepts_generator_section() {
        let raw = r#"
version = 1

[session]
step_debounce_ms = 100

[generator]
program = "theme-gen"
args = ["--model", "fast"]
"#;

        let config = load_config_from_toml(raw).expect("valid config");
        let generator = config.generator.expect("generator");
        assert_eq!(generator.args, vec!["--model", "fast"]);
        assert_eq!(generator.max_attempts, 3);
        assert_eq!(config.session.step_debounce_ms, 100);
        assert_eq!(config.session.theme_debounce_ms, 2000);
    }

    #[test]
    fn rejects_unknown_version() {
        let error = load_config_from_toml("version = 2\n").expect_err("config should fail");
        assert!(error.to_string().contains("version must be 1"));
    }

    #[test]
    fn rejects_blank_generator_program() {
        let raw = r#"
version = 1

[generator]
program = "  "
"#;

        let error = load_config_from_toml(raw).expect_err("config should fail");
        assert!(error.to_string().contains("generator.program must be non-empty"));
    }

    #[test]
    fn rejects_zero_attempts() {
        let raw = r#"
version = 1

[generator]
program = "theme-gen"
max_attempts = 0
"#;

        let error = load_config_from_toml(raw).expect_err("config should fail");
        assert!(error.to_string().contains("at least 1"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let temp = tempfile::tempdir().expect("temp dir");
        let config =
            load_config_or_default(&temp.path().join("config.toml")).expect("default config");
        assert_eq!(config, ThemewizConfig::default());
    }

    #[test]
    fn reports_parse_errors_with_path() {
        let error = load_config_from_toml("version = \"one\"\n").expect_err("config should fail");
        assert!(matches!(error, ConfigError::Parse { .. }));
    }
}
