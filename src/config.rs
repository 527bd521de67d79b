use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

static DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub render: RenderConfig,
    pub links: LinksConfig,
    pub code: CodeConfig,
}

/// Which markdown dialect to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Line-oriented note dialect (headers, lists, code fences, emphasis, links).
    #[default]
    Basic,
    /// Full CommonMark with tables, strikethrough and task lists.
    Commonmark,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default)]
pub struct RenderConfig {
    pub dialect: Dialect,
    pub strip_frontmatter: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LinksConfig {
    pub new_tab: bool,
    pub allow_unsafe_schemes: bool,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            new_tab: true,
            allow_unsafe_schemes: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CodeConfig {
    pub language_class_prefix: String,
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            language_class_prefix: "language-".to_string(),
        }
    }
}

impl Config {
    /// The bundled `default_config.toml`, validated at build time.
    pub fn compiled_default() -> Self {
        match toml::from_str(DEFAULT_CONFIG) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "bundled config did not deserialize, using built-in defaults");
                Self::default()
            }
        }
    }

    /// Load config from a TOML file, or return defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::compiled_default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// The bundled default config text, for `notemark.toml` templates.
    pub fn template() -> &'static str {
        DEFAULT_CONFIG
    }
}
