//! Locating and parsing the config file.

use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, anyhow};

use crate::constants::{CONFIG_JSON_ENV, CONFIG_PATH_ENV, DEFAULT_CONFIG_FILES};
use crate::models::FeedConfig;

/// Where [`FeedConfig::load_from_env`] found the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FeedConfigSource {
    /// Nothing found; compiled defaults.
    #[default]
    Default,
    /// File named by `$FEEDPLAY_CONFIG_PATH`.
    EnvPath(PathBuf),
    /// Inline JSON from `$FEEDPLAY_CONFIG_JSON`.
    EnvInline,
    /// A default file location, or a file passed explicitly.
    File(PathBuf),
}

impl FeedConfigSource {
    /// File the configuration was read from, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::EnvPath(path) | Self::File(path) => Some(path),
            Self::Default | Self::EnvInline => None,
        }
    }
}

impl fmt::Display for FeedConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("compiled defaults"),
            Self::EnvInline => write!(f, "${CONFIG_JSON_ENV}"),
            Self::EnvPath(path) => {
                write!(f, "{} (${CONFIG_PATH_ENV})", path.display())
            }
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Document syntax of a config payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Toml,
    Json,
    /// Unknown extension: TOML first, then JSON.
    Sniff,
}

impl Format {
    fn of(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml" | "tml") => Self::Toml,
            Some("json") => Self::Json,
            _ => Self::Sniff,
        }
    }

    fn parse(self, contents: &str) -> anyhow::Result<FeedConfig> {
        match self {
            Self::Toml => Ok(toml::from_str(contents)?),
            Self::Json => Ok(serde_json::from_str(contents)?),
            Self::Sniff => Self::Toml.parse(contents).or_else(|toml_err| {
                Self::Json.parse(contents).map_err(|json_err| {
                    anyhow!("toml error: {toml_err}; json error: {json_err}")
                })
            }),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

impl FeedConfig {
    /// Resolve configuration from the environment, first match wins:
    /// `$FEEDPLAY_CONFIG_PATH`, inline `$FEEDPLAY_CONFIG_JSON`, the first
    /// existing file of [`DEFAULT_CONFIG_FILES`], compiled defaults.
    ///
    /// Logging is left to the caller, which gets the source back.
    pub fn load_from_env() -> anyhow::Result<(Self, FeedConfigSource)> {
        let source = if let Some(path) = non_empty_var(CONFIG_PATH_ENV) {
            FeedConfigSource::EnvPath(PathBuf::from(path))
        } else if let Some(raw) = non_empty_var(CONFIG_JSON_ENV) {
            let config = Format::Json.parse(&raw).with_context(|| {
                format!("failed to parse ${CONFIG_JSON_ENV}")
            })?;
            return Ok((config, FeedConfigSource::EnvInline));
        } else {
            DEFAULT_CONFIG_FILES
                .iter()
                .map(PathBuf::from)
                .find(|path| path.exists())
                .map_or(FeedConfigSource::Default, FeedConfigSource::File)
        };

        let config = match source.path() {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };
        Ok((config, source))
    }

    /// Read `path`, picking the syntax from its extension.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path).with_context(|| {
            format!("failed to read feed config from {}", path.display())
        })?;
        Format::of(path)
            .parse(&contents)
            .with_context(|| format!("invalid feed config {}", path.display()))
    }

    /// Parse a payload of unknown syntax. `origin` names it in errors.
    pub fn parse_from_str(
        contents: &str,
        origin: &str,
    ) -> anyhow::Result<Self> {
        Format::Sniff
            .parse(contents)
            .with_context(|| format!("failed to parse feed config {origin}"))
    }
}
