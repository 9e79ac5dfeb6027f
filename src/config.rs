//! SDK configuration
//!
//! Configuration can come from the process environment or from a YAML/JSON
//! file:
//!
//! ```yaml
//! environment: mini_app
//! version: "7.10"
//! ```
//!
//! Versions with a minor segment must be quoted in YAML; an unquoted `7.10`
//! is a float and is rejected rather than read as `7.1`.

use crate::env::{Environment, ENV_VAR};
use crate::version::Version;
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable holding the initial platform version.
pub const VERSION_VAR: &str = "MINI_APPS_VERSION";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SdkConfig {
    /// Pin the execution environment instead of detecting it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
    /// Initialize the SDK with this platform version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
}

impl SdkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_environment(mut self, env: Environment) -> Self {
        self.environment = Some(env);
        self
    }

    pub fn with_version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    /// Read `MINI_APPS_ENV` and `MINI_APPS_VERSION`.
    ///
    /// Unset or empty variables leave the field unset; present but invalid
    /// values are an error.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<L>(lookup: L) -> Result<Self>
    where
        L: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = match read(ENV_VAR) {
            Some(raw) => Some(raw.parse::<Environment>().map_err(|e| {
                Error::configuration_with_context(
                    e.to_string(),
                    ErrorContext::new()
                        .with_field_path(ENV_VAR)
                        .with_details(raw.clone())
                        .with_source("config_env"),
                )
            })?),
            None => None,
        };

        let version = match read(VERSION_VAR) {
            Some(raw) => Some(Version::parse(&raw).map_err(|e| {
                Error::configuration_with_context(
                    e.to_string(),
                    ErrorContext::new()
                        .with_field_path(VERSION_VAR)
                        .with_details(raw.clone())
                        .with_source("config_env"),
                )
            })?),
            None => None,
        };

        Ok(Self {
            environment,
            version,
        })
    }

    pub fn from_yaml_str(input: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(input)?)
    }

    pub fn from_json_str(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Load from a file; `.json` files are parsed as JSON, anything else
    /// as YAML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let parsed = if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        };
        parsed.map_err(|e| {
            Error::configuration_with_context(
                "failed to parse SDK configuration",
                ErrorContext::new()
                    .with_field_path(path.display().to_string())
                    .with_details(e.to_string())
                    .with_source("config_file"),
            )
        })
    }

    /// Overlay `other` on top of `self`: fields set in `other` win.
    pub fn merge(mut self, other: SdkConfig) -> Self {
        if other.environment.is_some() {
            self.environment = other.environment;
        }
        if other.version.is_some() {
            self.version = other.version;
        }
        self
    }
}
