//! Configuration file parsing for `lambda-sql.toml`.
//!
//! ```toml
//! [aliases]
//! Person = "per"
//! Passport = "${PASSPORT_ALIAS}"
//!
//! [render]
//! without_aliases = false
//! parameter_prefix = "w_"
//!
//! [debug]
//! log_filters = true
//! ```

use std::path::Path;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::RenderSettings;
use crate::error::{QueryError, QueryResult};

/// Default file name looked up by [`LambdaSqlConfig::discover`].
pub const CONFIG_FILE_NAME: &str = "lambda-sql.toml";

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

/// Main configuration structure for `lambda-sql.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LambdaSqlConfig {
    /// Entity name to alias.
    #[serde(default)]
    pub aliases: IndexMap<String, String>,

    /// Render defaults for new filters.
    #[serde(default)]
    pub render: RenderConfig,

    /// Debug/logging settings.
    #[serde(default)]
    pub debug: DebugConfig,
}

impl LambdaSqlConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> QueryResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| QueryError::configuration_io(path.display().to_string(), e))?;

        let config = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), aliases = config.aliases.len(), "Loaded configuration");
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> QueryResult<Self> {
        let expanded = expand_env_vars(content);
        let config: Self = toml::from_str(&expanded).map_err(|e| {
            QueryError::invalid_configuration(format!("failed to parse {}: {}", CONFIG_FILE_NAME, e.message()))
                .with_source(e)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `lambda-sql.toml` from `dir` if present, defaults otherwise.
    pub fn discover(dir: impl AsRef<Path>) -> QueryResult<Self> {
        let path = dir.as_ref().join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::from_file(path)
        } else {
            debug!(path = %path.display(), "No configuration file, using defaults");
            Ok(Self::default())
        }
    }

    fn validate(&self) -> QueryResult<()> {
        if let Some((entity, _)) = self.aliases.iter().find(|(_, alias)| alias.trim().is_empty()) {
            return Err(QueryError::invalid_configuration(format!("alias for {} is empty", entity))
                .with_entity(entity.as_str())
                .with_help("Remove the entry to fall back to the entity's default alias"));
        }
        if let Some(prefix) = &self.render.parameter_prefix {
            if prefix.is_empty() {
                return Err(QueryError::invalid_configuration("render.parameter_prefix is empty")
                    .with_suggestion("Omit parameter_prefix instead of setting it to an empty string"));
            }
        }
        Ok(())
    }
}

/// Render defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// Render bare column names.
    #[serde(default)]
    pub without_aliases: bool,

    /// Parameter prefix for deferred fragments.
    pub parameter_prefix: Option<String>,
}

impl RenderConfig {
    /// Convert to the settings new filters start with.
    pub fn to_settings(&self) -> RenderSettings {
        RenderSettings {
            without_aliases: self.without_aliases,
            parameter_prefix: self.parameter_prefix.as_deref().map(Into::into),
        }
    }
}

/// Debug/logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DebugConfig {
    /// Log the SQL of every rendered filter.
    #[serde(default)]
    pub log_filters: bool,
}

/// Expand environment variables in the format `${VAR_NAME}`.
///
/// Unset variables are left as written.
fn expand_env_vars(content: &str) -> String {
    ENV_VAR
        .replace_all(content, |caps: &regex_lite::Captures<'_>| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_default_config() {
        let config = LambdaSqlConfig::default();
        assert!(config.aliases.is_empty());
        assert_eq!(config.render.to_settings(), RenderSettings::default());
        assert!(!config.debug.log_filters);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [aliases]
            Person = "per"
            Passport = "pas"

            [render]
            without_aliases = true
            parameter_prefix = "w_"

            [debug]
            log_filters = true
        "#;

        let config = LambdaSqlConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.aliases.get("Person"), Some(&"per".to_string()));
        assert_eq!(config.aliases.keys().collect::<Vec<_>>(), vec!["Person", "Passport"]);
        let settings = config.render.to_settings();
        assert!(settings.without_aliases);
        assert_eq!(settings.parameter_prefix.as_deref(), Some("w_"));
        assert!(config.debug.log_filters);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let err = LambdaSqlConfig::from_toml_str("[render]\npretty = true\n").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfiguration);
    }

    #[test]
    fn test_empty_alias_rejected() {
        let err = LambdaSqlConfig::from_toml_str("[aliases]\nPerson = \"\"\n").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfiguration);
        assert_eq!(err.context.entity, Some("Person".to_string()));
    }

    #[test]
    fn test_empty_prefix_rejected() {
        let err = LambdaSqlConfig::from_toml_str("[render]\nparameter_prefix = \"\"\n").unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_env_var_expansion() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::set_var("LAMBDA_SQL_TEST_PERSON_ALIAS", "px");
        }
        let expanded = expand_env_vars("Person = \"${LAMBDA_SQL_TEST_PERSON_ALIAS}\"");
        assert_eq!(expanded, "Person = \"px\"");
        unsafe {
            std::env::remove_var("LAMBDA_SQL_TEST_PERSON_ALIAS");
        }
    }

    #[test]
    fn test_unset_env_var_left_as_is() {
        let expanded = expand_env_vars("x = \"${LAMBDA_SQL_TEST_UNSET_VARIABLE}\"");
        assert_eq!(expanded, "x = \"${LAMBDA_SQL_TEST_UNSET_VARIABLE}\"");
    }

    #[test]
    fn test_missing_file() {
        let err = LambdaSqlConfig::from_file("/nonexistent/lambda-sql.toml").unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigurationIo);
    }

    #[test]
    fn test_discover_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = LambdaSqlConfig::discover(dir.path()).unwrap();
        assert_eq!(config, LambdaSqlConfig::default());
    }

    #[test]
    fn test_discover_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[aliases]\nPerson = \"per\"\n").unwrap();
        let config = LambdaSqlConfig::discover(dir.path()).unwrap();
        assert_eq!(config.aliases.len(), 1);
    }
}
