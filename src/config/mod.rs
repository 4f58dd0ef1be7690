//! Configuration for the `scim-filter` command-line tool.
//!
//! The tool is configured via an optional TOML file, with support for
//! environment variable interpolation using `${VAR_NAME}` syntax. Flags given
//! on the command line override file values.
//!
//! # Example
//!
//! ```toml
//! [parser]
//! max_length = 4096
//! max_depth = 32
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! filter = "${SCIM_FILTER_LOG}"
//! ```

mod observability;

use std::{path::Path, sync::LazyLock};

pub use observability::*;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::scim::ParserOptions;

/// Root configuration.
///
/// All sections are optional with sensible defaults, so an empty file is a
/// valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Parser resource limits.
    #[serde(default)]
    pub parser: ParserOptions,

    /// Log output of the command-line tool.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// Environment variables in the format `${VAR_NAME}` are expanded.
    /// Missing variables cause an error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e, path.as_ref().to_path_buf()))?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(contents: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(contents)?;
        let config: AppConfig = toml::from_str(&expanded)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration for consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parser.max_length == 0 {
            return Err(ConfigError::Validation(
                "parser.max_length must be greater than zero".into(),
            ));
        }
        if self.parser.max_depth == 0 {
            return Err(ConfigError::Validation(
                "parser.max_depth must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {1}: {0}")]
    Io(std::io::Error, std::path::PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

/// Expand `${VAR_NAME}` references, leaving anything after a `#` untouched.
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut result = String::with_capacity(input.len());

    for line in input.lines() {
        let comment_pos = line.find('#');
        let mut last_end = 0;

        for cap in ENV_VAR.captures_iter(line) {
            let Some(whole) = cap.get(0) else {
                continue;
            };

            // Skip if this variable is inside a comment
            if comment_pos.is_some_and(|pos| whole.start() >= pos) {
                continue;
            }

            result.push_str(&line[last_end..whole.start()]);

            let var_name = &cap[1];
            let value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;
            result.push_str(&value);

            last_end = whole.end();
        }

        result.push_str(&line[last_end..]);
        result.push('\n');
    }

    // Remove trailing newline if input didn't have one
    if !input.ends_with('\n') && result.ends_with('\n') {
        result.pop();
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::scim::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_LENGTH};

    #[test]
    fn test_empty_config() {
        let config = AppConfig::from_str("").unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.parser.max_length, DEFAULT_MAX_LENGTH);
        assert_eq!(config.parser.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn test_full_config() {
        let config = AppConfig::from_str(
            r#"
            [parser]
            max_length = 1024
            max_depth = 8

            [logging]
            level = "debug"
            format = "json"
            timestamps = false
            file_line = true
            filter = "scim_filter=trace"
        "#,
        )
        .unwrap();

        assert_eq!(config.parser.max_length, 1024);
        assert_eq!(config.parser.max_depth, 8);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(!config.logging.timestamps);
        assert!(config.logging.file_line);
        assert_eq!(config.logging.filter.as_deref(), Some("scim_filter=trace"));
    }

    #[test]
    fn test_partial_parser_section_keeps_defaults() {
        let config = AppConfig::from_str(
            r#"
            [parser]
            max_depth = 4
        "#,
        )
        .unwrap();

        assert_eq!(config.parser.max_length, DEFAULT_MAX_LENGTH);
        assert_eq!(config.parser.max_depth, 4);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = AppConfig::from_str(
            r#"
            [parser]
            max_nodes = 10
        "#,
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_log_format_rejected() {
        let result = AppConfig::from_str(
            r#"
            [logging]
            format = "cef"
        "#,
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_zero_limits_rejected() {
        let err = AppConfig::from_str("[parser]\nmax_depth = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("max_depth"));

        let err = AppConfig::from_str("[parser]\nmax_length = 0").unwrap_err();
        assert!(err.to_string().contains("max_length"));
    }

    #[test]
    fn test_env_var_expansion() {
        temp_env::with_var("SCIM_FILTER_TEST_LOG_FILTER", Some("scim_filter=trace"), || {
            let config = AppConfig::from_str(
                r#"
                [logging]
                filter = "${SCIM_FILTER_TEST_LOG_FILTER}" # not ${EXPANDED}
            "#,
            )
            .unwrap();
            assert_eq!(config.logging.filter.as_deref(), Some("scim_filter=trace"));
        });
    }

    #[test]
    fn test_env_var_missing() {
        let err = AppConfig::from_str(
            r#"
            [logging]
            filter = "${SCIM_FILTER_TEST_DEFINITELY_UNSET}"
        "#,
        )
        .unwrap_err();
        assert!(
            matches!(err, ConfigError::EnvVarNotFound(ref name) if name == "SCIM_FILTER_TEST_DEFINITELY_UNSET")
        );
    }

    #[test]
    fn test_env_var_in_comment_is_ignored() {
        let expanded = expand_env_vars("# ${SCIM_FILTER_TEST_DEFINITELY_UNSET}\nx = 1").unwrap();
        assert_eq!(expanded, "# ${SCIM_FILTER_TEST_DEFINITELY_UNSET}\nx = 1");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[parser]\nmax_length = 256").unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.parser.max_length, 256);
    }

    #[test]
    fn test_from_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let err = AppConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_, ref p) if p == &path));
    }
}
