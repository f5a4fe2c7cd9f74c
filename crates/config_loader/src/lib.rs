//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON delivery client configuration files
//! - Parse `key=value` client option overrides
//! - Validate configuration legality
//! - Generate `ProducerConfig`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("client.toml")).unwrap();
//! println!("Client: {}", config.client.name);
//! ```

mod overrides;
mod parser;
mod validator;

pub use contracts::ProducerConfig;
pub use overrides::parse_client_opts;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<ProducerConfig, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<ProducerConfig, ContractError> {
        Self::parse_and_validate(content, format)
    }

    /// Load from an optional path, falling back to the default log client
    pub fn load_or_default(path: Option<&Path>) -> Result<ProducerConfig, ContractError> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Ok(ProducerConfig::default()),
        }
    }

    /// Apply `key=value` overrides to the client params and re-validate
    ///
    /// # Errors
    /// - Malformed pair
    /// - Validation failure of the resulting configuration
    pub fn apply_client_opts<S: AsRef<str>>(
        config: &mut ProducerConfig,
        pairs: &[S],
    ) -> Result<(), ContractError> {
        let overrides = parse_client_opts(pairs)?;
        config.client.apply_overrides(overrides);
        validator::validate(config)
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate configuration content
    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<ProducerConfig, ContractError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::ClientKind;
    use std::io::Write;

    const FILE_CLIENT_TOML: &str = r#"
version = "V1"

[client]
name = "archive"
kind = "file"

[client.params]
dir = "./out"
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(FILE_CLIENT_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.client.kind, ClientKind::File);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = r#"
[client]
kind = "network"
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("addr"));
    }

    #[test]
    fn test_load_from_path_detects_format() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{ "client": {{ "name": "json-client" }} }}"#).unwrap();

        let config = ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(config.client.name, "json-client");
    }

    #[test]
    fn test_load_from_path_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let err = ConfigLoader::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }

    #[test]
    fn test_load_or_default_without_path() {
        let config = ConfigLoader::load_or_default(None).unwrap();
        assert_eq!(config.client.kind, ClientKind::Log);
    }

    #[test]
    fn test_client_opts_override_then_validate() {
        let mut config = ProducerConfig::default();
        config.client.kind = ClientKind::Network;

        ConfigLoader::apply_client_opts(&mut config, &["addr=127.0.0.1:9000"]).unwrap();
        assert_eq!(
            config.client.params.get("addr").map(String::as_str),
            Some("127.0.0.1:9000")
        );

        let err = ConfigLoader::apply_client_opts(&mut config, &["addr=nowhere"]).unwrap_err();
        assert!(matches!(err, ContractError::ConfigValidation { .. }));
    }
}
