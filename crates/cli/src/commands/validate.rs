//! `validate` command implementation.

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::ProducerConfig;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    config_path: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    client_name: String,
    client_kind: String,
    queue_capacity: usize,
    params: Vec<String>,
    delimiter: String,
    keyed: bool,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = ?args.config, "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.as_ref().map(|p| p.display().to_string());
    let mut errors = Vec::new();

    // 记录分隔符：-K 优先于 -D
    let (spec, keyed) = match args.keyed_record_delim {
        Some(ref spec) => (spec.as_str(), true),
        None => (args.delim.as_str(), false),
    };
    if keyed {
        if let Err(e) = ingestion::compile(&args.delim) {
            errors.push(format!("delim (ignored in key/value mode): {e}"));
        }
    }
    let delimiter = match ingestion::compile(spec) {
        Ok(delimiter) => Some(delimiter),
        Err(e) => {
            errors.push(format!("delimiter: {e}"));
            None
        }
    };

    let config = match ConfigLoader::load_or_default(args.config.as_deref()) {
        Ok(config) => Some(config),
        Err(e) => {
            errors.push(format!("config: {e}"));
            None
        }
    };

    let (Some(delimiter), Some(config), true) = (delimiter, config, errors.is_empty()) else {
        return ValidationResult {
            valid: false,
            config_path,
            errors,
            warnings: None,
            summary: None,
        };
    };

    let warnings = collect_warnings(&config, args.config.is_none());
    let mut params: Vec<String> = config
        .client
        .params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect();
    params.sort();

    ValidationResult {
        valid: true,
        config_path,
        errors,
        warnings: if warnings.is_empty() {
            None
        } else {
            Some(warnings)
        },
        summary: Some(ConfigSummary {
            version: format!("{:?}", config.version),
            client_name: config.client.name.clone(),
            client_kind: format!("{:?}", config.client.kind).to_lowercase(),
            queue_capacity: config.client.queue_capacity,
            params,
            delimiter: format!("{delimiter:?}"),
            keyed,
        }),
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &ProducerConfig, defaulted: bool) -> Vec<String> {
    let mut warnings = Vec::new();

    if defaulted {
        warnings.push("No config file given - records will only be logged".to_string());
    }

    // 小队列会让 submit 频繁等待
    if config.client.queue_capacity < 16 {
        warnings.push(format!(
            "client.queue_capacity is {} - submissions will frequently wait for queue space",
            config.client.queue_capacity
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    let target = result.config_path.as_deref().unwrap_or("<default>");

    if result.valid {
        println!("✓ Configuration is valid: {}", target);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Client: {} ({})", summary.client_name, summary.client_kind);
            println!("  Queue capacity: {}", summary.queue_capacity);
            for param in &summary.params {
                println!("  Param: {}", param);
            }
            println!(
                "  Delimiter: {} ({})",
                summary.delimiter,
                if summary.keyed { "key/value" } else { "value only" }
            );
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", target);
        for error in &result.errors {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn args(config: Option<PathBuf>, delim: &str, keyed: Option<&str>) -> ValidateArgs {
        ValidateArgs {
            config,
            delim: delim.to_string(),
            keyed_record_delim: keyed.map(str::to_string),
            json: false,
        }
    }

    #[test]
    fn test_default_config_is_valid_with_warning() {
        let result = validate_config(&args(None, "\\n", None));
        assert!(result.valid);
        let warnings = result.warnings.unwrap();
        assert!(warnings.iter().any(|w| w.contains("only be logged")));
    }

    #[test]
    fn test_bad_delimiter_is_reported() {
        let result = validate_config(&args(None, "\\x4", None));
        assert!(!result.valid);
        assert!(result.errors[0].starts_with("delimiter:"));
    }

    #[test]
    fn test_bad_config_file_is_reported() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[client]\nkind = \"network\"").unwrap();

        let result = validate_config(&args(Some(file.path().to_path_buf()), "\\n", Some(",")));
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.contains("addr")));
    }

    #[test]
    fn test_keyed_summary() {
        let result = validate_config(&args(None, "\\n", Some("\\t")));
        let summary = result.summary.unwrap();
        assert!(summary.keyed);
        assert_eq!(summary.client_kind, "log");
    }
}
