//! KE-009: kenrich.yaml parsing and validation.
//!
//! Parses kenrich.yaml and validates structural constraints:
//! - Version must be "1.0"
//! - Name (the default resource name) must not be empty
//! - Every mapping needs a kind and at least one filename type
//! - API version overrides must not be blank

use super::types::*;
use std::path::Path;

/// Validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Parse a kenrich.yaml file from disk.
pub fn parse_config_file(path: &Path) -> Result<KenrichConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    parse_config(&content)
}

/// Parse a kenrich.yaml from a string.
pub fn parse_config(yaml: &str) -> Result<KenrichConfig, String> {
    serde_yaml_ng::from_str(yaml).map_err(|e| format!("YAML parse error: {}", e))
}

/// Validate a parsed config. Returns a list of errors (empty = valid).
pub fn validate_config(config: &KenrichConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.version != "1.0" {
        errors.push(ValidationError {
            message: format!("version must be \"1.0\", got \"{}\"", config.version),
        });
    }

    if config.name.trim().is_empty() {
        errors.push(ValidationError {
            message: "name must not be empty".to_string(),
        });
    }

    for (i, mapping) in config.mappings.iter().enumerate() {
        if mapping.kind.trim().is_empty() {
            errors.push(ValidationError {
                message: format!("mapping #{} has no kind", i + 1),
            });
        }
        if mapping.filenames().is_empty() {
            errors.push(ValidationError {
                message: format!(
                    "mapping #{} (kind '{}') has no filename types",
                    i + 1,
                    mapping.kind
                ),
            });
        }
    }

    for (kind, version) in &config.api_versions.overrides {
        if version.trim().is_empty() {
            errors.push(ValidationError {
                message: format!("api version override for '{}' is empty", kind),
            });
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ke009_parse_valid() {
        let yaml = r#"
version: "1.0"
name: shop
mappings:
  - kind: Widget
    filename_types: wdg
"#;
        let config = parse_config(yaml).unwrap();
        assert_eq!(config.name, "shop");
        let errors = validate_config(&config);
        assert!(
            errors.is_empty(),
            "unexpected errors: {:?}",
            errors.iter().map(|e| &e.message).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_ke009_bad_version() {
        let config = parse_config("version: \"2.0\"\nname: shop\n").unwrap();
        let errors = validate_config(&config);
        assert!(errors.iter().any(|e| e.message.contains("version")));
    }

    #[test]
    fn test_ke009_empty_name() {
        let config = parse_config("version: \"1.0\"\nname: \"  \"\n").unwrap();
        let errors = validate_config(&config);
        assert!(errors.iter().any(|e| e.message.contains("name")));
    }

    #[test]
    fn test_ke009_invalid_mappings() {
        let yaml = r#"
version: "1.0"
name: shop
mappings:
  - kind: ""
    filename_types: foo
  - kind: Bar
    filename_types: " , "
"#;
        let config = parse_config(yaml).unwrap();
        let errors = validate_config(&config);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].message.contains("#1 has no kind"));
        assert!(errors[1].message.contains("'Bar'"));
    }

    #[test]
    fn test_ke009_blank_override() {
        let yaml = r#"
version: "1.0"
name: shop
api_versions:
  overrides:
    Widget: ""
"#;
        let config = parse_config(yaml).unwrap();
        let errors = validate_config(&config);
        assert!(errors.iter().any(|e| e.message.contains("'Widget'")));
    }

    #[test]
    fn test_ke009_parse_error() {
        let result = parse_config("version: [unterminated");
        assert!(result.unwrap_err().contains("YAML parse error"));
    }

    #[test]
    fn test_ke009_parse_config_file_missing() {
        let result = parse_config_file(Path::new("/nonexistent/kenrich.yaml"));
        assert!(result.unwrap_err().contains("failed to read"));
    }

    #[test]
    fn test_ke009_display() {
        let e = ValidationError {
            message: "boom".to_string(),
        };
        assert_eq!(e.to_string(), "boom");
    }
}
