//! Blueprint parsing.
//!
//! Supports TOML (primary) and JSON formats.

use contracts::{ComponentBlueprint, ComponentError, ConfigPatch};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format (recommended)
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    /// Infer format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse a TOML blueprint
pub fn parse_toml(content: &str) -> Result<ComponentBlueprint, ComponentError> {
    toml::from_str(content).map_err(|e| ComponentError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse a JSON blueprint
pub fn parse_json(content: &str) -> Result<ComponentBlueprint, ComponentError> {
    serde_json::from_str(content).map_err(|e| ComponentError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse a blueprint in the given format
pub fn parse(content: &str, format: ConfigFormat) -> Result<ComponentBlueprint, ComponentError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

/// Parse a `cfg/set` patch from a JSON value.
///
/// The command path receives the patch as part of an already-parsed command
/// payload, so this takes `serde_json::Value` rather than text.
pub fn parse_patch(value: &serde_json::Value) -> Result<ConfigPatch, ComponentError> {
    if !value.is_object() {
        return Err(ComponentError::command_payload(
            "payload 'set' must be an object",
        ));
    }
    serde_json::from_value(value.clone())
        .map_err(|e| ComponentError::command_payload(format!("invalid config patch: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
[component]
id = "fixture_cpu"
base_topic = "procsim/agents/test"

[cfg.telemetry.metrics.cpu_percent]
enabled = true
interval_s = 2.0
change_threshold_percent = 2.0

[cfg.telemetry.metrics.load]
enabled = true
interval_s = 2.0
change_threshold_percent = 2.0

[[publishers]]
name = "log_publisher"
publisher_type = "log"
"#;
        let result = parse_toml(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.component.id, "fixture_cpu");
        assert_eq!(bp.cfg.telemetry.metrics.len(), 2);
        assert_eq!(bp.publishers.len(), 1);
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "component": { "id": "fixture_cpu" },
            "cfg": {
                "logs_enabled": true,
                "telemetry": {
                    "metrics": {
                        "cpu_percent": { "enabled": true, "interval_s": 1.0, "change_threshold_percent": 0.0 }
                    }
                }
            },
            "publishers": [{ "name": "log", "publisher_type": "log" }]
        }"#;
        let result = parse_json(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let result = parse_toml(content);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ComponentError::ConfigParse { .. }));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }

    #[test]
    fn test_parse_patch_rejects_non_object() {
        let result = parse_patch(&json!("logs_enabled"));
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("'set' must be an object"));
    }

    #[test]
    fn test_parse_patch_partial() {
        let patch = parse_patch(&json!({"logs_enabled": false})).unwrap();
        assert_eq!(patch.logs_enabled, Some(false));
        assert!(patch.telemetry.is_none());
    }
}
