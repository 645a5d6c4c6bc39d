use loan_engine_core::EngineSettings;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Environment variable consulted when `--config` is absent.
pub const CONFIG_ENV: &str = "LOANCTL_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub engine: EngineSettings,
    /// Default log level when `RUST_LOG` is unset.
    pub log_level: String,
    pub log_json: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            engine: EngineSettings::default(),
            log_level: "warn".to_string(),
            log_json: false,
        }
    }
}

/// Load the config from `path`, else from `$LOANCTL_CONFIG`, else defaults.
pub fn load(path: Option<&str>) -> Result<CliConfig, Box<dyn std::error::Error>> {
    let path = match path.map(str::to_string).or_else(|| std::env::var(CONFIG_ENV).ok()) {
        Some(p) if !p.is_empty() => p,
        _ => return Ok(CliConfig::default()),
    };
    let contents = fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read config '{}': {}", path, e))?;
    parse(&contents, is_json(&path)).map_err(|e| format!("Invalid config '{}': {}", path, e).into())
}

fn is_json(path: &str) -> bool {
    Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn parse(contents: &str, json: bool) -> Result<CliConfig, Box<dyn std::error::Error>> {
    if json {
        Ok(serde_json::from_str(contents)?)
    } else {
        Ok(serde_yaml::from_str(contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_config_with_partial_engine() {
        let yaml = "log_level: debug\nengine:\n  benchmark_fallback_year: 2021\n";
        let config = parse(yaml, false).unwrap();
        assert_eq!(config.log_level, "debug");
        assert!(!config.log_json);
        assert_eq!(config.engine.benchmark_fallback_year, 2021);
        assert_eq!(config.engine.decimal_places, 2);
    }

    #[test]
    fn test_json_config() {
        let config = parse(r#"{"log_json": true}"#, true).unwrap();
        assert!(config.log_json);
        assert_eq!(config.engine, EngineSettings::default());
    }

    #[test]
    fn test_extension_detection() {
        assert!(is_json("settings.JSON"));
        assert!(!is_json("loanctl.yaml"));
    }
}
