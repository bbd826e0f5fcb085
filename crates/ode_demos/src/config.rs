//! Settings file for the demo programs.
//!
//! A JSON document with two optional sections; anything left out keeps its
//! default:
//!
//! ```json
//! { "integration": { "t_end": 12.566, "steps": 1000 },
//!   "newton": { "tolerance": 1e-10, "max_steps": 20 } }
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use ode_core::{IntegrationSettings, NewtonSettings};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub integration: IntegrationSettings,
    pub newton: NewtonSettings,
}

impl DemoConfig {
    /// Reads `path` if given, otherwise starts from `fallback`.
    pub fn load(path: Option<&Path>, fallback: DemoConfig) -> Result<Self> {
        let Some(path) = path else {
            return Ok(fallback);
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Command line values win over the file.
    pub fn with_overrides(mut self, t_end: Option<f64>, steps: Option<usize>) -> Self {
        if let Some(t_end) = t_end {
            self.integration.t_end = t_end;
        }
        if let Some(steps) = steps {
            self.integration.steps = steps;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_keep_defaults() {
        let config = DemoConfig::from_json(r#"{ "integration": { "steps": 250 } }"#)
            .expect("settings should parse");
        assert_eq!(config.integration.steps, 250);
        assert_eq!(config.integration.t_end, IntegrationSettings::default().t_end);
        assert_eq!(config.newton, NewtonSettings::default());
    }

    #[test]
    fn overrides_replace_file_values() {
        let config = DemoConfig::from_json(
            r#"{ "integration": { "t_end": 2.0, "steps": 10 }, "newton": { "max_steps": 5 } }"#,
        )
        .expect("settings should parse")
        .with_overrides(None, Some(40));

        assert_eq!(config.integration.t_end, 2.0);
        assert_eq!(config.integration.steps, 40);
        assert_eq!(config.newton.max_steps, 5);
        assert_eq!(config.newton.tolerance, 1e-10);
    }

    #[test]
    fn load_without_path_returns_fallback() {
        let fallback = DemoConfig::default().with_overrides(Some(3.0), None);
        let config = DemoConfig::load(None, fallback).expect("no file to read");
        assert_eq!(config, fallback);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = DemoConfig::load(
            Some(Path::new("/nonexistent/ode_demos/settings.json")),
            DemoConfig::default(),
        )
        .expect_err("expected error");
        assert!(format!("{err}").contains("Failed to read settings file"));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(DemoConfig::from_json("{ integration: }").is_err());
    }
}
