//! Check configuration loaded from `.psguard/psguard.toml`.
//!
//! A missing file means defaults: every rule enabled at its built-in
//! severity, threshold `info`, no extra exclusions. Unknown rule ids are a
//! config error surfaced before any scanning starts.

use crate::core::error::PsguardError;
use crate::core::report::Severity;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::path::Path;

pub const CONFIG_FILE: &str = "psguard.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub check: CheckConfig,
    #[serde(default)]
    pub rules: RulesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckConfig {
    #[serde(default = "default_threshold")]
    pub severity_threshold: Severity,
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_threshold() -> Severity {
    Severity::Info
}

impl Default for CheckConfig {
    fn default() -> Self {
        CheckConfig {
            severity_threshold: Severity::Info,
            exclude: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RulesConfig {
    #[serde(default)]
    pub disabled: Vec<String>,
    #[serde(default)]
    pub severity: FxHashMap<String, Severity>,
}

impl Config {
    /// Load `<project_root>/.psguard/psguard.toml`, or defaults when absent.
    pub fn load(project_root: &Path) -> Result<Config, PsguardError> {
        let path = project_root.join(".psguard").join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(&path).map_err(PsguardError::IoError)?;
        Config::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Config, PsguardError> {
        toml::from_str(content)
            .map_err(|e| PsguardError::ConfigError(format!("invalid {}: {}", CONFIG_FILE, e)))
    }

    /// Reject rule ids that the registry does not know about, so typos in
    /// config fail loudly instead of silently disabling nothing.
    pub fn validate_rule_ids(&self, known: &[&str]) -> Result<(), PsguardError> {
        let check = |id: &str| -> Result<(), PsguardError> {
            if known.contains(&id) {
                Ok(())
            } else {
                Err(PsguardError::ConfigError(format!(
                    "unknown rule id in {}: {}",
                    CONFIG_FILE, id
                )))
            }
        };
        for id in &self.rules.disabled {
            check(id)?;
        }
        for id in self.rules.severity.keys() {
            check(id)?;
        }
        Ok(())
    }

    pub fn is_disabled(&self, rule_id: &str) -> bool {
        self.rules.disabled.iter().any(|id| id == rule_id)
    }

    /// Effective severity for a rule: config override, else the default.
    pub fn severity_for(&self, rule_id: &str, default: Severity) -> Severity {
        self.rules
            .severity
            .get(rule_id)
            .copied()
            .unwrap_or(default)
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.check.exclude.iter().any(|e| path.contains(e.as_str()))
    }
}
