//! TOML-based configuration for mantis-lookml.
//!
//! Settings come from a TOML file or string, with environment variable
//! expansion in `schema_override`.
//!
//! Example configuration:
//! ```toml
//! [compile]
//! dialect = "snowflake"
//! view_prefix = ""
//! explore_prefix = ""
//! schema_override = "${DEV_SCHEMA}"
//!
//! [labels]
//! max_length = 30
//! group_conformity = true
//! pop_style = "compact"      # compact | standard | verbose
//!
//! [pop]
//! strategy = "dynamic"       # materialized | dynamic
//! comparison_field = "is_comparison_period"
//!
//! [[explores]]
//! fact = "orders"
//! label = "Orders"
//! exclude = ["audit_log"]
//!
//! [explores.overrides.customers]
//! relationship = "one_to_one"
//! expose = "all"
//! ```
//!
//! Enum-like values are kept as text and read through typed accessors that
//! fall back to defaults instead of failing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::labels::{LabelConfig, PopStyle, DEFAULT_MAX_LENGTH};
use crate::pop::PopStrategy;
use crate::semantic::{ExposeLevel, JoinOverride, Relationship};
use crate::sql::Dialect;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub compile: CompileSettings,
    pub labels: LabelSettings,
    pub pop: PopSettings,
    pub explores: Vec<ExploreSettings>,
}

/// Target and naming of the generated project.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CompileSettings {
    /// Warehouse SQL dialect (duckdb, postgres, snowflake, bigquery, ...).
    pub dialect: String,

    /// Prefix prepended to every view name.
    pub view_prefix: String,

    /// Prefix prepended to every explore name.
    pub explore_prefix: String,

    /// Schema every table is read from instead of its declared one.
    pub schema_override: Option<String>,

    /// BI connection name for the generated project.
    pub connection: Option<String>,
}

impl Default for CompileSettings {
    fn default() -> Self {
        Self {
            dialect: Dialect::default().to_string(),
            view_prefix: String::new(),
            explore_prefix: String::new(),
            schema_override: None,
            connection: None,
        }
    }
}

impl CompileSettings {
    /// Get the dialect, falling back to the default for unknown names.
    pub fn dialect_type(&self) -> Dialect {
        Dialect::lookup(&self.dialect).unwrap_or_else(|| {
            tracing::debug!(dialect = %self.dialect, "unknown dialect, using default");
            Dialect::default()
        })
    }

    /// Get the schema override with environment variables expanded.
    pub fn resolved_schema_override(&self) -> Result<Option<String>, SettingsError> {
        self.schema_override
            .as_deref()
            .map(expand_env_vars)
            .transpose()
    }
}

/// Label policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LabelSettings {
    /// Longest label shown before short labels take over.
    pub max_length: usize,

    /// One over-long label switches its whole sibling group to short labels.
    pub group_conformity: bool,

    /// Template family for period-over-period labels.
    pub pop_style: String,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            group_conformity: true,
            pop_style: "compact".to_string(),
        }
    }
}

impl LabelSettings {
    pub fn pop_style_type(&self) -> PopStyle {
        PopStyle::from_name(&self.pop_style)
    }

    pub fn to_config(&self) -> LabelConfig {
        LabelConfig::new(self.max_length)
            .with_group_conformity(self.group_conformity)
            .with_pop_style(self.pop_style_type())
    }
}

/// Period-over-period rendering.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PopSettings {
    /// Rendering strategy: "materialized" or "dynamic".
    pub strategy: String,

    /// Yes/no field of the calendar marking comparison-period rows.
    pub comparison_field: String,
}

impl Default for PopSettings {
    fn default() -> Self {
        Self {
            strategy: "materialized".to_string(),
            comparison_field: "is_comparison_period".to_string(),
        }
    }
}

impl PopSettings {
    pub fn strategy_type(&self) -> PopStrategy {
        PopStrategy::from_name(&self.strategy)
    }
}

/// One explore anchored on a fact model.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ExploreSettings {
    /// Fact model the explore starts from.
    pub fact: String,

    /// Explore name; defaults to the fact model name.
    pub name: Option<String>,

    pub label: Option<String>,

    pub description: Option<String>,

    /// Models never joined into this explore.
    pub exclude: Vec<String>,

    /// Per joined model overrides.
    pub overrides: HashMap<String, JoinOverrideSettings>,
}

impl ExploreSettings {
    pub fn new(fact: impl Into<String>) -> Self {
        Self {
            fact: fact.into(),
            ..Self::default()
        }
    }

    /// Explore name, without the explore prefix.
    pub fn explore_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.fact)
    }

    /// Get the typed join overrides, keyed by joined model.
    pub fn join_overrides(&self) -> HashMap<String, JoinOverride> {
        self.overrides
            .iter()
            .map(|(model, o)| (model.clone(), o.to_override()))
            .collect()
    }
}

/// Relationship and exposure override for one joined model.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct JoinOverrideSettings {
    /// many_to_one, one_to_many, one_to_one or many_to_many.
    pub relationship: Option<String>,

    /// all or dimensions_only.
    pub expose: Option<String>,
}

impl JoinOverrideSettings {
    /// Unknown values leave the inferred value in place.
    pub fn to_override(&self) -> JoinOverride {
        JoinOverride {
            relationship: self.relationship.as_deref().and_then(Relationship::parse),
            expose: self.expose.as_deref().and_then(ExposeLevel::parse),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        content.parse()
    }

    /// Check values no fallback can repair.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.labels.max_length < 3 {
            return Err(SettingsError::InvalidConfig(format!(
                "labels.max_length must be at least 3, got {}",
                self.labels.max_length
            )));
        }
        if let Some(index) = self.explores.iter().position(|e| e.fact.trim().is_empty()) {
            return Err(SettingsError::InvalidConfig(format!(
                "explores[{index}] has no fact model"
            )));
        }
        Ok(())
    }
}

impl FromStr for Settings {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let settings: Settings = toml::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.peek() == Some(&'{') {
            chars.next();
            chars.by_ref().take_while(|&ch| ch != '}').collect()
        } else {
            let mut name = String::new();
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                name.push(ch);
            }
            name
        };

        if var_name.is_empty() {
            // Just a lone $, keep it
            result.push('$');
            continue;
        }
        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
