//! End-to-end compilation from model documents to LookML-shaped documents.
//!
//! ```text
//! ModelDocument ─▶ lower ─▶ prefix / schema ─▶ validate ─▶ expand variants
//!                                                              │
//!             ┌────────────────────────────────────────────────┘
//!             ▼
//!      resolve joins ─▶ render views ─▶ label map ─▶ render explores
//! ```
//!
//! # Example
//!
//! ```ignore
//! use mantis_lookml::compile::compile;
//! use mantis_lookml::config::Settings;
//! use mantis_lookml::document::ModelDocument;
//!
//! let documents: Vec<ModelDocument> = serde_json::from_str(&json)?;
//! let settings: Settings = toml_text.parse()?;
//! let output = compile(&documents, &settings)?;
//! for view in &output.views {
//!     println!("{}", serde_json::to_string_pretty(&view.base)?);
//! }
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use serde_json::Value;

use crate::config::{ExploreSettings, Settings, SettingsError};
use crate::document::ModelDocument;
use crate::lowering;
use crate::model::SemanticModel;
use crate::render::{render_explore, ExploreSpec, RenderedView, ViewRenderer};
use crate::semantic::{InferredJoin, JoinResolver, ModelError};
use crate::sql::{Dialect, KnownFields, Qualifier};
use crate::validation;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that abort a whole compilation run.
///
/// Problems confined to one model are collected in
/// [`CompileOutput::errors`] instead.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type CompileResult<T> = Result<T, CompileError>;

// ============================================================================
// Result Types
// ============================================================================

/// The documents rendered for one model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewOutput {
    pub name: String,
    pub base: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pop: Option<Value>,
}

/// Result of compiling a project.
#[derive(Debug, Clone, Serialize)]
pub struct CompileOutput {
    /// BI connection the project reads through.
    pub connection: Option<String>,

    pub views: Vec<ViewOutput>,

    pub explores: Vec<Value>,

    /// `view.field` to display label.
    pub labels: BTreeMap<String, String>,

    /// Models dropped for structural errors.
    #[serde(skip)]
    pub errors: Vec<ModelError>,

    pub warnings: Vec<String>,

    /// The dialect SQL was qualified for.
    #[serde(skip)]
    pub dialect: Dialect,
}

impl CompileOutput {
    pub fn view(&self, name: &str) -> Option<&ViewOutput> {
        self.views.iter().find(|v| v.name == name)
    }

    pub fn explore(&self, name: &str) -> Option<&Value> {
        self.explores
            .iter()
            .find(|e| e.get("explore").and_then(Value::as_str) == Some(name))
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

// ============================================================================
// Compilation
// ============================================================================

/// Compile `documents` with `settings`.
///
/// A document that fails lowering is reported in `errors` and left out; every
/// other model still compiles.
pub fn compile(documents: &[ModelDocument], settings: &Settings) -> CompileResult<CompileOutput> {
    let dialect = settings.compile.dialect_type();
    let schema_override = settings.compile.resolved_schema_override()?;
    let view_prefix = settings.compile.view_prefix.as_str();

    // Step 1: lower
    let (mut models, errors) = lowering::lower_all(documents);
    let explore_settings = explore_settings(settings, &models);

    // Step 2: prefix and schema override, before anything reads names
    for model in &mut models {
        model.apply_prefix(view_prefix);
        if let Some(schema) = &schema_override {
            model.override_schema(schema);
        }
    }

    // Step 3: validate
    let mut warnings: Vec<String> = validation::validate(&models)
        .iter()
        .map(ToString::to_string)
        .collect();
    let mut models = first_declarations(models);

    // Step 4: expand variants
    for model in &mut models {
        model.expand_variants();
    }

    // Step 5: resolve joins; metrics may read measures of joined models
    let mut resolver = JoinResolver::new(dialect);
    let mut plans: Vec<(ExploreSpec, Vec<InferredJoin>)> = Vec::new();
    let mut skipped = Vec::new();
    for explore in &explore_settings {
        let fact_name = format!("{view_prefix}{}", explore.fact);
        let Some(fact) = models.iter().find(|m| m.name == fact_name) else {
            let message = format!(
                "explore '{}' skipped: fact model '{}' not found",
                explore.explore_name(),
                fact_name
            );
            tracing::warn!("{message}");
            skipped.push(message);
            continue;
        };

        let exclusions: Vec<String> = explore
            .exclude
            .iter()
            .map(|name| format!("{view_prefix}{name}"))
            .collect();
        let overrides: HashMap<_, _> = explore
            .join_overrides()
            .into_iter()
            .map(|(name, o)| (format!("{view_prefix}{name}"), o))
            .collect();

        let joins = resolver.resolve(fact, &models, &exclusions, &overrides);
        let spec = ExploreSpec {
            name: format!("{}{}", settings.compile.explore_prefix, explore.explore_name()),
            fact: fact.name.clone(),
            label: explore.label.clone().or_else(|| fact.label.clone()),
            description: explore.description.clone().or_else(|| fact.description.clone()),
        };
        plans.push((spec, joins));
    }
    let joined = joined_measures(&plans);

    // Step 6: render views
    let qualifier = Qualifier::new(dialect);
    let label_config = settings.labels.to_config();
    let renderer = ViewRenderer::new(
        &qualifier,
        &label_config,
        settings.pop.strategy_type(),
        &settings.pop.comparison_field,
    );

    let no_joins = KnownFields::new();
    let mut labels = BTreeMap::new();
    let mut views = Vec::with_capacity(models.len());
    for model in &models {
        let rendered = renderer.render(model, joined.get(&model.name).unwrap_or(&no_joins));
        warnings.extend(rendered.warnings.iter().cloned());
        for (field, label) in &rendered.labels {
            labels.insert(format!("{}.{}", rendered.name, field), label.clone());
        }
        views.push(view_output(rendered)?);
    }

    // Step 7: render explores
    warnings.extend(skipped);
    let mut explores = Vec::with_capacity(plans.len());
    for (spec, joins) in &plans {
        tracing::debug!(explore = %spec.name, joins = joins.len(), "rendered explore");
        explores.push(serde_json::to_value(render_explore(spec, joins))?);
    }
    warnings.extend(resolver.take_warnings());

    tracing::info!(
        views = views.len(),
        explores = explores.len(),
        errors = errors.len(),
        warnings = warnings.len(),
        "compiled project"
    );

    Ok(CompileOutput {
        connection: settings.compile.connection.clone(),
        views,
        explores,
        labels,
        errors,
        warnings,
        dialect,
    })
}

/// Configured explores, else one per model with a primary entity and
/// something to aggregate. Fact names are unprefixed.
fn explore_settings(settings: &Settings, models: &[SemanticModel]) -> Vec<ExploreSettings> {
    if !settings.explores.is_empty() {
        return settings.explores.clone();
    }
    models
        .iter()
        .filter(|m| m.primary_entity().is_some() && m.has_aggregations())
        .map(|m| ExploreSettings::new(m.name.clone()))
        .collect()
}

/// Per fact model, the joined measures its metrics read, as `view.measure`.
/// The first explore to join a measure name wins.
fn joined_measures(plans: &[(ExploreSpec, Vec<InferredJoin>)]) -> HashMap<String, KnownFields> {
    let mut joined: HashMap<String, KnownFields> = HashMap::new();
    for (spec, joins) in plans {
        let fields = joined.entry(spec.fact.clone()).or_default();
        for join in joins {
            for measure in &join.extra_fields {
                fields.insert(measure.clone(), format!("{}.{}", join.target_model, measure));
            }
        }
    }
    joined
}

/// Drop redeclared model names, keeping the first.
fn first_declarations(models: Vec<SemanticModel>) -> Vec<SemanticModel> {
    let mut seen = HashSet::new();
    models
        .into_iter()
        .filter(|m| seen.insert(m.name.clone()))
        .collect()
}

fn view_output(rendered: RenderedView) -> CompileResult<ViewOutput> {
    Ok(ViewOutput {
        name: rendered.name,
        base: serde_json::to_value(&rendered.base)?,
        metrics: rendered.metrics.map(|doc| serde_json::to_value(doc)).transpose()?,
        pop: rendered.pop.map(|doc| serde_json::to_value(doc)).transpose()?,
    })
}
