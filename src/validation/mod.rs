//! Project-level validation of semantic models.
//!
//! Nothing here rejects a model: every finding is a warning that goes into
//! the compile output next to the rendered documents.

use std::collections::{HashMap, HashSet};

use crate::model::SemanticModel;

/// Validation warning.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationWarning {
    /// Two models share a name; the first one wins.
    DuplicateModel { name: String },
    /// Two models declare the same primary entity, so neither can be joined
    /// through it.
    DuplicatePrimaryEntity { entity: String, models: Vec<String> },
    /// A reference to a field the model does not declare.
    UndefinedReference {
        model: String,
        field_type: String,
        field: String,
        reference_type: String,
        reference: String,
    },
    /// A field that must name a time dimension names a categorical one.
    NotATimeDimension {
        model: String,
        setting: String,
        dimension: String,
    },
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationWarning::DuplicateModel { name } => {
                write!(f, "Duplicate model name: '{}'", name)
            }
            ValidationWarning::DuplicatePrimaryEntity { entity, models } => {
                write!(
                    f,
                    "Primary entity '{}' is declared by several models: {}",
                    entity,
                    models.join(", ")
                )
            }
            ValidationWarning::UndefinedReference {
                model,
                field_type,
                field,
                reference_type,
                reference,
            } => {
                write!(
                    f,
                    "model '{}': {} '{}' references undefined {} '{}'",
                    model, field_type, field, reference_type, reference
                )
            }
            ValidationWarning::NotATimeDimension {
                model,
                setting,
                dimension,
            } => {
                write!(
                    f,
                    "model '{}': {} '{}' is not a time dimension",
                    model, setting, dimension
                )
            }
        }
    }
}

/// Validate a project.
pub fn validate(models: &[SemanticModel]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    validate_unique_names(models, &mut warnings);
    validate_primary_entities(models, &mut warnings);
    for model in models {
        validate_time_settings(model, &mut warnings);
    }

    warnings
}

fn validate_unique_names(models: &[SemanticModel], warnings: &mut Vec<ValidationWarning>) {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for model in models {
        if !seen.insert(model.name.as_str()) && reported.insert(model.name.as_str()) {
            warnings.push(ValidationWarning::DuplicateModel {
                name: model.name.clone(),
            });
        }
    }
}

fn validate_primary_entities(models: &[SemanticModel], warnings: &mut Vec<ValidationWarning>) {
    let mut owners: HashMap<&str, Vec<String>> = HashMap::new();
    let mut order = Vec::new();
    for model in models {
        if let Some(primary) = model.primary_entity() {
            let entry = owners.entry(primary.name.as_str()).or_default();
            if entry.is_empty() {
                order.push(primary.name.as_str());
            }
            entry.push(model.name.clone());
        }
    }

    for entity in order {
        let models = &owners[entity];
        if models.len() > 1 {
            warnings.push(ValidationWarning::DuplicatePrimaryEntity {
                entity: entity.to_string(),
                models: models.clone(),
            });
        }
    }
}

fn validate_time_settings(model: &SemanticModel, warnings: &mut Vec<ValidationWarning>) {
    let mut check = |setting: &str, dimension: &str| match model.dimension(dimension) {
        None => warnings.push(ValidationWarning::UndefinedReference {
            model: model.name.clone(),
            field_type: "setting".to_string(),
            field: setting.to_string(),
            reference_type: "dimension".to_string(),
            reference: dimension.to_string(),
        }),
        Some(d) if !d.is_time() => warnings.push(ValidationWarning::NotATimeDimension {
            model: model.name.clone(),
            setting: setting.to_string(),
            dimension: dimension.to_string(),
        }),
        Some(_) => {}
    };

    if let Some(default) = &model.default_time_dimension {
        check("default_time_dimension", default);
    }
    for selector in &model.date_selector {
        check("date_selector", selector);
    }
    for measure in &model.measures {
        if let Some(time) = &measure.agg_time_dimension {
            check("agg_time_dimension", time);
        }
    }
}
