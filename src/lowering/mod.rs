//! Lowering input documents to semantic models.
//!
//! Free-text vocabulary falls back to defaults (an unknown aggregation is a
//! sum, an unknown entity kind is foreign, ...). Structural problems that no
//! fallback can repair are [`ModelError`]s and reject the whole model.

use crate::document::{
    DimensionDocument, EntityDocument, MeasureDocument, MetricDocument, ModelDocument, PopDocument,
};
use crate::model::{
    Aggregation, BenchmarkSlice, Dimension, DimensionKind, Entity, EntityKind, Granularity,
    Measure, Metric, MetricKind, PopComparison, PopConfig, PopOutput, SemanticModel, TableRef,
};
use crate::semantic::{ModelError, ModelResult};

/// Every output, used when a PoP block lists none.
const ALL_OUTPUTS: [PopOutput; 3] = [PopOutput::Previous, PopOutput::Change, PopOutput::PctChange];

/// Lower every document, keeping going past failed models.
pub fn lower_all(documents: &[ModelDocument]) -> (Vec<SemanticModel>, Vec<ModelError>) {
    let mut models = Vec::with_capacity(documents.len());
    let mut errors = Vec::new();
    for document in documents {
        match lower(document) {
            Ok(model) => models.push(model),
            Err(err) => {
                tracing::warn!(model = %document.name, error = %err, "skipping model");
                errors.push(err);
            }
        }
    }
    (models, errors)
}

/// Lower one model document.
pub fn lower(doc: &ModelDocument) -> ModelResult<SemanticModel> {
    let name = doc.name.trim();
    if name.is_empty() {
        return Err(ModelError::MissingName);
    }

    let mut model = SemanticModel::new(name, lower_table(doc)?);
    model.label = doc.label.clone();
    model.description = doc.description.clone();
    model.default_time_dimension = doc.default_time_dimension.clone();
    model.date_selector = doc.date_selector.clone();

    model.entities = doc.entities.iter().map(lower_entity).collect();
    model.dimensions = doc
        .dimensions
        .iter()
        .map(|d| lower_dimension(name, d))
        .collect::<ModelResult<_>>()?;
    model.measures = doc
        .measures
        .iter()
        .map(|m| lower_measure(name, m))
        .collect::<ModelResult<_>>()?;
    model.metrics = doc
        .metrics
        .iter()
        .map(|m| lower_metric(name, m))
        .collect::<ModelResult<_>>()?;

    Ok(model)
}

fn lower_table(doc: &ModelDocument) -> ModelResult<TableRef> {
    let missing = || ModelError::MissingTable {
        model: doc.name.clone(),
    };
    let raw = doc.table.as_deref().map(str::trim).ok_or_else(missing)?;

    let mut parts: Vec<&str> = raw.split('.').collect();
    let table = parts.pop().filter(|t| !t.is_empty()).ok_or_else(missing)?;
    let schema = parts.pop();
    let catalog = parts.pop();

    Ok(TableRef {
        connection: doc.connection.clone(),
        catalog: doc.catalog.clone().or(catalog.map(str::to_string)),
        schema: doc.schema.clone().or(schema.map(str::to_string)),
        table: table.to_string(),
    })
}

fn lower_entity(doc: &EntityDocument) -> Entity {
    let mut entity = Entity::new(doc.name.clone(), EntityKind::from_name(&doc.kind));
    if let Some(expr) = &doc.expr {
        entity.expr = expr.clone();
    }
    entity.complete = doc.complete;
    entity.label = doc.label.clone();
    entity.description = doc.description.clone();
    entity
}

fn lower_dimension(model: &str, doc: &DimensionDocument) -> ModelResult<Dimension> {
    if doc.expr.is_none() && doc.variants.is_empty() {
        return Err(ModelError::MissingDimensionSql {
            model: model.to_string(),
            dimension: doc.name.clone(),
        });
    }
    if let Some(variant) = &doc.primary_variant {
        if !doc.variants.contains_key(variant) {
            return Err(ModelError::UnknownPrimaryVariant {
                model: model.to_string(),
                dimension: doc.name.clone(),
                variant: variant.clone(),
            });
        }
    }

    let mut dimension = Dimension::new(doc.name.clone(), DimensionKind::from_name(&doc.kind));
    dimension.expr = doc.expr.clone();
    dimension.variants = doc.variants.clone();
    dimension.primary_variant = doc.primary_variant.clone();
    dimension.granularity = doc.granularity.as_deref().and_then(Granularity::parse);
    dimension.group = doc.group.clone();
    dimension.label = doc.label.clone();
    dimension.short_label = doc.short_label.clone();
    dimension.description = doc.description.clone();
    dimension.hidden = doc.hidden;
    Ok(dimension)
}

fn lower_measure(model: &str, doc: &MeasureDocument) -> ModelResult<Measure> {
    let agg = Aggregation::from_name(&doc.agg);
    if agg != Aggregation::Count && doc.expr.is_none() {
        return Err(ModelError::MissingMeasureExpr {
            model: model.to_string(),
            measure: doc.name.clone(),
            agg: agg.lookml_type(),
        });
    }

    let mut measure = Measure::new(doc.name.clone(), agg);
    measure.expr = doc.expr.clone();
    measure.percentile = doc.percentile;
    measure.agg_time_dimension = doc.agg_time_dimension.clone();
    measure.group = doc.group.clone();
    measure.label = doc.label.clone();
    measure.short_label = doc.short_label.clone();
    measure.description = doc.description.clone();
    Ok(measure)
}

fn lower_metric(model: &str, doc: &MetricDocument) -> ModelResult<Metric> {
    let missing = |kind: &'static str, input: &'static str| ModelError::MissingMetricInput {
        model: model.to_string(),
        metric: doc.name.clone(),
        kind,
        input,
    };

    let kind = match metric_kind(doc) {
        "ratio" => MetricKind::Ratio {
            numerator: doc.numerator.clone().ok_or_else(|| missing("ratio", "numerator"))?,
            denominator: doc
                .denominator
                .clone()
                .ok_or_else(|| missing("ratio", "denominator"))?,
        },
        "derived" => MetricKind::Derived {
            expr: doc.expr.clone().ok_or_else(|| missing("derived", "expr"))?,
            metrics: doc.metrics.clone(),
        },
        _ => MetricKind::Simple {
            measure: doc.measure.clone().ok_or_else(|| missing("simple", "measure"))?,
        },
    };

    let mut metric = Metric::new(doc.name.clone(), kind);
    metric.filter = doc.filter.clone();
    metric.pop = doc.pop.as_ref().map(lower_pop);
    metric.benchmarks = doc
        .benchmarks
        .iter()
        .map(|b| BenchmarkSlice {
            name: b.name.clone(),
            filter: b.filter.clone(),
        })
        .collect();
    metric.time_dimension = doc.time_dimension.clone();
    metric.group = doc.group.clone();
    metric.label = doc.label.clone();
    metric.short_label = doc.short_label.clone();
    metric.description = doc.description.clone();
    metric.value_format = doc.value_format.clone();
    Ok(metric)
}

/// Declared metric type, else inferred from which inputs are present.
fn metric_kind(doc: &MetricDocument) -> &'static str {
    let declared = doc.kind.as_deref().map(|k| k.trim().to_ascii_lowercase());
    match declared.as_deref() {
        Some("simple") => "simple",
        Some("derived") => "derived",
        Some("ratio") => "ratio",
        _ if doc.numerator.is_some() || doc.denominator.is_some() => "ratio",
        _ if doc.measure.is_none() && doc.expr.is_some() => "derived",
        _ => "simple",
    }
}

fn lower_pop(doc: &PopDocument) -> PopConfig {
    let outputs = if doc.outputs.is_empty() {
        ALL_OUTPUTS.to_vec()
    } else {
        doc.outputs.iter().map(|o| PopOutput::from_name(o)).collect()
    };
    PopConfig::new(
        doc.comparisons
            .iter()
            .map(|c| PopComparison::from_name(c))
            .collect(),
        outputs,
    )
}
