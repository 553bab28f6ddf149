//! Rendering one semantic model into its view documents.
//!
//! ```text
//! SemanticModel
//!   ├── base      view: orders       entities, dimensions, hidden measures,
//!   │                                dimensions_only set
//!   ├── metrics   view: +orders      one measure per metric
//!   └── pop       view: +orders      PoP and benchmark variants (if any)
//! ```
//!
//! Field SQL is qualified in declaration order against a growing
//! [`KnownFields`] map, so a dimension can reference entities and dimensions
//! declared before it.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::labels::{parse_group, title_case, GroupLabels, LabelConfig, Labeled};
use crate::model::{Dimension, Granularity, MetricKind, SemanticModel};
use crate::pop::{PopContext, PopRenderer, PopStrategy, RenderedMeasure};
use crate::sql::{KnownFields, Qualifier};

use super::lookml::{
    AllowedValue, DimensionDoc, DimensionGroupDoc, ParameterDoc, SetDoc, ViewDoc,
    DIMENSIONS_ONLY_SET,
};

/// Name of the date pivot parameter and of the dimension group it drives.
const DATE_SELECTOR: &str = "date_selector";
const SELECTED_DATE: &str = "selected_date";

/// The documents and labels of one model.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedView {
    pub name: String,
    pub base: ViewDoc,
    pub metrics: Option<ViewDoc>,
    pub pop: Option<ViewDoc>,
    /// Field name to display label, in render order.
    pub labels: Vec<(String, String)>,
    pub warnings: Vec<String>,
}

/// Renders models with one run's qualifier, labels and PoP strategy.
#[derive(Debug)]
pub struct ViewRenderer<'a> {
    qualifier: &'a Qualifier,
    labels: &'a LabelConfig,
    strategy: PopStrategy,
    comparison_field: &'a str,
}

/// State accumulated while rendering the base view.
struct BaseState {
    doc: ViewDoc,
    known: KnownFields,
    dimensions_only: Vec<String>,
    labels: Vec<(String, String)>,
    names: HashSet<String>,
}

impl<'a> ViewRenderer<'a> {
    pub fn new(
        qualifier: &'a Qualifier,
        labels: &'a LabelConfig,
        strategy: PopStrategy,
        comparison_field: &'a str,
    ) -> Self {
        Self {
            qualifier,
            labels,
            strategy,
            comparison_field,
        }
    }

    /// Render `model`. `joined` maps measures of the models its explore
    /// joins to their `view.measure` fields, for metrics built on them.
    pub fn render(&self, model: &SemanticModel, joined: &KnownFields) -> RenderedView {
        let mut base = BaseState {
            doc: ViewDoc::new(&model.name),
            known: KnownFields::new(),
            dimensions_only: Vec::new(),
            labels: Vec::new(),
            names: HashSet::new(),
        };
        base.doc.sql_table_name = Some(model.table.sql_table_name());
        base.doc.label = model.label.clone();

        self.render_entities(model, &mut base);
        self.render_dimensions(model, &mut base);
        self.render_date_selector(model, &mut base);
        self.render_measures(model, &mut base);

        if !base.dimensions_only.is_empty() {
            base.doc.sets.push(SetDoc {
                name: DIMENSIONS_ONLY_SET.to_string(),
                fields: std::mem::take(&mut base.dimensions_only),
            });
        }

        let mut labels = base.labels;
        let mut warnings = Vec::new();
        let ctx = self.pop_context(model, &base.known, joined);
        let metrics = self.render_metrics(&ctx, &mut labels, &mut warnings);
        let pop = self.render_variants(ctx, &base.names, &mut labels, &mut warnings);

        RenderedView {
            name: model.name.clone(),
            base: base.doc,
            metrics,
            pop,
            labels,
            warnings,
        }
    }

    /// Labels of sibling fields, resolved per `group`.
    fn group_labels<'f, T: Labeled + 'f>(
        &self,
        fields: impl IntoIterator<Item = (&'f T, Option<&'f str>)>,
    ) -> HashMap<String, String> {
        let mut groups: BTreeMap<Option<&str>, Vec<&dyn Labeled>> = BTreeMap::new();
        for (field, group) in fields {
            groups.entry(group).or_default().push(field);
        }
        groups
            .values()
            .flat_map(|siblings| self.labels.resolve_group_labels(siblings))
            .collect()
    }

    fn render_entities(&self, model: &SemanticModel, base: &mut BaseState) {
        let labels = self.group_labels(model.entities.iter().map(|e| (e, None)));
        for entity in &model.entities {
            if !base.names.insert(entity.name.clone()) {
                continue;
            }
            let sql = self.qualifier.qualify(&entity.expr, &base.known);
            base.known.insert(entity.name.clone(), entity.name.clone());

            let label = labels
                .get(&entity.name)
                .cloned()
                .unwrap_or_else(|| title_case(&entity.name));
            base.doc.dimensions.push(DimensionDoc {
                name: entity.name.clone(),
                dimension_type: "string",
                sql,
                label: label.clone(),
                primary_key: entity.is_primary(),
                hidden: true,
                view_label: None,
                group_label: None,
                description: entity.description.clone(),
            });
            base.dimensions_only.push(entity.name.clone());
            base.labels.push((entity.name.clone(), label));
        }
    }

    fn render_dimensions(&self, model: &SemanticModel, base: &mut BaseState) {
        let labels = self.group_labels(
            model
                .dimensions
                .iter()
                .map(|d| (d, d.group.as_deref())),
        );

        for dimension in &model.dimensions {
            let label = labels
                .get(&dimension.name)
                .cloned()
                .unwrap_or_else(|| title_case(&dimension.name));
            let group = dimension
                .group
                .as_deref()
                .and_then(parse_group)
                .unwrap_or_default();

            let forms = dimension.forms();
            for form in &forms {
                if !base.names.insert(form.field_name.clone()) {
                    tracing::debug!(
                        model = %model.name,
                        field = %form.field_name,
                        "skipping duplicate dimension field"
                    );
                    continue;
                }
                let sql = self.qualifier.qualify(&form.sql, &base.known);
                let form_label = match &form.variant {
                    Some(variant) if form.field_name != dimension.name => {
                        format!("{label} ({})", title_case(variant))
                    }
                    _ => label.clone(),
                };
                self.push_dimension(base, dimension, &form.field_name, sql, form_label, &group);
            }

            for form in &forms {
                let key = match &form.variant {
                    Some(variant) if form.field_name != dimension.name => {
                        format!("{}_{}", dimension.name, variant)
                    }
                    _ => dimension.name.clone(),
                };
                base.known
                    .insert(key, dimension.reference_field(&form.field_name));
            }
        }
    }

    fn push_dimension(
        &self,
        base: &mut BaseState,
        dimension: &Dimension,
        field_name: &str,
        sql: String,
        label: String,
        group: &GroupLabels,
    ) {
        if !dimension.is_time() {
            base.doc.dimensions.push(DimensionDoc {
                name: field_name.to_string(),
                dimension_type: "string",
                sql,
                label: label.clone(),
                primary_key: false,
                hidden: dimension.hidden,
                view_label: group.view_label.clone(),
                group_label: group.group_label.clone(),
                description: dimension.description.clone(),
            });
            base.dimensions_only.push(field_name.to_string());
            base.labels.push((field_name.to_string(), label));
            return;
        }

        let timeframes = dimension.timeframes();
        for timeframe in timeframes.iter().filter(|tf| **tf != "raw") {
            let field = format!("{field_name}_{timeframe}");
            base.dimensions_only.push(field.clone());
            base.labels
                .push((field, format!("{label} {}", title_case(timeframe))));
        }
        base.doc.dimension_groups.push(DimensionGroupDoc {
            name: field_name.to_string(),
            group_type: "time",
            timeframes,
            sql,
            label,
            hidden: dimension.hidden,
            view_label: group.view_label.clone(),
            group_label: group.group_label.clone(),
            description: dimension.description.clone(),
        });
    }

    /// Parameter choosing among the model's selectable time dimensions, and
    /// the dimension group following it.
    fn render_date_selector(&self, model: &SemanticModel, base: &mut BaseState) {
        let choices: Vec<&Dimension> = model
            .date_selector
            .iter()
            .filter_map(|name| model.dimension(name))
            .filter(|d| d.is_time())
            .collect();
        if choices.is_empty() || !base.names.insert(SELECTED_DATE.to_string()) {
            return;
        }

        base.doc.parameters.push(ParameterDoc {
            name: DATE_SELECTOR.to_string(),
            parameter_type: "unquoted",
            label: title_case(DATE_SELECTOR),
            allowed_values: choices
                .iter()
                .map(|d| AllowedValue {
                    label: self.labels.base_label(*d),
                    value: d.name.clone(),
                })
                .collect(),
            default_value: choices.first().map(|d| d.name.clone()),
        });

        let mut sql = String::new();
        for (i, dimension) in choices.iter().enumerate() {
            let keyword = if i == 0 { "if" } else { "elsif" };
            sql.push_str(&format!(
                "{{% {keyword} {DATE_SELECTOR}._parameter_value == '{}' %}}${{{}}}",
                dimension.name,
                dimension.reference_field(&dimension.name)
            ));
        }
        sql.push_str("{% endif %}");

        // Coarsest grain every choice supports.
        let granularity: Option<Granularity> =
            choices.iter().filter_map(|d| d.granularity).max();
        let timeframes = Granularity::timeframes(granularity);
        let label = title_case(SELECTED_DATE);
        for timeframe in timeframes.iter().filter(|tf| **tf != "raw") {
            let field = format!("{SELECTED_DATE}_{timeframe}");
            base.dimensions_only.push(field.clone());
            base.labels
                .push((field, format!("{label} {}", title_case(timeframe))));
        }
        base.doc.dimension_groups.push(DimensionGroupDoc {
            name: SELECTED_DATE.to_string(),
            group_type: "time",
            timeframes,
            sql,
            label,
            hidden: false,
            view_label: None,
            group_label: None,
            description: None,
        });
    }

    fn render_measures(&self, model: &SemanticModel, base: &mut BaseState) {
        let labels = self.group_labels(model.measures.iter().map(|m| (m, m.group.as_deref())));
        let primary_key = model.primary_entity().map(|e| e.expr.as_str());

        for measure in &model.measures {
            if !base.names.insert(measure.name.clone()) {
                continue;
            }
            let aggregate = measure
                .aggregate(primary_key)
                .map_sql(|sql| self.qualifier.qualify(sql, &base.known));
            let label = labels
                .get(&measure.name)
                .cloned()
                .unwrap_or_else(|| title_case(&measure.name));
            let group = measure
                .group
                .as_deref()
                .and_then(parse_group)
                .unwrap_or_default();

            let mut rendered =
                RenderedMeasure::from_aggregate(measure.name.clone(), aggregate, label.clone());
            rendered.hidden = true;
            rendered.view_label = group.view_label;
            rendered.group_label = group.group_label;
            rendered.description = measure.description.clone();
            base.doc.measures.push(rendered);
            base.labels.push((measure.name.clone(), label));
        }
    }

    fn pop_context<'m>(
        &self,
        model: &'m SemanticModel,
        known: &'m KnownFields,
        joined: &'m KnownFields,
    ) -> PopContext<'m>
    where
        'a: 'm,
    {
        PopContext {
            model,
            labels: self.labels,
            qualifier: self.qualifier,
            known,
            joined,
            comparison_field: self.comparison_field,
        }
    }

    fn render_metrics(
        &self,
        ctx: &PopContext<'_>,
        labels: &mut Vec<(String, String)>,
        warnings: &mut Vec<String>,
    ) -> Option<ViewDoc> {
        let model = ctx.model;
        if model.metrics.is_empty() {
            return None;
        }

        // Metrics may reference measures and each other by name; local names
        // shadow joined measures.
        let mut metric_known = ctx.known.clone();
        for name in model
            .measures
            .iter()
            .map(|m| &m.name)
            .chain(model.metrics.iter().map(|m| &m.name))
        {
            metric_known.insert(name.clone(), name.clone());
        }
        for (measure, field) in ctx.joined.iter() {
            metric_known.insert(measure, field);
        }
        let field_ref = |name: &str| format!("${{{}}}", metric_known.get(name).unwrap_or(name));

        let metric_labels =
            self.group_labels(model.metrics.iter().map(|m| (m, m.group.as_deref())));
        let mut doc = ViewDoc::refinement(&model.name);

        for metric in &model.metrics {
            let label = metric_labels
                .get(&metric.name)
                .cloned()
                .unwrap_or_else(|| title_case(&metric.name));

            let mut rendered = match &metric.kind {
                MetricKind::Simple { .. } => match ctx.simple_aggregate(metric) {
                    Ok(Some(aggregate)) => {
                        RenderedMeasure::from_aggregate(metric.name.clone(), aggregate, label.clone())
                    }
                    Ok(None) => continue,
                    Err(skipped) => {
                        tracing::warn!(model = %model.name, "{skipped}");
                        warnings.push(skipped.to_string());
                        continue;
                    }
                },
                MetricKind::Derived { expr, .. } => {
                    let mut rendered =
                        RenderedMeasure::new(metric.name.clone(), "number", label.clone());
                    rendered.sql = Some(self.qualifier.qualify(expr, &metric_known));
                    rendered
                }
                MetricKind::Ratio {
                    numerator,
                    denominator,
                } => {
                    let mut rendered =
                        RenderedMeasure::new(metric.name.clone(), "number", label.clone());
                    rendered.sql = Some(format!(
                        "1.0 * {} / NULLIF({}, 0)",
                        field_ref(numerator),
                        field_ref(denominator)
                    ));
                    rendered
                }
            };

            let group = metric
                .group
                .as_deref()
                .and_then(parse_group)
                .unwrap_or_default();
            rendered.view_label = group.view_label;
            rendered.group_label = group.group_label;
            rendered.description = metric.description.clone();
            rendered.value_format_name = metric.value_format.clone();
            doc.measures.push(rendered);
            labels.push((metric.name.clone(), label));
        }

        (!doc.measures.is_empty()).then_some(doc)
    }

    fn render_variants(
        &self,
        ctx: PopContext<'_>,
        taken: &HashSet<String>,
        labels: &mut Vec<(String, String)>,
        warnings: &mut Vec<String>,
    ) -> Option<ViewDoc> {
        let model = ctx.model;
        if !model.has_variants() {
            return None;
        }

        let mut renderer = PopRenderer::new(self.strategy, ctx);
        renderer.reserve(taken.iter().cloned());
        renderer.reserve(model.metrics.iter().map(|m| m.name.clone()));

        let mut doc = ViewDoc::refinement(&model.name);
        for metric in &model.metrics {
            let view_label = metric
                .group
                .as_deref()
                .and_then(parse_group)
                .and_then(|g| g.view_label);
            for mut measure in renderer.render_metric(metric) {
                if measure.view_label.is_none() {
                    measure.view_label = view_label.clone();
                }
                labels.push((measure.name.clone(), measure.label.clone()));
                doc.measures.push(measure);
            }
        }
        for warning in renderer.into_warnings() {
            if !warnings.contains(&warning) {
                warnings.push(warning);
            }
        }

        (!doc.measures.is_empty()).then_some(doc)
    }
}
