//! Integration tests for period-over-period rendering strategies.

use mantis_lookml::labels::LabelConfig;
use mantis_lookml::model::{
    Dimension, Entity, Granularity, Measure, Metric, PopComparison, PopConfig, PopOutput,
    SemanticModel, TableRef,
};
use mantis_lookml::pop::{PopContext, PopRenderer, PopStrategy, RenderedMeasure};
use mantis_lookml::sql::{Dialect, KnownFields, Qualifier};

fn orders(metric: Metric) -> SemanticModel {
    let mut model = SemanticModel::new("orders", TableRef::new("orders"))
        .with_entity(Entity::primary("order_id"))
        .with_dimension(Dimension::time("ordered_at", "ordered_at", Granularity::Day))
        .with_measure(Measure::sum("revenue", "amount"))
        .with_measure(Measure::count("order_count"))
        .with_metric(metric)
        .with_default_time_dimension("ordered_at");
    model.expand_variants();
    model
}

fn render(model: &SemanticModel, strategy: PopStrategy) -> (Vec<RenderedMeasure>, Vec<String>) {
    let labels = LabelConfig::default();
    let qualifier = Qualifier::new(Dialect::DuckDb);
    let known: KnownFields = [("order_id", "order_id"), ("ordered_at", "ordered_at_raw")]
        .into_iter()
        .collect();
    let joined = KnownFields::new();
    let mut renderer = PopRenderer::new(
        strategy,
        PopContext {
            model,
            labels: &labels,
            qualifier: &qualifier,
            known: &known,
            joined: &joined,
            comparison_field: "is_comparison_period",
        },
    );
    let measures = model
        .metrics
        .iter()
        .flat_map(|m| renderer.render_metric(m))
        .collect();
    (measures, renderer.into_warnings())
}

fn names(measures: &[RenderedMeasure]) -> Vec<&str> {
    measures.iter().map(|m| m.name.as_str()).collect()
}

// ============================================================================
// Dynamic
// ============================================================================

#[test]
fn test_dynamic_two_comparisons_one_output_render_three_measures() {
    let model = orders(Metric::simple("total_revenue", "revenue").with_pop(PopConfig::new(
        vec![PopComparison::PriorYear, PopComparison::PriorMonth],
        vec![PopOutput::Change],
    )));
    let (measures, warnings) = render(&model, PopStrategy::Dynamic);

    assert!(warnings.is_empty());
    assert_eq!(
        names(&measures),
        vec![
            "total_revenue_prior",
            "total_revenue_change",
            "total_revenue_pct_change"
        ]
    );
    assert_eq!(measures[1].sql.as_deref(), Some("${total_revenue} - ${total_revenue_prior}"));
    assert_eq!(measures[2].value_format_name.as_deref(), Some("percent_1"));
}

#[test]
fn test_dynamic_prior_filters_on_comparison_field() {
    let model = orders(Metric::simple("total_revenue", "revenue").with_pop(PopConfig::new(
        vec![PopComparison::PriorYear],
        vec![PopOutput::Previous],
    )));
    let (measures, _) = render(&model, PopStrategy::Dynamic);

    let prior = &measures[0];
    assert_eq!(prior.measure_type, "sum");
    assert_eq!(prior.sql.as_deref(), Some("${TABLE}.amount"));
    assert_eq!(prior.filters.len(), 1);
    assert_eq!(prior.filters[0].field, "is_comparison_period");
    assert_eq!(prior.filters[0].value, "yes");
    assert_eq!(prior.label, "Total Revenue (PP)");
}

#[test]
fn test_dynamic_count_without_key_restricts_with_case() {
    let mut model = orders(Metric::simple("orders_placed", "order_count").with_pop(
        PopConfig::new(vec![PopComparison::PriorYear], vec![PopOutput::Previous]),
    ));
    model.entities.clear();
    let (measures, _) = render(&model, PopStrategy::Dynamic);

    // Plain counts accept filters.
    assert_eq!(measures[0].measure_type, "count");
    assert_eq!(measures[0].filters.len(), 1);
}

#[test]
fn test_dynamic_falls_back_to_materialized_for_ratio() {
    let model = orders(Metric::ratio("aov", "revenue", "order_count").with_pop(PopConfig::new(
        vec![PopComparison::PriorYear],
        vec![PopOutput::Previous],
    )));
    let (measures, _) = render(&model, PopStrategy::Dynamic);

    assert_eq!(names(&measures), vec!["aov_py"]);
    assert_eq!(measures[0].measure_type, "period_over_period");
}

// ============================================================================
// Materialized
// ============================================================================

#[test]
fn test_materialized_measure_fields() {
    let model = orders(
        Metric::simple("total_revenue", "revenue")
            .with_group("Metrics.Sales")
            .with_pop(PopConfig::new(
                vec![PopComparison::PriorYear, PopComparison::PriorQuarter],
                vec![PopOutput::Previous, PopOutput::PctChange],
            )),
    );
    let (measures, _) = render(&model, PopStrategy::Materialized);

    assert_eq!(
        names(&measures),
        vec![
            "total_revenue_py",
            "total_revenue_py_pct_change",
            "total_revenue_pq",
            "total_revenue_pq_pct_change"
        ]
    );
    let pct = &measures[1];
    assert_eq!(pct.measure_type, "period_over_period");
    assert_eq!(pct.based_on.as_deref(), Some("total_revenue"));
    assert_eq!(pct.based_on_time.as_deref(), Some("ordered_at_date"));
    assert_eq!(pct.period, Some("year"));
    assert_eq!(pct.kind, Some("relative_change"));
    assert_eq!(pct.value_format_name.as_deref(), Some("percent_1"));
    assert_eq!(pct.group_label.as_deref(), Some("Sales"));
    assert_eq!(measures[2].period, Some("quarter"));
    assert_eq!(measures[2].kind, Some("previous"));
}

#[test]
fn test_materialized_without_time_dimension_warns_once() {
    let mut model = orders(Metric::simple("total_revenue", "revenue").with_pop(PopConfig::new(
        vec![PopComparison::PriorYear, PopComparison::PriorMonth],
        vec![PopOutput::Change],
    )));
    model.default_time_dimension = None;
    let (measures, warnings) = render(&model, PopStrategy::Materialized);

    assert!(measures.is_empty());
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("total_revenue"));
}

#[test]
fn test_measure_time_dimension_is_used_when_metric_has_none() {
    let mut model = orders(Metric::simple("total_revenue", "revenue").with_pop(PopConfig::new(
        vec![PopComparison::PriorYear],
        vec![PopOutput::Previous],
    )));
    model.default_time_dimension = None;
    model.dimensions.push(Dimension::time("shipped_at", "shipped_at", Granularity::Month));
    model.measures[0].agg_time_dimension = Some("shipped_at".into());
    let (measures, _) = render(&model, PopStrategy::Materialized);

    assert_eq!(measures[0].based_on_time.as_deref(), Some("shipped_at_month"));
}

// ============================================================================
// Benchmarks
// ============================================================================

#[test]
fn test_benchmark_restricts_measure_to_slice() {
    let model = orders(
        Metric::simple("total_revenue", "revenue").with_benchmark("web", "channel = 'web'"),
    );
    let (measures, _) = render(&model, PopStrategy::Materialized);

    assert_eq!(names(&measures), vec!["total_revenue_web_benchmark"]);
    assert_eq!(
        measures[0].sql.as_deref(),
        Some("CASE WHEN ${TABLE}.channel = 'web' THEN ${TABLE}.amount END")
    );
    assert_eq!(measures[0].label, "Total Revenue (Web Benchmark)");
}

#[test]
fn test_benchmark_on_ratio_is_skipped_with_warning() {
    let model = orders(
        Metric::ratio("aov", "revenue", "order_count").with_benchmark("web", "channel = 'web'"),
    );
    let (measures, warnings) = render(&model, PopStrategy::Materialized);

    assert!(measures.is_empty());
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("requires a simple metric"));
}
