//! Integration tests for lowering model documents.

use std::collections::BTreeMap;

use mantis_lookml::document::{
    DimensionDocument, EntityDocument, MeasureDocument, MetricDocument, ModelDocument, PopDocument,
};
use mantis_lookml::lowering::{lower, lower_all};
use mantis_lookml::model::{
    Aggregation, DimensionKind, EntityKind, Granularity, MetricKind, PopComparison, PopOutput,
};
use mantis_lookml::semantic::ModelError;

fn orders_json() -> &'static str {
    r#"{
        "name": "orders",
        "table": "sales.orders",
        "entities": [
            {"name": "order", "type": "primary", "expr": "order_id"},
            {"name": "customer", "type": "foreign", "expr": "customer_id", "complete": true}
        ],
        "dimensions": [
            {"name": "status", "type": "categorical", "expr": "order_status"},
            {"name": "ordered_at", "type": "time", "expr": "created_at", "granularity": "day"}
        ],
        "measures": [
            {"name": "revenue", "agg": "sum", "expr": "amount"},
            {"name": "order_count", "agg": "count"}
        ],
        "metrics": [
            {"name": "total_revenue", "measure": "revenue",
             "pop": {"comparisons": ["prior_year", "mom"]}},
            {"name": "aov", "numerator": "revenue", "denominator": "order_count"},
            {"name": "net", "expr": "total_revenue - refunds", "metrics": ["total_revenue"]}
        ],
        "default_time_dimension": "ordered_at"
    }"#
}

#[test]
fn test_lower_json_document() {
    let doc: ModelDocument = serde_json::from_str(orders_json()).unwrap();
    let model = lower(&doc).unwrap();

    assert_eq!(model.name, "orders");
    assert_eq!(model.table.schema.as_deref(), Some("sales"));
    assert_eq!(model.table.sql_table_name(), "sales.orders");

    assert_eq!(model.entities[0].kind, EntityKind::Primary);
    assert!(model.entities[1].complete);

    assert_eq!(model.dimensions[1].kind, DimensionKind::Time);
    assert_eq!(model.dimensions[1].granularity, Some(Granularity::Day));
    assert_eq!(model.measures[1].agg, Aggregation::Count);
}

#[test]
fn test_metric_kinds_are_inferred() {
    let doc: ModelDocument = serde_json::from_str(orders_json()).unwrap();
    let model = lower(&doc).unwrap();

    assert!(matches!(model.metrics[0].kind, MetricKind::Simple { .. }));
    assert!(matches!(model.metrics[1].kind, MetricKind::Ratio { .. }));
    match &model.metrics[2].kind {
        MetricKind::Derived { expr, metrics } => {
            assert_eq!(expr, "total_revenue - refunds");
            assert_eq!(metrics, &vec!["total_revenue".to_string()]);
        }
        other => panic!("expected derived metric, got {other:?}"),
    }
}

#[test]
fn test_pop_without_outputs_gets_all_outputs() {
    let doc: ModelDocument = serde_json::from_str(orders_json()).unwrap();
    let model = lower(&doc).unwrap();

    let pop = model.metrics[0].pop.as_ref().unwrap();
    assert_eq!(
        pop.comparisons,
        vec![PopComparison::PriorYear, PopComparison::PriorMonth]
    );
    assert_eq!(
        pop.outputs,
        vec![PopOutput::Previous, PopOutput::Change, PopOutput::PctChange]
    );
}

#[test]
fn test_unknown_vocabulary_never_fails() {
    let doc = ModelDocument {
        name: "events".into(),
        table: Some("events".into()),
        entities: vec![EntityDocument {
            name: "event".into(),
            kind: "surrogate".into(),
            ..Default::default()
        }],
        dimensions: vec![DimensionDocument {
            name: "happened_at".into(),
            kind: "temporal".into(),
            expr: Some("ts".into()),
            granularity: Some("fortnight".into()),
            ..Default::default()
        }],
        measures: vec![MeasureDocument {
            name: "score".into(),
            agg: "geomean".into(),
            expr: Some("score".into()),
            ..Default::default()
        }],
        metrics: vec![MetricDocument {
            name: "score_total".into(),
            measure: Some("score".into()),
            pop: Some(PopDocument {
                comparisons: vec!["prior_decade".into()],
                outputs: vec!["ratio".into()],
            }),
            ..Default::default()
        }],
        ..Default::default()
    };
    let model = lower(&doc).unwrap();

    assert_eq!(model.entities[0].kind, EntityKind::Foreign);
    assert_eq!(model.dimensions[0].kind, DimensionKind::Categorical);
    assert_eq!(model.dimensions[0].granularity, None);
    assert_eq!(model.measures[0].agg, Aggregation::Sum);
    let pop = model.metrics[0].pop.as_ref().unwrap();
    assert_eq!(pop.comparisons, vec![PopComparison::PriorYear]);
    assert_eq!(pop.outputs, vec![PopOutput::Previous]);
}

#[test]
fn test_structural_errors_name_model_and_field() {
    let base = ModelDocument {
        name: "orders".into(),
        table: Some("orders".into()),
        ..Default::default()
    };

    let mut no_sql = base.clone();
    no_sql.dimensions.push(DimensionDocument {
        name: "status".into(),
        ..Default::default()
    });
    let err = lower(&no_sql).unwrap_err();
    assert!(matches!(err, ModelError::MissingDimensionSql { .. }));
    assert!(err.to_string().contains("'status'"));

    let mut bad_variant = base.clone();
    bad_variant.dimensions.push(DimensionDocument {
        name: "region".into(),
        variants: BTreeMap::from([("sales".to_string(), "sales_region".to_string())]),
        primary_variant: Some("billing".into()),
        ..Default::default()
    });
    assert!(matches!(
        lower(&bad_variant),
        Err(ModelError::UnknownPrimaryVariant { .. })
    ));

    let mut no_expr = base.clone();
    no_expr.measures.push(MeasureDocument {
        name: "revenue".into(),
        agg: "sum".into(),
        ..Default::default()
    });
    assert!(matches!(
        lower(&no_expr),
        Err(ModelError::MissingMeasureExpr { agg: "sum", .. })
    ));

    let mut bad_ratio = base.clone();
    bad_ratio.metrics.push(MetricDocument {
        name: "aov".into(),
        kind: Some("ratio".into()),
        numerator: Some("revenue".into()),
        ..Default::default()
    });
    assert_eq!(
        lower(&bad_ratio).unwrap_err().to_string(),
        "model 'orders': ratio metric 'aov' is missing its denominator"
    );

    let mut no_table = base;
    no_table.table = None;
    assert!(matches!(lower(&no_table), Err(ModelError::MissingTable { .. })));
}

#[test]
fn test_lower_all_keeps_good_models() {
    let good: ModelDocument = serde_json::from_str(orders_json()).unwrap();
    let bad = ModelDocument {
        name: "broken".into(),
        ..Default::default()
    };
    let (models, errors) = lower_all(&[bad, good]);

    assert_eq!(models.len(), 1);
    assert_eq!(models[0].name, "orders");
    assert_eq!(errors, vec![ModelError::MissingTable { model: "broken".into() }]);
}
