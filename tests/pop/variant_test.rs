//! Integration tests for metric variant expansion.

use mantis_lookml::model::{
    Metric, MetricVariant, PopComparison, PopConfig, PopOutput, VariantKind,
};

fn revenue(comparisons: Vec<PopComparison>, outputs: Vec<PopOutput>) -> Metric {
    Metric::simple("revenue", "revenue_sum").with_pop(PopConfig::new(comparisons, outputs))
}

fn names(metric: &Metric) -> Vec<String> {
    metric
        .variants
        .iter()
        .map(|v| v.resolve_name(metric))
        .collect()
}

#[test]
fn test_two_comparisons_three_outputs_make_seven_variants() {
    let mut metric = revenue(
        vec![PopComparison::PriorYear, PopComparison::PriorQuarter],
        vec![PopOutput::Previous, PopOutput::Change, PopOutput::PctChange],
    );
    metric.expand_variants();

    assert_eq!(metric.variants.len(), 1 + 2 * 3);
    assert_eq!(metric.variants[0], MetricVariant::Base);
    assert_eq!(
        names(&metric),
        vec![
            "revenue",
            "revenue_py",
            "revenue_py_change",
            "revenue_py_pct_change",
            "revenue_pq",
            "revenue_pq_change",
            "revenue_pq_pct_change",
        ]
    );
}

#[test]
fn test_expansion_is_stable_when_repeated() {
    let mut metric = revenue(
        vec![PopComparison::PriorYear, PopComparison::PriorQuarter],
        vec![PopOutput::Previous, PopOutput::Change, PopOutput::PctChange],
    )
    .with_benchmark("smb", "segment = 'SMB'");

    metric.expand_variants();
    let first = metric.variants.clone();
    metric.expand_variants();
    metric.expand_variants();

    assert_eq!(metric.variants, first);
    assert_eq!(metric.variants.len(), 8);
}

#[test]
fn test_benchmarks_follow_pop_variants() {
    let mut metric = revenue(vec![PopComparison::PriorWeek], vec![PopOutput::Change])
        .with_benchmark("smb", "segment = 'SMB'")
        .with_benchmark("enterprise", "segment = 'Enterprise'");
    metric.expand_variants();

    let kinds: Vec<_> = metric.variants.iter().map(MetricVariant::kind).collect();
    assert_eq!(
        kinds,
        vec![
            VariantKind::Base,
            VariantKind::Pop,
            VariantKind::Benchmark,
            VariantKind::Benchmark
        ]
    );
    assert_eq!(
        names(&metric)[2..],
        ["revenue_smb_benchmark", "revenue_enterprise_benchmark"]
    );
}

#[test]
fn test_names_are_derived_not_stored() {
    let mut metric = revenue(vec![PopComparison::PriorMonth], vec![PopOutput::PctChange]);
    metric.expand_variants();
    metric.name = "gross_revenue".to_string();
    assert_eq!(names(&metric)[1], "gross_revenue_pm_pct_change");
}

#[test]
fn test_suffix_tables() {
    let variant = MetricVariant::Pop {
        comparison: PopComparison::PriorQuarter,
        output: PopOutput::Previous,
    };
    assert_eq!(variant.suffix(), "_pq");
    assert_eq!(MetricVariant::Base.suffix(), "");
    assert_eq!(
        MetricVariant::Benchmark {
            slice: "west".into()
        }
        .suffix(),
        "_west_benchmark"
    );
}
