//! Integration tests for label resolution.

use insta::assert_snapshot;
use mantis_lookml::labels::{parse_group, FieldLabel, LabelConfig, Labeled, PopStyle};
use mantis_lookml::model::{Metric, PopComparison, PopOutput};

fn siblings() -> (FieldLabel, FieldLabel) {
    // 24 and 8 characters.
    (
        FieldLabel::new("net_revenue_after_refund").with_short_label("Net Rev"),
        FieldLabel::new("discount").with_short_label("Disc"),
    )
}

#[test]
fn test_conformity_spreads_short_labels_across_group() {
    let (long, short) = siblings();
    let config = LabelConfig::new(20);
    let labels = config.resolve_group_labels(&[&long as &dyn Labeled, &short]);

    assert_eq!(labels["net_revenue_after_refund"], "Net Rev");
    assert_eq!(labels["discount"], "Disc");
}

#[test]
fn test_without_conformity_only_long_label_switches() {
    let (long, short) = siblings();
    let config = LabelConfig::new(20).with_group_conformity(false);
    let labels = config.resolve_group_labels(&[&long as &dyn Labeled, &short]);

    assert_eq!(labels["net_revenue_after_refund"], "Net Rev");
    assert_eq!(labels["discount"], "Discount");
}

#[test]
fn test_field_without_short_label_keeps_full_label() {
    let long = FieldLabel::new("net_revenue_after_refund");
    let config = LabelConfig::new(20);
    assert_eq!(config.effective_label(&long), "Net Revenue After Refund");
}

#[test]
fn test_explicit_label_beats_title_case() {
    let field = FieldLabel::new("aov").with_label("Average Order Value");
    assert_eq!(LabelConfig::default().base_label(&field), "Average Order Value");
    assert_eq!(
        LabelConfig::default().base_label(&FieldLabel::new("order_status")),
        "Order Status"
    );
}

#[test]
fn test_group_paths() {
    let metrics = parse_group("Metrics.Revenue").unwrap();
    assert_eq!(metrics.view_label.as_deref(), Some("  Metrics"));
    assert_eq!(metrics.group_label.as_deref(), Some("Revenue"));

    let orders = parse_group("Orders.Status.Extra").unwrap();
    assert_eq!(orders.view_label.as_deref(), Some(" Orders"));
    assert_eq!(orders.group_label.as_deref(), Some("Status"));

    let single = parse_group("Finance").unwrap();
    assert_eq!(single.view_label, None);
    assert_eq!(single.group_label.as_deref(), Some("Finance"));

    assert!(parse_group("").is_none());
}

#[test]
fn test_pop_label_styles() {
    let metric = Metric::simple("revenue", "revenue_sum").with_short_label("Rev");

    let compact = LabelConfig::default();
    assert_snapshot!(
        compact.pop_label(&metric, PopComparison::PriorYear, PopOutput::Change),
        @"Rev Δ PY"
    );

    let standard = LabelConfig::default().with_pop_style(PopStyle::Standard);
    assert_snapshot!(
        standard.pop_label(&metric, PopComparison::PriorMonth, PopOutput::PctChange),
        @"Revenue % Change (PM)"
    );

    let verbose = LabelConfig::default().with_pop_style(PopStyle::Verbose);
    assert_snapshot!(
        verbose.pop_label(&metric, PopComparison::PriorQuarter, PopOutput::Previous),
        @"Revenue - Prior Quarter"
    );
}

#[test]
fn test_unknown_pop_style_is_compact() {
    assert_eq!(PopStyle::from_name("fancy"), PopStyle::Compact);
}

#[test]
fn test_long_pop_label_is_truncated() {
    let metric = Metric::simple("customer_lifetime_value", "clv");
    let config = LabelConfig::new(24).with_pop_style(PopStyle::Verbose);
    let label = config.pop_label(&metric, PopComparison::PriorYear, PopOutput::Change);

    assert_eq!(label.chars().count(), 23);
    assert!(label.ends_with('…'));
    assert_snapshot!(label, @"Customer Lifetime Valu…");
}
