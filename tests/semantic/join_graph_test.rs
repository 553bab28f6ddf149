//! Integration tests for explore join inference.

use std::collections::HashMap;

use mantis_lookml::model::{Entity, Measure, Metric, SemanticModel, TableRef};
use mantis_lookml::semantic::{
    infer_joins, ExposeLevel, InferredJoin, JoinOverride, JoinResolver, Relationship,
    MAX_JOIN_DEPTH,
};

fn model(name: &str, entities: Vec<Entity>) -> SemanticModel {
    let mut model = SemanticModel::new(name, TableRef::new(name).with_schema("analytics"));
    model.entities = entities;
    model
}

/// order_items -> orders -> customers -> regions, plus a products dimension.
fn star_schema() -> Vec<SemanticModel> {
    vec![
        model(
            "order_items",
            vec![
                Entity::primary("order_item"),
                Entity::foreign("order"),
                Entity::foreign("product"),
            ],
        )
        .with_measure(Measure::sum("quantity", "qty")),
        model("orders", vec![Entity::primary("order"), Entity::foreign("customer")]),
        model("products", vec![Entity::primary("product")]),
        model("customers", vec![Entity::primary("customer"), Entity::foreign("region")]),
        model("regions", vec![Entity::primary("region")]),
    ]
}

fn summary(joins: &[InferredJoin]) -> Vec<(&str, &str, usize)> {
    joins
        .iter()
        .map(|j| (j.parent_model.as_str(), j.target_model.as_str(), j.depth))
        .collect()
}

#[test]
fn test_breadth_first_order_over_star_schema() {
    let models = star_schema();
    let joins = infer_joins(&models[0], &models, &[], &HashMap::new());

    assert_eq!(
        summary(&joins),
        vec![
            ("order_items", "orders", 1),
            ("order_items", "products", 1),
            ("orders", "customers", 2),
            ("customers", "regions", 3),
        ]
    );
    assert!(joins.iter().all(|j| j.relationship == Relationship::ManyToOne));
    assert_eq!(
        joins[2].sql_on(),
        "${orders.customer} = ${customers.customer}"
    );
}

#[test]
fn test_depth_never_exceeds_bound() {
    let names = ["m0", "m1", "m2", "m3", "m4"];
    let models: Vec<SemanticModel> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let mut entities = vec![Entity::primary(format!("k{i}"))];
            if i + 1 < names.len() {
                entities.push(Entity::foreign(format!("k{}", i + 1)));
            }
            model(name, entities)
        })
        .collect();

    let joins = infer_joins(&models[0], &models, &[], &HashMap::new());
    assert_eq!(joins.len(), MAX_JOIN_DEPTH);
    assert!(joins.iter().all(|j| j.depth <= MAX_JOIN_DEPTH));
    assert!(!joins.iter().any(|j| j.target_model == "m4"));
}

#[test]
fn test_cycle_joins_each_model_once() {
    let models = vec![
        model("a", vec![Entity::primary("ka"), Entity::foreign("kb")]),
        model("b", vec![Entity::primary("kb"), Entity::foreign("kc")]),
        model("c", vec![Entity::primary("kc"), Entity::foreign("ka")]),
    ];
    let joins = infer_joins(&models[0], &models, &[], &HashMap::new());

    let targets: Vec<_> = joins.iter().map(|j| j.target_model.as_str()).collect();
    assert_eq!(targets, vec!["b", "c"]);
    assert!(!targets.contains(&"a"));
}

#[test]
fn test_mutual_foreign_keys_join_once_each_way() {
    let models = vec![
        model("a", vec![Entity::primary("ka"), Entity::foreign("kb")]),
        model("b", vec![Entity::primary("kb"), Entity::foreign("ka")]),
    ];

    let from_a = infer_joins(&models[0], &models, &[], &HashMap::new());
    let from_a: Vec<_> = from_a.iter().map(|j| (j.target_model.as_str(), j.relationship)).collect();
    assert_eq!(from_a, vec![("b", Relationship::ManyToOne)]);

    let from_b = infer_joins(&models[1], &models, &[], &HashMap::new());
    let from_b: Vec<_> = from_b.iter().map(|j| (j.target_model.as_str(), j.relationship)).collect();
    assert_eq!(from_b, vec![("a", Relationship::ManyToOne)]);
}

#[test]
fn test_excluded_model_cuts_the_path_behind_it() {
    let models = star_schema();
    let joins = infer_joins(&models[0], &models, &["orders".to_string()], &HashMap::new());
    assert_eq!(summary(&joins), vec![("order_items", "products", 1)]);
}

#[test]
fn test_override_keyed_by_target_model() {
    let models = star_schema();
    let overrides = HashMap::from([(
        "customers".to_string(),
        JoinOverride {
            relationship: Some(Relationship::OneToOne),
            expose: Some(ExposeLevel::All),
        },
    )]);
    let joins = infer_joins(&models[0], &models, &[], &overrides);

    let customers = joins.iter().find(|j| j.target_model == "customers").unwrap();
    assert_eq!(customers.relationship, Relationship::OneToOne);
    assert_eq!(customers.expose_level, ExposeLevel::All);
    let orders = joins.iter().find(|j| j.target_model == "orders").unwrap();
    assert_eq!(orders.expose_level, ExposeLevel::DimensionsOnly);
}

#[test]
fn test_duplicate_primary_entity_warns_and_skips_join() {
    let models = vec![
        model("orders", vec![Entity::primary("order"), Entity::foreign("customer")]),
        model("customers", vec![Entity::primary("customer")]),
        model("customers_v2", vec![Entity::primary("customer")]),
    ];
    let mut resolver = JoinResolver::default();
    let joins = resolver.resolve(&models[0], &models, &[], &HashMap::new());

    assert!(joins.is_empty());
    assert_eq!(resolver.warnings().len(), 1);
    assert!(resolver.warnings()[0].contains("customers, customers_v2"));
}

#[test]
fn test_fact_metrics_expose_joined_measures() {
    let orders = model("orders", vec![Entity::primary("order"), Entity::foreign("customer")])
        .with_measure(Measure::sum("revenue", "amount"))
        .with_metric(Metric::ratio("revenue_per_customer", "revenue", "customer_count"));
    let customers = model("customers", vec![Entity::primary("customer")])
        .with_measure(Measure::count("customer_count"))
        .with_measure(Measure::sum("credit", "credit_limit"));
    let models = vec![orders, customers];

    let joins = infer_joins(&models[0], &models, &[], &HashMap::new());
    assert_eq!(joins[0].extra_fields, vec!["customer_count"]);
}

#[test]
fn test_child_facts_join_one_to_many_at_fact_level() {
    let models = star_schema();
    let orders = &models[1];
    let joins = infer_joins(orders, &models, &[], &HashMap::new());

    let items = joins.iter().find(|j| j.target_model == "order_items").unwrap();
    assert_eq!(items.relationship, Relationship::OneToMany);
    assert_eq!(items.depth, 1);
    assert_eq!(items.sql_on(), "${orders.order} = ${order_items.order}");
    // order_items' own parents are not reached through the child.
    assert!(!joins.iter().any(|j| j.target_model == "products"));
}
