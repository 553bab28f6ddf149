//! Join graph inference from entity relationships.
//!
//! Models are nodes; a foreign entity naming another model's primary entity
//! is a many-to-one edge (a unique entity, a one-to-one edge). Joins for one
//! fact model are found by a bounded breadth-first walk:
//!
//! ```text
//! orders ──customer──▶ customers ──region──▶ regions ──country──▶ countries
//!   ▲      depth 1                  depth 2                 depth 3
//!   │
//! returns   (one-to-many: joined at the fact level only)
//! ```
//!
//! Edges are built once per explore with the explore's exclusions applied,
//! so excluded models never count as join candidates.


use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;

use crate::model::{EntityKind, Metric, SemanticModel};
use crate::sql::{Dialect, Qualifier};

/// Maximum number of hops from the fact model.
pub const MAX_JOIN_DEPTH: usize = 3;

// ============================================================================
// Types
// ============================================================================

/// Cardinality of a join, from the fact side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    ManyToOne,
    OneToMany,
    OneToOne,
    ManyToMany,
}

impl Relationship {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "many_to_one" => Some(Relationship::ManyToOne),
            "one_to_many" => Some(Relationship::OneToMany),
            "one_to_one" => Some(Relationship::OneToOne),
            "many_to_many" => Some(Relationship::ManyToMany),
            _ => None,
        }
    }

    /// LookML spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Relationship::ManyToOne => "many_to_one",
            Relationship::OneToMany => "one_to_many",
            Relationship::OneToOne => "one_to_one",
            Relationship::ManyToMany => "many_to_many",
        }
    }
}

/// Which fields of a joined model an explore exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExposeLevel {
    All,
    DimensionsOnly,
}

impl ExposeLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Some(ExposeLevel::All),
            "dimensions_only" | "dimensions" => Some(ExposeLevel::DimensionsOnly),
            _ => None,
        }
    }
}

/// Per-target overrides of the inferred relationship and exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JoinOverride {
    pub relationship: Option<Relationship>,
    pub expose: Option<ExposeLevel>,
}

/// One join of an explore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InferredJoin {
    pub target_model: String,
    pub parent_model: String,
    pub join_key_entity_name: String,
    pub relationship: Relationship,
    pub expose_level: ExposeLevel,
    /// Entity field on the parent side of `sql_on`.
    pub fact_side_expr_name: String,
    /// Entity field on the joined side of `sql_on`.
    pub joined_side_expr_name: String,
    /// Hops from the fact model, starting at 1.
    pub depth: usize,
    /// Measures of the joined model the fact's metrics need, sorted.
    pub extra_fields: Vec<String>,
}

impl InferredJoin {
    /// `${parent.key} = ${target.key}`
    pub fn sql_on(&self) -> String {
        format!(
            "${{{}.{}}} = ${{{}.{}}}",
            self.parent_model, self.fact_side_expr_name, self.target_model, self.joined_side_expr_name
        )
    }
}

// ============================================================================
// Graph
// ============================================================================

/// A key edge: `source` carries `entity` as a foreign key into `target`.
#[derive(Debug, Clone)]
struct KeyEdge {
    entity: String,
    relationship: Relationship,
    complete: bool,
    source_field: String,
    target_field: String,
    /// Declaration order, for deterministic traversal.
    order: usize,
}

/// A foreign entity matching more than one candidate model.
#[derive(Debug, Clone)]
struct Ambiguity {
    model: NodeIndex,
    entity: String,
    candidates: Vec<String>,
}

/// Entity graph over a set of models.
#[derive(Debug)]
pub struct JoinGraph {
    graph: DiGraph<String, KeyEdge>,
    index: HashMap<String, NodeIndex>,
    ambiguities: Vec<Ambiguity>,
}

impl JoinGraph {
    /// Build the graph over `models`, leaving out `exclusions`.
    ///
    /// Duplicate model names keep their first declaration.
    pub fn build(models: &[SemanticModel], exclusions: &[String]) -> Self {
        let included: Vec<&SemanticModel> = models
            .iter()
            .filter(|m| !exclusions.contains(&m.name))
            .collect();

        let mut graph = DiGraph::new();
        let mut index = HashMap::new();
        for model in &included {
            if !index.contains_key(&model.name) {
                let node = graph.add_node(model.name.clone());
                index.insert(model.name.clone(), node);
            }
        }

        let mut ambiguities = Vec::new();
        let mut order = 0;
        let mut built = HashSet::new();
        for model in &included {
            if !built.insert(model.name.as_str()) {
                continue;
            }
            let source = index[&model.name];
            for entity in model.foreign_entities() {
                let primaries = candidates(&included, model, &entity.name, EntityKind::Primary);
                let (targets, relationship) = if primaries.is_empty() {
                    (
                        candidates(&included, model, &entity.name, EntityKind::Unique),
                        Relationship::OneToOne,
                    )
                } else {
                    (primaries, Relationship::ManyToOne)
                };

                match targets.as_slice() {
                    [] => {}
                    [target] => {
                        let target_field = target
                            .entity(&entity.name)
                            .map(|e| e.name.clone())
                            .unwrap_or_else(|| entity.name.clone());
                        graph.add_edge(
                            source,
                            index[&target.name],
                            KeyEdge {
                                entity: entity.name.clone(),
                                relationship,
                                complete: entity.complete,
                                source_field: entity.name.clone(),
                                target_field,
                                order,
                            },
                        );
                        order += 1;
                    }
                    many => ambiguities.push(Ambiguity {
                        model: source,
                        entity: entity.name.clone(),
                        candidates: many.iter().map(|m| m.name.clone()).collect(),
                    }),
                }
            }
        }

        Self {
            graph,
            index,
            ambiguities,
        }
    }

    pub fn contains(&self, model: &str) -> bool {
        self.index.contains_key(model)
    }

    /// Outgoing key edges of `node` in declaration order.
    fn outgoing(&self, node: NodeIndex) -> Vec<(NodeIndex, &KeyEdge)> {
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .map(|e| (e.target(), e.weight()))
            .collect();
        edges.sort_by_key(|(_, e)| e.order);
        edges
    }

    fn ambiguity_warnings(&self, node: NodeIndex) -> impl Iterator<Item = String> + '_ {
        self.ambiguities
            .iter()
            .filter(move |a| a.model == node)
            .map(|a| {
                format!(
                    "model '{}': entity '{}' matches several models ({}); no join inferred",
                    self.graph[a.model],
                    a.entity,
                    a.candidates.join(", ")
                )
            })
    }
}

/// Models other than `model` declaring an entity `name` of `kind`.
fn candidates<'m>(
    models: &[&'m SemanticModel],
    model: &SemanticModel,
    name: &str,
    kind: EntityKind,
) -> Vec<&'m SemanticModel> {
    let mut seen = HashSet::new();
    models
        .iter()
        .copied()
        .filter(|m| m.name != model.name)
        .filter(|m| m.entities.iter().any(|e| e.name == name && e.kind == kind))
        .filter(|m| seen.insert(m.name.as_str()))
        .collect()
}

// ============================================================================
// Resolution
// ============================================================================

/// Infers explore joins and collects the warnings found on the way.
#[derive(Debug)]
pub struct JoinResolver {
    qualifier: Qualifier,
    warnings: Vec<String>,
}

impl Default for JoinResolver {
    fn default() -> Self {
        Self::new(Dialect::default())
    }
}

impl JoinResolver {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            qualifier: Qualifier::new(dialect),
            warnings: Vec::new(),
        }
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    fn warn(&mut self, message: String) {
        tracing::warn!("{message}");
        if !self.warnings.contains(&message) {
            self.warnings.push(message);
        }
    }

    /// Joins reachable from `fact` among `models`.
    ///
    /// Many-to-one and one-to-one edges are followed breadth-first up to
    /// [`MAX_JOIN_DEPTH`] hops; models whose foreign entity names the fact's
    /// primary entity join one-to-many at the fact level only, whether or
    /// not the fact is that entity's only primary. Every model joins at most
    /// once and the fact never joins itself.
    pub fn resolve(
        &mut self,
        fact: &SemanticModel,
        models: &[SemanticModel],
        exclusions: &[String],
        overrides: &HashMap<String, JoinOverride>,
    ) -> Vec<InferredJoin> {
        let graph = JoinGraph::build(models, exclusions);
        let Some(&root) = graph.index.get(&fact.name) else {
            self.warn(format!(
                "explore fact '{}' is not among the compiled models",
                fact.name
            ));
            return Vec::new();
        };

        let mut joins = Vec::new();
        let mut visited = HashSet::from([root]);
        let mut queue = VecDeque::from([(root, 0usize)]);

        while let Some((node, depth)) = queue.pop_front() {
            for warning in graph.ambiguity_warnings(node).collect::<Vec<_>>() {
                self.warn(warning);
            }
            if depth >= MAX_JOIN_DEPTH {
                continue;
            }

            for (target, edge) in graph.outgoing(node) {
                if !visited.insert(target) {
                    continue;
                }
                joins.push(build_join(
                    &graph.graph[node],
                    &graph.graph[target],
                    edge,
                    edge.relationship,
                    (edge.source_field.clone(), edge.target_field.clone()),
                    depth + 1,
                    overrides,
                ));
                queue.push_back((target, depth + 1));
            }

            if node != root {
                continue;
            }
            let Some(primary) = fact.primary_entity() else {
                continue;
            };
            for child in models.iter().filter(|m| m.name != fact.name) {
                let Some(&child_node) = graph.index.get(&child.name) else {
                    continue;
                };
                let Some(entity) = child.foreign_entities().find(|e| e.name == primary.name)
                else {
                    continue;
                };
                if !visited.insert(child_node) {
                    continue;
                }
                let edge = KeyEdge {
                    entity: primary.name.clone(),
                    relationship: Relationship::OneToMany,
                    complete: entity.complete,
                    source_field: entity.name.clone(),
                    target_field: primary.name.clone(),
                    order: 0,
                };
                joins.push(build_join(
                    &fact.name,
                    &child.name,
                    &edge,
                    Relationship::OneToMany,
                    (primary.name.clone(), entity.name.clone()),
                    1,
                    overrides,
                ));
            }
        }

        self.attach_metric_fields(fact, models, &mut joins);
        joins
    }

    /// Add the joined measures the fact's metrics read to each join.
    fn attach_metric_fields(
        &self,
        fact: &SemanticModel,
        models: &[SemanticModel],
        joins: &mut [InferredJoin],
    ) {
        let referenced = metric_inputs(fact, &self.qualifier);
        if referenced.is_empty() {
            return;
        }

        for join in joins.iter_mut() {
            let Some(target) = models.iter().find(|m| m.name == join.target_model) else {
                continue;
            };
            let fields: BTreeSet<String> = referenced
                .iter()
                .filter_map(|name| match name.split_once('.') {
                    Some((model, field)) if model == target.name => Some(field),
                    Some(_) => None,
                    None if fact.measure(name).is_none() => Some(name.as_str()),
                    None => None,
                })
                .filter(|field| target.measure(field).is_some())
                .map(str::to_string)
                .collect();
            join.extra_fields = fields.into_iter().collect();
        }
    }
}

fn build_join(
    parent: &str,
    target: &str,
    edge: &KeyEdge,
    structural: Relationship,
    (fact_side, joined_side): (String, String),
    depth: usize,
    overrides: &HashMap<String, JoinOverride>,
) -> InferredJoin {
    let over = overrides.get(target).copied().unwrap_or_default();
    let default_expose = if edge.complete {
        ExposeLevel::All
    } else {
        ExposeLevel::DimensionsOnly
    };
    InferredJoin {
        target_model: target.to_string(),
        parent_model: parent.to_string(),
        join_key_entity_name: edge.entity.clone(),
        relationship: over.relationship.unwrap_or(structural),
        expose_level: over.expose.unwrap_or(default_expose),
        fact_side_expr_name: fact_side,
        joined_side_expr_name: joined_side,
        depth,
        extra_fields: Vec::new(),
    }
}

/// Measure names read by the fact's metrics, following the fact's own
/// metrics transitively.
fn metric_inputs(fact: &SemanticModel, qualifier: &Qualifier) -> BTreeSet<String> {
    let mut inputs = BTreeSet::new();
    let mut seen_metrics: HashSet<&str> = HashSet::new();
    let mut pending: Vec<&Metric> = fact.metrics.iter().collect();

    while let Some(metric) = pending.pop() {
        if !seen_metrics.insert(metric.name.as_str()) {
            continue;
        }
        for input in metric.inputs(qualifier) {
            match fact.metric(&input) {
                Some(dependency) if dependency.name != metric.name => pending.push(dependency),
                _ => {
                    inputs.insert(input);
                }
            }
        }
    }
    inputs
}

/// Joins for `fact` using the default dialect. See [`JoinResolver::resolve`].
pub fn infer_joins(
    fact: &SemanticModel,
    models: &[SemanticModel],
    exclusions: &[String],
    overrides: &HashMap<String, JoinOverride>,
) -> Vec<InferredJoin> {
    JoinResolver::default().resolve(fact, models, exclusions, overrides)
}
