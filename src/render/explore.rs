//! Rendering explores from resolved joins.

use crate::semantic::{ExposeLevel, InferredJoin};

use super::lookml::{ExploreDoc, JoinDoc, DIMENSIONS_ONLY_SET};

/// LookML join type of every inferred join.
pub const JOIN_TYPE: &str = "left_outer";

/// An explore named `name` over the view `fact`.
#[derive(Debug, Clone, Default)]
pub struct ExploreSpec {
    pub name: String,
    pub fact: String,
    pub label: Option<String>,
    pub description: Option<String>,
}

/// Render the explore document for `spec` and its joins.
///
/// Joins exposing dimensions only list the joined view's dimension set plus
/// the measures the fact's metrics read from it.
pub fn render_explore(spec: &ExploreSpec, joins: &[InferredJoin]) -> ExploreDoc {
    ExploreDoc {
        explore: spec.name.clone(),
        view_name: spec.fact.clone(),
        label: spec.label.clone(),
        description: spec.description.clone(),
        joins: joins.iter().map(render_join).collect(),
    }
}

fn render_join(join: &InferredJoin) -> JoinDoc {
    let fields = match join.expose_level {
        ExposeLevel::All => Vec::new(),
        ExposeLevel::DimensionsOnly => {
            std::iter::once(format!("{}.{}*", join.target_model, DIMENSIONS_ONLY_SET))
                .chain(
                    join.extra_fields
                        .iter()
                        .map(|field| format!("{}.{}", join.target_model, field)),
                )
                .collect()
        }
    };

    JoinDoc {
        name: join.target_model.clone(),
        join_type: JOIN_TYPE,
        relationship: join.relationship,
        sql_on: join.sql_on(),
        fields,
    }
}
