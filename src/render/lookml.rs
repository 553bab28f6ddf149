//! LookML-shaped output documents.
//!
//! Plain serializable structs; empty collections and unset options are left
//! out of the serialized form.

use serde::Serialize;

use crate::pop::RenderedMeasure;
use crate::semantic::Relationship;

/// Name of the per-view set listing every dimension field.
pub const DIMENSIONS_ONLY_SET: &str = "dimensions_only";

/// A view, or a refinement of one when `view` starts with `+`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewDoc {
    pub view: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql_table_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterDoc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<DimensionDoc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dimension_groups: Vec<DimensionGroupDoc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub measures: Vec<RenderedMeasure>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sets: Vec<SetDoc>,
}

impl ViewDoc {
    pub fn new(view: impl Into<String>) -> Self {
        Self {
            view: view.into(),
            sql_table_name: None,
            label: None,
            parameters: Vec::new(),
            dimensions: Vec::new(),
            dimension_groups: Vec::new(),
            measures: Vec::new(),
            sets: Vec::new(),
        }
    }

    /// A `+view` refinement.
    pub fn refinement(view: &str) -> Self {
        Self::new(format!("+{view}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionDoc {
    pub name: String,
    #[serde(rename = "type")]
    pub dimension_type: &'static str,
    pub sql: String,
    pub label: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub primary_key: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionGroupDoc {
    pub name: String,
    #[serde(rename = "type")]
    pub group_type: &'static str,
    pub timeframes: Vec<&'static str>,
    pub sql: String,
    pub label: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetDoc {
    pub name: String,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterDoc {
    pub name: String,
    #[serde(rename = "type")]
    pub parameter_type: &'static str,
    pub label: String,
    pub allowed_values: Vec<AllowedValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllowedValue {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExploreDoc {
    pub explore: String,
    pub view_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub joins: Vec<JoinDoc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinDoc {
    pub name: String,
    #[serde(rename = "type")]
    pub join_type: &'static str,
    pub relationship: Relationship,
    pub sql_on: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}
