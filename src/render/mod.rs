//! LookML rendering.
//!
//! - [`lookml`] - serializable view and explore documents
//! - [`view`] - one model to its base view and refinements
//! - [`explore`] - resolved joins to an explore

pub mod explore;
pub mod lookml;
pub mod view;

pub use explore::{render_explore, ExploreSpec, JOIN_TYPE};
pub use lookml::{
    AllowedValue, DimensionDoc, DimensionGroupDoc, ExploreDoc, JoinDoc, ParameterDoc, SetDoc,
    ViewDoc, DIMENSIONS_ONLY_SET,
};
pub use view::{RenderedView, ViewRenderer};
