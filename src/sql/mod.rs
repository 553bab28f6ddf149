//! SQL fragment handling.
//!
//! - [`dialect`] - the dialect registry (grammar, quoting, date-part rules)
//! - [`qualify`] - rewriting bare columns into LookML references

pub mod dialect;
pub mod qualify;

pub use dialect::{Dialect, SqlDialect};
pub use qualify::{qualify, KnownFields, Qualifier};
