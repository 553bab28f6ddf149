//! Qualification of raw SQL fragments into LookML references.
//!
//! Semantic models carry SQL fragments with bare column names
//! (`case when status = 'paid' then amount end`). LookML needs every column
//! spelled either as a field reference (`${status}`) or as a raw column of the
//! view's table (`${TABLE}.amount`). The [`Qualifier`] parses a fragment with
//! the run's dialect grammar, rewrites each unqualified column, and prints the
//! tree back with the same parser so dialect-specific syntax survives.
//!
//! Neither `${name}` nor `${TABLE}.name` is a SQL token, so the rewrite runs in
//! two phases:
//!
//! ```text
//! status = 'paid'
//!   │ parse + AST rewrite
//!   ▼
//! __MANTIS_FIELD__.status = 'paid'      (sentinel qualifier)
//!   │ print + regex
//!   ▼
//! ${status} = 'paid'
//! ```
//!
//! A fragment that does not parse is returned verbatim.

use std::collections::HashMap;
use std::ops::ControlFlow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use sqlparser::ast::{
    Expr, Function, FunctionArg, FunctionArgExpr, FunctionArguments, Ident, VisitMut, VisitorMut,
};
use sqlparser::dialect::Dialect as ParserDialect;
use sqlparser::parser::{Parser, ParserError};
use sqlparser::tokenizer::Token;

use super::dialect::{helpers, Dialect, SqlDialect};

/// Sentinel qualifier marking a column that becomes a field reference.
pub const FIELD_SENTINEL: &str = "__MANTIS_FIELD__";

/// Sentinel qualifier marking a column that becomes a `${TABLE}` reference.
pub const TABLE_SENTINEL: &str = "__MANTIS_TABLE__";

/// Temporary qualifier hiding date-part keywords from the rewrite.
const DATE_PART_SENTINEL: &str = "__MANTIS_DATE_PART__";

/// Printed-sentinel patterns for every dialect, built from the quote
/// characters its grammar accepts.
static SENTINELS: Lazy<HashMap<Dialect, SentinelPatterns>> = Lazy::new(|| {
    Dialect::ALL
        .iter()
        .map(|&dialect| (dialect, SentinelPatterns::new(dialect.identifier_quotes())))
        .collect()
});

/// Regexes turning printed sentinels into LookML references.
#[derive(Debug)]
struct SentinelPatterns {
    field: Regex,
    table: Regex,
}

impl SentinelPatterns {
    fn new(quotes: &[char]) -> Self {
        let escape = |c: char| regex::escape(&c.to_string());
        let open: String = quotes.iter().map(|&q| escape(q)).collect();
        let close: String = quotes
            .iter()
            .map(|&q| escape(helpers::closing_quote(q)))
            .collect();
        let quoted: String = quotes
            .iter()
            .map(|&q| {
                let end = escape(helpers::closing_quote(q));
                format!("{}[^{end}]*{end}|", escape(q))
            })
            .collect();

        Self {
            field: Regex::new(&format!(
                r"[{open}]?{FIELD_SENTINEL}[{close}]?\.([A-Za-z0-9_.]+)"
            ))
            .expect("field sentinel pattern is valid"),
            table: Regex::new(&format!(
                r"[{open}]?{TABLE_SENTINEL}[{close}]?\.({quoted}\w+)"
            ))
            .expect("table sentinel pattern is valid"),
        }
    }

    /// Replace printed sentinels with LookML reference syntax.
    fn substitute(&self, printed: &str) -> String {
        let fields = self
            .field
            .replace_all(printed, |caps: &Captures| format!("${{{}}}", &caps[1]));
        self.table
            .replace_all(&fields, |caps: &Captures| format!("${{TABLE}}.{}", &caps[1]))
            .into_owned()
    }
}

// ============================================================================
// Known fields
// ============================================================================

/// Ordered map from bare column name to the resolved LookML field name.
///
/// Built incrementally while a model's entities and dimensions are rendered in
/// declaration order: a fragment qualified against the map can only see
/// fields registered before it. The first registration of a column wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnownFields {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl KnownFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `column` as resolving to `field`.
    ///
    /// Returns `false` (leaving the map unchanged) if `column` is already known.
    pub fn insert(&mut self, column: impl Into<String>, field: impl Into<String>) -> bool {
        let column = column.into();
        if self.index.contains_key(&column) {
            return false;
        }
        self.index.insert(column.clone(), self.entries.len());
        self.entries.push((column, field.into()));
        true
    }

    /// The field a bare column resolves to. Exact match only.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.index
            .get(column)
            .map(|&i| self.entries[i].1.as_str())
    }

    pub fn contains(&self, column: &str) -> bool {
        self.index.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(c, f)| (c.as_str(), f.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for KnownFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut known = KnownFields::new();
        for (column, field) in iter {
            known.insert(column, field);
        }
        known
    }
}

// ============================================================================
// Qualifier
// ============================================================================

/// Rewrites bare column references in SQL fragments of one dialect.
#[derive(Debug)]
pub struct Qualifier {
    dialect: Dialect,
    grammar: Box<dyn ParserDialect>,
}

impl Qualifier {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            grammar: dialect.parser_dialect(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Qualify every bare column in `expr`.
    ///
    /// Columns found in `known` become `${field}`, all others
    /// `${TABLE}.column`. Already-qualified columns (`orders.amount`) are left
    /// alone. Returns `expr` unchanged if it does not parse.
    pub fn qualify(&self, expr: &str, known: &KnownFields) -> String {
        let mut parsed = match self.parse_fragment(expr) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::debug!(
                    dialect = %self.dialect,
                    fragment = expr,
                    error = %err,
                    "leaving unparseable SQL fragment unqualified"
                );
                return expr.to_string();
            }
        };

        let mut rewriter = ReferenceRewriter::new(self.dialect, known);
        let _ = parsed.visit(&mut rewriter);

        SENTINELS[&self.dialect].substitute(&parsed.to_string())
    }

    /// Bare column names referenced by `expr`, in first-appearance order.
    ///
    /// Date-part keywords are not columns and are skipped. Empty if `expr`
    /// does not parse.
    pub fn referenced_columns(&self, expr: &str) -> Vec<String> {
        let Ok(mut parsed) = self.parse_fragment(expr) else {
            return Vec::new();
        };
        let known = KnownFields::new();
        let mut rewriter = ReferenceRewriter::new(self.dialect, &known);
        let _ = parsed.visit(&mut rewriter);
        rewriter.seen
    }

    /// Parse a standalone expression, requiring the whole input to be consumed.
    fn parse_fragment(&self, expr: &str) -> Result<Expr, ParserError> {
        let mut parser = Parser::new(&*self.grammar).try_with_sql(expr)?;
        let parsed = parser.parse_expr()?;
        let next = parser.peek_token();
        if next.token != Token::EOF {
            return Err(ParserError::ParserError(format!(
                "unexpected trailing input: {}",
                next.token
            )));
        }
        Ok(parsed)
    }
}

/// Qualify `expr` in `dialect`. See [`Qualifier::qualify`].
pub fn qualify(expr: &str, known: &KnownFields, dialect: Dialect) -> String {
    Qualifier::new(dialect).qualify(expr, known)
}

// ============================================================================
// AST rewrite
// ============================================================================

/// Replaces unqualified identifiers with sentinel-qualified ones.
///
/// Date-part arguments of date functions are shielded on the way down and
/// restored on the way up so they never reach the identifier rewrite.
struct ReferenceRewriter<'a> {
    dialect: Dialect,
    known: &'a KnownFields,
    seen: Vec<String>,
}

impl<'a> ReferenceRewriter<'a> {
    fn new(dialect: Dialect, known: &'a KnownFields) -> Self {
        Self {
            dialect,
            known,
            seen: Vec::new(),
        }
    }

    fn rewrite_identifier(&mut self, ident: &Ident) -> Expr {
        if !self.seen.contains(&ident.value) {
            self.seen.push(ident.value.clone());
        }
        match self.known.get(&ident.value) {
            Some(field) => {
                Expr::CompoundIdentifier(vec![Ident::new(FIELD_SENTINEL), Ident::new(field)])
            }
            None => Expr::CompoundIdentifier(vec![Ident::new(TABLE_SENTINEL), ident.clone()]),
        }
    }

    fn date_part_slot<'f>(&self, func: &'f mut Function) -> Option<&'f mut Expr> {
        let position = self.dialect.date_part_arg(&func.name.to_string())?;
        let FunctionArguments::List(list) = &mut func.args else {
            return None;
        };
        match list.args.get_mut(position)? {
            FunctionArg::Unnamed(FunctionArgExpr::Expr(arg)) => Some(arg),
            _ => None,
        }
    }

    fn shield_date_part(&self, func: &mut Function) {
        let Some(arg) = self.date_part_slot(func) else {
            return;
        };
        let part = match arg {
            Expr::Identifier(ident)
                if ident.quote_style.is_none() && helpers::is_date_part(&ident.value) =>
            {
                ident.clone()
            }
            _ => return,
        };
        *arg = Expr::CompoundIdentifier(vec![Ident::new(DATE_PART_SENTINEL), part]);
    }

    fn restore_date_part(&self, func: &mut Function) {
        let Some(arg) = self.date_part_slot(func) else {
            return;
        };
        let part = match arg {
            Expr::CompoundIdentifier(parts)
                if parts.len() == 2 && parts[0].value == DATE_PART_SENTINEL =>
            {
                parts[1].clone()
            }
            _ => return,
        };
        *arg = Expr::Identifier(part);
    }
}

impl VisitorMut for ReferenceRewriter<'_> {
    type Break = ();

    fn pre_visit_expr(&mut self, expr: &mut Expr) -> ControlFlow<Self::Break> {
        if let Expr::Function(func) = expr {
            self.shield_date_part(func);
        }
        ControlFlow::Continue(())
    }

    fn post_visit_expr(&mut self, expr: &mut Expr) -> ControlFlow<Self::Break> {
        match expr {
            Expr::Identifier(ident) => {
                let rewritten = self.rewrite_identifier(ident);
                *expr = rewritten;
            }
            Expr::Function(func) => self.restore_date_part(func),
            _ => {}
        }
        ControlFlow::Continue(())
    }
}
