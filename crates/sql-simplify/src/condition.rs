//! Condition trees rendered into WHERE clauses.
//!
//! A condition is a tree of column comparisons combined with `and`/`or`.
//! Every `and`/`or` level is parenthesized and its children are joined with
//! that operator, left to right:
//!
//! ```rust
//! use sql_simplify::{Condition, Dialect};
//!
//! let cond = Condition::and(vec![
//!     Condition::eq("a", 1),
//!     Condition::or(vec![Condition::eq("b", "x"), Condition::lt("c", "y")]),
//! ]);
//! assert_eq!(cond.render(Dialect::MySql), r#"(a="1" and (b="x" or c<"y"))"#);
//! ```

use crate::dialect::{Dialect, Quote};
use crate::error::{OrmError, OrmResult};
use crate::ident::check_ident;
use crate::value::json_kind;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;

/// Comparison operator placed between a column and its value.
///
/// [`Operator::Custom`] is interpolated verbatim; there is no allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    NotLike,
    Custom(String),
}

impl Operator {
    pub fn as_str(&self) -> &str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::Custom(op) => op,
        }
    }

    fn write_sql(&self, out: &mut String) {
        let op = self.as_str();
        // Keyword operators need separating spaces, symbols are written tight.
        if op.chars().any(|c| c.is_ascii_alphabetic()) {
            out.push(' ');
            out.push_str(op.trim());
            out.push(' ');
        } else {
            out.push_str(op);
        }
    }
}

impl From<&str> for Operator {
    fn from(op: &str) -> Self {
        match op {
            "=" => Operator::Eq,
            "!=" => Operator::Ne,
            ">" => Operator::Gt,
            ">=" => Operator::Gte,
            "<" => Operator::Lt,
            "<=" => Operator::Lte,
            "LIKE" => Operator::Like,
            "NOT LIKE" => Operator::NotLike,
            other => Operator::Custom(other.to_string()),
        }
    }
}

impl From<String> for Operator {
    fn from(op: String) -> Self {
        Operator::from(op.as_str())
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `column operator value` leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub column: String,
    pub operator: Operator,
    pub value: Value,
}

/// A WHERE-clause tree.
///
/// A `null` value compared with `=` or `!=` renders as `IS NULL` or
/// `IS NOT NULL`, so it matches rows where the column is null. Other operators
/// get a bare `NULL` literal. A leaf without a `value` key counts as `null`.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `column operator "value"`
    Compare(Comparison),
    /// `(child and child ...)`
    And(Vec<Condition>),
    /// `(child or child ...)`
    Or(Vec<Condition>),
    /// Several clauses on the same level, joined with `and` without parentheses.
    All(Vec<Condition>),
}

impl Default for Condition {
    fn default() -> Self {
        Condition::empty()
    }
}

impl Condition {
    /// A condition with no clauses. Renders as the empty string.
    pub fn empty() -> Self {
        Condition::All(Vec::new())
    }

    pub fn compare(
        column: impl Into<String>,
        operator: impl Into<Operator>,
        value: impl Into<Value>,
    ) -> Self {
        Condition::Compare(Comparison {
            column: column.into(),
            operator: operator.into(),
            value: value.into(),
        })
    }

    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, Operator::Eq, value)
    }

    pub fn ne(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, Operator::Ne, value)
    }

    pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, Operator::Gt, value)
    }

    pub fn gte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, Operator::Gte, value)
    }

    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, Operator::Lt, value)
    }

    pub fn lte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, Operator::Lte, value)
    }

    pub fn like(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, Operator::Like, value)
    }

    pub fn and(children: Vec<Condition>) -> Self {
        Condition::And(children)
    }

    pub fn or(children: Vec<Condition>) -> Self {
        Condition::Or(children)
    }

    pub fn all(children: Vec<Condition>) -> Self {
        Condition::All(children)
    }

    /// Whether this tree renders to nothing (no comparison anywhere).
    pub fn is_empty(&self) -> bool {
        match self {
            Condition::Compare(_) => false,
            Condition::And(c) | Condition::Or(c) | Condition::All(c) => {
                c.iter().all(Condition::is_empty)
            }
        }
    }

    /// Check every column name in the tree.
    pub fn validate(&self) -> OrmResult<()> {
        match self {
            Condition::Compare(cmp) => check_ident(&cmp.column),
            Condition::And(c) | Condition::Or(c) | Condition::All(c) => {
                c.iter().try_for_each(Condition::validate)
            }
        }
    }

    /// Render the tree as a WHERE-clause body (without the `WHERE` keyword).
    pub fn render(&self, dialect: Dialect) -> String {
        let mut out = String::new();
        self.write_sql(dialect, &mut out);
        out
    }

    fn write_sql(&self, dialect: Dialect, out: &mut String) {
        match self {
            Condition::Compare(cmp) => {
                out.push_str(&cmp.column);
                match (&cmp.operator, &cmp.value) {
                    (Operator::Eq, Value::Null) => out.push_str(" IS NULL"),
                    (Operator::Ne, Value::Null) => out.push_str(" IS NOT NULL"),
                    (operator, value) => {
                        operator.write_sql(out);
                        out.push_str(&dialect.literal(value, Quote::Double));
                    }
                }
            }
            Condition::And(children) => write_group(children, " and ", true, dialect, out),
            Condition::Or(children) => write_group(children, " or ", true, dialect, out),
            Condition::All(children) => write_group(children, " and ", false, dialect, out),
        }
    }

    /// Parse the object form `{ "and": [...], "or": [...], "col": { "value", "operateur" } }`.
    ///
    /// Keys of one object are joined with `and`. `operator` is accepted as an
    /// alias of `operateur`.
    pub fn from_json(value: &Value) -> OrmResult<Self> {
        let Value::Object(map) = value else {
            return Err(OrmError::validation(format!(
                "condition must be an object, got {}",
                json_kind(value)
            )));
        };

        let mut clauses = Vec::with_capacity(map.len());
        for (key, val) in map {
            match key.as_str() {
                "and" | "or" => {
                    let Value::Array(items) = val else {
                        return Err(OrmError::validation(format!(
                            "'{key}' expects an array, got {}",
                            json_kind(val)
                        )));
                    };
                    let children = items
                        .iter()
                        .map(Condition::from_json)
                        .collect::<OrmResult<Vec<_>>>()?;
                    clauses.push(if key == "and" {
                        Condition::And(children)
                    } else {
                        Condition::Or(children)
                    });
                }
                column => clauses.push(parse_leaf(column, val)?),
            }
        }

        if clauses.len() == 1 {
            Ok(clauses.remove(0))
        } else {
            Ok(Condition::All(clauses))
        }
    }
}

fn write_group(
    children: &[Condition],
    separator: &str,
    parenthesize: bool,
    dialect: Dialect,
    out: &mut String,
) {
    let mut rendered = children.iter().filter(|c| !c.is_empty()).peekable();
    if rendered.peek().is_none() {
        return;
    }
    if parenthesize {
        out.push('(');
    }
    let mut first = true;
    for child in rendered {
        if !first {
            out.push_str(separator);
        }
        first = false;
        child.write_sql(dialect, out);
    }
    if parenthesize {
        out.push(')');
    }
}

fn parse_leaf(column: &str, body: &Value) -> OrmResult<Condition> {
    let Value::Object(fields) = body else {
        return Err(OrmError::validation(format!(
            "comparison on '{column}' must be an object with 'value' and 'operateur'"
        )));
    };
    let operator = fields
        .get("operateur")
        .or_else(|| fields.get("operator"))
        .and_then(Value::as_str)
        .ok_or_else(|| {
            OrmError::validation(format!("comparison on '{column}' is missing 'operateur'"))
        })?;
    let value = fields.get("value").cloned().unwrap_or(Value::Null);
    Ok(Condition::compare(column, operator, value))
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Condition::from_json(&value).map_err(serde::de::Error::custom)
    }
}
