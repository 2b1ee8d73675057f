use std::fmt;
use std::str::FromStr;

use crate::error::QueryError;

/// Comparison applied by a [`Constraint`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    /// Full-text match: every term of the value must appear.
    Fts,
}

impl Operator {
    /// Short name used in textual queries.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Equal => "eq",
            Self::NotEqual => "ne",
            Self::GreaterThan => "gt",
            Self::GreaterThanOrEqual => "gte",
            Self::LessThan => "lt",
            Self::LessThanOrEqual => "lte",
            Self::Fts => "fts",
        }
    }
}

impl FromStr for Operator {
    type Err = QueryError;

    /// Parse an operator name. The empty name means [`Operator::Equal`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "eq" => Ok(Self::Equal),
            "ne" => Ok(Self::NotEqual),
            "gt" => Ok(Self::GreaterThan),
            "gte" => Ok(Self::GreaterThanOrEqual),
            "lt" => Ok(Self::LessThan),
            "lte" => Ok(Self::LessThanOrEqual),
            "fts" => Ok(Self::Fts),
            other => Err(QueryError::UnknownOperator(other.to_string())),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The right-hand side of a constraint.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Value {
    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(n) => Some(*n),
            Self::String(s) => s.trim().parse().ok(),
            Self::Bool(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// A single comparison. Without a field it matches free text across all
/// indexed fields of a version.
#[derive(Clone, Debug, PartialEq)]
pub struct Constraint {
    pub operator: Operator,
    pub field: Option<String>,
    pub value: Value,
}

impl Constraint {
    pub fn new(operator: Operator, field: Option<String>, value: impl Into<Value>) -> Self {
        Self {
            operator,
            field,
            value: value.into(),
        }
    }
}

/// A node of the boolean query tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Constraint(Constraint),
    And(Vec<Node>),
    Or(Vec<Node>),
}

impl From<Constraint> for Node {
    fn from(c: Constraint) -> Self {
        Self::Constraint(c)
    }
}

/// A search request: an optional boolean tree plus pagination.
///
/// A query without a root matches every version.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query {
    pub root: Option<Node>,
    pub limit: Option<usize>,
    pub skip: usize,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a constraint, ANDed with whatever the query already holds.
    pub fn constraint(self, constraint: impl Into<Node>) -> Self {
        self.and([constraint.into()])
    }

    /// AND the given nodes with the current root.
    pub fn and<I>(mut self, nodes: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        self.root = combine(self.root.take(), nodes, Node::And);
        self
    }

    /// OR the given nodes with the current root.
    pub fn or<I>(mut self, nodes: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        self.root = combine(self.root.take(), nodes, Node::Or);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }
}

fn combine<I>(root: Option<Node>, nodes: I, join: fn(Vec<Node>) -> Node) -> Option<Node>
where
    I: IntoIterator,
    I::Item: Into<Node>,
{
    let mut all: Vec<Node> = root.into_iter().collect();
    all.extend(nodes.into_iter().map(Into::into));
    match all.len() {
        0 => None,
        1 => all.pop(),
        _ => Some(join(all)),
    }
}

pub fn eq(field: &str, value: impl Into<Value>) -> Constraint {
    Constraint::new(Operator::Equal, Some(field.to_string()), value)
}

pub fn ne(field: &str, value: impl Into<Value>) -> Constraint {
    Constraint::new(Operator::NotEqual, Some(field.to_string()), value)
}

pub fn gt(field: &str, value: impl Into<Value>) -> Constraint {
    Constraint::new(Operator::GreaterThan, Some(field.to_string()), value)
}

pub fn gte(field: &str, value: impl Into<Value>) -> Constraint {
    Constraint::new(Operator::GreaterThanOrEqual, Some(field.to_string()), value)
}

pub fn lt(field: &str, value: impl Into<Value>) -> Constraint {
    Constraint::new(Operator::LessThan, Some(field.to_string()), value)
}

pub fn lte(field: &str, value: impl Into<Value>) -> Constraint {
    Constraint::new(Operator::LessThanOrEqual, Some(field.to_string()), value)
}

/// Full-text constraint on one field.
pub fn fts(field: &str, value: impl Into<Value>) -> Constraint {
    Constraint::new(Operator::Fts, Some(field.to_string()), value)
}

/// Fieldless free-text constraint.
pub fn text(value: impl Into<Value>) -> Constraint {
    Constraint::new(Operator::Equal, None, value)
}
