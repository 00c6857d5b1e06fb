//! Search domains: `(field, operator, value)` clauses combined with AND / OR.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Comparison operator of a clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "like")]
    Like,
    #[serde(rename = "ilike")]
    ILike,
    #[serde(rename = "not like")]
    NotLike,
    #[serde(rename = "not ilike")]
    NotILike,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Like => "like",
            Operator::ILike => "ilike",
            Operator::NotLike => "not like",
            Operator::NotILike => "not ilike",
        }
    }

    /// `!=`, `not like` and `not ilike`.
    pub fn is_negative(&self) -> bool {
        matches!(self, Operator::Ne | Operator::NotLike | Operator::NotILike)
    }

    /// The operator with its negation removed.
    pub fn positive(&self) -> Operator {
        match self {
            Operator::Ne => Operator::Eq,
            Operator::NotLike => Operator::Like,
            Operator::NotILike => Operator::ILike,
            other => *other,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" => Ok(Operator::Eq),
            "!=" => Ok(Operator::Ne),
            "like" => Ok(Operator::Like),
            "ilike" => Ok(Operator::ILike),
            "not like" => Ok(Operator::NotLike),
            "not ilike" => Ok(Operator::NotILike),
            _ => Err(format!("unsupported operator '{}'", s)),
        }
    }
}

/// A single `(field, operator, value)` condition.
///
/// `field` may traverse a relation with a dot, e.g. `codes.code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    pub field: String,
    pub operator: Operator,
    pub value: serde_json::Value,
}

impl Clause {
    pub fn new(field: &str, operator: Operator, value: impl Into<serde_json::Value>) -> Self {
        Self {
            field: field.to_string(),
            operator,
            value: value.into(),
        }
    }

    /// Same operator and value, applied to another field.
    pub fn on(&self, field: &str) -> Self {
        Self {
            field: field.to_string(),
            operator: self.operator,
            value: self.value.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Leaf(Clause),
    And(Vec<Domain>),
    Or(Vec<Domain>),
}

impl Domain {
    /// The domain matching every record.
    pub fn all() -> Self {
        Domain::And(Vec::new())
    }

    pub fn leaf(field: &str, operator: Operator, value: impl Into<serde_json::Value>) -> Self {
        Domain::Leaf(Clause::new(field, operator, value))
    }

    /// Leaf clauses in evaluation order.
    pub fn clauses(&self) -> Vec<&Clause> {
        match self {
            Domain::Leaf(c) => vec![c],
            Domain::And(ds) | Domain::Or(ds) => ds.iter().flat_map(Domain::clauses).collect(),
        }
    }
}

impl From<Clause> for Domain {
    fn from(c: Clause) -> Self {
        Domain::Leaf(c)
    }
}
