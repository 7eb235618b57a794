//! Dynamic filter compiler.
//!
//! A filter is a list of clauses. Within a clause every `field × value` pair
//! becomes one comparison and the comparisons are OR-ed; clauses are AND-ed.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

use crate::predicate::{CompareOp, Comparison, Predicate};

pub const MAX_CLAUSES: usize = 20;
pub const MAX_FIELDS: usize = 20;
pub const MAX_VALUES: usize = 20;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("array length exceeded: {count} clauses (max {MAX_CLAUSES})")]
    TooManyClauses { count: usize },

    #[error("array length exceeded: clause {clause} has {count} fields (max {MAX_FIELDS})")]
    TooManyFields { clause: usize, count: usize },

    #[error("array length exceeded: clause {clause} has {count} values (max {MAX_VALUES})")]
    TooManyValues { clause: usize, count: usize },

    #[error("clause {clause} has no fields")]
    EmptyFields { clause: usize },

    #[error("clause {clause} has no values")]
    EmptyValues { clause: usize },

    #[error("unknown filter field '{0}'")]
    UnknownField(String),

    #[error("invalid value '{value}' for field '{field}'")]
    InvalidLiteral { field: String, value: String },
}

/// Comparison requested by a clause.
///
/// Unrecognised condition strings fall back to equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Condition {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    /// `%=`
    EndsWith,
    /// `=%`
    StartsWith,
    /// `%=%`
    Contains,
}

impl Condition {
    pub fn parse(token: &str) -> Self {
        match token {
            "==" => Condition::Eq,
            "!=" => Condition::Ne,
            "<" => Condition::Lt,
            "<=" => Condition::Lte,
            ">" => Condition::Gt,
            ">=" => Condition::Gte,
            "%=" => Condition::EndsWith,
            "=%" => Condition::StartsWith,
            "%=%" => Condition::Contains,
            _ => Condition::Eq,
        }
    }

    pub fn op(&self) -> CompareOp {
        match self {
            Condition::Eq => CompareOp::Eq,
            Condition::Ne => CompareOp::Ne,
            Condition::Lt => CompareOp::Lt,
            Condition::Lte => CompareOp::Lte,
            Condition::Gt => CompareOp::Gt,
            Condition::Gte => CompareOp::Gte,
            Condition::EndsWith | Condition::StartsWith | Condition::Contains => CompareOp::ILike,
        }
    }

    /// Wrap `value` in the wildcards this condition implies. User-supplied
    /// `%` and `_` are passed through untouched.
    pub fn operand(&self, value: &str) -> String {
        match self {
            Condition::EndsWith => format!("%{value}"),
            Condition::StartsWith => format!("{value}%"),
            Condition::Contains => format!("%{value}%"),
            _ => value.to_string(),
        }
    }
}

impl From<String> for Condition {
    fn from(value: String) -> Self {
        Condition::parse(&value)
    }
}

/// One filter clause as sent by clients.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FilterClause {
    pub fields: Vec<String>,
    pub condition: Condition,
    #[serde(deserialize_with = "scalar_strings")]
    pub values: Vec<String>,
}

impl FilterClause {
    pub fn new(
        fields: impl IntoIterator<Item = impl Into<String>>,
        condition: Condition,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            condition,
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Accept JSON strings, numbers and booleans as clause values.
fn scalar_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<Value>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|v| match v {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            other => Err(serde::de::Error::custom(format!(
                "filter values must be strings, numbers or booleans, got {other}"
            ))),
        })
        .collect()
}

/// Compile `clauses` into a predicate.
///
/// Limits are checked before anything is built. An empty clause list yields
/// [`Predicate::all`].
pub fn compile(clauses: &[FilterClause]) -> Result<Predicate, FilterError> {
    validate(clauses)?;

    let conjuncts = clauses.iter().map(compile_clause).collect();
    Ok(Predicate::from_conjuncts(conjuncts))
}

fn validate(clauses: &[FilterClause]) -> Result<(), FilterError> {
    if clauses.len() > MAX_CLAUSES {
        return Err(FilterError::TooManyClauses {
            count: clauses.len(),
        });
    }
    for (clause, c) in clauses.iter().enumerate() {
        if c.fields.len() > MAX_FIELDS {
            return Err(FilterError::TooManyFields {
                clause,
                count: c.fields.len(),
            });
        }
        if c.values.len() > MAX_VALUES {
            return Err(FilterError::TooManyValues {
                clause,
                count: c.values.len(),
            });
        }
    }
    for (clause, c) in clauses.iter().enumerate() {
        if c.fields.is_empty() {
            return Err(FilterError::EmptyFields { clause });
        }
        if c.values.is_empty() {
            return Err(FilterError::EmptyValues { clause });
        }
    }
    Ok(())
}

fn compile_clause(clause: &FilterClause) -> Vec<Comparison> {
    let op = clause.condition.op();
    clause
        .fields
        .iter()
        .flat_map(|field| {
            clause.values.iter().map(move |value| Comparison {
                field: field.clone(),
                op,
                operand: clause.condition.operand(value),
            })
        })
        .collect()
}
