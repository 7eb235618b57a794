use core::cmp::Ordering;

use crate::filter::FilterError;
use crate::like::{has_dangling_escape, ilike_match};
use crate::value::{FieldKind, FieldValue};

/// Backend-neutral comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    /// Case-insensitive pattern match (`%` any run, `_` one char).
    ILike,
}

impl CompareOp {
    pub fn sql(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::ILike => "ILIKE",
        }
    }

    fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Lte => ordering != Ordering::Greater,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Gte => ordering != Ordering::Less,
            CompareOp::ILike => false,
        }
    }
}

/// One atomic comparison `field op operand`. The operand stays textual until
/// the target column's type is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub field: String,
    pub op: CompareOp,
    pub operand: String,
}

impl Comparison {
    /// Typed operand for `kind`, or `None` for pattern comparisons. A pattern
    /// ending in an unpaired escape is an invalid literal.
    pub fn typed_operand(&self, kind: FieldKind) -> Result<Option<FieldValue>, FilterError> {
        match self.op {
            CompareOp::ILike if has_dangling_escape(&self.operand) => {
                Err(FilterError::InvalidLiteral {
                    field: self.field.clone(),
                    value: self.operand.clone(),
                })
            }
            CompareOp::ILike => Ok(None),
            _ => kind.parse(&self.field, &self.operand).map(Some),
        }
    }

    fn evaluate(&self, actual: &FieldValue) -> Result<bool, FilterError> {
        let Some(kind) = actual.kind() else {
            return Ok(false);
        };
        match self.typed_operand(kind)? {
            None => Ok(actual
                .render()
                .is_some_and(|text| ilike_match(&self.operand, &text))),
            Some(expected) => Ok(actual
                .compare(&expected)
                .is_some_and(|ordering| self.op.accepts(ordering))),
        }
    }
}

/// Conjunction of disjunctions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    conjuncts: Vec<Vec<Comparison>>,
}

impl Predicate {
    /// The identity predicate.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn from_conjuncts(conjuncts: Vec<Vec<Comparison>>) -> Self {
        Self { conjuncts }
    }

    pub fn is_all(&self) -> bool {
        self.conjuncts.is_empty()
    }

    pub fn conjuncts(&self) -> &[Vec<Comparison>] {
        &self.conjuncts
    }

    pub fn comparisons(&self) -> impl Iterator<Item = &Comparison> {
        self.conjuncts.iter().flatten()
    }

    /// AND a single equality onto this predicate.
    pub fn and_eq(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.conjuncts.push(vec![Comparison {
            field: field.into(),
            op: CompareOp::Eq,
            operand: value.into(),
        }]);
        self
    }

    /// Evaluate against one row. `lookup` returns `None` for fields the row
    /// does not have, which is reported as [`FilterError::UnknownField`].
    /// NULL column values never match.
    pub fn matches<F>(&self, lookup: F) -> Result<bool, FilterError>
    where
        F: Fn(&str) -> Option<FieldValue>,
    {
        for conjunct in &self.conjuncts {
            let mut any = false;
            for cmp in conjunct {
                let actual = lookup(&cmp.field)
                    .ok_or_else(|| FilterError::UnknownField(cmp.field.clone()))?;
                if cmp.evaluate(&actual)? {
                    any = true;
                    break;
                }
            }
            if !any {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
