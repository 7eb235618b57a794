use core::cmp::Ordering;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::filter::FilterError;

/// Column type as far as filtering is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Boolean,
    Uuid,
    Timestamp,
}

/// A single column value read from a row.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    Integer(i64),
    Boolean(bool),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
}

impl FieldKind {
    /// Parse a filter operand as a value of this kind.
    pub fn parse(&self, field: &str, literal: &str) -> Result<FieldValue, FilterError> {
        let invalid = || FilterError::InvalidLiteral {
            field: field.to_string(),
            value: literal.to_string(),
        };
        let value = match self {
            FieldKind::Text => FieldValue::Text(literal.to_string()),
            FieldKind::Integer => {
                FieldValue::Integer(literal.trim().parse().map_err(|_| invalid())?)
            }
            FieldKind::Boolean => match literal.trim().to_ascii_lowercase().as_str() {
                "true" => FieldValue::Boolean(true),
                "false" => FieldValue::Boolean(false),
                _ => return Err(invalid()),
            },
            FieldKind::Uuid => {
                FieldValue::Uuid(Uuid::parse_str(literal.trim()).map_err(|_| invalid())?)
            }
            FieldKind::Timestamp => FieldValue::Timestamp(
                DateTime::parse_from_rfc3339(literal.trim())
                    .map_err(|_| invalid())?
                    .with_timezone(&Utc),
            ),
        };
        Ok(value)
    }
}

impl FieldValue {
    pub fn kind(&self) -> Option<FieldKind> {
        match self {
            FieldValue::Null => None,
            FieldValue::Text(_) => Some(FieldKind::Text),
            FieldValue::Integer(_) => Some(FieldKind::Integer),
            FieldValue::Boolean(_) => Some(FieldKind::Boolean),
            FieldValue::Uuid(_) => Some(FieldKind::Uuid),
            FieldValue::Timestamp(_) => Some(FieldKind::Timestamp),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Text form used for pattern matching.
    pub fn render(&self) -> Option<String> {
        match self {
            FieldValue::Null => None,
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Integer(i) => Some(i.to_string()),
            FieldValue::Boolean(b) => Some(b.to_string()),
            FieldValue::Uuid(u) => Some(u.to_string()),
            FieldValue::Timestamp(t) => Some(t.to_rfc3339()),
        }
    }

    /// Order two values of the same kind. `None` for NULLs or mixed kinds.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => Some(a.cmp(b)),
            (FieldValue::Integer(a), FieldValue::Integer(b)) => Some(a.cmp(b)),
            (FieldValue::Boolean(a), FieldValue::Boolean(b)) => Some(a.cmp(b)),
            (FieldValue::Uuid(a), FieldValue::Uuid(b)) => Some(a.cmp(b)),
            (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<Uuid> for FieldValue {
    fn from(value: Uuid) -> Self {
        FieldValue::Uuid(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_parse_per_kind() {
        assert_eq!(FieldKind::Integer.parse("score", " 42 ").unwrap(), FieldValue::Integer(42));
        assert_eq!(FieldKind::Boolean.parse("view", "TRUE").unwrap(), FieldValue::Boolean(true));
        assert!(FieldKind::Timestamp.parse("createdAt", "2024-05-01T10:00:00Z").is_ok());
        assert_eq!(
            FieldKind::Integer.parse("score", "ten"),
            Err(FilterError::InvalidLiteral {
                field: "score".to_string(),
                value: "ten".to_string(),
            })
        );
        assert!(FieldKind::Uuid.parse("roleId", "not-a-uuid").is_err());
    }

    #[test]
    fn mixed_kinds_do_not_compare() {
        assert_eq!(FieldValue::Integer(1).compare(&FieldValue::Text("1".into())), None);
        assert_eq!(FieldValue::Null.compare(&FieldValue::Null), None);
    }
}
