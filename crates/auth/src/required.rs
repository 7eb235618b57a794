//! `"<module>:<right>"` declarations attached to routes.

use core::str::FromStr;

use thiserror::Error;

use warden_core::Right;
use warden_core::model::fold_name;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequiredRightError {
    #[error("malformed required right '{0}': expected 'module:right'")]
    Malformed(String),

    #[error("unknown right '{right}' in '{declared}'")]
    UnknownRight { declared: String, right: String },
}

/// A single right a route demands, parsed once when the route is declared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequiredRight {
    /// Case-folded module name.
    pub module: String,
    pub right: Right,
}

impl RequiredRight {
    pub fn new(module: &str, right: Right) -> Self {
        Self {
            module: fold_name(module),
            right,
        }
    }

    pub fn parse_all<'a>(
        declared: impl IntoIterator<Item = &'a str>,
    ) -> Result<Vec<Self>, RequiredRightError> {
        declared.into_iter().map(str::parse).collect()
    }
}

impl FromStr for RequiredRight {
    type Err = RequiredRightError;

    /// Splits on the first `:` only.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (module, right) = s
            .split_once(':')
            .ok_or_else(|| RequiredRightError::Malformed(s.to_string()))?;
        if module.trim().is_empty() {
            return Err(RequiredRightError::Malformed(s.to_string()));
        }
        let right = right
            .parse::<Right>()
            .map_err(|_| RequiredRightError::UnknownRight {
                declared: s.to_string(),
                right: right.to_string(),
            })?;
        Ok(Self::new(module, right))
    }
}

impl core::fmt::Display for RequiredRight {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.module, self.right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_module_and_right() {
        let r: RequiredRight = "appInfo:edit".parse().unwrap();
        assert_eq!(r.module, "appinfo");
        assert_eq!(r.right, Right::Edit);
        assert_eq!(r.to_string(), "appinfo:edit");
    }

    #[test]
    fn splits_on_first_colon_only() {
        let err = "user:view:extra".parse::<RequiredRight>().unwrap_err();
        assert!(matches!(
            err,
            RequiredRightError::UnknownRight { right, .. } if right == "view:extra"
        ));
    }

    #[test]
    fn malformed_declarations_rejected() {
        assert!(matches!(
            "userview".parse::<RequiredRight>(),
            Err(RequiredRightError::Malformed(_))
        ));
        assert!(matches!(
            ":view".parse::<RequiredRight>(),
            Err(RequiredRightError::Malformed(_))
        ));
        assert!(RequiredRight::parse_all(["user:view", "user:fly"]).is_err());
    }
}
