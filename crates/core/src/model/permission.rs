use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::{ModuleId, PermissionId, RoleId};

/// A boolean capability a permission row can grant on a module.
///
/// The set is closed: right names in `"module:right"` declarations are
/// checked against it when routes are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Right {
    View,
    Add,
    Edit,
    Delete,
    Mask,
}

impl Right {
    pub const ALL: [Right; 5] = [Right::View, Right::Add, Right::Edit, Right::Delete, Right::Mask];

    pub fn as_str(&self) -> &'static str {
        match self {
            Right::View => "view",
            Right::Add => "add",
            Right::Edit => "edit",
            Right::Delete => "delete",
            Right::Mask => "mask",
        }
    }
}

impl core::fmt::Display for Right {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Right {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Right::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown right '{s}'")))
    }
}

/// Rights a role holds on one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: PermissionId,
    pub view: bool,
    pub add: bool,
    pub edit: bool,
    pub delete: bool,
    pub mask: bool,
    pub role_id: RoleId,
    pub module_id: ModuleId,
    pub status: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full permission body; every field is required on create and update.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PermissionInput {
    pub view: bool,
    pub add: bool,
    pub edit: bool,
    pub delete: bool,
    pub mask: bool,
    pub role_id: RoleId,
    pub module_id: ModuleId,
    pub status: i64,
}

impl Permission {
    pub fn create(input: PermissionInput, now: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            id: PermissionId::new(),
            view: input.view,
            add: input.add,
            edit: input.edit,
            delete: input.delete,
            mask: input.mask,
            role_id: input.role_id,
            module_id: input.module_id,
            status: input.status,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply(&mut self, input: PermissionInput, now: DateTime<Utc>) -> DomainResult<()> {
        self.view = input.view;
        self.add = input.add;
        self.edit = input.edit;
        self.delete = input.delete;
        self.mask = input.mask;
        self.role_id = input.role_id;
        self.module_id = input.module_id;
        self.status = input.status;
        self.updated_at = now;
        Ok(())
    }

    /// Whether this row grants `right`.
    pub fn grants(&self, right: Right) -> bool {
        match right {
            Right::View => self.view,
            Right::Add => self.add,
            Right::Edit => self.edit,
            Right::Delete => self.delete,
            Right::Mask => self.mask,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only_edit() -> Permission {
        Permission::create(
            PermissionInput {
                view: false,
                add: false,
                edit: true,
                delete: false,
                mask: false,
                role_id: RoleId::new(),
                module_id: ModuleId::new(),
                status: 1,
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn grants_reads_the_matching_flag() {
        let p = only_edit();
        assert!(p.grants(Right::Edit));
        for right in [Right::View, Right::Add, Right::Delete, Right::Mask] {
            assert!(!p.grants(right), "{right} unexpectedly granted");
        }
    }

    #[test]
    fn right_names_parse() {
        for right in Right::ALL {
            assert_eq!(right.as_str().parse::<Right>().unwrap(), right);
        }
        assert!("View".parse::<Right>().is_err());
        assert!("manage".parse::<Right>().is_err());
    }
}
