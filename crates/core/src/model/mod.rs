//! Persisted entities and the inputs that create or change them.
//!
//! Each entity normalizes its own text fields (trim, case-folding) so that
//! every storage backend sees the same canonical values.

pub mod app_info;
pub mod module;
pub mod permission;
pub mod role;
pub mod user;

pub use app_info::{AppInfo, AppInfoInput};
pub use module::{Module, ModuleInput};
pub use permission::{Permission, PermissionInput, Right};
pub use role::{Role, RoleInput};
pub use user::{NewUser, User, UserChanges};

use crate::error::{DomainError, DomainResult};

/// Trim `value` and reject it if nothing is left.
pub(crate) fn required_text(field: &str, value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// Trimmed, lower-cased, non-empty.
pub(crate) fn folded_text(field: &str, value: &str) -> DomainResult<String> {
    required_text(field, value).map(|s| s.to_lowercase())
}

/// Case-fold a module name the same way stored module names are folded.
pub fn fold_name(name: &str) -> String {
    name.trim().to_lowercase()
}
