//! `warden-core`: domain foundation with identifiers, errors and entities.
//!
//! This crate contains **pure domain** types (no storage or transport concerns).

pub mod error;
pub mod id;
pub mod model;

pub use error::{DomainError, DomainResult};
pub use id::{AppInfoId, ModuleId, PermissionId, RoleId, UserId};
pub use model::{
    AppInfo, AppInfoInput, Module, ModuleInput, NewUser, Permission, PermissionInput, Right, Role,
    RoleInput, User, UserChanges,
};
