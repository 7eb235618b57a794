//! `warden-auth`: authentication and authorization boundary.
//!
//! This crate is decoupled from HTTP and storage. Rights are resolved through
//! the [`RbacDirectory`] trait, which storage backends implement.

pub mod authorize;
pub mod claims;
pub mod directory;
pub mod jwt;
pub mod principal;
pub mod required;

pub use authorize::{authorize, AuthzError, Decision, DenyReason};
pub use claims::{validate_claims, JwtClaims, TokenType, TokenValidationError};
pub use directory::{LookupError, RbacDirectory};
pub use jwt::{Hs256JwtValidator, JwtValidator};
pub use principal::Principal;
pub use required::{RequiredRight, RequiredRightError};
