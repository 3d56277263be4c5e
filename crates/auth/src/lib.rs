//! `eggtrack-auth` — caller identity and the per-operation authorization guard.
//!
//! This crate is intentionally decoupled from transport and storage.

pub mod authorize;
pub mod identity;
pub mod roles;

pub use authorize::{AuthzError, Operation, Requirement, authorize};
pub use identity::{Identity, IdentityResolver, PARTICIPANT_ID_ATTRIBUTE, ROLE_ATTRIBUTE};
pub use roles::Role;
