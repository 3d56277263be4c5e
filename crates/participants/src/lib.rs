//! Participant registry records (role-tagged identities).
//!
//! Pure domain logic; storage and authorization live in `eggtrack-infra`.

pub mod participant;

pub use participant::Participant;
