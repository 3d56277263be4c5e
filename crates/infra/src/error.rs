use serde::{Deserialize, Serialize};
use thiserror::Error;

use eggtrack_auth::AuthzError;
use eggtrack_core::DomainError;

use crate::codec::CodecError;
use crate::world_state::StoreError;

/// Error returned by every contract entry point.
#[derive(Debug, Error)]
pub enum ContractError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Publication failed after a successful commit (state is already written).
    #[error("event publication failed: {0}")]
    Publish(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unknown function: {0}")]
    UnknownFunction(String),
}

impl From<AuthzError> for ContractError {
    fn from(value: AuthzError) -> Self {
        ContractError::Domain(value.into())
    }
}

/// Coarse classification of a [`ContractError`] for callers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    Unauthorized,
    NotFound,
    AlreadyExists,
    InvalidState,
    InsufficientQuantity,
    Validation,
    Conflict,
    Storage,
    Codec,
    Publish,
    InvalidArgument,
    UnknownFunction,
}

impl ContractError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ContractError::Domain(e) => match e {
                DomainError::Unauthorized(_) => ErrorKind::Unauthorized,
                DomainError::NotFound(_) => ErrorKind::NotFound,
                DomainError::AlreadyExists(_) => ErrorKind::AlreadyExists,
                DomainError::InvalidState(_) => ErrorKind::InvalidState,
                DomainError::InsufficientQuantity { .. } => ErrorKind::InsufficientQuantity,
                DomainError::Validation(_) => ErrorKind::Validation,
            },
            ContractError::Store(StoreError::Conflict { .. }) => ErrorKind::Conflict,
            ContractError::Store(StoreError::Poisoned) => ErrorKind::Storage,
            ContractError::Codec(_) => ErrorKind::Codec,
            ContractError::Publish(_) => ErrorKind::Publish,
            ContractError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            ContractError::UnknownFunction(_) => ErrorKind::UnknownFunction,
        }
    }
}

pub type ContractResult<T> = Result<T, ContractError>;
