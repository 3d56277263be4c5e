use thiserror::Error;

use eggtrack_core::DomainError;

use crate::{Identity, Role};

/// Ledger operation being authorized.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operation {
    Pack,
    CreateShipment,
    LoadBoxes,
    DeliverBoxes,
    ReportDamage,
    CreateParticipant,
    GetParticipant,
    QueryEggs,
    QueryShipments,
    QueryPackedEggs,
}

/// Who may invoke an operation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Anyone holding an identity.
    Open,
    /// Administrators or callers holding one of the roles.
    RoleOrAdmin(&'static [Role]),
    /// Administrators only.
    AdminOnly,
    /// The participant the record belongs to, or an administrator.
    SelfOrAdmin,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::Pack => "pack",
            Operation::CreateShipment => "createShipment",
            Operation::LoadBoxes => "loadBoxes",
            Operation::DeliverBoxes => "deliverBoxes",
            Operation::ReportDamage => "reportDamage",
            Operation::CreateParticipant => "createParticipant",
            Operation::GetParticipant => "getParticipant",
            Operation::QueryEggs => "queryEggs",
            Operation::QueryShipments => "queryShipments",
            Operation::QueryPackedEggs => "queryPackedEggs",
        }
    }

    pub fn requirement(self) -> Requirement {
        match self {
            Operation::Pack | Operation::CreateShipment => {
                Requirement::RoleOrAdmin(&[Role::Farmer])
            }
            Operation::LoadBoxes | Operation::DeliverBoxes => {
                Requirement::RoleOrAdmin(&[Role::Shipper])
            }
            Operation::CreateParticipant => Requirement::AdminOnly,
            Operation::GetParticipant => Requirement::SelfOrAdmin,
            // Any holder may flag damage.
            Operation::ReportDamage
            | Operation::QueryEggs
            | Operation::QueryShipments
            | Operation::QueryPackedEggs => Requirement::Open,
        }
    }

    fn denial_message(self) -> &'static str {
        match self {
            Operation::Pack => "egg boxes can only be packed by farmers or administrators",
            Operation::CreateShipment => {
                "shipments can only be created by farmers or administrators"
            }
            Operation::LoadBoxes => "shipments can only be loaded by shippers or administrators",
            Operation::DeliverBoxes => {
                "shipments can only be delivered by shippers or administrators"
            }
            Operation::CreateParticipant => "only administrators can create participants",
            Operation::GetParticipant => {
                "only administrators can query other participants; regular participants can only read their own account"
            }
            Operation::ReportDamage
            | Operation::QueryEggs
            | Operation::QueryShipments
            | Operation::QueryPackedEggs => "operation denied",
        }
    }
}

impl core::fmt::Display for Operation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: {message} (operation '{operation}', subject '{subject}')")]
    Forbidden {
        operation: Operation,
        subject: String,
        message: &'static str,
    },
}

impl From<AuthzError> for DomainError {
    fn from(value: AuthzError) -> Self {
        DomainError::unauthorized(value.to_string())
    }
}

/// Authorize `identity` for `operation`.
///
/// `owner` is the participant id the operation targets; it is only consulted
/// for [`Requirement::SelfOrAdmin`].
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(
    identity: &Identity,
    operation: Operation,
    owner: Option<&str>,
) -> Result<(), AuthzError> {
    let granted = match operation.requirement() {
        Requirement::Open => true,
        Requirement::AdminOnly => identity.is_admin(),
        Requirement::RoleOrAdmin(roles) => {
            identity.is_admin() || roles.iter().any(|r| identity.has_role(*r))
        }
        Requirement::SelfOrAdmin => {
            identity.is_admin() || owner.is_some_and(|id| id == identity.participant_id())
        }
    };

    if granted {
        Ok(())
    } else {
        tracing::warn!(
            operation = operation.name(),
            subject = identity.subject(),
            "authorization denied"
        );
        Err(AuthzError::Forbidden {
            operation,
            subject: identity.subject().to_string(),
            message: operation.denial_message(),
        })
    }
}
