use serde::{Deserialize, Serialize};

use eggtrack_auth::Role;
use eggtrack_core::{CompositeKey, DomainError, DomainResult, Record, RecordType, build_key};

/// A registered supply-chain participant.
///
/// Immutable once created; there is no update operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    #[serde(rename = "type")]
    record_type: RecordType,
    id: String,
    name: String,
    role: Role,
    participant_id: CompositeKey,
}

impl Participant {
    pub fn key_for(id: &str) -> DomainResult<CompositeKey> {
        build_key(RecordType::Participant, &[id])
    }

    pub fn create(
        id: impl Into<String>,
        name: impl Into<String>,
        role: Role,
    ) -> DomainResult<Self> {
        let id = id.into();
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("participant name cannot be empty"));
        }
        let participant_id = Self::key_for(&id)?;

        Ok(Self {
            record_type: RecordType::Participant,
            id,
            name,
            role,
            participant_id,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn participant_id(&self) -> &CompositeKey {
        &self.participant_id
    }
}

impl Record for Participant {
    const RECORD_TYPE: RecordType = RecordType::Participant;

    fn record_type(&self) -> RecordType {
        self.record_type
    }

    fn key(&self) -> &CompositeKey {
        &self.participant_id
    }
}
