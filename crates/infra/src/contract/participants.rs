use eggtrack_auth::{Identity, Operation, Role};
use eggtrack_events::EventBus;
use eggtrack_participants::Participant;

use super::EggTrackingContract;
use crate::error::ContractResult;
use crate::world_state::WorldState;

impl<S, B> EggTrackingContract<S, B>
where
    S: WorldState,
    B: EventBus,
{
    pub fn create_participant(
        &self,
        caller: &Identity,
        id: &str,
        name: &str,
        role: Role,
    ) -> ContractResult<Participant> {
        self.execute(caller, Operation::CreateParticipant, None, |tx| {
            let participant = Participant::create(id, name, role)?;
            tx.ensure_absent(participant.participant_id(), "participant")?;
            tx.put_record(&participant)?;

            tracing::info!(
                participant_id = %participant.participant_id(),
                role = %role,
                "participant created"
            );
            Ok(participant)
        })
    }

    /// Read a participant record. Callers may only read their own record
    /// unless they are administrators.
    pub fn get_participant(&self, caller: &Identity, id: &str) -> ContractResult<Participant> {
        self.execute(caller, Operation::GetParticipant, Some(id), |tx| {
            let key = Participant::key_for(id)?;
            tx.require(&key, "participant")
        })
    }
}
