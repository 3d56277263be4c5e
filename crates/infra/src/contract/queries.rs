use eggtrack_auth::{Identity, Operation};
use eggtrack_events::EventBus;

use super::EggTrackingContract;
use crate::error::ContractResult;
use crate::query::{QueryResult, Selector};
use crate::world_state::WorldState;

impl<S, B> EggTrackingContract<S, B>
where
    S: WorldState,
    B: EventBus,
{
    /// Boxes packed by or currently held by `participant_id`.
    pub fn query_eggs(
        &self,
        caller: &Identity,
        participant_id: &str,
    ) -> ContractResult<Vec<QueryResult>> {
        self.execute(caller, Operation::QueryEggs, None, |tx| {
            tx.query(&Selector::boxes_of(participant_id), 0)
        })
    }

    /// Shipments in which `participant_id` is farmer, shipper or distributor.
    pub fn query_shipments(
        &self,
        caller: &Identity,
        participant_id: &str,
    ) -> ContractResult<Vec<QueryResult>> {
        self.execute(caller, Operation::QueryShipments, None, |tx| {
            tx.query(&Selector::shipments_of(participant_id), 0)
        })
    }

    /// Packed boxes still held by `farmer_id`, capped at `max` (`0` = uncapped).
    pub fn query_packed_eggs(
        &self,
        caller: &Identity,
        farmer_id: &str,
        max: usize,
    ) -> ContractResult<Vec<QueryResult>> {
        self.execute(caller, Operation::QueryPackedEggs, None, |tx| {
            tx.query(&Selector::packed_boxes_held_by(farmer_id), max)
        })
    }
}
