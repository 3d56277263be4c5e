use eggtrack_auth::{Identity, Operation};
use eggtrack_boxes::EggBox;
use eggtrack_core::CompositeKey;
use eggtrack_events::{EventBus, EventName, EventSubject, build_event};
use eggtrack_shipments::{Shipment, ShipmentRequest};

use super::EggTrackingContract;
use crate::codec;
use crate::error::ContractResult;
use crate::query::Selector;
use crate::transaction::Transaction;
use crate::world_state::WorldState;

impl<S, B> EggTrackingContract<S, B>
where
    S: WorldState,
    B: EventBus,
{
    /// Aggregate the farmer's packed boxes into a new `READY` shipment.
    pub fn create_shipment(
        &self,
        caller: &Identity,
        request: &ShipmentRequest,
    ) -> ContractResult<Shipment> {
        self.execute(caller, Operation::CreateShipment, None, |tx| {
            let shipment_id = request.shipment_id()?;
            tx.ensure_absent(&shipment_id, "shipment")?;

            let candidates = tx
                .query(&Selector::packed_boxes_held_by(&request.farmer_id), request.max)?
                .into_iter()
                .map(|hit| codec::from_value::<EggBox>(&hit.key, hit.record))
                .collect::<Result<Vec<_>, _>>()?;

            let (shipment, boxes) = Shipment::assemble(request, candidates)?;
            for b in &boxes {
                tx.put_record(b)?;
            }
            tx.put_record(&shipment)?;

            tx.set_event(build_event(
                EventName::ShipmentCreated,
                shipment.audience(),
                EventSubject::ShipmentId(shipment.shipment_id().clone()),
            ));

            tracing::info!(
                shipment_id = %shipment.shipment_id(),
                boxes = shipment.box_ids().len(),
                "shipment created"
            );
            Ok(shipment)
        })
    }

    /// Load a `READY` shipment onto the shipper's truck.
    pub fn load_boxes(
        &self,
        caller: &Identity,
        shipment_id: &str,
        load_timestamp: &str,
    ) -> ContractResult<&'static str> {
        let key = CompositeKey::from_raw(shipment_id);
        self.execute(caller, Operation::LoadBoxes, None, |tx| {
            let mut shipment: Shipment = tx.require(&key, "shipment")?;
            let boxes = load_batch(tx, &shipment)?;
            let changed = shipment.load(load_timestamp, boxes)?;

            stage_batch(tx, &shipment, &changed)?;
            tx.set_event(build_event(
                EventName::BoxesLoaded,
                shipment.audience(),
                EventSubject::ShipmentId(key.clone()),
            ));

            tracing::info!(shipment_id = %key, moved = changed.len(), "shipment loaded");
            Ok(super::OK)
        })
    }

    /// Hand a `LOADED` shipment over to the distribution centre.
    pub fn deliver_boxes(
        &self,
        caller: &Identity,
        shipment_id: &str,
        delivery_date: &str,
    ) -> ContractResult<&'static str> {
        let key = CompositeKey::from_raw(shipment_id);
        self.execute(caller, Operation::DeliverBoxes, None, |tx| {
            let mut shipment: Shipment = tx.require(&key, "shipment")?;
            let boxes = load_batch(tx, &shipment)?;
            let changed = shipment.deliver(delivery_date, boxes)?;

            stage_batch(tx, &shipment, &changed)?;
            tx.set_event(build_event(
                EventName::BoxesDelivered,
                shipment.audience(),
                EventSubject::ShipmentId(key.clone()),
            ));

            tracing::info!(shipment_id = %key, moved = changed.len(), "shipment delivered");
            Ok(super::OK)
        })
    }
}

/// Read and decode every box the shipment references, before anything is staged.
fn load_batch<S: WorldState + ?Sized>(
    tx: &mut Transaction<'_, S>,
    shipment: &Shipment,
) -> ContractResult<Vec<EggBox>> {
    shipment
        .box_ids()
        .iter()
        .map(|id| tx.require::<EggBox>(id, "egg box"))
        .collect()
}

fn stage_batch<S: WorldState + ?Sized>(
    tx: &mut Transaction<'_, S>,
    shipment: &Shipment,
    changed: &[EggBox],
) -> ContractResult<()> {
    for b in changed {
        tx.put_record(b)?;
    }
    tx.put_record(shipment)
}
