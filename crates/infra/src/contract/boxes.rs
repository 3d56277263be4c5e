use eggtrack_auth::{Identity, Operation};
use eggtrack_boxes::EggBox;
use eggtrack_core::CompositeKey;
use eggtrack_events::{EventBus, EventName, EventSubject, build_event};

use super::EggTrackingContract;
use crate::error::ContractResult;
use crate::world_state::WorldState;

impl<S, B> EggTrackingContract<S, B>
where
    S: WorldState,
    B: EventBus,
{
    /// Pack a new egg box held by its farmer.
    ///
    /// Fails with `AlreadyExists` when a box was already packed by `farmer_id`
    /// at `packing_timestamp`.
    pub fn pack_eggs(
        &self,
        caller: &Identity,
        farmer_id: &str,
        packing_timestamp: &str,
        quantity: u32,
    ) -> ContractResult<EggBox> {
        self.execute(caller, Operation::Pack, None, |tx| {
            let egg_box = EggBox::pack(farmer_id, packing_timestamp, quantity)?;
            tx.ensure_absent(egg_box.box_id(), "egg box")?;
            tx.put_record(&egg_box)?;

            tx.set_event(build_event(
                EventName::PackedEggs,
                [egg_box.origin_id()],
                EventSubject::BoxId(egg_box.box_id().clone()),
            ));

            tracing::info!(box_id = %egg_box.box_id(), quantity, "egg box packed");
            Ok(egg_box)
        })
    }

    /// Flag a box as damaged. Damage is terminal.
    pub fn report_damage(&self, caller: &Identity, box_id: &str) -> ContractResult<&'static str> {
        let key = CompositeKey::from_raw(box_id);
        self.execute(caller, Operation::ReportDamage, None, |tx| {
            let mut egg_box: EggBox = tx.require(&key, "egg box")?;
            egg_box.report_damage()?;
            tx.put_record(&egg_box)?;

            tx.set_event(build_event(
                EventName::BoxDamaged,
                [egg_box.origin_id(), egg_box.holder_id()],
                EventSubject::BoxId(key.clone()),
            ));

            tracing::info!(box_id = %key, holder = egg_box.holder_id(), "egg box damaged");
            Ok(super::OK)
        })
    }
}
