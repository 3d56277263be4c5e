use serde::{Deserialize, Serialize};

use eggtrack_core::{CompositeKey, DomainError, DomainResult, Record, RecordType, build_key};

/// Lifecycle of a box.
///
/// Forward-only: `PACKED → READY_FOR_SHIPMENT → IN_TRANSIT → IN_DISTRIBUTION_CENTRE`.
/// `DAMAGED` is terminal and reachable from every other state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BoxState {
    Packed,
    ReadyForShipment,
    InTransit,
    InDistributionCentre,
    Damaged,
}

impl BoxState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoxState::Packed => "PACKED",
            BoxState::ReadyForShipment => "READY_FOR_SHIPMENT",
            BoxState::InTransit => "IN_TRANSIT",
            BoxState::InDistributionCentre => "IN_DISTRIBUTION_CENTRE",
            BoxState::Damaged => "DAMAGED",
        }
    }

    pub fn is_terminal(self) -> bool {
        self == BoxState::Damaged
    }

    /// Whether `self → next` is an edge of the lifecycle.
    pub fn can_transition_to(self, next: BoxState) -> bool {
        use BoxState::*;
        match (self, next) {
            (Damaged, _) => false,
            (_, Damaged) => true,
            (Packed, ReadyForShipment)
            | (ReadyForShipment, InTransit)
            | (InTransit, InDistributionCentre) => true,
            _ => false,
        }
    }
}

impl core::fmt::Display for BoxState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A box of eggs packed by a farmer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EggBox {
    #[serde(rename = "type")]
    record_type: RecordType,
    origin_id: String,
    holder_id: String,
    packing_timestamp: String,
    quantity: u32,
    state: BoxState,
    box_id: CompositeKey,
}

impl EggBox {
    /// Composite key of the box packed by `origin_id` at `packing_timestamp`.
    pub fn key_for(origin_id: &str, packing_timestamp: &str) -> DomainResult<CompositeKey> {
        build_key(RecordType::Box, &[origin_id, packing_timestamp])
    }

    /// A freshly packed box, held by its origin.
    pub fn pack(
        origin_id: impl Into<String>,
        packing_timestamp: impl Into<String>,
        quantity: u32,
    ) -> DomainResult<Self> {
        let origin_id = origin_id.into();
        let packing_timestamp = packing_timestamp.into();
        if quantity == 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        let box_id = Self::key_for(&origin_id, &packing_timestamp)?;

        Ok(Self {
            record_type: RecordType::Box,
            holder_id: origin_id.clone(),
            origin_id,
            packing_timestamp,
            quantity,
            state: BoxState::Packed,
            box_id,
        })
    }

    pub fn box_id(&self) -> &CompositeKey {
        &self.box_id
    }

    pub fn origin_id(&self) -> &str {
        &self.origin_id
    }

    pub fn holder_id(&self) -> &str {
        &self.holder_id
    }

    pub fn packing_timestamp(&self) -> &str {
        &self.packing_timestamp
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn state(&self) -> BoxState {
        self.state
    }

    pub fn is_in(&self, state: BoxState) -> bool {
        self.state == state
    }

    /// Whether the box can be picked for a new shipment by `farmer_id`.
    pub fn is_available_to(&self, farmer_id: &str) -> bool {
        self.state == BoxState::Packed && self.holder_id == farmer_id
    }

    pub fn mark_ready_for_shipment(&mut self) -> DomainResult<()> {
        self.transition(BoxState::ReadyForShipment)
    }

    /// Hand the box to the shipper carrying it.
    pub fn load_onto(&mut self, shipper_id: &str) -> DomainResult<()> {
        self.transition(BoxState::InTransit)?;
        self.holder_id = shipper_id.to_string();
        Ok(())
    }

    /// Hand the box to the distribution centre receiving it.
    pub fn deliver_to(&mut self, distributor_id: &str) -> DomainResult<()> {
        self.transition(BoxState::InDistributionCentre)?;
        self.holder_id = distributor_id.to_string();
        Ok(())
    }

    pub fn report_damage(&mut self) -> DomainResult<()> {
        if self.state == BoxState::Damaged {
            return Err(DomainError::invalid_state(format!(
                "egg box with ID {} is already damaged",
                self.box_id
            )));
        }
        self.transition(BoxState::Damaged)
    }

    fn transition(&mut self, next: BoxState) -> DomainResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(DomainError::invalid_state(format!(
                "egg box {} cannot move from {} to {}",
                self.box_id, self.state, next
            )));
        }
        self.state = next;
        Ok(())
    }
}

impl Record for EggBox {
    const RECORD_TYPE: RecordType = RecordType::Box;

    fn record_type(&self) -> RecordType {
        self.record_type
    }

    fn key(&self) -> &CompositeKey {
        &self.box_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn packed() -> EggBox {
        EggBox::pack("farmer1", "202106031608", 30).unwrap()
    }

    fn rank(state: BoxState) -> u8 {
        match state {
            BoxState::Packed => 0,
            BoxState::ReadyForShipment => 1,
            BoxState::InTransit => 2,
            BoxState::InDistributionCentre => 3,
            BoxState::Damaged => 4,
        }
    }

    #[test]
    fn pack_sets_holder_to_origin() {
        let b = packed();
        assert_eq!(b.box_id().as_str(), "Box:farmer1:202106031608");
        assert_eq!(b.holder_id(), "farmer1");
        assert_eq!(b.origin_id(), "farmer1");
        assert_eq!(b.quantity(), 30);
        assert_eq!(b.state(), BoxState::Packed);
        assert_eq!(b.record_type(), RecordType::Box);
    }

    #[test]
    fn pack_rejects_zero_quantity_and_bad_key_parts() {
        assert!(matches!(
            EggBox::pack("farmer1", "t", 0),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            EggBox::pack("farmer1", "2021-06-03T16:08", 30),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn full_journey_moves_holder() {
        let mut b = packed();
        b.mark_ready_for_shipment().unwrap();
        assert_eq!(b.holder_id(), "farmer1");
        b.load_onto("shipper2").unwrap();
        assert_eq!((b.state(), b.holder_id()), (BoxState::InTransit, "shipper2"));
        b.deliver_to("dist2").unwrap();
        assert_eq!((b.state(), b.holder_id()), (BoxState::InDistributionCentre, "dist2"));
    }

    #[test]
    fn skipping_a_step_is_rejected_and_leaves_box_untouched() {
        let mut b = packed();
        let err = b.load_onto("shipper2").unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
        assert_eq!(b, packed());
    }

    #[test]
    fn damage_is_terminal() {
        let mut b = packed();
        b.report_damage().unwrap();
        assert_eq!(b.state(), BoxState::Damaged);
        let err = b.report_damage().unwrap_err();
        assert!(err.to_string().contains("already damaged"));
        assert!(b.mark_ready_for_shipment().is_err());
    }

    #[test]
    fn encodes_flat_record() {
        let value = serde_json::to_value(packed()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "type": "Box",
                "originId": "farmer1",
                "holderId": "farmer1",
                "packingTimestamp": "202106031608",
                "quantity": 30,
                "state": "PACKED",
                "boxId": "Box:farmer1:202106031608"
            })
        );
    }

    proptest! {
        /// Whatever sequence of transitions is attempted, a box never moves
        /// backwards and never leaves DAMAGED.
        #[test]
        fn state_never_regresses(steps in prop::collection::vec(0u8..4, 0..12)) {
            let mut b = packed();
            for step in steps {
                let before = b.state();
                let _ = match step {
                    0 => b.mark_ready_for_shipment(),
                    1 => b.load_onto("s"),
                    2 => b.deliver_to("d"),
                    _ => b.report_damage(),
                };
                prop_assert!(rank(b.state()) >= rank(before));
                if before == BoxState::Damaged {
                    prop_assert_eq!(b.state(), BoxState::Damaged);
                }
            }
        }
    }
}
