use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use eggtrack_boxes::{BoxState, EggBox};
use eggtrack_core::{CompositeKey, DomainError, DomainResult, Record, RecordType, build_key};

/// Lifecycle of a shipment, strictly forward: `READY → LOADED → DELIVERED`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentState {
    Ready,
    Loaded,
    Delivered,
}

impl ShipmentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentState::Ready => "READY",
            ShipmentState::Loaded => "LOADED",
            ShipmentState::Delivered => "DELIVERED",
        }
    }
}

impl core::fmt::Display for ShipmentState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of a `createShipment` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentRequest {
    pub farmer_id: String,
    pub shipper_id: String,
    pub distributor_id: String,
    pub shipment_creation: String,
    /// Minimum number of boxes the shipment must carry.
    pub min: usize,
    /// Cap on the selection query; `0` means uncapped.
    pub max: usize,
}

impl ShipmentRequest {
    pub fn shipment_id(&self) -> DomainResult<CompositeKey> {
        Shipment::key_for(&self.farmer_id, &self.distributor_id, &self.shipment_creation)
    }
}

/// A group of boxes travelling from a farmer to a distribution centre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    #[serde(rename = "type")]
    record_type: RecordType,
    farmer_id: String,
    shipper_id: String,
    distributor_id: String,
    shipment_creation: String,
    box_ids: Vec<CompositeKey>,
    state: ShipmentState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    load_timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    delivery_date: Option<String>,
    shipment_id: CompositeKey,
}

impl Shipment {
    pub fn key_for(
        farmer_id: &str,
        distributor_id: &str,
        shipment_creation: &str,
    ) -> DomainResult<CompositeKey> {
        build_key(
            RecordType::Shipment,
            &[farmer_id, distributor_id, shipment_creation],
        )
    }

    /// Build a `READY` shipment from the boxes selected for it.
    ///
    /// Every candidate must be `PACKED` and held by the requesting farmer, and
    /// there must be at least `request.min` of them. On success the returned
    /// boxes are already `READY_FOR_SHIPMENT`; on failure nothing is returned,
    /// so no partial batch can be written.
    pub fn assemble(
        request: &ShipmentRequest,
        mut candidates: Vec<EggBox>,
    ) -> DomainResult<(Shipment, Vec<EggBox>)> {
        let shipment_id = request.shipment_id()?;
        for party in [&request.shipper_id, &request.distributor_id] {
            if party.trim().is_empty() {
                return Err(DomainError::validation("shipment parties cannot be empty"));
            }
        }

        if request.max > 0 {
            candidates.truncate(request.max);
        }
        if candidates.len() < request.min {
            return Err(DomainError::insufficient_quantity(candidates.len(), request.min));
        }

        if let Some(unavailable) = candidates
            .iter()
            .find(|b| !b.is_available_to(&request.farmer_id))
        {
            return Err(DomainError::invalid_state(format!(
                "egg box {} is not packed and held by {}",
                unavailable.box_id(),
                request.farmer_id
            )));
        }

        let mut seen = Vec::with_capacity(candidates.len());
        for b in &candidates {
            if seen.contains(b.box_id()) {
                return Err(DomainError::validation(format!(
                    "egg box {} selected twice",
                    b.box_id()
                )));
            }
            seen.push(b.box_id().clone());
        }

        for b in &mut candidates {
            b.mark_ready_for_shipment()?;
        }

        let shipment = Shipment {
            record_type: RecordType::Shipment,
            farmer_id: request.farmer_id.clone(),
            shipper_id: request.shipper_id.clone(),
            distributor_id: request.distributor_id.clone(),
            shipment_creation: request.shipment_creation.clone(),
            box_ids: seen,
            state: ShipmentState::Ready,
            load_timestamp: None,
            delivery_date: None,
            shipment_id,
        };

        Ok((shipment, candidates))
    }

    pub fn shipment_id(&self) -> &CompositeKey {
        &self.shipment_id
    }

    pub fn farmer_id(&self) -> &str {
        &self.farmer_id
    }

    pub fn shipper_id(&self) -> &str {
        &self.shipper_id
    }

    pub fn distributor_id(&self) -> &str {
        &self.distributor_id
    }

    pub fn shipment_creation(&self) -> &str {
        &self.shipment_creation
    }

    pub fn box_ids(&self) -> &[CompositeKey] {
        &self.box_ids
    }

    pub fn state(&self) -> ShipmentState {
        self.state
    }

    pub fn load_timestamp(&self) -> Option<&str> {
        self.load_timestamp.as_deref()
    }

    pub fn delivery_date(&self) -> Option<&str> {
        self.delivery_date.as_deref()
    }

    /// Participants notified about this shipment.
    pub fn audience(&self) -> [&str; 3] {
        [&self.farmer_id, &self.shipper_id, &self.distributor_id]
    }

    /// Put the shipment on the shipper's truck.
    ///
    /// `boxes` must be exactly the records referenced by `box_ids`. Returns the
    /// boxes that changed (those still `READY_FOR_SHIPMENT`); the others are
    /// left untouched.
    pub fn load(&mut self, load_timestamp: &str, boxes: Vec<EggBox>) -> DomainResult<Vec<EggBox>> {
        if self.state != ShipmentState::Ready {
            return Err(DomainError::invalid_state(format!(
                "shipment ID {} is not ready",
                self.shipment_id
            )));
        }
        let shipper_id = self.shipper_id.clone();
        let changed = self.advance_boxes(boxes, BoxState::ReadyForShipment, |b| {
            b.load_onto(&shipper_id)
        })?;

        self.state = ShipmentState::Loaded;
        self.load_timestamp = Some(load_timestamp.to_string());
        Ok(changed)
    }

    /// Hand the shipment over to the distribution centre.
    ///
    /// Same batch contract as [`Shipment::load`], for boxes still `IN_TRANSIT`.
    pub fn deliver(
        &mut self,
        delivery_date: &str,
        boxes: Vec<EggBox>,
    ) -> DomainResult<Vec<EggBox>> {
        if self.state != ShipmentState::Loaded {
            return Err(DomainError::invalid_state(format!(
                "shipment ID {} is not loaded",
                self.shipment_id
            )));
        }
        let distributor_id = self.distributor_id.clone();
        let changed = self.advance_boxes(boxes, BoxState::InTransit, |b| {
            b.deliver_to(&distributor_id)
        })?;

        self.state = ShipmentState::Delivered;
        self.delivery_date = Some(delivery_date.to_string());
        Ok(changed)
    }

    /// Validate the whole batch against `box_ids`, then transition every box
    /// currently in `from`. Nothing is returned unless every step succeeded.
    fn advance_boxes(
        &self,
        boxes: Vec<EggBox>,
        from: BoxState,
        step: impl Fn(&mut EggBox) -> DomainResult<()>,
    ) -> DomainResult<Vec<EggBox>> {
        let mut by_key: HashMap<CompositeKey, EggBox> = HashMap::with_capacity(boxes.len());
        for b in boxes {
            if !self.box_ids.contains(b.box_id()) {
                return Err(DomainError::validation(format!(
                    "egg box {} is not part of shipment {}",
                    b.box_id(),
                    self.shipment_id
                )));
            }
            by_key.insert(b.box_id().clone(), b);
        }

        let mut changed = Vec::new();
        for key in &self.box_ids {
            let mut b = by_key
                .remove(key)
                .ok_or_else(|| DomainError::not_found(format!("egg box {key}")))?;
            if b.is_in(from) {
                step(&mut b)?;
                changed.push(b);
            }
        }
        Ok(changed)
    }
}

impl Record for Shipment {
    const RECORD_TYPE: RecordType = RecordType::Shipment;

    fn record_type(&self) -> RecordType {
        self.record_type
    }

    fn key(&self) -> &CompositeKey {
        &self.shipment_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn request(min: usize, max: usize) -> ShipmentRequest {
        ShipmentRequest {
            farmer_id: "farmer2".to_string(),
            shipper_id: "shipper2".to_string(),
            distributor_id: "dist2".to_string(),
            shipment_creation: "202106031700".to_string(),
            min,
            max,
        }
    }

    fn packed(n: usize) -> Vec<EggBox> {
        (0..n)
            .map(|i| EggBox::pack("farmer2", format!("2021060316{i:02}"), 30).unwrap())
            .collect()
    }

    fn assembled(n: usize) -> (Shipment, Vec<EggBox>) {
        Shipment::assemble(&request(1, 10), packed(n)).unwrap()
    }

    #[test]
    fn assemble_marks_boxes_ready_and_records_ids() {
        let (shipment, boxes) = assembled(3);
        assert_eq!(shipment.shipment_id().as_str(), "Shipment:farmer2:dist2:202106031700");
        assert_eq!(shipment.state(), ShipmentState::Ready);
        assert_eq!(shipment.box_ids().len(), 3);
        assert!(boxes.iter().all(|b| b.state() == BoxState::ReadyForShipment));
        assert_eq!(shipment.load_timestamp(), None);
    }

    #[test]
    fn assemble_reports_count_against_minimum() {
        let err = Shipment::assemble(&request(5, 10), packed(3)).unwrap_err();
        assert_eq!(err, DomainError::insufficient_quantity(3, 5));
    }

    #[test]
    fn assemble_respects_max() {
        let (shipment, boxes) = Shipment::assemble(&request(2, 2), packed(3)).unwrap();
        assert_eq!(shipment.box_ids().len(), 2);
        assert_eq!(boxes.len(), 2);
    }

    #[test]
    fn assemble_rejects_boxes_of_other_farmers() {
        let mut candidates = packed(1);
        candidates.push(EggBox::pack("farmer9", "t", 10).unwrap());
        let err = Shipment::assemble(&request(1, 10), candidates).unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
    }

    #[test]
    fn load_moves_ready_boxes_to_shipper() {
        let (mut shipment, boxes) = assembled(2);
        let changed = shipment.load("202106031800", boxes).unwrap();
        assert_eq!(shipment.state(), ShipmentState::Loaded);
        assert_eq!(shipment.load_timestamp(), Some("202106031800"));
        assert_eq!(changed.len(), 2);
        assert!(changed
            .iter()
            .all(|b| b.state() == BoxState::InTransit && b.holder_id() == "shipper2"));
    }

    #[test]
    fn load_skips_damaged_boxes() {
        let (mut shipment, mut boxes) = assembled(2);
        boxes[0].report_damage().unwrap();
        let damaged = boxes[0].clone();
        let changed = shipment.load("t", boxes).unwrap();
        assert_eq!(changed.len(), 1);
        assert_ne!(changed[0].box_id(), damaged.box_id());
    }

    #[test]
    fn loading_twice_is_rejected() {
        let (mut shipment, boxes) = assembled(2);
        let changed = shipment.load("t1", boxes).unwrap();
        let err = shipment.load("t2", changed).unwrap_err();
        assert!(err.to_string().contains("is not ready"));
    }

    #[test]
    fn missing_box_fails_whole_batch() {
        let (mut shipment, mut boxes) = assembled(2);
        boxes.pop();
        let before = shipment.clone();
        let err = shipment.load("t", boxes).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        assert_eq!(shipment, before);
    }

    #[test]
    fn foreign_box_fails_whole_batch() {
        let (mut shipment, mut boxes) = assembled(1);
        boxes.push(EggBox::pack("farmer2", "other", 1).unwrap());
        let err = shipment.load("t", boxes).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(shipment.state(), ShipmentState::Ready);
    }

    #[test]
    fn deliver_requires_loaded() {
        let (mut shipment, boxes) = assembled(2);
        let err = shipment.deliver("t", boxes).unwrap_err();
        assert!(err.to_string().contains("is not loaded"));
    }

    #[test]
    fn deliver_hands_boxes_to_distributor() {
        let (mut shipment, boxes) = assembled(2);
        let loaded = shipment.load("t1", boxes).unwrap();
        let delivered = shipment.deliver("202106031900", loaded).unwrap();
        assert_eq!(shipment.state(), ShipmentState::Delivered);
        assert_eq!(shipment.delivery_date(), Some("202106031900"));
        assert!(delivered
            .iter()
            .all(|b| b.state() == BoxState::InDistributionCentre && b.holder_id() == "dist2"));
    }

    #[test]
    fn optional_timestamps_are_omitted_until_set() {
        let (shipment, _) = assembled(1);
        let value = serde_json::to_value(&shipment).unwrap();
        assert_eq!(value["type"], "Shipment");
        assert_eq!(value["state"], "READY");
        assert!(value.get("loadTimestamp").is_none());
        assert!(value.get("deliveryDate").is_none());
        let decoded: Shipment = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, shipment);
    }

    proptest! {
        /// Assembly succeeds exactly when the capped candidate count reaches
        /// the minimum.
        #[test]
        fn assemble_fails_iff_below_minimum(n in 0usize..8, min in 0usize..8, max in 0usize..8) {
            let result = Shipment::assemble(&request(min, max), packed(n));
            let capped = if max > 0 { n.min(max) } else { n };
            prop_assert_eq!(result.is_ok(), capped >= min);
            if let Ok((shipment, boxes)) = result {
                prop_assert_eq!(shipment.box_ids().len(), capped);
                prop_assert_eq!(boxes.len(), capped);
            }
        }
    }
}
