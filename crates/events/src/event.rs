use serde::{Deserialize, Serialize};

use eggtrack_core::CompositeKey;

/// Names of the notifications emitted by the ledger.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventName {
    PackedEggs,
    ShipmentCreated,
    BoxesLoaded,
    BoxesDelivered,
    BoxDamaged,
}

impl EventName {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::PackedEggs => "packedEggs",
            EventName::ShipmentCreated => "shipmentCreated",
            EventName::BoxesLoaded => "boxesLoaded",
            EventName::BoxesDelivered => "boxesDelivered",
            EventName::BoxDamaged => "boxDamaged",
        }
    }
}

/// The record an event is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventSubject {
    BoxId(CompositeKey),
    ShipmentId(CompositeKey),
}

impl EventSubject {
    pub fn key(&self) -> &CompositeKey {
        match self {
            EventSubject::BoxId(k) | EventSubject::ShipmentId(k) => k,
        }
    }
}

/// Notification addressed to the participants concerned by a ledger change.
///
/// Encoded as `{"eventName": .., "targetAudience": [..], "boxId" | "shipmentId": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEvent {
    pub event_name: EventName,
    pub target_audience: Vec<String>,
    #[serde(flatten)]
    pub subject: EventSubject,
}

impl LedgerEvent {
    /// Whether `participant_id` is in the target audience.
    pub fn is_addressed_to(&self, participant_id: &str) -> bool {
        self.target_audience.iter().any(|p| p == participant_id)
    }
}

/// Build an event record. Pure; never fails.
///
/// The audience keeps first-seen order with duplicates dropped (a farmer may
/// ship their own boxes).
pub fn build_event<I, S>(
    event_name: EventName,
    target_audience: I,
    subject: EventSubject,
) -> LedgerEvent
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut audience: Vec<String> = Vec::new();
    for member in target_audience {
        let member = member.into();
        if !audience.contains(&member) {
            audience.push(member);
        }
    }

    LedgerEvent {
        event_name,
        target_audience: audience,
        subject,
    }
}
