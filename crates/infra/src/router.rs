//! String-argument entry point mirroring the ledger's function table.
//!
//! Hosts that hand over a function name plus positional string arguments go
//! through [`EggTrackingContract::invoke`]; the result is the encoded record,
//! query result list, or the literal `"ok"`.

use std::str::FromStr;

use eggtrack_auth::{Identity, Operation, Role, authorize};
use eggtrack_events::EventBus;
use eggtrack_shipments::ShipmentRequest;

use crate::codec::encode_payload;
use crate::contract::EggTrackingContract;
use crate::error::{ContractError, ContractResult};
use crate::world_state::WorldState;

/// Function names accepted by [`EggTrackingContract::invoke`].
pub const FUNCTIONS: [&str; 11] = [
    "packEggs",
    "pack",
    "createShipment",
    "loadBoxes",
    "deliverBoxes",
    "reportDamage",
    "createParticipant",
    "getParticipant",
    "queryEggs",
    "queryShipments",
    "queryPackedEggs",
];

impl<S, B> EggTrackingContract<S, B>
where
    S: WorldState,
    B: EventBus,
{
    pub fn invoke<A: AsRef<str>>(
        &self,
        caller: &Identity,
        function: &str,
        args: &[A],
    ) -> ContractResult<String> {
        let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();

        match function {
            "packEggs" | "pack" => {
                let [farmer_id, timestamp, quantity] = arity::<3>(function, &args)?;
                let quantity = number(function, "quantity", quantity)?;
                Ok(encode_payload(&self.pack_eggs(caller, farmer_id, timestamp, quantity)?)?)
            }
            "createShipment" => {
                let [farmer_id, shipper_id, distributor_id, creation, min, max] =
                    arity::<6>(function, &args)?;
                let request = ShipmentRequest {
                    farmer_id: farmer_id.to_string(),
                    shipper_id: shipper_id.to_string(),
                    distributor_id: distributor_id.to_string(),
                    shipment_creation: creation.to_string(),
                    min: number(function, "min", min)?,
                    max: number(function, "max", max)?,
                };
                Ok(encode_payload(&self.create_shipment(caller, &request)?)?)
            }
            "loadBoxes" => {
                let [shipment_id, timestamp] = arity::<2>(function, &args)?;
                Ok(self.load_boxes(caller, shipment_id, timestamp)?.to_string())
            }
            "deliverBoxes" => {
                let [shipment_id, date] = arity::<2>(function, &args)?;
                Ok(self.deliver_boxes(caller, shipment_id, date)?.to_string())
            }
            "reportDamage" => {
                let [box_id] = arity::<1>(function, &args)?;
                Ok(self.report_damage(caller, box_id)?.to_string())
            }
            "createParticipant" => {
                let [id, name, role] = arity::<3>(function, &args)?;
                authorize(caller, Operation::CreateParticipant, None)?;
                let role = Role::from_str(role)?;
                Ok(encode_payload(&self.create_participant(caller, id, name, role)?)?)
            }
            "getParticipant" => {
                let [id] = arity::<1>(function, &args)?;
                Ok(encode_payload(&self.get_participant(caller, id)?)?)
            }
            "queryEggs" => {
                let [id] = arity::<1>(function, &args)?;
                Ok(encode_payload(&self.query_eggs(caller, id)?)?)
            }
            "queryShipments" => {
                let [id] = arity::<1>(function, &args)?;
                Ok(encode_payload(&self.query_shipments(caller, id)?)?)
            }
            "queryPackedEggs" => {
                let [farmer_id, max] = arity::<2>(function, &args)?;
                let max = number(function, "max", max)?;
                Ok(encode_payload(&self.query_packed_eggs(caller, farmer_id, max)?)?)
            }
            other => {
                tracing::warn!(function = other, "unknown function");
                Err(ContractError::UnknownFunction(other.to_string()))
            }
        }
    }
}

fn arity<'a, const N: usize>(function: &str, args: &[&'a str]) -> ContractResult<[&'a str; N]> {
    <[&str; N]>::try_from(args).map_err(|_| {
        ContractError::InvalidArgument(format!(
            "{function} expects {N} arguments, got {}",
            args.len()
        ))
    })
}

fn number<T: FromStr>(function: &str, name: &str, raw: &str) -> ContractResult<T> {
    raw.trim().parse().map_err(|_| {
        ContractError::InvalidArgument(format!(
            "{function}: {name} must be a non-negative integer, got '{raw}'"
        ))
    })
}
