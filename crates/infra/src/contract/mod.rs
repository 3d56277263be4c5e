//! Egg tracking contract: the ledger's public operations.
//!
//! Every mutating operation runs the same pipeline:
//!
//! ```text
//! caller identity
//!   ↓
//! 1. Authorize (before any read)
//!   ↓
//! 2. Read and validate current records inside a unit of work
//!   ↓
//! 3. Apply pure lifecycle transitions, stage writes, stage the event
//!   ↓
//! 4. Commit (all-or-nothing, versioned)
//!   ↓
//! 5. Publish the staged events to the bus
//! ```
//!
//! A failure at any step before the commit leaves the world state untouched
//! and publishes nothing.

mod boxes;
mod participants;
mod queries;
mod shipments;

use eggtrack_auth::{Identity, Operation, authorize};
use eggtrack_events::{EventBus, EventEnvelope};

use crate::config::ContractConfig;
use crate::error::{ContractError, ContractResult};
use crate::transaction::Transaction;
use crate::world_state::WorldState;

/// Literal result of operations that return no record.
pub const OK: &str = "ok";

#[derive(Debug)]
pub struct EggTrackingContract<S, B> {
    state: S,
    bus: B,
    config: ContractConfig,
}

impl<S, B> EggTrackingContract<S, B> {
    pub fn new(state: S, bus: B, config: ContractConfig) -> Self {
        Self { state, bus, config }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn config(&self) -> &ContractConfig {
        &self.config
    }

    pub fn into_parts(self) -> (S, B) {
        (self.state, self.bus)
    }
}

impl<S, B> EggTrackingContract<S, B>
where
    S: WorldState,
    B: EventBus,
{
    /// Authorize, then run `work` in a fresh unit of work and commit it.
    fn execute<T>(
        &self,
        caller: &Identity,
        operation: Operation,
        owner: Option<&str>,
        work: impl FnOnce(&mut Transaction<'_, S>) -> ContractResult<T>,
    ) -> ContractResult<T> {
        let span =
            tracing::info_span!("invoke", operation = operation.name(), subject = caller.subject());
        let _guard = span.enter();

        let result = self.run(caller, operation, owner, work);
        if let Err(err) = &result {
            tracing::warn!(kind = ?err.kind(), error = %err, "operation rejected");
        }
        result
    }

    fn run<T>(
        &self,
        caller: &Identity,
        operation: Operation,
        owner: Option<&str>,
        work: impl FnOnce(&mut Transaction<'_, S>) -> ContractResult<T>,
    ) -> ContractResult<T> {
        authorize(caller, operation, owner)?;

        let mut tx = Transaction::begin(&self.state, self.config.query_cap);
        let output = work(&mut tx)?;
        if tx.staged_writes() == 0 {
            return Ok(output);
        }

        let (receipt, events) = tx.commit()?;
        tracing::debug!(tx_id = %receipt.tx_id, written = receipt.written, "committed");

        // Publication happens strictly after the commit; a failure here leaves
        // the writes in place (at-least-once on retry).
        for (idx, event) in events.into_iter().enumerate() {
            let sequence_number = idx as u64 + 1;
            let envelope =
                EventEnvelope::new(receipt.tx_id, sequence_number, receipt.committed_at, event);
            self.bus
                .publish(envelope)
                .map_err(|err| ContractError::Publish(format!("{err:?}")))?;
        }
        Ok(output)
    }
}
