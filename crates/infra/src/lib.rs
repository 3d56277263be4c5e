//! Infrastructure layer: world state, unit of work, selector queries and the
//! contract entry points that orchestrate the pure domain crates.

pub mod codec;
pub mod config;
pub mod contract;
pub mod error;
pub mod query;
pub mod router;
pub mod transaction;
pub mod world_state;

pub use config::ContractConfig;
pub use contract::{EggTrackingContract, OK};
pub use error::{ContractError, ContractResult, ErrorKind};
pub use query::{CapMode, QueryCap, QueryResult, Selector};
pub use transaction::Transaction;
pub use world_state::{InMemoryWorldState, StoreError, WorldState};
