//! Box lifecycle: the state machine of a single egg box.
//!
//! Pure domain logic (no IO, no storage). The contract layer loads boxes from
//! the world state, applies these transitions and writes them back.

pub mod egg_box;

pub use egg_box::{BoxState, EggBox};
