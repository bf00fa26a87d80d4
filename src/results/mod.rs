//! Voltage, current and power queries on a finished simulation.
//!
//! The simulator loads per-node and per-branch signals into a
//! [`ResultCache`]; every derived quantity is computed on first request and
//! memoized together with its reverse-direction negation.

mod cache;
mod keys;
mod power;

pub use cache::{ComponentEntry, ResultCache, ResultData, SymmetricCache};
pub use keys::{CurrentKey, ReversibleKey, VoltageDropKey};
pub use power::{ac_source_power, complex_power, element_power, resistor_power, PowerReading};
