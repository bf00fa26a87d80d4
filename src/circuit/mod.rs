//! Schematic representation, node generation and validation.
//!
//! A [`Schematic`] holds placed components and wires on an integer grid.
//! [`NodeMap::generate`] turns it into electrical nodes suitable for
//! simulation.

mod nodes;
mod schematic;
mod types;
mod validate;

pub use nodes::{Node, NodeMap};
pub use schematic::{Schematic, Wire};
pub use types::*;
pub use validate::validate_schematic;
