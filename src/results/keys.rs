//! Cache keys for directional quantities.

use crate::circuit::{ComponentId, NodeIndex};

/// A key for a quantity whose reverse direction is its exact negation.
pub trait ReversibleKey: Copy + Eq + std::hash::Hash {
    /// The key of the same quantity measured the other way round.
    fn reversed(&self) -> Self;
}

/// Voltage drop from one node to another, `V(from) - V(to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoltageDropKey {
    pub from: NodeIndex,
    pub to: NodeIndex,
}

impl VoltageDropKey {
    pub fn new(from: NodeIndex, to: NodeIndex) -> Self {
        Self { from, to }
    }
}

impl ReversibleKey for VoltageDropKey {
    fn reversed(&self) -> Self {
        Self {
            from: self.to,
            to: self.from,
        }
    }
}

/// Current through a component; `reversed` flips the measuring direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CurrentKey {
    pub component: ComponentId,
    pub reversed: bool,
}

impl CurrentKey {
    pub fn new(component: ComponentId, reversed: bool) -> Self {
        Self { component, reversed }
    }
}

impl ReversibleKey for CurrentKey {
    fn reversed(&self) -> Self {
        Self {
            component: self.component,
            reversed: !self.reversed,
        }
    }
}
