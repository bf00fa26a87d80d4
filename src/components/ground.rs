//! Ground symbol.

use crate::circuit::{ComponentId, Point};

/// A ground connection. Any node touching a ground terminal becomes the
/// reference node.
#[derive(Debug, Clone)]
pub struct Ground {
    pub id: ComponentId,
    pub name: String,
    pub terminals: [Point; 1],
}

impl Ground {
    /// Create a new ground symbol at `position`.
    pub fn new(id: ComponentId, name: String, position: Point) -> Self {
        Self {
            id,
            name,
            terminals: [position],
        }
    }

    /// Get the connection point.
    pub fn position(&self) -> Point {
        self.terminals[0]
    }
}
