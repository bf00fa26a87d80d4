//! Node generation: merging terminals into electrical nodes.
//!
//! Terminals at the same grid position are one node. Wires join the nodes
//! at their endpoints, and a chain of wires sharing endpoints joins
//! everything it touches in a single step. Afterwards one node is chosen as
//! the reference (ground) and the rest are numbered densely from 0.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use num_complex::Complex64;
use tracing::debug;

use super::schematic::{Schematic, Wire};
use super::types::{ComponentId, Frequency, NodeIndex, Point, TerminalId};
use crate::components::Component;
use crate::error::{Result, SimulationError};

/// One electrical node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Dense index, or [`NodeIndex::REFERENCE`]
    pub index: NodeIndex,
    /// Every terminal on this node
    pub terminals: Vec<TerminalId>,
    /// Every grid position electrically on this node
    pub positions: BTreeSet<Point>,
    /// Solved DC potential
    pub dc_potential: f64,
    /// Solved potential phasor per AC frequency
    pub ac_potentials: BTreeMap<Frequency, Complex64>,
}

impl Node {
    fn provisional(position: Point) -> Self {
        Self {
            index: NodeIndex::REFERENCE,
            terminals: Vec::new(),
            positions: BTreeSet::from([position]),
            dc_potential: 0.0,
            ac_potentials: BTreeMap::new(),
        }
    }

    fn absorb(&mut self, other: Node) {
        self.terminals.extend(other.terminals);
        self.positions.extend(other.positions);
    }

    /// Check if a component has a terminal on this node.
    pub fn touches(&self, component: ComponentId) -> bool {
        self.terminals.iter().any(|t| t.component == component)
    }
}

/// Arena of the nodes generated for one schematic.
///
/// Non-reference nodes live at their own index; terminals map to node
/// indices rather than holding the nodes themselves.
#[derive(Debug, Clone, Default)]
pub struct NodeMap {
    nodes: Vec<Node>,
    reference: Option<Node>,
    terminal_nodes: HashMap<TerminalId, NodeIndex>,
}

impl NodeMap {
    /// Generate the nodes of `schematic`.
    pub fn generate(schematic: &Schematic) -> Self {
        let mut groups = ProvisionalNodes::from_terminals(schematic);
        groups.join_wires(&schematic.wires);

        let reference_slots = groups.reference_slots(schematic);
        let mut nodes = Vec::new();
        let mut reference: Option<Node> = None;

        for (slot, group) in groups.slots.into_iter().enumerate() {
            let Some(mut node) = group else { continue };
            if reference_slots.contains(&slot) {
                match reference.as_mut() {
                    Some(r) => r.absorb(node),
                    None => reference = Some(node),
                }
            } else {
                node.index = NodeIndex::from_matrix_index(nodes.len());
                nodes.push(node);
            }
        }

        let mut terminal_nodes = HashMap::new();
        for node in nodes.iter().chain(reference.iter()) {
            for &terminal in &node.terminals {
                terminal_nodes.insert(terminal, node.index);
            }
        }

        debug!(
            nodes = nodes.len(),
            reference_terminals = reference.as_ref().map_or(0, |r| r.terminals.len()),
            "generated nodes"
        );

        Self {
            nodes,
            reference,
            terminal_nodes,
        }
    }

    /// Number of non-reference nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if there are no non-reference nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Non-reference nodes in index order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The merged reference node, if any terminal landed on it.
    pub fn reference(&self) -> Option<&Node> {
        self.reference.as_ref()
    }

    /// Look up a node by index, including the reference node.
    pub fn node(&self, index: NodeIndex) -> Option<&Node> {
        match index.matrix_index() {
            Some(i) => self.nodes.get(i),
            None => self.reference.as_ref(),
        }
    }

    /// Node a terminal belongs to.
    pub fn node_of(&self, terminal: TerminalId) -> Option<NodeIndex> {
        self.terminal_nodes.get(&terminal).copied()
    }

    /// Node of terminal slot `terminal` on `component`, as a construction error
    /// when the terminal was never mapped.
    pub fn terminal_node(&self, component: &Component, terminal: usize) -> Result<NodeIndex> {
        self.node_of(TerminalId::new(component.id(), terminal))
            .ok_or_else(|| SimulationError::UnmappedTerminal {
                component: component.name().to_string(),
                terminal,
            })
    }

    /// Node at a grid position, if any node covers it.
    pub fn node_at(&self, position: Point) -> Option<NodeIndex> {
        self.nodes
            .iter()
            .chain(self.reference.iter())
            .find(|n| n.positions.contains(&position))
            .map(|n| n.index)
    }

    /// Total number of mapped terminals.
    pub fn terminal_count(&self) -> usize {
        self.terminal_nodes.len()
    }

    /// Record the solved DC potential of a node.
    pub fn set_dc_potential(&mut self, index: NodeIndex, potential: f64) {
        if let Some(node) = index.matrix_index().and_then(|i| self.nodes.get_mut(i)) {
            node.dc_potential = potential;
        }
    }

    /// Record the solved potential phasor of a node at `frequency`.
    pub fn set_ac_potential(&mut self, index: NodeIndex, frequency: Frequency, potential: Complex64) {
        if let Some(node) = index.matrix_index().and_then(|i| self.nodes.get_mut(i)) {
            node.ac_potentials.insert(frequency, potential);
        }
    }
}

/// Working set of provisional nodes during generation.
///
/// Merged-away nodes leave a `None` slot behind so slot numbers stay stable
/// and the surviving nodes keep their first-seen order.
struct ProvisionalNodes {
    slots: Vec<Option<Node>>,
    by_position: HashMap<Point, usize>,
}

impl ProvisionalNodes {
    fn from_terminals(schematic: &Schematic) -> Self {
        let mut groups = Self {
            slots: Vec::new(),
            by_position: HashMap::new(),
        };

        for component in &schematic.components {
            for (slot, &position) in component.terminals().iter().enumerate() {
                let idx = groups.slot_for(position);
                if let Some(node) = groups.slots[idx].as_mut() {
                    node.terminals.push(TerminalId::new(component.id(), slot));
                }
            }
        }

        groups
    }

    fn slot_for(&mut self, position: Point) -> usize {
        if let Some(&idx) = self.by_position.get(&position) {
            return idx;
        }
        let idx = self.slots.len();
        self.slots.push(Some(Node::provisional(position)));
        self.by_position.insert(position, idx);
        idx
    }

    fn join_wires(&mut self, wires: &[Wire]) {
        let mut remaining: Vec<(Point, Point)> = wires.iter().filter_map(Wire::endpoints).collect();

        loop {
            let start = remaining
                .iter()
                .position(|(a, b)| self.by_position.contains_key(a) || self.by_position.contains_key(b));
            let Some(start) = start else { break };

            let (consumed, endpoints) = wire_subgraph(&remaining, start);

            let mut touched: Vec<usize> = endpoints
                .iter()
                .filter_map(|p| self.by_position.get(p).copied())
                .collect();
            touched.sort_unstable();
            touched.dedup();

            // Lowest slot survives so that node order follows first appearance
            let survivor = touched[0];
            for &idx in &touched[1..] {
                if let Some(node) = self.slots[idx].take() {
                    for p in &node.positions {
                        self.by_position.insert(*p, survivor);
                    }
                    if let Some(target) = self.slots[survivor].as_mut() {
                        target.absorb(node);
                    }
                }
            }
            if let Some(target) = self.slots[survivor].as_mut() {
                target.positions.extend(endpoints.iter().copied());
            }
            for p in endpoints {
                self.by_position.insert(p, survivor);
            }

            debug!(wires = consumed.len(), merged = touched.len(), "joined wire subgraph");

            let mut idx = 0;
            remaining.retain(|_| {
                let keep = !consumed.contains(&idx);
                idx += 1;
                keep
            });
        }
    }

    /// Slots that make up the reference node.
    fn reference_slots(&self, schematic: &Schematic) -> HashSet<usize> {
        let live = |p: &Point| self.by_position.get(p).copied();

        let grounds: HashSet<usize> = schematic
            .components
            .iter()
            .filter_map(|c| match c {
                Component::Ground(g) => live(&g.position()),
                _ => None,
            })
            .collect();
        if !grounds.is_empty() {
            return grounds;
        }

        if let Some(slot) = schematic.components.iter().find_map(|c| c.source_negative()).and_then(|p| live(&p)) {
            return HashSet::from([slot]);
        }

        debug!("no ground or source; every node is reference");
        (0..self.slots.len()).filter(|&i| self.slots[i].is_some()).collect()
    }
}

/// Breadth-first walk over wires sharing endpoints, starting at `start`.
/// Returns the consumed wire positions and every endpoint they reach.
fn wire_subgraph(wires: &[(Point, Point)], start: usize) -> (HashSet<usize>, HashSet<Point>) {
    let mut consumed = HashSet::from([start]);
    let mut endpoints = HashSet::new();
    let mut queue = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        let (a, b) = wires[current];
        endpoints.insert(a);
        endpoints.insert(b);

        for (idx, &(c, d)) in wires.iter().enumerate() {
            if consumed.contains(&idx) {
                continue;
            }
            if c == a || c == b || d == a || d == b {
                consumed.insert(idx);
                queue.push_back(idx);
            }
        }
    }

    (consumed, endpoints)
}
