//! Lazily computed, memoized query results.

use std::collections::HashMap;
use std::ops::Neg;

use super::keys::{CurrentKey, ReversibleKey, VoltageDropKey};
use super::power::{ac_source_power, element_power, resistor_power, PowerReading};
use crate::circuit::{ComponentId, NodeIndex};
use crate::components::{Component, TwoTerminal};
use crate::signal::PhasorSignal;

/// A cache that stores every value together with its reverse.
///
/// Inserting under `k` also stores the negated value under
/// `k.reversed()`, so reading a quantity in the opposite direction yields
/// the exact negation of the forward reading.
#[derive(Debug, Clone)]
pub struct SymmetricCache<K, S> {
    values: HashMap<K, S>,
}

impl<K, S> Default for SymmetricCache<K, S> {
    fn default() -> Self {
        Self { values: HashMap::new() }
    }
}

impl<K: ReversibleKey, S: Clone + Neg<Output = S>> SymmetricCache<K, S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<&S> {
        self.values.get(key)
    }

    /// Store `value` under `key` and its negation under the reverse key.
    pub fn insert(&mut self, key: K, value: S) {
        let reverse = key.reversed();
        if reverse != key {
            self.values.insert(reverse, -value.clone());
        }
        self.values.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

/// One component as seen by the query layer.
#[derive(Debug, Clone)]
pub struct ComponentEntry {
    pub component: Component,
    /// Nodes the voltage drop is measured between. Op-amps measure their
    /// output against the reference node.
    pub nodes: [NodeIndex; 2],
    /// Branch-current index for voltage sources and op-amps
    pub active_index: Option<usize>,
}

/// Raw per-node and per-branch signals of one finished simulation.
#[derive(Debug, Clone, Default)]
pub struct ResultData {
    /// Combined potential of every non-reference node
    pub node_signals: Vec<PhasorSignal>,
    /// Combined branch current per active index
    pub active_currents: Vec<PhasorSignal>,
    pub components: Vec<ComponentEntry>,
}

/// Answers voltage, current and power queries on simulation results.
#[derive(Debug, Clone, Default)]
pub struct ResultCache {
    data: ResultData,
    drops: SymmetricCache<VoltageDropKey, PhasorSignal>,
    currents: SymmetricCache<CurrentKey, PhasorSignal>,
    powers: HashMap<ComponentId, PowerReading>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the underlying data and drop everything cached so far.
    ///
    /// Currents of voltage sources and op-amps come from the branch-current
    /// signals; current sources carry their own value, negated since it
    /// leaves through the + terminal.
    pub fn load_new_data(&mut self, data: ResultData) {
        self.drops.clear();
        self.currents.clear();
        self.powers.clear();

        for entry in &data.components {
            let id = entry.component.id();
            match &entry.component {
                Component::VoltageSource(_) | Component::OpAmp(_) => {
                    if let Some(current) = entry.active_index.and_then(|k| data.active_currents.get(k)) {
                        self.currents.insert(CurrentKey::new(id, false), current.clone());
                    }
                }
                Component::CurrentSource(source) => {
                    self.currents
                        .insert(CurrentKey::new(id, false), PhasorSignal::constant(-source.value));
                }
                _ => {}
            }
        }

        self.data = data;
    }

    /// Component entries in schematic order.
    pub fn components(&self) -> &[ComponentEntry] {
        &self.data.components
    }

    /// Loaded entry of `component`.
    pub fn entry(&self, component: ComponentId) -> Option<&ComponentEntry> {
        self.data.components.iter().find(|e| e.component.id() == component)
    }

    /// Combined potential of `node`. The reference node reads zero.
    pub fn node_potential(&self, node: NodeIndex) -> Option<PhasorSignal> {
        match node.matrix_index() {
            None => Some(PhasorSignal::zero()),
            Some(i) => self.data.node_signals.get(i).cloned(),
        }
    }

    /// Voltage drop `V(from) - V(to)`, or `None` if either node is unknown.
    pub fn try_get_voltage_drop(&mut self, from: NodeIndex, to: NodeIndex) -> Option<PhasorSignal> {
        let key = VoltageDropKey::new(from, to);
        if let Some(drop) = self.drops.get(&key) {
            return Some(drop.clone());
        }

        let a = self.node_potential(from)?;
        let b = self.node_potential(to)?;
        let drop = if from == to { PhasorSignal::zero() } else { &a - &b };
        self.drops.insert(key, drop.clone());
        Some(drop)
    }

    /// Like [`Self::try_get_voltage_drop`], reading unknown nodes as a zero drop.
    pub fn get_voltage_drop_or_zero(&mut self, from: NodeIndex, to: NodeIndex) -> PhasorSignal {
        self.try_get_voltage_drop(from, to).unwrap_or_default()
    }

    /// Current through `component`, flowing into its first terminal unless
    /// `reverse` is set.
    pub fn get_current(&mut self, component: ComponentId, reverse: bool) -> Option<PhasorSignal> {
        let key = CurrentKey::new(component, reverse);
        if let Some(current) = self.currents.get(&key) {
            return Some(current.clone());
        }

        let [a, b] = self.entry(component)?.nodes;
        let drop = self.try_get_voltage_drop(a, b)?;
        let element = self.entry(component)?.component.as_two_terminal()?;
        let forward = drop.map(
            |dc| dc * element.conductance(),
            |source, v| v * element.admittance(source.frequency.hz()),
        );

        self.currents.insert(CurrentKey::new(component, false), forward);
        self.currents.get(&key).cloned()
    }

    /// Branch current by active index, or zero if there is none.
    pub fn get_current_or_zero(&self, active_index: usize, reverse: bool) -> PhasorSignal {
        match self.data.active_currents.get(active_index) {
            Some(current) if reverse => -current,
            Some(current) => current.clone(),
            None => PhasorSignal::zero(),
        }
    }

    /// Power absorbed by `component`. Ground has none.
    pub fn get_power(&mut self, component: ComponentId) -> Option<PowerReading> {
        if let Some(reading) = self.powers.get(&component) {
            return Some(*reading);
        }

        let entry = self.entry(component)?.clone();
        let [a, b] = entry.nodes;
        let reading = match &entry.component {
            Component::Ground(_) => return None,
            Component::Resistor(r) => {
                let drop = self.try_get_voltage_drop(a, b)?;
                resistor_power(&drop, r.conductance())
            }
            Component::VoltageSource(v) if v.is_ac() => {
                let drop = self.try_get_voltage_drop(a, b)?;
                let current = self.get_current(component, false)?;
                ac_source_power(&drop, &current, v.description().frequency)
            }
            _ => {
                let drop = self.try_get_voltage_drop(a, b)?;
                let current = self.get_current(component, false)?;
                element_power(&drop, &current)
            }
        };

        self.powers.insert(component, reading);
        Some(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Point;
    use crate::components::{CurrentSource, Resistor, SourceDescription, SourceKind, VoltageSource};
    use crate::signal::SignalInterpreter;
    use approx::assert_relative_eq;
    use num_complex::Complex64;

    fn p(x: i32, y: i32) -> Point {
        Point::new(x, y)
    }

    /// V1 = 5 V on node 0 feeding R1 (1k) to node 1 and R2 (1k) to ground,
    /// with a 1 mA current source into node 1.
    fn data() -> ResultData {
        let v1 = VoltageSource::dc(ComponentId(0), "V1".into(), [p(0, 1), p(0, 0)], 5.0);
        let r1 = Resistor::new(ComponentId(1), "R1".into(), [p(0, 1), p(1, 1)], 1e3);
        let r2 = Resistor::new(ComponentId(2), "R2".into(), [p(1, 1), p(0, 0)], 1e3);
        let i1 = CurrentSource::new(ComponentId(3), "I1".into(), [p(1, 1), p(0, 0)], 1e-3);
        ResultData {
            node_signals: vec![PhasorSignal::constant(5.0), PhasorSignal::constant(3.0)],
            active_currents: vec![PhasorSignal::constant(-2e-3)],
            components: vec![
                ComponentEntry {
                    component: Component::VoltageSource(v1),
                    nodes: [NodeIndex(0), NodeIndex::REFERENCE],
                    active_index: Some(0),
                },
                ComponentEntry {
                    component: Component::Resistor(r1),
                    nodes: [NodeIndex(0), NodeIndex(1)],
                    active_index: None,
                },
                ComponentEntry {
                    component: Component::Resistor(r2),
                    nodes: [NodeIndex(1), NodeIndex::REFERENCE],
                    active_index: None,
                },
                ComponentEntry {
                    component: Component::CurrentSource(i1),
                    nodes: [NodeIndex(1), NodeIndex::REFERENCE],
                    active_index: None,
                },
            ],
        }
    }

    fn loaded() -> ResultCache {
        let mut cache = ResultCache::new();
        cache.load_new_data(data());
        cache
    }

    #[test]
    fn test_symmetric_cache_stores_negation() {
        let mut cache: SymmetricCache<VoltageDropKey, PhasorSignal> = SymmetricCache::new();
        let key = VoltageDropKey::new(NodeIndex(0), NodeIndex(1));
        cache.insert(key, PhasorSignal::constant(2.5));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&key.reversed()), Some(&PhasorSignal::constant(-2.5)));

        cache.insert(VoltageDropKey::new(NodeIndex(1), NodeIndex(1)), PhasorSignal::zero());
        assert_eq!(cache.len(), 3);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_voltage_drops() {
        let mut cache = loaded();
        let forward = cache.try_get_voltage_drop(NodeIndex(0), NodeIndex(1)).unwrap();
        let backward = cache.try_get_voltage_drop(NodeIndex(1), NodeIndex(0)).unwrap();
        assert_eq!(forward.dc(), 2.0);
        assert_eq!(backward, -forward);
        assert_eq!(cache.try_get_voltage_drop(NodeIndex(1), NodeIndex(1)), Some(PhasorSignal::zero()));
        assert_eq!(cache.get_voltage_drop_or_zero(NodeIndex(0), NodeIndex::REFERENCE).dc(), 5.0);

        assert_eq!(cache.try_get_voltage_drop(NodeIndex(0), NodeIndex(7)), None);
        assert_eq!(cache.get_voltage_drop_or_zero(NodeIndex(7), NodeIndex(0)), PhasorSignal::zero());
    }

    #[test]
    fn test_currents() {
        let mut cache = loaded();
        let r1 = cache.get_current(ComponentId(1), false).unwrap();
        assert_relative_eq!(r1.dc(), 2e-3, epsilon = 1e-12);
        assert_eq!(cache.get_current(ComponentId(1), true).unwrap(), -r1);

        assert_eq!(cache.get_current(ComponentId(0), false).unwrap().dc(), -2e-3);
        assert_eq!(cache.get_current(ComponentId(3), false).unwrap().dc(), -1e-3);
        assert_eq!(cache.get_current(ComponentId(3), true).unwrap().dc(), 1e-3);
        assert_eq!(cache.get_current(ComponentId(42), false), None);

        assert_eq!(cache.get_current_or_zero(0, true).dc(), 2e-3);
        assert_eq!(cache.get_current_or_zero(5, false), PhasorSignal::zero());
    }

    #[test]
    fn test_power() {
        let mut cache = loaded();
        let r1 = cache.get_power(ComponentId(1)).unwrap();
        assert_relative_eq!(r1.average, 4e-3, epsilon = 1e-12);
        assert_relative_eq!(r1.maximum, 4e-3, epsilon = 1e-12);

        // source delivers 10 mW
        let v1 = cache.get_power(ComponentId(0)).unwrap();
        assert_relative_eq!(v1.average, -10e-3, epsilon = 1e-12);

        // current source pushes 1 mA up into a 3 V node
        let i1 = cache.get_power(ComponentId(3)).unwrap();
        assert_relative_eq!(i1.average, -3e-3, epsilon = 1e-12);
        assert_eq!(cache.get_power(ComponentId(3)), Some(i1));
        assert_eq!(cache.get_power(ComponentId(99)), None);
    }

    #[test]
    fn test_load_new_data_clears_cache() {
        let mut cache = loaded();
        let _ = cache.get_power(ComponentId(1));

        let mut next = data();
        next.node_signals[1] = PhasorSignal::constant(1.0);
        cache.load_new_data(next);
        assert_relative_eq!(cache.get_current(ComponentId(1), false).unwrap().dc(), 4e-3, epsilon = 1e-12);
        assert_relative_eq!(cache.get_power(ComponentId(1)).unwrap().average, 16e-3, epsilon = 1e-12);
    }

    #[test]
    fn test_ac_current_through_resistor() {
        let src = SourceDescription::new(SourceKind::AcVoltage, 50.0, 1.0, ComponentId(0));
        let mut d = data();
        d.node_signals[0] = PhasorSignal::constant(5.0).with_phasor(src, Complex64::new(1.0, 0.0));
        let mut cache = ResultCache::new();
        cache.load_new_data(d);

        let r1 = cache.get_current(ComponentId(1), false).unwrap();
        assert_relative_eq!(r1.phasor(&src).unwrap().re, 1e-3, epsilon = 1e-12);
        assert_relative_eq!(r1.maximum(), 3e-3, epsilon = 1e-12);
    }
}
