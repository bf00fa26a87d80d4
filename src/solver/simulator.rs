//! Main simulator interface.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use num_complex::Complex64;
use tracing::{debug, info, info_span};

use super::elements::ElementTable;
use super::factory::{is_saturation, MatrixFactory};
use super::operating_point::{OperatingPoint, OperatingPointIterator, DEFAULT_MAX_ITERATIONS};
use super::states::{InstantaneousState, PhasorState, WaveformState};
use crate::circuit::{ComponentId, Frequency, NodeIndex, NodeMap, Schematic};
use crate::components::{Component, OpAmpMode, SourceDescription};
use crate::error::{Result, SimulationError};
use crate::results::{ComponentEntry, ResultCache, ResultData};
use crate::signal::{PhasorSignal, SampleGrid, Signal, WaveformSignal};

/// Configuration for the simulator.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Maximum operating-point iterations before giving up on op-amp modes.
    pub max_iterations: usize,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SimulatorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum operating-point iterations.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Check that the configuration can run a simulation.
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(SimulationError::InvalidConfig {
                message: "max_iterations must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Steady-state schematic simulator.
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    config: SimulatorConfig,
}

impl Simulator {
    /// Create a new simulator with the given configuration.
    pub fn new(config: SimulatorConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Run the whole pipeline on `schematic`.
    ///
    /// Nodes are generated, the op-amp operating point is settled, every
    /// source is solved on its own and the per-source states are combined
    /// into the result cache.
    pub fn simulate(&self, schematic: Schematic) -> Result<Simulation> {
        self.config.validate()?;

        let span = info_span!(
            "simulate",
            components = schematic.components.len(),
            wires = schematic.wires.len()
        );
        let _enter = span.enter();

        let mut nodes = NodeMap::generate(&schematic);
        let elements = ElementTable::build(&schematic, &nodes)?;
        let active = elements.active_count();

        if nodes.is_empty() {
            debug!("no non-reference nodes, nothing to solve");
            let dc = PhasorState::zeros(0, active);
            let results = load_results(&schematic, &nodes, &elements, &dc, &IndexMap::new());
            return Ok(Simulation {
                schematic,
                nodes,
                elements,
                operating_point: None,
                dc,
                ac: IndexMap::new(),
                sources: IndexMap::new(),
                results,
            });
        }

        let mut factory = MatrixFactory::new(&elements);
        let operating_point = OperatingPointIterator::new(self.config.max_iterations).run(&mut factory)?;

        let mut sources = IndexMap::new();
        for source in factory.sources() {
            let state = PhasorState::from(factory.build_for_source(&source)?.solve()?);
            debug!(source = %source, rail = is_saturation(&source), "solved source");
            sources.insert(source, state);
        }

        let mut dc = PhasorState::zeros(nodes.len(), active);
        let mut ac = IndexMap::new();
        for (source, state) in &sources {
            if source.is_dc() {
                dc += state;
            } else {
                ac.insert(*source, state.clone());
            }
        }

        for (i, v) in dc.potentials.iter().enumerate() {
            nodes.set_dc_potential(NodeIndex::from_matrix_index(i), v.re);
        }
        for (frequency, state) in combine_by_frequency(&ac, nodes.len(), active) {
            for (i, v) in state.potentials.iter().enumerate() {
                nodes.set_ac_potential(NodeIndex::from_matrix_index(i), frequency, *v);
            }
        }

        let results = load_results(&schematic, &nodes, &elements, &dc, &ac);

        info!(
            nodes = nodes.len(),
            sources = sources.len(),
            iterations = operating_point.iterations,
            "simulation complete"
        );

        Ok(Simulation {
            schematic,
            nodes,
            elements,
            operating_point: Some(operating_point),
            dc,
            ac,
            sources,
            results,
        })
    }
}

fn combine_by_frequency(
    ac: &IndexMap<SourceDescription, PhasorState>,
    nodes: usize,
    active: usize,
) -> BTreeMap<Frequency, PhasorState> {
    let mut out = BTreeMap::new();
    for (source, state) in ac {
        *out.entry(source.frequency)
            .or_insert_with(|| PhasorState::zeros(nodes, active)) += state;
    }
    out
}

/// DC value plus one phasor per AC source, picked out of each state.
fn combine(
    dc: Complex64,
    ac: &IndexMap<SourceDescription, PhasorState>,
    pick: impl Fn(&PhasorState) -> Complex64,
) -> PhasorSignal {
    let mut signal = PhasorSignal::constant(dc.re);
    for (source, state) in ac {
        signal.add_phasor(*source, pick(state));
    }
    signal
}

fn load_results(
    schematic: &Schematic,
    nodes: &NodeMap,
    elements: &ElementTable,
    dc: &PhasorState,
    ac: &IndexMap<SourceDescription, PhasorState>,
) -> ResultCache {
    let node_signals = (0..dc.potentials.len())
        .map(|i| combine(dc.potentials[i], ac, |s| s.potentials[i]))
        .collect();
    let active_currents = (0..dc.currents.len())
        .map(|k| combine(dc.currents[k], ac, |s| s.currents[k]))
        .collect();

    let components = schematic
        .components
        .iter()
        .map(|component| {
            let node = |slot| nodes.terminal_node(component, slot).unwrap_or(NodeIndex::REFERENCE);
            let measured = match component {
                Component::OpAmp(_) => [node(2), NodeIndex::REFERENCE],
                Component::Ground(_) => [node(0), NodeIndex::REFERENCE],
                _ => [node(0), node(1)],
            };
            ComponentEntry {
                component: component.clone(),
                nodes: measured,
                active_index: elements.active_index_of(component.id()),
            }
        })
        .collect();

    let mut cache = ResultCache::new();
    cache.load_new_data(ResultData {
        node_signals,
        active_currents,
        components,
    });
    cache
}

/// A finished simulation: generated nodes, settled op-amp modes, the solved
/// states and the query layer over them.
#[derive(Debug, Clone)]
pub struct Simulation {
    schematic: Schematic,
    nodes: NodeMap,
    elements: ElementTable,
    operating_point: Option<OperatingPoint>,
    dc: PhasorState,
    ac: IndexMap<SourceDescription, PhasorState>,
    sources: IndexMap<SourceDescription, PhasorState>,
    results: ResultCache,
}

impl Simulation {
    /// The simulated schematic.
    pub fn schematic(&self) -> &Schematic {
        &self.schematic
    }

    /// Generated nodes with their solved potentials.
    pub fn nodes(&self) -> &NodeMap {
        &self.nodes
    }

    /// Components resolved to node and active indices.
    pub fn elements(&self) -> &ElementTable {
        &self.elements
    }

    /// Settled op-amp modes, or `None` if there was nothing to solve.
    pub fn operating_point(&self) -> Option<&OperatingPoint> {
        self.operating_point.as_ref()
    }

    /// Settled mode of the op-amp `id`.
    pub fn op_amp_mode(&self, id: ComponentId) -> Option<OpAmpMode> {
        let position = self.elements.op_amps.iter().position(|op| op.id == id)?;
        self.operating_point.as_ref()?.modes.get(position).copied()
    }

    /// Combined state of every DC source and saturation rail.
    pub fn dc_state(&self) -> &PhasorState {
        &self.dc
    }

    /// State of each AC source on its own.
    pub fn ac_states(&self) -> &IndexMap<SourceDescription, PhasorState> {
        &self.ac
    }

    /// State of every source on its own, in solve order.
    pub fn source_states(&self) -> &IndexMap<SourceDescription, PhasorState> {
        &self.sources
    }

    /// AC states summed per frequency.
    pub fn frequency_states(&self) -> BTreeMap<Frequency, PhasorState> {
        combine_by_frequency(&self.ac, self.dc.potentials.len(), self.dc.currents.len())
    }

    /// Real potentials and currents at time `t`.
    pub fn instantaneous_state(&self, t: f64) -> InstantaneousState {
        let mut state = self.dc.at_time(Frequency::DC, t);
        for (source, ac) in &self.ac {
            state += &ac.at_time(source.frequency, t);
        }
        state
    }

    /// `samples` instants over `periods` of the slowest AC source.
    /// Without AC sources the span is one second.
    pub fn sample_grid(&self, samples: usize, periods: f64) -> SampleGrid {
        let span = self
            .ac
            .keys()
            .map(|s| s.frequency.hz().abs())
            .filter(|f| *f > 0.0)
            .min_by(|a, b| a.total_cmp(b))
            .map_or(1.0, |f| periods / f);
        SampleGrid::spanning(span, samples)
    }

    /// Every potential and branch current sampled on `sample_grid(samples, periods)`.
    pub fn waveform_state(&self, samples: usize, periods: f64) -> WaveformState {
        let grid = self.sample_grid(samples, periods);
        let mut state = WaveformState::sample(&self.dc, Frequency::DC, grid.start, grid.step, grid.count);
        for (source, ac) in &self.ac {
            state += &WaveformState::sample(ac, source.frequency, grid.start, grid.step, grid.count);
        }
        state
    }

    /// Potential of `node` in the time domain.
    pub fn node_waveform(&self, node: NodeIndex, grid: &SampleGrid) -> Option<WaveformSignal> {
        self.node_signal(node).map(|p| Signal::from(p).sample(grid))
    }

    /// Combined potential of `node`.
    pub fn node_signal(&self, node: NodeIndex) -> Option<PhasorSignal> {
        self.results.node_potential(node)
    }

    /// Query layer, read-only.
    pub fn results(&self) -> &ResultCache {
        &self.results
    }

    /// Query layer; queries memoize and so need mutable access.
    pub fn results_mut(&mut self) -> &mut ResultCache {
        &mut self.results
    }
}
