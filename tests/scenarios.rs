//! End-to-end scenarios: schematic in, voltages, currents and power out.

use approx::assert_relative_eq;
use schemsim_core::circuit::{validate_schematic, Frequency, NodeIndex, NodeMap, Point, Schematic};
use schemsim_core::components::{OpAmpMode, OpAmpParams};
use schemsim_core::signal::SignalInterpreter;
use schemsim_core::solver::{is_saturation, ElementTable, MatrixFactory};
use schemsim_core::{dsl, SimulationError, Simulator, SimulatorConfig};

fn p(x: i32, y: i32) -> Point {
    Point::new(x, y)
}

#[test]
fn single_resistor_across_a_source() {
    let mut s = Schematic::new();
    let v1 = s.add_dc_voltage_source("V1", p(0, 4), p(0, 0), 5.0);
    let r1 = s.add_resistor("R1", p(0, 4), p(0, 0), 1e3);
    s.add_ground("GND1", p(0, 0));

    let mut sim = Simulator::default().simulate(s).unwrap();
    let top = sim.nodes().node_at(p(0, 4)).unwrap();
    let results = sim.results_mut();

    let drop = results.try_get_voltage_drop(top, NodeIndex::REFERENCE).unwrap();
    assert_relative_eq!(drop.dc(), 5.0, epsilon = 1e-12);

    let current = results.get_current(r1, false).unwrap();
    assert_relative_eq!(current.dc(), 5e-3, epsilon = 1e-12);

    // passive sign convention: the source delivers what the resistor absorbs
    let source_current = results.get_current(v1, false).unwrap();
    assert_relative_eq!(source_current.dc(), -5e-3, epsilon = 1e-12);
    let absorbed = results.get_power(r1).unwrap().average;
    let delivered = results.get_power(v1).unwrap().average;
    assert_relative_eq!(absorbed, 25e-3, epsilon = 1e-12);
    assert_relative_eq!(absorbed + delivered, 0.0, epsilon = 1e-12);
}

#[test]
fn unity_buffer_saturates_at_the_positive_rail() {
    let mut s = Schematic::new();
    s.add_dc_voltage_source("V1", p(0, 4), p(0, 0), 20.0);
    let op = s.add_op_amp("OP1", p(0, 4), p(4, 4), p(4, 4), OpAmpParams::ideal());
    s.add_resistor("RL", p(4, 4), p(0, 0), 1e3);
    s.add_ground("GND1", p(0, 0));

    let sim = Simulator::default().simulate(s).unwrap();
    let out = sim.nodes().node_at(p(4, 4)).unwrap();
    let point = sim.operating_point().unwrap();

    assert_eq!(sim.op_amp_mode(op), Some(OpAmpMode::PositiveSaturation));
    assert_eq!(point.corrections, 1);
    assert_relative_eq!(sim.node_signal(out).unwrap().dc(), 15.0, epsilon = 1e-9);
}

#[test]
fn saturated_buffer_from_description() {
    let input = "\
# Non-inverting buffer driven past the rail
.model FAST OPAMP (gain=1e6 vpos=15 vneg=-15)

V1   0,4 0,0 DC 20
OP1  0,4 4,2 4,4 FAST
.wire 4,2 6,2 6,4 4,4
R1   4,4 4,0 1k
GND1 0,0
.wire 0,0 4,0
";
    let schematic = Schematic::from_ast(dsl::parse(input).unwrap()).unwrap();
    validate_schematic(&schematic).unwrap();
    let op = schematic.find_component("OP1").unwrap().id();
    let r1 = schematic.find_component("R1").unwrap().id();

    let mut sim = Simulator::default().simulate(schematic).unwrap();
    assert_eq!(sim.nodes().len(), 2);
    assert_eq!(sim.op_amp_mode(op), Some(OpAmpMode::PositiveSaturation));
    let current = sim.results_mut().get_current(r1, false).unwrap();
    assert_relative_eq!(current.dc(), 15e-3, epsilon = 1e-12);
}

#[test]
fn two_dc_sources_superpose_to_the_one_shot_solve() {
    let mut s = Schematic::new();
    s.add_dc_voltage_source("V1", p(0, 4), p(0, 0), 10.0);
    s.add_dc_voltage_source("V2", p(4, 4), p(4, 0), 5.0);
    s.add_resistor("R1", p(0, 4), p(2, 2), 1e3);
    s.add_resistor("R2", p(2, 2), p(4, 4), 1e3);
    s.add_resistor("R3", p(2, 2), p(2, 0), 1e3);
    s.add_polyline(vec![p(0, 0), p(2, 0), p(4, 0)]);
    s.add_wire(p(2, 0), p(0, 0));
    s.add_ground("GND1", p(0, 0));

    let nodes = NodeMap::generate(&s);
    let table = ElementTable::build(&s, &nodes).unwrap();
    let one_shot = MatrixFactory::new(&table).build_dc().unwrap().solve().unwrap();

    let sim = Simulator::default().simulate(s.clone()).unwrap();
    assert_eq!(sim.source_states().len(), 2);
    let combined = sim.dc_state();
    for (a, b) in combined.potentials.iter().zip(&one_shot.potentials) {
        assert_relative_eq!(a.re, b.re, epsilon = 1e-9);
    }
    for (a, b) in combined.currents.iter().zip(&one_shot.currents) {
        assert_relative_eq!(a.re, b.re, epsilon = 1e-12);
    }

    let mid = sim.nodes().node_at(p(2, 2)).unwrap();
    assert_relative_eq!(sim.node_signal(mid).unwrap().dc(), 5.0, epsilon = 1e-9);
}

#[test]
fn passive_admittance_block_is_symmetric() {
    let mut s = Schematic::new();
    let v1 = s.add_ac_voltage_source("V1", p(0, 4), p(0, 0), 1.0, 1e3);
    s.add_resistor("R1", p(0, 4), p(2, 4), 1e3);
    s.add_capacitor("C1", p(2, 4), p(4, 4), 1e-6);
    s.add_inductor("L1", p(4, 4), p(0, 0), 1e-3);
    s.add_resistor("R2", p(2, 4), p(0, 0), 2.2e3);
    s.add_ground("GND1", p(0, 0));

    let nodes = NodeMap::generate(&s);
    let table = ElementTable::build(&s, &nodes).unwrap();
    let source = s.component(v1).unwrap().source_description().unwrap();
    let matrix = MatrixFactory::new(&table).build_for_source(&source).unwrap();

    let a = matrix.a();
    for i in 0..a.rows() {
        for j in 0..a.cols() {
            assert_eq!(a.get(i, j), a.get(j, i));
        }
    }
}

#[test]
fn rc_low_pass_at_its_corner() {
    let corner = 1e3;
    let c = 1.0 / (2.0 * std::f64::consts::PI * 1e3 * corner);
    let mut s = Schematic::new();
    s.add_ac_voltage_source("V1", p(0, 4), p(0, 0), 1.0, corner);
    s.add_resistor("R1", p(0, 4), p(2, 4), 1e3);
    s.add_capacitor("C1", p(2, 4), p(2, 0), c);
    s.add_wire(p(2, 0), p(0, 0));
    s.add_ground("GND1", p(0, 0));

    let sim = Simulator::default().simulate(s).unwrap();
    let out = sim.nodes().node_at(p(2, 4)).unwrap();
    let signal = sim.node_signal(out).unwrap();

    assert_relative_eq!(signal.dc(), 0.0, epsilon = 1e-12);
    assert_relative_eq!(signal.maximum(), std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-9);
    assert_relative_eq!(signal.rms(), 0.5, epsilon = 1e-9);
    let (_, phasor) = signal.phasors().next().unwrap();
    assert_relative_eq!(phasor.arg().to_degrees(), -45.0, epsilon = 1e-6);
}

#[test]
fn reversed_quantities_are_exact_negations() {
    let mut s = Schematic::new();
    s.add_ac_voltage_source("V1", p(0, 4), p(0, 0), 3.0, 60.0);
    s.add_dc_voltage_source("V2", p(6, 4), p(6, 0), 1.5);
    let r1 = s.add_resistor("R1", p(0, 4), p(3, 4), 470.0);
    let c1 = s.add_capacitor("C1", p(3, 4), p(6, 4), 10e-6);
    s.add_resistor("R2", p(3, 4), p(3, 0), 1e3);
    s.add_polyline(vec![p(0, 0), p(3, 0), p(6, 0)]);
    s.add_wire(p(3, 0), p(0, 0));
    s.add_ground("GND1", p(0, 0));

    let mut sim = Simulator::default().simulate(s).unwrap();
    let a = sim.nodes().node_at(p(0, 4)).unwrap();
    let b = sim.nodes().node_at(p(3, 4)).unwrap();
    let results = sim.results_mut();

    let backward = results.try_get_voltage_drop(b, a).unwrap();
    let forward = results.try_get_voltage_drop(a, b).unwrap();
    assert_eq!(backward, -forward.clone());
    assert_eq!(-(-forward.clone()), forward);
    assert_eq!((-forward.clone()).rms(), forward.rms());
    assert_eq!((-forward.clone()).maximum(), -forward.minimum());

    for id in [r1, c1] {
        let there = results.get_current(id, false).unwrap();
        let back = results.get_current(id, true).unwrap();
        assert_eq!(back, -there);
    }
}

#[test]
fn every_terminal_lands_on_exactly_one_node() {
    let mut s = Schematic::new();
    s.add_dc_voltage_source("V1", p(0, 4), p(0, 0), 1.0);
    s.add_resistor("R1", p(0, 4), p(2, 4), 1e3);
    s.add_resistor("R2", p(3, 4), p(3, 0), 1e3);
    s.add_op_amp("OP1", p(3, 4), p(5, 2), p(5, 2), OpAmpParams::ua741());
    s.add_resistor("RL", p(5, 2), p(5, 0), 10e3);
    s.add_wire(p(2, 4), p(3, 4));
    s.add_polyline(vec![p(0, 0), p(3, 0), p(5, 0)]);
    s.add_wire(p(3, 0), p(0, 0));
    s.add_ground("GND1", p(0, 0));

    let nodes = NodeMap::generate(&s);
    let terminals: usize = s.components.iter().map(|c| c.terminals().len()).sum();
    assert_eq!(nodes.terminal_count(), terminals);
    assert_eq!(nodes.len(), 3);

    let mut seen = std::collections::HashSet::new();
    for node in nodes.nodes().iter().chain(nodes.reference()) {
        for t in &node.terminals {
            assert!(seen.insert(*t), "terminal {} on two nodes", t);
        }
    }
    assert_eq!(seen.len(), terminals);
}

#[test]
fn iteration_cap_is_reported() {
    let mut s = Schematic::new();
    s.add_dc_voltage_source("V1", p(0, 4), p(0, 0), 20.0);
    s.add_op_amp("OP1", p(0, 4), p(4, 4), p(4, 4), OpAmpParams::ideal());
    s.add_resistor("RL", p(4, 4), p(0, 0), 1e3);
    s.add_ground("GND1", p(0, 0));

    let config = SimulatorConfig::new().with_max_iterations(1);
    assert!(matches!(
        Simulator::new(config).simulate(s),
        Err(SimulationError::OscillatingOperatingPoint { iterations: 1 })
    ));
}

#[test]
fn saturated_output_is_stiff_under_ac() {
    let mut s = Schematic::new();
    s.add_dc_voltage_source("V1", p(0, 4), p(0, 0), 20.0);
    s.add_ac_voltage_source("V2", p(0, 6), p(0, 4), 1.0, 1e3);
    let op = s.add_op_amp("OP1", p(0, 6), p(4, 4), p(4, 4), OpAmpParams::ideal());
    s.add_resistor("RL", p(4, 4), p(0, 0), 1e3);
    s.add_ground("GND1", p(0, 0));

    let sim = Simulator::default().simulate(s).unwrap();
    assert_eq!(sim.op_amp_mode(op), Some(OpAmpMode::PositiveSaturation));

    let input = sim.nodes().node_at(p(0, 6)).unwrap();
    let out = sim.nodes().node_at(p(4, 4)).unwrap();
    let input_signal = sim.node_signal(input).unwrap();
    let (_, input_phasor) = input_signal.phasors().next().unwrap();
    assert_relative_eq!(input_phasor.re, 1.0, epsilon = 1e-9);

    let output = sim.node_signal(out).unwrap();
    let (_, out_phasor) = output.phasors().next().unwrap();
    assert!(out_phasor.norm() < 1e-12);
    assert_relative_eq!(output.dc(), 15.0, epsilon = 1e-9);
    assert_relative_eq!(output.maximum(), 15.0, epsilon = 1e-9);

    // the rail is a source of its own and carries the whole DC output
    let rail = sim.source_states().iter().find(|(source, _)| is_saturation(source));
    let (_, rail_state) = rail.unwrap();
    assert_relative_eq!(rail_state.potential(out).re, 15.0, epsilon = 1e-9);
}

#[test]
fn dc_and_ac_sources_superpose() {
    let mut s = Schematic::new();
    s.add_dc_voltage_source("V1", p(0, 4), p(0, 0), 10.0);
    s.add_ac_voltage_source("V2", p(4, 4), p(4, 0), 4.0, 1e3);
    s.add_ac_voltage_source("V3", p(6, 4), p(6, 0), 2.0, 1e3);
    s.add_resistor("R1", p(0, 4), p(2, 2), 1e3);
    s.add_resistor("R2", p(4, 4), p(2, 2), 1e3);
    s.add_resistor("R3", p(6, 4), p(2, 2), 1e3);
    s.add_wire(p(0, 0), p(4, 0));
    s.add_wire(p(4, 0), p(6, 0));
    s.add_ground("GND1", p(0, 0));

    let sim = Simulator::default().simulate(s).unwrap();
    let mid = sim.nodes().node_at(p(2, 2)).unwrap();
    let signal = sim.node_signal(mid).unwrap();

    // equal resistors to one node: the node sits at the mean of the sources
    assert_relative_eq!(signal.dc(), 10.0 / 3.0, epsilon = 1e-9);
    assert_eq!(signal.phasor_count(), 2);
    assert_relative_eq!(signal.maximum(), 16.0 / 3.0, epsilon = 1e-9);

    let per_frequency = sim.frequency_states();
    let at_1k = per_frequency.get(&Frequency::new(1e3)).unwrap();
    assert_relative_eq!(at_1k.potential(mid).re, 2.0, epsilon = 1e-9);

    assert_relative_eq!(sim.instantaneous_state(0.0).potential(mid), 16.0 / 3.0, epsilon = 1e-9);
    assert_relative_eq!(sim.instantaneous_state(0.5e-3).potential(mid), 4.0 / 3.0, epsilon = 1e-9);
}
