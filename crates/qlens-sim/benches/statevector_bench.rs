//! Benchmarks for gate application and partial traces
//!
//! Run with: cargo bench -p qlens-sim

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qlens_ir::{Circuit, QubitId};
use qlens_sim::{Simulator, StateVector, analyze_all, reduced_density_matrix};

fn entangling_circuit(n: u32) -> Circuit {
    let mut circuit = Circuit::with_size("bench", n, 0);
    for q in 0..n {
        circuit.h(QubitId(q)).unwrap();
        circuit.rz(0.3 * f64::from(q), QubitId(q)).unwrap();
    }
    for q in 0..n.saturating_sub(1) {
        circuit.cx(QubitId(q), QubitId(q + 1)).unwrap();
    }
    circuit
}

fn bench_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("statevector_run");
    let sim = Simulator::new();
    for n in [4u32, 10, 16] {
        let circuit = entangling_circuit(n);
        group.bench_with_input(BenchmarkId::new("entangling", n), &circuit, |b, c| {
            b.iter(|| sim.run(black_box(c)).unwrap());
        });
    }
    group.finish();
}

fn bench_partial_trace(c: &mut Criterion) {
    let mut group = c.benchmark_group("partial_trace");
    for n in [4u32, 10, 16] {
        let state: StateVector = Simulator::new().run(&entangling_circuit(n)).unwrap();
        group.bench_with_input(BenchmarkId::new("single_qubit", n), &state, |b, s| {
            b.iter(|| reduced_density_matrix(black_box(s), &[0]).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("analyze_all", n), &state, |b, s| {
            b.iter(|| analyze_all(black_box(s)).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_run, bench_partial_trace);
criterion_main!(benches);
