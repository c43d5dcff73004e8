use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use qdbg_core::{Circuit, ParameterizedGate};
use qdbg_state::{evolve, DenseState};

fn layered_ansatz(num_qubits: usize, layers: usize) -> Circuit {
    let mut circuit = Circuit::new(num_qubits);
    for layer in 0..layers {
        for q in 0..num_qubits {
            let theta = 0.1 * (layer * num_qubits + q) as f64;
            let _ = circuit.add(ParameterizedGate::ry(q, theta).unwrap());
        }
        for q in 0..num_qubits - 1 {
            let _ = circuit.cnot(q, q + 1);
        }
    }
    circuit
}

fn bench_evolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("evolve");

    for num_qubits in [4, 8, 12, 16] {
        let circuit = layered_ansatz(num_qubits, 4);
        group.bench_with_input(
            BenchmarkId::from_parameter(num_qubits),
            &circuit,
            |b, circuit| {
                b.iter(|| {
                    let mut state = DenseState::new(num_qubits).unwrap();
                    evolve(black_box(circuit), &mut state).unwrap();
                    state
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_evolution);
criterion_main!(benches);
