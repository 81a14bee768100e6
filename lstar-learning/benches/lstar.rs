use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lstar_core::prelude::*;
use lstar_learning::prelude::*;

/// Counts modulo `n` the number of occurrences of the first symbol, accepting on zero.
fn counter(n: usize) -> Dfa<char> {
    let transitions = (0..n).flat_map(|q| [(q, 'a', (q + 1) % n), (q, 'b', q)]);
    let accepting = (0..n).map(|q| q == 0).collect();
    Dfa::from_parts(Alphabet::of_size(2), accepting, transitions, 0).unwrap()
}

/// Moves from `s` to `(s + i) mod n` on input `i` and emits `s + i`.
fn modular(n: u32) -> MealyMachine<u32, u32> {
    let alphabet = Alphabet::new((1..=4).collect()).unwrap();
    let transitions = (0..n).flat_map(|s| (1..=4).map(move |i| (s as usize, i, s + i, ((s + i) % n) as usize)));
    MealyMachine::from_parts(alphabet, n as usize, transitions, 0).unwrap()
}

fn learn_dfas(c: &mut Criterion) {
    let mut group = c.benchmark_group("dfa");
    for n in [4, 8, 16] {
        let target = counter(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &target, |b, target| {
            b.iter(|| {
                let learned: Dfa<char> = lstar(
                    Alphabet::of_size(2),
                    SimulatorOracle::new(target.clone()),
                    SimulatorEquivalenceOracle::new(target.clone()),
                )
                .unwrap();
                black_box(learned)
            })
        });
    }
    group.finish();
}

fn learn_mealy_machines(c: &mut Criterion) {
    let mut group = c.benchmark_group("mealy");
    for n in [4, 8] {
        let target = modular(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &target, |b, target| {
            b.iter(|| {
                let learned: MealyMachine<u32, u32> = lstar(
                    target.alphabet().clone(),
                    CachedOracle::new(SimulatorOracle::new(target.clone())),
                    WMethodOracle::new(SimulatorOracle::new(target.clone()), 1),
                )
                .unwrap();
                black_box(learned)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, learn_dfas, learn_mealy_machines);
criterion_main!(benches);
