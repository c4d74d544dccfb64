//! Pricing and root LP benchmarks.
//!
//! ```bash
//! cargo bench -p cpmp-algo
//! cargo bench -p cpmp-algo -- knapsack
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use cpmp_algo::{
    BranchAndPrice, BranchAndPriceConfig, DynamicProgrammingKnapsack, KnapsackSolver,
};
use cpmp_core::Instance;
use cpmp_io::parse_instance;

/// Location counts for generated instances
const SIZES: &[usize] = &[10, 20, 40];

fn lcg(seed: u64) -> impl FnMut(u64) -> u64 {
    let mut state = seed;
    move |modulo| {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 33) % modulo
    }
}

/// Random planar instance in the text format.
fn generate(n: usize) -> Instance {
    let mut next = lcg(n as u64);
    let p = (n / 5).max(1);
    let points: Vec<(u64, u64)> = (0..n).map(|_| (next(100), next(100))).collect();
    let demands: Vec<u64> = (0..n).map(|_| 1 + next(10)).collect();
    let capacity = demands.iter().sum::<u64>() * 6 / (5 * p as u64);

    let mut text = format!("{n} {p}\n");
    for &(x1, y1) in &points {
        let row: Vec<String> = points
            .iter()
            .map(|&(x2, y2)| (x1.abs_diff(x2) + y1.abs_diff(y2)).to_string())
            .collect();
        text.push_str(&row.join(" "));
        text.push('\n');
    }
    let demand_line: Vec<String> = demands.iter().map(u64::to_string).collect();
    text.push_str(&demand_line.join(" "));
    text.push('\n');
    text.push_str(&vec![capacity.to_string(); n].join(" "));
    text.push('\n');

    parse_instance(&text).unwrap()
}

fn bench_knapsack(c: &mut Criterion) {
    let mut group = c.benchmark_group("knapsack");
    let solver = DynamicProgrammingKnapsack;

    for &n in SIZES {
        let mut next = lcg(17 + n as u64);
        let profits: Vec<u128> = (0..n).map(|_| 1 + next(1_000_000_000) as u128).collect();
        let weights: Vec<u64> = (0..n).map(|_| 1 + next(20)).collect();
        let capacity = weights.iter().sum::<u64>() / 3;

        group.bench_with_input(BenchmarkId::new("dp", n), &n, |b, _| {
            b.iter(|| black_box(solver.solve(&profits, &weights, capacity)))
        });
    }

    group.finish();
}

fn bench_root_lp(c: &mut Criterion) {
    let mut group = c.benchmark_group("root_lp");
    group.sample_size(10);

    for &n in &SIZES[..2] {
        let instance = generate(n);
        group.bench_with_input(BenchmarkId::new("column_generation", n), &instance, |b, inst| {
            b.iter(|| {
                let solution = BranchAndPrice::new(inst, BranchAndPriceConfig::lp_relaxation())
                    .solve()
                    .unwrap();
                black_box(solution.root_lp_bound)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_knapsack, bench_root_lp);
criterion_main!(benches);
