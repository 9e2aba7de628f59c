use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use vfrom_rs::discretization::Mesh;
use vfrom_rs::discretization::generator::create_flat_mesh;
use vfrom_rs::fields::{FieldSet, ScalarField};
use vfrom_rs::numerics::{GalerkinProjector, RandomSampler, h1_seminorm, mass_matrix, stencil};

fn mesh_sizes() -> Vec<usize> {
    vec![32, 128]
}

const NUM_MODES: usize = 8;

fn sine_modes(mesh: &Mesh, n: usize) -> FieldSet<f64> {
    (1..=n)
        .map(|k| {
            ScalarField::from_fn(format!("phi{k}"), mesh, |_, c| {
                (k as f64 * std::f64::consts::PI * c.x).sin() * (std::f64::consts::PI * c.y).sin()
            })
        })
        .collect()
}

fn random_snapshots(mesh: &Mesh, modes: &FieldSet<f64>, n: usize) -> FieldSet<f64> {
    let weights = RandomSampler::seeded(7)
        .uniform(n, modes.len(), -1.0, 1.0)
        .unwrap();
    weights
        .row_iter()
        .enumerate()
        .map(|(i, w)| {
            ScalarField::from_fn(format!("s{i}"), mesh, |c, _| {
                modes.iter().zip(w.iter()).map(|(m, wk)| wk * m.value(c)).sum()
            })
        })
        .collect()
}

fn bench_mass_matrix(c: &mut Criterion) {
    let mut group = c.benchmark_group("mass_matrix");
    for &size in &mesh_sizes() {
        let mesh = create_flat_mesh([1.0, 1.0], size, size, 0.1);
        let modes = sine_modes(&mesh, NUM_MODES);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &_| {
            b.iter(|| {
                let m = mass_matrix(std::hint::black_box(&modes), &mesh).unwrap();
                std::hint::black_box(m);
            });
        });
    }
    group.finish();
}

fn bench_galerkin_projection(c: &mut Criterion) {
    let mut group = c.benchmark_group("galerkin_projection");
    for &size in &mesh_sizes() {
        let mesh = create_flat_mesh([1.0, 1.0], size, size, 0.1);
        let modes = sine_modes(&mesh, NUM_MODES);
        let snapshots = random_snapshots(&mesh, &modes, 50);
        let projector = GalerkinProjector::new(&modes, &mesh).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &_| {
            b.iter(|| {
                let coeffs = projector.coefficients(std::hint::black_box(&snapshots)).unwrap();
                std::hint::black_box(coeffs);
            });
        });
    }
    group.finish();
}

fn bench_h1_seminorm(c: &mut Criterion) {
    let mut group = c.benchmark_group("h1_seminorm");
    for &size in &mesh_sizes() {
        let mesh = create_flat_mesh([1.0, 1.0], size, size, 0.1);
        let modes = sine_modes(&mesh, 1);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &_| {
            b.iter(|| {
                let h1 = h1_seminorm(std::hint::black_box(&modes[0]), &mesh).unwrap();
                std::hint::black_box(h1);
            });
        });
    }
    group.finish();
}

fn bench_stencil(c: &mut Criterion) {
    let mut group = c.benchmark_group("stencil");
    let mesh = create_flat_mesh([1.0, 1.0], 128, 128, 0.1);
    let centre = 64 * 128 + 64;
    for layers in [2, 8, 32] {
        group.bench_with_input(BenchmarkId::from_parameter(layers), &layers, |b, &layers| {
            b.iter(|| {
                let cells = stencil(&mesh, std::hint::black_box(centre), layers).unwrap();
                std::hint::black_box(cells.len());
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_mass_matrix,
    bench_galerkin_projection,
    bench_h1_seminorm,
    bench_stencil
);
criterion_main!(benches);
