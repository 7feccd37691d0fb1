use molspace::{SimulationBox, Vector3D};

use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn wrap(c: &mut Criterion) {
    let mut group = c.benchmark_group("wrap (per position)");
    group.noise_threshold(0.05);

    let positions = (0..1000)
        .map(|i| {
            let i = i as f64;
            Vector3D::new(37.0 * f64::sin(i), 23.0 * f64::cos(1.3 * i), 0.07 * i - 35.0)
        })
        .collect::<Vec<_>>();

    let boxes = [
        ("free", SimulationBox::free()),
        ("orthogonal", SimulationBox::from_lengths(Vector3D::new(10.0, 11.0, 12.0)).unwrap()),
        ("triclinic", SimulationBox::from_lengths_angles(
            Vector3D::new(10.0, 11.0, 12.0),
            Vector3D::new(90.0, 80.0, 120.0),
        ).unwrap()),
    ];

    for (name, simulation_box) in &boxes {
        group.bench_function(format!("{} box - wrap", name), |b| b.iter_custom(|repeat| {
            let start = std::time::Instant::now();
            for _ in 0..repeat {
                for &position in &positions {
                    black_box(simulation_box.wrap(black_box(position)));
                }
            }
            start.elapsed() / positions.len() as u32
        }));

        group.bench_function(format!("{} box - wrap_positions", name), |b| b.iter_custom(|repeat| {
            let mut copy = positions.clone();
            let start = std::time::Instant::now();
            for _ in 0..repeat {
                copy.copy_from_slice(&positions);
                simulation_box.wrap_positions(black_box(&mut copy));
            }
            start.elapsed() / positions.len() as u32
        }));
    }
}

criterion_group!(all, wrap);
criterion_main!(all);
