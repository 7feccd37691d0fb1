#![allow(dead_code)]

use molspace::{SimulationBox, Vector3D};

/// Small xorshift generator, to get reproducible pseudo-random positions
pub struct Random(u64);

impl Random {
    pub fn new(seed: u64) -> Random {
        Random(seed.wrapping_mul(0x9E3779B97F4A7C15) | 1)
    }

    /// Get a random number uniformly distributed in `[0, 1)`
    pub fn next_f64(&mut self) -> f64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        return (self.0 >> 11) as f64 / (1u64 << 53) as f64;
    }

    /// Get a vector with all components uniformly distributed in `[min, max)`
    pub fn vector(&mut self, min: f64, max: f64) -> Vector3D {
        Vector3D::new(
            min + (max - min) * self.next_f64(),
            min + (max - min) * self.next_f64(),
            min + (max - min) * self.next_f64(),
        )
    }
}

/// Generate `n_atoms` positions uniformly distributed inside a periodic
/// `simulation_box`, centered on the origin
pub fn positions_in_box(simulation_box: &SimulationBox, n_atoms: usize, seed: u64) -> Vec<Vector3D> {
    let mut random = Random::new(seed);
    return (0..n_atoms)
        .map(|_| simulation_box.cartesian(random.vector(-0.5, 0.5)))
        .collect();
}

/// Generate `n_atoms` positions close to the faces of a periodic
/// `simulation_box`, where most pairs cross the periodic boundaries
pub fn positions_near_faces(simulation_box: &SimulationBox, n_atoms: usize, seed: u64) -> Vec<Vector3D> {
    let mut random = Random::new(seed);
    return (0..n_atoms)
        .map(|i| {
            let mut fractional = random.vector(-0.5, 0.5);
            let axis = i % 3;
            // put the atom in the outermost 10% of the box along one axis
            let depth = 0.1 * random.next_f64();
            fractional[axis] = if random.next_f64() < 0.5 { -0.5 + depth } else { 0.5 - depth };
            simulation_box.cartesian(fractional)
        })
        .collect();
}

/// Reference neighbor list, checking the minimum image distance between all
/// pairs of atoms
pub fn brute_force_neighbors(simulation_box: &SimulationBox, positions: &[Vector3D], cutoff: f64) -> Vec<Vec<usize>> {
    let mut neighbors = vec![Vec::new(); positions.len()];
    for (i, &first) in positions.iter().enumerate() {
        for (j, &second) in positions.iter().enumerate() {
            if i != j && simulation_box.distance2(first, second) < cutoff * cutoff {
                neighbors[i].push(j);
            }
        }
    }
    return neighbors;
}

/// Reference neighbor list using periodic boundary conditions only along
/// some of the cell vectors
pub fn brute_force_neighbors_along(
    simulation_box: &SimulationBox,
    positions: &[Vector3D],
    cutoff: f64,
    periodic: [bool; 3],
) -> Vec<Vec<usize>> {
    let mut neighbors = vec![Vec::new(); positions.len()];
    for (i, &first) in positions.iter().enumerate() {
        for (j, &second) in positions.iter().enumerate() {
            let distance2 = lattice_distance2(simulation_box, second - first, periodic, 3);
            if i != j && distance2 < cutoff * cutoff {
                neighbors[i].push(j);
            }
        }
    }
    return neighbors;
}

/// Reference neighbor list checking explicitly all the periodic images of
/// each atom, up to `max_shift` cells away in each direction
pub fn brute_force_neighbors_images(
    simulation_box: &SimulationBox,
    positions: &[Vector3D],
    cutoff: f64,
    max_shift: i32,
) -> Vec<Vec<usize>> {
    let mut neighbors = vec![Vec::new(); positions.len()];
    for (i, &first) in positions.iter().enumerate() {
        for (j, &second) in positions.iter().enumerate() {
            let distance2 = lattice_distance2(simulation_box, second - first, [true, true, true], max_shift);
            if i != j && distance2 < cutoff * cutoff {
                neighbors[i].push(j);
            }
        }
    }
    return neighbors;
}

/// Smallest squared norm of `vector` translated by up to `max_shift` cell
/// vectors along each periodic direction
pub fn lattice_distance2(simulation_box: &SimulationBox, vector: Vector3D, periodic: [bool; 3], max_shift: i32) -> f64 {
    let matrix = simulation_box.matrix();
    let range = |axis: usize| if periodic[axis] { -max_shift..=max_shift } else { 0..=0 };

    let mut distance2 = f64::INFINITY;
    for i in range(0) {
        for j in range(1) {
            for k in range(2) {
                let shift = matrix * Vector3D::new(i as f64, j as f64, k as f64);
                distance2 = f64::min(distance2, (vector + shift).norm2());
            }
        }
    }
    return distance2;
}
