use crate::Vector3D;
use super::{SimpleSystem, SimulationBox};

pub fn test_system(name: &str) -> SimpleSystem {
    match name {
        "methane" => get_methane(),
        "water" => get_water(),
        "CsCl" => get_cscl(),
        "ZnO" => get_zno(),
        _ => panic!("unknown test system {}", name)
    }
}

/// Reference neighbor list, checking all pairs of atoms
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

fn get_methane() -> SimpleSystem {
    let mut system = SimpleSystem::new(SimulationBox::cubic(5.0).unwrap());
    system.add_atom(6, Vector3D::new(5.0000, 5.0000, 5.0000));
    system.add_atom(1, Vector3D::new(5.5288, 5.1610, 5.9359));
    system.add_atom(1, Vector3D::new(5.2051, 5.8240, 4.3214));
    system.add_atom(1, Vector3D::new(5.3345, 4.0686, 4.5504));
    system.add_atom(1, Vector3D::new(3.9315, 4.9463, 5.1921));
    return system;
}

fn get_water() -> SimpleSystem {
    let mut system = SimpleSystem::new(SimulationBox::cubic(10.0).unwrap());
    // types do not have to be atomic number
    system.add_atom(-42, Vector3D::new(0.0, 0.0, 0.0));
    system.add_atom(1, Vector3D::new(0.0, 0.75545, -0.58895));
    system.add_atom(1, Vector3D::new(0.0, -0.75545, -0.58895));
    return system;
}

/// CsCl structure
/// This structure is simple since the primitive unit cell
/// is just the usual cubic cell with side length set to one.
fn get_cscl() -> SimpleSystem {
    let mut system = SimpleSystem::new(SimulationBox::cubic(1.0).unwrap());
    system.add_atom(17, Vector3D::new(0.0, 0.0, 0.0));
    system.add_atom(55, Vector3D::new(0.5, 0.5, 0.5));
    return system;
}

/// ZnO in the wurtzite structure (hexagonal cell)
fn get_zno() -> SimpleSystem {
    let u = 3. / 8.;
    let c = f64::sqrt(1. / u);
    let simulation_box = SimulationBox::from_lengths_angles(
        Vector3D::new(1.0, 1.0, c),
        Vector3D::new(90.0, 90.0, 120.0),
    ).unwrap();

    let mut system = SimpleSystem::new(simulation_box);
    let fractional = [
        (30, Vector3D::new(1. / 3., 2. / 3., 0.0)),
        (8, Vector3D::new(1. / 3., 2. / 3., u)),
        (30, Vector3D::new(2. / 3., 1. / 3., 0.5)),
        (8, Vector3D::new(2. / 3., 1. / 3., 0.5 + u)),
    ];
    for (atomic_type, position) in fractional {
        system.add_atom(atomic_type, simulation_box.cartesian(position));
    }
    return system;
}
