use crate::Error;

use super::{NeighborList, SimulationBox, System, Vector3D};

/// A simple implementation of `System` to use when no other is available
#[derive(Clone, Debug)]
pub struct SimpleSystem {
    pub(crate) simulation_box: SimulationBox,
    pub(crate) types: Vec<i32>,
    pub(crate) positions: Vec<Vector3D>,
}

impl SimpleSystem {
    /// Create a new empty system with the given simulation box
    pub fn new(simulation_box: SimulationBox) -> SimpleSystem {
        SimpleSystem {
            simulation_box: simulation_box,
            types: Vec::new(),
            positions: Vec::new(),
        }
    }

    /// Add an atom with the given atomic type and position to this system
    pub fn add_atom(&mut self, atomic_type: i32, position: Vector3D) {
        self.types.push(atomic_type);
        self.positions.push(position);
    }

    /// Get the atomic types for all atoms in this system. Different atomic
    /// types are identified with different integer values, usually the atomic
    /// number.
    pub fn types(&self) -> &[i32] {
        &self.types
    }

    /// Get mutable access to the positions of all atoms in this system
    pub fn positions_mut(&mut self) -> &mut [Vector3D] {
        &mut self.positions
    }

    /// Replace the simulation box of this system. Positions are left as-is.
    pub fn set_simulation_box(&mut self, simulation_box: SimulationBox) {
        self.simulation_box = simulation_box;
    }

    /// Wrap all positions inside the simulation box
    pub fn wrap(&mut self) {
        self.simulation_box.wrap_positions(&mut self.positions);
    }

    /// Build a neighbor list for the atoms of this system, using the given
    /// `cutoff` radius
    pub fn compute_neighbors(&self, cutoff: f64) -> Result<NeighborList<'_>, Error> {
        let mut neighbors = NeighborList::new(&self.simulation_box, cutoff)?;
        neighbors.build(&self.positions);
        return Ok(neighbors);
    }
}

impl System for SimpleSystem {
    fn simulation_box(&self) -> &SimulationBox {
        &self.simulation_box
    }

    fn size(&self) -> usize {
        self.types.len()
    }

    fn positions(&self) -> &[Vector3D] {
        &self.positions
    }
}

impl From<&dyn System> for SimpleSystem {
    fn from(system: &dyn System) -> SimpleSystem {
        let mut new = SimpleSystem::new(*system.simulation_box());
        for &position in system.positions() {
            new.add_atom(0, position);
        }
        return new;
    }
}
