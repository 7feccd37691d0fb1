use crate::Vector3D;

mod simulation_box;
pub use self::simulation_box::SimulationBox;
pub use crate::geometry::BoxStyle;

mod cell_list;
pub use self::cell_list::CellList;

mod neighbors;
pub use self::neighbors::{NeighborList, NeighborListParameters, Pair};

mod simple_system;
pub use self::simple_system::SimpleSystem;

mod chemfiles;

#[cfg(test)]
pub(crate) mod test_utils;

/// A `System` gives access to the atoms of a molecular system and the
/// simulation box containing them.
///
/// Atoms are identified by their index in [`System::positions`].
pub trait System: Send + Sync {
    /// Get the simulation box for this system
    fn simulation_box(&self) -> &SimulationBox;

    /// Get the number of atoms in this system
    fn size(&self) -> usize;

    /// Get the positions for all atoms in this system. The returned value must
    /// be a slice of length `self.size()` containing the Cartesian coordinates
    /// of all atoms in the system.
    fn positions(&self) -> &[Vector3D];
}
