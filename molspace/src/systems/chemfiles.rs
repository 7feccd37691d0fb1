//! Conversions between [`SimulationBox`] and chemfiles' `UnitCell`, to use
//! unit cells read from trajectory files.
#![cfg(feature = "chemfiles")]

use super::SimulationBox;
use crate::{Error, Matrix3};

impl From<chemfiles::Error> for Error {
    fn from(error: chemfiles::Error) -> Error {
        Error::Chemfiles(error.message)
    }
}

impl TryFrom<&chemfiles::UnitCell> for SimulationBox {
    type Error = Error;

    fn try_from(cell: &chemfiles::UnitCell) -> Result<SimulationBox, Error> {
        if cell.shape() == chemfiles::CellShape::Infinite {
            return Ok(SimulationBox::free());
        }

        // chemfiles also stores the cell vectors in the columns of the matrix
        SimulationBox::from_matrix(Matrix3::from(cell.matrix()))
    }
}

impl From<&SimulationBox> for chemfiles::UnitCell {
    fn from(simulation_box: &SimulationBox) -> chemfiles::UnitCell {
        if simulation_box.is_free() {
            return chemfiles::UnitCell::infinite();
        }

        let lengths: [f64; 3] = simulation_box.lengths().into();
        let angles: [f64; 3] = simulation_box.angles().into();
        if angles == [90.0, 90.0, 90.0] {
            chemfiles::UnitCell::new(lengths)
        } else {
            chemfiles::UnitCell::triclinic(lengths, angles)
        }
    }
}

impl From<SimulationBox> for chemfiles::UnitCell {
    fn from(simulation_box: SimulationBox) -> chemfiles::UnitCell {
        chemfiles::UnitCell::from(&simulation_box)
    }
}
