use log::debug;
use ndarray::Array3;

use crate::{Error, Matrix3, Vector3D};
use super::SimulationBox;

/// Maximal number of cells, we need to use this to prevent having too many
/// cells with a small cell width and a large box
const MAX_NUMBER_OF_CELLS: f64 = 1e5;

/// The cell list is used to sort atoms inside bins/cells.
///
/// The grid is laid out along the cell vectors of the simulation box, so each
/// cell is a small copy of the box. Atoms are identified by their index in
/// the positions slice given to [`CellList::add_atoms`], the cell list never
/// stores the positions themselves.
///
/// For an infinite box, the grid is made of cubic cells aligned with the
/// Cartesian axes, covering the bounding box of the atoms (see
/// [`CellList::fit`]).
#[derive(Debug, Clone)]
pub struct CellList<'a> {
    /// The simulation box defining the grid and periodic boundary conditions
    simulation_box: &'a SimulationBox,
    /// Inverse of the box matrix, `None` for infinite boxes
    inverse: Option<Matrix3>,
    /// Target width of the cells
    cell_width: f64,
    /// Periodic boundary conditions along each cell vector
    periodicity: [bool; 3],
    /// Lowest corner of the grid, only used for infinite boxes
    origin: Vector3D,
    /// Size of the cells along each axis, only used for infinite boxes
    cell_size: Vector3D,
    /// The cells themselves
    cells: Array3<Vec<usize>>,
    /// Number of atoms currently in the cells
    n_atoms: usize,
}

impl<'a> CellList<'a> {
    /// Create a new `CellList` for the given simulation box, with cells
    /// close to `cell_width` wide. The number of cells along each axis is
    /// rounded up, so cells are never wider than `cell_width` unless the box
    /// itself is smaller, or the total number of cells is too large.
    ///
    /// A `cell_width` of zero means picking a width which gives around ten
    /// cells along each axis of a periodic box.
    pub fn new(simulation_box: &'a SimulationBox, cell_width: f64) -> Result<CellList<'a>, Error> {
        if !cell_width.is_finite() || cell_width < 0.0 {
            return Err(Error::Domain(format!(
                "cell width must be a positive number, got {}", cell_width
            )));
        }

        if simulation_box.is_free() {
            if cell_width == 0.0 {
                return Err(Error::Domain(
                    "can not estimate the cell width for an infinite box".into()
                ));
            }

            return Ok(CellList {
                simulation_box: simulation_box,
                inverse: None,
                cell_width: cell_width,
                periodicity: [false, false, false],
                origin: Vector3D::zero(),
                cell_size: Vector3D::new(cell_width, cell_width, cell_width),
                cells: Array3::from_elem([1, 1, 1], Vec::new()),
                n_atoms: 0,
            });
        }

        let cell_width = if cell_width == 0.0 {
            f64::cbrt(simulation_box.volume() / 1000.0)
        } else {
            cell_width
        };

        let distances_between_faces = simulation_box.distances_between_faces();
        let shape = grid_shape(distances_between_faces, cell_width);
        debug!(
            "using a {}x{}x{} cell list with cells of width {} for a box with faces at {:?}",
            shape[0], shape[1], shape[2], cell_width, distances_between_faces
        );

        return Ok(CellList {
            simulation_box: simulation_box,
            inverse: Some(simulation_box.matrix().inverse()),
            cell_width: cell_width,
            periodicity: [true, true, true],
            origin: Vector3D::zero(),
            cell_size: Vector3D::zero(),
            cells: Array3::from_elem(shape, Vec::new()),
            n_atoms: 0,
        });
    }

    /// Get the simulation box used by this cell list
    pub fn simulation_box(&self) -> &'a SimulationBox {
        self.simulation_box
    }

    /// Get the target width of the cells
    pub fn cell_width(&self) -> f64 {
        self.cell_width
    }

    /// Get the number of cells along each axis
    pub fn shape(&self) -> [usize; 3] {
        let shape = self.cells.shape();
        return [shape[0], shape[1], shape[2]];
    }

    /// Get the total number of cells
    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    /// Get the volume of a single cell
    pub fn cell_volume(&self) -> f64 {
        if self.inverse.is_some() {
            self.simulation_box.volume() / self.n_cells() as f64
        } else {
            self.cell_size[0] * self.cell_size[1] * self.cell_size[2]
        }
    }

    /// Get the number of atoms currently stored in this cell list
    pub fn n_atoms(&self) -> usize {
        self.n_atoms
    }

    /// Get the periodic boundary conditions along each cell vector
    pub fn periodicity(&self) -> [bool; 3] {
        self.periodicity
    }

    /// Enable or disable periodic boundary conditions along each cell vector.
    /// Atoms are not moved between cells, call [`CellList::reset`] and add
    /// them again after changing the periodicity.
    pub fn set_periodicity(&mut self, periodicity: [bool; 3]) -> Result<(), Error> {
        if self.inverse.is_none() && periodicity.iter().any(|&periodic| periodic) {
            return Err(Error::Domain(
                "an infinite box can not have periodic boundary conditions".into()
            ));
        }
        self.periodicity = periodicity;
        Ok(())
    }

    /// Remove all atoms from the cells, keeping the current shape
    pub fn reset(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
        self.n_atoms = 0;
    }

    /// Remove all atoms and change the number of cells along each axis to
    /// `shape`
    pub fn reset_to(&mut self, shape: [usize; 3]) -> Result<(), Error> {
        if shape.iter().any(|&n| n == 0) {
            return Err(Error::Domain(format!(
                "cell list shape must be at least 1 along each axis, got {:?}", shape
            )));
        }

        self.cells = Array3::from_elem(shape, Vec::new());
        self.n_atoms = 0;
        Ok(())
    }

    /// Resize the grid of an infinite box to cover the bounding box of all
    /// `positions`, and remove all atoms from the cells.
    ///
    /// Periodic boxes have a fixed grid, and this only removes the atoms.
    pub fn fit(&mut self, positions: &[Vector3D]) {
        if self.inverse.is_some() || positions.is_empty() {
            self.reset();
            return;
        }

        let mut min = positions[0];
        let mut max = positions[0];
        for position in positions {
            for i in 0..3 {
                min[i] = f64::min(min[i], position[i]);
                max[i] = f64::max(max[i], position[i]);
            }
        }

        let extent = max - min;
        let shape = grid_shape(extent, self.cell_width);
        for i in 0..3 {
            self.cell_size[i] = f64::max(self.cell_width, extent[i] / shape[i] as f64);
        }
        self.origin = min;

        debug!(
            "using a {}x{}x{} cell list with cells of size {:?} for an infinite box",
            shape[0], shape[1], shape[2], self.cell_size
        );

        if self.shape() == shape {
            self.reset();
        } else {
            self.cells = Array3::from_elem(shape, Vec::new());
            self.n_atoms = 0;
        }
    }

    /// Get the index of the cell containing the given `position`.
    ///
    /// Along periodic axes the position is wrapped inside the box, along
    /// other axes positions outside of the grid are assigned to the closest
    /// cell.
    pub fn cell_index(&self, position: Vector3D) -> [usize; 3] {
        let shape = self.shape();
        let mut index = [0; 3];

        match self.inverse {
            None => {
                for i in 0..3 {
                    let scaled = (position[i] - self.origin[i]) / self.cell_size[i];
                    index[i] = clamp_index(scaled, shape[i]);
                }
            }
            Some(inverse) => {
                let fractional = inverse * position;
                for i in 0..3 {
                    let fractional = if self.periodicity[i] {
                        fractional[i] - f64::floor(fractional[i])
                    } else {
                        // wrapped positions are in [-0.5, 0.5]
                        fractional[i] + 0.5
                    };
                    index[i] = clamp_index(fractional * shape[i] as f64, shape[i]);
                }
            }
        }

        return index;
    }

    /// Add a single atom to the cell list at the given `position`. The atom is
    /// uniquely identified by its `index`.
    ///
    /// Positions should be wrapped inside the simulation box before being
    /// added, see [`SimulationBox::wrap`].
    pub fn add_atom(&mut self, index: usize, position: Vector3D) {
        let cell = self.cell_index(position);
        self.cells[cell].push(index);
        self.n_atoms += 1;
    }

    /// Add all atoms in `positions` to the cell list, using their index in the
    /// slice to identify them.
    pub fn add_atoms(&mut self, positions: &[Vector3D]) {
        for (index, &position) in positions.iter().enumerate() {
            self.add_atom(index, position);
        }
    }

    /// Get the atoms in the cell at index `(x, y, z)`
    pub fn cell(&self, x: usize, y: usize, z: usize) -> &[usize] {
        &self.cells[[x, y, z]]
    }

    /// Iterate over all cells, together with their index
    pub fn iter(&self) -> impl Iterator<Item = ([usize; 3], &[usize])> + '_ {
        self.cells.indexed_iter().map(|((x, y, z), cell)| ([x, y, z], cell.as_slice()))
    }

    /// Get the indexes of all the cells next to (and including) the cell at
    /// `index`. Each cell is only included once, even when the grid is too
    /// small for the 3x3x3 block around `index` to be made of distinct cells.
    pub fn neighboring_cells(&self, index: [usize; 3]) -> Vec<[usize; 3]> {
        let shape = self.shape();
        let neighbors_x = axis_neighbors(index[0], shape[0], self.periodicity[0]);
        let neighbors_y = axis_neighbors(index[1], shape[1], self.periodicity[1]);
        let neighbors_z = axis_neighbors(index[2], shape[2], self.periodicity[2]);

        let mut cells = Vec::with_capacity(27);
        for &x in &neighbors_x {
            for &y in &neighbors_y {
                for &z in &neighbors_z {
                    cells.push([x, y, z]);
                }
            }
        }
        return cells;
    }

    /// Get all the atoms in the cells next to (and including) the cell at
    /// index `(x, y, z)`, see [`CellList::neighboring_cells`].
    pub fn vicinity(&self, x: usize, y: usize, z: usize) -> Vec<usize> {
        let mut atoms = Vec::new();
        for cell in self.neighboring_cells([x, y, z]) {
            atoms.extend_from_slice(&self.cells[cell]);
        }
        return atoms;
    }
}

/// Number of cells along each axis required to cover `extent` with cells at
/// least `cell_width` wide, limited to a total of `MAX_NUMBER_OF_CELLS`
fn grid_shape(extent: Vector3D, cell_width: f64) -> [usize; 3] {
    let mut n_cells = [
        f64::max(1.0, f64::ceil(extent[0] / cell_width)),
        f64::max(1.0, f64::ceil(extent[1] / cell_width)),
        f64::max(1.0, f64::ceil(extent[2] / cell_width)),
    ];

    // limit memory consumption by ensuring we have less than
    // `MAX_NUMBER_OF_CELLS` cells to look though
    let n_cells_total = n_cells[0] * n_cells[1] * n_cells[2];
    if n_cells_total > MAX_NUMBER_OF_CELLS {
        // set the total number of cells close to MAX_NUMBER_OF_CELLS, while
        // keeping roughly the ratio of cells in each direction
        let ratio_x_y = n_cells[0] / n_cells[1];
        let ratio_y_z = n_cells[1] / n_cells[2];

        n_cells[2] = f64::max(1.0, f64::trunc(f64::cbrt(MAX_NUMBER_OF_CELLS / (ratio_x_y * ratio_y_z * ratio_y_z))));
        n_cells[1] = f64::max(1.0, f64::trunc(ratio_y_z * n_cells[2]));
        n_cells[0] = f64::max(1.0, f64::trunc(ratio_x_y * n_cells[1]));
    }

    return [n_cells[0] as usize, n_cells[1] as usize, n_cells[2] as usize];
}

/// Convert a position in units of cells to the index of a cell, clamping to
/// `[0, n_cells)`
fn clamp_index(scaled: f64, n_cells: usize) -> usize {
    // NaN and negative values are converted to 0
    let index = f64::floor(scaled) as usize;
    return usize::min(index, n_cells - 1);
}

/// Get the distinct indexes of cells at distance 1 or less of `index` along
/// one axis
fn axis_neighbors(index: usize, n_cells: usize, periodic: bool) -> Vec<usize> {
    let mut neighbors = Vec::with_capacity(3);
    let candidates = [index as isize - 1, index as isize, index as isize + 1];
    for candidate in candidates {
        let candidate = if periodic {
            candidate.rem_euclid(n_cells as isize)
        } else if candidate < 0 || candidate >= n_cells as isize {
            continue;
        } else {
            candidate
        };

        let candidate = candidate as usize;
        if !neighbors.contains(&candidate) {
            neighbors.push(candidate);
        }
    }
    return neighbors;
}
