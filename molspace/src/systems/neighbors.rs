use std::cell::RefCell;

use log::warn;
use rayon::prelude::*;
use thread_local::ThreadLocal;

use crate::{BoxStyle, Error, Matrix3, Vector3D};
use super::{CellList, SimulationBox};
use super::simulation_box::{images_within, shortest_image};

/// Parameters of a [`NeighborList`], which can be loaded from JSON
#[derive(Debug, Clone, Copy, PartialEq)]
#[derive(serde::Deserialize, serde::Serialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct NeighborListParameters {
    /// Spherical cutoff radius. Two atoms are neighbors if they are closer
    /// than this.
    pub cutoff: f64,
    /// Use periodic boundary conditions along each of the cell vectors. The
    /// default is to use periodic boundary conditions everywhere, unless the
    /// box is infinite.
    #[serde(default)]
    pub periodic: Option<[bool; 3]>,
    /// Search for neighbors of different atoms in parallel
    #[serde(default)]
    pub parallel: bool,
}

/// A pair of neighboring atoms
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pair {
    /// index of the first atom in the pair
    pub first: usize,
    /// index of the second atom in the pair
    pub second: usize,
    /// distance between the two atoms, accounting for periodic boundary
    /// conditions
    pub distance: f64,
}

/// A neighbor list, storing for each atom all other atoms closer than a
/// cutoff radius.
///
/// The list uses a [`CellList`] with cells twice as wide as the cutoff, so
/// that only the 27 cells around an atom need to be searched. Distances use
/// the minimum image convention along periodic axes.
#[derive(Debug)]
pub struct NeighborList<'a> {
    /// Spherical cutoff radius
    cutoff: f64,
    /// Should we search for neighbors in parallel?
    parallel: bool,
    /// Cell list used to find candidate neighbors
    cell_list: CellList<'a>,
    /// Neighbors of all atoms, sorted by index
    neighbors: Vec<Vec<usize>>,
    /// Distances to the neighbors of all atoms, in the same order as
    /// `neighbors`
    distances: Vec<Vec<f64>>,
    /// Did we run `build` or `update` at least once?
    built: bool,
    /// Per-thread scratch memory for candidate neighbors
    candidates: ThreadLocal<RefCell<Vec<(usize, f64)>>>,
}

impl<'a> NeighborList<'a> {
    /// Create a new empty `NeighborList` for atoms in the given simulation
    /// box, using the given `cutoff` radius.
    pub fn new(simulation_box: &'a SimulationBox, cutoff: f64) -> Result<NeighborList<'a>, Error> {
        if !(cutoff > 0.0) || !cutoff.is_finite() {
            return Err(Error::NotFound("cutoff radius must be positive".into()));
        }

        let cell_list = CellList::new(simulation_box, 2.0 * cutoff)?;
        return Ok(NeighborList {
            cutoff: cutoff,
            parallel: false,
            cell_list: cell_list,
            neighbors: Vec::new(),
            distances: Vec::new(),
            built: false,
            candidates: ThreadLocal::new(),
        });
    }

    /// Create a new empty `NeighborList` using the given `parameters`
    pub fn from_parameters(
        simulation_box: &'a SimulationBox,
        parameters: NeighborListParameters,
    ) -> Result<NeighborList<'a>, Error> {
        let mut neighbors = NeighborList::new(simulation_box, parameters.cutoff)?;
        if let Some(periodic) = parameters.periodic {
            neighbors.cell_list.set_periodicity(periodic)?;
        }
        neighbors.parallel = parameters.parallel;
        return Ok(neighbors);
    }

    /// Create a new empty `NeighborList` using parameters given as JSON, see
    /// [`NeighborListParameters`] for the corresponding fields.
    pub fn from_json(simulation_box: &'a SimulationBox, parameters: &str) -> Result<NeighborList<'a>, Error> {
        let parameters = serde_json::from_str::<NeighborListParameters>(parameters)?;
        return NeighborList::from_parameters(simulation_box, parameters);
    }

    /// Get the parameters used to create this neighbor list, as JSON
    pub fn parameters(&self) -> String {
        let parameters = NeighborListParameters {
            cutoff: self.cutoff,
            periodic: Some(self.cell_list.periodicity()),
            parallel: self.parallel,
        };
        serde_json::to_string(&parameters).expect("failed to serialize to JSON")
    }

    /// Get the cutoff radius of this neighbor list
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Is the neighbor search running in parallel?
    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Enable or disable the parallel neighbor search
    pub fn set_parallel(&mut self, parallel: bool) {
        self.parallel = parallel;
    }

    /// Get the cell list used by this neighbor list
    pub fn cell_list(&self) -> &CellList<'a> {
        &self.cell_list
    }

    /// Did we already build this neighbor list?
    pub fn is_built(&self) -> bool {
        self.built
    }

    /// Get the number of atoms in this neighbor list
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    /// Is this neighbor list empty, i.e. not built or built without atoms?
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Build the neighbor list for the given `positions`, pre-allocating
    /// memory for the expected number of neighbors of each atom.
    #[time_graph::instrument(name = "NeighborList::build")]
    pub fn build(&mut self, positions: &[Vector3D]) {
        self.cell_list.fit(positions);

        let n_atoms = positions.len();
        let n_cells = self.cell_list.n_cells() as f64;
        let density = (n_atoms as f64 / n_cells) / self.cell_list.cell_volume();
        let sphere_volume = 4.0 / 3.0 * std::f64::consts::PI * self.cutoff.powi(3);
        let expected = f64::ceil(density * sphere_volume);
        let capacity = if expected.is_finite() {
            usize::min(expected as usize, n_atoms)
        } else {
            n_atoms
        };

        self.neighbors = (0..n_atoms).map(|_| Vec::with_capacity(capacity)).collect();
        self.distances = (0..n_atoms).map(|_| Vec::with_capacity(capacity)).collect();

        self.update(positions);
    }

    /// Update the neighbor list with new `positions`. All previously found
    /// neighbors are replaced.
    #[time_graph::instrument(name = "NeighborList::update")]
    pub fn update(&mut self, positions: &[Vector3D]) {
        self.neighbors.resize_with(positions.len(), Vec::new);
        self.distances.resize_with(positions.len(), Vec::new);

        self.cell_list.fit(positions);
        self.cell_list.add_atoms(positions);

        let search = NeighborSearch::new(&self.cell_list, positions, self.cutoff);
        let candidates = &self.candidates;
        if self.parallel {
            self.neighbors.par_iter_mut()
                .zip(self.distances.par_iter_mut())
                .enumerate()
                .for_each(|(center, (neighbors, distances))| {
                    let mut candidates = candidates.get_or(|| RefCell::new(Vec::new())).borrow_mut();
                    search.run(center, &mut candidates, neighbors, distances);
                });
        } else {
            let mut candidates = candidates.get_or(|| RefCell::new(Vec::new())).borrow_mut();
            let all_neighbors = self.neighbors.iter_mut().zip(self.distances.iter_mut());
            for (center, (neighbors, distances)) in all_neighbors.enumerate() {
                search.run(center, &mut candidates, neighbors, distances);
            }
        }

        self.built = true;
    }

    /// Get the neighbors of the atom at index `atom`, sorted by index
    pub fn neighbors(&self, atom: usize) -> Result<&[usize], Error> {
        self.check_atom(atom)?;
        return Ok(&self.neighbors[atom]);
    }

    /// Get the distances between the atom at index `atom` and its neighbors,
    /// in the same order as [`NeighborList::neighbors`]
    pub fn distances(&self, atom: usize) -> Result<&[f64], Error> {
        self.check_atom(atom)?;
        return Ok(&self.distances[atom]);
    }

    /// Get the list of all pairs of neighbors. Each pair is only included
    /// once, with `first < second`, and the list is sorted.
    pub fn pairs(&self) -> Result<Vec<Pair>, Error> {
        if !self.built {
            return Err(Error::State("the neighbor list has not been built yet".into()));
        }

        let mut pairs = Vec::new();
        for (first, (neighbors, distances)) in self.neighbors.iter().zip(&self.distances).enumerate() {
            for (&second, &distance) in neighbors.iter().zip(distances) {
                if first < second {
                    pairs.push(Pair {
                        first: first,
                        second: second,
                        distance: distance,
                    });
                }
            }
        }

        return Ok(pairs);
    }

    fn check_atom(&self, atom: usize) -> Result<(), Error> {
        if !self.built {
            return Err(Error::State("the neighbor list has not been built yet".into()));
        }

        if atom >= self.neighbors.len() {
            return Err(Error::Domain(format!(
                "atom index {} is out of bounds for a neighbor list with {} atoms",
                atom, self.neighbors.len()
            )));
        }

        Ok(())
    }
}

/// Read-only data used to search the neighbors of a single atom, shared
/// between threads
struct NeighborSearch<'a, 'b> {
    cell_list: &'b CellList<'a>,
    positions: &'b [Vector3D],
    cutoff2: f64,
    /// Cell matrix and its inverse, `None` for infinite boxes
    matrices: Option<(Matrix3, Matrix3)>,
    /// Number of additional periodic images to check along each cell vector
    /// after rounding the fractional coordinates. This is only non-zero for
    /// triclinic boxes with a cutoff larger than half the distance between
    /// some faces.
    images: [i32; 3],
}

impl<'a, 'b> NeighborSearch<'a, 'b> {
    fn new(cell_list: &'b CellList<'a>, positions: &'b [Vector3D], cutoff: f64) -> Self {
        let simulation_box = cell_list.simulation_box();
        let matrices = simulation_box.inverse().ok().map(|inverse| (simulation_box.matrix(), inverse));

        let images = if simulation_box.style() == BoxStyle::Triclinic {
            images_within(simulation_box.distances_between_faces(), cutoff, cell_list.periodicity())
        } else {
            // rounding each coordinate already gives the shortest image
            [0, 0, 0]
        };

        NeighborSearch {
            cell_list: cell_list,
            positions: positions,
            cutoff2: cutoff * cutoff,
            matrices: matrices,
            images: images,
        }
    }

    /// Get the shortest vector between any periodic images of two atoms
    /// separated by `vector`, only using images along periodic axes. Images
    /// further away than the cutoff are not considered.
    fn minimum_image(&self, vector: Vector3D) -> Vector3D {
        let (matrix, inverse) = match self.matrices {
            None => return vector,
            Some(matrices) => matrices,
        };

        let periodicity = self.cell_list.periodicity();
        if periodicity == [true, true, true] {
            let wrapped = self.cell_list.simulation_box().wrap(vector);
            return shortest_image(&matrix, wrapped, self.images);
        }

        let mut fractional = inverse * vector;
        for i in 0..3 {
            if periodicity[i] {
                fractional[i] -= f64::round(fractional[i]);
            }
        }

        return shortest_image(&matrix, matrix * fractional, self.images);
    }

    /// Find all the neighbors of the atom at index `center`, and store them in
    /// `neighbors` and `distances`. `candidates` is scratch memory.
    fn run(
        &self,
        center: usize,
        candidates: &mut Vec<(usize, f64)>,
        neighbors: &mut Vec<usize>,
        distances: &mut Vec<f64>,
    ) {
        candidates.clear();

        let position = self.positions[center];
        let cell = self.cell_list.cell_index(position);
        for [x, y, z] in self.cell_list.neighboring_cells(cell) {
            for &other in self.cell_list.cell(x, y, z) {
                if other == center {
                    continue;
                }

                let vector = self.minimum_image(self.positions[other] - position);
                let distance2 = vector.norm2();
                if distance2 < self.cutoff2 {
                    if distance2 < 1e-3 && center < other {
                        warn!(
                            "atoms {} and {} are very close to one another ({} A)",
                            center, other, distance2.sqrt()
                        );
                    }
                    candidates.push((other, distance2.sqrt()));
                }
            }
        }

        candidates.sort_unstable_by_key(|&(other, _)| other);

        neighbors.clear();
        distances.clear();
        for &(other, distance) in candidates.iter() {
            neighbors.push(other);
            distances.push(distance);
        }
    }
}
