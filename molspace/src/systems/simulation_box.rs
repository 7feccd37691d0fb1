//! The `SimulationBox` type represents the enclosing box of a simulated
//! system, with some type of periodic boundary conditions.
use crate::{Error, Matrix3, Vector3D};
use crate::geometry::{self, BoxStyle};

/// A `SimulationBox` defines the physical boundaries of a system.
///
/// The box is fully described by its cell matrix, where the columns are the
/// cell vectors `a`, `b` and `c`. Everything else (style, lengths, angles,
/// volume, ...) is computed from the matrix when requested. The matrix is
/// either all zeros (infinite box, see [`BoxStyle::Free`]) or an invertible
/// upper triangular matrix.
#[derive(Debug, Clone, Copy)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(try_from = "BoxData", into = "BoxData")]
pub struct SimulationBox {
    matrix: Matrix3,
}

/// Serialized representation of a `SimulationBox`
#[derive(serde::Serialize, serde::Deserialize)]
struct BoxData {
    matrix: Matrix3,
}

impl TryFrom<BoxData> for SimulationBox {
    type Error = Error;

    fn try_from(data: BoxData) -> Result<SimulationBox, Error> {
        SimulationBox::from_matrix(data.matrix)
    }
}

impl From<SimulationBox> for BoxData {
    fn from(simulation_box: SimulationBox) -> BoxData {
        BoxData { matrix: simulation_box.matrix }
    }
}

impl Default for SimulationBox {
    fn default() -> SimulationBox {
        SimulationBox::free()
    }
}

impl PartialEq for SimulationBox {
    fn eq(&self, other: &SimulationBox) -> bool {
        self.style() == other.style() && geometry::allclose(
            &self.matrix,
            &other.matrix,
            geometry::RELATIVE_TOLERANCE,
            geometry::ABSOLUTE_TOLERANCE,
        )
    }
}

/// Drop the off-diagonal noise left by `cos(90°)` in matrices built from
/// lengths and angles
fn clean_diagonal(matrix: Matrix3) -> Matrix3 {
    if geometry::is_diagonal(&matrix) {
        Matrix3::diagonal(matrix.diag())
    } else {
        matrix
    }
}

impl SimulationBox {
    /// Create an infinite box, without periodic boundary conditions
    pub fn free() -> SimulationBox {
        SimulationBox {
            matrix: Matrix3::zero(),
        }
    }

    /// Create a box from a cell `matrix`, where the columns of the matrix are
    /// the cell vectors.
    ///
    /// The matrix must be all zeros (for an infinite box), or upper
    /// triangular and invertible with a positive determinant.
    pub fn from_matrix(matrix: Matrix3) -> Result<SimulationBox, Error> {
        Ok(SimulationBox {
            matrix: geometry::check_matrix(matrix)?,
        })
    }

    /// Create an orthogonal box with the given `lengths`. If all lengths are
    /// zero, this creates an infinite box instead.
    pub fn from_lengths(lengths: Vector3D) -> Result<SimulationBox, Error> {
        let matrix = geometry::matrix_from_lengths_tilts(lengths, Vector3D::zero())?;
        return SimulationBox::from_matrix(matrix);
    }

    /// Create a cubic box with side `length`
    pub fn cubic(length: f64) -> Result<SimulationBox, Error> {
        SimulationBox::from_lengths(Vector3D::new(length, length, length))
    }

    /// Create a box with the given `lengths` and `angles` (in degrees). The
    /// box will be orthogonal if all angles are 90°, and triclinic otherwise.
    pub fn from_lengths_angles(lengths: Vector3D, angles: Vector3D) -> Result<SimulationBox, Error> {
        let matrix = geometry::matrix_from_lengths_angles(lengths, angles)?;
        return SimulationBox::from_matrix(clean_diagonal(matrix));
    }

    /// Create a box with sizes `lengths` along the three axes, sheared by the
    /// `tilts` factors `(xy, xz, yz)`.
    pub fn from_lengths_tilts(lengths: Vector3D, tilts: Vector3D) -> Result<SimulationBox, Error> {
        let matrix = geometry::matrix_from_lengths_tilts(lengths, tilts)?;
        return SimulationBox::from_matrix(matrix);
    }

    /// Get the style of this box
    pub fn style(&self) -> BoxStyle {
        match geometry::classify(&self.matrix) {
            Ok(style) => style,
            Err(_) => unreachable!("the matrix of a simulation box is always upper triangular"),
        }
    }

    /// Check if this box is infinite, *i.e.* if it does not have periodic
    /// boundary conditions.
    pub fn is_free(&self) -> bool {
        self.style() == BoxStyle::Free
    }

    /// Get the cell matrix of this box, the columns are the cell vectors
    pub fn matrix(&self) -> Matrix3 {
        self.matrix
    }

    /// Get the inverse of the cell matrix. Infinite boxes do not have an
    /// inverse.
    pub fn inverse(&self) -> Result<Matrix3, Error> {
        if self.is_free() {
            return Err(Error::State("an infinite cell does not have an inverse matrix".into()));
        }
        Ok(self.matrix.inverse())
    }

    /// Get the lengths of the cell vectors
    pub fn lengths(&self) -> Vector3D {
        match self.style() {
            BoxStyle::Free => Vector3D::zero(),
            BoxStyle::Orthogonal => self.matrix.diag(),
            BoxStyle::Triclinic => geometry::lengths_from_matrix(&self.matrix),
        }
    }

    /// Get the angles between the cell vectors, in degrees
    pub fn angles(&self) -> Vector3D {
        match self.style() {
            BoxStyle::Free | BoxStyle::Orthogonal => Vector3D::new(90.0, 90.0, 90.0),
            BoxStyle::Triclinic => geometry::angles_from_matrix(&self.matrix),
        }
    }

    /// Get the tilt factors `(xy, xz, yz)` of the box
    pub fn tilts(&self) -> Vector3D {
        match self.style() {
            BoxStyle::Free | BoxStyle::Orthogonal => Vector3D::zero(),
            BoxStyle::Triclinic => geometry::tilts_from_matrix(&self.matrix),
        }
    }

    /// Get the volume of the box
    pub fn volume(&self) -> f64 {
        match self.style() {
            BoxStyle::Free => 0.0,
            BoxStyle::Orthogonal => {
                let diagonal = self.matrix.diag();
                diagonal[0] * diagonal[1] * diagonal[2]
            }
            BoxStyle::Triclinic => self.matrix.determinant(),
        }
    }

    /// Get the distances between opposite faces of the box, i.e. the width of
    /// the box perpendicular to each pair of faces.
    pub fn distances_between_faces(&self) -> Vector3D {
        match self.style() {
            BoxStyle::Free => Vector3D::zero(),
            BoxStyle::Orthogonal => geometry::lengths_from_matrix(&self.matrix),
            BoxStyle::Triclinic => {
                let a = self.matrix.column(0);
                let b = self.matrix.column(1);
                let c = self.matrix.column(2);

                // normal vectors of the faces
                let na = (b ^ c).normalized();
                let nb = (c ^ a).normalized();
                let nc = (a ^ b).normalized();

                Vector3D::new(f64::abs(na * a), f64::abs(nb * b), f64::abs(nc * c))
            }
        }
    }
}

/// Modification of the box, all setters rebuild the full cell matrix
impl SimulationBox {
    /// Replace the cell matrix of this box
    pub fn set_matrix(&mut self, matrix: Matrix3) -> Result<(), Error> {
        self.matrix = geometry::check_matrix(matrix)?;
        Ok(())
    }

    /// Set the lengths of the cell vectors, keeping the current angles.
    ///
    /// Infinite boxes do not have a shape, so this fails for them. Use
    /// [`SimulationBox::set_matrix`] or
    /// [`SimulationBox::set_lengths_angles`] to give them one.
    pub fn set_lengths(&mut self, lengths: Vector3D) -> Result<(), Error> {
        geometry::check_lengths(lengths)?;
        if self.is_free() {
            return Err(Error::State("can not set lengths on an infinite cell".into()));
        }

        return self.set_lengths_angles(lengths, self.angles());
    }

    /// Set the angles between the cell vectors (in degrees), keeping the
    /// current lengths.
    ///
    /// Only triclinic boxes can change their angles: infinite boxes do not
    /// have a shape and orthogonal boxes are locked to 90°.
    pub fn set_angles(&mut self, angles: Vector3D) -> Result<(), Error> {
        geometry::check_angles(angles)?;
        match self.style() {
            BoxStyle::Free => {
                return Err(Error::State("can not set angles on an infinite cell".into()));
            }
            BoxStyle::Orthogonal => {
                return Err(Error::State(
                    "can not set angles on an orthogonal cell, use set_lengths_angles instead".into()
                ));
            }
            BoxStyle::Triclinic => {}
        }

        return self.set_lengths_angles(self.lengths(), angles);
    }

    /// Set both the lengths and angles (in degrees) of this box
    pub fn set_lengths_angles(&mut self, lengths: Vector3D, angles: Vector3D) -> Result<(), Error> {
        *self = SimulationBox::from_lengths_angles(lengths, angles)?;
        Ok(())
    }

    /// Set the sizes along the three axes and the tilt factors of this box
    pub fn set_lengths_tilts(&mut self, lengths: Vector3D, tilts: Vector3D) -> Result<(), Error> {
        *self = SimulationBox::from_lengths_tilts(lengths, tilts)?;
        Ok(())
    }
}

/// Geometric operations using periodic boundary conditions
impl SimulationBox {
    /// Wrap a `position` in the box, obeying the periodic boundary conditions.
    ///
    /// This uses the minimum image convention: the wrapped position is the
    /// periodic image closest to the origin. For an orthogonal box of lengths
    /// `L`, all components end up in `[-L/2, L/2]`.
    pub fn wrap(&self, position: Vector3D) -> Vector3D {
        match self.style() {
            BoxStyle::Free => self.wrap_free(position),
            BoxStyle::Orthogonal => self.wrap_orthogonal(position),
            BoxStyle::Triclinic => self.wrap_triclinic(position),
        }
    }

    /// Wrap all `positions` in the box, see [`SimulationBox::wrap`]
    pub fn wrap_positions(&self, positions: &mut [Vector3D]) {
        match self.style() {
            BoxStyle::Free => {}
            BoxStyle::Orthogonal => {
                let lengths = self.matrix.diag();
                for position in positions {
                    *position = orthogonal_image(lengths, *position);
                }
            }
            BoxStyle::Triclinic => {
                let inverse = self.matrix.inverse();
                for position in positions {
                    *position = triclinic_image(&self.matrix, &inverse, *position);
                }
            }
        }
    }

    /// Wrapping in an infinite box, which leaves `position` unchanged
    pub fn wrap_free(&self, position: Vector3D) -> Vector3D {
        position
    }

    /// Wrapping in an orthogonal box, using only the diagonal of the cell
    /// matrix. Infinite boxes leave `position` unchanged.
    pub fn wrap_orthogonal(&self, position: Vector3D) -> Vector3D {
        if self.is_free() {
            return self.wrap_free(position);
        }
        orthogonal_image(self.matrix.diag(), position)
    }

    /// Wrapping in a triclinic box, going through fractional coordinates.
    /// This also gives the right result for orthogonal boxes, and leaves
    /// `position` unchanged for infinite boxes.
    pub fn wrap_triclinic(&self, position: Vector3D) -> Vector3D {
        if self.is_free() {
            return self.wrap_free(position);
        }
        triclinic_image(&self.matrix, &self.matrix.inverse(), position)
    }

    /// Get the shortest periodic image of `vector`.
    ///
    /// For triclinic boxes, [`SimulationBox::wrap`] only gives the image
    /// closest to the origin in fractional coordinates, which can be longer
    /// than the shortest one when the cell is strongly skewed. This function
    /// also checks all the lattice translations of the wrapped vector which
    /// could be shorter.
    pub fn minimum_image(&self, vector: Vector3D) -> Vector3D {
        match self.style() {
            BoxStyle::Free => vector,
            BoxStyle::Orthogonal => self.wrap_orthogonal(vector),
            BoxStyle::Triclinic => {
                let wrapped = self.wrap_triclinic(vector);
                let images = images_within(self.distances_between_faces(), wrapped.norm(), [true, true, true]);
                shortest_image(&self.matrix, wrapped, images)
            }
        }
    }

    /// Get the fractional representation of `vector` in this box. Infinite
    /// boxes return the vector unchanged.
    pub fn fractional(&self, vector: Vector3D) -> Vector3D {
        if self.is_free() {
            return vector;
        }
        return self.matrix.inverse() * vector;
    }

    /// Get the Cartesian representation of the `fractional` vector in this
    /// box. Infinite boxes return the vector unchanged.
    pub fn cartesian(&self, fractional: Vector3D) -> Vector3D {
        if self.is_free() {
            return fractional;
        }
        return self.matrix * fractional;
    }

    /// Get the shortest vector going from `u` to any periodic image of `v`,
    /// see [`SimulationBox::minimum_image`]
    pub fn distance_vector(&self, u: Vector3D, v: Vector3D) -> Vector3D {
        self.minimum_image(v - u)
    }

    /// Periodic boundary conditions squared distance between the point `u` and
    /// the point `v`
    pub fn distance2(&self, u: Vector3D, v: Vector3D) -> f64 {
        self.distance_vector(u, v).norm2()
    }

    /// Periodic boundary conditions distance between the point `u` and the
    /// point `v`
    pub fn distance(&self, u: Vector3D, v: Vector3D) -> f64 {
        f64::sqrt(self.distance2(u, v))
    }

    /// Check if `position` is inside the region described by this box.
    ///
    /// Containment is not implemented yet, and all positions are considered
    /// to be inside the box.
    pub fn isin(&self, position: Vector3D) -> bool {
        let _ = position;
        true
    }

    /// Check if all `positions` are inside the region described by this box,
    /// see [`SimulationBox::isin`]
    pub fn isin_positions(&self, positions: &[Vector3D]) -> Vec<bool> {
        positions.iter().map(|&position| self.isin(position)).collect()
    }
}

fn orthogonal_image(lengths: Vector3D, position: Vector3D) -> Vector3D {
    let mut wrapped = position;
    for i in 0..3 {
        wrapped[i] -= f64::round(position[i] / lengths[i]) * lengths[i];
    }
    return wrapped;
}

fn triclinic_image(matrix: &Matrix3, inverse: &Matrix3, position: Vector3D) -> Vector3D {
    let fractional = inverse * position;
    return matrix * (fractional - fractional.round());
}

/// Number of lattice translations to check along each cell vector to find
/// all the periodic images of a wrapped vector shorter than `length`.
///
/// The wrapped vector has fractional coordinates in `[-0.5, 0.5]`, and an
/// image shorter than `length` has fractional coordinates smaller than
/// `length / distances_between_faces`.
pub(crate) fn images_within(distances_between_faces: Vector3D, length: f64, periodicity: [bool; 3]) -> [i32; 3] {
    let mut images = [0; 3];
    for i in 0..3 {
        if periodicity[i] {
            images[i] = f64::max(0.0, f64::ceil(length / distances_between_faces[i] - 0.5)) as i32;
        }
    }
    return images;
}

/// Get the shortest vector among `vector` and its translations by up to
/// `images` cell vectors of `matrix` in each direction. `vector` is kept if
/// no translation is strictly shorter.
pub(crate) fn shortest_image(matrix: &Matrix3, vector: Vector3D, images: [i32; 3]) -> Vector3D {
    if images == [0, 0, 0] {
        return vector;
    }

    let a = matrix.column(0);
    let b = matrix.column(1);
    let c = matrix.column(2);

    let mut shortest = vector;
    let mut shortest2 = vector.norm2();
    for i in -images[0]..=images[0] {
        for j in -images[1]..=images[1] {
            for k in -images[2]..=images[2] {
                let image = vector + a * i as f64 + b * j as f64 + c * k as f64;
                let image2 = image.norm2();
                if image2 < shortest2 {
                    shortest = image;
                    shortest2 = image2;
                }
            }
        }
    }
    return shortest;
}
