use std::ops::{Add, Index, IndexMut, Mul, Sub};

use approx::{AbsDiffEq, RelativeEq, UlpsEq};

use super::Vector3D;
use crate::Error;

/// A 3x3 square matrix type, stored in row-major order: `matrix[i][j]` is
/// the entry at row `i` and column `j`.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(from = "[[f64; 3]; 3]", into = "[[f64; 3]; 3]")]
pub struct Matrix3([[f64; 3]; 3]);

impl Matrix3 {
    /// Create a new `Matrix3` from rows
    pub const fn new(data: [[f64; 3]; 3]) -> Matrix3 {
        Matrix3(data)
    }

    /// Create a new `Matrix3` with all components set to 0
    pub const fn zero() -> Matrix3 {
        Matrix3([[0.0; 3]; 3])
    }

    /// Create the identity matrix
    pub const fn one() -> Matrix3 {
        Matrix3([
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ])
    }

    /// Create a diagonal matrix with the given `diagonal` entries
    pub fn diagonal(diagonal: Vector3D) -> Matrix3 {
        Matrix3([
            [diagonal[0], 0.0, 0.0],
            [0.0, diagonal[1], 0.0],
            [0.0, 0.0, diagonal[2]],
        ])
    }

    /// Create a matrix using `a`, `b` and `c` as the three columns
    pub fn from_columns(a: Vector3D, b: Vector3D, c: Vector3D) -> Matrix3 {
        Matrix3([
            [a[0], b[0], c[0]],
            [a[1], b[1], c[1]],
            [a[2], b[2], c[2]],
        ])
    }

    /// Get the column at index `j` of this matrix
    #[inline]
    pub fn column(&self, j: usize) -> Vector3D {
        Vector3D::new(self[0][j], self[1][j], self[2][j])
    }

    /// Get the diagonal of this matrix
    #[inline]
    pub fn diag(&self) -> Vector3D {
        Vector3D::new(self[0][0], self[1][1], self[2][2])
    }

    /// Compute the determinant of this matrix
    #[inline]
    pub fn determinant(&self) -> f64 {
        let m = self;
        m[0][0] * (m[1][1] * m[2][2] - m[2][1] * m[1][2]) -
        m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0]) +
        m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// Compute the inverse of this matrix.
    ///
    /// # Panics
    ///
    /// If the matrix is not invertible, i.e. if its determinant is 0.
    #[must_use]
    pub fn inverse(&self) -> Matrix3 {
        let determinant = self.determinant();
        assert!(determinant != 0.0, "this matrix is not invertible");

        let m = self;
        let inv_det = 1.0 / determinant;
        let mut res = Matrix3::zero();
        res[0][0] = (m[1][1] * m[2][2] - m[2][1] * m[1][2]) * inv_det;
        res[0][1] = (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * inv_det;
        res[0][2] = (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv_det;
        res[1][0] = (m[1][2] * m[2][0] - m[1][0] * m[2][2]) * inv_det;
        res[1][1] = (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv_det;
        res[1][2] = (m[1][0] * m[0][2] - m[0][0] * m[1][2]) * inv_det;
        res[2][0] = (m[1][0] * m[2][1] - m[2][0] * m[1][1]) * inv_det;
        res[2][1] = (m[2][0] * m[0][1] - m[0][0] * m[2][1]) * inv_det;
        res[2][2] = (m[0][0] * m[1][1] - m[1][0] * m[0][1]) * inv_det;
        return res;
    }

    /// Get the transposed matrix
    #[must_use]
    pub fn transposed(&self) -> Matrix3 {
        let m = self;
        Matrix3([
            [m[0][0], m[1][0], m[2][0]],
            [m[0][1], m[1][1], m[2][1]],
            [m[0][2], m[1][2], m[2][2]],
        ])
    }

    /// Iterate over all the entries of this matrix, in row-major order
    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.0.iter().flat_map(|row| row.iter())
    }
}

impl From<[[f64; 3]; 3]> for Matrix3 {
    fn from(data: [[f64; 3]; 3]) -> Matrix3 {
        Matrix3(data)
    }
}

impl From<Matrix3> for [[f64; 3]; 3] {
    fn from(matrix: Matrix3) -> [[f64; 3]; 3] {
        matrix.0
    }
}

impl<'a> TryFrom<&'a [Vec<f64>]> for Matrix3 {
    type Error = Error;

    fn try_from(rows: &'a [Vec<f64>]) -> Result<Matrix3, Error> {
        if rows.len() != 3 || rows.iter().any(|row| row.len() != 3) {
            let shape = rows.iter().map(|row| row.len().to_string()).collect::<Vec<_>>();
            return Err(Error::Shape(format!(
                "matrix must be 3x3, got {} rows with [{}] columns",
                rows.len(), shape.join(", ")
            )));
        }

        let mut matrix = Matrix3::zero();
        for (i, row) in rows.iter().enumerate() {
            for (j, &value) in row.iter().enumerate() {
                matrix[i][j] = value;
            }
        }
        return Ok(matrix);
    }
}

impl Index<usize> for Matrix3 {
    type Output = [f64; 3];
    #[inline]
    fn index(&self, index: usize) -> &[f64; 3] {
        &self.0[index]
    }
}

impl IndexMut<usize> for Matrix3 {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut [f64; 3] {
        &mut self.0[index]
    }
}

impl_arithmetic!(
    Matrix3, Matrix3, Add, add, Matrix3,
    self, other,
    {
        let mut res = Matrix3::zero();
        for i in 0..3 {
            for j in 0..3 {
                res[i][j] = self[i][j] + other[i][j];
            }
        }
        res
    }
);

impl_arithmetic!(
    Matrix3, Matrix3, Sub, sub, Matrix3,
    self, other,
    {
        let mut res = Matrix3::zero();
        for i in 0..3 {
            for j in 0..3 {
                res[i][j] = self[i][j] - other[i][j];
            }
        }
        res
    }
);

impl_arithmetic!(
    Matrix3, Matrix3, Mul, mul, Matrix3,
    self, other,
    {
        let mut res = Matrix3::zero();
        for i in 0..3 {
            for j in 0..3 {
                res[i][j] = self[i][0] * other[0][j] + self[i][1] * other[1][j] + self[i][2] * other[2][j];
            }
        }
        res
    }
);

impl_arithmetic!(
    Matrix3, Vector3D, Mul, mul, Vector3D,
    self, vector,
    {
        let x = self[0][0] * vector[0] + self[0][1] * vector[1] + self[0][2] * vector[2];
        let y = self[1][0] * vector[0] + self[1][1] * vector[1] + self[1][2] * vector[2];
        let z = self[2][0] * vector[0] + self[2][1] * vector[1] + self[2][2] * vector[2];
        Vector3D::new(x, y, z)
    }
);

lsh_scal_arithmetic!(
    Matrix3, Mul, mul, Matrix3,
    self, other,
    {
        let mut res = Matrix3::zero();
        for i in 0..3 {
            for j in 0..3 {
                res[i][j] = self[i][j] * other;
            }
        }
        res
    }
);

impl AbsDiffEq for Matrix3 {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Matrix3, epsilon: f64) -> bool {
        self.iter().zip(other.iter()).all(|(a, b)| f64::abs_diff_eq(a, b, epsilon))
    }
}

impl RelativeEq for Matrix3 {
    fn default_max_relative() -> f64 {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Matrix3, epsilon: f64, max_relative: f64) -> bool {
        self.iter().zip(other.iter()).all(|(a, b)| f64::relative_eq(a, b, epsilon, max_relative))
    }
}

impl UlpsEq for Matrix3 {
    fn default_max_ulps() -> u32 {
        f64::default_max_ulps()
    }

    fn ulps_eq(&self, other: &Matrix3, epsilon: f64, max_ulps: u32) -> bool {
        self.iter().zip(other.iter()).all(|(a, b)| f64::ulps_eq(a, b, epsilon, max_ulps))
    }
}
