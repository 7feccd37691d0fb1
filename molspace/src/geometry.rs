//! Pure geometric functions converting between the different
//! representations of a unit cell: cell matrix, lengths & angles, and
//! lengths & tilt factors.
//!
//! Cell matrices follow the canonical orientation used everywhere in this
//! crate: the columns of the matrix are the cell vectors `a`, `b` and `c`,
//! with `a` along the x axis and `b` in the x-y plane. This makes every
//! valid cell matrix upper triangular.

use crate::{Error, Matrix3, Vector3D};

/// Absolute tolerance used to decide that a value is zero
pub const ZERO_TOLERANCE: f64 = 1e-5;

/// Relative tolerance used when comparing matrices with [`allclose`]
pub const RELATIVE_TOLERANCE: f64 = 1e-5;

/// Absolute tolerance used when comparing matrices with [`allclose`]
pub const ABSOLUTE_TOLERANCE: f64 = 1e-8;

/// The style of a simulation box, which determines how periodic boundary
/// conditions are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum BoxStyle {
    /// Infinite box, without periodic boundary conditions. The cell matrix
    /// is all zeros.
    Free,
    /// Rectangular box aligned with the axes. The cell matrix is diagonal.
    Orthogonal,
    /// Arbitrary parallelepiped. The cell matrix is upper triangular.
    Triclinic,
}

/// Convert `degrees` to radians and compute the cosine
#[inline]
pub fn cosd(degrees: f64) -> f64 {
    f64::cos(degrees.to_radians())
}

/// Convert `degrees` to radians and compute the sine
#[inline]
pub fn sind(degrees: f64) -> f64 {
    f64::sin(degrees.to_radians())
}

/// Compute the arc-cosine of `value`, in degrees. `value` is clamped to
/// `[-1, 1]` to protect against rounding errors.
#[inline]
pub fn acosd(value: f64) -> f64 {
    f64::acos(value.clamp(-1.0, 1.0)).to_degrees()
}

/// Check if `value` is close enough to zero, using [`ZERO_TOLERANCE`]
#[inline]
pub fn is_close_zero(value: f64) -> bool {
    f64::abs(value) < ZERO_TOLERANCE
}

/// Check if all the entries of `matrix` are close to zero
pub fn is_zero(matrix: &Matrix3) -> bool {
    matrix.iter().all(|&value| is_close_zero(value))
}

/// Check if all the entries below the diagonal of `matrix` are close to zero
pub fn is_upper_triangular(matrix: &Matrix3) -> bool {
    is_close_zero(matrix[1][0]) && is_close_zero(matrix[2][0]) && is_close_zero(matrix[2][1])
}

/// Check if all the entries outside of the diagonal of `matrix` are close to
/// zero
pub fn is_diagonal(matrix: &Matrix3) -> bool {
    is_upper_triangular(matrix) &&
        is_close_zero(matrix[0][1]) && is_close_zero(matrix[0][2]) && is_close_zero(matrix[1][2])
}

/// Check if `a` and `b` are equal element-wise, within a tolerance of
/// `absolute + relative * |b|`
pub fn allclose(a: &Matrix3, b: &Matrix3, relative: f64, absolute: f64) -> bool {
    a.iter().zip(b.iter()).all(|(&a, &b)| f64::abs(a - b) <= absolute + relative * f64::abs(b))
}

/// Check that all `lengths` are positive or zero, and finite
pub fn check_lengths(lengths: Vector3D) -> Result<(), Error> {
    if lengths.iter().any(|&length| length < 0.0) {
        return Err(Error::Domain("lengths must be >= 0".into()));
    }

    if !lengths.is_finite() {
        return Err(Error::Domain("lengths must be finite".into()));
    }

    Ok(())
}

/// Check that all `angles` are strictly between 0° and 180°
pub fn check_angles(angles: Vector3D) -> Result<(), Error> {
    if angles.iter().any(|&angle| !(angle > 0.0)) {
        return Err(Error::Domain("angles can not be <= 0°".into()));
    }

    if angles.iter().any(|&angle| !(angle < 180.0)) {
        return Err(Error::Domain("angles can not be >= 180°".into()));
    }

    Ok(())
}

/// Build the canonical (upper triangular) cell matrix corresponding to the
/// given `lengths` and `angles` (in degrees).
///
/// The angles are `alpha` between `b` and `c`, `beta` between `a` and `c`
/// and `gamma` between `a` and `b`.
pub fn matrix_from_lengths_angles(lengths: Vector3D, angles: Vector3D) -> Result<Matrix3, Error> {
    check_lengths(lengths)?;
    check_angles(angles)?;

    let (alpha, beta, gamma) = (angles[0], angles[1], angles[2]);

    let b_x = lengths[1] * cosd(gamma);
    let b_y = lengths[1] * sind(gamma);

    let c_x = cosd(beta);
    let c_y = (cosd(alpha) - cosd(beta) * cosd(gamma)) / sind(gamma);
    let c_z2 = 1.0 - c_x * c_x - c_y * c_y;
    if c_z2 < 0.0 {
        return Err(Error::Domain(format!(
            "angles ({}°, {}°, {}°) do not describe a valid cell", alpha, beta, gamma
        )));
    }
    let c_z = f64::sqrt(c_z2);

    let matrix = Matrix3::new([
        [lengths[0], b_x, lengths[2] * c_x],
        [0.0,        b_y, lengths[2] * c_y],
        [0.0,        0.0, lengths[2] * c_z],
    ]);

    if !is_upper_triangular(&matrix) {
        return Err(Error::Domain(
            "lengths and angles do not produce an upper triangular cell matrix".into()
        ));
    }

    return Ok(matrix);
}

/// Build the cell matrix of a box with sizes `lx, ly, lz` along the three
/// axes and tilt factors `xy, xz, yz`.
///
/// This follows the LAMMPS convention: `a = (lx, 0, 0)`, `b = (xy, ly, 0)`
/// and `c = (xz, yz, lz)`.
pub fn matrix_from_lengths_tilts(lengths: Vector3D, tilts: Vector3D) -> Result<Matrix3, Error> {
    check_lengths(lengths)?;
    if !tilts.is_finite() {
        return Err(Error::Domain("tilt factors must be finite".into()));
    }

    let (xy, xz, yz) = (tilts[0], tilts[1], tilts[2]);
    return Ok(Matrix3::new([
        [lengths[0], xy,         xz],
        [0.0,        lengths[1], yz],
        [0.0,        0.0,        lengths[2]],
    ]));
}

/// Get the lengths of the three cell vectors (columns) of `matrix`
pub fn lengths_from_matrix(matrix: &Matrix3) -> Vector3D {
    Vector3D::new(
        matrix.column(0).norm(),
        matrix.column(1).norm(),
        matrix.column(2).norm(),
    )
}

/// Get the angles (in degrees) between the cell vectors (columns) of
/// `matrix`, as `(alpha, beta, gamma)`
pub fn angles_from_matrix(matrix: &Matrix3) -> Vector3D {
    let a = matrix.column(0);
    let b = matrix.column(1);
    let c = matrix.column(2);

    Vector3D::new(angle(b, c), angle(a, c), angle(a, b))
}

/// Get the tilt factors `(xy, xz, yz)` of `matrix`
pub fn tilts_from_matrix(matrix: &Matrix3) -> Vector3D {
    Vector3D::new(matrix[0][1], matrix[0][2], matrix[1][2])
}

/// Angle in degrees between the vectors `u` and `v`
fn angle(u: Vector3D, v: Vector3D) -> f64 {
    acosd((u * v) / (u.norm() * v.norm()))
}

/// Get the [`BoxStyle`] corresponding to the given `matrix`.
///
/// This fails for matrices which are not upper triangular, since rotated
/// cells are not supported.
pub fn classify(matrix: &Matrix3) -> Result<BoxStyle, Error> {
    if is_zero(matrix) {
        Ok(BoxStyle::Free)
    } else if is_diagonal(matrix) {
        Ok(BoxStyle::Orthogonal)
    } else if is_upper_triangular(matrix) {
        Ok(BoxStyle::Triclinic)
    } else {
        Err(Error::Domain(
            "rotated cells are not supported: the cell matrix must be upper triangular".into()
        ))
    }
}

/// Check that `matrix` can be used as the matrix of a simulation box.
///
/// The all-zero matrix is accepted (infinite box), all other matrices must be
/// upper triangular, with a positive diagonal and a determinant far enough
/// from zero.
pub fn check_matrix(matrix: Matrix3) -> Result<Matrix3, Error> {
    if matrix.iter().any(|value| !value.is_finite()) {
        return Err(Error::Domain("cell matrix must only contain finite values".into()));
    }

    if classify(&matrix)? == BoxStyle::Free {
        return Ok(Matrix3::zero());
    }

    let lengths = lengths_from_matrix(&matrix);
    let scale = lengths[0] * lengths[1] * lengths[2];
    let determinant = matrix.determinant();
    if scale == 0.0 || is_close_zero(determinant / scale) {
        return Err(Error::Invertibility("cell matrix must be invertible".into()));
    }

    if determinant < 0.0 || matrix.diag().iter().any(|&value| value < 0.0) {
        return Err(Error::Invertibility(
            "cell matrix must be invertible with a positive determinant and diagonal".into()
        ));
    }

    return Ok(matrix);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_relative_eq, assert_ulps_eq};

    #[test]
    fn shape_checks() {
        let identity = Matrix3::one();
        assert!(is_diagonal(&identity));
        assert!(is_upper_triangular(&identity));

        let upper = Matrix3::new([
            [1.0, 0.0, 1.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ]);
        assert!(!is_diagonal(&upper));
        assert!(is_upper_triangular(&upper));

        let lower = Matrix3::new([
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [1.0, 0.0, 1.0],
        ]);
        assert!(!is_diagonal(&lower));
        assert!(!is_upper_triangular(&lower));

        let degenerate = Matrix3::new([
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0],
        ]);
        assert!(is_diagonal(&degenerate));
        assert!(is_upper_triangular(&degenerate));

        assert!(is_zero(&Matrix3::zero()));
        assert!(is_zero(&Matrix3::diagonal(Vector3D::new(1e-7, 0.0, -1e-6))));
        assert!(!is_zero(&degenerate));
    }

    #[test]
    fn degrees() {
        assert_ulps_eq!(cosd(60.0), 0.5, epsilon = 1e-15);
        assert_ulps_eq!(sind(30.0), 0.5, epsilon = 1e-15);
        assert_ulps_eq!(acosd(0.5), 60.0, epsilon = 1e-12);
        assert_eq!(acosd(1.0 + 1e-15), 0.0);
    }

    #[test]
    fn lengths_angles_round_trip() {
        let cells = [
            ([10.0, 11.0, 12.0], [90.0, 80.0, 120.0]),
            ([3.0, 4.0, 5.0], [80.0, 90.0, 110.0]),
            ([10.0, 10.0, 10.0], [140.0, 100.0, 100.0]),
            ([1.0, 1.0, 1.0], [45.0, 45.0, 45.0]),
            ([26.2553, 11.3176, 11.889115], [90.0, 112.159, 90.0]),
            ([5.0, 6.0, 3.6], [90.0, 53.0, 77.0]),
        ];

        for (lengths, angles) in cells {
            let matrix = matrix_from_lengths_angles(lengths.into(), angles.into()).unwrap();
            assert!(is_upper_triangular(&matrix));

            let recovered = lengths_from_matrix(&matrix);
            assert_relative_eq!(recovered, Vector3D::from(lengths), max_relative = 1e-4);

            let recovered = angles_from_matrix(&matrix);
            assert_relative_eq!(recovered, Vector3D::from(angles), max_relative = 1e-4);
        }
    }

    #[test]
    fn canonical_matrix() {
        let matrix = matrix_from_lengths_angles(
            Vector3D::new(10.0, 10.0, 10.0),
            Vector3D::new(80.0, 80.0, 80.0),
        ).unwrap();

        let expected = Matrix3::new([
            [10.0, 1.7364817766693041, 1.7364817766693041],
            [0.0,  9.84807753012208,   1.457081218349281],
            [0.0,  0.0,                9.739689182023685],
        ]);
        assert_relative_eq!(matrix, expected, max_relative = 1e-12);
    }

    #[test]
    fn invalid_lengths_angles() {
        let error = matrix_from_lengths_angles(Vector3D::new(-1.0, 1.0, 1.0), Vector3D::new(90.0, 90.0, 90.0));
        assert_eq!(error.unwrap_err().to_string(), "domain error: lengths must be >= 0");

        for angles in [[0.0, 90.0, 90.0], [90.0, -90.0, 90.0], [90.0, 90.0, 0.0]] {
            let error = matrix_from_lengths_angles(Vector3D::new(1.0, 1.0, 1.0), angles.into());
            assert_eq!(error.unwrap_err().to_string(), "domain error: angles can not be <= 0°");
        }

        for angles in [[180.0, 90.0, 90.0], [90.0, 180.0, 90.0], [90.0, 90.0, 190.0]] {
            let error = matrix_from_lengths_angles(Vector3D::new(1.0, 1.0, 1.0), angles.into());
            assert_eq!(error.unwrap_err().to_string(), "domain error: angles can not be >= 180°");
        }

        let error = matrix_from_lengths_angles(Vector3D::new(1.0, 1.0, 1.0), Vector3D::new(10.0, 10.0, 170.0));
        assert!(matches!(error, Err(Error::Domain(_))));
    }

    #[test]
    fn tilts() {
        let matrix = matrix_from_lengths_tilts(
            Vector3D::new(10.0, 11.0, 12.0),
            Vector3D::new(2.0, 1.0, 3.0),
        ).unwrap();

        assert_eq!(matrix.determinant(), 1320.0);
        assert_eq!(tilts_from_matrix(&matrix), Vector3D::new(2.0, 1.0, 3.0));
        assert_eq!(matrix.column(1), Vector3D::new(2.0, 11.0, 0.0));
        assert_eq!(matrix.column(2), Vector3D::new(1.0, 3.0, 12.0));

        let error = matrix_from_lengths_tilts(Vector3D::new(10.0, -11.0, 12.0), Vector3D::zero());
        assert!(matches!(error, Err(Error::Domain(_))));
    }

    #[test]
    fn classification() {
        assert_eq!(classify(&Matrix3::zero()).unwrap(), BoxStyle::Free);
        assert_eq!(
            classify(&Matrix3::diagonal(Vector3D::new(10.0, 11.0, 12.0))).unwrap(),
            BoxStyle::Orthogonal
        );

        let matrix = matrix_from_lengths_angles(
            Vector3D::new(10.0, 11.0, 12.0),
            Vector3D::new(90.0, 80.0, 120.0),
        ).unwrap();
        assert_eq!(classify(&matrix).unwrap(), BoxStyle::Triclinic);

        // cos(90°) is not exactly zero in floating point
        let matrix = matrix_from_lengths_angles(
            Vector3D::new(10.0, 11.0, 12.0),
            Vector3D::new(90.0, 90.0, 90.0),
        ).unwrap();
        assert_eq!(classify(&matrix).unwrap(), BoxStyle::Orthogonal);

        let rotated = Matrix3::new([
            [0.0, 0.0, 3.0],
            [5.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
        ]);
        assert!(matches!(classify(&rotated), Err(Error::Domain(_))));
    }

    #[test]
    fn matrix_checks() {
        assert!(check_matrix(Matrix3::zero()).is_ok());
        assert!(check_matrix(Matrix3::one()).is_ok());

        let singular = Matrix3::diagonal(Vector3D::new(10.0, 0.0, 10.0));
        assert_eq!(
            check_matrix(singular).unwrap_err().to_string(),
            "invertibility error: cell matrix must be invertible"
        );

        let flat = Matrix3::new([
            [10.0, 10.0, 0.0],
            [0.0,  1e-9, 0.0],
            [0.0,  0.0,  10.0],
        ]);
        assert!(matches!(check_matrix(flat), Err(Error::Invertibility(_))));

        let negative = Matrix3::new([
            [26.2553,   0.0000, -4.4843],
            [ 0.0000, -11.3176,  0.0000],
            [ 0.0000,   0.0000,  11.011],
        ]);
        assert!(matches!(check_matrix(negative), Err(Error::Invertibility(_))));

        let small = Matrix3::diagonal(Vector3D::new(0.01, 0.01, 0.01));
        assert!(check_matrix(small).is_ok());
    }

    #[test]
    fn close_matrices() {
        let a = Matrix3::diagonal(Vector3D::new(10.0, 10.0, 10.0));
        let b = Matrix3::diagonal(Vector3D::new(10.00001, 10.0, 10.0));
        let c = Matrix3::diagonal(Vector3D::new(10.1, 10.0, 10.0));

        assert!(allclose(&a, &b, RELATIVE_TOLERANCE, ABSOLUTE_TOLERANCE));
        assert!(!allclose(&a, &c, RELATIVE_TOLERANCE, ABSOLUTE_TOLERANCE));
    }
}
