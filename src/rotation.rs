use nalgebra::{Matrix3, Vector3};

use crate::angles::degrees_to_radians;
use crate::coordinates::{spherical_angles, CartesianVector};
use crate::error::GeometryError;

// Below this, sin(co-latitude) is treated as zero and the east direction is lost.
const POLE_EPSILON: f64 = 1e-12;

/// Maps geocentric vectors into an observer's local frame, whose axes are
/// north, west and up (in that order).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationBasis {
    matrix: Matrix3<f64>,
}

impl RotationBasis {
    #[cfg(test)]
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    pub fn apply(&self, geocentric: &CartesianVector) -> CartesianVector {
        self.matrix * geocentric
    }
}

/// Builds the geocentric-to-local rotation for an observer standing at the
/// given longitude/latitude. Altitude plays no part in the orientation.
///
/// The frame is undefined at the poles, where every horizontal direction is
/// south (or north); those inputs return `PolarSingularity`.
pub fn build_rotation_basis(
    observer_longitude_deg: f64,
    observer_latitude_deg: f64,
) -> Result<RotationBasis, GeometryError> {
    if !observer_longitude_deg.is_finite() {
        return Err(GeometryError::NonFinite {
            field: "longitude",
            value: observer_longitude_deg,
        });
    }
    if !(-90.0..=90.0).contains(&observer_latitude_deg) {
        return Err(GeometryError::LatitudeOutOfRange(observer_latitude_deg));
    }

    let (theta, phi) = spherical_angles(observer_longitude_deg, observer_latitude_deg);
    let (sin_theta, cos_theta) = degrees_to_radians(theta).sin_cos();
    let (sin_phi, cos_phi) = degrees_to_radians(phi).sin_cos();

    if sin_phi.abs() < POLE_EPSILON {
        return Err(GeometryError::PolarSingularity);
    }

    let r_hat = Vector3::new(cos_theta * sin_phi, sin_theta * sin_phi, cos_phi);
    // Points south
    let phi_hat = Vector3::new(cos_phi * cos_theta, cos_phi * sin_theta, -sin_phi);
    // d(position)/d(theta) is sin(phi) * (-sin, cos, 0); normalized it points east
    let theta_hat = Vector3::new(-sin_theta, cos_theta, 0.0);

    let local_to_geocentric = Matrix3::from_columns(&[-phi_hat, -theta_hat, r_hat]);
    let matrix = invert_3x3(&local_to_geocentric).ok_or(GeometryError::PolarSingularity)?;

    Ok(RotationBasis { matrix })
}

/// Closed-form inverse via the adjugate. Returns `None` for a singular matrix.
fn invert_3x3(m: &Matrix3<f64>) -> Option<Matrix3<f64>> {
    let c00 = m[(1, 1)] * m[(2, 2)] - m[(1, 2)] * m[(2, 1)];
    let c01 = m[(1, 2)] * m[(2, 0)] - m[(1, 0)] * m[(2, 2)];
    let c02 = m[(1, 0)] * m[(2, 1)] - m[(1, 1)] * m[(2, 0)];

    let det = m[(0, 0)] * c00 + m[(0, 1)] * c01 + m[(0, 2)] * c02;
    if det.abs() < POLE_EPSILON {
        return None;
    }

    let adjugate = Matrix3::new(
        c00,
        m[(0, 2)] * m[(2, 1)] - m[(0, 1)] * m[(2, 2)],
        m[(0, 1)] * m[(1, 2)] - m[(0, 2)] * m[(1, 1)],
        c01,
        m[(0, 0)] * m[(2, 2)] - m[(0, 2)] * m[(2, 0)],
        m[(0, 2)] * m[(1, 0)] - m[(0, 0)] * m[(1, 2)],
        c02,
        m[(0, 1)] * m[(2, 0)] - m[(0, 0)] * m[(2, 1)],
        m[(0, 0)] * m[(1, 1)] - m[(0, 1)] * m[(1, 0)],
    );

    Some(adjugate / det)
}
