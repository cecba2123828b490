use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::angles::{degrees_to_radians, normalize_longitude};
use crate::error::GeometryError;

/// Mean radius of the reference sphere (meters).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Earth-centered position or displacement, meters.
pub type CartesianVector = Vector3<f64>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeodeticPosition {
    pub longitude_deg: f64,
    pub latitude_deg: f64,
    pub altitude_m: f64,
}

impl GeodeticPosition {
    pub fn new(longitude_deg: f64, latitude_deg: f64, altitude_m: f64) -> Self {
        Self {
            longitude_deg,
            latitude_deg,
            altitude_m,
        }
    }

    /// Checks latitude bounds and that the point is not below the Earth's center.
    /// Longitude may be any finite value; it gets normalized on use.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if !self.longitude_deg.is_finite() {
            return Err(GeometryError::NonFinite {
                field: "longitude",
                value: self.longitude_deg,
            });
        }
        if !self.altitude_m.is_finite() {
            return Err(GeometryError::NonFinite {
                field: "altitude",
                value: self.altitude_m,
            });
        }
        if !(-90.0..=90.0).contains(&self.latitude_deg) {
            return Err(GeometryError::LatitudeOutOfRange(self.latitude_deg));
        }
        if self.altitude_m < -EARTH_RADIUS_M {
            return Err(GeometryError::BelowEarthCenter(self.altitude_m));
        }
        Ok(())
    }

    pub fn to_cartesian(&self) -> CartesianVector {
        geodetic_to_cartesian(self.altitude_m, self.longitude_deg, self.latitude_deg)
    }
}

/// Physics-convention spherical coordinates: `theta` is the azimuthal angle
/// from the x axis, `phi` the polar angle from the z axis. Angles in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalVector {
    pub r: f64,
    pub theta: f64,
    pub phi: f64,
}

/// Azimuth and co-latitude (degrees) of a longitude/latitude pair.
pub(crate) fn spherical_angles(longitude_deg: f64, latitude_deg: f64) -> (f64, f64) {
    let theta = normalize_longitude(longitude_deg);
    let phi = 90.0 - latitude_deg;
    (theta, phi)
}

pub fn geodetic_to_cartesian(
    altitude_m: f64,
    longitude_deg: f64,
    latitude_deg: f64,
) -> CartesianVector {
    let r = altitude_m + EARTH_RADIUS_M;
    let (theta, phi) = spherical_angles(longitude_deg, latitude_deg);
    let (sin_theta, cos_theta) = degrees_to_radians(theta).sin_cos();
    let (sin_phi, cos_phi) = degrees_to_radians(phi).sin_cos();

    Vector3::new(r * cos_theta * sin_phi, r * sin_theta * sin_phi, r * cos_phi)
}

/// Fails with `ZeroDisplacement` for the zero vector, where `phi` is undefined.
pub fn cartesian_to_spherical(x: f64, y: f64, z: f64) -> Result<SphericalVector, GeometryError> {
    let r = (x * x + y * y + z * z).sqrt();
    if r == 0.0 {
        return Err(GeometryError::ZeroDisplacement);
    }

    let theta = y.atan2(x);
    // Rounding can push the ratio a hair outside [-1, 1]
    let phi = (z / r).clamp(-1.0, 1.0).acos();

    Ok(SphericalVector { r, theta, phi })
}

#[cfg(test)]
pub fn spherical_to_cartesian(v: &SphericalVector) -> CartesianVector {
    let (sin_theta, cos_theta) = v.theta.sin_cos();
    let (sin_phi, cos_phi) = v.phi.sin_cos();

    Vector3::new(
        v.r * cos_theta * sin_phi,
        v.r * sin_theta * sin_phi,
        v.r * cos_phi,
    )
}
