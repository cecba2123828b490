use serde::Serialize;

use crate::angles::{normalize_longitude, radians_to_degrees};
use crate::coordinates::{cartesian_to_spherical, geodetic_to_cartesian, GeodeticPosition};
use crate::error::GeometryError;
use crate::rotation::build_rotation_basis;

// Displacements shorter than this (meters) count as coincident points.
const MIN_RANGE_M: f64 = 1e-6;

/// Where to look for a target, in the observer's north/west/up frame.
///
/// `azimuth_deg` is measured from north turning toward west, and
/// `elevation_angle_deg` is the polar angle from the local zenith (0° straight
/// overhead, 90° on the horizon). The horizon-relative elevation is available
/// from [`ObserverResult::horizon_elevation_deg`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObserverResult {
    pub range_m: f64,
    pub azimuth_deg: f64,
    pub elevation_angle_deg: f64,
}

impl ObserverResult {
    pub fn range_km(&self) -> f64 {
        self.range_m / 1000.0
    }

    /// Elevation above the local horizon, negative below it.
    pub fn horizon_elevation_deg(&self) -> f64 {
        90.0 - self.elevation_angle_deg
    }

    /// Bearing measured clockwise from north (toward east), as on a compass.
    pub fn compass_bearing_deg(&self) -> f64 {
        normalize_longitude(360.0 - self.azimuth_deg)
    }

    pub fn is_above_horizon(&self) -> bool {
        self.elevation_angle_deg < 90.0
    }
}

/// Computes range and look angles from `observer` to `target`.
///
/// The observer is projected onto the reference sphere; its altitude is not
/// modeled. Fails when the two points coincide or the observer is at a pole.
pub fn compute_observer_view(
    observer: &GeodeticPosition,
    target: &GeodeticPosition,
) -> Result<ObserverResult, GeometryError> {
    observer.validate()?;
    target.validate()?;

    let observer_cart = geodetic_to_cartesian(0.0, observer.longitude_deg, observer.latitude_deg);
    let target_cart = target.to_cartesian();
    let displacement = target_cart - observer_cart;

    if displacement.norm() < MIN_RANGE_M {
        return Err(GeometryError::ZeroDisplacement);
    }

    let basis = build_rotation_basis(observer.longitude_deg, observer.latitude_deg)?;
    let local = basis.apply(&displacement);
    log::debug!(
        "local displacement north={:.1} west={:.1} up={:.1}",
        local.x,
        local.y,
        local.z
    );

    let spherical = cartesian_to_spherical(local.x, local.y, local.z)?;
    let theta_deg = radians_to_degrees(spherical.theta);
    let phi_deg = radians_to_degrees(spherical.phi);

    Ok(ObserverResult {
        range_m: spherical.r,
        azimuth_deg: normalize_longitude(theta_deg),
        elevation_angle_deg: phi_deg,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinates::EARTH_RADIUS_M;
    use assert_approx_eq::assert_approx_eq;

    const ISS_ALTITUDE_M: f64 = 400_000.0;

    #[test]
    fn test_directly_overhead() {
        let observer = GeodeticPosition::new(0.0, 0.0, 0.0);
        let target = GeodeticPosition::new(0.0, 0.0, ISS_ALTITUDE_M);

        let view = compute_observer_view(&observer, &target).unwrap();
        assert_approx_eq!(view.range_m, ISS_ALTITUDE_M, 1e-6);
        assert_approx_eq!(view.elevation_angle_deg, 0.0, 1e-4);
        assert_approx_eq!(view.horizon_elevation_deg(), 90.0, 1e-4);
        assert!(view.is_above_horizon());
    }

    #[test]
    fn test_antipodal_target() {
        let observer = GeodeticPosition::new(0.0, 0.0, 0.0);
        let target = GeodeticPosition::new(180.0, 0.0, ISS_ALTITUDE_M);

        let view = compute_observer_view(&observer, &target).unwrap();
        assert_approx_eq!(view.range_m, 2.0 * EARTH_RADIUS_M + ISS_ALTITUDE_M, 1e-3);
        assert_approx_eq!(view.elevation_angle_deg, 180.0, 1e-4);
        assert!(!view.is_above_horizon());
    }

    #[test]
    fn test_self_distance_is_zero_displacement() {
        let positions = [
            GeodeticPosition::new(0.0, 0.0, 0.0),
            GeodeticPosition::new(-75.5, 40.2, 0.0),
            GeodeticPosition::new(359.9, -66.6, 0.0),
        ];
        for p in positions {
            assert_eq!(
                compute_observer_view(&p, &p),
                Err(GeometryError::ZeroDisplacement)
            );
        }

        // Same point written with a different longitude winding
        let a = GeodeticPosition::new(10.0, 20.0, 0.0);
        let b = GeodeticPosition::new(370.0, 20.0, 0.0);
        assert_eq!(compute_observer_view(&a, &b), Err(GeometryError::ZeroDisplacement));
    }

    #[test]
    fn test_observer_altitude_is_ignored() {
        let target = GeodeticPosition::new(5.0, 3.0, ISS_ALTITUDE_M);
        let low = compute_observer_view(&GeodeticPosition::new(0.0, 0.0, 0.0), &target).unwrap();
        let high =
            compute_observer_view(&GeodeticPosition::new(0.0, 0.0, 2500.0), &target).unwrap();
        assert_eq!(low, high);
    }

    #[test]
    fn test_polar_observer() {
        let target = GeodeticPosition::new(0.0, 80.0, ISS_ALTITUDE_M);
        assert_eq!(
            compute_observer_view(&GeodeticPosition::new(0.0, 90.0, 0.0), &target),
            Err(GeometryError::PolarSingularity)
        );
        assert_eq!(
            compute_observer_view(&GeodeticPosition::new(45.0, -90.0, 0.0), &target),
            Err(GeometryError::PolarSingularity)
        );
    }

    #[test]
    fn test_azimuth_turns_from_north_toward_west() {
        let observer = GeodeticPosition::new(0.0, 0.0, 0.0);
        let view_of = |lon: f64, lat: f64| {
            compute_observer_view(&observer, &GeodeticPosition::new(lon, lat, ISS_ALTITUDE_M))
                .unwrap()
        };

        let north = view_of(0.0, 10.0);
        assert_approx_eq!(north.azimuth_deg, 0.0, 1e-6);
        assert_approx_eq!(north.compass_bearing_deg(), 0.0, 1e-6);

        let west = view_of(-10.0, 0.0);
        assert_approx_eq!(west.azimuth_deg, 90.0, 1e-6);
        assert_approx_eq!(west.compass_bearing_deg(), 270.0, 1e-6);

        let east = view_of(10.0, 0.0);
        assert_approx_eq!(east.azimuth_deg, 270.0, 1e-6);
        assert_approx_eq!(east.compass_bearing_deg(), 90.0, 1e-6);

        let south = view_of(0.0, -10.0);
        assert_approx_eq!(south.azimuth_deg, 180.0, 1e-6);
    }

    #[test]
    fn test_azimuth_stays_in_range() {
        let observers = [(0.0, 0.0), (-122.08, 37.39), (151.2, -33.9), (720.0, 89.5)];
        let targets = [(0.0, 51.6), (-170.0, -51.6), (33.3, 0.0), (359.99, 12.0), (-0.01, -0.01)];
        for (olon, olat) in observers {
            for (tlon, tlat) in targets {
                let view = compute_observer_view(
                    &GeodeticPosition::new(olon, olat, 0.0),
                    &GeodeticPosition::new(tlon, tlat, 420_000.0),
                )
                .unwrap();
                assert!((0.0..360.0).contains(&view.azimuth_deg), "{view:?}");
                assert!((0.0..=180.0).contains(&view.elevation_angle_deg), "{view:?}");
                assert!(view.range_m > 0.0);
            }
        }
    }

    #[test]
    fn test_non_finite_input_is_rejected() {
        let observer = GeodeticPosition::new(10.0, 20.0, 0.0);
        let target = GeodeticPosition::new(f64::INFINITY, 0.0, ISS_ALTITUDE_M);
        assert!(matches!(
            compute_observer_view(&observer, &target),
            Err(GeometryError::NonFinite { field: "longitude", .. })
        ));

        let observer = GeodeticPosition::new(f64::NAN, 10.0, 0.0);
        let target = GeodeticPosition::new(0.0, 0.0, ISS_ALTITUDE_M);
        assert!(matches!(
            compute_observer_view(&observer, &target),
            Err(GeometryError::NonFinite { .. })
        ));

        let target = GeodeticPosition::new(0.0, 0.0, f64::INFINITY);
        assert!(compute_observer_view(&GeodeticPosition::new(0.0, 0.0, 0.0), &target).is_err());
    }

    #[test]
    fn test_invalid_target_is_rejected() {
        let observer = GeodeticPosition::new(0.0, 0.0, 0.0);
        let target = GeodeticPosition::new(0.0, -95.0, ISS_ALTITUDE_M);
        assert_eq!(
            compute_observer_view(&observer, &target),
            Err(GeometryError::LatitudeOutOfRange(-95.0))
        );
    }
}
