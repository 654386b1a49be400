//! Great-circle distance between coordinates.
//!
//! The same metric orders route stops and decides proximity alerts, so both
//! features agree on what "near" means.

use geo::{Coord, Distance, Haversine, Point};

/// Distance in metres between two WGS84 coordinates.
///
/// Implementations must be symmetric and return `0.0` for identical inputs.
pub trait DistanceMetric {
    /// Return the distance from `from` to `to` in metres.
    fn distance_m(&self, from: Coord<f64>, to: Coord<f64>) -> f64;
}

/// Haversine great-circle distance on a spherical Earth of mean radius.
///
/// # Examples
/// ```
/// use pinroute_core::{DistanceMetric, HaversineMetric, lat_lng};
///
/// let metres = HaversineMetric.distance_m(lat_lng(0.0, 0.0), lat_lng(0.0, 1.0));
/// assert!((metres - 111_195.0).abs() < 10.0);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HaversineMetric;

impl DistanceMetric for HaversineMetric {
    fn distance_m(&self, from: Coord<f64>, to: Coord<f64>) -> f64 {
        Haversine.distance(Point::from(from), Point::from(to))
    }
}

impl<M> DistanceMetric for &M
where
    M: DistanceMetric + ?Sized,
{
    fn distance_m(&self, from: Coord<f64>, to: Coord<f64>) -> f64 {
        (**self).distance_m(from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::lat_lng;
    use rstest::rstest;

    #[rstest]
    fn identical_points_are_zero_apart() {
        let here = lat_lng(37.7749, -122.4194);
        assert!(HaversineMetric.distance_m(here, here).abs() < f64::EPSILON);
    }

    #[rstest]
    fn distance_is_symmetric() {
        let a = lat_lng(37.0, -122.0);
        let b = lat_lng(38.0, -123.0);
        let forward = HaversineMetric.distance_m(a, b);
        let backward = HaversineMetric.distance_m(b, a);
        assert!((forward - backward).abs() < 1.0e-6);
    }

    #[rstest]
    #[case(lat_lng(37.0, -122.0), lat_lng(37.001, -122.0), 111.0)]
    #[case(lat_lng(51.5007, -0.1246), lat_lng(40.6892, -74.0445), 5_574_840.0)]
    fn matches_known_distances(
        #[case] from: Coord<f64>,
        #[case] to: Coord<f64>,
        #[case] expected: f64,
    ) {
        let metres = HaversineMetric.distance_m(from, to);
        let tolerance = expected * 0.01;
        assert!(
            (metres - expected).abs() <= tolerance,
            "expected ~{expected} m, got {metres} m"
        );
    }
}
