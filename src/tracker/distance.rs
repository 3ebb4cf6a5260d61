//! Great-circle distances

use geo::geometry::Point;
use geo::HaversineDistance;

const METERS_PER_MILE: f64 = 1609.344;
const METERS_PER_FOOT: f64 = 0.3048;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Unit {
    Miles,
    Feet,
}

impl Unit {
    fn meters(&self) -> f64 {
        match self {
            Unit::Miles => METERS_PER_MILE,
            Unit::Feet => METERS_PER_FOOT,
        }
    }
}

/// Haversine distance between two points, x as longitude
pub fn distance(a: &Point, b: &Point, unit: Unit) -> f64 {
    a.haversine_distance(b) / unit.meters()
}

#[cfg(test)]
mod tests {
    use geo::geometry::Point;

    use super::{distance, Unit};

    #[test]
    fn same_point() {
        let p = Point::new(-79.9959, 40.4406);
        assert_eq!(0.0, distance(&p, &p, Unit::Miles));
        assert_eq!(0.0, distance(&p, &p, Unit::Feet));
    }

    #[test]
    fn units_agree() {
        // Downtown to Oakland, roughly 3 miles
        let downtown = Point::new(-79.9959, 40.4406);
        let oakland = Point::new(-79.9533, 40.4443);

        let miles = distance(&downtown, &oakland, Unit::Miles);
        let feet = distance(&downtown, &oakland, Unit::Feet);

        assert!(miles > 2.0 && miles < 3.0, "{}", miles);
        assert!((feet / 5280.0 - miles).abs() < 1e-9);
    }

    #[test]
    fn one_degree_of_latitude() {
        let a = Point::new(-80.0, 40.0);
        let b = Point::new(-80.0, 41.0);

        let miles = distance(&a, &b, Unit::Miles);
        assert!((miles - 69.1).abs() < 0.1, "{}", miles);
    }
}
