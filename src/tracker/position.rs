//! Position definitions

use geo::geometry::Point;
use time::OffsetDateTime;

/// Last reported position of a plow
#[derive(Clone, Debug, PartialEq)]
pub struct VehicleRecord {
    /// Vehicle name, eg.: PW-110
    pub id: String,
    /// Always UTC
    pub time: OffsetDateTime,
    /// x is the longitude, y the latitude
    pub coordinates: Point,
    pub speed: f64,
    pub heading: Option<f64>,
}

impl VehicleRecord {
    pub fn basic(id: &str, coordinates: Point, time: OffsetDateTime) -> Self {
        Self {
            id: id.to_string(),
            time,
            coordinates,
            speed: 0.0,
            heading: None,
        }
    }

    pub fn speed(mut self, speed: f64) -> Self {
        self.speed = speed;

        self
    }

    /// Moving plow, a zero speed means stopped
    pub fn is_active(&self) -> bool {
        self.speed > 0.0
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates.y()
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates.x()
    }
}

/// One GPS sample of a plow route
#[derive(Clone, Debug, PartialEq)]
pub struct RoutePoint {
    pub id: String,
    pub time: OffsetDateTime,
    pub coordinates: Point,
}

impl RoutePoint {
    pub fn basic(id: &str, coordinates: Point, time: OffsetDateTime) -> Self {
        Self {
            id: id.to_string(),
            time,
            coordinates,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates.y()
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates.x()
    }
}

/// Target of a `near` or `check` query
#[derive(Clone, Debug, PartialEq)]
pub struct Location {
    pub coordinates: Point,
    pub label: String,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64, label: &str) -> Self {
        Self {
            coordinates: Point::new(longitude, latitude),
            label: label.to_string(),
        }
    }

    /// Parse a `lat,lon` pair, eg.: `40.4406, -79.9959`
    pub fn parse_coordinates(input: &str) -> Option<Self> {
        let (lat, lon) = input.split_once(',')?;
        let lat = lat.trim().parse::<f64>().ok()?;
        let lon = lon.trim().parse::<f64>().ok()?;

        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return None;
        }

        Some(Self::new(lat, lon, input.trim()))
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates.y()
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates.x()
    }
}

#[cfg(test)]
mod tests {
    use super::Location;

    #[test]
    fn coordinates_input() {
        let loc = Location::parse_coordinates("40.4406, -79.9959").unwrap();
        assert_eq!(40.4406, loc.latitude());
        assert_eq!(-79.9959, loc.longitude());
        assert_eq!("40.4406, -79.9959", loc.label);

        assert_eq!(None, Location::parse_coordinates("123 Main St, Pittsburgh"));
        assert_eq!(None, Location::parse_coordinates("15213"));
        assert_eq!(None, Location::parse_coordinates("140.0,10.0"));
    }
}
