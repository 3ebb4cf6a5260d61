//! Remote sources API

use time::OffsetDateTime;

use crate::{Location, PlowError, RoutePoint, VehicleRecord};

/// Plow positions source
pub trait PlowSource {
    /// Fetch the last known position of every vehicle
    fn vehicles(&mut self) -> Result<Vec<VehicleRecord>, PlowError>;

    /// Fetch the route points recorded since `start`, optionally of a single vehicle
    fn route_history(
        &mut self,
        start: OffsetDateTime,
        vehicle: Option<&str>,
    ) -> Result<Vec<RoutePoint>, PlowError>;
}

/// Free text to coordinates resolver
pub trait Geocoder {
    /// `Ok(None)` when the provider has no match
    fn geocode(&self, query: &str) -> Result<Option<Location>, PlowError>;
}

mod arcgis;
mod nominatim;

pub use arcgis::{ArcGisSource, FeatureQuery, HISTORY_URL, VEHICLES_URL};
pub use nominatim::{Nominatim, NOMINATIM_URL};
