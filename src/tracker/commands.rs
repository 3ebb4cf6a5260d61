//! Query pipelines
//!
//! Each command fetches fresh data, filters and sorts it into a report. The
//! current time is an input so the same remote data always yields the same
//! report.

use std::collections::BTreeMap;

use log::debug;
use time::{Duration, OffsetDateTime, PrimitiveDateTime};

use super::distance::{distance, Unit};
use super::position::{Location, RoutePoint, VehicleRecord};
use crate::sources::{Geocoder, PlowSource};
use crate::PlowError;

#[derive(Clone, Debug, PartialEq)]
pub struct NearOptions {
    /// Search radius in miles
    pub radius: f64,
    pub limit: usize,
}

impl Default for NearOptions {
    fn default() -> Self {
        Self {
            radius: 2.0,
            limit: 10,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CheckOptions {
    pub hours: u32,
    /// Proximity in feet
    pub radius: f64,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            hours: 12,
            radius: 200.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HistoryOptions {
    pub hours: u32,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self { hours: 6 }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StatusReport {
    pub now: OffsetDateTime,
    pub active_only: bool,
    /// Most recent update first
    pub vehicles: Vec<VehicleRecord>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NearReport {
    pub now: OffsetDateTime,
    pub location: Location,
    pub radius: f64,
    /// Plows within the radius, before the limit
    pub found: usize,
    /// Closest first, with the distance in miles
    pub plows: Vec<(VehicleRecord, f64)>,
}

/// Route points passing close to an address
///
/// Any sample within the radius counts as a pass. Sparse GPS sampling may
/// miss a plow that drove by between two samples.
#[derive(Clone, Debug, PartialEq)]
pub struct CheckReport {
    pub now: OffsetDateTime,
    pub location: Location,
    pub hours: u32,
    pub radius: f64,
    /// Most recent first, with the distance in feet
    pub passes: Vec<(RoutePoint, f64)>,
}

impl CheckReport {
    pub fn is_plowed(&self) -> bool {
        !self.passes.is_empty()
    }

    pub fn most_recent(&self) -> Option<&(RoutePoint, f64)> {
        self.passes.first()
    }

    /// Passes count by vehicle
    pub fn vehicles(&self) -> BTreeMap<&str, usize> {
        let mut vehicles = BTreeMap::new();
        for (point, _) in &self.passes {
            *vehicles.entry(point.id.as_str()).or_insert(0) += 1;
        }

        vehicles
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HistoryReport {
    pub now: OffsetDateTime,
    pub vehicle: String,
    pub hours: u32,
    /// Oldest first
    pub points: Vec<RoutePoint>,
}

/// Current position of every plow, or only the moving ones
pub fn status<S>(source: &mut S, active_only: bool, now: OffsetDateTime) -> Result<StatusReport, PlowError>
where
    S: PlowSource,
{
    let mut vehicles = source.vehicles()?;

    if active_only {
        vehicles.retain(|v| v.is_active());
    }

    vehicles.sort_by(|a, b| b.time.cmp(&a.time).then_with(|| a.id.cmp(&b.id)));

    Ok(StatusReport {
        now,
        active_only,
        vehicles,
    })
}

/// Plows around a location, closest first
///
/// The location is a `lat,lon` pair, a current vehicle id or anything the
/// geocoder can resolve. Vehicle ids match exactly, like in `history`.
pub fn near<S, G>(
    source: &mut S,
    geocoder: &G,
    query: &str,
    options: &NearOptions,
    now: OffsetDateTime,
) -> Result<NearReport, PlowError>
where
    S: PlowSource,
    G: Geocoder,
{
    let direct = Location::parse_coordinates(query);

    let vehicles = source.vehicles()?;

    let (location, reference) = match direct {
        Some(loc) => (loc, None),
        None => match vehicles.iter().find(|v| v.id == query.trim()) {
            Some(v) => (
                Location {
                    coordinates: v.coordinates,
                    label: v.id.clone(),
                },
                Some(v.id.clone()),
            ),
            None => (resolve(geocoder, query)?, None),
        },
    };
    debug!("searching near {:?}", location);

    let mut plows: Vec<(VehicleRecord, f64)> = vehicles
        .into_iter()
        .filter(|v| Some(&v.id) != reference.as_ref())
        .map(|v| {
            let dist = distance(&location.coordinates, &v.coordinates, Unit::Miles);
            (v, dist)
        })
        .filter(|(_, dist)| *dist <= options.radius)
        .collect();

    plows.sort_by(|(va, da), (vb, db)| da.total_cmp(db).then_with(|| va.id.cmp(&vb.id)));

    let found = plows.len();
    plows.truncate(options.limit);

    Ok(NearReport {
        now,
        location,
        radius: options.radius,
        found,
        plows,
    })
}

/// Has any plow passed close to the address lately?
///
/// Without `address` the configured default one is used.
pub fn check<S, G>(
    source: &mut S,
    geocoder: &G,
    address: Option<&str>,
    default_address: Option<&str>,
    options: &CheckOptions,
    now: OffsetDateTime,
) -> Result<CheckReport, PlowError>
where
    S: PlowSource,
    G: Geocoder,
{
    let address = address
        .or(default_address)
        .filter(|a| !a.trim().is_empty())
        .ok_or(PlowError::MissingAddress)?;

    let location = match Location::parse_coordinates(address) {
        Some(loc) => loc,
        None => resolve(geocoder, address)?,
    };

    let start = window_start(now, options.hours);
    let points = source.route_history(start, None)?;
    debug!("{} route points since {}", points.len(), start);

    let mut passes: Vec<(RoutePoint, f64)> = points
        .into_iter()
        .filter(|p| start <= p.time && p.time <= now)
        .map(|p| {
            let dist = distance(&location.coordinates, &p.coordinates, Unit::Feet);
            (p, dist)
        })
        .filter(|(_, dist)| *dist <= options.radius)
        .collect();

    passes.sort_by(|(pa, da), (pb, db)| {
        pb.time
            .cmp(&pa.time)
            .then_with(|| da.total_cmp(db))
            .then_with(|| pa.id.cmp(&pb.id))
    });

    Ok(CheckReport {
        now,
        location,
        hours: options.hours,
        radius: options.radius,
        passes,
    })
}

/// Route of a single plow over the last hours
pub fn history<S>(
    source: &mut S,
    vehicle: &str,
    options: &HistoryOptions,
    now: OffsetDateTime,
) -> Result<HistoryReport, PlowError>
where
    S: PlowSource,
{
    let vehicle = vehicle.trim();
    let start = window_start(now, options.hours);

    let mut points = source.route_history(start, Some(vehicle))?;
    points.retain(|p| p.id == vehicle && start <= p.time && p.time <= now);
    points.sort_by_key(|p| p.time);

    Ok(HistoryReport {
        now,
        vehicle: vehicle.to_string(),
        hours: options.hours,
        points,
    })
}

/// Start of the last `hours` window, the earliest representable time when
/// the window goes further back
fn window_start(now: OffsetDateTime, hours: u32) -> OffsetDateTime {
    now.checked_sub(Duration::hours(hours.into()))
        .unwrap_or_else(|| PrimitiveDateTime::MIN.assume_utc())
}

fn resolve<G>(geocoder: &G, query: &str) -> Result<Location, PlowError>
where
    G: Geocoder,
{
    geocoder
        .geocode(query)?
        .ok_or_else(|| PlowError::Unresolved(query.to_string()))
}
