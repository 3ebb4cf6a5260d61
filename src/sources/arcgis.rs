//! ArcGIS feature service integration

use std::time::Duration;

use geo::geometry::Point;
use log::{debug, warn};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use time::format_description::well_known;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use super::PlowSource;
use crate::{PlowError, RoutePoint, VehicleRecord};

pub const VEHICLES_URL: &str = "https://services1.arcgis.com/YZCmUqbcsUpOKfj7/arcgis/rest/services/TEST_TEST/FeatureServer/0/query";
pub const HISTORY_URL: &str = "https://pghbridgis.pittsburghpa.gov/hosting/rest/services/Hosted/samsara_history/FeatureServer/0/query";

pub(crate) const USER_AGENT: &str = concat!("pgh-snowplow/", env!("CARGO_PKG_VERSION"));

const VEHICLE_FIELDS: &[&str] = &[
    "name",
    "gps_time",
    "gps_latitude",
    "gps_longitude",
    "gps_speedMilesPerHour",
    "gps_headingDegrees",
];
const HISTORY_FIELDS: &[&str] = &["name", "gps_time", "gps_latitude", "gps_longitude"];

/// Parameters of a feature service `query` call
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureQuery {
    /// SQL like `where` clause
    pub filter: String,
    pub fields: Vec<String>,
    pub count: u32,
    pub order_by: Option<String>,
}

impl FeatureQuery {
    pub fn new(fields: &[&str]) -> Self {
        Self {
            filter: "1=1".to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            count: 500,
            order_by: None,
        }
    }

    pub fn filter(mut self, filter: &str) -> Self {
        self.filter = filter.to_string();

        self
    }

    pub fn count(mut self, count: u32) -> Self {
        self.count = count;

        self
    }

    pub fn order_by(mut self, order: &str) -> Self {
        self.order_by = Some(order.to_string());

        self
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("where", self.filter.clone()),
            ("outFields", self.fields.join(",")),
            ("f", "json".to_string()),
            ("resultRecordCount", self.count.to_string()),
        ];

        if let Some(order) = &self.order_by {
            params.push(("orderByFields", order.clone()));
        }

        params
    }
}

/// Route history query of the last points since `start`
pub fn history_query(start: OffsetDateTime, vehicle: Option<&str>) -> Result<FeatureQuery, String> {
    let start = start
        .to_offset(UtcOffset::UTC)
        .format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second]+00:00"
        ))
        .map_err(|e| format!("Failed on format the start time: {}", e))?;

    let mut filter = format!("gps_time >= '{}'", start);
    if let Some(id) = vehicle {
        filter.push_str(&format!(" AND name = '{}'", id.replace('\'', "''")));
    }

    Ok(FeatureQuery::new(HISTORY_FIELDS)
        .filter(&filter)
        .count(2000)
        .order_by("gps_time DESC"))
}

/// Snow plow feature services
pub struct ArcGisSource {
    client: Client,
    vehicles_url: String,
    history_url: String,
}

impl ArcGisSource {
    pub fn new(vehicles_url: &str, history_url: &str, timeout: Duration) -> Result<Self, PlowError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| PlowError::endpoint("http client", e))?;

        Ok(Self {
            client,
            vehicles_url: vehicles_url.to_string(),
            history_url: history_url.to_string(),
        })
    }

    fn query(&self, endpoint: &str, url: &str, query: &FeatureQuery) -> Result<Vec<Value>, PlowError> {
        debug!("querying {} endpoint: where {}", endpoint, query.filter);

        let body = self
            .client
            .get(url)
            .query(&query.params())
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(|e| PlowError::endpoint(endpoint, e))?;

        let features = parse_features(endpoint, &body)?;
        debug!("{} features received from {}", features.len(), endpoint);

        Ok(features)
    }
}

impl PlowSource for ArcGisSource {
    fn vehicles(&mut self) -> Result<Vec<VehicleRecord>, PlowError> {
        let query = FeatureQuery::new(VEHICLE_FIELDS);
        let features = self.query("vehicles", &self.vehicles_url, &query)?;

        Ok(decode_all(features, to_vehicle))
    }

    fn route_history(
        &mut self,
        start: OffsetDateTime,
        vehicle: Option<&str>,
    ) -> Result<Vec<RoutePoint>, PlowError> {
        let query = history_query(start, vehicle).map_err(|e| PlowError::endpoint("history", e))?;
        let features = self.query("history", &self.history_url, &query)?;

        Ok(decode_all(features, to_route_point))
    }
}

#[derive(Debug, Default, Deserialize)]
struct FeatureSet {
    /// Decoded one by one, a bad record must not spoil the others
    #[serde(default)]
    features: Vec<Value>,
    error: Option<ServiceError>,
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    attributes: Attributes,
    geometry: Option<Geometry>,
}

#[derive(Debug, Default, Deserialize)]
struct Attributes {
    name: Option<Value>,
    gps_time: Option<Value>,
    gps_latitude: Option<f64>,
    gps_longitude: Option<f64>,
    #[serde(rename = "gps_speedMilesPerHour")]
    speed: Option<f64>,
    #[serde(rename = "gps_headingDegrees")]
    heading: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    x: Option<f64>,
    y: Option<f64>,
}

/// Decode the response body. Unreadable bodies are just empty
fn parse_features(endpoint: &str, body: &str) -> Result<Vec<Value>, PlowError> {
    let set = match serde_json::from_str::<FeatureSet>(body) {
        Ok(set) => set,
        Err(e) => {
            warn!("Malformed response from {}: {}", endpoint, e);
            return Ok(vec![]);
        }
    };

    if let Some(err) = set.error {
        return Err(PlowError::Service {
            endpoint: endpoint.to_string(),
            code: err.code,
            message: err.message,
        });
    }

    Ok(set.features)
}

fn decode_all<T>(features: Vec<Value>, decode: fn(&Feature) -> Result<T, String>) -> Vec<T> {
    features
        .into_iter()
        .enumerate()
        .filter_map(|(i, raw)| {
            let decoded = serde_json::from_value::<Feature>(raw)
                .map_err(|e| format!("Invalid feature: {}", e))
                .and_then(|f| decode(&f));

            match decoded {
                Ok(rec) => Some(rec),
                Err(e) => {
                    warn!("Skipping feature #{}: {}", i, e);
                    None
                }
            }
        })
        .collect()
}

fn to_vehicle(feature: &Feature) -> Result<VehicleRecord, String> {
    let (id, time, coordinates) = parse_common(feature)?;

    Ok(VehicleRecord {
        id,
        time,
        coordinates,
        speed: feature.attributes.speed.unwrap_or(0.0),
        heading: feature.attributes.heading,
    })
}

fn to_route_point(feature: &Feature) -> Result<RoutePoint, String> {
    let (id, time, coordinates) = parse_common(feature)?;

    Ok(RoutePoint {
        id,
        time,
        coordinates,
    })
}

fn parse_common(feature: &Feature) -> Result<(String, OffsetDateTime, Point), String> {
    let attr = &feature.attributes;

    let id = match &attr.name {
        Some(Value::String(n)) if !n.trim().is_empty() => Ok(n.trim().to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err("Name field not found"),
    }?;

    let geometry = feature.geometry.as_ref();
    let lat = attr
        .gps_latitude
        .or_else(|| geometry.and_then(|g| g.y))
        .ok_or("Latitude not found")?;
    let lng = attr
        .gps_longitude
        .or_else(|| geometry.and_then(|g| g.x))
        .ok_or("Longitude not found")?;

    let time = match &attr.gps_time {
        Some(tm) => parse_time(tm),
        None => Err("Time field not found".to_string()),
    }?;

    Ok((id, time, Point::new(lng, lat)))
}

/// `gps_time` comes either as epoch millis or as an ISO-8601 text
fn parse_time(raw: &Value) -> Result<OffsetDateTime, String> {
    let time = match raw {
        Value::Number(ms) => {
            let ms = ms.as_f64().ok_or("Invalid time number")?;
            from_millis(ms as i64)
        }
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(ms) => from_millis(ms),
                Err(_) => {
                    let s = s.replacen(' ', "T", 1);
                    OffsetDateTime::parse(&s, &well_known::Rfc3339)
                        .or_else(|_| OffsetDateTime::parse(&format!("{}Z", s), &well_known::Rfc3339))
                        .map_err(|e| format!("Failed on parse the time: {}", e))
                }
            }
        }
        _ => Err("Time field type not supported".to_string()),
    }?;

    Ok(time.to_offset(UtcOffset::UTC))
}

fn from_millis(ms: i64) -> Result<OffsetDateTime, String> {
    OffsetDateTime::from_unix_timestamp_nanos(ms as i128 * 1_000_000)
        .map_err(|e| format!("Failed on parse the time timestamp: {}", e))
}
