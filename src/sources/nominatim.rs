//! Nominatim / OpenStreetMap geocoder
//!
//! Free text queries are scoped to Pittsburgh: bare ZIP codes get the state,
//! anything without a place hint gets the city, and the search is biased to a
//! viewbox around the city.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use serde_json::Value;

use super::arcgis::USER_AGENT;
use super::Geocoder;
use crate::{Location, PlowError};

pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Allegheny county bounds, `left,top,right,bottom`
const PITTSBURGH_VIEWBOX: &str = "-80.36,40.67,-79.69,40.19";

pub struct Nominatim {
    client: Client,
    base_url: String,
}

impl Nominatim {
    pub fn new(base_url: &str) -> Result<Self, PlowError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| PlowError::Geocoder {
                query: String::new(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }
}

impl Geocoder for Nominatim {
    fn geocode(&self, query: &str) -> Result<Option<Location>, PlowError> {
        let scoped = scope_query(query);
        debug!("geocoding `{}`", scoped);

        let failed = |e: reqwest::Error| PlowError::Geocoder {
            query: query.to_string(),
            reason: e.to_string(),
        };

        let body: Value = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", scoped.as_str()),
                ("format", "json"),
                ("limit", "1"),
                ("countrycodes", "us"),
                ("viewbox", PITTSBURGH_VIEWBOX),
            ])
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.json())
            .map_err(failed)?;

        Ok(parse_response(&body, query))
    }
}

/// Add the Pittsburgh context the query lacks
pub fn scope_query(query: &str) -> String {
    let query = query.trim();

    if query.len() == 5 && query.chars().all(|c| c.is_ascii_digit()) {
        return format!("{}, PA", query);
    }

    let lower = query.to_lowercase();
    let has_place = lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|w| w == "pa" || w == "pennsylvania" || w == "pittsburgh");

    if has_place || query.contains(',') {
        query.to_string()
    } else {
        format!("{}, Pittsburgh, PA", query)
    }
}

/// First match of the result array, `lat`/`lon` come as strings
fn parse_response(body: &Value, query: &str) -> Option<Location> {
    let first = body.as_array()?.first()?;

    let coordinate = |key: &str| match &first[key] {
        Value::String(s) => s.parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };
    let lat = coordinate("lat")?;
    let lon = coordinate("lon")?;

    let label = first["display_name"].as_str().unwrap_or(query);

    Some(Location::new(lat, lon, label))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{parse_response, scope_query};

    #[test]
    fn scoping() {
        assert_eq!("15213, PA", scope_query("15213"));
        assert_eq!("Squirrel Hill, Pittsburgh, PA", scope_query("Squirrel Hill"));
        assert_eq!("Panther Hollow, Pittsburgh, PA", scope_query("Panther Hollow"));
        assert_eq!("123 Main St, Pittsburgh", scope_query("123 Main St, Pittsburgh"));
        assert_eq!("Downtown Pittsburgh", scope_query(" Downtown Pittsburgh "));
        assert_eq!("5000 Forbes Ave PA", scope_query("5000 Forbes Ave PA"));
    }

    #[test]
    fn first_result() {
        let body = json!([
            { "lat": "40.4406", "lon": "-79.9959", "display_name": "Pittsburgh, Allegheny County" },
            { "lat": "41.0", "lon": "-80.0" },
        ]);

        let loc = parse_response(&body, "Downtown").unwrap();
        assert_eq!(40.4406, loc.latitude());
        assert_eq!(-79.9959, loc.longitude());
        assert_eq!("Pittsburgh, Allegheny County", loc.label);
    }

    #[test]
    fn no_match() {
        assert_eq!(None, parse_response(&json!([]), "Nowhere"));
        assert_eq!(None, parse_response(&json!({"error": "bad"}), "Nowhere"));
        assert_eq!(None, parse_response(&json!([{ "lat": "x", "lon": "1" }]), "Nowhere"));
    }

    #[test]
    fn label_defaults_to_query() {
        let loc = parse_response(&json!([{ "lat": 40.0, "lon": -80.0 }]), "Shadyside").unwrap();
        assert_eq!("Shadyside", loc.label);
    }
}
