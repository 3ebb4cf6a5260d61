//! pgh-snowplow - Pittsburgh snow plow tracker
//!
//! Queries the City of Pittsburgh feature services for the plows positions
//! and route history.

mod config;
mod error;
pub mod sources;
mod tracker;

pub use config::{tools_default_address, Configs, Endpoints};
pub use error::PlowError;
pub use tracker::commands::{
    check, history, near, status, CheckOptions, CheckReport, HistoryOptions, HistoryReport,
    NearOptions, NearReport, StatusReport,
};
pub use tracker::distance::{distance, Unit};
pub use tracker::gpx::{write_route, Tracker};
pub use tracker::position::{Location, RoutePoint, VehicleRecord};
pub use tracker::report::time_ago;
