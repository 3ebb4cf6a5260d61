//! Plow positions, distances and query pipelines

pub mod commands;
pub mod distance;
pub mod gpx;
pub mod position;
pub mod report;
