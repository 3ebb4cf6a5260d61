//! GPX export of a plow route

use std::collections::BTreeMap;
use std::io::Write;

use gpx::{Gpx, GpxVersion, Track, TrackSegment, Waypoint};

use super::position::RoutePoint;
use crate::PlowError;

pub struct Tracker {
    /// Vehicle name
    pub device: String,
    /// Max segment duration in minutes
    pub max_segment_duration: u8,
}

impl Tracker {
    pub fn new(device: &str) -> Self {
        Self {
            device: device.to_string(),
            max_segment_duration: 5,
        }
    }

    pub fn max_segment(&mut self, max: u8) -> &mut Self {
        self.max_segment_duration = max.max(1);

        self
    }

    /// Build the track of the route points, split in segments of
    /// `max_segment_duration` minutes
    pub fn build(&self, points: &[RoutePoint]) -> Track {
        let mut track = Track::new();
        track.name = Some(self.device.clone());
        track.description = Some(format!("Route of plow `{}`", self.device));
        track.source = Some("City of Pittsburgh snow plow tracker".to_string());

        let mut points: Vec<&RoutePoint> = points.iter().collect();
        points.sort_by_key(|p| p.time);

        let slot = i64::from(self.max_segment_duration) * 60;
        let mut segs: BTreeMap<i64, TrackSegment> = BTreeMap::new();

        for poi in points {
            let key = poi.time.unix_timestamp().div_euclid(slot);

            let tseg = segs.entry(key).or_insert_with(TrackSegment::new);

            let mut wp = Waypoint::new(poi.coordinates);
            wp.time = Some(poi.time.into());

            tseg.points.push(wp);
        }

        track.segments = segs.into_values().collect();

        track
    }
}

/// Write the route as a GPX 1.1 document, with segments of `segment` minutes
pub fn write_route<W>(device: &str, points: &[RoutePoint], segment: u8, mut writer: W) -> Result<(), PlowError>
where
    W: Write,
{
    let mut doc: Gpx = Default::default();
    doc.version = GpxVersion::Gpx11;
    doc.creator = Some("pgh-snowplow".to_string());
    doc.tracks = vec![Tracker::new(device).max_segment(segment).build(points)];

    gpx::write(&doc, &mut writer).map_err(|e| PlowError::Export(e.to_string()))?;
    writer.flush().map_err(|e| PlowError::Export(e.to_string()))
}

#[cfg(test)]
mod tests {
    use geo::Point;
    use time::macros::datetime;

    use super::{write_route, Tracker};
    use crate::RoutePoint;

    #[test]
    fn segments() {
        let p1 = RoutePoint::basic("PW-110", Point::new(-79.99, 40.44), datetime!(2024-01-01 5:00 UTC));
        let p2 = RoutePoint::basic("PW-110", Point::new(-79.98, 40.44), datetime!(2024-01-01 5:03 UTC));
        let p3 = RoutePoint::basic("PW-110", Point::new(-79.97, 40.44), datetime!(2024-01-01 5:07 UTC));

        let track = Tracker::new("PW-110").build(&[p3.clone(), p1.clone(), p2.clone()]);
        assert_eq!(Some("PW-110".to_string()), track.name);
        assert_eq!(2, track.segments.len());
        assert_eq!(2, track.segments[0].points.len());
        assert_eq!(p1.coordinates, track.segments[0].points[0].point());
        assert_eq!(Some(p1.time.into()), track.segments[0].points[0].time);
        assert_eq!(p3.coordinates, track.segments[1].points[0].point());

        let track = Tracker::new("PW-110").max_segment(10).build(&[p1, p2, p3]);
        assert_eq!(1, track.segments.len());
    }

    #[test]
    fn document() -> Result<(), String> {
        let points = vec![
            RoutePoint::basic("PW-110", Point::new(-79.99, 40.44), datetime!(2024-01-01 5:00 UTC)),
            RoutePoint::basic("PW-110", Point::new(-79.98, 40.44), datetime!(2024-01-01 5:07 UTC)),
        ];

        let mut out = vec![];
        write_route("PW-110", &points, 5, &mut out).map_err(|e| e.to_string())?;

        let xml = String::from_utf8(out).map_err(|e| e.to_string())?;
        assert!(xml.contains("<gpx"));
        assert!(xml.contains("<name>PW-110</name>"));
        assert!(xml.contains("40.44"));
        assert_eq!(2, xml.matches("<trkseg>").count());

        let mut out = vec![];
        write_route("PW-110", &points, 15, &mut out).map_err(|e| e.to_string())?;

        let xml = String::from_utf8(out).map_err(|e| e.to_string())?;
        assert_eq!(1, xml.matches("<trkseg>").count());

        Ok(())
    }
}
