//! Text rendering of the reports

use std::fmt::{self, Display, Formatter};

use time::macros::format_description;
use time::OffsetDateTime;

use super::commands::{CheckReport, HistoryReport, NearReport, StatusReport};
use super::position::VehicleRecord;

/// Max points listed by the history report
pub const HISTORY_LIMIT: usize = 50;

/// Relative time, eg.: `5 mins ago`
pub fn time_ago(now: OffsetDateTime, time: OffsetDateTime) -> String {
    let secs = (now - time).whole_seconds();

    let plural = |n: i64, unit: &str| format!("{} {}{} ago", n, unit, if n == 1 { "" } else { "s" });

    match secs {
        s if s < 60 => "just now".to_string(),
        s if s < 3600 => plural(s / 60, "min"),
        s if s < 86400 => plural(s / 3600, "hour"),
        s => plural(s / 86400, "day"),
    }
}

fn moving(v: &VehicleRecord) -> &'static str {
    if v.is_active() {
        "Moving"
    } else {
        "Stopped"
    }
}

impl Display for StatusReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.vehicles.is_empty() {
            return if self.active_only {
                writeln!(f, "No active plows currently moving.")
            } else {
                writeln!(f, "No vehicle data available. There may not be an active snow event.")
            };
        }

        let kind = if self.active_only { "Active" } else { "All" };
        writeln!(f, "{} Snow Plows ({} vehicles):\n", kind, self.vehicles.len())?;

        for v in &self.vehicles {
            let speed = if v.speed > 0.0 {
                format!("{:.1} mph", v.speed)
            } else {
                "parked".to_string()
            };

            writeln!(f, "{}", v.id)?;
            writeln!(f, "  Status: {} ({})", moving(v), speed)?;
            writeln!(f, "  Location: {:.5}, {:.5}", v.latitude(), v.longitude())?;
            writeln!(f, "  Last update: {}", time_ago(self.now, v.time))?;
            writeln!(f)?;
        }

        Ok(())
    }
}

impl Display for NearReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Searching near: {} ({:.4}, {:.4})\n",
            self.location.label,
            self.location.latitude(),
            self.location.longitude()
        )?;

        if self.plows.is_empty() {
            return writeln!(f, "No plows found within {} miles.", self.radius);
        }

        writeln!(f, "Found {} plows within {} miles:\n", self.found, self.radius)?;

        for (v, dist) in &self.plows {
            writeln!(f, "{} - {:.2} miles away", v.id, dist)?;
            writeln!(f, "   {} ({:.1} mph)", moving(v), v.speed)?;
            writeln!(f, "   Updated: {}", time_ago(self.now, v.time))?;
            writeln!(f)?;
        }

        Ok(())
    }
}

impl Display for CheckReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Checking plow activity near: {}", self.location.label)?;
        writeln!(
            f,
            "Looking back {} hours, within {} feet\n",
            self.hours, self.radius
        )?;

        let (point, dist) = match self.most_recent() {
            Some(pass) => pass,
            None => {
                writeln!(f, "No plow activity found within {} feet of this address", self.radius)?;
                return writeln!(f, "   in the last {} hours.", self.hours);
            }
        };

        writeln!(f, "YES - Your street has been plowed!\n")?;
        writeln!(f, "   Most recent: {}", time_ago(self.now, point.time))?;
        writeln!(f, "   Plow: {}", point.id)?;
        writeln!(f, "   Distance: {:.0} feet from address", dist)?;

        let vehicles = self.vehicles();
        if vehicles.len() > 1 {
            writeln!(
                f,
                "\n   {} total passes by {} different plows:",
                self.passes.len(),
                vehicles.len()
            )?;
            for (id, count) in vehicles {
                writeln!(f, "     {}: {} passes", id, count)?;
            }
        }

        Ok(())
    }
}

impl Display for HistoryReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Route history for {} (last {} hours):\n", self.vehicle, self.hours)?;

        if self.points.is_empty() {
            writeln!(f, "No history found for {}.", self.vehicle)?;
            return writeln!(f, "The vehicle ID may be incorrect, or no data in this time window.");
        }

        writeln!(f, "Found {} GPS points:\n", self.points.len())?;

        let day = format_description!("[weekday], [month repr:long] [day]");
        let hour = format_description!("[hour]:[minute]");

        let mut current = None;
        for p in self.points.iter().take(HISTORY_LIMIT) {
            if current != Some(p.time.date()) {
                writeln!(f, "--- {} ---", p.time.format(day).map_err(|_| fmt::Error)?)?;
                current = Some(p.time.date());
            }

            writeln!(
                f,
                "  {}  ({:.5}, {:.5})",
                p.time.format(hour).map_err(|_| fmt::Error)?,
                p.latitude(),
                p.longitude()
            )?;
        }

        if self.points.len() > HISTORY_LIMIT {
            writeln!(f, "\n  ... and {} more points", self.points.len() - HISTORY_LIMIT)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use geo::Point;
    use time::macros::datetime;

    use super::time_ago;
    use crate::tracker::commands::{CheckReport, HistoryReport, StatusReport};
    use crate::{Location, RoutePoint, VehicleRecord};

    #[test]
    fn relative_times() {
        let now = datetime!(2024-01-02 12:00 UTC);

        assert_eq!("just now", time_ago(now, datetime!(2024-01-02 11:59:30 UTC)));
        assert_eq!("1 min ago", time_ago(now, datetime!(2024-01-02 11:59 UTC)));
        assert_eq!("45 mins ago", time_ago(now, datetime!(2024-01-02 11:15 UTC)));
        assert_eq!("1 hour ago", time_ago(now, datetime!(2024-01-02 10:30 UTC)));
        assert_eq!("2 days ago", time_ago(now, datetime!(2023-12-31 11:00 UTC)));
    }

    #[test]
    fn status_lines() {
        let now = datetime!(2024-01-02 12:00 UTC);
        let report = StatusReport {
            now,
            active_only: false,
            vehicles: vec![
                VehicleRecord::basic("PW-110", Point::new(-79.99, 40.44), datetime!(2024-01-02 11:55 UTC)).speed(12.0),
                VehicleRecord::basic("PW-111", Point::new(-79.95, 40.45), datetime!(2024-01-02 10:00 UTC)),
            ],
        };

        let text = report.to_string();
        assert!(text.starts_with("All Snow Plows (2 vehicles):"));
        assert!(text.contains("PW-110\n  Status: Moving (12.0 mph)\n  Location: 40.44000, -79.99000\n  Last update: 5 mins ago"));
        assert!(text.contains("  Status: Stopped (parked)"));

        let empty = StatusReport {
            now,
            active_only: true,
            vehicles: vec![],
        };
        assert_eq!("No active plows currently moving.\n", empty.to_string());
    }

    #[test]
    fn check_not_plowed() {
        let report = CheckReport {
            now: datetime!(2024-01-02 12:00 UTC),
            location: Location::new(40.44, -79.99, "123 Main St"),
            hours: 12,
            radius: 200.0,
            passes: vec![],
        };

        let text = report.to_string();
        assert!(text.contains("No plow activity found within 200 feet of this address"));
        assert!(!text.contains("YES"));
    }

    #[test]
    fn history_truncated() {
        let points = (0..60)
            .map(|i| {
                RoutePoint::basic(
                    "PW-110",
                    Point::new(-79.99, 40.44),
                    datetime!(2024-01-01 23:00 UTC) + time::Duration::minutes(i * 2),
                )
            })
            .collect();
        let report = HistoryReport {
            now: datetime!(2024-01-02 12:00 UTC),
            vehicle: "PW-110".to_string(),
            hours: 24,
            points,
        };

        let text = report.to_string();
        assert!(text.contains("Found 60 GPS points:"));
        assert!(text.contains("--- Monday, January 01 ---\n  23:00  (40.44000, -79.99000)"));
        assert!(text.contains("--- Tuesday, January 02 ---\n  00:00"));
        assert!(text.contains("... and 10 more points"));
    }
}
