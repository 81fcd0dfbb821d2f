use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

const EARTH_RADIUS_M: f64 = 6_371_000.0;

pub const DEFAULT_ROUTE_ID: &str = "route1";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance in meters.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        let phi1 = self.lat.to_radians();
        let phi2 = other.lat.to_radians();
        let dphi = (other.lat - self.lat).to_radians();
        let dlambda = (other.lon - self.lon).to_radians();
        let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

/// A preset flight path. The session never looks inside it; it is carried
/// along for the map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: String,
    pub label: String,
    pub waypoints: Vec<GeoPoint>,
}

impl Route {
    pub fn total_distance_m(&self) -> f64 {
        self.waypoints
            .windows(2)
            .map(|leg| leg[0].distance_to(&leg[1]))
            .sum()
    }

    /// Polyline colour for the map layer.
    pub fn line_color(fpv_mode: bool) -> &'static str {
        if fpv_mode {
            "yellow"
        } else {
            "blue"
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteCatalog {
    routes: Vec<Route>,
}

impl Default for RouteCatalog {
    fn default() -> Self {
        Self::presets()
    }
}

impl RouteCatalog {
    pub fn presets() -> Self {
        Self {
            routes: vec![
                Route {
                    id: "route1".into(),
                    label: "Route 1: Udarnaya 28 → Pervomaisky district".into(),
                    waypoints: vec![
                        GeoPoint::new(54.9788, 82.8869),
                        GeoPoint::new(55.0752, 82.9100),
                        GeoPoint::new(55.0850, 83.0100),
                    ],
                },
                Route {
                    id: "route2".into(),
                    label: "Route 2: Lenin Square → Zoo (Alternate)".into(),
                    waypoints: vec![
                        GeoPoint::new(55.0302, 82.9204),
                        GeoPoint::new(55.045, 82.915),
                        GeoPoint::new(55.0598, 82.8983),
                    ],
                },
            ],
        }
    }

    pub fn get(&self, id: &str) -> Result<&Route> {
        self.routes
            .iter()
            .find(|route| route.id.eq_ignore_ascii_case(id.trim()))
            .ok_or_else(|| anyhow!("unknown route: {id}"))
    }

    pub fn list(&self) -> &[Route] {
        &self.routes
    }

    /// Where the map opens: the first waypoint of the default route.
    pub fn map_center(&self) -> Option<GeoPoint> {
        self.get(DEFAULT_ROUTE_ID)
            .ok()
            .and_then(|route| route.waypoints.first().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_presets_by_id() {
        let catalog = RouteCatalog::presets();
        assert_eq!(catalog.list().len(), 2);
        assert_eq!(catalog.get("route2").unwrap().waypoints.len(), 3);
        assert_eq!(catalog.get("ROUTE1").unwrap().id, "route1");
        assert!(catalog.get("route9").is_err());
        assert_eq!(catalog.map_center(), Some(GeoPoint::new(54.9788, 82.8869)));
    }

    #[test]
    fn distance_sums_legs() {
        let catalog = RouteCatalog::presets();
        let route = catalog.get("route2").unwrap();
        let legs = route.waypoints[0].distance_to(&route.waypoints[1])
            + route.waypoints[1].distance_to(&route.waypoints[2]);
        assert!((route.total_distance_m() - legs).abs() < 1e-6);
        // Roughly 1.7 km + 2.0 km across central Novosibirsk.
        assert!(route.total_distance_m() > 3_000.0 && route.total_distance_m() < 4_500.0);
    }

    #[test]
    fn single_point_route_has_no_length() {
        let route = Route {
            id: "hover".into(),
            label: "Hover".into(),
            waypoints: vec![GeoPoint::new(55.0, 83.0)],
        };
        assert_eq!(route.total_distance_m(), 0.0);
        assert_eq!(Route::line_color(true), "yellow");
    }
}
