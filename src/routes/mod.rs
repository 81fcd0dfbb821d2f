pub mod catalog;

pub use catalog::{GeoPoint, Route, RouteCatalog, DEFAULT_ROUTE_ID};
