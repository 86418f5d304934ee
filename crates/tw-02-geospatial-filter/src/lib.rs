//! # Geospatial Filter Subsystem (tw-02)
//!
//! Converts between well-known text, the UN/LOCODE coded-location table and
//! `geo` geometries, and provides the union/intersection operations the
//! subscription manager uses for matching.
//!
//! ## Rules
//!
//! | Input | Result |
//! |-------|--------|
//! | WKT only | parsed geometry |
//! | code only | 1 km coverage circle, 64 vertices |
//! | both | union of the two |
//! | neither | no geometry |
//! | malformed WKT or unknown code | `GeoError` (validation) |
//!
//! Indexing beyond pairwise intersection is out of scope.

pub mod domain;
pub mod service;

pub use domain::{
    coverage_circle, intersects, parse_coordinate, parse_wkt, to_wkt, union, CodedLocation,
    CodedLocationTable, GeoError, COVERAGE_POINTS, COVERAGE_RADIUS_METERS,
};
pub use geo::Geometry;
pub use service::GeospatialFilter;
