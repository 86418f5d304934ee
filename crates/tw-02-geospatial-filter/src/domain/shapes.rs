//! # Shapes
//!
//! WKT conversion, coverage circles and the set operations used for
//! subscription matching. Coordinates are WGS84 with x = longitude and
//! y = latitude.

use crate::domain::errors::GeoError;
use geo::{
    BooleanOps, Coord, Geometry, GeometryCollection, HaversineDestination, Intersects, LineString,
    MultiPolygon, Point, Polygon,
};
use wkt::{ToWkt, TryFromWkt};

/// Radius of the circle materialised around a coded location.
pub const COVERAGE_RADIUS_METERS: f64 = 1_000.0;

/// Vertices used to approximate a coverage circle.
pub const COVERAGE_POINTS: usize = 64;

/// Parse a WKT string.
pub fn parse_wkt(raw: &str) -> Result<Geometry<f64>, GeoError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(GeoError::MalformedWkt("empty geometry".to_string()));
    }
    Geometry::<f64>::try_from_wkt_str(raw).map_err(|e| GeoError::MalformedWkt(e.to_string()))
}

/// Render a geometry as WKT.
pub fn to_wkt(geometry: &Geometry<f64>) -> String {
    geometry.wkt_string()
}

/// Approximate a circle of `radius_m` metres around (`lat`, `lon`).
///
/// Vertices are placed at equal bearings using haversine destination points,
/// so the radius holds in metres at any latitude.
pub fn coverage_circle(lat: f64, lon: f64, radius_m: f64, points: usize) -> Polygon<f64> {
    let centre = Point::new(lon, lat);
    let points = points.max(3);
    let ring: Vec<Coord<f64>> = (0..points)
        .map(|i| {
            let bearing = 360.0 * i as f64 / points as f64;
            centre.haversine_destination(bearing, radius_m).0
        })
        .collect();
    Polygon::new(LineString::from(ring), vec![])
}

/// Set union of two geometries.
///
/// Polygonal operands are merged with a boolean union. Anything else is
/// returned as a collection holding both operands, which behaves as a union
/// for intersection tests.
pub fn union(a: Geometry<f64>, b: Geometry<f64>) -> Geometry<f64> {
    match (polygonal(&a), polygonal(&b)) {
        (Some(left), Some(right)) => {
            let merged = left.union(&right);
            if merged.0.len() == 1 {
                merged
                    .0
                    .into_iter()
                    .next()
                    .map(Geometry::Polygon)
                    .unwrap_or(Geometry::MultiPolygon(MultiPolygon(vec![])))
            } else {
                Geometry::MultiPolygon(merged)
            }
        }
        _ => Geometry::GeometryCollection(GeometryCollection(vec![a, b])),
    }
}

/// Whether two geometries share at least one point.
pub fn intersects(a: &Geometry<f64>, b: &Geometry<f64>) -> bool {
    a.intersects(b)
}

fn polygonal(geometry: &Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(p) => Some(MultiPolygon(vec![p.clone()])),
        Geometry::MultiPolygon(mp) => Some(mp.clone()),
        Geometry::Rect(r) => Some(MultiPolygon(vec![r.to_polygon()])),
        Geometry::Triangle(t) => Some(MultiPolygon(vec![t.to_polygon()])),
        _ => None,
    }
}
