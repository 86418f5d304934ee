//! # Geospatial Filter Service

use crate::domain::{parse_wkt, union, CodedLocationTable, GeoError};
use geo::Geometry;
use std::sync::Arc;

/// Turns subscription and query inputs into geometries.
#[derive(Debug, Clone)]
pub struct GeospatialFilter {
    locations: Arc<CodedLocationTable>,
}

impl GeospatialFilter {
    pub fn new(locations: Arc<CodedLocationTable>) -> Self {
        Self { locations }
    }

    /// Filter backed by the built-in UN/LOCODE table.
    pub fn with_builtin_table() -> Result<Self, GeoError> {
        Ok(Self::new(Arc::new(CodedLocationTable::builtin()?)))
    }

    /// The coded-location table in use.
    pub fn locations(&self) -> &CodedLocationTable {
        &self.locations
    }

    /// Build the geometry described by an optional WKT string and an
    /// optional UN/LOCODE.
    ///
    /// When both are given the result is their union. Returns `Ok(None)`
    /// when neither is given.
    pub fn parse_geometry(
        &self,
        wkt: Option<&str>,
        code: Option<&str>,
    ) -> Result<Option<Geometry<f64>>, GeoError> {
        let from_wkt = wkt
            .filter(|s| !s.trim().is_empty())
            .map(parse_wkt)
            .transpose()?;

        let from_code = code
            .filter(|s| !s.trim().is_empty())
            .map(|code| {
                self.locations
                    .get(code)
                    .map(|location| Geometry::Polygon(location.coverage()))
                    .ok_or_else(|| GeoError::UnknownLocation(code.to_string()))
            })
            .transpose()?;

        Ok(match (from_wkt, from_code) {
            (Some(a), Some(b)) => Some(union(a, b)),
            (a, b) => a.or(b),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::intersects;
    use geo::{Area, Point};

    fn filter() -> GeospatialFilter {
        GeospatialFilter::with_builtin_table().unwrap()
    }

    #[test]
    fn test_neither_input_yields_none() {
        assert!(filter().parse_geometry(None, None).unwrap().is_none());
        assert!(filter().parse_geometry(Some("  "), Some("")).unwrap().is_none());
    }

    #[test]
    fn test_code_only_yields_coverage_circle() {
        let f = filter();
        let geometry = f.parse_geometry(None, Some("DKAAR")).unwrap().unwrap();
        let aarhus = f.locations().get("DKAAR").unwrap();
        let centre = Geometry::Point(Point::new(aarhus.longitude, aarhus.latitude));
        assert!(intersects(&geometry, &centre));
        assert!(matches!(geometry, Geometry::Polygon(_)));
    }

    #[test]
    fn test_unknown_code_is_validation_error() {
        let err = filter().parse_geometry(None, Some("XXZZZ")).unwrap_err();
        assert_eq!(err, GeoError::UnknownLocation("XXZZZ".into()));
        assert_eq!(err.kind(), shared_types::ErrorKind::Validation);
    }

    #[test]
    fn test_malformed_wkt_is_validation_error() {
        let err = filter()
            .parse_geometry(Some("POLYGON((1 2"), Some("DKAAR"))
            .unwrap_err();
        assert!(matches!(err, GeoError::MalformedWkt(_)));
        assert_eq!(err.kind(), shared_types::ErrorKind::Validation);
    }

    #[test]
    fn test_wkt_and_code_are_unioned() {
        let f = filter();
        let far_square = "POLYGON((0 0, 1 0, 1 1, 0 1, 0 0))";
        let geometry = f
            .parse_geometry(Some(far_square), Some("DKCPH"))
            .unwrap()
            .unwrap();

        let copenhagen = f.locations().get("DKCPH").unwrap();
        let cph = Geometry::Point(Point::new(copenhagen.longitude, copenhagen.latitude));
        let inside_square = Geometry::Point(Point::new(0.5, 0.5));
        assert!(intersects(&geometry, &cph));
        assert!(intersects(&geometry, &inside_square));

        let circle_area = copenhagen.coverage().unsigned_area();
        match geometry {
            Geometry::MultiPolygon(mp) => {
                assert_eq!(mp.0.len(), 2);
                assert!((mp.unsigned_area() - (1.0 + circle_area)).abs() < 1e-6);
            }
            other => panic!("expected multipolygon, got {other:?}"),
        }
    }
}
