//! # Coded Locations (UN/LOCODE)
//!
//! Table rows carry coordinates such as `5609N 01013E`: degrees followed by
//! two minute digits and a direction letter. `S` and `W` make the value
//! negative.

use crate::domain::errors::GeoError;
use crate::domain::shapes::{coverage_circle, COVERAGE_POINTS, COVERAGE_RADIUS_METERS};
use geo::Polygon;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Table shipped with the crate.
const BUILTIN_TABLE: &str = include_str!("../../data/unlocodes.json");

/// Immutable table entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CodedLocation {
    /// Country plus location code, e.g. `DKAAR`.
    pub code: String,
    pub latitude: f64,
    pub longitude: f64,
    /// UN/LOCODE status code, e.g. `AI`.
    pub status: Option<String>,
}

impl CodedLocation {
    /// Coverage circle around the location (1 km radius, 64 points).
    pub fn coverage(&self) -> Polygon<f64> {
        coverage_circle(
            self.latitude,
            self.longitude,
            COVERAGE_RADIUS_METERS,
            COVERAGE_POINTS,
        )
    }
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(rename = "Country", default)]
    country: String,
    #[serde(rename = "Location", default)]
    location: String,
    #[serde(rename = "Coordinates", default)]
    coordinates: Option<String>,
    #[serde(rename = "Status", default)]
    status: Option<String>,
}

/// Lookup table keyed by code.
#[derive(Debug, Clone, Default)]
pub struct CodedLocationTable {
    entries: HashMap<String, CodedLocation>,
}

impl CodedLocationTable {
    /// The table compiled into the crate.
    pub fn builtin() -> Result<Self, GeoError> {
        Self::from_json_str(BUILTIN_TABLE)
    }

    /// Load a table from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GeoError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| GeoError::TableLoad(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&raw)
    }

    /// Parse a JSON array of table rows.
    ///
    /// Rows without two well-formed coordinates are skipped.
    pub fn from_json_str(raw: &str) -> Result<Self, GeoError> {
        let rows: Vec<RawEntry> =
            serde_json::from_str(raw).map_err(|e| GeoError::TableLoad(e.to_string()))?;

        let mut entries = HashMap::with_capacity(rows.len());
        let mut skipped = 0usize;
        for row in rows {
            match parse_row(&row) {
                Some(location) => {
                    entries.insert(location.code.clone(), location);
                }
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            tracing::debug!(skipped, loaded = entries.len(), "Skipped UN/LOCODE rows without coordinates");
        }
        Ok(Self { entries })
    }

    /// Look up a code; case-insensitive, whitespace ignored.
    pub fn get(&self, code: &str) -> Option<&CodedLocation> {
        let key: String = code
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase();
        self.entries.get(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_row(row: &RawEntry) -> Option<CodedLocation> {
    let coordinates = row.coordinates.as_deref()?.trim();
    if coordinates.is_empty() {
        return None;
    }
    let mut parts = coordinates.split_whitespace();
    let (lat, lon) = (parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let latitude = parse_coordinate(lat, 'S').ok()?;
    let longitude = parse_coordinate(lon, 'W').ok()?;
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return None;
    }
    Some(CodedLocation {
        code: format!("{}{}", row.country.trim(), row.location.trim()).to_uppercase(),
        latitude,
        longitude,
        status: row.status.clone().filter(|s| !s.trim().is_empty()),
    })
}

/// Parse a `DDDMM[NSEW]` coordinate into decimal degrees.
///
/// The final character is the direction and the two before it are minutes;
/// everything before that is degrees. Minutes are arc minutes, so `5630N`
/// is 56.5 and not 56.30. `negative` is the direction letter that flips the
/// sign (`S` for latitude, `W` for longitude).
pub fn parse_coordinate(raw: &str, negative: char) -> Result<f64, GeoError> {
    let malformed = || GeoError::MalformedCoordinate(raw.to_string());
    let raw = raw.trim();
    if raw.len() < 4 || !raw.is_ascii() {
        return Err(malformed());
    }

    let (digits, direction) = raw.split_at(raw.len() - 1);
    let direction = direction
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase())
        .ok_or_else(malformed)?;
    if !matches!(direction, 'N' | 'S' | 'E' | 'W') {
        return Err(malformed());
    }

    let (degrees, minutes) = digits.split_at(digits.len() - 2);
    let degrees: u32 = degrees.parse().map_err(|_| malformed())?;
    let minutes: u32 = minutes.parse().map_err(|_| malformed())?;
    if minutes >= 60 {
        return Err(malformed());
    }

    let value = f64::from(degrees) + f64::from(minutes) / 60.0;
    Ok(if direction == negative.to_ascii_uppercase() {
        -value
    } else {
        value
    })
}
