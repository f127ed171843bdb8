//! Record and coordinate types
//!
//! - JobRecord: one listing as returned by the job-search API
//! - Coordinates: a resolved latitude/longitude pair

use serde_json::{Map, Value};

/// One job listing. The API decides the field set, so it is kept as a
/// JSON object rather than a fixed struct.
pub type JobRecord = Map<String, Value>;

/// Resolved position. Absence is expressed as `Option<Coordinates>`,
/// so latitude and longitude are always present together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Parse the string pair most place-search services return.
    pub fn parse(latitude: &str, longitude: &str) -> Option<Self> {
        let latitude = latitude.trim().parse::<f64>().ok()?;
        let longitude = longitude.trim().parse::<f64>().ok()?;
        if latitude.is_finite() && longitude.is_finite() {
            Some(Self { latitude, longitude })
        } else {
            None
        }
    }
}

/// Render a JSON value as a single CSV cell.
///
/// `null` becomes an empty cell, strings are written verbatim and
/// nested arrays/objects keep their compact JSON text.
pub fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
