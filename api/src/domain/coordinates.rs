//! Screen coordinate normalization
//!
//! Rows in the `screens` table carry their position in one of three shapes:
//! a Postgres-style point string `"(54.68, 25.27)"`, an object `{"x": .., "y": ..}`
//! or a `[lat, lng]` array. The shape is classified once when a row is read and
//! everything downstream works with [`LatLng`].

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;

static POINT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^,]+),\s*([^)]+)\)").expect("point pattern should compile"));

/// Leading decimal number; whatever follows it (units, `°`) is ignored
static NUMBER_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?")
        .expect("number pattern should compile")
});

/// A normalized position. Serializes as `[lat, lng]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// JSON value stored in the `coordinates` column on writes
    pub fn to_json(self) -> Value {
        serde_json::json!([self.lat, self.lng])
    }
}

impl From<[f64; 2]> for LatLng {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<LatLng> for [f64; 2] {
    fn from(point: LatLng) -> Self {
        [point.lat, point.lng]
    }
}

/// Raw coordinate shapes as they arrive from storage or the admin form
#[derive(Debug, Clone, PartialEq)]
pub enum RawCoordinates {
    /// `[lat, lng]`
    Pair(f64, f64),
    /// `{"x": lat, "y": lng}`
    Object { x: f64, y: f64 },
    /// `"(lat, lng)"`, possibly malformed
    Text(String),
    Unknown,
}

impl RawCoordinates {
    /// Classify a JSON value. Arrays are checked first, then objects, then strings.
    pub fn classify(value: &Value) -> Self {
        match value {
            Value::Array(items) => match items.as_slice() {
                [lat, lng] => match (number(lat), number(lng)) {
                    (Some(lat), Some(lng)) => RawCoordinates::Pair(lat, lng),
                    _ => RawCoordinates::Unknown,
                },
                _ => RawCoordinates::Unknown,
            },
            Value::Object(fields) => {
                let x = fields.get("x").and_then(number);
                let y = fields.get("y").and_then(number);
                match (x, y) {
                    (Some(x), Some(y)) => RawCoordinates::Object { x, y },
                    _ => RawCoordinates::Unknown,
                }
            }
            Value::String(text) => RawCoordinates::Text(text.clone()),
            _ => RawCoordinates::Unknown,
        }
    }

    /// Total: anything that cannot be read as a position becomes `(0, 0)`.
    pub fn normalize(&self) -> LatLng {
        match self {
            RawCoordinates::Pair(lat, lng) => LatLng::new(*lat, *lng),
            RawCoordinates::Object { x, y } => LatLng::new(*x, *y),
            RawCoordinates::Text(text) => parse_point(text).unwrap_or_default(),
            RawCoordinates::Unknown => LatLng::default(),
        }
    }
}

/// Classify and normalize in one step
pub fn normalize(value: &Value) -> LatLng {
    RawCoordinates::classify(value).normalize()
}

fn parse_point(text: &str) -> Option<LatLng> {
    let captures = POINT_PATTERN.captures(text)?;
    let lat = parse_component(&captures[1])?;
    let lng = parse_component(&captures[2])?;
    Some(LatLng::new(lat, lng))
}

/// JSON numbers, or strings that start with one
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(text) => parse_component(text),
        _ => None,
    }
}

fn parse_component(raw: &str) -> Option<f64> {
    let prefix = NUMBER_PREFIX.find(raw)?;
    prefix.as_str().trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
