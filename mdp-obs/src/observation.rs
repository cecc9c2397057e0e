use serde::{Deserialize, Serialize};

/// A directional reading resolved for one query point: ocean current or wind.
///
/// `direction_deg` is in degrees as reported by the provider; `speed` is in the
/// provider's native unit (m/s for wind, cm/s or m/s for currents depending
/// on the grid service).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VectorObservation {
    pub direction_deg: f64,
    pub speed: f64,
}

impl VectorObservation {
    pub fn new(direction_deg: f64, speed: f64) -> Self {
        Self {
            direction_deg,
            speed,
        }
    }
}

/// A JSON field that providers emit either as a number or as a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumericField {
    Number(f64),
    Text(String),
}

impl NumericField {
    /// Finite numeric value, or `None` for text that is not a number.
    ///
    /// "NaN" and "inf" parse as floats but are treated as missing.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NumericField::Number(n) => Some(*n),
            NumericField::Text(s) => s.trim().parse::<f64>().ok(),
        }
        .filter(|v| v.is_finite())
    }
}

/// Read an optional provider field as a number. Absent, null and
/// non-numeric values all come back as `None`.
pub fn numeric(field: &Option<NumericField>) -> Option<f64> {
    field.as_ref().and_then(NumericField::as_f64)
}

/// Pick the candidate closest to (lat, lon) by Euclidean distance in degree
/// space. Ties keep the earliest candidate; candidates whose distance is not
/// finite are never picked.
pub fn nearest_by_distance<T, I>(candidates: I, lat: f64, lon: f64) -> Option<T>
where
    I: IntoIterator<Item = (f64, f64, T)>,
{
    let mut best_distance = f64::INFINITY;
    let mut best: Option<T> = None;
    for (candidate_lat, candidate_lon, item) in candidates {
        let distance = ((lat - candidate_lat).powi(2) + (lon - candidate_lon).powi(2)).sqrt();
        if distance < best_distance {
            best_distance = distance;
            best = Some(item);
        }
    }
    best
}
