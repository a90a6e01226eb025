use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Largest accepted `|Δlat| * |Δlon|`, in square degrees.
pub const MAX_BBOX_AREA: f64 = 400.0;

/// Validated lat/lon rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lamin: f64,
    pub lomin: f64,
    pub lamax: f64,
    pub lomax: f64,
}

impl BoundingBox {
    /// Parses raw query values. Every coordinate must be a finite number and the
    /// covered area must not exceed [`MAX_BBOX_AREA`].
    pub fn parse(
        lamin: Option<&str>,
        lomin: Option<&str>,
        lamax: Option<&str>,
        lomax: Option<&str>,
    ) -> Result<Self, ValidationError> {
        Self::new(
            parse_coordinate(lamin, "lamin")?,
            parse_coordinate(lomin, "lomin")?,
            parse_coordinate(lamax, "lamax")?,
            parse_coordinate(lomax, "lomax")?,
        )
    }

    pub fn new(lamin: f64, lomin: f64, lamax: f64, lomax: f64) -> Result<Self, ValidationError> {
        for (name, value) in [
            ("lamin", lamin),
            ("lomin", lomin),
            ("lamax", lamax),
            ("lomax", lomax),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::InvalidCoordinate { name });
            }
        }

        let bbox = Self {
            lamin,
            lomin,
            lamax,
            lomax,
        };
        let area = bbox.area();
        if area > MAX_BBOX_AREA {
            return Err(ValidationError::BoundingBoxTooLarge {
                area,
                max: MAX_BBOX_AREA,
            });
        }
        Ok(bbox)
    }

    pub fn area(&self) -> f64 {
        ((self.lamax - self.lamin) * (self.lomax - self.lomin)).abs()
    }

    pub fn cache_key(&self) -> String {
        format!("bbox:{self}")
    }
}

impl Display for BoundingBox {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{},{},{}", self.lamin, self.lomin, self.lamax, self.lomax)
    }
}

fn parse_coordinate(raw: Option<&str>, name: &'static str) -> Result<f64, ValidationError> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| value.parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .ok_or(ValidationError::InvalidCoordinate { name })
}

/// One live state vector, normalised from the upstream positional array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aircraft {
    pub icao24: String,
    pub callsign: String,
    pub origin_country: Option<String>,
    pub time_position: Option<i64>,
    pub last_contact: Option<i64>,
    pub lon: f64,
    pub lat: f64,
    pub baro_altitude: Option<f64>,
    pub on_ground: Option<bool>,
    pub velocity: Option<f64>,
    pub true_track: Option<f64>,
    pub vertical_rate: Option<f64>,
    pub geo_altitude: Option<f64>,
    pub squawk: Option<String>,
    pub spi: Option<bool>,
    pub position_source: Option<i64>,
}

/// Airspace response payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirspaceSnapshot {
    pub time: Option<i64>,
    pub aircraft: Vec<Aircraft>,
}
