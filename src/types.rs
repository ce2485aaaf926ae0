//! Core value types shared by the document layer and records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Microseconds since Unix epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn from_micros(micros: i64) -> Self {
        Timestamp(micros)
    }

    pub fn as_micros(self) -> i64 {
        self.0
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

/// Largest valid value for [`StoreTimestamp::nanoseconds`].
const MAX_NANOS: u32 = 999_999_999;

/// The document store's native temporal type.
///
/// Seconds since Unix epoch plus a sub-second nanosecond component, the
/// way document databases commonly persist instants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StoreTimestamp {
    pub seconds: i64,
    pub nanoseconds: u32,
}

impl StoreTimestamp {
    pub fn new(seconds: i64, nanoseconds: u32) -> Self {
        Self {
            seconds,
            nanoseconds,
        }
    }

    /// Build from a [`Timestamp`], splitting microseconds into seconds + nanos.
    pub fn from_timestamp(ts: Timestamp) -> Self {
        let seconds = ts.0.div_euclid(1_000_000);
        let micros = ts.0.rem_euclid(1_000_000) as u32;
        Self {
            seconds,
            nanoseconds: micros * 1_000,
        }
    }

    /// Convert to a [`Timestamp`]. Returns `None` if the nanosecond
    /// component is out of range or the value overflows.
    pub fn to_timestamp(self) -> Option<Timestamp> {
        if self.nanoseconds > MAX_NANOS {
            return None;
        }
        self.seconds
            .checked_mul(1_000_000)
            .and_then(|micros| micros.checked_add(i64::from(self.nanoseconds / 1_000)))
            .map(Timestamp)
    }
}

/// Sort direction of an ordered query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    #[default]
    Descending,
}

/// A latitude/longitude pair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite and within their ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}
