//! Points of interest shown on the map and in the locations list.

use super::fields::FieldReader;
use super::Record;
use crate::documents::RawDocument;
use crate::error::Result;
use crate::types::{GeoPoint, Timestamp};
use serde::{Deserialize, Serialize};

/// A location record, newest first by `created_at`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Store-assigned key.
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Media reference for the list thumbnail.
    pub display_picture: String,
    /// Instagram handle.
    pub insta: String,
    pub created_at: Timestamp,
    pub categories: Vec<String>,
}

impl Location {
    pub fn coordinate(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }
}

impl Record for Location {
    const COLLECTION: &'static str = "locations";
    const ORDER_FIELD: &'static str = "created_at";

    fn key(&self) -> &str {
        &self.id
    }

    fn from_document(doc: &RawDocument) -> Result<Self> {
        let fields = FieldReader::new(doc);
        let point = fields.lat_long("latlong")?;

        Ok(Self {
            id: fields.key().to_string(),
            name: fields.string("name")?,
            latitude: point.latitude,
            longitude: point.longitude,
            display_picture: fields.string_or_default("display_picture")?,
            insta: fields.string_or_default("insta")?,
            created_at: fields.timestamp("created_at")?,
            categories: fields.string_list_or_default("categories")?,
        })
    }
}
