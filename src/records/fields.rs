//! Typed field access over raw documents.
//!
//! Every accessor fails with [`FeedError::DataIntegrity`] naming the
//! document and field, so one bad document fails the whole page.

use crate::documents::{FieldValue, RawDocument};
use crate::error::{FeedError, Result};
use crate::types::{GeoPoint, Timestamp};

pub struct FieldReader<'a> {
    doc: &'a RawDocument,
}

impl<'a> FieldReader<'a> {
    pub fn new(doc: &'a RawDocument) -> Self {
        Self { doc }
    }

    pub fn key(&self) -> &'a str {
        &self.doc.key
    }

    fn fail(&self, field: &str, reason: impl std::fmt::Display) -> FeedError {
        FeedError::data_integrity(&self.doc.key, format!("field {}: {}", field, reason))
    }

    fn required(&self, field: &str) -> Result<&'a FieldValue> {
        self.doc
            .get(field)
            .ok_or_else(|| self.fail(field, "missing"))
    }

    fn optional(&self, field: &str) -> Option<&'a FieldValue> {
        match self.doc.get(field) {
            None | Some(FieldValue::Null) => None,
            Some(value) => Some(value),
        }
    }

    fn expect_string(&self, field: &str, value: &'a FieldValue) -> Result<String> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                self.fail(field, format!("expected string, found {}", value.type_name()))
            })
    }

    pub fn string(&self, field: &str) -> Result<String> {
        let value = self.required(field)?;
        self.expect_string(field, value)
    }

    /// A string that may be absent or null; absent reads as empty.
    pub fn string_or_default(&self, field: &str) -> Result<String> {
        match self.optional(field) {
            Some(value) => self.expect_string(field, value),
            None => Ok(String::new()),
        }
    }

    /// An array of strings that may be absent or null.
    pub fn string_list_or_default(&self, field: &str) -> Result<Vec<String>> {
        match self.optional(field) {
            Some(FieldValue::Array(items)) => items
                .iter()
                .map(|item| self.expect_string(field, item))
                .collect(),
            Some(other) => Err(self.fail(
                field,
                format!("expected array, found {}", other.type_name()),
            )),
            None => Ok(Vec::new()),
        }
    }

    /// A native store timestamp converted to a [`Timestamp`].
    pub fn timestamp(&self, field: &str) -> Result<Timestamp> {
        match self.required(field)? {
            FieldValue::Timestamp(native) => native
                .to_timestamp()
                .ok_or_else(|| self.fail(field, format!("timestamp out of range: {:?}", native))),
            other => Err(self.fail(
                field,
                format!("expected timestamp, found {}", other.type_name()),
            )),
        }
    }

    /// A combined `[latitude, longitude]` array split into a [`GeoPoint`].
    pub fn lat_long(&self, field: &str) -> Result<GeoPoint> {
        let items = match self.required(field)? {
            FieldValue::Array(items) => items,
            other => {
                return Err(self.fail(field, format!("expected array, found {}", other.type_name())))
            }
        };
        if items.len() != 2 {
            return Err(self.fail(field, format!("expected 2 elements, found {}", items.len())));
        }
        let component = |value: &FieldValue| {
            value
                .as_f64()
                .ok_or_else(|| {
                    self.fail(field, format!("expected number, found {}", value.type_name()))
                })
        };
        let point = GeoPoint::new(component(&items[0])?, component(&items[1])?);
        if !point.is_valid() {
            return Err(self.fail(
                field,
                format!("coordinates out of range: {}, {}", point.latitude, point.longitude),
            ));
        }
        Ok(point)
    }
}
