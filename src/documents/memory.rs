//! In-process document store.

use super::store::{DocumentStore, PageQuery};
use super::value::{FieldValue, RawDocument};
use crate::error::{FeedError, Result};
use crate::types::SortDirection;
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

/// A [`DocumentStore`] held entirely in memory.
///
/// Query semantics follow the usual document-database rules: documents
/// without the order field are left out of ordered queries, and the
/// document key breaks ties in the query's direction.
pub struct MemoryDocumentStore {
    /// collection -> key -> document.
    collections: RwLock<HashMap<String, BTreeMap<String, RawDocument>>>,

    /// Number of queries and lookups served.
    round_trips: AtomicU64,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            round_trips: AtomicU64::new(0),
        }
    }

    /// Insert or replace a document.
    pub fn insert(&self, collection: &str, document: RawDocument) {
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .insert(document.key.clone(), document);
    }

    /// Remove a document, returning it if it existed.
    pub fn remove(&self, collection: &str, key: &str) -> Option<RawDocument> {
        self.collections
            .write()
            .get_mut(collection)
            .and_then(|docs| docs.remove(key))
    }

    /// Number of documents in a collection.
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    /// Queries and lookups served so far.
    pub fn round_trips(&self) -> u64 {
        self.round_trips.load(AtomicOrdering::SeqCst)
    }

    fn compare(
        a: (&FieldValue, &str),
        b: (&FieldValue, &str),
        direction: SortDirection,
    ) -> Ordering {
        let ord = a.0.total_cmp(b.0).then_with(|| a.1.cmp(b.1));
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn get_page(&self, query: &PageQuery) -> Result<Vec<RawDocument>> {
        self.round_trips.fetch_add(1, AtomicOrdering::SeqCst);

        let anchor = match &query.start_after {
            Some(doc) => {
                let value = doc.get(&query.order_field).ok_or_else(|| {
                    FeedError::InvalidArgument(format!(
                        "anchor {} has no {} field",
                        doc.key, query.order_field
                    ))
                })?;
                Some((value.clone(), doc.key.clone()))
            }
            None => None,
        };

        let collections = self.collections.read();
        let Some(docs) = collections.get(&query.collection) else {
            return Ok(Vec::new());
        };

        let mut ordered: Vec<(&FieldValue, &RawDocument)> = docs
            .values()
            .filter_map(|doc| doc.get(&query.order_field).map(|value| (value, doc)))
            .filter(|(value, doc)| match &anchor {
                Some((anchor_value, anchor_key)) => {
                    Self::compare(
                        (*value, doc.key.as_str()),
                        (anchor_value, anchor_key.as_str()),
                        query.direction,
                    ) == Ordering::Greater
                }
                None => true,
            })
            .collect();

        ordered.sort_by(|a, b| {
            Self::compare(
                (a.0, a.1.key.as_str()),
                (b.0, b.1.key.as_str()),
                query.direction,
            )
        });

        Ok(ordered
            .into_iter()
            .take(query.limit)
            .map(|(_, doc)| doc.clone())
            .collect())
    }

    fn resolve_document(&self, collection: &str, key: &str) -> Result<Option<RawDocument>> {
        self.round_trips.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(self
            .collections
            .read()
            .get(collection)
            .and_then(|docs| docs.get(key))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(
        start_after: Option<RawDocument>,
        direction: SortDirection,
        limit: usize,
    ) -> PageQuery {
        PageQuery {
            collection: "items".to_string(),
            order_field: "rank".to_string(),
            direction,
            start_after,
            limit,
        }
    }

    fn seeded() -> MemoryDocumentStore {
        let store = MemoryDocumentStore::new();
        for (key, rank) in [("a", 1i64), ("b", 3), ("c", 2), ("d", 3)] {
            store.insert("items", RawDocument::new(key).with_field("rank", rank));
        }
        store.insert("items", RawDocument::new("unranked").with_field("name", "x"));
        store
    }

    fn keys(docs: &[RawDocument]) -> Vec<&str> {
        docs.iter().map(|d| d.key.as_str()).collect()
    }

    #[test]
    fn test_descending_with_key_tiebreak() {
        let store = seeded();
        let docs = store.get_page(&query(None, SortDirection::Descending, 10)).unwrap();
        assert_eq!(keys(&docs), vec!["d", "b", "c", "a"]);
    }

    #[test]
    fn test_ascending() {
        let store = seeded();
        let docs = store.get_page(&query(None, SortDirection::Ascending, 10)).unwrap();
        assert_eq!(keys(&docs), vec!["a", "c", "b", "d"]);
    }

    #[test]
    fn test_start_after_and_limit() {
        let store = seeded();
        let anchor = store.resolve_document("items", "b").unwrap();
        let docs = store
            .get_page(&query(anchor, SortDirection::Descending, 1))
            .unwrap();
        assert_eq!(keys(&docs), vec!["c"]);
    }

    #[test]
    fn test_anchor_without_order_field() {
        let store = seeded();
        let anchor = store.resolve_document("items", "unranked").unwrap();
        let result = store.get_page(&query(anchor, SortDirection::Descending, 10));
        assert!(matches!(result, Err(FeedError::InvalidArgument(_))));
    }

    #[test]
    fn test_missing_collection_and_document() {
        let store = MemoryDocumentStore::new();
        assert!(store
            .get_page(&query(None, SortDirection::Descending, 5))
            .unwrap()
            .is_empty());
        assert!(store.resolve_document("items", "a").unwrap().is_none());
        assert_eq!(store.round_trips(), 2);
    }

    #[test]
    fn test_insert_remove() {
        let store = seeded();
        assert_eq!(store.len("items"), 5);
        assert!(store.remove("items", "a").is_some());
        assert!(store.remove("items", "a").is_none());
        assert_eq!(store.len("items"), 4);
        assert!(store.is_empty("other"));
    }
}
