//! Store adapter paging tests.

use scenes::{
    Client, ClientConfig, Cursor, DatabaseService, Location, MemoryDocumentStore, RawDocument,
    StoreTimestamp,
};
use std::sync::Arc;

fn location_doc(key: &str, created_secs: i64) -> RawDocument {
    RawDocument::new(key)
        .with_field("name", format!("Place {}", key))
        .with_field("latlong", vec![37.78825, -122.4324])
        .with_field("created_at", StoreTimestamp::new(created_secs, 0))
        .with_field("categories", vec!["park"])
}

/// Records r1..=rN, rN newest.
fn seeded_store(count: i64) -> Arc<MemoryDocumentStore> {
    let store = Arc::new(MemoryDocumentStore::new());
    for i in 1..=count {
        store.insert("locations", location_doc(&format!("r{}", i), 1_700_000_000 + i));
    }
    store
}

fn client(store: &Arc<MemoryDocumentStore>) -> Client {
    Client::new(ClientConfig::default(), store.clone()).unwrap()
}

fn ids(locations: &[Location]) -> Vec<&str> {
    locations.iter().map(|l| l.id.as_str()).collect()
}

// --- Walkthrough ---

#[test]
fn test_five_records_in_pages_of_two() {
    let store = seeded_store(5);
    let adapter = client(&store).locations();

    let first = adapter.fetch_page(None, 2).unwrap();
    assert_eq!(ids(&first.data), vec!["r5", "r4"]);
    assert_eq!(first.next_cursor.as_ref().map(Cursor::as_str), Some("r4"));

    let second = adapter.fetch_page(first.next_cursor.as_ref(), 2).unwrap();
    assert_eq!(ids(&second.data), vec!["r3", "r2"]);
    assert_eq!(second.next_cursor.as_ref().map(Cursor::as_str), Some("r2"));

    let third = adapter.fetch_page(second.next_cursor.as_ref(), 2).unwrap();
    assert_eq!(ids(&third.data), vec!["r1"]);
    assert!(third.next_cursor.is_none());
}

#[test]
fn test_full_page_has_cursor_short_page_does_not() {
    let store = seeded_store(7);
    let adapter = client(&store).locations();

    let full = adapter.fetch_page(None, 7).unwrap();
    assert_eq!(full.len(), 7);
    assert!(full.has_more());

    let short = adapter.fetch_page(None, 8).unwrap();
    assert_eq!(short.len(), 7);
    assert!(!short.has_more());
}

#[test]
fn test_exact_multiple_needs_trailing_empty_fetch() {
    let store = seeded_store(4);
    let adapter = client(&store).locations();

    let first = adapter.fetch_page(None, 2).unwrap();
    let second = adapter.fetch_page(first.next_cursor.as_ref(), 2).unwrap();
    assert_eq!(ids(&second.data), vec!["r2", "r1"]);
    assert!(second.has_more());

    let trailing = adapter.fetch_page(second.next_cursor.as_ref(), 2).unwrap();
    assert!(trailing.is_empty());
    assert!(!trailing.has_more());
}

#[test]
fn test_second_page_never_repeats_first() {
    let store = seeded_store(30);
    let adapter = client(&store).locations();

    let first = adapter.fetch_page(None, 10).unwrap();
    let second = adapter.fetch_page(first.next_cursor.as_ref(), 10).unwrap();

    for location in &second.data {
        assert!(!first.data.iter().any(|l| l.id == location.id));
    }
    assert!(first.data.last().unwrap().created_at > second.data[0].created_at);
}

#[test]
fn test_empty_collection() {
    let store = Arc::new(MemoryDocumentStore::new());
    let page = client(&store).locations().fetch_page(None, 20).unwrap();
    assert!(page.is_empty());
    assert!(page.next_cursor.is_none());
}

// --- Ordering ---

#[test]
fn test_equal_timestamps_page_without_duplicates() {
    let store = Arc::new(MemoryDocumentStore::new());
    for key in ["a", "b", "c", "d", "e"] {
        store.insert("locations", location_doc(key, 1_700_000_000));
    }
    let adapter = client(&store).locations();

    let mut seen = Vec::new();
    let mut cursor = None;
    loop {
        let page = adapter.fetch_page(cursor.as_ref(), 2).unwrap();
        seen.extend(page.data.into_iter().map(|l| l.id));
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    assert_eq!(seen, vec!["e", "d", "c", "b", "a"]);
}

#[test]
fn test_documents_without_order_field_are_skipped() {
    let store = seeded_store(2);
    store.insert(
        "locations",
        RawDocument::new("draft")
            .with_field("name", "Draft")
            .with_field("latlong", vec![0.0, 0.0]),
    );

    let page = client(&store).locations().fetch_page(None, 10).unwrap();
    assert_eq!(ids(&page.data), vec!["r2", "r1"]);
}

// --- Round trips ---

#[test]
fn test_round_trips_per_fetch() {
    let store = seeded_store(5);
    let adapter = client(&store).locations();

    let first = adapter.fetch_page(None, 2).unwrap();
    assert_eq!(store.round_trips(), 1);

    adapter.fetch_page(first.next_cursor.as_ref(), 2).unwrap();
    assert_eq!(store.round_trips(), 3);
}

// --- Service ---

#[test]
fn test_get_locations_uses_default_page_size() {
    let store = seeded_store(25);
    let client = client(&store);

    let page = client.get_locations(None, None).unwrap();
    assert_eq!(page.len(), 20);
    assert_eq!(page.next_cursor.as_ref().map(Cursor::as_str), Some("r6"));

    let rest = client.get_locations(page.next_cursor.as_ref(), None).unwrap();
    assert_eq!(ids(&rest.data), vec!["r5", "r4", "r3", "r2", "r1"]);
    assert!(!rest.has_more());
}

#[test]
fn test_get_locations_with_limit() {
    let store = seeded_store(3);
    let page = client(&store).get_locations(None, Some(1)).unwrap();
    assert_eq!(ids(&page.data), vec!["r3"]);
}

#[test]
fn test_first_page_uses_configured_default() {
    let store = seeded_store(10);
    let config = ClientConfig {
        default_page_size: 4,
        ..Default::default()
    };
    let client = Client::new(config, store.clone()).unwrap();

    let page = client.locations().first_page().unwrap();
    assert_eq!(ids(&page.data), vec!["r10", "r9", "r8", "r7"]);
}

#[test]
fn test_mapped_fields() {
    let store = seeded_store(1);
    let page = client(&store).locations().fetch_page(None, 1).unwrap();
    let location = &page.data[0];

    assert_eq!(location.name, "Place r1");
    assert_eq!(location.latitude, 37.78825);
    assert_eq!(location.longitude, -122.4324);
    assert_eq!(location.created_at.as_micros(), 1_700_000_001_000_000);
    assert_eq!(location.categories, vec!["park".to_string()]);
}

#[test]
fn test_page_serializes_for_consumers() {
    let store = seeded_store(3);
    let page = client(&store).locations().fetch_page(None, 2).unwrap();

    let json = serde_json::to_value(&page).unwrap();
    assert_eq!(json["nextCursor"], "r2");
    assert_eq!(json["data"][0]["id"], "r3");
    assert_eq!(json["data"][0]["latitude"], 37.78825);
}
