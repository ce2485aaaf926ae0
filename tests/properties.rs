//! Property tests for paging over arbitrary collections.

use proptest::prelude::*;
use scenes::{
    Client, ClientConfig, FeedConfig, InfiniteFeed, Location, MemoryDocumentStore, QueryKey,
    RawDocument, StoreTimestamp, Timestamp,
};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

fn store_with(created: &[i64]) -> Arc<MemoryDocumentStore> {
    let store = Arc::new(MemoryDocumentStore::new());
    for (i, micros) in created.iter().enumerate() {
        store.insert(
            "locations",
            RawDocument::new(format!("loc-{:04}", i))
                .with_field("name", format!("Place {}", i))
                .with_field("latlong", vec![0.0, 0.0])
                .with_field("created_at", StoreTimestamp::from_timestamp(Timestamp(*micros))),
        );
    }
    store
}

fn client(store: Arc<MemoryDocumentStore>) -> Client {
    Client::new(ClientConfig::default(), store).unwrap()
}

proptest! {
    #[test]
    fn pages_concatenate_in_strict_descending_order(
        created in prop::collection::btree_set(-1_000_000_000i64..1_000_000_000, 0..60),
        page_size in 1usize..12,
    ) {
        let created: Vec<i64> = created.into_iter().collect();
        let adapter = client(store_with(&created)).locations();

        let mut all: Vec<Location> = Vec::new();
        let mut cursor = None;
        let mut remaining = created.len();
        loop {
            let page = adapter.fetch_page(cursor.as_ref(), page_size).unwrap();
            if remaining >= page_size {
                prop_assert_eq!(page.len(), page_size);
                prop_assert!(page.has_more());
            } else {
                prop_assert_eq!(page.len(), remaining);
                prop_assert!(!page.has_more());
            }
            remaining -= page.len();
            all.extend(page.data);
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        prop_assert_eq!(all.len(), created.len());
        for pair in all.windows(2) {
            prop_assert!(pair[0].created_at > pair[1].created_at);
        }
        let keys: HashSet<&str> = all.iter().map(|l| l.id.as_str()).collect();
        prop_assert_eq!(keys.len(), all.len());
    }

    #[test]
    fn feed_aggregate_matches_single_large_page(
        created in prop::collection::btree_set(0i64..10_000_000, 1..40),
        page_size in 1usize..8,
    ) {
        let created: Vec<i64> = created.into_iter().collect();
        let client = client(store_with(&created));

        let feed: InfiniteFeed<Location> = InfiniteFeed::new(
            QueryKey::new(["locations"]),
            Arc::new(client.locations()),
            FeedConfig { page_size, ..Default::default() },
        ).unwrap();
        while feed.load_more().unwrap() {}

        let everything = client.locations().fetch_page(None, created.len() + 1).unwrap();
        prop_assert_eq!(feed.snapshot().flattened(), everything.data);
        prop_assert!(!feed.has_more());
    }

    #[test]
    fn second_page_never_overlaps_first(
        created in prop::collection::btree_set(0i64..1_000_000, 2..50),
        page_size in 1usize..10,
    ) {
        let created: Vec<i64> = created.into_iter().collect();
        let adapter = client(store_with(&created)).locations();

        let first = adapter.fetch_page(None, page_size).unwrap();
        if let Some(cursor) = first.next_cursor.as_ref() {
            let second = adapter.fetch_page(Some(cursor), page_size).unwrap();
            let first_keys: BTreeSet<&str> = first.data.iter().map(|l| l.id.as_str()).collect();
            for location in &second.data {
                prop_assert!(!first_keys.contains(location.id.as_str()));
            }
        }
    }
}
