//! Document store interface and an in-memory implementation.
//!
//! The store is an external collaborator: it answers ordered, bounded
//! page queries over a keyed collection and resolves single documents by
//! key. Everything above this layer talks to it through [`DocumentStore`].

mod memory;
mod store;
mod value;

pub use memory::MemoryDocumentStore;
pub use store::{DocumentStore, PageQuery};
pub use value::{FieldValue, RawDocument};
