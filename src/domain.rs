//! Domain module - catalog entities and site vocabulary
//!
//! Plain data types shared by the parsers, the catalog lister and the
//! persistence helper. Nothing in here performs I/O.

pub mod catalog;
pub mod collection;

pub use catalog::{CatalogItem, dedup_by_link};
pub use collection::CollectionMap;
