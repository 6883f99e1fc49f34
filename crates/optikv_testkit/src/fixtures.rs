//! Shared test payloads.

use optikv_store::{Identified, ItemId};
use serde::{Deserialize, Serialize};

/// A realistic item payload: nested structure, a mutable counter for
/// lost-update tests, and a flattened identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestItem {
    /// Embedded identity; id and version serialize as top-level fields.
    #[serde(flatten)]
    pub ident: ItemId,
    /// Display title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Nested payload the store must round-trip opaquely.
    pub subitems: Vec<SubItem>,
    /// Counter incremented by concurrency tests.
    pub counter: i64,
}

/// Nested payload element of a [`TestItem`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubItem {
    /// Arbitrary field.
    pub name: String,
    /// Arbitrary field.
    pub value: String,
}

impl TestItem {
    /// Creates a never-persisted item (version 0) with the given title.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            ident: ItemId::new(id),
            title: title.into(),
            description: String::new(),
            subitems: Vec::new(),
            counter: 0,
        }
    }
}

impl Identified for TestItem {
    fn ident(&self) -> &ItemId {
        &self.ident
    }

    fn ident_mut(&mut self) -> &mut ItemId {
        &mut self.ident
    }
}
