//! Item identity: the `{id, version}` pair every stored item embeds.

use serde::{Deserialize, Serialize};

/// Identity of a stored item.
///
/// `id` is immutable once assigned and unique within a store instance.
/// `version` starts at 0 for a never-persisted item and is owned by the
/// store: callers only ever hand back versions a store previously
/// returned. After any successful put the stored version equals the
/// presented version plus one.
///
/// Payload types embed an `ItemId` and expose it through [`Identified`];
/// with serde they typically flatten it so id and version serialize as
/// top-level fields:
///
/// ```rust
/// use optikv_store::{Identified, ItemId};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Serialize, Deserialize)]
/// struct Note {
///     #[serde(flatten)]
///     ident: ItemId,
///     body: String,
/// }
///
/// impl Identified for Note {
///     fn ident(&self) -> &ItemId {
///         &self.ident
///     }
///     fn ident_mut(&mut self) -> &mut ItemId {
///         &mut self.ident
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId {
    /// Unique identifier within a store.
    pub id: String,
    /// Store-owned optimistic-concurrency version.
    pub version: i64,
}

impl ItemId {
    /// Creates the identity of a never-persisted item (version 0).
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: 0,
        }
    }
}

/// Access to the [`ItemId`] embedded in a payload type.
///
/// The store interprets nothing beyond this identity; the rest of the
/// payload is opaque.
pub trait Identified {
    /// Returns the embedded identity.
    fn ident(&self) -> &ItemId;

    /// Returns the embedded identity mutably.
    fn ident_mut(&mut self) -> &mut ItemId;

    /// Returns the item's id.
    fn id(&self) -> &str {
        &self.ident().id
    }

    /// Returns the item's current version.
    fn version(&self) -> i64 {
        self.ident().version
    }

    /// Sets the item's version. Called by stores on successful writes.
    fn set_version(&mut self, version: i64) {
        self.ident_mut().version = version;
    }
}

impl Identified for ItemId {
    fn ident(&self) -> &ItemId {
        self
    }

    fn ident_mut(&mut self) -> &mut ItemId {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_starts_at_version_zero() {
        let ident = ItemId::new("a");
        assert_eq!(ident.id, "a");
        assert_eq!(ident.version, 0);
    }

    #[test]
    fn accessors_round_trip() {
        let mut ident = ItemId::new("a");
        assert_eq!(ident.id(), "a");
        assert_eq!(ident.version(), 0);

        ident.set_version(7);
        assert_eq!(ident.version(), 7);
    }

    #[test]
    fn serde_round_trip() {
        let ident = ItemId {
            id: "x".into(),
            version: 3,
        };
        let json = serde_json::to_string(&ident).unwrap();
        assert_eq!(json, r#"{"id":"x","version":3}"#);

        let back: ItemId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ident);
    }
}
