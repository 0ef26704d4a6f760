//! Element identifiers.
//!
//! An `ElementId` names a rendered element in the host's visual tree: an
//! anchor, an overlay root, or any other node whose bounds the host reports
//! through its layout snapshot. Ids are cheap `Copy` handles; they do not keep
//! the element alive, so a lookup can always come back empty.

use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for generating unique element IDs.
static ELEMENT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier of a rendered element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(pub u64);

impl ElementId {
    /// Create a new unique element ID.
    pub fn new() -> Self {
        Self(ELEMENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Create a stable element ID from a name.
    ///
    /// Deterministic: same name always produces the same ID.
    /// Uses high bit to avoid collision with the atomic counter.
    pub fn named(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self(hasher.finish() | (1 << 63))
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}
