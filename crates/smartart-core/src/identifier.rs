//! Model identifiers for diagram points and connections.
//!
//! Every point (`dgm:pt`) and connection (`dgm:cxn`) in a diagram data part
//! carries a `modelId`. This module provides the [`ModelId`] type and the
//! [`IdAllocator`] that hands them out from a single monotonically increasing
//! counter owned by one document.
//!
//! # Uniqueness
//!
//! There is no process-wide state: uniqueness holds per allocator. A
//! document owns exactly one allocator for its lifetime, so no two diagrams
//! in the same finalize batch can produce the same identifier.

use std::fmt;

/// Identifier of a point or connection in a diagram data model.
///
/// Rendered in the GUID form the viewer writes itself, with the counter value
/// in the final group.
///
/// # Examples
///
/// ```
/// use smartart_core::identifier::IdAllocator;
///
/// let mut ids = IdAllocator::new();
/// let first = ids.next_id();
/// assert_eq!(first.to_string(), "{00000000-0000-4000-8000-000000000001}");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(u64);

impl ModelId {
    /// Raw counter value of this identifier.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{00000000-0000-4000-8000-{:012X}}}", self.0)
    }
}

/// Per-document source of [`ModelId`]s.
///
/// Identifiers start at 1 and never repeat for the allocator's lifetime.
#[derive(Debug, Default)]
pub struct IdAllocator {
    last: u64,
}

impl IdAllocator {
    /// Creates an allocator whose first identifier is 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a fresh identifier.
    pub fn next_id(&mut self) -> ModelId {
        self.last += 1;
        ModelId(self.last)
    }

    /// Number of identifiers handed out so far.
    pub fn allocated(&self) -> u64 {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_ids_are_sequential() {
        let mut ids = IdAllocator::new();
        let a = ids.next_id();
        let b = ids.next_id();
        assert_eq!(a.value(), 1);
        assert_eq!(b.value(), 2);
        assert_eq!(ids.allocated(), 2);
    }

    #[test]
    fn test_display_is_guid_shaped() {
        let mut ids = IdAllocator::new();
        for _ in 0..254 {
            ids.next_id();
        }
        let id = ids.next_id();
        let text = id.to_string();
        assert_eq!(text, "{00000000-0000-4000-8000-0000000000FF}");
        assert_eq!(text.len(), 38);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ids = IdAllocator::new();
        let seen: HashSet<String> = (0..1000).map(|_| ids.next_id().to_string()).collect();
        assert_eq!(seen.len(), 1000);
    }
}
