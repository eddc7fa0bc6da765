//! Per-call traversal state.

use std::collections::HashMap;

use verity_core::ObjectIdentity;
use verity_groups::Group;

/// Visit state of one (instance, group) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VisitState {
    InProgress,
    Done,
}

/// Identity-keyed visited set scoped to a single validation call.
///
/// Prevents infinite recursion on cyclic object graphs and keeps one
/// call from validating the same instance twice for the same group.
/// Created fresh per call and discarded with it.
#[derive(Debug, Default)]
pub(crate) struct TraversalContext {
    visited: HashMap<(ObjectIdentity, Group), VisitState>,
}

impl TraversalContext {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Try to start visiting an (instance, group) pair. Returns false
    /// if the pair is already in progress or done, in which case the
    /// caller must skip it.
    pub(crate) fn begin(&mut self, identity: ObjectIdentity, group: &Group) -> bool {
        use std::collections::hash_map::Entry;
        match self.visited.entry((identity, group.clone())) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(VisitState::InProgress);
                true
            }
        }
    }

    /// Mark an (instance, group) pair fully processed.
    pub(crate) fn finish(&mut self, identity: ObjectIdentity, group: &Group) {
        self.visited
            .insert((identity, group.clone()), VisitState::Done);
    }
}
