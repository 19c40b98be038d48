use std::collections::HashSet;

use crate::Identified;

/// Append-only, identity-deduplicated collection of harvested items.
///
/// First-insertion order is preserved and the size never decreases, so a
/// caller observing `len()` across rounds sees a monotonic sequence.
#[derive(Debug, Clone)]
pub struct ResultSet<T: Identified> {
    items: Vec<T>,
    seen: HashSet<String>,
}

impl<T: Identified> ResultSet<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Inserts one candidate. Returns `true` when its identity was new;
    /// re-adding an existing identity is a no-op.
    pub fn insert(&mut self, item: T) -> bool {
        if self.seen.contains(item.identity()) {
            return false;
        }
        self.seen.insert(item.identity().to_string());
        self.items.push(item);
        true
    }

    /// Set-union merge of one round's extraction output.
    /// Returns how many new identities were added.
    pub fn merge<I>(&mut self, items: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        let mut added = 0;
        for item in items {
            if self.insert(item) {
                added += 1;
            }
        }
        added
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.seen.contains(identity)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Consumes the set, yielding items in first-insertion order.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl<T: Identified> Default for ResultSet<T> {
    fn default() -> Self {
        Self::new()
    }
}
