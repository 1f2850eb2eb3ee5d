use crate::item::{Item, ItemId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Insertion-ordered sequence of items with an id -> index side table.
///
/// Mutation (`append`, `clear`) takes the exclusive lock; reads (`len`,
/// `get_by_index`, `get_by_id`) take the shared lock. Callers get an `Arc<Item>`
/// clone back, so they never hold the store's lock while reading or writing an
/// individual item's fields (§4.6).
#[derive(Default)]
pub struct ItemStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    items: Vec<Arc<Item>>,
    by_id: HashMap<ItemId, usize>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, item: Arc<Item>) {
        let mut inner = self.inner.write();
        let index = inner.items.len();
        inner.by_id.insert(item.id(), index);
        inner.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.inner.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get_by_index(&self, index: usize) -> Option<Arc<Item>> {
        self.inner.read().items.get(index).cloned()
    }

    pub fn get_by_id(&self, id: ItemId) -> Option<Arc<Item>> {
        let inner = self.inner.read();
        let index = *inner.by_id.get(&id)?;
        inner.items.get(index).cloned()
    }

    /// A snapshot of the sequence in insertion order. The snapshot is a vector of
    /// clones, so it is stable even if items are appended concurrently; it is not
    /// re-read after being taken.
    pub fn snapshot(&self) -> Vec<Arc<Item>> {
        self.inner.read().items.clone()
    }

    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.items.clear();
        inner.by_id.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn item(id: u64, name: &str) -> Arc<Item> {
        Arc::new(Item::new(ItemId(id), name, Path::new("/tmp"), false))
    }

    #[test]
    fn append_and_lookup() {
        let store = ItemStore::new();
        store.append(item(1, "a.txt"));
        store.append(item(2, "b.txt"));

        assert_eq!(store.len(), 2);
        assert_eq!(store.get_by_index(0).unwrap().original_name(), "a.txt");
        assert_eq!(store.get_by_id(ItemId(2)).unwrap().original_name(), "b.txt");
        assert!(store.get_by_id(ItemId(99)).is_none());
        assert!(store.get_by_index(99).is_none());
    }

    #[test]
    fn clear_empties_both_indexes() {
        let store = ItemStore::new();
        store.append(item(1, "a.txt"));
        store.clear();
        assert_eq!(store.len(), 0);
        assert!(store.get_by_id(ItemId(1)).is_none());
    }

    #[test]
    fn snapshot_preserves_insertion_order() {
        let store = ItemStore::new();
        for i in 0..5 {
            store.append(item(i, &format!("f{i}")));
        }
        let snap = store.snapshot();
        let ids: Vec<u64> = snap.iter().map(|i| i.id().0).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }
}
