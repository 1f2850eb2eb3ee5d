use crate::item::{Item, ItemId};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// External collaborator (§6) that manufactures [`Item`]s. The manager never calls
/// this itself - it only exposes `get_item_factory`/`put_item_factory` as a
/// pass-through hook for whatever enumeration code adds items via `add_item`.
///
/// The original contract is a no-argument `create() -> Item` that hands back a
/// blank item for the caller to fill in; `Item`'s identity fields are immutable
/// once constructed in this port (§3), so the factory takes them up front instead.
pub trait ItemFactory: Send + Sync {
    fn create(&self, original_name: &str, parent_path: &Path, is_folder: bool) -> Arc<Item>;
}

/// Default [`ItemFactory`] handing out monotonically increasing ids.
#[derive(Default)]
pub struct SequentialItemFactory {
    next_id: AtomicU64,
}

impl SequentialItemFactory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ItemFactory for SequentialItemFactory {
    fn create(&self, original_name: &str, parent_path: &Path, is_folder: bool) -> Arc<Item> {
        let id = ItemId(self.next_id.fetch_add(1, Ordering::SeqCst));
        Arc::new(Item::new(id, original_name, parent_path, is_folder))
    }
}

/// Walk `root` (one level, or recursively) and produce an `Item` per entry via
/// `factory`. Not part of the manager's contract - a convenience the CLI uses to
/// populate a session (§6.1).
pub fn enumerate_directory(
    factory: &dyn ItemFactory,
    root: &Path,
    recursive: bool,
) -> std::io::Result<Vec<Arc<Item>>> {
    let mut items = Vec::new();
    let mut walker = walkdir::WalkDir::new(root).min_depth(1);
    if !recursive {
        walker = walker.max_depth(1);
    }
    for entry in walker {
        let entry = entry.map_err(std::io::Error::from)?;
        let parent = entry
            .path()
            .parent()
            .unwrap_or(root)
            .to_path_buf();
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_folder = entry.file_type().is_dir();
        items.push(factory.create(&name, &parent, is_folder));
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn sequential_factory_assigns_increasing_ids() {
        let factory = SequentialItemFactory::new();
        let a = factory.create("a.txt", Path::new("/tmp"), false);
        let b = factory.create("b.txt", Path::new("/tmp"), false);
        assert!(b.id().0 > a.id().0);
    }

    #[test]
    fn enumerate_directory_finds_files_and_folders() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "x").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let factory = SequentialItemFactory::new();
        let items = enumerate_directory(&factory, dir.path(), false).unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().any(|i| i.original_name() == "a.txt" && !i.is_folder()));
        assert!(items.iter().any(|i| i.original_name() == "sub" && i.is_folder()));
    }

    #[test]
    fn non_recursive_enumeration_skips_nested_entries() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("nested.txt"), "x").unwrap();

        let factory = SequentialItemFactory::new();
        let items = enumerate_directory(&factory, dir.path(), false).unwrap();
        assert!(!items.iter().any(|i| i.original_name() == "nested.txt"));
    }
}
