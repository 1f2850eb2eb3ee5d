use crate::flags::RenameFlags;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// Stable identifier for an [`Item`], unique within a manager session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u64);

/// One candidate rename target.
///
/// `id`, `original_name`, `parent_path` and `is_folder` never change after
/// construction. `new_name` is written only by the preview worker; `selected` is
/// written only by the caller (e.g. in response to UI checkbox state). Both live
/// behind their own lock/atomic rather than the item store's lock, since the store
/// guards the *sequence* of items, not an individual item's fields (§4.6).
#[derive(Debug)]
pub struct Item {
    id: ItemId,
    original_name: String,
    parent_path: PathBuf,
    is_folder: bool,
    new_name: RwLock<Option<String>>,
    selected: AtomicBool,
}

impl Item {
    pub fn new(id: ItemId, original_name: impl Into<String>, parent_path: impl Into<PathBuf>, is_folder: bool) -> Self {
        Self {
            id,
            original_name: original_name.into(),
            parent_path: parent_path.into(),
            is_folder,
            new_name: RwLock::new(None),
            selected: AtomicBool::new(true),
        }
    }

    pub const fn id(&self) -> ItemId {
        self.id
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn parent_path(&self) -> &Path {
        &self.parent_path
    }

    pub const fn is_folder(&self) -> bool {
        self.is_folder
    }

    /// Full path this item currently refers to on disk.
    pub fn path(&self) -> PathBuf {
        self.parent_path.join(&self.original_name)
    }

    pub fn new_name(&self) -> Option<String> {
        self.new_name.read().clone()
    }

    /// Overwrite the computed new name, returning the previous value so the caller
    /// can decide whether a change notification is warranted (§4.3 step h).
    pub fn set_new_name(&self, new_name: Option<String>) -> Option<String> {
        let mut guard = self.new_name.write();
        std::mem::replace(&mut *guard, new_name)
    }

    pub fn selected(&self) -> bool {
        self.selected.load(Ordering::Acquire)
    }

    pub fn set_selected(&self, selected: bool) {
        self.selected.store(selected, Ordering::Release);
    }

    /// `new_name != null ∧ new_name != original_name`, with the per-flag predicate
    /// filters from §4.7 applied.
    pub fn should_rename(&self, flags: RenameFlags, root: &Path) -> bool {
        let Some(new_name) = self.new_name() else {
            return false;
        };
        if new_name == self.original_name {
            return false;
        }
        if flags.exclude_folders && self.is_folder {
            return false;
        }
        if flags.exclude_files && !self.is_folder {
            return false;
        }
        if flags.exclude_subfolder_items && self.parent_path != root {
            return false;
        }
        true
    }

    /// Clear the computed preview and restore selection, without forgetting
    /// identity. Used by `Manager::reset` semantics at the item granularity.
    pub fn reset(&self) {
        self.set_new_name(None);
        self.set_selected(true);
    }
}
