use crate::disambiguate::{disambiguate, exists_on_disk};
use crate::item::ItemId;
use crate::preview::WorkerMessage;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::JoinHandle;

/// Opaque owner-window handle attached to a commit batch, carried through purely
/// for parity with the filesystem primitive's contract (§4.4 step c) - a headless
/// caller (the CLI, tests) passes `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerWindowHandle(pub u64);

/// Batch configuration the commit worker hands to the filesystem primitive.
#[derive(Debug, Clone, Copy)]
pub struct CommitOptions {
    pub allow_undo: bool,
    pub show_elevation_prompt: bool,
    pub rename_on_collision: bool,
    pub owner_window: Option<OwnerWindowHandle>,
}

impl Default for CommitOptions {
    fn default() -> Self {
        Self {
            allow_undo: true,
            show_elevation_prompt: true,
            rename_on_collision: true,
            owner_window: None,
        }
    }
}

/// One staged rename: the item's current full path and the final component it
/// should become.
#[derive(Debug, Clone)]
pub struct RenameRequest {
    pub item_id: ItemId,
    pub path: PathBuf,
    pub new_name: String,
}

/// Per-item outcome of a batch rename. The manager discards this (§7:
/// `RenameItemFailure` is aggregated by the primitive, not surfaced per item) but a
/// caller driving the primitive directly (tests, a custom front end) can inspect it.
pub struct CommitSummary {
    pub results: Vec<(ItemId, Result<PathBuf, String>)>,
}

impl CommitSummary {
    pub fn failures(&self) -> impl Iterator<Item = &(ItemId, Result<PathBuf, String>)> {
        self.results.iter().filter(|(_, r)| r.is_err())
    }
}

/// The filesystem rename primitive's contract (§6): execute a batch of staged
/// renames. Result code is ignored by the manager - partial failure is acceptable
/// because undo is available through this primitive, not the engine.
pub trait FsRenamePrimitive: Send + Sync {
    fn rename_batch(&self, requests: &[RenameRequest], options: CommitOptions) -> CommitSummary;
}

/// Default [`FsRenamePrimitive`] over `std::fs::rename`.
///
/// When `rename_on_collision` is set and the target name is already taken (by
/// something that appeared between preview and commit), re-applies the same
/// disambiguation strategy the preview worker uses rather than overwriting it.
pub struct StdFsRenamePrimitive;

impl FsRenamePrimitive for StdFsRenamePrimitive {
    fn rename_batch(&self, requests: &[RenameRequest], options: CommitOptions) -> CommitSummary {
        let mut results = Vec::with_capacity(requests.len());
        for request in requests {
            let parent = request.path.parent().unwrap_or_else(|| Path::new("."));
            let target_name = if options.rename_on_collision {
                disambiguate(&request.new_name, |name| exists_on_disk(parent, name))
            } else {
                request.new_name.clone()
            };
            let target_path = parent.join(&target_name);

            let outcome = std::fs::rename(&request.path, &target_path)
                .map(|()| target_path.clone())
                .map_err(|e| e.to_string());
            if let Err(ref message) = outcome {
                tracing::warn!(item_id = request.item_id.0, error = %message, "rename failed");
            }
            results.push((request.item_id, outcome));
        }
        CommitSummary { results }
    }
}

/// Spawn the commit worker: stage `requests` through `primitive` and post
/// `FileOpComplete` when done. Not cancellable (§4.4): once submitted, a batch runs
/// to completion.
pub fn spawn_commit_worker(
    requests: Vec<RenameRequest>,
    primitive: Arc<dyn FsRenamePrimitive>,
    options: CommitOptions,
    sender: Sender<WorkerMessage>,
) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("commit-worker".to_string())
        .spawn(move || {
            let span = tracing::info_span!("commit_run", count = requests.len());
            let _enter = span.enter();
            let summary = primitive.rename_batch(&requests, options);
            let failure_count = summary.failures().count();
            if failure_count > 0 {
                tracing::warn!(failure_count, "some renames in the batch failed");
            }
            tracing::info!("commit run completed");
            let _ = sender.send(WorkerMessage::FileOpComplete);
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn renames_each_staged_item() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "hi").unwrap();

        let requests = vec![RenameRequest {
            item_id: ItemId(1),
            path: dir.path().join("a.txt"),
            new_name: "b.txt".to_string(),
        }];

        let summary = StdFsRenamePrimitive.rename_batch(&requests, CommitOptions::default());
        assert!(summary.failures().next().is_none());
        assert!(dir.path().join("b.txt").exists());
        assert!(!dir.path().join("a.txt").exists());
    }

    #[test]
    fn collision_renaming_disambiguates_instead_of_clobbering() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "source").unwrap();
        std::fs::write(dir.path().join("b.txt"), "already here").unwrap();

        let requests = vec![RenameRequest {
            item_id: ItemId(1),
            path: dir.path().join("a.txt"),
            new_name: "b.txt".to_string(),
        }];

        let summary = StdFsRenamePrimitive.rename_batch(&requests, CommitOptions::default());
        assert!(summary.failures().next().is_none());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("b.txt")).unwrap(),
            "already here"
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("b (1).txt")).unwrap(),
            "source"
        );
    }

    #[test]
    fn per_item_failure_does_not_abort_the_batch() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "hi").unwrap();

        let requests = vec![
            RenameRequest {
                item_id: ItemId(1),
                path: dir.path().join("missing.txt"),
                new_name: "x.txt".to_string(),
            },
            RenameRequest {
                item_id: ItemId(2),
                path: dir.path().join("a.txt"),
                new_name: "b.txt".to_string(),
            },
        ];

        let summary = StdFsRenamePrimitive.rename_batch(&requests, CommitOptions::default());
        assert_eq!(summary.failures().count(), 1);
        assert!(dir.path().join("b.txt").exists());
    }
}
