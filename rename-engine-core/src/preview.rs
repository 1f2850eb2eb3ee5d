use crate::disambiguate::{disambiguate, exists_on_disk};
use crate::events::EventMulticaster;
use crate::flags::{RenameFlags, SourceScope};
use crate::item::{Item, ItemId};
use crate::regex_adapter::RegexAdapter;
use crate::store::ItemStore;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::JoinHandle;

/// Most filesystems cap a single path component at 255 bytes; a source string
/// longer than that is truncated before being handed to the regex adapter (§4.3).
const MAX_COMPONENT_LEN: usize = 255;

/// Messages a preview or commit worker posts back to the manager's owning thread.
/// Opaque outside the crate - the manager is the sole consumer (§6).
///
/// Preview messages carry the spawning call's generation number so a consumer can
/// tell a stale run's terminal message (one `perform_preview` already superseded)
/// apart from the run it is actually waiting on.
pub enum WorkerMessage {
    RegExItemUpdated(u64, ItemId),
    RegExCanceled(u64),
    RegExCompleted(u64),
    FileOpComplete,
}

/// Handle to an in-flight preview worker: a cancellation flag plus the thread's
/// join handle. Dropping this without cancelling leaves the thread to finish on
/// its own; `Manager` always cancels-and-joins before replacing it (§4.2).
pub struct PreviewHandle {
    cancel: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl PreviewHandle {
    pub fn cancel_and_join(mut self) {
        self.cancel.store(true, Ordering::SeqCst);
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                tracing::warn!("preview worker thread panicked");
            }
        }
    }
}

/// Spawn a fresh preview run over `store` using `adapter`'s current configuration.
///
/// Per §9's design note, the explicit "start" signal from the original design is
/// eliminated: the thread is only spawned once the manager has already cleared the
/// cancel flag and is ready to receive on `sender`, so there is nothing left for a
/// start signal to gate.
pub fn spawn_preview_worker(
    store: Arc<ItemStore>,
    adapter: Arc<dyn RegexAdapter>,
    root: PathBuf,
    generation: u64,
    sender: Sender<WorkerMessage>,
) -> std::io::Result<PreviewHandle> {
    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_for_worker = cancel.clone();
    let join = std::thread::Builder::new()
        .name("preview-worker".to_string())
        .spawn(move || run_preview(&store, adapter.as_ref(), &root, generation, &cancel_for_worker, &sender))?;
    Ok(PreviewHandle {
        cancel,
        join: Some(join),
    })
}

fn run_preview(
    store: &ItemStore,
    adapter: &dyn RegexAdapter,
    root: &Path,
    generation: u64,
    cancel: &AtomicBool,
    sender: &Sender<WorkerMessage>,
) {
    let flags = adapter.flags();
    let span = tracing::info_span!("preview_run", generation, enumerate_items = flags.enumerate_items);
    let _enter = span.enter();

    // Per-parent claims made so far *this run*, so two items that collide with
    // each other (not just with something already on disk) still disambiguate.
    let mut claimed: HashMap<PathBuf, HashSet<String>> = HashMap::new();
    let item_count = store.len();

    for i in 0..item_count {
        if cancel.load(Ordering::SeqCst) {
            tracing::info!(at = i, "preview run canceled");
            let _ = sender.send(WorkerMessage::RegExCanceled(generation));
            return;
        }

        let Some(item) = store.get_by_index(i) else {
            continue;
        };

        let candidate = compute_candidate(&item, adapter, flags, &mut claimed);
        let prev = item.set_new_name(candidate.clone());
        if prev != candidate {
            tracing::debug!(item_id = item.id().0, new_name = ?candidate, "item updated");
            let _ = sender.send(WorkerMessage::RegExItemUpdated(generation, item.id()));
        }
    }

    tracing::info!("preview run completed");
    let _ = sender.send(WorkerMessage::RegExCompleted(generation));
}

fn compute_candidate(
    item: &Item,
    adapter: &dyn RegexAdapter,
    flags: RenameFlags,
    claimed: &mut HashMap<PathBuf, HashSet<String>>,
) -> Option<String> {
    let original = item.original_name();
    let source = truncate_to_component_limit(&source_string(original, flags));
    let replaced = adapter.replace(&source);
    let mut candidate = compose_candidate(original, flags, replaced);

    if candidate.as_deref() == Some(original) {
        candidate = None;
    }

    if let Some(cand) = candidate {
        if flags.enumerate_items {
            let parent = item.parent_path().to_path_buf();
            let claimed_set = claimed.entry(parent.clone()).or_default();
            let unique = disambiguate(&cand, |name| {
                claimed_set.contains(name) || exists_on_disk(&parent, name)
            });
            claimed_set.insert(unique.clone());
            Some(unique)
        } else {
            Some(cand)
        }
    } else {
        None
    }
}

fn source_string(original_name: &str, flags: RenameFlags) -> String {
    match flags.source_scope() {
        SourceScope::NameOnly => stem(original_name).to_string(),
        SourceScope::ExtensionOnly => extension_without_dot(original_name).to_string(),
        SourceScope::Whole => original_name.to_string(),
    }
}

fn compose_candidate(original_name: &str, flags: RenameFlags, replaced: Option<String>) -> Option<String> {
    let replaced = replaced?;
    match flags.source_scope() {
        SourceScope::NameOnly => Some(format!("{replaced}{}", extension_with_dot(original_name))),
        SourceScope::ExtensionOnly => {
            if extension_without_dot(original_name).is_empty() {
                Some(original_name.to_string())
            } else {
                Some(format!("{}.{replaced}", stem(original_name)))
            }
        }
        SourceScope::Whole => Some(replaced),
    }
}

fn stem(name: &str) -> &str {
    Path::new(name).file_stem().and_then(|s| s.to_str()).unwrap_or(name)
}

fn extension_without_dot(name: &str) -> &str {
    Path::new(name).extension().and_then(|e| e.to_str()).unwrap_or("")
}

fn extension_with_dot(name: &str) -> String {
    let ext = extension_without_dot(name);
    if ext.is_empty() {
        String::new()
    } else {
        format!(".{ext}")
    }
}

fn truncate_to_component_limit(source: &str) -> String {
    if source.len() <= MAX_COMPONENT_LEN {
        return source.to_string();
    }
    let mut end = MAX_COMPONENT_LEN;
    while !source.is_char_boundary(end) {
        end -= 1;
    }
    source[..end].to_string()
}

/// Drain `sender`'s paired receiver, forwarding each message to the manager's
/// event dispatch. Exposed for `Manager::perform_preview`'s draining loop.
pub fn dispatch_worker_message(
    message: WorkerMessage,
    store: &ItemStore,
    events: &EventMulticaster,
) -> WorkerMessageKind {
    match message {
        WorkerMessage::RegExItemUpdated(generation, id) => {
            if let Some(item) = store.get_by_id(id) {
                events.update(&item);
            }
            WorkerMessageKind::ItemUpdated(generation)
        }
        WorkerMessage::RegExCanceled(generation) => {
            events.regex_canceled();
            WorkerMessageKind::Terminal(generation)
        }
        WorkerMessage::RegExCompleted(generation) => {
            events.regex_completed();
            WorkerMessageKind::Terminal(generation)
        }
        WorkerMessage::FileOpComplete => WorkerMessageKind::CommitComplete,
    }
}

/// Whether the caller's drain loop should keep waiting for more messages. Terminal
/// and item-update variants carry the generation of the run that produced them, so
/// a consumer waiting on a specific (the latest) run can ignore a stale one's.
#[derive(Debug, PartialEq, Eq)]
pub enum WorkerMessageKind {
    ItemUpdated(u64),
    Terminal(u64),
    CommitComplete,
}
