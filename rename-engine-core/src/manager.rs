use crate::commit::{CommitOptions, FsRenamePrimitive, OwnerWindowHandle, RenameRequest, StdFsRenamePrimitive};
use crate::error::{ManagerError, Result};
use crate::events::{Cookie, EventMulticaster, Observer};
use crate::flags::RenameFlags;
use crate::item::{Item, ItemId};
use crate::item_factory::{ItemFactory, SequentialItemFactory};
use crate::preview::{dispatch_worker_message, spawn_preview_worker, PreviewHandle, WorkerMessageKind};
use crate::regex_adapter::{RegexAdapter, RegexAdapterObserver, StdRegexAdapter};
use crate::store::ItemStore;
use parking_lot::{Mutex, RwLock};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Weak};

/// The façade a front end drives: own an item list, a regex adapter, and the
/// preview/commit workers behind them.
///
/// `root` is the enumeration root used by `exclude_subfolder_items` and by
/// `should_rename` (§4.7) - it is not derived from the item list itself, since an
/// embedding could seed items from more than one source.
pub struct Manager {
    self_weak: Weak<Manager>,
    root: PathBuf,
    items: Arc<ItemStore>,
    events: EventMulticaster,
    regex_adapter: RwLock<Option<Arc<dyn RegexAdapter>>>,
    adapter_cookie: Mutex<Cookie>,
    item_factory: RwLock<Option<Arc<dyn ItemFactory>>>,
    fs_primitive: RwLock<Arc<dyn FsRenamePrimitive>>,
    preview_worker: Mutex<Option<PreviewHandle>>,
    /// Bumped each time a preview worker is actually spawned. Carried in every
    /// message that worker posts, so `wait_for_preview` can tell a stale run's
    /// terminal message apart from the run it is actually waiting on (§9, invariant
    /// 3: messages from a superseded trigger must not be mistaken for the latest).
    preview_generation: std::sync::atomic::AtomicU64,
    sender: Sender<crate::preview::WorkerMessage>,
    receiver: Mutex<Receiver<crate::preview::WorkerMessage>>,
    in_trigger: AtomicBool,
    shutdown: AtomicBool,
}

/// Bridges the regex adapter's change notifications back to the manager without
/// the manager holding a strong reference to itself (which would leak: the manager
/// holds the adapter, so the adapter must not hold the manager back).
struct AdapterBridge(Weak<Manager>);

impl RegexAdapterObserver for AdapterBridge {
    fn on_search_term_changed(&self, _search_term: &str) {
        if let Some(manager) = self.0.upgrade() {
            manager.trigger_preview_from_adapter();
        }
    }

    fn on_replace_term_changed(&self, _replace_term: &str) {
        if let Some(manager) = self.0.upgrade() {
            manager.trigger_preview_from_adapter();
        }
    }

    fn on_flags_changed(&self, _flags: RenameFlags) {
        if let Some(manager) = self.0.upgrade() {
            manager.trigger_preview_from_adapter();
        }
    }
}

/// RAII reentrancy guard for `perform_preview` (§4.2, §9). The original design
/// leaked its critical section on the try-enter-failed branch; here the guard is
/// released on every exit path, coalesced or not, because `Drop` does not care which
/// `return` was taken.
struct TriggerGuard<'a>(&'a AtomicBool);

impl Drop for TriggerGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Manager {
    pub fn new(root: impl Into<PathBuf>, item_factory: Option<Arc<dyn ItemFactory>>) -> Arc<Self> {
        let (sender, receiver) = channel();
        Arc::new_cyclic(|weak| Manager {
            self_weak: weak.clone(),
            root: root.into(),
            items: Arc::new(ItemStore::new()),
            events: EventMulticaster::new(),
            regex_adapter: RwLock::new(None),
            adapter_cookie: Mutex::new(0),
            item_factory: RwLock::new(item_factory),
            fs_primitive: RwLock::new(Arc::new(StdFsRenamePrimitive)),
            preview_worker: Mutex::new(None),
            preview_generation: std::sync::atomic::AtomicU64::new(0),
            sender,
            receiver: Mutex::new(receiver),
            in_trigger: AtomicBool::new(false),
            shutdown: AtomicBool::new(false),
        })
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    pub fn advise(&self, observer: Arc<dyn Observer>) -> Cookie {
        self.events.advise(observer)
    }

    pub fn unadvise(&self, cookie: Cookie) -> Result<()> {
        if self.events.unadvise(cookie) {
            Ok(())
        } else {
            Err(ManagerError::UnknownCookie(cookie))
        }
    }

    /// Create an item via the current (or lazily-default) item factory, append it,
    /// and fire `OnItemAdded`. Does not itself trigger a preview run - the manager
    /// only restarts preview in response to a regex adapter change (§4.1), so a
    /// front end enumerates its items before wiring up search/replace terms.
    pub fn add_item(
        &self,
        original_name: &str,
        parent_path: impl Into<PathBuf>,
        is_folder: bool,
    ) -> Result<Arc<Item>> {
        self.ensure_not_shutdown()?;
        let parent_path = parent_path.into();
        let factory = self.ensure_item_factory();
        let item = factory.create(original_name, &parent_path, is_folder);
        self.items.append(item.clone());
        self.events.item_added(&item);
        Ok(item)
    }

    pub fn get_item_count(&self) -> usize {
        self.items.len()
    }

    pub fn get_item_by_index(&self, index: usize) -> Option<Arc<Item>> {
        self.items.get_by_index(index)
    }

    pub fn get_item_by_id(&self, id: ItemId) -> Option<Arc<Item>> {
        self.items.get_by_id(id)
    }

    pub fn get_selected_item_count(&self) -> usize {
        self.items.snapshot().iter().filter(|item| item.selected()).count()
    }

    pub fn get_rename_item_count(&self) -> usize {
        let flags = self.get_flags();
        self.items
            .snapshot()
            .iter()
            .filter(|item| item.should_rename(flags, &self.root))
            .count()
    }

    pub fn get_flags(&self) -> RenameFlags {
        self.regex_adapter
            .read()
            .as_ref()
            .map(|adapter| adapter.flags())
            .unwrap_or_default()
    }

    /// Ensure the regex adapter exists and push `flags` into it. The adapter's own
    /// change notification (routed back through `AdapterBridge`) is what actually
    /// restarts preview - this method does not call `perform_preview` itself.
    pub fn put_flags(&self, flags: RenameFlags) -> Result<()> {
        self.ensure_not_shutdown()?;
        let adapter = self.ensure_regex_adapter()?;
        adapter.put_flags(flags);
        Ok(())
    }

    pub fn get_regex_adapter(&self) -> Result<Arc<dyn RegexAdapter>> {
        self.ensure_not_shutdown()?;
        self.ensure_regex_adapter()
    }

    pub fn put_regex_adapter(&self, adapter: Arc<dyn RegexAdapter>) -> Result<()> {
        self.ensure_not_shutdown()?;
        self.install_adapter(adapter);
        Ok(())
    }

    pub fn get_item_factory(&self) -> Arc<dyn ItemFactory> {
        self.ensure_item_factory()
    }

    pub fn put_item_factory(&self, factory: Arc<dyn ItemFactory>) {
        *self.item_factory.write() = Some(factory);
    }

    pub fn put_fs_rename_primitive(&self, primitive: Arc<dyn FsRenamePrimitive>) {
        *self.fs_primitive.write() = primitive;
    }

    /// Explicitly (re)start a preview run against the current adapter state.
    /// Needed when a front end wants a run without having just changed the
    /// search/replace term or flags (e.g. after adding more items).
    pub fn refresh_preview(&self) -> Result<()> {
        self.ensure_not_shutdown()?;
        self.ensure_regex_adapter()?;
        self.perform_preview()
    }

    /// Cancel any in-flight preview run without starting a new one. A front end's
    /// interrupt handler (Ctrl-C) calls this to cut a long preview short without
    /// tearing down the whole manager.
    pub fn cancel_preview(&self) {
        if let Some(handle) = self.preview_worker.lock().take() {
            handle.cancel_and_join();
        }
    }

    /// Drain any preview/commit messages already queued, without blocking. A front
    /// end with its own event loop calls this on every tick.
    pub fn pump_available(&self) {
        let receiver = self.receiver.lock();
        while let Ok(message) = receiver.try_recv() {
            dispatch_worker_message(message, &self.items, &self.events);
        }
    }

    /// Block the calling thread, dispatching messages as they arrive, until the
    /// *most recently spawned* preview run reaches a terminal state. Used by front
    /// ends (the CLI) that have no event loop of their own. A terminal message from
    /// a run `perform_preview` already superseded is dispatched like any other but
    /// does not end the wait.
    pub fn wait_for_preview(&self) {
        let target = self.preview_generation.load(Ordering::SeqCst);
        let receiver = self.receiver.lock();
        loop {
            match receiver.recv() {
                Ok(message) => {
                    if let WorkerMessageKind::Terminal(generation) =
                        dispatch_worker_message(message, &self.items, &self.events)
                    {
                        if generation >= target {
                            return;
                        }
                    }
                }
                Err(_) => return,
            }
        }
    }

    /// Commit the currently selected, renameable items to disk (§4.4). Blocks the
    /// calling thread until the batch completes - unlike preview, a commit is not
    /// cancellable once submitted, so there is nothing to return early from.
    pub fn rename(&self, owner_window: Option<OwnerWindowHandle>) -> Result<usize> {
        self.ensure_not_shutdown()?;

        if let Some(prior) = self.preview_worker.lock().take() {
            prior.cancel_and_join();
        }

        let flags = self.get_flags();
        let requests: Vec<RenameRequest> = self
            .items
            .snapshot()
            .iter()
            .filter(|item| item.selected() && item.should_rename(flags, &self.root))
            .map(|item| RenameRequest {
                item_id: item.id(),
                path: item.path(),
                new_name: item
                    .new_name()
                    .expect("should_rename implies a computed new_name"),
            })
            .collect();

        if requests.is_empty() {
            return Err(ManagerError::NoWork);
        }

        let count = requests.len();
        let options = CommitOptions {
            owner_window,
            ..CommitOptions::default()
        };
        let primitive = self.fs_primitive.read().clone();

        self.events.rename_started();
        let handle = spawn_commit_worker_checked(requests, primitive, options, self.sender.clone())?;

        loop {
            let message = self.receiver.lock().recv().map_err(|_| ManagerError::Shutdown)?;
            if dispatch_worker_message(message, &self.items, &self.events) == WorkerMessageKind::CommitComplete {
                break;
            }
        }
        if handle.join().is_err() {
            tracing::warn!("commit worker thread panicked");
        }

        self.events.rename_completed();
        Ok(count)
    }

    /// Clear the search/replace term, flags, and every item's computed preview
    /// state, without discarding the item list or the factory. Mirrors the
    /// original `Reset()` entry point - a front end keeps browsing the same
    /// enumeration, it just wants a blank slate for the next search.
    pub fn reset(&self) -> Result<()> {
        self.ensure_not_shutdown()?;
        if let Some(prior) = self.preview_worker.lock().take() {
            prior.cancel_and_join();
        }
        if let Some(adapter) = self.regex_adapter.read().clone() {
            adapter.put_search_term("");
            adapter.put_replace_term("");
            adapter.put_flags(RenameFlags::default());
        }
        for item in self.items.snapshot() {
            item.reset();
        }
        Ok(())
    }

    /// Tear the manager down: cancel any in-flight preview, detach from the regex
    /// adapter, drop every observer, and clear the item list. Idempotent; every
    /// other method returns `ManagerError::Shutdown` afterward.
    pub fn shutdown(&self) {
        if self.shutdown.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(prior) = self.preview_worker.lock().take() {
            prior.cancel_and_join();
        }
        if let Some(adapter) = self.regex_adapter.write().take() {
            adapter.unadvise(*self.adapter_cookie.lock());
        }
        self.events.clear();
        self.items.clear();
    }

    fn ensure_not_shutdown(&self) -> Result<()> {
        if self.shutdown.load(Ordering::SeqCst) {
            Err(ManagerError::Shutdown)
        } else {
            Ok(())
        }
    }

    fn ensure_item_factory(&self) -> Arc<dyn ItemFactory> {
        let mut guard = self.item_factory.write();
        if guard.is_none() {
            *guard = Some(Arc::new(SequentialItemFactory::new()));
        }
        guard.clone().unwrap()
    }

    fn ensure_regex_adapter(&self) -> Result<Arc<dyn RegexAdapter>> {
        if let Some(adapter) = self.regex_adapter.read().clone() {
            return Ok(adapter);
        }
        let adapter: Arc<dyn RegexAdapter> = Arc::new(StdRegexAdapter::new());
        self.install_adapter(adapter.clone());
        Ok(adapter)
    }

    fn install_adapter(&self, adapter: Arc<dyn RegexAdapter>) {
        let previous = self.regex_adapter.write().replace(adapter.clone());
        if let Some(previous) = previous {
            previous.unadvise(*self.adapter_cookie.lock());
        }
        let cookie = adapter.advise(Arc::new(AdapterBridge(self.self_weak.clone())));
        *self.adapter_cookie.lock() = cookie;
    }

    /// Cancel any in-flight preview worker and spawn a fresh one over the current
    /// item list and adapter configuration (§4.2). Reentrant calls - an observer
    /// synchronously triggering another preview from inside `OnRegExStarted` - are
    /// coalesced by `in_trigger` rather than left to race.
    ///
    /// Returns `AdapterUnavailable` if the regex adapter was detached (by a
    /// concurrent `shutdown()`) between the caller's own adapter lookup and this
    /// method's read of it - the trigger is aborted rather than silently doing
    /// nothing.
    fn perform_preview(&self) -> Result<()> {
        if self.shutdown.load(Ordering::SeqCst) {
            return Ok(());
        }
        let _guard = match self.try_enter_trigger() {
            Some(guard) => guard,
            None => return Ok(()),
        };

        if let Some(prior) = self.preview_worker.lock().take() {
            prior.cancel_and_join();
        }

        let adapter = self
            .regex_adapter
            .read()
            .clone()
            .ok_or(ManagerError::AdapterUnavailable)?;

        self.events.regex_started();

        let generation = self.preview_generation.fetch_add(1, Ordering::SeqCst) + 1;
        match spawn_preview_worker(self.items.clone(), adapter, self.root.clone(), generation, self.sender.clone()) {
            Ok(handle) => {
                *self.preview_worker.lock() = Some(handle);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to spawn preview worker");
                Err(ManagerError::from(err))
            }
        }
    }

    /// Entry point for the adapter's own change notifications, which have no
    /// caller to report back to. The trigger is still aborted on failure; the
    /// failure itself is only surfaced as a diagnostic, not returned anywhere.
    fn trigger_preview_from_adapter(&self) {
        if let Err(err) = self.perform_preview() {
            tracing::warn!(error = %err, "preview trigger aborted");
        }
    }

    fn try_enter_trigger(&self) -> Option<TriggerGuard<'_>> {
        self.in_trigger
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| TriggerGuard(&self.in_trigger))
    }
}

fn spawn_commit_worker_checked(
    requests: Vec<RenameRequest>,
    primitive: Arc<dyn FsRenamePrimitive>,
    options: CommitOptions,
    sender: Sender<crate::preview::WorkerMessage>,
) -> Result<std::thread::JoinHandle<()>> {
    crate::commit::spawn_commit_worker(requests, primitive, options, sender).map_err(ManagerError::from)
}
