use crate::item::Item;
use parking_lot::RwLock;
use std::sync::Arc;

/// Callback sink for manager lifecycle events. All methods are invoked on the
/// manager's owning thread (§5) - never from a worker thread - so an observer never
/// needs its own synchronization to handle these calls.
///
/// Observers must not call back into `Manager::advise`/`unadvise` from within any of
/// these methods: dispatch holds the event list's shared lock for the duration of
/// the fan-out (§4.5).
pub trait Observer: Send + Sync {
    fn on_item_added(&self, _item: &Arc<Item>) {}
    fn on_update(&self, _item: &Arc<Item>) {}
    fn on_error(&self, _item: &Arc<Item>) {}
    fn on_regex_started(&self) {}
    fn on_regex_canceled(&self) {}
    fn on_regex_completed(&self) {}
    fn on_rename_started(&self) {}
    fn on_rename_completed(&self) {}
}

/// Observer registration cookie. `0` is reserved and never handed out by `advise`.
pub type Cookie = u64;

struct Slot {
    cookie: Cookie,
    observer: Option<Arc<dyn Observer>>,
}

/// Registration table and fan-out dispatcher for [`Observer`]s.
#[derive(Default)]
pub struct EventMulticaster {
    slots: RwLock<Vec<Slot>>,
    next_cookie: std::sync::atomic::AtomicU64,
}

impl EventMulticaster {
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(Vec::new()),
            next_cookie: std::sync::atomic::AtomicU64::new(1),
        }
    }

    pub fn advise(&self, observer: Arc<dyn Observer>) -> Cookie {
        let cookie = self
            .next_cookie
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let mut slots = self.slots.write();
        slots.push(Slot {
            cookie,
            observer: Some(observer),
        });
        cookie
    }

    /// Idempotent: returns `false` if the cookie is unknown or already vacated.
    pub fn unadvise(&self, cookie: Cookie) -> bool {
        if cookie == 0 {
            return false;
        }
        let mut slots = self.slots.write();
        for slot in slots.iter_mut() {
            if slot.cookie == cookie && slot.observer.is_some() {
                slot.cookie = 0;
                slot.observer = None;
                return true;
            }
        }
        false
    }

    pub fn clear(&self) {
        let mut slots = self.slots.write();
        slots.clear();
    }

    fn dispatch(&self, f: impl Fn(&dyn Observer)) {
        let slots = self.slots.read();
        for slot in slots.iter() {
            if let Some(observer) = &slot.observer {
                f(observer.as_ref());
            }
        }
    }

    pub fn item_added(&self, item: &Arc<Item>) {
        self.dispatch(|o| o.on_item_added(item));
    }

    pub fn update(&self, item: &Arc<Item>) {
        self.dispatch(|o| o.on_update(item));
    }

    pub fn error(&self, item: &Arc<Item>) {
        self.dispatch(|o| o.on_error(item));
    }

    pub fn regex_started(&self) {
        self.dispatch(Observer::on_regex_started);
    }

    pub fn regex_canceled(&self) {
        self.dispatch(Observer::on_regex_canceled);
    }

    pub fn regex_completed(&self) {
        self.dispatch(Observer::on_regex_completed);
    }

    pub fn rename_started(&self) {
        self.dispatch(Observer::on_rename_started);
    }

    pub fn rename_completed(&self) {
        self.dispatch(Observer::on_rename_completed);
    }
}
