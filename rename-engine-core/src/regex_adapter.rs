use crate::events::Cookie;
use crate::flags::RenameFlags;
use parking_lot::RwLock;
use regex::{Regex, RegexBuilder};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Capability the manager subscribes to: the regex adapter announces that its
/// search term, replace term, or flags changed so the manager can restart preview.
pub trait RegexAdapterObserver: Send + Sync {
    fn on_search_term_changed(&self, _search_term: &str) {}
    fn on_replace_term_changed(&self, _replace_term: &str) {}
    fn on_flags_changed(&self, _flags: RenameFlags) {}
}

/// Stateless-per-configuration matcher the preview worker consults for every item.
///
/// "Stateless" means `replace` has no side effects and depends only on the
/// currently configured search/replace term and flags - not on which item is being
/// processed.
pub trait RegexAdapter: Send + Sync {
    /// `None` means the pattern is empty/invalid, or matched but produced no
    /// change - both are "no replacement", not an error (§7).
    fn replace(&self, source: &str) -> Option<String>;
    fn flags(&self) -> RenameFlags;
    fn put_flags(&self, flags: RenameFlags);
    fn put_search_term(&self, term: &str);
    fn put_replace_term(&self, term: &str);
    fn advise(&self, observer: Arc<dyn RegexAdapterObserver>) -> Cookie;
    fn unadvise(&self, cookie: Cookie) -> bool;
}

struct Slot {
    cookie: Cookie,
    observer: Option<Arc<dyn RegexAdapterObserver>>,
}

struct State {
    search_term: String,
    replace_term: String,
    flags: RenameFlags,
    compiled: Option<Regex>,
}

fn compile(search_term: &str, flags: RenameFlags) -> Option<Regex> {
    if search_term.is_empty() {
        return None;
    }
    RegexBuilder::new(search_term)
        .case_insensitive(flags.case_insensitive)
        .build()
        .ok()
}

/// Default [`RegexAdapter`] over the `regex` crate.
pub struct StdRegexAdapter {
    state: RwLock<State>,
    observers: RwLock<Vec<Slot>>,
    next_cookie: AtomicU64,
}

impl Default for StdRegexAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl StdRegexAdapter {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State {
                search_term: String::new(),
                replace_term: String::new(),
                flags: RenameFlags::default(),
                compiled: None,
            }),
            observers: RwLock::new(Vec::new()),
            next_cookie: AtomicU64::new(1),
        }
    }

    fn notify(&self, f: impl Fn(&dyn RegexAdapterObserver)) {
        let observers = self.observers.read();
        for slot in observers.iter() {
            if let Some(observer) = &slot.observer {
                f(observer.as_ref());
            }
        }
    }
}

impl RegexAdapter for StdRegexAdapter {
    fn replace(&self, source: &str) -> Option<String> {
        let state = self.state.read();
        let regex = state.compiled.as_ref()?;
        if !regex.is_match(source) {
            return None;
        }
        let replaced = regex.replace_all(source, state.replace_term.as_str()).into_owned();
        if replaced == source {
            None
        } else {
            Some(replaced)
        }
    }

    fn flags(&self) -> RenameFlags {
        self.state.read().flags
    }

    fn put_flags(&self, flags: RenameFlags) {
        {
            let mut state = self.state.write();
            state.flags = flags;
            state.compiled = compile(&state.search_term, flags);
        }
        self.notify(|o| o.on_flags_changed(flags));
    }

    fn put_search_term(&self, term: &str) {
        {
            let mut state = self.state.write();
            state.search_term = term.to_string();
            let flags = state.flags;
            state.compiled = compile(&state.search_term, flags);
        }
        self.notify(|o| o.on_search_term_changed(term));
    }

    fn put_replace_term(&self, term: &str) {
        {
            let mut state = self.state.write();
            state.replace_term = term.to_string();
        }
        self.notify(|o| o.on_replace_term_changed(term));
    }

    fn advise(&self, observer: Arc<dyn RegexAdapterObserver>) -> Cookie {
        let cookie = self.next_cookie.fetch_add(1, Ordering::SeqCst);
        self.observers.write().push(Slot {
            cookie,
            observer: Some(observer),
        });
        cookie
    }

    fn unadvise(&self, cookie: Cookie) -> bool {
        if cookie == 0 {
            return false;
        }
        let mut observers = self.observers.write();
        for slot in observers.iter_mut() {
            if slot.cookie == cookie && slot.observer.is_some() {
                slot.cookie = 0;
                slot.observer = None;
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pattern_never_replaces() {
        let adapter = StdRegexAdapter::new();
        adapter.put_replace_term("x");
        assert_eq!(adapter.replace("a.txt"), None);
    }

    #[test]
    fn invalid_pattern_is_swallowed() {
        let adapter = StdRegexAdapter::new();
        adapter.put_search_term("(unterminated");
        adapter.put_replace_term("x");
        assert_eq!(adapter.replace("a.txt"), None);
    }

    #[test]
    fn basic_replace() {
        let adapter = StdRegexAdapter::new();
        adapter.put_search_term("a");
        adapter.put_replace_term("x");
        assert_eq!(adapter.replace("a.txt"), Some("x.txt".to_string()));
        assert_eq!(adapter.replace("b.txt"), None);
    }

    #[test]
    fn identity_replacement_is_treated_as_no_match() {
        let adapter = StdRegexAdapter::new();
        adapter.put_search_term("a");
        adapter.put_replace_term("a");
        assert_eq!(adapter.replace("a.txt"), None);
    }

    #[test]
    fn case_insensitive_flag_recompiles() {
        let adapter = StdRegexAdapter::new();
        adapter.put_search_term("A");
        adapter.put_replace_term("x");
        assert_eq!(adapter.replace("a.txt"), None);

        let mut flags = RenameFlags::default();
        flags.case_insensitive = true;
        adapter.put_flags(flags);
        assert_eq!(adapter.replace("a.txt"), Some("x.txt".to_string()));
    }

    #[test]
    fn change_notifications_fire() {
        struct Recorder(std::sync::Mutex<Vec<String>>);
        impl RegexAdapterObserver for Recorder {
            fn on_search_term_changed(&self, term: &str) {
                self.0.lock().unwrap().push(format!("search:{term}"));
            }
            fn on_replace_term_changed(&self, term: &str) {
                self.0.lock().unwrap().push(format!("replace:{term}"));
            }
            fn on_flags_changed(&self, _flags: RenameFlags) {
                self.0.lock().unwrap().push("flags".to_string());
            }
        }

        let adapter = StdRegexAdapter::new();
        let recorder = Arc::new(Recorder(std::sync::Mutex::new(Vec::new())));
        let cookie = adapter.advise(recorder.clone());
        adapter.put_search_term("a");
        adapter.put_replace_term("b");
        adapter.put_flags(RenameFlags::default());
        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec!["search:a".to_string(), "replace:b".to_string(), "flags".to_string()]
        );

        assert!(adapter.unadvise(cookie));
        adapter.put_search_term("c");
        assert_eq!(recorder.0.lock().unwrap().len(), 3);
    }
}
