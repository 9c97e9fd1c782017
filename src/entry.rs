//! A single slot of the cache: the load state of one key, plus whoever is waiting on it.
use crate::*;

/// Why an asset did not load.  This is what error listeners receive.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("failed to load asset: {0}")]
    Failed(String),
    #[error("the loader produced no data")]
    Empty,
}

type SuccessCallback<A> = Box<dyn FnOnce(&A) + Send>;
type ErrorCallback = Box<dyn FnOnce(&LoadError) + Send>;

/// A pair of callbacks waiting on an entry.  Exactly one arm runs, at most once.
pub struct Listener<A> {
    on_success: Option<SuccessCallback<A>>,
    on_error: Option<ErrorCallback>,
}

impl<A> Listener<A> {
    pub fn new(
        on_success: impl FnOnce(&A) + Send + 'static,
        on_error: impl FnOnce(&LoadError) + Send + 'static,
    ) -> Listener<A> {
        Listener {
            on_success: Some(Box::new(on_success)),
            on_error: Some(Box::new(on_error)),
        }
    }

    /// A listener which only cares about success.
    pub fn on_success(f: impl FnOnce(&A) + Send + 'static) -> Listener<A> {
        Listener {
            on_success: Some(Box::new(f)),
            on_error: None,
        }
    }

    /// A listener which only cares about failure.
    pub fn on_error(f: impl FnOnce(&LoadError) + Send + 'static) -> Listener<A> {
        Listener {
            on_success: None,
            on_error: Some(Box::new(f)),
        }
    }

    pub(crate) fn notify(self, outcome: Result<&A, &LoadError>) {
        match outcome {
            Ok(a) => {
                if let Some(f) = self.on_success {
                    f(a);
                }
            }
            Err(e) => {
                if let Some(f) = self.on_error {
                    f(e);
                }
            }
        }
    }
}

impl<A> std::fmt::Debug for Listener<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listener")
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    Pending,
    Loaded,
    Failed,
}

/// What [AssetCache::get](crate::AssetCache::get) found.
///
/// A pending lookup carries no payload; callers waiting on a pending key must rely on their listener.
#[derive(Debug)]
pub enum Lookup<'a, A> {
    Pending,
    Loaded(&'a A),
    Failed(&'a LoadError),
}

impl<'a, A> Lookup<'a, A> {
    pub fn asset(&self) -> Option<&'a A> {
        match self {
            Lookup::Loaded(a) => Some(*a),
            _ => None,
        }
    }

    pub fn status(&self) -> EntryStatus {
        match self {
            Lookup::Pending => EntryStatus::Pending,
            Lookup::Loaded(_) => EntryStatus::Loaded,
            Lookup::Failed(_) => EntryStatus::Failed,
        }
    }
}

#[derive(Debug)]
enum EntryState<A> {
    /// Loading; the listeners run in registration order when it finishes.
    Pending(Vec<Listener<A>>),
    Loaded(A),
    Failed(LoadError),
}

#[derive(Debug)]
pub(crate) struct CacheEntry<A> {
    pub(crate) kind: AssetKind,
    pub(crate) pinned: bool,
    state: EntryState<A>,
}

impl<A> CacheEntry<A> {
    pub(crate) fn new(kind: AssetKind) -> CacheEntry<A> {
        CacheEntry {
            kind,
            pinned: false,
            state: EntryState::Pending(vec![]),
        }
    }

    pub(crate) fn lookup(&self) -> Lookup<'_, A> {
        match &self.state {
            EntryState::Pending(_) => Lookup::Pending,
            EntryState::Loaded(a) => Lookup::Loaded(a),
            EntryState::Failed(e) => Lookup::Failed(e),
        }
    }

    pub(crate) fn status(&self) -> EntryStatus {
        self.lookup().status()
    }

    pub(crate) fn is_resolved(&self) -> bool {
        !matches!(self.state, EntryState::Pending(_))
    }

    /// The outcome of a resolved entry, or `None` while loading.
    fn outcome(&self) -> Option<Result<&A, &LoadError>> {
        match &self.state {
            EntryState::Pending(_) => None,
            EntryState::Loaded(a) => Some(Ok(a)),
            EntryState::Failed(e) => Some(Err(e)),
        }
    }

    /// Queue the listener if we're still loading, otherwise run it now.
    pub(crate) fn listen(&mut self, listener: Listener<A>) {
        match &mut self.state {
            EntryState::Pending(waiting) => waiting.push(listener),
            EntryState::Loaded(a) => listener.notify(Ok(&*a)),
            EntryState::Failed(e) => listener.notify(Err(&*e)),
        }
    }

    /// Resolve a pending entry and run everything waiting on it.
    ///
    /// Hands the outcome back if the entry was already resolved, leaving it untouched.
    pub(crate) fn resolve(&mut self, outcome: Result<A, LoadError>) -> Result<(), Result<A, LoadError>> {
        let waiting = match &mut self.state {
            EntryState::Pending(waiting) => std::mem::take(waiting),
            _ => return Err(outcome),
        };

        self.state = match outcome {
            Ok(a) => EntryState::Loaded(a),
            Err(e) => EntryState::Failed(e),
        };

        if let Some(outcome) = self.outcome() {
            for listener in waiting {
                listener.notify(outcome);
            }
        }
        Ok(())
    }

    /// The loaded payload, if any.
    pub(crate) fn asset(&self) -> Option<&A> {
        self.lookup().asset()
    }

    pub(crate) fn waiting(&self) -> usize {
        match &self.state {
            EntryState::Pending(waiting) => waiting.len(),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    type Log = Arc<Mutex<Vec<String>>>;

    fn recording(log: &Log, name: &'static str) -> Listener<u32> {
        let ok = log.clone();
        let err = log.clone();
        Listener::new(
            move |v| ok.lock().unwrap().push(format!("{} ok {}", name, v)),
            move |e| err.lock().unwrap().push(format!("{} err {}", name, e)),
        )
    }

    #[test]
    fn test_waiting_listeners_run_in_order() {
        let log: Log = Default::default();
        let mut entry = CacheEntry::new(AssetKind::Opaque);
        entry.listen(recording(&log, "a"));
        entry.listen(recording(&log, "b"));
        assert_eq!(entry.waiting(), 2);
        assert!(log.lock().unwrap().is_empty());

        entry.resolve(Ok(7)).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["a ok 7", "b ok 7"]);
        assert_eq!(entry.waiting(), 0);
        assert_eq!(entry.status(), EntryStatus::Loaded);
    }

    #[test]
    fn test_waiting_listeners_hear_failures() {
        let log: Log = Default::default();
        let mut entry = CacheEntry::new(AssetKind::Opaque);
        entry.listen(recording(&log, "a"));
        entry.listen(recording(&log, "b"));
        entry.resolve(Err(LoadError::Failed("404".into()))).unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "a err failed to load asset: 404",
                "b err failed to load asset: 404"
            ]
        );
        assert_eq!(entry.status(), EntryStatus::Failed);
    }

    #[test]
    fn test_late_listener_runs_immediately() {
        let log: Log = Default::default();
        let mut entry = CacheEntry::new(AssetKind::Opaque);
        entry.resolve(Err(LoadError::Empty)).unwrap();
        entry.listen(recording(&log, "late"));
        assert_eq!(
            *log.lock().unwrap(),
            vec!["late err the loader produced no data"]
        );
    }

    #[test]
    fn test_second_resolve_is_refused() {
        let log: Log = Default::default();
        let mut entry = CacheEntry::new(AssetKind::Opaque);
        entry.listen(recording(&log, "a"));
        entry.resolve(Ok(1)).unwrap();
        assert_eq!(entry.resolve(Ok(2)), Err(Ok(2)));
        assert_eq!(entry.asset(), Some(&1));
        assert_eq!(*log.lock().unwrap(), vec!["a ok 1"]);
    }

    #[test]
    fn test_one_armed_listeners() {
        let hits = Arc::new(Mutex::new(0));
        let h = hits.clone();
        let mut entry = CacheEntry::new(AssetKind::Opaque);
        entry.listen(Listener::on_error(|_| panic!("Should not fail")));
        entry.listen(Listener::on_success(move |_: &u32| *h.lock().unwrap() += 1));
        entry.resolve(Ok(3)).unwrap();
        assert_eq!(*hits.lock().unwrap(), 1);
    }
}
