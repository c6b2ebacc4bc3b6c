//! Thread-safe registry.
//!
//! `SharedRegistry` publishes immutable [`Registry`] snapshots through an
//! `ArcSwap`. Lookups load the current snapshot without locking; writers are
//! serialized by a mutex, build the next snapshot from a clone, and swap it in
//! only once the new pattern compiled.

use std::hash::Hash;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use crate::automaton::Match;
use crate::registry::{Config, Registry};
use crate::RulexError;

/// A registry that can be shared across threads and extended while in use.
pub struct SharedRegistry<X> {
    current: ArcSwap<Registry<X>>,
    writer: Mutex<()>,
}

impl<X: Clone + Eq + Hash> Default for SharedRegistry<X> {
    fn default() -> Self {
        Self::new()
    }
}

impl<X: Clone + Eq + Hash> SharedRegistry<X> {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self::from_registry(Registry::with_config(config))
    }

    pub fn from_registry(registry: Registry<X>) -> Self {
        Self {
            current: ArcSwap::from_pointee(registry),
            writer: Mutex::new(()),
        }
    }

    /// Register a pattern and publish the extended registry.
    ///
    /// Lookups already in flight keep their snapshot; a rejected pattern
    /// publishes nothing.
    pub fn register(&self, pattern: &str, payload: X) -> Result<(), RulexError> {
        let _guard = self.writer.lock();
        let mut next = Registry::clone(&self.current.load());
        next.register(pattern, payload)?;
        self.current.store(Arc::new(next));
        Ok(())
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<Registry<X>> {
        self.current.load_full()
    }

    pub fn lookup<'t>(&self, input: &'t str) -> Option<Match<'t, X>> {
        self.current.load().lookup(input)
    }

    pub fn lookup_all<'t>(&self, input: &'t str) -> Vec<Match<'t, X>> {
        self.current.load().lookup_all(input)
    }

    pub fn len(&self) -> usize {
        self.current.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.load().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_shared_registry_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SharedRegistry<String>>();
    }

    #[test]
    fn test_snapshot_unaffected_by_later_registration() {
        let shared = SharedRegistry::new();
        shared.register("a+", 1).unwrap();
        let before = shared.snapshot();

        shared.register("b+", 2).unwrap();
        assert!(before.lookup("bb").is_none());
        assert_eq!(shared.lookup("bb").map(|m| *m.payload()), Some(2));
        assert_eq!(shared.len(), 2);
    }

    #[test]
    fn test_rejected_pattern_publishes_nothing() {
        let shared = SharedRegistry::new();
        shared.register("ok", 1).unwrap();
        let before = shared.snapshot();

        assert!(shared.register("bad{", 2).is_err());
        assert!(Arc::ptr_eq(&before, &shared.snapshot()));
        assert_eq!(shared.len(), 1);
    }

    #[test]
    fn test_concurrent_lookups_and_registration() {
        let shared = Arc::new(SharedRegistry::new());
        shared.register(r"id-(\d+)", 0usize).unwrap();

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || {
                    for _ in 0..200 {
                        let m = shared.lookup("id-42").unwrap();
                        assert_eq!(m.group(1), Some("42"));
                    }
                })
            })
            .collect();

        for i in 1..20 {
            shared.register(&format!("p{i}-[a-z]+"), i).unwrap();
        }
        for r in readers {
            r.join().unwrap();
        }

        assert_eq!(shared.len(), 20);
        assert_eq!(shared.lookup("p7-xyz").map(|m| *m.payload()), Some(7));
    }
}
