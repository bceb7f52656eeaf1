//! # Todo Testing
//!
//! Testing utilities and helpers for the todo reducer architecture.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - A Given-When-Then harness for reducers
//! - Property-based testing strategies
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use todo_testing::{InMemoryKeyValueStore, SequentialIdGenerator};
//! use todo_runtime::Store;
//!
//! #[tokio::test]
//! async fn submit_persists() {
//!     let storage = Arc::new(InMemoryKeyValueStore::new());
//!     let env = test_environment(storage.clone());
//!     let store = Store::new(TodoState::default(), TodoReducer::new(), env);
//!
//!     store.send(TodoAction::DraftChanged { text: "Buy milk".into() }).await?;
//!     store.send(TodoAction::Submit).await?;
//!
//!     assert!(storage.get_item("todos")?.is_some());
//! }
//! ```

use chrono::{DateTime, Utc};
use todo_core::environment::{Clock, IdGenerator, KeyValueStore, StorageError};


/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, IdGenerator, KeyValueStore, StorageError, Utc};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::{Mutex, PoisonError};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use todo_testing::mocks::FixedClock;
    /// use todo_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Predictable ids: `todo-1`, `todo-2`, ...
    #[derive(Debug, Default)]
    pub struct SequentialIdGenerator {
        next: AtomicU64,
    }

    impl SequentialIdGenerator {
        /// Start counting from 1
        #[must_use]
        pub const fn new() -> Self {
            Self {
                next: AtomicU64::new(0),
            }
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn next_id(&self) -> String {
            let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
            format!("todo-{n}")
        }
    }

    /// Replays a fixed list of ids, then falls back to `fallback-N`
    ///
    /// Useful for forcing collisions with ids already in a collection.
    #[derive(Debug)]
    pub struct ScriptedIdGenerator {
        script: Mutex<std::collections::VecDeque<String>>,
        fallback: SequentialIdGenerator,
    }

    impl ScriptedIdGenerator {
        /// Hand out `ids` in order before falling back
        #[must_use]
        pub fn new<I, T>(ids: I) -> Self
        where
            I: IntoIterator<Item = T>,
            T: Into<String>,
        {
            Self {
                script: Mutex::new(ids.into_iter().map(Into::into).collect()),
                fallback: SequentialIdGenerator::new(),
            }
        }
    }

    impl IdGenerator for ScriptedIdGenerator {
        fn next_id(&self) -> String {
            let scripted = self
                .script
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front();
            scripted.unwrap_or_else(|| format!("fallback-{}", self.fallback.next_id()))
        }
    }

    /// In-memory key-value store standing in for the host's persistent store
    ///
    /// Writes can be switched to fail, and the store can be marked
    /// unavailable, so persistence error paths can be exercised.
    #[derive(Debug, Default)]
    pub struct InMemoryKeyValueStore {
        entries: Mutex<HashMap<String, String>>,
        fail_writes: AtomicBool,
        unavailable: AtomicBool,
        writes: AtomicU64,
    }

    impl InMemoryKeyValueStore {
        /// Create an empty store
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a store pre-populated with one entry
        #[must_use]
        pub fn with_entry(key: &str, value: &str) -> Self {
            let store = Self::new();
            store
                .lock()
                .insert(key.to_string(), value.to_string());
            store
        }

        /// Make every subsequent write fail with a quota error
        pub fn fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::Release);
        }

        /// Make every subsequent read and write fail as unavailable
        pub fn set_unavailable(&self, unavailable: bool) {
            self.unavailable.store(unavailable, Ordering::Release);
        }

        /// Number of successful writes so far
        #[must_use]
        pub fn write_count(&self) -> u64 {
            self.writes.load(Ordering::Acquire)
        }

        /// Read a value without going through the trait's error handling
        #[must_use]
        pub fn peek(&self, key: &str) -> Option<String> {
            self.lock().get(key).cloned()
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
            self.entries.lock().unwrap_or_else(PoisonError::into_inner)
        }

        fn check_available(&self) -> Result<(), StorageError> {
            if self.unavailable.load(Ordering::Acquire) {
                return Err(StorageError::Unavailable);
            }
            Ok(())
        }
    }

    impl KeyValueStore for InMemoryKeyValueStore {
        fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.check_available()?;
            Ok(self.lock().get(key).cloned())
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.check_available()?;
            if self.fail_writes.load(Ordering::Acquire) {
                return Err(StorageError::QuotaExceeded {
                    needed: key.len() + value.len(),
                    limit: 0,
                });
            }
            self.lock().insert(key.to_string(), value.to_string());
            self.writes.fetch_add(1, Ordering::AcqRel);
            Ok(())
        }

        fn remove_item(&self, key: &str) -> Result<(), StorageError> {
            self.check_available()?;
            self.lock().remove(key);
            Ok(())
        }
    }
}

/// Assertion helpers for effects
pub mod assertions {
    use todo_core::effect::Effect;

    /// Assert that there are no effects
    ///
    /// # Panics
    ///
    /// Panics if any effect would do something when executed.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_no_effects<A: std::fmt::Debug>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().all(Effect::is_none),
            "Expected no effects, but found {}: {:?}",
            effects.len(),
            effects
        );
    }

    /// Assert the number of effects
    ///
    /// # Panics
    ///
    /// Panics if the number of effects doesn't match expected.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_effects_count<A>(effects: &[Effect<A>], expected: usize) {
        assert_eq!(
            effects.len(),
            expected,
            "Expected {} effects, but found {}",
            expected,
            effects.len()
        );
    }

    /// Assert that effects contain at least one Future effect
    ///
    /// # Panics
    ///
    /// Panics if no Future effect is found.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_has_future_effect<A>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().any(|e| matches!(e, Effect::Future(_))),
            "Expected at least one Future effect, but none found"
        );
    }
}

/// Property-based testing utilities
///
/// Strategies for the text a user may type into the todo input.
pub mod properties {
    use proptest::prelude::*;

    /// Text with at least one non-whitespace character
    pub fn meaningful_text() -> impl Strategy<Value = String> {
        (" {0,2}", "[A-Za-z0-9][A-Za-z0-9 ]{0,23}", " {0,2}")
            .prop_map(|(lead, body, trail)| format!("{lead}{body}{trail}"))
    }

    /// Text consisting only of whitespace (possibly empty)
    pub fn blank_text() -> impl Strategy<Value = String> {
        "[ \t\n]{0,8}"
    }

    /// Distinct meaningful texts, distinct even when compared
    /// case-insensitively after trimming
    pub fn distinct_texts(max: usize) -> impl Strategy<Value = Vec<String>> {
        proptest::collection::vec(meaningful_text(), 1..=max).prop_map(|texts| {
            let mut seen = std::collections::HashSet::new();
            texts
                .into_iter()
                .filter(|t| seen.insert(t.trim().to_lowercase()))
                .collect()
        })
    }
}

// Re-export commonly used items
pub use mocks::{
    FixedClock, InMemoryKeyValueStore, ScriptedIdGenerator, SequentialIdGenerator, test_clock,
};
pub use reducer_test::ReducerTest;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
    }

    #[test]
    fn sequential_ids_count_from_one() {
        let ids = SequentialIdGenerator::new();
        assert_eq!(ids.next_id(), "todo-1");
        assert_eq!(ids.next_id(), "todo-2");
    }

    #[test]
    fn scripted_ids_fall_back_after_script() {
        let ids = ScriptedIdGenerator::new(["a", "a"]);
        assert_eq!(ids.next_id(), "a");
        assert_eq!(ids.next_id(), "a");
        assert_eq!(ids.next_id(), "fallback-todo-1");
    }

    #[test]
    fn in_memory_store_round_trips_values() {
        let store = InMemoryKeyValueStore::new();
        assert_eq!(store.get_item("k").unwrap(), None);

        store.set_item("k", "v1").unwrap();
        store.set_item("k", "v2").unwrap();
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("v2"));
        assert_eq!(store.write_count(), 2);

        store.remove_item("k").unwrap();
        assert_eq!(store.peek("k"), None);
    }

    #[test]
    fn in_memory_store_failing_writes_keep_old_value() {
        let store = InMemoryKeyValueStore::with_entry("k", "old");
        store.fail_writes(true);

        let err = store.set_item("k", "new").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { .. }));
        assert_eq!(store.peek("k").as_deref(), Some("old"));
    }

    #[test]
    fn in_memory_store_unavailable_refuses_reads() {
        let store = InMemoryKeyValueStore::with_entry("k", "v");
        store.set_unavailable(true);

        assert!(matches!(store.get_item("k"), Err(StorageError::Unavailable)));
    }
}
