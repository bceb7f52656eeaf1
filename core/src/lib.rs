//! # Todo Core
//!
//! Core traits and types for the todo reducer architecture.
//!
//! ## Core Concepts
//!
//! - **State**: Domain state for a feature
//! - **Action**: All possible inputs to a reducer (user gestures, effect feedback)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies via traits
//!
//! ## Example
//!
//! ```ignore
//! use todo_core::{effect::Effect, reducer::Reducer, SmallVec};
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Action = CounterAction;
//!     type Environment = CounterEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CounterState,
//!         action: CounterAction,
//!         env: &CounterEnvironment,
//!     ) -> SmallVec<[Effect<CounterAction>; 4]> {
//!         state.count += 1;
//!         SmallVec::new()
//!     }
//! }
//! ```

// Re-export commonly used types
pub use smallvec::{smallvec, SmallVec};

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all business logic and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        ///
        /// Most actions produce zero or one effect, so the result is stored
        /// inline for up to four effects.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution) and are composable.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects one after another, in order
        Sequential(Vec<Effect<Action>>),

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Wrap an async computation as an effect
        #[must_use]
        pub fn future<F>(future: F) -> Self
        where
            F: Future<Output = Option<Action>> + Send + 'static,
        {
            Effect::Future(Box::pin(future))
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Whether executing this effect does nothing at all
        #[must_use]
        pub fn is_none(&self) -> bool {
            match self {
                Effect::None => true,
                Effect::Sequential(effects) => effects.iter().all(Effect::is_none),
                Effect::Future(_) => false,
            }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter. Production implementations live here;
/// deterministic fakes live in `todo-testing`.
pub mod environment {
    use chrono::{DateTime, Utc};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicI64, Ordering};
    use thiserror::Error;

    /// Clock trait - abstracts time operations for testability
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall-clock time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Source of opaque identifiers for new records
    ///
    /// The only contract is that two calls on the same generator never return
    /// the same value.
    pub trait IdGenerator: Send + Sync {
        /// Produce the next identifier
        fn next_id(&self) -> String;
    }

    /// Identifiers derived from milliseconds since the Unix epoch
    ///
    /// Two ids requested within the same millisecond (or after the clock steps
    /// backwards) are bumped so the sequence stays strictly increasing.
    pub struct TimestampIdGenerator {
        clock: Arc<dyn Clock>,
        last: AtomicI64,
    }

    impl TimestampIdGenerator {
        /// Creates a generator reading time from `clock`
        #[must_use]
        pub fn new(clock: Arc<dyn Clock>) -> Self {
            Self {
                clock,
                last: AtomicI64::new(i64::MIN),
            }
        }
    }

    impl std::fmt::Debug for TimestampIdGenerator {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("TimestampIdGenerator")
                .field("last", &self.last.load(Ordering::Relaxed))
                .finish_non_exhaustive()
        }
    }

    impl IdGenerator for TimestampIdGenerator {
        fn next_id(&self) -> String {
            let now = self.clock.now().timestamp_millis();
            let mut last = self.last.load(Ordering::Acquire);
            loop {
                let candidate = now.max(last.saturating_add(1));
                match self.last.compare_exchange_weak(
                    last,
                    candidate,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                ) {
                    Ok(_) => return candidate.to_string(),
                    Err(observed) => last = observed,
                }
            }
        }
    }

    /// Errors raised by a [`KeyValueStore`]
    #[derive(Error, Debug)]
    pub enum StorageError {
        /// The underlying medium could not be read or written
        #[error("storage I/O failed: {0}")]
        Io(#[from] std::io::Error),

        /// The store refused a write because it would exceed its capacity
        #[error("storage quota exceeded: {needed} bytes needed, limit is {limit}")]
        QuotaExceeded {
            /// Size the store would have grown to
            needed: usize,
            /// Maximum size the store accepts
            limit: usize,
        },

        /// The store's own contents could not be decoded
        #[error("storage is corrupt: {0}")]
        Corrupt(String),

        /// A value could not be encoded or decoded by the caller
        #[error("serialization failed: {0}")]
        Serialization(String),

        /// No persistent storage exists in this environment
        #[error("persistent storage is unavailable")]
        Unavailable,
    }

    /// Synchronous string key-value persistence provided by the host
    ///
    /// Values are opaque strings; callers choose their own encoding.
    pub trait KeyValueStore: Send + Sync {
        /// Read the value stored under `key`, if any
        ///
        /// # Errors
        ///
        /// Returns [`StorageError`] if the store cannot be read.
        fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

        /// Store `value` under `key`, replacing any prior value
        ///
        /// # Errors
        ///
        /// Returns [`StorageError`] if the write is refused or fails.
        fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

        /// Delete the value stored under `key`; absent keys are not an error
        ///
        /// # Errors
        ///
        /// Returns [`StorageError`] if the store cannot be written.
        fn remove_item(&self, key: &str) -> Result<(), StorageError>;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::effect::Effect;
    use super::environment::{Clock, IdGenerator, TimestampIdGenerator};
    use chrono::{DateTime, TimeZone, Utc};
    use std::collections::HashSet;
    use std::sync::Arc;

    struct StuckClock(DateTime<Utc>);

    impl Clock for StuckClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    #[test]
    fn timestamp_ids_start_at_clock_millis() {
        let time = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let ids = TimestampIdGenerator::new(Arc::new(StuckClock(time)));

        assert_eq!(ids.next_id(), time.timestamp_millis().to_string());
    }

    #[test]
    fn timestamp_ids_stay_unique_when_clock_does_not_advance() {
        let time = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let ids = TimestampIdGenerator::new(Arc::new(StuckClock(time)));

        let generated: HashSet<String> = (0..100).map(|_| ids.next_id()).collect();
        assert_eq!(generated.len(), 100);
    }

    #[test]
    fn effect_is_none_sees_through_sequences() {
        let empty: Effect<()> = Effect::chain(vec![Effect::None, Effect::chain(vec![])]);
        assert!(empty.is_none());

        let busy: Effect<()> = Effect::chain(vec![Effect::None, Effect::future(async { None })]);
        assert!(!busy.is_none());
    }

    #[test]
    fn future_effect_yields_feedback_action() {
        let effect: Effect<u8> = Effect::future(async { Some(7) });
        let Effect::Future(future) = effect else {
            panic!("expected a future effect");
        };
        assert_eq!(tokio_test::block_on(future), Some(7));
    }

    #[test]
    fn effect_debug_hides_future_body() {
        let effect: Effect<u8> = Effect::future(async { None });
        assert_eq!(format!("{effect:?}"), "Effect::Future(<future>)");
    }
}
