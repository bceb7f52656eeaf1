//! # Todo Runtime
//!
//! Runtime implementation for the todo reducer architecture.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: The runtime that manages state and executes effects
//! - **Effect Executor**: Runs effect descriptions in order and feeds actions back
//! - **Event Loop**: The action → reducer → effects → action feedback loop
//!
//! ## Example
//!
//! ```ignore
//! use todo_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action; returns once its effects have finished
//! store.send(Action::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```

use std::collections::VecDeque;
use std::sync::Arc;
use todo_core::{effect::Effect, reducer::Reducer};
use tokio::sync::{Mutex, RwLock};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Effects kept feeding actions back past the configured bound
        ///
        /// State changes made before the bound was hit are kept.
        #[error("Effect feedback exceeded {0} actions for a single send")]
        FeedbackLimitExceeded(usize),
    }
}

pub use error::StoreError;

/// Configuration for Store behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Maximum number of actions processed by one `send`, counting the
    /// initial action and every action fed back by effects
    pub max_feedback_actions: usize,
}

impl StoreConfig {
    /// Set the feedback bound
    #[must_use]
    pub const fn with_max_feedback_actions(mut self, max: usize) -> Self {
        self.max_feedback_actions = max;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_feedback_actions: 64,
        }
    }
}

/// Store module - the runtime coordinator
pub mod store {
    use super::{Arc, Effect, Mutex, Reducer, RwLock, StoreConfig, StoreError, VecDeque};

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock` so readers never observe a half-applied action)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop)
    ///
    /// Effects run inline: `send` awaits every effect an action produces,
    /// and every action those effects feed back, before it returns. A caller
    /// that awaits `send` therefore sees state and side effects fully settled.
    ///
    /// Concurrent sends are serialized: one send, effects included, finishes
    /// before the next starts reducing.
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        send_lock: Mutex<()>,
        reducer: R,
        environment: E,
        config: StoreConfig,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
        A: std::fmt::Debug,
    {
        /// Create a new store with initial state, reducer, and environment
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_config(initial_state, reducer, environment, StoreConfig::default())
        }

        /// Create a new Store with custom configuration
        #[must_use]
        pub fn with_config(
            initial_state: S,
            reducer: R,
            environment: E,
            config: StoreConfig,
        ) -> Self {
            Self {
                state: Arc::new(RwLock::new(initial_state)),
                send_lock: Mutex::new(()),
                reducer,
                environment,
                config,
            }
        }

        /// The environment this store injects into its reducer
        pub const fn environment(&self) -> &E {
            &self.environment
        }

        /// Send an action to the store
        ///
        /// 1. Waits for any in-flight send to finish, then acquires write lock on state
        /// 2. Calls reducer with (state, action, environment)
        /// 3. Executes returned effects in order, awaiting each
        /// 4. Actions produced by effects are reduced the same way
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::FeedbackLimitExceeded`] if effects keep
        /// feeding actions back beyond `StoreConfig::max_feedback_actions`.
        ///
        /// # Panics
        ///
        /// If the reducer panics, the panic propagates to the caller.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<(), StoreError> {
            let _in_flight = self.send_lock.lock().await;
            let mut queue = VecDeque::from([action]);
            let mut processed = 0usize;

            while let Some(action) = queue.pop_front() {
                if processed == self.config.max_feedback_actions {
                    tracing::error!(
                        limit = self.config.max_feedback_actions,
                        "Effect feedback limit reached, dropping remaining actions"
                    );
                    metrics::counter!("store.feedback.limit_exceeded").increment(1);
                    return Err(StoreError::FeedbackLimitExceeded(
                        self.config.max_feedback_actions,
                    ));
                }
                processed += 1;

                tracing::debug!(?action, "Processing action");
                metrics::counter!("store.actions.total").increment(1);

                let effects = {
                    let mut state = self.state.write().await;

                    let start = std::time::Instant::now();
                    let effects = self.reducer.reduce(&mut *state, action, &self.environment);
                    metrics::histogram!("store.reducer.duration_seconds")
                        .record(start.elapsed().as_secs_f64());

                    effects
                };

                tracing::trace!("Reducer returned {} effects", effects.len());
                // Note: Precision loss acceptable for metrics (effect counts < 2^52)
                #[allow(clippy::cast_precision_loss)]
                metrics::histogram!("store.effects.count").record(effects.len() as f64);

                // Depth-first, in declaration order; Sequential children are
                // pushed reversed so the first child pops first.
                let mut pending: Vec<Effect<A>> = effects.into_iter().rev().collect();
                while let Some(effect) = pending.pop() {
                    match effect {
                        Effect::None => {},
                        Effect::Sequential(children) => {
                            pending.extend(children.into_iter().rev());
                        },
                        Effect::Future(future) => {
                            if let Some(feedback) = future.await {
                                tracing::trace!("Effect produced a feedback action");
                                queue.push_back(feedback);
                            }
                        },
                    }
                }
            }

            Ok(())
        }

        /// Read current state via a closure
        ///
        /// Access state through a closure to ensure the lock is released promptly:
        ///
        /// ```ignore
        /// let todo_count = store.state(|s| s.todos.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }
    }
}

pub use store::Store;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use todo_core::{smallvec, SmallVec};

    #[derive(Debug, Default)]
    struct LogState {
        entries: Vec<String>,
    }

    #[derive(Debug, Clone)]
    enum LogAction {
        Record(String),
        RecordThenEcho(String),
        Echo(String),
        Loop,
        Nested,
        Note(String),
        SlowNote(String),
    }

    #[derive(Clone, Default)]
    struct LogEnv {
        side_effects: Arc<Mutex<Vec<String>>>,
    }

    impl LogEnv {
        fn note(&self, entry: &str) -> Effect<LogAction> {
            let log = Arc::clone(&self.side_effects);
            let entry = entry.to_string();
            Effect::future(async move {
                log.lock().unwrap().push(entry);
                None
            })
        }

        fn slow_note(&self, entry: &str) -> Effect<LogAction> {
            let log = Arc::clone(&self.side_effects);
            let entry = entry.to_string();
            Effect::future(async move {
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
                log.lock().unwrap().push(entry);
                None
            })
        }
    }

    struct LogReducer;

    impl Reducer for LogReducer {
        type State = LogState;
        type Action = LogAction;
        type Environment = LogEnv;

        fn reduce(
            &self,
            state: &mut LogState,
            action: LogAction,
            env: &LogEnv,
        ) -> SmallVec<[Effect<LogAction>; 4]> {
            match action {
                LogAction::Record(entry) => {
                    state.entries.push(entry);
                    SmallVec::new()
                },
                LogAction::RecordThenEcho(entry) => {
                    state.entries.push(entry.clone());
                    smallvec![Effect::future(async move { Some(LogAction::Echo(entry)) })]
                },
                LogAction::Echo(entry) => {
                    state.entries.push(format!("echo:{entry}"));
                    SmallVec::new()
                },
                LogAction::Loop => {
                    state.entries.push("loop".to_string());
                    smallvec![Effect::future(async { Some(LogAction::Loop) })]
                },
                LogAction::Nested => smallvec![
                    env.note("a"),
                    Effect::chain(vec![
                        env.note("b"),
                        Effect::None,
                        Effect::chain(vec![env.note("c")]),
                    ]),
                    env.note("d"),
                ],
                LogAction::Note(entry) => {
                    state.entries.push(entry.clone());
                    smallvec![env.note(&entry)]
                },
                LogAction::SlowNote(entry) => {
                    state.entries.push(entry.clone());
                    smallvec![env.slow_note(&entry)]
                },
            }
        }
    }

    #[tokio::test]
    async fn send_applies_action_before_returning() {
        let store = Store::new(LogState::default(), LogReducer, LogEnv::default());

        store.send(LogAction::Record("first".into())).await.unwrap();

        let entries = store.state(|s| s.entries.clone()).await;
        assert_eq!(entries, vec!["first"]);
    }

    #[tokio::test]
    async fn feedback_actions_settle_within_send() {
        let store = Store::new(LogState::default(), LogReducer, LogEnv::default());

        store
            .send(LogAction::RecordThenEcho("x".into()))
            .await
            .unwrap();

        let entries = store.state(|s| s.entries.clone()).await;
        assert_eq!(entries, vec!["x", "echo:x"]);
    }

    #[tokio::test]
    async fn effects_run_in_declaration_order() {
        let env = LogEnv::default();
        let store = Store::new(LogState::default(), LogReducer, env.clone());

        store.send(LogAction::Nested).await.unwrap();

        let log = env.side_effects.lock().unwrap().clone();
        assert_eq!(log, vec!["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn runaway_feedback_is_bounded() {
        let config = StoreConfig::default().with_max_feedback_actions(5);
        let store = Store::with_config(LogState::default(), LogReducer, LogEnv::default(), config);

        let result = store.send(LogAction::Loop).await;

        assert_eq!(result, Err(StoreError::FeedbackLimitExceeded(5)));
        assert_eq!(store.state(|s| s.entries.len()).await, 5);
    }

    #[tokio::test]
    async fn store_keeps_working_after_feedback_limit() {
        let config = StoreConfig::default().with_max_feedback_actions(2);
        let store = Store::with_config(LogState::default(), LogReducer, LogEnv::default(), config);

        let _ = store.send(LogAction::Loop).await;
        store.send(LogAction::Record("after".into())).await.unwrap();

        let last = store.state(|s| s.entries.last().cloned()).await;
        assert_eq!(last.as_deref(), Some("after"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_sends_settle_in_order() {
        let env = LogEnv::default();
        let store = Arc::new(Store::new(LogState::default(), LogReducer, env.clone()));

        let first = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.send(LogAction::SlowNote("first".into())).await })
        };
        while store.state(|s| s.entries.is_empty()).await {
            tokio::task::yield_now().await;
        }
        store.send(LogAction::Note("second".into())).await.unwrap();
        first.await.unwrap().unwrap();

        let log = env.side_effects.lock().unwrap().clone();
        assert_eq!(log, vec!["first", "second"]);
        let entries = store.state(|s| s.entries.clone()).await;
        assert_eq!(entries, vec!["first", "second"]);
    }
}
