//! The running todo screen: a store wired to storage, re-rendered after
//! every action.

use crate::reducer::{TodoEnvironment, TodoReducer};
use crate::storage::TodoStorage;
use crate::types::{TodoAction, TodoState};
use crate::view::{self, Gesture, View};
use todo_runtime::{Store, StoreConfig, StoreError};

/// Store specialised to the todo reducer
pub type TodoStore = Store<TodoState, TodoAction, TodoEnvironment, TodoReducer>;

/// A todo screen session
///
/// Owns the store. The initial collection comes from the environment's
/// storage; afterwards every committed change is written back before
/// [`TodoApp::dispatch`] returns.
pub struct TodoApp {
    store: TodoStore,
}

impl TodoApp {
    /// Load the stored collection and start an idle session
    #[must_use]
    pub fn open(env: TodoEnvironment) -> Self {
        Self::open_with_config(env, StoreConfig::default())
    }

    /// Like [`TodoApp::open`] with explicit store configuration
    #[must_use]
    pub fn open_with_config(env: TodoEnvironment, config: StoreConfig) -> Self {
        let todos = env.storage.load();
        tracing::info!(count = todos.len(), "Loaded todos");
        let store = Store::with_config(
            TodoState::with_todos(todos),
            TodoReducer::new(),
            env,
            config,
        );
        Self { store }
    }

    /// Storage this session writes to
    #[must_use]
    pub fn storage(&self) -> &TodoStorage {
        &self.store.environment().storage
    }

    /// Apply one action, then derive the new screen
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store stops processing the action.
    pub async fn dispatch(&self, action: TodoAction) -> Result<View, StoreError> {
        self.store.send(action).await?;
        Ok(self.view().await)
    }

    /// Trigger a control's gesture
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store stops processing the action.
    pub async fn press(&self, gesture: Gesture) -> Result<View, StoreError> {
        self.dispatch(gesture.into_action()).await
    }

    /// Type `text` into the input and submit it
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store stops processing either action.
    pub async fn submit(&self, text: impl Into<String>) -> Result<View, StoreError> {
        self.store
            .send(TodoAction::DraftChanged { text: text.into() })
            .await?;
        self.dispatch(TodoAction::Submit).await
    }

    /// The current screen
    pub async fn view(&self) -> View {
        self.store.state(view::render).await
    }

    /// A copy of the current state
    pub async fn snapshot(&self) -> TodoState {
        self.store.state(Clone::clone).await
    }
}
