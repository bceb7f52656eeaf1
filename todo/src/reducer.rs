//! Reducer logic for the todo list.
//!
//! Every gesture becomes a [`TodoAction`]. The reducer validates it, updates
//! the state in place and, when the collection was committed, returns one
//! effect that writes the whole collection back to storage.

use crate::storage::TodoStorage;
use crate::types::{TodoAction, TodoId, TodoItem, TodoState, ValidationError};
use std::sync::Arc;
use todo_core::{
    effect::Effect, environment::IdGenerator, reducer::Reducer, smallvec, SmallVec,
};

/// Environment dependencies for the todo reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Source of ids for new todos
    pub ids: Arc<dyn IdGenerator>,
    /// Where the collection is persisted
    pub storage: TodoStorage,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment`
    #[must_use]
    pub fn new(ids: Arc<dyn IdGenerator>, storage: TodoStorage) -> Self {
        Self { ids, storage }
    }
}

/// Reducer for the todo list
#[derive(Clone, Debug)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates the draft for a submit
    ///
    /// Duplicates are only refused when creating; an update may keep (or
    /// take) any non-blank text.
    fn validate_submit(state: &TodoState) -> Result<(), ValidationError> {
        if state.draft.trim().is_empty() {
            return Err(ValidationError::EmptyText);
        }

        if state.editing_id.is_none() && state.todos.iter().any(|t| t.same_text_as(&state.draft)) {
            return Err(ValidationError::Duplicate);
        }

        Ok(())
    }

    /// Draws ids until one is not already in the collection
    fn fresh_id(state: &TodoState, ids: &dyn IdGenerator) -> TodoId {
        loop {
            let id = TodoId::new(ids.next_id());
            if !state.exists(&id) {
                return id;
            }
            tracing::debug!(%id, "Generated id already in use, drawing another");
        }
    }

    /// Persist the current collection
    fn persist(state: &TodoState, env: &TodoEnvironment) -> SmallVec<[Effect<TodoAction>; 4]> {
        let storage = env.storage.clone();
        let snapshot = state.todos.clone();
        smallvec![Effect::future(async move {
            if let Err(error) = storage.save(&snapshot) {
                tracing::error!(%error, count = snapshot.len(), "Error saving todos");
            } else {
                tracing::trace!(count = snapshot.len(), "Saved todos");
            }
            None
        })]
    }

    fn submit(state: &mut TodoState, env: &TodoEnvironment) -> SmallVec<[Effect<TodoAction>; 4]> {
        state.error = None;

        if let Err(error) = Self::validate_submit(state) {
            tracing::debug!(%error, "Submit rejected");
            if error == ValidationError::Duplicate {
                state.draft.clear();
            }
            state.error = Some(error);
            return SmallVec::new();
        }

        let text = std::mem::take(&mut state.draft);
        if let Some(id) = state.editing_id.take() {
            match state.todos.iter_mut().find(|t| t.id == id) {
                Some(todo) => todo.text = text,
                None => tracing::debug!(%id, "Edited todo no longer exists"),
            }
        } else {
            let id = Self::fresh_id(state, env.ids.as_ref());
            tracing::debug!(%id, "Adding todo");
            state.todos.push(TodoItem::new(id, text));
        }

        Self::persist(state, env)
    }
}

impl Default for TodoReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TodoAction::DraftChanged { text } => {
                state.draft = text;
                SmallVec::new()
            },

            TodoAction::Submit => Self::submit(state, env),

            TodoAction::ToggleComplete { id } => {
                if let Some(todo) = state.todos.iter_mut().find(|t| t.id == id) {
                    todo.completed = !todo.completed;
                }
                Self::persist(state, env)
            },

            TodoAction::Remove { id } => {
                state.todos.retain(|t| t.id != id);
                if state.editing_id.as_ref() == Some(&id) {
                    state.editing_id = None;
                }
                Self::persist(state, env)
            },

            TodoAction::BeginEdit { id, text } => {
                state.draft = text;
                state.editing_id = Some(id);
                state.error = None;
                SmallVec::new()
            },
        }
    }
}
