//! Domain types for the todo list.
//!
//! A todo list is an ordered collection of short text items that can be
//! created, edited, completed, and deleted. Alongside the collection the
//! state carries what the input field currently holds, which item (if any)
//! the input is editing, and the last validation error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unique identifier for a todo item
///
/// Opaque: nothing may be inferred from its contents, only compared.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    /// Wraps an existing identifier
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single todo item
///
/// Serializes as `{"id": string, "text": string, "completed": bool}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Unique identifier
    pub id: TodoId,
    /// Text exactly as it was typed
    pub text: String,
    /// Whether the todo is completed
    pub completed: bool,
}

impl TodoItem {
    /// Creates a new, not yet completed, todo item
    #[must_use]
    pub const fn new(id: TodoId, text: String) -> Self {
        Self {
            id,
            text,
            completed: false,
        }
    }

    /// Whether this item's text matches `text`, ignoring case and
    /// surrounding whitespace
    #[must_use]
    pub fn same_text_as(&self, text: &str) -> bool {
        self.text.trim().to_lowercase() == text.trim().to_lowercase()
    }
}

/// Validation failures shown to the user
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Submitted draft was empty or whitespace only
    #[error("Please add some text to your todo.")]
    EmptyText,
    /// A new todo would duplicate an existing one
    #[error("This todo already exists.")]
    Duplicate,
}

/// Whether a submit creates a new item or updates an existing one
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Submitting creates a new item
    Idle,
    /// Submitting replaces the text of the item with this id
    Editing(TodoId),
}

/// State of the todo list screen
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoState {
    /// All todos in display order
    pub todos: Vec<TodoItem>,
    /// Current, uncommitted content of the input field
    pub draft: String,
    /// Item the input field is editing, if any
    pub editing_id: Option<TodoId>,
    /// Last validation error (if any)
    pub error: Option<ValidationError>,
}

impl TodoState {
    /// Creates a new empty todo state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an idle state around an existing collection
    #[must_use]
    pub fn with_todos(todos: Vec<TodoItem>) -> Self {
        Self {
            todos,
            ..Self::default()
        }
    }

    /// Returns the number of todos
    #[must_use]
    pub fn count(&self) -> usize {
        self.todos.len()
    }

    /// Returns the number of completed todos
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|t| t.completed).count()
    }

    /// Returns a todo by ID
    #[must_use]
    pub fn get(&self, id: &TodoId) -> Option<&TodoItem> {
        self.todos.iter().find(|t| &t.id == id)
    }

    /// Checks if a todo exists
    #[must_use]
    pub fn exists(&self, id: &TodoId) -> bool {
        self.get(id).is_some()
    }

    /// Current editing mode
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.editing_id
            .clone()
            .map_or(Mode::Idle, Mode::Editing)
    }
}

/// Everything a user can do to the todo list
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TodoAction {
    /// The input field now holds `text`
    DraftChanged {
        /// New input content
        text: String,
    },

    /// Commit the draft: create a new item, or update the one being edited
    Submit,

    /// Flip the completion flag of an item
    ToggleComplete {
        /// Item to toggle
        id: TodoId,
    },

    /// Delete an item
    Remove {
        /// Item to delete
        id: TodoId,
    },

    /// Load an item's text into the input field for editing
    BeginEdit {
        /// Item to edit
        id: TodoId,
        /// The item's text as shown
        text: String,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: &str, text: &str) -> TodoItem {
        TodoItem::new(TodoId::new(id), text.to_string())
    }

    #[test]
    fn todo_item_new_is_not_completed() {
        let todo = item("1", "Buy milk");
        assert_eq!(todo.text, "Buy milk");
        assert!(!todo.completed);
    }

    #[test]
    fn same_text_ignores_case_and_padding() {
        let todo = item("1", "Buy milk");
        assert!(todo.same_text_as("buy MILK"));
        assert!(todo.same_text_as("  Buy milk "));
        assert!(!todo.same_text_as("Buy bread"));
    }

    #[test]
    fn todo_item_serializes_as_flat_object() {
        let json = serde_json::to_string(&item("1700000000000", "Buy milk")).unwrap();
        assert_eq!(
            json,
            r#"{"id":"1700000000000","text":"Buy milk","completed":false}"#
        );
    }

    #[test]
    fn validation_messages_match_ui_copy() {
        assert_eq!(
            ValidationError::EmptyText.to_string(),
            "Please add some text to your todo."
        );
        assert_eq!(ValidationError::Duplicate.to_string(), "This todo already exists.");
    }

    #[test]
    fn todo_state_counts() {
        let mut state = TodoState::with_todos(vec![item("1", "A"), item("2", "B")]);
        assert_eq!(state.count(), 2);
        assert_eq!(state.completed_count(), 0);

        state.todos[1].completed = true;
        assert_eq!(state.completed_count(), 1);
        assert!(state.exists(&TodoId::new("2")));
        assert!(!state.exists(&TodoId::new("3")));
    }

    #[test]
    fn mode_follows_editing_id() {
        let mut state = TodoState::new();
        assert_eq!(state.mode(), Mode::Idle);

        state.editing_id = Some(TodoId::new("7"));
        assert_eq!(state.mode(), Mode::Editing(TodoId::new("7")));
    }
}
