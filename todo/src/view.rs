//! Derives the displayed screen from state.
//!
//! [`render`] is a pure function; it is called again after every action and
//! never touches storage. Each control carries the [`Gesture`] it triggers so a
//! front end only has to map input to controls.

use crate::types::{Mode, TodoAction, TodoId, TodoState};
use std::fmt;

/// Screen heading
pub const HEADING: &str = "Todo List";

/// A user gesture bound to a control
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Gesture {
    /// Submit the form
    Submit,
    /// Flip an item's completion flag
    ToggleComplete(TodoId),
    /// Start editing an item with its current text
    BeginEdit(TodoId, String),
    /// Delete an item
    Remove(TodoId),
}

impl Gesture {
    /// The action this gesture dispatches
    #[must_use]
    pub fn into_action(self) -> TodoAction {
        match self {
            Self::Submit => TodoAction::Submit,
            Self::ToggleComplete(id) => TodoAction::ToggleComplete { id },
            Self::BeginEdit(id, text) => TodoAction::BeginEdit { id, text },
            Self::Remove(id) => TodoAction::Remove { id },
        }
    }
}

/// A labelled control
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Button {
    /// Text on the control
    pub label: &'static str,
    /// What pressing it does
    pub gesture: Gesture,
}

/// Validation message shown above the form
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorBanner {
    /// Always "Error"
    pub title: &'static str,
    /// The validation message
    pub message: String,
}

/// The text input
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Input {
    /// Current draft text
    pub value: String,
    /// Hint shown while the input is empty
    pub placeholder: &'static str,
}

/// One todo in the list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    /// Item the row shows
    pub id: TodoId,
    /// Item text
    pub text: String,
    /// Drawn struck through when the item is completed
    pub struck: bool,
    /// Complete/Undo
    pub toggle: Button,
    /// Edit
    pub edit: Button,
    /// Delete
    pub delete: Button,
}

impl Row {
    /// Row controls in display order
    #[must_use]
    pub fn controls(&self) -> [&Button; 3] {
        [&self.toggle, &self.edit, &self.delete]
    }
}

/// The whole screen
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct View {
    /// Screen heading
    pub heading: &'static str,
    /// Present only while a validation error is set
    pub error: Option<ErrorBanner>,
    /// The text input
    pub input: Input,
    /// Add/Update button
    pub submit: Button,
    /// Present only when there is at least one todo
    pub list: Option<Vec<Row>>,
    /// "You have N todos"
    pub footer: String,
}

impl View {
    /// Rows in display order; empty when no list is shown
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        self.list.as_deref().unwrap_or_default()
    }

    /// Row by its 1-based position on screen
    #[must_use]
    pub fn row(&self, number: usize) -> Option<&Row> {
        number.checked_sub(1).and_then(|i| self.rows().get(i))
    }
}

/// Derive the screen from `state`
#[must_use]
pub fn render(state: &TodoState) -> View {
    let editing = matches!(state.mode(), Mode::Editing(_));

    let rows: Vec<Row> = state
        .todos
        .iter()
        .map(|todo| Row {
            id: todo.id.clone(),
            text: todo.text.clone(),
            struck: todo.completed,
            toggle: Button {
                label: if todo.completed { "Undo" } else { "Complete" },
                gesture: Gesture::ToggleComplete(todo.id.clone()),
            },
            edit: Button {
                label: "Edit",
                gesture: Gesture::BeginEdit(todo.id.clone(), todo.text.clone()),
            },
            delete: Button {
                label: "Delete",
                gesture: Gesture::Remove(todo.id.clone()),
            },
        })
        .collect();

    View {
        heading: HEADING,
        error: state.error.map(|e| ErrorBanner {
            title: "Error",
            message: e.to_string(),
        }),
        input: Input {
            value: state.draft.clone(),
            placeholder: if editing { "Edit todo" } else { "Add a new todo" },
        },
        submit: Button {
            label: if editing { "Update Todo" } else { "Add Todo" },
            gesture: Gesture::Submit,
        },
        list: (!rows.is_empty()).then_some(rows),
        footer: format!("You have {} todos", state.count()),
    }
}

/// Combining long stroke overlay, drawn after every character
const STRIKE: char = '\u{0336}';

fn strike(text: &str) -> String {
    text.chars().flat_map(|c| [c, STRIKE]).collect()
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ==", self.heading)?;

        if let Some(banner) = &self.error {
            writeln!(f, "!! {}: {}", banner.title, banner.message)?;
        }

        if self.input.value.is_empty() {
            writeln!(f, "> ({})", self.input.placeholder)?;
        } else {
            writeln!(f, "> {}", self.input.value)?;
        }
        writeln!(f, "  [{}]", self.submit.label)?;

        for (i, row) in self.rows().iter().enumerate() {
            let (mark, text) = if row.struck {
                ("x", strike(&row.text))
            } else {
                (" ", row.text.clone())
            };
            let controls: Vec<&str> = row.controls().iter().map(|b| b.label).collect();
            writeln!(f, "{:>3}. [{mark}] {text}  ({})", i + 1, controls.join(" | "))?;
        }

        write!(f, "{}", self.footer)
    }
}
