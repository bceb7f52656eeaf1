//! Line-oriented terminal front end.
//!
//! Each input line is one gesture. Rows are addressed by the 1-based number
//! printed next to them in the most recent screen.

use crate::app::TodoApp;
use crate::types::TodoAction;
use crate::view::View;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Shown for `help` and after an unrecognised line
pub const HELP: &str = "\
commands:
  type <text>   put <text> in the input
  submit        add the input as a todo (or save the edit)
  add <text>    type <text> and submit
  toggle <n>    complete / undo row n
  edit <n>      load row n into the input for editing
  delete <n>    delete row n
  show          print the list again
  help          this text
  quit          leave";

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Replace the input text
    Type(String),
    /// Submit the input
    Submit,
    /// Replace the input text, then submit
    Add(String),
    /// Toggle the row with this number
    Toggle(usize),
    /// Edit the row with this number
    Edit(usize),
    /// Delete the row with this number
    Delete(usize),
    /// Re-print the screen
    Show,
    /// Print usage
    Help,
    /// Leave the shell
    Quit,
}

/// Lines that cannot be turned into gestures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Nothing but whitespace
    #[error("empty command")]
    Empty,
    /// First word is not a command
    #[error("unknown command {0:?}")]
    Unknown(String),
    /// A row command without a row number
    #[error("{0} needs a row number")]
    MissingRow(&'static str),
    /// A row argument that is not a positive number
    #[error("{0:?} is not a row number")]
    BadRow(String),
    /// A row number past the end of the list
    #[error("there is no row {0}")]
    NoSuchRow(usize),
}

impl Command {
    /// Parse one input line
    ///
    /// Text after `type` / `add` is kept verbatim apart from the single
    /// separating space.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] for blank lines, unknown commands and bad
    /// row arguments.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let trimmed = line.trim_start();
        if trimmed.trim().is_empty() {
            return Err(CommandError::Empty);
        }

        let (word, rest) = trimmed
            .split_once(char::is_whitespace)
            .unwrap_or((trimmed, ""));
        match word.to_ascii_lowercase().as_str() {
            "type" => Ok(Self::Type(rest.to_string())),
            "add" => Ok(Self::Add(rest.to_string())),
            "submit" => Ok(Self::Submit),
            "toggle" => row_number("toggle", rest).map(Self::Toggle),
            "edit" => row_number("edit", rest).map(Self::Edit),
            "delete" => row_number("delete", rest).map(Self::Delete),
            "show" => Ok(Self::Show),
            "help" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }

    /// Actions this command dispatches against the screen `view`
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::NoSuchRow`] if a row number is not on screen.
    pub fn actions(&self, view: &View) -> Result<Vec<TodoAction>, CommandError> {
        let row = |n: usize| view.row(n).ok_or(CommandError::NoSuchRow(n));
        let actions = match self {
            Self::Type(text) => vec![TodoAction::DraftChanged { text: text.clone() }],
            Self::Submit => vec![TodoAction::Submit],
            Self::Add(text) => vec![
                TodoAction::DraftChanged { text: text.clone() },
                TodoAction::Submit,
            ],
            Self::Toggle(n) => vec![row(*n)?.toggle.gesture.clone().into_action()],
            Self::Edit(n) => vec![row(*n)?.edit.gesture.clone().into_action()],
            Self::Delete(n) => vec![row(*n)?.delete.gesture.clone().into_action()],
            Self::Show | Self::Help | Self::Quit => Vec::new(),
        };
        Ok(actions)
    }
}

fn row_number(command: &'static str, arg: &str) -> Result<usize, CommandError> {
    let arg = arg.trim();
    if arg.is_empty() {
        return Err(CommandError::MissingRow(command));
    }
    arg.parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| CommandError::BadRow(arg.to_string()))
}

/// Drive `app` from `input` until `quit` or end of input, printing each
/// screen to `output`
///
/// # Errors
///
/// Returns an error if reading input, writing output, or the store fails.
pub async fn run<R, W>(app: &TodoApp, input: R, mut output: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut view = app.view().await;
    output.write_all(format!("{view}\n").as_bytes()).await?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(CommandError::Empty) => continue,
            Err(error) => {
                output
                    .write_all(format!("{error}\n{HELP}\n").as_bytes())
                    .await?;
                continue;
            },
        };

        match command {
            Command::Quit => break,
            Command::Help => {
                output.write_all(format!("{HELP}\n").as_bytes()).await?;
                continue;
            },
            _ => {},
        }

        match command.actions(&view) {
            Ok(actions) => {
                for action in actions {
                    app.dispatch(action).await?;
                }
                view = app.view().await;
                output.write_all(format!("{view}\n").as_bytes()).await?;
            },
            Err(error) => {
                output.write_all(format!("{error}\n").as_bytes()).await?;
            },
        }
    }

    output.flush().await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::reducer::TodoEnvironment;
    use crate::storage::TodoStorage;
    use crate::types::{TodoId, TodoItem, TodoState};
    use crate::view::render;
    use std::sync::Arc;
    use todo_testing::{InMemoryKeyValueStore, SequentialIdGenerator};

    #[test]
    fn parses_text_commands_verbatim() {
        assert_eq!(
            Command::parse("add  Buy milk ").unwrap(),
            Command::Add(" Buy milk ".into())
        );
        assert_eq!(Command::parse("type").unwrap(), Command::Type(String::new()));
        assert_eq!(Command::parse("SUBMIT\r\n").unwrap(), Command::Submit);
    }

    #[test]
    fn parses_row_commands() {
        assert_eq!(Command::parse("toggle 2").unwrap(), Command::Toggle(2));
        assert_eq!(Command::parse("edit  1 ").unwrap(), Command::Edit(1));
        assert_eq!(Command::parse("delete 3").unwrap(), Command::Delete(3));
    }

    #[test]
    fn tab_separates_command_from_argument() {
        assert_eq!(
            Command::parse("add\tBuy milk").unwrap(),
            Command::Add("Buy milk".into())
        );
        assert_eq!(Command::parse("toggle\t2").unwrap(), Command::Toggle(2));
    }

    #[test]
    fn rejects_bad_lines() {
        assert_eq!(Command::parse("   "), Err(CommandError::Empty));
        assert_eq!(
            Command::parse("frobnicate"),
            Err(CommandError::Unknown("frobnicate".into()))
        );
        assert_eq!(Command::parse("toggle"), Err(CommandError::MissingRow("toggle")));
        assert_eq!(Command::parse("edit 0"), Err(CommandError::BadRow("0".into())));
        assert_eq!(Command::parse("delete x"), Err(CommandError::BadRow("x".into())));
    }

    #[test]
    fn row_commands_resolve_against_view() {
        let state = TodoState::with_todos(vec![TodoItem::new(TodoId::new("a"), "A".into())]);
        let view = render(&state);

        assert_eq!(
            Command::Toggle(1).actions(&view).unwrap(),
            vec![TodoAction::ToggleComplete { id: TodoId::new("a") }]
        );
        assert_eq!(
            Command::Edit(1).actions(&view).unwrap(),
            vec![TodoAction::BeginEdit {
                id: TodoId::new("a"),
                text: "A".into()
            }]
        );
        assert_eq!(Command::Delete(2).actions(&view), Err(CommandError::NoSuchRow(2)));
    }

    #[tokio::test]
    async fn run_drives_app_and_prints_screens() {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let app = TodoApp::open(TodoEnvironment::new(
            Arc::new(SequentialIdGenerator::new()),
            TodoStorage::new(kv.clone()),
        ));

        let script = "add Buy milk\nadd Walk dog\ntoggle 1\nbogus\ndelete 9\nedit 2\ntype Walk cat\nsubmit\nquit\nadd ignored\n";
        let mut out = Vec::new();
        run(&app, script.as_bytes(), &mut out).await.unwrap();

        let state = app.snapshot().await;
        let texts: Vec<_> = state.todos.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["Buy milk", "Walk cat"]);
        assert!(state.todos[0].completed);

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("unknown command \"bogus\""));
        assert!(printed.contains("there is no row 9"));
        assert!(printed.contains("[Update Todo]"));
        assert!(printed.trim_end().ends_with("You have 2 todos"));
    }
}
