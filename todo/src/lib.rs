//! Todo list manager built on the reducer architecture.
//!
//! Create, edit, complete, and delete short text items. The collection is
//! kept in a host key-value store under a single key and reloaded on start.
//!
//! - [`types`]: todos, state, actions, validation errors
//! - [`reducer`]: the command handlers
//! - [`storage`]: the storage adapter and a file-backed key-value store
//! - [`view`]: state → screen, with gestures bound to controls
//! - [`app`]: a store wired to storage
//! - [`shell`]: the line-oriented terminal front end
//! - [`config`]: environment-variable configuration
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use todo::{FileKeyValueStore, TodoApp, TodoEnvironment, TodoStorage};
//! use todo_core::environment::{SystemClock, TimestampIdGenerator};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = TodoStorage::new(Arc::new(FileKeyValueStore::new("todos.json")));
//! let ids = Arc::new(TimestampIdGenerator::new(Arc::new(SystemClock)));
//! let app = TodoApp::open(TodoEnvironment::new(ids, storage));
//!
//! let view = app.submit("Buy milk").await?;
//! println!("{view}");
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod config;
pub mod reducer;
pub mod shell;
pub mod storage;
pub mod types;
pub mod view;

// Re-export commonly used types
pub use app::{TodoApp, TodoStore};
pub use config::{Config, ConfigError};
pub use reducer::{TodoEnvironment, TodoReducer};
pub use storage::{FileKeyValueStore, STORAGE_KEY, TodoStorage};
pub use types::{Mode, TodoAction, TodoId, TodoItem, TodoState, ValidationError};
pub use view::{render, Gesture, View};
