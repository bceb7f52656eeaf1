//! Interactive terminal todo list.
//!
//! Reads gestures from stdin, prints the screen to stdout and logs to stderr.

use anyhow::Context;
use std::sync::Arc;
use todo::{shell, Config, FileKeyValueStore, TodoApp, TodoEnvironment, TodoStorage};
use todo_core::environment::{SystemClock, TimestampIdGenerator};
use todo_runtime::StoreConfig;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("invalid configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_new(&config.log_filter)
                .unwrap_or_else(|_| todo::config::DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let storage = if config.storage.disabled {
        tracing::info!("Persistent storage disabled");
        TodoStorage::unavailable()
    } else {
        tracing::info!(path = %config.storage.path.display(), "Using file storage");
        TodoStorage::new(Arc::new(FileKeyValueStore::new(&config.storage.path)))
    };
    let ids = Arc::new(TimestampIdGenerator::new(Arc::new(SystemClock)));

    let app = TodoApp::open_with_config(
        TodoEnvironment::new(ids, storage),
        StoreConfig::default().with_max_feedback_actions(config.runtime.max_feedback_actions),
    );

    shell::run(&app, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}
