//! Print the current todo list from the configured API.
//!
//! Reads `API_BASE`, `APP_ENV` and `LANG` (optionally from `.env`), and
//! `RUST_LOG` for log filtering.

use std::process::ExitCode;

use todo_core::view::{render_text, TodoListView};
use todo_core::{AppConfig, HttpTodoRepository, Locale, TodoStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(%error, "configuration error");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(api_base = config.api_base(), environment = %config.environment(), "configuration loaded");

    let locale = std::env::var("LANG")
        .map(|tag| Locale::from_tag(&tag))
        .unwrap_or_default();

    let store = TodoStore::new(HttpTodoRepository::from_config(&config));
    store.load().await;

    print!("{}", render_text(&TodoListView::from_store(&store, locale)));
    if store.error().is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
