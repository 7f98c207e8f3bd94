//! Todo service: the JSON API under `/api` and a script-free page at `/`.
//!
//! Both the JSON endpoints and the page's form action validate with
//! `todo_core::validate`, the same code the client runs before submitting.

pub mod config;
pub mod error;
pub mod page;

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde_json::Value;
use todo_core::validate::{validate_create, validate_update};
use todo_core::{CreateTodo, Todo, UpdateTodo, Validation};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub use error::ServerError;

/// In-memory todo table. `Vec` keeps insertion order, which is display order.
#[derive(Debug, Clone, Default)]
pub struct Db {
    todos: Arc<RwLock<Vec<Todo>>>,
}

impl Db {
    pub async fn list(&self) -> Vec<Todo> {
        self.todos.read().await.clone()
    }

    pub async fn insert(&self, input: CreateTodo) -> Todo {
        let todo = Todo::new(Uuid::new_v4(), input.title, Utc::now());
        self.todos.write().await.push(todo.clone());
        tracing::info!(id = %todo.id, "todo created");
        todo
    }

    pub async fn get(&self, id: Uuid) -> Option<Todo> {
        self.todos.read().await.iter().find(|t| t.id == id).cloned()
    }

    pub async fn update(&self, id: Uuid, input: &UpdateTodo) -> Option<Todo> {
        let mut todos = self.todos.write().await;
        let todo = todos.iter_mut().find(|t| t.id == id)?;
        input.apply_to(todo);
        todo.updated_at = Utc::now();
        Some(todo.clone())
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        let mut todos = self.todos.write().await;
        let before = todos.len();
        todos.retain(|t| t.id != id);
        todos.len() != before
    }
}

pub fn app() -> Router {
    app_with(Db::default())
}

pub fn app_with(db: Db) -> Router {
    let api = Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        );

    Router::new()
        .route("/", get(page::show).post(page::submit))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_todos(State(db): State<Db>) -> Json<Vec<Todo>> {
    Json(db.list().await)
}

async fn create_todo(
    State(db): State<Db>,
    Json(candidate): Json<Value>,
) -> Result<(StatusCode, Json<Todo>), ServerError> {
    let input = match validate_create(&candidate) {
        Validation::Valid(input) => input,
        Validation::Invalid(errors) => return Err(ServerError::Validation(errors)),
    };
    Ok((StatusCode::CREATED, Json(db.insert(input).await)))
}

async fn get_todo(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<Json<Todo>, ServerError> {
    db.get(id).await.map(Json).ok_or(ServerError::NotFound(id))
}

async fn update_todo(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(candidate): Json<Value>,
) -> Result<Json<Todo>, ServerError> {
    let input = validate_update(&candidate)
        .into_result()
        .map_err(ServerError::Validation)?;
    db.update(id, &input)
        .await
        .map(Json)
        .ok_or(ServerError::NotFound(id))
}

async fn delete_todo(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    if db.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ServerError::NotFound(id))
    }
}
