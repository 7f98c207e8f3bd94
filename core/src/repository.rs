//! Todo repository: domain operations on top of the gateway.
//!
//! `TodoRepository` is the seam the store depends on; `HttpTodoRepository`
//! talks to the REST contract (`/todos`, `/todos/{id}`) through `ApiClient`.

use std::future::Future;

use uuid::Uuid;

use crate::client::{ApiClient, RequestOptions};
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::http::Transport;
use crate::transport::ReqwestTransport;
use crate::types::{CreateTodo, Todo, UpdateTodo};

pub trait TodoRepository {
    fn fetch_all(&self) -> impl Future<Output = Result<Vec<Todo>, ApiError>>;

    fn create(&self, input: &CreateTodo) -> impl Future<Output = Result<Todo, ApiError>>;

    fn update(
        &self,
        id: Uuid,
        input: &UpdateTodo,
    ) -> impl Future<Output = Result<Todo, ApiError>>;

    fn delete(&self, id: Uuid) -> impl Future<Output = Result<(), ApiError>>;
}

#[derive(Debug, Clone)]
pub struct HttpTodoRepository<T> {
    client: ApiClient<T>,
    options: RequestOptions,
}

impl HttpTodoRepository<ReqwestTransport> {
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(ApiClient::new(config.api_base(), ReqwestTransport::new()))
    }
}

impl<T: Transport> HttpTodoRepository<T> {
    pub fn new(client: ApiClient<T>) -> Self {
        Self {
            client,
            options: RequestOptions::default(),
        }
    }
}

fn require<R>(body: Option<R>) -> Result<R, ApiError> {
    body.ok_or_else(|| ApiError::Network("expected a response body".to_string()))
}

impl<T: Transport> TodoRepository for HttpTodoRepository<T> {
    async fn fetch_all(&self) -> Result<Vec<Todo>, ApiError> {
        let todos = self.client.get("/todos", &self.options).await?;
        Ok(todos.unwrap_or_default())
    }

    async fn create(&self, input: &CreateTodo) -> Result<Todo, ApiError> {
        require(self.client.post("/todos", input, &self.options).await?)
    }

    async fn update(&self, id: Uuid, input: &UpdateTodo) -> Result<Todo, ApiError> {
        require(
            self.client
                .put(&format!("/todos/{id}"), input, &self.options)
                .await?,
        )
    }

    async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        let _: Option<serde_json::Value> = self
            .client
            .delete(&format!("/todos/{id}"), &self.options)
            .await?;
        Ok(())
    }
}
