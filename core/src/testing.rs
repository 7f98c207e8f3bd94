//! In-crate test doubles for the transport and repository seams.

use std::cell::RefCell;
use std::collections::VecDeque;

use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::error::{ApiError, TransportError};
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::repository::TodoRepository;
use crate::types::{CreateTodo, Todo, UpdateTodo};

pub(crate) fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub(crate) fn todo(n: u128, title: &str, completed: bool) -> Todo {
    let mut todo = Todo::new(Uuid::from_u128(n), title, fixed_time());
    todo.completed = completed;
    todo
}

/// Records every request and replays scripted responses in order.
#[derive(Default)]
pub(crate) struct RecordingTransport {
    pub requests: RefCell<Vec<HttpRequest>>,
    responses: RefCell<VecDeque<Result<HttpResponse, TransportError>>>,
}

impl RecordingTransport {
    pub fn respond(&self, status: u16, status_text: &str, body: &str) -> &Self {
        self.responses
            .borrow_mut()
            .push_back(Ok(HttpResponse::new(status, status_text, body)));
        self
    }

    pub fn fail(&self, cause: &str) -> &Self {
        self.responses
            .borrow_mut()
            .push_back(Err(TransportError::new(cause)));
        self
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests
            .borrow()
            .last()
            .cloned()
            .expect("no request recorded")
    }
}

impl Transport for RecordingTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.borrow_mut().push(request);
        let next = self.responses.borrow_mut().pop_front();
        next.unwrap_or_else(|| Err(TransportError::new("no scripted response")))
    }
}

struct Step {
    gate: Option<oneshot::Receiver<()>>,
    failure: Option<ApiError>,
}

/// In-memory repository acting as the remote service.
///
/// Each call consumes one scripted step, if any. A step can fail the call
/// and/or hold it until the paired sender fires, which is how tests park a
/// request in flight.
#[derive(Default)]
pub(crate) struct FakeRepository {
    pub todos: RefCell<Vec<Todo>>,
    steps: RefCell<VecDeque<Step>>,
    pub calls: RefCell<Vec<String>>,
    next_id: RefCell<u128>,
}

impl FakeRepository {
    pub fn with_todos(todos: Vec<Todo>) -> Self {
        let repo = Self::default();
        *repo.next_id.borrow_mut() = 1000;
        *repo.todos.borrow_mut() = todos;
        repo
    }

    pub fn fail_next(&self, error: ApiError) {
        self.steps.borrow_mut().push_back(Step {
            gate: None,
            failure: Some(error),
        });
    }

    /// Park the next call until the returned sender fires (or is dropped).
    pub fn hold_next(&self, failure: Option<ApiError>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.steps.borrow_mut().push_back(Step {
            gate: Some(rx),
            failure,
        });
        tx
    }

    async fn step(&self, call: String) -> Result<(), ApiError> {
        self.calls.borrow_mut().push(call);
        let step = self.steps.borrow_mut().pop_front();
        let Some(step) = step else {
            return Ok(());
        };
        if let Some(gate) = step.gate {
            let _ = gate.await;
        }
        match step.failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

pub(crate) fn not_found() -> ApiError {
    ApiError::Http {
        status: 404,
        status_text: "Not Found".to_string(),
    }
}

impl TodoRepository for FakeRepository {
    async fn fetch_all(&self) -> Result<Vec<Todo>, ApiError> {
        self.step("fetch_all".to_string()).await?;
        Ok(self.todos.borrow().clone())
    }

    async fn create(&self, input: &CreateTodo) -> Result<Todo, ApiError> {
        self.step(format!("create {}", input.title)).await?;
        let id = {
            let mut next = self.next_id.borrow_mut();
            *next += 1;
            *next
        };
        let todo = Todo::new(Uuid::from_u128(id), input.title.clone(), fixed_time());
        self.todos.borrow_mut().push(todo.clone());
        Ok(todo)
    }

    async fn update(&self, id: Uuid, input: &UpdateTodo) -> Result<Todo, ApiError> {
        self.step(format!("update {id}")).await?;
        let mut todos = self.todos.borrow_mut();
        let todo = todos.iter_mut().find(|t| t.id == id).ok_or_else(not_found)?;
        input.apply_to(todo);
        Ok(todo.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        self.step(format!("delete {id}")).await?;
        let mut todos = self.todos.borrow_mut();
        let before = todos.len();
        todos.retain(|t| t.id != id);
        if todos.len() == before {
            return Err(not_found());
        }
        Ok(())
    }
}
