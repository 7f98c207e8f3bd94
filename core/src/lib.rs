//! Client core for the todo service.
//!
//! # Overview
//! Everything between a todo UI and the REST backend that is not rendering:
//! the shared schema validator, an HTTP gateway over a pluggable transport,
//! a repository, and a reactive store that applies optimistic updates and
//! keeps itself aligned with freshly loaded route data.
//!
//! # Design
//! - `ApiClient` is the only code that performs network I/O, through a
//!   `Transport`; it normalizes failures into `ApiError`.
//! - `TodoStore` never returns errors; they become its `error` state.
//! - Dependencies are passed explicitly: the store takes a repository, the
//!   repository takes a client, the client takes a transport.
//! - Single-threaded state (`Rc<RefCell<..>>`), matching one UI event loop.

pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod http;
pub mod i18n;
pub mod observable;
pub mod repository;
pub mod store;
pub mod sync;
pub mod transport;
pub mod types;
pub mod validate;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{ApiClient, RequestOptions};
pub use config::{AppConfig, ConfigError, Environment};
pub use error::{ApiError, TransportError};
pub use form::FormOutcome;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use i18n::{Catalog, Locale};
pub use observable::{Observable, Subscription};
pub use repository::{HttpTodoRepository, TodoRepository};
pub use store::{StoreState, TodoCounts, TodoStore};
pub use sync::SyncBridge;
pub use transport::ReqwestTransport;
pub use types::{CreateTodo, Todo, UpdateTodo};
pub use validate::{FieldError, FieldErrorKind, FieldErrors, Validation};
