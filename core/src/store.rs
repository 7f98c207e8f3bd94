//! Reactive entity store for the todo list.
//!
//! # Design
//! `TodoStore` owns an [`Observable<StoreState>`] and a repository. Public
//! operations never fail: every error becomes the `error` field, and a
//! successful operation clears it. Callers learn the outcome by reading the
//! state once the operation's future settles.
//!
//! Disciplines per operation:
//!
//! - `load` / `create`: set `loading`, clear `error`, call the repository,
//!   reconcile, and clear `loading` in a final step whatever the outcome.
//! - `toggle`: optimistic. The flip is visible to observers before the
//!   request is sent; on failure the value captured at the start of that
//!   invocation is restored.
//! - `update` / `delete`: pessimistic. Local state changes only after the
//!   repository confirms.
//!
//! All writes happen on one event loop. No `RefCell` borrow is held across an
//! `.await`, so several operations can be in flight at once.
//!
//! Items arriving from `load` or the sync bridge are merged by id: an entity
//! with a toggle in flight keeps its local `completed` value until that
//! toggle settles.
//!
//! After [`TodoStore::dispose`], results of in-flight calls are dropped and
//! no state is written.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet};

use uuid::Uuid;

use crate::error::ApiError;
use crate::observable::{Observable, Subscription};
use crate::repository::TodoRepository;
use crate::types::{CreateTodo, Todo, UpdateTodo};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreState {
    /// Display order is insertion order; ids are unique.
    pub items: Vec<Todo>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TodoCounts {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

/// How a single store operation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Settlement {
    Applied,
    Failed(String),
    /// The store was disposed; nothing was sent or written.
    Dropped,
}

impl Settlement {
    fn of<T>(result: &Result<T, ApiError>) -> Self {
        match result {
            Ok(_) => Settlement::Applied,
            Err(error) => Settlement::Failed(error.to_string()),
        }
    }
}

/// Marks a toggle in flight for one id until dropped, including when the
/// toggle future itself is dropped mid-request.
struct PendingToggle<'a> {
    in_flight: &'a RefCell<HashMap<Uuid, usize>>,
    id: Uuid,
}

impl Drop for PendingToggle<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.in_flight.borrow_mut();
        if let Some(count) = in_flight.get_mut(&self.id) {
            *count -= 1;
            if *count == 0 {
                in_flight.remove(&self.id);
            }
        }
    }
}

pub struct TodoStore<R> {
    repository: R,
    state: Observable<StoreState>,
    in_flight: RefCell<HashMap<Uuid, usize>>,
    live: Cell<bool>,
}

impl<R: TodoRepository> TodoStore<R> {
    pub fn new(repository: R) -> Self {
        Self::with_items(repository, Vec::new())
    }

    /// Build a store seeded with route-loaded data.
    pub fn with_items(repository: R, items: Vec<Todo>) -> Self {
        Self {
            repository,
            state: Observable::new(StoreState {
                items: dedupe(items),
                ..StoreState::default()
            }),
            in_flight: RefCell::new(HashMap::new()),
            live: Cell::new(true),
        }
    }

    pub fn state(&self) -> StoreState {
        self.state.get()
    }

    pub fn items(&self) -> Vec<Todo> {
        self.state.with(|s| s.items.clone())
    }

    pub fn loading(&self) -> bool {
        self.state.with(|s| s.loading)
    }

    pub fn error(&self) -> Option<String> {
        self.state.with(|s| s.error.clone())
    }

    pub fn version(&self) -> u64 {
        self.state.version()
    }

    pub fn subscribe(&self, callback: impl Fn(&StoreState) + 'static) -> Subscription {
        self.state.subscribe(callback)
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn is_live(&self) -> bool {
        self.live.get()
    }

    /// Tear the store down. In-flight results are discarded from now on.
    pub fn dispose(&self) {
        self.live.set(false);
    }

    /// Whether a toggle for `id` is waiting on the repository.
    pub fn has_pending(&self, id: Uuid) -> bool {
        self.in_flight.borrow().contains_key(&id)
    }

    pub fn counts(&self) -> TodoCounts {
        self.state.with(|s| {
            let completed = s.items.iter().filter(|t| t.completed).count();
            TodoCounts {
                total: s.items.len(),
                completed,
                pending: s.items.len() - completed,
            }
        })
    }

    /// Count items per key. Recomputed on every call.
    pub fn group_by<K: Ord>(&self, key: impl Fn(&Todo) -> K) -> BTreeMap<K, usize> {
        self.state.with(|s| {
            let mut groups = BTreeMap::new();
            for todo in &s.items {
                *groups.entry(key(todo)).or_insert(0) += 1;
            }
            groups
        })
    }

    pub async fn load(&self) {
        if !self.begin_busy() {
            return;
        }
        let result = self.repository.fetch_all().await;
        if !self.still_live("load") {
            return;
        }
        let merged = result.map(|items| self.merge(items));
        self.state.update(|s| {
            match merged {
                Ok(items) => {
                    s.items = items;
                    s.error = None;
                }
                Err(error) => {
                    tracing::warn!(%error, "load failed");
                    s.error = Some(error.to_string());
                }
            }
            s.loading = false;
        });
    }

    pub async fn create(&self, input: CreateTodo) {
        self.create_settled(input).await;
    }

    pub(crate) async fn create_settled(&self, input: CreateTodo) -> Settlement {
        if !self.begin_busy() {
            return Settlement::Dropped;
        }
        let result = self.repository.create(&input).await;
        if !self.still_live("create") {
            return Settlement::Dropped;
        }
        let settlement = Settlement::of(&result);
        self.state.update(|s| {
            match result {
                Ok(todo) => {
                    upsert(&mut s.items, todo);
                    s.error = None;
                }
                Err(error) => {
                    tracing::warn!(%error, title = %input.title, "create failed");
                    s.error = Some(error.to_string());
                }
            }
            s.loading = false;
        });
        settlement
    }

    pub async fn toggle(&self, id: Uuid) {
        if !self.is_live() {
            return;
        }
        let previous = self
            .state
            .with(|s| s.items.iter().find(|t| t.id == id).map(|t| t.completed));
        let Some(previous) = previous else {
            return;
        };
        let next = !previous;

        let pending = self.track(id);
        self.state.update(|s| set_completed(&mut s.items, id, next));
        let result = self
            .repository
            .update(id, &UpdateTodo::completed(next))
            .await;
        drop(pending);

        if !self.still_live("toggle") {
            return;
        }
        match result {
            Ok(_) => {
                self.state.update(|s| s.error = None);
            }
            Err(error) => {
                tracing::warn!(%id, %error, "toggle failed, rolling back");
                self.state.update(|s| {
                    set_completed(&mut s.items, id, previous);
                    s.error = Some(error.to_string());
                });
            }
        }
    }

    pub async fn update(&self, id: Uuid, input: UpdateTodo) {
        self.update_settled(id, input).await;
    }

    pub(crate) async fn update_settled(&self, id: Uuid, input: UpdateTodo) -> Settlement {
        if !self.is_live() {
            return Settlement::Dropped;
        }
        let result = self.repository.update(id, &input).await;
        if !self.still_live("update") {
            return Settlement::Dropped;
        }
        let settlement = Settlement::of(&result);
        self.state.update(|s| match result {
            Ok(todo) => {
                if let Some(slot) = s.items.iter_mut().find(|t| t.id == id) {
                    *slot = todo;
                }
                s.error = None;
            }
            Err(error) => {
                tracing::warn!(%id, %error, "update failed");
                s.error = Some(error.to_string());
            }
        });
        settlement
    }

    pub async fn delete(&self, id: Uuid) {
        if !self.is_live() {
            return;
        }
        let result = self.repository.delete(id).await;
        if !self.still_live("delete") {
            return;
        }
        self.state.update(|s| match result {
            Ok(()) => {
                s.items.retain(|t| t.id != id);
                s.error = None;
            }
            Err(error) => {
                tracing::warn!(%id, %error, "delete failed");
                s.error = Some(error.to_string());
            }
        });
    }

    /// Replace the items with an externally loaded snapshot, keeping local
    /// `completed` values for ids with a toggle in flight.
    pub fn apply_snapshot(&self, snapshot: Vec<Todo>) {
        if !self.is_live() {
            return;
        }
        let merged = self.merge(snapshot);
        self.state.update(|s| s.items = merged);
    }

    fn merge(&self, incoming: Vec<Todo>) -> Vec<Todo> {
        let mut items = dedupe(incoming);
        let in_flight = self.in_flight.borrow();
        if in_flight.is_empty() {
            return items;
        }
        self.state.with(|s| {
            for todo in items.iter_mut().filter(|t| in_flight.contains_key(&t.id)) {
                if let Some(local) = s.items.iter().find(|t| t.id == todo.id) {
                    todo.completed = local.completed;
                }
            }
        });
        items
    }

    fn begin_busy(&self) -> bool {
        if !self.is_live() {
            return false;
        }
        self.state.update(|s| {
            s.loading = true;
            s.error = None;
        });
        true
    }

    fn still_live(&self, operation: &'static str) -> bool {
        let live = self.is_live();
        if !live {
            tracing::debug!(operation, "store disposed, dropping result");
        }
        live
    }

    fn track(&self, id: Uuid) -> PendingToggle<'_> {
        *self.in_flight.borrow_mut().entry(id).or_insert(0) += 1;
        PendingToggle {
            in_flight: &self.in_flight,
            id,
        }
    }
}

fn set_completed(items: &mut [Todo], id: Uuid, completed: bool) {
    if let Some(todo) = items.iter_mut().find(|t| t.id == id) {
        todo.completed = completed;
    }
}

fn upsert(items: &mut Vec<Todo>, todo: Todo) {
    match items.iter_mut().find(|t| t.id == todo.id) {
        Some(existing) => *existing = todo,
        None => items.push(todo),
    }
}

/// Keep the first occurrence of each id, preserving order.
fn dedupe(items: Vec<Todo>) -> Vec<Todo> {
    let mut seen = HashSet::with_capacity(items.len());
    items.into_iter().filter(|t| seen.insert(t.id)).collect()
}
