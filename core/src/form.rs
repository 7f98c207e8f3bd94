//! Client-side form submission.
//!
//! Runs the same validator the server endpoint uses, then hands the
//! normalized payload to the store. Invalid input never reaches the network.

use serde_json::Value;
use uuid::Uuid;

use crate::repository::TodoRepository;
use crate::store::{Settlement, TodoStore};
use crate::validate::{validate_create, validate_update, FieldErrors, Validation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    Submitted,
    Invalid(FieldErrors),
    /// Validation passed but the remote call failed.
    Failed(String),
    /// The store was disposed before the submission could be applied.
    Discarded,
}

impl FormOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, FormOutcome::Submitted)
    }
}

pub async fn submit_create<R: TodoRepository>(
    store: &TodoStore<R>,
    candidate: &Value,
) -> FormOutcome {
    let input = match validate_create(candidate) {
        Validation::Valid(input) => input,
        Validation::Invalid(errors) => return FormOutcome::Invalid(errors),
    };
    settle(store.create_settled(input).await)
}

pub async fn submit_update<R: TodoRepository>(
    store: &TodoStore<R>,
    id: Uuid,
    candidate: &Value,
) -> FormOutcome {
    let input = match validate_update(candidate) {
        Validation::Valid(input) => input,
        Validation::Invalid(errors) => return FormOutcome::Invalid(errors),
    };
    settle(store.update_settled(id, input).await)
}

fn settle(settlement: Settlement) -> FormOutcome {
    match settlement {
        Settlement::Applied => FormOutcome::Submitted,
        Settlement::Failed(error) => FormOutcome::Failed(error),
        Settlement::Dropped => FormOutcome::Discarded,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ApiError;
    use crate::testing::{todo, FakeRepository};

    #[tokio::test]
    async fn invalid_input_never_reaches_repository() {
        let store = TodoStore::new(FakeRepository::default());
        let outcome = submit_create(&store, &json!({ "title": "x" })).await;

        let FormOutcome::Invalid(errors) = outcome else {
            panic!("expected invalid outcome");
        };
        assert_eq!(
            errors.message("title").as_deref(),
            Some("Title must be at least 2 characters")
        );
        assert!(store.repository().calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn valid_input_is_created_in_place() {
        let store = TodoStore::new(FakeRepository::default());
        let outcome = submit_create(&store, &json!({ "title": "Buy milk" })).await;

        assert!(outcome.is_submitted());
        assert_eq!(store.items()[0].title, "Buy milk");
    }

    #[tokio::test]
    async fn store_error_surfaces_as_failed() {
        let store = TodoStore::new(FakeRepository::default());
        store.repository().fail_next(ApiError::Http {
            status: 503,
            status_text: "Service Unavailable".to_string(),
        });
        let outcome = submit_create(&store, &json!({ "title": "Buy milk" })).await;
        assert_eq!(
            outcome,
            FormOutcome::Failed("HTTP Error: 503 Service Unavailable".to_string())
        );
    }

    #[tokio::test]
    async fn disposed_store_discards_submission() {
        let store = TodoStore::new(FakeRepository::default());
        store.dispose();

        let outcome = submit_create(&store, &json!({ "title": "Buy milk" })).await;

        assert_eq!(outcome, FormOutcome::Discarded);
        assert!(store.items().is_empty());
        assert!(store.repository().calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn concurrent_toggle_failure_does_not_fail_the_submission() {
        let items = vec![todo(1, "Walk dog", false)];
        let store = TodoStore::with_items(FakeRepository::with_todos(items.clone()), items);
        let toggle_gate = store.repository().hold_next(Some(ApiError::Http {
            status: 500,
            status_text: "Internal Server Error".to_string(),
        }));
        let create_gate = store.repository().hold_next(None);

        let payload = json!({ "title": "Buy milk" });
        let ((), outcome, ()) = tokio::join!(
            store.toggle(Uuid::from_u128(1)),
            submit_create(&store, &payload),
            async {
                toggle_gate.send(()).unwrap();
                tokio::task::yield_now().await;
                create_gate.send(()).unwrap();
            }
        );

        assert_eq!(outcome, FormOutcome::Submitted);
        assert!(store.items().iter().any(|t| t.title == "Buy milk"));
    }

    #[tokio::test]
    async fn update_validates_present_fields() {
        let items = vec![todo(1, "Buy milk", false)];
        let store = TodoStore::with_items(FakeRepository::with_todos(items.clone()), items);
        let id = Uuid::from_u128(1);

        let outcome = submit_update(&store, id, &json!({ "completed": "yes" })).await;
        assert!(matches!(outcome, FormOutcome::Invalid(_)));

        let outcome = submit_update(&store, id, &json!({ "title": "Buy oat milk" })).await;
        assert!(outcome.is_submitted());
        assert_eq!(store.items()[0].title, "Buy oat milk");
    }
}
