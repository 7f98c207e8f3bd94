//! Server-rendered todo page with a form action that works without scripts.
//!
//! `POST /` validates the form with the shared validator. Success redirects
//! back to the page (303); failure re-renders it with the field errors and
//! the submitted value, status 422.

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use todo_core::validate::validate_create;
use todo_core::view::{render_html, TodoListView};
use todo_core::{Locale, StoreState, Validation};

use crate::Db;

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub lang: Option<String>,
}

impl PageQuery {
    fn locale(&self) -> Locale {
        self.lang.as_deref().map(Locale::from_tag).unwrap_or_default()
    }
}

async fn view(db: &Db, locale: Locale) -> TodoListView {
    let state = StoreState {
        items: db.list().await,
        ..StoreState::default()
    };
    TodoListView::from_state(&state, locale)
}

pub async fn show(State(db): State<Db>, Query(query): Query<PageQuery>) -> Html<String> {
    Html(render_html(&view(&db, query.locale()).await))
}

pub async fn submit(
    State(db): State<Db>,
    Query(query): Query<PageQuery>,
    Form(fields): Form<HashMap<String, String>>,
) -> Response {
    let locale = query.locale();
    let candidate = Value::Object(
        fields
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect::<Map<String, Value>>(),
    );

    match validate_create(&candidate) {
        Validation::Valid(input) => {
            db.insert(input).await;
            Redirect::to(&format!("/?lang={locale}")).into_response()
        }
        Validation::Invalid(errors) => {
            tracing::debug!(fields = errors.len(), "form submission rejected");
            let submitted = fields.get("title").cloned().unwrap_or_default();
            let page = view(&db, locale).await.with_form(submitted, &errors);
            (StatusCode::UNPROCESSABLE_ENTITY, Html(render_html(&page))).into_response()
        }
    }
}
