//! Presentation layer: a localized view model plus intent dispatch.
//!
//! Views are rebuilt from a state snapshot and own no business logic. User
//! actions travel back as [`Intent`]s through [`dispatch`].

use std::fmt;

use serde_json::Value;
use uuid::Uuid;

use crate::form::{submit_create, FormOutcome};
use crate::i18n::{Catalog, Locale};
use crate::repository::TodoRepository;
use crate::store::{StoreState, TodoStore};
use crate::validate::FieldErrors;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoRow {
    pub id: Uuid,
    pub title: String,
    pub completed: bool,
    pub toggle_label: String,
    pub delete_label: String,
}

/// State of the create form, as echoed back after a failed submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormView {
    pub value: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoListView {
    pub locale: Locale,
    pub heading: String,
    pub rows: Vec<TodoRow>,
    pub summary: String,
    pub empty: Option<String>,
    pub loading: Option<String>,
    pub error: Option<String>,
    pub add_label: String,
    pub placeholder: String,
    pub form: FormView,
}

impl TodoListView {
    pub fn from_state(state: &StoreState, locale: Locale) -> Self {
        let text = |key: &str| Catalog::text(locale, key).to_string();

        let rows: Vec<TodoRow> = state
            .items
            .iter()
            .map(|todo| TodoRow {
                id: todo.id,
                title: todo.title.clone(),
                completed: todo.completed,
                toggle_label: if todo.completed {
                    text("todos.mark_pending")
                } else {
                    text("todos.mark_done")
                },
                delete_label: text("todos.delete"),
            })
            .collect();

        let completed = rows.iter().filter(|row| row.completed).count().to_string();
        let total = rows.len().to_string();
        let summary = Catalog::format(
            locale,
            "todos.summary",
            &[("completed", &completed), ("total", &total)],
        );

        Self {
            locale,
            heading: text("todos.heading"),
            empty: rows.is_empty().then(|| text("todos.empty")),
            rows,
            summary,
            loading: state.loading.then(|| text("todos.loading")),
            error: state
                .error
                .as_deref()
                .map(|message| Catalog::format(locale, "todos.error", &[("message", message)])),
            add_label: text("todos.add"),
            placeholder: text("todos.placeholder"),
            form: FormView::default(),
        }
    }

    pub fn from_store<R: TodoRepository>(store: &TodoStore<R>, locale: Locale) -> Self {
        Self::from_state(&store.state(), locale)
    }

    /// Echo a rejected submission with its localized title error.
    pub fn with_form(mut self, value: impl Into<String>, errors: &FieldErrors) -> Self {
        self.form = FormView {
            value: value.into(),
            error: errors
                .get("title")
                .map(|error| Catalog::field_error(self.locale, error)),
        };
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Toggle(Uuid),
    Delete(Uuid),
    Submit(Value),
    Refresh,
}

/// Route a user intent into the store. Only `Submit` has an outcome to
/// report; everything else is observed through the store state.
pub async fn dispatch<R: TodoRepository>(
    store: &TodoStore<R>,
    intent: Intent,
) -> Option<FormOutcome> {
    match intent {
        Intent::Toggle(id) => store.toggle(id).await,
        Intent::Delete(id) => store.delete(id).await,
        Intent::Refresh => store.load().await,
        Intent::Submit(candidate) => return Some(submit_create(store, &candidate).await),
    }
    None
}

/// Plain-text rendering, one line per row.
pub fn render_text(view: &TodoListView) -> String {
    TextPage(view).to_string()
}

/// Full HTML page. The create form posts back to `/`, so it works without
/// client-side scripting.
pub fn render_html(view: &TodoListView) -> String {
    HtmlPage(view).to_string()
}

struct TextPage<'a>(&'a TodoListView);

impl fmt::Display for TextPage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.0;
        writeln!(f, "{}", view.heading)?;
        if let Some(loading) = &view.loading {
            writeln!(f, "{loading}")?;
        }
        if let Some(error) = &view.error {
            writeln!(f, "! {error}")?;
        }
        if let Some(empty) = &view.empty {
            writeln!(f, "{empty}")?;
        }
        for row in &view.rows {
            let mark = if row.completed { 'x' } else { ' ' };
            writeln!(f, "[{mark}] {}", row.title)?;
        }
        writeln!(f, "{}", view.summary)
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

struct HtmlPage<'a>(&'a TodoListView);

impl fmt::Display for HtmlPage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.0;
        write!(
            f,
            "<!doctype html>\n<html lang=\"{}\">\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n<h1>{}</h1>\n",
            view.locale,
            escape(Catalog::text(view.locale, "app.title")),
            escape(&view.heading),
        )?;
        if let Some(error) = &view.error {
            writeln!(f, "<p role=\"alert\">{}</p>", escape(error))?;
        }
        write!(
            f,
            "<form method=\"post\" action=\"/?lang={}\">\n<input name=\"title\" value=\"{}\" placeholder=\"{}\">\n",
            view.locale,
            escape(&view.form.value),
            escape(&view.placeholder),
        )?;
        if let Some(error) = &view.form.error {
            writeln!(f, "<p class=\"field-error\">{}</p>", escape(error))?;
        }
        writeln!(f, "<button type=\"submit\">{}</button>\n</form>", escape(&view.add_label))?;

        if let Some(empty) = &view.empty {
            writeln!(f, "<p>{}</p>", escape(empty))?;
        } else {
            f.write_str("<ul>\n")?;
            for row in &view.rows {
                writeln!(
                    f,
                    "<li data-id=\"{}\"><input type=\"checkbox\" disabled{}> {}</li>",
                    row.id,
                    if row.completed { " checked" } else { "" },
                    escape(&row.title),
                )?;
            }
            f.write_str("</ul>\n")?;
        }
        writeln!(f, "<p>{}</p>\n</body>\n</html>", escape(&view.summary))
    }
}
