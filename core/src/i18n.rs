//! Message catalogs.
//!
//! # Invariants
//!
//! 1. Every locale table defines exactly the key set of the English table,
//!    with no duplicates.
//! 2. Lookup falls back to English, then to the key itself.
//! 3. `format` replaces `{name}` tokens in a single pass; unknown tokens are
//!    left as-is.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::validate::FieldError;

const EN: &[(&str, &str)] = &[
    ("app.title", "Todos"),
    ("todos.heading", "My todos"),
    ("todos.add", "Add"),
    ("todos.placeholder", "What needs to be done?"),
    ("todos.empty", "Nothing to do yet."),
    ("todos.mark_done", "Mark as done"),
    ("todos.mark_pending", "Mark as not done"),
    ("todos.delete", "Delete"),
    ("todos.summary", "{completed} of {total} done"),
    ("todos.loading", "Loading..."),
    ("todos.error", "Something went wrong: {message}"),
    ("field.title", "Title"),
    ("field.completed", "Completed"),
    ("type.string", "string"),
    ("type.boolean", "boolean"),
    ("validation.required", "{field} is required"),
    ("validation.wrong_type", "{field} must be a {expected}"),
    ("validation.too_short", "{field} must be at least {min} characters"),
    ("validation.too_long", "{field} must be at most {max} characters"),
];

const DE: &[(&str, &str)] = &[
    ("app.title", "Aufgaben"),
    ("todos.heading", "Meine Aufgaben"),
    ("todos.add", "Hinzufügen"),
    ("todos.placeholder", "Was ist zu tun?"),
    ("todos.empty", "Noch nichts zu tun."),
    ("todos.mark_done", "Als erledigt markieren"),
    ("todos.mark_pending", "Als offen markieren"),
    ("todos.delete", "Löschen"),
    ("todos.summary", "{completed} von {total} erledigt"),
    ("todos.loading", "Wird geladen..."),
    ("todos.error", "Etwas ist schiefgelaufen: {message}"),
    ("field.title", "Titel"),
    ("field.completed", "Erledigt"),
    ("type.string", "Text"),
    ("type.boolean", "Wahrheitswert"),
    ("validation.required", "{field} ist erforderlich"),
    ("validation.wrong_type", "{field} muss ein {expected} sein"),
    ("validation.too_short", "{field} muss mindestens {min} Zeichen lang sein"),
    ("validation.too_long", "{field} darf höchstens {max} Zeichen lang sein"),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Locale {
    #[default]
    En,
    De,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::De];

    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::De => "de",
        }
    }

    /// Parse a language tag such as `de-DE`; anything unknown is English.
    pub fn from_tag(tag: &str) -> Self {
        tag.parse().unwrap_or_default()
    }

    fn table(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Locale::En => EN,
            Locale::De => DE,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown locale: {0}")]
pub struct UnknownLocale(pub String);

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let primary = s.split(['-', '_']).next().unwrap_or_default();
        match primary.to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "de" => Ok(Locale::De),
            _ => Err(UnknownLocale(s.to_string())),
        }
    }
}

/// Stateless lookup over the static tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct Catalog;

impl Catalog {
    pub fn keys(locale: Locale) -> impl Iterator<Item = &'static str> {
        locale.table().iter().map(|(key, _)| *key)
    }

    fn find(locale: Locale, key: &str) -> Option<&'static str> {
        locale
            .table()
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }

    pub fn text<'a>(locale: Locale, key: &'a str) -> &'a str {
        Self::find(locale, key)
            .or_else(|| Self::find(Locale::En, key))
            .unwrap_or(key)
    }

    pub fn format(locale: Locale, key: &str, args: &[(&str, &str)]) -> String {
        interpolate(Self::text(locale, key), args)
    }

    /// Localized message for a validation failure.
    pub fn field_error(locale: Locale, error: &FieldError) -> String {
        let label = Self::text(locale, &format!("field.{}", error.field)).to_string();
        let mut args: Vec<(&str, String)> = vec![("field", label)];
        for (name, value) in error.args() {
            let value = if name == "expected" {
                Self::text(locale, &format!("type.{value}")).to_string()
            } else {
                value
            };
            args.push((name, value));
        }
        let borrowed: Vec<(&str, &str)> = args.iter().map(|(k, v)| (*k, v.as_str())).collect();
        Self::format(locale, error.message_key(), &borrowed)
    }
}

fn interpolate(template: &str, args: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                match args.iter().find(|(k, _)| *k == name) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::validate::{validate_create, validate_update, Validation};

    #[rstest]
    #[case(Locale::En)]
    #[case(Locale::De)]
    fn locale_tables_match_base_key_set(#[case] locale: Locale) {
        let keys: Vec<&str> = Catalog::keys(locale).collect();
        let unique: BTreeSet<&str> = keys.iter().copied().collect();
        assert_eq!(unique.len(), keys.len(), "{locale}: duplicate keys");

        let mut sorted = keys.clone();
        sorted.sort_unstable();
        let mut base: Vec<&str> = Catalog::keys(Locale::En).collect();
        base.sort_unstable();
        assert_eq!(sorted, base, "{locale}: key set differs from en");
    }

    #[rstest]
    #[case("de-DE", Locale::De)]
    #[case("DE", Locale::De)]
    #[case("en_GB", Locale::En)]
    #[case("fr", Locale::En)]
    #[case("", Locale::En)]
    fn tags_resolve_with_fallback(#[case] tag: &str, #[case] expected: Locale) {
        assert_eq!(Locale::from_tag(tag), expected);
    }

    #[test]
    fn missing_key_falls_back_to_key() {
        assert_eq!(Catalog::text(Locale::De, "no.such.key"), "no.such.key");
    }

    #[test]
    fn interpolation_is_single_pass() {
        assert_eq!(
            Catalog::format(Locale::En, "todos.summary", &[("completed", "{total}"), ("total", "3")]),
            "{total} of 3 done"
        );
        assert_eq!(interpolate("a {missing} b {", &[]), "a {missing} b {");
    }

    #[test]
    fn english_field_errors_match_validator_messages() {
        let candidates = [
            validate_create(&json!({})),
            validate_create(&json!({ "title": 1 })),
            validate_create(&json!({ "title": "a" })),
            validate_create(&json!({ "title": "x".repeat(101) })),
        ];
        for result in candidates {
            let Validation::Invalid(errors) = result else {
                panic!("expected failure");
            };
            for error in errors.iter() {
                assert_eq!(Catalog::field_error(Locale::En, error), error.message());
            }
        }

        let Validation::Invalid(errors) = validate_update(&json!({ "completed": 1 })) else {
            panic!("expected failure");
        };
        let error = errors.get("completed").unwrap();
        assert_eq!(Catalog::field_error(Locale::En, error), error.message());
        assert_eq!(
            Catalog::field_error(Locale::De, error),
            "Erledigt muss ein Wahrheitswert sein"
        );
    }
}
