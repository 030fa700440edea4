//! Turns request bodies into validated inputs with localized field messages.
//!
//! Fields that are missing or hold something other than text are reported the
//! same way as failed `validator` rules, in one list.

use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::{Validate, ValidationErrors};

use crate::error::AppError;
use crate::messages::Locale;

/// Order in which field messages are reported.
const FIELD_ORDER: [&str; 5] = ["name", "email", "cpf", "password", "oldPassword"];

/// A request body whose fields are all text.
pub trait TextBody: DeserializeOwned + Validate {
    /// Wire name of each field and whether it is required.
    const FIELDS: &'static [(&'static str, bool)];
}

/// Deserializes and validates `body`.
///
/// A missing required field is validated as empty text, so it fails with the
/// field's `required` rule. A field holding a number, object or other non-text
/// value fails with `type` and its other rules are skipped.
pub fn parse_body<T: TextBody>(mut body: Value, locale: Locale) -> Result<T, AppError> {
    let mut mistyped: Vec<&'static str> = Vec::new();

    if let Value::Object(fields) = &mut body {
        for &(name, required) in T::FIELDS {
            match fields.get(name) {
                Some(Value::String(_)) => continue,
                None | Some(Value::Null) => {}
                Some(_) => mistyped.push(name),
            }
            if required {
                fields.insert(name.to_string(), Value::String(String::new()));
            } else {
                fields.remove(name);
            }
        }
    }

    let input: T =
        serde_json::from_value(body).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let mut messages: Vec<(&'static str, String)> = mistyped
        .iter()
        .map(|field| (*field, locale.field_message(field, "type", None)))
        .collect();
    if let Err(errors) = input.validate() {
        messages.extend(
            rule_messages(&errors, locale)
                .into_iter()
                .filter(|(field, _)| !mistyped.contains(field)),
        );
    }

    if messages.is_empty() {
        return Ok(input);
    }
    messages.sort_by_key(|(field, _)| field_rank(field));
    Err(AppError::ValidationError(
        messages.into_iter().map(|(_, message)| message).collect(),
    ))
}

fn field_rank(field: &str) -> usize {
    FIELD_ORDER
        .iter()
        .position(|known| *known == field)
        .unwrap_or(FIELD_ORDER.len())
}

fn rule_messages(errors: &ValidationErrors, locale: Locale) -> Vec<(&'static str, String)> {
    errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, field_errors)| {
            field_errors.iter().map(move |error| {
                let value = error.params.get("value").and_then(|v| v.as_str());
                (field, locale.field_message(field, &error.code, value))
            })
        })
        .collect()
}
