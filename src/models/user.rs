use async_graphql::{InputObject, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use crate::cpf::validate_cpf;
use crate::filters::{FieldRef, FilterValue, Filterable};
use crate::validation::TextBody;

pub const NAME_MIN_LENGTH: usize = 5;
pub const NAME_MAX_LENGTH: usize = 50;
pub const EMAIL_MAX_LENGTH: usize = 50;
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// A user as stored in the `users` table.
///
/// The password hash and the soft-delete marker are never serialized nor exposed
/// through GraphQL.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub cpf: String,
    #[serde(skip_serializing)]
    #[sqlx(rename = "password")]
    #[graphql(skip)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    #[graphql(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl Filterable for User {
    fn field(&self, column: &str) -> Option<FieldRef<'_>> {
        match column {
            "id" => Some(FieldRef::Number(i64::from(self.id))),
            "name" => Some(FieldRef::Text(&self.name)),
            "email" => Some(FieldRef::Text(&self.email)),
            "cpf" => Some(FieldRef::Text(&self.cpf)),
            _ => None,
        }
    }
}

/// Row data for an insert. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub cpf: String,
    pub password_hash: String,
}

/// Body of `POST /users`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(custom = "validate_name")]
    pub name: String,
    #[validate(email, custom = "validate_email_length")]
    pub email: String,
    #[validate(custom = "validate_cpf")]
    pub cpf: String,
    #[validate(custom = "validate_password")]
    pub password: String,
}

/// Body of `PUT /users/{id}`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInput {
    #[validate(custom = "validate_name")]
    pub name: Option<String>,
    #[validate(email, custom = "validate_email_length")]
    pub email: Option<String>,
    #[validate(custom = "validate_password")]
    pub password: Option<String>,
    #[validate(custom = "validate_password")]
    pub old_password: Option<String>,
}

impl TextBody for CreateUserInput {
    const FIELDS: &'static [(&'static str, bool)] = &[
        ("name", true),
        ("email", true),
        ("cpf", true),
        ("password", true),
    ];
}

impl TextBody for UpdateUserInput {
    const FIELDS: &'static [(&'static str, bool)] = &[
        ("name", false),
        ("email", false),
        ("password", false),
        ("oldPassword", false),
    ];
}

/// Sparse filters accepted by the `users` query.
#[derive(Debug, Clone, Default, Deserialize, InputObject)]
#[serde(rename_all = "camelCase")]
#[graphql(name = "FilterOptionsInput")]
pub struct UserFilters {
    pub id: Option<i32>,
    pub user_id: Option<i32>,
    pub cpf: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Filter fields that have no column on `users`.
pub const NON_USER_FILTERS: [&str; 2] = ["user_id", "description"];

impl UserFilters {
    /// The filters that were provided, in declaration order, keyed by column.
    pub fn to_query(&self) -> Vec<(&'static str, FilterValue)> {
        let mut query = Vec::new();
        if let Some(id) = self.id {
            query.push(("id", id.into()));
        }
        if let Some(user_id) = self.user_id {
            query.push(("user_id", user_id.into()));
        }
        if let Some(cpf) = &self.cpf {
            query.push(("cpf", cpf.as_str().into()));
        }
        if let Some(description) = &self.description {
            query.push(("description", description.as_str().into()));
        }
        if let Some(email) = &self.email {
            query.push(("email", email.as_str().into()));
        }
        if let Some(name) = &self.name {
            query.push(("name", name.as_str().into()));
        }
        query
    }
}

/// Response of `update`: the updated record and a confirmation.
#[derive(Debug, Serialize)]
pub struct DataMessage<T> {
    pub data: T,
    pub message: String,
}

/// Response carrying only a confirmation.
#[derive(Debug, Serialize, PartialEq)]
pub struct Message {
    pub message: String,
}

fn length_error(value: &str, min: usize, max: Option<usize>) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len == 0 {
        return Err(ValidationError::new("required"));
    }
    if len < min {
        return Err(ValidationError::new("min_length"));
    }
    match max {
        Some(max) if len > max => Err(ValidationError::new("max_length")),
        _ => Ok(()),
    }
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    length_error(name, NAME_MIN_LENGTH, Some(NAME_MAX_LENGTH))
}

fn validate_email_length(email: &str) -> Result<(), ValidationError> {
    length_error(email, 1, Some(EMAIL_MAX_LENGTH))
}

fn validate_password(password: &str) -> Result<(), ValidationError> {
    length_error(password, PASSWORD_MIN_LENGTH, None)
}
