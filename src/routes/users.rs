use crate::{
    error::AppError,
    models::{CreateUserInput, UpdateUserInput},
    state::AppState,
    validation::parse_body,
};
use actix_web::{delete, post, put, web, HttpResponse, Responder};
use serde_json::Value;

/// Creates a new user.
///
/// ## Request Body:
/// - `name`: 5 to 50 characters.
/// - `email`: a valid address of at most 50 characters, not used by another active user.
/// - `cpf`: 11 digits with valid check digits, not used by another active user.
/// - `password`: at least 8 characters. Stored as a bcrypt hash.
///
/// ## Responses:
/// - `201 Created`: the new user, without its password.
/// - `400 Bad Request`: a field is missing, not text, or fails its rules; or the
///   email or cpf is taken.
#[post("")]
pub async fn create_user(
    state: web::Data<AppState>,
    user_data: web::Json<Value>,
) -> Result<impl Responder, AppError> {
    let input: CreateUserInput = parse_body(user_data.into_inner(), state.locale)?;

    let user = state.users.create(input).await?;

    Ok(HttpResponse::Created().json(user))
}

/// Partially updates a user.
///
/// Changing the password requires both `password` and `oldPassword`.
///
/// ## Responses:
/// - `200 OK`: `{ data, message }` with the updated user.
/// - `400 Bad Request`: validation failed, the email is taken, or the old password is wrong.
/// - `404 Not Found`: no active user with this id.
#[put("/{id}")]
pub async fn update_user(
    state: web::Data<AppState>,
    user_id: web::Path<i32>,
    user_data: web::Json<Value>,
) -> Result<impl Responder, AppError> {
    let input: UpdateUserInput = parse_body(user_data.into_inner(), state.locale)?;

    let result = state.users.update(user_id.into_inner(), input).await?;

    Ok(HttpResponse::Ok().json(result))
}

/// Soft-deletes a user. The row is kept but no longer returned by any query.
///
/// ## Responses:
/// - `200 OK`: `{ message }`.
/// - `404 Not Found`: no active user with this id.
#[delete("/{id}")]
pub async fn delete_user(
    state: web::Data<AppState>,
    user_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let result = state.users.remove(user_id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(result))
}
