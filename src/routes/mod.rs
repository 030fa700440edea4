pub mod graphql;
pub mod health;
pub mod users;

use actix_web::{error::JsonPayloadError, web, HttpRequest};

use crate::error::AppError;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .service(health::health)
        .service(
            web::scope("/users")
                .service(users::create_user)
                .service(users::update_user)
                .service(users::delete_user),
        )
        .service(
            web::resource("/graphql")
                .route(web::post().to(graphql::graphql))
                .route(web::get().to(graphql::graphiql)),
        );
}

/// Malformed or incomplete JSON bodies are reported in the same shape as every other error.
fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(err.to_string()).into()
}
