use actix_web::{web, HttpResponse};
use async_graphql::http::GraphiQLSource;

use crate::{error::AppError, state::AppState};

pub const GRAPHQL_PATH: &str = "/graphql";

/// Executes a GraphQL request. Resolver failures are reported in the response's
/// `errors` list with HTTP 200, as GraphQL clients expect.
pub async fn graphql(
    state: web::Data<AppState>,
    request: web::Json<async_graphql::Request>,
) -> HttpResponse {
    let response = state.schema.execute(request.into_inner()).await;
    HttpResponse::Ok().json(response)
}

/// Serves GraphiQL in dev mode.
pub async fn graphiql(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    if !state.playground_enabled {
        return Err(AppError::NotFound("Not found".into()));
    }

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(GraphiQLSource::build().endpoint(GRAPHQL_PATH).finish()))
}
