#![doc = "The `usersvc` library crate."]
#![doc = ""]
#![doc = "User registry exposed over REST and GraphQL: domain models, CPF validation,"]
#![doc = "the filter builder, the transactional user service and its stores."]
#![doc = "The binary (`main.rs`) wires these into an actix-web server."]

pub mod config;
pub mod cpf;
pub mod error;
pub mod filters;
pub mod graphql;
pub mod messages;
pub mod models;
pub mod password;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod validation;

pub use error::AppError;
pub use state::AppState;
