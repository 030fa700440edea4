use std::sync::Arc;

use crate::config::Config;
use crate::graphql::{build_schema, UserSchema};
use crate::messages::Locale;
use crate::services::UserService;
use crate::store::UserStore;

/// Shared application state handed to every handler through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub schema: UserSchema,
    pub locale: Locale,
    pub playground_enabled: bool,
}

impl AppState {
    pub fn new(store: Arc<dyn UserStore>, config: &Config) -> Self {
        Self::with_settings(store, config.locale, config.bcrypt_cost, config.playground_enabled())
    }

    pub fn with_settings(
        store: Arc<dyn UserStore>,
        locale: Locale,
        hash_cost: u32,
        playground_enabled: bool,
    ) -> Self {
        let users = UserService::new(store, locale.messages(), hash_cost);
        Self {
            schema: build_schema(users.clone()),
            users,
            locale,
            playground_enabled,
        }
    }
}
