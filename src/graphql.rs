//! GraphQL schema over the user service.
//!
//! The schema is read-only: `users`, `user` and `paginatedUsers`. Mutations go
//! through the REST handlers.

use async_graphql::{Context, EmptyMutation, EmptySubscription, ErrorExtensions, Object, Schema};

use crate::models::{FindOptions, User, UserFilters, UserPage};
use crate::services::UserService;

pub type UserSchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

/// Nesting is shallow, so a small depth limit is enough.
pub const MAX_QUERY_DEPTH: usize = 8;
pub const MAX_QUERY_COMPLEXITY: usize = 200;

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Active users matching `filters`, ordered by name.
    async fn users(
        &self,
        ctx: &Context<'_>,
        filters: Option<UserFilters>,
    ) -> async_graphql::Result<Vec<User>> {
        let service = ctx.data::<UserService>()?;
        service
            .find_all(&filters.unwrap_or_default())
            .await
            .map_err(|e| e.extend())
    }

    async fn user(&self, ctx: &Context<'_>, id: i32) -> async_graphql::Result<User> {
        let service = ctx.data::<UserService>()?;
        service.find_one(id).await.map_err(|e| e.extend())
    }

    /// One page of users with paging metadata.
    async fn paginated_users(
        &self,
        ctx: &Context<'_>,
        #[graphql(default)] options: FindOptions,
    ) -> async_graphql::Result<UserPage> {
        let service = ctx.data::<UserService>()?;
        service.find_page(&options).await.map_err(|e| e.extend())
    }
}

pub fn build_schema(service: UserService) -> UserSchema {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(service)
        .limit_depth(MAX_QUERY_DEPTH)
        .limit_complexity(MAX_QUERY_COMPLEXITY)
        .finish()
}
