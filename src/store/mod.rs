//! Persistence for user records.
//!
//! Reads that do not need a consistent view go straight through [`UserStore`].
//! Mutations open a [`UserTransaction`], perform their checks and writes on it, and
//! then either `commit` or `rollback`. Both consume the transaction, so a scope
//! cannot be used after it has been closed.
//!
//! Every read excludes soft-deleted rows.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::AppError;
use crate::filters::Predicate;
use crate::models::{NewUser, OrderBy, PageOptions, User};

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Opens a transaction scope.
    async fn begin(&self) -> Result<Box<dyn UserTransaction>, AppError>;

    /// Active users matching `predicate`, ordered by name ascending.
    async fn find_all(&self, predicate: &Predicate) -> Result<Vec<User>, AppError>;

    /// One page of active users matching `predicate`, plus the total match count.
    async fn find_page(
        &self,
        predicate: &Predicate,
        page: PageOptions,
        order_by: OrderBy,
    ) -> Result<(Vec<User>, i64), AppError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait UserTransaction: Send {
    async fn find_by_id(&mut self, id: i32) -> Result<Option<User>, AppError>;

    /// Active user holding `email`, ignoring the user `except_id` when given.
    async fn find_by_email(
        &mut self,
        email: &str,
        except_id: Option<i32>,
    ) -> Result<Option<User>, AppError>;

    async fn find_by_cpf(&mut self, cpf: &str) -> Result<Option<User>, AppError>;

    async fn insert(&mut self, user: NewUser) -> Result<User, AppError>;

    /// Writes name, email and password hash of `user` and bumps `updated_at`.
    async fn update(&mut self, user: &User) -> Result<User, AppError>;

    /// Sets `deleted_at` on the row.
    async fn soft_delete(&mut self, id: i32) -> Result<(), AppError>;

    async fn commit(self: Box<Self>) -> Result<(), AppError>;

    async fn rollback(self: Box<Self>) -> Result<(), AppError>;
}
