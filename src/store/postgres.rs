use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use super::{UserStore, UserTransaction};
use crate::error::AppError;
use crate::filters::Predicate;
use crate::models::{NewUser, OrderBy, PageOptions, User};

const SELECT_ACTIVE: &str = "SELECT id, name, email, cpf, password, created_at, updated_at, deleted_at \
     FROM users WHERE deleted_at IS NULL";

const SELECT_BY_ID: &str = "SELECT id, name, email, cpf, password, created_at, updated_at, deleted_at \
     FROM users WHERE id = $1 AND deleted_at IS NULL";

const SELECT_BY_EMAIL: &str = "SELECT id, name, email, cpf, password, created_at, updated_at, deleted_at \
     FROM users WHERE email = $1 AND deleted_at IS NULL AND ($2::INT IS NULL OR id <> $2)";

const SELECT_BY_CPF: &str = "SELECT id, name, email, cpf, password, created_at, updated_at, deleted_at \
     FROM users WHERE cpf = $1 AND deleted_at IS NULL";

const INSERT_USER: &str = "INSERT INTO users (name, email, cpf, password) VALUES ($1, $2, $3, $4) \
     RETURNING id, name, email, cpf, password, created_at, updated_at, deleted_at";

const UPDATE_USER: &str = "UPDATE users SET name = $1, email = $2, password = $3, updated_at = NOW() \
     WHERE id = $4 AND deleted_at IS NULL \
     RETURNING id, name, email, cpf, password, created_at, updated_at, deleted_at";

const SOFT_DELETE_USER: &str =
    "UPDATE users SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL";

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the migrations under `migrations/`.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn begin(&self) -> Result<Box<dyn UserTransaction>, AppError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUserTransaction { tx }))
    }

    async fn find_all(&self, predicate: &Predicate) -> Result<Vec<User>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new(SELECT_ACTIVE);
        predicate.push_sql(&mut builder);
        builder.push(" ORDER BY name ASC");

        let users = builder
            .build_query_as::<User>()
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn find_page(
        &self,
        predicate: &Predicate,
        page: PageOptions,
        order_by: OrderBy,
    ) -> Result<(Vec<User>, i64), AppError> {
        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM users WHERE deleted_at IS NULL",
        );
        predicate.push_sql(&mut count);
        let (total,): (i64,) = count.build_query_as().fetch_one(&self.pool).await?;

        let mut builder = QueryBuilder::<Postgres>::new(SELECT_ACTIVE);
        predicate.push_sql(&mut builder);
        // Column and direction come from closed enums, never from input text.
        builder.push(format!(
            " ORDER BY {} {}, id {}",
            order_by.set.column(),
            order_by.order.sql(),
            order_by.order.sql()
        ));
        builder.push(" LIMIT ");
        builder.push_bind(page.limit());
        builder.push(" OFFSET ");
        builder.push_bind(page.skip());

        let users = builder
            .build_query_as::<User>()
            .fetch_all(&self.pool)
            .await?;
        Ok((users, total))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(SELECT_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

pub struct PgUserTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UserTransaction for PgUserTransaction {
    async fn find_by_id(&mut self, id: i32) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(SELECT_BY_ID)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(user)
    }

    async fn find_by_email(
        &mut self,
        email: &str,
        except_id: Option<i32>,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(SELECT_BY_EMAIL)
            .bind(email)
            .bind(except_id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(user)
    }

    async fn find_by_cpf(&mut self, cpf: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(SELECT_BY_CPF)
            .bind(cpf)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(user)
    }

    async fn insert(&mut self, user: NewUser) -> Result<User, AppError> {
        let created = sqlx::query_as::<_, User>(INSERT_USER)
            .bind(user.name)
            .bind(user.email)
            .bind(user.cpf)
            .bind(user.password_hash)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(created)
    }

    async fn update(&mut self, user: &User) -> Result<User, AppError> {
        let updated = sqlx::query_as::<_, User>(UPDATE_USER)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.id)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(updated)
    }

    async fn soft_delete(&mut self, id: i32) -> Result<(), AppError> {
        let result = sqlx::query(SOFT_DELETE_USER)
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Record not found".into()));
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        let PgUserTransaction { tx } = *self;
        tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        let PgUserTransaction { tx } = *self;
        tx.rollback().await?;
        Ok(())
    }
}
