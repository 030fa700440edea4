use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{Mutex as WriterLock, OwnedMutexGuard};

use super::{UserStore, UserTransaction};
use crate::error::AppError;
use crate::filters::Predicate;
use crate::models::{NewUser, OrderBy, PageOptions, User};

#[derive(Debug, Clone, Default)]
struct Table {
    rows: Vec<User>,
    last_id: i32,
}

impl Table {
    fn active(&self) -> impl Iterator<Item = &User> {
        self.rows.iter().filter(|user| !user.is_deleted())
    }

    fn active_mut(&mut self, id: i32) -> Option<&mut User> {
        self.rows
            .iter_mut()
            .find(|user| user.id == id && !user.is_deleted())
    }
}

/// Store that keeps the table in process memory.
///
/// Each transaction works on its own copy of the table and publishes it on
/// commit, so a rolled back transaction leaves no trace. Transactions hold the
/// writer lock from `begin` until they are closed, so only one is open at a time.
/// Plain reads never wait for it.
#[derive(Clone, Default)]
pub struct MemoryUserStore {
    table: Arc<Mutex<Table>>,
    writer: Arc<WriterLock<()>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later insert, update and soft delete fail with a database error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of stored rows, soft-deleted ones included.
    pub fn row_count(&self) -> Result<usize, AppError> {
        Ok(lock(&self.table)?.rows.len())
    }

    /// Row by id, soft-deleted or not.
    pub fn raw_row(&self, id: i32) -> Result<Option<User>, AppError> {
        Ok(lock(&self.table)?
            .rows
            .iter()
            .find(|user| user.id == id)
            .cloned())
    }
}

fn lock(table: &Mutex<Table>) -> Result<MutexGuard<'_, Table>, AppError> {
    table
        .lock()
        .map_err(|_| AppError::InternalServerError("user table lock poisoned".into()))
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn begin(&self) -> Result<Box<dyn UserTransaction>, AppError> {
        let writer = Arc::clone(&self.writer).lock_owned().await;
        let staged = lock(&self.table)?.clone();
        Ok(Box::new(MemoryUserTransaction {
            table: Arc::clone(&self.table),
            staged,
            fail_writes: self.fail_writes.load(Ordering::SeqCst),
            _writer: writer,
        }))
    }

    async fn find_all(&self, predicate: &Predicate) -> Result<Vec<User>, AppError> {
        let table = lock(&self.table)?;
        let mut users: Vec<User> = table
            .active()
            .filter(|user| predicate.matches(*user))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(users)
    }

    async fn find_page(
        &self,
        predicate: &Predicate,
        page: PageOptions,
        order_by: OrderBy,
    ) -> Result<(Vec<User>, i64), AppError> {
        let table = lock(&self.table)?;
        let mut users: Vec<User> = table
            .active()
            .filter(|user| predicate.matches(*user))
            .cloned()
            .collect();
        users.sort_by(|a, b| order_by.compare(a, b));

        let total = users.len() as i64;
        let items = users
            .into_iter()
            .skip(page.skip() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok((items, total))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        let table = lock(&self.table)?;
        let user = table.active().find(|user| user.id == id).cloned();
        Ok(user)
    }
}

pub struct MemoryUserTransaction {
    table: Arc<Mutex<Table>>,
    staged: Table,
    fail_writes: bool,
    // Released when the transaction is dropped, after commit or rollback.
    _writer: OwnedMutexGuard<()>,
}

impl MemoryUserTransaction {
    fn check_writable(&self) -> Result<(), AppError> {
        if self.fail_writes {
            return Err(AppError::DatabaseError("write rejected by store".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserTransaction for MemoryUserTransaction {
    async fn find_by_id(&mut self, id: i32) -> Result<Option<User>, AppError> {
        Ok(self.staged.active().find(|user| user.id == id).cloned())
    }

    async fn find_by_email(
        &mut self,
        email: &str,
        except_id: Option<i32>,
    ) -> Result<Option<User>, AppError> {
        Ok(self
            .staged
            .active()
            .find(|user| user.email == email && Some(user.id) != except_id)
            .cloned())
    }

    async fn find_by_cpf(&mut self, cpf: &str) -> Result<Option<User>, AppError> {
        Ok(self.staged.active().find(|user| user.cpf == cpf).cloned())
    }

    async fn insert(&mut self, user: NewUser) -> Result<User, AppError> {
        self.check_writable()?;
        self.staged.last_id += 1;
        let now = Utc::now();
        let created = User {
            id: self.staged.last_id,
            name: user.name,
            email: user.email,
            cpf: user.cpf,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.staged.rows.push(created.clone());
        Ok(created)
    }

    async fn update(&mut self, user: &User) -> Result<User, AppError> {
        self.check_writable()?;
        let row = self
            .staged
            .active_mut(user.id)
            .ok_or_else(|| AppError::NotFound("Record not found".into()))?;
        row.name = user.name.clone();
        row.email = user.email.clone();
        row.password_hash = user.password_hash.clone();
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn soft_delete(&mut self, id: i32) -> Result<(), AppError> {
        self.check_writable()?;
        let row = self
            .staged
            .active_mut(id)
            .ok_or_else(|| AppError::NotFound("Record not found".into()))?;
        row.deleted_at = Some(Utc::now());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        let MemoryUserTransaction {
            table,
            staged,
            _writer: writer,
            ..
        } = *self;
        *lock(&table)? = staged;
        drop(writer);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::build_filters;

    fn new_user(name: &str, email: &str, cpf: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
            cpf: cpf.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[actix_rt::test]
    async fn test_commit_publishes_and_rollback_discards() {
        let store = MemoryUserStore::new();

        let mut tx = store.begin().await.unwrap();
        tx.insert(new_user("Jane Islands", "jane@gmail.com", "63738306080"))
            .await
            .unwrap();
        tx.commit().await.unwrap();
        assert_eq!(store.row_count().unwrap(), 1);

        let mut tx = store.begin().await.unwrap();
        tx.insert(new_user("John Doe", "john@gmail.com", "52998224725"))
            .await
            .unwrap();
        tx.rollback().await.unwrap();
        assert_eq!(store.row_count().unwrap(), 1);
    }

    #[actix_rt::test]
    async fn test_soft_deleted_rows_are_hidden_but_kept() {
        let store = MemoryUserStore::new();
        let mut tx = store.begin().await.unwrap();
        let user = tx
            .insert(new_user("Jane Islands", "jane@gmail.com", "63738306080"))
            .await
            .unwrap();
        tx.soft_delete(user.id).await.unwrap();
        assert!(tx.find_by_email("jane@gmail.com", None).await.unwrap().is_none());
        tx.commit().await.unwrap();

        assert!(store.find_by_id(user.id).await.unwrap().is_none());
        assert!(store.raw_row(user.id).unwrap().unwrap().is_deleted());
        assert!(store
            .find_all(&Predicate::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[actix_rt::test]
    async fn test_find_all_orders_by_name_and_filters() {
        let store = MemoryUserStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.insert(new_user("Zoe Walker", "zoe@gmail.com", "63738306080"))
            .await
            .unwrap();
        tx.insert(new_user("Anna Smith", "anna@gmail.com", "52998224725"))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let names: Vec<String> = store
            .find_all(&Predicate::default())
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(names, vec!["Anna Smith", "Zoe Walker"]);

        let predicate = build_filters(vec![("cpf", "637".into())], &[], &[]);
        let found = store.find_all(&predicate).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Zoe Walker");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_overlapping_transactions_keep_both_rows() {
        let store = MemoryUserStore::new();

        let writers = [
            ("Jane Islands", "jane@gmail.com", "63738306080"),
            ("John Doe", "john@gmail.com", "52998224725"),
        ]
        .map(|(name, email, cpf)| {
            let store = store.clone();
            let user = new_user(name, email, cpf);
            tokio::spawn(async move {
                let mut tx = store.begin().await?;
                let created = tx.insert(user).await?;
                // Keeps the scope open long enough for the other writer to try to begin.
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
                tx.commit().await?;
                Ok::<_, AppError>(created.id)
            })
        });

        let mut ids = Vec::new();
        for writer in writers {
            ids.push(writer.await.unwrap().unwrap());
        }
        ids.sort();

        assert_eq!(ids, vec![1, 2]);
        assert_eq!(store.row_count().unwrap(), 2);
        assert_eq!(store.find_all(&Predicate::default()).await.unwrap().len(), 2);
    }

    #[actix_rt::test]
    async fn test_rollback_releases_writer() {
        let store = MemoryUserStore::new();
        let tx = store.begin().await.unwrap();
        tx.rollback().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.insert(new_user("Jane Islands", "jane@gmail.com", "63738306080"))
            .await
            .unwrap();
        tx.commit().await.unwrap();
        assert_eq!(store.row_count().unwrap(), 1);
    }

    #[actix_rt::test]
    async fn test_failing_writes() {
        let store = MemoryUserStore::new();
        store.fail_writes(true);
        let mut tx = store.begin().await.unwrap();
        let result = tx
            .insert(new_user("Jane Islands", "jane@gmail.com", "63738306080"))
            .await;
        assert!(matches!(result, Err(AppError::DatabaseError(_))));
    }
}
