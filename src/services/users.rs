use std::sync::Arc;

use crate::error::AppError;
use crate::filters::build_filters;
use crate::messages::Messages;
use crate::models::user::NON_USER_FILTERS;
use crate::models::{
    CreateUserInput, DataMessage, FindOptions, Message, NewUser, PageInfo, UpdateUserInput, User,
    UserFilters, UserPage,
};
use crate::password::{hash_password, verify_password};
use crate::store::{UserStore, UserTransaction};

/// Business rules for user records.
///
/// Every mutation runs inside one store transaction. Errors raised on purpose
/// (not found, duplicates, wrong password) reach the caller unchanged; anything
/// else is logged and replaced by the operation's generic failure message.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    messages: &'static Messages,
    hash_cost: u32,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, messages: &'static Messages, hash_cost: u32) -> Self {
        Self {
            store,
            messages,
            hash_cost,
        }
    }

    /// Active users matching `filters`, ordered by name.
    pub async fn find_all(&self, filters: &UserFilters) -> Result<Vec<User>, AppError> {
        let predicate = build_filters(filters.to_query(), &NON_USER_FILTERS, &[]);
        self.store
            .find_all(&predicate)
            .await
            .map_err(|e| self.surface(e, self.messages.fetch_users_failed))
    }

    /// One page of active users.
    pub async fn find_page(&self, options: &FindOptions) -> Result<UserPage, AppError> {
        let filters = options.filters.clone().unwrap_or_default();
        let predicate = build_filters(filters.to_query(), &NON_USER_FILTERS, &[]);
        let page = options.paginate.normalized();

        let (items, total) = self
            .store
            .find_page(&predicate, page, options.order_by)
            .await
            .map_err(|e| self.surface(e, self.messages.fetch_users_failed))?;

        Ok(UserPage {
            page_info: PageInfo::new(total, items.len(), page),
            items,
        })
    }

    pub async fn find_one(&self, id: i32) -> Result<User, AppError> {
        let user = self
            .store
            .find_by_id(id)
            .await
            .map_err(|e| self.surface(e, self.messages.fetch_user_failed))?;

        user.ok_or_else(|| AppError::NotFound(self.messages.user_not_found.to_string()))
    }

    pub async fn create(&self, input: CreateUserInput) -> Result<User, AppError> {
        let failure = self.messages.create_failed;
        let mut tx = self.begin(failure).await?;
        let outcome = self.insert_user(tx.as_mut(), input).await;
        let user = self.finish(tx, outcome, failure).await?;

        log::info!("Created user {}", user.id);
        Ok(user)
    }

    pub async fn update(
        &self,
        id: i32,
        input: UpdateUserInput,
    ) -> Result<DataMessage<User>, AppError> {
        let failure = self.messages.update_failed;
        let mut tx = self.begin(failure).await?;
        let outcome = self.update_user(tx.as_mut(), id, input).await;
        let user = self.finish(tx, outcome, failure).await?;

        log::info!("Updated user {}", user.id);
        Ok(DataMessage {
            data: user,
            message: self.messages.user_updated.to_string(),
        })
    }

    pub async fn remove(&self, id: i32) -> Result<Message, AppError> {
        let failure = self.messages.delete_failed;
        let mut tx = self.begin(failure).await?;
        let outcome = self.remove_user(tx.as_mut(), id).await;
        self.finish(tx, outcome, failure).await?;

        log::info!("Soft-deleted user {}", id);
        Ok(Message {
            message: self.messages.user_deleted.to_string(),
        })
    }

    async fn insert_user(
        &self,
        tx: &mut dyn UserTransaction,
        input: CreateUserInput,
    ) -> Result<User, AppError> {
        if tx.find_by_email(&input.email, None).await?.is_some() {
            return Err(AppError::BadRequest(self.messages.email_taken.to_string()));
        }
        if tx.find_by_cpf(&input.cpf).await?.is_some() {
            return Err(AppError::BadRequest(self.messages.cpf_taken.to_string()));
        }

        let password_hash = hash_password(&input.password, self.hash_cost)?;
        tx.insert(NewUser {
            name: input.name,
            email: input.email,
            cpf: input.cpf,
            password_hash,
        })
        .await
    }

    async fn update_user(
        &self,
        tx: &mut dyn UserTransaction,
        id: i32,
        input: UpdateUserInput,
    ) -> Result<User, AppError> {
        let mut user = tx
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(self.messages.user_not_found.to_string()))?;

        if let Some(email) = input.email.as_deref().filter(|email| *email != user.email) {
            if tx.find_by_email(email, Some(id)).await?.is_some() {
                return Err(AppError::BadRequest(self.messages.email_taken.to_string()));
            }
        }

        match (input.password.as_deref(), input.old_password.as_deref()) {
            (Some(new_password), Some(old_password)) => {
                if !verify_password(old_password, &user.password_hash)? {
                    return Err(AppError::BadRequest(
                        self.messages.incorrect_password.to_string(),
                    ));
                }
                user.password_hash = hash_password(new_password, self.hash_cost)?;
            }
            (Some(_), None) => {
                return Err(AppError::BadRequest(
                    self.messages.old_password_required.to_string(),
                ));
            }
            (None, _) => {}
        }

        if let Some(name) = input.name {
            user.name = name;
        }
        if let Some(email) = input.email {
            user.email = email;
        }

        tx.update(&user).await
    }

    async fn remove_user(&self, tx: &mut dyn UserTransaction, id: i32) -> Result<(), AppError> {
        if tx.find_by_id(id).await?.is_none() {
            return Err(AppError::NotFound(self.messages.user_not_found.to_string()));
        }
        tx.soft_delete(id).await
    }

    async fn begin(&self, failure: &'static str) -> Result<Box<dyn UserTransaction>, AppError> {
        self.store
            .begin()
            .await
            .map_err(|e| self.surface(e, failure))
    }

    /// Commits on success. On failure rolls back first, then surfaces the error.
    async fn finish<T>(
        &self,
        tx: Box<dyn UserTransaction>,
        outcome: Result<T, AppError>,
        failure: &'static str,
    ) -> Result<T, AppError> {
        match outcome {
            Ok(value) => match tx.commit().await {
                Ok(()) => Ok(value),
                Err(e) => Err(self.surface(e, failure)),
            },
            Err(e) => {
                if let Err(rollback_error) = tx.rollback().await {
                    log::error!("Rollback failed: {}", rollback_error);
                }
                Err(self.surface(e, failure))
            }
        }
    }

    fn surface(&self, error: AppError, failure: &'static str) -> AppError {
        if error.is_expected() {
            return error;
        }
        log::error!("{} {}", failure, error);
        AppError::BadRequest(failure.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Locale;
    use crate::store::MemoryUserStore;
    use pretty_assertions::assert_eq;

    const TEST_COST: u32 = 4;

    fn service() -> (UserService, MemoryUserStore) {
        let store = MemoryUserStore::new();
        let service = UserService::new(Arc::new(store.clone()), Locale::En.messages(), TEST_COST);
        (service, store)
    }

    fn jane() -> CreateUserInput {
        CreateUserInput {
            name: "Jane Islands Grantfort".to_string(),
            email: "jane@gmail.com".to_string(),
            cpf: "63738306080".to_string(),
            password: "Qwerty@123".to_string(),
        }
    }

    fn john() -> CreateUserInput {
        CreateUserInput {
            name: "John Doe Smith".to_string(),
            email: "john@gmail.com".to_string(),
            cpf: "52998224725".to_string(),
            password: "Qwerty@123".to_string(),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_creates_are_all_persisted() {
        let store = MemoryUserStore::new();
        // Real cost so hashing overlaps the other request.
        let service = UserService::new(
            Arc::new(store.clone()),
            Locale::En.messages(),
            crate::password::DEFAULT_HASH_COST,
        );

        let first = tokio::spawn({
            let service = service.clone();
            async move { service.create(jane()).await }
        });
        let second = tokio::spawn({
            let service = service.clone();
            async move { service.create(john()).await }
        });

        let mut ids = vec![
            first.await.unwrap().unwrap().id,
            second.await.unwrap().unwrap().id,
        ];
        ids.sort();

        assert_eq!(ids, vec![1, 2]);
        assert_eq!(store.row_count().unwrap(), 2);
        assert_eq!(service.find_all(&UserFilters::default()).await.unwrap().len(), 2);
    }

    #[test_log::test(actix_rt::test)]
    async fn test_create_hashes_password() {
        let (service, store) = service();
        let user = service.create(jane()).await.unwrap();

        assert_eq!(user.name, "Jane Islands Grantfort");
        let stored = store.raw_row(user.id).unwrap().unwrap();
        assert_ne!(stored.password_hash, "Qwerty@123");
        assert!(verify_password("Qwerty@123", &stored.password_hash).unwrap());
    }

    #[actix_rt::test]
    async fn test_create_rejects_duplicate_email_and_rolls_back() {
        let (service, store) = service();
        service.create(jane()).await.unwrap();

        let duplicate = CreateUserInput {
            cpf: "52998224725".to_string(),
            ..jane()
        };
        let error = service.create(duplicate).await.unwrap_err();

        assert_eq!(
            error,
            AppError::BadRequest("This email is already registered in our system.".into())
        );
        assert_eq!(store.row_count().unwrap(), 1);
    }

    #[actix_rt::test]
    async fn test_create_rejects_duplicate_cpf() {
        let (service, store) = service();
        service.create(jane()).await.unwrap();

        let duplicate = CreateUserInput {
            email: "other@gmail.com".to_string(),
            ..jane()
        };
        let error = service.create(duplicate).await.unwrap_err();

        assert_eq!(
            error,
            AppError::BadRequest("This cpf is already registered in our system.".into())
        );
        assert_eq!(store.row_count().unwrap(), 1);
    }

    #[actix_rt::test]
    async fn test_create_store_failure_is_generic() {
        let (service, store) = service();
        store.fail_writes(true);

        let error = service.create(jane()).await.unwrap_err();

        assert_eq!(error, AppError::BadRequest("Failed to create user.".into()));
        assert_eq!(store.row_count().unwrap(), 0);
    }

    #[actix_rt::test]
    async fn test_soft_deleted_email_can_be_reused() {
        let (service, _) = service();
        let user = service.create(jane()).await.unwrap();
        service.remove(user.id).await.unwrap();

        assert!(service.create(jane()).await.is_ok());
    }

    #[actix_rt::test]
    async fn test_find_all_substring_filters() {
        let (service, _) = service();
        service.create(jane()).await.unwrap();
        service.create(john()).await.unwrap();

        let filters = UserFilters {
            cpf: Some("637".to_string()),
            ..Default::default()
        };
        let users = service.find_all(&filters).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].cpf, "63738306080");

        let all = service.find_all(&UserFilters::default()).await.unwrap();
        let names: Vec<&str> = all.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Jane Islands Grantfort", "John Doe Smith"]);
    }

    #[actix_rt::test]
    async fn test_find_all_ignores_fields_without_columns() {
        let (service, _) = service();
        service.create(jane()).await.unwrap();

        let filters = UserFilters {
            user_id: Some(99),
            description: Some("anything".to_string()),
            ..Default::default()
        };
        assert_eq!(service.find_all(&filters).await.unwrap().len(), 1);
    }

    #[actix_rt::test]
    async fn test_find_one_not_found() {
        let (service, _) = service();
        let error = service.find_one(42).await.unwrap_err();
        assert_eq!(error, AppError::NotFound("User not found.".into()));
    }

    #[actix_rt::test]
    async fn test_update_changes_fields_and_password() {
        let (service, store) = service();
        let user = service.create(jane()).await.unwrap();

        let result = service
            .update(
                user.id,
                UpdateUserInput {
                    name: Some("Jane Island Grantfort".to_string()),
                    email: Some("jane_islands@gmail.com".to_string()),
                    password: Some("Qwerty@12345".to_string()),
                    old_password: Some("Qwerty@123".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(result.message, "User updated successfully.");
        assert_eq!(result.data.name, "Jane Island Grantfort");
        assert_eq!(result.data.email, "jane_islands@gmail.com");
        let stored = store.raw_row(user.id).unwrap().unwrap();
        assert!(verify_password("Qwerty@12345", &stored.password_hash).unwrap());
    }

    #[actix_rt::test]
    async fn test_update_wrong_old_password_keeps_hash() {
        let (service, store) = service();
        let user = service.create(jane()).await.unwrap();
        let before = store.raw_row(user.id).unwrap().unwrap().password_hash;

        let error = service
            .update(
                user.id,
                UpdateUserInput {
                    password: Some("Qwerty@12345".to_string()),
                    old_password: Some("wrong-password".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert_eq!(error, AppError::BadRequest("Incorrect password.".into()));
        let after = store.raw_row(user.id).unwrap().unwrap().password_hash;
        assert_eq!(before, after);
    }

    #[actix_rt::test]
    async fn test_update_password_requires_old_password() {
        let (service, _) = service();
        let user = service.create(jane()).await.unwrap();

        let error = service
            .update(
                user.id,
                UpdateUserInput {
                    password: Some("Qwerty@12345".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert_eq!(
            error,
            AppError::BadRequest("Old password is required to change the password.".into())
        );
    }

    #[actix_rt::test]
    async fn test_update_rejects_email_of_other_user() {
        let (service, _) = service();
        let user = service.create(jane()).await.unwrap();
        service.create(john()).await.unwrap();

        let error = service
            .update(
                user.id,
                UpdateUserInput {
                    email: Some("john@gmail.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(
            error,
            AppError::BadRequest("This email is already registered in our system.".into())
        );

        // Re-sending the current email is not a conflict.
        let result = service
            .update(
                user.id,
                UpdateUserInput {
                    email: Some("jane@gmail.com".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(result.is_ok());
    }

    #[actix_rt::test]
    async fn test_update_missing_user() {
        let (service, _) = service();
        let error = service
            .update(7, UpdateUserInput::default())
            .await
            .unwrap_err();
        assert_eq!(error, AppError::NotFound("User not found.".into()));
    }

    #[actix_rt::test]
    async fn test_remove() {
        let (service, store) = service();
        let user = service.create(jane()).await.unwrap();

        let error = service.remove(user.id + 1).await.unwrap_err();
        assert_eq!(error, AppError::NotFound("User not found.".into()));

        let message = service.remove(user.id).await.unwrap();
        assert_eq!(message.message, "User deleted successfully.");

        assert!(service.find_one(user.id).await.is_err());
        assert!(service
            .find_all(&UserFilters::default())
            .await
            .unwrap()
            .is_empty());
        assert!(store.raw_row(user.id).unwrap().is_some());

        let error = service.remove(user.id).await.unwrap_err();
        assert_eq!(error, AppError::NotFound("User not found.".into()));
    }

    #[actix_rt::test]
    async fn test_remove_store_failure_is_generic() {
        let (service, store) = service();
        let user = service.create(jane()).await.unwrap();
        store.fail_writes(true);

        let error = service.remove(user.id).await.unwrap_err();
        assert_eq!(error, AppError::BadRequest("Failed to delete user.".into()));
        assert!(service.find_one(user.id).await.is_ok());
    }

    #[actix_rt::test]
    async fn test_find_page() {
        let (service, _) = service();
        service.create(jane()).await.unwrap();
        service.create(john()).await.unwrap();

        let options = FindOptions {
            paginate: crate::models::PageOptions { page: 1, offset: 1 },
            order_by: crate::models::OrderBy {
                set: crate::models::SortField::Name,
                order: crate::models::SortOrder::Desc,
            },
            ..Default::default()
        };
        let page = service.find_page(&options).await.unwrap();

        assert_eq!(page.page_info.total_items, 2);
        assert_eq!(page.page_info.total_pages, 2);
        assert_eq!(page.page_info.next_page, Some(2));
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "John Doe Smith");
    }

    #[actix_rt::test]
    async fn test_portuguese_messages() {
        let store = MemoryUserStore::new();
        let service = UserService::new(Arc::new(store), Locale::Pt.messages(), TEST_COST);
        let error = service.find_one(1).await.unwrap_err();
        assert_eq!(error, AppError::NotFound("Usuário não encontrado.".into()));
    }
}
