use diesel::prelude::*;
use timeline_shared::domain::now_utc;

use super::models::{NewUser, User};
use super::schema::users;
use super::{StorageError, Store, new_id};

impl Store {
    pub async fn create_user(&self, email: &str) -> Result<User, StorageError> {
        let email = email.to_string();
        self.interact(move |conn| {
            let now = now_utc();
            let id = new_id();
            let row = NewUser {
                id: &id,
                email: &email,
                created_at: now,
                updated_at: now,
            };
            Ok(diesel::insert_into(users::table)
                .values(&row)
                .returning(User::as_returning())
                .get_result(conn)?)
        })
        .await
    }

    pub async fn get_user(&self, id: &str) -> Result<User, StorageError> {
        let id = id.to_string();
        self.interact(move |conn| {
            users::table
                .find(&id)
                .select(User::as_select())
                .first(conn)
                .optional()?
                .ok_or_else(|| StorageError::not_found("user", &id))
        })
        .await
    }

    /// Emails are not unique; the oldest matching account wins.
    pub async fn get_user_by_email(&self, email: &str) -> Result<User, StorageError> {
        let email = email.to_string();
        self.interact(move |conn| {
            users::table
                .filter(users::email.eq(&email))
                .order(users::created_at.asc())
                .select(User::as_select())
                .first(conn)
                .optional()?
                .ok_or_else(|| StorageError::not_found("user", &email))
        })
        .await
    }
}

pub(super) fn user_exists(conn: &mut SqliteConnection, id: &str) -> QueryResult<bool> {
    let count: i64 = users::table.find(id).count().get_result(conn)?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use crate::storage::StorageError;
    use crate::storage::test_support::temp_store;

    #[tokio::test]
    async fn create_then_lookup_by_id_and_email() {
        let (store, _dir) = temp_store().await;
        let created = store.create_user("ada@example.com").await.unwrap();
        assert!(!created.id.is_empty());

        let by_id = store.get_user(&created.id).await.unwrap();
        assert_eq!(by_id, created);

        let by_email = store.get_user_by_email("ada@example.com").await.unwrap();
        assert_eq!(by_email.id, created.id);
    }

    #[tokio::test]
    async fn duplicate_emails_are_allowed() {
        let (store, _dir) = temp_store().await;
        let first = store.create_user("dup@example.com").await.unwrap();
        let second = store.create_user("dup@example.com").await.unwrap();
        assert_ne!(first.id, second.id);
        let found = store.get_user_by_email("dup@example.com").await.unwrap();
        assert_eq!(found.id, first.id);
    }

    #[tokio::test]
    async fn missing_user_is_not_found() {
        let (store, _dir) = temp_store().await;
        let err = store.get_user("nope").await.unwrap_err();
        assert!(
            matches!(err, StorageError::NotFound { entity: "user", ref id } if id == "nope"),
            "{err:?}"
        );
    }
}
