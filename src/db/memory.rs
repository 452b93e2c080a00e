//! In-process user store for tests and `STORE=memory` runs.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::users::{StoreError, UserRecord, UserStore};

/// email -> record. Check-and-insert happens under one write lock.
#[derive(Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<RwLock<HashMap<String, UserRecord>>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Uuid, StoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(email) {
            return Err(StoreError::AlreadyExists);
        }
        let id = Uuid::new_v4();
        users.insert(
            email.to_string(),
            UserRecord {
                id,
                name: name.to_string(),
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn update_password_hash(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        match users.get_mut(email) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_find() {
        let store = MemoryUserStore::new();
        let id = store.create_user("Alice", "alice@x.com", "h1").await.unwrap();
        let user = store.find_by_email("alice@x.com").await.unwrap().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.name, "Alice");
        assert_eq!(user.password_hash, "h1");
    }

    #[tokio::test]
    async fn email_lookup_is_case_sensitive() {
        let store = MemoryUserStore::new();
        store.create_user("Alice", "alice@x.com", "h1").await.unwrap();
        assert!(store.find_by_email("Alice@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryUserStore::new();
        store.create_user("Alice", "alice@x.com", "h1").await.unwrap();
        let err = store
            .create_user("Other", "alice@x.com", "h2")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn concurrent_inserts_admit_exactly_one() {
        let store = MemoryUserStore::new();
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .create_user(&format!("user{}", i), "race@x.com", "h")
                    .await
            }));
        }
        let mut created = 0;
        for h in handles {
            if h.await.unwrap().is_ok() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn update_reports_whether_a_row_matched() {
        let store = MemoryUserStore::new();
        store.create_user("Alice", "alice@x.com", "h1").await.unwrap();
        assert!(store.update_password_hash("alice@x.com", "h2").await.unwrap());
        assert!(!store.update_password_hash("bob@x.com", "h2").await.unwrap());
        let user = store.find_by_email("alice@x.com").await.unwrap().unwrap();
        assert_eq!(user.password_hash, "h2");
    }
}
