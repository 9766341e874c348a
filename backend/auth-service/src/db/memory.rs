//! In-memory principal store for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use token_core::Role;

use crate::db::{PrincipalStore, StoreError};
use crate::models::AppUser;

#[derive(Default)]
pub struct InMemoryPrincipalStore {
    users: Mutex<HashMap<String, AppUser>>,
}

impl InMemoryPrincipalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = AppUser>) -> Self {
        let store = Self::new();
        {
            let mut map = store.users.lock().expect("store poisoned");
            for user in users {
                map.insert(user.email.clone(), user);
            }
        }
        store
    }
}

#[async_trait]
impl PrincipalStore for InMemoryPrincipalStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<AppUser>, StoreError> {
        Ok(self.users.lock().expect("store poisoned").get(email).cloned())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        Ok(self.users.lock().expect("store poisoned").contains_key(email))
    }

    async fn save(&self, user: AppUser) -> Result<AppUser, StoreError> {
        self.users
            .lock()
            .expect("store poisoned")
            .insert(user.email.clone(), user.clone());
        Ok(user)
    }

    async fn update_role(&self, email: &str, role: Role) -> Result<Option<AppUser>, StoreError> {
        let mut users = self.users.lock().expect("store poisoned");
        Ok(users.get_mut(email).map(|user| {
            user.role = role;
            user.clone()
        }))
    }

    async fn set_active(&self, email: &str, active: bool) -> Result<Option<AppUser>, StoreError> {
        let mut users = self.users.lock().expect("store poisoned");
        Ok(users.get_mut(email).map(|user| {
            user.active = active;
            user.clone()
        }))
    }

    async fn list(&self) -> Result<Vec<AppUser>, StoreError> {
        let mut users: Vec<AppUser> =
            self.users.lock().expect("store poisoned").values().cloned().collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }
}
