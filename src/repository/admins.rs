//! Admins repository
//!
//! Admin documents are keyed by name, so lookup is a direct get.

use crate::{error::AppResult, models::admin::Admin, store::DocStore};

use super::{encode_fields, ADMINS};

#[derive(Clone)]
pub struct AdminsRepository {
    store: DocStore,
}

impl AdminsRepository {
    pub fn new(store: DocStore) -> Self {
        Self { store }
    }

    /// Get admin by name
    pub async fn get_by_name(&self, name: &str) -> AppResult<Option<Admin>> {
        match self.store.get(ADMINS, name).await {
            Some(doc) => {
                let mut admin: Admin = doc.decode()?;
                admin.id = doc.id;
                Ok(Some(admin))
            }
            None => Ok(None),
        }
    }

    /// Create or replace an admin account
    pub async fn put(&self, name: &str, password_hash: &str) -> AppResult<()> {
        let admin = Admin {
            id: name.to_string(),
            name: name.to_string(),
            password_hash: password_hash.to_string(),
        };
        self.store.set(ADMINS, name, encode_fields(&admin)?).await;
        Ok(())
    }
}
