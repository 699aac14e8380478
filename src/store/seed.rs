//! Seed data loader
//!
//! Populates an empty store from a JSON file at startup: admin accounts,
//! classes, items and instances. Items are seeded WITHOUT aggregate
//! counters, the same shape legacy documents have; the repair engine
//! materializes the counters on first read.

use std::collections::HashMap;
use std::path::Path;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use super::{DocStore, Fields};

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid seed file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("instance {0} references unknown item {1}")]
    UnknownItem(String, String),

    #[error("failed to hash seed password: {0}")]
    Hash(String),
}

#[derive(Debug, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub admins: Vec<SeedAdmin>,
    #[serde(default)]
    pub classes: Vec<SeedClass>,
    #[serde(default)]
    pub items: Vec<SeedItem>,
    #[serde(default)]
    pub instances: Vec<SeedInstance>,
}

#[derive(Debug, Deserialize)]
pub struct SeedAdmin {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SeedClass {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SeedItem {
    pub label: String,
}

#[derive(Debug, Deserialize)]
pub struct SeedInstance {
    /// Identification tag
    pub tag: String,
    /// Label of the owning item
    pub item: String,
}

/// Counts of what was loaded, for the startup log
#[derive(Debug, Default)]
pub struct SeedSummary {
    pub admins: usize,
    pub classes: usize,
    pub items: usize,
    pub instances: usize,
}

fn object(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        _ => unreachable!("seed documents are objects"),
    }
}

/// Load a seed file into the store
pub async fn load_file(store: &DocStore, path: &Path) -> Result<SeedSummary, SeedError> {
    let raw = tokio::fs::read_to_string(path).await?;
    let seed: SeedFile = serde_json::from_str(&raw)?;
    load(store, seed).await
}

/// Load parsed seed data into the store
pub async fn load(store: &DocStore, seed: SeedFile) -> Result<SeedSummary, SeedError> {
    let mut summary = SeedSummary::default();

    for admin in &seed.admins {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(admin.password.as_bytes(), &salt)
            .map_err(|e| SeedError::Hash(e.to_string()))?
            .to_string();
        store
            .set(
                "admins",
                &admin.name,
                object(json!({"name": admin.name, "passwordHash": hash})),
            )
            .await;
        summary.admins += 1;
    }

    for class in &seed.classes {
        store
            .add("classes", object(json!({"name": class.name})))
            .await;
        summary.classes += 1;
    }

    let mut item_ids: HashMap<&str, String> = HashMap::new();
    for item in &seed.items {
        let id = store
            .add("items", object(json!({"label": item.label})))
            .await;
        item_ids.insert(item.label.as_str(), id);
        summary.items += 1;
    }

    for instance in &seed.instances {
        let item_id = item_ids.get(instance.item.as_str()).ok_or_else(|| {
            SeedError::UnknownItem(instance.tag.clone(), instance.item.clone())
        })?;
        store
            .add(
                "instances",
                object(json!({
                    "id": instance.tag,
                    "itemId": item_id,
                    "isAvailable": true,
                    "borrowedBy": null,
                    "borrowedAt": null,
                })),
            )
            .await;
        summary.instances += 1;
    }

    Ok(summary)
}
