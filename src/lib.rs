//! Kashidashi Equipment Lending System
//!
//! A Rust server for tracking physical equipment lent to classes during a
//! school event, providing a REST JSON API over a transactional inventory
//! ledger: per-instance availability plus per-item aggregate counters kept
//! consistent under concurrent borrow, return, add and delete.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod store;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
