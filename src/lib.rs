//! Libris Library Catalog Server
//!
//! A Rust implementation of the Libris catalog server: authenticated users
//! browse and search books, copies, authors, categories and publishers;
//! staff users manage the catalog.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod forms;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
