//! # Spechub
//!
//! A collaborative hub for requirement documents and source drops, usable
//! both as a standalone binary and as a library.
//!
//! Users create repositories, request and grant membership, upload SRS and
//! source-code files, and read the requirement reports an external
//! extraction program derives from each upload.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! spechub = { version = "0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::path::PathBuf;
//! use spechub::config::ServerConfig;
//! use spechub::server::{AppState, create_router};
//! use spechub::store::{SqliteStore, Store};
//!
//! let config = ServerConfig::from_env(
//!     "127.0.0.1".to_string(),
//!     8080,
//!     PathBuf::from("./data"),
//! ).unwrap();
//!
//! let store = SqliteStore::new(config.db_path()).unwrap();
//! store.initialize().unwrap();
//!
//! let state = Arc::new(AppState::new(Arc::new(store), config).unwrap());
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes the CLI entry point. Disable with
//!   `default-features = false`.

pub mod access;
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod server;
pub mod store;
pub mod types;
