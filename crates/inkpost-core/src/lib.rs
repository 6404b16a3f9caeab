//! Inkpost core library.
//!
//! Everything a front-end needs to talk to an inkpost blogging server:
//!
//! - `auth`: persistent session store, expiry validation and the
//!   `AuthContext` state machine, plus the signup/login/logout flows
//! - `api`: the GraphQL-over-HTTP client and its `Transport` seam
//! - `hooks`: data-fetching state machines consumed by views
//! - `carousel`: the bundled image picker used by post forms
//! - `config`: environment selection and on-disk configuration

pub mod api;
pub mod auth;
pub mod carousel;
pub mod config;
pub mod hooks;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthContext, AuthState, FileStore, KeyValueStore, MemoryStore, Session};
pub use config::{Config, Environment};
