//! Authentication module for managing the client-side session.
//!
//! This module provides:
//! - `KeyValueStore`: persistent key-value facade holding the session triple
//! - `validator`: expiry parsing and comparison
//! - `AuthContext`: the session state machine (validate, check, logout)
//! - `RememberedLogin`: optional OS keychain slot for an account's password
//! - `flows`: signup, login and logout against the server
//!
//! A session is the `token`/`userId`/`expiresIn` triple. It is considered
//! authenticated only while all three are present and the expiry is in the
//! future.

pub mod context;
pub mod credentials;
pub mod flows;
pub mod store;
pub mod validator;

pub use context::{AuthContext, AuthState, Session};
pub use credentials::RememberedLogin;
pub use store::{FileStore, KeyValueStore, MemoryStore, EXPIRES_IN_KEY, TOKEN_KEY, USER_ID_KEY};
pub use validator::{format_expiry, is_session_valid, is_session_valid_at, parse_expiry};
