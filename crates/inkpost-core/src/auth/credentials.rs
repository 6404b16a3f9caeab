//! Login passwords remembered in the OS keychain.
//!
//! Only the password is kept there; the email it belongs to is the
//! `last_email` recorded in the config file.

use anyhow::{Context, Result};
use keyring::Entry;
use tracing::{debug, warn};

const SERVICE_NAME: &str = "inkpost";

/// The keychain slot for one account's login password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RememberedLogin {
    email: String,
}

impl RememberedLogin {
    pub fn for_email(email: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(SERVICE_NAME, &self.email).context("Failed to open keychain entry")
    }

    /// The remembered password, if there is one. A keychain that cannot be
    /// read counts as nothing remembered.
    pub fn password(&self) -> Option<String> {
        let entry = match self.entry() {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Keychain unavailable");
                return None;
            }
        };
        match entry.get_password() {
            Ok(password) => Some(password),
            Err(keyring::Error::NoEntry) => {
                debug!(email = %self.email, "No remembered password");
                None
            }
            Err(e) => {
                warn!(error = %e, "Failed to read remembered password");
                None
            }
        }
    }

    pub fn remember(&self, password: &str) -> Result<()> {
        self.entry()?
            .set_password(password)
            .context("Failed to store password in keychain")
    }

    /// Drop the remembered password. Returns whether one was there.
    pub fn forget(&self) -> Result<bool> {
        match self.entry()?.delete_credential() {
            Ok(()) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(e) => Err(e).context("Failed to delete password from keychain"),
        }
    }
}
