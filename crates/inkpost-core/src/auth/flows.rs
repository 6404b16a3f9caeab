//! Account flows that involve both the server and the local session.

use thiserror::Error;
use tracing::{error, info, warn};

use super::context::{AuthContext, AuthState};
use super::store::KeyValueStore;
use crate::api::{ApiClient, ApiError, Transport};
use crate::models::{SignupForm, SignupResult};

#[derive(Error, Debug)]
pub enum LoginError {
    #[error("Email and password required")]
    MissingCredentials,

    #[error("Invalid email or password")]
    Rejected,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Failed to store session: {0}")]
    Session(anyhow::Error),
}

impl LoginError {
    /// True only when the server refused the credentials themselves.
    pub fn is_rejected(&self) -> bool {
        matches!(self, LoginError::Rejected)
    }
}

/// Register a new account. The server's per-field verdicts come back as
/// data; only request failures are errors.
pub async fn signup<T: Transport>(
    api: &ApiClient<T>,
    form: &SignupForm,
) -> Result<SignupResult, ApiError> {
    let result = api.signup(form).await?;
    if result.success {
        info!(email = %form.email, "Account created");
    } else {
        warn!(errors = ?result.field_errors(), "Signup rejected");
    }
    Ok(result)
}

/// Exchange credentials for a session and persist it.
pub async fn login<T: Transport, S: KeyValueStore>(
    api: &ApiClient<T>,
    auth: &mut AuthContext<S>,
    email: &str,
    password: &str,
) -> Result<AuthState, LoginError> {
    if email.is_empty() || password.is_empty() {
        return Err(LoginError::MissingCredentials);
    }

    let login = match api.login(email, password).await {
        Ok(Some(login)) => login,
        Ok(None) => {
            warn!(email, "Login rejected");
            return Err(LoginError::Rejected);
        }
        Err(e) => {
            error!(error = %e, "Login failed");
            return Err(e.into());
        }
    };

    let state = auth.establish(&login).map_err(LoginError::Session)?;
    if state == AuthState::Authenticated {
        info!(user_id = %login.user_id, "Login successful");
    } else {
        warn!(expires_in = %login.expires_in, "Server issued a session that is already expired");
    }
    Ok(state)
}

/// End the session on the server, then locally. The local logout happens
/// even when the server call fails.
pub async fn logout<T: Transport, S: KeyValueStore>(
    api: &ApiClient<T>,
    auth: &mut AuthContext<S>,
) {
    let session = auth.session();
    if let (Some(token), Some(user_id)) = (session.bearer(), session.user_id()) {
        match api.delete_session(token, user_id).await {
            Ok(true) => {}
            Ok(false) => warn!(user_id, "Server declined to delete session"),
            Err(e) => warn!(error = %e, "Failed to delete server session"),
        }
    }
    auth.logout_user();
}
