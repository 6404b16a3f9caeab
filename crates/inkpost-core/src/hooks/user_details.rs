use tracing::{debug, warn};

use super::{FetchFailure, FetchState, LoadingGuard};
use crate::api::{ApiClient, Transport};
use crate::auth::Session;
use crate::models::{User, UserDetails};

/// What a profile view renders from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDetailsView {
    pub is_loading: bool,
    pub error: bool,
    pub user: Option<User>,
    pub session_created: Option<String>,
    pub session_expires: Option<String>,
}

/// Fetches the signed-in user's profile, then confirms the session with the
/// server as a separate step with its own outcome.
#[derive(Debug, Default)]
pub struct UserDetailsHook {
    details: FetchState<UserDetails>,
    confirmation: FetchState<()>,
}

impl UserDetailsHook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FetchState<UserDetails> {
        &self.details
    }

    /// Outcome of the session confirmation step.
    pub fn confirmation(&self) -> &FetchState<()> {
        &self.confirmation
    }

    pub fn view(&self) -> UserDetailsView {
        match &self.details {
            FetchState::Idle => UserDetailsView::default(),
            FetchState::Loading => UserDetailsView {
                is_loading: true,
                ..Default::default()
            },
            FetchState::Success(details) => UserDetailsView {
                is_loading: false,
                error: false,
                user: Some(details.user.clone()),
                session_created: details.session_created.clone(),
                session_expires: details.session_expires.clone(),
            },
            FetchState::Failed(_) => UserDetailsView {
                error: true,
                ..Default::default()
            },
        }
    }

    /// Fetch the profile. Without an authenticated session and a user id the
    /// hook stays idle and sends nothing.
    pub async fn activate<T: Transport>(&mut self, session: &Session, api: &ApiClient<T>) {
        let (Some(token), Some(user_id)) = (session.bearer(), session.user_id()) else {
            debug!("No authenticated user, skipping user details");
            self.details = FetchState::Idle;
            self.confirmation = FetchState::Idle;
            return;
        };

        self.confirmation = FetchState::Idle;
        let guard = LoadingGuard::begin(&mut self.details);
        let result = api.user_details(token, user_id).await;
        guard.finish(match result {
            Ok(Some(details)) => FetchState::Success(details),
            Ok(None) => {
                warn!(user_id, "Server rejected user details request");
                FetchState::Failed(FetchFailure::Rejected { status: None })
            }
            Err(e) => FetchState::Failed(FetchFailure::from_api_error("user_details", &e)),
        });
    }

    /// Confirm the session server-side. Only runs after a successful profile
    /// fetch with a token; its failure is logged and never marks the profile
    /// as failed.
    pub async fn confirm_session<T: Transport>(&mut self, session: &Session, api: &ApiClient<T>) {
        if self.details.value().is_none() {
            return;
        }
        let (Some(token), Some(user_id)) = (session.bearer(), session.user_id()) else {
            return;
        };

        let guard = LoadingGuard::begin(&mut self.confirmation);
        let result = api.check_create_session(token, user_id).await;
        guard.finish(match result {
            Ok(true) => FetchState::Success(()),
            Ok(false) => {
                warn!(user_id, "Session confirmation rejected");
                FetchState::Failed(FetchFailure::Rejected { status: None })
            }
            Err(e) => {
                warn!(error = %e, "Session confirmation failed");
                FetchState::Failed(FetchFailure::Transport(e.to_string()))
            }
        });
    }

    /// Both steps in order.
    pub async fn run<T: Transport>(&mut self, session: &Session, api: &ApiClient<T>) {
        self.activate(session, api).await;
        self.confirm_session(session, api).await;
    }
}
