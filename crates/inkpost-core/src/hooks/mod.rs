//! Data-fetching hooks.
//!
//! Each hook owns the state of one view's request and moves through
//! `Idle -> Loading -> Success | Failed`. A hook performs exactly one
//! request per activation; there is no retry, backoff or cache. Hooks only
//! re-enter `Loading` when their target changes or they are explicitly
//! refreshed or resubmitted.
//!
//! Hooks take the session and the API client as arguments instead of
//! reaching for global state. Dropping an in-flight `activate` future cancels
//! the request; the hook then drops back from `Loading` to `Idle`, and
//! results are only written once the response has arrived inside that
//! future.

pub mod post_detail;
pub mod post_form;
pub mod posts_list;
pub mod user_details;

pub use post_detail::{PostDetailHook, PostDetailView, PostTarget};
pub use post_form::{delete_post, PostFormHook, PostFormMode, PostFormView};
pub use posts_list::{PostsListHook, PostsListView, POSTS_PER_PAGE};
pub use user_details::{UserDetailsHook, UserDetailsView};

use tracing::error;

use crate::api::ApiError;

/// Why a fetch ended in `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// The request itself failed (network, HTTP status, malformed reply)
    Transport(String),
    /// The server answered `success: false`
    Rejected { status: Option<u16> },
}

impl FetchFailure {
    /// Log a request failure and classify it.
    pub(crate) fn from_api_error(operation: &'static str, err: &ApiError) -> Self {
        error!(operation, error = %err, "Request failed");
        FetchFailure::Transport(err.to_string())
    }

    pub fn message(&self) -> String {
        match self {
            FetchFailure::Transport(msg) => format!("Request failed: {}", msg),
            FetchFailure::Rejected { status: Some(403) } => {
                "You are not allowed to view this".to_string()
            }
            FetchFailure::Rejected { status: Some(404) } => "Not found".to_string(),
            FetchFailure::Rejected { status: Some(code) } => format!("Request rejected ({})", code),
            FetchFailure::Rejected { status: None } => "Request rejected".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState<T> {
    Idle,
    Loading,
    Success(T),
    Failed(FetchFailure),
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        FetchState::Idle
    }
}

impl<T> FetchState<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, FetchState::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FetchState::Failed(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            FetchState::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&FetchFailure> {
        match self {
            FetchState::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Holds a hook's state at `Loading` for one request. If the request future
/// is dropped before [`finish`](Self::finish), the state goes back to `Idle`
/// so the next activation fetches again.
pub(crate) struct LoadingGuard<'a, T> {
    state: &'a mut FetchState<T>,
}

impl<'a, T> LoadingGuard<'a, T> {
    pub(crate) fn begin(state: &'a mut FetchState<T>) -> Self {
        *state = FetchState::Loading;
        Self { state }
    }

    pub(crate) fn finish(self, outcome: FetchState<T>) {
        *self.state = outcome;
    }
}

impl<T> Drop for LoadingGuard<'_, T> {
    fn drop(&mut self) {
        if self.state.is_loading() {
            *self.state = FetchState::Idle;
        }
    }
}
