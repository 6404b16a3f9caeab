use tracing::{debug, warn};

use super::{FetchFailure, FetchState, LoadingGuard};
use crate::api::{ApiClient, Transport};
use crate::auth::Session;
use crate::models::Post;

/// Which post a detail or edit view shows, on whose behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostTarget {
    pub user_id: String,
    pub post_id: String,
}

impl PostTarget {
    pub fn new(user_id: impl Into<String>, post_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            post_id: post_id.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDetailView {
    pub is_loading: bool,
    /// Server status for the lookup, once known
    pub status: Option<u16>,
    pub post: Option<Post>,
    pub success: bool,
}

/// Fetches and validates one post once the session is authenticated.
#[derive(Debug)]
pub struct PostDetailHook {
    target: PostTarget,
    state: FetchState<(u16, Post)>,
}

impl PostDetailHook {
    pub fn new(target: PostTarget) -> Self {
        Self {
            target,
            state: FetchState::Idle,
        }
    }

    pub fn target(&self) -> &PostTarget {
        &self.target
    }

    pub fn state(&self) -> &FetchState<(u16, Post)> {
        &self.state
    }

    /// Point the hook at another post. A different target discards the
    /// previous result so the next activation fetches again.
    pub fn set_target(&mut self, target: PostTarget) {
        if target != self.target {
            self.target = target;
            self.state = FetchState::Idle;
        }
    }

    /// Forget the result so the next activation fetches again.
    pub fn refresh(&mut self) {
        self.state = FetchState::Idle;
    }

    pub fn view(&self) -> PostDetailView {
        match &self.state {
            FetchState::Idle => PostDetailView::default(),
            FetchState::Loading => PostDetailView {
                is_loading: true,
                ..Default::default()
            },
            FetchState::Success((status, post)) => PostDetailView {
                is_loading: false,
                status: Some(*status),
                post: Some(post.clone()),
                success: true,
            },
            FetchState::Failed(FetchFailure::Rejected { status }) => PostDetailView {
                status: *status,
                ..Default::default()
            },
            FetchState::Failed(FetchFailure::Transport(_)) => PostDetailView::default(),
        }
    }

    /// Fetch the target post if it has not been fetched yet. Does nothing
    /// until the session is authenticated.
    pub async fn activate<T: Transport>(&mut self, session: &Session, api: &ApiClient<T>) {
        if !self.state.is_idle() {
            return;
        }
        let Some(token) = session.bearer() else {
            debug!(
                post_id = %self.target.post_id,
                "Waiting for authentication before fetching post"
            );
            return;
        };

        let guard = LoadingGuard::begin(&mut self.state);
        let result = api
            .get_and_validate_post(token, &self.target.user_id, &self.target.post_id)
            .await;

        guard.finish(match result {
            Ok(lookup) => match (lookup.success, lookup.post) {
                (true, Some(post)) => FetchState::Success((lookup.status, post)),
                _ => {
                    warn!(
                        post_id = %self.target.post_id,
                        status = lookup.status,
                        "Post lookup rejected"
                    );
                    FetchState::Failed(FetchFailure::Rejected {
                        status: Some(lookup.status),
                    })
                }
            },
            Err(e) => FetchState::Failed(FetchFailure::from_api_error("get_and_validate_post", &e)),
        });
    }
}
