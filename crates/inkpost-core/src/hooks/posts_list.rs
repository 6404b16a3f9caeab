use tracing::{debug, warn};

use super::{FetchFailure, FetchState, LoadingGuard};
use crate::api::{ApiClient, Transport};
use crate::auth::Session;
use crate::models::{Pagination, Post, PostsPage};

/// Posts shown per page in the feed.
pub const POSTS_PER_PAGE: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostsListView {
    pub is_loading: bool,
    pub error: bool,
    pub posts: Vec<Post>,
    pub pagination: Pagination,
}

/// The paginated feed.
#[derive(Debug)]
pub struct PostsListHook {
    page: u32,
    per_page: u32,
    state: FetchState<PostsPage>,
}

impl Default for PostsListHook {
    fn default() -> Self {
        Self::new(1)
    }
}

impl PostsListHook {
    pub fn new(page: u32) -> Self {
        Self::with_page_size(page, POSTS_PER_PAGE)
    }

    pub fn with_page_size(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
            state: FetchState::Idle,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn state(&self) -> &FetchState<PostsPage> {
        &self.state
    }

    /// Move to another page; the next activation fetches it.
    pub fn set_page(&mut self, page: u32) {
        let page = page.max(1);
        if page != self.page {
            self.page = page;
            self.state = FetchState::Idle;
        }
    }

    pub fn refresh(&mut self) {
        self.state = FetchState::Idle;
    }

    pub fn view(&self) -> PostsListView {
        let empty = Pagination::new(self.page, self.per_page, 0);
        match &self.state {
            FetchState::Success(page) => PostsListView {
                is_loading: false,
                error: false,
                posts: page.posts.clone(),
                pagination: page.pagination,
            },
            other => PostsListView {
                is_loading: other.is_loading(),
                error: other.is_failed(),
                posts: Vec::new(),
                pagination: empty,
            },
        }
    }

    pub async fn activate<T: Transport>(&mut self, session: &Session, api: &ApiClient<T>) {
        if !self.state.is_idle() {
            return;
        }
        let Some(token) = session.bearer() else {
            debug!("Waiting for authentication before fetching posts");
            return;
        };

        let guard = LoadingGuard::begin(&mut self.state);
        let result = api.get_posts(token, self.page, self.per_page).await;
        guard.finish(match result {
            Ok(Some(page)) => FetchState::Success(page),
            Ok(None) => {
                warn!(page = self.page, "Post list rejected");
                FetchState::Failed(FetchFailure::Rejected { status: None })
            }
            Err(e) => FetchState::Failed(FetchFailure::from_api_error("get_posts", &e)),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::fake::FakeTransport;
    use crate::api::Operation;
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::timeout;

    fn session() -> Session {
        Session {
            token: "tok".to_string(),
            user_id: "u1".to_string(),
            expires_in: "2099-01-01T00:00:00Z".to_string(),
            user_authenticated: true,
        }
    }

    fn page_of(ids: &[&str], total: u32) -> serde_json::Value {
        let posts: Vec<_> = ids
            .iter()
            .map(|id| json!({"_id": id, "title": "T", "content": "C"}))
            .collect();
        json!({"success": true, "totalPosts": total, "posts": posts})
    }

    #[tokio::test]
    async fn test_loads_first_page() {
        let api = ApiClient::with_transport(
            FakeTransport::new().respond(Operation::GetPosts, page_of(&["a", "b"], 7)),
        );
        let mut hook = PostsListHook::with_page_size(1, 2);
        hook.activate(&session(), &api).await;

        let view = hook.view();
        assert_eq!(view.posts.len(), 2);
        assert_eq!(view.pagination.total_pages(), 4);
        assert_eq!(view.pagination.next(), Some(2));
    }

    #[tokio::test]
    async fn test_page_change_refetches() {
        let api = ApiClient::with_transport(
            FakeTransport::new()
                .respond(Operation::GetPosts, page_of(&["a"], 2))
                .respond(Operation::GetPosts, page_of(&["b"], 2)),
        );
        let mut hook = PostsListHook::with_page_size(1, 1);
        hook.activate(&session(), &api).await;
        hook.set_page(1);
        hook.activate(&session(), &api).await;
        assert_eq!(api.transport().sent().len(), 1);

        hook.set_page(2);
        hook.activate(&session(), &api).await;
        assert_eq!(hook.view().posts[0].id, "b");
        assert_eq!(api.transport().sent()[1].variables["page"], 2);
    }

    #[tokio::test]
    async fn test_cancelled_fetch_is_retried() {
        let api = ApiClient::with_transport(
            FakeTransport::new()
                .hang()
                .respond(Operation::GetPosts, page_of(&["a"], 1)),
        );
        let mut hook = PostsListHook::default();

        let cancelled = timeout(Duration::from_millis(20), hook.activate(&session(), &api)).await;
        assert!(cancelled.is_err());
        assert!(hook.state().is_idle());

        hook.activate(&session(), &api).await;
        assert_eq!(hook.view().posts.len(), 1);
        assert_eq!(api.transport().sent().len(), 2);
    }

    #[tokio::test]
    async fn test_rejected_and_unauthenticated() {
        let api = ApiClient::with_transport(
            FakeTransport::new().respond(Operation::GetPosts, json!({"success": false})),
        );
        let mut hook = PostsListHook::default();
        hook.activate(&Session::default(), &api).await;
        assert!(hook.state().is_idle());

        hook.activate(&session(), &api).await;
        let view = hook.view();
        assert!(view.error);
        assert!(view.posts.is_empty());
        assert_eq!(view.pagination.page, 1);
    }
}
