use tracing::{debug, info, warn};

use super::{FetchFailure, FetchState, LoadingGuard};
use crate::api::{ApiClient, PostMutation, Transport};
use crate::auth::Session;
use crate::models::{Post, PostForm, PostValidation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostFormMode {
    Create,
    Edit { post_id: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFormView {
    pub is_submitting: bool,
    pub error: bool,
    pub validation: PostValidation,
    pub post: Option<Post>,
}

/// Submits the create or edit form and keeps the server's per-field
/// verdicts so the view can show them in place.
#[derive(Debug)]
pub struct PostFormHook {
    mode: PostFormMode,
    state: FetchState<Post>,
    validation: PostValidation,
}

impl PostFormHook {
    pub fn create() -> Self {
        Self::new(PostFormMode::Create)
    }

    pub fn edit(post_id: impl Into<String>) -> Self {
        Self::new(PostFormMode::Edit {
            post_id: post_id.into(),
        })
    }

    fn new(mode: PostFormMode) -> Self {
        Self {
            mode,
            state: FetchState::Idle,
            validation: PostValidation::default(),
        }
    }

    pub fn mode(&self) -> &PostFormMode {
        &self.mode
    }

    pub fn state(&self) -> &FetchState<Post> {
        &self.state
    }

    pub fn validation(&self) -> &PostValidation {
        &self.validation
    }

    pub fn view(&self) -> PostFormView {
        PostFormView {
            is_submitting: self.state.is_loading(),
            error: self.state.is_failed(),
            validation: self.validation,
            post: self.state.value().cloned(),
        }
    }

    /// Send the form. Every call is one request; without an authenticated
    /// session nothing is sent and the hook stays as it was.
    pub async fn submit<T: Transport>(
        &mut self,
        session: &Session,
        api: &ApiClient<T>,
        form: &PostForm,
    ) -> &FetchState<Post> {
        let (Some(token), Some(user_id)) = (session.bearer(), session.user_id()) else {
            debug!("Not authenticated, post form not submitted");
            return &self.state;
        };

        let guard = LoadingGuard::begin(&mut self.state);
        let result = match &self.mode {
            PostFormMode::Create => api.create_post(token, user_id, form).await,
            PostFormMode::Edit { post_id } => api.edit_post(token, user_id, post_id, form).await,
        };

        match result {
            Ok(PostMutation {
                success,
                validation,
                post,
            }) => {
                self.validation = validation;
                guard.finish(match (success, post) {
                    (true, Some(post)) => {
                        info!(post_id = %post.id, "Post saved");
                        FetchState::Success(post)
                    }
                    _ => {
                        warn!(errors = ?validation.field_errors(), "Post rejected");
                        FetchState::Failed(FetchFailure::Rejected { status: None })
                    }
                });
            }
            Err(e) => {
                self.validation = PostValidation::default();
                guard.finish(FetchState::Failed(FetchFailure::from_api_error("post_form", &e)));
            }
        }
        &self.state
    }
}

/// Delete a post. `Err` carries the failure a view would show.
pub async fn delete_post<T: Transport>(
    session: &Session,
    api: &ApiClient<T>,
    post_id: &str,
) -> Result<(), FetchFailure> {
    let (Some(token), Some(user_id)) = (session.bearer(), session.user_id()) else {
        return Err(FetchFailure::Rejected { status: Some(401) });
    };

    match api.delete_post(token, user_id, post_id).await {
        Ok(true) => {
            info!(post_id, "Post deleted");
            Ok(())
        }
        Ok(false) => {
            warn!(post_id, "Post deletion rejected");
            Err(FetchFailure::Rejected { status: None })
        }
        Err(e) => Err(FetchFailure::from_api_error("delete_post", &e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::fake::FakeTransport;
    use crate::api::Operation;
    use crate::carousel::Carousel;
    use crate::models::ImageChoice;
    use serde_json::json;

    fn session() -> Session {
        Session {
            token: "tok".to_string(),
            user_id: "u1".to_string(),
            expires_in: "2099-01-01T00:00:00Z".to_string(),
            user_authenticated: true,
        }
    }

    fn form() -> PostForm {
        PostForm {
            title: "A fine title".to_string(),
            content: "Plenty of content".to_string(),
            image: ImageChoice::Carousel(Carousel::find("harbor-morning.jpg").unwrap()),
        }
    }

    fn saved(id: &str) -> serde_json::Value {
        json!({
            "success": true,
            "post": {"_id": id, "title": "A fine title", "content": "Plenty of content",
                     "imageUrl": "images/carousel/harbor-morning.jpg",
                     "creator": {"_id": "u1", "name": "Ada"}}
        })
    }

    #[tokio::test]
    async fn test_create_success() {
        let api = ApiClient::with_transport(
            FakeTransport::new().respond(Operation::CreatePost, saved("p9")),
        );
        let mut hook = PostFormHook::create();

        let state = hook.submit(&session(), &api, &form()).await;
        assert_eq!(state.value().unwrap().id, "p9");

        let view = hook.view();
        assert!(!view.error);
        assert!(!view.is_submitting);
        assert!(view.validation.all_valid());
        assert_eq!(api.transport().sent_operations(), vec![Operation::CreatePost]);
    }

    #[tokio::test]
    async fn test_edit_reports_field_errors_then_resubmits() {
        let api = ApiClient::with_transport(
            FakeTransport::new()
                .respond(
                    Operation::EditPost,
                    json!({"success": false, "isTitleValid": false, "isContentValid": false}),
                )
                .respond(Operation::EditPost, saved("p1")),
        );
        let mut hook = PostFormHook::edit("p1");

        hook.submit(&session(), &api, &form()).await;
        let view = hook.view();
        assert!(view.error);
        assert!(!view.validation.is_title_valid);
        assert!(!view.validation.is_content_valid);
        assert!(view.validation.is_file_valid);

        hook.submit(&session(), &api, &form()).await;
        let view = hook.view();
        assert!(!view.error);
        assert!(view.validation.all_valid());
        assert_eq!(view.post.unwrap().id, "p1");

        let sent = api.transport().sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].variables["postId"], "p1");
    }

    #[tokio::test]
    async fn test_unauthenticated_submit_sends_nothing() {
        let api = ApiClient::with_transport(FakeTransport::new());
        let mut hook = PostFormHook::create();
        let state = hook.submit(&Session::default(), &api, &form()).await;

        assert!(state.is_idle());
        assert!(api.transport().sent().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_resets_validation() {
        let api = ApiClient::with_transport(FakeTransport::new().fail());
        let mut hook = PostFormHook::create();
        hook.submit(&session(), &api, &form()).await;

        let view = hook.view();
        assert!(view.error);
        assert!(view.validation.all_valid());
        assert!(matches!(hook.state(), FetchState::Failed(FetchFailure::Transport(_))));
    }

    #[tokio::test]
    async fn test_delete_post() {
        let api = ApiClient::with_transport(
            FakeTransport::new()
                .respond(Operation::DeletePost, json!({"success": true}))
                .respond(Operation::DeletePost, json!({"success": false})),
        );
        assert_eq!(delete_post(&session(), &api, "p1").await, Ok(()));
        assert_eq!(
            delete_post(&session(), &api, "p1").await,
            Err(FetchFailure::Rejected { status: None })
        );
        assert_eq!(
            delete_post(&Session::default(), &api, "p1").await,
            Err(FetchFailure::Rejected { status: Some(401) })
        );
        assert_eq!(api.transport().sent().len(), 2);
    }
}
