//! API client for the inkpost GraphQL endpoint.
//!
//! This module provides the `ApiClient` struct with one method per
//! operation. Methods return the server's verdict (`success` and validation
//! flags) as data; only transport, status and envelope problems are
//! `ApiError`s.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::graphql::extract_payload;
use super::transport::{HttpTransport, Transport};
use super::{ApiError, GraphqlRequest, Operation};
use crate::config::Config;
use crate::models::{
    LoginResult, Pagination, Post, PostForm, PostValidation, PostsPage, SignupForm, SignupResult,
    User, UserDetails,
};

/// Outcome of `GetAndValidatePostResponse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostLookup {
    pub success: bool,
    /// Server status code for the lookup (e.g. 200, 403, 404)
    pub status: u16,
    pub post: Option<Post>,
}

/// Outcome of a create or edit mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostMutation {
    pub success: bool,
    pub validation: PostValidation,
    pub post: Option<Post>,
}

/// GraphQL client, generic over the transport so tests can script replies.
#[derive(Clone)]
pub struct ApiClient<T: Transport = HttpTransport> {
    transport: T,
}

impl ApiClient<HttpTransport> {
    /// Create a client posting to `endpoint`
    pub fn new(endpoint: &str) -> Result<Self, ApiError> {
        Ok(Self {
            transport: HttpTransport::new(endpoint)?,
        })
    }

    /// Create a client for the environment selected in `config`
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        debug!(
            environment = %config.environment,
            endpoint = config.base_url(),
            "API client configured"
        );
        Self::new(config.base_url())
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send one operation and decode its payload.
    ///
    /// The payload decides success whenever the body carries one; the HTTP
    /// status is only consulted for bodies without `data`.
    async fn execute<P: DeserializeOwned>(
        &self,
        operation: Operation,
        variables: Value,
        token: Option<&str>,
    ) -> Result<P, ApiError> {
        if operation.requires_auth() && token.is_none() {
            warn!(operation = operation.field(), "Sending authenticated operation without a token");
        }

        let request = GraphqlRequest::new(operation, variables);
        let reply = self.transport.send(&request, token).await?;

        let body: Option<Value> = serde_json::from_str(&reply.body).ok();
        let payload = match body {
            Some(ref body) if body.is_object() => extract_payload(operation, body)?,
            _ => None,
        };

        match payload {
            Some(payload) => Ok(payload),
            None if reply.is_success() => Err(ApiError::MissingPayload(operation.field())),
            None => Err(ApiError::from_status(reply.status, &reply.body)),
        }
    }

    // ===== Account =====

    /// Exchange credentials for a session. `Ok(None)` means the server
    /// rejected them.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<LoginResult>, ApiError> {
        let variables = json!({ "email": email, "password": password });
        let reply: LoginPayload = self.execute(Operation::Login, variables, None).await?;

        if !reply.success {
            return Ok(None);
        }
        match (reply.token, reply.user_id, reply.expires_in) {
            (Some(token), Some(user_id), Some(expires_in)) => Ok(Some(LoginResult {
                token,
                user_id,
                expires_in,
            })),
            _ => Err(ApiError::InvalidResponse(
                "Login succeeded without a complete session".to_string(),
            )),
        }
    }

    pub async fn signup(&self, form: &SignupForm) -> Result<SignupResult, ApiError> {
        let variables = json!({
            "name": form.name,
            "email": form.email,
            "password": form.password,
            "confirmPassword": form.confirm_password,
        });
        self.execute(Operation::Signup, variables, None).await
    }

    /// Profile and server-side session metadata. `Ok(None)` on `success: false`.
    pub async fn user_details(
        &self,
        token: &str,
        user_id: &str,
    ) -> Result<Option<UserDetails>, ApiError> {
        let variables = json!({ "userId": user_id });
        let reply: UserDetailsPayload = self
            .execute(Operation::UserDetails, variables, Some(token))
            .await?;

        if !reply.success {
            return Ok(None);
        }
        let user = reply
            .user
            .ok_or(ApiError::MissingPayload("user"))?;
        Ok(Some(UserDetails {
            user,
            session_created: reply.session_created,
            session_expires: reply.session_expires,
        }))
    }

    /// Ask the server to confirm (or create) its record of this session.
    pub async fn check_create_session(&self, token: &str, user_id: &str) -> Result<bool, ApiError> {
        let variables = json!({ "userId": user_id });
        let reply: SuccessPayload = self
            .execute(Operation::CheckCreateSession, variables, Some(token))
            .await?;
        Ok(reply.success)
    }

    /// Server-side logout.
    pub async fn delete_session(&self, token: &str, user_id: &str) -> Result<bool, ApiError> {
        let variables = json!({ "userId": user_id });
        let reply: SuccessPayload = self
            .execute(Operation::DeleteSession, variables, Some(token))
            .await?;
        Ok(reply.success)
    }

    // ===== Posts =====

    pub async fn get_and_validate_post(
        &self,
        token: &str,
        user_id: &str,
        post_id: &str,
    ) -> Result<PostLookup, ApiError> {
        let variables = json!({ "userId": user_id, "postId": post_id });
        let reply: PostLookupPayload = self
            .execute(Operation::GetAndValidatePost, variables, Some(token))
            .await?;

        let status = reply
            .status
            .unwrap_or(if reply.success { 200 } else { 500 });
        Ok(PostLookup {
            success: reply.success,
            status,
            post: reply.post,
        })
    }

    /// One page of posts. `Ok(None)` on `success: false`.
    pub async fn get_posts(
        &self,
        token: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Option<PostsPage>, ApiError> {
        let pagination = Pagination::new(page, per_page, 0);
        let variables = json!({ "page": pagination.page, "perPage": pagination.per_page });
        let reply: PostsPayload = self
            .execute(Operation::GetPosts, variables, Some(token))
            .await?;

        if !reply.success {
            return Ok(None);
        }
        Ok(Some(PostsPage {
            pagination: Pagination::new(pagination.page, pagination.per_page, reply.total_posts),
            posts: reply.posts,
        }))
    }

    pub async fn create_post(
        &self,
        token: &str,
        user_id: &str,
        form: &PostForm,
    ) -> Result<PostMutation, ApiError> {
        let variables = json!({
            "userId": user_id,
            "title": form.title,
            "content": form.content,
            "imageUrl": form.image.image_url(),
        });
        let reply: PostMutationPayload = self
            .execute(Operation::CreatePost, variables, Some(token))
            .await?;
        Ok(reply.into())
    }

    pub async fn edit_post(
        &self,
        token: &str,
        user_id: &str,
        post_id: &str,
        form: &PostForm,
    ) -> Result<PostMutation, ApiError> {
        let variables = json!({
            "userId": user_id,
            "postId": post_id,
            "title": form.title,
            "content": form.content,
            "imageUrl": form.image.image_url(),
        });
        let reply: PostMutationPayload = self
            .execute(Operation::EditPost, variables, Some(token))
            .await?;
        Ok(reply.into())
    }

    pub async fn delete_post(
        &self,
        token: &str,
        user_id: &str,
        post_id: &str,
    ) -> Result<bool, ApiError> {
        let variables = json!({ "userId": user_id, "postId": post_id });
        let reply: SuccessPayload = self
            .execute(Operation::DeletePost, variables, Some(token))
            .await?;
        Ok(reply.success)
    }
}

// Internal API response types for parsing

#[derive(Debug, Deserialize)]
struct SuccessPayload {
    #[serde(default)]
    success: bool,
}

#[derive(Debug, Deserialize)]
struct LoginPayload {
    #[serde(default)]
    success: bool,
    token: Option<String>,
    #[serde(rename = "userId")]
    user_id: Option<String>,
    #[serde(rename = "expiresIn")]
    expires_in: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserDetailsPayload {
    #[serde(default)]
    success: bool,
    user: Option<User>,
    #[serde(rename = "sessionCreated")]
    session_created: Option<String>,
    #[serde(rename = "sessionExpires")]
    session_expires: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PostLookupPayload {
    #[serde(default)]
    success: bool,
    status: Option<u16>,
    post: Option<Post>,
}

#[derive(Debug, Deserialize)]
struct PostsPayload {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    posts: Vec<Post>,
    #[serde(rename = "totalPosts", default)]
    total_posts: u32,
}

#[derive(Debug, Deserialize)]
struct PostMutationPayload {
    #[serde(default)]
    success: bool,
    #[serde(flatten)]
    validation: PostValidation,
    post: Option<Post>,
}

impl From<PostMutationPayload> for PostMutation {
    fn from(payload: PostMutationPayload) -> Self {
        Self {
            success: payload.success,
            validation: payload.validation,
            post: payload.post,
        }
    }
}
