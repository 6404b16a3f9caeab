//! GraphQL documents and the response envelope.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ApiError;

/// Every operation the client issues. The response payload lives under
/// `data.<field>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Login,
    Signup,
    UserDetails,
    CheckCreateSession,
    DeleteSession,
    GetAndValidatePost,
    GetPosts,
    CreatePost,
    EditPost,
    DeletePost,
}

impl Operation {
    /// Name of the payload field inside `data`.
    pub fn field(&self) -> &'static str {
        match self {
            Operation::Login => "PostLoginResponse",
            Operation::Signup => "PostSignupResponse",
            Operation::UserDetails => "PostUserDetailsResponse",
            Operation::CheckCreateSession => "checkCreateSessionResponse",
            Operation::DeleteSession => "deleteSessionResponse",
            Operation::GetAndValidatePost => "GetAndValidatePostResponse",
            Operation::GetPosts => "GetPostsResponse",
            Operation::CreatePost => "PostCreatePostResponse",
            Operation::EditPost => "PostEditPostResponse",
            Operation::DeletePost => "PostDeletePostResponse",
        }
    }

    pub fn document(&self) -> &'static str {
        match self {
            Operation::Login => LOGIN,
            Operation::Signup => SIGNUP,
            Operation::UserDetails => USER_DETAILS,
            Operation::CheckCreateSession => CHECK_CREATE_SESSION,
            Operation::DeleteSession => DELETE_SESSION,
            Operation::GetAndValidatePost => GET_AND_VALIDATE_POST,
            Operation::GetPosts => GET_POSTS,
            Operation::CreatePost => CREATE_POST,
            Operation::EditPost => EDIT_POST,
            Operation::DeletePost => DELETE_POST,
        }
    }

    /// Whether the server expects a bearer token for this operation.
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Operation::Login | Operation::Signup)
    }
}

/// Selection set shared by every document returning a post
macro_rules! post_fields {
    () => {
        "_id title content imageUrl creator { _id name } createdAt updatedAt"
    };
}

#[cfg(test)]
const POST_FIELDS: &str = post_fields!();

const LOGIN: &str = r#"
mutation PostLogin($email: String!, $password: String!) {
  PostLoginResponse(userInput: { email: $email, password: $password }) {
    success token userId expiresIn
  }
}"#;

const SIGNUP: &str = r#"
mutation PostSignup($name: String!, $email: String!, $password: String!, $confirmPassword: String!) {
  PostSignupResponse(userInput: { name: $name, email: $email, password: $password, confirmPassword: $confirmPassword }) {
    success isNameValid isEmailValid isPasswordValid isConfirmPasswordValid userExists
  }
}"#;

const USER_DETAILS: &str = r#"
query PostUserDetails($userId: ID!) {
  PostUserDetailsResponse(userId: $userId) {
    success sessionCreated sessionExpires
    user { _id name email status posts }
  }
}"#;

const CHECK_CREATE_SESSION: &str = r#"
mutation CheckCreateSession($userId: ID!) {
  checkCreateSessionResponse(userId: $userId) { success }
}"#;

const DELETE_SESSION: &str = r#"
mutation DeleteSession($userId: ID!) {
  deleteSessionResponse(userId: $userId) { success }
}"#;

const GET_AND_VALIDATE_POST: &str = concat!(
    r#"
query GetAndValidatePost($userId: ID!, $postId: ID!) {
  GetAndValidatePostResponse(userId: $userId, postId: $postId) {
    success status
    post { "#,
    post_fields!(),
    r#" }
  }
}"#
);

const GET_POSTS: &str = concat!(
    r#"
query GetPosts($page: Int!, $perPage: Int!) {
  GetPostsResponse(page: $page, perPage: $perPage) {
    success totalPosts
    posts { "#,
    post_fields!(),
    r#" }
  }
}"#
);

const CREATE_POST: &str = concat!(
    r#"
mutation PostCreatePost($userId: ID!, $title: String!, $content: String!, $imageUrl: String) {
  PostCreatePostResponse(postInput: { userId: $userId, title: $title, content: $content, imageUrl: $imageUrl }) {
    success isTitleValid isContentValid isFileValid isFileTypeValid isUserValid
    post { "#,
    post_fields!(),
    r#" }
  }
}"#
);

const EDIT_POST: &str = concat!(
    r#"
mutation PostEditPost($userId: ID!, $postId: ID!, $title: String!, $content: String!, $imageUrl: String) {
  PostEditPostResponse(postInput: { userId: $userId, postId: $postId, title: $title, content: $content, imageUrl: $imageUrl }) {
    success isTitleValid isContentValid isFileValid isFileTypeValid isUserValid
    post { "#,
    post_fields!(),
    r#" }
  }
}"#
);

const DELETE_POST: &str = r#"
mutation PostDeletePost($userId: ID!, $postId: ID!) {
  PostDeletePostResponse(userId: $userId, postId: $postId) { success }
}"#;

/// Request body sent to the endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct GraphqlRequest {
    pub query: &'static str,
    pub variables: Value,
    #[serde(skip)]
    pub operation: Operation,
}

impl GraphqlRequest {
    pub fn new(operation: Operation, variables: Value) -> Self {
        Self {
            query: operation.document(),
            variables,
            operation,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorItem {
    message: String,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphqlErrorItem>,
}

/// Pull the operation payload out of a response body.
///
/// Returns `Ok(None)` when the body has no usable `data`, so the caller can
/// fall back to the HTTP status.
pub fn extract_payload<T: DeserializeOwned>(
    operation: Operation,
    body: &Value,
) -> Result<Option<T>, ApiError> {
    let envelope: Envelope = serde_json::from_value(body.clone())
        .map_err(|e| ApiError::InvalidResponse(format!("Malformed envelope: {}", e)))?;

    let payload = envelope
        .data
        .as_ref()
        .and_then(|data| data.get(operation.field()))
        .filter(|payload| !payload.is_null());

    match payload {
        Some(payload) => serde_json::from_value(payload.clone())
            .map(Some)
            .map_err(|e| {
                ApiError::InvalidResponse(format!("Failed to parse {}: {}", operation.field(), e))
            }),
        None if !envelope.errors.is_empty() => {
            let messages: Vec<String> = envelope.errors.into_iter().map(|e| e.message).collect();
            Err(ApiError::Graphql(messages.join("; ")))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Flag {
        success: bool,
    }

    #[test]
    fn test_post_documents_select_every_post_field() {
        for op in [
            Operation::GetAndValidatePost,
            Operation::GetPosts,
            Operation::CreatePost,
            Operation::EditPost,
        ] {
            assert!(op.document().contains(POST_FIELDS), "{:?}", op);
            assert!(op.document().contains(op.field()));
        }
    }

    #[test]
    fn test_every_document_names_its_field() {
        for op in [
            Operation::Login,
            Operation::Signup,
            Operation::UserDetails,
            Operation::CheckCreateSession,
            Operation::DeleteSession,
            Operation::DeletePost,
        ] {
            assert!(op.document().contains(op.field()), "{:?}", op);
        }
    }

    #[test]
    fn test_only_account_operations_skip_auth() {
        assert!(!Operation::Login.requires_auth());
        assert!(!Operation::Signup.requires_auth());
        assert!(Operation::UserDetails.requires_auth());
        assert!(Operation::DeletePost.requires_auth());
    }

    #[test]
    fn test_request_serializes_query_and_variables() {
        let request = GraphqlRequest::new(Operation::DeleteSession, json!({"userId": "u1"}));
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["variables"]["userId"], "u1");
        assert!(body["query"].as_str().unwrap().contains("deleteSessionResponse"));
        assert!(body.get("operation").is_none());
    }

    #[test]
    fn test_extract_payload() {
        let body = json!({"data": {"deleteSessionResponse": {"success": true}}});
        let flag: Option<Flag> = extract_payload(Operation::DeleteSession, &body).unwrap();
        assert!(flag.unwrap().success);
    }

    #[test]
    fn test_extract_payload_reports_graphql_errors() {
        let body = json!({"data": null, "errors": [{"message": "boom"}, {"message": "bang"}]});
        let err = extract_payload::<Flag>(Operation::DeleteSession, &body).unwrap_err();
        assert!(matches!(err, ApiError::Graphql(m) if m == "boom; bang"));
    }

    #[test]
    fn test_extract_payload_missing_data() {
        let body = json!({});
        let flag: Option<Flag> = extract_payload(Operation::DeleteSession, &body).unwrap();
        assert!(flag.is_none());
    }

    #[test]
    fn test_extract_payload_bad_shape() {
        let body = json!({"data": {"deleteSessionResponse": {"success": "yes"}}});
        let err = extract_payload::<Flag>(Operation::DeleteSession, &body).unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }
}
