use serde::{Deserialize, Serialize};

/// A registered author. Owned by the server; the client only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub status: Option<String>,
    /// Ids of the posts this user created
    #[serde(default)]
    pub posts: Vec<String>,
}

impl User {
    pub fn status_display(&self) -> &str {
        match self.status.as_deref() {
            Some(s) if !s.is_empty() => s,
            _ => "-",
        }
    }

    pub fn post_count(&self) -> usize {
        self.posts.len()
    }
}

/// The signed-in user's profile together with the server's view of the
/// current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDetails {
    pub user: User,
    pub session_created: Option<String>,
    pub session_expires: Option<String>,
}
