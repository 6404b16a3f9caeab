use serde::{Deserialize, Serialize};

use crate::utils::format_date;

/// The author reference embedded in a post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostCreator {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// A blog post. Server owned; list, detail and edit views hold copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub creator: PostCreator,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<String>,
}

impl Post {
    pub fn created_display(&self) -> String {
        self.created_at.as_deref().map(format_date).unwrap_or_default()
    }

    /// True when the post was modified after creation.
    pub fn was_edited(&self) -> bool {
        match (&self.created_at, &self.updated_at) {
            (Some(created), Some(updated)) => created != updated,
            _ => false,
        }
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        !user_id.is_empty() && self.creator.id == user_id
    }
}

/// An image chosen from the bundled carousel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSelection {
    pub file_name: String,
    pub image_url: String,
}

/// What the form does with the post image.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageChoice {
    /// Leave the current image (edit only)
    #[default]
    Keep,
    Carousel(FileSelection),
}

impl ImageChoice {
    pub fn image_url(&self) -> Option<&str> {
        match self {
            ImageChoice::Keep => None,
            ImageChoice::Carousel(selection) => Some(&selection.image_url),
        }
    }
}

/// Fields of the create/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostForm {
    pub title: String,
    pub content: String,
    pub image: ImageChoice,
}

/// Per-field verdicts returned by post mutations. Flags the server omits
/// count as valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostValidation {
    #[serde(rename = "isTitleValid")]
    pub is_title_valid: bool,
    #[serde(rename = "isContentValid")]
    pub is_content_valid: bool,
    #[serde(rename = "isFileValid")]
    pub is_file_valid: bool,
    #[serde(rename = "isFileTypeValid")]
    pub is_file_type_valid: bool,
    #[serde(rename = "isUserValid")]
    pub is_user_valid: bool,
}

impl Default for PostValidation {
    fn default() -> Self {
        Self {
            is_title_valid: true,
            is_content_valid: true,
            is_file_valid: true,
            is_file_type_valid: true,
            is_user_valid: true,
        }
    }
}

impl PostValidation {
    pub fn all_valid(&self) -> bool {
        self.field_errors().is_empty()
    }

    /// Messages for every failing field, in form order.
    pub fn field_errors(&self) -> Vec<&'static str> {
        let mut errors = Vec::new();
        if !self.is_title_valid {
            errors.push("Title must be at least 5 characters");
        }
        if !self.is_content_valid {
            errors.push("Content must be at least 5 characters");
        }
        if !self.is_file_valid {
            errors.push("An image is required");
        }
        if !self.is_file_type_valid {
            errors.push("Image must be a png, jpg or jpeg");
        }
        if !self.is_user_valid {
            errors.push("You are not allowed to change this post");
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_post() {
        let json = r#"{
            "_id": "p1",
            "title": "Hello",
            "content": "First post",
            "imageUrl": "images/carousel/harbor.jpg",
            "creator": {"_id": "u1", "name": "Ada"},
            "createdAt": "2026-03-01T10:00:00.000Z",
            "updatedAt": "2026-03-02T10:00:00.000Z"
        }"#;
        let post: Post = serde_json::from_str(json).unwrap();
        assert_eq!(post.creator.name, "Ada");
        assert!(post.was_edited());
        assert!(post.is_owned_by("u1"));
        assert!(!post.is_owned_by(""));
        assert_eq!(post.created_display(), "Mar 01, 2026");
    }

    #[test]
    fn test_validation_defaults_missing_flags_to_valid() {
        let flags: PostValidation = serde_json::from_str(r#"{"isTitleValid": false}"#).unwrap();
        assert!(!flags.is_title_valid);
        assert!(flags.is_content_valid);
        assert!(!flags.all_valid());
        assert_eq!(flags.field_errors(), vec!["Title must be at least 5 characters"]);
    }

    #[test]
    fn test_image_choice_url() {
        assert_eq!(ImageChoice::Keep.image_url(), None);
        let choice = ImageChoice::Carousel(FileSelection {
            file_name: "a.jpg".to_string(),
            image_url: "images/carousel/a.jpg".to_string(),
        });
        assert_eq!(choice.image_url(), Some("images/carousel/a.jpg"));
    }
}
