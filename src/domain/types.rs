//! Content enumerations as reported by the host runtime.
//!
//! Hosts pass these around as free-form strings; anything not known here is
//! kept verbatim in an `Other` variant so round-tripping never loses data.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PostType {
    Post,
    Page,
    Revision,
    Attachment,
    NavMenuItem,
    Other(String),
}

impl PostType {
    pub fn as_str(&self) -> &str {
        match self {
            PostType::Post => "post",
            PostType::Page => "page",
            PostType::Revision => "revision",
            PostType::Attachment => "attachment",
            PostType::NavMenuItem => "nav_menu_item",
            PostType::Other(value) => value,
        }
    }
}

impl From<&str> for PostType {
    fn from(value: &str) -> Self {
        match value {
            "post" => PostType::Post,
            "page" => PostType::Page,
            "revision" => PostType::Revision,
            "attachment" => PostType::Attachment,
            "nav_menu_item" => PostType::NavMenuItem,
            other => PostType::Other(other.to_string()),
        }
    }
}

impl From<String> for PostType {
    fn from(value: String) -> Self {
        PostType::from(value.as_str())
    }
}

impl From<PostType> for String {
    fn from(value: PostType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PostStatus {
    Publish,
    Future,
    Draft,
    Pending,
    Private,
    Trash,
    AutoDraft,
    Inherit,
    Other(String),
}

impl PostStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PostStatus::Publish => "publish",
            PostStatus::Future => "future",
            PostStatus::Draft => "draft",
            PostStatus::Pending => "pending",
            PostStatus::Private => "private",
            PostStatus::Trash => "trash",
            PostStatus::AutoDraft => "auto-draft",
            PostStatus::Inherit => "inherit",
            PostStatus::Other(value) => value,
        }
    }
}

impl From<&str> for PostStatus {
    fn from(value: &str) -> Self {
        match value {
            "publish" => PostStatus::Publish,
            "future" => PostStatus::Future,
            "draft" => PostStatus::Draft,
            "pending" => PostStatus::Pending,
            "private" => PostStatus::Private,
            "trash" => PostStatus::Trash,
            "auto-draft" => PostStatus::AutoDraft,
            "inherit" => PostStatus::Inherit,
            other => PostStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for PostStatus {
    fn from(value: String) -> Self {
        PostStatus::from(value.as_str())
    }
}

impl From<PostStatus> for String {
    fn from(value: PostStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Moderation status carried by a comment status transition.
///
/// Older hosts report moderation as `"1"` (approved) and `"0"` (held).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CommentStatus {
    Approve,
    Hold,
    Spam,
    Trash,
    Other(String),
}

impl CommentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            CommentStatus::Approve => "approve",
            CommentStatus::Hold => "hold",
            CommentStatus::Spam => "spam",
            CommentStatus::Trash => "trash",
            CommentStatus::Other(value) => value,
        }
    }

    pub fn is_approval(&self) -> bool {
        matches!(self, CommentStatus::Approve)
    }
}

impl From<&str> for CommentStatus {
    fn from(value: &str) -> Self {
        match value {
            "approve" | "1" => CommentStatus::Approve,
            "hold" | "0" => CommentStatus::Hold,
            "spam" => CommentStatus::Spam,
            "trash" => CommentStatus::Trash,
            other => CommentStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for CommentStatus {
    fn from(value: String) -> Self {
        CommentStatus::from(value.as_str())
    }
}

impl From<CommentStatus> for String {
    fn from(value: CommentStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for CommentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
