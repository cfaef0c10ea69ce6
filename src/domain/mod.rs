//! Host content model seen by the cache layer.

pub mod entities;
pub mod types;

pub use entities::{
    Comment, MenuArgs, MenuItem, MenuRef, NavMenu, Post, WidgetArgs, WidgetInstance,
    WidgetSettings,
};
pub use types::{CommentStatus, PostStatus, PostType};
