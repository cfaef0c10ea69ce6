//! Content-change events.
//!
//! Hosts report lifecycle hooks as [`HostNotification`]s; the router turns
//! the subscribed ones into [`ChangeEvent`]s, which the invalidation policy
//! consumes exactly once.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{CommentStatus, Post};

/// Latch class. Each class may flush the backend at most once per request.
///
/// Comment changes are folded into post changes and share the `Post` latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventClass {
    Post,
    Option,
    Profile,
    Structural,
}

impl EventClass {
    pub const ALL: [EventClass; 4] = [
        EventClass::Post,
        EventClass::Option,
        EventClass::Profile,
        EventClass::Structural,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventClass::Post => "post",
            EventClass::Option => "option",
            EventClass::Profile => "profile",
            EventClass::Structural => "structural",
        }
    }
}

impl fmt::Display for EventClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A logical content change, created from a host notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// `post` is `None` when the host only reported an id.
    PostChanged { post_id: u64, post: Option<Post> },
    CommentChanged { comment_id: u64 },
    CommentStatusChanged { comment_id: u64, status: CommentStatus },
    OptionChanged { option_name: String },
    ProfileChanged { user_id: u64 },
    /// Theme switch, menu edit or widget update.
    StructuralChanged,
}

impl ChangeEvent {
    pub fn class(&self) -> EventClass {
        match self {
            ChangeEvent::PostChanged { .. }
            | ChangeEvent::CommentChanged { .. }
            | ChangeEvent::CommentStatusChanged { .. } => EventClass::Post,
            ChangeEvent::OptionChanged { .. } => EventClass::Option,
            ChangeEvent::ProfileChanged { .. } => EventClass::Profile,
            ChangeEvent::StructuralChanged => EventClass::Structural,
        }
    }
}

/// Host lifecycle hooks the cache layer can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostHook {
    PostSaved,
    PostTrashed,
    PostDeleted,
    PostPublished,
    CommentPosted,
    CommentEdited,
    CommentDeleted,
    CommentStatusChanged,
    TrackbackPosted,
    PingbackPosted,
    OptionUpdated,
    OptionAdded,
    OptionDeleted,
    MenuCreated,
    MenuUpdated,
    MenuDeleted,
    MenuItemUpdated,
    WidgetUpdated,
    ThemeSwitched,
    UserProfileUpdated,
}

impl HostHook {
    pub const ALL: [HostHook; 20] = [
        HostHook::PostSaved,
        HostHook::PostTrashed,
        HostHook::PostDeleted,
        HostHook::PostPublished,
        HostHook::CommentPosted,
        HostHook::CommentEdited,
        HostHook::CommentDeleted,
        HostHook::CommentStatusChanged,
        HostHook::TrackbackPosted,
        HostHook::PingbackPosted,
        HostHook::OptionUpdated,
        HostHook::OptionAdded,
        HostHook::OptionDeleted,
        HostHook::MenuCreated,
        HostHook::MenuUpdated,
        HostHook::MenuDeleted,
        HostHook::MenuItemUpdated,
        HostHook::WidgetUpdated,
        HostHook::ThemeSwitched,
        HostHook::UserProfileUpdated,
    ];

    /// Hook name as hosts spell it.
    pub fn as_str(self) -> &'static str {
        match self {
            HostHook::PostSaved => "post-saved",
            HostHook::PostTrashed => "post-trashed",
            HostHook::PostDeleted => "post-deleted",
            HostHook::PostPublished => "post-published",
            HostHook::CommentPosted => "comment-posted",
            HostHook::CommentEdited => "comment-edited",
            HostHook::CommentDeleted => "comment-deleted",
            HostHook::CommentStatusChanged => "comment-status-changed",
            HostHook::TrackbackPosted => "trackback-posted",
            HostHook::PingbackPosted => "pingback-posted",
            HostHook::OptionUpdated => "option-updated",
            HostHook::OptionAdded => "option-added",
            HostHook::OptionDeleted => "option-deleted",
            HostHook::MenuCreated => "menu-created",
            HostHook::MenuUpdated => "menu-updated",
            HostHook::MenuDeleted => "menu-deleted",
            HostHook::MenuItemUpdated => "menu-item-updated",
            HostHook::WidgetUpdated => "widget-updated",
            HostHook::ThemeSwitched => "theme-switched",
            HostHook::UserProfileUpdated => "user-profile-updated",
        }
    }

    /// Latch class of the events this hook produces.
    pub fn class(self) -> EventClass {
        match self {
            HostHook::PostSaved
            | HostHook::PostTrashed
            | HostHook::PostDeleted
            | HostHook::PostPublished
            | HostHook::CommentPosted
            | HostHook::CommentEdited
            | HostHook::CommentDeleted
            | HostHook::CommentStatusChanged
            | HostHook::TrackbackPosted
            | HostHook::PingbackPosted => EventClass::Post,
            HostHook::OptionUpdated | HostHook::OptionAdded | HostHook::OptionDeleted => {
                EventClass::Option
            }
            HostHook::UserProfileUpdated => EventClass::Profile,
            HostHook::MenuCreated
            | HostHook::MenuUpdated
            | HostHook::MenuDeleted
            | HostHook::MenuItemUpdated
            | HostHook::WidgetUpdated
            | HostHook::ThemeSwitched => EventClass::Structural,
        }
    }
}

impl fmt::Display for HostHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A hook invocation with its minimal payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "hook", rename_all = "kebab-case")]
pub enum HostNotification {
    PostSaved {
        post_id: u64,
        #[serde(default)]
        post: Option<Post>,
    },
    PostTrashed {
        post_id: u64,
    },
    PostDeleted {
        post_id: u64,
    },
    PostPublished {
        post_id: u64,
        #[serde(default)]
        post: Option<Post>,
    },
    CommentPosted {
        comment_id: u64,
    },
    CommentEdited {
        comment_id: u64,
    },
    CommentDeleted {
        comment_id: u64,
    },
    CommentStatusChanged {
        comment_id: u64,
        status: CommentStatus,
    },
    TrackbackPosted {
        comment_id: u64,
    },
    PingbackPosted {
        comment_id: u64,
    },
    OptionUpdated {
        option_name: String,
    },
    OptionAdded {
        option_name: String,
    },
    OptionDeleted {
        option_name: String,
    },
    MenuCreated {
        #[serde(default)]
        menu_id: u64,
    },
    MenuUpdated {
        #[serde(default)]
        menu_id: u64,
    },
    MenuDeleted {
        #[serde(default)]
        menu_id: u64,
    },
    MenuItemUpdated {
        #[serde(default)]
        menu_id: u64,
    },
    WidgetUpdated {
        #[serde(default)]
        widget_id: String,
    },
    ThemeSwitched {
        #[serde(default)]
        theme: String,
    },
    UserProfileUpdated {
        user_id: u64,
    },
}

impl HostNotification {
    pub fn hook(&self) -> HostHook {
        match self {
            HostNotification::PostSaved { .. } => HostHook::PostSaved,
            HostNotification::PostTrashed { .. } => HostHook::PostTrashed,
            HostNotification::PostDeleted { .. } => HostHook::PostDeleted,
            HostNotification::PostPublished { .. } => HostHook::PostPublished,
            HostNotification::CommentPosted { .. } => HostHook::CommentPosted,
            HostNotification::CommentEdited { .. } => HostHook::CommentEdited,
            HostNotification::CommentDeleted { .. } => HostHook::CommentDeleted,
            HostNotification::CommentStatusChanged { .. } => HostHook::CommentStatusChanged,
            HostNotification::TrackbackPosted { .. } => HostHook::TrackbackPosted,
            HostNotification::PingbackPosted { .. } => HostHook::PingbackPosted,
            HostNotification::OptionUpdated { .. } => HostHook::OptionUpdated,
            HostNotification::OptionAdded { .. } => HostHook::OptionAdded,
            HostNotification::OptionDeleted { .. } => HostHook::OptionDeleted,
            HostNotification::MenuCreated { .. } => HostHook::MenuCreated,
            HostNotification::MenuUpdated { .. } => HostHook::MenuUpdated,
            HostNotification::MenuDeleted { .. } => HostHook::MenuDeleted,
            HostNotification::MenuItemUpdated { .. } => HostHook::MenuItemUpdated,
            HostNotification::WidgetUpdated { .. } => HostHook::WidgetUpdated,
            HostNotification::ThemeSwitched { .. } => HostHook::ThemeSwitched,
            HostNotification::UserProfileUpdated { .. } => HostHook::UserProfileUpdated,
        }
    }

    pub fn into_event(self) -> ChangeEvent {
        match self {
            HostNotification::PostSaved { post_id, post }
            | HostNotification::PostPublished { post_id, post } => {
                ChangeEvent::PostChanged { post_id, post }
            }
            HostNotification::PostTrashed { post_id } | HostNotification::PostDeleted { post_id } => {
                ChangeEvent::PostChanged {
                    post_id,
                    post: None,
                }
            }
            HostNotification::CommentPosted { comment_id }
            | HostNotification::CommentEdited { comment_id }
            | HostNotification::CommentDeleted { comment_id }
            | HostNotification::TrackbackPosted { comment_id }
            | HostNotification::PingbackPosted { comment_id } => {
                ChangeEvent::CommentChanged { comment_id }
            }
            HostNotification::CommentStatusChanged { comment_id, status } => {
                ChangeEvent::CommentStatusChanged { comment_id, status }
            }
            HostNotification::OptionUpdated { option_name }
            | HostNotification::OptionAdded { option_name }
            | HostNotification::OptionDeleted { option_name } => {
                ChangeEvent::OptionChanged { option_name }
            }
            HostNotification::UserProfileUpdated { user_id } => {
                ChangeEvent::ProfileChanged { user_id }
            }
            HostNotification::MenuCreated { .. }
            | HostNotification::MenuUpdated { .. }
            | HostNotification::MenuDeleted { .. }
            | HostNotification::MenuItemUpdated { .. }
            | HostNotification::WidgetUpdated { .. }
            | HostNotification::ThemeSwitched { .. } => ChangeEvent::StructuralChanged,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::{PostStatus, PostType};

    #[test]
    fn comment_events_share_the_post_class() {
        assert_eq!(
            ChangeEvent::CommentChanged { comment_id: 1 }.class(),
            EventClass::Post
        );
        assert_eq!(
            ChangeEvent::CommentStatusChanged {
                comment_id: 1,
                status: CommentStatus::Approve,
            }
            .class(),
            EventClass::Post
        );
    }

    #[test]
    fn hook_class_matches_event_class() {
        let samples = [
            HostNotification::PostTrashed { post_id: 4 },
            HostNotification::PingbackPosted { comment_id: 2 },
            HostNotification::OptionDeleted {
                option_name: "blogname".to_string(),
            },
            HostNotification::MenuItemUpdated { menu_id: 9 },
            HostNotification::ThemeSwitched {
                theme: "twentytwenty".to_string(),
            },
            HostNotification::UserProfileUpdated { user_id: 3 },
        ];

        for notification in samples {
            let hook = notification.hook();
            assert_eq!(hook.class(), notification.into_event().class(), "{hook:?}");
        }
    }

    #[test]
    fn notifications_parse_from_tagged_json() {
        let saved: HostNotification = serde_json::from_value(json!({
            "hook": "post-saved",
            "post_id": 5,
            "post": { "id": 5, "post_type": "post", "status": "draft" }
        }))
        .expect("post-saved");

        assert_eq!(
            saved.into_event(),
            ChangeEvent::PostChanged {
                post_id: 5,
                post: Some(Post {
                    id: 5,
                    post_type: PostType::Post,
                    status: PostStatus::Draft,
                }),
            }
        );

        let status: HostNotification = serde_json::from_value(json!({
            "hook": "comment-status-changed",
            "comment_id": 8,
            "status": "1"
        }))
        .expect("comment-status-changed");
        assert_eq!(status.hook(), HostHook::CommentStatusChanged);
        assert_eq!(
            status.into_event(),
            ChangeEvent::CommentStatusChanged {
                comment_id: 8,
                status: CommentStatus::Approve,
            }
        );

        assert_eq!(HostHook::CommentStatusChanged.as_str(), "comment-status-changed");

        let theme: HostNotification =
            serde_json::from_value(json!({ "hook": "theme-switched" })).expect("theme-switched");
        assert_eq!(theme.into_event(), ChangeEvent::StructuralChanged);
    }
}
