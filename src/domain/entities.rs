use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::{PostStatus, PostType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub post_type: PostType,
    pub status: PostStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    /// Parent post; `0` when the comment is detached.
    #[serde(default)]
    pub post_id: u64,
}

/// A navigation menu as resolved by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavMenu {
    pub id: u64,
    pub slug: String,
    #[serde(default)]
    pub name: String,
}

/// How a menu render call identifies its menu.
///
/// Hosts accept a numeric id, a slug or name, or an already-resolved menu.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MenuRef {
    #[default]
    Unset,
    Id(u64),
    Slug(String),
    Resolved(NavMenu),
}

impl MenuRef {
    /// Human-readable identity; empty when nothing identifies the menu.
    pub fn display_name(&self) -> String {
        match self {
            MenuRef::Unset | MenuRef::Id(0) => String::new(),
            MenuRef::Id(id) => id.to_string(),
            MenuRef::Slug(slug) => slug.clone(),
            MenuRef::Resolved(menu) => menu.slug.clone(),
        }
    }
}

/// Arguments of a navigation menu render call.
///
/// `echo` is deserialized but never serialized: it only decides whether the
/// caller prints the markup, not what the markup is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuArgs {
    pub menu: MenuRef,
    pub theme_location: String,
    pub container: String,
    pub container_class: String,
    pub menu_id: String,
    pub menu_class: String,
    pub depth: u32,
    pub items_wrap: String,
    #[serde(skip_serializing)]
    pub echo: bool,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for MenuArgs {
    fn default() -> Self {
        Self {
            menu: MenuRef::Unset,
            theme_location: String::new(),
            container: "div".to_string(),
            container_class: String::new(),
            menu_id: String::new(),
            menu_class: "menu".to_string(),
            depth: 0,
            items_wrap: "<ul id=\"%1$s\" class=\"%2$s\">%3$s</ul>".to_string(),
            echo: true,
            extra: BTreeMap::new(),
        }
    }
}

impl MenuArgs {
    pub fn for_menu(menu: MenuRef) -> Self {
        Self {
            menu,
            ..Self::default()
        }
    }

    pub fn for_location(theme_location: impl Into<String>) -> Self {
        Self {
            theme_location: theme_location.into(),
            ..Self::default()
        }
    }

    /// Menu identity used in provenance markers: the menu itself, or the
    /// theme location when no menu was named.
    pub fn fragment_name(&self) -> String {
        let name = self.menu.display_name();
        if name.is_empty() && !self.theme_location.is_empty() {
            return self.theme_location.clone();
        }
        name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub classes: Vec<String>,
}

/// A placed widget, identified by its instance id (e.g. `text-3`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetInstance {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl WidgetInstance {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Form field id for one of this widget's settings.
    pub fn field_id(&self, field: &str) -> String {
        format!("widget-{}-{}", self.id, field)
    }

    /// Form field name for one of this widget's settings.
    pub fn field_name(&self, field: &str) -> String {
        format!("widget-{}[{}]", self.id, field)
    }
}

/// Sidebar wrapping markup handed to a widget at render time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetArgs {
    pub before_widget: String,
    pub after_widget: String,
    pub before_title: String,
    pub after_title: String,
}

/// Persisted configuration of one widget instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WidgetSettings {
    #[serde(default)]
    pub exclude_from_widget_cache: bool,
    #[serde(flatten)]
    pub values: BTreeMap<String, Value>,
}
