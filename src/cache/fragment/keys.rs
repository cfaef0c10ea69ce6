use std::fmt;

use sha2::{Digest, Sha256};

use crate::domain::{MenuArgs, WidgetInstance};

/// Backend group a fragment family is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentGroup {
    NavMenu,
    Widget,
}

impl FragmentGroup {
    pub fn as_str(self) -> &'static str {
        match self {
            FragmentGroup::NavMenu => "nav_menu",
            FragmentGroup::Widget => "widget",
        }
    }
}

impl fmt::Display for FragmentGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend key of one cached fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FragmentKey {
    group: FragmentGroup,
    key: String,
}

impl FragmentKey {
    /// SHA-256 of the serialized argument set. `echo` never serializes, so
    /// it does not contribute to the key.
    pub fn for_menu(args: &MenuArgs) -> Result<Self, serde_json::Error> {
        let encoded = serde_json::to_vec(args)?;
        Ok(Self {
            group: FragmentGroup::NavMenu,
            key: hash_bytes(&encoded),
        })
    }

    pub fn for_widget(widget: &WidgetInstance) -> Self {
        Self {
            group: FragmentGroup::Widget,
            key: widget.id.clone(),
        }
    }

    pub fn group(&self) -> FragmentGroup {
        self.group
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for FragmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.key)
    }
}

fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
