use tracing::{instrument, warn};

use crate::domain::{MenuArgs, MenuItem};

use super::{FragmentGroup, FragmentKey, FragmentRecord, FragmentStore};

const CURRENT_CLASS_PREFIX: &str = "current";

/// Host-side menu rendering.
pub trait MenuRenderer {
    type Error;

    /// Items of the menu `args` resolves to; empty when it resolves to nothing.
    fn menu_items(&self, args: &MenuArgs) -> Vec<MenuItem>;

    fn render(&self, args: &MenuArgs, items: &[MenuItem]) -> Result<String, Self::Error>;
}

/// Remove every `current*` class (case-insensitive) from the items.
///
/// Menus are cached once for all pages, so per-page highlighting must not
/// be baked into the stored markup.
pub fn strip_current_classes(items: &mut [MenuItem]) {
    for item in items {
        item.classes.retain(|class| !is_current_class(class));
    }
}

fn is_current_class(class: &str) -> bool {
    class
        .get(..CURRENT_CLASS_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(CURRENT_CLASS_PREFIX))
}

/// Navigation menu fragment cache (group `nav_menu`).
#[derive(Clone)]
pub struct NavMenuCache {
    store: FragmentStore,
    enabled: bool,
}

impl NavMenuCache {
    pub fn new(store: FragmentStore, enabled: bool) -> Self {
        Self { store, enabled }
    }

    /// Markup for the menu described by `args`.
    ///
    /// Hits return the stored markup verbatim. Misses render through the
    /// host, append provenance, and store. Render errors are returned
    /// unchanged and nothing is stored.
    #[instrument(skip_all, fields(menu = %args.fragment_name()))]
    pub async fn render<R>(&self, args: &MenuArgs, renderer: &R) -> Result<String, R::Error>
    where
        R: MenuRenderer + ?Sized,
    {
        if !self.enabled {
            let items = renderer.menu_items(args);
            return renderer.render(args, &items);
        }

        let key = match FragmentKey::for_menu(args) {
            Ok(key) => key,
            Err(err) => {
                warn!(error = %err, "Menu arguments not encodable; rendering live");
                let items = renderer.menu_items(args);
                return renderer.render(args, &items);
            }
        };
        if let Some(markup) = self.store.fetch(&key).await {
            return Ok(markup);
        }

        let mut items = renderer.menu_items(args);
        strip_current_classes(&mut items);
        let output = renderer.render(args, &items)?;

        let provenance = self
            .store
            .provenance(args.fragment_name(), FragmentGroup::NavMenu);
        let markup = FragmentRecord::new(output, &provenance).markup();
        self.store.store(&key, &markup).await;
        Ok(markup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(classes: &[&str]) -> MenuItem {
        MenuItem {
            id: 1,
            title: "Home".to_string(),
            url: "/".to_string(),
            classes: classes.iter().map(|class| class.to_string()).collect(),
        }
    }

    #[test]
    fn current_classes_are_stripped() {
        let mut items = vec![
            item(&["menu-item", "current-menu-item", "Current_page_parent"]),
            item(&["currently", "menu-item-home", "not-current"]),
            item(&["cur", ""]),
        ];

        strip_current_classes(&mut items);

        assert_eq!(items[0].classes, vec!["menu-item"]);
        assert_eq!(items[1].classes, vec!["menu-item-home", "not-current"]);
        assert_eq!(items[2].classes, vec!["cur", ""]);
    }

    #[test]
    fn multibyte_classes_are_kept() {
        let mut items = vec![item(&["ñavigation", "日本語クラス"])];
        strip_current_classes(&mut items);
        assert_eq!(items[0].classes.len(), 2);
    }
}
