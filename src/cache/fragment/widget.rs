use std::collections::BTreeMap;

use metrics::counter;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::domain::{WidgetArgs, WidgetInstance, WidgetSettings};

use super::provenance::escape_html;
use super::{FragmentGroup, FragmentKey, FragmentRecord, FragmentStore, METRIC_FRAGMENT_BYPASS_TOTAL};

/// Settings field holding the per-widget opt-out.
pub const EXCLUDE_FLAG: &str = "exclude_from_widget_cache";

/// Host-side widget rendering. Output is appended to `out`.
pub trait WidgetRenderer {
    type Error;

    fn render(
        &self,
        widget: &WidgetInstance,
        args: &WidgetArgs,
        settings: &WidgetSettings,
        out: &mut String,
    ) -> Result<(), Self::Error>;
}

/// Widget fragment cache (group `widget`), keyed by instance id.
#[derive(Clone)]
pub struct WidgetCache {
    store: FragmentStore,
    enabled: bool,
}

impl WidgetCache {
    pub fn new(store: FragmentStore, enabled: bool) -> Self {
        Self { store, enabled }
    }

    /// Emit the widget into `out` from cache, rendering and storing it on a
    /// miss.
    ///
    /// Returns `Ok(true)` when the output was emitted here, `Ok(false)` when
    /// the widget is excluded (or caching is off) and the host must render
    /// it itself. On a render error `out` is left untouched.
    #[instrument(skip_all, fields(widget = %widget.id))]
    pub async fn display<R>(
        &self,
        widget: &WidgetInstance,
        settings: &WidgetSettings,
        args: &WidgetArgs,
        renderer: &R,
        out: &mut String,
    ) -> Result<bool, R::Error>
    where
        R: WidgetRenderer + ?Sized,
    {
        if !self.enabled {
            return Ok(false);
        }
        if settings.exclude_from_widget_cache {
            counter!(METRIC_FRAGMENT_BYPASS_TOTAL, "group" => FragmentGroup::Widget.as_str())
                .increment(1);
            debug!(outcome = "bypass", "Widget excluded from cache");
            return Ok(false);
        }

        let key = FragmentKey::for_widget(widget);
        if let Some(markup) = self.store.fetch(&key).await {
            out.push_str(&markup);
            return Ok(true);
        }

        let mut buffer = String::new();
        renderer.render(widget, args, settings, &mut buffer)?;

        let name = if widget.name.is_empty() {
            widget.id.as_str()
        } else {
            widget.name.as_str()
        };
        let provenance = self.store.provenance(name, FragmentGroup::Widget);
        let markup = FragmentRecord::new(buffer, &provenance).markup();
        self.store.store(&key, &markup).await;
        out.push_str(&markup);
        Ok(true)
    }
}

/// Opt-out checkbox appended to the widget's admin form.
pub fn exclusion_checkbox(widget: &WidgetInstance, settings: &WidgetSettings) -> String {
    let field_id = escape_html(&widget.field_id(EXCLUDE_FLAG));
    let field_name = escape_html(&widget.field_name(EXCLUDE_FLAG));
    let checked = if settings.exclude_from_widget_cache {
        " checked='checked'"
    } else {
        ""
    };

    format!(
        "<p>\n\
         \t<input class=\"checkbox\" type=\"checkbox\"{checked} id=\"{field_id}\" name=\"{field_name}\" value=\"1\" />\n\
         \t<label for=\"{field_id}\"> Exclude from widget cache</label>\n\
         </p>\n"
    )
}

/// Persist the opt-out from a submitted admin form onto `settings`.
///
/// The flag is set exactly when the submitted field is present and truthy.
pub fn apply_exclusion_flag(
    mut settings: WidgetSettings,
    submitted: &BTreeMap<String, Value>,
) -> WidgetSettings {
    settings.exclude_from_widget_cache = submitted.get(EXCLUDE_FLAG).is_some_and(is_truthy);
    settings.values.remove(EXCLUDE_FLAG);
    settings
}

/// Form-value truthiness: empty strings, `"0"`, zero, `false`, `null` and
/// empty collections are false.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !(text.is_empty() || text == "0"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}
