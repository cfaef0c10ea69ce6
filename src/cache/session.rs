//! Request-scoped cache sessions.
//!
//! [`ObjectCache`] is built once per process around the selected backend.
//! Every request then calls [`ObjectCache::begin_request`], which decides the
//! mode, builds the hook table for that mode and starts with fresh latches.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{Instrument, debug, info, info_span, instrument};
use uuid::Uuid;

use crate::backend::CacheBackend;
use crate::domain::{MenuArgs, WidgetArgs, WidgetInstance, WidgetSettings};

use super::config::CacheConfig;
use super::content::ContentSource;
use super::events::{EventClass, HostNotification};
use super::fragment::{
    Clock, FragmentStore, MenuRenderer, NavMenuCache, WidgetCache, WidgetRenderer,
    apply_exclusion_flag, exclusion_checkbox, system_clock,
};
use super::guard::FlushGuard;
use super::mode::{HostContext, ModeSelector, RequestMode};
use super::policy::{FlushOutcome, FlushablePostFilter, InvalidationPolicy};
use super::router::EventRouter;

/// Process-wide entry point of the cache layer.
#[derive(Clone)]
pub struct ObjectCache {
    config: CacheConfig,
    backend: Arc<dyn CacheBackend>,
    content: Arc<dyn ContentSource>,
    filter: Option<Arc<dyn FlushablePostFilter>>,
    clock: Clock,
}

impl ObjectCache {
    pub fn new(
        config: CacheConfig,
        backend: Arc<dyn CacheBackend>,
        content: Arc<dyn ContentSource>,
    ) -> Self {
        Self {
            config,
            backend,
            content,
            filter: None,
            clock: system_clock(),
        }
    }

    pub fn with_flushable_filter(mut self, filter: Arc<dyn FlushablePostFilter>) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn backend(&self) -> &Arc<dyn CacheBackend> {
        &self.backend
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Start a request. The mode is decided here and never changes.
    pub fn begin_request(&self, host: &HostContext) -> RequestSession {
        let request_id = Uuid::new_v4();
        let mode = ModeSelector::new(self.config.admin_override).select(host);
        let router = EventRouter::for_mode(mode);

        let policy = InvalidationPolicy::new(self.backend.clone(), self.content.clone())
            .with_filter(self.filter.clone());
        let store = FragmentStore::new(self.backend.clone(), self.config.fragment_ttl)
            .with_clock(self.clock.clone());

        debug!(%request_id, %mode, hooks = router.hooks().count(), "Request started");

        RequestSession {
            request_id,
            mode,
            router,
            guard: FlushGuard::new(),
            policy,
            nav_menus: NavMenuCache::new(store.clone(), self.config.nav_menu_enabled),
            widgets: WidgetCache::new(store, self.config.widgets_enabled),
        }
    }
}

/// What a finished request did to the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSummary {
    pub request_id: Uuid,
    pub mode: RequestMode,
    /// Classes granted a flush, in class order.
    pub flushed: Vec<EventClass>,
}

/// One request's view of the cache layer.
///
/// Owns the request's latches; dropping the session discards them.
pub struct RequestSession {
    request_id: Uuid,
    mode: RequestMode,
    router: EventRouter,
    guard: FlushGuard,
    policy: InvalidationPolicy,
    nav_menus: NavMenuCache,
    widgets: WidgetCache,
}

impl RequestSession {
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn mode(&self) -> RequestMode {
        self.mode
    }

    /// Handle one host notification. Never fails: backend errors are
    /// reported through the outcome and the logs.
    #[instrument(skip_all, fields(request_id = %self.request_id, hook = ?notification.hook()))]
    pub async fn notify(&mut self, notification: HostNotification) -> FlushOutcome {
        let Some(event) = self.router.route(notification) else {
            return FlushOutcome::Unsubscribed;
        };
        let outcome = self.policy.apply(&mut self.guard, event).await;
        debug!(outcome = %outcome, "Notification handled");
        outcome
    }

    /// Menu markup, cached in front-end mode and rendered live otherwise.
    pub async fn render_nav_menu<R>(&self, args: &MenuArgs, renderer: &R) -> Result<String, R::Error>
    where
        R: MenuRenderer + ?Sized,
    {
        if self.mode.is_administrative() {
            let items = renderer.menu_items(args);
            return renderer.render(args, &items);
        }
        let span = info_span!("nav_menu", request_id = %self.request_id);
        self.nav_menus.render(args, renderer).instrument(span).await
    }

    /// Widget display filter. `Ok(true)` means the output was already
    /// written to `out`; `Ok(false)` means the host renders the widget.
    pub async fn display_widget<R>(
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
        if self.mode.is_administrative() {
            return Ok(false);
        }
        let span = info_span!("widget", request_id = %self.request_id);
        self.widgets
            .display(widget, settings, args, renderer, out)
            .instrument(span)
            .await
    }

    /// Opt-out checkbox for the widget admin form; only offered in
    /// administrative requests.
    pub fn widget_form(&self, widget: &WidgetInstance, settings: &WidgetSettings) -> Option<String> {
        self.mode
            .is_administrative()
            .then(|| exclusion_checkbox(widget, settings))
    }

    /// Widget instance-update filter. Front-end requests leave settings as is.
    pub fn update_widget_settings(
        &self,
        settings: WidgetSettings,
        submitted: &BTreeMap<String, Value>,
    ) -> WidgetSettings {
        if !self.mode.is_administrative() {
            return settings;
        }
        apply_exclusion_flag(settings, submitted)
    }

    pub fn finish(self) -> RequestSummary {
        let flushed = self.guard.latched();
        info!(
            request_id = %self.request_id,
            mode = %self.mode,
            flushed = flushed.len(),
            "Request finished"
        );
        RequestSummary {
            request_id: self.request_id,
            mode: self.mode,
            flushed,
        }
    }
}
