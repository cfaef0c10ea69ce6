//! Hook subscriptions for one request.

use std::collections::BTreeMap;

use tracing::trace;

use super::events::{ChangeEvent, EventClass, HostHook, HostNotification};
use super::mode::RequestMode;

/// Hooks subscribed regardless of mode: they change what every visitor sees.
const ALWAYS_SUBSCRIBED: [HostHook; 2] = [HostHook::ThemeSwitched, HostHook::UserProfileUpdated];

/// Ordered hook → latch class table, built once against the request mode.
#[derive(Debug, Clone)]
pub struct EventRouter {
    mode: RequestMode,
    subscriptions: BTreeMap<HostHook, EventClass>,
}

impl EventRouter {
    pub fn for_mode(mode: RequestMode) -> Self {
        let subscriptions = HostHook::ALL
            .into_iter()
            .filter(|hook| mode.is_administrative() || ALWAYS_SUBSCRIBED.contains(hook))
            .map(|hook| (hook, hook.class()))
            .collect();

        Self {
            mode,
            subscriptions,
        }
    }

    pub fn subscribes(&self, hook: HostHook) -> bool {
        self.subscriptions.contains_key(&hook)
    }

    /// Subscribed hooks in dispatch order.
    pub fn hooks(&self) -> impl Iterator<Item = (HostHook, EventClass)> + '_ {
        self.subscriptions
            .iter()
            .map(|(hook, class)| (*hook, *class))
    }

    /// Turn a notification into a change event, or `None` when the hook is
    /// not subscribed in this request.
    pub fn route(&self, notification: HostNotification) -> Option<ChangeEvent> {
        let hook = notification.hook();
        if !self.subscribes(hook) {
            trace!(?hook, mode = %self.mode, "Notification not subscribed");
            return None;
        }
        Some(notification.into_event())
    }
}
