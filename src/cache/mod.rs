//! Flush coordination and fragment caching.
//!
//! - **Flush coordination**: host notifications are routed to change events,
//!   the invalidation policy decides whether each one needs a flush, and the
//!   request's [`FlushGuard`] allows at most one flush per event class.
//! - **Fragment caching**: rendered navigation menus and widgets are stored
//!   in the backend with a provenance marker and served on later requests.
//!
//! Both halves run inside a [`RequestSession`] obtained from
//! [`ObjectCache::begin_request`]. Administrative requests invalidate;
//! front-end requests read and write fragments.

mod config;
mod content;
mod events;
pub mod fragment;
mod guard;
mod mode;
mod policy;
mod router;
mod session;

pub use config::CacheConfig;
pub use content::{ContentSource, StaticContent};
pub use events::{ChangeEvent, EventClass, HostHook, HostNotification};
pub use fragment::{
    FragmentGroup, FragmentKey, FragmentRecord, MenuRenderer, NavMenuCache, Provenance,
    WidgetCache, WidgetRenderer,
};
pub use guard::FlushGuard;
pub use mode::{HostContext, ModeSelector, RequestMode};
pub use policy::{FlushOutcome, FlushablePostFilter, InvalidationPolicy, SCHEDULER_OPTION, SkipReason};
pub use router::EventRouter;
pub use session::{ObjectCache, RequestSession, RequestSummary};
