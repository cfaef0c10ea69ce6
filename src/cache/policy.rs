//! Event-to-flush decisions.
//!
//! Every change event resolves to one of: flush the backend, skip (the
//! change does not warrant a flush), or suppressed (a flush for the same
//! class already happened in this request).

use std::fmt;
use std::sync::Arc;

use metrics::counter;
use tracing::{debug, error, info};

use crate::backend::CacheBackend;
use crate::domain::{Post, PostStatus, PostType};

use super::content::ContentSource;
use super::events::{ChangeEvent, EventClass};
use super::guard::FlushGuard;

const METRIC_FLUSH_TOTAL: &str = "objcache_flush_total";
const METRIC_FLUSH_SUPPRESSED_TOTAL: &str = "objcache_flush_suppressed_total";
const METRIC_FLUSH_FAILED_TOTAL: &str = "objcache_flush_failed_total";

/// Option the task scheduler rewrites on every tick.
pub const SCHEDULER_OPTION: &str = "cron";

/// Override hook for the post flushability check.
///
/// Receives the computed value and the resolved post (`None` when the post
/// could not be found) and returns the value to use.
pub trait FlushablePostFilter: Send + Sync {
    fn filter(&self, flushable: bool, post: Option<&Post>) -> bool;
}

impl<F> FlushablePostFilter for F
where
    F: Fn(bool, Option<&Post>) -> bool + Send + Sync,
{
    fn filter(&self, flushable: bool, post: Option<&Post>) -> bool {
        self(flushable, post)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The scheduler's bookkeeping option changed.
    SchedulerOption,
    /// The comment moved to a status other than approved.
    CommentNotApproved,
    /// A published, non-revision, non-attachment post changed.
    PublishedPost,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::SchedulerOption => "scheduler_option",
            SkipReason::CommentNotApproved => "comment_not_approved",
            SkipReason::PublishedPost => "published_post",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// The backend was flushed.
    Flushed(EventClass),
    /// The flush was granted but the backend reported an error.
    FlushFailed(EventClass),
    /// A flush for this class already happened in the request.
    Suppressed(EventClass),
    /// The policy decided the change does not need a flush.
    Skipped(SkipReason),
    /// The request is not subscribed to the hook.
    Unsubscribed,
}

impl FlushOutcome {
    /// Whether this outcome issued a backend flush call.
    pub fn issued_flush(self) -> bool {
        matches!(
            self,
            FlushOutcome::Flushed(_) | FlushOutcome::FlushFailed(_)
        )
    }
}

impl fmt::Display for FlushOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlushOutcome::Flushed(class) => write!(f, "flushed ({class})"),
            FlushOutcome::FlushFailed(class) => write!(f, "flush failed ({class})"),
            FlushOutcome::Suppressed(class) => write!(f, "suppressed ({class})"),
            FlushOutcome::Skipped(reason) => write!(f, "skipped ({})", reason.as_str()),
            FlushOutcome::Unsubscribed => f.write_str("unsubscribed"),
        }
    }
}

/// Maps change events to flush decisions and issues the granted flushes.
#[derive(Clone)]
pub struct InvalidationPolicy {
    backend: Arc<dyn CacheBackend>,
    content: Arc<dyn ContentSource>,
    filter: Option<Arc<dyn FlushablePostFilter>>,
}

impl InvalidationPolicy {
    pub fn new(backend: Arc<dyn CacheBackend>, content: Arc<dyn ContentSource>) -> Self {
        Self {
            backend,
            content,
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: Option<Arc<dyn FlushablePostFilter>>) -> Self {
        self.filter = filter;
        self
    }

    /// Apply one change event within the request owning `guard`.
    pub async fn apply(&self, guard: &mut FlushGuard, event: ChangeEvent) -> FlushOutcome {
        let mut event = event;
        loop {
            event = match event {
                ChangeEvent::StructuralChanged => {
                    return self.flush(guard, EventClass::Structural).await;
                }
                ChangeEvent::ProfileChanged { user_id } => {
                    debug!(user_id, "Profile changed");
                    return self.flush(guard, EventClass::Profile).await;
                }
                ChangeEvent::OptionChanged { option_name } => {
                    if option_name == SCHEDULER_OPTION {
                        return FlushOutcome::Skipped(SkipReason::SchedulerOption);
                    }
                    return self.flush(guard, EventClass::Option).await;
                }
                ChangeEvent::CommentStatusChanged { comment_id, status } => {
                    if !status.is_approval() {
                        debug!(comment_id, status = %status, "Comment status change ignored");
                        return FlushOutcome::Skipped(SkipReason::CommentNotApproved);
                    }
                    ChangeEvent::CommentChanged { comment_id }
                }
                ChangeEvent::CommentChanged { comment_id } => ChangeEvent::PostChanged {
                    post_id: self.comment_parent(comment_id).await,
                    post: None,
                },
                ChangeEvent::PostChanged { post_id, post } => {
                    if guard.is_latched(EventClass::Post) {
                        return self.suppressed(EventClass::Post);
                    }
                    if post_id > 0 && self.is_flushable_post(post_id, post).await {
                        return FlushOutcome::Skipped(SkipReason::PublishedPost);
                    }
                    return self.flush(guard, EventClass::Post).await;
                }
            };
        }
    }

    /// Parent post of a comment, `0` when it cannot be resolved.
    async fn comment_parent(&self, comment_id: u64) -> u64 {
        if comment_id == 0 {
            return 0;
        }
        self.content
            .comment(comment_id)
            .await
            .map(|comment| comment.post_id)
            .unwrap_or(0)
    }

    /// `true` for published posts that are neither revisions nor
    /// attachments, unless the filter overrides it. Such posts are skipped.
    async fn is_flushable_post(&self, post_id: u64, post: Option<Post>) -> bool {
        let post = match post {
            Some(post) => Some(post),
            None => self.content.post(post_id).await,
        };

        let flushable = post.as_ref().is_some_and(|post| {
            !matches!(post.post_type, PostType::Revision | PostType::Attachment)
                && post.status == PostStatus::Publish
        });

        match &self.filter {
            Some(filter) => filter.filter(flushable, post.as_ref()),
            None => flushable,
        }
    }

    async fn flush(&self, guard: &mut FlushGuard, class: EventClass) -> FlushOutcome {
        if !guard.should_flush(class) {
            return self.suppressed(class);
        }

        match self.backend.flush().await {
            Ok(()) => {
                counter!(METRIC_FLUSH_TOTAL, "class" => class.as_str()).increment(1);
                info!(
                    event_class = %class,
                    backend = self.backend.name(),
                    "Cache flushed"
                );
                FlushOutcome::Flushed(class)
            }
            Err(err) => {
                counter!(METRIC_FLUSH_FAILED_TOTAL, "class" => class.as_str()).increment(1);
                error!(
                    event_class = %class,
                    backend = self.backend.name(),
                    error = %err,
                    "Cache flush failed"
                );
                FlushOutcome::FlushFailed(class)
            }
        }
    }

    fn suppressed(&self, class: EventClass) -> FlushOutcome {
        counter!(METRIC_FLUSH_SUPPRESSED_TOTAL, "class" => class.as_str()).increment(1);
        debug!(event_class = %class, "Cache flush already issued in this request");
        FlushOutcome::Suppressed(class)
    }
}
