//! Offline replay of recorded host notifications.
//!
//! A replay document carries the content the policy needs to resolve ids
//! and the notifications of one request:
//!
//! ```json
//! {
//!   "host": { "in_admin_area": true },
//!   "posts": [{ "id": 5, "post_type": "post", "status": "draft" }],
//!   "comments": [{ "id": 9, "post_id": 5 }],
//!   "notifications": [{ "hook": "post-saved", "post_id": 5 }]
//! }
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, instrument};

use crate::backend::CacheBackend;
use crate::cache::{
    CacheConfig, FlushOutcome, HostContext, HostHook, HostNotification, ObjectCache,
    RequestSummary, StaticContent,
};
use crate::domain::{Comment, Post};
use crate::error::AppError;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReplayScript {
    pub host: HostContext,
    pub posts: Vec<Post>,
    pub comments: Vec<Comment>,
    pub notifications: Vec<HostNotification>,
}

impl ReplayScript {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AppError> {
        serde_json::from_slice(bytes).map_err(|err| AppError::replay(err.to_string()))
    }

    pub async fn load(path: &Path) -> Result<Self, AppError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|err| AppError::replay(format!("failed to read {}: {err}", path.display())))?;
        Self::from_slice(&bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayStep {
    pub hook: HostHook,
    pub outcome: FlushOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayReport {
    pub steps: Vec<ReplayStep>,
    pub summary: RequestSummary,
}

impl ReplayReport {
    /// Number of backend flush calls the request issued.
    pub fn flush_calls(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| step.outcome.issued_flush())
            .count()
    }
}

/// Run the script's notifications through a single request.
///
/// `force_admin` marks the request administrative on top of whatever the
/// script's host context says.
#[instrument(skip_all, fields(notifications = script.notifications.len()))]
pub async fn replay(
    config: CacheConfig,
    backend: Arc<dyn CacheBackend>,
    script: ReplayScript,
    force_admin: bool,
) -> ReplayReport {
    let ReplayScript {
        mut host,
        posts,
        comments,
        notifications,
    } = script;
    host.admin_override |= force_admin;

    let mut content = StaticContent::new();
    content.extend(posts, comments);

    let cache = ObjectCache::new(config, backend, Arc::new(content));
    let mut session = cache.begin_request(&host);

    let mut steps = Vec::with_capacity(notifications.len());
    for notification in notifications {
        let hook = notification.hook();
        let outcome = session.notify(notification).await;
        steps.push(ReplayStep { hook, outcome });
    }

    let summary = session.finish();
    info!(
        request_id = %summary.request_id,
        mode = %summary.mode,
        flushed = summary.flushed.len(),
        "Replay finished"
    );
    ReplayReport { steps, summary }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::backend::NullBackend;
    use crate::cache::{EventClass, RequestMode, SkipReason};

    const SCRIPT: &str = r#"{
        "host": { "in_admin_area": true },
        "posts": [
            { "id": 5, "post_type": "post", "status": "publish" },
            { "id": 6, "post_type": "post", "status": "draft" }
        ],
        "comments": [{ "id": 9, "post_id": 5 }],
        "notifications": [
            { "hook": "post-saved", "post_id": 5 },
            { "hook": "comment-status-changed", "comment_id": 9, "status": "approve" },
            { "hook": "option-updated", "option_name": "cron" },
            { "hook": "post-saved", "post_id": 6 },
            { "hook": "post-trashed", "post_id": 6 }
        ]
    }"#;

    #[tokio::test]
    async fn replays_one_administrative_request() {
        let script = ReplayScript::from_slice(SCRIPT.as_bytes()).expect("script");
        let report = replay(CacheConfig::default(), Arc::new(NullBackend), script, false).await;

        let outcomes: Vec<_> = report.steps.iter().map(|step| step.outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                FlushOutcome::Skipped(SkipReason::PublishedPost),
                FlushOutcome::Skipped(SkipReason::PublishedPost),
                FlushOutcome::Skipped(SkipReason::SchedulerOption),
                FlushOutcome::Flushed(EventClass::Post),
                FlushOutcome::Suppressed(EventClass::Post),
            ]
        );
        assert_eq!(report.flush_calls(), 1);
        assert_eq!(report.summary.mode, RequestMode::Administrative);
        assert_eq!(report.summary.flushed, vec![EventClass::Post]);
    }

    #[tokio::test]
    async fn front_end_replay_only_sees_theme_and_profile() {
        let mut script = ReplayScript::from_slice(SCRIPT.as_bytes()).expect("script");
        script.host = HostContext::front_end();

        let report = replay(CacheConfig::default(), Arc::new(NullBackend), script, false).await;
        assert!(
            report
                .steps
                .iter()
                .all(|step| step.outcome == FlushOutcome::Unsubscribed)
        );
        assert!(report.summary.flushed.is_empty());
    }

    #[tokio::test]
    async fn force_admin_overrides_host_context() {
        let script = ReplayScript {
            notifications: vec![HostNotification::MenuUpdated { menu_id: 2 }],
            ..Default::default()
        };

        let report = replay(CacheConfig::default(), Arc::new(NullBackend), script, true).await;
        assert_eq!(report.summary.mode, RequestMode::Administrative);
        assert_eq!(report.flush_calls(), 1);
    }

    #[tokio::test]
    async fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(SCRIPT.as_bytes()).expect("write script");

        let script = ReplayScript::load(file.path()).await.expect("load");
        assert_eq!(script.notifications.len(), 5);
        assert_eq!(script.posts.len(), 2);
    }

    #[test]
    fn malformed_document_is_a_replay_error() {
        let err = ReplayScript::from_slice(b"{ \"notifications\": [{ \"hook\": \"nope\" }] }")
            .expect_err("unknown hook");
        assert!(matches!(err, AppError::Replay(_)));
    }
}
