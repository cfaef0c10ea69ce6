mod support;

use std::sync::Arc;

use objcache::cache::{
    CacheConfig, EventClass, FlushOutcome, FlushablePostFilter, HostContext, HostNotification,
    ObjectCache, SkipReason, StaticContent,
};
use objcache::domain::{Comment, CommentStatus, Post, PostStatus, PostType};
use support::RecordingBackend;

fn post(id: u64, status: PostStatus) -> Post {
    Post {
        id,
        post_type: PostType::Post,
        status,
    }
}

fn object_cache(backend: Arc<RecordingBackend>, content: StaticContent) -> ObjectCache {
    ObjectCache::new(CacheConfig::default(), backend, Arc::new(content))
}

#[tokio::test]
async fn draft_post_save_flushes_once() {
    let backend = Arc::new(RecordingBackend::new());
    let cache = object_cache(backend.clone(), StaticContent::new());
    let mut session = cache.begin_request(&HostContext::admin_area());

    let outcome = session
        .notify(HostNotification::PostSaved {
            post_id: 11,
            post: Some(post(11, PostStatus::Draft)),
        })
        .await;

    assert_eq!(outcome, FlushOutcome::Flushed(EventClass::Post));
    assert_eq!(backend.flushes(), 1);
}

#[tokio::test]
async fn two_published_post_saves_never_flush() {
    let backend = Arc::new(RecordingBackend::new());
    let content = StaticContent::new()
        .with_post(post(1, PostStatus::Publish))
        .with_post(post(2, PostStatus::Publish));
    let cache = object_cache(backend.clone(), content);
    let mut session = cache.begin_request(&HostContext::admin_area());

    for post_id in [1, 2] {
        let outcome = session
            .notify(HostNotification::PostSaved {
                post_id,
                post: None,
            })
            .await;
        assert_eq!(outcome, FlushOutcome::Skipped(SkipReason::PublishedPost));
    }

    assert_eq!(backend.flushes(), 0);
    assert!(session.finish().flushed.is_empty());
}

#[tokio::test]
async fn at_most_one_flush_per_class_per_request() {
    let backend = Arc::new(RecordingBackend::new());
    let cache = object_cache(backend.clone(), StaticContent::new());
    let mut session = cache.begin_request(&HostContext::admin_area());

    let notifications = vec![
        HostNotification::PostTrashed { post_id: 3 },
        HostNotification::PostDeleted { post_id: 4 },
        HostNotification::CommentPosted { comment_id: 0 },
        HostNotification::PingbackPosted { comment_id: 0 },
        HostNotification::OptionUpdated {
            option_name: "blogname".to_string(),
        },
        HostNotification::OptionAdded {
            option_name: "widget_text".to_string(),
        },
        HostNotification::UserProfileUpdated { user_id: 1 },
        HostNotification::UserProfileUpdated { user_id: 2 },
        HostNotification::MenuCreated { menu_id: 1 },
        HostNotification::MenuItemUpdated { menu_id: 1 },
        HostNotification::WidgetUpdated {
            widget_id: "text-2".to_string(),
        },
        HostNotification::ThemeSwitched {
            theme: "twentytwenty".to_string(),
        },
    ];
    for notification in notifications {
        session.notify(notification).await;
    }

    assert_eq!(backend.flushes(), 4);
    assert_eq!(session.finish().flushed, EventClass::ALL.to_vec());
}

#[tokio::test]
async fn scheduler_option_never_flushes() {
    let backend = Arc::new(RecordingBackend::new());
    let cache = object_cache(backend.clone(), StaticContent::new());
    let mut session = cache.begin_request(&HostContext::admin_area());

    for _ in 0..5 {
        session
            .notify(HostNotification::OptionUpdated {
                option_name: "cron".to_string(),
            })
            .await;
    }
    assert_eq!(backend.flushes(), 0);

    session
        .notify(HostNotification::OptionDeleted {
            option_name: "sidebars_widgets".to_string(),
        })
        .await;
    session
        .notify(HostNotification::OptionUpdated {
            option_name: "cron".to_string(),
        })
        .await;
    assert_eq!(backend.flushes(), 1);
}

#[tokio::test]
async fn approved_comment_status_behaves_like_comment_change() {
    let content = StaticContent::new()
        .with_comment(Comment { id: 40, post_id: 8 })
        .with_post(post(8, PostStatus::Draft));

    for status in ["approve", "1"] {
        let via_status = Arc::new(RecordingBackend::new());
        let mut session =
            object_cache(via_status.clone(), content.clone()).begin_request(&HostContext::admin_area());
        let status_outcome = session
            .notify(HostNotification::CommentStatusChanged {
                comment_id: 40,
                status: CommentStatus::from(status),
            })
            .await;

        let via_edit = Arc::new(RecordingBackend::new());
        let mut session =
            object_cache(via_edit.clone(), content.clone()).begin_request(&HostContext::admin_area());
        let edit_outcome = session
            .notify(HostNotification::CommentEdited { comment_id: 40 })
            .await;

        assert_eq!(status_outcome, edit_outcome, "status {status}");
        assert_eq!(status_outcome, FlushOutcome::Flushed(EventClass::Post));
        assert_eq!(via_status.flushes(), via_edit.flushes());
    }
}

#[tokio::test]
async fn other_comment_statuses_are_ignored() {
    let backend = Arc::new(RecordingBackend::new());
    let cache = object_cache(backend.clone(), StaticContent::new());
    let mut session = cache.begin_request(&HostContext::admin_area());

    for status in ["hold", "0", "spam", "trash", "unapproved"] {
        let outcome = session
            .notify(HostNotification::CommentStatusChanged {
                comment_id: 40,
                status: CommentStatus::from(status),
            })
            .await;
        assert_eq!(outcome, FlushOutcome::Skipped(SkipReason::CommentNotApproved));
    }
    assert_eq!(backend.flushes(), 0);
}

#[tokio::test]
async fn front_end_requests_only_react_to_theme_and_profile() {
    let backend = Arc::new(RecordingBackend::new());
    let cache = object_cache(backend.clone(), StaticContent::new());
    let mut session = cache.begin_request(&HostContext::front_end());

    let ignored = session
        .notify(HostNotification::PostSaved {
            post_id: 5,
            post: Some(post(5, PostStatus::Draft)),
        })
        .await;
    assert_eq!(ignored, FlushOutcome::Unsubscribed);
    assert_eq!(backend.flushes(), 0);

    session
        .notify(HostNotification::UserProfileUpdated { user_id: 7 })
        .await;
    session
        .notify(HostNotification::ThemeSwitched {
            theme: "twentytwentyfour".to_string(),
        })
        .await;
    assert_eq!(backend.flushes(), 2);
}

#[tokio::test]
async fn configured_override_makes_requests_administrative() {
    let backend = Arc::new(RecordingBackend::new());
    let config = CacheConfig {
        admin_override: true,
        ..Default::default()
    };
    let cache = ObjectCache::new(config, backend.clone(), Arc::new(StaticContent::new()));
    let mut session = cache.begin_request(&HostContext::front_end());

    assert!(session.mode().is_administrative());
    session
        .notify(HostNotification::OptionUpdated {
            option_name: "blogname".to_string(),
        })
        .await;
    assert_eq!(backend.flushes(), 1);
}

#[tokio::test]
async fn failed_flush_does_not_abort_the_request() {
    let backend = Arc::new(RecordingBackend::failing());
    let cache = object_cache(backend.clone(), StaticContent::new());
    let mut session = cache.begin_request(&HostContext::admin_area());

    let first = session.notify(HostNotification::MenuDeleted { menu_id: 2 }).await;
    let second = session.notify(HostNotification::MenuUpdated { menu_id: 3 }).await;
    let option = session
        .notify(HostNotification::OptionUpdated {
            option_name: "blogname".to_string(),
        })
        .await;

    assert_eq!(first, FlushOutcome::FlushFailed(EventClass::Structural));
    assert_eq!(second, FlushOutcome::Suppressed(EventClass::Structural));
    assert_eq!(option, FlushOutcome::FlushFailed(EventClass::Option));
    assert_eq!(backend.flushes(), 2);
}

#[tokio::test]
async fn flushable_filter_can_force_published_posts_to_flush() {
    let backend = Arc::new(RecordingBackend::new());
    let filter: Arc<dyn FlushablePostFilter> = Arc::new(|flushable: bool, post: Option<&Post>| {
        flushable && post.is_none_or(|post| post.id != 21)
    });
    let cache = object_cache(backend.clone(), StaticContent::new()).with_flushable_filter(filter);
    let mut session = cache.begin_request(&HostContext::admin_area());

    let outcome = session
        .notify(HostNotification::PostPublished {
            post_id: 21,
            post: Some(post(21, PostStatus::Publish)),
        })
        .await;

    assert_eq!(outcome, FlushOutcome::Flushed(EventClass::Post));
    assert_eq!(backend.flushes(), 1);
}

#[tokio::test]
async fn each_request_starts_with_fresh_latches() {
    let backend = Arc::new(RecordingBackend::new());
    let cache = object_cache(backend.clone(), StaticContent::new());

    for _ in 0..3 {
        let mut session = cache.begin_request(&HostContext::admin_area());
        session
            .notify(HostNotification::ThemeSwitched {
                theme: "twentytwenty".to_string(),
            })
            .await;
        session
            .notify(HostNotification::ThemeSwitched {
                theme: "twentytwenty".to_string(),
            })
            .await;
    }

    assert_eq!(backend.flushes(), 3);
}

#[tokio::test]
async fn concurrent_requests_keep_separate_latches() {
    let backend = Arc::new(RecordingBackend::new());
    let cache = object_cache(backend.clone(), StaticContent::new());

    let mut handles = Vec::new();
    for _ in 0..4 {
        let cache = cache.clone();
        handles.push(tokio::spawn(async move {
            let mut session = cache.begin_request(&HostContext::admin_area());
            for _ in 0..3 {
                session
                    .notify(HostNotification::UserProfileUpdated { user_id: 1 })
                    .await;
            }
            session.finish()
        }));
    }

    for handle in handles {
        let summary = handle.await.expect("request task");
        assert_eq!(summary.flushed, vec![EventClass::Profile]);
    }
    assert_eq!(backend.flushes(), 4);
}
