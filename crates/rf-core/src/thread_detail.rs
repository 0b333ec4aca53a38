//! # Thread Detail
//!
//! Assembles `GET /threads/{id}`: fetch thread, comments and replies, then
//! normalize → format → merge into one nested [`ThreadView`].

use std::sync::Arc;

use futures_util::future::try_join3;
use log::debug;

use crate::error::Result;
use crate::raw::{
    normalize_date, resolve_comment_username, resolve_reply_comment_id, resolve_reply_deleted,
    resolve_reply_username, resolve_thread_username, Envelope, NormalizedDate, RawComment,
    RawReply, RawThread, ThreadEnvelope,
};
use crate::traits::{CommentRepo, ReplyRepo, ThreadRepo};
use crate::views::{CommentView, ReplyView, ThreadView, REDACTED_COMMENT, REDACTED_REPLY};

/// Reduces any thread envelope to a plain record.
///
/// Steps run once each, in order: materialize an instance, take the first
/// element of a non-empty sequence, take the `"0"` entry of an index-zero
/// mapping.
pub fn normalize_thread(envelope: ThreadEnvelope) -> RawThread {
    let mut current = envelope;

    let materialized = match &current {
        ThreadEnvelope::Instance(instance) => instance.materialize(),
        _ => None,
    };
    if let Some(plain) = materialized {
        current = plain;
    }

    if let ThreadEnvelope::Sequence(items) = current {
        current = match items.into_iter().next() {
            Some(first) => first,
            None => ThreadEnvelope::Sequence(Vec::new()),
        };
    }

    if let ThreadEnvelope::IndexZero(inner) = current {
        current = *inner;
    }

    residual_record(current)
}

fn residual_record(envelope: ThreadEnvelope) -> RawThread {
    match envelope {
        ThreadEnvelope::Record(thread) => thread,
        ThreadEnvelope::Instance(instance) => match instance.materialize() {
            Some(ThreadEnvelope::Record(thread)) => thread,
            _ => RawThread::default(),
        },
        ThreadEnvelope::Sequence(_) | ThreadEnvelope::IndexZero(_) => RawThread::default(),
    }
}

/// A comment after redaction, before replies are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedComment {
    pub id: String,
    pub date: String,
    pub username: Option<String>,
    pub content: String,
}

pub fn format_comments(raw: Vec<Envelope<RawComment>>) -> Vec<FormattedComment> {
    raw.into_iter()
        .map(Envelope::into_inner)
        .map(|comment| {
            let username = resolve_comment_username(&comment);
            let date = normalize_date(comment.date.as_ref()).text;
            let content = if comment.is_delete {
                REDACTED_COMMENT.to_string()
            } else {
                comment.content
            };
            FormattedComment { id: comment.id, date, username, content }
        })
        .collect()
}

/// A reply reduced to canonical field names.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedReply {
    pub id: String,
    pub comment_id: Option<String>,
    pub content: String,
    pub date: NormalizedDate,
    pub username: Option<String>,
    pub is_delete: bool,
}

pub fn format_replies(raw: Vec<Envelope<RawReply>>) -> Vec<FormattedReply> {
    raw.into_iter()
        .map(Envelope::into_inner)
        .map(|reply| {
            let is_delete = resolve_reply_deleted(&reply);
            let comment_id = resolve_reply_comment_id(&reply);
            let username = resolve_reply_username(&reply);
            let date = normalize_date(reply.date.as_ref());
            let content = if is_delete {
                REDACTED_REPLY.to_string()
            } else {
                reply.content
            };
            FormattedReply { id: reply.id, comment_id, content, date, username, is_delete }
        })
        .collect()
}

/// Attaches every reply to the comment it references, oldest first.
///
/// Replies whose date did not parse go after the dated ones, in their
/// original order.
pub fn merge_replies(comments: &[FormattedComment], replies: &[FormattedReply]) -> Vec<CommentView> {
    comments
        .iter()
        .map(|comment| {
            let mut matched: Vec<&FormattedReply> = replies
                .iter()
                .filter(|reply| reply.comment_id.as_deref() == Some(comment.id.as_str()))
                .collect();
            matched.sort_by_key(|reply| (reply.date.instant.is_none(), reply.date.instant));

            CommentView {
                id: comment.id.clone(),
                username: comment.username.clone(),
                date: comment.date.clone(),
                content: comment.content.clone(),
                replies: matched.into_iter().map(reply_view).collect(),
            }
        })
        .collect()
}

fn reply_view(reply: &FormattedReply) -> ReplyView {
    ReplyView {
        id: reply.id.clone(),
        username: reply.username.clone(),
        date: reply.date.text.clone(),
        content: if reply.is_delete {
            REDACTED_REPLY.to_string()
        } else {
            reply.content.clone()
        },
        is_delete: reply.is_delete,
    }
}

/// Read-only use case behind the thread detail endpoint.
#[derive(Clone)]
pub struct DetailThreadUseCase {
    threads: Arc<dyn ThreadRepo>,
    comments: Arc<dyn CommentRepo>,
    replies: Arc<dyn ReplyRepo>,
}

impl DetailThreadUseCase {
    pub fn new(
        threads: Arc<dyn ThreadRepo>,
        comments: Arc<dyn CommentRepo>,
        replies: Arc<dyn ReplyRepo>,
    ) -> Self {
        Self { threads, comments, replies }
    }

    /// Builds the nested view of one thread.
    ///
    /// The three fetches run concurrently; the first failure (e.g. `NotFound`
    /// from the thread fetch) aborts the whole aggregation.
    pub async fn execute(&self, thread_id: &str) -> Result<ThreadView> {
        let (raw_thread, raw_comments, raw_replies) = try_join3(
            self.threads.get_thread_by_id(thread_id),
            self.comments.get_comments_by_thread_id(thread_id),
            self.replies.get_replies_by_thread_id(thread_id),
        )
        .await?;
        debug!(
            "thread {thread_id}: fetched {} comments, {} replies",
            raw_comments.len(),
            raw_replies.len()
        );

        let comments = format_comments(raw_comments);
        let replies = format_replies(raw_replies);
        let comments = merge_replies(&comments, &replies);

        let thread = normalize_thread(raw_thread);
        let username = resolve_thread_username(&thread);
        let date = thread.date.as_ref().map(|d| normalize_date(Some(d)).text);

        Ok(ThreadView {
            id: thread.id,
            title: thread.title,
            body: thread.body,
            date,
            username,
            comments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::raw::{DataValues, Identity, RawDate};
    use chrono::{TimeZone, Utc};
    use crate::traits::{MockCommentRepo, MockReplyRepo, MockThreadRepo};
    use mockall::predicate::eq;
    use serde_json::{json, Value};

    fn thread_json() -> Value {
        json!({
            "id": "thread-123",
            "title": "Test Thread",
            "body": "Test Body",
            "date": "2023-01-01T00:00:00.000Z",
            "username": "user1",
        })
    }

    fn comment(id: &str, content: &str, is_delete: bool, username: &str) -> Envelope<RawComment> {
        Envelope::Plain(RawComment {
            id: id.into(),
            content: content.into(),
            date: Some(RawDate::from("2023-01-01T01:00:00.000Z")),
            is_delete,
            user: Some(Envelope::Plain(Identity::named(username))),
        })
    }

    fn reply(id: &str, comment_id: &str, date: &str, content: &str) -> RawReply {
        RawReply {
            id: id.into(),
            content: content.into(),
            date: Some(RawDate::from(date)),
            comment_id_camel: Some(comment_id.into()),
            user: Some(Envelope::Plain(Identity::named("user3"))),
            ..RawReply::default()
        }
    }

    fn use_case(
        thread: Value,
        comments: Vec<Envelope<RawComment>>,
        replies: Vec<Envelope<RawReply>>,
    ) -> DetailThreadUseCase {
        let mut threads = MockThreadRepo::new();
        threads
            .expect_get_thread_by_id()
            .with(eq("thread-123"))
            .returning(move |_| Ok(ThreadEnvelope::from_json(thread.clone()).unwrap()));
        let mut comment_repo = MockCommentRepo::new();
        comment_repo
            .expect_get_comments_by_thread_id()
            .with(eq("thread-123"))
            .returning(move |_| Ok(comments.clone()));
        let mut reply_repo = MockReplyRepo::new();
        reply_repo
            .expect_get_replies_by_thread_id()
            .with(eq("thread-123"))
            .returning(move |_| Ok(replies.clone()));
        DetailThreadUseCase::new(Arc::new(threads), Arc::new(comment_repo), Arc::new(reply_repo))
    }

    #[tokio::test]
    async fn orchestrates_the_thread_detail() {
        let detail = use_case(
            thread_json(),
            vec![comment("comment-1", "Test Comment", false, "user2")],
            vec![reply("reply-1", "comment-1", "2023-01-01T02:00:00.000Z", "Test Reply").into()],
        );

        let view = detail.execute("thread-123").await.unwrap();

        assert_eq!(
            serde_json::to_value(&view).unwrap(),
            json!({
                "id": "thread-123",
                "title": "Test Thread",
                "body": "Test Body",
                "date": "2023-01-01T00:00:00.000Z",
                "username": "user1",
                "comments": [{
                    "id": "comment-1",
                    "username": "user2",
                    "date": "2023-01-01T01:00:00.000Z",
                    "content": "Test Comment",
                    "replies": [{
                        "id": "reply-1",
                        "username": "user3",
                        "date": "2023-01-01T02:00:00.000Z",
                        "content": "Test Reply",
                        "is_delete": false,
                    }],
                }],
            })
        );
    }

    #[tokio::test]
    async fn redacts_deleted_comments_and_replies() {
        let mut deleted_reply = reply("reply-1", "comment-1", "2023-01-01T02:00:00.000Z", "Deleted Reply");
        deleted_reply.is_delete = Some(true);
        let detail = use_case(
            thread_json(),
            vec![comment("comment-1", "Deleted Comment", true, "user2")],
            vec![deleted_reply.into()],
        );

        let view = detail.execute("thread-123").await.unwrap();

        assert_eq!(view.comments[0].content, "**komentar telah dihapus**");
        assert_eq!(view.comments[0].replies[0].content, "**balasan telah dihapus**");
        assert!(view.comments[0].replies[0].is_delete);
    }

    #[tokio::test]
    async fn comment_dated_by_instant_inside_instance_wrapper() {
        let instant = Utc.with_ymd_and_hms(2023, 1, 2, 1, 0, 0).unwrap();
        let wrapped = Envelope::Instance {
            data_values: RawComment {
                id: "comment-1".into(),
                content: "Test Comment".into(),
                date: Some(RawDate::Instant(instant)),
                is_delete: false,
                user: Some(Envelope::Instance { data_values: Identity::named("user2") }),
            },
        };
        let detail = use_case(thread_json(), vec![wrapped], vec![]);

        let view = detail.execute("thread-123").await.unwrap();

        assert_eq!(view.comments[0].date, "2023-01-02T01:00:00.000Z");
        assert_eq!(view.comments[0].username.as_deref(), Some("user2"));
        assert!(view.comments[0].replies.is_empty());
    }

    #[tokio::test]
    async fn redacts_replies_flagged_with_camel_case_key() {
        let mut deleted_reply = reply("reply-1", "comment-1", "2023-01-01T02:00:00.000Z", "gone");
        deleted_reply.is_delete_camel = Some(true);
        let detail = use_case(
            thread_json(),
            vec![comment("comment-1", "c", false, "user2")],
            vec![Envelope::Instance { data_values: deleted_reply }],
        );

        let view = detail.execute("thread-123").await.unwrap();

        assert_eq!(view.comments[0].replies[0].content, REDACTED_REPLY);
    }

    #[tokio::test]
    async fn every_thread_envelope_shape_yields_the_same_view() {
        let shapes = [
            thread_json(),
            json!([thread_json()]),
            json!({ "0": thread_json(), "comments": [] }),
            json!({ "dataValues": thread_json() }),
            json!({ "dataValues": [thread_json()] }),
        ];

        let mut views = Vec::new();
        for shape in shapes {
            let detail = use_case(shape, vec![], vec![]);
            views.push(detail.execute("thread-123").await.unwrap());
        }

        assert_eq!(views[0].id.as_deref(), Some("thread-123"));
        assert_eq!(views[0].username.as_deref(), Some("user1"));
        assert!(views.iter().all(|view| view == &views[0]));
    }

    #[tokio::test]
    async fn materialized_instance_is_used_when_conversion_succeeds() {
        let mut threads = MockThreadRepo::new();
        threads.expect_get_thread_by_id().returning(|_| {
            Ok(ThreadEnvelope::Instance(Box::new(DataValues(json!({ "dataValues": thread_json() })))))
        });
        let mut comment_repo = MockCommentRepo::new();
        comment_repo.expect_get_comments_by_thread_id().returning(|_| Ok(vec![]));
        let mut reply_repo = MockReplyRepo::new();
        reply_repo.expect_get_replies_by_thread_id().returning(|_| Ok(vec![]));
        let detail =
            DetailThreadUseCase::new(Arc::new(threads), Arc::new(comment_repo), Arc::new(reply_repo));

        let view = detail.execute("thread-123").await.unwrap();

        assert_eq!(view.title.as_deref(), Some("Test Thread"));
    }

    #[tokio::test]
    async fn thread_username_falls_back_to_nested_user() {
        let detail = use_case(
            json!({ "id": "thread-123", "title": "T", "body": "B", "user": { "username": "nested" } }),
            vec![],
            vec![],
        );

        let view = detail.execute("thread-123").await.unwrap();

        assert_eq!(view.username.as_deref(), Some("nested"));
        assert_eq!(view.date, None);
    }

    #[tokio::test]
    async fn reply_without_identity_has_null_username() {
        let mut anonymous = reply("reply-1", "comment-1", "2023-01-01T02:00:00.000Z", "who?");
        anonymous.user = None;
        let detail = use_case(
            thread_json(),
            vec![comment("comment-1", "c", false, "user2")],
            vec![anonymous.into()],
        );

        let view = detail.execute("thread-123").await.unwrap();
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["comments"][0]["replies"][0]["username"], Value::Null);
    }

    #[tokio::test]
    async fn replies_sort_chronologically_across_formats() {
        let detail = use_case(
            thread_json(),
            vec![comment("comment-1", "c", false, "user2")],
            vec![
                reply("reply-late", "comment-1", "2023-01-01 10:00:00", "late").into(),
                reply("reply-undated", "comment-1", "not a date", "undated").into(),
                reply("reply-early", "comment-1", "2023-01-01T09:00:00+07:00", "early").into(),
                reply("reply-mid", "comment-1", "2023-01-01T05:00:00.000Z", "mid").into(),
            ],
        );

        let view = detail.execute("thread-123").await.unwrap();
        let order: Vec<_> = view.comments[0].replies.iter().map(|r| r.id.as_str()).collect();

        assert_eq!(order, ["reply-early", "reply-mid", "reply-late", "reply-undated"]);
        assert_eq!(view.comments[0].replies[3].date, "Invalid Date");
    }

    #[tokio::test]
    async fn replies_attach_only_to_their_own_comment() {
        let mut snake = reply("reply-2", "ignored", "2023-01-01T03:00:00.000Z", "to comment-2");
        snake.comment_id = Some("comment-2".into());
        snake.comment_id_camel = None;
        let detail = use_case(
            thread_json(),
            vec![
                comment("comment-1", "first", false, "user2"),
                comment("comment-2", "second", false, "user2"),
                comment("comment-3", "third", false, "user2"),
            ],
            vec![
                reply("reply-1", "comment-1", "2023-01-01T02:00:00.000Z", "to comment-1").into(),
                snake.into(),
            ],
        );

        let view = detail.execute("thread-123").await.unwrap();

        assert_eq!(view.comments[0].replies.len(), 1);
        assert_eq!(view.comments[0].replies[0].id, "reply-1");
        assert_eq!(view.comments[1].replies.len(), 1);
        assert_eq!(view.comments[1].replies[0].id, "reply-2");
        assert!(view.comments[2].replies.is_empty());
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["comments"][2]["replies"], json!([]));
    }

    #[tokio::test]
    async fn view_has_exactly_the_thread_keys() {
        let detail = use_case(thread_json(), vec![], vec![]);

        let json = serde_json::to_value(detail.execute("thread-123").await.unwrap()).unwrap();
        let mut keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        keys.sort();

        assert_eq!(keys, ["body", "comments", "date", "id", "title", "username"]);
    }

    #[tokio::test]
    async fn repeated_calls_are_structurally_equal() {
        let detail = use_case(
            thread_json(),
            vec![comment("comment-1", "c", false, "user2")],
            vec![reply("reply-1", "comment-1", "2023-01-01T02:00:00.000Z", "r").into()],
        );

        let first = detail.execute("thread-123").await.unwrap();
        let second = detail.execute("thread-123").await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn propagates_not_found_from_the_thread_fetch() {
        let mut threads = MockThreadRepo::new();
        threads
            .expect_get_thread_by_id()
            .returning(|_| Err(AppError::not_found("thread tidak ditemukan di database")));
        let mut comment_repo = MockCommentRepo::new();
        comment_repo.expect_get_comments_by_thread_id().returning(|_| Ok(vec![]));
        let mut reply_repo = MockReplyRepo::new();
        reply_repo.expect_get_replies_by_thread_id().returning(|_| Ok(vec![]));
        let detail =
            DetailThreadUseCase::new(Arc::new(threads), Arc::new(comment_repo), Arc::new(reply_repo));

        let err = detail.execute("thread-000").await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(msg) if msg == "thread tidak ditemukan di database"));
    }

    #[test]
    fn empty_sequence_normalizes_to_an_empty_record() {
        assert_eq!(normalize_thread(ThreadEnvelope::Sequence(vec![])), RawThread::default());
    }

    #[test]
    fn merge_leaves_formatted_comments_untouched() {
        let comments = vec![FormattedComment {
            id: "comment-1".into(),
            date: "2023-01-01T01:00:00.000Z".into(),
            username: Some("user2".into()),
            content: "c".into(),
        }];
        let before = comments.clone();

        let merged = merge_replies(&comments, &[]);

        assert_eq!(comments, before);
        assert!(merged[0].replies.is_empty());
    }
}
