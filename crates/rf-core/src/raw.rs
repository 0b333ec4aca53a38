//! # Raw Records
//!
//! Shapes handed back by storage adapters before any normalization.
//!
//! Adapters are free to return records in whatever envelope their
//! technology produces: a plain record, a `dataValues` instance wrapper, a
//! one-element sequence, or a mapping keyed by `"0"`. Every envelope is
//! modelled here as a tagged union and resolved once, at the boundary, by
//! the thread-detail pipeline. Fallback chains (username, deletion flag,
//! owning comment) are the `resolve_*` functions at the bottom of this file;
//! their order is part of the contract.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Text emitted for a date that could not be parsed.
pub const INVALID_DATE: &str = "Invalid Date";

/// A timestamp as stored: a date instance, epoch milliseconds, or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawDate {
    Instant(DateTime<Utc>),
    Millis(f64),
    Text(String),
}

impl From<DateTime<Utc>> for RawDate {
    fn from(dt: DateTime<Utc>) -> Self {
        RawDate::Instant(dt)
    }
}

impl From<&str> for RawDate {
    fn from(s: &str) -> Self {
        RawDate::Text(s.to_string())
    }
}

impl RawDate {
    /// Interprets the stored value as a point in time.
    pub fn parse(&self) -> Option<DateTime<Utc>> {
        match self {
            RawDate::Instant(dt) => Some(*dt),
            RawDate::Millis(ms) if ms.is_finite() => {
                Utc.timestamp_millis_opt(ms.trunc() as i64).single()
            }
            RawDate::Millis(_) => None,
            RawDate::Text(text) => parse_date_text(text),
        }
    }
}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%#z"];

fn parse_date_text(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    // No offset: read as UTC.
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(day) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return day.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    DateTime::parse_from_rfc2822(text).ok().map(|dt| dt.with_timezone(&Utc))
}

/// ISO-8601 text with millisecond precision, e.g. `2023-01-01T00:00:00.000Z`.
pub fn iso_string(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// A date reduced to its canonical text, with the parsed instant kept for
/// chronological comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDate {
    pub text: String,
    pub instant: Option<DateTime<Utc>>,
}

/// Normalizes an optional raw date. Anything that does not parse, including
/// an absent date, becomes [`INVALID_DATE`].
pub fn normalize_date(date: Option<&RawDate>) -> NormalizedDate {
    let instant = date.and_then(RawDate::parse);
    let text = instant
        .as_ref()
        .map(iso_string)
        .unwrap_or_else(|| INVALID_DATE.to_string());
    NormalizedDate { text, instant }
}

/// A record that may arrive wrapped in an ORM instance (`dataValues`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Instance {
        #[serde(rename = "dataValues")]
        data_values: T,
    },
    Plain(T),
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Envelope::Instance { data_values } => data_values,
            Envelope::Plain(inner) => inner,
        }
    }

    pub fn get(&self) -> &T {
        match self {
            Envelope::Instance { data_values } => data_values,
            Envelope::Plain(inner) => inner,
        }
    }
}

impl<T> From<T> for Envelope<T> {
    fn from(inner: T) -> Self {
        Envelope::Plain(inner)
    }
}

/// Nested owner identity as joined from the users table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default)]
    pub username: Option<String>,
}

impl Identity {
    pub fn named(username: impl Into<String>) -> Self {
        Self { username: Some(username.into()) }
    }
}

/// A thread record. Every field is optional: a shape the normalizer cannot
/// resolve yields absent values rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawThread {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub date: Option<RawDate>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub user: Option<Envelope<Identity>>,
}

/// Conversion of an instance wrapper into plain data.
///
/// Returns `None` when the conversion fails; the normalizer then carries on
/// with the wrapper itself.
pub trait Materialize: Send + Sync + std::fmt::Debug {
    fn materialize(&self) -> Option<ThreadEnvelope>;
}

/// Whatever a thread adapter returned for "the thread".
#[derive(Debug)]
pub enum ThreadEnvelope {
    Record(RawThread),
    Instance(Box<dyn Materialize>),
    Sequence(Vec<ThreadEnvelope>),
    /// A mapping that carries the real record under the key `"0"`.
    IndexZero(Box<ThreadEnvelope>),
}

impl From<RawThread> for ThreadEnvelope {
    fn from(thread: RawThread) -> Self {
        ThreadEnvelope::Record(thread)
    }
}

impl ThreadEnvelope {
    /// Classifies adapter JSON into an envelope.
    ///
    /// Arrays become sequences, objects carrying `"0"` become index-zero
    /// mappings, objects carrying `dataValues` become instances; anything
    /// else is read as a plain record.
    pub fn from_json(value: Value) -> serde_json::Result<Self> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(ThreadEnvelope::from_json)
                .collect::<serde_json::Result<Vec<_>>>()
                .map(ThreadEnvelope::Sequence),
            Value::Object(mut map) if map.contains_key("0") => {
                let inner = map.remove("0").unwrap_or(Value::Null);
                Ok(ThreadEnvelope::IndexZero(Box::new(ThreadEnvelope::from_json(inner)?)))
            }
            Value::Object(map) if map.contains_key("dataValues") => {
                Ok(ThreadEnvelope::Instance(Box::new(DataValues(Value::Object(map)))))
            }
            Value::Null => Ok(ThreadEnvelope::Record(RawThread::default())),
            other => serde_json::from_value(other).map(ThreadEnvelope::Record),
        }
    }
}

/// A JSON instance wrapper whose plain data lives under `dataValues`.
#[derive(Debug, Clone)]
pub struct DataValues(pub Value);

impl Materialize for DataValues {
    fn materialize(&self) -> Option<ThreadEnvelope> {
        let inner = self.0.get("dataValues")?.clone();
        ThreadEnvelope::from_json(inner).ok()
    }
}

/// A comment row joined with its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawComment {
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub date: Option<RawDate>,
    #[serde(default)]
    pub is_delete: bool,
    #[serde(default)]
    pub user: Option<Envelope<Identity>>,
}

/// A reply row joined with its owner.
///
/// Deletion flag and owning comment may each arrive under a snake_case or a
/// camelCase key; both are kept here and reconciled by
/// [`resolve_reply_deleted`] and [`resolve_reply_comment_id`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawReply {
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub date: Option<RawDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_delete: Option<bool>,
    #[serde(default, rename = "isDelete", skip_serializing_if = "Option::is_none")]
    pub is_delete_camel: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<String>,
    #[serde(default, rename = "commentId", skip_serializing_if = "Option::is_none")]
    pub comment_id_camel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Envelope<Identity>>,
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.is_empty())
}

fn nested_username(user: &Option<Envelope<Identity>>) -> Option<&str> {
    user.as_ref().and_then(|u| non_empty(&u.get().username))
}

/// Thread owner: flat `username`, then `user.username`.
pub fn resolve_thread_username(thread: &RawThread) -> Option<String> {
    non_empty(&thread.username)
        .or_else(|| nested_username(&thread.user))
        .map(str::to_string)
}

/// Comment owner: `user.username`.
pub fn resolve_comment_username(comment: &RawComment) -> Option<String> {
    nested_username(&comment.user).map(str::to_string)
}

/// Reply owner: flat `username`, then `user.username`, then nothing.
pub fn resolve_reply_username(reply: &RawReply) -> Option<String> {
    non_empty(&reply.username)
        .or_else(|| nested_username(&reply.user))
        .map(str::to_string)
}

/// Reply deletion flag: `is_delete`, then `isDelete`, then `false`.
pub fn resolve_reply_deleted(reply: &RawReply) -> bool {
    reply.is_delete.or(reply.is_delete_camel).unwrap_or(false)
}

/// Owning comment: `comment_id`, then `commentId`.
pub fn resolve_reply_comment_id(reply: &RawReply) -> Option<String> {
    reply.comment_id.clone().or_else(|| reply.comment_id_camel.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_instants_and_iso_text_identically() {
        let instant = Utc.with_ymd_and_hms(2023, 1, 1, 2, 0, 0).unwrap();
        let a = normalize_date(Some(&RawDate::Instant(instant)));
        let b = normalize_date(Some(&RawDate::from("2023-01-01T02:00:00.000Z")));
        assert_eq!(a.text, "2023-01-01T02:00:00.000Z");
        assert_eq!(a, b);
    }

    #[test]
    fn normalizes_other_textual_forms() {
        let cases = [
            ("2023-01-01", "2023-01-01T00:00:00.000Z"),
            ("2023-01-01 05:30:00", "2023-01-01T05:30:00.000Z"),
            ("2023-01-01T07:00:00+07:00", "2023-01-01T00:00:00.000Z"),
            ("2023-01-01 07:00:00.250+07:00", "2023-01-01T00:00:00.250Z"),
            ("Sun, 01 Jan 2023 00:00:00 +0000", "2023-01-01T00:00:00.000Z"),
        ];
        for (input, expected) in cases {
            assert_eq!(normalize_date(Some(&RawDate::from(input))).text, expected, "{input}");
        }
    }

    #[test]
    fn normalizes_epoch_millis() {
        let date: RawDate = serde_json::from_value(json!(1672531200000_i64)).unwrap();
        assert_eq!(normalize_date(Some(&date)).text, "2023-01-01T00:00:00.000Z");
    }

    #[test]
    fn unparseable_dates_become_invalid_date_text() {
        let bad = normalize_date(Some(&RawDate::from("yesterday-ish")));
        assert_eq!(bad.text, INVALID_DATE);
        assert!(bad.instant.is_none());
        assert_eq!(normalize_date(None).text, INVALID_DATE);
    }

    #[test]
    fn rfc3339_json_strings_deserialize_as_instants() {
        let date: RawDate = serde_json::from_value(json!("2023-01-01T00:00:00.000Z")).unwrap();
        assert!(matches!(date, RawDate::Instant(_)));
        let date: RawDate = serde_json::from_value(json!("2023-01-01")).unwrap();
        assert!(matches!(date, RawDate::Text(_)));
    }

    #[test]
    fn envelope_unwraps_instances_and_plain_records() {
        let wrapped: Envelope<Identity> =
            serde_json::from_value(json!({ "dataValues": { "username": "user3" } })).unwrap();
        let plain: Envelope<Identity> = serde_json::from_value(json!({ "username": "user3" })).unwrap();
        assert!(matches!(wrapped, Envelope::Instance { .. }));
        assert_eq!(wrapped.into_inner(), plain.into_inner());
    }

    #[test]
    fn reply_accepts_both_key_spellings() {
        let snake: RawReply = serde_json::from_value(json!({
            "id": "reply-1", "comment_id": "comment-1", "is_delete": true,
        }))
        .unwrap();
        let camel: RawReply = serde_json::from_value(json!({
            "id": "reply-1", "commentId": "comment-1", "isDelete": true,
        }))
        .unwrap();
        for reply in [&snake, &camel] {
            assert_eq!(resolve_reply_comment_id(reply).as_deref(), Some("comment-1"));
            assert!(resolve_reply_deleted(reply));
        }
    }

    #[test]
    fn snake_case_flag_takes_precedence() {
        let reply = RawReply {
            id: "reply-1".into(),
            is_delete: Some(false),
            is_delete_camel: Some(true),
            ..RawReply::default()
        };
        assert!(!resolve_reply_deleted(&reply));
        let unset = RawReply { id: "reply-2".into(), ..RawReply::default() };
        assert!(!resolve_reply_deleted(&unset));
    }

    #[test]
    fn reply_username_falls_back_to_nested_identity_then_nothing() {
        let mut reply = RawReply {
            id: "reply-1".into(),
            user: Some(Envelope::Instance { data_values: Identity::named("nested") }),
            ..RawReply::default()
        };
        assert_eq!(resolve_reply_username(&reply).as_deref(), Some("nested"));

        reply.username = Some("flat".into());
        assert_eq!(resolve_reply_username(&reply).as_deref(), Some("flat"));

        reply.username = Some(String::new());
        reply.user = None;
        assert_eq!(resolve_reply_username(&reply), None);
    }

    #[test]
    fn classifies_json_envelopes() {
        let record = json!({ "id": "thread-123", "title": "T" });
        assert!(matches!(
            ThreadEnvelope::from_json(record.clone()).unwrap(),
            ThreadEnvelope::Record(_)
        ));
        assert!(matches!(
            ThreadEnvelope::from_json(json!([record.clone()])).unwrap(),
            ThreadEnvelope::Sequence(ref v) if v.len() == 1
        ));
        assert!(matches!(
            ThreadEnvelope::from_json(json!({ "0": record.clone(), "comments": [] })).unwrap(),
            ThreadEnvelope::IndexZero(_)
        ));
        assert!(matches!(
            ThreadEnvelope::from_json(json!({ "dataValues": record })).unwrap(),
            ThreadEnvelope::Instance(_)
        ));
    }

    #[test]
    fn data_values_materialize_to_their_payload() {
        let instance = DataValues(json!({ "dataValues": { "id": "thread-123" } }));
        match instance.materialize() {
            Some(ThreadEnvelope::Record(thread)) => assert_eq!(thread.id.as_deref(), Some("thread-123")),
            other => panic!("unexpected materialization: {other:?}"),
        }
        assert!(DataValues(json!({ "get": "nothing" })).materialize().is_none());
    }
}
