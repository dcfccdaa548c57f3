//! Records exchanged with the table API.
//!
//! Both shapes are owned by the remote service; this module only mirrors them.

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc,
};
use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize};

/// A short announcement shown in the notice list. Read-only here.
///
/// Only `content` is required. A record with a missing title or an unreadable
/// `created_at` still renders, just without a title, date or badge.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Notice {
    #[serde(default)]
    pub title: String,
    pub content: String,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<NoticeTime>,
}

/// When a notice was created, as the service reported it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeTime {
    /// An absolute instant (epoch millis, or a string carrying an offset).
    Instant(DateTime<Utc>),
    /// Wall-clock time with no offset; read in the site's display offset.
    Local(NaiveDateTime),
}

impl NoticeTime {
    pub fn resolve(&self, offset: &FixedOffset) -> DateTime<Utc> {
        match self {
            NoticeTime::Instant(at) => *at,
            NoticeTime::Local(naive) => naive
                .and_local_timezone(*offset)
                .single()
                .map(|at| at.with_timezone(&Utc))
                .unwrap_or_else(|| Utc.from_utc_datetime(naive)),
        }
    }
}

/// Envelope returned by `GET tables/notices`.
///
/// A missing or `null` `data` field is treated as an empty list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoticePage {
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub data: Vec<Notice>,
}

/// The six user-editable fields of the quote form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteForm {
    pub company: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub service: String,
    pub message: String,
}

impl QuoteForm {
    /// Reset every field to empty, like `HTMLFormElement.reset()` on a blank form.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Body of `POST tables/quotes`.
///
/// `status` and `created_date` are stamped by [`QuoteRequest::from_form`] and
/// have no path from user input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteRequest {
    pub company: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub service: String,
    pub message: String,
    pub status: String,
    pub created_date: String,
}

impl QuoteRequest {
    pub fn from_form(form: &QuoteForm, status: &str, submitted_at: DateTime<Utc>) -> Self {
        Self {
            company: form.company.clone(),
            name: form.name.clone(),
            phone: form.phone.clone(),
            email: form.email.clone(),
            service: form.service.clone(),
            message: form.message.clone(),
            status: status.to_owned(),
            created_date: submitted_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    FractionalMillis(f64),
    Text(String),
    Other(IgnoredAny),
}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

fn parse_timestamp_text(s: &str) -> Option<NoticeTime> {
    let s = s.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(s) {
        return Some(NoticeTime::Instant(at.with_timezone(&Utc)));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(NoticeTime::Local(naive));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(NoticeTime::Local)
}

/// Epoch milliseconds (what the table service emits), RFC 3339, naive ISO
/// date-times or bare dates. Anything else, `null` included, becomes `None`.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<NoticeTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = match Option::<RawTimestamp>::deserialize(deserializer)? {
        Some(RawTimestamp::Millis(ms)) => {
            Utc.timestamp_millis_opt(ms).single().map(NoticeTime::Instant)
        }
        Some(RawTimestamp::FractionalMillis(ms)) if ms.is_finite() => Utc
            .timestamp_millis_opt(ms.trunc() as i64)
            .single()
            .map(NoticeTime::Instant),
        Some(RawTimestamp::Text(s)) => parse_timestamp_text(&s),
        Some(RawTimestamp::FractionalMillis(_)) | Some(RawTimestamp::Other(_)) | None => None,
    };
    Ok(parsed)
}

fn deserialize_null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Notice>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Notice>>::deserialize(deserializer)?.unwrap_or_default())
}
