//! HTML fragments for the notice list (`#noticeList`).
//!
//! Markup mirrors the site stylesheet: `notice-item` cards, and a
//! `notice-empty` block for both the empty and the error state.

use chrono::{DateTime, Datelike, FixedOffset, Utc};

/// Shown when the service returns no notices.
pub const EMPTY_STATE_TEXT: &str = "등록된 공지사항이 없습니다.";

/// Shown when the notice list could not be fetched or decoded.
pub const ERROR_STATE_TEXT: &str = "공지사항을 불러오는 중 오류가 발생했습니다.";

/// Badge text for recently added notices.
pub const NEW_BADGE: &str = "NEW";

/// One notice, resolved for display at a specific instant.
#[derive(Debug, Clone, PartialEq)]
pub struct NoticeCard {
    pub title: String,
    pub is_new: bool,
    pub date_label: String,
    pub preview: String,
}

/// Minimal HTML entity escaping for text content and attribute values.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// First `max_chars` characters of `content` followed by `...`.
///
/// Counts Unicode scalar values, so multi-byte text is never cut mid-character.
/// The ellipsis is appended even when nothing was cut.
pub fn preview(content: &str, max_chars: usize) -> String {
    let cut: String = content.chars().take(max_chars).collect();
    format!("{cut}...")
}

/// Korean short date (`2024. 3. 5.`) in the given offset.
pub fn korean_date(at: DateTime<Utc>, offset: &FixedOffset) -> String {
    let local = at.with_timezone(offset);
    format!("{}. {}. {}.", local.year(), local.month(), local.day())
}

fn render_card(card: &NoticeCard, out: &mut String) {
    let title = html_escape(&card.title);
    let badge = if card.is_new {
        format!("<span class=\"notice-badge\">{NEW_BADGE}</span>")
    } else {
        String::new()
    };
    let date = html_escape(&card.date_label);
    let preview = html_escape(&card.preview);
    out.push_str(&format!(
        "<div class=\"notice-item\">\n\
         <div class=\"notice-header\">\n\
         <h3 class=\"notice-title\">\n{title}\n{badge}\n</h3>\n\
         <span class=\"notice-date\">{date}</span>\n\
         </div>\n\
         <p class=\"notice-preview\">{preview}</p>\n\
         </div>\n"
    ));
}

/// Concatenated cards, in the order given.
pub fn render_cards(cards: &[NoticeCard]) -> String {
    let mut html = String::new();
    for card in cards {
        render_card(card, &mut html);
    }
    html
}

fn render_status_block(icon: &str, text: &str) -> String {
    format!(
        "<div class=\"notice-empty\">\n\
         <i class=\"fas {icon}\"></i>\n\
         <p>{text}</p>\n\
         </div>\n"
    )
}

pub fn render_empty() -> String {
    render_status_block("fa-clipboard-list", EMPTY_STATE_TEXT)
}

pub fn render_error() -> String {
    render_status_block("fa-exclamation-circle", ERROR_STATE_TEXT)
}
