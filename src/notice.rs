//! Notice Loader: fetch the newest notices and render them as preview cards.
//!
//! Loading and rendering are split so that the `NEW` badge is decided with the
//! clock at render time, not at fetch time.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::api::TableApi;
use crate::config::SiteConfig;
use crate::html::{self, NoticeCard};
use crate::model::Notice;

const MILLIS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Outcome of one load. Failures are already folded into `Unavailable`.
#[derive(Debug, Clone, PartialEq)]
pub enum NoticeFeed {
    Notices(Vec<Notice>),
    Empty,
    Unavailable,
}

/// `true` when `created_at` is at most `days` before `now` (inclusive).
///
/// Future timestamps count as recent.
pub fn is_within_days(created_at: DateTime<Utc>, now: DateTime<Utc>, days: f64) -> bool {
    let diff_ms = (now - created_at).num_milliseconds() as f64;
    diff_ms / MILLIS_PER_DAY <= days
}

pub struct NoticeLoader {
    api: Arc<dyn TableApi>,
    config: SiteConfig,
}

impl NoticeLoader {
    pub fn new(api: Arc<dyn TableApi>, config: SiteConfig) -> Self {
        Self { api, config }
    }

    /// Issue one list request. Never fails: errors are logged and become
    /// [`NoticeFeed::Unavailable`].
    pub async fn load(&self) -> NoticeFeed {
        match self.api.list_notices(self.config.notice_limit).await {
            Ok(page) if page.data.is_empty() => {
                tracing::info!(count = 0, "notices");
                NoticeFeed::Empty
            }
            Ok(page) => {
                tracing::info!(count = page.data.len(), "notices");
                NoticeFeed::Notices(page.data)
            }
            Err(e) => {
                tracing::error!(error = %e, "notices load failed");
                NoticeFeed::Unavailable
            }
        }
    }

    /// A notice without a readable `created_at` gets no badge and no date.
    pub fn card(&self, notice: &Notice, now: DateTime<Utc>) -> NoticeCard {
        let offset = &self.config.display_offset;
        let created = notice.created_at.map(|at| at.resolve(offset));
        NoticeCard {
            title: notice.title.clone(),
            is_new: created
                .is_some_and(|at| is_within_days(at, now, self.config.new_badge_days)),
            date_label: created
                .map(|at| html::korean_date(at, offset))
                .unwrap_or_default(),
            preview: html::preview(&notice.content, self.config.preview_chars),
        }
    }

    /// Render `feed` as the inner HTML of the notice list, judged at `now`.
    pub fn render(&self, feed: &NoticeFeed, now: DateTime<Utc>) -> String {
        match feed {
            NoticeFeed::Notices(notices) => {
                let cards: Vec<NoticeCard> = notices.iter().map(|n| self.card(n, now)).collect();
                html::render_cards(&cards)
            }
            NoticeFeed::Empty => html::render_empty(),
            NoticeFeed::Unavailable => html::render_error(),
        }
    }

    /// Load and render against the current wall clock.
    pub async fn load_and_render(&self) -> String {
        let feed = self.load().await;
        self.render(&feed, Utc::now())
    }
}
