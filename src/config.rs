//! Site-wide settings for the notice feed and the quote form.
//!
//! Every value has a constant default; the CLI only overrides the ones an
//! operator plausibly needs to change.

use chrono::FixedOffset;

/// Number of notices requested per load.
pub const NOTICE_LIMIT: usize = 10;

/// A notice at most this many days old gets the `NEW` badge.
pub const NEW_BADGE_DAYS: f64 = 7.0;

/// Length of the content preview, in characters.
pub const PREVIEW_CHARS: usize = 100;

/// Workflow status attached to every freshly created quote request.
pub const INITIAL_QUOTE_STATUS: &str = "접수";

/// Phone number shown when a quote submission fails.
pub const CONTACT_PHONE: &str = "061-XXX-XXXX";

/// Offset used for the localized notice dates (KST).
pub const DISPLAY_UTC_OFFSET_SECS: i32 = 9 * 60 * 60;

#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub notice_limit: usize,
    pub new_badge_days: f64,
    pub preview_chars: usize,
    pub initial_status: String,
    pub contact_phone: String,
    pub display_offset: FixedOffset,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            notice_limit: NOTICE_LIMIT,
            new_badge_days: NEW_BADGE_DAYS,
            preview_chars: PREVIEW_CHARS,
            initial_status: INITIAL_QUOTE_STATUS.to_owned(),
            contact_phone: CONTACT_PHONE.to_owned(),
            display_offset: kst(),
        }
    }
}

impl SiteConfig {
    /// Apply an hour offset given on the command line.
    ///
    /// Out-of-range values (beyond ±23h) fall back to the current offset.
    pub fn with_utc_offset_hours(mut self, hours: i32) -> Self {
        if let Some(offset) = FixedOffset::east_opt(hours * 60 * 60) {
            self.display_offset = offset;
        }
        self
    }

    pub fn with_contact_phone(mut self, phone: Option<String>) -> Self {
        if let Some(phone) = phone {
            self.contact_phone = phone;
        }
        self
    }
}

fn kst() -> FixedOffset {
    FixedOffset::east_opt(DISPLAY_UTC_OFFSET_SECS).expect("+09:00 is within FixedOffset range")
}
