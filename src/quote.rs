//! Quote Submitter: turn the quote form into a `tables/quotes` record.

use std::sync::Arc;

use chrono::Utc;

use crate::api::TableApi;
use crate::config::SiteConfig;
use crate::model::{QuoteForm, QuoteRequest};

pub const SUCCESS_MESSAGE: &str =
    "견적 요청이 성공적으로 접수되었습니다.\n빠른 시일 내에 연락드리겠습니다.";

/// Result of one submission as the user sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted,
    Failed,
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted)
    }

    /// The alert text for this outcome. Failures all share one message that
    /// points to the phone line.
    pub fn message(&self, config: &SiteConfig) -> String {
        match self {
            SubmitOutcome::Accepted => SUCCESS_MESSAGE.to_owned(),
            SubmitOutcome::Failed => failure_message(&config.contact_phone),
        }
    }
}

pub fn failure_message(contact_phone: &str) -> String {
    format!("견적 요청 중 오류가 발생했습니다.\n전화로 문의해 주시기 바랍니다.\n☎ {contact_phone}")
}

pub struct QuoteSubmitter {
    api: Arc<dyn TableApi>,
    config: SiteConfig,
}

impl QuoteSubmitter {
    pub fn new(api: Arc<dyn TableApi>, config: SiteConfig) -> Self {
        Self { api, config }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Send one create request built from `form`.
    ///
    /// On acceptance the form is cleared; on any failure it is left as-is and
    /// the error only reaches the log.
    pub async fn submit(&self, form: &mut QuoteForm) -> SubmitOutcome {
        let request = QuoteRequest::from_form(form, &self.config.initial_status, Utc::now());
        match self.api.create_quote(&request).await {
            Ok(()) => {
                tracing::info!(created_date = %request.created_date, "quote accepted");
                form.clear();
                SubmitOutcome::Accepted
            }
            Err(e) => {
                tracing::error!(error = %e, "quote submission failed");
                SubmitOutcome::Failed
            }
        }
    }
}
