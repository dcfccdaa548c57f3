//! Client for the table-style data service (`tables/notices`, `tables/quotes`).

use async_trait::async_trait;
use reqwest::{header, Client, Url};

use crate::error::{Error, Result};
use crate::model::{NoticePage, QuoteRequest};

/// List/create operations the site needs from the table service.
#[async_trait]
pub trait TableApi: Send + Sync {
    /// Fetch up to `limit` notices, newest first.
    async fn list_notices(&self, limit: usize) -> Result<NoticePage>;

    /// Create one quote record. `Ok` means the service answered 2xx.
    async fn create_quote(&self, request: &QuoteRequest) -> Result<()>;
}

/// [`TableApi`] over HTTP with reqwest.
pub struct HttpTableApi {
    client: Client,
    base: Url,
}

impl HttpTableApi {
    /// Build a client rooted at `base` (e.g. `https://example.com/` or
    /// `http://127.0.0.1:8080/site/`). A trailing slash is added if missing so
    /// that `tables/...` resolves beneath the given path.
    pub fn new(base: &str) -> Result<Self> {
        let normalized = if base.ends_with('/') {
            base.to_owned()
        } else {
            format!("{base}/")
        };
        let base = Url::parse(&normalized).map_err(|e| Error::InvalidBaseUrl {
            url: base.to_owned(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(Error::InvalidBaseUrl {
                url: normalized,
                reason: "URL cannot be used as a base".to_owned(),
            });
        }
        Ok(Self {
            client: Client::new(),
            base,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base.join(path).map_err(|e| Error::InvalidBaseUrl {
            url: self.base.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Path and query of the notice list request.
pub fn notices_path(limit: usize) -> String {
    format!("tables/notices?limit={limit}&sort=-created_at")
}

pub const QUOTES_PATH: &str = "tables/quotes";

#[async_trait]
impl TableApi for HttpTableApi {
    async fn list_notices(&self, limit: usize) -> Result<NoticePage> {
        let url = self.endpoint(&notices_path(limit))?;
        tracing::debug!(%url, "notices fetch");
        let resp = self.client.get(url.clone()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn create_quote(&self, request: &QuoteRequest) -> Result<()> {
        let url = self.endpoint(QUOTES_PATH)?;
        tracing::debug!(%url, "quote create");
        let resp = self
            .client
            .post(url.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(())
    }
}
