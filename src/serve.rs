use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{
    compression::CompressionLayer, services::ServeDir, set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::api::TableApi;
use crate::config::SiteConfig;
use crate::model::QuoteForm;
use crate::notice::NoticeLoader;
use crate::quote::QuoteSubmitter;
use crate::web_assets;

/// Maximum number of consecutive ports to try before giving up.
const MAX_PORT_ATTEMPTS: usize = 100;

/// Shared application state passed to all request handlers via `Arc<AppState>`.
pub struct AppState {
    /// Directory the static site is served from.
    pub serve_root: PathBuf,
    pub loader: NoticeLoader,
    pub submitter: QuoteSubmitter,
    /// Glue script with the contact phone already filled in.
    pub script: String,
}

impl AppState {
    pub fn new(serve_root: PathBuf, api: Arc<dyn TableApi>, config: SiteConfig) -> Self {
        let script = web_assets::script(&config.contact_phone);
        Self {
            serve_root,
            loader: NoticeLoader::new(api.clone(), config.clone()),
            submitter: QuoteSubmitter::new(api, config),
            script,
        }
    }
}

/// Bind the first free port in `start_port..start_port + 100` on `bind_addr`.
///
/// Only `EADDRINUSE` moves on to the next port; any other error is returned.
pub async fn bind_first_free(bind_addr: &str, start_port: u16) -> io::Result<(TcpListener, u16)> {
    for port in (start_port..=u16::MAX).take(MAX_PORT_ATTEMPTS) {
        match TcpListener::bind((bind_addr, port)).await {
            Ok(listener) => return Ok((listener, port)),
            Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
                tracing::debug!(port, "port in use");
            }
            Err(e) => return Err(e),
        }
    }
    Err(io::Error::new(
        io::ErrorKind::AddrInUse,
        format!("no free port among {MAX_PORT_ATTEMPTS} starting at {bind_addr}:{start_port}"),
    ))
}

/// `GET /fragments/notices`: the rendered notice list.
///
/// Always 200; a failed upstream load renders the error-state block instead.
async fn notices_handler(State(state): State<Arc<AppState>>) -> Response {
    let html = state.loader.load_and_render().await;
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
        .header(header::CACHE_CONTROL, "no-store")
        .body(Body::from(html))
        .expect("notices fragment response builder is infallible")
}

#[derive(Debug, Serialize)]
struct QuoteReply {
    ok: bool,
    message: String,
}

/// `POST /api/quotes`: relay one quote form to the table service.
async fn quote_handler(
    State(state): State<Arc<AppState>>,
    Json(mut form): Json<QuoteForm>,
) -> (StatusCode, Json<QuoteReply>) {
    let outcome = state.submitter.submit(&mut form).await;
    let status = if outcome.is_accepted() {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };
    (
        status,
        Json(QuoteReply {
            ok: outcome.is_accepted(),
            message: outcome.message(state.submitter.config()),
        }),
    )
}

async fn script_handler(State(state): State<Arc<AppState>>) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/javascript; charset=utf-8")
        .body(Body::from(state.script.clone()))
        .expect("js asset response builder is infallible")
}

/// Routes for the dynamic endpoints, with the site directory as the fallback.
///
/// Every response carries `X-Content-Type-Options: nosniff`.
pub fn router(state: Arc<AppState>) -> Router {
    let site = ServeDir::new(&state.serve_root);
    Router::new()
        .route("/fragments/notices", get(notices_handler))
        .route("/api/quotes", post(quote_handler))
        .route("/assets/site.js", get(script_handler))
        .fallback_service(site)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the site in `root`, relaying notices and quotes through `api`.
///
/// Binds to `bind_addr` starting at `start_port`, moving up past ports that
/// are in use. Shuts down cleanly on SIGINT.
pub async fn run_serve(
    root: PathBuf,
    bind_addr: String,
    start_port: u16,
    api: Arc<dyn TableApi>,
    config: SiteConfig,
) -> io::Result<()> {
    let state = Arc::new(AppState::new(root, api, config));
    let (listener, bound_port) = bind_first_free(&bind_addr, start_port).await?;

    tracing::info!(
        addr = %bind_addr,
        port = bound_port,
        root = %state.serve_root.display(),
        "listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to install SIGINT handler");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutdown signal");
        })
        .await?;

    tracing::info!("shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::html::{ERROR_STATE_TEXT, NEW_BADGE};
    use crate::model::{NoticePage, QuoteRequest};
    use async_trait::async_trait;
    use axum::http::{Method, Request};
    use std::path::Path;
    use tower::ServiceExt;

    struct StubApi {
        notices: Option<&'static str>,
        accept_quotes: bool,
    }

    #[async_trait]
    impl TableApi for StubApi {
        async fn list_notices(&self, _limit: usize) -> Result<NoticePage> {
            match self.notices {
                Some(json) => Ok(serde_json::from_str(json)?),
                None => Err(Error::Status {
                    status: 500,
                    url: "http://api.test/tables/notices".to_owned(),
                }),
            }
        }

        async fn create_quote(&self, _request: &QuoteRequest) -> Result<()> {
            if self.accept_quotes {
                Ok(())
            } else {
                Err(Error::Status {
                    status: 500,
                    url: "http://api.test/tables/quotes".to_owned(),
                })
            }
        }
    }

    fn site_root() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>대신네트웍스</h1>").unwrap();
        std::fs::create_dir(dir.path().join("css")).unwrap();
        std::fs::write(dir.path().join("css/style.css"), "body { margin: 0 }").unwrap();
        dir
    }

    fn app(root: &Path, api: StubApi) -> Router {
        let config = SiteConfig::default().with_contact_phone(Some("061-555-0100".to_owned()));
        router(Arc::new(AppState::new(root.to_path_buf(), Arc::new(api), config)))
    }

    fn working_api() -> StubApi {
        StubApi {
            notices: Some(r#"{"data":[{"title":"개소 안내","content":"본문","created_at":32503680000000}]}"#),
            accept_quotes: true,
        }
    }

    async fn fetch(app: Router, uri: &str) -> Response {
        app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_text(resp: Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn post_quote(app: Router, json: &str) -> Response {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/quotes")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_owned()))
            .unwrap();
        app.oneshot(req).await.unwrap()
    }

    #[tokio::test]
    async fn notice_fragment_is_html_and_uncached() {
        let root = site_root();
        let resp = fetch(app(root.path(), working_api()), "/fragments/notices").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CACHE_CONTROL], "no-store");
        assert_eq!(resp.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        let html = body_text(resp).await;
        assert!(html.contains("개소 안내"));
        assert!(html.contains(NEW_BADGE));
    }

    #[tokio::test]
    async fn failed_notice_load_is_still_200() {
        let root = site_root();
        let api = StubApi {
            notices: None,
            accept_quotes: true,
        };
        let resp = fetch(app(root.path(), api), "/fragments/notices").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_text(resp).await.contains(ERROR_STATE_TEXT));
    }

    #[tokio::test]
    async fn accepted_quote_replies_ok() {
        let root = site_root();
        let resp = post_quote(
            app(root.path(), working_api()),
            r#"{"company":"A","name":"B","phone":"010-1234-5678"}"#,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let reply: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
        assert_eq!(reply["ok"], true);
    }

    #[tokio::test]
    async fn rejected_quote_is_bad_gateway_with_phone() {
        let root = site_root();
        let api = StubApi {
            notices: None,
            accept_quotes: false,
        };
        let resp = post_quote(app(root.path(), api), r#"{"name":"B"}"#).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(resp.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        let reply: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
        assert_eq!(reply["ok"], false);
        assert!(reply["message"].as_str().unwrap().contains("☎ 061-555-0100"));
    }

    #[tokio::test]
    async fn script_embeds_contact_phone() {
        let root = site_root();
        let resp = fetch(app(root.path(), working_api()), "/assets/site.js").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()[header::CONTENT_TYPE],
            "text/javascript; charset=utf-8"
        );
        assert!(body_text(resp).await.contains(r#""061-555-0100""#));
    }

    #[tokio::test]
    async fn site_root_serves_index_and_assets() {
        let root = site_root();
        let resp = fetch(app(root.path(), working_api()), "/").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert!(body_text(resp).await.contains("대신네트웍스"));

        let resp = fetch(app(root.path(), working_api()), "/css/style.css").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/css"));
    }

    #[tokio::test]
    async fn missing_and_escaping_paths_are_not_found() {
        let root = site_root();
        for uri in ["/missing.html", "/../etc/passwd", "/css/%2e%2e/%2e%2e/etc/passwd"] {
            let resp = fetch(app(root.path(), working_api()), uri).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn unchanged_file_is_not_modified() {
        let root = site_root();
        let resp = fetch(app(root.path(), working_api()), "/css/style.css").await;
        let last_modified = resp.headers()[header::LAST_MODIFIED].clone();

        let req = Request::get("/css/style.css")
            .header(header::IF_MODIFIED_SINCE, last_modified)
            .body(Body::empty())
            .unwrap();
        let resp = app(root.path(), working_api()).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
    }

    #[tokio::test]
    async fn busy_port_moves_to_the_next_one() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();
        let (_next, bound) = bind_first_free("127.0.0.1", port).await.unwrap();
        assert!(bound > port);
    }
}
