//! Preview server: renders pages, serves the site and runs page sessions
//! over a websocket

use anyhow::Result;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        Query, RawQuery, State, WebSocketUpgrade,
    },
    http::{header, HeaderMap, HeaderValue, Request, StatusCode, Uri},
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::{get, post},
    Router,
};
use notify::RecursiveMode;
use notify_debouncer_mini::new_debouncer;
use serde::Deserialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::content::PostIndex;
use crate::context::AppContext;
use crate::filter::{apply_filters, FilterCriteria};
use crate::render::layout::render_page;
use crate::theme::ThemeManager;
use crate::ui::{Document, Effect, Page, UiEvent};
use crate::Blog;

/// Client hint carrying the OS color scheme
const COLOR_SCHEME_HINT: &str = "sec-ch-prefers-color-scheme";

/// Server state
struct ServerState {
    ctx: AppContext,
    base_dir: PathBuf,
    reload_tx: broadcast::Sender<()>,
    live: bool,
}

/// Start the preview server
pub async fn start(blog: &Blog, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    let (reload_tx, _) = broadcast::channel::<()>(16);

    let state = Arc::new(ServerState {
        ctx: blog.context(),
        base_dir: blog.base_dir.clone(),
        reload_tx: reload_tx.clone(),
        live: true,
    });

    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    if watch {
        println!("Live reload enabled. Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if watch {
        let paths = vec![blog.index_path.clone(), blog.pages_dir.clone()];
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_reload(paths, reload_tx) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/post.html", get(post_handler))
        .route("/api/posts", get(api_posts_handler))
        .route("/theme/toggle", post(theme_toggle_handler))
        .route("/__events", get(events_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Watch the index and the pages directory and tell sessions to reload
fn watch_and_reload(paths: Vec<PathBuf>, reload_tx: broadcast::Sender<()>) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    // Create debouncer to avoid reloading on every write of a save
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    for path in &paths {
        if !path.exists() {
            continue;
        }
        let mode = if path.is_dir() {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        debouncer.watcher().watch(path, mode)?;
        tracing::debug!("Watching: {:?}", path);
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant: Vec<_> = events
                    .iter()
                    .filter(|e| {
                        let path_str = e.path.to_string_lossy();
                        !path_str.contains(".DS_Store") && !path_str.ends_with('~')
                    })
                    .collect();

                if relevant.is_empty() {
                    continue;
                }

                for event in &relevant {
                    tracing::info!("File changed: {}", event.path.display());
                }
                // No subscribers just means no page is open
                let _ = reload_tx.send(());
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// OS color scheme from the client hint, if the browser sent one
fn os_prefers_dark(headers: &HeaderMap) -> Option<bool> {
    let value = headers.get(COLOR_SCHEME_HINT)?.to_str().ok()?;
    match value.trim().trim_matches('"') {
        "dark" => Some(true),
        "light" => Some(false),
        _ => None,
    }
}

fn page_response(html: String) -> Response {
    let mut response = Html(html).into_response();
    let headers = response.headers_mut();
    headers.insert("accept-ch", HeaderValue::from_static("Sec-CH-Prefers-Color-Scheme"));
    headers.insert(header::VARY, HeaderValue::from_static("Sec-CH-Prefers-Color-Scheme"));
    response
}

async fn index_handler(
    State(state): State<Arc<ServerState>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let criteria = FilterCriteria::from_query(query.as_deref().unwrap_or_default());
    let (page, _searches) =
        Page::index(state.ctx.clone(), criteria, os_prefers_dark(&headers)).await;
    page_response(render_page(page.document(), &state.ctx.config, state.live))
}

#[derive(Debug, Deserialize)]
struct PostQuery {
    file: Option<String>,
}

async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<PostQuery>,
    headers: HeaderMap,
) -> Response {
    let page = Page::post(
        state.ctx.clone(),
        query.file.as_deref(),
        os_prefers_dark(&headers),
    )
    .await;
    page_response(render_page(page.document(), &state.ctx.config, state.live))
}

async fn api_posts_handler(
    State(state): State<Arc<ServerState>>,
    RawQuery(query): RawQuery,
) -> Response {
    let ctx = &state.ctx;
    match PostIndex::load(&*ctx.source, &ctx.config.index_file).await {
        Ok(index) => {
            let criteria = FilterCriteria::from_query(query.as_deref().unwrap_or_default());
            Json(apply_filters(index.posts(), &criteria)).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to load post index: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "error": ctx.config.load_error_message })),
            )
                .into_response()
        }
    }
}

/// Non-script fallback for the theme button
async fn theme_toggle_handler(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> Redirect {
    let ctx = &state.ctx;
    let mut themes = ThemeManager::new(
        ctx.storage.clone(),
        &ctx.config.theme,
        os_prefers_dark(&headers),
        None,
    );
    themes.toggle(&mut Document::headless());
    tracing::debug!("Theme switched to {}", themes.current());

    let back = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .map(referer_path)
        .unwrap_or_else(|| "/".to_string());
    Redirect::to(&back)
}

/// Path and query of a referer URL, so redirects stay on this host
fn referer_path(referer: &str) -> String {
    let Ok(uri) = referer.parse::<Uri>() else {
        return "/".to_string();
    };
    let path = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    // `//host` and `/\host` are protocol-relative to browsers
    if !path.starts_with('/') || path.starts_with("//") || path.starts_with("/\\") {
        return "/".to_string();
    }
    path.to_string()
}

/// Which page a websocket session drives
#[derive(Debug, Clone, PartialEq)]
enum SessionKind {
    Index(FilterCriteria),
    Post(Option<String>),
}

#[derive(Debug, Clone, PartialEq)]
struct SessionParams {
    kind: SessionKind,
    os_prefers_dark: Option<bool>,
}

impl SessionParams {
    fn from_query(params: &HashMap<String, String>, raw: &str) -> Self {
        let kind = match params.get("page").map(String::as_str) {
            Some("post") => SessionKind::Post(params.get("file").cloned()),
            _ => SessionKind::Index(FilterCriteria::from_query(raw)),
        };
        let os_prefers_dark = params.get("dark").map(|v| v == "1" || v == "true");
        Self {
            kind,
            os_prefers_dark,
        }
    }
}

async fn events_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
    Query(params): Query<HashMap<String, String>>,
    RawQuery(raw): RawQuery,
) -> impl IntoResponse {
    let params = SessionParams::from_query(&params, raw.as_deref().unwrap_or_default());
    let reload_rx = state.reload_tx.subscribe();
    let ctx = state.ctx.clone();
    ws.on_upgrade(move |socket| run_session(socket, ctx, params, reload_rx))
}

/// One page session: events in, effects out, one at a time
async fn run_session(
    mut socket: WebSocket,
    ctx: AppContext,
    params: SessionParams,
    mut reload_rx: broadcast::Receiver<()>,
) {
    tracing::debug!("Session opened: {:?}", params.kind);

    let (mut page, mut searches) = match params.kind {
        SessionKind::Index(criteria) => {
            let (page, searches) = Page::index(ctx, criteria, params.os_prefers_dark).await;
            (page, Some(searches))
        }
        SessionKind::Post(file) => (
            Page::post(ctx, file.as_deref(), params.os_prefers_dark).await,
            None,
        ),
    };

    let effects = page.theme_effects();
    if send_effects(&mut socket, &effects).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => match serde_json::from_str::<UiEvent>(&text) {
                        Ok(event) => {
                            let effects = page.handle(event);
                            if send_effects(&mut socket, &effects).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => tracing::debug!("Ignoring malformed event: {}", e),
                    },
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!("Session socket error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }
            Some(term) = next_search(&mut searches) => {
                let effects = page.commit_search(&term);
                if send_effects(&mut socket, &effects).await.is_err() {
                    break;
                }
            }
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if send_effects(&mut socket, &[Effect::Reload]).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
        }
    }

    tracing::debug!("Session closed");
}

/// Next debounced search term; never resolves on pages without a search box
async fn next_search(searches: &mut Option<mpsc::UnboundedReceiver<String>>) -> Option<String> {
    match searches {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn send_effects(socket: &mut WebSocket, effects: &[Effect]) -> Result<()> {
    if effects.is_empty() {
        return Ok(());
    }
    let json = serde_json::to_string(effects)?;
    socket.send(Message::Text(json)).await?;
    Ok(())
}

/// Everything else is served straight from the site directory
async fn fallback_handler(State(state): State<Arc<ServerState>>, request: Request<Body>) -> Response {
    let mut service = ServeDir::new(&state.base_dir).append_index_html_on_directories(true);
    match service.try_call(request).await {
        Ok(response) => response.into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_scheme_hint() {
        let mut headers = HeaderMap::new();
        assert_eq!(os_prefers_dark(&headers), None);
        headers.insert(COLOR_SCHEME_HINT, HeaderValue::from_static("\"dark\""));
        assert_eq!(os_prefers_dark(&headers), Some(true));
        headers.insert(COLOR_SCHEME_HINT, HeaderValue::from_static("light"));
        assert_eq!(os_prefers_dark(&headers), Some(false));
    }

    #[test]
    fn test_referer_path() {
        assert_eq!(referer_path("http://localhost:4000/post.html?file=a.md"), "/post.html?file=a.md");
        assert_eq!(referer_path("http://localhost:4000"), "/");
        assert_eq!(referer_path("garbage"), "/");
        assert_eq!(referer_path("https://evil.example//evil.example/x"), "/");
        assert_eq!(referer_path("http://localhost:4000/?tag=rust"), "/?tag=rust");
    }

    #[test]
    fn test_session_params() {
        let raw = "tag=rust&page=index&dark=1";
        let params: HashMap<String, String> = [
            ("tag".to_string(), "rust".to_string()),
            ("page".to_string(), "index".to_string()),
            ("dark".to_string(), "1".to_string()),
        ]
        .into();
        let session = SessionParams::from_query(&params, raw);
        assert_eq!(session.os_prefers_dark, Some(true));
        match session.kind {
            SessionKind::Index(criteria) => assert!(criteria.has_tag("rust")),
            other => panic!("unexpected {:?}", other),
        }

        let params: HashMap<String, String> = [
            ("page".to_string(), "post".to_string()),
            ("file".to_string(), "a.md".to_string()),
        ]
        .into();
        let session = SessionParams::from_query(&params, "page=post&file=a.md");
        assert_eq!(session.kind, SessionKind::Post(Some("a.md".to_string())));
        assert_eq!(session.os_prefers_dark, None);
    }
}
