use axum::{
    extract::{Path, RawQuery, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::get,
    Router,
};
use futures_util::StreamExt;
use reqwest::redirect::Policy;
use serde::Serialize;
use std::{
    cmp::Ordering,
    sync::atomic::{AtomicU64, Ordering as AtomicOrdering},
    sync::Arc,
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};
use tokio::sync::RwLock;
use tower_http::services::{ServeDir, ServeFile};
use url::Url;

use crate::request_cache::{request_key, ResponseCache};

const DEFAULT_CONTENT_CACHE_TTL_SECONDS: u64 = 300;
const DEFAULT_CONTENT_CACHE_MAX_ENTRIES: usize = 256;
const DEFAULT_CONTENT_RESPONSE_MAX_BYTES: usize = 512 * 1024;
const DEFAULT_CONTENT_REQUEST_TIMEOUT_MS: u64 = 6_000;
const DEFAULT_CONTENT_CONNECT_TIMEOUT_MS: u64 = 3_000;
const DEFAULT_CONTENT_MAX_REDIRECTS: usize = 4;
const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;

const CONTENT_CACHE_TTL_SECONDS_BOUNDS: (u64, u64) = (1, 86_400);
const CONTENT_CACHE_MAX_ENTRIES_BOUNDS: (usize, usize) = (1, 10_000);
const CONTENT_RESPONSE_MAX_BYTES_BOUNDS: (usize, usize) = (1_024, 10 * 1024 * 1024);
const CONTENT_REQUEST_TIMEOUT_MS_BOUNDS: (u64, u64) = (100, 120_000);
const CONTENT_CONNECT_TIMEOUT_MS_BOUNDS: (u64, u64) = (100, 30_000);
const CONTENT_MAX_REDIRECTS_BOUNDS: (usize, usize) = (1, 10);

const USER_AGENT: &str = "atelier-content-proxy/1.0";
const REQUEST_ID_HEADER: &str = "x-request-id";

static REQUEST_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, PartialEq, Eq)]
enum LogLevel {
    Debug,
    Info,
}

impl PartialOrd for LogLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LogLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        fn rank(level: LogLevel) -> u8 {
            match level {
                LogLevel::Debug => 0,
                LogLevel::Info => 1,
            }
        }

        rank(*self).cmp(&rank(*other))
    }
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
        }
    }
}

struct RuntimeConfig {
    upstream_base: Option<Url>,
    cache_ttl_seconds: u64,
    cache_max_entries: usize,
    response_max_bytes: usize,
    request_timeout: Duration,
    connect_timeout: Duration,
    max_redirects: usize,
    log_level: LogLevel,
}

impl RuntimeConfig {
    fn from_env() -> Self {
        let upstream_base = parse_env_http_url("CONTENT_API_BASE_URL").map(normalize_base_url);
        let cache_ttl_seconds = parse_env_u64_with_bounds(
            "CONTENT_CACHE_TTL_SECONDS",
            DEFAULT_CONTENT_CACHE_TTL_SECONDS,
            CONTENT_CACHE_TTL_SECONDS_BOUNDS,
        );
        let cache_max_entries = parse_env_usize_with_bounds(
            "CONTENT_CACHE_MAX_ENTRIES",
            DEFAULT_CONTENT_CACHE_MAX_ENTRIES,
            CONTENT_CACHE_MAX_ENTRIES_BOUNDS,
        );
        let response_max_bytes = parse_env_usize_with_bounds(
            "CONTENT_RESPONSE_MAX_BYTES",
            DEFAULT_CONTENT_RESPONSE_MAX_BYTES,
            CONTENT_RESPONSE_MAX_BYTES_BOUNDS,
        );
        let request_timeout_ms = parse_env_u64_with_bounds(
            "CONTENT_REQUEST_TIMEOUT_MS",
            DEFAULT_CONTENT_REQUEST_TIMEOUT_MS,
            CONTENT_REQUEST_TIMEOUT_MS_BOUNDS,
        );
        let connect_timeout_ms = parse_env_u64_with_bounds(
            "CONTENT_CONNECT_TIMEOUT_MS",
            DEFAULT_CONTENT_CONNECT_TIMEOUT_MS,
            CONTENT_CONNECT_TIMEOUT_MS_BOUNDS,
        );
        let max_redirects = parse_env_usize_with_bounds(
            "CONTENT_MAX_REDIRECTS",
            DEFAULT_CONTENT_MAX_REDIRECTS,
            CONTENT_MAX_REDIRECTS_BOUNDS,
        );
        let log_level = parse_log_level("LOG_LEVEL", DEFAULT_LOG_LEVEL);

        Self {
            upstream_base,
            cache_ttl_seconds,
            cache_max_entries,
            response_max_bytes,
            request_timeout: Duration::from_millis(request_timeout_ms),
            connect_timeout: Duration::from_millis(connect_timeout_ms),
            max_redirects,
            log_level,
        }
    }

    fn cache_ttl_ms(&self) -> f64 {
        (self.cache_ttl_seconds as f64) * 1_000.0
    }
}

#[derive(Clone)]
struct AppState {
    cache: Arc<RwLock<ResponseCache>>,
    client: reqwest::Client,
    config: Arc<RuntimeConfig>,
}

#[derive(Serialize)]
struct ErrorPayload {
    ok: bool,
    error: String,
}

fn error_payload_body(message: &str) -> String {
    let payload = ErrorPayload {
        ok: false,
        error: message.to_string(),
    };

    serde_json::to_string(&payload)
        .unwrap_or_else(|_| format!("{{\"ok\":false,\"error\":\"{message}\"}}"))
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let port = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);
    let bind_address = format!("0.0.0.0:{port}");
    let config = Arc::new(RuntimeConfig::from_env());

    let client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .connect_timeout(config.connect_timeout)
        .redirect(Policy::limited(config.max_redirects))
        .user_agent(USER_AGENT)
        .build()?;

    let state = AppState {
        cache: Arc::new(RwLock::new(ResponseCache::new(config.cache_max_entries))),
        client,
        config: config.clone(),
    };

    let static_service = ServeDir::new("dist").not_found_service(ServeFile::new("dist/index.html"));

    let app = Router::new()
        .route("/api/content/{*path}", get(get_content))
        .fallback_service(static_service)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    log_event(
        &config,
        LogLevel::Info,
        "server_started",
        serde_json::json!({
            "port": port,
            "upstream_configured": config.upstream_base.is_some(),
        }),
    );
    axum::serve(listener, app).await?;
    Ok(())
}

async fn get_content(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Path(content_path): Path<String>,
    RawQuery(query): RawQuery,
) -> axum::response::Response {
    let request_started_at = Instant::now();
    let request_id = resolve_request_id(&headers);

    log_event(
        &state.config,
        LogLevel::Info,
        "content_request_start",
        serde_json::json!({
            "request_id": request_id.as_str(),
            "method": method.as_str(),
            "path": uri.path(),
        }),
    );

    let Some(upstream_base) = state.config.upstream_base.as_ref() else {
        log_event(
            &state.config,
            LogLevel::Info,
            "content_request_failed",
            serde_json::json!({
                "request_id": request_id.as_str(),
                "error_class": "config_missing",
                "message": "content upstream is not configured",
                "duration_ms": request_started_at.elapsed().as_millis(),
            }),
        );
        return json_response(
            StatusCode::SERVICE_UNAVAILABLE,
            error_payload_body("content upstream is not configured"),
            cache_control("no-store"),
            &request_id,
        );
    };

    let Ok(upstream_url) = upstream_url_for(upstream_base, &content_path, query.as_deref()) else {
        log_event(
            &state.config,
            LogLevel::Info,
            "content_request_failed",
            serde_json::json!({
                "request_id": request_id.as_str(),
                "error_class": "invalid_path",
                "message": "invalid content path",
                "duration_ms": request_started_at.elapsed().as_millis(),
            }),
        );
        return json_response(
            StatusCode::BAD_REQUEST,
            error_payload_body("invalid content path"),
            cache_control("no-store"),
            &request_id,
        );
    };

    let key = request_key("GET", upstream_url.as_str(), &[], None);

    let cache_hit = state.cache.write().await.read(&key, now_unix_millis_f64());
    log_event(
        &state.config,
        LogLevel::Debug,
        "content_cache_decision",
        serde_json::json!({
            "request_id": request_id.as_str(),
            "path": uri.path(),
            "memory_cache": if cache_hit.is_some() { "hit" } else { "miss" },
        }),
    );

    if let Some(body) = cache_hit {
        log_event(
            &state.config,
            LogLevel::Info,
            "content_request_complete",
            serde_json::json!({
                "request_id": request_id.as_str(),
                "status": StatusCode::OK.as_u16(),
                "duration_ms": request_started_at.elapsed().as_millis(),
                "cache": "memory_hit",
            }),
        );
        return json_response(
            StatusCode::OK,
            body,
            cache_control(&format!("public, max-age={}", state.config.cache_ttl_seconds)),
            &request_id,
        );
    }

    let upstream_response = match state.client.get(upstream_url.clone()).send().await {
        Ok(response) => response,
        Err(_) => {
            log_event(
                &state.config,
                LogLevel::Info,
                "content_request_failed",
                serde_json::json!({
                    "request_id": request_id.as_str(),
                    "error_class": "upstream_unreachable",
                    "message": "failed to reach content upstream",
                    "duration_ms": request_started_at.elapsed().as_millis(),
                }),
            );
            return json_response(
                StatusCode::BAD_GATEWAY,
                error_payload_body("failed to reach content upstream"),
                cache_control("no-store"),
                &request_id,
            );
        }
    };

    let upstream_status = upstream_response.status();
    let body = match read_limited_body(upstream_response, state.config.response_max_bytes).await {
        Ok(body) => body,
        Err(message) => {
            log_event(
                &state.config,
                LogLevel::Info,
                "content_request_failed",
                serde_json::json!({
                    "request_id": request_id.as_str(),
                    "error_class": "upstream_body",
                    "message": message,
                    "duration_ms": request_started_at.elapsed().as_millis(),
                }),
            );
            return json_response(
                StatusCode::BAD_GATEWAY,
                error_payload_body(message),
                cache_control("no-store"),
                &request_id,
            );
        }
    };

    if !upstream_status.is_success() {
        // Failures pass through uncached; the client extracts its own message.
        log_event(
            &state.config,
            LogLevel::Info,
            "content_request_complete",
            serde_json::json!({
                "request_id": request_id.as_str(),
                "status": upstream_status.as_u16(),
                "duration_ms": request_started_at.elapsed().as_millis(),
                "cache": "upstream_error",
            }),
        );
        let status = StatusCode::from_u16(upstream_status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        return json_response(status, body, cache_control("no-store"), &request_id);
    }

    state
        .cache
        .write()
        .await
        .write(key, body.clone(), now_unix_millis_f64(), state.config.cache_ttl_ms());

    log_event(
        &state.config,
        LogLevel::Info,
        "content_request_complete",
        serde_json::json!({
            "request_id": request_id.as_str(),
            "status": StatusCode::OK.as_u16(),
            "duration_ms": request_started_at.elapsed().as_millis(),
            "cache": "memory_miss",
        }),
    );

    json_response(
        StatusCode::OK,
        body,
        cache_control(&format!("public, max-age={}", state.config.cache_ttl_seconds)),
        &request_id,
    )
}

fn json_response(
    status: StatusCode,
    body: String,
    cache_control: HeaderValue,
    request_id: &str,
) -> axum::response::Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=utf-8"),
    );
    headers.insert(header::CACHE_CONTROL, cache_control);
    headers.insert(header::VARY, HeaderValue::from_static("Accept-Encoding"));
    if let Ok(request_id_header) = HeaderValue::from_str(request_id) {
        headers.insert(REQUEST_ID_HEADER, request_id_header);
    }
    (status, headers, body).into_response()
}

fn cache_control(value: &str) -> HeaderValue {
    HeaderValue::from_str(value).unwrap_or_else(|_| HeaderValue::from_static("no-store"))
}

fn normalize_base_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Join a request path and query onto the upstream base. The result must
/// stay under the base path.
fn upstream_url_for(base: &Url, content_path: &str, query: Option<&str>) -> Result<Url, ()> {
    let trimmed = content_path.trim_start_matches('/');
    let mut url = base.join(trimmed).map_err(|_| ())?;

    if !url.path().starts_with(base.path()) {
        return Err(());
    }

    url.set_query(query);
    Ok(url)
}

fn parse_env_u64_with_bounds(name: &str, default: u64, bounds: (u64, u64)) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}

fn parse_env_usize_with_bounds(name: &str, default: usize, bounds: (usize, usize)) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|value| (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}

fn parse_env_non_empty_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_env_http_url(name: &str) -> Option<Url> {
    let value = parse_env_non_empty_string(name)?;
    let parsed = Url::parse(&value).ok()?;

    if parsed.scheme() == "http" || parsed.scheme() == "https" {
        Some(parsed)
    } else {
        None
    }
}

fn parse_log_level(name: &str, default: LogLevel) -> LogLevel {
    match parse_env_non_empty_string(name)
        .unwrap_or_else(|| default.as_str().to_string())
        .to_ascii_lowercase()
        .as_str()
    {
        "debug" => LogLevel::Debug,
        "info" => LogLevel::Info,
        _ => default,
    }
}

fn now_unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_millis())
        .unwrap_or(0)
}

fn now_unix_millis_f64() -> f64 {
    now_unix_millis() as f64
}

fn now_unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_secs())
        .unwrap_or(0)
}

fn generate_request_id() -> String {
    let counter = REQUEST_ID_COUNTER.fetch_add(1, AtomicOrdering::Relaxed);
    format!("req-{}-{counter}", now_unix_millis())
}

fn resolve_request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|raw| raw.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
        .unwrap_or_else(generate_request_id)
}

fn log_event(config: &RuntimeConfig, level: LogLevel, event: &str, fields: serde_json::Value) {
    if level < config.log_level {
        return;
    }

    let mut payload = serde_json::Map::new();
    payload.insert(
        "ts".to_string(),
        serde_json::Value::Number(serde_json::Number::from(now_unix_seconds())),
    );
    payload.insert(
        "level".to_string(),
        serde_json::Value::String(level.as_str().to_string()),
    );
    payload.insert(
        "event".to_string(),
        serde_json::Value::String(event.to_string()),
    );

    if let serde_json::Value::Object(extra) = fields {
        for (key, value) in extra {
            payload.insert(key, value);
        }
    }

    println!("{}", serde_json::Value::Object(payload));
}

fn append_capped(body: &mut Vec<u8>, chunk: &[u8], max_bytes: usize) -> Result<(), &'static str> {
    if body.len() + chunk.len() > max_bytes {
        return Err("upstream response too large");
    }

    body.extend_from_slice(chunk);
    Ok(())
}

async fn read_limited_body(
    response: reqwest::Response,
    max_bytes: usize,
) -> Result<String, &'static str> {
    let mut stream = response.bytes_stream();
    let mut body: Vec<u8> = Vec::with_capacity(8192);

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|_| "failed reading upstream body")?;
        append_capped(&mut body, &chunk, max_bytes)?;
    }

    Ok(String::from_utf8_lossy(&body).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request_cache::error_message_from_body;

    fn cms_base() -> Url {
        normalize_base_url(Url::parse("https://cms.example.com/wp-json/wp/v2").expect("valid URL"))
    }

    #[test]
    fn base_url_is_normalized_with_trailing_slash() {
        assert_eq!(cms_base().path(), "/wp-json/wp/v2/");
    }

    #[test]
    fn upstream_url_joins_path_and_forwards_query() {
        let url = upstream_url_for(&cms_base(), "posts", Some("per_page=6&_embed=1"))
            .expect("path should join");

        assert_eq!(
            url.as_str(),
            "https://cms.example.com/wp-json/wp/v2/posts?per_page=6&_embed=1"
        );
    }

    #[test]
    fn upstream_url_strips_leading_slash() {
        let url = upstream_url_for(&cms_base(), "/posts", None).expect("path should join");
        assert_eq!(url.path(), "/wp-json/wp/v2/posts");
    }

    #[test]
    fn upstream_url_rejects_escape_from_base_path() {
        assert!(upstream_url_for(&cms_base(), "../../admin", None).is_err());
        assert!(upstream_url_for(&cms_base(), "posts/../../../etc", None).is_err());
    }

    #[test]
    fn append_capped_rejects_oversized_bodies() {
        let mut body = Vec::new();
        assert!(append_capped(&mut body, &[0u8; 512], 1_024).is_ok());
        assert!(append_capped(&mut body, &[0u8; 512], 1_024).is_ok());
        assert_eq!(
            append_capped(&mut body, &[0u8; 1], 1_024),
            Err("upstream response too large")
        );
    }

    #[test]
    fn error_payload_is_extractable_by_the_client() {
        let body = error_payload_body("content upstream is not configured");
        assert_eq!(
            error_message_from_body(&body, "generic"),
            "content upstream is not configured"
        );
    }

    #[test]
    fn request_id_prefers_inbound_header() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("req-abc"));
        assert_eq!(resolve_request_id(&headers), "req-abc");
    }

    #[test]
    fn request_id_is_generated_when_header_is_blank() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("   "));
        assert!(resolve_request_id(&headers).starts_with("req-"));
    }
}
