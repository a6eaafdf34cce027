use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use gloo_net::http::Request;
use serde::de::DeserializeOwned;

use super::notify::NotifyHandle;
use crate::request_cache::{error_message_from_body, request_key, ResponseCache, DEFAULT_CACHE_TTL_MS};

pub const DEFAULT_API_BASE: &str = "/api/content";

/// Base URL for the content API, fixed at build time.
pub fn api_base() -> &'static str {
    option_env!("ATELIER_API_BASE").unwrap_or(DEFAULT_API_BASE)
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

#[derive(Clone, PartialEq)]
pub struct FetchConfig {
    pub path: String,
    pub method: HttpMethod,
    pub params: Vec<(String, String)>,
    pub body: Option<String>,
    pub show_error: bool,
    pub cache: bool,
    pub cache_ttl_ms: f64,
}

impl FetchConfig {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: HttpMethod::Get,
            params: Vec::new(),
            body: None,
            show_error: true,
            cache: false,
            cache_ttl_ms: DEFAULT_CACHE_TTL_MS,
        }
    }

    pub fn post(path: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            method: HttpMethod::Post,
            ..Self::get(path)
        }
    }

    pub fn param(mut self, name: &str, value: &str) -> Self {
        self.params.push((name.to_string(), value.to_string()));
        self
    }

    pub fn cached(mut self) -> Self {
        self.cache = true;
        self
    }

    /// Suppress the user-facing notification on failure.
    pub fn quiet(mut self) -> Self {
        self.show_error = false;
        self
    }
}

pub struct FetchOutcome<T> {
    pub data: T,
    pub cached: bool,
}

#[derive(Clone, PartialEq, Debug)]
pub struct FetchError {
    pub message: String,
}

impl FetchError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.message)
    }
}

impl std::error::Error for FetchError {}

/// Content-API client with an injected bounded TTL cache. Identical repeated
/// calls inside the TTL are answered from the cache and tagged `cached`;
/// failures are never cached and surface as a notification unless the call
/// opted out.
#[derive(Clone)]
pub struct ApiClient {
    base: Rc<String>,
    cache: Rc<RefCell<ResponseCache>>,
    notify: NotifyHandle,
}

impl PartialEq for ApiClient {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cache, &other.cache)
    }
}

impl ApiClient {
    pub fn new(base: impl Into<String>, cache: ResponseCache, notify: NotifyHandle) -> Self {
        Self {
            base: Rc::new(base.into()),
            cache: Rc::new(RefCell::new(cache)),
            notify,
        }
    }

    /// Absolute URLs bypass the configured base, everything else is joined
    /// onto it.
    fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base, path)
        }
    }

    pub async fn fetch<T: DeserializeOwned>(
        &self,
        config: FetchConfig,
    ) -> Result<FetchOutcome<T>, FetchError> {
        let url = self.resolve_url(&config.path);
        let key = request_key(config.method.as_str(), &url, &config.params, config.body.as_deref());

        if config.cache {
            let hit = self.cache.borrow_mut().read(&key, js_sys::Date::now());
            if let Some(body) = hit {
                if let Ok(data) = serde_json::from_str(&body) {
                    return Ok(FetchOutcome { data, cached: true });
                }
                // A cached body that stopped parsing falls through to a refetch.
            }
        }

        let body = match self.send(&url, &config).await {
            Ok(body) => body,
            Err(error) => {
                self.report(&config, &error);
                return Err(error);
            }
        };

        let data = match serde_json::from_str(&body) {
            Ok(data) => data,
            Err(_) => {
                let error = FetchError::new("unexpected response shape");
                self.report(&config, &error);
                return Err(error);
            }
        };

        if config.cache {
            self.cache
                .borrow_mut()
                .write(key, body, js_sys::Date::now(), config.cache_ttl_ms);
        }

        Ok(FetchOutcome { data, cached: false })
    }

    /// Fire-and-acknowledge call for endpoints whose response body is not
    /// this crate's to interpret.
    pub async fn submit(&self, config: FetchConfig) -> Result<(), FetchError> {
        let url = self.resolve_url(&config.path);

        match self.send(&url, &config).await {
            Ok(_body) => Ok(()),
            Err(error) => {
                self.report(&config, &error);
                Err(error)
            }
        }
    }

    async fn send(&self, url: &str, config: &FetchConfig) -> Result<String, FetchError> {
        let builder = match config.method {
            HttpMethod::Get => Request::get(url),
            HttpMethod::Post => Request::post(url),
        }
        .query(config.params.iter().map(|(name, value)| (name.as_str(), value.as_str())));

        let sent = match config.body.as_ref() {
            Some(body) => {
                builder
                    .header("content-type", "application/json")
                    .body(body.clone())
                    .map_err(|_| FetchError::new("failed to prepare request"))?
                    .send()
                    .await
            }
            None => builder.send().await,
        };

        let response = sent.map_err(|_| FetchError::new("failed to reach the content service"))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|_| FetchError::new("failed reading response body"))?;

        if !response.ok() {
            let fallback = format!("request failed with status {status}");
            return Err(FetchError::new(error_message_from_body(&text, &fallback)));
        }

        Ok(text)
    }

    fn report(&self, config: &FetchConfig, error: &FetchError) {
        if config.show_error {
            self.notify.error(error.message.clone());
        }
    }
}
