use std::time::Duration;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;
use crate::error::{ApiError, ApiResult};

/// Per-call behaviour of [`ServerApi`].
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestOptions {
    /// Forward the caller's session cookie to the backend.
    pub include_cookies: bool,
}

impl RequestOptions {
    pub fn with_cookies() -> Self {
        Self { include_cookies: true }
    }
}

/// Where the session cookie of the request being served comes from.
///
/// Handlers pass the inbound request's headers; code running outside of a
/// request passes [`NoCookies`].
pub trait CookieSource: Sync {
    /// Raw `Cookie` header value, forwarded byte for byte.
    fn cookie_header(&self) -> Option<HeaderValue>;
}

pub struct NoCookies;

impl CookieSource for NoCookies {
    fn cookie_header(&self) -> Option<HeaderValue> {
        None
    }
}

impl CookieSource for HeaderMap {
    fn cookie_header(&self) -> Option<HeaderValue> {
        self.get(COOKIE)
            .filter(|value| !value.is_empty())
            .cloned()
    }
}

impl CookieSource for str {
    fn cookie_header(&self) -> Option<HeaderValue> {
        if self.is_empty() {
            return None;
        }
        HeaderValue::from_str(self)
            .map_err(|e| warn!("Cookie is not a valid header value: {}", e))
            .ok()
    }
}

/// Typed JSON client for the directory REST API.
pub struct ServerApi {
    client: Client,
    base_url: String,
}

impl ServerApi {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("kosher-directory-server/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get<T, C>(
        &self,
        path: &str,
        options: RequestOptions,
        cookies: &C,
    ) -> ApiResult<T>
    where
        T: DeserializeOwned,
        C: CookieSource + ?Sized,
    {
        let url = self.resolve(path)?;
        let request = self.client.get(url.clone());
        self.execute(request, &url, options, cookies).await
    }

    pub async fn post<B, T, C>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
        cookies: &C,
    ) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
        C: CookieSource + ?Sized,
    {
        let url = self.resolve(path)?;
        let request = self.client.post(url.clone()).json(body);
        self.execute(request, &url, options, cookies).await
    }

    fn resolve(&self, path: &str) -> ApiResult<Url> {
        let raw = format!("{}{}", self.base_url, path);
        Url::parse(&raw).map_err(|source| ApiError::InvalidUrl { url: raw, source })
    }

    async fn execute<T, C>(
        &self,
        mut request: RequestBuilder,
        url: &Url,
        options: RequestOptions,
        cookies: &C,
    ) -> ApiResult<T>
    where
        T: DeserializeOwned,
        C: CookieSource + ?Sized,
    {
        if options.include_cookies {
            match cookies.cookie_header() {
                Some(cookie) => request = request.header(COOKIE, cookie),
                None => debug!("No session cookie to forward to {}", url),
            }
        }

        let transport = |source: reqwest::Error| ApiError::Transport {
            url: url.to_string(),
            source,
        };

        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;

        if !status.is_success() {
            warn!("{} responded with {}", url, status);
            return Err(ApiError::Status {
                url: url.to_string(),
                status,
                body,
            });
        }

        // Created/accepted/no-content answers may legitimately carry no body.
        let body = if body.trim().is_empty() && allows_empty_body(status) {
            "null"
        } else {
            body.as_str()
        };

        serde_json::from_str(body).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

fn allows_empty_body(status: StatusCode) -> bool {
    status == StatusCode::CREATED
        || status == StatusCode::ACCEPTED
        || status == StatusCode::NO_CONTENT
}
