//! HTTP transport for the catalog REST API.
//!
//! Wraps reqwest with authentication, optional rate limiting, retries with
//! exponential backoff and mapping of HTTP statuses onto [`AtlanError`].

use crate::secure_string::SecureString;
use crate::traits::{AtlanError, AtlanResult, AuthConfig, ClientConfig};
use atlan_observability::metrics::{record_api_call, record_api_error, record_retry};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorRateLimiter,
};
use moka::future::Cache as MokaCache;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::time::sleep;
use tracing::{debug, info, warn};

type RateLimiterType = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Query parameters; keys may repeat (`guid=a&guid=b`).
pub type QueryParams<'a> = [(&'a str, String)];

const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// HTTP client with retry, rate limiting and authentication.
pub struct HttpClient {
    client: Client,
    config: ClientConfig,
    oauth_token: Arc<RwLock<Option<OAuthToken>>>,
    rate_limiter: Option<Arc<RateLimiterType>>,
}

/// Cached OAuth2 access token.
#[derive(Clone)]
struct OAuthToken {
    access_token: SecureString,
    expires_at: Instant,
}

impl std::fmt::Debug for OAuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthToken")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Client-side request budget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    #[serde(with = "duration_secs")]
    pub period: Duration,
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 600,
            period: Duration::from_secs(60),
            burst_size: 20,
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

/// Error body returned by the API on failures.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiErrorBody {
    error_code: Option<String>,
    error_message: Option<String>,
    message: Option<String>,
}

/// Maps a non-success status and its body onto an error.
pub(crate) fn status_error(status: StatusCode, body: &str, retry_after: Option<u64>) -> AtlanError {
    let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
    let detail = match (parsed.error_code, parsed.error_message.or(parsed.message)) {
        (Some(code), Some(message)) => format!("{}: {}", code, message),
        (None, Some(message)) => message,
        (Some(code), None) => code,
        (None, None) if body.trim().is_empty() => status.to_string(),
        (None, None) => format!(
            "{}: {}",
            status,
            body.chars().take(500).collect::<String>()
        ),
    };

    match status {
        StatusCode::BAD_REQUEST => AtlanError::InvalidRequest(detail),
        StatusCode::UNAUTHORIZED => AtlanError::Authentication(detail),
        StatusCode::FORBIDDEN => AtlanError::Permission(detail),
        StatusCode::NOT_FOUND => AtlanError::NotFound(detail),
        StatusCode::CONFLICT => AtlanError::Conflict(detail),
        StatusCode::TOO_MANY_REQUESTS => AtlanError::RateLimited(retry_after.unwrap_or(60)),
        _ => AtlanError::Api(detail),
    }
}

fn transport_error(e: reqwest::Error) -> AtlanError {
    if e.is_timeout() {
        AtlanError::Timeout(e.to_string())
    } else if e.is_connect() {
        AtlanError::ApiConnection(e.to_string())
    } else {
        AtlanError::Api(e.to_string())
    }
}

fn retry_after(response: &Response) -> Option<u64> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
}

impl HttpClient {
    pub fn new(config: ClientConfig) -> AtlanResult<Self> {
        Self::with_rate_limit(config, None)
    }

    pub fn with_rate_limit(
        config: ClientConfig,
        rate_limit: Option<RateLimitConfig>,
    ) -> AtlanResult<Self> {
        // TLS verification can only be switched off in debug builds.
        let verify_tls = if !config.verify_tls {
            #[cfg(debug_assertions)]
            {
                warn!(
                    base_url = %config.base_url,
                    client = %config.name,
                    "TLS certificate verification disabled in a development build"
                );
                false
            }
            #[cfg(not(debug_assertions))]
            {
                warn!(
                    base_url = %config.base_url,
                    client = %config.name,
                    "Ignoring request to disable TLS verification in a release build"
                );
                true
            }
        } else {
            true
        };

        let mut headers = reqwest::header::HeaderMap::new();
        for (key, value) in &config.headers {
            if let (Ok(name), Ok(val)) = (
                reqwest::header::HeaderName::try_from(key.as_str()),
                reqwest::header::HeaderValue::try_from(value.as_str()),
            ) {
                headers.insert(name, val);
            }
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!verify_tls)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .default_headers(headers)
            .build()
            .map_err(|e| AtlanError::Configuration(e.to_string()))?;

        let rate_limiter = match rate_limit {
            Some(rl) => {
                let per_request = rl.period / rl.max_requests.max(1);
                let quota = Quota::with_period(per_request)
                    .ok_or_else(|| {
                        AtlanError::Configuration("Rate limit period must be non-zero".into())
                    })?
                    .allow_burst(NonZeroU32::new(rl.burst_size).unwrap_or(NonZeroU32::MIN));
                Some(Arc::new(GovernorRateLimiter::direct(quota)))
            }
            None => None,
        };

        Ok(Self {
            client,
            config,
            oauth_token: Arc::new(RwLock::new(None)),
            rate_limiter,
        })
    }

    pub fn build_url(&self, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn request(&self, method: Method, path: &str, query: &QueryParams<'_>) -> RequestBuilder {
        let request = self.client.request(method, self.build_url(path));
        if query.is_empty() {
            request
        } else {
            request.query(query)
        }
    }

    pub async fn get(&self, path: &str, query: &QueryParams<'_>) -> AtlanResult<Response> {
        let request = self.request(Method::GET, path, query);
        self.execute_with_retry(Method::GET, request).await
    }

    pub async fn get_json<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &QueryParams<'_>,
    ) -> AtlanResult<R> {
        let response = self.get(path, query).await?;
        parse_json_response(response).await
    }

    pub async fn post_json<T: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        query: &QueryParams<'_>,
        body: &T,
    ) -> AtlanResult<R> {
        let request = self.request(Method::POST, path, query).json(body);
        let response = self.execute_with_retry(Method::POST, request).await?;
        parse_json_response(response).await
    }

    pub async fn delete(&self, path: &str, query: &QueryParams<'_>) -> AtlanResult<Response> {
        let request = self.request(Method::DELETE, path, query);
        self.execute_with_retry(Method::DELETE, request).await
    }

    pub async fn delete_json<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &QueryParams<'_>,
    ) -> AtlanResult<R> {
        let response = self.delete(path, query).await?;
        parse_json_response(response).await
    }

    /// Sends a request, retrying connection failures, 5xx and 429 responses
    /// with exponential backoff. Other client errors fail immediately.
    async fn execute_with_retry(
        &self,
        method: Method,
        request: RequestBuilder,
    ) -> AtlanResult<Response> {
        let result = self.send_with_retry(&method, request).await;
        if let Err(e) = &result {
            record_api_error(e.kind());
        }
        result
    }

    async fn send_with_retry(
        &self,
        method: &Method,
        mut request: RequestBuilder,
    ) -> AtlanResult<Response> {
        request = self.add_auth(request).await?;

        let mut last_error = None;
        let mut delay = Duration::from_millis(100);

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                debug!(attempt, ?delay, "Retrying request");
                record_retry(method.as_str());
                sleep(delay).await;
                delay = std::cmp::min(delay * 2 + rand_jitter(), MAX_BACKOFF);
            }

            if let Some(limiter) = &self.rate_limiter {
                limiter.until_ready().await;
            }

            let attempt_request = request
                .try_clone()
                .ok_or_else(|| AtlanError::Internal("Failed to clone request".to_string()))?;

            let started = Instant::now();
            let response = match attempt_request.send().await {
                Ok(response) => response,
                Err(e) => {
                    warn!(error = %e, "Request failed");
                    last_error = Some(transport_error(e));
                    continue;
                }
            };

            let status = response.status();
            record_api_call(method.as_str(), status.as_u16(), started.elapsed());

            if status.is_success() {
                return Ok(response);
            }

            let retry_after_secs = retry_after(&response);
            let body = response.text().await.unwrap_or_default();
            let error = status_error(status, &body, retry_after_secs);

            let retryable = status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS;
            if !retryable || attempt >= self.config.max_retries {
                return Err(error);
            }

            warn!(%status, "Retryable response from API");
            if let Some(secs) = retry_after_secs {
                delay = std::cmp::min(Duration::from_secs(secs), MAX_BACKOFF);
            }
            last_error = Some(error);
        }

        Err(last_error.unwrap_or_else(|| AtlanError::Internal("Unknown error".to_string())))
    }

    async fn add_auth(&self, request: RequestBuilder) -> AtlanResult<RequestBuilder> {
        match &self.config.auth {
            AuthConfig::None => Ok(request),
            AuthConfig::ApiToken { token } => Ok(request.bearer_auth(token.expose_secret())),
            AuthConfig::OAuth2 {
                client_id,
                client_secret,
                token_url,
                scopes,
            } => {
                let token = self
                    .get_oauth_token(client_id, client_secret, token_url, scopes)
                    .await?;
                Ok(request.bearer_auth(token.expose_secret()))
            }
        }
    }

    /// Returns the cached OAuth2 token, fetching a new one when it is missing
    /// or within a minute of expiry.
    async fn get_oauth_token(
        &self,
        client_id: &str,
        client_secret: &SecureString,
        token_url: &str,
        scopes: &[String],
    ) -> AtlanResult<SecureString> {
        {
            let token = self.oauth_token.read().await;
            if let Some(t) = &*token {
                if t.expires_at > Instant::now() + Duration::from_secs(60) {
                    return Ok(t.access_token.clone());
                }
            }
        }

        info!("Fetching new OAuth2 token");

        let scope = scopes.join(" ");
        let mut params = vec![
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret.expose_secret()),
        ];
        if !scope.is_empty() {
            params.push(("scope", &scope));
        }

        let response = self
            .client
            .post(token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| AtlanError::Authentication(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AtlanError::Authentication(format!(
                "OAuth2 token request failed: {}",
                response.status()
            )));
        }

        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
            expires_in: u64,
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| AtlanError::InvalidResponse(e.to_string()))?;

        let access_token = SecureString::new(token_response.access_token);
        *self.oauth_token.write().await = Some(OAuthToken {
            access_token: access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(token_response.expires_in),
        });

        Ok(access_token)
    }
}

/// Parses a JSON body; an empty body reads as JSON `null`.
async fn parse_json_response<R: DeserializeOwned>(response: Response) -> AtlanResult<R> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| AtlanError::InvalidResponse(e.to_string()))?;
    let text = if text.trim().is_empty() { "null" } else { text.as_str() };

    serde_json::from_str(text).map_err(|e| {
        AtlanError::InvalidResponse(format!(
            "Failed to parse response (status {}): {} - Body: {}",
            status,
            e,
            text.chars().take(500).collect::<String>()
        ))
    })
}

fn rand_jitter() -> Duration {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    Instant::now().hash(&mut hasher);
    Duration::from_millis(hasher.finish() % 100)
}

/// TTL cache for lookups that rarely change, such as tag definitions.
pub struct ResponseCache<V: Clone + Send + Sync + 'static> {
    cache: MokaCache<String, V>,
}

impl<V: Clone + Send + Sync + 'static> ResponseCache<V> {
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        let cache = MokaCache::builder()
            .time_to_live(ttl)
            .max_capacity(max_capacity)
            .build();
        Self { cache }
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        self.cache.get(key).await
    }

    pub async fn insert(&self, key: String, value: V) {
        self.cache.insert(key, value).await;
    }

    pub async fn invalidate(&self, key: &str) {
        self.cache.invalidate(key).await;
    }

    pub async fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }

    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: String, f: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<V, E>>,
    {
        if let Some(v) = self.cache.get(&key).await {
            return Ok(v);
        }
        let value = f().await?;
        self.cache.insert(key, value.clone()).await;
        Ok(value)
    }
}
