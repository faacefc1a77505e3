// Request pipeline for the admin REST service.
//
// Every outbound call goes through `ApiClient::call`: credential check,
// bearer header, body encoding, one attempt, status classification.

use reqwest::header::CONTENT_LENGTH;
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

pub use reqwest::Method;

use crate::body::RequestBody;
use crate::error::{Error, RequestError};
use crate::session::SessionContext;
use crate::transport::TransportConfig;

/// Async client for the admin REST service.
///
/// Holds the shared [`SessionContext`] and reads the bearer token from it on
/// every call, so a token set or cleared elsewhere takes effect on the next
/// request without rebuilding the client.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: SessionContext,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client for the service rooted at `base_url`.
    pub fn new(
        base_url: &str,
        session: SessionContext,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(http, base_url, session)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        session: SessionContext,
    ) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    /// Ensure the base URL ends with `/` so relative paths join beneath it
    /// instead of replacing its last segment.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a resource path (e.g. `"organizations/7"`) onto the base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── Pipeline ─────────────────────────────────────────────────────

    /// Perform one authenticated call.
    ///
    /// Fails with [`Error::Unauthenticated`] before any I/O when the session
    /// holds no token. A 2xx response yields its JSON payload (`null` for an
    /// empty body); anything else becomes a [`RequestError`]. There are no
    /// retries.
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
    ) -> Result<Value, Error> {
        let token = self.session.require_token()?;
        let url = self.url(path)?;
        debug!("{method} {url}");

        let mut builder = self
            .http
            .request(method, url)
            .bearer_auth(token.expose_secret());

        builder = match body {
            None => builder,
            Some(RequestBody::Json(value)) => builder.json(&value),
            Some(RequestBody::Multipart(multipart)) => builder.multipart(multipart.into_form()?),
        };

        let resp = builder
            .send()
            .await
            .map_err(|e| RequestError::transport(e.to_string()))?;

        Self::handle_response(resp).await
    }

    pub async fn get(&self, path: &str) -> Result<Value, Error> {
        self.call(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: RequestBody) -> Result<Value, Error> {
        self.call(Method::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: RequestBody) -> Result<Value, Error> {
        self.call(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, Error> {
        self.call(Method::DELETE, path, None).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response(resp: reqwest::Response) -> Result<Value, Error> {
        let status = resp.status();
        trace!(
            status = status.as_u16(),
            length = ?resp.headers().get(CONTENT_LENGTH),
            "response received"
        );

        let body = resp
            .text()
            .await
            .map_err(|e| RequestError::transport(e.to_string()))?;

        if !status.is_success() {
            return Err(RequestError::from_response(status.as_u16(), body).into());
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(e) => {
                debug!(error = %e, "2xx body is not JSON, passing it through as a string");
                Ok(Value::String(body))
            }
        }
    }
}
