// Camfleet inventory service HTTP client
//
// Single outbound-request gateway. Every request re-reads the bearer
// token from the shared TokenStore -- never a cached copy -- so header
// construction cannot drift from the persisted credential. 401 responses
// surface as `Error::SessionExpired` and are otherwise left alone: the
// session and navigation guards own all 401 recovery.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::token::TokenStore;
use crate::transport::TransportConfig;

/// `POST /token` success body.
#[derive(serde::Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Error bodies carry a `detail` string.
#[derive(serde::Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// HTTP client facade for the camera inventory service.
///
/// Cheap to clone: the underlying `reqwest::Client` is reference-counted
/// and the token store is shared.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    tokens: Arc<TokenStore>,
}

impl ApiClient {
    /// Create a client from a base URL and transport settings.
    pub fn new(
        base_url: Url,
        tokens: Arc<TokenStore>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            tokens,
        })
    }

    /// Create a client with a pre-built `reqwest::Client` (tests).
    pub fn with_client(http: reqwest::Client, base_url: Url, tokens: Arc<TokenStore>) -> Self {
        Self {
            http,
            base_url,
            tokens,
        }
    }

    /// The shared token store.
    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    /// The service base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL construction ─────────────────────────────────────────────

    fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Attach the bearer credential if the store currently holds one.
    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.tokens.get() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a GET request and decode the JSON response.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.api_url(path)?;
        debug!("GET {}", url);

        let resp = self
            .authorize(self.http.get(url))
            .send()
            .await
            .map_err(Error::Transport)?;
        self.decode(self.check(resp).await?).await
    }

    /// Send a POST request with a JSON body and decode the response.
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let url = self.api_url(path)?;
        debug!("POST {}", url);

        let resp = self
            .authorize(self.http.post(url).json(body))
            .send()
            .await
            .map_err(Error::Transport)?;
        self.decode(self.check(resp).await?).await
    }

    /// Send a bodyless POST request and decode the response.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.api_url(path)?;
        debug!("POST {}", url);

        let resp = self
            .authorize(self.http.post(url))
            .send()
            .await
            .map_err(Error::Transport)?;
        self.decode(self.check(resp).await?).await
    }

    /// Send a PUT request with a JSON body, discarding the response body.
    pub async fn put_json(&self, path: &str, body: &(impl Serialize + Sync)) -> Result<(), Error> {
        let url = self.api_url(path)?;
        debug!("PUT {}", url);

        let resp = self
            .authorize(self.http.put(url).json(body))
            .send()
            .await
            .map_err(Error::Transport)?;
        self.check(resp).await?;
        Ok(())
    }

    /// Send a DELETE request, discarding the response body.
    pub async fn delete(&self, path: &str) -> Result<(), Error> {
        let url = self.api_url(path)?;
        debug!("DELETE {}", url);

        let resp = self
            .authorize(self.http.delete(url))
            .send()
            .await
            .map_err(Error::Transport)?;
        self.check(resp).await?;
        Ok(())
    }

    // ── Authentication ───────────────────────────────────────────────

    /// Exchange credentials for a bearer token via form-encoded `POST /token`.
    ///
    /// Returns the raw `access_token`; persisting it (and the follow-up
    /// validation) is the session guard's job. Rejections surface the
    /// server's `detail` message.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<String, Error> {
        let url = self.api_url("token")?;
        debug!("logging in at {}", url);

        let form = [
            ("username", username),
            ("password", password.expose_secret()),
        ];

        let resp = self
            .authorize(self.http.post(url).form(&form))
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.detail);
            return Err(Error::Authentication {
                message: detail.unwrap_or_else(|| format!("login failed (HTTP {status})")),
            });
        }

        let token: TokenResponse = self.decode(resp).await?;
        debug!("login successful");
        Ok(token.access_token)
    }

    // ── Response handling ────────────────────────────────────────────

    /// Map non-2xx statuses to errors, parsing the `detail` body when present.
    async fn check(&self, resp: reqwest::Response) -> Result<reqwest::Response, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            // Passed through untouched; the session guard decides what
            // to clear and the navigation guard where to send the user.
            return Err(Error::SessionExpired);
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.detail);
            return Err(Error::Api {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(resp)
    }

    /// Decode a JSON body, keeping a preview of the raw text on failure.
    async fn decode<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T, Error> {
        let body = resp.text().await.map_err(Error::Transport)?;

        serde_json::from_str(&body).map_err(|e| {
            let preview = truncate_preview(&body, 200);
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }
}

/// Truncate to at most `max` bytes without splitting a multibyte character.
fn truncate_preview(body: &str, max: usize) -> &str {
    if body.len() <= max {
        return body;
    }
    let mut end = max;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
