//! reqwest-backed [`DocumentLoader`].

use crate::error::LoaderError;
use crate::html;
use crate::loader::{DocumentLoader, RemoteDocument};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, LINK};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::time::Duration;
use tracing::debug;

const JSON_LD_ACCEPT: &str = "application/ld+json, application/json;q=0.9";
const HTML_ACCEPT: &str = "text/html, application/xhtml+xml;q=0.9, */*;q=0.8";

/// Configuration for [`HttpDocumentLoader`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpLoaderConfig {
    /// Connection timeout in milliseconds (default 5000).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout_ms: Option<u64>,

    /// Per-request timeout in milliseconds (default 30000).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    /// Follow a `Link: <...>; rel="alternate"; type="application/ld+json"`
    /// header when a context URL answers with something other than JSON.
    #[serde(default = "default_follow_alternate_links")]
    pub follow_alternate_links: bool,
}

fn default_follow_alternate_links() -> bool {
    true
}

impl Default for HttpLoaderConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: None,
            request_timeout_ms: None,
            user_agent: None,
            follow_alternate_links: true,
        }
    }
}

impl HttpLoaderConfig {
    pub fn with_request_timeout_ms(mut self, ms: u64) -> Self {
        self.request_timeout_ms = Some(ms);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_follow_alternate_links(mut self, follow: bool) -> Self {
        self.follow_alternate_links = follow;
        self
    }
}

/// Loads context documents and vocabulary pages over HTTP(S).
#[derive(Clone)]
pub struct HttpDocumentLoader {
    client: Client,
    follow_alternate_links: bool,
}

impl HttpDocumentLoader {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            follow_alternate_links: true,
        }
    }

    pub fn from_config(config: &HttpLoaderConfig) -> Result<Self, LoaderError> {
        let connect_timeout = Duration::from_millis(config.connect_timeout_ms.unwrap_or(5_000));
        let request_timeout = Duration::from_millis(config.request_timeout_ms.unwrap_or(30_000));

        let mut builder = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout);
        if let Some(ref ua) = config.user_agent {
            builder = builder.user_agent(ua.clone());
        }
        let client = builder
            .build()
            .map_err(|e| LoaderError::Client(e.to_string()))?;

        Ok(Self {
            client,
            follow_alternate_links: config.follow_alternate_links,
        })
    }

    /// Use an existing client (shared connection pool).
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            follow_alternate_links: true,
        }
    }

    async fn get(&self, url: &str, accept: &str) -> Result<Response, LoaderError> {
        debug!(url = %url, "fetching document");
        let resp = self
            .client
            .get(url)
            .header(ACCEPT, accept)
            .send()
            .await
            .map_err(|e| http_error(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LoaderError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(resp)
    }

    async fn read_json(url: &str, resp: Response) -> Result<RemoteDocument, LoaderError> {
        let final_url = resp.url().to_string();
        let body = resp.text().await.map_err(|e| http_error(url, e))?;
        if body.trim().is_empty() {
            return Ok(RemoteDocument::empty(final_url));
        }
        let doc: JsonValue = serde_json::from_str(&body).map_err(|e| LoaderError::Json {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        Ok(RemoteDocument::new(final_url, doc))
    }
}

impl Default for HttpDocumentLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HttpDocumentLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpDocumentLoader")
            .field("follow_alternate_links", &self.follow_alternate_links)
            .finish()
    }
}

#[async_trait]
impl DocumentLoader for HttpDocumentLoader {
    async fn load_context(&self, url: &str) -> Result<RemoteDocument, LoaderError> {
        let resp = self.get(url, JSON_LD_ACCEPT).await?;

        if self.follow_alternate_links && !is_json(&resp) {
            let alternate = resp
                .headers()
                .get_all(LINK)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .find_map(alternate_json_ld_link)
                .and_then(|target| resp.url().join(&target).ok());

            if let Some(alternate) = alternate {
                debug!(url = %url, alternate = %alternate, "following alternate JSON-LD link");
                let resp = self.get(alternate.as_str(), JSON_LD_ACCEPT).await?;
                return Self::read_json(alternate.as_str(), resp).await;
            }
        }

        Self::read_json(url, resp).await
    }

    async fn load_vocabulary(&self, url: &str) -> Result<JsonValue, LoaderError> {
        let resp = self.get(url, HTML_ACCEPT).await?;
        let body = resp.text().await.map_err(|e| http_error(url, e))?;
        html::parse_embedded_json_ld(url, &body)
    }
}

fn http_error(url: &str, e: reqwest::Error) -> LoaderError {
    LoaderError::Http {
        url: url.to_string(),
        message: e.to_string(),
    }
}

fn is_json(resp: &Response) -> bool {
    resp.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("json"))
}

/// Target of a `rel="alternate"; type="application/ld+json"` link, if the
/// header value carries one.
fn alternate_json_ld_link(header: &str) -> Option<String> {
    header.split(',').find_map(|link| {
        let mut parts = link.split(';').map(str::trim);
        let target = parts.next()?.strip_prefix('<')?.strip_suffix('>')?;

        let mut rel_alternate = false;
        let mut json_ld = false;
        for param in parts {
            let Some((name, value)) = param.split_once('=') else {
                continue;
            };
            let value = value.trim().trim_matches('"');
            match name.trim().to_ascii_lowercase().as_str() {
                "rel" => rel_alternate = value.split_whitespace().any(|r| r == "alternate"),
                "type" => json_ld = value == "application/ld+json",
                _ => {}
            }
        }

        (rel_alternate && json_ld).then(|| target.to_string())
    })
}
