//! Request transport used by both controllers.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use url::Url;

use crate::error::TransportError;

/// A response as the controllers see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// HTTP status code.
    pub status: u16,
    /// Value of the `Content-Type` header, if any.
    pub content_type: Option<String>,
    /// Response body as text.
    pub body: String,
}

impl FetchedPage {
    /// A 200 `text/html` response.
    #[must_use]
    pub fn html(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: Some("text/html; charset=utf-8".to_owned()),
            body: body.into(),
        }
    }

    /// A JSON response with the given status.
    #[must_use]
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: Some("application/json".to_owned()),
            body: body.into(),
        }
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Whether the content type declares an HTML document.
    #[must_use]
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("text/html"))
    }
}

/// Performs the GET and form POST requests the controllers need.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch a page.
    async fn get(&self, url: &Url) -> Result<FetchedPage, TransportError>;

    /// POST a form-encoded body.
    async fn post_form(
        &self,
        url: &Url,
        fields: &[(String, String)],
    ) -> Result<FetchedPage, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn get(&self, url: &Url) -> Result<FetchedPage, TransportError> {
        (**self).get(url).await
    }

    async fn post_form(
        &self,
        url: &Url,
        fields: &[(String, String)],
    ) -> Result<FetchedPage, TransportError> {
        (**self).post_form(url, fields).await
    }
}

/// `reqwest` implementation of [`Transport`].
///
/// No timeout is configured: a stalled request fails only when the
/// connection does.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport with a default client.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Request` if the client cannot be built
    /// (e.g. TLS backend initialization failed).
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("marquee-client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn read(response: reqwest::Response) -> Result<FetchedPage, TransportError> {
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = response.text().await?;

        Ok(FetchedPage {
            status,
            content_type,
            body,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<FetchedPage, TransportError> {
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "text/html")
            .send()
            .await?;
        Self::read(response).await
    }

    async fn post_form(
        &self,
        url: &Url,
        fields: &[(String, String)],
    ) -> Result<FetchedPage, TransportError> {
        let response = self.client.post(url.clone()).form(fields).send().await?;
        Self::read(response).await
    }
}
