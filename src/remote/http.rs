use super::{BulkDelete, ListQuery, Page, RemoteCrud};
use crate::config::DeskConfig;
use crate::core::{DeskError, Result};
use crate::entity::Resource;
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use tracing::debug;

/// Error body shape used by the backend (`{"error": "..."}`); other fields
/// are ignored.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// REST client for one resource collection.
///
/// Routes are `{base}/{kind}`, `{base}/{kind}/{id}` and
/// `{base}/{kind}/bulk-delete`. Non-success statuses are mapped with
/// [`DeskError::from_status`].
pub struct HttpCrudClient<R> {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for HttpCrudClient<R> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            token: self.token.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> HttpCrudClient<R> {
    /// Builds a client from validated configuration.
    pub fn new(config: &DeskConfig) -> Result<Self> {
        config.validate().map_err(DeskError::Config)?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| DeskError::Config(err.to_string()))?;
        Ok(Self::with_http(http, config))
    }

    /// Reuses an existing `reqwest` client (shared connection pool).
    pub fn with_http(http: reqwest::Client, config: &DeskConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.api_token.clone(),
            _resource: PhantomData,
        }
    }

    /// Returns the collection URL, e.g. `http://host/api/rooms`.
    pub fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, R::KIND)
    }

    /// Appends `id` as one percent-encoded path segment, so ids holding
    /// `/`, `?` or `#` still address a single record.
    fn item_url(&self, id: &str) -> Result<Url> {
        let mut url = Url::parse(&self.collection_url())
            .map_err(|err| DeskError::Config(format!("invalid base_url: {err}")))?;
        url.path_segments_mut()
            .map_err(|_| DeskError::Config(format!("{} cannot carry a path", self.base_url)))?
            .push(id);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|parsed| parsed.error)
            .ok()
            .filter(|message| !message.is_empty())
            .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

        debug!(kind = R::KIND, status = status.as_u16(), %message, "remote call rejected");
        Err(DeskError::from_status(status.as_u16(), message))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl<R: Resource> RemoteCrud<R> for HttpCrudClient<R> {
    async fn list(&self, query: ListQuery) -> Result<Page<R>> {
        query.validate()?;
        let request = self
            .http
            .get(self.collection_url())
            .query(&[("page", query.page), ("size", query.size)]);
        self.send_json(request).await
    }

    async fn create(&self, draft: &R::Draft) -> Result<R> {
        let request = self.http.post(self.collection_url()).json(draft);
        self.send_json(request).await
    }

    async fn update(&self, id: &str, draft: &R::Draft) -> Result<R> {
        let request = self.http.put(self.item_url(id)?).json(draft);
        self.send_json(request).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.send(self.http.delete(self.item_url(id)?)).await?;
        Ok(())
    }

    async fn delete_many(&self, ids: &[String]) -> Result<()> {
        let body = BulkDelete { ids: ids.to_vec() };
        let request = self
            .http
            .post(format!("{}/bulk-delete", self.collection_url()))
            .json(&body);
        self.send(request).await?;
        Ok(())
    }
}
