//! HTTP client for the model-serving API.
//!
//! Every call opens one request against a fixed base endpoint. Single-shot
//! calls read the whole body; streaming calls feed each line of the body to
//! a sink until the body ends or something fails. The response body is
//! owned by the call and dropped on every exit path.

use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::io::StreamReader;

use crate::api::stream::read_events;
use crate::api::status;
use crate::api::types::{
    CreateProgress, CreateRequest, GenerateRequest, GenerateResponse, ListResponse, PullRequest, PushRequest,
    TransferProgress,
};
use crate::error::{ClientError, Result, SinkError};

/// Host used when none is configured
pub const DEFAULT_HOST: &str = "127.0.0.1:11434";

/// Callback receiving decoded events of one streaming call.
pub type EventSink<'a, T> = dyn FnMut(T) -> std::result::Result<(), SinkError> + Send + 'a;

/// Operations offered by a model-serving backend.
#[async_trait]
pub trait ModelService: Send + Sync {
    /// Stream a completion for `request` into `sink`
    async fn generate(&self, request: &GenerateRequest, sink: &mut EventSink<'_, GenerateResponse>) -> Result<()>;

    /// Download a model, reporting per-layer progress
    async fn pull(&self, request: &PullRequest, sink: &mut EventSink<'_, TransferProgress>) -> Result<()>;

    /// Upload a model, reporting per-layer progress
    async fn push(&self, request: &PushRequest, sink: &mut EventSink<'_, TransferProgress>) -> Result<()>;

    /// Build a model from a model file on the server side
    async fn create(&self, request: &CreateRequest, sink: &mut EventSink<'_, CreateProgress>) -> Result<()>;

    /// List locally available models
    async fn list(&self) -> Result<ListResponse>;
}

/// Client bound to one base endpoint
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base: Url,
}

impl Client {
    /// Create a client for `host`, given as `host:port` or as a full URL
    pub fn new(host: &str) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::new(),
            base: base_url(host)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<reqwest::RequestBuilder> {
        let url = self
            .base
            .join(path)
            .map_err(|e| ClientError::InvalidHost(format!("{}: {}", path, e)))?;

        log::debug!("{} {}", method, url);

        let mut builder = self
            .http
            .request(method, url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::ACCEPT, "application/json");

        if let Some(body) = body {
            builder = builder.body(serde_json::to_vec(body).map_err(ClientError::Encode)?);
        }

        Ok(builder)
    }

    /// Issue a call and decode the complete body as `T`.
    ///
    /// An empty or whitespace-only body on success yields `T::default()`.
    pub async fn send<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Default,
    {
        let response = self.request(method, path, body)?.send().await?;
        let code = response.status();
        let bytes = response.bytes().await?;

        status::check(code, &bytes)?;

        if status::is_blank(&bytes) {
            return Ok(T::default());
        }

        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Issue a call and deliver each line of the body to `sink` as a `T`.
    pub async fn stream<B, T, F>(&self, method: Method, path: &str, body: &B, sink: F) -> Result<()>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
        F: FnMut(T) -> std::result::Result<(), SinkError>,
    {
        let response = self.request(method, path, Some(body))?.send().await?;
        let code: StatusCode = response.status();

        tracing::debug!(path, status = code.as_u16(), "stream opened");

        let reader = StreamReader::new(response.bytes_stream().map_err(std::io::Error::other));
        let result = read_events(code, reader, sink).await;

        if let Err(e) = &result {
            tracing::warn!(path, error = %e, "stream aborted");
        }

        result.map(|_| ())
    }
}

fn base_url(host: &str) -> Result<Url> {
    let host = host.trim();
    if host.is_empty() {
        return Err(ClientError::InvalidHost("empty host".to_string()));
    }

    let raw = if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    };

    Url::parse(&raw).map_err(|e| ClientError::InvalidHost(format!("{}: {}", host, e)))
}

#[async_trait]
impl ModelService for Client {
    async fn generate(&self, request: &GenerateRequest, sink: &mut EventSink<'_, GenerateResponse>) -> Result<()> {
        self.stream(Method::POST, "/api/generate", request, |resp| sink(resp)).await
    }

    async fn pull(&self, request: &PullRequest, sink: &mut EventSink<'_, TransferProgress>) -> Result<()> {
        self.stream(Method::POST, "/api/pull", request, |event| sink(event)).await
    }

    async fn push(&self, request: &PushRequest, sink: &mut EventSink<'_, TransferProgress>) -> Result<()> {
        self.stream(Method::POST, "/api/push", request, |event| sink(event)).await
    }

    async fn create(&self, request: &CreateRequest, sink: &mut EventSink<'_, CreateProgress>) -> Result<()> {
        self.stream(Method::POST, "/api/create", request, |event| sink(event)).await
    }

    async fn list(&self) -> Result<ListResponse> {
        self.send::<(), _>(Method::GET, "/api/tags", None).await
    }
}
