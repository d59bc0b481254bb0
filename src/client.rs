use std::env;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::StreamExt;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::backend::{Backend, ByteStream};
use crate::client_logger::ClientLogger;
use crate::error::{Error, Result, UNKNOWN_ERROR_MESSAGE};
use crate::observability::{CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS};
use crate::types::{ChatDetail, ChatId, NewChatParams, SessionId, SessionInfo};

/// Host used when neither an explicit host nor `KBCHAT_HOST` is given.
pub const DEFAULT_HOST: &str = "http://127.0.0.1:8000";

/// Environment variable consulted for the backend host.
pub const HOST_ENV_VAR: &str = "KBCHAT_HOST";

/// Path segment sent for "no knowledge-base index".
pub const NO_INDEX_SEGMENT: &str = "null";

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the chat backend.
///
/// Every endpoint is a `POST` relative to the configured host.  Replies to `send` are not
/// bounded by a total timeout; only connecting is.
#[derive(Clone)]
pub struct ChatClient {
    client: ReqwestClient,
    host: Url,
    connect_timeout: Duration,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl ChatClient {
    /// Create a new client.
    ///
    /// The host can be provided directly or read from the KBCHAT_HOST environment variable;
    /// without either, [`DEFAULT_HOST`] is used.
    pub fn new(host: Option<String>) -> Result<Self> {
        Self::with_options(host, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(host: Option<String>, connect_timeout: Option<Duration>) -> Result<Self> {
        let host = match host {
            Some(host) => host,
            None => env::var(HOST_ENV_VAR).unwrap_or_else(|_| DEFAULT_HOST.to_string()),
        };
        let host = Url::parse(&host)?;
        if host.cannot_be_a_base() {
            return Err(Error::url(format!("host {host} cannot be a base URL"), None));
        }

        let connect_timeout = connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT);
        let client = ReqwestClient::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            client,
            host,
            connect_timeout,
            logger: None,
        })
    }

    /// Attach a logger that observes every request.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The backend host.
    pub fn host(&self) -> &Url {
        &self.host
    }

    /// Build the URL of an endpoint from path segments, percent-encoding each segment.
    pub fn endpoint_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.host.clone();
        url.path_segments_mut()
            .map_err(|_| Error::url(format!("host {} cannot be a base URL", self.host), None))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers
    }

    /// Issue a request and turn non-success statuses into errors.
    async fn execute(&self, endpoint: &str, url: Url, request: RequestBuilder) -> Result<Response> {
        CLIENT_REQUESTS.click();
        if let Some(logger) = &self.logger {
            logger.log_request(endpoint, &url);
        }
        let started = Instant::now();
        let result = request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::timeout(
                    format!("Request timed out: {}", e),
                    Some(self.connect_timeout.as_secs_f64()),
                )
            } else if e.is_connect() {
                Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
            } else {
                Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
            }
        });
        CLIENT_REQUEST_DURATION.add(started.elapsed().as_secs_f64());

        let result = match result {
            Ok(response) => {
                if let Some(logger) = &self.logger {
                    logger.log_response(endpoint, response.status().as_u16());
                }
                if response.status().is_success() {
                    Ok(response)
                } else {
                    Err(Self::process_error_response(response).await)
                }
            }
            Err(err) => Err(err),
        };
        if let Err(err) = &result {
            CLIENT_REQUEST_ERRORS.click();
            if let Some(logger) = &self.logger {
                logger.log_error(endpoint, err);
            }
        }
        result
    }

    async fn post_empty(&self, endpoint: &str, segments: &[&str]) -> Result<Response> {
        let url = self.endpoint_url(segments)?;
        let request = self
            .client
            .post(url.clone())
            .headers(Self::default_headers());
        self.execute(endpoint, url, request).await
    }

    async fn post_json<T: serde::Serialize + ?Sized>(
        &self,
        endpoint: &str,
        segments: &[&str],
        body: &T,
    ) -> Result<Response> {
        let url = self.endpoint_url(segments)?;
        let request = self
            .client
            .post(url.clone())
            .headers(Self::default_headers())
            .json(body);
        self.execute(endpoint, url, request).await
    }

    async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        response.json::<T>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }

    /// Process an error response into an [`Error::Api`].
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();
        match response.text().await {
            Ok(body) => Error::api(status_code, error_message_from_body(&body)),
            Err(_) => Error::api(status_code, UNKNOWN_ERROR_MESSAGE),
        }
    }
}

/// Extract the `message` of a `{ "message": ... }` error body.
///
/// Anything else, including an empty message, yields [`UNKNOWN_ERROR_MESSAGE`].
pub fn error_message_from_body(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string())
}

#[async_trait::async_trait]
impl Backend for ChatClient {
    async fn start(&self, session: &SessionId) -> Result<()> {
        self.post_empty("start", &["start", session.as_str()])
            .await
            .map(|_| ())
    }

    async fn session(&self, session: &SessionId) -> Result<SessionInfo> {
        let response = self
            .post_empty("session", &["session", session.as_str()])
            .await?;
        Self::parse_json(response).await
    }

    async fn chat(&self, session: &SessionId, chat: &ChatId) -> Result<ChatDetail> {
        let response = self
            .post_empty("chat", &["chat", session.as_str(), chat.as_str()])
            .await?;
        Self::parse_json(response).await
    }

    async fn new_chat(
        &self,
        session: &SessionId,
        chat: &ChatId,
        model: &str,
        params: &NewChatParams,
    ) -> Result<()> {
        self.post_json(
            "newchat",
            &["newchat", session.as_str(), chat.as_str(), model],
            params,
        )
        .await
        .map(|_| ())
    }

    async fn send(
        &self,
        session: &SessionId,
        chat: &ChatId,
        index: Option<&str>,
        message: &str,
    ) -> Result<ByteStream> {
        let index = index.unwrap_or(NO_INDEX_SEGMENT);
        let response = self
            .post_json(
                "send",
                &["send", session.as_str(), chat.as_str(), index],
                message,
            )
            .await?;
        let logger = self.logger.clone();
        let stream = response.bytes_stream().map(move |result| {
            result
                .inspect(|bytes| {
                    if let Some(logger) = &logger {
                        logger.log_stream_chunk("send", bytes.len());
                    }
                })
                .map_err(|e| {
                    Error::streaming(format!("Error in HTTP stream: {}", e), Some(Box::new(e)))
                })
        });
        Ok(Box::pin(stream))
    }

    async fn clear(&self, session: &SessionId, chat: &ChatId) -> Result<()> {
        self.post_empty("clear", &["clear", session.as_str(), chat.as_str()])
            .await
            .map(|_| ())
    }

    async fn remove(&self, session: &SessionId, chat: &ChatId) -> Result<()> {
        self.post_empty("remove", &["remove", session.as_str(), chat.as_str()])
            .await
            .map(|_| ())
    }

    async fn stop(&self, session: &SessionId) -> Result<()> {
        self.post_empty("stop", &["stop", session.as_str()])
            .await
            .map(|_| ())
    }
}
