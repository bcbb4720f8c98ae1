use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;
use viewr_logging::viewr_debug;

use crate::{FailureKind, HttpMethod, OutgoingRequest, ReplyShape, ServerReply, TransportError};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";
const JSON_ACCEPT: &str = "application/json, text/javascript, */*; q=0.01";

#[derive(Debug, Clone)]
pub struct TransportSettings {
    /// Base for relative form actions.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_reply_bytes: u64,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_reply_bytes: 1024 * 1024,
        }
    }
}

#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn submit(&self, request: &OutgoingRequest) -> Result<ServerReply, TransportError>;
}

/// Form-encoded requests with JSON replies, the way the page's AJAX calls
/// talk to the viewR server.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    base: Url,
    client: reqwest::Client,
    max_reply_bytes: u64,
}

impl ReqwestTransport {
    pub fn new(settings: TransportSettings) -> Result<Self, TransportError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|err| TransportError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| TransportError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            base,
            client,
            max_reply_bytes: settings.max_reply_bytes,
        })
    }

    /// Resolves a form action against the base URL. An empty action means
    /// the base itself, as it does for a page's own URL.
    pub fn resolve(&self, url: &str) -> Result<Url, TransportError> {
        self.base
            .join(url)
            .map_err(|err| TransportError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<Vec<u8>, TransportError> {
        if let Some(content_len) = response.content_length() {
            if content_len > self.max_reply_bytes {
                return Err(TransportError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.max_reply_bytes,
                        actual: Some(content_len),
                    },
                    "reply too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.max_reply_bytes {
                return Err(TransportError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.max_reply_bytes,
                        actual: Some(next_len),
                    },
                    "reply too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn submit(&self, request: &OutgoingRequest) -> Result<ServerReply, TransportError> {
        let mut url = self.resolve(&request.url)?;
        let builder = match request.method {
            HttpMethod::Get => {
                if !request.body.is_empty() {
                    let query = match url.query() {
                        Some(existing) if !existing.is_empty() => {
                            format!("{existing}&{}", request.body)
                        }
                        _ => request.body.clone(),
                    };
                    url.set_query(Some(&query));
                }
                self.client.get(url.clone())
            }
            HttpMethod::Post => self
                .client
                .post(url.clone())
                .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                .body(request.body.clone()),
            HttpMethod::Put => self
                .client
                .put(url.clone())
                .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                .body(request.body.clone()),
        };

        viewr_debug!(
            "submit {:?} {} body_len={}",
            request.method,
            url,
            request.body.len()
        );
        let response = builder
            .header(ACCEPT, JSON_ACCEPT)
            .header("X-Requested-With", "XMLHttpRequest")
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if request.shape == ReplyShape::Ignored {
            return Ok(ServerReply::Empty);
        }

        let bytes = self.read_body(response).await?;
        decode_reply(request.shape, &bytes)
    }
}

#[derive(Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct StatusBody {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct NewRequirementBody {
    #[serde(default)]
    new_req_url: Option<String>,
}

#[derive(Deserialize)]
struct FragmentBody {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

/// Decodes a JSON reply body into the expected shape.
pub fn decode_reply(shape: ReplyShape, bytes: &[u8]) -> Result<ServerReply, TransportError> {
    fn parse<'a, T: Deserialize<'a>>(bytes: &'a [u8]) -> Result<T, TransportError> {
        serde_json::from_slice(bytes)
            .map_err(|err| TransportError::new(FailureKind::Decode, err.to_string()))
    }

    match shape {
        ReplyShape::Message => {
            let body: MessageBody = parse(bytes)?;
            Ok(ServerReply::Message(body.message.unwrap_or_default()))
        }
        ReplyShape::Status => {
            let body: StatusBody = parse(bytes)?;
            Ok(ServerReply::Status {
                success: body.success,
                message: body.message,
            })
        }
        ReplyShape::NewRequirement => {
            let body: NewRequirementBody = parse(bytes)?;
            Ok(ServerReply::NewRequirement {
                url: body.new_req_url,
            })
        }
        ReplyShape::Fragment { field } => {
            let body: FragmentBody = parse(bytes)?;
            Ok(ServerReply::Fragment {
                success: body.success,
                html: body
                    .rest
                    .get(field)
                    .and_then(Value::as_str)
                    .map(ToOwned::to_owned),
                message: body.message,
            })
        }
        ReplyShape::Ignored => Ok(ServerReply::Empty),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::new(FailureKind::Timeout, err.to_string());
    }
    TransportError::new(FailureKind::Network, err.to_string())
}
