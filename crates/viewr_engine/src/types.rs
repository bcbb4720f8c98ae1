use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

/// Layout of the JSON body a request expects back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyShape {
    /// `{message}`
    Message,
    /// `{success, message?}`
    Status,
    /// `{new_req_url}`
    NewRequirement,
    /// `{success, <field>: html, message?}`
    Fragment { field: &'static str },
    /// Body is not read.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingRequest {
    pub method: HttpMethod,
    /// Absolute, or relative to the transport's base URL.
    pub url: String,
    /// Form-url-encoded body; sent as the query string for GET.
    pub body: String,
    pub shape: ReplyShape,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerReply {
    Message(String),
    Status {
        success: bool,
        message: Option<String>,
    },
    NewRequirement {
        url: Option<String>,
    },
    Fragment {
        success: bool,
        html: Option<String>,
        message: Option<String>,
    },
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: FailureKind,
    pub message: String,
}

impl TransportError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self.kind {
            FailureKind::HttpStatus(code) => Some(code),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Decode,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "reply too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Decode => write!(f, "undecodable reply"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
