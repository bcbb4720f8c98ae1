use std::fmt;

use crate::{FeedbackId, FormId, FragmentKind};

/// Decoded server reply, already narrowed to the shape the request expected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `{message}` from a menu action.
    Message { message: String },
    /// `{success, message?}`.
    Status {
        success: bool,
        message: Option<String>,
    },
    /// `{new_req_url}`.
    NewRequirement { url: Option<String> },
    /// `{success, <fragment field>, message?}`.
    Fragment {
        success: bool,
        html: Option<String>,
        message: Option<String>,
    },
    /// Body not inspected.
    Empty,
}

/// Transport-level failure: unreachable server, non-2xx status or an
/// undecodable body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFailure {
    pub status: Option<u16>,
    pub reason: String,
}

impl RequestFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            status: None,
            reason: reason.into(),
        }
    }

    pub fn with_status(status: u16, reason: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (status {status})", self.reason),
            None => write!(f, "{}", self.reason),
        }
    }
}

pub type RequestOutcome = Result<Reply, RequestFailure>;

/// What a request was issued for; travels with the request and comes back
/// with its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPurpose {
    MenuAction { feedback_id: FeedbackId },
    Autosave { form: FormId },
    PathChange,
    NewRequirement,
    FragmentAdd(FragmentKind),
    FragmentDelete(FragmentKind),
}

/// Reply body layout expected for a purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyShape {
    Message,
    Status,
    NewRequirement,
    Fragment { field: &'static str },
    Ignored,
}

impl RequestPurpose {
    pub fn reply_shape(&self) -> ReplyShape {
        match self {
            RequestPurpose::MenuAction { .. } => ReplyShape::Message,
            RequestPurpose::Autosave { .. } => ReplyShape::Ignored,
            RequestPurpose::PathChange => ReplyShape::Status,
            RequestPurpose::NewRequirement => ReplyShape::NewRequirement,
            RequestPurpose::FragmentAdd(kind) | RequestPurpose::FragmentDelete(kind) => {
                ReplyShape::Fragment {
                    field: kind.reply_field(),
                }
            }
        }
    }
}
