use std::fmt;

use url::form_urlencoded;

use crate::Fingerprint;

/// Identifier of a form element, stored without the leading `#`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FormId(String);

impl FormId {
    /// Accepts both `req_text_form` and `#req_text_form`.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        match id.strip_prefix('#') {
            Some(stripped) => Self(stripped.to_string()),
            None => Self(id),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn selector(&self) -> String {
        format!("#{}", self.0)
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
}

impl Method {
    /// Interprets a form's `method` attribute; anything unrecognised is GET.
    pub fn from_attr(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "POST" => Method::Post,
            "PUT" => Method::Put,
            _ => Method::Get,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

/// Ordered name/value content of a form at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormSnapshot {
    fields: Vec<(String, String)>,
}

impl FormSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// Returns the snapshot with one more field appended after the existing ones.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `application/x-www-form-urlencoded` body, spaces encoded as `+`.
    pub fn serialize(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.fields.iter())
            .finish()
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&self.serialize())
    }
}

/// A form as read from the page: where it posts to and what it contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedForm {
    pub id: FormId,
    pub action: String,
    pub method: Method,
    pub snapshot: FormSnapshot,
}

/// A request ready for the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRequest {
    pub method: Method,
    pub url: String,
    pub body: String,
}

impl FormRequest {
    /// Request targeting the form's own method and action.
    pub fn from_form(form: &SubmittedForm) -> Self {
        Self {
            method: form.method,
            url: form.action.clone(),
            body: form.snapshot.serialize(),
        }
    }

    pub fn post(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            body: body.into(),
        }
    }
}
