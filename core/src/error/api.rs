use std::{error::Error as StdError, fmt};

const NETWORK_MESSAGE: &str = "Network or server error. Check the connection.";
const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please log in again.";
const MISSING_CREDENTIAL_MESSAGE: &str = "Authentication required: no access token found.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    MissingCredential,
    Unauthorized,
    Timeout,
    Connect,
    Request,
    Body,
    Decode,
    Status,
    Unknown,
}

impl ApiErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::Unauthorized => "unauthorized",
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Request => "request",
            Self::Body => "body",
            Self::Decode => "decode",
            Self::Status => "status",
            Self::Unknown => "unknown",
        }
    }

    /// True when the request never produced a usable response.
    pub fn is_transport(self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::Connect | Self::Request | Self::Body | Self::Decode | Self::Unknown
        )
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure talking to the workshop API.
///
/// `detail` holds the authority's machine-readable `detail` field when the
/// response carried one; `message` is the transport description or the
/// canonical status reason.
#[derive(Debug)]
pub struct ApiError {
    kind: ApiErrorKind,
    status: Option<u16>,
    url: Option<String>,
    detail: Option<String>,
    message: String,
    source: Option<anyhow::Error>,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            url: None,
            detail: None,
            message: message.into(),
            source: None,
        }
    }

    pub fn missing_credential(url: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::MissingCredential, "no access token available").with_url(url)
    }

    pub fn unauthorized(url: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Unauthorized, "Unauthorized")
            .with_status(401)
            .with_url(url)
    }

    /// Non-success response. `reason` is the canonical status text used when
    /// the body has no detail.
    pub fn rejected(
        status: u16,
        url: impl Into<String>,
        detail: Option<String>,
        reason: impl Into<String>,
    ) -> Self {
        let mut err = Self::new(ApiErrorKind::Status, reason)
            .with_status(status)
            .with_url(url);
        err.detail = detail.filter(|d| !d.trim().is_empty());
        err
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    pub fn kind(&self) -> ApiErrorKind {
        self.kind
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Text for the presentation layer.
    pub fn user_message(&self) -> String {
        match self.kind {
            ApiErrorKind::MissingCredential => MISSING_CREDENTIAL_MESSAGE.to_string(),
            ApiErrorKind::Unauthorized => SESSION_EXPIRED_MESSAGE.to_string(),
            ApiErrorKind::Status => {
                let text = self.detail.as_deref().unwrap_or(self.message.as_str());
                match self.status {
                    Some(code) => format!("API error ({}): {}", code, text),
                    None => format!("API error: {}", text),
                }
            }
            _ => NETWORK_MESSAGE.to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "workshop api error kind={}", self.kind)?;
        if let Some(status) = self.status {
            write!(f, " status={}", status)?;
        }
        if let Some(url) = &self.url {
            write!(f, " url={}", url)?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(detail) = &self.detail {
            write!(f, " | detail={}", detail)?;
        }
        Ok(())
    }
}

impl StdError for ApiError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|err| &**err as &(dyn StdError + 'static))
    }
}
