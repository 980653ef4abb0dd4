//! Client error types.
//!
//! Every failure the server reports through a known error code becomes a
//! [`ResponseError`]: one [`ErrorKind`] plus the call-site description and
//! the optional server-supplied subtype. Anything the server reports that
//! an endpoint does not map surfaces as [`Error::Unclassified`].

use std::borrow::Cow;
use std::fmt;

use thiserror::Error;

/// Broad grouping of error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Access was refused (stale session or insufficient rights).
    Auth,
    /// The target object does not exist.
    NotFound,
    /// The stored object cannot be rendered in the requested media type.
    UnsupportedMedia,
    /// A request precondition did not hold.
    PreconditionFailed,
    /// A request parameter was rejected.
    Validation,
    /// Required parameters were absent.
    MissingFields,
    /// The request conflicts with existing state.
    Conflict,
    /// The same operation is still running.
    InProgress,
    /// The server-side operation failed.
    Failed,
}

/// Kind of a server-reported failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    PermissionDenied,
    NotFound,
    UnsupportedMediaType,
    PreconditionFailed,
    NotPermitted,
    MissingFields,
    InvalidField,
    InvalidCondition,
    InvalidSortField,
    InvalidSortOrder,
    InvalidJson,
    InvalidOption,
    InvalidFlag,
    InvalidSchedule,
    InvalidManualRoles,
    InvalidAction,
    InvalidLinkage,
    InvalidOtherNamespaces,
    FilterNotFound,
    AccountNotFound,
    InUse,
    Running,
    ReportFailed,
}

impl ErrorKind {
    /// Wire-level error code.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::PermissionDenied => "PERMISSION_DENIED",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::UnsupportedMediaType => "UNSUPPORTED_MEDIA_TYPE",
            ErrorKind::PreconditionFailed => "PRECONDITION_FAILED",
            ErrorKind::NotPermitted => "NOT_PERMITTED",
            ErrorKind::MissingFields => "MISSING_FIELDS",
            ErrorKind::InvalidField => "INVALID_FIELD",
            ErrorKind::InvalidCondition => "INVALID_CONDITION",
            ErrorKind::InvalidSortField => "INVALID_SORT_FIELD",
            ErrorKind::InvalidSortOrder => "INVALID_SORT_ORDER",
            ErrorKind::InvalidJson => "INVALID_JSON",
            ErrorKind::InvalidOption => "INVALID_OPTION",
            ErrorKind::InvalidFlag => "INVALID_FLAG",
            ErrorKind::InvalidSchedule => "INVALID_SCHEDULE",
            ErrorKind::InvalidManualRoles => "INVALID_MANUAL_ROLES",
            ErrorKind::InvalidAction => "INVALID_ACTION",
            ErrorKind::InvalidLinkage => "INVALID_LINKAGE",
            ErrorKind::InvalidOtherNamespaces => "INVALID_OTHER_NAMESPACES",
            ErrorKind::FilterNotFound => "FILTER_NOT_FOUND",
            ErrorKind::AccountNotFound => "ACCOUNT_NOT_FOUND",
            ErrorKind::InUse => "IN_USE",
            ErrorKind::Running => "RUNNING",
            ErrorKind::ReportFailed => "REPORT_FAILED",
        }
    }

    /// HTTP status bound to this kind, where the server uses one.
    pub fn status(self) -> Option<u16> {
        match self {
            ErrorKind::PermissionDenied => Some(403),
            ErrorKind::NotFound => Some(404),
            ErrorKind::PreconditionFailed => Some(412),
            ErrorKind::UnsupportedMediaType => Some(415),
            _ => None,
        }
    }

    /// Description used when a call site supplies none.
    pub fn default_description(self) -> &'static str {
        match self {
            ErrorKind::PermissionDenied => "Access denied. Wrong sid",
            ErrorKind::NotFound => "Not found",
            ErrorKind::UnsupportedMediaType => {
                "Video was not found encapsulated in the DICOM file."
            }
            ErrorKind::PreconditionFailed => "Precondition failed.",
            ErrorKind::NotPermitted => "You are not permitted to do this",
            ErrorKind::MissingFields => {
                "A required field is missing or does not have data in it."
            }
            ErrorKind::InvalidField => "The field is not valid for this object.",
            ErrorKind::InvalidCondition => "The condition is not supported.",
            ErrorKind::InvalidSortField => "The sort field is not valid for this object.",
            ErrorKind::InvalidSortOrder => "The sort order for the field is invalid.",
            ErrorKind::InvalidJson => "The field is not in valid JSON format.",
            ErrorKind::InvalidOption => "An option is invalid.",
            ErrorKind::InvalidFlag => "An invalid flag was passed.",
            ErrorKind::InvalidSchedule => "The schedule is invalid.",
            ErrorKind::InvalidManualRoles => "The manual_roles is invalid.",
            ErrorKind::InvalidAction => "An action is invalid.",
            ErrorKind::InvalidLinkage => "The linkage is invalid.",
            ErrorKind::InvalidOtherNamespaces => "The other_namespaces is invalid.",
            ErrorKind::FilterNotFound => "The filter can not be found.",
            ErrorKind::AccountNotFound => "The account was not found.",
            ErrorKind::InUse => "The object is in use.",
            ErrorKind::Running => "This call is currently running for the user.",
            ErrorKind::ReportFailed => "The report failed.",
        }
    }

    /// Group this kind belongs to.
    pub fn category(self) -> ErrorCategory {
        match self {
            ErrorKind::PermissionDenied | ErrorKind::NotPermitted => ErrorCategory::Auth,
            ErrorKind::NotFound => ErrorCategory::NotFound,
            ErrorKind::UnsupportedMediaType => ErrorCategory::UnsupportedMedia,
            ErrorKind::PreconditionFailed => ErrorCategory::PreconditionFailed,
            ErrorKind::MissingFields => ErrorCategory::MissingFields,
            ErrorKind::InvalidField
            | ErrorKind::InvalidCondition
            | ErrorKind::InvalidSortField
            | ErrorKind::InvalidSortOrder
            | ErrorKind::InvalidJson
            | ErrorKind::InvalidOption
            | ErrorKind::InvalidFlag
            | ErrorKind::InvalidSchedule
            | ErrorKind::InvalidManualRoles
            | ErrorKind::InvalidAction
            | ErrorKind::InvalidLinkage
            | ErrorKind::InvalidOtherNamespaces => ErrorCategory::Validation,
            ErrorKind::FilterNotFound | ErrorKind::AccountNotFound | ErrorKind::InUse => {
                ErrorCategory::Conflict
            }
            ErrorKind::Running => ErrorCategory::InProgress,
            ErrorKind::ReportFailed => ErrorCategory::Failed,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A server failure resolved through an endpoint's error mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseError {
    kind: ErrorKind,
    description: Cow<'static, str>,
    subtype: Option<String>,
}

impl ResponseError {
    /// Create an error carrying the kind's default description.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            description: Cow::Borrowed(kind.default_description()),
            subtype: None,
        }
    }

    /// Replace the description with call-site detail.
    pub fn with_description(mut self, description: impl Into<Cow<'static, str>>) -> Self {
        self.description = description.into();
        self
    }

    /// Attach the server-reported subtype.
    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = Some(subtype.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Wire-level error code.
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// HTTP status bound to the kind.
    pub fn status(&self) -> Option<u16> {
        self.kind.status()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Server-supplied detail naming the offending part of the request.
    pub fn subtype(&self) -> Option<&str> {
        self.subtype.as_deref()
    }
}

impl fmt::Display for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)?;
        if let Some(subtype) = &self.subtype {
            write!(f, " ({})", subtype)?;
        }
        Ok(())
    }
}

impl std::error::Error for ResponseError {}

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Server reported an error the endpoint maps.
    #[error("{} [{}]", .0, .0.code())]
    Response(ResponseError),

    /// Server reported an error the endpoint does not map.
    #[error("unrecognized server error (HTTP {status}, code {}): {body}", .code.as_deref().unwrap_or("none"))]
    Unclassified {
        /// HTTP status code.
        status: u16,
        /// Raw error code, when the body carried one.
        code: Option<String>,
        /// Raw response body.
        body: String,
    },

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No session id is available and none can be obtained.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A successful response lacked an expected field.
    #[error("response field '{0}' is missing")]
    MissingField(String),
}

impl From<ResponseError> for Error {
    fn from(err: ResponseError) -> Self {
        Error::Response(err)
    }
}

impl From<ambra_config::ConfigError> for Error {
    fn from(err: ambra_config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

impl Error {
    /// The mapped server error, if this is one.
    pub fn response(&self) -> Option<&ResponseError> {
        match self {
            Error::Response(err) => Some(err),
            _ => None,
        }
    }

    /// Kind of the mapped server error, if this is one.
    pub fn kind(&self) -> Option<ErrorKind> {
        self.response().map(ResponseError::kind)
    }

    /// Check if this is a mapped error of the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind() == Some(kind)
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        self.is(ErrorKind::NotFound)
    }

    /// Check if this is a storage permission error.
    pub fn is_permission_denied(&self) -> bool {
        self.is(ErrorKind::PermissionDenied)
    }

    /// Check if this is a parameter validation error.
    pub fn is_validation(&self) -> bool {
        self.kind()
            .is_some_and(|k| k.category() == ErrorCategory::Validation)
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
