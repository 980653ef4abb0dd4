//! Per-endpoint error mappings.
//!
//! Each endpoint declares a static table binding what the server reports
//! (an error code on the service tier, an HTTP status on the storage tier)
//! to one [`ErrorKind`] and an optional call-site description.

use crate::error::{ErrorKind, ResponseError};

/// What a rule matches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorMatch {
    /// Service-tier error code such as `NOT_FOUND`.
    Code(&'static str),
    /// Storage-tier HTTP status.
    Status(u16),
}

/// One entry of an error mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorRule {
    pub on: ErrorMatch,
    pub kind: ErrorKind,
    pub description: Option<&'static str>,
}

impl ErrorRule {
    /// Map a service error code, with a call-site description.
    pub const fn code(code: &'static str, kind: ErrorKind, description: &'static str) -> Self {
        Self {
            on: ErrorMatch::Code(code),
            kind,
            description: Some(description),
        }
    }

    /// Map a storage status to the kind's default description.
    pub const fn status(status: u16, kind: ErrorKind) -> Self {
        Self {
            on: ErrorMatch::Status(status),
            kind,
            description: None,
        }
    }

    /// Map a storage status, with a call-site description.
    pub const fn status_described(
        status: u16,
        kind: ErrorKind,
        description: &'static str,
    ) -> Self {
        Self {
            on: ErrorMatch::Status(status),
            kind,
            description: Some(description),
        }
    }

    /// Build the error this rule produces.
    pub fn to_error(&self, subtype: Option<&str>) -> ResponseError {
        let mut err = ResponseError::new(self.kind);
        if let Some(description) = self.description {
            err = err.with_description(description);
        }
        if let Some(subtype) = subtype {
            err = err.with_subtype(subtype);
        }
        err
    }
}

/// A static table from server-reported condition to error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorMapping {
    rules: &'static [ErrorRule],
}

impl ErrorMapping {
    /// Mapping that recognizes nothing.
    pub const EMPTY: ErrorMapping = ErrorMapping { rules: &[] };

    pub const fn new(rules: &'static [ErrorRule]) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &'static [ErrorRule] {
        self.rules
    }

    /// Find the rule for a service error code.
    pub fn by_code(&self, code: &str) -> Option<&'static ErrorRule> {
        self.rules
            .iter()
            .find(|rule| matches!(rule.on, ErrorMatch::Code(c) if c == code))
    }

    /// Find the rule for a storage HTTP status.
    pub fn by_status(&self, status: u16) -> Option<&'static ErrorRule> {
        self.rules
            .iter()
            .find(|rule| matches!(rule.on, ErrorMatch::Status(s) if s == status))
    }

    /// Whether any rule maps the given kind.
    pub fn maps(&self, kind: ErrorKind) -> bool {
        self.rules.iter().any(|rule| rule.kind == kind)
    }

    /// True when no condition appears twice, so lookups are unambiguous.
    pub fn is_unambiguous(&self) -> bool {
        self.rules
            .iter()
            .enumerate()
            .all(|(i, rule)| self.rules[..i].iter().all(|prev| prev.on != rule.on))
    }
}
