//! Session API.

use crate::client::Api;
use crate::error::ErrorKind;
use crate::mapping::{ErrorMapping, ErrorRule};
use crate::payload::Payload;
use crate::query::ObjectQuery;
use crate::request::RequestSpec;

const LOGIN_ERRORS: &[ErrorRule] = &[
    ErrorRule::code(
        "BAD_PASSWORD",
        ErrorKind::PermissionDenied,
        "The password is invalid",
    ),
    super::MISSING_FIELDS,
    ErrorRule::code("NOT_FOUND", ErrorKind::NotFound, "The user was not found"),
];

const LOGOUT_ERRORS: &[ErrorRule] = &[super::MISSING_FIELDS];

/// Login request. Sent without a session id.
pub(crate) fn login_spec(login: &str, password: &str) -> RequestSpec {
    RequestSpec::service(
        "/session/login",
        Payload::new()
            .set("login", login)
            .set("password", password),
        ErrorMapping::new(LOGIN_ERRORS),
    )
    .required_sid(false)
}

/// Session API client.
pub struct SessionApi {
    api: Api,
}

impl SessionApi {
    pub(crate) fn new(api: Api) -> Self {
        Self { api }
    }

    /// Log in and return the response holding `sid`.
    ///
    /// This does not change the client's session id; use [`Api::login`]
    /// for that.
    pub fn login(&self, login: &str, password: &str) -> ObjectQuery {
        ObjectQuery::new(self.api.clone(), login_spec(login, password))
    }

    /// End the current session.
    pub fn logout(&self) -> ObjectQuery {
        let errors = ErrorMapping::new(LOGOUT_ERRORS);
        let spec = RequestSpec::service("/session/logout", Payload::new(), errors);
        ObjectQuery::new(self.api.clone(), spec)
    }
}
