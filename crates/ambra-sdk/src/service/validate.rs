//! Validation rule API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::Api;
use crate::error::{ErrorKind, Result};
use crate::mapping::{ErrorMapping, ErrorRule};
use crate::payload::Payload;
use crate::query::{ObjectQuery, PaginatedQuery};
use crate::request::RequestSpec;

use super::{
    FILTER_NOT_FOUND, INVALID_FILTER_CONDITION, INVALID_FILTER_FIELD, INVALID_SORT_FIELD,
    INVALID_SORT_ORDER, MISSING_FIELDS,
};

const INVALID_CONDITION: ErrorRule = ErrorRule::code(
    "INVALID_CONDITION",
    ErrorKind::InvalidCondition,
    "A condition is invalid. The error_subtype holds more detail",
);

const LIST_ERRORS: &[ErrorRule] = &[
    FILTER_NOT_FOUND,
    INVALID_FILTER_CONDITION,
    INVALID_FILTER_FIELD,
    INVALID_SORT_FIELD,
    INVALID_SORT_ORDER,
    MISSING_FIELDS,
    ErrorRule::code(
        "NOT_PERMITTED",
        ErrorKind::NotPermitted,
        "You are not permitted to view the validation rule",
    ),
];

const ADD_ERRORS: &[ErrorRule] = &[
    INVALID_CONDITION,
    MISSING_FIELDS,
    ErrorRule::code(
        "NOT_FOUND",
        ErrorKind::NotFound,
        "The object was not found. The error_subtype holds the type of the object",
    ),
    ErrorRule::code(
        "NOT_PERMITTED",
        ErrorKind::NotPermitted,
        "You are not permitted to add validation rules",
    ),
];

const SET_ERRORS: &[ErrorRule] = &[
    INVALID_CONDITION,
    MISSING_FIELDS,
    ErrorRule::code("NOT_FOUND", ErrorKind::NotFound, "The validation rule was not found"),
    ErrorRule::code(
        "NOT_PERMITTED",
        ErrorKind::NotPermitted,
        "You are not permitted to add validation rules",
    ),
];

const GET_ERRORS: &[ErrorRule] = &[
    MISSING_FIELDS,
    ErrorRule::code("NOT_FOUND", ErrorKind::NotFound, "The validate was not found."),
    ErrorRule::code(
        "NOT_PERMITTED",
        ErrorKind::NotPermitted,
        "You are not permitted to view the validation rule",
    ),
];

const DELETE_ERRORS: &[ErrorRule] = &[
    ErrorRule::code(
        "IN_USE",
        ErrorKind::InUse,
        "The validation rule is used in a routing rule",
    ),
    MISSING_FIELDS,
    ErrorRule::code("NOT_FOUND", ErrorKind::NotFound, "The validation rule  was not found."),
    ErrorRule::code(
        "NOT_PERMITTED",
        ErrorKind::NotPermitted,
        "You are not permitted to delete the validation rule",
    ),
];

/// Parameters of `/validate/add`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddValidateRequest {
    pub account_id: String,
    /// Validation conditions, as a JSON string or structured value.
    pub conditions: Value,
    pub name: String,
}

/// Parameters of `/validate/set`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetValidateRequest {
    pub uuid: String,
    pub conditions: Value,
    pub name: String,
}

/// Validation rule API client.
pub struct ValidateApi {
    api: Api,
}

impl ValidateApi {
    pub(crate) fn new(api: Api) -> Self {
        Self { api }
    }

    /// List the validation rules of an account.
    pub fn list(&self, account_id: &str) -> PaginatedQuery {
        let spec = RequestSpec::service(
            "/validate/list",
            Payload::new().set("account_id", account_id),
            ErrorMapping::new(LIST_ERRORS),
        )
        .paginated("validates");
        PaginatedQuery::new(self.api.clone(), spec)
    }

    /// Add a validation rule.
    pub fn add(&self, request: &AddValidateRequest) -> Result<ObjectQuery> {
        let payload = Payload::from_request(request)?;
        Ok(self.query("/validate/add", payload, ADD_ERRORS))
    }

    /// Replace a validation rule's name and conditions.
    pub fn set(&self, request: &SetValidateRequest) -> Result<ObjectQuery> {
        let payload = Payload::from_request(request)?;
        Ok(self.query("/validate/set", payload, SET_ERRORS))
    }

    /// Get a validation rule.
    pub fn get(&self, uuid: &str) -> ObjectQuery {
        self.query("/validate/get", Payload::new().set("uuid", uuid), GET_ERRORS)
    }

    /// Delete a validation rule. Fails with `IN_USE` while a routing rule
    /// references it.
    pub fn delete(&self, uuid: &str) -> ObjectQuery {
        self.query("/validate/delete", Payload::new().set("uuid", uuid), DELETE_ERRORS)
    }

    fn query(&self, path: &str, payload: Payload, errors: &'static [ErrorRule]) -> ObjectQuery {
        ObjectQuery::new(
            self.api.clone(),
            RequestSpec::service(path, payload, ErrorMapping::new(errors)),
        )
    }
}
