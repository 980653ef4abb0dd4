//! Activity API.

use crate::client::Api;
use crate::error::ErrorKind;
use crate::mapping::{ErrorMapping, ErrorRule};
use crate::payload::Payload;
use crate::query::{FilterQuery, ObjectQuery, PaginatedQuery};
use crate::request::RequestSpec;

use super::{
    FILTER_NOT_FOUND, INVALID_FILTER_CONDITION, INVALID_FILTER_FIELD, INVALID_SORT_FIELD,
    INVALID_SORT_ORDER, MISSING_FIELDS,
};

const LIST_ERRORS: &[ErrorRule] = &[
    FILTER_NOT_FOUND,
    INVALID_FILTER_CONDITION,
    INVALID_FILTER_FIELD,
    INVALID_SORT_FIELD,
    INVALID_SORT_ORDER,
    MISSING_FIELDS,
];

const LIST_COUNT_ERRORS: &[ErrorRule] = &[
    FILTER_NOT_FOUND,
    INVALID_FILTER_CONDITION,
    INVALID_FILTER_FIELD,
    MISSING_FIELDS,
    ErrorRule::code(
        "RUNNING",
        ErrorKind::Running,
        "This call is currently runnning for the user",
    ),
];

const GET_ERRORS: &[ErrorRule] = &[
    MISSING_FIELDS,
    ErrorRule::code("NOT_FOUND", ErrorKind::NotFound, "The activity was not found"),
    ErrorRule::code(
        "NOT_PERMITTED",
        ErrorKind::NotPermitted,
        "You are not permitted to access this activity",
    ),
];

const DELETE_ERRORS: &[ErrorRule] = &[
    MISSING_FIELDS,
    ErrorRule::code("NOT_FOUND", ErrorKind::NotFound, "The activity was not found"),
    ErrorRule::code(
        "NOT_PERMITTED",
        ErrorKind::NotPermitted,
        "You are not permitted to delete this activity",
    ),
];

/// Activity API client.
pub struct ActivityApi {
    api: Api,
}

impl ActivityApi {
    pub(crate) fn new(api: Api) -> Self {
        Self { api }
    }

    /// List activities in an account plus the caller's personal ones.
    ///
    /// `strict_account_filter` applies the account to personal activities
    /// as well.
    pub fn list(&self, account_id: &str, strict_account_filter: Option<bool>) -> PaginatedQuery {
        let payload = Payload::new()
            .set("account_id", account_id)
            .optional("strict_account_filter", strict_account_filter);
        let spec = RequestSpec::service("/activity/list", payload, ErrorMapping::new(LIST_ERRORS))
            .paginated("activities");
        PaginatedQuery::new(self.api.clone(), spec)
    }

    /// Number of activities matching the filters given on the query.
    pub fn list_count(&self, account_id: &str) -> FilterQuery {
        let payload = Payload::new().set("account_id", account_id);
        let spec = RequestSpec::service(
            "/activity/list/count",
            payload,
            ErrorMapping::new(LIST_COUNT_ERRORS),
        )
        .single_field("count");
        FilterQuery::new(self.api.clone(), spec)
    }

    /// Get an activity.
    pub fn get(&self, uuid: &str) -> ObjectQuery {
        self.by_uuid("/activity/get", uuid, GET_ERRORS)
    }

    /// Delete an activity.
    pub fn delete(&self, uuid: &str) -> ObjectQuery {
        self.by_uuid("/activity/delete", uuid, DELETE_ERRORS)
    }

    fn by_uuid(&self, path: &str, uuid: &str, errors: &'static [ErrorRule]) -> ObjectQuery {
        let payload = Payload::new().set("uuid", uuid);
        let spec = RequestSpec::service(path, payload, ErrorMapping::new(errors));
        ObjectQuery::new(self.api.clone(), spec)
    }
}
