//! Routing rule API.

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

const INVALID_ACTION: ErrorRule = ErrorRule::code(
    "INVALID_ACTION",
    ErrorKind::InvalidAction,
    "An action is invalid. The error_subtype holds the error detail",
);
const INVALID_CONDITION: ErrorRule = ErrorRule::code(
    "INVALID_CONDITION",
    ErrorKind::InvalidCondition,
    "A condition is invalid. The error_subtype holds the condition",
);
const INVALID_FLAG: ErrorRule = ErrorRule::code(
    "INVALID_FLAG",
    ErrorKind::InvalidFlag,
    "An invalid flag was passed. The error_subtype holds the name of the invalid flag",
);
const INVALID_JSON: ErrorRule = ErrorRule::code(
    "INVALID_JSON",
    ErrorKind::InvalidJson,
    "The field is not in valid JSON format. The error_subtype holds the name of the field",
);
const INVALID_MANUAL_ROLES: ErrorRule = ErrorRule::code(
    "INVALID_MANUAL_ROLES",
    ErrorKind::InvalidManualRoles,
    "The manual_roles is invalid. The error_subtype holds the error detail",
);
const INVALID_OPTION: ErrorRule = ErrorRule::code(
    "INVALID_OPTION",
    ErrorKind::InvalidOption,
    "An option is invalid. The error_subtype holds the error detail",
);
const INVALID_OTHER_NAMESPACES: ErrorRule = ErrorRule::code(
    "INVALID_OTHER_NAMESPACES",
    ErrorKind::InvalidOtherNamespaces,
    "The other_namespaces is invalid. The error_subtype holds the error detail",
);
const INVALID_SCHEDULE: ErrorRule = ErrorRule::code(
    "INVALID_SCHEDULE",
    ErrorKind::InvalidSchedule,
    "The schedule is invalid. The error_subtype holds the error detail",
);

const LIST_ERRORS: &[ErrorRule] = &[
    FILTER_NOT_FOUND,
    INVALID_FILTER_CONDITION,
    INVALID_FILTER_FIELD,
    INVALID_SORT_FIELD,
    INVALID_SORT_ORDER,
    MISSING_FIELDS,
    ErrorRule::code("NOT_FOUND", ErrorKind::NotFound, "The account can not be found"),
    ErrorRule::code(
        "NOT_PERMITTED",
        ErrorKind::NotPermitted,
        "You are not permitted to view this list",
    ),
];

const ADD_ERRORS: &[ErrorRule] = &[
    ErrorRule::code("ACCOUNT_NOT_FOUND", ErrorKind::AccountNotFound, "The account was not found"),
    INVALID_ACTION,
    INVALID_CONDITION,
    INVALID_FLAG,
    INVALID_JSON,
    ErrorRule::code("INVALID_LINKAGE", ErrorKind::InvalidLinkage, "The linkage is invalid"),
    INVALID_MANUAL_ROLES,
    INVALID_OPTION,
    INVALID_OTHER_NAMESPACES,
    INVALID_SCHEDULE,
    MISSING_FIELDS,
    ErrorRule::code(
        "NOT_PERMITTED",
        ErrorKind::NotPermitted,
        "You are not permitted to add a route to that account",
    ),
];

const SET_ERRORS: &[ErrorRule] = &[
    INVALID_ACTION,
    INVALID_CONDITION,
    INVALID_FLAG,
    INVALID_JSON,
    INVALID_MANUAL_ROLES,
    INVALID_OPTION,
    INVALID_OTHER_NAMESPACES,
    INVALID_SCHEDULE,
    MISSING_FIELDS,
    ErrorRule::code("NOT_FOUND", ErrorKind::NotFound, "The route can not be found"),
    ErrorRule::code(
        "NOT_PERMITTED",
        ErrorKind::NotPermitted,
        "You are not permitted to edit the route",
    ),
];

const GET_ERRORS: &[ErrorRule] = &[
    MISSING_FIELDS,
    ErrorRule::code("NOT_FOUND", ErrorKind::NotFound, "The route can not be found"),
    ErrorRule::code(
        "NOT_PERMITTED",
        ErrorKind::NotPermitted,
        "You are not permitted to view the route",
    ),
];

const DELETE_ERRORS: &[ErrorRule] = &[
    MISSING_FIELDS,
    ErrorRule::code("NOT_FOUND", ErrorKind::NotFound, "The route can not be found"),
    ErrorRule::code(
        "NOT_PERMITTED",
        ErrorKind::NotPermitted,
        "You are not permitted to delete the route",
    ),
];

const ALIAS_MATCH_ERRORS: &[ErrorRule] = &[
    MISSING_FIELDS,
    ErrorRule::code("NOT_FOUND", ErrorKind::NotFound, "The account can not be found"),
    ErrorRule::code("NOT_PERMITTED", ErrorKind::NotPermitted, "You are not permitted to do this"),
];

/// Parameters of `/route/add`.
///
/// The rule links to exactly one of `account_id`, `group_id`,
/// `location_id` or `namespace_id`. JSON-valued members accept either a
/// JSON string or a structured value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddRouteRequest {
    /// Route actions.
    pub actions: Value,
    /// Route conditions.
    pub conditions: Value,
    pub name: String,
    /// Apply to studies harvested into the namespace.
    pub on_harvest: bool,
    /// Apply to studies shared into the namespace.
    pub on_share: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    /// Minutes to wait after the rule triggers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<u32>,
    /// Wait until the next scheduled time after the rule triggers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_till_schedule: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    /// Comma separated role uuids allowed to run the rule manually.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_roles: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_id: Option<String>,
    /// Skip re-notifications from storage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_re_run: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_manual_route: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_thin: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_upload: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
    /// Comma separated uuids of further namespaces the rule applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_namespaces: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspended: Option<bool>,
}

/// Parameters of `/route/set`. Only supplied members change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetRouteRequest {
    pub uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_till_schedule: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_roles: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_re_run: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_harvest: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_manual_route: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_share: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_thin: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_upload: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_namespaces: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspended: Option<bool>,
}

/// Routing rule API client.
pub struct RouteApi {
    api: Api,
}

impl RouteApi {
    pub(crate) fn new(api: Api) -> Self {
        Self { api }
    }

    /// List the routing rules of an account.
    pub fn list(&self, account_id: &str) -> PaginatedQuery {
        let spec = RequestSpec::service(
            "/route/list",
            Payload::new().set("account_id", account_id),
            ErrorMapping::new(LIST_ERRORS),
        )
        .paginated("routes");
        PaginatedQuery::new(self.api.clone(), spec)
    }

    /// Add a routing rule.
    pub fn add(&self, request: &AddRouteRequest) -> Result<ObjectQuery> {
        self.with_request("/route/add", request, ADD_ERRORS)
    }

    /// Edit a routing rule.
    pub fn set(&self, request: &SetRouteRequest) -> Result<ObjectQuery> {
        self.with_request("/route/set", request, SET_ERRORS)
    }

    /// Get a routing rule.
    pub fn get(&self, uuid: &str) -> ObjectQuery {
        self.by_uuid("/route/get", uuid, GET_ERRORS)
    }

    /// Delete a routing rule.
    pub fn delete(&self, uuid: &str) -> ObjectQuery {
        self.by_uuid("/route/delete", uuid, DELETE_ERRORS)
    }

    /// Test tag text `lv` against an account's PHYSICIAN_ALIAS rule.
    pub fn physician_alias_match(&self, account_id: &str, lv: &str) -> ObjectQuery {
        let payload = Payload::new().set("account_id", account_id).set("lv", lv);
        ObjectQuery::new(
            self.api.clone(),
            RequestSpec::service(
                "/route/physician/alias/match",
                payload,
                ErrorMapping::new(ALIAS_MATCH_ERRORS),
            ),
        )
    }

    fn with_request<T: Serialize>(
        &self,
        path: &str,
        request: &T,
        errors: &'static [ErrorRule],
    ) -> Result<ObjectQuery> {
        let payload = Payload::from_request(request)?;
        Ok(ObjectQuery::new(
            self.api.clone(),
            RequestSpec::service(path, payload, ErrorMapping::new(errors)),
        ))
    }

    fn by_uuid(&self, path: &str, uuid: &str, errors: &'static [ErrorRule]) -> ObjectQuery {
        ObjectQuery::new(
            self.api.clone(),
            RequestSpec::service(path, Payload::new().set("uuid", uuid), ErrorMapping::new(errors)),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::client::tests::sid_client;
    use crate::service::testing::assert_mapping_raises;
    use crate::transport::mock::MockTransport;

    fn add_request() -> AddRouteRequest {
        AddRouteRequest {
            actions: json!([{"type": "SHARE_WITH", "value": "acc-2"}]),
            conditions: json!({"modality": "CT"}),
            name: "CT to partner".to_string(),
            on_harvest: true,
            on_share: false,
            account_id: Some("acc-1".to_string()),
            delay: Some(5),
            ..Default::default()
        }
    }

    #[test]
    fn test_error_tables() {
        assert_mapping_raises(&ErrorMapping::new(LIST_ERRORS), |api| {
            api.route().list("acc-1").first().map(|_| Value::Null)
        });
        assert_mapping_raises(&ErrorMapping::new(ADD_ERRORS), |api| {
            api.route().add(&add_request())?.get()
        });
        assert_mapping_raises(&ErrorMapping::new(SET_ERRORS), |api| {
            api.route()
                .set(&SetRouteRequest {
                    uuid: "r-1".to_string(),
                    ..Default::default()
                })?
                .get()
        });
        assert_mapping_raises(&ErrorMapping::new(GET_ERRORS), |api| api.route().get("r-1").get());
        assert_mapping_raises(&ErrorMapping::new(DELETE_ERRORS), |api| {
            api.route().delete("r-1").get()
        });
        assert_mapping_raises(&ErrorMapping::new(ALIAS_MATCH_ERRORS), |api| {
            api.route().physician_alias_match("acc-1", "DR SMITH").get()
        });
    }

    #[test]
    fn test_add_payload_encoding() {
        let api = sid_client(Arc::new(MockTransport::new()));
        let prepared = api.route().add(&add_request()).unwrap().prepare().unwrap();

        assert_eq!(prepared.url.path(), "/api/v3/route/add");
        assert_eq!(prepared.param("name"), Some("CT to partner"));
        assert_eq!(prepared.param("on_harvest"), Some("1"));
        assert_eq!(prepared.param("on_share"), Some("0"));
        assert_eq!(prepared.param("delay"), Some("5"));
        assert_eq!(prepared.param("conditions"), Some(r#"{"modality":"CT"}"#));
        assert_eq!(
            prepared.param("actions"),
            Some(r#"[{"type":"SHARE_WITH","value":"acc-2"}]"#)
        );
        assert!(prepared.param("schedule").is_none());
        assert!(prepared.param("group_id").is_none());
    }

    #[test]
    fn test_add_payload_round_trip() {
        let request = add_request();
        let payload = Payload::from_request(&request).unwrap();

        assert!(!payload.contains("suspended"));
        assert_eq!(payload.decode::<AddRouteRequest>().unwrap(), request);
    }

    #[test]
    fn test_set_sends_only_supplied_members() {
        let api = sid_client(Arc::new(MockTransport::new()));
        let request = SetRouteRequest {
            uuid: "r-1".to_string(),
            suspended: Some(true),
            ..Default::default()
        };
        let prepared = api.route().set(&request).unwrap().prepare().unwrap();

        let names: Vec<&str> = prepared.params.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, ["suspended", "uuid", "sid"]);
    }

    #[test]
    fn test_get_not_permitted() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(
            200,
            json!({"status": "ERROR", "error_type": "NOT_PERMITTED"}),
        );
        let api = sid_client(transport);

        let err = api.route().get("r-1").get().unwrap_err();
        assert!(err.is(ErrorKind::NotPermitted));
        assert_eq!(err.to_string(), "You are not permitted to view the route [NOT_PERMITTED]");
    }
}
