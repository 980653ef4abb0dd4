//! Service API namespaces.
//!
//! Each namespace method builds a payload, picks its static error table
//! and returns an unexecuted query.

pub(crate) mod activity;
pub(crate) mod report;
pub(crate) mod route;
pub(crate) mod session;
pub(crate) mod validate;

pub use activity::ActivityApi;
pub use report::ReportApi;
pub use route::{AddRouteRequest, RouteApi, SetRouteRequest};
pub use session::SessionApi;
pub use validate::{AddValidateRequest, SetValidateRequest, ValidateApi};

use crate::error::ErrorKind;
use crate::mapping::ErrorRule;

// Rules shared by most endpoints.

pub(crate) const MISSING_FIELDS: ErrorRule = ErrorRule::code(
    "MISSING_FIELDS",
    ErrorKind::MissingFields,
    "A required field is missing or does not have data in it. The error_subtype holds a array of all the missing fields",
);

pub(crate) const FILTER_NOT_FOUND: ErrorRule = ErrorRule::code(
    "FILTER_NOT_FOUND",
    ErrorKind::FilterNotFound,
    "The filter can not be found. The error_subtype will hold the filter UUID",
);

pub(crate) const INVALID_FILTER_CONDITION: ErrorRule = ErrorRule::code(
    "INVALID_CONDITION",
    ErrorKind::InvalidCondition,
    "The condition is not support. The error_subtype will hold the filter expression this applies to",
);

pub(crate) const INVALID_FILTER_FIELD: ErrorRule = ErrorRule::code(
    "INVALID_FIELD",
    ErrorKind::InvalidField,
    "The field is not valid for this object. The error_subtype will hold the filter expression this applies to",
);

pub(crate) const INVALID_SORT_FIELD: ErrorRule = ErrorRule::code(
    "INVALID_SORT_FIELD",
    ErrorKind::InvalidSortField,
    "The field is not valid for this object. The error_subtype will hold the field name this applies to",
);

pub(crate) const INVALID_SORT_ORDER: ErrorRule = ErrorRule::code(
    "INVALID_SORT_ORDER",
    ErrorKind::InvalidSortOrder,
    "The sort order for the field is invalid. The error_subtype will hold the field name this applies to",
);

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers shared by namespace tests.

    use std::sync::Arc;

    use serde_json::{Value, json};

    use crate::client::Api;
    use crate::client::tests::sid_client;
    use crate::error::Result;
    use crate::mapping::{ErrorMapping, ErrorMatch};
    use crate::transport::mock::MockTransport;

    /// Every code in `mapping`, when returned by the server, yields its own
    /// kind and call-site description.
    pub(crate) fn assert_mapping_raises(
        mapping: &ErrorMapping,
        run: impl Fn(&Api) -> Result<Value>,
    ) {
        assert!(mapping.is_unambiguous());
        for rule in mapping.rules() {
            let ErrorMatch::Code(code) = rule.on else {
                panic!("service rule matched on status: {:?}", rule);
            };
            let transport = Arc::new(MockTransport::new());
            transport.push_json(
                500,
                json!({"status": "ERROR", "error_type": code, "error_subtype": "detail"}),
            );

            let err = run(&sid_client(transport)).unwrap_err();
            let response = err
                .response()
                .unwrap_or_else(|| panic!("{code} was not mapped: {err}"));
            assert_eq!(response.kind(), rule.kind, "{code}");
            assert_eq!(Some(response.description()), rule.description, "{code}");
            assert_eq!(response.subtype(), Some("detail"));
        }
    }
}
