//! Single-object, single-field and sort/filter queries.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::Api;
use crate::error::{Error, Result};
use crate::query::filter::{Filter, Sorter, sort_param};
use crate::request::{PreparedRequest, RequestSpec};
use crate::transport::RawResponse;

/// A query returning one decoded object.
#[derive(Debug, Clone)]
pub struct ObjectQuery {
    api: Api,
    spec: RequestSpec,
}

impl ObjectQuery {
    pub fn new(api: Api, spec: RequestSpec) -> Self {
        Self { api, spec }
    }

    pub fn spec(&self) -> &RequestSpec {
        &self.spec
    }

    /// Build the request without sending it.
    pub fn prepare(&self) -> Result<PreparedRequest> {
        self.api.prepare(&self.spec, &[])
    }

    /// Execute and decode the JSON body.
    pub fn get(&self) -> Result<Value> {
        self.api.execute_json(&self.spec, &[])
    }

    /// Execute and deserialize the JSON body into `T`.
    pub fn get_as<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.get()?)?)
    }

    /// Execute and return the undecoded body (images, archives, PDFs).
    pub fn get_raw(&self) -> Result<RawResponse> {
        self.api.execute(&self.spec, &[])
    }

    pub(crate) fn api(&self) -> &Api {
        &self.api
    }
}

/// A query whose result is one named field of the response.
#[derive(Debug, Clone)]
pub struct FieldQuery {
    query: ObjectQuery,
}

impl FieldQuery {
    /// `spec` must name its field via [`RequestSpec::single_field`].
    pub fn new(api: Api, spec: RequestSpec) -> Self {
        Self {
            query: ObjectQuery::new(api, spec),
        }
    }

    pub fn spec(&self) -> &RequestSpec {
        self.query.spec()
    }

    pub fn prepare(&self) -> Result<PreparedRequest> {
        self.query.prepare()
    }

    /// Execute and return `response[field]`.
    pub fn get(&self) -> Result<Value> {
        let field = self
            .spec()
            .field()
            .ok_or_else(|| Error::Config(format!("{} has no result field", self.spec().path())))?;
        project(field, self.query.get()?)
    }

    pub fn get_as<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.get()?)?)
    }
}

/// Take `field` out of a decoded response object.
fn project(field: &str, mut value: Value) -> Result<Value> {
    value
        .as_object_mut()
        .and_then(|object| object.remove(field))
        .ok_or_else(|| Error::MissingField(field.to_string()))
}

/// A query accepting filter, sort and field-selection criteria.
///
/// When the spec names a result field, [`FilterQuery::get`] returns just
/// that field, as [`FieldQuery`] does.
#[derive(Debug, Clone)]
pub struct FilterQuery {
    query: ObjectQuery,
    filters: Vec<Filter>,
    sorting: Vec<Sorter>,
    fields: Vec<String>,
}

impl FilterQuery {
    pub fn new(api: Api, spec: RequestSpec) -> Self {
        Self {
            query: ObjectQuery::new(api, spec),
            filters: Vec::new(),
            sorting: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Add a filter expression.
    pub fn filter_by(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Add a sort expression; earlier ones take precedence.
    pub fn sort_by(mut self, sorter: Sorter) -> Self {
        self.sorting.push(sorter);
        self
    }

    /// Restrict the fields returned per record.
    pub fn only<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn spec(&self) -> &RequestSpec {
        self.query.spec()
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn sorting(&self) -> &[Sorter] {
        &self.sorting
    }

    /// Criteria as wire parameters.
    pub(crate) fn criteria(&self) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = self.filters.iter().map(Filter::to_param).collect();
        if let Some(sort) = sort_param(&self.sorting) {
            params.push(sort);
        }
        if !self.fields.is_empty() {
            params.push((
                "fields".to_string(),
                Value::from(self.fields.clone()).to_string(),
            ));
        }
        params
    }

    pub fn prepare(&self) -> Result<PreparedRequest> {
        self.query.api().prepare(self.spec(), &self.criteria())
    }

    /// Execute with the criteria and decode the JSON body, projected to
    /// the result field if the spec has one.
    pub fn get(&self) -> Result<Value> {
        let value = self.query.api().execute_json(self.spec(), &self.criteria())?;
        match self.spec().field() {
            Some(field) => project(field, value),
            None => Ok(value),
        }
    }

    pub fn get_as<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.get()?)?)
    }

    /// Execute with extra parameters appended to the criteria.
    pub(crate) fn get_with(&self, extra: &[(String, String)]) -> Result<Value> {
        let mut params = self.criteria();
        params.extend(extra.iter().cloned());
        self.query.api().execute_json(self.spec(), &params)
    }

    pub(crate) fn prepare_with(&self, extra: &[(String, String)]) -> Result<PreparedRequest> {
        let mut params = self.criteria();
        params.extend(extra.iter().cloned());
        self.query.api().prepare(self.spec(), &params)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::client::tests::{BASE_URL, sid_client};
    use crate::error::ErrorKind;
    use crate::mapping::{ErrorMapping, ErrorRule};
    use crate::payload::Payload;
    use crate::request::Method;
    use crate::transport::mock::MockTransport;

    const RULES: &[ErrorRule] = &[
        ErrorRule::code("NOT_FOUND", ErrorKind::NotFound, "The report can not be found"),
        ErrorRule::code("REPORT_FAILED", ErrorKind::ReportFailed, "The report failed"),
        ErrorRule::code(
            "INVALID_SORT_FIELD",
            ErrorKind::InvalidSortField,
            "The field is not valid for this object.",
        ),
        ErrorRule::code("RUNNING", ErrorKind::Running, "This call is currently runnning"),
    ];

    fn spec() -> RequestSpec {
        RequestSpec::service(
            "/report/status",
            Payload::new().set("report_id", 42),
            ErrorMapping::new(RULES),
        )
    }

    #[test]
    fn test_prepare_matches_execution() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(200, json!({"status": "OK", "state": "done"}));
        let api = sid_client(transport.clone());
        let query = ObjectQuery::new(api, spec());

        let prepared = query.prepare().unwrap();
        assert_eq!(transport.request_count(), 0);
        assert_eq!(prepared.method, Method::Post);
        assert_eq!(prepared.url.as_str(), format!("{}/report/status", BASE_URL));
        assert_eq!(prepared.param("report_id"), Some("42"));
        assert_eq!(prepared.param("sid"), Some("sid-1"));

        query.get().unwrap();
        assert_eq!(transport.requests(), vec![prepared]);
    }

    #[test]
    fn test_mapped_error_with_call_site_description_and_subtype() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(
            500,
            json!({"status": "ERROR", "error_type": "REPORT_FAILED", "error_subtype": "timeout"}),
        );
        let query = ObjectQuery::new(sid_client(transport), spec());

        let err = query.get().unwrap_err();
        let response = err.response().unwrap();
        assert_eq!(response.kind(), ErrorKind::ReportFailed);
        assert_eq!(response.description(), "The report failed");
        assert_eq!(response.subtype(), Some("timeout"));
    }

    #[test]
    fn test_error_status_in_ok_http_response() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(200, json!({"status": "ERROR", "error_type": "RUNNING"}));
        let query = ObjectQuery::new(sid_client(transport), spec());

        assert!(query.get().unwrap_err().is(ErrorKind::Running));
    }

    #[test]
    fn test_array_subtype_rendered_as_json() {
        const MISSING: &[ErrorRule] = &[ErrorRule::code(
            "MISSING_FIELDS",
            ErrorKind::MissingFields,
            "A required field is missing",
        )];
        let transport = Arc::new(MockTransport::new());
        transport.push_json(
            500,
            json!({"status": "ERROR", "error_type": "MISSING_FIELDS", "error_subtype": ["report_id"]}),
        );
        let spec = RequestSpec::service("/report/status", Payload::new(), ErrorMapping::new(MISSING));
        let err = ObjectQuery::new(sid_client(transport), spec).get().unwrap_err();

        assert_eq!(err.response().unwrap().subtype(), Some("[\"report_id\"]"));
    }

    #[test]
    fn test_unrecognized_code_is_unclassified() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(500, json!({"status": "ERROR", "error_type": "IN_USE"}));
        let query = ObjectQuery::new(sid_client(transport), spec());

        match query.get().unwrap_err() {
            Error::Unclassified { status, code, body } => {
                assert_eq!(status, 500);
                assert_eq!(code.as_deref(), Some("IN_USE"));
                assert!(body.contains("IN_USE"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_json_failure_is_unclassified() {
        let transport = Arc::new(MockTransport::new());
        transport.push(RawResponse::new(502, "Bad Gateway"));
        let query = ObjectQuery::new(sid_client(transport), spec());

        assert!(matches!(
            query.get().unwrap_err(),
            Error::Unclassified { status: 502, code: None, .. }
        ));
    }

    #[test]
    fn test_get_as() {
        #[derive(serde::Deserialize)]
        struct Status {
            state: String,
        }
        let transport = Arc::new(MockTransport::new());
        transport.push_json(200, json!({"status": "OK", "state": "done"}));
        let status: Status = ObjectQuery::new(sid_client(transport), spec()).get_as().unwrap();
        assert_eq!(status.state, "done");
    }

    #[test]
    fn test_field_query_projects_field() {
        let payload = json!({"status": "OK", "count": 17, "other": "x"});
        let transport = Arc::new(MockTransport::new());
        transport.push_json(200, payload.clone());
        let query = FieldQuery::new(sid_client(transport), spec().single_field("count"));

        assert_eq!(query.get().unwrap(), payload["count"]);
    }

    #[test]
    fn test_field_query_missing_field() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(200, json!({"status": "OK"}));
        let query = FieldQuery::new(sid_client(transport), spec().single_field("count"));

        assert!(matches!(query.get(), Err(Error::MissingField(f)) if f == "count"));
    }

    #[test]
    fn test_filter_query_forwards_criteria() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(200, json!({"status": "OK"}));
        let query = FilterQuery::new(sid_client(transport.clone()), spec())
            .filter_by(Filter::like("name", "CT%"))
            .sort_by(Sorter::desc("created"))
            .only(["uuid", "name"]);

        let prepared = query.prepare().unwrap();
        assert_eq!(prepared.param("filter.name.like"), Some("CT%"));
        assert_eq!(prepared.param("sort_by"), Some("-created"));
        assert_eq!(prepared.param("fields"), Some("[\"uuid\",\"name\"]"));

        query.get().unwrap();
        assert_eq!(transport.requests()[0], prepared);
    }

    #[test]
    fn test_filter_query_invalid_sort_field() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(
            500,
            json!({"status": "ERROR", "error_type": "INVALID_SORT_FIELD", "error_subtype": "colour"}),
        );
        let err = FilterQuery::new(sid_client(transport), spec())
            .sort_by(Sorter::asc("colour"))
            .get()
            .unwrap_err();

        assert!(err.is(ErrorKind::InvalidSortField));
        assert!(err.is_validation());
        assert_eq!(err.response().unwrap().subtype(), Some("colour"));
    }

    #[test]
    fn test_filter_query_projects_result_field() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(200, json!({"status": "OK", "count": 12}));
        let query = FilterQuery::new(sid_client(transport.clone()), spec().single_field("count"))
            .filter_by(Filter::equals("type", "STUDY"));

        assert_eq!(query.get().unwrap(), json!(12));
        assert_eq!(transport.requests()[0].param("filter.type.equals"), Some("STUDY"));
    }

    #[test]
    fn test_filter_query_without_field_returns_body() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(200, json!({"status": "OK", "count": 12}));
        let query = FilterQuery::new(sid_client(transport), spec());

        assert_eq!(query.get().unwrap(), json!({"status": "OK", "count": 12}));
    }
}
