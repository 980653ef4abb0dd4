//! Report API.

use crate::client::Api;
use crate::error::ErrorKind;
use crate::mapping::{ErrorMapping, ErrorRule};
use crate::payload::Payload;
use crate::query::ObjectQuery;
use crate::request::RequestSpec;

const STATUS_ERRORS: &[ErrorRule] = &[
    super::MISSING_FIELDS,
    ErrorRule::code("NOT_FOUND", ErrorKind::NotFound, "The report can not be found"),
    ErrorRule::code("REPORT_FAILED", ErrorKind::ReportFailed, "The report failed"),
];

const ZIP_ERRORS: &[ErrorRule] = &[ErrorRule::code("NOT_FOUND", ErrorKind::NotFound, "Not found")];

/// Report API client.
pub struct ReportApi {
    api: Api,
}

impl ReportApi {
    pub(crate) fn new(api: Api) -> Self {
        Self { api }
    }

    /// Status of a report.
    pub fn status(&self, report_id: u64) -> ObjectQuery {
        self.query("/report/status", report_id, STATUS_ERRORS)
    }

    /// Zip archive of a finished report. Use [`ObjectQuery::get_raw`].
    pub fn zip(&self, report_id: u64) -> ObjectQuery {
        self.query("/report/zip", report_id, ZIP_ERRORS)
    }

    fn query(&self, path: &str, report_id: u64, errors: &'static [ErrorRule]) -> ObjectQuery {
        let payload = Payload::new().set("report_id", report_id);
        ObjectQuery::new(
            self.api.clone(),
            RequestSpec::service(path, payload, ErrorMapping::new(errors)),
        )
    }
}
