//! Immutable request descriptions and their prepared wire form.

use std::fmt;

use url::Url;

use crate::mapping::ErrorMapping;
use crate::payload::Payload;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which API a request targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tier {
    /// The service API at the configured base URL.
    Service,
    /// A storage engine host.
    Storage { engine_fqdn: String },
}

impl Tier {
    pub fn is_storage(&self) -> bool {
        matches!(self, Tier::Storage { .. })
    }
}

/// Everything needed to issue one server operation.
///
/// Built once per call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    method: Method,
    tier: Tier,
    path: String,
    payload: Payload,
    errors: ErrorMapping,
    required_sid: bool,
    paginated_field: Option<&'static str>,
    field: Option<&'static str>,
}

impl RequestSpec {
    /// A service-tier call: form POST, session required.
    pub fn service(path: impl Into<String>, payload: Payload, errors: ErrorMapping) -> Self {
        Self {
            method: Method::Post,
            tier: Tier::Service,
            path: path.into(),
            payload,
            errors,
            required_sid: true,
            paginated_field: None,
            field: None,
        }
    }

    /// A storage-tier call against `engine_fqdn`, session required.
    pub fn storage(
        method: Method,
        engine_fqdn: impl Into<String>,
        path: impl Into<String>,
        payload: Payload,
        errors: ErrorMapping,
    ) -> Self {
        Self {
            method,
            tier: Tier::Storage {
                engine_fqdn: engine_fqdn.into(),
            },
            path: path.into(),
            payload,
            errors,
            required_sid: true,
            paginated_field: None,
            field: None,
        }
    }

    /// Whether the session id is attached.
    pub fn required_sid(mut self, required: bool) -> Self {
        self.required_sid = required;
        self
    }

    /// Name the response key holding each page's records.
    pub fn paginated(mut self, field: &'static str) -> Self {
        self.paginated_field = Some(field);
        self
    }

    /// Name the response key a single-field query projects.
    pub fn single_field(mut self, field: &'static str) -> Self {
        self.field = Some(field);
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn tier(&self) -> &Tier {
        &self.tier
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn errors(&self) -> &ErrorMapping {
        &self.errors
    }

    pub fn requires_sid(&self) -> bool {
        self.required_sid
    }

    pub fn paginated_field(&self) -> Option<&'static str> {
        self.paginated_field
    }

    pub fn field(&self) -> Option<&'static str> {
        self.field
    }
}

/// A request ready for the transport.
///
/// POST parameters travel as a form body; GET and DELETE parameters as
/// the query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: Url,
    pub params: Vec<(String, String)>,
}

impl PreparedRequest {
    /// First value of a named parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// All values of a named parameter.
    pub fn params_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.params
            .iter()
            .filter(move |(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_defaults() {
        let spec = RequestSpec::service("/activity/get", Payload::new(), ErrorMapping::EMPTY);
        assert_eq!(spec.method(), Method::Post);
        assert_eq!(spec.tier(), &Tier::Service);
        assert!(spec.requires_sid());
        assert!(spec.paginated_field().is_none());
        assert!(spec.field().is_none());
    }

    #[test]
    fn test_storage_spec() {
        let spec = RequestSpec::storage(
            Method::Get,
            "engine.example.com",
            "/study/ns/uid/schema",
            Payload::new(),
            ErrorMapping::EMPTY,
        );
        assert!(spec.tier().is_storage());
        assert_eq!(spec.method().to_string(), "GET");
    }

    #[test]
    fn test_prepared_param_lookup() {
        let request = PreparedRequest {
            method: Method::Post,
            url: Url::parse("https://ambra.example.com/api/v3/route/list").unwrap(),
            params: vec![
                ("sid".to_string(), "s-1".to_string()),
                ("filter.name.like".to_string(), "a%".to_string()),
                ("filter.name.like".to_string(), "b%".to_string()),
            ],
        };
        assert_eq!(request.param("sid"), Some("s-1"));
        assert_eq!(request.params_named("filter.name.like").count(), 2);
        assert!(request.param("missing").is_none());
    }
}
