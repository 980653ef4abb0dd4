//! Main client implementation.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use ambra_config::{ClientConfig, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT_SECS};
use parking_lot::Mutex;
use serde_json::Value;
use url::Url;

use crate::error::{Error, ErrorKind, ResponseError, Result};
use crate::request::{PreparedRequest, RequestSpec, Tier};
use crate::service::{ActivityApi, ReportApi, RouteApi, SessionApi, ValidateApi, session};
use crate::storage::StorageApi;
use crate::transport::{HttpTransport, RawResponse, Transport};

/// Path prefix of the storage API on an engine host.
const STORAGE_PREFIX: &str = "api/v3/storage";

/// Ambra API client.
///
/// Cheap to clone; clones share the transport and the session id.
///
/// # Example
///
/// ```no_run
/// use ambra_sdk::Api;
///
/// # fn example() -> ambra_sdk::Result<()> {
/// let api = Api::builder()
///     .url("https://access.dicomgrid.com/api/v3")
///     .credentials("user@example.com", "secret")
///     .build()?;
///
/// let route = api.route().get("route-uuid").get()?;
/// println!("{}", route["name"]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Api {
    inner: Arc<ApiInner>,
}

/// Shared client state.
struct ApiInner {
    transport: Arc<dyn Transport>,
    service_url: Url,
    storage_scheme: String,
    credentials: Option<Credentials>,
    /// Current session id. Held across re-authentication so concurrent
    /// callers never log in twice for the same stale id.
    sid: Mutex<Option<String>>,
    page_size: u32,
}

#[derive(Clone)]
struct Credentials {
    login: String,
    password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Api")
            .field("service_url", &self.inner.service_url.as_str())
            .field("storage_scheme", &self.inner.storage_scheme)
            .field("credentials", &self.inner.credentials)
            .field("page_size", &self.inner.page_size)
            .finish_non_exhaustive()
    }
}

impl Api {
    /// Create a new client builder.
    pub fn builder() -> ApiBuilder {
        ApiBuilder::new()
    }

    /// Client that logs in with the given credentials on first use.
    pub fn with_credentials(
        url: impl Into<String>,
        login: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        Self::builder()
            .url(url)
            .credentials(login, password)
            .build()
    }

    /// Client bound to a pre-issued session id. It cannot renew the id.
    pub fn with_sid(url: impl Into<String>, sid: impl Into<String>) -> Result<Self> {
        Self::builder().url(url).sid(sid).build()
    }

    /// Get the service base URL.
    pub fn service_url(&self) -> &Url {
        &self.inner.service_url
    }

    /// Default rows per page for paginated queries.
    pub fn page_size(&self) -> u32 {
        self.inner.page_size
    }

    /// Session id currently held, without logging in.
    pub fn current_sid(&self) -> Option<String> {
        self.inner.sid.lock().clone()
    }

    /// Replace the session id.
    pub fn set_sid(&self, sid: impl Into<String>) {
        *self.inner.sid.lock() = Some(sid.into());
    }

    /// Session id, logging in first when none is held.
    pub fn sid(&self) -> Result<String> {
        let mut guard = self.inner.sid.lock();
        if let Some(sid) = guard.as_ref() {
            return Ok(sid.clone());
        }
        let sid = self.request_sid()?;
        *guard = Some(sid.clone());
        Ok(sid)
    }

    /// Log in now, replacing any held session id.
    pub fn login(&self) -> Result<String> {
        self.refresh_sid(None)
    }

    /// End the server session and forget the session id.
    pub fn logout(&self) -> Result<()> {
        if self.current_sid().is_none() {
            return Ok(());
        }
        self.session().logout().get()?;
        *self.inner.sid.lock() = None;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the session API.
    pub fn session(&self) -> SessionApi {
        SessionApi::new(self.clone())
    }

    /// Access the activity API.
    pub fn activity(&self) -> ActivityApi {
        ActivityApi::new(self.clone())
    }

    /// Access the report API.
    pub fn report(&self) -> ReportApi {
        ReportApi::new(self.clone())
    }

    /// Access the routing rule API.
    pub fn route(&self) -> RouteApi {
        RouteApi::new(self.clone())
    }

    /// Access the validation rule API.
    pub fn validate(&self) -> ValidateApi {
        ValidateApi::new(self.clone())
    }

    /// Access the storage API.
    pub fn storage(&self) -> StorageApi {
        StorageApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Request execution
    // ─────────────────────────────────────────────────────────────────────────

    /// Build the URL for a request path on the given tier.
    pub(crate) fn url(&self, tier: &Tier, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        match tier {
            Tier::Service => self.inner.service_url.join(path).map_err(Error::from),
            Tier::Storage { engine_fqdn } => Url::parse(&format!(
                "{}://{}/{}/{}",
                self.inner.storage_scheme, engine_fqdn, STORAGE_PREFIX, path
            ))
            .map_err(Error::from),
        }
    }

    /// Prepare a request without sending it, using the session id held now.
    pub(crate) fn prepare(
        &self,
        spec: &RequestSpec,
        extra: &[(String, String)],
    ) -> Result<PreparedRequest> {
        let sid = self.current_sid();
        self.prepare_with_sid(spec, extra, sid.as_deref())
    }

    fn prepare_with_sid(
        &self,
        spec: &RequestSpec,
        extra: &[(String, String)],
        sid: Option<&str>,
    ) -> Result<PreparedRequest> {
        let url = self.url(spec.tier(), spec.path())?;
        let mut params = spec.payload().to_params();
        params.extend(extra.iter().cloned());
        if spec.requires_sid()
            && let Some(sid) = sid
        {
            params.push(("sid".to_string(), sid.to_string()));
        }
        Ok(PreparedRequest {
            method: spec.method(),
            url,
            params,
        })
    }

    /// Send a request and classify the response.
    ///
    /// A storage-tier permission denial triggers one re-authentication and
    /// one retry; a second denial is returned to the caller.
    pub(crate) fn execute(
        &self,
        spec: &RequestSpec,
        extra: &[(String, String)],
    ) -> Result<RawResponse> {
        let sid = if spec.requires_sid() {
            Some(self.sid()?)
        } else {
            None
        };
        let request = self.prepare_with_sid(spec, extra, sid.as_deref())?;

        match self.dispatch(spec, &request, 1) {
            Err(Error::Response(ref err)) if self.should_renew(spec, err) => {
                tracing::warn!(
                    url = %request.url,
                    "storage denied access, renewing session id and retrying"
                );
                let fresh = self.refresh_sid(sid.as_deref())?;
                let request = self.prepare_with_sid(spec, extra, Some(&fresh))?;
                self.dispatch(spec, &request, 2)
            }
            other => other,
        }
    }

    /// Send a request and decode the JSON body. An empty success body,
    /// as storage deletes return, decodes to `Value::Null`.
    pub(crate) fn execute_json(
        &self,
        spec: &RequestSpec,
        extra: &[(String, String)],
    ) -> Result<Value> {
        let response = self.execute(spec, extra)?;
        if response.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        response.json()
    }

    fn should_renew(&self, spec: &RequestSpec, err: &ResponseError) -> bool {
        spec.tier().is_storage()
            && spec.requires_sid()
            && err.kind() == ErrorKind::PermissionDenied
            && self.inner.credentials.is_some()
    }

    fn dispatch(
        &self,
        spec: &RequestSpec,
        request: &PreparedRequest,
        attempt: u32,
    ) -> Result<RawResponse> {
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            attempt,
            "sending request"
        );
        let response = self.inner.transport.send(request)?;
        tracing::trace!(
            status = response.status,
            body = %response.text(),
            "received response"
        );
        classify(spec, response)
    }

    /// Obtain a fresh session id unless another caller already replaced
    /// `stale`. Passing `None` always logs in.
    fn refresh_sid(&self, stale: Option<&str>) -> Result<String> {
        let mut guard = self.inner.sid.lock();
        if let (Some(current), Some(stale)) = (guard.as_deref(), stale)
            && current != stale
        {
            tracing::debug!("session id already renewed by another caller");
            return Ok(current.to_string());
        }
        let sid = self.request_sid()?;
        *guard = Some(sid.clone());
        Ok(sid)
    }

    /// Log in with the configured credentials. Callers hold the sid lock.
    fn request_sid(&self) -> Result<String> {
        let credentials = self.inner.credentials.as_ref().ok_or_else(|| {
            Error::Auth("no session id held and no credentials configured".to_string())
        })?;

        let spec = session::login_spec(&credentials.login, &credentials.password);
        let request = self.prepare_with_sid(&spec, &[], None)?;
        let body: Value = self.dispatch(&spec, &request, 1)?.json()?;
        let sid = body
            .get("sid")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::MissingField("sid".to_string()))?;

        tracing::info!(login = %credentials.login, "obtained session id");
        Ok(sid.to_string())
    }
}

/// Turn a raw response into success or the mapped error.
fn classify(spec: &RequestSpec, response: RawResponse) -> Result<RawResponse> {
    match spec.tier() {
        Tier::Service => classify_service(spec, response),
        Tier::Storage { .. } => classify_storage(spec, response),
    }
}

fn classify_service(spec: &RequestSpec, response: RawResponse) -> Result<RawResponse> {
    let body: Option<Value> = serde_json::from_slice(&response.body).ok();
    let reported_error = body
        .as_ref()
        .and_then(|b| b.get("status"))
        .and_then(Value::as_str)
        == Some("ERROR");

    if response.is_success() && !reported_error {
        return Ok(response);
    }

    let code = body
        .as_ref()
        .and_then(|b| b.get("error_type"))
        .and_then(Value::as_str);
    let subtype = body.as_ref().and_then(|b| b.get("error_subtype")).and_then(subtype_text);

    if let Some(rule) = code.and_then(|c| spec.errors().by_code(c)) {
        return Err(Error::Response(rule.to_error(subtype.as_deref())));
    }

    Err(Error::Unclassified {
        status: response.status,
        code: code.map(str::to_string),
        body: response.text(),
    })
}

fn classify_storage(spec: &RequestSpec, response: RawResponse) -> Result<RawResponse> {
    if response.is_success() {
        return Ok(response);
    }

    if let Some(rule) = spec.errors().by_status(response.status) {
        return Err(Error::Response(rule.to_error(None)));
    }

    let code = serde_json::from_slice::<Value>(&response.body)
        .ok()
        .and_then(|b| b.get("error_type").and_then(Value::as_str).map(str::to_string));

    Err(Error::Unclassified {
        status: response.status,
        code,
        body: response.text(),
    })
}

/// Subtypes arrive as strings or, for missing fields, as arrays.
fn subtype_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Builder for creating an [`Api`].
#[derive(Debug)]
pub struct ApiBuilder {
    url: Option<String>,
    storage_scheme: String,
    credentials: Option<Credentials>,
    sid: Option<String>,
    timeout: Duration,
    user_agent: Option<String>,
    page_size: u32,
    transport: Option<Arc<dyn Transport>>,
}

impl ApiBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            url: None,
            storage_scheme: "https".to_string(),
            credentials: None,
            sid: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: None,
            page_size: DEFAULT_PAGE_SIZE,
            transport: None,
        }
    }

    /// Seed a builder from loaded configuration.
    pub fn from_config(config: &ClientConfig) -> Self {
        let mut builder = Self::new()
            .url(config.service_url())
            .storage_scheme(config.storage_scheme())
            .timeout(config.timeout())
            .page_size(config.page_size());
        if let Some((login, password)) = config.credentials() {
            builder = builder.credentials(login, password);
        }
        if let Some(sid) = &config.sid {
            builder = builder.sid(sid.clone());
        }
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        builder
    }

    /// Set the service API base URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the scheme used for storage engine hosts.
    pub fn storage_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.storage_scheme = scheme.into();
        self
    }

    /// Set the login credentials.
    pub fn credentials(mut self, login: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials {
            login: login.into(),
            password: password.into(),
        });
        self
    }

    /// Set an already issued session id.
    pub fn sid(mut self, sid: impl Into<String>) -> Self {
        self.sid = Some(sid.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Set the default rows per page.
    pub fn page_size(mut self, rows: u32) -> Self {
        self.page_size = rows;
        self
    }

    /// Use a custom transport instead of the default HTTP one.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<Api> {
        let url = self
            .url
            .ok_or_else(|| Error::Config("url is required".to_string()))?;

        if self.sid.is_none() && self.credentials.is_none() {
            return Err(Error::Config(
                "either a session id or credentials are required".to_string(),
            ));
        }
        if self.page_size == 0 {
            return Err(Error::Config("page_size must be greater than zero".to_string()));
        }
        if self.storage_scheme != "http" && self.storage_scheme != "https" {
            return Err(Error::Config(format!(
                "unsupported storage scheme '{}'",
                self.storage_scheme
            )));
        }

        // Normalize so relative joins keep the base path
        let mut service_url = Url::parse(&url)?;
        if !service_url.path().ends_with('/') {
            service_url.set_path(&format!("{}/", service_url.path()));
        }

        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let user_agent = self
                    .user_agent
                    .unwrap_or_else(|| format!("ambra-sdk/{}", env!("CARGO_PKG_VERSION")));
                Arc::new(HttpTransport::new(self.timeout, &user_agent)?)
            }
        };

        Ok(Api {
            inner: Arc::new(ApiInner {
                transport,
                service_url,
                storage_scheme: self.storage_scheme,
                credentials: self.credentials,
                sid: Mutex::new(self.sid),
                page_size: self.page_size,
            }),
        })
    }
}

impl Default for ApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Barrier;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::mapping::{ErrorMapping, ErrorRule};
    use crate::payload::Payload;
    use crate::request::Method;
    use crate::transport::mock::MockTransport;
    use serde_json::json;

    pub(crate) const BASE_URL: &str = "https://ambra.example.com/api/v3";

    /// Client with a held sid and no credentials.
    pub(crate) fn sid_client(transport: Arc<MockTransport>) -> Api {
        Api::builder()
            .url(BASE_URL)
            .sid("sid-1")
            .transport(transport)
            .build()
            .unwrap()
    }

    /// Client with credentials and no sid yet.
    pub(crate) fn login_client(transport: Arc<MockTransport>) -> Api {
        Api::builder()
            .url(BASE_URL)
            .credentials("user@example.com", "secret")
            .transport(transport)
            .build()
            .unwrap()
    }

    const STORAGE_RULES: &[ErrorRule] = &[
        ErrorRule::status(403, ErrorKind::PermissionDenied),
        ErrorRule::status(404, ErrorKind::NotFound),
    ];

    fn storage_spec() -> RequestSpec {
        RequestSpec::storage(
            Method::Get,
            "engine.example.com",
            "/study/ns-1/1.2.3/schema",
            Payload::new(),
            ErrorMapping::new(STORAGE_RULES),
        )
    }

    #[test]
    fn test_builder_requires_url() {
        let result = ApiBuilder::new().sid("s").build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_builder_requires_auth() {
        let result = ApiBuilder::new().url(BASE_URL).build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_builder_rejects_zero_page_size() {
        let result = ApiBuilder::new().url(BASE_URL).sid("s").page_size(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_normalizes_trailing_slash() {
        let api = sid_client(Arc::new(MockTransport::new()));
        assert_eq!(api.service_url().as_str(), "https://ambra.example.com/api/v3/");
    }

    #[test]
    fn test_builder_from_config() {
        let config = ClientConfig {
            url: Some("https://ambra.example.com/api/v3".to_string()),
            sid: Some("cfg-sid".to_string()),
            page_size: Some(7),
            ..Default::default()
        };
        let api = ApiBuilder::from_config(&config)
            .transport(Arc::new(MockTransport::new()))
            .build()
            .unwrap();
        assert_eq!(api.current_sid().as_deref(), Some("cfg-sid"));
        assert_eq!(api.page_size(), 7);
    }

    #[test]
    fn test_url_building() {
        let api = sid_client(Arc::new(MockTransport::new()));

        let url = api.url(&Tier::Service, "/route/list").unwrap();
        assert_eq!(url.as_str(), "https://ambra.example.com/api/v3/route/list");

        let url = api
            .url(
                &Tier::Storage {
                    engine_fqdn: "engine.example.com".to_string(),
                },
                "/study/ns/1.2.3/schema",
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://engine.example.com/api/v3/storage/study/ns/1.2.3/schema"
        );
    }

    #[test]
    fn test_lazy_login() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(200, json!({"status": "OK", "sid": "fresh-sid"}));
        let api = login_client(transport.clone());

        assert!(api.current_sid().is_none());
        assert_eq!(api.sid().unwrap(), "fresh-sid");
        // Cached afterwards
        assert_eq!(api.sid().unwrap(), "fresh-sid");

        let logins = transport.requests_to("/session/login");
        assert_eq!(logins.len(), 1);
        assert_eq!(logins[0].param("login"), Some("user@example.com"));
        assert_eq!(logins[0].param("password"), Some("secret"));
        assert!(logins[0].param("sid").is_none());
    }

    #[test]
    fn test_sid_without_credentials_fails() {
        let api = Api::builder()
            .url(BASE_URL)
            .sid("s")
            .transport(Arc::new(MockTransport::new()))
            .build()
            .unwrap();
        *api.inner.sid.lock() = None;
        assert!(matches!(api.sid(), Err(Error::Auth(_))));
    }

    #[test]
    fn test_storage_stale_sid_retried_once() {
        let transport = Arc::new(MockTransport::new());
        transport
            .push_json(200, json!({"status": "OK", "sid": "first-sid"}))
            .push(RawResponse::new(403, ""))
            .push_json(200, json!({"status": "OK", "sid": "second-sid"}))
            .push_json(200, json!({"series": []}));
        let api = login_client(transport.clone());

        let value = api.execute_json(&storage_spec(), &[]).unwrap();
        assert_eq!(value, json!({"series": []}));

        assert_eq!(transport.requests_to("/session/login").len(), 2);
        let schema_calls = transport.requests_to("/schema");
        assert_eq!(schema_calls.len(), 2);
        assert_eq!(schema_calls[0].param("sid"), Some("first-sid"));
        assert_eq!(schema_calls[1].param("sid"), Some("second-sid"));
        assert_eq!(api.current_sid().as_deref(), Some("second-sid"));
    }

    #[test]
    fn test_storage_second_denial_surfaces() {
        let transport = Arc::new(MockTransport::new());
        transport
            .push_json(200, json!({"status": "OK", "sid": "first-sid"}))
            .push(RawResponse::new(403, ""))
            .push_json(200, json!({"status": "OK", "sid": "second-sid"}))
            .push(RawResponse::new(403, ""));
        let api = login_client(transport.clone());

        let err = api.execute(&storage_spec(), &[]).unwrap_err();
        assert!(err.is_permission_denied());
        assert_eq!(
            err.response().unwrap().description(),
            "Access denied. Wrong sid"
        );
        // One initial login, exactly one renewal, no third attempt
        assert_eq!(transport.requests_to("/session/login").len(), 2);
        assert_eq!(transport.requests_to("/schema").len(), 2);
    }

    #[test]
    fn test_storage_denial_without_credentials_not_retried() {
        let transport = Arc::new(MockTransport::new());
        transport.push(RawResponse::new(403, ""));
        let api = sid_client(transport.clone());

        let err = api.execute(&storage_spec(), &[]).unwrap_err();
        assert!(err.is_permission_denied());
        assert_eq!(transport.request_count(), 1);
    }

    #[test]
    fn test_service_denial_not_retried() {
        const RULES: &[ErrorRule] = &[ErrorRule::code(
            "NOT_PERMITTED",
            ErrorKind::NotPermitted,
            "You are not permitted to view the route",
        )];
        let transport = Arc::new(MockTransport::new());
        transport
            .push_json(200, json!({"status": "OK", "sid": "first-sid"}))
            .push_json(500, json!({"status": "ERROR", "error_type": "NOT_PERMITTED"}));
        let api = login_client(transport.clone());

        let spec = RequestSpec::service("/route/get", Payload::new(), ErrorMapping::new(RULES));
        let err = api.execute(&spec, &[]).unwrap_err();
        assert!(err.is(ErrorKind::NotPermitted));
        assert_eq!(transport.requests_to("/session/login").len(), 1);
    }

    #[test]
    fn test_refresh_skips_login_when_already_renewed() {
        let transport = Arc::new(MockTransport::new());
        let api = login_client(transport.clone());
        api.set_sid("newer-sid");

        let sid = api.refresh_sid(Some("stale-sid")).unwrap();
        assert_eq!(sid, "newer-sid");
        assert_eq!(transport.request_count(), 0);
    }

    /// Denies the stale sid once both callers have sent it, then serves
    /// the schema for any other sid.
    #[derive(Debug)]
    struct StaleSidEngine {
        both_denied: Barrier,
        logins: AtomicUsize,
    }

    impl Transport for StaleSidEngine {
        fn send(&self, request: &PreparedRequest) -> Result<RawResponse> {
            if request.url.path().ends_with("/session/login") {
                self.logins.fetch_add(1, Ordering::SeqCst);
                let body = json!({"status": "OK", "sid": "fresh-sid"});
                return Ok(RawResponse::new(200, body.to_string()));
            }
            if request.param("sid") == Some("stale-sid") {
                self.both_denied.wait();
                return Ok(RawResponse::new(403, ""));
            }
            Ok(RawResponse::new(200, json!({"series": []}).to_string()))
        }
    }

    #[test]
    fn test_concurrent_denials_renew_sid_once() {
        let engine = Arc::new(StaleSidEngine {
            both_denied: Barrier::new(2),
            logins: AtomicUsize::new(0),
        });
        let api = Api::builder()
            .url(BASE_URL)
            .sid("stale-sid")
            .credentials("user@example.com", "secret")
            .transport(engine.clone())
            .build()
            .unwrap();

        let results: Vec<Result<Value>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..2)
                .map(|_| {
                    let api = api.clone();
                    scope.spawn(move || api.execute_json(&storage_spec(), &[]))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for result in results {
            assert_eq!(result.unwrap(), json!({"series": []}));
        }
        assert_eq!(engine.logins.load(Ordering::SeqCst), 1);
        assert_eq!(api.current_sid().as_deref(), Some("fresh-sid"));
    }

    #[test]
    fn test_storage_unmapped_status_is_unclassified() {
        let transport = Arc::new(MockTransport::new());
        transport.push(RawResponse::new(500, "engine exploded"));
        let api = sid_client(transport);

        match api.execute(&storage_spec(), &[]).unwrap_err() {
            Error::Unclassified { status, code, body } => {
                assert_eq!(status, 500);
                assert!(code.is_none());
                assert_eq!(body, "engine exploded");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_logout_clears_sid() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(200, json!({"status": "OK"}));
        let api = sid_client(transport.clone());

        api.logout().unwrap();
        assert!(api.current_sid().is_none());
        let logout = &transport.requests_to("/session/logout")[0];
        assert_eq!(logout.param("sid"), Some("sid-1"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let api = login_client(Arc::new(MockTransport::new()));
        let debug = format!("{:?}", api);
        assert!(debug.contains("user@example.com"));
        assert!(!debug.contains("secret"));
    }
}
