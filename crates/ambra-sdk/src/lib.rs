//! Client SDK for the Ambra medical imaging service and storage APIs.
//!
//! Endpoint methods return unexecuted queries. Each query carries its
//! endpoint's error table, so a failure surfaces as the exact
//! [`ErrorKind`] the endpoint documents, with the server's subtype
//! attached.
//!
//! # Example
//!
//! ```no_run
//! use ambra_sdk::{Api, ErrorKind, Filter, Result, Sorter};
//!
//! # fn example() -> Result<()> {
//! let api = Api::builder()
//!     .url("https://access.dicomgrid.com/api/v3")
//!     .credentials("user@example.com", "secret")
//!     .build()?;
//!
//! // Lazily page through routing rules
//! let routes = api
//!     .route()
//!     .list("account-uuid")
//!     .filter_by(Filter::like("name", "CT%"))
//!     .sort_by(Sorter::desc("created"))
//!     .rows(50);
//! for route in routes.all() {
//!     println!("{}", route?["name"]);
//! }
//!
//! // Inspect a request without sending it
//! let prepared = api.activity().get("activity-uuid").prepare()?;
//! println!("{} {}", prepared.method, prepared.url);
//!
//! // Branch on a documented error
//! match api.route().get("route-uuid").get() {
//!     Ok(route) => println!("{}", route["name"]),
//!     Err(err) if err.is(ErrorKind::NotFound) => println!("no such route"),
//!     Err(err) => return Err(err),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - **Session**: login, logout
//! - **Activity**: list, count, get, delete
//! - **Report**: status, zip
//! - **Route**: list, add, set, get, delete, physician alias match
//! - **Validate**: list, add, set, get, delete
//! - **Storage study**: schema, delete, image delete, count, tags,
//!   attributes, study and image PHI, thumbnails, diagnostic frames,
//!   frames, PDFs, attachment download and delete

pub mod client;
pub mod error;
pub mod mapping;
pub mod payload;
pub mod query;
pub mod request;
pub mod service;
pub mod storage;
pub mod transport;

pub use client::{Api, ApiBuilder};
pub use error::{Error, ErrorCategory, ErrorKind, ResponseError, Result};
pub use mapping::{ErrorMapping, ErrorMatch, ErrorRule};
pub use payload::Payload;
pub use query::{
    FieldQuery, Filter, FilterCondition, FilterQuery, ObjectQuery, Page, PaginatedQuery, Pages,
    SortOrder, Sorter,
};
pub use request::{Method, PreparedRequest, RequestSpec, Tier};
pub use transport::{HttpTransport, RawResponse, Transport};

/// Service API document version the namespaces follow.
pub const API_VERSION: &str = "LBL0022 v38.0 2020-05-27";

/// Service models document version.
pub const MODELS_VERSION: &str = "LBL0022 v38.0 2020-05-27";

/// Storage API document version.
pub const STORAGE_VERSION: &str = "LBL0038 v9.0 2020-06-03";
