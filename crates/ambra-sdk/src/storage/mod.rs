//! Storage API namespaces.
//!
//! Storage calls go to the engine host that holds the study and report
//! failures by HTTP status. A 403 may mean a stale session id, so the
//! client renews the id and retries once before surfacing it.

mod study;

pub use study::{ImageRef, StudyApi, StudyLocation};

use crate::client::Api;

/// Storage API client.
pub struct StorageApi {
    api: Api,
}

impl StorageApi {
    pub(crate) fn new(api: Api) -> Self {
        Self { api }
    }

    /// Access the study namespace.
    pub fn study(&self) -> StudyApi {
        StudyApi::new(self.api.clone())
    }
}
