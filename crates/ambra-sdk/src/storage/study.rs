//! Storage study namespace.

use crate::client::Api;
use crate::error::ErrorKind;
use crate::mapping::{ErrorMapping, ErrorRule};
use crate::payload::Payload;
use crate::query::ObjectQuery;
use crate::request::{Method, RequestSpec};

const STUDY_ERRORS: &[ErrorRule] = &[
    ErrorRule::status(403, ErrorKind::PermissionDenied),
    ErrorRule::status_described(404, ErrorKind::NotFound, "The study was not found"),
];

const IMAGE_ERRORS: &[ErrorRule] = &[
    ErrorRule::status(403, ErrorKind::PermissionDenied),
    ErrorRule::status_described(404, ErrorKind::NotFound, "The image was not found"),
    ErrorRule::status_described(
        412,
        ErrorKind::PreconditionFailed,
        "The image version does not match the stored image",
    ),
];

const PDF_ERRORS: &[ErrorRule] = &[
    ErrorRule::status(403, ErrorKind::PermissionDenied),
    ErrorRule::status_described(404, ErrorKind::NotFound, "The image was not found"),
    ErrorRule::status(412, ErrorKind::PreconditionFailed),
    ErrorRule::status_described(
        415,
        ErrorKind::UnsupportedMediaType,
        "Pdf was not found encapsulated in the DICOM file.",
    ),
];

const ATTACHMENT_ERRORS: &[ErrorRule] = &[
    ErrorRule::status(403, ErrorKind::PermissionDenied),
    ErrorRule::status_described(404, ErrorKind::NotFound, "The attachment was not found"),
];

/// Where a study lives in storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyLocation {
    /// Storage engine host serving the study.
    pub engine_fqdn: String,
    /// Storage namespace id.
    pub namespace: String,
    pub study_uid: String,
}

impl StudyLocation {
    pub fn new(
        engine_fqdn: impl Into<String>,
        namespace: impl Into<String>,
        study_uid: impl Into<String>,
    ) -> Self {
        Self {
            engine_fqdn: engine_fqdn.into(),
            namespace: namespace.into(),
            study_uid: study_uid.into(),
        }
    }

    fn path(&self, suffix: &str) -> String {
        format!("/study/{}/{}{}", self.namespace, self.study_uid, suffix)
    }
}

/// One version of a stored image, as listed in the study schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub image_uid: String,
    pub image_version: String,
}

impl ImageRef {
    pub fn new(image_uid: impl Into<String>, image_version: impl Into<String>) -> Self {
        Self {
            image_uid: image_uid.into(),
            image_version: image_version.into(),
        }
    }

    fn path(&self) -> String {
        format!("/image/{}/version/{}", self.image_uid, self.image_version)
    }
}

/// Storage study API client.
pub struct StudyApi {
    api: Api,
}

impl StudyApi {
    pub(crate) fn new(api: Api) -> Self {
        Self { api }
    }

    /// Study schema: series, images, versions and attachments.
    pub fn schema(&self, study: &StudyLocation) -> ObjectQuery {
        self.query(Method::Get, study, study.path("/schema"), Payload::new(), STUDY_ERRORS)
    }

    /// Delete the study from storage.
    pub fn delete(&self, study: &StudyLocation) -> ObjectQuery {
        self.query(Method::Delete, study, study.path(""), Payload::new(), STUDY_ERRORS)
    }

    /// Delete one image from the study.
    pub fn delete_image(&self, study: &StudyLocation, image_uid: &str) -> ObjectQuery {
        let path = study.path(&format!("/image/{}", image_uid));
        self.query(Method::Delete, study, path, Payload::new(), IMAGE_ERRORS)
    }

    /// Series and image counts.
    pub fn count(&self, study: &StudyLocation) -> ObjectQuery {
        self.query(Method::Get, study, study.path("/count"), Payload::new(), STUDY_ERRORS)
    }

    /// Study-level PHI tags.
    pub fn phi(&self, study: &StudyLocation) -> ObjectQuery {
        self.query(Method::Get, study, study.path("/phi"), Payload::new(), STUDY_ERRORS)
    }

    /// Study-level DICOM tags, with PHI from `phi_namespace` when given.
    pub fn tag(&self, study: &StudyLocation, phi_namespace: Option<&str>) -> ObjectQuery {
        let payload = Payload::new().optional("phi_namespace", phi_namespace);
        self.query(Method::Get, study, study.path("/tag"), payload, STUDY_ERRORS)
    }

    /// DICOM attributes of one image version.
    pub fn attribute(&self, study: &StudyLocation, image: &ImageRef) -> ObjectQuery {
        let path = study.path(&format!("{}/attribute", image.path()));
        self.query(Method::Get, study, path, Payload::new(), IMAGE_ERRORS)
    }

    /// PHI tags of one image version.
    pub fn image_phi(&self, study: &StudyLocation, image: &ImageRef) -> ObjectQuery {
        let path = study.path(&format!("{}/phi", image.path()));
        self.query(Method::Get, study, path, Payload::new(), IMAGE_ERRORS)
    }

    /// Thumbnail of one frame. Read it with [`ObjectQuery::get_raw`].
    pub fn thumbnail(
        &self,
        study: &StudyLocation,
        image: &ImageRef,
        frame_number: u32,
    ) -> ObjectQuery {
        let path = study.path(&format!("{}/frame/{}/thumbnail", image.path(), frame_number));
        self.query(Method::Get, study, path, Payload::new(), IMAGE_ERRORS)
    }

    /// Diagnostic quality rendering of one frame; binary, use `get_raw`.
    pub fn diagnostic(
        &self,
        study: &StudyLocation,
        image: &ImageRef,
        frame_number: u32,
    ) -> ObjectQuery {
        let path = study.path(&format!("{}/frame/{}/diagnostic", image.path(), frame_number));
        self.query(Method::Get, study, path, Payload::new(), IMAGE_ERRORS)
    }

    /// One rendered frame. `depth` selects 8 or 16 bit output.
    pub fn frame(
        &self,
        study: &StudyLocation,
        image: &ImageRef,
        frame_number: u32,
        depth: Option<u8>,
    ) -> ObjectQuery {
        let path = study.path(&format!("{}/frame/{}", image.path(), frame_number));
        let payload = Payload::new().optional("depth", depth);
        self.query(Method::Get, study, path, payload, IMAGE_ERRORS)
    }

    /// PDF encapsulated in the image.
    pub fn pdf(&self, study: &StudyLocation, image: &ImageRef) -> ObjectQuery {
        let path = study.path(&format!("{}/pdf", image.path()));
        self.query(Method::Get, study, path, Payload::new(), PDF_ERRORS)
    }

    /// Download one version of a study attachment.
    pub fn attachment(
        &self,
        study: &StudyLocation,
        attachment_id: &str,
        version: &str,
    ) -> ObjectQuery {
        let path = study.path(&format!("/attachment/{}/version/{}", attachment_id, version));
        self.query(Method::Get, study, path, Payload::new(), ATTACHMENT_ERRORS)
    }

    /// Delete one version of a study attachment.
    pub fn delete_attachment(
        &self,
        study: &StudyLocation,
        attachment_id: &str,
        version: &str,
    ) -> ObjectQuery {
        let path = study.path(&format!("/attachment/{}/version/{}", attachment_id, version));
        self.query(Method::Delete, study, path, Payload::new(), ATTACHMENT_ERRORS)
    }

    fn query(
        &self,
        method: Method,
        study: &StudyLocation,
        path: String,
        payload: Payload,
        errors: &'static [ErrorRule],
    ) -> ObjectQuery {
        let spec = RequestSpec::storage(
            method,
            study.engine_fqdn.clone(),
            path,
            payload,
            ErrorMapping::new(errors),
        );
        ObjectQuery::new(self.api.clone(), spec)
    }
}
