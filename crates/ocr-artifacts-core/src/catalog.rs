//! Catalog of known model versions
//!
//! Every version maps to the default file names of its four artifacts and to
//! the remote locators the downloader uses to fetch the ones that are not
//! bundled with the application. The table is fixed at build time.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::types::ArtifactRole;

/// Identifier of the version used when a lookup does not match
pub const DEFAULT_VERSION_ID: &str = "V3";

/// Locator of a file on the mirror hosting the remote artifacts
macro_rules! mirror_url {
    ($path:literal) => {
        concat!(
            "https://www.modelscope.cn/models/RapidAI/RapidOCR/resolve/v3.4.0",
            $path
        )
    };
}

static CATALOG: [ModelVersion; 3] = [
    ModelVersion {
        id: "V3",
        display_name: "PP-OCRv3",
        det_name: "ch_PP-OCRv3_det_infer.onnx",
        rec_name: "ch_PP-OCRv3_rec_infer.onnx",
        cls_name: "ch_ppocr_mobile_v2.0_cls_infer.onnx",
        dict_name: "ppocr_keys_v1.txt",
        det_source_url: None,
        rec_source_url: None,
        dict_source_url: None,
    },
    ModelVersion {
        id: "V4",
        display_name: "PP-OCRv4",
        det_name: "ch_PP-OCRv4_det_infer.onnx",
        rec_name: "ch_PP-OCRv4_rec_infer.onnx",
        cls_name: "ch_ppocr_mobile_v2.0_cls_infer.onnx",
        dict_name: "ppocr_keys_v1.txt",
        det_source_url: Some(mirror_url!("/onnx/PP-OCRv4/det/ch_PP-OCRv4_det_infer.onnx")),
        rec_source_url: Some(mirror_url!("/onnx/PP-OCRv4/rec/ch_PP-OCRv4_rec_infer.onnx")),
        // Shares the V3 dictionary
        dict_source_url: None,
    },
    ModelVersion {
        id: "V5",
        display_name: "PP-OCRv5",
        det_name: "ch_PP-OCRv5_mobile_det.onnx",
        rec_name: "ch_PP-OCRv5_rec_mobile_infer.onnx",
        cls_name: "ch_ppocr_mobile_v2.0_cls_infer.onnx",
        dict_name: "ppocrv5_dict.txt",
        det_source_url: Some(mirror_url!("/onnx/PP-OCRv5/det/ch_PP-OCRv5_mobile_det.onnx")),
        rec_source_url: Some(mirror_url!("/onnx/PP-OCRv5/rec/ch_PP-OCRv5_rec_mobile_infer.onnx")),
        dict_source_url: Some(mirror_url!(
            "/paddle/PP-OCRv5/rec/ch_PP-OCRv5_rec_mobile_infer/ppocrv5_dict.txt"
        )),
    },
];

static INDEX: Lazy<HashMap<&'static str, &'static ModelVersion>> =
    Lazy::new(|| CATALOG.iter().map(|v| (v.id, v)).collect());

/// An immutable model version record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ModelVersion {
    /// Stable identifier (e.g. "V4"), the value persisted in preferences
    pub id: &'static str,
    /// Human-readable name
    pub display_name: &'static str,
    /// Detector model file name
    pub det_name: &'static str,
    /// Recognizer model file name
    pub rec_name: &'static str,
    /// Classifier model file name
    pub cls_name: &'static str,
    /// Dictionary file name
    pub dict_name: &'static str,
    /// Remote locator of the detector model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub det_source_url: Option<&'static str>,
    /// Remote locator of the recognizer model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rec_source_url: Option<&'static str>,
    /// Remote locator of the dictionary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dict_source_url: Option<&'static str>,
}

impl ModelVersion {
    /// Default file name for a role
    pub fn file_name(&self, role: ArtifactRole) -> &'static str {
        match role {
            ArtifactRole::Detector => self.det_name,
            ArtifactRole::Classifier => self.cls_name,
            ArtifactRole::Recognizer => self.rec_name,
            ArtifactRole::Dictionary => self.dict_name,
        }
    }

    /// Remote locator for a role; the classifier is always bundled
    pub fn source_url(&self, role: ArtifactRole) -> Option<&'static str> {
        match role {
            ArtifactRole::Detector => self.det_source_url,
            ArtifactRole::Classifier => None,
            ArtifactRole::Recognizer => self.rec_source_url,
            ArtifactRole::Dictionary => self.dict_source_url,
        }
    }

    /// True when no artifact of this version has to be fetched remotely
    pub fn is_bundled(&self) -> bool {
        ArtifactRole::ALL
            .iter()
            .all(|role| self.source_url(*role).is_none())
    }
}

impl fmt::Display for ModelVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.id)
    }
}

/// Lookup table over the known model versions
pub struct VersionCatalog;

impl VersionCatalog {
    /// Look up a version by identifier, falling back to the default version
    pub fn lookup(id: &str) -> &'static ModelVersion {
        Self::get(id).unwrap_or_else(Self::default_version)
    }

    /// Look up a version by identifier without fallback
    pub fn get(id: &str) -> Option<&'static ModelVersion> {
        INDEX.get(id).copied()
    }

    /// The version used when nothing else matches
    pub fn default_version() -> &'static ModelVersion {
        // CATALOG always contains DEFAULT_VERSION_ID
        &CATALOG[0]
    }

    /// All known versions in declaration order
    pub fn all() -> &'static [ModelVersion] {
        &CATALOG
    }
}
