//! Test fixtures
//!
//! Artifact contents are tagged with their origin so a test can tell which
//! store satisfied a load.

use ocr_artifacts_core::{ArtifactRole, ModelVersion};

/// Origin tag for local store contents
pub const LOCAL: &str = "local";

/// Origin tag for bundled asset contents
pub const BUNDLED: &str = "bundled";

/// Content of an artifact placed in the store named by `origin`
///
/// Dictionaries are multi-line text; models are a short tagged byte string.
pub fn artifact_content(role: ArtifactRole, origin: &str) -> Vec<u8> {
    match role {
        ArtifactRole::Dictionary => format!("{}-a\n{}-b\n{}-c\n", origin, origin, origin).into_bytes(),
        _ => format!("{}:{}", origin, role).into_bytes(),
    }
}

/// Dictionary entries matching [`artifact_content`] for the dictionary role
pub fn dictionary_entries(origin: &str) -> Vec<String> {
    ["a", "b", "c"]
        .iter()
        .map(|suffix| format!("{}-{}", origin, suffix))
        .collect()
}

/// A version whose artifacts are all fetched from `base_url`
pub fn remote_version(base_url: &str) -> ModelVersion {
    let leak = |s: String| -> &'static str { Box::leak(s.into_boxed_str()) };
    ModelVersion {
        id: "VR",
        display_name: "Remote test models",
        det_name: "remote_det.onnx",
        rec_name: "remote_rec.onnx",
        cls_name: "ch_ppocr_mobile_v2.0_cls_infer.onnx",
        dict_name: "remote_dict.txt",
        det_source_url: Some(leak(format!("{}/det/remote_det.onnx", base_url))),
        rec_source_url: Some(leak(format!("{}/rec/remote_rec.onnx", base_url))),
        dict_source_url: Some(leak(format!("{}/remote_dict.txt", base_url))),
    }
}
