//! Loading Integration Tests
//!
//! Tests for strategy-driven loading from filesystem stores and for assembling
//! a full artifact set through the service layer.

mod common;

use common::fixtures::{self, BUNDLED, LOCAL};
use common::TestEnv;
use ocr_artifacts_core::{
    ArtifactError, ArtifactRole, ConfigRegistry, EngineConfig, LoadStrategy, PathOverrides,
    PathProvenance, PathResolver, ResolvedPath, VersionCatalog,
};
use std::io::Read;
use std::sync::Arc;

const STRATEGIES: [LoadStrategy; 4] = [
    LoadStrategy::FileFirst,
    LoadStrategy::AssetsFirst,
    LoadStrategy::FileOnly,
    LoadStrategy::AssetsOnly,
];

fn relative(path: &str) -> ResolvedPath {
    ResolvedPath::new(path, PathProvenance::VersionDefault)
}

#[test]
fn test_file_first_falls_back_to_bundled() {
    let env = TestEnv::new();
    env.write_bundled("det.onnx", fixtures::artifact_content(ArtifactRole::Detector, BUNDLED));

    let bytes = env
        .loader()
        .load_bytes(ArtifactRole::Detector, &relative("det.onnx"), LoadStrategy::FileFirst)
        .unwrap();
    assert_eq!(bytes, b"bundled:det");
}

#[test]
fn test_preferred_backend_wins_when_both_hold_the_file() {
    let env = TestEnv::new();
    env.write_local("rec.onnx", fixtures::artifact_content(ArtifactRole::Recognizer, LOCAL));
    env.write_bundled("rec.onnx", fixtures::artifact_content(ArtifactRole::Recognizer, BUNDLED));
    let loader = env.loader();
    let path = relative("rec.onnx");

    let load = |strategy| loader.load_bytes(ArtifactRole::Recognizer, &path, strategy).unwrap();
    assert_eq!(load(LoadStrategy::FileFirst), b"local:rec");
    assert_eq!(load(LoadStrategy::FileOnly), b"local:rec");
    assert_eq!(load(LoadStrategy::AssetsFirst), b"bundled:rec");
    assert_eq!(load(LoadStrategy::AssetsOnly), b"bundled:rec");
}

#[test]
fn test_file_only_ignores_bundled_assets() {
    let env = TestEnv::new();
    env.write_bundled("cls.onnx", b"bundled:cls");
    let loader = env.loader();
    let path = relative("cls.onnx");

    let err = loader
        .load_bytes(ArtifactRole::Classifier, &path, LoadStrategy::FileOnly)
        .unwrap_err();
    assert_eq!(
        err,
        ArtifactError::load_failed(ArtifactRole::Classifier, "cls.onnx", LoadStrategy::FileOnly)
    );
    assert!(loader
        .load_bytes(ArtifactRole::Classifier, &path, LoadStrategy::AssetsOnly)
        .is_ok());
}

#[test]
fn test_missing_everywhere_fails_under_every_strategy() {
    let env = TestEnv::new();
    let loader = env.loader();
    let path = relative("nowhere.onnx");

    for strategy in STRATEGIES {
        let err = loader
            .load_bytes(ArtifactRole::Detector, &path, strategy)
            .unwrap_err();
        assert_eq!(err.role(), Some(ArtifactRole::Detector));
        assert_eq!(
            err.to_string(),
            format!(
                "Failed to load det artifact from nowhere.onnx with strategy {}",
                strategy
            )
        );
        assert!(loader.load_text(ArtifactRole::Dictionary, &path, strategy).is_err());
    }
}

#[test]
fn test_absolute_path_loads_from_local_store_only() {
    let env = TestEnv::new();
    let det = env.write_local("sdcard/det.onnx", b"sdcard:det");
    let overrides = PathOverrides::new().with_det(det.to_string_lossy());
    let paths = PathResolver::resolve(Some(&overrides), VersionCatalog::lookup("V3"));
    assert!(paths.det.is_absolute);

    let loader = env.loader();
    assert_eq!(
        loader
            .load_bytes(ArtifactRole::Detector, &paths.det, LoadStrategy::AssetsFirst)
            .unwrap(),
        b"sdcard:det"
    );

    let err = loader
        .load_bytes(ArtifactRole::Detector, &paths.det, LoadStrategy::AssetsOnly)
        .unwrap_err();
    assert!(matches!(
        err,
        ArtifactError::LoadFailed { strategy: LoadStrategy::AssetsOnly, .. }
    ));
}

#[test]
fn test_bundled_key_cannot_escape_asset_root() {
    let env = TestEnv::new();
    env.write_local("secret.onnx", b"secret");

    let err = env
        .loader()
        .load_bytes(
            ArtifactRole::Detector,
            &relative("../models/secret.onnx"),
            LoadStrategy::AssetsOnly,
        )
        .unwrap_err();
    assert_eq!(err.role(), Some(ArtifactRole::Detector));
}

#[test]
fn test_load_text_streams_dictionary() {
    let env = TestEnv::new();
    env.write_local("keys.txt", "first\nsecond\n");

    let mut text = String::new();
    env.loader()
        .load_text(ArtifactRole::Dictionary, &relative("keys.txt"), LoadStrategy::FileOnly)
        .unwrap()
        .read_to_string(&mut text)
        .unwrap();
    assert_eq!(text, "first\nsecond\n");
}

#[test]
fn test_service_loads_full_bundled_set() {
    let v3 = VersionCatalog::lookup("V3");
    let env = TestEnv::with_bundled_version(v3);
    let service = env.service();

    let plan = service.resolve("V3", None);
    assert!(service.validate(&plan).is_success());

    let artifacts = service.load(&plan).unwrap();
    assert_eq!(artifacts.version_id, "V3");
    assert_eq!(artifacts.detector, b"bundled:det");
    assert_eq!(artifacts.classifier, b"bundled:cls");
    assert_eq!(artifacts.recognizer, b"bundled:rec");
    assert_eq!(artifacts.dictionary, fixtures::dictionary_entries(BUNDLED));
}

#[test]
fn test_service_mixes_downloaded_and_bundled_artifacts() {
    // V4 ships its models remotely and reuses the bundled classifier and dictionary
    let v3 = VersionCatalog::lookup("V3");
    let v4 = VersionCatalog::lookup("V4");
    let env = TestEnv::with_bundled_version(v3);
    env.write_local(v4.det_name, fixtures::artifact_content(ArtifactRole::Detector, LOCAL));
    env.write_local(v4.rec_name, fixtures::artifact_content(ArtifactRole::Recognizer, LOCAL));

    let artifacts = env.service().load_version("V4", None).unwrap();
    assert_eq!(artifacts.version_id, "V4");
    assert_eq!(artifacts.detector, b"local:det");
    assert_eq!(artifacts.classifier, b"bundled:cls");
    assert_eq!(artifacts.recognizer, b"local:rec");
    assert_eq!(artifacts.dictionary, fixtures::dictionary_entries(BUNDLED));
}

#[test]
fn test_service_load_failure_names_role_path_and_strategy() {
    let v4 = VersionCatalog::lookup("V4");
    let env = TestEnv::with_bundled_version(VersionCatalog::lookup("V3"));
    let service = env.service();

    let plan = service.resolve("V4", None);
    let validation = service.validate(&plan);
    let failing: Vec<ArtifactRole> = validation.failures().iter().map(|f| f.role).collect();
    assert_eq!(failing, vec![ArtifactRole::Detector, ArtifactRole::Recognizer]);

    let err = service.load(&plan).unwrap_err();
    assert!(err.is_load_failure());
    assert_eq!(
        err.to_string(),
        format!(
            "Failed to load det artifact from {} with strategy FILE_FIRST",
            v4.det_name
        )
    );
}

#[test]
fn test_global_config_steers_service_loading() {
    let v3 = VersionCatalog::lookup("V3");
    let env = TestEnv::with_bundled_version(v3);
    env.write_local(v3.det_name, fixtures::artifact_content(ArtifactRole::Detector, LOCAL));

    let registry = Arc::new(ConfigRegistry::new());
    let service = env.service_with_registry(Arc::clone(&registry));
    assert_eq!(service.load_version("V3", None).unwrap().detector, b"local:det");

    registry.set(EngineConfig::new().with_load_strategy(LoadStrategy::AssetsFirst));
    assert_eq!(service.load_version("V3", None).unwrap().detector, b"bundled:det");

    // A per-call config takes precedence over the registry
    let instance = EngineConfig::new().with_load_strategy(LoadStrategy::FileOnly);
    let err = service.load_version("V3", Some(&instance)).unwrap_err();
    assert!(err.is_load_failure());
}
