//! Download Integration Tests
//!
//! Tests for fetching remote artifacts over HTTP into the local store and
//! loading them afterwards.

mod common;

use common::fixtures;
use common::TestEnv;
use ocr_artifacts_core::{ArtifactRole, LoadStrategy, PathResolver};
use ocr_artifacts_service::{
    read_dictionary, DownloadOutcome, HttpDownloader, ModelDownloadService, ServiceError,
};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount(server: &MockServer, route: &str, status: u16, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

fn download_service(env: &TestEnv) -> ModelDownloadService {
    ModelDownloadService::new(Arc::new(HttpDownloader::new()), env.local_root.clone())
}

#[tokio::test]
async fn test_download_then_load_from_local_store() {
    let server = MockServer::start().await;
    mount(&server, "/det/remote_det.onnx", 200, b"remote:det").await;
    mount(&server, "/rec/remote_rec.onnx", 200, b"remote:rec").await;
    mount(&server, "/remote_dict.txt", 200, b"x\ny\n").await;

    let version = fixtures::remote_version(&server.uri());
    let env = TestEnv::new();
    env.write_bundled(version.cls_name, b"bundled:cls");
    let downloads = download_service(&env);
    assert!(!downloads.is_version_downloaded(&version));

    let progress = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&progress);
    let on_progress = move |p: f32| sink.lock().unwrap().push(p);

    let outcome = downloads
        .download_version(&version, &on_progress)
        .await
        .unwrap();
    assert_eq!(outcome, DownloadOutcome::Downloaded(3));
    assert!(downloads.is_version_downloaded(&version));

    let progress = progress.lock().unwrap();
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));
    assert!(progress.iter().all(|p| (0.0..=1.0).contains(p)));
    assert_eq!(*progress.last().unwrap(), 1.0);

    // Downloaded files are served by the local store; the classifier stays bundled
    let paths = PathResolver::resolve(None, &version);
    let resolver = env.resolver();
    assert!(resolver.validate(&paths, LoadStrategy::FileFirst).is_success());

    let loader = env.loader();
    assert_eq!(
        loader
            .load_bytes(ArtifactRole::Detector, &paths.det, LoadStrategy::FileOnly)
            .unwrap(),
        b"remote:det"
    );
    let dictionary = read_dictionary(
        loader
            .load_text(ArtifactRole::Dictionary, &paths.dict, LoadStrategy::FileFirst)
            .unwrap(),
    )
    .unwrap();
    assert_eq!(dictionary, vec!["x", "y"]);
}

#[tokio::test]
async fn test_second_download_is_a_noop() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"payload".to_vec()))
        .expect(3)
        .mount(&server)
        .await;

    let version = fixtures::remote_version(&server.uri());
    let env = TestEnv::new();
    let downloads = download_service(&env);

    let first = downloads.download_version(&version, &|_| {}).await.unwrap();
    let second = downloads.download_version(&version, &|_| {}).await.unwrap();

    assert_eq!(first, DownloadOutcome::Downloaded(3));
    assert_eq!(second, DownloadOutcome::AlreadyPresent);
}

#[tokio::test]
async fn test_failed_file_leaves_no_partial_artifact() {
    let server = MockServer::start().await;
    mount(&server, "/det/remote_det.onnx", 200, b"remote:det").await;
    mount(&server, "/rec/remote_rec.onnx", 503, b"").await;

    let version = fixtures::remote_version(&server.uri());
    let env = TestEnv::new();
    let downloads = download_service(&env);

    let err = downloads
        .download_version(&version, &|_| {})
        .await
        .unwrap_err();
    match err {
        ServiceError::Download { url, message } => {
            assert!(url.ends_with("/rec/remote_rec.onnx"));
            assert!(message.contains("503"));
        }
        other => panic!("unexpected error: {:?}", other),
    }

    assert!(env.local_root.join(version.det_name).exists());
    assert!(!env.local_root.join(version.rec_name).exists());
    assert!(!env.local_root.join(format!("{}.part", version.rec_name)).exists());
    assert!(!downloads.is_version_downloaded(&version));

    // Only the missing files are fetched on retry
    let pending = downloads.pending_files(&version).unwrap();
    let roles: Vec<ArtifactRole> = pending.iter().map(|f| f.role).collect();
    assert_eq!(roles, vec![ArtifactRole::Recognizer, ArtifactRole::Dictionary]);
}
