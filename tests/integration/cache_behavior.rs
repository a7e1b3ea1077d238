use deploykf_cli::core::DeployKfError;
use deploykf_cli::source::SourceCache;
use deploykf_cli::test_utils::{FakeResolver, GeneratorFixture};
use std::sync::Arc;
use tempfile::TempDir;

fn artifact() -> Vec<u8> {
    GeneratorFixture::default().zip_bytes().unwrap()
}

#[tokio::test]
async fn test_cache_is_shared_between_instances() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("assets");

    let downloader =
        Arc::new(FakeResolver::new().with_release("0.1.5", &[("deploykf-0.1.5-generator.zip", artifact())]));
    SourceCache::new(downloader.clone(), root.clone())
        .acquire("0.1.5", &temp.path().join("first"))
        .await
        .unwrap();
    assert_eq!(downloader.asset_downloads(), 1);

    // a resolver that knows no releases proves the second run is offline
    let offline = Arc::new(FakeResolver::new());
    let cache = SourceCache::new(offline.clone(), root);
    assert!(cache.is_cached("0.1.5").unwrap());
    cache.acquire("0.1.5", &temp.path().join("second")).await.unwrap();

    assert_eq!(offline.release_lookups(), 0);
    assert!(temp.path().join("second/templates/core/app.yaml").is_file());
}

#[tokio::test]
async fn test_failed_download_can_be_retried() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("assets");

    let flaky = Arc::new(
        FakeResolver::new()
            .with_release("0.1.5", &[("deploykf-0.1.5-generator.zip", artifact())])
            .failing_after_first_chunk(),
    );
    let err = SourceCache::new(flaky, root.clone())
        .acquire("0.1.5", &temp.path().join("first"))
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DeployKfError>(),
        Some(DeployKfError::NetworkError { .. })
    ));
    assert!(!root.join("deploykf-0.1.5-generator.zip").exists());
    assert!(!root.join("deploykf-0.1.5-generator.zip.part").exists());

    let healthy =
        Arc::new(FakeResolver::new().with_release("0.1.5", &[("deploykf-0.1.5-generator.zip", artifact())]));
    SourceCache::new(healthy, root.clone())
        .acquire("0.1.5", &temp.path().join("second"))
        .await
        .unwrap();
    assert!(root.join("deploykf-0.1.5-generator.zip").is_file());
}

#[tokio::test]
async fn test_versions_are_cached_side_by_side() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("assets");
    let resolver = Arc::new(
        FakeResolver::new()
            .with_release("0.1.4", &[("deploykf-0.1.4-generator.zip", artifact())])
            .with_release("0.1.5", &[("deploykf-0.1.5-generator.zip", artifact())]),
    );
    let cache = SourceCache::new(resolver.clone(), root.clone());

    cache.acquire("0.1.4", &temp.path().join("a")).await.unwrap();
    cache.acquire("0.1.5", &temp.path().join("b")).await.unwrap();

    assert_eq!(resolver.release_lookups(), 2);
    let mut names: Vec<String> = std::fs::read_dir(&root)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["deploykf-0.1.4-generator.zip", "deploykf-0.1.5-generator.zip"]);
}
