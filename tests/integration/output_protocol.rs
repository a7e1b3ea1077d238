use deploykf_cli::generate::{GenerateOptions, generate};
use deploykf_cli::output::{prepare_for_clean, read_marker, record_run};
use deploykf_cli::source::{SourceCache, SourceSelection};
use deploykf_cli::test_utils::{FakeResolver, GeneratorFixture, RecordingRenderer};
use deploykf_cli::version::BuildInfo;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn test_regenerate_replaces_previous_output() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("gen");
    GeneratorFixture::default().write_dir(&source).unwrap();
    let out = temp.path().join("out");
    let cache = SourceCache::new(Arc::new(FakeResolver::new()), temp.path().join("assets"));
    let renderer = RecordingRenderer::new();
    let run = GenerateOptions {
        source: SourceSelection::Path(source),
        values: Vec::new(),
        output_dir: out.clone(),
    };

    generate(&run, &cache, &renderer, &BuildInfo::current()).await.unwrap();
    fs::write(out.join("stale.yaml"), "old").unwrap();
    fs::create_dir_all(out.join("argocd/old")).unwrap();

    generate(&run, &cache, &renderer, &BuildInfo::current()).await.unwrap();

    assert!(!out.join("stale.yaml").exists());
    assert!(!out.join("argocd").exists());
    assert!(out.join("manifest.yaml").is_file());
    assert!(read_marker(&out).unwrap().is_some());
}

#[test]
fn test_marker_makes_directory_cleanable() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("out");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("foo.txt"), "x").unwrap();

    assert!(prepare_for_clean(&out).is_err());
    assert!(out.join("foo.txt").exists());

    record_run(&out, None, None, None, &BuildInfo::current()).unwrap();
    prepare_for_clean(&out).unwrap();

    assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
}

#[test]
fn test_marker_records_cli_version() {
    let temp = TempDir::new().unwrap();
    let marker =
        record_run(temp.path(), Some("0.1.5"), Some("/cache/a.zip"), Some("abc"), &BuildInfo::current())
            .unwrap();

    assert_eq!(marker.cli_version, format!("v{}", env!("CARGO_PKG_VERSION")));
    assert_eq!(read_marker(temp.path()).unwrap(), Some(marker));
}
