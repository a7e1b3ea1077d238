use deploykf_cli::checksum::hash_path;
use deploykf_cli::core::DeployKfError;
use deploykf_cli::generate::{GenerateOptions, generate};
use deploykf_cli::render::RenderPhase;
use deploykf_cli::source::{SourceCache, SourceSelection};
use deploykf_cli::test_utils::{FakeResolver, GeneratorFixture, RecordingRenderer, init_test_logging};
use deploykf_cli::version::BuildInfo;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

fn options(source: SourceSelection, output_dir: PathBuf) -> GenerateOptions {
    GenerateOptions {
        source,
        values: Vec::new(),
        output_dir,
    }
}

fn release_resolver(version: &str) -> Arc<FakeResolver> {
    let bytes = GeneratorFixture::default().zip_bytes().unwrap();
    let asset = format!("deploykf-{version}-generator.zip");
    Arc::new(FakeResolver::new().with_release(version, &[(asset.as_str(), bytes)]))
}

#[tokio::test]
async fn test_generate_from_release_downloads_once() {
    init_test_logging(None);
    let temp = TempDir::new().unwrap();
    let resolver = release_resolver("1.2.3");
    let cache = SourceCache::new(resolver.clone(), temp.path().join("assets"));
    let renderer = RecordingRenderer::new();
    let out = temp.path().join("out");
    let run = options(SourceSelection::Version("1.2.3".to_string()), out.clone());

    let first = generate(&run, &cache, &renderer, &BuildInfo::current()).await.unwrap();
    let second = generate(&run, &cache, &renderer, &BuildInfo::current()).await.unwrap();

    assert_eq!(resolver.release_lookups(), 1);
    assert_eq!(resolver.asset_downloads(), 1);

    let artifact = temp.path().join("assets/deploykf-1.2.3-generator.zip");
    assert_eq!(first.source.origin, artifact);
    assert_eq!(second.marker.source_version.as_deref(), Some("1.2.3"));
    assert_eq!(second.marker.source_path, Some(artifact.display().to_string()));
    assert_eq!(second.marker.source_hash, first.marker.source_hash);
    assert_eq!(renderer.requests().len(), 4);
}

#[tokio::test]
async fn test_render_order_and_inputs() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("gen");
    GeneratorFixture::default().write_dir(&source).unwrap();
    let renderer = RecordingRenderer::new();
    let cache = SourceCache::new(Arc::new(FakeResolver::new()), temp.path().join("assets"));

    generate(
        &options(SourceSelection::Path(source), temp.path().join("out")),
        &cache,
        &renderer,
        &BuildInfo::current(),
    )
    .await
    .unwrap();

    let requests = renderer.requests();
    assert_eq!(requests[0].phase, RenderPhase::IgnoreFiles);
    assert_eq!(requests[1].phase, RenderPhase::Manifests);
    assert_eq!(requests[0].input_dir, requests[1].input_dir);
    assert!(requests[0].input_dir.ends_with("templates"));
    assert!(requests[0].templates.iter().any(|t| t.starts_with("helpers=")));
    assert!(requests[0].templates.iter().any(|t| t.starts_with("runtime=")));
    // the scratch tree is gone after the run
    assert!(!requests[0].input_dir.exists());
}

#[tokio::test]
async fn test_release_without_generator_subtree() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("other.zip");
    {
        use std::io::Write;
        let mut writer = zip::ZipWriter::new(std::fs::File::create(&archive).unwrap());
        writer.start_file("templates/a.yaml", zip::write::SimpleFileOptions::default()).unwrap();
        writer.write_all(b"a: 1").unwrap();
        writer.finish().unwrap();
    }
    let renderer = RecordingRenderer::new();
    let cache = SourceCache::new(Arc::new(FakeResolver::new()), temp.path().join("assets"));

    let err = generate(
        &options(SourceSelection::Path(archive), temp.path().join("out")),
        &cache,
        &renderer,
        &BuildInfo::current(),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DeployKfError>(),
        Some(DeployKfError::SubtreeNotFound { .. })
    ));
    assert!(renderer.requests().is_empty());
}

#[tokio::test]
async fn test_unsupported_generator_schema() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("gen.zip");
    GeneratorFixture::default()
        .with_marker(r#"{"generator_schema": "v2"}"#)
        .write_zip(&archive)
        .unwrap();
    let renderer = RecordingRenderer::new();
    let cache = SourceCache::new(Arc::new(FakeResolver::new()), temp.path().join("assets"));

    let err = generate(
        &options(SourceSelection::Path(archive), temp.path().join("out")),
        &cache,
        &renderer,
        &BuildInfo::current(),
    )
    .await
    .unwrap_err();

    assert_eq!(err.to_string(), "invalid generator source: unsupported schema version 'v2'");
    assert!(!temp.path().join("out").exists());
}

#[tokio::test]
async fn test_source_hash_ignores_render_ignore_files() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("gen");
    GeneratorFixture::default().write_dir(&source).unwrap();
    let before = hash_path(&source, &[".gomplateignore"]).unwrap();

    std::fs::write(source.join("templates/.gomplateignore"), "core/\n").unwrap();
    let renderer = RecordingRenderer::new();
    let cache = SourceCache::new(Arc::new(FakeResolver::new()), temp.path().join("assets"));

    let report = generate(
        &options(SourceSelection::Path(source), temp.path().join("out")),
        &cache,
        &renderer,
        &BuildInfo::current(),
    )
    .await
    .unwrap();

    assert_eq!(report.marker.source_hash, Some(before));
}
