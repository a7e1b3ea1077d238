use assert_cmd::Command;
use predicates::prelude::*;

use crate::common::TestProject;

fn deploykf() -> Command {
    let mut cmd = Command::cargo_bin("deploykf").unwrap();
    cmd.env("DEPLOYKF_NO_PROGRESS", "1").env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_version_default_output() {
    let expected = format!(r#"version.BuildInfo{{Version:"v{}""#, env!("CARGO_PKG_VERSION"));
    deploykf().arg("version").assert().success().stdout(predicate::str::starts_with(expected));
}

#[test]
fn test_version_short() {
    deploykf()
        .args(["version", "--short"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(format!("v{}", env!("CARGO_PKG_VERSION"))));
}

#[test]
fn test_version_template() {
    deploykf()
        .args(["version", "--template", "Version: {{ version }}"])
        .assert()
        .success()
        .stdout(format!("Version: v{}", env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_generate_requires_a_source() {
    let project = TestProject::new().unwrap();
    let output = project.run_deploykf(&["generate", "--output-dir", "out"]).unwrap();

    assert!(!output.success);
    assert_eq!(output.code, Some(1));
    assert!(
        output
            .stderr
            .contains("at least one of `--source-version` or `--source-path` must be provided")
    );
    assert!(!project.path().join("out").exists());
}

#[test]
fn test_generate_sources_are_exclusive() {
    deploykf()
        .args(["generate", "-V", "0.1.5", "--source-path", "./gen", "-O", "out"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_generate_requires_output_dir() {
    deploykf()
        .args(["generate", "--source-version", "0.1.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output-dir"));
}

#[cfg(unix)]
mod with_renderer {
    use super::*;
    use deploykf_cli::checksum::hash_path;
    use deploykf_cli::output::read_marker;
    use deploykf_cli::test_utils::GeneratorFixture;

    #[test]
    fn test_generate_from_folder() {
        let project = TestProject::new().unwrap();
        let log = project.install_fake_gomplate().unwrap();
        GeneratorFixture::default().write_dir(&project.path().join("my-generator")).unwrap();
        project.write_file("values.yaml", "deploykf_core:\n  enabled: false\n").unwrap();

        let output = project
            .run_deploykf(&[
                "generate",
                "--source-path",
                "./my-generator",
                "--values",
                "./values.yaml",
                "--output-dir",
                "./GENERATOR_OUTPUT",
            ])
            .unwrap();

        assert!(output.success, "stderr: {}", output.stderr);
        assert!(output.stdout.contains("Using custom source folder: ./my-generator"));
        assert!(output.stdout.contains("Generated manifests at: ./GENERATOR_OUTPUT"));

        let out = project.path().join("GENERATOR_OUTPUT");
        assert!(out.join("rendered.yaml").is_file());

        let marker = read_marker(&out).unwrap().unwrap();
        assert_eq!(marker.source_version, None);
        assert_eq!(
            marker.source_hash,
            Some(hash_path(&project.path().join("my-generator"), &[".gomplateignore"]).unwrap())
        );

        let calls = std::fs::read_to_string(log).unwrap();
        let calls: Vec<&str> = calls.lines().collect();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].contains("--output-map"));
        assert!(calls[0].contains("!*.gomplateignore_template"));
        assert!(calls[1].contains("--output-dir ./GENERATOR_OUTPUT"));
        assert!(calls[1].contains("Values=merge:Values_0|Values_default"));
    }

    #[test]
    fn test_generate_from_zip() {
        let project = TestProject::new().unwrap();
        project.install_fake_gomplate().unwrap();
        let archive = project.path().join("generator.zip");
        GeneratorFixture::default().write_zip(&archive).unwrap();

        let output =
            project.run_deploykf(&["generate", "--source-path", "generator.zip", "-O", "out"]).unwrap();

        assert!(output.success, "stderr: {}", output.stderr);
        assert!(output.stdout.contains("Using custom source file: generator.zip"));
        let marker = read_marker(&project.path().join("out")).unwrap().unwrap();
        assert_eq!(marker.source_hash, Some(hash_path(&archive, &[]).unwrap()));
    }

    #[test]
    fn test_generate_refuses_unmarked_output() {
        let project = TestProject::new().unwrap();
        project.install_fake_gomplate().unwrap();
        GeneratorFixture::default().write_dir(&project.path().join("gen")).unwrap();
        project.write_file("out/foo.txt", "keep me").unwrap();

        let output =
            project.run_deploykf(&["generate", "--source-path", "gen", "-O", "out"]).unwrap();

        assert!(!output.success);
        assert!(output.stderr.contains("is not safe to clean"));
        assert!(output.stderr.contains(".deploykf_output"));
        let out = project.path().join("out");
        assert_eq!(std::fs::read_to_string(out.join("foo.txt")).unwrap(), "keep me");
        assert!(!out.join(".deploykf_output").exists());
        assert!(!out.join("rendered.yaml").exists());
    }

    #[test]
    fn test_generate_missing_source_path() {
        let project = TestProject::new().unwrap();
        project.install_fake_gomplate().unwrap();

        let output =
            project.run_deploykf(&["generate", "--source-path", "./nope", "-O", "out"]).unwrap();

        assert!(!output.success);
        assert!(output.stderr.contains("the provided --source-path './nope' does not exist"));
    }

    #[test]
    fn test_generate_uses_cached_release() {
        let project = TestProject::new().unwrap();
        project.install_fake_gomplate().unwrap();
        GeneratorFixture::default()
            .write_zip(&project.cache_dir().join("deploykf-0.1.5-generator.zip"))
            .unwrap();

        let output = project.run_deploykf(&["generate", "-V", "0.1.5", "-O", "out"]).unwrap();

        assert!(output.success, "stderr: {}", output.stderr);
        assert!(output.stdout.contains("Using cached deployKF generator source:"));
        let marker = read_marker(&project.path().join("out")).unwrap().unwrap();
        assert_eq!(marker.source_version.as_deref(), Some("0.1.5"));
    }
}
