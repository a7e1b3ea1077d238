//! Generator source fixtures
//!
//! [`GeneratorFixture`] writes a small but valid generator source either as a
//! directory or as a release-style zip with everything under `generator/`.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;

/// A generator source described as a list of files.
#[derive(Clone, Debug)]
pub struct GeneratorFixture {
    /// `(relative path, content)` pairs, directories implied
    pub files: Vec<(String, String)>,
}

impl Default for GeneratorFixture {
    fn default() -> Self {
        Self {
            files: vec![
                (".deploykf_generator".to_string(), r#"{"generator_schema": "v1"}"#.to_string()),
                ("default_values.yaml".to_string(), "deploykf_core:\n  enabled: true\n".to_string()),
                ("helpers/_labels.tpl".to_string(), "{{<- define \"labels\" >}}app: deploykf{{< end >}}\n".to_string()),
                (
                    "templates/.gomplateignore_template".to_string(),
                    "{{<- if not .Values.deploykf_core.enabled >}}\ncore/\n{{<- end >}}\n".to_string(),
                ),
                (
                    "templates/core/app.yaml".to_string(),
                    "kind: Application\nmetadata:\n  labels: {{< template \"labels\" >}}\n".to_string(),
                ),
            ],
        }
    }
}

impl GeneratorFixture {
    /// Replaces the generator marker content.
    #[must_use]
    pub fn with_marker(self, content: &str) -> Self {
        self.with_file(".deploykf_generator", content)
    }

    /// Adds or replaces one file.
    #[must_use]
    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        self.files.retain(|(existing, _)| existing != path);
        self.files.push((path.to_string(), content.to_string()));
        self
    }

    /// Writes the source as a plain directory tree rooted at `root`.
    pub fn write_dir(&self, root: &Path) -> Result<()> {
        for (path, content) in &self.files {
            let target = root.join(path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, content)
                .with_context(|| format!("Failed to write fixture file {}", target.display()))?;
        }
        // helpers/ and templates/ are required even when the fixture lists no files there
        fs::create_dir_all(root.join("helpers"))?;
        fs::create_dir_all(root.join("templates"))?;
        Ok(())
    }

    /// Writes the source as a release artifact at `path`.
    ///
    /// Entries live under `generator/`; a `README.md` sits outside it the way
    /// release artifacts carry extra files.
    pub fn write_zip(&self, path: &Path) -> Result<()> {
        let file = fs::File::create(path)
            .with_context(|| format!("Failed to create fixture zip {}", path.display()))?;
        let mut writer = zip::ZipWriter::new(file);
        let options = SimpleFileOptions::default().unix_permissions(0o644);

        writer.start_file("README.md", options)?;
        writer.write_all(b"deployKF generator\n")?;

        writer.add_directory("generator/", options)?;
        for dir in ["generator/helpers/", "generator/templates/"] {
            writer.add_directory(dir, options)?;
        }
        for (name, content) in &self.files {
            writer.start_file(format!("generator/{name}"), options)?;
            writer.write_all(content.as_bytes())?;
        }

        writer.finish()?;
        Ok(())
    }

    /// The zip artifact as bytes.
    pub fn zip_bytes(&self) -> Result<Vec<u8>> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("generator.zip");
        self.write_zip(&path)?;
        Ok(fs::read(path)?)
    }
}
