use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{info, instrument};

use crate::error::{Error, Result};

const ARTIFACT_EXTENSION: &str = "pdf";

/// Owns the output directory. `<dir>/<chapter>.pdf` existing means the
/// chapter is done.
#[derive(Clone)]
pub struct Processor {
    output_dir: PathBuf,
}

impl Processor {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn artifact_path(&self, chapter: u32) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", chapter, ARTIFACT_EXTENSION))
    }

    pub async fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| Error::io(&self.output_dir, e))
    }

    /// The artifact for `chapter`, if an earlier run already wrote it.
    pub async fn existing(&self, chapter: u32) -> Result<Option<PathBuf>> {
        let path = self.artifact_path(chapter);
        let exists = fs::try_exists(&path)
            .await
            .map_err(|e| Error::io(&path, e))?;
        Ok(exists.then_some(path))
    }

    /// Writes next to the final path and renames into place, so an
    /// interrupted write never leaves a partial `<chapter>.pdf` behind.
    ///
    /// Both steps run in one blocking task: if the calling task is aborted
    /// the write still finishes with either the artifact or nothing.
    #[instrument(skip(self, pdf), fields(bytes = pdf.len()))]
    pub async fn write_pdf(&self, chapter: u32, pdf: Vec<u8>) -> Result<PathBuf> {
        let path = self.artifact_path(chapter);
        let partial = self
            .output_dir
            .join(format!(".{}.{}.part", chapter, ARTIFACT_EXTENSION));

        let target = path.clone();
        tokio::task::spawn_blocking(move || persist(&partial, &target, &pdf)).await??;

        info!("chapter saved to {}", path.display());
        Ok(path)
    }
}

fn persist(partial: &Path, path: &Path, pdf: &[u8]) -> Result<()> {
    let result = std::fs::write(partial, pdf)
        .map_err(|e| Error::io(partial, e))
        .and_then(|()| std::fs::rename(partial, path).map_err(|e| Error::io(path, e)));
    if result.is_err() {
        let _ = std::fs::remove_file(partial);
    }
    result
}
