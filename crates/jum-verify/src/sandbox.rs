use std::path::{Component, Path};

use jum_core::CodeArtifact;
use tempfile::TempDir;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("unsafe artifact path: {0}")]
    UnsafePath(String),

    /// The scratch directory itself could not be created.
    #[error("cannot create sandbox: {0}")]
    Create(#[source] std::io::Error),

    /// An artifact file could not be written, e.g. a path that is both a
    /// file and a directory.
    #[error("cannot write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A throwaway directory holding one artifact's files. Removed on drop.
pub struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    /// Create a fresh directory and write every artifact file into it.
    pub fn materialize(artifact: &CodeArtifact) -> Result<Self, SandboxError> {
        let dir = tempfile::Builder::new()
            .prefix("jum-qa-")
            .tempdir()
            .map_err(SandboxError::Create)?;
        for (path, content) in &artifact.files {
            if !is_safe_relative(path) {
                return Err(SandboxError::UnsafePath(path.clone()));
            }
            write_file(dir.path(), path, content).map_err(|source| SandboxError::Write {
                path: path.clone(),
                source,
            })?;
        }
        debug!(
            "materialized {} file(s) into {}",
            artifact.files.len(),
            dir.path().display()
        );
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

fn write_file(root: &Path, path: &str, content: &str) -> std::io::Result<()> {
    let full = root.join(path);
    if let Some(parent) = full.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&full, content)
}

/// Relative, naming at least one real component, and never climbing out
/// with `..`.
pub fn is_safe_relative(path: &str) -> bool {
    let mut named = false;
    for component in Path::new(path).components() {
        match component {
            Component::Normal(_) => named = true,
            Component::CurDir => {}
            _ => return false,
        }
    }
    named && !path.trim().is_empty()
}
