//! Path sandboxing
//!
//! Every user supplied path is validated lexically first and then checked
//! against the canonical root, so nothing outside the content tree is ever
//! touched.

use std::path::{Component, Path, PathBuf};
use tokio::fs;

use super::FileError;

/// Lexically validate a client path and return it as a clean relative path.
///
/// An empty result means the sandbox root.
pub fn validate_relative(raw: &str) -> Result<PathBuf, FileError> {
    let invalid = |reason: &str| FileError::InvalidPath(format!("'{}': {}", raw, reason));

    if raw.contains('\0') {
        return Err(invalid("contains a NUL byte"));
    }
    if raw.contains('\\') {
        return Err(invalid("backslashes are not allowed"));
    }
    if raw.starts_with('/') {
        return Err(invalid("absolute paths are not allowed"));
    }

    let mut clean = PathBuf::new();
    for segment in raw.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return Err(invalid("parent directory references are not allowed")),
            s if s.contains(':') => return Err(invalid("drive or stream markers are not allowed")),
            s => clean.push(s),
        }
    }

    // The platform parser must agree this is a plain relative path
    if clean
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return Err(invalid("path escapes the content root"));
    }

    Ok(clean)
}

/// Render a relative path with forward slashes
pub fn display_relative(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Resolved location inside the sandbox
#[derive(Debug, Clone)]
pub struct SandboxPath {
    /// Absolute filesystem path
    pub full: PathBuf,
    /// Path relative to the root
    pub relative: PathBuf,
}

impl SandboxPath {
    pub fn is_root(&self) -> bool {
        self.relative.as_os_str().is_empty()
    }

    pub fn display(&self) -> String {
        display_relative(&self.relative)
    }

    pub fn file_name(&self) -> Option<String> {
        self.relative
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
    }
}

/// A directory that client paths cannot escape
#[derive(Debug, Clone)]
pub struct Sandbox {
    root: PathBuf,
}

impl Sandbox {
    /// Open a sandbox, creating the root if needed
    pub async fn open(root: impl AsRef<Path>) -> Result<Self, FileError> {
        let root = root.as_ref();
        fs::create_dir_all(root).await?;
        let root = fs::canonicalize(root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a client path to a location inside the root
    pub async fn resolve(&self, raw: &str) -> Result<SandboxPath, FileError> {
        let relative = validate_relative(raw)?;
        let full = self.root.join(&relative);

        // Symlinks could still point outside; check the deepest existing ancestor
        for ancestor in full.ancestors() {
            if let Ok(canonical) = fs::canonicalize(ancestor).await {
                if !canonical.starts_with(&self.root) {
                    tracing::warn!(path = %raw, "rejected path resolving outside the content root");
                    return Err(FileError::InvalidPath(format!(
                        "'{}': path escapes the content root",
                        raw
                    )));
                }
                break;
            }
        }

        Ok(SandboxPath { full, relative })
    }
}
