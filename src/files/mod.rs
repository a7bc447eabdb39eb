//! File Store
//!
//! CRUD over the content tree for the admin API. All paths go through the
//! [`Sandbox`]; writes land in a temp sibling first and are renamed into
//! place, so readers never observe a half-written file.

pub mod sandbox;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

pub use sandbox::{display_relative, validate_relative, Sandbox, SandboxPath};

/// Extensions the admin may edit as text
pub const EDITABLE_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "json", "yaml", "yml", "toml", "html", "htm", "css", "js", "ts",
    "xml", "csv", "log",
];

/// Prefix of in-flight temp files (hidden from listings)
const TEMP_PREFIX: &str = ".~";

/// File operation errors
#[derive(Debug, Error)]
pub enum FileError {
    #[error("Invalid path {0}")]
    InvalidPath(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("File type '{0}' is not editable")]
    NotEditable(String),

    #[error("Target already exists: {0}")]
    AlreadyExists(String),

    #[error("Path is a folder: {0}")]
    IsFolder(String),

    #[error("Folder not found: {0}")]
    NotAFolder(String),

    #[error("File is binary and cannot be opened as text: {0}")]
    Binary(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Entry kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Folder,
}

/// One row of a directory listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub file_type: String,
    pub is_editable: bool,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

/// Directory listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryListing {
    pub path: String,
    pub parent: Option<String>,
    pub items: Vec<FileEntry>,
}

/// Text file contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileContent {
    pub path: String,
    pub content: String,
    pub file_type: String,
    pub is_editable: bool,
    pub size: u64,
}

/// Raw file bytes for download
#[derive(Debug, Clone)]
pub struct FileDownload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Lowercased extension, empty when there is none
pub fn file_type_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Whether files of this path's type may be edited as text
pub fn is_editable(path: &Path) -> bool {
    let ext = file_type_of(path);
    EDITABLE_EXTENSIONS.contains(&ext.as_str())
}

/// Sandboxed file store
#[derive(Debug, Clone)]
pub struct FileStore {
    sandbox: Sandbox,
}

impl FileStore {
    /// Open the store at `root`, creating it if missing
    pub async fn open(root: impl AsRef<Path>) -> Result<Self, FileError> {
        let sandbox = Sandbox::open(root).await?;
        info!(root = %sandbox.root().display(), "File store opened");
        Ok(Self { sandbox })
    }

    pub fn root(&self) -> &Path {
        self.sandbox.root()
    }

    /// List a folder; the empty path is the root
    pub async fn list(&self, path: &str) -> Result<DirectoryListing, FileError> {
        let target = self.sandbox.resolve(path).await?;
        let meta = self.metadata(&target).await?;
        if !meta.is_dir() {
            return Err(FileError::NotAFolder(target.display()));
        }

        let mut folders = Vec::new();
        let mut files = Vec::new();
        let mut entries = fs::read_dir(&target.full).await?;

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(TEMP_PREFIX) {
                continue;
            }

            let meta = entry.metadata().await?;
            let relative = target.relative.join(&name);
            let modified = meta.modified().ok().map(DateTime::<Utc>::from);

            if meta.is_dir() {
                folders.push(FileEntry {
                    name,
                    path: display_relative(&relative),
                    kind: EntryKind::Folder,
                    file_type: "folder".to_string(),
                    is_editable: false,
                    size: 0,
                    modified,
                });
            } else {
                files.push(FileEntry {
                    file_type: file_type_of(&relative),
                    is_editable: is_editable(&relative),
                    name,
                    path: display_relative(&relative),
                    kind: EntryKind::File,
                    size: meta.len(),
                    modified,
                });
            }
        }

        folders.sort_by(|a, b| a.name.cmp(&b.name));
        files.sort_by(|a, b| a.name.cmp(&b.name));
        folders.extend(files);

        let parent = if target.is_root() {
            None
        } else {
            Some(
                target
                    .relative
                    .parent()
                    .map(display_relative)
                    .unwrap_or_default(),
            )
        };

        Ok(DirectoryListing {
            path: target.display(),
            parent,
            items: folders,
        })
    }

    /// Read a text file
    pub async fn read(&self, path: &str) -> Result<FileContent, FileError> {
        let target = self.sandbox.resolve(path).await?;
        let meta = self.metadata(&target).await?;
        if meta.is_dir() {
            return Err(FileError::IsFolder(target.display()));
        }

        let bytes = fs::read(&target.full).await?;
        let content = String::from_utf8(bytes).map_err(|_| FileError::Binary(target.display()))?;

        Ok(FileContent {
            path: target.display(),
            file_type: file_type_of(&target.relative),
            is_editable: is_editable(&target.relative),
            size: meta.len(),
            content,
        })
    }

    /// Create or overwrite a text file
    pub async fn save(&self, path: &str, content: &str) -> Result<String, FileError> {
        let target = self.sandbox.resolve(path).await?;
        if target.is_root() {
            return Err(FileError::InvalidPath("a file name is required".to_string()));
        }
        if !is_editable(&target.relative) {
            return Err(FileError::NotEditable(format!(
                ".{}",
                file_type_of(&target.relative)
            )));
        }
        if fs::metadata(&target.full).await.map(|m| m.is_dir()).unwrap_or(false) {
            return Err(FileError::IsFolder(target.display()));
        }

        write_atomic(&target, content.as_bytes()).await?;
        debug!(path = %target.display(), bytes = content.len(), "File saved");
        Ok(target.display())
    }

    /// Delete a file or a folder with its contents
    pub async fn delete(&self, path: &str) -> Result<(), FileError> {
        let target = self.sandbox.resolve(path).await?;
        if target.is_root() {
            return Err(FileError::InvalidPath("cannot delete the root folder".to_string()));
        }

        let meta = self.metadata(&target).await?;
        if meta.is_dir() {
            fs::remove_dir_all(&target.full).await?;
        } else {
            fs::remove_file(&target.full).await?;
        }

        info!(path = %target.display(), "Deleted");
        Ok(())
    }

    /// Rename (or relocate) a file or folder to an exact new path
    pub async fn rename(&self, old_path: &str, new_path: &str) -> Result<String, FileError> {
        let source = self.sandbox.resolve(old_path).await?;
        let destination = self.sandbox.resolve(new_path).await?;
        self.relocate(&source, &destination).await
    }

    /// Move a file or folder into an existing folder, keeping its name
    pub async fn move_into(&self, source_path: &str, folder_path: &str) -> Result<String, FileError> {
        let source = self.sandbox.resolve(source_path).await?;
        let folder = self.sandbox.resolve(folder_path).await?;

        if !self.metadata(&folder).await?.is_dir() {
            return Err(FileError::NotAFolder(folder.display()));
        }

        let name = source
            .file_name()
            .ok_or_else(|| FileError::InvalidPath("cannot move the root folder".to_string()))?;
        let destination = self
            .sandbox
            .resolve(&display_relative(&folder.relative.join(name)))
            .await?;

        self.relocate(&source, &destination).await
    }

    /// Create a folder (and any missing parents)
    pub async fn create_folder(&self, path: &str) -> Result<String, FileError> {
        let target = self.sandbox.resolve(path).await?;
        if target.is_root() {
            return Err(FileError::InvalidPath("a folder name is required".to_string()));
        }
        if exists(&target).await? {
            return Err(FileError::AlreadyExists(target.display()));
        }

        create_dirs(&target.full, &target).await?;
        info!(path = %target.display(), "Folder created");
        Ok(target.display())
    }

    /// Store uploaded files inside `folder`
    ///
    /// Only the final component of each client supplied name is used. Every
    /// name is checked before anything is written, so a rejected name leaves
    /// the folder untouched.
    pub async fn store_uploads<B: AsRef<[u8]>>(
        &self,
        folder: &str,
        files: &[(String, B)],
    ) -> Result<Vec<String>, FileError> {
        let folder = self.sandbox.resolve(folder).await?;

        let mut targets = Vec::with_capacity(files.len());
        for (filename, _) in files {
            targets.push(self.upload_target(&folder, filename).await?);
        }

        let mut stored = Vec::with_capacity(files.len());
        for (target, (_, bytes)) in targets.iter().zip(files) {
            let bytes = bytes.as_ref();
            write_atomic(target, bytes).await?;
            info!(path = %target.display(), bytes = bytes.len(), "Upload stored");
            stored.push(target.display());
        }
        Ok(stored)
    }

    async fn upload_target(
        &self,
        folder: &SandboxPath,
        filename: &str,
    ) -> Result<SandboxPath, FileError> {
        let name = filename
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default()
            .trim();
        if name.is_empty() || name == "." || name == ".." || name.starts_with(TEMP_PREFIX) {
            return Err(FileError::InvalidPath(format!("'{}': invalid file name", filename)));
        }

        let target = self
            .sandbox
            .resolve(&display_relative(&folder.relative.join(name)))
            .await?;
        if fs::metadata(&target.full).await.map(|m| m.is_dir()).unwrap_or(false) {
            return Err(FileError::IsFolder(target.display()));
        }
        Ok(target)
    }

    /// Read raw bytes for download
    pub async fn download(&self, path: &str) -> Result<FileDownload, FileError> {
        let target = self.sandbox.resolve(path).await?;
        let meta = self.metadata(&target).await?;
        if meta.is_dir() {
            return Err(FileError::IsFolder(target.display()));
        }

        let filename = target
            .file_name()
            .ok_or_else(|| FileError::InvalidPath("a file name is required".to_string()))?;
        let bytes = fs::read(&target.full).await?;

        Ok(FileDownload { filename, bytes })
    }

    async fn relocate(
        &self,
        source: &SandboxPath,
        destination: &SandboxPath,
    ) -> Result<String, FileError> {
        if source.is_root() || destination.is_root() {
            return Err(FileError::InvalidPath("cannot move the root folder".to_string()));
        }

        let meta = self.metadata(source).await?;
        if exists(destination).await? {
            return Err(FileError::AlreadyExists(destination.display()));
        }
        if meta.is_dir() && destination.relative.starts_with(&source.relative) {
            return Err(FileError::InvalidPath(format!(
                "'{}': cannot move a folder into itself",
                destination.display()
            )));
        }

        if let Some(parent) = destination.full.parent() {
            create_dirs(parent, destination).await?;
        }
        fs::rename(&source.full, &destination.full)
            .await
            .map_err(|e| parent_error(e, destination))?;

        info!(from = %source.display(), to = %destination.display(), "Renamed");
        Ok(destination.display())
    }

    async fn metadata(&self, target: &SandboxPath) -> Result<std::fs::Metadata, FileError> {
        fs::metadata(&target.full).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound | ErrorKind::NotADirectory => FileError::NotFound(target.display()),
            _ => FileError::Io(e),
        })
    }
}

/// Whether something exists at `target`; a file standing in for a folder means no
async fn exists(target: &SandboxPath) -> Result<bool, FileError> {
    match fs::metadata(&target.full).await {
        Ok(_) => Ok(true),
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

async fn create_dirs(dir: &Path, target: &SandboxPath) -> Result<(), FileError> {
    fs::create_dir_all(dir)
        .await
        .map_err(|e| parent_error(e, target))
}

/// A file sitting where a parent folder should be is a bad path, not a server fault
fn parent_error(e: std::io::Error, target: &SandboxPath) -> FileError {
    match e.kind() {
        ErrorKind::AlreadyExists | ErrorKind::NotADirectory => FileError::InvalidPath(format!(
            "'{}': parent is not a folder",
            target.display()
        )),
        _ => FileError::Io(e),
    }
}

/// Write via a temp sibling and rename over the target
async fn write_atomic(target: &SandboxPath, bytes: &[u8]) -> Result<(), FileError> {
    let parent = target
        .full
        .parent()
        .ok_or_else(|| FileError::InvalidPath("a file name is required".to_string()))?;
    create_dirs(parent, target).await?;

    let temp = parent.join(format!("{}{}.tmp", TEMP_PREFIX, Uuid::new_v4()));
    fs::write(&temp, bytes).await?;

    if let Err(e) = fs::rename(&temp, &target.full).await {
        let _ = fs::remove_file(&temp).await;
        return Err(e.into());
    }
    Ok(())
}
