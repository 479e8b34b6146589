//! FileStore — uploaded product images on local disk.
//!
//! Every stored file gets a fresh name of the form `{uuid}_{original}` so
//! concurrent uploads never write to the same path. The store never tracks
//! which product refers to which file; that link lives only in the database.

use crate::models::view_models::UploadedFile;
use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};
use thiserror::Error;
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tracing::debug;
use uuid::Uuid;

const MAX_ORIGINAL_NAME_LEN: usize = 100;

#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("invalid file name `{0}`")]
    InvalidFileName(String),
    #[error("file `{0}` not found")]
    NotFound(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type FileStoreResult<T> = Result<T, FileStoreError>;

#[derive(Clone, Debug)]
pub struct FileStore {
    /// Directory holding every stored image.
    pub root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Make sure the image directory exists.
    pub async fn ensure_root(&self) -> FileStoreResult<()> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Write an upload under a generated unique name and return that name.
    ///
    /// Bytes go to a temporary file first, are synced, then renamed into
    /// place, so a reader never observes a half-written image.
    pub async fn store(&self, upload: &UploadedFile) -> FileStoreResult<String> {
        self.ensure_root().await?;

        let file_name = format!(
            "{}_{}",
            Uuid::new_v4(),
            sanitize_original_name(&upload.file_name)
        );
        let final_path = self.root.join(&file_name);
        let tmp_path = self.root.join(format!(".tmp-{}", Uuid::new_v4()));

        if let Err(err) = write_synced(&tmp_path, &upload.data).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(FileStoreError::Io(err));
        }
        if let Err(err) = fs::rename(&tmp_path, &final_path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(FileStoreError::Io(err));
        }

        debug!(
            "stored upload `{}` ({} bytes) as {}",
            upload.file_name,
            upload.data.len(),
            final_path.display()
        );
        Ok(file_name)
    }

    /// Remove a stored file. A file that is already gone is not an error.
    pub async fn delete(&self, file_name: &str) -> FileStoreResult<()> {
        let path = self.path_for(file_name)?;
        match fs::remove_file(&path).await {
            Ok(_) => debug!("removed image {}", path.display()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("image {} already missing", path.display());
            }
            Err(err) => return Err(FileStoreError::Io(err)),
        }
        Ok(())
    }

    /// Open a stored file for reading.
    pub async fn open(&self, file_name: &str) -> FileStoreResult<File> {
        let path = self.path_for(file_name)?;
        File::open(&path).await.map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                FileStoreError::NotFound(file_name.to_string())
            } else {
                FileStoreError::Io(err)
            }
        })
    }

    /// Resolve a stored name to its path, refusing anything that could
    /// escape the image directory.
    pub fn path_for(&self, file_name: &str) -> FileStoreResult<PathBuf> {
        if file_name.is_empty()
            || file_name.starts_with('.')
            || file_name.contains(['/', '\\', '\0'])
            || file_name.contains("..")
        {
            return Err(FileStoreError::InvalidFileName(file_name.to_string()));
        }
        Ok(self.root.join(file_name))
    }
}

async fn write_synced(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = File::create(path).await?;
    file.write_all(data).await?;
    file.flush().await?;
    file.sync_all().await
}

/// Reduce a client-supplied filename to a safe basename.
///
/// Directory components are dropped (browsers on some platforms send full
/// paths), unsafe characters become `_`, and the result is capped in length
/// while keeping the extension.
fn sanitize_original_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim();
    let mut cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    while cleaned.contains("..") {
        cleaned = cleaned.replace("..", ".");
    }
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        return "upload".to_string();
    }
    if cleaned.chars().count() <= MAX_ORIGINAL_NAME_LEN {
        return cleaned.to_string();
    }

    let extension = Path::new(cleaned)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| e.len() <= 10)
        .unwrap_or("");
    let keep = MAX_ORIGINAL_NAME_LEN - extension.len() - 1;
    let stem: String = cleaned.chars().take(keep).collect();
    // A cut that ends on `.` would form `..` with the extension's dot.
    let stem = match stem.trim_end_matches('.') {
        "" => "upload",
        trimmed => trimmed,
    };
    if extension.is_empty() {
        stem.to_string()
    } else {
        format!("{}.{}", stem, extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn upload(name: &str, data: &'static [u8]) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: Some("image/png".into()),
            data: Bytes::from_static(data),
        }
    }

    #[tokio::test]
    async fn store_generates_unique_name_with_same_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("images"));

        let first = store.store(&upload("photo.png", b"pixels")).await.unwrap();
        let second = store.store(&upload("photo.png", b"pixels")).await.unwrap();

        assert_ne!(first, "photo.png");
        assert_ne!(first, second);
        assert!(first.ends_with("_photo.png"));
        let on_disk = std::fs::read(store.root.join(&first)).unwrap();
        assert_eq!(on_disk, b"pixels");
    }

    #[tokio::test]
    async fn store_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.store(&upload("a.png", b"a")).await.unwrap();

        let leftovers = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with(".tmp-"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn delete_removes_file_and_tolerates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let name = store.store(&upload("a.png", b"a")).await.unwrap();

        store.delete(&name).await.unwrap();
        assert!(!dir.path().join(&name).exists());
        store.delete(&name).await.unwrap();
    }

    #[tokio::test]
    async fn open_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        assert!(matches!(
            store.open("nothing.png").await,
            Err(FileStoreError::NotFound(_))
        ));
    }

    #[test]
    fn rejects_names_escaping_the_root() {
        let store = FileStore::new("/tmp/images");
        for name in ["", "../etc/passwd", "a/b.png", "a\\b.png", ".hidden", "x..y"] {
            assert!(
                matches!(store.path_for(name), Err(FileStoreError::InvalidFileName(_))),
                "accepted {:?}",
                name
            );
        }
        assert!(store.path_for("1234_photo.png").is_ok());
    }

    #[test]
    fn sanitizes_client_file_names() {
        assert_eq!(sanitize_original_name("C:\\Users\\me\\cat pic.jpg"), "cat_pic.jpg");
        assert_eq!(sanitize_original_name("../../secret.png"), "secret.png");
        assert_eq!(sanitize_original_name("..."), "upload");
        assert_eq!(sanitize_original_name("shot..final.png"), "shot.final.png");

        let long = format!("{}.jpeg", "a".repeat(300));
        let cleaned = sanitize_original_name(&long);
        assert_eq!(cleaned.chars().count(), MAX_ORIGINAL_NAME_LEN);
        assert!(cleaned.ends_with(".jpeg"));
    }

    #[test]
    fn truncation_never_produces_double_dots() {
        let raw = format!("{}.{}.png", "a".repeat(95), "b".repeat(10));
        let cleaned = sanitize_original_name(&raw);

        assert!(!cleaned.contains(".."), "got {:?}", cleaned);
        assert!(cleaned.ends_with(".png"));
        let store = FileStore::new("/tmp/images");
        assert!(store.path_for(&format!("{}_{}", Uuid::new_v4(), cleaned)).is_ok());
    }

    #[tokio::test]
    async fn truncated_upload_can_be_opened_and_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let raw = format!("{}.{}.png", "a".repeat(95), "b".repeat(10));

        let name = store.store(&upload(&raw, b"pixels")).await.unwrap();

        store.open(&name).await.unwrap();
        store.delete(&name).await.unwrap();
        assert!(!dir.path().join(&name).exists());
    }
}
