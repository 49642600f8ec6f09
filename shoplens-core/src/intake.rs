//! Image intake.
//!
//! Persists an uploaded query image under a generated name and derives its
//! public URL. Stored names are `<unix-millis>.<extension>`; the extension
//! comes from the client filename and is left empty when there is none.
//!
//! Bytes are written to a temporary file, flushed to disk, then hard-linked
//! to the final name. Readers never observe a partially written image, and
//! linking fails instead of overwriting when the name is already taken.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument, warn};
use url::Url;

/// Upper bound on timestamp bumps when several uploads land in the same millisecond.
const MAX_NAME_ATTEMPTS: u32 = 1000;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Errors raised while persisting an upload.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Failed to write upload: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid public URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("No free stored name after {0} attempts")]
    NameExhausted(u32),
}

/// A file as received from the client, before it is stored.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    /// Client-supplied filename, used for the extension only
    pub original_name: String,
    pub mime_type: Option<String>,
}

/// A query image after intake. Immutable once created.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Generated name inside the content store
    pub stored_name: String,
    /// Absolute path handed to the similarity engine
    pub path: PathBuf,
    /// Public URL of the stored bytes (not checked for reachability)
    pub public_url: Url,
    pub original_name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Build the stored name for an upload received at `timestamp_millis`.
///
/// Only ASCII alphanumerics survive in the extension, so a crafted filename
/// cannot smuggle path separators into the content store.
pub fn stored_name(timestamp_millis: i64, original_name: &str) -> String {
    let extension: String = original_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .unwrap_or("")
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();

    format!("{timestamp_millis}.{extension}")
}

/// Content store backed by a local directory.
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    dir: PathBuf,
    public_base: Url,
}

impl LocalImageStore {
    /// Create a store writing into `dir`, publishing files under `public_base`.
    ///
    /// `dir` is made absolute against the current directory; it is created
    /// lazily on the first upload.
    pub fn new(dir: impl AsRef<Path>, public_base: Url) -> Result<Self, IntakeError> {
        let dir = std::path::absolute(dir.as_ref())?;

        let public_base = if public_base.path().ends_with('/') {
            public_base
        } else {
            let mut base = public_base;
            let path = format!("{}/", base.path());
            base.set_path(&path);
            base
        };

        Ok(Self { dir, public_base })
    }

    /// Public URL for a stored name.
    pub fn public_url(&self, stored_name: &str) -> Result<Url, IntakeError> {
        Ok(self.public_base.join(stored_name)?)
    }

    /// Persist `upload` and return the stored image.
    pub async fn store(&self, upload: ImageUpload) -> Result<UploadedImage, IntakeError> {
        self.store_at(upload, Utc::now().timestamp_millis()).await
    }

    #[instrument(level = "debug", skip_all, fields(
        original_name = %upload.original_name,
        bytes = upload.bytes.len()
    ))]
    async fn store_at(
        &self,
        upload: ImageUpload,
        timestamp_millis: i64,
    ) -> Result<UploadedImage, IntakeError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let temp_path = self.dir.join(format!(
            ".upload-{}-{}.part",
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        let linked = match write_synced(&temp_path, &upload.bytes).await {
            Ok(()) => {
                self.link_unique(&temp_path, timestamp_millis, &upload.original_name)
                    .await
            }
            Err(e) => Err(e.into()),
        };

        if let Err(e) = tokio::fs::remove_file(&temp_path).await {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(path = %temp_path.display(), error = %e, "Failed to remove temporary upload");
            }
        }

        let (stored_name, path) = linked?;
        let public_url = self.public_url(&stored_name)?;

        debug!(stored_name = %stored_name, "Stored upload");

        Ok(UploadedImage {
            stored_name,
            path,
            public_url,
            original_name: upload.original_name,
            mime_type: upload.mime_type,
            bytes: upload.bytes,
        })
    }

    async fn link_unique(
        &self,
        temp_path: &Path,
        mut timestamp_millis: i64,
        original_name: &str,
    ) -> Result<(String, PathBuf), IntakeError> {
        for _ in 0..MAX_NAME_ATTEMPTS {
            let name = stored_name(timestamp_millis, original_name);
            let path = self.dir.join(&name);

            match tokio::fs::hard_link(temp_path, &path).await {
                Ok(()) => return Ok((name, path)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => timestamp_millis += 1,
                Err(e) => return Err(e.into()),
            }
        }

        Err(IntakeError::NameExhausted(MAX_NAME_ATTEMPTS))
    }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}
