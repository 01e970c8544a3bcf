//! # Durable Snapshot Writer
//!
//! Writes the snapshot file with a backup/restore step around it:
//!
//! 1. An existing primary file is copied to `<primary>.backup`.
//! 2. The snapshot is serialized (2-space indentation) over the primary path.
//! 3. The written file is re-read and must contain `meta` and `currentDate`
//!    objects.
//! 4. On success the backup is removed. On any failure the backup is copied
//!    back, or, when there was no prior file, the rejected file is removed.
//!
//! Concurrent runs against the same path are not supported; nothing is locked.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, error, info, instrument, warn};

use crate::error::Error as CrateError;

/// Blocks that every persisted snapshot must contain
const REQUIRED_BLOCKS: [&str; 2] = ["meta", "currentDate"];

/// Error type for snapshot persistence
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The written file is missing required content
    #[error("Validation failed: {0}")]
    Validation(String),
}

impl From<WriteError> for CrateError {
    fn from(err: WriteError) -> Self {
        CrateError::Write(err.to_string())
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> WriteError + '_ {
    move |source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Where the writer is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    /// No primary file existed before this run
    NoPriorOutput,
    /// A primary file existed and has been copied to the backup path
    HasPriorOutput,
    /// New snapshot written and validated, backup removed
    WriteComplete,
}

/// Writes `context.json` with backup and restore
#[derive(Debug)]
pub struct DurableWriter {
    primary: PathBuf,
    backup: PathBuf,
    state: WriterState,
}

impl DurableWriter {
    /// Create a writer for `primary`; the backup lives next to it
    pub fn new(primary: impl Into<PathBuf>) -> Self {
        let primary = primary.into();
        let mut backup = primary.clone().into_os_string();
        backup.push(".backup");
        Self {
            primary,
            backup: PathBuf::from(backup),
            state: WriterState::NoPriorOutput,
        }
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    /// Copy an existing primary file to the backup path
    async fn take_backup(&mut self) -> Result<WriterState, WriteError> {
        let exists = fs::try_exists(&self.primary)
            .await
            .map_err(io_error(&self.primary))?;
        if exists {
            fs::copy(&self.primary, &self.backup)
                .await
                .map_err(io_error(&self.backup))?;
            debug!("Backed up {} to {}", self.primary.display(), self.backup.display());
            self.state = WriterState::HasPriorOutput;
        } else {
            self.state = WriterState::NoPriorOutput;
        }
        Ok(self.state)
    }

    async fn write_document<S: Serialize>(&self, document: &S) -> Result<u64, WriteError> {
        let json = serde_json::to_string_pretty(document)?;
        fs::write(&self.primary, json.as_bytes())
            .await
            .map_err(io_error(&self.primary))?;
        Ok(json.len() as u64)
    }

    /// Re-read the primary file and check the required blocks
    pub async fn validate(&self) -> Result<(), WriteError> {
        let contents = fs::read_to_string(&self.primary)
            .await
            .map_err(io_error(&self.primary))?;
        let written: Value = serde_json::from_str(&contents)?;

        for block in REQUIRED_BLOCKS {
            if !written.get(block).is_some_and(Value::is_object) {
                return Err(WriteError::Validation(format!(
                    "written file has no `{}` block",
                    block
                )));
            }
        }
        Ok(())
    }

    async fn remove_backup(&self) -> Result<(), WriteError> {
        match fs::remove_file(&self.backup).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&self.backup)(e)),
        }
    }

    /// Undo a failed write
    async fn recover(&mut self) -> Result<(), WriteError> {
        match self.state {
            WriterState::HasPriorOutput => {
                fs::copy(&self.backup, &self.primary)
                    .await
                    .map_err(io_error(&self.primary))?;
                self.remove_backup().await?;
                info!("Restored previous snapshot from backup");
            }
            WriterState::NoPriorOutput => {
                match fs::remove_file(&self.primary).await {
                    Ok(()) => info!("Removed rejected snapshot {}", self.primary.display()),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(io_error(&self.primary)(e)),
                }
            }
            WriterState::WriteComplete => {}
        }
        Ok(())
    }

    async fn write_and_validate<S: Serialize>(&mut self, document: &S) -> Result<u64, WriteError> {
        let bytes = self.write_document(document).await?;
        self.validate().await?;
        Ok(bytes)
    }

    /// Persist `document`, restoring the previous file on any failure
    ///
    /// # Returns
    ///
    /// Number of bytes written
    #[instrument(skip(self, document), fields(path = %self.primary.display()))]
    pub async fn persist<S: Serialize>(&mut self, document: &S) -> Result<u64, WriteError> {
        self.take_backup().await?;

        match self.write_and_validate(document).await {
            Ok(bytes) => {
                self.remove_backup().await?;
                self.state = WriterState::WriteComplete;
                Ok(bytes)
            }
            Err(e) => {
                error!("Writing snapshot failed: {}", e);
                if let Err(recover_err) = self.recover().await {
                    warn!("Recovery after failed write also failed: {}", recover_err);
                }
                Err(e)
            }
        }
    }
}
