//! Raw body materializer: copies a stored message into a scoped temporary file.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tracing::debug;

use crate::error::{Result, SmimeError};
use crate::model::message::MessageUid;
use crate::store::MailStore;

/// Name prefix of every artifact file.
const ARTIFACT_PREFIX: &str = "smime";

/// The exact raw bytes of one message, in a closed temporary file.
///
/// The file is removed when the artifact is dropped, whatever the outcome
/// of the verification that consumed it.
#[derive(Debug)]
pub struct TemporaryArtifact {
    path: TempPath,
}

impl TemporaryArtifact {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file now and report any I/O error.
    pub fn close(self) -> Result<()> {
        let path = self.path.to_path_buf();
        self.path.close().map_err(|e| SmimeError::io(path, e))
    }
}

/// Write the raw message `uid` from `store` into a fresh temporary file.
///
/// `temp_dir` overrides the system temporary directory. Names are allocated
/// by `tempfile`, so concurrent calls never collide. On any failure the
/// partially written file is removed before the error is returned.
pub fn materialize(
    uid: &MessageUid,
    store: &dyn MailStore,
    temp_dir: Option<&Path>,
) -> Result<TemporaryArtifact> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(ARTIFACT_PREFIX).suffix(".eml");
    let created = match temp_dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    };
    let mut file = created.map_err(|e| {
        let dir = temp_dir.map(Path::to_path_buf).unwrap_or_else(std::env::temp_dir);
        SmimeError::retrieval(uid, SmimeError::io(dir, e))
    })?;

    let len = {
        let artifact_path: PathBuf = file.path().to_path_buf();
        let mut writer = BufWriter::new(file.as_file_mut());
        let len = store
            .write_raw_body(uid, &mut writer)
            .map_err(|e| SmimeError::retrieval(uid, e))?;
        writer
            .flush()
            .map_err(|e| SmimeError::retrieval(uid, SmimeError::io(&artifact_path, e)))?;
        len
    };

    // Closing the handle here; verification reads the file by path.
    let path = file.into_temp_path();
    debug!(uid = %uid, path = %path.display(), bytes = len, "Materialized raw message");
    Ok(TemporaryArtifact { path })
}
