//! Store over individual `.eml` files (RFC 5322 messages without MBOX framing).

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Result, SmimeError};
use crate::model::message::MessageUid;

use super::MailStore;

/// A directory of `.eml` files, or a single file. The uid is the file stem.
pub struct EmlDirStore {
    files: BTreeMap<MessageUid, PathBuf>,
}

impl EmlDirStore {
    /// Index `path`. Directories are listed non-recursively.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path).map_err(|e| SmimeError::open(path, e))?;

        let mut files = BTreeMap::new();
        if metadata.is_dir() {
            let entries = std::fs::read_dir(path).map_err(|e| SmimeError::io(path, e))?;
            for entry in entries {
                let entry = entry.map_err(|e| SmimeError::io(path, e))?;
                let file = entry.path();
                let is_eml = file
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("eml"));
                if is_eml && file.is_file() {
                    files.insert(uid_for(&file), file);
                }
            }
        } else {
            files.insert(uid_for(path), path.to_path_buf());
        }

        tracing::debug!(path = %path.display(), count = files.len(), "Indexed EML files");
        Ok(Self { files })
    }
}

fn uid_for(path: &Path) -> MessageUid {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
        .into()
}

impl MailStore for EmlDirStore {
    fn write_raw_body(&self, uid: &MessageUid, sink: &mut dyn Write) -> Result<u64> {
        let path = self
            .files
            .get(uid)
            .ok_or_else(|| SmimeError::MessageNotFound(uid.clone()))?;
        let mut file = File::open(path).map_err(|e| SmimeError::open(path, e))?;
        std::io::copy(&mut file, sink).map_err(|e| SmimeError::io(path, e))
    }

    fn uids(&self) -> Result<Vec<MessageUid>> {
        Ok(self.files.keys().cloned().collect())
    }
}
