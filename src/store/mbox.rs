//! MBOX-backed store: messages are addressed by their zero-based position.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, SmimeError};
use crate::model::message::MessageUid;
use crate::parser::mbox::{self, MboxParser, MessageSpan};
use crate::parser::mime;

use super::MailStore;

/// Reads messages from an MBOX file using spans recorded at open time.
///
/// The file is reopened for every read, so a shared `&MboxStore` can serve
/// several render cycles at once.
pub struct MboxStore {
    path: PathBuf,
    spans: Vec<MessageSpan>,
}

impl MboxStore {
    /// Scan `path` and remember where every message lives.
    pub fn open(path: impl AsRef<Path>, progress: Option<&dyn Fn(u64, u64)>) -> Result<Self> {
        let parser = MboxParser::new(path.as_ref())?;
        let spans = parser.scan(progress)?;
        debug!(
            path = %parser.path().display(),
            count = spans.len(),
            "Scanned MBOX"
        );
        Ok(Self {
            path: parser.path().to_path_buf(),
            spans,
        })
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    fn span(&self, uid: &MessageUid) -> Result<MessageSpan> {
        uid.as_str()
            .parse::<usize>()
            .ok()
            .and_then(|i| self.spans.get(i).copied())
            .ok_or_else(|| SmimeError::MessageNotFound(uid.clone()))
    }
}

impl MailStore for MboxStore {
    /// Writes the message without its `From ` separator line and with mboxrd
    /// `>From ` quoting undone, i.e. the bytes the sender signed.
    fn write_raw_body(&self, uid: &MessageUid, sink: &mut dyn Write) -> Result<u64> {
        let span = self.span(uid)?;
        debug!(
            uid = %uid,
            offset = span.offset,
            length = span.length,
            "Reading message from MBOX"
        );
        let raw = MboxParser::read_span(&self.path, span)?;
        let body = mbox::unescape_from_lines(mime::skip_from_line(&raw));
        sink.write_all(&body)
            .map_err(|e| SmimeError::io(&self.path, e))?;
        Ok(body.len() as u64)
    }

    fn uids(&self) -> Result<Vec<MessageUid>> {
        Ok((0..self.spans.len() as u64).map(MessageUid::from).collect())
    }
}
