//! Mail stores: where raw message bytes come from.
//!
//! The verification pipeline only needs one capability from a store:
//! copy the exact stored octets of a message into a caller-supplied sink.

pub mod eml;
pub mod mbox;
pub mod memory;

use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::model::message::{Message, MessageUid};
use crate::parser::mime;

/// Read access to stored messages.
pub trait MailStore {
    /// Copy the full raw message (headers and body, as stored) into `sink`.
    ///
    /// Returns the number of bytes written. Unknown identifiers yield
    /// [`SmimeError::MessageNotFound`](crate::error::SmimeError::MessageNotFound).
    fn write_raw_body(&self, uid: &MessageUid, sink: &mut dyn Write) -> Result<u64>;

    /// Identifiers of every message in the store, in store order.
    fn uids(&self) -> Result<Vec<MessageUid>>;

    /// Fetch and parse a message.
    fn load_message(&self, uid: &MessageUid) -> Result<Message> {
        let mut raw = Vec::new();
        self.write_raw_body(uid, &mut raw)?;
        Ok(mime::parse_message(uid.clone(), &raw))
    }
}

/// Open the store matching `path`: a directory or `.eml` file becomes an
/// [`eml::EmlDirStore`], anything else is read as MBOX.
pub fn open(path: &Path, progress: Option<&dyn Fn(u64, u64)>) -> Result<Box<dyn MailStore>> {
    let is_eml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("eml"));
    if path.is_dir() || is_eml {
        Ok(Box::new(eml::EmlDirStore::open(path)?))
    } else {
        Ok(Box::new(mbox::MboxStore::open(path, progress)?))
    }
}
