//! Structure classifier: is this a `multipart/signed` message with a PKCS#7 signature part?

use crate::model::message::Message;
use crate::model::mime::MimePart;
use crate::model::verification::Classification;
use crate::parser::header::media_type;

/// Top-level media type of a detached-signature message.
pub const MULTIPART_SIGNED: &str = "multipart/signed";

/// Media type of the signature part.
pub const PKCS7_SIGNATURE: &str = "application/pkcs7-signature";

/// Classify a message from its top-level content type and parsed MIME tree.
///
/// Only the root's immediate children are searched. A missing tree means the
/// signature part cannot be located, so the message counts as unsigned.
pub fn classify(content_type: Option<&str>, root: Option<&MimePart>) -> Classification {
    let Some(content_type) = content_type else {
        return Classification::NotSigned;
    };
    if media_type(content_type) != MULTIPART_SIGNED {
        return Classification::NotSigned;
    }

    let Some(root) = root else {
        return Classification::NotSigned;
    };

    if root.parts.iter().any(|part| part.is(PKCS7_SIGNATURE)) {
        Classification::CandidateSigned
    } else {
        Classification::NotSigned
    }
}

/// [`classify`] applied to a [`Message`].
pub fn classify_message(message: &Message) -> Classification {
    classify(message.content_type(), message.structure.as_ref())
}
