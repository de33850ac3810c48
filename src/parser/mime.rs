//! MIME structure parsing: turns raw message bytes into a [`Message`] with a [`MimePart`] tree.

use mail_parser::{MessageParser, MessagePart, MimeHeaders, PartType};

use crate::model::message::{Message, MessageUid};
use crate::model::mime::MimePart;
use crate::parser::header;

/// Maximum depth for recursive multipart descent (adversarial input guard).
const MAX_DEPTH: usize = 10;

/// Media type assumed for parts without a `Content-Type` header (RFC 2045 §5.2).
const DEFAULT_MIMETYPE: &str = "text/plain";

/// Parse a complete raw message (headers + body).
///
/// Never fails: a body `mail-parser` cannot make sense of yields
/// `structure: None`, which downstream code treats as "not signed".
pub fn parse_message(uid: impl Into<MessageUid>, raw_message: &[u8]) -> Message {
    let message_bytes = skip_from_line(raw_message);
    let headers = header::parse_header_map(message_bytes);

    let structure = MessageParser::default()
        .parse(message_bytes)
        .and_then(|msg| build_part(&msg, 0, 0));

    Message::new(uid, headers, structure)
}

/// Build the subtree rooted at part `id`.
///
/// Nested `message/rfc822` bodies are kept as leaves; only the outer message matters here.
fn build_part(msg: &mail_parser::Message<'_>, id: usize, depth: usize) -> Option<MimePart> {
    let part = msg.parts.get(id)?;
    let mimetype = part_mimetype(part);

    match &part.body {
        PartType::Multipart(children) if depth < MAX_DEPTH => {
            let parts = children
                .iter()
                .filter_map(|&child| build_part(msg, child, depth + 1))
                .collect();
            Some(MimePart::multipart(&mimetype, parts))
        }
        PartType::Multipart(_) => {
            tracing::debug!(depth, "Multipart nesting too deep, truncating");
            Some(MimePart::leaf(&mimetype))
        }
        _ => Some(MimePart::leaf(&mimetype)),
    }
}

fn part_mimetype(part: &MessagePart<'_>) -> String {
    part.content_type()
        .map(|ct: &mail_parser::ContentType| match ct.subtype() {
            Some(sub) => format!("{}/{}", ct.ctype(), sub),
            None => ct.ctype().to_string(),
        })
        .unwrap_or_else(|| DEFAULT_MIMETYPE.to_string())
        .to_ascii_lowercase()
}

/// Skip the `From ` separator line at the start of MBOX messages.
pub fn skip_from_line(data: &[u8]) -> &[u8] {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);

    if data.starts_with(b"From ") {
        if let Some(pos) = data.iter().position(|&b| b == b'\n') {
            return &data[pos + 1..];
        }
    }
    data
}
