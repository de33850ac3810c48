//! Streaming MBOX splitter.
//!
//! Reads MBOX files line-by-line with a large buffer and records where each
//! message starts and ends. Never loads the entire file into memory.

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{Result, SmimeError};

/// Size of the internal read buffer (1 MB).
const READ_BUFFER_SIZE: usize = 1024 * 1024;

/// Progress is reported every 4 MB.
const PROGRESS_INTERVAL: u64 = 4 * 1024 * 1024;

/// Location of one message inside an MBOX file.
///
/// `offset` points at the `From ` separator line; `length` runs to the next
/// separator or EOF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageSpan {
    pub offset: u64,
    pub length: u64,
}

/// Streaming MBOX parser.
///
/// Tolerant of:
///
/// - Mixed `\n` and `\r\n` line endings
/// - `From ` lines not preceded by a blank line (logs a warning)
/// - Truncated messages at EOF
/// - UTF-8 BOM at the start of the file
#[derive(Debug)]
pub struct MboxParser {
    path: PathBuf,
    file_size: u64,
}

impl MboxParser {
    /// Create a parser for the given MBOX file.
    ///
    /// Verifies that the file exists and is readable, but does NOT validate
    /// that it is actually an MBOX.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = std::fs::metadata(&path).map_err(|e| SmimeError::open(&path, e))?;
        Ok(Self {
            path,
            file_size: metadata.len(),
        })
    }

    /// Total size of the underlying file in bytes.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Path to the MBOX file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Scan the whole file and return the span of every message, in order.
    ///
    /// A non-empty file that does not start with a `From ` line is rejected
    /// as [`SmimeError::InvalidMbox`].
    pub fn scan(&self, progress_callback: Option<&dyn Fn(u64, u64)>) -> Result<Vec<MessageSpan>> {
        if self.file_size == 0 {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path).map_err(|e| SmimeError::io(&self.path, e))?;
        let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);

        let mut spans: Vec<MessageSpan> = Vec::new();
        let mut current_offset: u64 = 0;
        let mut message_start: Option<u64> = None;
        let mut prev_line_was_empty = true;
        let mut last_progress: u64 = 0;

        // Reusable line buffer
        let mut line_buf: Vec<u8> = Vec::with_capacity(4096);

        loop {
            line_buf.clear();
            let line_len = {
                let buf = reader
                    .fill_buf()
                    .map_err(|e| SmimeError::io(&self.path, e))?;
                if buf.is_empty() {
                    break; // EOF
                }
                let consume_len = match memchr_newline(buf) {
                    Some(pos) => pos + 1,
                    None => buf.len(),
                };
                line_buf.extend_from_slice(&buf[..consume_len]);
                reader.consume(consume_len);
                consume_len as u64
            };

            if is_mbox_separator(&line_buf) {
                if let Some(start) = message_start {
                    if !prev_line_was_empty {
                        warn!(
                            offset = current_offset,
                            "Found 'From ' separator without preceding blank line"
                        );
                    }
                    spans.push(MessageSpan {
                        offset: start,
                        length: current_offset - start,
                    });
                }
                message_start = Some(current_offset);
            } else if message_start.is_none() && !is_blank_line(&line_buf) {
                return Err(SmimeError::InvalidMbox(self.path.clone()));
            }

            prev_line_was_empty = is_blank_line(&line_buf);
            current_offset += line_len;

            if let Some(cb) = progress_callback {
                if current_offset - last_progress >= PROGRESS_INTERVAL {
                    cb(current_offset, self.file_size);
                    last_progress = current_offset;
                }
            }
        }

        if let Some(start) = message_start {
            spans.push(MessageSpan {
                offset: start,
                length: current_offset - start,
            });
        }

        if let Some(cb) = progress_callback {
            cb(self.file_size, self.file_size);
        }

        Ok(spans)
    }

    /// Read a single message span.
    ///
    /// Uses `seek` to jump directly to the message without scanning the file.
    pub fn read_span(path: impl AsRef<Path>, span: MessageSpan) -> Result<Vec<u8>> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| SmimeError::open(path, e))?;
        file.seek(SeekFrom::Start(span.offset))
            .map_err(|e| SmimeError::io(path, e))?;
        let mut buffer = vec![0u8; span.length as usize];
        file.read_exact(&mut buffer)
            .map_err(|e| SmimeError::io(path, e))?;
        Ok(buffer)
    }
}

/// Undo mboxrd `>From ` quoting: one `>` is removed from every line matching `^>+From `.
///
/// Signed bodies must be restored byte-for-byte before verification.
pub fn unescape_from_lines(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len());
    for line in body.split_inclusive(|&b| b == b'\n') {
        let quotes = line.iter().take_while(|&&b| b == b'>').count();
        if quotes > 0 && line[quotes..].starts_with(b"From ") {
            out.extend_from_slice(&line[1..]);
        } else {
            out.extend_from_slice(line);
        }
    }
    out
}

/// Fast newline search.
#[inline]
fn memchr_newline(buf: &[u8]) -> Option<usize> {
    buf.iter().position(|&b| b == b'\n')
}

/// Check whether a line is an MBOX separator (`From ` at the start).
fn is_mbox_separator(line: &[u8]) -> bool {
    let line = line.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(line);
    line.starts_with(b"From ")
}

/// Check whether a line is blank (empty or only whitespace / CR / LF).
fn is_blank_line(line: &[u8]) -> bool {
    line.iter()
        .all(|&b| b == b'\n' || b == b'\r' || b == b' ' || b == b'\t')
}
