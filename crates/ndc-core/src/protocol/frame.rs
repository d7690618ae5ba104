//! Host framing: a 2-byte big-endian length prefix ahead of each message body.
//!
//! Wire format:
//! ```text
//! [length_hi:1][length_lo:1][body:length]
//! ```

use crate::error::DecodeError;

/// Size of the length prefix in bytes.
pub const LENGTH_PREFIX_SIZE: usize = 2;

/// Reads the big-endian length prefix of `buffer`.
///
/// Returns 0 when the buffer holds fewer than two bytes.
///
/// # Examples
///
/// ```rust
/// use ndc_core::protocol::frame::get_incoming_message_length;
///
/// assert_eq!(get_incoming_message_length(b"\x01\x00x"), 256);
/// assert_eq!(get_incoming_message_length(b""), 0);
/// ```
pub fn get_incoming_message_length(buffer: &[u8]) -> usize {
    match buffer {
        [hi, lo, ..] => usize::from(u16::from_be_bytes([*hi, *lo])),
        _ => 0,
    }
}

/// Splits one frame off the front of `buffer`.
///
/// Returns the frame body and the total number of bytes consumed (prefix plus
/// body), so the caller can advance their read cursor.
///
/// # Errors
///
/// Returns [`DecodeError::TruncatedMessage`] if the prefix or the declared
/// body is not fully present.
pub fn split_frame(buffer: &[u8]) -> Result<(&[u8], usize), DecodeError> {
    if buffer.len() < LENGTH_PREFIX_SIZE {
        return Err(DecodeError::TruncatedMessage {
            context: "length prefix bytes",
            needed: LENGTH_PREFIX_SIZE,
            available: buffer.len(),
        });
    }

    let length = get_incoming_message_length(buffer);
    let body = &buffer[LENGTH_PREFIX_SIZE..];
    if body.len() < length {
        return Err(DecodeError::TruncatedMessage {
            context: "frame body bytes",
            needed: length,
            available: body.len(),
        });
    }
    Ok((&body[..length], LENGTH_PREFIX_SIZE + length))
}

/// Iterator over the consecutive length-prefixed frames of one buffer.
///
/// Yields each frame body in order.  A partial frame at the end yields a
/// single [`DecodeError::TruncatedMessage`] and ends the iteration.
#[derive(Debug, Clone)]
pub struct FrameReader<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> FrameReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    /// Bytes not yet consumed by the iterator.
    pub fn remaining(&self) -> &'a [u8] {
        &self.buffer[self.offset..]
    }
}

impl<'a> Iterator for FrameReader<'a> {
    type Item = Result<&'a [u8], DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.remaining();
        if rest.is_empty() {
            return None;
        }
        match split_frame(rest) {
            Ok((body, consumed)) => {
                self.offset += consumed;
                Some(Ok(body))
            }
            Err(e) => {
                self.offset = self.buffer.len();
                Some(Err(e))
            }
        }
    }
}
