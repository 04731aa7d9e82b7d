//! Multipart message framing.
//!
//! Each message on a TCP stream is encoded as:
//!
//! ```text
//! +------------+------------+---------+------------+---------+-----
//! | part count | part 0 len | part 0  | part 1 len | part 1  | ...
//! |  u32 (BE)  |  u32 (BE)  |  bytes  |  u32 (BE)  |  bytes  |
//! +------------+------------+---------+------------+---------+-----
//! ```

use crate::models::RawLogMessage;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io;
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder};

/// Default upper bound on the encoded size of one message (1 MiB).
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Upper bound on the number of parts in one message.
pub const MAX_PARTS: usize = 64;

const LEN_SIZE: usize = 4;

/// Framing violations.
#[derive(Debug, Error)]
pub enum WireError {
    /// The message exceeds the configured size limit.
    #[error("Message too large: {size} bytes exceeds maximum {max}")]
    MessageTooLarge {
        /// Encoded size of the message.
        size: usize,
        /// Configured maximum.
        max: usize,
    },

    /// The message declares more parts than allowed.
    #[error("Too many message parts: {0} exceeds maximum {MAX_PARTS}")]
    TooManyParts(usize),
}

impl From<WireError> for io::Error {
    fn from(err: WireError) -> Self {
        io::Error::new(io::ErrorKind::InvalidData, err)
    }
}

/// Codec for multipart log messages.
#[derive(Debug, Clone)]
pub struct MultipartCodec {
    max_message_size: usize,
}

impl MultipartCodec {
    /// Creates a codec with the default size limit.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }

    /// Creates a codec with a custom size limit.
    #[must_use]
    pub const fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Returns the configured size limit.
    #[must_use]
    pub const fn max_message_size(&self) -> usize {
        self.max_message_size
    }

    /// Walks the buffered part headers without consuming anything.
    ///
    /// Returns the total encoded length once the whole message is buffered.
    fn complete_length(&self, buf: &[u8]) -> Result<Option<usize>, WireError> {
        if buf.len() < LEN_SIZE {
            return Ok(None);
        }
        let count = read_len(&buf[..LEN_SIZE]);
        if count > MAX_PARTS {
            return Err(WireError::TooManyParts(count));
        }

        let mut offset = LEN_SIZE;
        for _ in 0..count {
            if buf.len() < offset + LEN_SIZE {
                self.check_size(offset + LEN_SIZE)?;
                return Ok(None);
            }
            let part_len = read_len(&buf[offset..offset + LEN_SIZE]);
            offset += LEN_SIZE + part_len;
            self.check_size(offset)?;
            if buf.len() < offset {
                return Ok(None);
            }
        }
        Ok(Some(offset))
    }

    fn check_size(&self, size: usize) -> Result<(), WireError> {
        if size > self.max_message_size {
            return Err(WireError::MessageTooLarge {
                size,
                max: self.max_message_size,
            });
        }
        Ok(())
    }
}

impl Default for MultipartCodec {
    fn default() -> Self {
        Self::new()
    }
}

fn read_len(mut bytes: &[u8]) -> usize {
    bytes.get_u32() as usize
}

impl Decoder for MultipartCodec {
    type Item = RawLogMessage;
    type Error = io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(total) = self.complete_length(buf)? else {
            return Ok(None);
        };

        let mut frame = buf.split_to(total).freeze();
        let count = frame.get_u32() as usize;
        let mut parts = Vec::with_capacity(count);
        for _ in 0..count {
            let len = frame.get_u32() as usize;
            parts.push(frame.split_to(len));
        }

        Ok(Some(RawLogMessage::new(parts)))
    }
}

impl Encoder<RawLogMessage> for MultipartCodec {
    type Error = io::Error;

    fn encode(&mut self, item: RawLogMessage, buf: &mut BytesMut) -> Result<(), Self::Error> {
        let parts: Vec<Bytes> = item.into_parts();
        if parts.len() > MAX_PARTS {
            return Err(WireError::TooManyParts(parts.len()).into());
        }

        let total = LEN_SIZE + parts.iter().map(|p| LEN_SIZE + p.len()).sum::<usize>();
        self.check_size(total)?;

        buf.reserve(total);
        buf.put_u32(u32::try_from(parts.len()).map_err(|_| WireError::TooManyParts(parts.len()))?);
        for part in parts {
            let len = u32::try_from(part.len()).map_err(|_| WireError::MessageTooLarge {
                size: total,
                max: self.max_message_size,
            })?;
            buf.put_u32(len);
            buf.extend_from_slice(&part);
        }
        Ok(())
    }
}
