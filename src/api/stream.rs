//! Newline-delimited JSON stream decoding.
//!
//! A streaming response is split into lines by [`LineCodec`]; each line is
//! checked for an embedded error, decoded into one typed event and handed to
//! the caller's sink in arrival order.

use bytes::{Buf, BytesMut};
use futures::StreamExt;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tokio::io::AsyncRead;
use tokio_util::codec::{Decoder, FramedRead};

use crate::api::status;
use crate::error::{ClientError, Result, SinkError};

/// Default upper bound for a single line (16 MB).
pub const DEFAULT_MAX_LINE_LENGTH: usize = 16 * 1024 * 1024;

/// Splits a byte stream on `\n`. A trailing `\r` is dropped, and a final
/// line without a terminator is still produced once the stream ends.
#[derive(Debug, Clone)]
pub struct LineCodec {
    max_length: usize,
    // Bytes already searched for a newline in the pending line
    next_index: usize,
}

impl LineCodec {
    pub fn new() -> Self {
        Self::with_max_length(DEFAULT_MAX_LINE_LENGTH)
    }

    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            max_length,
            next_index: 0,
        }
    }

    fn too_large(&self, length: usize) -> std::io::Error {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Line too large: {} > {}", length, self.max_length),
        )
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

fn strip_cr(mut line: BytesMut) -> BytesMut {
    if line.last() == Some(&b'\r') {
        line.truncate(line.len() - 1);
    }
    line
}

impl Decoder for LineCodec {
    type Item = BytesMut;
    type Error = std::io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> std::result::Result<Option<Self::Item>, Self::Error> {
        let start = self.next_index.min(src.len());

        match src[start..].iter().position(|&b| b == b'\n') {
            Some(offset) => {
                let pos = start + offset;
                self.next_index = 0;
                if pos > self.max_length {
                    return Err(self.too_large(pos));
                }

                let line = src.split_to(pos);
                src.advance(1);
                Ok(Some(strip_cr(line)))
            }
            None => {
                self.next_index = src.len();
                if src.len() > self.max_length {
                    return Err(self.too_large(src.len()));
                }
                Ok(None)
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> std::result::Result<Option<Self::Item>, Self::Error> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }

        self.next_index = 0;
        if src.is_empty() {
            Ok(None)
        } else {
            let line = src.split_to(src.len());
            Ok(Some(strip_cr(line)))
        }
    }
}

/// Decode a single line into an event after checking it for an embedded
/// error. Holds no state, so the same line always yields the same event.
pub fn decode_line<T: DeserializeOwned>(status: StatusCode, line: &[u8]) -> Result<T> {
    status::check(status, line)?;
    Ok(serde_json::from_slice(line)?)
}

/// Turn an IO error from the body reader back into the transport error it
/// wraps, if it wraps one.
fn reader_error(err: std::io::Error) -> ClientError {
    match err.downcast::<reqwest::Error>() {
        Ok(transport) => ClientError::Transport(transport),
        Err(err) => ClientError::Io(err),
    }
}

/// Read events from `reader` until it is exhausted, feeding each to `sink`.
///
/// Stops at the first decode failure, embedded error or sink failure. Events
/// already delivered stay delivered. Every line must decode, so a blank line
/// in the middle of a stream is a decode failure. Returns the number of
/// events delivered.
pub async fn read_events<R, T, F>(status: StatusCode, reader: R, mut sink: F) -> Result<usize>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
    F: FnMut(T) -> std::result::Result<(), SinkError>,
{
    let mut lines = FramedRead::new(reader, LineCodec::new());
    let mut delivered = 0;

    while let Some(line) = lines.next().await {
        let line = line.map_err(reader_error)?;
        let event = decode_line::<T>(status, &line)?;
        sink(event).map_err(ClientError::Sink)?;
        delivered += 1;
    }

    // A failing status with no lines at all still fails the call
    if delivered == 0 {
        status::check(status, b"")?;
    }

    tracing::debug!(events = delivered, "stream closed");
    Ok(delivered)
}
