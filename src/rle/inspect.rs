// Buffer summaries for the `inspect` command.

use super::classify::{self, Format};
use super::decoder::{self, DecodeError, DecodeOptions};
use super::frame::{FrameError, FrameHeader};
use super::token::TOKEN_LEN;

/// What is known about a buffer without writing anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub format: Format,
    /// Total buffer length, header included.
    pub len: usize,
    /// Frame header, if the buffer is framed and the header parses.
    pub header: Option<FrameHeader>,
    /// Length of the token stream (excludes any frame header).
    pub payload_len: usize,
    /// Whether the token stream passes the structural check.
    pub well_formed: bool,
    /// Decoded size, or why the payload cannot be decoded.
    pub decoded: Result<u64, String>,
}

impl Report {
    /// Number of tokens in the payload (rounded down for odd lengths).
    pub fn token_count(&self) -> usize {
        self.payload_len / TOKEN_LEN
    }

    /// Encoded size over decoded size, if both are known and non-zero.
    pub fn ratio(&self) -> Option<f64> {
        match self.decoded {
            Ok(n) if n > 0 => Some(self.len as f64 / n as f64),
            _ => None,
        }
    }
}

/// Summarize `data`.
///
/// Plain buffers are still scanned as token streams: the digit heuristic
/// can miss, and the structural result is useful either way.
pub fn inspect(data: &[u8]) -> Report {
    let format = classify::detect(data);
    let (header, payload, header_err) = if format == Format::Framed {
        match FrameHeader::parse(data) {
            Ok((hdr, len)) => (Some(hdr), &data[len..], None),
            Err(e) => (None, &data[data.len()..], Some(e)),
        }
    } else {
        (None, data, None)
    };

    let decoded = match header_err {
        Some(e) => Err(e.to_string()),
        None => {
            let opts = if header.is_some() {
                DecodeOptions::strict()
            } else {
                DecodeOptions::default()
            };
            decoder::decoded_len(payload, opts)
                .map_err(|e: DecodeError| e.to_string())
                .and_then(|n| match header {
                    Some(hdr) if hdr.raw_len != n => Err(FrameError::LengthMismatch {
                        expected: hdr.raw_len,
                        actual: n,
                    }
                    .to_string()),
                    _ => Ok(n),
                })
        }
    };

    Report {
        format,
        len: data.len(),
        header,
        payload_len: payload.len(),
        well_formed: decoded.is_ok() && classify::is_well_formed(payload),
        decoded,
    }
}
