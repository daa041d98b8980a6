// Token stream decoding.
//
// The encoded buffer is walked as an explicit sequence of (byte, digit)
// pairs. A missing count byte or a non-digit count surfaces as a typed
// error at its offset; nothing is ever indexed past the end.

use super::token::{TOKEN_LEN, Token, digit_value};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Malformed token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Odd length: the byte at `offset` has no count byte after it.
    #[error("truncated token at offset {offset}: missing count byte")]
    Truncated { offset: usize },
    /// The count byte at `offset` is not an accepted digit.
    #[error("invalid count byte {byte:#04X} at offset {offset}")]
    InvalidCount { offset: usize, byte: u8 },
}

impl DecodeError {
    /// Offset of the offending byte in the encoded buffer.
    pub fn offset(&self) -> usize {
        match *self {
            Self::Truncated { offset } | Self::InvalidCount { offset, .. } => offset,
        }
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// What to do with a `'0'` count, which `encode` never emits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ZeroCount {
    /// Treat it as an empty run.
    #[default]
    Accept,
    /// Report it as `DecodeError::InvalidCount`.
    Reject,
}

/// Decoder configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    pub zero_count: ZeroCount,
}

impl DecodeOptions {
    /// Options that only accept what `encode` can produce.
    pub fn strict() -> Self {
        Self {
            zero_count: ZeroCount::Reject,
        }
    }
}

// ---------------------------------------------------------------------------
// Pair iterator
// ---------------------------------------------------------------------------

/// Iterator over the tokens of an encoded buffer.
///
/// Yields `Err` at most once, then stops.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    data: &'a [u8],
    pos: usize,
    zero_count: ZeroCount,
    failed: bool,
}

impl<'a> Tokens<'a> {
    pub fn new(data: &'a [u8], opts: DecodeOptions) -> Self {
        Self {
            data,
            pos: 0,
            zero_count: opts.zero_count,
            failed: false,
        }
    }

    /// Byte offset of the next token.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn fail(&mut self, err: DecodeError) -> Option<Result<Token, DecodeError>> {
        self.failed = true;
        Some(Err(err))
    }
}

impl Iterator for Tokens<'_> {
    type Item = Result<Token, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let data = self.data;
        let offset = self.pos;
        let (byte, count_byte) = match data.get(offset..)? {
            [] => return None,
            [_] => return self.fail(DecodeError::Truncated { offset }),
            [byte, count_byte, ..] => (*byte, *count_byte),
        };
        let count = match digit_value(count_byte) {
            Some(0) if self.zero_count == ZeroCount::Reject => None,
            other => other,
        };
        let Some(count) = count else {
            return self.fail(DecodeError::InvalidCount {
                offset: offset + 1,
                byte: count_byte,
            });
        };
        self.pos += TOKEN_LEN;
        Some(Ok(Token { byte, count }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        let rest = self.data.len() - self.pos;
        (0, Some(rest.div_ceil(TOKEN_LEN)))
    }
}

impl std::iter::FusedIterator for Tokens<'_> {}

/// Iterate the tokens of `data` with the default (permissive) policy.
pub fn tokens(data: &[u8]) -> Tokens<'_> {
    Tokens::new(data, DecodeOptions::default())
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode `input`, appending the raw bytes to `out`.
///
/// Returns the number of bytes appended. On error `out` is truncated back
/// to its original length.
pub fn decode_into(
    input: &[u8],
    opts: DecodeOptions,
    out: &mut Vec<u8>,
) -> Result<usize, DecodeError> {
    let start = out.len();
    for token in Tokens::new(input, opts) {
        match token {
            Ok(Token { byte, count }) => out.resize(out.len() + count as usize, byte),
            Err(e) => {
                out.truncate(start);
                return Err(e);
            }
        }
    }
    Ok(out.len() - start)
}

/// Decode with explicit options.
pub fn decode_with(input: &[u8], opts: DecodeOptions) -> Result<Vec<u8>, DecodeError> {
    // Each token yields at most nine bytes; start from the common case.
    let mut out = Vec::with_capacity(input.len());
    decode_into(input, opts, &mut out)?;
    Ok(out)
}

/// Decode a token stream, accepting zero counts.
///
/// ```
/// assert_eq!(digirle::rle::decode(b"A9A2").unwrap(), vec![b'A'; 11]);
/// assert!(digirle::rle::decode(b"A").is_err());
/// ```
pub fn decode(input: &[u8]) -> Result<Vec<u8>, DecodeError> {
    decode_with(input, DecodeOptions::default())
}

/// Validate `input` and return the size it decodes to.
pub fn decoded_len(input: &[u8], opts: DecodeOptions) -> Result<u64, DecodeError> {
    Tokens::new(input, opts).try_fold(0u64, |acc, t| Ok(acc + u64::from(t?.count)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
