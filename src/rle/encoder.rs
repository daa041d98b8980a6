// Run scanning and token emission.
//
// Each maximal run of one byte value becomes ceil(n/9) tokens: full
// nines followed by the remainder digit.

use super::token::{MAX_COUNT, TOKEN_LEN, Token};

// ---------------------------------------------------------------------------
// Run iterator
// ---------------------------------------------------------------------------

/// Iterator over maximal runs of identical bytes, as `(byte, len)`.
#[derive(Debug, Clone)]
pub struct Runs<'a> {
    data: &'a [u8],
    pos: usize,
}

impl Iterator for Runs<'_> {
    type Item = (u8, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.data[self.pos..];
        let &byte = rest.first()?;
        let len = rest.iter().take_while(|&&b| b == byte).count();
        self.pos += len;
        Some((byte, len))
    }
}

impl std::iter::FusedIterator for Runs<'_> {}

/// Split `data` into its maximal runs.
pub fn runs(data: &[u8]) -> Runs<'_> {
    Runs { data, pos: 0 }
}

/// Tokens for one run: full nines, then the remainder if it is non-zero.
pub fn run_tokens(byte: u8, len: usize) -> impl Iterator<Item = Token> {
    let nine = Token {
        byte,
        count: MAX_COUNT,
    };
    let full = len / MAX_COUNT as usize;
    let rest = (len % MAX_COUNT as usize) as u8;
    let nines = std::iter::repeat_n(nine, full);
    nines.chain(Token::new(byte, rest))
}

/// Number of tokens a run of `len` bytes is split into.
#[inline]
pub fn tokens_for_run(len: usize) -> usize {
    len.div_ceil(MAX_COUNT as usize)
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode `input`, appending the token stream to `out`.
pub fn encode_into(input: &[u8], out: &mut Vec<u8>) {
    out.reserve(encoded_len(input));
    for (byte, len) in runs(input) {
        for token in run_tokens(byte, len) {
            out.extend_from_slice(&token.to_bytes());
        }
    }
}

/// Encode a raw buffer into a new token stream. Never fails.
///
/// ```
/// assert_eq!(digirle::rle::encode(b"AAAAAAAAAAA"), b"A9A2");
/// ```
pub fn encode(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    encode_into(input, &mut out);
    out
}

/// Exact size of `encode(input)` without producing it.
pub fn encoded_len(input: &[u8]) -> usize {
    let tokens: usize = runs(input).map(|(_, len)| tokens_for_run(len)).sum();
    tokens * TOKEN_LEN
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
