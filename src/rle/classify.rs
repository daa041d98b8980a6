// Format classification.
//
// Two kinds of check live here and must not be confused:
//
// - `looks_encoded` is the digit heuristic. Any buffer containing an ASCII
//   digit passes, so plain text such as "Room101" is a false positive.
// - `is_well_formed` is structural: even length and every count byte in
//   '1'..='9', i.e. exactly what `encode` can produce.
//
// Only the frame magic is authoritative; see `detect`.

use super::frame::FRAME_MAGIC;
use super::token::TOKEN_LEN;

/// Best-effort classification of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Starts with the frame magic.
    Framed,
    /// No magic, but contains digit bytes (heuristic).
    Tokens,
    /// No magic and no digits.
    Plain,
}

impl Format {
    pub fn is_encoded(self) -> bool {
        !matches!(self, Self::Plain)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Framed => "framed",
            Self::Tokens => "tokens",
            Self::Plain => "plain",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Heuristic: true if any byte is an ASCII digit.
///
/// This is approximate. Raw data containing digits is reported as encoded.
pub fn looks_encoded(data: &[u8]) -> bool {
    data.iter().any(u8::is_ascii_digit)
}

/// Structural check for a bare token stream.
pub fn is_well_formed(data: &[u8]) -> bool {
    data.len().is_multiple_of(TOKEN_LEN)
        && data
            .chunks_exact(TOKEN_LEN)
            .all(|pair| (b'1'..=b'9').contains(&pair[1]))
}

/// Classify a buffer: frame magic first, then the digit heuristic.
pub fn detect(data: &[u8]) -> Format {
    if data.starts_with(&FRAME_MAGIC) {
        Format::Framed
    } else if looks_encoded(data) {
        Format::Tokens
    } else {
        Format::Plain
    }
}
