// Digit-count run-length codec.
//
// The encoded form is a flat sequence of (byte, ASCII digit) tokens. Runs
// longer than nine bytes are split into several tokens of the same byte.
//
// # Modules
//
// - `token`    — Token type and count-digit helpers
// - `encoder`  — Run scanning and token emission
// - `decoder`  — Pair iterator, decode policies, `DecodeError`
// - `classify` — Digit heuristic, structural check, format detection
// - `frame`    — Optional tagged container (magic, length, Adler-32)
// - `varint`   — Base-128 integers used by the frame header
// - `inspect`  — Buffer summaries for tooling

pub mod classify;
pub mod decoder;
pub mod encoder;
pub mod frame;
pub mod inspect;
pub mod token;
pub mod varint;

// Re-export key types for convenience.
pub use classify::{Format, detect, is_well_formed, looks_encoded};
pub use decoder::{DecodeError, DecodeOptions, Tokens, ZeroCount, decode, decode_with, tokens};
pub use encoder::{Runs, encode, encode_into, encoded_len, runs};
pub use frame::{FRAME_MAGIC, FrameError, FrameFlags, FrameHeader, FrameOptions};
pub use inspect::{Report, inspect};
pub use token::{MAX_COUNT, Token};
