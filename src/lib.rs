//! Digirle: digit-count run-length encoding in Rust.
//!
//! Runs of identical bytes become `(byte, digit)` tokens, with runs longer
//! than nine split into several tokens: eleven `A`s encode as `A9A2`.
//!
//! The crate provides:
//! - The codec, format classifier and optional tagged frame (`rle`)
//! - Buffer and file helpers with direction guards (`io`)
//! - An interactive compress/decompress loop (`shell`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```
//! use digirle::rle;
//!
//! let encoded = rle::encode(b"AAAAAAAAAAABC");
//! assert_eq!(encoded, b"A9A2B1C1");
//! assert_eq!(rle::decode(&encoded).unwrap(), b"AAAAAAAAAAABC");
//!
//! // The digit heuristic is approximate: plain text with numerals passes.
//! assert!(rle::looks_encoded(b"Room101"));
//! assert!(!rle::is_well_formed(b"Room101"));
//! ```

pub mod io;
pub mod rle;
pub mod shell;

#[cfg(feature = "cli")]
pub mod cli;
