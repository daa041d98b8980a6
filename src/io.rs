// Buffer- and file-level helpers for compressing and decompressing.
//
// Whole inputs are read into memory, transformed in one call and written
// back through a `BufWriter`. The direction guards reproduce the checks the
// interactive tool has always made: refuse to compress something that looks
// encoded, refuse to decompress something that looks plain. With the
// `file-io` feature the raw side is also hashed with SHA-256.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[cfg(feature = "file-io")]
use sha2::Digest;

use crate::rle::classify::{self, Format};
use crate::rle::decoder::{self, DecodeOptions};
use crate::rle::encoder;
use crate::rle::frame::{self, FrameError, FrameOptions};
use crate::rle::token::TOKEN_LEN;

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Compress,
    Decompress,
}

impl Direction {
    /// Parse the one-letter menu choice (`c` or `d`).
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice {
            "c" => Some(Self::Compress),
            "d" => Some(Self::Decompress),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Compress => "compress",
            Self::Decompress => "decompress",
        }
    }
}

// ---------------------------------------------------------------------------
// Options and stats
// ---------------------------------------------------------------------------

/// Settings shared by `compress_file` and `decompress_file`.
#[derive(Debug, Clone, Copy)]
pub struct FileOptions {
    /// Wrap compressed output in a frame. `None` writes a bare token stream.
    pub frame: Option<FrameOptions>,
    /// Policy for bare token streams. Framed input is always strict.
    pub decode: DecodeOptions,
    /// Refuse input that already looks like the target form.
    pub guard: bool,
    /// Replace an existing output file.
    pub overwrite: bool,
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            frame: None,
            decode: DecodeOptions::default(),
            guard: true,
            overwrite: false,
        }
    }
}

/// Statistics returned by the file helpers.
#[derive(Debug, Clone)]
pub struct FileStats {
    pub direction: Direction,
    /// Input file size in bytes.
    pub input_size: u64,
    /// Output file size in bytes.
    pub output_size: u64,
    /// Tokens written (compress) or read (decompress).
    pub tokens: u64,
    /// Whether the encoded side carries a frame header.
    pub framed: bool,
    /// SHA-256 of the raw side (if `file-io` feature is enabled).
    pub raw_sha256: Option<[u8; 32]>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file operations.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("decode error: {0}")]
    Decode(#[from] FrameError),
    #[error("input is already encoded ({0}), refusing to compress")]
    AlreadyEncoded(Format),
    #[error("input is not encoded, refusing to decompress")]
    NotEncoded,
    #[error("output file exists: {}", .0.display())]
    OutputExists(PathBuf),
}

// ---------------------------------------------------------------------------
// Compress / decompress
// ---------------------------------------------------------------------------

/// Compress an in-memory buffer. Returns the encoded bytes and stats.
pub fn compress_bytes(raw: &[u8], opts: &FileOptions) -> Result<(Vec<u8>, FileStats), IoError> {
    let format = classify::detect(raw);
    if opts.guard && format.is_encoded() {
        return Err(IoError::AlreadyEncoded(format));
    }

    let tokens = (encoder::encoded_len(raw) / TOKEN_LEN) as u64;
    let encoded = match opts.frame {
        Some(frame_opts) => frame::encode_framed(raw, frame_opts),
        None => encoder::encode(raw),
    };
    let stats = FileStats {
        direction: Direction::Compress,
        input_size: raw.len() as u64,
        output_size: encoded.len() as u64,
        tokens,
        framed: opts.frame.is_some(),
        raw_sha256: sha256(raw),
    };
    Ok((encoded, stats))
}

/// Decompress an in-memory buffer. Returns the raw bytes and stats.
///
/// Framed input is detected by its magic; anything else is decoded as a
/// bare token stream.
pub fn decompress_bytes(
    encoded: &[u8],
    opts: &FileOptions,
) -> Result<(Vec<u8>, FileStats), IoError> {
    let format = classify::detect(encoded);
    if opts.guard && !format.is_encoded() {
        return Err(IoError::NotEncoded);
    }

    let framed = format == Format::Framed;
    let (raw, payload_len) = if framed {
        let (_, header_len) = frame::FrameHeader::parse(encoded)?;
        (frame::decode_framed(encoded)?, encoded.len() - header_len)
    } else {
        let raw = decoder::decode_with(encoded, opts.decode).map_err(FrameError::from)?;
        (raw, encoded.len())
    };
    let stats = FileStats {
        direction: Direction::Decompress,
        input_size: encoded.len() as u64,
        output_size: raw.len() as u64,
        tokens: (payload_len / TOKEN_LEN) as u64,
        framed,
        raw_sha256: sha256(&raw),
    };
    Ok((raw, stats))
}

/// Compress `input_path` into `output_path`.
pub fn compress_file(
    input_path: &Path,
    output_path: &Path,
    opts: &FileOptions,
) -> Result<FileStats, IoError> {
    let raw = std::fs::read(input_path)?;
    let (encoded, stats) = compress_bytes(&raw, opts).inspect_err(|e| {
        log::debug!("compress {}: {e}", input_path.display());
    })?;
    write_output(output_path, &encoded, opts.overwrite)?;
    log::debug!(
        "compressed {} -> {}: {} -> {} bytes",
        input_path.display(),
        output_path.display(),
        stats.input_size,
        stats.output_size
    );
    Ok(stats)
}

/// Decompress `input_path` into `output_path`.
pub fn decompress_file(
    input_path: &Path,
    output_path: &Path,
    opts: &FileOptions,
) -> Result<FileStats, IoError> {
    let encoded = std::fs::read(input_path)?;
    let (raw, stats) = decompress_bytes(&encoded, opts).inspect_err(|e| {
        log::debug!("decompress {}: {e}", input_path.display());
    })?;
    write_output(output_path, &raw, opts.overwrite)?;
    log::debug!(
        "decompressed {} -> {}: {} -> {} bytes",
        input_path.display(),
        output_path.display(),
        stats.input_size,
        stats.output_size
    );
    Ok(stats)
}

/// Run `direction` on a pair of paths.
pub fn transform_file(
    direction: Direction,
    input_path: &Path,
    output_path: &Path,
    opts: &FileOptions,
) -> Result<FileStats, IoError> {
    match direction {
        Direction::Compress => compress_file(input_path, output_path, opts),
        Direction::Decompress => decompress_file(input_path, output_path, opts),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Write `data` to `path`, refusing to replace an existing file unless
/// `overwrite` is set.
pub fn write_output(path: &Path, data: &[u8], overwrite: bool) -> Result<(), IoError> {
    if path.exists() && !overwrite {
        return Err(IoError::OutputExists(path.to_path_buf()));
    }
    let mut writer = BufWriter::with_capacity(BUF_SIZE, File::create(path)?);
    writer.write_all(data)?;
    writer.flush()?;
    Ok(())
}

fn sha256(data: &[u8]) -> Option<[u8; 32]> {
    #[cfg(feature = "file-io")]
    {
        Some(sha2::Sha256::digest(data).into())
    }
    #[cfg(not(feature = "file-io"))]
    {
        let _ = data;
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
