// Tagged container for token streams.
//
// Layout:
//
//   magic    [0xD2, 0xCC, 0xC5, 0x00]   "RLE" with bit 7 set, version 0
//   flags    1 byte (FrameFlags)
//   raw_len  varint, length of the decoded data
//   adler32  4 bytes big-endian, present iff CHECKSUM
//   payload  bare token stream
//
// The magic never contains an ASCII digit and cannot be produced by a bare
// token stream whose first count is a digit, so `detect` can tell the two
// apart without guessing.

use bitflags::bitflags;

use super::decoder::{self, DecodeError, DecodeOptions};
use super::encoder;
use super::token::{MAX_COUNT, TOKEN_LEN};
use super::varint::{self, VarIntError};

// ---------------------------------------------------------------------------
// Magic and flags
// ---------------------------------------------------------------------------

pub const FRAME_MAGIC: [u8; 4] = [0xD2, 0xCC, 0xC5, 0x00];

bitflags! {
    /// Frame indicator byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FrameFlags: u8 {
        /// An Adler-32 of the decoded data follows the length field.
        const CHECKSUM = 1 << 0;
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("missing frame magic")]
    BadMagic,
    #[error("unsupported frame version: {0:#04X}")]
    UnsupportedVersion(u8),
    #[error("invalid frame flags: {0:#04X}")]
    InvalidFlags(u8),
    #[error("truncated frame header")]
    TruncatedHeader,
    #[error("invalid length field: {0}")]
    Length(#[from] VarIntError),
    #[error("length mismatch: header says {expected} bytes, payload holds {actual}")]
    LengthMismatch { expected: u64, actual: u64 },
    #[error("checksum mismatch: expected {expected:#010X}, got {actual:#010X}")]
    ChecksumMismatch { expected: u32, actual: u32 },
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Settings for `encode_framed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameOptions {
    /// Store an Adler-32 of the raw data.
    pub checksum: bool,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self { checksum: true }
    }
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Parsed frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub flags: FrameFlags,
    /// Length of the decoded data.
    pub raw_len: u64,
    pub adler32: Option<u32>,
}

impl FrameHeader {
    /// Header describing `raw`.
    pub fn for_raw(raw: &[u8], opts: FrameOptions) -> Self {
        let (flags, adler32) = if opts.checksum {
            (FrameFlags::CHECKSUM, Some(adler32(raw)))
        } else {
            (FrameFlags::empty(), None)
        };
        Self {
            flags,
            raw_len: raw.len() as u64,
            adler32,
        }
    }

    /// Serialized size in bytes.
    pub fn encoded_len(&self) -> usize {
        let cksum = if self.adler32.is_some() { 4 } else { 0 };
        FRAME_MAGIC.len() + 1 + varint::sizeof_u64(self.raw_len) + cksum
    }

    /// Append the serialized header to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&FRAME_MAGIC);
        out.push(self.flags.bits());
        varint::push_u64(out, self.raw_len);
        if self.flags.contains(FrameFlags::CHECKSUM)
            && let Some(cksum) = self.adler32
        {
            out.extend_from_slice(&cksum.to_be_bytes());
        }
    }

    /// Parse a header from the front of `data`.
    /// Returns the header and the number of bytes it occupies.
    pub fn parse(data: &[u8]) -> Result<(Self, usize), FrameError> {
        let Some(magic) = data.get(..FRAME_MAGIC.len()) else {
            return Err(if FRAME_MAGIC.starts_with(data) {
                FrameError::TruncatedHeader
            } else {
                FrameError::BadMagic
            });
        };
        if magic[..3] != FRAME_MAGIC[..3] {
            return Err(FrameError::BadMagic);
        }
        if magic[3] != FRAME_MAGIC[3] {
            return Err(FrameError::UnsupportedVersion(magic[3]));
        }
        let mut pos = FRAME_MAGIC.len();

        let &ind = data.get(pos).ok_or(FrameError::TruncatedHeader)?;
        let flags = FrameFlags::from_bits(ind).ok_or(FrameError::InvalidFlags(ind))?;
        pos += 1;

        let (raw_len, consumed) = varint::read_u64(&data[pos..])?;
        pos += consumed;

        let adler32 = if flags.contains(FrameFlags::CHECKSUM) {
            let bytes: [u8; 4] = data
                .get(pos..pos + 4)
                .and_then(|b| b.try_into().ok())
                .ok_or(FrameError::TruncatedHeader)?;
            pos += 4;
            Some(u32::from_be_bytes(bytes))
        } else {
            None
        };

        Ok((
            Self {
                flags,
                raw_len,
                adler32,
            },
            pos,
        ))
    }
}

// ---------------------------------------------------------------------------
// Encode / decode
// ---------------------------------------------------------------------------

/// Encode `input` and wrap it in a frame.
pub fn encode_framed(input: &[u8], opts: FrameOptions) -> Vec<u8> {
    let header = FrameHeader::for_raw(input, opts);
    let mut out = Vec::with_capacity(header.encoded_len() + encoder::encoded_len(input));
    header.write_to(&mut out);
    encoder::encode_into(input, &mut out);
    out
}

/// Decode a framed buffer, verifying its length and checksum.
///
/// The payload is decoded with the strict zero-count policy.
pub fn decode_framed(data: &[u8]) -> Result<Vec<u8>, FrameError> {
    let (header, header_len) = FrameHeader::parse(data)?;
    let payload = &data[header_len..];
    log::trace!(
        "frame: flags={:?} raw_len={} payload={}",
        header.flags,
        header.raw_len,
        payload.len()
    );

    // Bound the declared size by what the payload could ever produce.
    let ceiling = (payload.len() / TOKEN_LEN) as u64 * u64::from(MAX_COUNT);
    let actual = decoder::decoded_len(payload, DecodeOptions::strict())?;
    if header.raw_len > ceiling || actual != header.raw_len {
        return Err(FrameError::LengthMismatch {
            expected: header.raw_len,
            actual,
        });
    }

    let mut out = Vec::with_capacity(actual as usize);
    decoder::decode_into(payload, DecodeOptions::strict(), &mut out)?;

    if let Some(expected) = header.adler32 {
        let actual = adler32(&out);
        if actual != expected {
            return Err(FrameError::ChecksumMismatch { expected, actual });
        }
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Adler-32
// ---------------------------------------------------------------------------

/// Adler-32 of `data`.
pub fn adler32(data: &[u8]) -> u32 {
    #[cfg(feature = "adler32")]
    {
        let mut hasher = simd_adler32::Adler32::new();
        hasher.write(data);
        hasher.finish()
    }
    #[cfg(not(feature = "adler32"))]
    {
        const MOD_ADLER: u32 = 65521;
        let mut a: u32 = 1;
        let mut b: u32 = 0;
        for &byte in data {
            a = (a + u32::from(byte)) % MOD_ADLER;
            b = (b + a) % MOD_ADLER;
        }
        (b << 16) | a
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adler32_known_value() {
        // Standard test vector.
        assert_eq!(adler32(b"Wikipedia"), 0x11E6_0398);
        assert_eq!(adler32(b""), 1);
    }

    #[test]
    fn roundtrip_with_and_without_checksum() {
        let input = b"aaaaaaaaaaaaabbbbc0000";
        for checksum in [true, false] {
            let framed = encode_framed(input, FrameOptions { checksum });
            assert!(framed.starts_with(&FRAME_MAGIC));
            assert_eq!(decode_framed(&framed).unwrap(), input);
        }
    }

    #[test]
    fn empty_input_frame() {
        let framed = encode_framed(b"", FrameOptions::default());
        let (hdr, len) = FrameHeader::parse(&framed).unwrap();
        assert_eq!(hdr.raw_len, 0);
        assert_eq!(len, framed.len());
        assert_eq!(hdr.adler32, Some(1));
        assert!(decode_framed(&framed).unwrap().is_empty());
    }

    #[test]
    fn header_layout() {
        let framed = encode_framed(b"AAAA", FrameOptions { checksum: false });
        assert_eq!(framed, [0xD2, 0xCC, 0xC5, 0x00, 0x00, 0x04, b'A', b'4']);

        let hdr = FrameHeader::for_raw(&[0u8; 200], FrameOptions::default());
        let mut out = Vec::new();
        hdr.write_to(&mut out);
        assert_eq!(out.len(), hdr.encoded_len());
        assert_eq!(FrameHeader::parse(&out).unwrap(), (hdr, out.len()));
    }

    #[test]
    fn rejects_bad_magic_and_version() {
        assert_eq!(FrameHeader::parse(b"A4"), Err(FrameError::BadMagic));
        let ascii_magic = FrameHeader::parse(b"RLE\x00\x00\x00");
        assert_eq!(ascii_magic, Err(FrameError::BadMagic));
        assert_eq!(
            FrameHeader::parse(&[0xD2, 0xCC, 0xC5, 0x01, 0x00, 0x00]),
            Err(FrameError::UnsupportedVersion(1))
        );
        assert_eq!(
            FrameHeader::parse(&[0xD2, 0xCC]),
            Err(FrameError::TruncatedHeader)
        );
    }

    #[test]
    fn rejects_unknown_flags() {
        let data = [0xD2, 0xCC, 0xC5, 0x00, 0x82, 0x00];
        assert_eq!(
            FrameHeader::parse(&data),
            Err(FrameError::InvalidFlags(0x82))
        );
    }

    #[test]
    fn rejects_truncated_checksum() {
        let data = [0xD2, 0xCC, 0xC5, 0x00, 0x01, 0x00, 0x00, 0x00];
        assert_eq!(FrameHeader::parse(&data), Err(FrameError::TruncatedHeader));
        let data = [0xD2, 0xCC, 0xC5, 0x00, 0x00];
        assert_eq!(
            FrameHeader::parse(&data),
            Err(FrameError::Length(VarIntError::Underflow))
        );
    }

    #[test]
    fn detects_corrupted_payload() {
        let mut framed = encode_framed(b"hello", FrameOptions::default());
        let last = framed.len() - 2;
        framed[last] = b'j';
        assert!(matches!(
            decode_framed(&framed),
            Err(FrameError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn detects_length_mismatch() {
        let mut framed = encode_framed(b"hello", FrameOptions { checksum: false });
        framed.extend_from_slice(b"x1");
        assert_eq!(
            decode_framed(&framed),
            Err(FrameError::LengthMismatch {
                expected: 5,
                actual: 6
            })
        );
    }

    #[test]
    fn oversized_length_is_rejected_before_allocation() {
        let mut data = FRAME_MAGIC.to_vec();
        data.push(0);
        varint::push_u64(&mut data, u64::MAX);
        data.extend_from_slice(b"A1");
        assert!(matches!(
            decode_framed(&data),
            Err(FrameError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn payload_zero_counts_are_rejected() {
        let mut data = FRAME_MAGIC.to_vec();
        data.extend_from_slice(&[0x00, 0x00]);
        data.extend_from_slice(b"A0");
        assert!(matches!(
            decode_framed(&data),
            Err(FrameError::Decode(DecodeError::InvalidCount { .. }))
        ));
    }
}
