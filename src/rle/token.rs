// Token model: one (byte, count) pair of the encoded stream.

/// Largest count a single token can carry.
pub const MAX_COUNT: u8 = 9;

/// Size of one serialized token in bytes.
pub const TOKEN_LEN: usize = 2;

/// A decoded (byte, count) pair.
///
/// `count` is the numeric value of the count digit, not the ASCII
/// character. Tokens built with [`Token::new`] always hold 1..=9; the
/// decoder may also yield 0 when the zero-count policy allows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    pub byte: u8,
    pub count: u8,
}

impl Token {
    /// Create a token, returning `None` if `count` is outside 1..=9.
    pub fn new(byte: u8, count: u8) -> Option<Self> {
        (1..=MAX_COUNT)
            .contains(&count)
            .then_some(Self { byte, count })
    }

    /// The ASCII digit stored in the count position.
    #[inline]
    pub fn count_digit(self) -> u8 {
        b'0' + self.count
    }

    /// Serialized form: `[byte, digit]`.
    #[inline]
    pub fn to_bytes(self) -> [u8; TOKEN_LEN] {
        [self.byte, self.count_digit()]
    }
}

/// Interpret a count byte as a digit value, if it is `'0'..='9'`.
#[inline]
pub fn digit_value(byte: u8) -> Option<u8> {
    byte.is_ascii_digit().then(|| byte - b'0')
}
