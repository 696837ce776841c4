//! Decoding and encoding of the packed configuration resource.
//!
//! Stored form: `transfer_encode(shift(plaintext))`, optionally interleaved with
//! `#` comment lines and blank lines. The shift operates on bytes modulo 256 and
//! the decoded bytes are read back as Latin-1, so each byte is one character.

use std::fmt;
use std::sync::Arc;

use base64::Engine as _;
use base64::alphabet;
use base64::engine::general_purpose::STANDARD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use crate::error::{ConfigError, ConfigResult};

/// Offset applied by the default codec.
pub const DEFAULT_SHIFT: u8 = 3;

/// Accepts what a browser `atob` accepts: padding optional, trailing bits ignored.
const FORGIVING: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Text-safe transfer encoding wrapped around the shifted bytes.
pub trait TransferEncoding: fmt::Debug + Send + Sync {
    /// Converts cleaned resource text back into raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DecodeFailure`] when the text is not valid for this
    /// encoding.
    fn decode(&self, text: &str) -> ConfigResult<Vec<u8>>;

    /// Converts raw bytes into storable text.
    fn encode(&self, bytes: &[u8]) -> String;
}

/// Standard-alphabet base64, decoded leniently.
#[derive(Clone, Copy, Debug, Default)]
pub struct Base64Encoding;

impl TransferEncoding for Base64Encoding {
    fn decode(&self, text: &str) -> ConfigResult<Vec<u8>> {
        let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        FORGIVING
            .decode(compact)
            .map_err(|err| ConfigError::decode(format!("invalid base64: {err}")))
    }

    fn encode(&self, bytes: &[u8]) -> String {
        STANDARD.encode(bytes)
    }
}

/// Identity encoding: the shifted bytes are stored as Latin-1 text.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainEncoding;

impl TransferEncoding for PlainEncoding {
    fn decode(&self, text: &str) -> ConfigResult<Vec<u8>> {
        text.chars()
            .map(|c| {
                u8::try_from(c).map_err(|_| {
                    ConfigError::decode(format!("character {c:?} is outside the byte range"))
                })
            })
            .collect()
    }

    fn encode(&self, bytes: &[u8]) -> String {
        bytes.iter().copied().map(char::from).collect()
    }
}

/// Caesar-style byte shift. Encoding adds the offset, decoding subtracts it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShiftCipher {
    offset: u8,
}

impl ShiftCipher {
    /// Creates a cipher with the given offset.
    #[must_use]
    pub const fn new(offset: u8) -> Self {
        Self { offset }
    }

    /// Returns the configured offset.
    #[must_use]
    pub const fn offset(self) -> u8 {
        self.offset
    }

    /// Removes the shift, reading every resulting byte as one character.
    ///
    /// Subtraction wraps modulo 256, so with the default offset the bytes
    /// `0x00..=0x02` decode to `U+00FD..=U+00FF`. A shift over UTF-16 code
    /// units would wrap to `U+FFFD..=U+FFFF` instead; the two agree on ASCII.
    #[must_use]
    pub fn unshift(self, bytes: &[u8]) -> String {
        bytes
            .iter()
            .map(|byte| char::from(byte.wrapping_sub(self.offset)))
            .collect()
    }

    /// Applies the shift to a plaintext document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EncodeFailure`] when the text contains a character
    /// above U+00FF.
    pub fn shift(self, text: &str) -> ConfigResult<Vec<u8>> {
        text.chars()
            .enumerate()
            .map(|(index, c)| {
                u8::try_from(c)
                    .map(|byte| byte.wrapping_add(self.offset))
                    .map_err(|_| ConfigError::EncodeFailure {
                        reason: format!("character {c:?} at position {index} is not Latin-1"),
                    })
            })
            .collect()
    }
}

impl Default for ShiftCipher {
    fn default() -> Self {
        Self::new(DEFAULT_SHIFT)
    }
}

/// Pipeline converting between stored resource text and the plaintext document.
#[derive(Clone, Debug)]
pub struct ConfigCodec {
    cipher: ShiftCipher,
    encoding: Arc<dyn TransferEncoding>,
}

impl ConfigCodec {
    /// Creates a base64 codec with the supplied shift offset.
    #[must_use]
    pub fn new(shift: u8) -> Self {
        Self {
            cipher: ShiftCipher::new(shift),
            encoding: Arc::new(Base64Encoding),
        }
    }

    /// Replaces the transfer encoding step.
    #[must_use]
    pub fn with_encoding(mut self, encoding: impl TransferEncoding + 'static) -> Self {
        self.encoding = Arc::new(encoding);
        self
    }

    /// Returns the shift cipher in use.
    #[must_use]
    pub const fn cipher(&self) -> ShiftCipher {
        self.cipher
    }

    /// Turns raw resource text into the plaintext document.
    ///
    /// Lines starting with `#` and whitespace-only lines are dropped and the
    /// remaining lines are concatenated before decoding.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DecodeFailure`] when the transfer encoding rejects
    /// the cleaned text.
    pub fn decode(&self, raw: &str) -> ConfigResult<String> {
        let cleaned = strip_comments(raw);
        let bytes = self.encoding.decode(&cleaned)?;
        Ok(self.cipher.unshift(&bytes))
    }

    /// Turns a plaintext document into storable resource text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EncodeFailure`] when the document contains
    /// characters the byte shift cannot represent.
    pub fn encode(&self, plain: &str) -> ConfigResult<String> {
        let shifted = self.cipher.shift(plain)?;
        Ok(self.encoding.encode(&shifted))
    }
}

impl Default for ConfigCodec {
    fn default() -> Self {
        Self::new(DEFAULT_SHIFT)
    }
}

fn strip_comments(raw: &str) -> String {
    raw.lines()
        .filter(|line| !line.starts_with('#') && !line.trim().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_known_resource() {
        // "[model:a]" shifted by +3, base64 encoded.
        let shifted: Vec<u8> = b"[model:a]".iter().map(|b| b + 3).collect();
        let stored = STANDARD.encode(shifted);
        let decoded = ConfigCodec::default().decode(&stored).unwrap();
        assert_eq!(decoded, "[model:a]");
    }

    #[test]
    fn drops_comments_and_blank_lines() {
        let codec = ConfigCodec::default();
        let encoded = codec.encode("[model:gpt4]\nendpoint=https://x\n").unwrap();
        let (head, tail) = encoded.split_at(encoded.len() / 2);
        let raw = format!("# key file\n\n{head}\r\n   \n# middle\n{tail}\n");
        assert_eq!(codec.decode(&raw).unwrap(), "[model:gpt4]\nendpoint=https://x\n");
    }

    #[test]
    fn indented_hash_lines_are_not_comments() {
        let err = ConfigCodec::default()
            .decode("  # not a comment")
            .expect_err("'#' is not base64");
        assert!(matches!(err, ConfigError::DecodeFailure { .. }));
    }

    #[test]
    fn empty_resource_decodes_to_empty_document() {
        let codec = ConfigCodec::default();
        assert_eq!(codec.decode("").unwrap(), "");
        assert_eq!(codec.decode("# only comments\n\n").unwrap(), "");
    }

    #[test]
    fn malformed_base64_is_a_decode_failure() {
        let err = ConfigCodec::default()
            .decode("not*valid*base64")
            .expect_err("invalid input");
        assert!(matches!(err, ConfigError::DecodeFailure { .. }));
    }

    #[test]
    fn accepts_missing_padding() {
        let codec = ConfigCodec::default();
        let encoded = codec.encode("ab").unwrap();
        assert!(encoded.ends_with('='));
        let unpadded = encoded.trim_end_matches('=');
        assert_eq!(codec.decode(unpadded).unwrap(), "ab");
    }

    #[test]
    fn round_trips_with_arbitrary_shift() {
        let plain = "[model:gpt4]\nendpoint=https://example.com/v1?x=1\napiKey=~secret!\n";
        for shift in [0_u8, 1, 3, 17, 128, 200, 255] {
            let codec = ConfigCodec::new(shift);
            let encoded = codec.encode(plain).unwrap();
            assert_eq!(codec.decode(&encoded).unwrap(), plain, "shift {shift}");
        }
    }

    #[test]
    fn unshift_wraps_below_zero() {
        let cipher = ShiftCipher::new(3);
        assert_eq!(cipher.unshift(&[0x00, 0x01, 0x02]), "\u{fd}\u{fe}\u{ff}");
        assert_eq!(cipher.shift("\u{fe}").unwrap(), vec![0x01]);
    }

    #[test]
    fn shift_rejects_wide_characters() {
        let err = ShiftCipher::default().shift("model→x").expect_err("non Latin-1");
        assert!(matches!(err, ConfigError::EncodeFailure { .. }));
    }

    #[test]
    fn plain_encoding_skips_base64() {
        let codec = ConfigCodec::new(1).with_encoding(PlainEncoding);
        assert_eq!(codec.encode("abc").unwrap(), "bcd");
        assert_eq!(codec.decode("# comment\nbcd\n").unwrap(), "abc");
    }
}
