#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "alloc")]
use alloc::{string::String, vec::Vec};

pub use config::{Configuration, STANDARD, default_configuration};
pub use error::{Error, ParseAlphabetError};

/// Encode bytes to a padded base64 string using the [STANDARD] configuration.
#[cfg(feature = "alloc")]
pub fn encode<T: AsRef<[u8]>>(bytes: T) -> String {
    STANDARD.encode(bytes)
}

/// Encode bytes to base64 into a pre-allocated buffer.
///
/// Returns the number of bytes written.
pub fn encode_slice<T: AsRef<[u8]>>(
    bytes: T,
    output_buf: &mut [u8],
    config: &Configuration,
) -> Result<usize, Error> {
    config.encode_slice(bytes, output_buf)
}

/// Encode the first `input_len` bytes of `buffer` to base64, writing the result over the same
/// buffer.
///
/// Returns the number of bytes of `buffer` holding the encoded data.
pub fn encode_in_place(
    buffer: &mut [u8],
    input_len: usize,
    config: &Configuration,
) -> Result<usize, Error> {
    config.encode_in_place(buffer, input_len)
}

/// Grow `buffer` and replace its contents with their [STANDARD] base64 encoding.
#[cfg(feature = "alloc")]
pub fn encode_vec_in_place(buffer: &mut Vec<u8>) {
    STANDARD.encode_vec_in_place(buffer)
}

/// Decode [STANDARD] base64 to bytes.
#[cfg(feature = "alloc")]
pub fn decode<T: AsRef<[u8]>>(b64str: T) -> Result<Vec<u8>, Error> {
    STANDARD.decode(b64str)
}

/// Decode base64 into a pre-allocated buffer.
///
/// Returns the number of bytes written.
pub fn decode_slice<T: AsRef<[u8]>>(
    b64str: T,
    output: &mut [u8],
    config: &Configuration,
) -> Result<usize, Error> {
    config.decode_slice(b64str, output)
}

/// Decode the base64 held in `buffer` over itself.
///
/// Returns the number of decoded bytes, which are found at the start of `buffer`.
pub fn decode_in_place(buffer: &mut [u8], config: &Configuration) -> Result<usize, Error> {
    config.decode_in_place(buffer)
}

/// Replace the [STANDARD] base64 held in `buffer` with the decoded bytes.
#[cfg(feature = "alloc")]
pub fn decode_vec_in_place(buffer: &mut Vec<u8>) -> Result<(), Error> {
    STANDARD.decode_vec_in_place(buffer)
}

/// Calculate the padded base64 encoded length for a given input length.
///
/// Returns `None` if the encoded length can't be represented in `usize`. This will happen for
/// input lengths in approximately the top quarter of the range of `usize`.
pub const fn encoded_len(bytes_len: usize) -> Option<usize> {
    let rem = bytes_len % 3;

    let complete_input_chunks = bytes_len / 3;
    let Some(complete_chunk_output) = complete_input_chunks.checked_mul(4) else {
        return None;
    };

    if rem > 0 {
        complete_chunk_output.checked_add(4)
    } else {
        Some(complete_chunk_output)
    }
}

/// Returns a conservative estimate of the decoded size of `encoded_len` base64 symbols (rounded up
/// to the next group of 3 decoded bytes).
///
/// The resulting length will be a safe choice for the size of a decode buffer, but may have up to
/// 2 trailing bytes that won't end up being needed.
///
/// # Examples
///
/// ```
/// use base64inplace::decoded_len_estimate;
///
/// assert_eq!(0, decoded_len_estimate(0));
/// assert_eq!(3, decoded_len_estimate(4));
/// // start of the next quad of encoded symbols
/// assert_eq!(6, decoded_len_estimate(5));
/// ```
pub const fn decoded_len_estimate(encoded_len: usize) -> usize {
    (encoded_len / 4 + (encoded_len % 4 > 0) as usize) * 3
}

pub(crate) const PAD_BYTE: u8 = b'=';

// The first blocks of an in-place transform share bytes between their source and destination
// ranges; from this block index on they are disjoint.
const OVERLAPPING_BLOCKS: usize = 3;

pub(crate) mod config {
    use super::*;

    pub(crate) const ALPHABET_SIZE: usize = 64;
    pub(crate) const INVALID_VALUE: u8 = 255;

    const ALPHANUMERIC: &[u8; 62] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

    const LOW_SIX_BITS: u8 = 0x3F;

    /// The RFC 4648 alphabet (`+` and `/` for values 62 and 63) with `=` padding.
    pub static STANDARD: Configuration = match Configuration::from_tail(b'+', b'/', PAD_BYTE) {
        Ok(config) => config,
        Err(_) => panic!("the standard alphabet is valid"),
    };

    /// Returns the process-wide [STANDARD] configuration.
    pub fn default_configuration() -> &'static Configuration {
        &STANDARD
    }

    /// A base64 alphabet with its decode table and padding byte.
    ///
    /// Build one once and reuse it: every transform only reads from it, so a single instance can
    /// be shared between threads.
    ///
    /// ```
    /// use base64inplace::Configuration;
    ///
    /// let url_safe = Configuration::from_tail(b'-', b'_', b'=').unwrap();
    /// assert_eq!("-_8=", url_safe.encode([0xFB_u8, 0xFF]));
    /// ```
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct Configuration {
        table: [u8; ALPHABET_SIZE],
        reverse_table: [u8; 256],
        padding: u8,
    }

    impl Configuration {
        /// Create a configuration from 64 distinct printable ASCII symbols and a padding byte
        /// that is not one of them.
        pub const fn from_alphabet(
            alphabet: &[u8],
            padding: u8,
        ) -> Result<Self, ParseAlphabetError> {
            if alphabet.len() != ALPHABET_SIZE {
                return Err(ParseAlphabetError::InvalidLength(alphabet.len()));
            }
            if !is_printable(padding) {
                return Err(ParseAlphabetError::UnprintableByte(padding));
            }

            let mut table = [0_u8; ALPHABET_SIZE];
            let mut reverse_table = [INVALID_VALUE; 256];

            let mut index = 0;
            while index < ALPHABET_SIZE {
                let byte = alphabet[index];
                if !is_printable(byte) {
                    return Err(ParseAlphabetError::UnprintableByte(byte));
                }
                if byte == padding {
                    return Err(ParseAlphabetError::ReservedByte(byte));
                }
                if reverse_table[byte as usize] != INVALID_VALUE {
                    return Err(ParseAlphabetError::DuplicatedByte(byte));
                }

                table[index] = byte;
                // index is in 0..64
                reverse_table[byte as usize] = index as u8;
                index += 1;
            }

            Ok(Self {
                table,
                reverse_table,
                padding,
            })
        }

        /// Create a configuration from the `A-Z`, `a-z`, `0-9` alphabet followed by `c62` and
        /// `c63`.
        pub const fn from_tail(c62: u8, c63: u8, padding: u8) -> Result<Self, ParseAlphabetError> {
            let mut alphabet = [0_u8; ALPHABET_SIZE];

            let mut index = 0;
            while index < ALPHANUMERIC.len() {
                alphabet[index] = ALPHANUMERIC[index];
                index += 1;
            }
            alphabet[62] = c62;
            alphabet[63] = c63;

            Self::from_alphabet(&alphabet, padding)
        }

        /// The symbol for each 6-bit value.
        pub const fn table(&self) -> &[u8; ALPHABET_SIZE] {
            &self.table
        }

        /// The 6-bit value of each byte, or 255 for bytes outside the alphabet.
        pub const fn reverse_table(&self) -> &[u8; 256] {
            &self.reverse_table
        }

        pub const fn padding(&self) -> u8 {
            self.padding
        }

        #[inline]
        pub(crate) fn encode_triplet(&self, read: &[u8], write: &mut [u8]) {
            write[0] = self.table[(read[0] >> 2) as usize];
            write[1] = self.table[(((read[0] & 0x03) << 4) | (read[1] >> 4)) as usize];
            write[2] = self.table[(((read[1] & 0x0F) << 2) | (read[2] >> 6)) as usize];
            write[3] = self.table[(read[2] & LOW_SIX_BITS) as usize];
        }

        /// Encode the 0-2 bytes left after the last complete triplet, with padding.
        ///
        /// Returns the number of bytes written: 0 or 4.
        #[inline]
        pub(crate) fn encode_last_triplet(&self, read: &[u8], write: &mut [u8]) -> usize {
            match *read {
                [] => 0,
                [b0] => {
                    write[0] = self.table[(b0 >> 2) as usize];
                    write[1] = self.table[((b0 & 0x03) << 4) as usize];
                    write[2] = self.padding;
                    write[3] = self.padding;
                    4
                }
                [b0, b1] => {
                    write[0] = self.table[(b0 >> 2) as usize];
                    write[1] = self.table[(((b0 & 0x03) << 4) | (b1 >> 4)) as usize];
                    write[2] = self.table[((b1 & 0x0F) << 2) as usize];
                    write[3] = self.padding;
                    4
                }
                _ => unreachable!("a trailing partial triplet has at most 2 bytes"),
            }
        }

        // Symbols outside the alphabet decode to unspecified bytes.
        #[inline]
        pub(crate) fn decode_quartet(&self, read: &[u8], write: &mut [u8]) {
            let m0 = self.reverse_table[read[0] as usize];
            let m1 = self.reverse_table[read[1] as usize];
            let m2 = self.reverse_table[read[2] as usize];
            let m3 = self.reverse_table[read[3] as usize];

            write[0] = (m0 << 2) | (m1 >> 4);
            write[1] = (m1 << 4) | (m2 >> 2);
            write[2] = (m2 << 6) | m3;
        }

        /// Decode the final quartet, which may end in one or two padding bytes.
        ///
        /// Returns the number of bytes written: 1, 2 or 3.
        #[inline]
        pub(crate) fn decode_last_quartet(&self, read: &[u8], write: &mut [u8]) -> usize {
            let m0 = self.reverse_table[read[0] as usize];
            let m1 = self.reverse_table[read[1] as usize];

            write[0] = (m0 << 2) | (m1 >> 4);
            if read[2] == self.padding {
                return 1;
            }

            let m2 = self.reverse_table[read[2] as usize];
            write[1] = (m1 << 4) | (m2 >> 2);
            if read[3] == self.padding {
                return 2;
            }

            write[2] = (m2 << 6) | self.reverse_table[read[3] as usize];
            3
        }
    }

    impl Default for Configuration {
        fn default() -> Self {
            STANDARD.clone()
        }
    }

    impl core::str::FromStr for Configuration {
        type Err = ParseAlphabetError;

        /// Parse a 64 symbol alphabet, padded with `=`.
        fn from_str(alphabet: &str) -> Result<Self, Self::Err> {
            Self::from_alphabet(alphabet.as_bytes(), PAD_BYTE)
        }
    }

    // 127 (DEL) is not printable
    const fn is_printable(byte: u8) -> bool {
        byte >= 0x20 && byte < 0x7F
    }
}

pub(crate) mod encode {
    use super::*;
    #[cfg(feature = "alloc")]
    use alloc::vec;

    impl Configuration {
        /// Encode `input` into `output_buf`, which must hold at least
        /// [encoded_len()](crate::encoded_len) bytes.
        ///
        /// Returns the number of bytes written.
        pub fn encode_slice<T: AsRef<[u8]>>(
            &self,
            input: T,
            output_buf: &mut [u8],
        ) -> Result<usize, Error> {
            fn inner(
                config: &Configuration,
                input: &[u8],
                output: &mut [u8],
            ) -> Result<usize, Error> {
                let encoded_size = encoded_len(input.len()).ok_or(Error::OutputSliceTooSmall)?;
                if output.len() < encoded_size {
                    return Err(Error::OutputSliceTooSmall);
                }

                let complete_triplets_len = input.len() - input.len() % 3;
                for (read, write) in input[..complete_triplets_len]
                    .chunks_exact(3)
                    .zip(output.chunks_exact_mut(4))
                {
                    config.encode_triplet(read, write);
                }

                let output_index = complete_triplets_len / 3 * 4;
                let tail_len = config.encode_last_triplet(
                    &input[complete_triplets_len..],
                    &mut output[output_index..],
                );

                Ok(output_index + tail_len)
            }

            inner(self, input.as_ref(), output_buf)
        }

        /// Encode the first `input_len` bytes of `buffer` over the buffer itself.
        ///
        /// `buffer` must hold at least [encoded_len()](crate::encoded_len) of `input_len` bytes.
        /// Output grows past input, so blocks are encoded from the last to the first: each write
        /// lands at or beyond the bytes of every block still waiting to be read.
        ///
        /// Returns the number of bytes of `buffer` holding the encoded data.
        pub fn encode_in_place(&self, buffer: &mut [u8], input_len: usize) -> Result<usize, Error> {
            let encoded_size = encoded_len(input_len).ok_or(Error::OutputSliceTooSmall)?;
            if buffer.len() < encoded_size {
                return Err(Error::OutputSliceTooSmall);
            }

            let triplets = input_len / 3;
            let rest = input_len % 3;

            // With fewer than 3 bytes of input the tail's output starts on top of it.
            let mut scratch = [0_u8; 3];
            scratch[..rest].copy_from_slice(&buffer[triplets * 3..input_len]);
            let tail_len = self.encode_last_triplet(&scratch[..rest], &mut buffer[triplets * 4..]);

            for index in (0..triplets).rev() {
                let read = index * 3;
                let write = index * 4;

                if index >= OVERLAPPING_BLOCKS {
                    // read + 3 <= write
                    let (head, tail) = buffer.split_at_mut(write);
                    self.encode_triplet(&head[read..read + 3], &mut tail[..4]);
                } else {
                    scratch.copy_from_slice(&buffer[read..read + 3]);
                    self.encode_triplet(&scratch, &mut buffer[write..write + 4]);
                }
            }

            Ok(triplets * 4 + tail_len)
        }

        /// Encode bytes to a padded base64 string.
        #[cfg(feature = "alloc")]
        pub fn encode<T: AsRef<[u8]>>(&self, input: T) -> String {
            fn inner(config: &Configuration, input_bytes: &[u8]) -> String {
                let encoded_size = encoded_len(input_bytes.len())
                    .expect("integer overflow when calculating buffer size");

                let mut buf = vec![0; encoded_size];
                let written = config
                    .encode_slice(input_bytes, &mut buf[..])
                    .expect("buffer is sized to the encoded length");
                debug_assert_eq!(encoded_size, written);

                String::from_utf8(buf).expect("Invalid UTF8")
            }

            inner(self, input.as_ref())
        }

        /// Grow `buffer` to its encoded length and replace its contents with their base64
        /// encoding.
        #[cfg(feature = "alloc")]
        pub fn encode_vec_in_place(&self, buffer: &mut Vec<u8>) {
            let input_len = buffer.len();
            let encoded_size =
                encoded_len(input_len).expect("integer overflow when calculating buffer size");

            buffer.resize(encoded_size, 0);
            let written = self
                .encode_in_place(buffer, input_len)
                .expect("buffer is sized to the encoded length");
            buffer.truncate(written);
        }
    }
}

pub(crate) mod decode {
    use super::*;
    #[cfg(feature = "alloc")]
    use alloc::vec;

    impl Configuration {
        /// Returns the exact number of bytes `input` decodes to.
        ///
        /// Fails with [Error::InvalidLength] if `input` is not a whole number of quartets.
        pub fn decoded_len<T: AsRef<[u8]>>(&self, input: T) -> Result<usize, Error> {
            let input = input.as_ref();
            if input.len() % 4 != 0 {
                return Err(Error::InvalidLength(input.len()));
            }

            let complete_len = input.len() / 4 * 3;
            Ok(match *input {
                [] => 0,
                [.., c2, _] if c2 == self.padding() => complete_len - 2,
                [.., c3] if c3 == self.padding() => complete_len - 1,
                _ => complete_len,
            })
        }

        /// Decode `input` into `output`, which must hold at least
        /// [decoded_len()](Configuration::decoded_len) bytes.
        ///
        /// Returns the number of bytes written. Symbols outside the alphabet are not detected
        /// and produce unspecified bytes.
        pub fn decode_slice<T: AsRef<[u8]>>(
            &self,
            input: T,
            output: &mut [u8],
        ) -> Result<usize, Error> {
            fn inner(
                config: &Configuration,
                input: &[u8],
                output: &mut [u8],
            ) -> Result<usize, Error> {
                let decoded_size = config.decoded_len(input)?;
                if output.len() < decoded_size {
                    return Err(Error::OutputSliceTooSmall);
                }

                let Some(last_quartet_start) = input.len().checked_sub(4) else {
                    return Ok(0);
                };

                for (read, write) in input[..last_quartet_start]
                    .chunks_exact(4)
                    .zip(output.chunks_exact_mut(3))
                {
                    config.decode_quartet(read, write);
                }

                let output_index = last_quartet_start / 4 * 3;
                let mut scratch = [0_u8; 3];
                let tail_len = config.decode_last_quartet(&input[last_quartet_start..], &mut scratch);
                output[output_index..output_index + tail_len].copy_from_slice(&scratch[..tail_len]);

                Ok(output_index + tail_len)
            }

            inner(self, input.as_ref(), output)
        }

        /// Decode the base64 held in `buffer` over the buffer itself.
        ///
        /// Output shrinks behind input, so blocks are decoded from the first to the last: each
        /// write ends at or before the start of the next block to be read.
        ///
        /// Returns the number of decoded bytes at the start of `buffer`. The bytes after them
        /// are left unspecified.
        pub fn decode_in_place(&self, buffer: &mut [u8]) -> Result<usize, Error> {
            if buffer.len() % 4 != 0 {
                return Err(Error::InvalidLength(buffer.len()));
            }

            let Some(last_index) = (buffer.len() / 4).checked_sub(1) else {
                return Ok(0);
            };

            let mut scratch = [0_u8; 3];
            for index in 0..last_index {
                let read = index * 4;
                let write = index * 3;

                if index >= OVERLAPPING_BLOCKS {
                    // write + 3 <= read
                    let (head, tail) = buffer.split_at_mut(read);
                    self.decode_quartet(&tail[..4], &mut head[write..write + 3]);
                } else {
                    self.decode_quartet(&buffer[read..read + 4], &mut scratch);
                    buffer[write..write + 3].copy_from_slice(&scratch);
                }
            }

            let read = last_index * 4;
            let write = last_index * 3;
            let tail_len = self.decode_last_quartet(&buffer[read..read + 4], &mut scratch);
            buffer[write..write + tail_len].copy_from_slice(&scratch[..tail_len]);

            Ok(write + tail_len)
        }

        /// Decode base64 to bytes.
        #[cfg(feature = "alloc")]
        pub fn decode<T: AsRef<[u8]>>(&self, input: T) -> Result<Vec<u8>, Error> {
            fn inner(config: &Configuration, input_bytes: &[u8]) -> Result<Vec<u8>, Error> {
                let mut buffer = vec![0; config.decoded_len(input_bytes)?];

                let bytes_written = config.decode_slice(input_bytes, &mut buffer)?;
                buffer.truncate(bytes_written);

                Ok(buffer)
            }

            inner(self, input.as_ref())
        }

        /// Replace the base64 held in `buffer` with the decoded bytes.
        ///
        /// On error `buffer` is left untouched.
        #[cfg(feature = "alloc")]
        pub fn decode_vec_in_place(&self, buffer: &mut Vec<u8>) -> Result<(), Error> {
            let bytes_written = self.decode_in_place(buffer)?;
            buffer.truncate(bytes_written);
            Ok(())
        }
    }
}

pub(crate) mod error {
    /// Errors that can occur while encoding/decoding base64.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum Error {
        /// The length of the encoded input is not a multiple of 4, the size of a quartet. The
        /// offending length is provided.
        InvalidLength(usize),

        /// The provided slice is too small to hold the output.
        OutputSliceTooSmall,
    }

    impl core::fmt::Display for Error {
        fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
            match self {
                Self::InvalidLength(len) => {
                    write!(f, "Invalid input length: {len}, not a multiple of the block size")
                }
                Self::OutputSliceTooSmall => write!(f, "Output slice too small"),
            }
        }
    }

    #[cfg(feature = "std")]
    impl std::error::Error for Error {}

    /// Possible errors when building a [Configuration](crate::Configuration).
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum ParseAlphabetError {
        /// Alphabets must be 64 symbols long. The provided length is given.
        InvalidLength(usize),
        /// All symbols must be unique.
        DuplicatedByte(u8),
        /// All symbols, and the padding byte, must be printable ASCII.
        UnprintableByte(u8),
        /// The padding byte cannot also be a symbol.
        ReservedByte(u8),
    }

    impl core::fmt::Display for ParseAlphabetError {
        fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
            match self {
                Self::InvalidLength(len) => write!(f, "Invalid alphabet length: {len}"),
                Self::DuplicatedByte(b) => write!(f, "Duplicated byte: {b:#04x}"),
                Self::UnprintableByte(b) => write!(f, "Unprintable byte: {b:#04x}"),
                Self::ReservedByte(b) => write!(f, "Reserved padding byte: {b:#04x}"),
            }
        }
    }

    #[cfg(feature = "std")]
    impl std::error::Error for ParseAlphabetError {}
}
