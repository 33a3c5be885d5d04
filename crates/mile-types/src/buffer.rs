use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;

use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::base58check;
use crate::config::TextEncoding;
use crate::error::TypeError;

/// Marker describing what a [`FixedBuffer`] holds.
///
/// Each kind is an uninhabited type, so `FixedBuffer<32, DigestKind>` and
/// `FixedBuffer<32, PublicKeyKind>` are distinct types that cannot be
/// compared or assigned to one another.
pub trait BufferKind {
    /// Name used in `Debug` output.
    const NAME: &'static str;
    /// Secret buffers are redacted in `Debug` output.
    const SECRET: bool = false;
}

/// Exactly `N` bytes of typed data.
///
/// All-zero is the empty value (see [`FixedBuffer::is_zero`]). The contents
/// are wiped when the buffer is dropped.
pub struct FixedBuffer<const N: usize, K: BufferKind> {
    data: [u8; N],
    kind: PhantomData<fn() -> K>,
}

impl<const N: usize, K: BufferKind> FixedBuffer<N, K> {
    /// Size of the buffer in bytes.
    pub const SIZE: usize = N;

    /// An all-zero buffer.
    pub const fn new() -> Self {
        Self::from_array([0u8; N])
    }

    /// Wrap an array of exactly `N` bytes.
    pub const fn from_array(data: [u8; N]) -> Self {
        Self {
            data,
            kind: PhantomData,
        }
    }

    /// Copy a slice that must be exactly `N` bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TypeError> {
        let mut buffer = Self::new();
        buffer.set(bytes)?;
        Ok(buffer)
    }

    /// Parse exactly `2N` hex characters.
    pub fn from_hex(text: &str) -> Result<Self, TypeError> {
        let mut buffer = Self::new();
        buffer.set_hex_string(text)?;
        Ok(buffer)
    }

    /// Parse a Base58Check string carrying exactly `N` payload bytes.
    pub fn from_base58check(text: &str) -> Result<Self, TypeError> {
        let mut buffer = Self::new();
        buffer.set_base58check_string(text)?;
        Ok(buffer)
    }

    /// Parse text in the given encoding.
    pub fn from_text(text: &str, encoding: TextEncoding) -> Result<Self, TypeError> {
        match encoding {
            TextEncoding::Hex => Self::from_hex(text),
            TextEncoding::Base58check => Self::from_base58check(text),
        }
    }

    /// Size of the buffer in bytes.
    pub const fn size(&self) -> usize {
        N
    }

    /// Overwrite every byte with zero.
    pub fn clear(&mut self) {
        self.data.zeroize();
    }

    /// `true` if every byte is zero.
    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|b| *b == 0)
    }

    /// Replace the contents with `bytes`, which must be exactly `N` long.
    ///
    /// On error the buffer is left unchanged.
    pub fn set(&mut self, bytes: &[u8]) -> Result<(), TypeError> {
        if bytes.len() != N {
            return Err(TypeError::InvalidLength {
                expected: N,
                actual: bytes.len(),
            });
        }
        self.data.copy_from_slice(bytes);
        Ok(())
    }

    /// Replace the contents with the `N` bytes of `bytes` starting at `offset`.
    pub fn set_at(&mut self, bytes: &[u8], offset: usize) -> Result<(), TypeError> {
        let window = offset
            .checked_add(N)
            .and_then(|end| bytes.get(offset..end))
            .ok_or(TypeError::OffsetOutOfRange {
                offset,
                size: N,
                available: bytes.len(),
            })?;
        self.data.copy_from_slice(window);
        Ok(())
    }

    /// Replace the contents from exactly `2N` hex characters (either case).
    ///
    /// Decoding is all-or-nothing: the buffer is only written once every
    /// pair has been validated.
    pub fn set_hex_string(&mut self, text: &str) -> Result<(), TypeError> {
        if text.is_empty() {
            return Err(TypeError::EmptyHex);
        }
        if text.len() != N * 2 {
            return Err(TypeError::InvalidHexLength {
                expected: N * 2,
                actual: text.len(),
            });
        }

        let mut decoded = [0u8; N];
        let result = hex::decode_to_slice(text, &mut decoded).map_err(|e| match e {
            hex::FromHexError::InvalidHexCharacter { index, .. } => {
                let start = index - index % 2;
                let symbol = text
                    .as_bytes()
                    .get(start..(start + 2).min(text.len()))
                    .map(|pair| String::from_utf8_lossy(pair).into_owned())
                    .unwrap_or_default();
                TypeError::InvalidHexDigit {
                    position: index / 2,
                    symbol,
                }
            }
            _ => TypeError::InvalidHexLength {
                expected: N * 2,
                actual: text.len(),
            },
        });
        if result.is_ok() {
            self.data = decoded;
        }
        decoded.zeroize();
        result
    }

    /// Replace the contents from a Base58Check string.
    pub fn set_base58check_string(&mut self, text: &str) -> Result<(), TypeError> {
        base58check::decode_into(text, &mut self.data)
    }

    /// Lowercase hex, exactly `2N` characters.
    pub fn to_hex_string(&self) -> String {
        hex::encode(self.data)
    }

    /// Base58Check text of the contents.
    pub fn to_base58check_string(&self) -> String {
        base58check::encode(&self.data)
    }

    /// Render the contents in the given encoding.
    pub fn to_text(&self, encoding: TextEncoding) -> String {
        match encoding {
            TextEncoding::Hex => self.to_hex_string(),
            TextEncoding::Base58check => self.to_base58check_string(),
        }
    }

    /// Append the `N` bytes to `out`.
    pub fn append_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.data);
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8; N] {
        &self.data
    }

    /// Mutable access to the raw bytes. The length cannot change.
    pub fn as_bytes_mut(&mut self) -> &mut [u8; N] {
        &mut self.data
    }

    /// Copy the bytes into a new vector.
    pub fn to_vec(&self) -> Vec<u8> {
        self.data.to_vec()
    }
}

impl<const N: usize, K: BufferKind> Default for FixedBuffer<N, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize, K: BufferKind> Clone for FixedBuffer<N, K> {
    fn clone(&self) -> Self {
        Self::from_array(self.data)
    }
}

impl<const N: usize, K: BufferKind> Zeroize for FixedBuffer<N, K> {
    fn zeroize(&mut self) {
        self.data.zeroize();
    }
}

impl<const N: usize, K: BufferKind> Drop for FixedBuffer<N, K> {
    fn drop(&mut self) {
        self.data.zeroize();
    }
}

impl<const N: usize, K: BufferKind> ZeroizeOnDrop for FixedBuffer<N, K> {}

impl<const N: usize, K: BufferKind> PartialEq for FixedBuffer<N, K> {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl<const N: usize, K: BufferKind> Eq for FixedBuffer<N, K> {}

impl<const N: usize, K: BufferKind> PartialOrd for FixedBuffer<N, K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<const N: usize, K: BufferKind> Ord for FixedBuffer<N, K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.data.cmp(&other.data)
    }
}

impl<const N: usize, K: BufferKind> Hash for FixedBuffer<N, K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.data.hash(state);
    }
}

impl<const N: usize, K: BufferKind> AsRef<[u8]> for FixedBuffer<N, K> {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl<const N: usize, K: BufferKind> From<[u8; N]> for FixedBuffer<N, K> {
    fn from(data: [u8; N]) -> Self {
        Self::from_array(data)
    }
}

impl<const N: usize, K: BufferKind> TryFrom<&[u8]> for FixedBuffer<N, K> {
    type Error = TypeError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_slice(bytes)
    }
}

impl<const N: usize, K: BufferKind> FromStr for FixedBuffer<N, K> {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58check(s)
    }
}

impl<const N: usize, K: BufferKind> fmt::Debug for FixedBuffer<N, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if K::SECRET {
            write!(f, "{}(<redacted>)", K::NAME)
        } else {
            write!(f, "{}({}...)", K::NAME, hex::encode(&self.data[..N.min(8)]))
        }
    }
}

impl<const N: usize, K: BufferKind> fmt::Display for FixedBuffer<N, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58check_string())
    }
}

impl<const N: usize, K: BufferKind> Serialize for FixedBuffer<N, K> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_base58check_string())
        } else {
            serializer.serialize_bytes(&self.data)
        }
    }
}

impl<'de, const N: usize, K: BufferKind> Deserialize<'de> for FixedBuffer<N, K> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let visitor = BufferVisitor::<N, K>(PhantomData);
        if deserializer.is_human_readable() {
            deserializer.deserialize_str(visitor)
        } else {
            deserializer.deserialize_bytes(visitor)
        }
    }
}

struct BufferVisitor<const N: usize, K>(PhantomData<fn() -> K>);

impl<'de, const N: usize, K: BufferKind> Visitor<'de> for BufferVisitor<N, K> {
    type Value = FixedBuffer<N, K>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a base58check string or {N} bytes")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        FixedBuffer::from_base58check(v).map_err(E::custom)
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
        FixedBuffer::from_slice(v).map_err(E::custom)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut data = [0u8; N];
        for (i, slot) in data.iter_mut().enumerate() {
            *slot = seq
                .next_element()?
                .ok_or_else(|| de::Error::invalid_length(i, &self))?;
        }
        if seq.next_element::<u8>()?.is_some() {
            return Err(de::Error::invalid_length(N + 1, &self));
        }
        Ok(FixedBuffer::from_array(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    enum TestKind {}

    impl BufferKind for TestKind {
        const NAME: &'static str = "Test";
    }

    enum SecretKind {}

    impl BufferKind for SecretKind {
        const NAME: &'static str = "Secret";
        const SECRET: bool = true;
    }

    type Buf4 = FixedBuffer<4, TestKind>;
    type Buf32 = FixedBuffer<32, TestKind>;

    #[test]
    fn new_is_zero() {
        let b = Buf32::new();
        assert!(b.is_zero());
        assert_eq!(b.size(), 32);
        assert_eq!(Buf32::SIZE, 32);
        assert_eq!(b, Buf32::default());
    }

    #[test]
    fn clear_zeroes_contents() {
        let mut b = Buf4::from_array([1, 2, 3, 4]);
        assert!(!b.is_zero());
        b.clear();
        assert!(b.is_zero());
    }

    #[test]
    fn set_rejects_wrong_length_and_leaves_buffer() {
        let mut b = Buf4::from_array([9, 9, 9, 9]);
        let err = b.set(&[1, 2, 3]).unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidLength {
                expected: 4,
                actual: 3
            }
        );
        assert_eq!(b.as_bytes(), &[9, 9, 9, 9]);
    }

    #[test]
    fn set_at_offset() {
        let mut b = Buf4::new();
        b.set_at(&[0, 1, 2, 3, 4, 5], 2).unwrap();
        assert_eq!(b.as_bytes(), &[2, 3, 4, 5]);

        let err = b.set_at(&[0, 1, 2, 3, 4, 5], 3).unwrap_err();
        assert_eq!(
            err,
            TypeError::OffsetOutOfRange {
                offset: 3,
                size: 4,
                available: 6
            }
        );
        assert_eq!(b.as_bytes(), &[2, 3, 4, 5]);
        assert!(b.set_at(&[0; 8], usize::MAX).is_err());
    }

    #[test]
    fn hex_is_lowercase_and_accepts_uppercase() {
        let b = Buf4::from_array([0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(b.to_hex_string(), "deadbeef");
        assert_eq!(Buf4::from_hex("DEADBEEF").unwrap(), b);
    }

    #[test]
    fn hex_errors() {
        assert_eq!(Buf4::from_hex(""), Err(TypeError::EmptyHex));
        assert_eq!(
            Buf4::from_hex("abc"),
            Err(TypeError::InvalidHexLength {
                expected: 8,
                actual: 3
            })
        );
        assert_eq!(
            Buf4::from_hex("0011zz33"),
            Err(TypeError::InvalidHexDigit {
                position: 2,
                symbol: "zz".into()
            })
        );
    }

    #[test]
    fn hex_failure_does_not_partially_write() {
        let mut b = Buf4::from_array([1, 1, 1, 1]);
        assert!(b.set_hex_string("ffffffzz").is_err());
        assert_eq!(b.as_bytes(), &[1, 1, 1, 1]);
    }

    #[test]
    fn hex_non_ascii_does_not_panic() {
        let err = Buf4::from_hex("00\u{e9}0000").unwrap_err();
        assert!(err.is_encoding_error());
    }

    #[test]
    fn base58check_roundtrip_and_size_check() {
        let b = Buf32::from_array([42; 32]);
        let text = b.to_base58check_string();
        assert_eq!(Buf32::from_base58check(&text).unwrap(), b);
        assert_eq!(text.parse::<Buf32>().unwrap(), b);
        assert_eq!(b.to_string(), text);

        let err = Buf4::from_base58check(&text).unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidLength {
                expected: 4,
                actual: 32
            }
        );
    }

    #[test]
    fn text_encoding_dispatch() {
        let b = Buf4::from_array([1, 2, 3, 4]);
        assert_eq!(b.to_text(TextEncoding::Hex), "01020304");
        for encoding in [TextEncoding::Hex, TextEncoding::Base58check] {
            assert_eq!(Buf4::from_text(&b.to_text(encoding), encoding).unwrap(), b);
        }
    }

    #[test]
    fn append_to_extends() {
        let b = Buf4::from_array([1, 2, 3, 4]);
        let mut out = vec![0];
        b.append_to(&mut out);
        b.append_to(&mut out);
        assert_eq!(out, vec![0, 1, 2, 3, 4, 1, 2, 3, 4]);
    }

    #[test]
    fn ordering_is_lexicographic() {
        let a = Buf4::from_array([0, 0, 0, 1]);
        let b = Buf4::from_array([0, 0, 1, 0]);
        assert!(a < b);
        assert_eq!(a.cmp(&a.clone()), Ordering::Equal);
    }

    #[test]
    fn clone_does_not_alias() {
        let a = Buf4::from_array([1, 2, 3, 4]);
        let mut b = a.clone();
        b.as_bytes_mut()[0] = 0xff;
        assert_eq!(a.as_bytes()[0], 1);
        assert_ne!(a, b);
    }

    #[test]
    fn debug_redacts_secret_kinds() {
        let public = Buf32::from_array([0xab; 32]);
        assert_eq!(format!("{public:?}"), "Test(abababababababab...)");

        let secret = FixedBuffer::<32, SecretKind>::from_array([0xab; 32]);
        let debug = format!("{secret:?}");
        assert!(debug.contains("redacted"));
        assert!(!debug.contains("ab"));
    }

    #[test]
    fn serde_json_uses_base58check() {
        let b = Buf32::from_array([7; 32]);
        let json = serde_json::to_string(&b).unwrap();
        assert_eq!(json, format!("\"{}\"", b.to_base58check_string()));
        let parsed: Buf32 = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, b);
    }

    #[test]
    fn serde_json_rejects_corrupt_text() {
        assert!(serde_json::from_str::<Buf32>("\"not-base58\"").is_err());
    }

    proptest! {
        #[test]
        fn hex_roundtrip(bytes in proptest::array::uniform32(any::<u8>())) {
            let b = Buf32::from_array(bytes);
            prop_assert_eq!(Buf32::from_hex(&b.to_hex_string()).unwrap(), b);
        }

        #[test]
        fn base58check_roundtrip(bytes in proptest::array::uniform32(any::<u8>())) {
            let b = Buf32::from_array(bytes);
            prop_assert_eq!(Buf32::from_base58check(&b.to_base58check_string()).unwrap(), b);
        }

        #[test]
        fn wrong_length_set_fails(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
            prop_assume!(bytes.len() != 32);
            let mut b = Buf32::from_array([5; 32]);
            prop_assert!(b.set(&bytes).is_err());
            prop_assert_eq!(b.as_bytes(), &[5u8; 32]);
        }
    }
}
