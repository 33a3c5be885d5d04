//! Foundation types for MILE.
//!
//! This crate provides the typed byte buffers and text/numeric codecs used
//! throughout the MILE primitives. `mile-crypto` builds on it.
//!
//! # Key Types
//!
//! - [`FixedBuffer`]: exactly N bytes with hex and Base58Check codecs
//! - [`Digest`], [`Hash`], [`Seed`], [`PrivateKey`], [`PublicKey`],
//!   [`Signature`]: distinct buffer types for each domain value
//! - [`base58check`]: checksummed text codec for manual transcription
//! - [`numeric`]: 64/256-bit integer serialization with explicit endianness
//! - [`EncodingConfig`]: how buffers are rendered as text

pub mod base58check;
pub mod buffer;
pub mod config;
pub mod error;
pub mod kinds;
pub mod numeric;

pub use alloy_primitives::U256;
pub use buffer::{BufferKind, FixedBuffer};
pub use config::{EncodingConfig, TextEncoding};
pub use error::TypeError;
pub use kinds::{
    Digest, DigestKind, Hash, HashKind, PrivateKey, PrivateKeyKind, PublicKey, PublicKeyKind,
    Seed, SeedKind, Signature, SignatureKind, DIGEST_SIZE, HASH_SIZE, PRIVATE_KEY_SIZE,
    PUBLIC_KEY_SIZE, SEED_SIZE, SIGNATURE_SIZE,
};
pub use numeric::{Endian, NumberBase};
