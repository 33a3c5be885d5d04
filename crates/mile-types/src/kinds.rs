//! Domain buffer types.
//!
//! Every type here is a [`FixedBuffer`] with its own kind marker, so a
//! `PublicKey` can never be passed where a `Digest` is expected even though
//! both are 32 bytes.

use sha3::{Digest as _, Sha3_256};

use crate::buffer::{BufferKind, FixedBuffer};

/// SHA3-256 output size.
pub const DIGEST_SIZE: usize = 32;
/// Seed size used for deterministic key derivation.
pub const SEED_SIZE: usize = 32;
/// Expanded Ed25519 private key (clamped scalar || nonce prefix).
pub const PRIVATE_KEY_SIZE: usize = 64;
/// Compressed Ed25519 point.
pub const PUBLIC_KEY_SIZE: usize = 32;
/// Ed25519 signature (R || S).
pub const SIGNATURE_SIZE: usize = 64;
/// Generic 256-bit hash.
pub const HASH_SIZE: usize = 32;

macro_rules! buffer_kind {
    ($(#[$meta:meta])* $alias:ident, $kind:ident, $size:expr, secret = $secret:expr) => {
        #[doc = concat!("Kind marker for [`", stringify!($alias), "`].")]
        #[derive(Debug)]
        pub enum $kind {}

        impl BufferKind for $kind {
            const NAME: &'static str = stringify!($alias);
            const SECRET: bool = $secret;
        }

        $(#[$meta])*
        pub type $alias = FixedBuffer<$size, $kind>;
    };
}

buffer_kind!(
    /// A 256-bit hash value.
    Hash, HashKind, HASH_SIZE, secret = false
);
buffer_kind!(
    /// Output of a finalized digest calculation.
    Digest, DigestKind, DIGEST_SIZE, secret = false
);
buffer_kind!(
    /// Ed25519 private key in expanded form.
    PrivateKey, PrivateKeyKind, PRIVATE_KEY_SIZE, secret = true
);
buffer_kind!(
    /// Ed25519 public key.
    PublicKey, PublicKeyKind, PUBLIC_KEY_SIZE, secret = false
);
buffer_kind!(
    /// Ed25519 signature.
    Signature, SignatureKind, SIGNATURE_SIZE, secret = false
);
buffer_kind!(
    /// Secret material a key pair is deterministically derived from.
    Seed, SeedKind, SEED_SIZE, secret = true
);

impl FixedBuffer<SEED_SIZE, SeedKind> {
    /// Derive a seed from a secret phrase: the SHA3-256 of its UTF-8 bytes.
    pub fn from_phrase(phrase: &str) -> Self {
        Self::from_array(Sha3_256::digest(phrase.as_bytes()).into())
    }
}
