//! Cryptographic primitives for MILE.
//!
//! Provides incremental SHA3-256 digest calculation over typed inputs and
//! Ed25519 key derivation, signing and verification.
//!
//! All crypto operations wrap established libraries. There is no custom
//! curve or hash code here.

pub mod digest;
pub mod scheme;
pub mod signer;

pub use digest::{DigestCalculator, DigestError, DigestInput};
pub use scheme::{Ed25519, KeyScheme};
pub use signer::{Signer, SignerError};

pub use mile_types::{Digest, PrivateKey, PublicKey, Seed, Signature};
