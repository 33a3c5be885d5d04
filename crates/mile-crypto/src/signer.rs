use std::fmt;
use std::io;

use mile_types::{Digest, EncodingConfig, PrivateKey, PublicKey, Seed, Signature};
use tracing::debug;

use crate::scheme::{Ed25519, KeyScheme};

/// Key material held by a [`Signer`].
///
/// A private key is never held without its public key.
#[derive(Clone, PartialEq, Eq)]
enum KeyMaterial {
    Empty,
    VerifyOnly(PublicKey),
    Full {
        private_key: PrivateKey,
        public_key: PublicKey,
    },
}

/// Holder of a private and/or public key that signs and verifies.
///
/// A signer is one of:
/// - empty: neither signs nor verifies,
/// - verify-only: holds a public key,
/// - full: holds a private key and its public key.
///
/// Key material is only ever replaced as a whole, so a private key is never
/// observable next to a public key it was not paired with.
#[derive(Clone)]
pub struct Signer<S: KeyScheme = Ed25519> {
    scheme: S,
    keys: KeyMaterial,
}

impl Signer<Ed25519> {
    /// A signer without keys.
    pub fn empty() -> Self {
        Self::empty_with(Ed25519)
    }

    /// Derive the key pair deterministically from `seed`.
    pub fn from_seed(seed: &Seed) -> Self {
        Self::from_seed_with(Ed25519, seed)
    }

    /// Generate a disposable random key pair.
    pub fn random() -> Self {
        Self::random_with(Ed25519)
    }

    /// Hold `private_key` and derive its public key.
    pub fn from_private_key(private_key: PrivateKey) -> Self {
        Self::from_private_key_with(Ed25519, private_key)
    }

    /// Verify-only signer.
    pub fn from_public_key(public_key: PublicKey) -> Self {
        Self::from_public_key_with(Ed25519, public_key)
    }

    /// Hold an explicit pair as given.
    pub fn from_pair(private_key: PrivateKey, public_key: PublicKey) -> Self {
        Self::from_pair_with(Ed25519, private_key, public_key)
    }
}

impl<S: KeyScheme> Signer<S> {
    /// A signer without keys using `scheme`.
    pub fn empty_with(scheme: S) -> Self {
        Self {
            scheme,
            keys: KeyMaterial::Empty,
        }
    }

    /// Derive the key pair from `seed` with `scheme`.
    pub fn from_seed_with(scheme: S, seed: &Seed) -> Self {
        let (private_key, public_key) = scheme.keypair_from_seed(seed);
        debug!(public_key = %public_key, "derived key pair from seed");
        Self::from_pair_with(scheme, private_key, public_key)
    }

    /// Generate a random key pair with `scheme`.
    pub fn random_with(scheme: S) -> Self {
        let (private_key, public_key) = scheme.random_keypair();
        debug!(public_key = %public_key, "generated random key pair");
        Self::from_pair_with(scheme, private_key, public_key)
    }

    /// Hold `private_key` and derive its public key with `scheme`.
    pub fn from_private_key_with(scheme: S, private_key: PrivateKey) -> Self {
        let public_key = scheme.public_from_private(&private_key);
        Self::from_pair_with(scheme, private_key, public_key)
    }

    /// Verify-only signer using `scheme`.
    pub fn from_public_key_with(scheme: S, public_key: PublicKey) -> Self {
        Self {
            scheme,
            keys: KeyMaterial::VerifyOnly(public_key),
        }
    }

    /// The pair is stored as given; the scheme is trusted to have produced
    /// matching keys.
    pub fn from_pair_with(scheme: S, private_key: PrivateKey, public_key: PublicKey) -> Self {
        Self {
            scheme,
            keys: KeyMaterial::Full {
                private_key,
                public_key,
            },
        }
    }

    /// Replace both keys with a fresh random pair.
    pub fn generate_random_keys(&mut self) {
        let (private_key, public_key) = self.scheme.random_keypair();
        debug!(public_key = %public_key, "replaced signer keys with random pair");
        self.keys = KeyMaterial::Full {
            private_key,
            public_key,
        };
    }

    /// Replace both keys with the given pair.
    pub fn set(&mut self, private_key: PrivateKey, public_key: PublicKey) {
        debug!(public_key = %public_key, "replaced signer keys");
        self.keys = KeyMaterial::Full {
            private_key,
            public_key,
        };
    }

    /// The public key, unless the signer is empty.
    pub fn public_key(&self) -> Option<&PublicKey> {
        match &self.keys {
            KeyMaterial::Empty => None,
            KeyMaterial::VerifyOnly(public_key) | KeyMaterial::Full { public_key, .. } => {
                Some(public_key)
            }
        }
    }

    /// The private key of a full signer.
    pub fn private_key(&self) -> Option<&PrivateKey> {
        match &self.keys {
            KeyMaterial::Full { private_key, .. } => Some(private_key),
            _ => None,
        }
    }

    /// Whether a private key is held.
    pub fn can_sign(&self) -> bool {
        matches!(self.keys, KeyMaterial::Full { .. })
    }

    /// Whether a public key is held.
    pub fn can_verify(&self) -> bool {
        !matches!(self.keys, KeyMaterial::Empty)
    }

    /// The injected key scheme.
    pub fn scheme(&self) -> &S {
        &self.scheme
    }

    /// Sign an arbitrary message.
    ///
    /// Fails with [`SignerError::MissingPrivateKey`] on an empty or
    /// verify-only signer.
    pub fn sign_message(&self, message: &[u8]) -> Result<Signature, SignerError> {
        match &self.keys {
            KeyMaterial::Full {
                private_key,
                public_key,
            } => Ok(self.scheme.sign(private_key, public_key, message)),
            _ => Err(SignerError::MissingPrivateKey),
        }
    }

    /// Sign the bytes of a digest.
    pub fn sign_digest(&self, digest: &Digest) -> Result<Signature, SignerError> {
        self.sign_message(digest.as_bytes())
    }

    /// Check a signature over a message.
    ///
    /// An invalid signature is `Ok(false)`; the only error is a signer that
    /// holds no public key.
    pub fn verify_message(
        &self,
        message: &[u8],
        signature: &Signature,
    ) -> Result<bool, SignerError> {
        let public_key = self.public_key().ok_or(SignerError::MissingPublicKey)?;
        Ok(self.scheme.verify(public_key, message, signature))
    }

    /// Check a signature over a digest.
    pub fn verify_digest(&self, digest: &Digest, signature: &Signature) -> Result<bool, SignerError> {
        self.verify_message(digest.as_bytes(), signature)
    }

    /// Write a textual summary of the key material.
    ///
    /// The private key is written only when `config.redact_secrets` is off.
    pub fn dump<W: io::Write>(&self, out: &mut W, config: &EncodingConfig) -> io::Result<()> {
        let encoding = config.text_encoding;
        match self.public_key() {
            Some(public_key) => writeln!(out, "public key:  {}", public_key.to_text(encoding))?,
            None => writeln!(out, "public key:  <none>")?,
        }
        match self.private_key() {
            Some(_) if config.redact_secrets => writeln!(out, "private key: <redacted>"),
            Some(private_key) => {
                writeln!(out, "private key: {}", private_key.to_text(encoding))
            }
            None => writeln!(out, "private key: <none>"),
        }
    }
}

impl Default for Signer<Ed25519> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<S: KeyScheme> PartialEq for Signer<S> {
    fn eq(&self, other: &Self) -> bool {
        self.keys == other.keys
    }
}

impl<S: KeyScheme> Eq for Signer<S> {}

impl<S: KeyScheme> fmt::Debug for Signer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.keys {
            KeyMaterial::Empty => write!(f, "Signer(empty)"),
            KeyMaterial::VerifyOnly(public_key) => {
                write!(f, "Signer(verify-only, {public_key:?})")
            }
            KeyMaterial::Full { public_key, .. } => {
                write!(f, "Signer({public_key:?}, private key <redacted>)")
            }
        }
    }
}

/// Errors from using a [`Signer`] that lacks the key an operation needs.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignerError {
    #[error("signer holds no private key")]
    MissingPrivateKey,
    #[error("signer holds no public key")]
    MissingPublicKey,
}
