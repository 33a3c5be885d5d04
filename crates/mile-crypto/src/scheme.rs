//! Key derivation and signature primitives behind [`Signer`](crate::Signer).
//!
//! The curve arithmetic is treated as a black box reached through the
//! [`KeyScheme`] capability. [`Ed25519`] is the production scheme; tests
//! can inject a deterministic fake.

use ed25519_dalek::hazmat::{raw_sign, ExpandedSecretKey};
use ed25519_dalek::{Verifier, VerifyingKey};
use mile_types::{PrivateKey, PublicKey, Seed, Signature, PRIVATE_KEY_SIZE, SEED_SIZE};
use rand::RngCore;
use sha2::{Digest as _, Sha512};
use tracing::warn;
use zeroize::Zeroize;

/// Asymmetric key and signature operations.
pub trait KeyScheme {
    /// Derive a key pair from a seed. The same seed always yields the same
    /// pair.
    fn keypair_from_seed(&self, seed: &Seed) -> (PrivateKey, PublicKey);

    /// Generate a fresh key pair from a secure random source.
    fn random_keypair(&self) -> (PrivateKey, PublicKey);

    /// Recover the public key of a private key (`scalar_mult_base`).
    fn public_from_private(&self, private_key: &PrivateKey) -> PublicKey;

    /// Sign `message` with a private key and its matching public key.
    fn sign(&self, private_key: &PrivateKey, public_key: &PublicKey, message: &[u8])
        -> Signature;

    /// `true` iff `signature` is a valid signature of `message` under
    /// `public_key`.
    fn verify(&self, public_key: &PublicKey, message: &[u8], signature: &Signature) -> bool;
}

/// Ed25519 with expanded 64-byte private keys.
///
/// A private key is `SHA-512(seed)` with the lower half clamped into the
/// signing scalar; the upper half is the nonce prefix. Signatures follow
/// RFC 8032, so they verify with any conforming Ed25519 implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Ed25519;

impl Ed25519 {
    fn expand(seed: &[u8; SEED_SIZE]) -> PrivateKey {
        let mut hash = Sha512::digest(seed);
        let mut private_key = PrivateKey::new();
        private_key.as_bytes_mut().copy_from_slice(hash.as_slice());
        hash.as_mut_slice().zeroize();

        let scalar = private_key.as_bytes_mut();
        scalar[0] &= 248;
        scalar[31] &= 63;
        scalar[31] |= 64;
        private_key
    }

    fn expanded_secret(private_key: &PrivateKey) -> ExpandedSecretKey {
        let bytes: &[u8; PRIVATE_KEY_SIZE] = private_key.as_bytes();
        ExpandedSecretKey::from_bytes(bytes)
    }
}

impl KeyScheme for Ed25519 {
    fn keypair_from_seed(&self, seed: &Seed) -> (PrivateKey, PublicKey) {
        let private_key = Self::expand(seed.as_bytes());
        let public_key = self.public_from_private(&private_key);
        (private_key, public_key)
    }

    fn random_keypair(&self) -> (PrivateKey, PublicKey) {
        let mut seed = Seed::new();
        rand::thread_rng().fill_bytes(seed.as_bytes_mut());
        self.keypair_from_seed(&seed)
    }

    fn public_from_private(&self, private_key: &PrivateKey) -> PublicKey {
        let esk = Self::expanded_secret(private_key);
        PublicKey::from_array(VerifyingKey::from(&esk).to_bytes())
    }

    fn sign(
        &self,
        private_key: &PrivateKey,
        public_key: &PublicKey,
        message: &[u8],
    ) -> Signature {
        let esk = Self::expanded_secret(private_key);
        let signature = match VerifyingKey::from_bytes(public_key.as_bytes()) {
            Ok(verifying_key) => raw_sign::<Sha512>(&esk, message, &verifying_key),
            // A stored public key that is not a curve point cannot be the
            // pair of this private key; sign under the derived one instead.
            Err(err) => {
                warn!(
                    public_key = %public_key,
                    error = %err,
                    "public key is not a curve point, signing under the derived key"
                );
                raw_sign::<Sha512>(&esk, message, &VerifyingKey::from(&esk))
            }
        };
        Signature::from_array(signature.to_bytes())
    }

    fn verify(&self, public_key: &PublicKey, message: &[u8], signature: &Signature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(public_key.as_bytes()) else {
            return false;
        };
        let signature = ed25519_dalek::Signature::from_bytes(signature.as_bytes());
        verifying_key.verify(message, &signature).is_ok()
    }
}
