// Copyright (c) The Meridian Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::Error;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::{rngs::OsRng, CryptoRng, RngCore};
use std::convert::TryInto;

/// An ed25519 key pair. Generation always goes through a CSPRNG; a
/// deterministic source may be supplied for tests via `generate_with_rng`.
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    pub fn generate() -> Self {
        Self::generate_with_rng(&mut OsRng)
    }

    pub fn generate_with_rng<R: CryptoRng + RngCore>(rng: &mut R) -> Self {
        Self {
            signing_key: SigningKey::generate(rng),
        }
    }

    pub fn from_private_key_hex(private_key: &str) -> Result<Self, Error> {
        let bytes = hex::decode(private_key)
            .map_err(|e| Error::InvalidKey(format!("private key is not hex: {}", e)))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| Error::InvalidKey("private key must be 32 bytes".into()))?;
        Ok(Self {
            signing_key: SigningKey::from_bytes(&bytes),
        })
    }

    pub fn private_key_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.signing_key.verifying_key().to_bytes())
    }

    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

pub fn verify(public_key: &[u8; 32], message: &[u8], signature: &[u8; 64]) -> Result<(), Error> {
    let key = VerifyingKey::from_bytes(public_key)
        .map_err(|e| Error::InvalidKey(format!("public key: {}", e)))?;
    key.verify(message, &Signature::from_bytes(signature))
        .map_err(|e| Error::InvalidKey(format!("signature verification failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn sign_and_verify_round_trip() {
        let pair = KeyPair::generate();
        let signature = pair.sign(b"genesis payload");
        verify(&pair.public_key_bytes(), b"genesis payload", &signature).unwrap();
        assert!(verify(&pair.public_key_bytes(), b"other payload", &signature).is_err());
    }

    #[test]
    fn hex_round_trip_preserves_identity() {
        let pair = KeyPair::generate();
        let restored = KeyPair::from_private_key_hex(&pair.private_key_hex()).unwrap();
        assert_eq!(pair.public_key_hex(), restored.public_key_hex());
    }

    #[test]
    fn seeded_rng_is_deterministic() {
        let mut a = rand::rngs::StdRng::from_seed([7u8; 32]);
        let mut b = rand::rngs::StdRng::from_seed([7u8; 32]);
        assert_eq!(
            KeyPair::generate_with_rng(&mut a).public_key_hex(),
            KeyPair::generate_with_rng(&mut b).public_key_hex()
        );
    }
}
