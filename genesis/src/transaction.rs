// Copyright (c) The Meridian Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! The canonical genesis-time transaction: a VRF key link binding a
//! node's VRF public key to its signing identity. The deadline is a
//! fixed constant so regeneration reproduces identical payload hashes
//! for the same inputs.

use crate::Error;
use meridian_crypto::{hash, KeyPair};
use serde::{Deserialize, Serialize};

/// Canonical deadline for every genesis transaction. Never wall-clock.
pub const GENESIS_DEADLINE: u64 = 1;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct VrfKeyLink {
    pub signer_public_key: String,
    pub vrf_public_key: String,
    pub deadline: u64,
}

impl VrfKeyLink {
    pub fn new(signer_public_key: &str, vrf_public_key: &str) -> Self {
        Self {
            signer_public_key: signer_public_key.into(),
            vrf_public_key: vrf_public_key.into(),
            deadline: GENESIS_DEADLINE,
        }
    }

    /// Signs the bcs payload with the genesis hash seed prepended as the
    /// domain separator, so signatures from different network instances
    /// never validate against each other.
    pub fn sign(self, seed: &[u8], pair: &KeyPair) -> Result<SignedTransaction, Error> {
        let payload = bcs::to_bytes(&self).map_err(|e| Error::Bcs("VrfKeyLink", e))?;
        let mut message = Vec::with_capacity(seed.len() + payload.len());
        message.extend_from_slice(seed);
        message.extend_from_slice(&payload);
        Ok(SignedTransaction {
            payload: self,
            signer_public_key: pair.public_key_hex(),
            signature: pair.sign(&message).to_vec(),
        })
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SignedTransaction {
    pub payload: VrfKeyLink,
    pub signer_public_key: String,
    #[serde(with = "serde_bytes")]
    pub signature: Vec<u8>,
}

impl SignedTransaction {
    /// Hash of the bcs payload only, used for duplicate detection within
    /// a batch.
    pub fn content_hash(&self) -> Result<String, Error> {
        let payload = bcs::to_bytes(&self.payload).map_err(|e| Error::Bcs("VrfKeyLink", e))?;
        Ok(hex::encode(hash::sha3_256(&payload)))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        bcs::to_bytes(self).map_err(|e| Error::Bcs("SignedTransaction", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_hash_is_deterministic_across_signers() {
        let link = VrfKeyLink::new("aa", "bb");
        let tx_a = link.clone().sign(b"seed", &KeyPair::generate()).unwrap();
        let tx_b = link.sign(b"seed", &KeyPair::generate()).unwrap();
        // Same payload, different signers: same content hash.
        assert_eq!(tx_a.content_hash().unwrap(), tx_b.content_hash().unwrap());
        assert_ne!(tx_a.signature, tx_b.signature);
    }

    #[test]
    fn different_payloads_have_different_hashes() {
        let pair = KeyPair::generate();
        let tx_a = VrfKeyLink::new("aa", "bb").sign(b"seed", &pair).unwrap();
        let tx_b = VrfKeyLink::new("aa", "cc").sign(b"seed", &pair).unwrap();
        assert_ne!(tx_a.content_hash().unwrap(), tx_b.content_hash().unwrap());
    }

    #[test]
    fn signature_is_domain_separated_by_seed() {
        let pair = KeyPair::generate();
        let link = VrfKeyLink::new("aa", "bb");
        let tx_a = link.clone().sign(b"seed-a", &pair).unwrap();
        let tx_b = link.sign(b"seed-b", &pair).unwrap();
        assert_ne!(tx_a.signature, tx_b.signature);
    }

    #[test]
    fn bcs_round_trip() {
        let tx = VrfKeyLink::new("aa", "bb")
            .sign(b"seed", &KeyPair::generate())
            .unwrap();
        let decoded: SignedTransaction = bcs::from_bytes(&tx.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, tx);
    }
}
