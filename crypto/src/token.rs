// Copyright (c) The Meridian Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::{hash, Address};

/// Derives a token id from a nonce (the network's genesis hash seed) and
/// the owning address: the first 8 bytes of sha3-256(nonce || address),
/// rendered as a 0x-prefixed 16-hex-digit id. Deterministic for a given
/// seed and owner, so regeneration reproduces the same id.
pub fn derive_token_id(seed: &[u8], owner: &Address) -> String {
    let mut input = Vec::with_capacity(seed.len() + 25);
    input.extend_from_slice(seed);
    input.extend_from_slice(&owner.to_bytes());
    let digest = hash::sha3_256(&input);
    format!("0x{}", hex::encode(&digest[..8]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{KeyPair, NetworkType};

    #[test]
    fn token_id_is_deterministic_and_seed_sensitive() {
        let pair = KeyPair::generate();
        let owner = Address::from_public_key(NetworkType::PrivateTest, &pair.public_key_bytes());
        let id = derive_token_id(b"seed-a", &owner);
        assert_eq!(id, derive_token_id(b"seed-a", &owner));
        assert_ne!(id, derive_token_id(b"seed-b", &owner));
        assert_eq!(id.len(), 18);
        assert!(id.starts_with("0x"));
    }
}
