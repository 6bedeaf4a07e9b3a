// Copyright (c) The Meridian Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::{Address, Error, KeyPair, NetworkType};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

/// A generated identity: hex-encoded ed25519 key material plus the
/// network-versioned address derived from the public key. Generated once
/// and never mutated afterwards.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Account {
    pub private_key: String,
    pub public_key: String,
    pub address: Address,
}

impl Account {
    pub fn generate(network: NetworkType) -> Self {
        Self::from_key_pair(network, &KeyPair::generate())
    }

    pub fn generate_with_rng<R: CryptoRng + RngCore>(network: NetworkType, rng: &mut R) -> Self {
        Self::from_key_pair(network, &KeyPair::generate_with_rng(rng))
    }

    fn from_key_pair(network: NetworkType, pair: &KeyPair) -> Self {
        Self {
            private_key: pair.private_key_hex(),
            public_key: pair.public_key_hex(),
            address: Address::from_public_key(network, &pair.public_key_bytes()),
        }
    }

    pub fn key_pair(&self) -> Result<KeyPair, Error> {
        KeyPair::from_private_key_hex(&self.private_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_key_pair_matches_recorded_keys() {
        let account = Account::generate(NetworkType::PrivateTest);
        let pair = account.key_pair().unwrap();
        assert_eq!(pair.public_key_hex(), account.public_key);
        assert_eq!(
            Address::from_public_key(NetworkType::PrivateTest, &pair.public_key_bytes()),
            account.address
        );
    }

    #[test]
    fn accounts_are_independent() {
        let a = Account::generate(NetworkType::Test);
        let b = Account::generate(NetworkType::Test);
        assert_ne!(a.private_key, b.private_key);
        assert_ne!(a.address, b.address);
    }
}
