// Copyright (c) The Meridian Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::{hash, Error, NetworkType};
use serde::{Deserialize, Serialize};
use std::fmt;

const ADDRESS_LEN: usize = 25;
const CHECKSUM_LEN: usize = 4;

/// A base58 account address: one network version byte, a 20-byte
/// ripemd160(sha3-256(public key)) digest, and a 4-byte sha3 checksum.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn from_public_key(network: NetworkType, public_key: &[u8]) -> Self {
        let digest = hash::ripemd160(&hash::sha3_256(public_key));
        let mut bytes = Vec::with_capacity(ADDRESS_LEN);
        bytes.push(network.version_byte());
        bytes.extend_from_slice(&digest);
        let checksum = hash::sha3_256(&bytes);
        bytes.extend_from_slice(&checksum[..CHECKSUM_LEN]);
        Address(bs58::encode(&bytes).into_string())
    }

    /// Re-validates length, network version byte, and checksum.
    pub fn from_encoded(network: NetworkType, encoded: &str) -> Result<Self, Error> {
        let bytes = bs58::decode(encoded)
            .into_vec()
            .map_err(|e| Error::InvalidAddress(encoded.into(), e.to_string()))?;
        if bytes.len() != ADDRESS_LEN {
            return Err(Error::InvalidAddress(
                encoded.into(),
                format!("expected {} bytes, found {}", ADDRESS_LEN, bytes.len()),
            ));
        }
        if bytes[0] != network.version_byte() {
            return Err(Error::InvalidAddress(
                encoded.into(),
                format!(
                    "version byte {:#04x} does not match network {}",
                    bytes[0], network
                ),
            ));
        }
        let checksum = hash::sha3_256(&bytes[..ADDRESS_LEN - CHECKSUM_LEN]);
        if checksum[..CHECKSUM_LEN] != bytes[ADDRESS_LEN - CHECKSUM_LEN..] {
            return Err(Error::InvalidAddress(encoded.into(), "bad checksum".into()));
        }
        Ok(Address(encoded.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        // Only constructed from validated or derived encodings.
        bs58::decode(&self.0).into_vec().unwrap_or_default()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
