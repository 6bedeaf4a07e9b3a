// Copyright (c) The Meridian Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::preset::NodeRole;
use meridian_crypto::{Account, Address, NetworkType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One ordered share of a token's supply. Entry 0 of a distribution is
/// the residual entry: it absorbs the integer-division remainder and any
/// opt-in deductions.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TokenDistributionEntry {
    pub address: Address,
    pub amount: u64,
}

/// Generated identities for one configured node.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct NodeAccount {
    pub name: String,
    pub friendly_name: String,
    pub roles: Vec<NodeRole>,
    pub signing: Account,
    pub vrf: Account,
    pub certificate_name: String,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct GatewayAccount {
    pub name: String,
    pub account: Account,
}

/// The full generated-identity output for one target. Persisted once as
/// `addresses.yml` and reused on later runs unless a reset is requested,
/// so regeneration is fully reproducible.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AddressesRecord {
    pub network_type: NetworkType,
    pub genesis_hash_seed: String,
    pub nodes: Vec<NodeAccount>,
    pub gateways: Vec<GatewayAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genesis_signer: Option<Account>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub token_beneficiaries: BTreeMap<String, Vec<Account>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub token_distributions: BTreeMap<String, Vec<TokenDistributionEntry>>,
}

impl AddressesRecord {
    pub fn node(&self, name: &str) -> Option<&NodeAccount> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn seed_bytes(&self) -> Result<Vec<u8>, crate::Error> {
        hex::decode(&self.genesis_hash_seed)
            .map_err(|e| crate::Error::GenesisHashSeed(e.to_string()))
    }
}
