// Copyright (c) The Meridian Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::{addresses::AddressesRecord, Error, TokenDistributionEntry};
use meridian_crypto::{derive_token_id, NetworkType};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

/// Declarative description of a network: topology plus genesis rules.
/// Read-only input to generation; computed fields are backfilled by
/// [`NetworkPreset::finalize`] into a new [`FinalizedPreset`] value,
/// never by in-place mutation across phases.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NetworkPreset {
    pub network_type: NetworkType,
    #[serde(default)]
    pub network: NetworkDefaults,
    #[serde(default)]
    pub nodes: Vec<NodePreset>,
    #[serde(default)]
    pub databases: Vec<DatabasePreset>,
    #[serde(default)]
    pub gateways: Vec<GatewayPreset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genesis: Option<GenesisPreset>,
}

/// Network-wide values, the lowest-precedence configuration layer.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkDefaults {
    pub node_image: String,
    pub database_image: String,
    pub gateway_image: String,
    pub log_level: String,
    pub max_peers: u32,
    pub known_peers: KnownPeers,
}

impl Default for NetworkDefaults {
    fn default() -> Self {
        Self {
            node_image: "meridian/server:latest".into(),
            database_image: "mongo:4.4".into(),
            gateway_image: "meridian/rest:latest".into(),
            log_level: "info".into(),
            max_peers: 50,
            known_peers: KnownPeers::default(),
        }
    }
}

/// Externally declared static peers, appended after locally generated
/// nodes in each peer descriptor.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct KnownPeers {
    pub p2p: Vec<StaticPeer>,
    pub api: Vec<StaticPeer>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StaticPeer {
    pub public_key: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    #[serde(default)]
    pub roles: Vec<NodeRole>,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeRole {
    Peer,
    Api,
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRole::Peer => f.write_str("Peer"),
            NodeRole::Api => f.write_str("Api"),
        }
    }
}

fn default_roles() -> Vec<NodeRole> {
    vec![NodeRole::Peer]
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NodePreset {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    #[serde(default = "default_roles")]
    pub roles: Vec<NodeRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broker_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_port: Option<OpenPort>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broker_open_port: Option<OpenPort>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_peers: Option<u32>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DatabasePreset {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_port: Option<OpenPort>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GatewayPreset {
    pub name: String,
    pub database_host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_port: Option<OpenPort>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_address: Option<String>,
}

/// Open-port flag: `true` publishes the internal port on itself, a
/// number or string publishes the internal port on that external value,
/// `false`/absent publishes nothing.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum OpenPort {
    Flag(bool),
    Number(u16),
    Value(String),
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GenesisPreset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genesis_hash_seed: Option<String>,
    pub tokens: Vec<TokenPreset>,
    /// Opt-in balances: address -> amount, deducted from the residual
    /// entry of the primary token's distribution.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub balances: BTreeMap<String, u64>,
    /// Opt-in transactions: logical key -> hex payload. Persisted and
    /// counted, never supply-affecting.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub transactions: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TokenPreset {
    pub name: String,
    pub supply: u64,
    /// Number of beneficiary accounts to auto-generate for this token.
    #[serde(default)]
    pub accounts: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distributions: Option<Vec<TokenDistributionEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
}

impl NetworkPreset {
    /// Backfills every computed field from the generated addresses record
    /// (genesis hash seed, derived token ids, friendly names) and returns
    /// the result as an immutable finalized preset. Downstream phases
    /// only ever read the finalized value.
    pub fn finalize(mut self, addresses: &AddressesRecord) -> Result<FinalizedPreset, Error> {
        for node in &mut self.nodes {
            if node.friendly_name.is_none() {
                node.friendly_name = addresses
                    .node(&node.name)
                    .map(|account| account.friendly_name.clone());
            }
        }

        if let Some(genesis) = self.genesis.as_mut() {
            genesis.genesis_hash_seed = Some(addresses.genesis_hash_seed.clone());
            let seed = addresses.seed_bytes()?;
            for token in &mut genesis.tokens {
                if token.token_id.is_some() {
                    continue;
                }
                let owner = addresses
                    .token_beneficiaries
                    .get(&token.name)
                    .and_then(|accounts| accounts.first())
                    .or(addresses.genesis_signer.as_ref())
                    .ok_or(Error::Missing("token owner account"))?;
                token.token_id = Some(derive_token_id(&seed, &owner.address));
            }
        }

        Ok(FinalizedPreset(self))
    }
}

/// A preset whose computed fields have all been backfilled. Only
/// constructed by [`NetworkPreset::finalize`]; read-only afterwards.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(transparent)]
pub struct FinalizedPreset(NetworkPreset);

impl FinalizedPreset {
    pub fn network_type(&self) -> NetworkType {
        self.0.network_type
    }

    pub fn network(&self) -> &NetworkDefaults {
        &self.0.network
    }

    pub fn nodes(&self) -> &[NodePreset] {
        &self.0.nodes
    }

    pub fn databases(&self) -> &[DatabasePreset] {
        &self.0.databases
    }

    pub fn gateways(&self) -> &[GatewayPreset] {
        &self.0.gateways
    }

    pub fn genesis(&self) -> Option<&GenesisPreset> {
        self.0.genesis.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PersistableConfig;

    const MINIMAL_PRESET: &str = r#"
network_type: private-test
nodes:
  - name: node-0
    roles: [peer, api]
    database_host: db-0
databases:
  - name: db-0
gateways:
  - name: gateway-0
    database_host: db-0
"#;

    #[test]
    fn minimal_preset_parses_with_defaults() {
        let preset = NetworkPreset::parse(MINIMAL_PRESET).unwrap();
        assert_eq!(preset.network_type, NetworkType::PrivateTest);
        assert_eq!(preset.network.max_peers, 50);
        assert_eq!(preset.network.log_level, "info");
        assert!(preset.genesis.is_none());
        assert_eq!(preset.nodes[0].roles, vec![NodeRole::Peer, NodeRole::Api]);
    }

    #[test]
    fn open_port_accepts_flag_number_and_string() {
        let preset: NetworkPreset = NetworkPreset::parse(
            r#"
network_type: private
nodes:
  - name: a
    open_port: true
  - name: b
    open_port: 8001
  - name: c
    open_port: "7950"
"#,
        )
        .unwrap();
        assert!(matches!(preset.nodes[0].open_port, Some(OpenPort::Flag(true))));
        assert!(matches!(preset.nodes[1].open_port, Some(OpenPort::Number(8001))));
        assert!(matches!(preset.nodes[2].open_port, Some(OpenPort::Value(_))));
    }

    #[test]
    fn unknown_network_type_fails_to_parse() {
        assert!(NetworkPreset::parse("network_type: mainnet\n").is_err());
    }
}
