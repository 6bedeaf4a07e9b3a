// Copyright (c) The Meridian Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Peer-discovery descriptors, one per role class. Locally generated
//! nodes come first, preset-declared static peers are appended after;
//! order is otherwise insertion-stable.

use meridian_config::{AddressesRecord, FinalizedPreset, NodeRole, StaticPeer};
use serde::{Deserialize, Serialize};

pub const P2P_PORT: u16 = 7900;
pub const API_PORT: u16 = 3000;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PeerEndpoint {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PeerMetadata {
    pub name: String,
    pub roles: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PeerEntry {
    pub public_key: String,
    pub endpoint: PeerEndpoint,
    pub metadata: PeerMetadata,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PeerDescriptor {
    pub label: String,
    pub peers: Vec<PeerEntry>,
}

/// Builds the two descriptors: `peers-p2p` lists nodes carrying the
/// peer role on the fixed p2p port, `peers-api` lists nodes carrying the
/// api role on the fixed api port.
pub fn build_descriptors(
    preset: &FinalizedPreset,
    addresses: &AddressesRecord,
) -> (PeerDescriptor, PeerDescriptor) {
    (
        build_descriptor(
            "peers-p2p",
            NodeRole::Peer,
            P2P_PORT,
            addresses,
            &preset.network().known_peers.p2p,
        ),
        build_descriptor(
            "peers-api",
            NodeRole::Api,
            API_PORT,
            addresses,
            &preset.network().known_peers.api,
        ),
    )
}

fn build_descriptor(
    label: &str,
    role: NodeRole,
    port: u16,
    addresses: &AddressesRecord,
    static_peers: &[StaticPeer],
) -> PeerDescriptor {
    let mut peers = addresses
        .nodes
        .iter()
        .filter(|node| node.roles.contains(&role))
        .map(|node| PeerEntry {
            public_key: node.signing.public_key.clone(),
            endpoint: PeerEndpoint {
                host: node.name.clone(),
                port,
            },
            metadata: PeerMetadata {
                name: node.friendly_name.clone(),
                roles: node.roles.iter().map(|r| r.to_string()).collect(),
            },
        })
        .collect::<Vec<_>>();

    peers.extend(static_peers.iter().map(|peer| PeerEntry {
        public_key: peer.public_key.clone(),
        endpoint: PeerEndpoint {
            host: peer.host.clone(),
            port: peer.port,
        },
        metadata: PeerMetadata {
            name: peer.name.clone(),
            roles: peer.roles.iter().map(|r| r.to_string()).collect(),
        },
    }));

    PeerDescriptor {
        label: label.to_string(),
        peers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_config::{NetworkPreset, NodeAccount, PersistableConfig};
    use meridian_crypto::{Account, NetworkType};
    use std::collections::BTreeMap;

    const NETWORK: NetworkType = NetworkType::PrivateTest;

    fn node(name: &str, roles: Vec<NodeRole>) -> NodeAccount {
        NodeAccount {
            name: name.into(),
            friendly_name: format!("{}-friendly", name),
            roles,
            signing: Account::generate(NETWORK),
            vrf: Account::generate(NETWORK),
            certificate_name: format!("{}-node-cert", name),
        }
    }

    fn record(nodes: Vec<NodeAccount>) -> AddressesRecord {
        AddressesRecord {
            network_type: NETWORK,
            genesis_hash_seed: hex::encode([1u8; 32]),
            nodes,
            gateways: vec![],
            genesis_signer: None,
            token_beneficiaries: BTreeMap::new(),
            token_distributions: BTreeMap::new(),
        }
    }

    #[test]
    fn descriptors_partition_by_role() {
        let addresses = record(vec![
            node("node-0", vec![NodeRole::Peer, NodeRole::Api]),
            node("node-1", vec![NodeRole::Peer]),
        ]);
        let preset = NetworkPreset::parse("network_type: private-test\n")
            .unwrap()
            .finalize(&addresses)
            .unwrap();

        let (p2p, api) = build_descriptors(&preset, &addresses);
        assert_eq!(p2p.peers.len(), 2);
        assert_eq!(api.peers.len(), 1);
        assert_eq!(p2p.peers[0].endpoint.port, P2P_PORT);
        assert_eq!(api.peers[0].endpoint.port, API_PORT);
        assert_eq!(api.peers[0].endpoint.host, "node-0");
    }

    #[test]
    fn static_peers_are_appended_after_local_nodes() {
        let addresses = record(vec![node("node-0", vec![NodeRole::Peer])]);
        let preset = NetworkPreset::parse(
            r#"
network_type: private-test
network:
  known_peers:
    p2p:
      - public_key: "abcd"
        host: peer.example.com
        port: 7900
        name: external
        roles: [peer]
"#,
        )
        .unwrap()
        .finalize(&addresses)
        .unwrap();

        let (p2p, _) = build_descriptors(&preset, &addresses);
        assert_eq!(p2p.peers.len(), 2);
        assert_eq!(p2p.peers[0].endpoint.host, "node-0");
        assert_eq!(p2p.peers[1].endpoint.host, "peer.example.com");
    }
}
