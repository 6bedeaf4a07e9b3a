// Copyright (c) The Meridian Core Contributors
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! Resolves a declarative network preset into generated identities, a
//! finalized preset, per-node configuration trees, and peer-discovery
//! descriptors. Identity generation happens once per target: the
//! addresses record is persisted and reused on later runs unless a
//! reset is requested.

mod error;
pub mod layers;
pub mod peers;

pub use error::Error;

use futures::future::try_join_all;
use layers::{ConfigLayer, GatewayConfigContext, LayerValues, NodeConfigContext};
use meridian_config::{
    AddressesRecord, FinalizedPreset, GatewayAccount, NetworkPreset, NodeAccount, NodePreset,
    PersistableConfig,
};
use meridian_crypto::{Account, Address};
use meridian_genesis_tool::supply;
use rand::{rngs::OsRng, RngCore};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::info;

const FRIENDLY_NAME_PREFIX_LEN: usize = 7;

/// Output of a build: the finalized preset and the addresses record,
/// both also persisted under the target directory.
#[derive(Debug)]
pub struct GeneratedConfig {
    pub preset: FinalizedPreset,
    pub addresses: AddressesRecord,
}

pub struct ConfigBuilder {
    preset_path: PathBuf,
    target: PathBuf,
    reset: bool,
}

impl ConfigBuilder {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(preset_path: P, target: Q) -> Self {
        Self {
            preset_path: preset_path.as_ref().to_path_buf(),
            target: target.as_ref().to_path_buf(),
            reset: false,
        }
    }

    pub fn reset(&mut self, reset: bool) -> &mut Self {
        self.reset = reset;
        self
    }

    pub fn addresses_path(&self) -> PathBuf {
        self.target.join("addresses.yml")
    }

    pub fn preset_out_path(&self) -> PathBuf {
        self.target.join("preset.yml")
    }

    pub async fn build(&self) -> Result<GeneratedConfig, Error> {
        if self.reset && self.target.exists() {
            fs::remove_dir_all(&self.target)
                .map_err(|e| Error::IO(self.target.display().to_string(), e))?;
            info!(target_dir = %self.target.display(), "reset requested, removed target");
        }

        let addresses_path = self.addresses_path();
        let preset_out = self.preset_out_path();
        if addresses_path.exists() && preset_out.exists() {
            info!(
                path = %addresses_path.display(),
                "existing addresses record found, reusing"
            );
            return Ok(GeneratedConfig {
                preset: FinalizedPreset::load_config(&preset_out)?,
                addresses: AddressesRecord::load_config(&addresses_path)?,
            });
        }

        let preset = NetworkPreset::load_config(&self.preset_path)?;
        if preset.nodes.is_empty() {
            return Err(Error::NoNodes);
        }

        let addresses = generate_addresses(&preset)?;
        let preset = preset.finalize(&addresses)?;
        addresses.save_config(&addresses_path)?;
        preset.save_config(&preset_out)?;
        info!(
            nodes = addresses.nodes.len(),
            gateways = addresses.gateways.len(),
            "generated addresses record"
        );

        self.write_entity_configs(&preset, &addresses).await?;
        Ok(GeneratedConfig { preset, addresses })
    }

    /// Resolves every node and gateway context up front, then fans the
    /// file writes out concurrently. The first failure aborts the batch.
    async fn write_entity_configs(
        &self,
        preset: &FinalizedPreset,
        addresses: &AddressesRecord,
    ) -> Result<(), Error> {
        let (p2p, api) = peers::build_descriptors(preset, addresses);
        let p2p_json = serde_json::to_string_pretty(&p2p)
            .map_err(|e| Error::Json("peers-p2p".into(), e))?;
        let api_json = serde_json::to_string_pretty(&api)
            .map_err(|e| Error::Json("peers-api".into(), e))?;

        let mut tasks = Vec::new();
        for node in preset.nodes() {
            let context = resolve_node(preset, addresses, node)?;
            let yaml = serde_yaml::to_string(&context)
                .map_err(|e| meridian_config::Error::Yaml(node.name.clone(), e))?;
            tasks.push(write_files(
                self.target.join("nodes").join(&node.name),
                vec![
                    ("node-config.yml", yaml),
                    ("peers-p2p.json", p2p_json.clone()),
                    ("peers-api.json", api_json.clone()),
                ],
            ));
        }
        for gateway in preset.gateways() {
            let account = addresses
                .gateways
                .iter()
                .find(|g| g.name == gateway.name)
                .ok_or_else(|| {
                    Error::MissingValue(gateway.name.clone(), "generated gateway account")
                })?;
            let context = GatewayConfigContext {
                name: gateway.name.clone(),
                network_type: preset.network_type(),
                database_host: gateway.database_host.clone(),
                log_level: preset.network().log_level.clone(),
                private_key: account.account.private_key.clone(),
                public_key: account.account.public_key.clone(),
                address: account.account.address.to_string(),
                api_port: peers::API_PORT,
            };
            let yaml = serde_yaml::to_string(&context)
                .map_err(|e| meridian_config::Error::Yaml(gateway.name.clone(), e))?;
            tasks.push(write_files(
                self.target.join("gateways").join(&gateway.name),
                vec![("gateway-config.yml", yaml)],
            ));
        }
        try_join_all(tasks).await?;
        Ok(())
    }
}

async fn write_files(dir: PathBuf, files: Vec<(&'static str, String)>) -> Result<(), Error> {
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| Error::IO(dir.display().to_string(), e))?;
    for (name, contents) in files {
        let path = dir.join(name);
        tokio::fs::write(&path, contents)
            .await
            .map_err(|e| Error::IO(path.display().to_string(), e))?;
    }
    Ok(())
}

/// Merge order: network defaults, then generated values, then
/// node-specific preset overrides. Last writer wins per field.
fn resolve_node(
    preset: &FinalizedPreset,
    addresses: &AddressesRecord,
    node: &NodePreset,
) -> Result<NodeConfigContext, Error> {
    let account = addresses
        .node(&node.name)
        .ok_or_else(|| Error::MissingValue(node.name.clone(), "generated node account"))?;

    let defaults = ConfigLayer {
        name: "network defaults",
        values: LayerValues {
            log_level: Some(preset.network().log_level.clone()),
            max_peers: Some(preset.network().max_peers),
            ..LayerValues::default()
        },
    };
    let generated = ConfigLayer {
        name: "generated",
        values: LayerValues {
            friendly_name: Some(account.friendly_name.clone()),
            signing_private_key: Some(account.signing.private_key.clone()),
            signing_public_key: Some(account.signing.public_key.clone()),
            address: Some(account.signing.address.to_string()),
            vrf_private_key: Some(account.vrf.private_key.clone()),
            vrf_public_key: Some(account.vrf.public_key.clone()),
            ..LayerValues::default()
        },
    };
    let overrides = ConfigLayer {
        name: "node overrides",
        values: LayerValues {
            friendly_name: node.friendly_name.clone(),
            host: node.host.clone(),
            log_level: node.log_level.clone(),
            max_peers: node.max_peers,
            database_host: node.database_host.clone(),
            broker_name: node.broker_name.clone(),
            ..LayerValues::default()
        },
    };

    NodeConfigContext::from_layers(
        &node.name,
        preset.network_type(),
        node.roles.clone(),
        account.certificate_name.clone(),
        &[defaults, generated, overrides],
    )
}

fn generate_addresses(preset: &NetworkPreset) -> Result<AddressesRecord, Error> {
    let network = preset.network_type;
    let genesis_hash_seed = preset
        .genesis
        .as_ref()
        .and_then(|g| g.genesis_hash_seed.clone())
        .unwrap_or_else(random_seed);

    let nodes = preset
        .nodes
        .iter()
        .map(|node| {
            let signing = Account::generate(network);
            let friendly_name = node
                .friendly_name
                .clone()
                .unwrap_or_else(|| signing.public_key[..FRIENDLY_NAME_PREFIX_LEN].to_string());
            NodeAccount {
                name: node.name.clone(),
                friendly_name,
                roles: node.roles.clone(),
                signing,
                vrf: Account::generate(network),
                certificate_name: format!("{}-node-cert", node.name),
            }
        })
        .collect::<Vec<_>>();

    let gateways = preset
        .gateways
        .iter()
        .map(|gateway| GatewayAccount {
            name: gateway.name.clone(),
            account: Account::generate(network),
        })
        .collect::<Vec<_>>();

    let mut genesis_signer = None;
    let mut token_beneficiaries = BTreeMap::new();
    let mut token_distributions = BTreeMap::new();
    if let Some(genesis) = &preset.genesis {
        genesis_signer = Some(Account::generate(network));
        for token in &genesis.tokens {
            let accounts = (0..token.accounts)
                .map(|_| Account::generate(network))
                .collect::<Vec<_>>();
            // Token accounts first so entry 0 (the residual entry) is a
            // regular beneficiary, then node operator accounts.
            let mut beneficiaries = accounts
                .iter()
                .map(|account| account.address.clone())
                .collect::<Vec<Address>>();
            beneficiaries.extend(nodes.iter().map(|node| node.signing.address.clone()));
            let entries = supply::distribute(
                &token.name,
                token.supply,
                &beneficiaries,
                token.distributions.clone(),
            )?;
            token_beneficiaries.insert(token.name.clone(), accounts);
            token_distributions.insert(token.name.clone(), entries);
        }
    }

    Ok(AddressesRecord {
        network_type: network,
        genesis_hash_seed,
        nodes,
        gateways,
        genesis_signer,
        token_beneficiaries,
        token_distributions,
    })
}

fn random_seed() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
