// Copyright (c) The Meridian Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::{supply, transaction::VrfKeyLink, Error};
use meridian_config::{
    AddressesRecord, FinalizedPreset, PersistableConfig, TokenDistributionEntry,
};
use meridian_crypto::{hash, NetworkType};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::{Path, PathBuf},
};
use tracing::{info, warn};

/// Final genesis ledger staged for the external genesis-block builder,
/// written next to the transactions directory as `genesis-summary.yml`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct GenesisSummary {
    pub network_type: NetworkType,
    pub genesis_hash_seed: String,
    pub accepted_transactions: usize,
    pub accepted_opt_in_transactions: usize,
    pub token_distributions: BTreeMap<String, Vec<TokenDistributionEntry>>,
}

/// Builds the signed genesis transaction set for a finalized preset:
/// one VRF key-link transaction per node plus any externally supplied
/// opt-in transactions, deduplicated by content hash, one artifact file
/// per accepted transaction.
pub struct GenesisAssembler {
    target: PathBuf,
}

impl GenesisAssembler {
    pub fn new<P: AsRef<Path>>(target: P) -> Self {
        Self {
            target: target.as_ref().to_path_buf(),
        }
    }

    pub fn transactions_dir(&self) -> PathBuf {
        self.target.join("genesis").join("transactions")
    }

    pub fn summary_path(&self) -> PathBuf {
        self.target.join("genesis").join("genesis-summary.yml")
    }

    pub fn assemble(
        &self,
        preset: &FinalizedPreset,
        addresses: &AddressesRecord,
    ) -> Result<GenesisSummary, Error> {
        let genesis = preset.genesis().ok_or(Error::MissingGenesisPreset)?;
        let seed = addresses.seed_bytes()?;

        let tx_dir = self.transactions_dir();
        fs::create_dir_all(&tx_dir).map_err(|e| Error::IO(tx_dir.display().to_string(), e))?;

        let mut seen = BTreeSet::new();
        let mut accepted = 0usize;

        for node in &addresses.nodes {
            let pair = node.signing.key_pair()?;
            let link = VrfKeyLink::new(&node.signing.public_key, &node.vrf.public_key);
            let tx = link.sign(&seed, &pair)?;
            let key = format!("vrf_key_link_{}", node.name);
            if self.accept(&tx_dir, &mut seen, &key, &tx.content_hash()?, &tx.to_bytes()?)? {
                accepted += 1;
            }
        }

        let mut opt_in_accepted = 0usize;
        for (key, payload) in &genesis.transactions {
            let bytes = hex::decode(payload).map_err(|e| Error::Hex(key.clone(), e))?;
            let content_hash = hex::encode(hash::sha3_256(&bytes));
            if self.accept(&tx_dir, &mut seen, key, &content_hash, &bytes)? {
                accepted += 1;
                opt_in_accepted += 1;
            }
        }
        if !genesis.transactions.is_empty() {
            info!(
                accepted = opt_in_accepted,
                submitted = genesis.transactions.len(),
                "accepted opt-in transactions"
            );
        }

        let mut token_distributions = addresses.token_distributions.clone();
        if !genesis.balances.is_empty() {
            let primary = genesis
                .tokens
                .first()
                .ok_or(Error::MissingResidualBeneficiary)?;
            let distributions = token_distributions
                .get_mut(&primary.name)
                .ok_or(Error::MissingResidualBeneficiary)?;
            supply::apply_opt_in(
                preset.network_type(),
                &primary.name,
                primary.supply,
                distributions,
                &genesis.balances,
            )?;
            info!(
                balances = genesis.balances.len(),
                token = primary.name.as_str(),
                "applied opt-in balances"
            );
        }

        let summary = GenesisSummary {
            network_type: preset.network_type(),
            genesis_hash_seed: addresses.genesis_hash_seed.clone(),
            accepted_transactions: accepted,
            accepted_opt_in_transactions: opt_in_accepted,
            token_distributions,
        };
        summary.save_config(self.summary_path())?;
        Ok(summary)
    }

    /// Writes one transaction artifact unless its content hash was
    /// already accepted in this batch. Duplicates are tolerated with a
    /// warning so externally supplied sets may contain accidental
    /// repeats.
    fn accept(
        &self,
        tx_dir: &Path,
        seen: &mut BTreeSet<String>,
        key: &str,
        content_hash: &str,
        bytes: &[u8],
    ) -> Result<bool, Error> {
        if !seen.insert(content_hash.to_string()) {
            warn!(key, content_hash, "duplicate transaction content hash, skipping");
            return Ok(false);
        }
        let path = tx_dir.join(format!("{}.bin", key));
        fs::write(&path, bytes).map_err(|e| Error::IO(path.display().to_string(), e))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_config::{NetworkPreset, NodeAccount, NodeRole};
    use meridian_crypto::Account;

    const NETWORK: NetworkType = NetworkType::PrivateTest;

    fn node_account(name: &str) -> NodeAccount {
        NodeAccount {
            name: name.into(),
            friendly_name: name.into(),
            roles: vec![NodeRole::Peer],
            signing: Account::generate(NETWORK),
            vrf: Account::generate(NETWORK),
            certificate_name: format!("{}-node-cert", name),
        }
    }

    fn addresses_record(nodes: Vec<NodeAccount>) -> AddressesRecord {
        AddressesRecord {
            network_type: NETWORK,
            genesis_hash_seed: hex::encode([7u8; 32]),
            nodes,
            gateways: vec![],
            genesis_signer: Some(Account::generate(NETWORK)),
            token_beneficiaries: BTreeMap::new(),
            token_distributions: BTreeMap::new(),
        }
    }

    fn preset_with_genesis(extra: &str) -> NetworkPreset {
        NetworkPreset::parse(&format!(
            r#"
network_type: private-test
nodes:
  - name: node-0
genesis:
  tokens:
    - name: currency
      supply: 1000
{}"#,
            extra
        ))
        .unwrap()
    }

    #[test]
    fn assembles_one_artifact_per_node() {
        let dir = tempfile::tempdir().unwrap();
        let addresses = addresses_record(vec![node_account("node-0"), node_account("node-1")]);
        let preset = preset_with_genesis("").finalize(&addresses).unwrap();

        let assembler = GenesisAssembler::new(dir.path());
        let summary = assembler.assemble(&preset, &addresses).unwrap();
        assert_eq!(summary.accepted_transactions, 2);
        assert!(assembler
            .transactions_dir()
            .join("vrf_key_link_node-0.bin")
            .exists());
        assert!(assembler
            .transactions_dir()
            .join("vrf_key_link_node-1.bin")
            .exists());
        assert!(assembler.summary_path().exists());
    }

    #[test]
    fn duplicate_content_hash_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let addresses = addresses_record(vec![node_account("node-0")]);
        // Two opt-in transactions with identical payload bytes.
        let preset = preset_with_genesis(
            r#"  transactions:
    opt_in_a: "deadbeef"
    opt_in_b: "deadbeef"
"#,
        )
        .finalize(&addresses)
        .unwrap();

        let assembler = GenesisAssembler::new(dir.path());
        let summary = assembler.assemble(&preset, &addresses).unwrap();
        // 1 node link + 1 of the 2 opt-in payloads.
        assert_eq!(summary.accepted_transactions, 2);
        assert_eq!(summary.accepted_opt_in_transactions, 1);
        assert!(assembler.transactions_dir().join("opt_in_a.bin").exists());
        assert!(!assembler.transactions_dir().join("opt_in_b.bin").exists());
    }

    #[test]
    fn opt_in_balances_adjust_primary_token() {
        let dir = tempfile::tempdir().unwrap();
        let mut addresses = addresses_record(vec![node_account("node-0")]);
        let residual = Account::generate(NETWORK);
        addresses.token_distributions.insert(
            "currency".into(),
            vec![TokenDistributionEntry {
                address: residual.address.clone(),
                amount: 1000,
            }],
        );
        let opted_in = Account::generate(NETWORK);
        let preset = preset_with_genesis(&format!(
            "  balances:\n    {}: 250\n",
            opted_in.address
        ))
        .finalize(&addresses)
        .unwrap();

        let summary = GenesisAssembler::new(dir.path())
            .assemble(&preset, &addresses)
            .unwrap();
        let entries = &summary.token_distributions["currency"];
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].amount, 750);
        assert_eq!(entries[1].amount, 250);
        assert_eq!(entries[1].address, opted_in.address);
    }

    #[test]
    fn missing_genesis_preset_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let addresses = addresses_record(vec![node_account("node-0")]);
        let preset = NetworkPreset::parse("network_type: private-test\n")
            .unwrap()
            .finalize(&addresses)
            .unwrap();
        assert!(matches!(
            GenesisAssembler::new(dir.path())
                .assemble(&preset, &addresses)
                .unwrap_err(),
            Error::MissingGenesisPreset
        ));
    }

    #[test]
    fn balances_without_distribution_are_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let addresses = addresses_record(vec![node_account("node-0")]);
        let opted_in = Account::generate(NETWORK);
        let preset = preset_with_genesis(&format!(
            "  balances:\n    {}: 250\n",
            opted_in.address
        ))
        .finalize(&addresses)
        .unwrap();
        assert!(matches!(
            GenesisAssembler::new(dir.path())
                .assemble(&preset, &addresses)
                .unwrap_err(),
            Error::MissingResidualBeneficiary
        ));
    }
}
