// Copyright (c) The Meridian Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Explicit configuration layering. A node's configuration context is
//! the merge of an ordered list of named layers; later layers win per
//! field. The order used by the builder is `network defaults` ->
//! `generated` -> `node overrides`.

use crate::Error;
use meridian_config::NodeRole;
use meridian_crypto::NetworkType;
use serde::{Deserialize, Serialize};

/// One named layer. Every field is optional; `None` means "no opinion"
/// and leaves the previous layer's value in place.
#[derive(Clone, Debug, Default)]
pub struct ConfigLayer {
    pub name: &'static str,
    pub values: LayerValues,
}

#[derive(Clone, Debug, Default)]
pub struct LayerValues {
    pub friendly_name: Option<String>,
    pub host: Option<String>,
    pub log_level: Option<String>,
    pub max_peers: Option<u32>,
    pub signing_private_key: Option<String>,
    pub signing_public_key: Option<String>,
    pub address: Option<String>,
    pub vrf_private_key: Option<String>,
    pub vrf_public_key: Option<String>,
    pub database_host: Option<String>,
    pub broker_name: Option<String>,
}

/// Last-writer-wins merge over the layer list, field by field.
pub fn merge(layers: &[ConfigLayer]) -> LayerValues {
    let mut merged = LayerValues::default();
    for layer in layers {
        let values = &layer.values;
        merge_field(&mut merged.friendly_name, &values.friendly_name);
        merge_field(&mut merged.host, &values.host);
        merge_field(&mut merged.log_level, &values.log_level);
        merge_field(&mut merged.max_peers, &values.max_peers);
        merge_field(&mut merged.signing_private_key, &values.signing_private_key);
        merge_field(&mut merged.signing_public_key, &values.signing_public_key);
        merge_field(&mut merged.address, &values.address);
        merge_field(&mut merged.vrf_private_key, &values.vrf_private_key);
        merge_field(&mut merged.vrf_public_key, &values.vrf_public_key);
        merge_field(&mut merged.database_host, &values.database_host);
        merge_field(&mut merged.broker_name, &values.broker_name);
    }
    merged
}

fn merge_field<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
    if let Some(value) = value {
        *target = Some(value.clone());
    }
}

/// Fully resolved per-node configuration, written to
/// `nodes/<name>/node-config.yml`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct NodeConfigContext {
    pub name: String,
    pub friendly_name: String,
    pub network_type: NetworkType,
    pub roles: Vec<NodeRole>,
    pub host: String,
    pub log_level: String,
    pub max_peers: u32,
    pub signing_private_key: String,
    pub signing_public_key: String,
    pub address: String,
    pub vrf_private_key: String,
    pub vrf_public_key: String,
    pub certificate_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broker_name: Option<String>,
}

impl NodeConfigContext {
    pub fn from_layers(
        name: &str,
        network_type: NetworkType,
        roles: Vec<NodeRole>,
        certificate_name: String,
        layers: &[ConfigLayer],
    ) -> Result<Self, Error> {
        let merged = merge(layers);
        let required = |value: Option<String>, field: &'static str| {
            value.ok_or_else(|| Error::MissingValue(name.to_string(), field))
        };
        Ok(Self {
            name: name.to_string(),
            friendly_name: required(merged.friendly_name, "friendly_name")?,
            network_type,
            roles,
            // Services address each other by service name.
            host: merged.host.unwrap_or_else(|| name.to_string()),
            log_level: required(merged.log_level, "log_level")?,
            max_peers: merged
                .max_peers
                .ok_or(Error::MissingValue(name.to_string(), "max_peers"))?,
            signing_private_key: required(merged.signing_private_key, "signing_private_key")?,
            signing_public_key: required(merged.signing_public_key, "signing_public_key")?,
            address: required(merged.address, "address")?,
            vrf_private_key: required(merged.vrf_private_key, "vrf_private_key")?,
            vrf_public_key: required(merged.vrf_public_key, "vrf_public_key")?,
            certificate_name,
            database_host: merged.database_host,
            broker_name: merged.broker_name,
        })
    }
}

/// Resolved gateway configuration, written to
/// `gateways/<name>/gateway-config.yml`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct GatewayConfigContext {
    pub name: String,
    pub network_type: NetworkType,
    pub database_host: String,
    pub log_level: String,
    pub private_key: String,
    pub public_key: String,
    pub address: String,
    pub api_port: u16,
}
