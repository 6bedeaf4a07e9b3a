// Copyright (c) The Meridian Core Contributors
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! Declarative preset and generated-addresses data model shared by the
//! Meridian bootstrap tooling. A preset describes the desired network
//! (nodes, databases, gateways, genesis rules); an addresses record holds
//! every identity generated for it. Both persist as YAML through
//! [`PersistableConfig`].

mod addresses;
mod error;
mod persistable;
mod preset;

pub use addresses::{AddressesRecord, GatewayAccount, NodeAccount, TokenDistributionEntry};
pub use error::Error;
pub use persistable::PersistableConfig;
pub use preset::{
    DatabasePreset, FinalizedPreset, GatewayPreset, GenesisPreset, NetworkDefaults, NetworkPreset,
    NodePreset, NodeRole, OpenPort, StaticPeer, TokenPreset,
};

pub use meridian_crypto::{Account, Address, NetworkType};
