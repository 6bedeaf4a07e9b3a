// Copyright (c) The Meridian Core Contributors
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! Identity primitives for the Meridian bootstrap tooling: ed25519 key
//! pairs, network-versioned addresses, and deterministic token ids.

mod account;
mod address;
mod error;
pub mod hash;
mod keypair;
mod network;
mod token;

pub use account::Account;
pub use address::Address;
pub use error::Error;
pub use keypair::KeyPair;
pub use network::NetworkType;
pub use token::derive_token_id;
