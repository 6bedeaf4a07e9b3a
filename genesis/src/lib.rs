// Copyright (c) The Meridian Core Contributors
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! Genesis tooling: conserved token-supply distribution and assembly of
//! the signed transaction set consumed by the external genesis-block
//! builder.

mod assembler;
mod error;
pub mod supply;
pub mod transaction;

pub use assembler::{GenesisAssembler, GenesisSummary};
pub use error::Error;
