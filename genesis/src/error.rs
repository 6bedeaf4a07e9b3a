// Copyright (c) The Meridian Core Contributors
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("supply mismatch for token {token}: declared {expected}, distributed {actual}")]
    SupplyMismatch {
        token: String,
        expected: u64,
        actual: u128,
    },
    #[error(
        "residual account {address} cannot absorb opt-in deduction of {deduction}: \
         only {available} available"
    )]
    ResidualUnderflow {
        address: String,
        available: u64,
        deduction: u64,
    },
    #[error("opt-in address {0} duplicates an existing distribution entry")]
    DuplicateOptInAddress(String),
    #[error("token {0} has no beneficiary accounts and no explicit distribution")]
    NoBeneficiaries(String),
    #[error("preset has no genesis definition")]
    MissingGenesisPreset,
    #[error("no currency-token distribution exists to absorb opt-in balances")]
    MissingResidualBeneficiary,
    #[error("error accessing {0}: {1}")]
    IO(String, #[source] std::io::Error),
    #[error("error (de)serializing {0}: {1}")]
    Bcs(&'static str, #[source] bcs::Error),
    #[error("opt-in transaction {0} is not valid hex: {1}")]
    Hex(String, #[source] hex::FromHexError),
    #[error(transparent)]
    Config(#[from] meridian_config::Error),
    #[error(transparent)]
    Crypto(#[from] meridian_crypto::Error),
}
