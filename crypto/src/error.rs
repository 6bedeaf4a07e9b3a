// Copyright (c) The Meridian Core Contributors
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid network type: {0}")]
    InvalidNetworkType(String),
    #[error("invalid address {0}: {1}")]
    InvalidAddress(String, String),
    #[error("invalid key material: {0}")]
    InvalidKey(String),
}
