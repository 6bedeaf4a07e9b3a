// Copyright (c) The Meridian Core Contributors
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("error accessing {0}: {1}")]
    IO(String, #[source] std::io::Error),
    #[error("error serializing {0}: {1}")]
    Json(String, #[source] serde_json::Error),
    #[error("resolved config for {0} is missing value: {1}")]
    MissingValue(String, &'static str),
    #[error("preset has no nodes")]
    NoNodes,
    #[error(transparent)]
    Config(#[from] meridian_config::Error),
    #[error(transparent)]
    Crypto(#[from] meridian_crypto::Error),
    #[error(transparent)]
    Genesis(#[from] meridian_genesis_tool::Error),
}
