// Copyright (c) The Meridian Core Contributors
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("error accessing {0}: {1}")]
    IO(String, #[source] std::io::Error),
    #[error("error (de)serializing {0}: {1}")]
    Yaml(String, #[source] serde_yaml::Error),
    #[error("preset is missing expected value: {0}")]
    Missing(&'static str),
    #[error("genesis hash seed is not valid hex: {0}")]
    GenesisHashSeed(String),
}
