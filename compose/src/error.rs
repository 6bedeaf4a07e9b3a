// Copyright (c) The Meridian Core Contributors
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("error accessing {0}: {1}")]
    IO(String, #[source] std::io::Error),
    #[error("error serializing {0}: {1}")]
    Yaml(String, #[source] serde_yaml::Error),
    #[error("image operation failed for {service}: {message}")]
    Image { service: String, message: String },
    #[error("service {service} references unknown database host {host}")]
    UnknownDatabaseHost { service: String, host: String },
}
