// Copyright (c) The Meridian Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::Error;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Network variant chosen once per run. The variant fixes the address
/// version byte, so identities generated for one network never validate
/// on another.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NetworkType {
    Main,
    Test,
    Private,
    PrivateTest,
}

impl NetworkType {
    pub fn version_byte(self) -> u8 {
        match self {
            NetworkType::Main => 0x68,
            NetworkType::Test => 0x98,
            NetworkType::Private => 0x78,
            NetworkType::PrivateTest => 0xa8,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NetworkType::Main => "main",
            NetworkType::Test => "test",
            NetworkType::Private => "private",
            NetworkType::PrivateTest => "private-test",
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkType {
    type Err = Error;

    // Unknown names are rejected, never defaulted.
    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "main" => Ok(NetworkType::Main),
            "test" => Ok(NetworkType::Test),
            "private" => Ok(NetworkType::Private),
            "private-test" => Ok(NetworkType::PrivateTest),
            other => Err(Error::InvalidNetworkType(other.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_networks() {
        assert_eq!(
            "private-test".parse::<NetworkType>().unwrap(),
            NetworkType::PrivateTest
        );
        assert_eq!("main".parse::<NetworkType>().unwrap(), NetworkType::Main);
    }

    #[test]
    fn parse_unknown_network_is_fatal() {
        let err = "mainnet".parse::<NetworkType>().unwrap_err();
        assert!(err.to_string().contains("invalid network type"));
    }

    #[test]
    fn version_bytes_are_distinct() {
        let versions = [
            NetworkType::Main.version_byte(),
            NetworkType::Test.version_byte(),
            NetworkType::Private.version_byte(),
            NetworkType::PrivateTest.version_byte(),
        ];
        for (i, a) in versions.iter().enumerate() {
            for b in &versions[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
