// Copyright (c) The Meridian Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! The compiled topology document: a fixed private network plus a map
//! of service definitions, serialized as `docker-compose.yml`.

use meridian_config::OpenPort;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const COMPOSE_VERSION: &str = "2.4";
pub const NETWORK_NAME: &str = "meridian-network";
pub const SUBNET: &str = "172.20.0.0/24";
pub const STOP_SIGNAL: &str = "SIGINT";
/// Bounded restarts so a persistent fault surfaces instead of being
/// masked by a restart storm.
pub const NODE_RESTART_POLICY: &str = "on-failure:2";

pub const DATABASE_PORT: u16 = 27017;
pub const NODE_PORT: u16 = 7900;
pub const BROKER_PORT: u16 = 7902;
pub const GATEWAY_PORT: u16 = 3000;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ComposeFile {
    pub version: String,
    pub services: BTreeMap<String, ComposeService>,
    pub networks: Networks,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Networks {
    pub default: NetworkDefinition,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct NetworkDefinition {
    pub name: String,
    pub ipam: Ipam,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Ipam {
    pub config: Vec<SubnetConfig>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SubnetConfig {
    pub subnet: String,
}

impl Networks {
    pub fn fixed() -> Self {
        Self {
            default: NetworkDefinition {
                name: NETWORK_NAME.into(),
                ipam: Ipam {
                    config: vec![SubnetConfig {
                        subnet: SUBNET.into(),
                    }],
                },
            },
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ComposeService {
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub command: String,
    pub stop_signal: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub networks: Option<ServiceNetworks>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ServiceNetworks {
    pub default: ServiceNetwork,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ServiceNetwork {
    pub ipv4_address: String,
}

impl ServiceNetworks {
    pub fn static_address(address: &str) -> Self {
        Self {
            default: ServiceNetwork {
                ipv4_address: address.into(),
            },
        }
    }
}

/// A host-path mount. In registry-push mode the host path is baked into
/// the image instead of being mounted at runtime.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VolumeMount {
    pub host: String,
    pub container: String,
    pub read_only: bool,
}

impl VolumeMount {
    pub fn read_only(host: &str, container: &str) -> Self {
        Self {
            host: host.into(),
            container: container.into(),
            read_only: true,
        }
    }

    pub fn read_write(host: &str, container: &str) -> Self {
        Self {
            host: host.into(),
            container: container.into(),
            read_only: false,
        }
    }

    pub fn render(&self) -> String {
        let mode = if self.read_only { "ro" } else { "rw" };
        format!("{}:{}:{}", self.host, self.container, mode)
    }
}

/// The uniform port exposure rule. `true` (boolean or string) maps the
/// internal port onto itself, a numeric or string value maps the
/// internal port onto that external value, `false`/absent publishes
/// nothing.
pub fn published_port(open: Option<&OpenPort>, internal: u16) -> Option<String> {
    match open? {
        OpenPort::Flag(true) => Some(format!("{}:{}", internal, internal)),
        OpenPort::Flag(false) => None,
        OpenPort::Number(external) => Some(format!("{}:{}", external, internal)),
        OpenPort::Value(value) => match value.as_str() {
            "true" => Some(format!("{}:{}", internal, internal)),
            "false" | "" => None,
            external => Some(format!("{}:{}", external, internal)),
        },
    }
}
