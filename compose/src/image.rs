// Copyright (c) The Meridian Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! The registry boundary. Image build/tag/push is a capability injected
//! into the compose builder so tests can substitute a recording double
//! for the real container tooling.

use crate::{model::VolumeMount, Error};
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

#[async_trait]
pub trait ImageBuilder: Send + Sync {
    async fn build(&self, context: &Path, dockerfile: &Path, tag: &str) -> Result<(), Error>;
    async fn tag(&self, source: &str, target: &str) -> Result<(), Error>;
    async fn push(&self, image: &str) -> Result<(), Error>;
}

/// Remote image target: pushes land at `{registry}/{repository}:{service}`.
#[derive(Clone, Debug)]
pub struct RegistryTarget {
    pub registry: String,
    pub repository: String,
}

impl RegistryTarget {
    pub fn new(registry: &str, repository: &str) -> Self {
        Self {
            registry: registry.into(),
            repository: repository.into(),
        }
    }

    pub fn image_ref(&self, service: &str) -> String {
        format!("{}/{}:{}", self.registry, self.repository, service)
    }
}

/// Build descriptor for one service: the original image layered with
/// every would-be-mounted host path copied into the image filesystem.
/// Host paths are resolved relative to the build context root.
pub fn build_descriptor(image: &str, volumes: &[VolumeMount]) -> String {
    let mut descriptor = format!("FROM {}\n", image);
    for volume in volumes {
        let source = volume.host.trim_start_matches("../");
        descriptor.push_str(&format!("COPY {} {}\n", source, volume.container));
    }
    descriptor
}

/// Shells out to the docker CLI. No retries; a non-zero exit is fatal.
pub struct DockerCli;

impl DockerCli {
    async fn run(service: &str, args: &[&str]) -> Result<(), Error> {
        let status = Command::new("docker")
            .args(args)
            .status()
            .await
            .map_err(|e| Error::Image {
                service: service.into(),
                message: format!("docker {}: {}", args.join(" "), e),
            })?;
        if !status.success() {
            return Err(Error::Image {
                service: service.into(),
                message: format!("docker {} exited with {}", args.join(" "), status),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ImageBuilder for DockerCli {
    async fn build(&self, context: &Path, dockerfile: &Path, tag: &str) -> Result<(), Error> {
        Self::run(
            tag,
            &[
                "build",
                "-f",
                &dockerfile.display().to_string(),
                "-t",
                tag,
                &context.display().to_string(),
            ],
        )
        .await
    }

    async fn tag(&self, source: &str, target: &str) -> Result<(), Error> {
        Self::run(target, &["tag", source, target]).await
    }

    async fn push(&self, image: &str) -> Result<(), Error> {
        Self::run(image, &["push", image]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_layers_one_copy_per_volume() {
        let volumes = vec![
            VolumeMount::read_only("../nodes/node-0", "/userconfig"),
            VolumeMount::read_write("../data/node-0", "/data"),
        ];
        let descriptor = build_descriptor("meridian/server:latest", &volumes);
        assert_eq!(
            descriptor,
            "FROM meridian/server:latest\n\
             COPY nodes/node-0 /userconfig\n\
             COPY data/node-0 /data\n"
        );
    }

    #[test]
    fn image_ref_matches_registry_pattern() {
        let target = RegistryTarget::new("registry.example.com", "meridian");
        assert_eq!(
            target.image_ref("node-0"),
            "registry.example.com/meridian:node-0"
        );
    }
}
