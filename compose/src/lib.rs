// Copyright (c) The Meridian Core Contributors
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! Compiles a finalized preset into a container service topology:
//! databases, nodes (with optional companion brokers), and gateways,
//! wired with dependency edges and a fixed private network. A
//! registry-push variant repackages each image with its volume contents
//! baked in and references the pushed remote image instead.

mod error;
pub mod image;
pub mod model;

pub use error::Error;
pub use image::{DockerCli, ImageBuilder, RegistryTarget};

use futures::future::try_join_all;
use image::build_descriptor;
use meridian_config::FinalizedPreset;
use model::{
    published_port, ComposeFile, ComposeService, Networks, ServiceNetworks, VolumeMount,
    BROKER_PORT, COMPOSE_VERSION, DATABASE_PORT, GATEWAY_PORT, NODE_PORT, NODE_RESTART_POLICY,
    STOP_SIGNAL,
};
use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::info;

/// The node runtime boundary, reproduced verbatim: a crash/lock marker
/// check runs a recovery step before the main process starts.
const NODE_COMMAND: &str =
    "bash -c \"/bin/bash /userconfig/runServerRecover.sh && /bin/bash /userconfig/startServer.sh\"";
const BROKER_COMMAND: &str =
    "bash -c \"/bin/bash /userconfig/runServerRecover.sh && /bin/bash /userconfig/startBroker.sh\"";
const GATEWAY_COMMAND: &str = "npm start --prefix /app /userconfig/rest.json";

const DEFAULT_USER: &str = "1000:1000";
/// Gateways get static addresses starting here inside the fixed subnet.
const GATEWAY_ADDRESS_OFFSET: usize = 25;

pub struct ComposeBuilder {
    target: PathBuf,
    reset: bool,
    push: Option<RegistryTarget>,
    image_builder: Arc<dyn ImageBuilder>,
}

impl ComposeBuilder {
    pub fn new<P: AsRef<Path>>(target: P) -> Self {
        Self {
            target: target.as_ref().to_path_buf(),
            reset: false,
            push: None,
            image_builder: Arc::new(DockerCli),
        }
    }

    pub fn reset(&mut self, reset: bool) -> &mut Self {
        self.reset = reset;
        self
    }

    /// Enables the registry-push variant. Mutually exclusive with
    /// host-volume mounting: pushed services carry no runtime volumes.
    pub fn push_images(&mut self, registry: RegistryTarget) -> &mut Self {
        self.push = Some(registry);
        self
    }

    pub fn image_builder(&mut self, builder: Arc<dyn ImageBuilder>) -> &mut Self {
        self.image_builder = builder;
        self
    }

    pub fn compose_path(&self) -> PathBuf {
        self.target.join("docker").join("docker-compose.yml")
    }

    pub async fn compile(&self, preset: &FinalizedPreset) -> Result<PathBuf, Error> {
        let compose_path = self.compose_path();
        if compose_path.exists() && !self.reset {
            // Preserves hand-edited or already-running topologies.
            info!(
                path = %compose_path.display(),
                "existing topology found, leaving in place"
            );
            return Ok(compose_path);
        }

        let services = self.collect_services(preset)?;
        let docker_dir = self.target.join("docker");
        tokio::fs::create_dir_all(&docker_dir)
            .await
            .map_err(|e| Error::IO(docker_dir.display().to_string(), e))?;

        let services = match &self.push {
            Some(registry) => self.push_services(services, registry).await?,
            None => services
                .into_iter()
                .map(|(name, mut service, volumes)| {
                    service.volumes = volumes.iter().map(VolumeMount::render).collect();
                    (name, service)
                })
                .collect(),
        };

        let compose = ComposeFile {
            version: COMPOSE_VERSION.into(),
            services: services.into_iter().collect(),
            networks: Networks::fixed(),
        };
        let contents = serde_yaml::to_string(&compose)
            .map_err(|e| Error::Yaml(compose_path.display().to_string(), e))?;
        tokio::fs::write(&compose_path, contents)
            .await
            .map_err(|e| Error::IO(compose_path.display().to_string(), e))?;
        info!(path = %compose_path.display(), services = compose.services.len(), "wrote topology");
        Ok(compose_path)
    }

    /// Builds every service definition in preset order, volumes kept
    /// separate so the push variant can bake them into images instead.
    fn collect_services(
        &self,
        preset: &FinalizedPreset,
    ) -> Result<Vec<(String, ComposeService, Vec<VolumeMount>)>, Error> {
        let known_databases: BTreeSet<&str> = preset
            .databases()
            .iter()
            .map(|db| db.name.as_str())
            .collect();
        let require_database = |service: &str, host: &str| {
            if known_databases.contains(host) {
                Ok(())
            } else {
                Err(Error::UnknownDatabaseHost {
                    service: service.into(),
                    host: host.into(),
                })
            }
        };

        let mut services = Vec::new();

        for db in preset.databases() {
            // Replica-set bootstrap runs concurrently with the database.
            let command = format!(
                "bash -c \"/bin/bash /userconfig/mongors.sh & mongod --dbpath=/dbdata --bind_ip={}\"",
                db.name
            );
            services.push((
                db.name.clone(),
                ComposeService {
                    image: preset.network().database_image.clone(),
                    user: Some(DEFAULT_USER.into()),
                    command,
                    stop_signal: STOP_SIGNAL.into(),
                    ports: published_port(db.open_port.as_ref(), DATABASE_PORT)
                        .into_iter()
                        .collect(),
                    restart: None,
                    volumes: vec![],
                    depends_on: vec![],
                    networks: None,
                },
                vec![
                    VolumeMount::read_only(&format!("../databases/{}", db.name), "/userconfig"),
                    VolumeMount::read_write(&format!("../data/{}", db.name), "/dbdata"),
                ],
            ));
        }

        for node in preset.nodes() {
            if let Some(host) = &node.database_host {
                require_database(&node.name, host)?;
            }
            let volumes = vec![
                VolumeMount::read_only(&format!("../nodes/{}", node.name), "/userconfig"),
                VolumeMount::read_write(&format!("../data/{}", node.name), "/data"),
            ];
            // Database first, broker second.
            let mut depends_on = Vec::new();
            if let Some(host) = &node.database_host {
                depends_on.push(host.clone());
            }
            if let Some(broker) = &node.broker_name {
                depends_on.push(broker.clone());
            }
            services.push((
                node.name.clone(),
                ComposeService {
                    image: preset.network().node_image.clone(),
                    user: Some(DEFAULT_USER.into()),
                    command: NODE_COMMAND.into(),
                    stop_signal: STOP_SIGNAL.into(),
                    ports: published_port(node.open_port.as_ref(), NODE_PORT)
                        .into_iter()
                        .collect(),
                    restart: Some(NODE_RESTART_POLICY.into()),
                    volumes: vec![],
                    depends_on,
                    networks: None,
                },
                volumes.clone(),
            ));

            if let Some(broker) = &node.broker_name {
                services.push((
                    broker.clone(),
                    ComposeService {
                        image: preset.network().node_image.clone(),
                        user: Some(DEFAULT_USER.into()),
                        command: BROKER_COMMAND.into(),
                        stop_signal: STOP_SIGNAL.into(),
                        ports: published_port(node.broker_open_port.as_ref(), BROKER_PORT)
                            .into_iter()
                            .collect(),
                        restart: Some(NODE_RESTART_POLICY.into()),
                        volumes: vec![],
                        depends_on: node.database_host.iter().cloned().collect(),
                        networks: None,
                    },
                    volumes,
                ));
            }
        }

        for (index, gateway) in preset.gateways().iter().enumerate() {
            require_database(&gateway.name, &gateway.database_host)?;
            // Gateways must be reachable at a stable address by
            // convention; everything else is addressed by name.
            let address = gateway.static_address.clone().unwrap_or_else(|| {
                format!("172.20.0.{}", GATEWAY_ADDRESS_OFFSET + index)
            });
            services.push((
                gateway.name.clone(),
                ComposeService {
                    image: preset.network().gateway_image.clone(),
                    user: Some(DEFAULT_USER.into()),
                    command: GATEWAY_COMMAND.into(),
                    stop_signal: STOP_SIGNAL.into(),
                    ports: published_port(gateway.open_port.as_ref(), GATEWAY_PORT)
                        .into_iter()
                        .collect(),
                    restart: None,
                    volumes: vec![],
                    depends_on: vec![gateway.database_host.clone()],
                    networks: Some(ServiceNetworks::static_address(&address)),
                },
                vec![VolumeMount::read_only(
                    &format!("../gateways/{}", gateway.name),
                    "/userconfig",
                )],
            ));
        }

        Ok(services)
    }

    /// Registry-push variant: per service, write a build descriptor that
    /// layers the original image with every would-be volume, build, tag,
    /// and push, then substitute the remote image reference. Independent
    /// services are pushed concurrently; the first failure aborts the
    /// batch.
    async fn push_services(
        &self,
        services: Vec<(String, ComposeService, Vec<VolumeMount>)>,
        registry: &RegistryTarget,
    ) -> Result<Vec<(String, ComposeService)>, Error> {
        let build_dir = self.target.join("docker").join("build");
        tokio::fs::create_dir_all(&build_dir)
            .await
            .map_err(|e| Error::IO(build_dir.display().to_string(), e))?;

        let tasks = services.into_iter().map(|(name, mut service, volumes)| {
            let builder = Arc::clone(&self.image_builder);
            let registry = registry.clone();
            let context = self.target.clone();
            let build_dir = build_dir.clone();
            async move {
                let descriptor = build_descriptor(&service.image, &volumes);
                let dockerfile = build_dir.join(format!("{}.Dockerfile", name));
                tokio::fs::write(&dockerfile, descriptor)
                    .await
                    .map_err(|e| Error::IO(dockerfile.display().to_string(), e))?;

                let local_tag = format!("meridian-build/{}", name);
                builder.build(&context, &dockerfile, &local_tag).await?;
                let remote = registry.image_ref(&name);
                builder.tag(&local_tag, &remote).await?;
                builder.push(&remote).await?;
                info!(service = name.as_str(), image = remote.as_str(), "pushed image");

                service.image = remote;
                Ok::<_, Error>((name, service))
            }
        });
        try_join_all(tasks).await
    }
}
