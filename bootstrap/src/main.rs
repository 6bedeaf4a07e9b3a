// Copyright (c) The Meridian Core Contributors
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use meridian_compose::{ComposeBuilder, RegistryTarget};
use meridian_config_builder::{ConfigBuilder, GeneratedConfig};
use meridian_genesis_tool::GenesisAssembler;
use std::{fs, path::PathBuf};
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, StructOpt)]
#[structopt(about = "Tool to bootstrap a Meridian network from a declarative preset")]
enum Command {
    #[structopt(about = "Generates identities, per-node configuration, and genesis artifacts")]
    Config(GenerateOpts),
    #[structopt(about = "Compiles the container topology for a preset, generating config first")]
    Compose(ComposeOpts),
    #[structopt(about = "Removes a generated target directory")]
    Clean {
        #[structopt(short, long, parse(from_os_str))]
        target: PathBuf,
    },
}

#[derive(Debug, StructOpt)]
struct GenerateOpts {
    /// Path to the network preset
    #[structopt(short, long, parse(from_os_str))]
    preset: PathBuf,
    /// Output directory for all generated artifacts
    #[structopt(short, long, parse(from_os_str), default_value = "target/meridian")]
    target: PathBuf,
    /// Discard existing artifacts and regenerate from scratch
    #[structopt(short, long)]
    reset: bool,
}

#[derive(Debug, StructOpt)]
struct ComposeOpts {
    #[structopt(flatten)]
    generate: GenerateOpts,
    /// Bake volumes into images and push them to a registry instead of
    /// mounting host paths
    #[structopt(long)]
    push_images: bool,
    #[structopt(long, default_value = "registry.hub.docker.com")]
    registry: String,
    #[structopt(long, default_value = "meridian")]
    repository: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Command::from_args() {
        Command::Config(opts) => run_config(&opts).await.map(|_| ()),
        Command::Compose(opts) => run_compose(&opts).await,
        Command::Clean { target } => {
            if target.exists() {
                fs::remove_dir_all(&target)
                    .with_context(|| format!("unable to remove {}", target.display()))?;
                info!(target_dir = %target.display(), "removed target");
            }
            Ok(())
        }
    }
}

async fn run_config(opts: &GenerateOpts) -> Result<GeneratedConfig> {
    let generated = ConfigBuilder::new(&opts.preset, &opts.target)
        .reset(opts.reset)
        .build()
        .await
        .context("configuration generation failed")?;

    if generated.preset.genesis().is_some() {
        let summary = GenesisAssembler::new(&opts.target)
            .assemble(&generated.preset, &generated.addresses)
            .context("genesis assembly failed")?;
        info!(
            transactions = summary.accepted_transactions,
            "genesis artifacts staged"
        );
    }
    Ok(generated)
}

async fn run_compose(opts: &ComposeOpts) -> Result<()> {
    let generated = run_config(&opts.generate).await?;

    let mut builder = ComposeBuilder::new(&opts.generate.target);
    builder.reset(opts.generate.reset);
    if opts.push_images {
        builder.push_images(RegistryTarget::new(&opts.registry, &opts.repository));
    }
    let path = builder
        .compile(&generated.preset)
        .await
        .context("topology compilation failed")?;
    info!(path = %path.display(), "topology ready");
    Ok(())
}
