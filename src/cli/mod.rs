// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod commands;

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::session::{FileStorage, SessionStore};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Rojifi session CLI
#[derive(Parser, Debug)]
#[command(name = "rojifi-cli")]
#[command(version)]
#[command(about = "Inspect and manage the local Rojifi client session", long_about = None)]
pub struct Cli {
    /// TOML config file (environment variables override it)
    #[arg(long, global = true, env = "ROJIFI_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the current session
    Status,

    /// Store a session for an already-issued authorization token
    Login(commands::LoginArgs),

    /// Reset the session to logged-out defaults
    Logout,

    /// Show device info and initialise the local device session
    Device(commands::DeviceArgs),

    /// List sessions known to the server
    Sessions,

    /// Revoke a server-side session
    Revoke(commands::RevokeArgs),

    /// Decrypt a response payload with the stored client key
    Decrypt(commands::DecryptArgs),
}

/// Wired-up session store and API client
pub struct CliContext {
    pub config: ClientConfig,
    pub session: SessionStore,
    pub client: ApiClient,
}

impl CliContext {
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        dotenv::dotenv().ok();

        let mut config = match config_path {
            Some(path) => ClientConfig::from_file(path)?,
            None => ClientConfig::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        debug!("Using storage file {}", config.storage_path.display());

        let storage = Arc::new(FileStorage::new(config.storage_path.clone()));
        let session = SessionStore::new(storage, config.session.clone());
        let client = ApiClient::new(config.api.clone(), session.clone())
            .context("failed to build API client")?;

        Ok(Self {
            config,
            session,
            client,
        })
    }
}

/// Log filter from a `RUST_LOG`-style directive, `info` when unset or invalid
pub fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let ctx = CliContext::load(cli.config.as_ref())?;

    match cli.command {
        Commands::Status => commands::status(&ctx),
        Commands::Login(args) => commands::login(&ctx, args),
        Commands::Logout => commands::logout(&ctx),
        Commands::Device(args) => commands::device(&ctx, args).await,
        Commands::Sessions => commands::sessions(&ctx).await,
        Commands::Revoke(args) => commands::revoke(&ctx, args).await,
        Commands::Decrypt(args) => commands::decrypt(&ctx, args),
    }
}
