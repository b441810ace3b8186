// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use super::CliContext;
use crate::api::parse_data;
use crate::device::{DeviceAttributes, SessionRecorder};
use crate::session::{SessionRecord, User};
use anyhow::{anyhow, Context as _, Result};
use clap::Args;
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;

/// Arguments for login command
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Bearer token issued by the API
    #[arg(long, env = "ROJIFI_AUTHORIZATION")]
    pub authorization: String,

    /// JSON file with the user snapshot returned at sign-in
    #[arg(long)]
    pub user: Option<PathBuf>,

    /// Active wallet id
    #[arg(long)]
    pub wallet: Option<String>,
}

/// Arguments for device command
#[derive(Args, Debug)]
pub struct DeviceArgs {
    /// Also send the device session to the server
    #[arg(long)]
    pub save: bool,
}

/// Arguments for revoke command
#[derive(Args, Debug)]
pub struct RevokeArgs {
    /// Server-side session id
    pub id: String,
}

/// Arguments for decrypt command
#[derive(Args, Debug)]
pub struct DecryptArgs {
    /// Handshake value from the response
    #[arg(long)]
    pub handshake: String,

    /// Base64 `data` field from the response
    #[arg(long)]
    pub data: String,
}

pub fn status(ctx: &CliContext) -> Result<()> {
    let data = ctx.session.get_user_data();

    println!("Logged in:     {}", data.is_logged_in);
    println!("Device id:     {}", data.device_id);
    println!("API:           {}", ctx.config.api.base_url);
    if let Some(user) = &data.user {
        println!("User:          {} {} <{}>", user.firstname, user.lastname, user.email);
    }
    if let Some(sender) = &data.sender {
        println!("Business:      {}", sender.business_name);
    }
    if !data.active_wallet.is_empty() {
        println!("Active wallet: {}", data.active_wallet);
    }
    println!(
        "Token:         {}",
        if data.authorization.is_empty() { "none" } else { "present" }
    );
    Ok(())
}

pub fn login(ctx: &CliContext, args: LoginArgs) -> Result<()> {
    let user = match args.user {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Some(serde_json::from_str::<User>(&content).context("invalid user JSON")?)
        }
        None => None,
    };

    let record = SessionRecord {
        user,
        authorization: args.authorization,
        active_wallet: args.wallet.unwrap_or_default(),
        ..Default::default()
    };

    ctx.session.login(record);
    info!("Session stored in {}", ctx.config.storage_path.display());
    println!("✅ Logged in");
    Ok(())
}

pub fn logout(ctx: &CliContext) -> Result<()> {
    ctx.session.logout();
    println!("✅ Logged out");
    Ok(())
}

pub async fn device(ctx: &CliContext, args: DeviceArgs) -> Result<()> {
    let recorder = SessionRecorder::new(ctx.client.clone(), DeviceAttributes::detect());

    if recorder.init()? {
        println!("Created local device session");
    }
    let session = recorder
        .current()?
        .ok_or_else(|| anyhow!("device session missing after init"))?;
    println!("{}", serde_json::to_string_pretty(&session)?);

    if args.save {
        if recorder.save().await {
            println!("✅ Device session saved");
        } else {
            println!("❌ Device session not saved (see logs)");
        }
    }
    Ok(())
}

pub async fn sessions(ctx: &CliContext) -> Result<()> {
    let recorder = SessionRecorder::new(ctx.client.clone(), DeviceAttributes::detect());
    let sessions = recorder
        .sessions()
        .await
        .ok_or_else(|| anyhow!("could not fetch sessions"))?;

    if sessions.is_empty() {
        println!("No sessions");
    }
    for s in sessions {
        println!(
            "{}{}  {} on {}  last active {}",
            if s.current { "* " } else { "  " },
            s.id,
            s.browser,
            s.os,
            s.last_active.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

pub async fn revoke(ctx: &CliContext, args: RevokeArgs) -> Result<()> {
    let recorder = SessionRecorder::new(ctx.client.clone(), DeviceAttributes::detect());
    if recorder.revoke(&args.id).await {
        println!("✅ Session {} revoked", args.id);
        Ok(())
    } else {
        Err(anyhow!("failed to revoke session {}", args.id))
    }
}

pub fn decrypt(ctx: &CliContext, args: DecryptArgs) -> Result<()> {
    let value: Value = parse_data(&args.data, &args.handshake, &ctx.session.keys())?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
