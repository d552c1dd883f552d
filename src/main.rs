//! Huddle CLI entry point

mod cli;

use crate::cli::{Cli, Commands};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use huddle::auth::{self, AccessToken, Role, Subject, TokenRequest};
use huddle::channels::Channel;
use huddle::config::AppCredentials;
use huddle::server::{self, AppState};
use huddle::storage::MemoryStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let credentials = || {
        AppCredentials::from_parts(cli.app_id.clone(), cli.app_certificate.clone())
            .context("Signing credentials required (--app-id and --app-certificate)")
    };

    match &cli.command {
        Commands::Serve { bind } => serve(bind, credentials().ok()).await,
        Commands::Token {
            channel,
            uid,
            role,
            expiration,
        } => token(credentials()?, channel, uid.clone(), *role, *expiration),
        Commands::Inspect {
            token,
            allow_expired,
        } => inspect(credentials()?, token, *allow_expired),
    }
}

async fn serve(bind: &str, credentials: Option<AppCredentials>) -> Result<()> {
    let bind_addr: SocketAddr = bind.parse().context("Invalid bind address")?;
    let store = Arc::new(MemoryStore::bundled().context("Failed to load board fixtures")?);
    let state = AppState::new(credentials, store);

    info!("Starting Huddle server...");
    server::run_server(bind_addr, state, shutdown_signal()).await?;

    info!("Huddle server stopped");
    Ok(())
}

fn token(
    credentials: AppCredentials,
    channel: &str,
    uid: Subject,
    role: Role,
    expiration: u32,
) -> Result<()> {
    let channel = Channel::parse(channel)
        .with_context(|| format!("Invalid channel name: {}", channel))?;
    let request = TokenRequest::new(channel)
        .subject(uid)
        .role(role)
        .lifetime_secs(expiration);

    let credential = auth::issue(&credentials, &request, auth::now_secs())
        .context("Failed to generate token")?;

    println!("{}", credential.token);
    println!();
    println!("Channel: {}", request.channel);
    if request.subject.is_auto_assigned() {
        println!("UID: 0 (assigned by the platform on join)");
    } else {
        println!("UID: {}", request.subject);
    }
    println!("Role: {}", request.role);
    println!("Expires: {}", credential.expires_at_rfc3339());

    Ok(())
}

fn inspect(credentials: AppCredentials, token: &str, allow_expired: bool) -> Result<()> {
    let checked = if allow_expired {
        AccessToken::parse(token, &credentials.certificate)
    } else {
        AccessToken::verify(
            token,
            &credentials.app_id,
            &credentials.certificate,
            auth::now_secs(),
        )
    };
    let parsed = checked.context("Token rejected")?;

    let claims = parsed.claims();
    let expires = i64::try_from(claims.expires_at)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map_or_else(|| claims.expires_at.to_string(), |at| at.to_rfc3339());

    println!("Token OK");
    println!("App ID: {}", claims.app_id);
    println!("Channel: {}", claims.channel);
    println!("UID: {}", claims.subject);
    println!("Role: {}", claims.role);
    println!("Privileges:");
    for privilege in claims.role.privileges() {
        println!("  {}", privilege);
    }
    println!("Expires: {}", expires);

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping server");
}
