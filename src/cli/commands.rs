//! CLI command definitions

use clap::{Parser, Subcommand};
use huddle::auth::{Role, Subject, DEFAULT_LIFETIME_SECS};
use huddle::config::{APP_CERTIFICATE_ENV, APP_ID_ENV};

#[derive(Parser)]
#[command(name = "huddle")]
#[command(about = "Meeting board backend and channel token minting", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Real-time application id
    #[arg(long, env = APP_ID_ENV, global = true)]
    pub app_id: Option<String>,

    /// Application certificate used to sign tokens
    #[arg(long, env = APP_CERTIFICATE_ENV, global = true, hide_env_values = true)]
    pub app_certificate: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to bind to
        #[arg(short, long, default_value = "0.0.0.0:3000", env = "HUDDLE_BIND")]
        bind: String,
    },

    /// Mint a channel token
    ///
    /// Examples:
    ///   huddle token standup
    ///   huddle token 10000 --uid 12345 --role subscriber --expiration 3600
    Token {
        /// Channel name
        channel: String,

        /// Numeric uid, or a string user account (0 lets the platform assign one)
        #[arg(long, default_value = "0")]
        uid: Subject,

        /// publisher or subscriber
        #[arg(long, default_value = "publisher")]
        role: Role,

        /// Lifetime in seconds
        #[arg(long, default_value_t = DEFAULT_LIFETIME_SECS, value_parser = clap::value_parser!(u32).range(1..))]
        expiration: u32,
    },

    /// Verify a token and show its claims
    Inspect {
        /// The token to check
        token: String,

        /// Only check the signature, so expired tokens still show their claims
        #[arg(long)]
        allow_expired: bool,
    },
}
