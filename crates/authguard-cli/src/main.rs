//! authguard - guarded API requests from the terminal.
//!
//! Tokens live in the cache directory (or the OS keychain with `--keyring`),
//! so a token pair stored once is reused and refreshed across runs.

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use authguard_core::auth::token;
use authguard_core::{
    AuthClient, FileStore, Guard, GuardConfig, HeadlessHost, KeyringStore, RequestOptions,
    TokenStore,
};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable overriding the configured base URL
const BASE_URL_ENV: &str = "AUTHGUARD_BASE_URL";

#[derive(Parser)]
#[command(name = "authguard")]
#[command(about = "Guarded API requests with automatic token refresh")]
#[command(version)]
struct Cli {
    /// Keep tokens in the OS keychain instead of the cache directory
    #[arg(long, global = true)]
    keyring: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the page guard and report the outcome
    Check,

    /// Guarded GET request
    Get {
        url: String,
    },

    /// Guarded POST request with a JSON body
    Post {
        url: String,

        /// Request body
        #[arg(default_value = "{}")]
        json: String,
    },

    /// Show the claims of an access token
    Inspect {
        token: String,
    },

    /// Save a token pair obtained from a login
    Store {
        access: String,
        refresh: String,
    },

    /// Forget the stored tokens
    Logout,
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing();

    let mut config = GuardConfig::load()?;
    if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
        debug!(base_url = %base_url, "Base URL overridden from environment");
        config.base_url = base_url;
    }

    let store: Arc<dyn TokenStore> = if cli.keyring {
        Arc::new(KeyringStore::default())
    } else {
        Arc::new(FileStore::new(GuardConfig::cache_dir()?))
    };
    let host = Arc::new(HeadlessHost::new());
    let client = AuthClient::new(config, store, host.clone())
        .context("Failed to create HTTP client")?;

    match cli.command {
        Commands::Check => {
            let state = Guard::new(client).check().await;
            println!("state: {:?}", state);
            println!("page visible: {}", host.is_visible());
            if let Some(location) = host.location() {
                println!("redirected to: {}", location);
            }
        }
        Commands::Get { url } => {
            let response = client.get(&url).await?;
            print_response(response).await?;
        }
        Commands::Post { url, json } => {
            let body: serde_json::Value =
                serde_json::from_str(&json).context("Request body is not valid JSON")?;
            let response = client.send(&url, RequestOptions::post().json(body)).await?;
            print_response(response).await?;
        }
        Commands::Store { access, refresh } => {
            client
                .store_tokens(&access, &refresh)
                .context("Failed to save tokens")?;
            info!("Tokens stored");
            println!("tokens stored");
        }
        Commands::Logout => {
            client.logout();
            println!("logged out");
        }
        Commands::Inspect { token } => inspect(&token, client.config())?,
    }

    Ok(())
}

/// Whether the client would send `access` as-is under `config`
fn is_usable(access: &str, config: &GuardConfig) -> bool {
    !token::is_expired(access, config.skew_seconds)
}

/// Print the decoded claims of a token
fn inspect(access: &str, config: &GuardConfig) -> Result<()> {
    let claims = token::decode(access).context("Not a decodable access token")?;
    println!("{}", serde_json::to_string_pretty(claims.as_map())?);

    match claims.expires_at() {
        Some(expires_at) => {
            let remaining = expires_at - chrono::Utc::now();
            println!("expires: {} ({}s remaining)", expires_at, remaining.num_seconds());
        }
        None => println!("expires: unknown (no exp claim)"),
    }
    println!("usable: {}", is_usable(access, config));
    Ok(())
}

async fn print_response(response: reqwest::Response) -> Result<()> {
    let status = response.status();
    let body = response.text().await.context("Failed to read response body")?;
    println!("{}", status);
    if !body.is_empty() {
        println!("{}", body);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `{"exp":9999999999}` as the payload
    const FAR_FUTURE_TOKEN: &str = "e30.eyJleHAiOjk5OTk5OTk5OTl9.sig";

    #[test]
    fn test_parse_post_with_default_body() {
        let cli = Cli::try_parse_from(["authguard", "post", "/api/notes/"]).unwrap();
        assert!(!cli.keyring);
        match cli.command {
            Commands::Post { url, json } => {
                assert_eq!(url, "/api/notes/");
                assert_eq!(json, "{}");
            }
            _ => panic!("expected post"),
        }
    }

    #[test]
    fn test_keyring_flag_is_global() {
        let cli = Cli::try_parse_from(["authguard", "store", "a", "r", "--keyring"]).unwrap();
        assert!(cli.keyring);
        assert!(matches!(cli.command, Commands::Store { .. }));

        let cli = Cli::try_parse_from(["authguard", "--keyring", "logout"]).unwrap();
        assert!(cli.keyring);
    }

    #[test]
    fn test_missing_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["authguard"]).is_err());
        assert!(Cli::try_parse_from(["authguard", "store", "only-access"]).is_err());
        assert!(Cli::try_parse_from(["authguard", "frobnicate"]).is_err());
    }

    #[test]
    fn test_usable_follows_configured_skew() {
        let config = GuardConfig::default();
        assert!(is_usable(FAR_FUTURE_TOKEN, &config));

        let wide = GuardConfig {
            skew_seconds: i64::MAX,
            ..GuardConfig::default()
        };
        assert!(!is_usable(FAR_FUTURE_TOKEN, &wide));
    }
}
