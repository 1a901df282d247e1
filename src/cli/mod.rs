//! CLI module for fomo.
//!
//! This module provides the command-line surface:
//! - Argument parsing
//! - Version display
//! - API key login/logout
//! - Interactive chat over the session socket
//! - Pending approval listing over REST
//!
//! # Usage
//!
//! ```ignore
//! use fomo::cli::{parse_args, run_cli_command};
//!
//! let command = parse_args(std::env::args());
//! if let Err(e) = run_cli_command(command, &config, &credentials).await {
//!     eprintln!("Error: {}", e);
//!     std::process::exit(1);
//! }
//! ```

pub mod args;
pub mod chat;
pub mod version;

pub use args::{parse_args, ChatArgs, CliCommand, USAGE};
pub use chat::run_chat;
pub use version::{handle_version_command, VERSION};

use color_eyre::eyre::{eyre, Result};
use tracing::info;

use crate::adapters::mock::EchoConnector;
use crate::adapters::TungsteniteConnector;
use crate::api::{ApiClient, ApprovalListParams};
use crate::auth::Credentials;
use crate::chat::ChatClient;
use crate::config::ClientConfig;
use crate::error::AuthError;
use crate::traits::CredentialsProvider;

/// API key used in mock mode when none is stored.
const MOCK_API_KEY: &str = "mock-api-key";

/// Run a parsed CLI command to completion.
pub async fn run_cli_command(
    command: CliCommand,
    config: &ClientConfig,
    credentials: &dyn CredentialsProvider,
) -> Result<()> {
    match command {
        CliCommand::Version => {
            handle_version_command();
            Ok(())
        }
        CliCommand::Help => {
            println!("{}", USAGE);
            Ok(())
        }
        CliCommand::Invalid(reason) => Err(eyre!("{}\n\n{}", reason, USAGE)),
        CliCommand::Login { api_key } => {
            let api_key = match api_key {
                Some(key) => key,
                None => prompt_api_key().await?,
            };
            login(credentials, api_key).await?;
            println!("API key saved.");
            Ok(())
        }
        CliCommand::Logout => {
            credentials.clear().await.map_err(AuthError::from)?;
            println!("Logged out.");
            Ok(())
        }
        CliCommand::Approvals { project_id } => {
            list_pending_approvals(config, credentials, project_id).await
        }
        CliCommand::Chat(args) => {
            if args.mock || config.use_mocks {
                let api_key = stored_api_key(credentials)
                    .await
                    .unwrap_or_else(|_| MOCK_API_KEY.to_string());
                info!("Starting chat in mock mode");
                let client =
                    ChatClient::from_config(EchoConnector::new(), config, args.project_id, api_key);
                run_chat(client, args.agent_id).await
            } else {
                let api_key = stored_api_key(credentials).await?;
                let connector =
                    TungsteniteConnector::new().with_queue_capacity(config.channel_capacity);
                let client = ChatClient::from_config(connector, config, args.project_id, api_key);
                run_chat(client, args.agent_id).await
            }
        }
    }
}

/// Validate and store an API key.
pub async fn login(credentials: &dyn CredentialsProvider, api_key: String) -> Result<()> {
    let api_key = api_key.trim().to_string();
    if api_key.is_empty() {
        return Err(eyre!("API key must not be empty"));
    }
    credentials
        .save(&Credentials::with_api_key(api_key))
        .await
        .map_err(AuthError::from)?;
    Ok(())
}

/// The stored API key, or [`AuthError::NotAuthenticated`].
pub async fn stored_api_key(credentials: &dyn CredentialsProvider) -> Result<String, AuthError> {
    match credentials.load().await? {
        Some(creds) if creds.has_api_key() => creds.api_key.ok_or(AuthError::NotAuthenticated),
        _ => Err(AuthError::NotAuthenticated),
    }
}

async fn prompt_api_key() -> Result<String> {
    let key = tokio::task::spawn_blocking(|| rpassword::prompt_password("API key: ")).await??;
    Ok(key)
}

async fn list_pending_approvals(
    config: &ClientConfig,
    credentials: &dyn CredentialsProvider,
    project_id: Option<String>,
) -> Result<()> {
    let api_key = stored_api_key(credentials).await?;
    let client = ApiClient::new(config.api_url.clone(), api_key);

    let mut params = ApprovalListParams::pending();
    if let Some(project_id) = project_id {
        params = params.for_project(project_id);
    }

    let page = client
        .list_approvals(&params)
        .await
        .map_err(|e| eyre!(e.user_message()))?;
    if page.items.is_empty() {
        println!("No pending approvals.");
        return Ok(());
    }

    for approval in &page.items {
        println!(
            "{}  {}  {}  session {}  {}",
            approval.id,
            approval.tool_id,
            approval.risk_level.as_deref().unwrap_or("-"),
            approval.session_id,
            approval.created_at.format("%Y-%m-%d %H:%M"),
        );
    }
    println!("{} of {} pending", page.items.len(), page.total);
    Ok(())
}
