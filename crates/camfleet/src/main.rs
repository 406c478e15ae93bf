mod cli;
mod commands;
mod error;
mod output;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use secrecy::SecretString;
use tracing_subscriber::EnvFilter;

use camfleet_api::{ApiClient, TokenStore, TransportConfig};
use camfleet_core::{DeviceStore, NavigationGuard, SessionGuard};
use camfleet_config::{ClientSettings, Profile, profile_to_client_settings};

use crate::cli::{Cli, Command, GlobalOpts};
use crate::commands::AppContext;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a service connection
        Command::Config(args) => commands::config_cmd::handle(&args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "camfleet", &mut std::io::stdout());
            Ok(())
        }

        // All other commands talk to the inventory service
        cmd => {
            let app = build_app(&cli.global)?;
            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &app, &cli.global).await
        }
    }
}

/// Build the service-bound application context from the config file,
/// profile, and CLI overrides.
fn build_app(global: &GlobalOpts) -> Result<AppContext, CliError> {
    let cfg = camfleet_config::load_config_or_default();

    let profile_name = global
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into());

    // A --server flag can stand in for a missing profile entirely.
    let synthesized;
    let profile = match cfg.profiles.get(&profile_name) {
        Some(p) => p,
        None => {
            let server = global.server.clone().ok_or_else(|| CliError::NoConfig {
                path: camfleet_config::config_path().display().to_string(),
            })?;
            synthesized = Profile {
                server,
                ..Profile::default()
            };
            &synthesized
        }
    };

    let mut settings: ClientSettings =
        profile_to_client_settings(profile, &profile_name, &cfg.defaults)?;

    // CLI flags override the profile.
    if let Some(ref server) = global.server {
        settings.url = server.parse().map_err(|_| CliError::Validation {
            field: "server".into(),
            reason: format!("invalid URL: {server}"),
        })?;
    }
    if let Some(timeout) = global.timeout {
        settings.timeout = Duration::from_secs(timeout);
    }
    if global.insecure {
        settings.insecure = true;
    }

    let transport = TransportConfig {
        timeout: settings.timeout,
        accept_invalid_certs: settings.insecure,
    };

    let tokens = Arc::new(TokenStore::open(settings.token_path));
    let api = ApiClient::new(settings.url.clone(), tokens, &transport)?;

    let session = SessionGuard::new(api.clone());
    let nav = NavigationGuard::new(session.clone());
    let store = DeviceStore::new(api);

    let username = profile
        .username
        .clone()
        .or_else(|| std::env::var("CAMFLEET_USERNAME").ok());
    let password = std::env::var("CAMFLEET_PASSWORD")
        .ok()
        .or_else(|| profile.password.clone())
        .map(SecretString::from);

    Ok(AppContext {
        session,
        store,
        nav,
        profile_name,
        server: settings.url,
        username,
        password,
    })
}
