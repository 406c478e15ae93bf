//! Command dispatch: bridges CLI args -> core guards/stores -> output.

pub mod config_cmd;
pub mod devices;
pub mod regions;
pub mod session;

use camfleet_core::{NavDecision, NavigationGuard, Route, SessionGuard};
use secrecy::SecretString;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Everything a service-bound command handler needs.
pub struct AppContext {
    pub session: SessionGuard,
    pub store: camfleet_core::DeviceStore,
    pub nav: NavigationGuard,
    pub profile_name: String,
    pub server: url::Url,
    /// Username from the profile or environment, if configured.
    pub username: Option<String>,
    /// Password from the environment or profile, if configured.
    pub password: Option<SecretString>,
}

/// Dispatch a service-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    app: &AppContext,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => session::login(app, &args, global).await,
        Command::Logout => session::logout(app, global).await,
        Command::Status => session::status(app, global).await,
        Command::Devices(args) => devices::handle(app, args, global).await,
        Command::Regions => regions::handle(app, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}

/// Gate a protected operation behind the navigation guard.
///
/// An unverified stored token gets validated here (one round-trip); a
/// missing or rejected token resolves to a redirect, which on a CLI
/// means "go log in".
pub async fn ensure_session(app: &AppContext, route_path: &str) -> Result<(), CliError> {
    match app.nav.resolve(&Route::protected(route_path)).await {
        NavDecision::Allow => Ok(()),
        NavDecision::Redirect { .. } => Err(CliError::AuthRequired),
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}
