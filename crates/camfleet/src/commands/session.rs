//! Session command handlers: login, logout, status.

use owo_colors::OwoColorize;
use secrecy::SecretString;
use serde::Serialize;

use crate::cli::{GlobalOpts, LoginArgs};
use crate::error::CliError;
use crate::output;

use super::AppContext;

// ── login ────────────────────────────────────────────────────────────

pub async fn login(app: &AppContext, args: &LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let username = args
        .username
        .clone()
        .or_else(|| app.username.clone())
        .ok_or_else(|| CliError::NoCredentials {
            profile: app.profile_name.clone(),
        })?;

    let password = match app.password.clone() {
        Some(pw) => pw,
        None => prompt_password(&username)?,
    };

    let outcome = app.session.login(&username, &password).await;
    if !outcome.success {
        return Err(CliError::AuthFailed {
            message: outcome
                .message
                .unwrap_or_else(|| "Login failed".to_owned()),
        });
    }

    if !global.quiet {
        println!("Logged in as {username}");
    }
    Ok(())
}

fn prompt_password(username: &str) -> Result<SecretString, CliError> {
    let pw = rpassword::prompt_password(format!("Password for {username}: "))?;
    Ok(SecretString::from(pw))
}

// ── logout ───────────────────────────────────────────────────────────

pub async fn logout(app: &AppContext, global: &GlobalOpts) -> Result<(), CliError> {
    app.session.logout().await;
    if !global.quiet {
        println!("Logged out");
    }
    Ok(())
}

// ── status ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct SessionStatus {
    profile: String,
    server: String,
    service: String,
    authenticated: bool,
    role: Option<String>,
}

pub async fn status(app: &AppContext, global: &GlobalOpts) -> Result<(), CliError> {
    // A service that can't be reached still yields a useful report.
    let service = match app.session.health().await {
        Ok(health) => health.status,
        Err(_) => "unreachable".to_owned(),
    };

    // Revalidates against the service; a stored-but-stale token reports
    // as unauthenticated here (and gets cleared on a 401).
    let authenticated = app.session.check_auth().await;

    let status = SessionStatus {
        profile: app.profile_name.clone(),
        server: app.server.to_string(),
        service,
        authenticated,
        role: app
            .session
            .current_user()
            .await
            .map(|u| format!("{:?}", u.role).to_lowercase()),
    };

    let colored = output::should_color(&global.color);
    output::emit_single(
        &global.output,
        global.quiet,
        &status,
        |s| {
            let state = if s.authenticated {
                if colored {
                    "authenticated".green().to_string()
                } else {
                    "authenticated".to_owned()
                }
            } else if colored {
                "not authenticated".red().to_string()
            } else {
                "not authenticated".to_owned()
            };
            [
                format!("Profile: {}", s.profile),
                format!("Server:  {}", s.server),
                format!("Service: {}", s.service),
                format!("Session: {state}"),
                format!("Role:    {}", s.role.as_deref().unwrap_or("-")),
            ]
            .join("\n")
        },
        |s| {
            if s.authenticated {
                "authenticated".to_owned()
            } else {
                "unauthenticated".to_owned()
            }
        },
    );
    Ok(())
}
