//! Config command handlers (no service connection required).

use tabled::Tabled;

use camfleet_config::{Profile, config_path, load_config_or_default, save_config};

use crate::cli::{ConfigArgs, ConfigCommand, ConfigSetArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Clone, Tabled, serde::Serialize)]
struct ProfileRow {
    #[tabled(rename = "Profile")]
    name: String,
    #[tabled(rename = "Server")]
    server: String,
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "Default")]
    default: String,
}

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match &args.command {
        ConfigCommand::Set(set_args) => set(set_args, global),
        ConfigCommand::Show => show(global),
        ConfigCommand::Path => {
            output::emit_text(&config_path().display().to_string(), global.quiet);
            Ok(())
        }
        ConfigCommand::Profiles => profiles(global),
        ConfigCommand::Use { name } => use_profile(name, global),
    }
}

fn set(args: &ConfigSetArgs, global: &GlobalOpts) -> Result<(), CliError> {
    // Reject a bad URL before persisting it.
    let _: url::Url = args.server.parse().map_err(|_| CliError::Validation {
        field: "server".into(),
        reason: format!("invalid URL: {}", args.server),
    })?;

    let mut cfg = load_config_or_default();

    let profile = cfg.profiles.entry(args.name.clone()).or_insert_with(Profile::default);
    profile.server.clone_from(&args.server);
    if args.username.is_some() {
        profile.username.clone_from(&args.username);
    }
    if args.insecure {
        profile.insecure = Some(true);
    }
    if args.timeout.is_some() {
        profile.timeout = args.timeout;
    }

    if cfg.default_profile.is_none() {
        cfg.default_profile = Some(args.name.clone());
    }

    save_config(&cfg)?;
    if !global.quiet {
        println!("Profile '{}' saved to {}", args.name, config_path().display());
    }
    Ok(())
}

fn show(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = load_config_or_default();

    // Redact passwords before anything reaches stdout.
    let mut value = serde_json::to_value(&cfg)?;
    if let Some(profiles) = value.get_mut("profiles").and_then(|p| p.as_object_mut()) {
        for profile in profiles.values_mut() {
            if let Some(pw) = profile.get_mut("password") {
                if !pw.is_null() {
                    *pw = serde_json::Value::String("<redacted>".into());
                }
            }
        }
    }

    output::emit_single(
        &global.output,
        global.quiet,
        &value,
        |v| serde_json::to_string_pretty(v).unwrap_or_default(),
        |_| config_path().display().to_string(),
    );
    Ok(())
}

fn profiles(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = load_config_or_default();
    let default = cfg.default_profile.as_deref().unwrap_or("");

    let mut names: Vec<&String> = cfg.profiles.keys().collect();
    names.sort();

    let rows: Vec<ProfileRow> = names
        .iter()
        .filter_map(|name| cfg.profiles.get(*name).map(|p| (name, p)))
        .map(|(name, p)| ProfileRow {
            name: (*name).clone(),
            server: p.server.clone(),
            username: p.username.clone().unwrap_or_default(),
            default: if *name == default { "*".into() } else { String::new() },
        })
        .collect();

    output::emit_list(&global.output, global.quiet, &rows, Clone::clone, |r| {
        r.name.clone()
    });
    Ok(())
}

fn use_profile(name: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = load_config_or_default();

    if !cfg.profiles.contains_key(name) {
        let mut available: Vec<&String> = cfg.profiles.keys().collect();
        available.sort();
        return Err(CliError::ProfileNotFound {
            name: name.to_owned(),
            available: available
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        });
    }

    cfg.default_profile = Some(name.to_owned());
    save_config(&cfg)?;
    if !global.quiet {
        println!("Default profile set to '{name}'");
    }
    Ok(())
}
