//! Device command handlers.

use owo_colors::OwoColorize;
use tabled::Tabled;

use camfleet_api::{RetryPolicy, retry};
use camfleet_core::{Device, DeviceUpdate, NewDevice, StatusCheck};

use crate::cli::{
    DeviceCheckArgs, DeviceImportArgs, DeviceUpdateArgs, DevicesArgs, DevicesCommand,
    DevicesListArgs, GlobalOpts, OutputFormat,
};
use crate::error::CliError;
use crate::output;

use super::{AppContext, confirm, ensure_session};

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Region")]
    region: String,
    #[tabled(rename = "Store")]
    store: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Chs")]
    chs: u16,
    #[tabled(rename = "Protocol")]
    protocol: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl DeviceRow {
    fn from_device(d: &Device, colored: bool) -> Self {
        Self {
            id: d.id,
            name: d.name.clone(),
            region: d.region.clone(),
            store: d.store.clone(),
            ip: d.ip.clone(),
            chs: d.chs,
            protocol: d.protocol.clone(),
            status: status_cell(d.status.as_deref(), colored),
        }
    }
}

#[derive(Tabled)]
struct CheckRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl CheckRow {
    fn from_check(c: &StatusCheck, colored: bool) -> Self {
        Self {
            id: c.device_id,
            name: c.name.clone(),
            ip: c.ip.clone(),
            status: status_cell(Some(&c.status), colored),
        }
    }
}

fn status_cell(status: Option<&str>, colored: bool) -> String {
    let text = status.unwrap_or("-");
    if !colored {
        return text.to_owned();
    }
    match text {
        "online" => text.green().to_string(),
        "offline" => text.red().to_string(),
        _ => text.to_owned(),
    }
}

fn detail(d: &Device) -> String {
    [
        format!("ID:       {}", d.id),
        format!("Name:     {}", d.name),
        format!("Region:   {}", d.region),
        format!("Store:    {}", d.store),
        format!("IP:       {}", d.ip),
        format!(
            "Port:     {}",
            d.port.map_or_else(|| "-".into(), |p| p.to_string())
        ),
        format!("User:     {}", d.user),
        format!("Channels: {}", d.chs),
        format!("Protocol: {}", d.protocol),
        format!("Status:   {}", d.status.as_deref().unwrap_or("-")),
        format!("Created:  {}", d.created_at.as_deref().unwrap_or("-")),
    ]
    .join("\n")
}

fn check_detail(c: &StatusCheck) -> String {
    [
        format!("Device:  {} ({})", c.name, c.device_id),
        format!("IP:      {}", c.ip),
        format!("Status:  {}", c.status),
        format!("Checked: {}", c.checked_at),
    ]
    .join("\n")
}

// ── Dispatch ────────────────────────────────────────────────────────

pub async fn handle(
    app: &AppContext,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    ensure_session(app, "/devices").await?;

    match args.command {
        DevicesCommand::List(list_args) => list(app, &list_args, global).await,
        DevicesCommand::Get { id } => get(app, id, global).await,
        DevicesCommand::Import(import_args) => import(app, import_args, global).await,
        DevicesCommand::Update(update_args) => update(app, &update_args, global).await,
        DevicesCommand::Delete { id } => delete(app, id, global).await,
        DevicesCommand::Stats => stats(app, global).await,
        DevicesCommand::Check(check_args) => check(app, &check_args, global).await,
    }
}

// ── Handlers ────────────────────────────────────────────────────────

async fn list(
    app: &AppContext,
    args: &DevicesListArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    app.store.refresh_devices().await?;

    let devices = match args.region.as_deref() {
        Some(region) => app.store.devices_in_region(region),
        None => app.store.devices_snapshot(),
    };

    let colored = output::should_color(&global.color);
    output::emit_list(
        &global.output,
        global.quiet,
        &devices,
        |d| DeviceRow::from_device(d, colored),
        |d| d.id.to_string(),
    );
    Ok(())
}

async fn get(app: &AppContext, id: i64, global: &GlobalOpts) -> Result<(), CliError> {
    app.store.refresh_devices().await?;

    let device = app.store.device_by_id(id).ok_or_else(|| CliError::NotFound {
        resource_type: "device".into(),
        identifier: id.to_string(),
        list_command: "devices list".into(),
    })?;

    output::emit_single(&global.output, global.quiet, &device, detail, |d| {
        d.id.to_string()
    });
    Ok(())
}

async fn import(
    app: &AppContext,
    args: DeviceImportArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let new_device = NewDevice {
        region: args.region,
        store: args.store,
        ip: args.ip,
        port: args.port,
        user: args.user,
        pwd: args.pwd,
        chs: args.chs,
        name: args.name,
        protocol: args.protocol,
    };

    let outcome = app.store.import_device(&new_device).await;
    if !outcome.success {
        return Err(CliError::OperationFailed {
            message: outcome.message.unwrap_or_else(|| "Import failed".into()),
        });
    }

    if !global.quiet {
        println!("Device imported");
    }
    Ok(())
}

async fn update(
    app: &AppContext,
    args: &DeviceUpdateArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let update = DeviceUpdate {
        region: args.region.clone(),
        store: args.store.clone(),
        ip: args.ip.clone(),
        port: args.port,
        user: args.user.clone(),
        pwd: args.pwd.clone(),
        chs: args.chs,
        name: args.name.clone(),
        protocol: args.protocol.clone(),
    };

    // The server rejects an empty update; catch it before the round-trip.
    if serde_json::to_value(&update)?
        .as_object()
        .is_none_or(serde_json::Map::is_empty)
    {
        return Err(CliError::Validation {
            field: "update".into(),
            reason: "no fields to update; pass at least one --<field> flag".into(),
        });
    }

    let outcome = app.store.update_device(args.id, &update).await;
    if !outcome.success {
        return Err(CliError::OperationFailed {
            message: outcome.message.unwrap_or_else(|| "Update failed".into()),
        });
    }

    if !global.quiet {
        println!("Device {} updated", args.id);
    }
    Ok(())
}

async fn delete(app: &AppContext, id: i64, global: &GlobalOpts) -> Result<(), CliError> {
    if !confirm(&format!("Delete device {id}?"), global.yes)? {
        if !global.quiet {
            println!("Aborted");
        }
        return Ok(());
    }

    let outcome = app.store.delete_device(id).await;
    if !outcome.success {
        return Err(CliError::OperationFailed {
            message: outcome.message.unwrap_or_else(|| "Delete failed".into()),
        });
    }

    if !global.quiet {
        println!("Device {id} deleted");
    }
    Ok(())
}

async fn stats(app: &AppContext, global: &GlobalOpts) -> Result<(), CliError> {
    let stats = app.store.stats().await?;

    output::emit_single(
        &global.output,
        global.quiet,
        &stats,
        |s| {
            [
                format!("Total:   {}", s.total),
                format!("Online:  {}", s.online),
                format!("Offline: {}", s.offline),
            ]
            .join("\n")
        },
        |s| s.total.to_string(),
    );
    Ok(())
}

async fn check(
    app: &AppContext,
    args: &DeviceCheckArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if args.all {
        return check_all(app, global).await;
    }

    let Some(id) = args.id else {
        // clap enforces id-or-all; this is unreachable through the parser.
        return Err(CliError::Validation {
            field: "id".into(),
            reason: "a device ID or --all is required".into(),
        });
    };

    // The probe is idempotent and prone to transient NVR hiccups.
    let result = retry(RetryPolicy::default(), || app.store.check_status(id)).await?;

    output::emit_single(&global.output, global.quiet, &result, check_detail, |c| {
        c.status.clone()
    });
    Ok(())
}

async fn check_all(app: &AppContext, global: &GlobalOpts) -> Result<(), CliError> {
    let report = app.store.check_all().await?;

    match global.output {
        OutputFormat::Table | OutputFormat::Plain => {
            let colored = output::should_color(&global.color);
            output::emit_list(
                &global.output,
                global.quiet,
                &report.results,
                |c| CheckRow::from_check(c, colored),
                |c| format!("{}\t{}", c.device_id, c.status),
            );
            if !global.quiet && matches!(global.output, OutputFormat::Table) {
                println!(
                    "{} of {} online ({:.1}%)",
                    report.online_devices, report.checked_devices, report.online_rate
                );
            }
        }
        // Structured formats carry the summary fields alongside the results.
        _ => output::emit_single(
            &global.output,
            global.quiet,
            &report,
            |_| String::new(),
            |r| r.online_rate.to_string(),
        ),
    }
    Ok(())
}
