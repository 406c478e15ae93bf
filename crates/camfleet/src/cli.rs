//! Clap derive structures for the `camfleet` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// camfleet -- manage a camera-fleet inventory service
#[derive(Debug, Parser)]
#[command(
    name = "camfleet",
    version,
    about = "Manage camera inventory from the command line",
    long_about = "A CLI for administering a camera-fleet inventory service.\n\n\
        Authenticates against the service's token endpoint and keeps the\n\
        session token in a per-profile file until it expires.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Service profile to use
    #[arg(long, short = 'p', env = "CAMFLEET_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Service base URL (overrides profile)
    #[arg(long, short = 's', env = "CAMFLEET_SERVER", global = true)]
    pub server: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "CAMFLEET_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "CAMFLEET_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "CAMFLEET_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in to the inventory service and store the session token
    Login(LoginArgs),

    /// Discard the stored session token
    Logout,

    /// Show session status for the active profile
    Status,

    /// Manage camera devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// List regions
    #[command(alias = "reg")]
    Regions,

    /// Manage configuration profiles
    #[command(alias = "cfg")]
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Session ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Username (defaults to the profile's configured username)
    #[arg(long, short = 'u')]
    pub username: Option<String>,
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List devices
    #[command(alias = "ls")]
    List(DevicesListArgs),

    /// Show one device in detail
    Get {
        /// Device ID
        id: i64,
    },

    /// Import a new device
    #[command(alias = "add")]
    Import(DeviceImportArgs),

    /// Update fields on a device
    Update(DeviceUpdateArgs),

    /// Delete a device
    #[command(alias = "rm")]
    Delete {
        /// Device ID
        id: i64,
    },

    /// Show fleet-wide online/offline counts
    Stats,

    /// Probe device streams and report reachability
    Check(DeviceCheckArgs),
}

#[derive(Debug, Args)]
pub struct DeviceCheckArgs {
    /// Device ID (omit with --all)
    #[arg(required_unless_present = "all", conflicts_with = "all")]
    pub id: Option<i64>,

    /// Sweep the whole fleet instead of one device
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Args)]
pub struct DevicesListArgs {
    /// Only show devices in this region
    #[arg(long, short = 'r')]
    pub region: Option<String>,
}

#[derive(Debug, Args)]
pub struct DeviceImportArgs {
    /// Region the device belongs to
    #[arg(long)]
    pub region: String,

    /// Store the device is installed in
    #[arg(long)]
    pub store: String,

    /// Device IP address
    #[arg(long)]
    pub ip: String,

    /// Stream port
    #[arg(long)]
    pub port: Option<u16>,

    /// Stream username
    #[arg(long)]
    pub user: String,

    /// Stream password
    #[arg(long)]
    pub pwd: String,

    /// Channel count
    #[arg(long, default_value = "1")]
    pub chs: u16,

    /// Display name (defaults server-side)
    #[arg(long)]
    pub name: Option<String>,

    /// Stream protocol (defaults to rtsp server-side)
    #[arg(long)]
    pub protocol: Option<String>,
}

#[derive(Debug, Args)]
pub struct DeviceUpdateArgs {
    /// Device ID
    pub id: i64,

    /// New region
    #[arg(long)]
    pub region: Option<String>,

    /// New store
    #[arg(long)]
    pub store: Option<String>,

    /// New IP address
    #[arg(long)]
    pub ip: Option<String>,

    /// New stream port
    #[arg(long)]
    pub port: Option<u16>,

    /// New stream username
    #[arg(long)]
    pub user: Option<String>,

    /// New stream password
    #[arg(long)]
    pub pwd: Option<String>,

    /// New channel count
    #[arg(long)]
    pub chs: Option<u16>,

    /// New display name
    #[arg(long)]
    pub name: Option<String>,

    /// New stream protocol
    #[arg(long)]
    pub protocol: Option<String>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create or update a profile interactively-free via flags
    Set(ConfigSetArgs),

    /// Show the active configuration (passwords redacted)
    Show,

    /// Print the config file path
    Path,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },
}

#[derive(Debug, Args)]
pub struct ConfigSetArgs {
    /// Profile name
    #[arg(default_value = "default")]
    pub name: String,

    /// Service base URL
    #[arg(long)]
    pub server: String,

    /// Username for login
    #[arg(long)]
    pub username: Option<String>,

    /// Accept self-signed TLS certificates for this profile
    #[arg(long)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn command_tree_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn devices_check_takes_an_id_or_the_all_flag() {
        let cli = Cli::parse_from(["camfleet", "devices", "check", "--all"]);
        match cli.command {
            Command::Devices(args) => match args.command {
                DevicesCommand::Check(check) => {
                    assert!(check.all);
                    assert_eq!(check.id, None);
                }
                other => panic!("unexpected subcommand: {other:?}"),
            },
            other => panic!("unexpected command: {other:?}"),
        }

        assert!(Cli::try_parse_from(["camfleet", "devices", "check"]).is_err());
        assert!(Cli::try_parse_from(["camfleet", "devices", "check", "7", "--all"]).is_err());
    }

    #[test]
    fn devices_update_parses_partial_flags() {
        let cli = Cli::parse_from([
            "camfleet", "devices", "update", "5", "--region", "east",
        ]);
        match cli.command {
            Command::Devices(args) => match args.command {
                DevicesCommand::Update(update) => {
                    assert_eq!(update.id, 5);
                    assert_eq!(update.region.as_deref(), Some("east"));
                    assert_eq!(update.ip, None);
                }
                other => panic!("unexpected subcommand: {other:?}"),
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
