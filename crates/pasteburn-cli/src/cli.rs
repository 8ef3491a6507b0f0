use clap::{ArgAction, Args, Parser, Subcommand};
use clap_complete::Shell;

use pasteburn_core::VERSION;

/// Pasteburn - self-destructing, optionally passphrase-protected pastes
#[derive(Parser)]
#[command(name = "pasteburn")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the config file
    #[arg(short, long, global = true, env = "PASTEBURN_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Public host used in paste URLs
    #[arg(long, default_value = "localhost")]
    pub host: String,

    /// Where the paste database will be created
    #[arg(long, value_name = "PATH")]
    pub store: Option<String>,

    /// Master key for administrative deletes
    #[arg(long, env = "PASTEBURN_MASTER_KEY", hide_env_values = true)]
    pub master_key: Option<String>,

    /// Hold new pastes until a CAPTCHA passes
    #[arg(long)]
    pub captcha: bool,

    /// Replace an existing config (generates a new identity)
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `put` command
#[derive(Args)]
pub struct PutArgs {
    /// File to upload (reads stdin when omitted or "-")
    #[arg(value_name = "FILE")]
    pub file: Option<String>,

    /// Passphrase required to read the paste
    #[arg(short, long, env = "PASTEBURN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Lifetime in hours; 0 burns the paste after its first read
    #[arg(short, long, value_name = "HOURS", allow_negative_numbers = true)]
    pub expire_hours: Option<i64>,

    /// Submitter address recorded with the paste
    #[arg(long, default_value = "127.0.0.1")]
    pub ip: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `get` command
#[derive(Args)]
pub struct GetArgs {
    /// Paste id or URL
    #[arg(value_name = "ID")]
    pub id: String,

    /// Passphrase for protected pastes
    #[arg(short, long, env = "PASTEBURN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Output exact bytes instead of rendered text
    #[arg(long)]
    pub raw: bool,

    /// Output as JSON
    #[arg(long, conflicts_with = "raw")]
    pub json: bool,
}

/// Arguments for the `confirm` command
#[derive(Args)]
pub struct ConfirmArgs {
    /// Paste id or verification reference
    #[arg(value_name = "ID")]
    pub id: String,
}

/// Arguments for the `delete` command
#[derive(Args)]
pub struct DeleteArgs {
    /// Paste id or URL
    #[arg(value_name = "ID")]
    pub id: String,

    /// Current master key hash (see `pasteburn admin-key`)
    #[arg(long, env = "PASTEBURN_KEY_HASH", hide_env_values = true)]
    pub key_hash: String,
}

/// Arguments for the `completions` command
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_name = "SHELL")]
    pub shell: Shell,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a config with a fresh service identity and an empty store
    Init(InitArgs),

    /// Store a new paste
    Put(PutArgs),

    /// Read a paste (burns it if it is burn-after-read)
    Get(GetArgs),

    /// Lift the verification hold on a paste
    Confirm(ConfirmArgs),

    /// Delete a paste with the master key hash
    Delete(DeleteArgs),

    /// Print the master key hash for the current hour
    AdminKey,

    /// Remove expired pastes
    Purge,

    /// Check store integrity
    Check,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
