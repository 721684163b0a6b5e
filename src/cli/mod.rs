//! CLI module for NovaDom
//!
//! Provides command-line interface parsing and handling for the novadom-server binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod admin;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// NovaDom identity server
///
/// Registration, login and developer verification for the NovaDom platform.
#[derive(Parser, Debug)]
#[command(
    name = "novadom-server",
    version,
    about = "NovaDom identity and access server",
    long_about = "Registration, login and admin review of developer accounts for the\n\
                  NovaDom new-construction real estate platform.\n\n\
                  Run without arguments to start the server.",
    after_help = "EXAMPLES:\n    \
                  novadom-server                              # Start the server (reads novadom.toml)\n    \
                  novadom-server --config prod.toml           # Use a custom config file\n    \
                  novadom-server config --validate            # Check config and env vars\n    \
                  novadom-server admin create                 # Create the initial admin from env vars\n    \
                  novadom-server admin list                   # List admin accounts\n    \
                  novadom-server admin deactivate a@novadom.bg # Disable an admin"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "novadom.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server (the default)
    Serve,

    /// Show configuration information
    Config {
        /// Validate the configuration file and referenced env vars
        #[arg(long)]
        validate: bool,
    },

    /// Manage admin accounts
    #[command(subcommand)]
    Admin(AdminCommands),
}

/// Admin management subcommands
#[derive(Subcommand, Debug)]
pub enum AdminCommands {
    /// Create an admin. The password is always read from the environment
    /// variable named by `admin.password_env`.
    Create {
        /// Email of the new admin (defaults to the `admin.email_env` variable)
        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,
    },

    /// List all admin accounts
    List,

    /// Deactivate an admin account
    Deactivate {
        /// Email of the admin to deactivate
        email: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
