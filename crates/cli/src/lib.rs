//! ZeeRemind CLI library, exposed for integration tests

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod api;
pub mod commands;
pub mod config;
pub mod gate;
pub mod progress;
pub mod snapshot;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use api::{ApiClient, RequestError};
pub use config::ClientConfig;
pub use gate::{CreateOutcome, UsageGate};
pub use snapshot::{SnapshotCell, SnapshotState};

#[derive(Parser)]
#[command(name = "zeeremind")]
#[command(about = "Automated invoice reminders from your terminal", long_about = None)]
#[command(version = zeeremind_core::VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend URL (overrides config and ZEEREMIND_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default config file
    Init {
        /// Where to write it (default: ~/.config/zeeremind/config.toml)
        path: Option<PathBuf>,
    },

    /// Log in and store the session token
    Login {
        email: String,

        /// Password (prompted if omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Create an account
    Register {
        email: String,

        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        company: String,

        /// Password (prompted if omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Remove the stored session token
    Logout,

    /// Show the logged-in account
    Whoami,

    /// Confirm an email address with the token from the verification mail
    Verify { token: String },

    /// Send the verification email again
    ResendVerification { email: String },

    /// Update name, email or company
    Profile {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        company: Option<String>,
    },

    /// Change the account password (prompts for all fields)
    Password,

    /// Show plan, usage and what you can do next
    Status,

    /// List available plans
    Plans,

    /// Dashboard totals
    Stats,

    /// List invoices
    Invoices {
        /// Match client name or email
        #[arg(long)]
        search: Option<String>,

        /// pending, paid or overdue
        #[arg(long)]
        status: Option<String>,
    },

    /// Work with a single invoice
    Invoice {
        #[command(subcommand)]
        action: commands::invoices::InvoiceAction,
    },

    /// Billing and subscription management
    Billing {
        #[command(subcommand)]
        action: commands::billing::BillingAction,
    },
}
