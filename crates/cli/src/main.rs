//! ZeeRemind CLI - invoice reminders with plan-aware limits

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;
use zeeremind_cli::api::auth::UpdateDetails;
use zeeremind_cli::commands::{self, auth, billing, init, invoices, status, Context};
use zeeremind_cli::{Cli, Commands, RequestError};
use zeeremind_core::{ChannelError, GateError};

const LOG_ENV: &str = "ZEEREMIND_LOG";

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        report(&err);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    if let Commands::Init { path } = &cli.command {
        return init::run(path.as_deref());
    }

    let ctx = Context::load(cli.api_url.as_deref(), cli.json)?;
    match &cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::Login { email, password } => auth::login(&ctx, email, password.as_deref()),
        Commands::Register {
            email,
            name,
            company,
            password,
        } => auth::register(&ctx, email, name, company, password.as_deref()),
        Commands::Logout => auth::logout(&ctx),
        Commands::Whoami => auth::whoami(&ctx),
        Commands::Verify { token } => auth::verify(&ctx, token),
        Commands::ResendVerification { email } => auth::resend_verification(&ctx, email),
        Commands::Profile {
            name,
            email,
            company,
        } => auth::profile(
            &ctx,
            UpdateDetails {
                name: name.clone(),
                email: email.clone(),
                company_name: company.clone(),
            },
        ),
        Commands::Password => auth::password(&ctx),
        Commands::Status => status::run(&ctx),
        Commands::Plans => status::plans(&ctx),
        Commands::Stats => invoices::stats(&ctx),
        Commands::Invoices { search, status } => {
            invoices::list(&ctx, search.as_deref(), status.as_deref())
        }
        Commands::Invoice { action } => invoices::run(&ctx, action),
        Commands::Billing { action } => billing::run(&ctx, action),
    }
}

fn report(err: &anyhow::Error) {
    if let Some(GateError::Blocked(prompt)) = err.downcast_ref::<GateError>() {
        commands::print_upgrade(prompt);
        return;
    }

    eprintln!("  {} {}", "Error:".red().bold(), err);
    match err.downcast_ref::<RequestError>() {
        Some(RequestError::AuthExpired) => {
            eprintln!("  Your session has expired. Run '{}'.", "zeeremind login <email>".bold());
        }
        Some(RequestError::Timeout | RequestError::Network(_)) => {
            eprintln!("  Is the backend running? Check api_url or ZEEREMIND_API_URL.");
        }
        _ => {}
    }
    if let Some(ChannelError::PhoneRequired(_)) = err.downcast_ref::<ChannelError>() {
        eprintln!("  Add one with 'zeeremind invoice edit <id> --phone <number>'.");
    }
}
