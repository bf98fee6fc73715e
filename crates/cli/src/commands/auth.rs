//! Account commands: login, register, logout, profile, password

use super::{prompt_line, Context};
use crate::api::auth::{self, PasswordChange, RegisterOutcome, RegisterRequest, UpdateDetails};
use crate::progress::Step;
use anyhow::{bail, Result};
use colored::Colorize;

pub fn login(ctx: &Context, email: &str, password: Option<&str>) -> Result<()> {
    let password = password_or_prompt(password, "Password")?;

    let step = Step::new("Signing in");
    match auth::login(&ctx.client, email, &password) {
        Ok(_) => step.finish(),
        Err(e) => {
            step.fail();
            return Err(e.into());
        }
    }

    // Pull the plan right away so the first gated command has it.
    if ctx.gate.refresh().is_ok() {
        if let Some(view) = ctx.gate.entitlement() {
            eprintln!("  {}: {}", "Plan".bold(), view.plan.to_string().cyan());
        }
    }
    Ok(())
}

pub fn register(
    ctx: &Context,
    email: &str,
    name: &str,
    company: &str,
    password: Option<&str>,
) -> Result<()> {
    let password = password_or_prompt(password, "Password")?;
    let request = RegisterRequest::new(name, company, email, &password);

    let outcome = Step::run("Creating account", || auth::register(&ctx.client, &request))?;
    match outcome {
        RegisterOutcome::LoggedIn => {
            eprintln!("  {} Account created and signed in.", "\u{2713}".green());
        }
        RegisterOutcome::VerificationSent(message) => {
            eprintln!("  {} {}", "\u{2709}".cyan(), message);
            eprintln!(
                "  Then run {}",
                "zeeremind verify <token>".bold()
            );
        }
    }
    Ok(())
}

pub fn logout(ctx: &Context) -> Result<()> {
    auth::logout(&ctx.client)?;
    ctx.gate.forget();
    eprintln!("  {} Logged out.", "\u{2713}".green());
    Ok(())
}

pub fn whoami(ctx: &Context) -> Result<()> {
    let user = Step::run("Loading account", || auth::me(&ctx.client))?;
    if ctx.json {
        return super::print_json(&user);
    }

    eprintln!("  {}: {}", "Name".bold(), user.name);
    eprintln!("  {}: {}", "Email".bold(), user.email);
    if let Some(company) = user.company_name.as_deref().filter(|c| !c.is_empty()) {
        eprintln!("  {}: {}", "Company".bold(), company);
    }
    if !user.is_email_verified {
        eprintln!("  {}", "Email not verified".yellow());
    }
    Ok(())
}

pub fn verify(ctx: &Context, token: &str) -> Result<()> {
    let message = Step::run("Verifying email", || auth::verify_email(&ctx.client, token))?;
    eprintln!("  {} {}", "\u{2713}".green(), message);
    Ok(())
}

pub fn resend_verification(ctx: &Context, email: &str) -> Result<()> {
    let message = Step::run("Sending verification email", || {
        auth::resend_verification(&ctx.client, email)
    })?;
    eprintln!("  {} {}", "\u{2709}".cyan(), message);
    Ok(())
}

pub fn profile(ctx: &Context, details: UpdateDetails) -> Result<()> {
    if details.name.is_none() && details.email.is_none() && details.company_name.is_none() {
        bail!("Nothing to update; pass --name, --email or --company");
    }
    let user = Step::run("Updating profile", || auth::update_details(&ctx.client, &details))?;
    eprintln!("  {} Saved {} <{}>", "\u{2713}".green(), user.name, user.email);
    Ok(())
}

pub fn password(ctx: &Context) -> Result<()> {
    let change = PasswordChange {
        current: prompt_line("Current password")?,
        new: prompt_line("New password")?,
        confirm: prompt_line("Confirm new password")?,
    };
    change.validate()?;

    Step::run("Changing password", || auth::update_password(&ctx.client, &change))?;
    eprintln!("  {} Password updated.", "\u{2713}".green());
    Ok(())
}

fn password_or_prompt(given: Option<&str>, label: &str) -> Result<String> {
    match given {
        Some(p) => Ok(p.to_string()),
        None => {
            let p = prompt_line(label)?;
            if p.is_empty() {
                bail!("Password is required");
            }
            Ok(p)
        }
    }
}
