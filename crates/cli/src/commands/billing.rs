//! Billing commands: checkout, cancel, portal, history

use super::{format_date, print_json, Context};
use crate::api::payment::{self, BillingPeriod, CheckoutKind};
use crate::api::subscription;
use crate::progress::Step;
use anyhow::{anyhow, Result};
use colored::Colorize;
use zeeremind_core::Feature;

#[derive(Debug, Clone, clap::Subcommand)]
pub enum BillingAction {
    /// Past payments
    History,

    /// Start a checkout for a paid plan
    Checkout {
        #[arg(default_value = "pro")]
        plan: String,

        #[arg(long, value_enum, default_value_t = BillingPeriod::Monthly)]
        period: BillingPeriod,
    },

    /// Cancel at the end of the current period
    Cancel {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Open the payment processor's customer portal
    Portal,

    /// Raw usage statistics
    Usage,

    /// Ask the backend whether a feature is enabled
    Feature { key: String },
}

pub fn run(ctx: &Context, action: &BillingAction) -> Result<()> {
    match action {
        BillingAction::History => history(ctx),
        BillingAction::Checkout { plan, period } => checkout(ctx, plan, *period),
        BillingAction::Cancel { yes } => cancel(ctx, *yes),
        BillingAction::Portal => portal(ctx),
        BillingAction::Usage => {
            let usage = Step::run("Loading usage", || subscription::usage(&ctx.client))?;
            print_json(&usage)
        }
        BillingAction::Feature { key } => feature(ctx, key),
    }
}

fn history(ctx: &Context) -> Result<()> {
    let rows = Step::run("Loading billing history", || {
        subscription::billing_history(&ctx.client)
    })?;
    if ctx.json {
        return print_json(&rows);
    }
    if rows.is_empty() {
        eprintln!("  No payments yet.");
        return Ok(());
    }
    for tx in &rows {
        let date = tx.billed_at.as_deref().unwrap_or(&tx.created_at);
        eprintln!(
            "  {:<14} {:>10} {:<4} {:<10} {}",
            format_date(date),
            tx.amount,
            tx.currency,
            tx.status,
            tx.receipt_url.as_deref().unwrap_or("").dimmed()
        );
    }
    Ok(())
}

fn checkout(ctx: &Context, plan: &str, period: BillingPeriod) -> Result<()> {
    let session = Step::run("Creating checkout", || {
        payment::create_checkout(&ctx.client, plan, period)
    })?;

    // Overlay checkouts only run inside the web app.
    let url = match (session.kind, session.redirect_url()) {
        (CheckoutKind::Redirect, Some(url)) => url.to_string(),
        (CheckoutKind::Redirect, None) => return Err(anyhow!("Checkout URL missing")),
        (CheckoutKind::Client, _) => {
            format!("{}/pricing", ctx.client.config().web_url.trim_end_matches('/'))
        }
    };
    open_in_browser(&url);
    eprintln!(
        "  After paying, run '{}' to see your new plan.",
        "zeeremind status".bold()
    );
    Ok(())
}

fn cancel(ctx: &Context, yes: bool) -> Result<()> {
    if !yes {
        let answer = super::prompt_line("Cancel your subscription at period end? [y/N]")?;
        if !answer.eq_ignore_ascii_case("y") {
            eprintln!("  Nothing changed.");
            return Ok(());
        }
    }

    Step::run("Cancelling subscription", || ctx.gate.cancel_subscription())?;
    eprintln!("  {} Subscription will end at period end.", "\u{2713}".green());
    if let Some(view) = ctx.gate.entitlement().filter(|v| v.cancel_at_period_end) {
        eprintln!("  You keep {} until then.", view.plan.to_string().cyan());
    }
    Ok(())
}

fn portal(ctx: &Context) -> Result<()> {
    let url = Step::run("Opening portal", || payment::portal_url(&ctx.client))?;
    open_in_browser(&url);
    Ok(())
}

fn feature(ctx: &Context, key: &str) -> Result<()> {
    let feature = Feature::from_key(key).ok_or_else(|| {
        let known: Vec<&str> = Feature::ALL.iter().map(|f| f.key()).collect();
        anyhow!("Unknown feature '{}'. Known: {}", key, known.join(", "))
    })?;
    let enabled = Step::run("Checking feature", || {
        subscription::check_feature(&ctx.client, feature)
    })?;
    if enabled {
        eprintln!("  {} {} is enabled", "\u{2713}".green(), feature);
    } else {
        eprintln!("  {} {} requires Pro", "\u{2717}".red(), feature);
    }
    Ok(())
}

fn open_in_browser(url: &str) {
    eprintln!("  Opening {}", url.bold());
    if let Err(e) = open::that(url) {
        eprintln!("  {} Could not open browser: {}", "Error:".red().bold(), e);
        eprintln!("  Visit the URL above to continue.");
    }
}
