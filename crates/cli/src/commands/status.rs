//! `zeeremind status` and `zeeremind plans`

use super::{format_date, print_json, Context};
use crate::api::subscription;
use crate::progress::Step;
use anyhow::Result;
use colored::Colorize;
use zeeremind_core::{
    evaluate, format_price, format_usage, EntitlementView, Feature, SubscriptionStatus,
};

pub fn run(ctx: &Context) -> Result<()> {
    let snapshot = Step::run("Loading subscription", || ctx.gate.refresh())?;
    let view = evaluate(&snapshot);
    if ctx.json {
        return print_json(&view);
    }

    eprintln!(
        "  {}: {} ({})",
        "Plan".bold(),
        view.plan.to_string().cyan(),
        status_label(view.status)
    );
    eprintln!("  {}: {}", "Usage".bold(), format_usage(&snapshot.usage));
    if !view.unlimited && view.is_approaching_limit {
        eprintln!(
            "  {} {} invoice(s) left on the Free plan",
            "\u{26a0}".yellow(),
            view.invoices_remaining
        );
    }

    if let Some(days) = view.trial_days_remaining.filter(|_| view.is_trial) {
        eprintln!("  {}: {} day(s) left", "Trial".bold(), days);
    }
    if let Some(billing) = &snapshot.billing {
        if let Some(end) = billing.current_period_end.as_deref() {
            let label = if view.cancel_at_period_end {
                "Ends"
            } else {
                "Renews"
            };
            eprintln!("  {}: {}", label.bold(), format_date(end));
        }
    }

    let enabled: Vec<&str> = Feature::ALL
        .iter()
        .filter(|f| view.has_feature(**f))
        .map(|f| f.key())
        .collect();
    eprintln!("  {}: {}", "Features".bold(), enabled.join(", ").dimmed());
    eprintln!();

    print_next_step(&view, &ctx.client.config().web_url);
    Ok(())
}

pub fn plans(ctx: &Context) -> Result<()> {
    let plans = Step::run("Loading plans", || subscription::plans(&ctx.client))?;
    if ctx.json {
        return print_json(&plans);
    }

    for plan in &plans {
        let invoices = match plan.features.max_invoices() {
            Some(n) => format!("{} invoices", n),
            None => "unlimited invoices".to_string(),
        };
        eprintln!(
            "  {:<8} {:>8}/{:<6} {}",
            plan.name.bold(),
            format_price(plan.price),
            plan.interval,
            invoices.dimmed()
        );
    }
    Ok(())
}

fn status_label(status: SubscriptionStatus) -> colored::ColoredString {
    match status {
        SubscriptionStatus::Active => "active".green(),
        SubscriptionStatus::Trial => "trial".cyan(),
        SubscriptionStatus::PastDue => "past due".yellow(),
        SubscriptionStatus::Expired | SubscriptionStatus::Cancelled => status.to_string().red(),
    }
}

fn print_next_step(view: &EntitlementView, web_url: &str) {
    if view.is_past_due {
        eprintln!(
            "  {} Payment failed. Run '{}' to update your card.",
            "\u{26a0}".yellow(),
            "zeeremind billing portal".bold()
        );
    } else if view.can_upgrade {
        let reason = view
            .upgrade_reason
            .clone()
            .unwrap_or_else(|| "Unlimited invoices, SMS and WhatsApp reminders".to_string());
        eprintln!("  {} {}", "\u{26a1}".yellow(), reason);
        eprintln!(
            "  Upgrade with '{}' or at {}/pricing",
            "zeeremind billing checkout".bold(),
            web_url.trim_end_matches('/')
        );
    }
}
