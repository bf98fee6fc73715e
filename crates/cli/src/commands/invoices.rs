//! Invoice commands. Creation and premium channels go through the usage gate.

use super::{format_date, print_json, prompt_line, Context};
use crate::api::invoices;
use crate::gate::CreateOutcome;
use crate::progress::Step;
use anyhow::{anyhow, Result};
use colored::Colorize;
use zeeremind_core::gate::prompt;
use zeeremind_core::{
    format_price, BlockReason, Channel, ChannelError, GateError, Invoice, InvoiceFilter,
    InvoiceStatus, NewInvoice, ReminderChannels,
};

#[derive(Debug, Clone, clap::Subcommand)]
pub enum InvoiceAction {
    /// Create an invoice (counts against the Free plan limit)
    New {
        #[arg(long)]
        client: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        amount: f64,

        /// Due date, YYYY-MM-DD
        #[arg(long)]
        due: String,

        #[arg(long)]
        payment_link: Option<String>,

        #[arg(long)]
        number: Option<String>,

        /// Reminder channels, comma separated (default: email)
        #[arg(long, value_delimiter = ',')]
        channel: Vec<Channel>,
    },

    /// Show one invoice
    Show { id: String },

    /// Change fields on an invoice
    Edit {
        id: String,

        #[arg(long)]
        client: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        amount: Option<f64>,

        #[arg(long)]
        due: Option<String>,

        #[arg(long)]
        payment_link: Option<String>,
    },

    /// Delete an invoice
    Delete {
        id: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Mark an invoice as paid
    Pay { id: String },

    /// Send a reminder now
    Remind { id: String },

    /// Reminder history for an invoice
    Logs { id: String },

    /// Turn a reminder channel on or off
    Channel { id: String, channel: Channel },
}

pub fn run(ctx: &Context, action: &InvoiceAction) -> Result<()> {
    match action {
        InvoiceAction::New {
            client,
            email,
            phone,
            amount,
            due,
            payment_link,
            number,
            channel,
        } => {
            let draft = NewInvoice {
                client_name: client.clone(),
                client_email: email.clone(),
                client_phone: phone.clone(),
                amount: *amount,
                due_date: due.clone(),
                payment_link: payment_link.clone(),
                invoice_number: number.clone(),
                reminder_channels: ReminderChannels::try_from(channel.clone())?,
            };
            create(ctx, &draft)
        }
        InvoiceAction::Show { id } => show(ctx, id),
        InvoiceAction::Edit {
            id,
            client,
            email,
            phone,
            amount,
            due,
            payment_link,
        } => {
            let mut draft = invoices::get(&ctx.client, id)?.to_draft();
            if let Some(v) = client {
                draft.client_name = v.clone();
            }
            if let Some(v) = email {
                draft.client_email = v.clone();
            }
            if let Some(v) = phone {
                draft.client_phone = Some(v.clone()).filter(|p| !p.trim().is_empty());
            }
            if let Some(v) = amount {
                draft.amount = *v;
            }
            if let Some(v) = due {
                draft.due_date = v.clone();
            }
            if let Some(v) = payment_link {
                draft.payment_link = Some(v.clone()).filter(|l| !l.trim().is_empty());
            }
            // Premium channels are re-checked against the current plan.
            load_plan(ctx);
            let invoice = Step::run("Saving invoice", || ctx.gate.update_invoice(id, &draft))?;
            eprintln!("  {} Saved", "\u{2713}".green());
            print_invoice(&invoice);
            Ok(())
        }
        InvoiceAction::Delete { id, yes } => delete(ctx, id, *yes),
        InvoiceAction::Pay { id } => {
            Step::run("Marking paid", || invoices::mark_paid(&ctx.client, id))?;
            eprintln!("  {} Invoice marked as paid", "\u{2713}".green());
            Ok(())
        }
        InvoiceAction::Remind { id } => remind(ctx, id),
        InvoiceAction::Logs { id } => logs(ctx, id),
        InvoiceAction::Channel { id, channel } => toggle_channel(ctx, id, *channel),
    }
}

pub fn list(ctx: &Context, search: Option<&str>, status: Option<&str>) -> Result<()> {
    let filter = InvoiceFilter {
        query: search.map(String::from),
        status: status
            .filter(|s| !s.eq_ignore_ascii_case("all"))
            .map(|s| s.parse::<InvoiceStatus>())
            .transpose()?,
    };
    let all = Step::run("Loading invoices", || invoices::list(&ctx.client))?;
    let shown = filter.apply(&all);
    if ctx.json {
        return print_json(&shown);
    }

    if shown.is_empty() {
        if all.is_empty() {
            eprintln!("  No invoices yet. Create one with 'zeeremind invoice new'.");
        } else {
            eprintln!("  No invoices match.");
        }
        return Ok(());
    }

    for inv in &shown {
        let channels: Vec<String> = inv.reminder_channels.iter().map(|c| c.to_string()).collect();
        println!(
            "{:<26} {:<12} {:<24} {:>12} {:<14} {:<8} {:>2} {}",
            inv.id.dimmed(),
            inv.invoice_number.as_deref().unwrap_or("-"),
            inv.client_name,
            format_price(inv.amount),
            format_date(&inv.due_date),
            status_label(&inv.status),
            inv.reminders_sent.len(),
            channels.join(",").dimmed()
        );
    }
    eprintln!("\n  {} of {} invoice(s)", shown.len(), all.len());
    Ok(())
}

pub fn stats(ctx: &Context) -> Result<()> {
    let stats = Step::run("Loading dashboard", || invoices::stats(&ctx.client))?;
    if ctx.json {
        return print_json(&stats);
    }
    eprintln!("  {}: {}", "Unpaid invoices".bold(), stats.total_unpaid);
    eprintln!(
        "  {}: {}",
        "Overdue amount".bold(),
        format_price(stats.overdue_amount).red()
    );
    eprintln!("  {}: {}", "Paid this month".bold(), stats.paid_this_month);
    Ok(())
}

fn create(ctx: &Context, draft: &NewInvoice) -> Result<()> {
    // A fresh process has no snapshot; without one the gate holds creation back.
    Step::run("Checking your plan", || ctx.gate.refresh())?;

    let outcome = Step::run("Creating invoice", || ctx.gate.create_invoice(draft))?;
    match outcome {
        CreateOutcome::Created {
            invoice,
            dropped_channels,
        } => {
            eprintln!("  {} Invoice created", "\u{2713}".green());
            for channel in dropped_channels {
                eprintln!(
                    "  {} {} reminders skipped (Pro plan and client phone required)",
                    "\u{26a0}".yellow(),
                    channel
                );
            }
            print_invoice(&invoice);
            if let Some(view) = ctx.gate.entitlement().filter(|v| v.is_approaching_limit) {
                eprintln!(
                    "  {} {} free invoice(s) left",
                    "\u{26a0}".yellow(),
                    view.invoices_remaining
                );
            }
            Ok(())
        }
        CreateOutcome::Blocked(prompt) => Err(GateError::Blocked(prompt).into()),
        CreateOutcome::Pending => Err(GateError::Pending.into()),
    }
}

fn show(ctx: &Context, id: &str) -> Result<()> {
    let invoice = Step::run("Loading invoice", || invoices::get(&ctx.client, id))?;
    if ctx.json {
        return print_json(&invoice);
    }
    print_invoice(&invoice);
    Ok(())
}

fn delete(ctx: &Context, id: &str, yes: bool) -> Result<()> {
    if !yes {
        let answer = prompt_line(&format!("Delete invoice {}? [y/N]", id))?;
        if !answer.eq_ignore_ascii_case("y") {
            eprintln!("  Nothing changed.");
            return Ok(());
        }
    }
    Step::run("Deleting invoice", || ctx.gate.delete_invoice(id))?;
    eprintln!("  {} Invoice deleted", "\u{2713}".green());
    Ok(())
}

fn remind(ctx: &Context, id: &str) -> Result<()> {
    let mut list = vec![invoices::get(&ctx.client, id)?];
    Step::run("Sending reminder", || ctx.gate.send_reminder(&mut list, id))?;
    let sent = list.first().map(|inv| inv.reminders_sent.len()).unwrap_or(0);
    eprintln!(
        "  {} Reminder sent ({} so far)",
        "\u{2713}".green(),
        sent
    );
    Ok(())
}

fn logs(ctx: &Context, id: &str) -> Result<()> {
    let entries = Step::run("Loading reminder history", || invoices::logs(&ctx.client, id))?;
    if ctx.json {
        return print_json(&entries);
    }
    if entries.is_empty() {
        eprintln!("  No reminders sent yet.");
        return Ok(());
    }
    for entry in &entries {
        println!(
            "{:<16} {:<18} {}",
            format_date(&entry.sent_at),
            entry.kind.label(),
            entry.channel.as_deref().unwrap_or("email").dimmed()
        );
    }
    Ok(())
}

fn toggle_channel(ctx: &Context, id: &str, channel: Channel) -> Result<()> {
    load_plan(ctx);
    let invoice = invoices::get(&ctx.client, id)?;
    let mut draft = invoice.to_draft();

    ctx.gate
        .toggle_channel(
            &mut draft.reminder_channels,
            channel,
            draft.client_phone.as_deref(),
        )
        .map_err(|e| channel_error(ctx, e))?;

    let saved = Step::run("Saving channels", || ctx.gate.update_invoice(id, &draft))?;
    let state = if saved.reminder_channels.contains(channel) {
        "on".green()
    } else {
        "off".yellow()
    };
    eprintln!("  {} reminders {}", channel, state);
    Ok(())
}

/// Loads the snapshot for commands that only need it for premium checks.
/// Failure is logged; the checks then treat the plan as unknown.
fn load_plan(ctx: &Context) {
    if let Err(e) = ctx.gate.refresh() {
        tracing::warn!(error = %e, "could not load subscription");
    }
}

fn channel_error(ctx: &Context, err: ChannelError) -> anyhow::Error {
    match err {
        ChannelError::ProRequired(_) => match ctx.gate.entitlement() {
            Some(view) => GateError::Blocked(prompt(&view, BlockReason::ProRequired)).into(),
            None => err.into(),
        },
        ChannelError::EntitlementUnknown => {
            anyhow!("Could not confirm your plan; try again once the backend is reachable")
        }
        other => other.into(),
    }
}

fn print_invoice(inv: &Invoice) {
    let number = inv.invoice_number.as_deref().unwrap_or("-");
    eprintln!("  {} {} ({})", "Invoice".bold(), number, inv.id.dimmed());
    eprintln!("  {}: {} <{}>", "Client".bold(), inv.client_name, inv.client_email);
    if let Some(phone) = inv.client_phone.as_deref() {
        eprintln!("  {}: {}", "Phone".bold(), phone);
    }
    eprintln!("  {}: {}", "Amount".bold(), format_price(inv.amount));
    eprintln!("  {}: {}", "Due".bold(), format_date(&inv.due_date));
    eprintln!("  {}: {}", "Status".bold(), status_label(&inv.status));
    let channels: Vec<String> = inv.reminder_channels.iter().map(|c| c.to_string()).collect();
    eprintln!("  {}: {}", "Channels".bold(), channels.join(", "));
    eprintln!("  {}: {}", "Reminders sent".bold(), inv.reminders_sent.len());
    if let Some(link) = inv.payment_link.as_deref() {
        eprintln!("  {}: {}", "Payment link".bold(), link);
    }
}

fn status_label(status: &InvoiceStatus) -> colored::ColoredString {
    match status {
        InvoiceStatus::Paid => "paid".green(),
        InvoiceStatus::Overdue => "overdue".red(),
        InvoiceStatus::Pending => "pending".yellow(),
        InvoiceStatus::Other(s) => s.as_str().normal(),
    }
}
