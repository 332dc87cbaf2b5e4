use anyhow::{Context, Result};
use colored::Colorize;
use fms_application::ClientContext;
use fms_core::ViewId;
use fms_core::error::FmsError;

use super::enter;

pub async fn list(ctx: &ClientContext) -> Result<()> {
    if !enter(ctx, ViewId::Reminders).await {
        return Ok(());
    }

    let reminders = ctx
        .reminders
        .list_active()
        .await
        .context("Failed to load reminders")?;
    if reminders.is_empty() {
        println!("No active reminders.");
        return Ok(());
    }
    for r in &reminders {
        println!(
            "{} {}  deadline {}  -> {}",
            "•".cyan(),
            r.scholarship_name.bold(),
            r.deadline,
            r.notify_email
        );
    }
    Ok(())
}

pub async fn subscribe(ctx: &ClientContext, scholarship_id: &str) -> Result<()> {
    if !enter(ctx, ViewId::Scholarships).await {
        return Ok(());
    }

    match ctx.reminders.subscribe(scholarship_id).await {
        Ok(reminder) => {
            println!(
                "{} Reminder set for {} (deadline {})",
                "✓".green(),
                reminder.scholarship_name.bold(),
                reminder.deadline
            );
            if let Some(status) = ctx.reminders.last_email_status().await {
                println!("  Confirmation e-mail: {}", status);
            }
        }
        Err(FmsError::AlreadySubscribed { existing, .. }) => {
            let name = existing
                .map(|r| r.scholarship_name)
                .unwrap_or_else(|| scholarship_id.to_string());
            println!("{} Already subscribed to {}", "•".cyan(), name.bold());
        }
        Err(e) => return Err(e).context("Failed to set reminder"),
    }
    Ok(())
}
