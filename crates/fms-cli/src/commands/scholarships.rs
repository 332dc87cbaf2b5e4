use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;
use fms_application::ClientContext;
use fms_core::ViewId;
use fms_core::error::FmsError;
use fms_core::scholarship::Scholarship;

use super::enter;

pub async fn run(ctx: &ClientContext, demo: bool) -> Result<()> {
    if !enter(ctx, ViewId::Scholarships).await {
        return Ok(());
    }

    if demo {
        let snapshot = ctx.eligibility.show_demo().await;
        println!(
            "{}",
            "[DEMO DATA] Sample scholarships, not matched to your profile."
                .on_yellow()
                .black()
                .bold()
        );
        print_list(&snapshot.scholarships);
        return Ok(());
    }

    match ctx.eligibility.fetch_eligible().await {
        Ok(list) if list.is_empty() => {
            println!("No matching scholarships right now. Try updating your profile.")
        }
        Ok(list) => print_list(&list),
        Err(FmsError::ProfileIncomplete) => println!(
            "{} Complete your profile first with `fundmystudy profile save`.",
            "!".yellow()
        ),
        Err(e) => {
            if e.is_retryable() {
                println!(
                    "{} Backend unavailable. `fundmystudy scholarships --demo` shows sample data.",
                    "!".yellow()
                );
            }
            return Err(e).context("Failed to fetch scholarships");
        }
    }
    Ok(())
}

fn print_list(list: &[Scholarship]) {
    let today = Utc::now().date_naive();
    for (rank, s) in list.iter().enumerate() {
        let deadline = match s.days_until_deadline(today) {
            Some(days) if days < 0 => format!("{} (closed)", s.deadline),
            Some(days) => format!("{} ({} days left)", s.deadline, days),
            None => s.deadline.clone(),
        };
        println!(
            "{:>2}. {} {}",
            rank + 1,
            s.name.bold(),
            format!("[{}]", s.scholarship_id).dimmed()
        );
        println!("    {} | {} | match {:.0}%", s.provider, s.amount, s.score * 100.0);
        println!("    Deadline: {}", deadline);
        for reason in &s.reasons {
            println!("    - {}", reason);
        }
        if !s.apply_link.is_empty() {
            println!("    Apply: {}", s.apply_link.underline());
        }
    }
}
