use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use fms_application::ClientContext;
use fms_core::ViewId;
use fms_core::profile::{CasteCategory, MinorityStatus, Profile, ProfileDraft};

use super::enter;

#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub state: String,
    #[arg(long)]
    pub course: String,
    #[arg(long)]
    pub phone: Option<String>,
    /// Annual family income in rupees
    #[arg(long)]
    pub income: Option<f64>,
    /// General, OBC, SC or ST
    #[arg(long)]
    pub caste: Option<CasteCategory>,
    /// "Minority" or "Not Minority"
    #[arg(long)]
    pub category: Option<MinorityStatus>,
    /// Marks percentage, 0 to 100
    #[arg(long)]
    pub marks: Option<f64>,
}

impl ProfileArgs {
    pub fn into_draft(self) -> ProfileDraft {
        let mut draft = ProfileDraft::new(self.name, self.state, self.course);
        if let Some(phone) = self.phone {
            draft = draft.with_phone_number(phone);
        }
        if let Some(income) = self.income {
            draft = draft.with_annual_income(income);
        }
        if let Some(caste) = self.caste {
            draft = draft.with_caste_category(caste);
        }
        if let Some(category) = self.category {
            draft = draft.with_minority_status(category);
        }
        if let Some(marks) = self.marks {
            draft = draft.with_marks_percentage(marks);
        }
        draft
    }
}

pub async fn show(ctx: &ClientContext) -> Result<()> {
    if !enter(ctx, ViewId::Profile).await {
        return Ok(());
    }

    match ctx.profiles.fetch().await {
        Ok(profile) => print_profile(&profile),
        Err(e) if e.is_not_found() => {
            println!("No profile yet. Create one with `fundmystudy profile save`.")
        }
        Err(e) => return Err(e).context("Failed to load profile"),
    }
    Ok(())
}

pub async fn save(ctx: &ClientContext, args: ProfileArgs) -> Result<()> {
    if !enter(ctx, ViewId::Profile).await {
        return Ok(());
    }

    let profile = ctx
        .profiles
        .save(&args.into_draft())
        .await
        .context("Failed to save profile")?;
    println!("{} Profile saved", "✓".green());
    print_profile(&profile);
    Ok(())
}

fn print_profile(profile: &Profile) {
    println!("{}", profile.name.bold());
    println!("  State:      {}", profile.state);
    println!("  Course:     {}", profile.course);
    println!("  Income:     ₹{}", profile.annual_income);
    println!("  Caste:      {}", profile.caste_category);
    println!("  Category:   {}", profile.minority_status);
    println!("  Marks:      {}%", profile.marks_percentage);
    if let Some(phone) = &profile.phone_number {
        println!("  Phone:      {}", phone);
    }
}
