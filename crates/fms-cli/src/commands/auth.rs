use anyhow::{Context, Result};
use colored::Colorize;
use fms_application::ClientContext;
use fms_core::ViewId;

use super::profile::ProfileArgs;

pub async fn login(ctx: &ClientContext, email: &str, password: &str) -> Result<()> {
    ctx.navigator().navigate(ViewId::Login).await;
    let session = ctx
        .session
        .sign_in(email, password)
        .await
        .context("Sign-in failed")?;

    println!(
        "{} Signed in as {}",
        "✓".green(),
        session.identity.email.bold()
    );
    Ok(())
}

pub async fn signup(
    ctx: &ClientContext,
    email: &str,
    password: &str,
    profile: ProfileArgs,
) -> Result<()> {
    ctx.navigator().navigate(ViewId::Signup).await;
    let draft = profile.into_draft();
    let outcome = ctx
        .session
        .sign_up(email, password, &draft)
        .await
        .context("Sign-up failed")?;

    println!(
        "{} Account created for {}",
        "✓".green(),
        outcome.session.identity.email.bold()
    );
    match outcome.profile {
        Ok(_) => println!("{} Profile saved", "✓".green()),
        Err(e) => println!(
            "{} Profile was not saved ({}). Retry with `fundmystudy profile save`.",
            "!".yellow(),
            e
        ),
    }
    Ok(())
}

pub async fn logout(ctx: &ClientContext) -> Result<()> {
    if !ctx.session.is_authenticated() {
        println!("Not signed in.");
        return Ok(());
    }
    ctx.session.sign_out().await.context("Sign-out failed")?;
    println!("{} Signed out", "✓".green());
    Ok(())
}

pub fn whoami(ctx: &ClientContext) {
    match ctx.session.current_identity() {
        Some(identity) => println!("{} ({})", identity.email.bold(), identity.uid.dimmed()),
        None => println!("Not signed in."),
    }
}
