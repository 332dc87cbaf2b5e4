use anyhow::{Context, Result};
use clap::ValueEnum;
use fms_application::ClientContext;
use fms_core::{DisplayPreference, ViewId};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThemeChoice {
    Light,
    Dark,
    Toggle,
}

pub async fn navigate(ctx: &ClientContext, name: &str) -> Result<()> {
    let requested: ViewId = name
        .parse()
        .with_context(|| format!("Unknown view '{}'", name))?;
    let shown = ctx.navigator().navigate(requested).await;
    if shown == requested {
        println!("Now on {}", shown);
    } else {
        println!("{} requires sign-in, showing {}", requested, shown);
    }
    Ok(())
}

pub async fn theme(ctx: &ClientContext, choice: Option<ThemeChoice>) {
    let navigator = ctx.navigator();
    let preference = match choice {
        None => navigator.display_preference(),
        Some(ThemeChoice::Light) => navigator.set_display_preference(DisplayPreference::Light).await,
        Some(ThemeChoice::Dark) => navigator.set_display_preference(DisplayPreference::Dark).await,
        Some(ThemeChoice::Toggle) => navigator.toggle_display_preference().await,
    };
    println!("Display preference: {}", preference);
}
