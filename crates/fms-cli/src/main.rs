use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fms_application::ClientContext;
use fms_infrastructure::{ConfigService, FmsPaths};
use std::path::PathBuf;

mod commands;
mod logging;

use commands::profile::ProfileArgs;
use commands::view::ThemeChoice;

#[derive(Parser)]
#[command(name = "fundmystudy")]
#[command(about = "FundMyStudy - find scholarships you are eligible for", long_about = None)]
struct Cli {
    /// Directory holding config.toml, state.toml and logs
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with e-mail and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account together with its profile
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[command(flatten)]
        profile: ProfileArgs,
    },
    /// Sign out and forget the stored credential
    Logout,
    /// Show the signed-in identity
    Whoami,
    /// Show or save the student profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// List scholarships matching the profile
    Scholarships {
        /// Show the bundled demo list instead of querying the backend
        #[arg(long)]
        demo: bool,
    },
    /// List or create deadline reminders
    Reminders {
        #[command(subcommand)]
        action: ReminderAction,
    },
    /// Navigate to a view
    View { name: String },
    /// Show or change the display preference
    Theme { choice: Option<ThemeChoice> },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Show the saved profile
    Show,
    /// Create or update the profile
    Save {
        #[command(flatten)]
        profile: ProfileArgs,
    },
}

#[derive(Subcommand)]
enum ReminderAction {
    /// List active reminders
    List,
    /// Subscribe to the deadline reminder of a scholarship
    Subscribe { scholarship_id: String },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let paths = FmsPaths::new(cli.home.as_deref());
    let _log_guard = logging::init(&paths);

    let config = ConfigService::new(&paths)
        .and_then(|service| service.load())
        .context("Failed to load configuration")?;
    let ctx = ClientContext::from_config(config, &paths).context("Failed to start client")?;
    ctx.start().await.context("Failed to restore local state")?;

    match cli.command {
        Commands::Login { email, password } => commands::auth::login(&ctx, &email, &password).await?,
        Commands::Signup {
            email,
            password,
            profile,
        } => commands::auth::signup(&ctx, &email, &password, profile).await?,
        Commands::Logout => commands::auth::logout(&ctx).await?,
        Commands::Whoami => commands::auth::whoami(&ctx),
        Commands::Profile { action } => match action {
            ProfileAction::Show => commands::profile::show(&ctx).await?,
            ProfileAction::Save { profile } => commands::profile::save(&ctx, profile).await?,
        },
        Commands::Scholarships { demo } => commands::scholarships::run(&ctx, demo).await?,
        Commands::Reminders { action } => match action {
            ReminderAction::List => commands::reminders::list(&ctx).await?,
            ReminderAction::Subscribe { scholarship_id } => {
                commands::reminders::subscribe(&ctx, &scholarship_id).await?
            }
        },
        Commands::View { name } => commands::view::navigate(&ctx, &name).await?,
        Commands::Theme { choice } => commands::view::theme(&ctx, choice).await,
    }

    Ok(())
}
