pub mod auth;
pub mod profile;
pub mod reminders;
pub mod scholarships;
pub mod view;

use colored::Colorize;
use fms_application::ClientContext;
use fms_core::ViewId;

/// Navigates to `view` and reports whether it is actually shown.
///
/// Prints the sign-in prompt when the navigator redirected.
pub(crate) async fn enter(ctx: &ClientContext, view: ViewId) -> bool {
    let shown = ctx.navigator().navigate(view).await;
    if shown != view {
        println!(
            "{} Run `fundmystudy login --email <email> --password <password>` first.",
            "Please sign in.".yellow()
        );
        return false;
    }
    true
}
