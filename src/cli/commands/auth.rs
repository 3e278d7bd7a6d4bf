//! cli::commands::auth
//!
//! Sign in to Google Drive with the OAuth device flow.
//!
//! # Design
//!
//! - The session is stored via the configured SecretStore
//! - Tokens are NEVER printed to stdout/stderr
//! - Login prints the verification page and code, and opens the page in a
//!   browser unless `--no-browser` is given
//!
//! # Example
//!
//! ```bash
//! gallerist auth login
//! gallerist auth status
//! gallerist auth logout
//! ```

use anyhow::{Context as _, Result};

use super::setup;
use crate::cli::args::AuthAction;
use crate::engine::Context;
use crate::ui::output;

/// Run an auth subcommand.
pub fn auth(ctx: &Context, action: AuthAction) -> Result<()> {
    let rt = setup::runtime()?;
    match action {
        AuthAction::Login { no_browser } => rt.block_on(login_async(ctx, no_browser)),
        AuthAction::Logout => rt.block_on(logout_async(ctx)),
        AuthAction::Status => status(ctx),
    }
}

async fn login_async(ctx: &Context, no_browser: bool) -> Result<()> {
    let config = setup::load_config()?;
    let quiet = ctx.quiet;
    let identity = setup::device_flow(ctx, &config)?.with_prompt(move |code| {
        // The code is needed even in quiet mode.
        eprintln!();
        eprintln!("To sign in, visit:\n\n    {}\n", code.verification_uri);
        eprintln!("and enter the code: {}\n", code.user_code);
        if !no_browser && !quiet && open::that(&code.verification_uri).is_err() {
            eprintln!("(Could not open a browser; open the page manually.)");
        }
        eprintln!("Waiting for authorization...");
    });
    let manager = setup::session_manager(ctx, &config, identity)?;

    let bundle = manager.sign_in().await.context("Sign-in failed")?;
    output::success(
        format!(
            "Signed in. Token valid for {} more minutes.",
            bundle.remaining_minutes()
        ),
        setup::verbosity(ctx),
    );
    Ok(())
}

async fn logout_async(ctx: &Context) -> Result<()> {
    let config = setup::load_config()?;
    let manager = setup::session_manager(ctx, &config, setup::device_flow(ctx, &config)?)?;

    let removed = manager.sign_out().await.context("Sign-out failed")?;
    if removed {
        output::success("Signed out.", setup::verbosity(ctx));
    } else {
        output::print("Not signed in.", setup::verbosity(ctx));
    }
    Ok(())
}

fn status(ctx: &Context) -> Result<()> {
    let config = setup::load_config()?;
    let manager = setup::session_manager(ctx, &config, setup::device_flow(ctx, &config)?)?;

    match manager.session() {
        Some(bundle) if ctx.quiet => {
            println!("{}", if bundle.is_valid() { "authenticated" } else { "expired" });
        }
        None if ctx.quiet => println!("not_authenticated"),
        Some(bundle) if bundle.is_valid() => {
            println!("Signed in.");
            if bundle.is_token_valid() {
                println!(
                    "Access token valid for {} more minutes (refresh due {}).",
                    bundle.remaining_minutes(),
                    bundle.refresh_due_at().format("%Y-%m-%d %H:%M UTC")
                );
            } else {
                println!("Access token expired; it will be refreshed on next use.");
            }
        }
        Some(_) => {
            println!("Session expired.");
            println!("Run 'gallerist auth login' to sign in again.");
        }
        None => {
            println!("Not signed in.");
            println!("Run 'gallerist auth login' to sign in.");
        }
    }
    Ok(())
}
