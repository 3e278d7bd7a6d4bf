//! cli::commands::settings
//!
//! Gallery-wide settings: the title and password protection.

use anyhow::{bail, Result};

use super::setup;
use crate::cli::args::PasswordAction;
use crate::core::access::{self, AccessError};
use crate::engine::Context;
use crate::ui::{output, prompts};

/// Show or set the gallery title.
pub fn title(ctx: &Context, title: Option<&str>) -> Result<()> {
    let rt = setup::runtime()?;
    rt.block_on(title_async(ctx, title))
}

async fn title_async(ctx: &Context, title: Option<&str>) -> Result<()> {
    let config = setup::load_config()?;
    let service = setup::open_service(ctx, &config)?;
    let mut collection = setup::load(&service).await?;

    match title {
        None => {
            println!("{}", collection.title());
            Ok(())
        }
        Some(title) => {
            collection.set_title(title)?;
            let summary = format!("Title set to '{}'.", collection.title());
            setup::finish(ctx, &service, &collection, &summary).await
        }
    }
}

/// Enable, change, or remove password protection.
pub fn password(ctx: &Context, action: PasswordAction) -> Result<()> {
    let rt = setup::runtime()?;
    rt.block_on(password_async(ctx, action))
}

async fn password_async(ctx: &Context, action: PasswordAction) -> Result<()> {
    let verbosity = setup::verbosity(ctx);
    if matches!(action, PasswordAction::Set) && !ctx.interactive {
        bail!("Setting a password needs an interactive terminal.");
    }

    let config = setup::load_config()?;
    let service = setup::open_service(ctx, &config)?;
    let mut collection = setup::load(&service).await?;

    match action {
        PasswordAction::Set => {
            let hashed = read_new_password(ctx.interactive)?;
            let changed = collection.is_protected();
            collection.set_password_hash(hashed);
            let summary = if changed {
                "Password changed."
            } else {
                "Password protection enabled."
            };
            setup::finish(ctx, &service, &collection, summary).await
        }
        PasswordAction::Clear => {
            if !collection.clear_password() {
                output::print("The gallery is not password protected.", verbosity);
                return Ok(());
            }
            setup::finish(ctx, &service, &collection, "Password protection removed.").await
        }
    }
}

/// Ask for a new password twice and hash it.
fn read_new_password(interactive: bool) -> Result<String> {
    let first = prompts::password("New password", interactive)?;
    let hashed = access::hash_password(&first)?;
    let second = prompts::password("Repeat password", interactive)?;
    check_repeat(&first, &second)?;
    Ok(hashed)
}

fn check_repeat(first: &str, second: &str) -> Result<(), AccessError> {
    if first == second {
        Ok(())
    } else {
        Err(AccessError::Mismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_must_match_exactly() {
        assert!(check_repeat("hunter22", "hunter22").is_ok());
        assert!(matches!(
            check_repeat("hunter22", "hunter23"),
            Err(AccessError::Mismatch)
        ));
    }

    #[test]
    fn non_interactive_password_prompt_fails() {
        assert!(read_new_password(false).is_err());
    }
}
