//! ui::prompts
//!
//! Interactive prompts and confirmations.
//!
//! # Design
//!
//! Prompts are only shown in interactive mode. In non-interactive mode,
//! operations requiring user input must either have defaults or fail
//! with a clear error message.

use std::io::{self, BufRead, Write};

use thiserror::Error;

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt cancelled by user")]
    Cancelled,

    #[error("not in interactive mode")]
    NotInteractive,

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<io::Error> for PromptError {
    fn from(e: io::Error) -> Self {
        PromptError::IoError(e.to_string())
    }
}

fn read_line(message: &str) -> Result<String, PromptError> {
    print!("{}", message);
    io::stdout().flush()?;

    let mut line = String::new();
    let read = io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        return Err(PromptError::Cancelled);
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Interpret a yes/no answer. Blank answers take the default.
fn parse_confirm(answer: &str, default: bool) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "" => Some(default),
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Prompt for confirmation (yes/no).
///
/// Returns `Ok(true)` if the user confirms, `Ok(false)` if they decline.
/// Returns `Err(PromptError::NotInteractive)` if not in interactive mode.
pub fn confirm(message: &str, default: bool, interactive: bool) -> Result<bool, PromptError> {
    if !interactive {
        return Err(PromptError::NotInteractive);
    }
    let hint = if default { "[Y/n]" } else { "[y/N]" };
    loop {
        let answer = read_line(&format!("{} {} ", message, hint))?;
        match parse_confirm(&answer, default) {
            Some(choice) => return Ok(choice),
            None => println!("Please answer 'y' or 'n'."),
        }
    }
}

/// Prompt for text input.
///
/// An empty answer yields `default` when one is given.
pub fn input(
    message: &str,
    default: Option<&str>,
    interactive: bool,
) -> Result<String, PromptError> {
    if !interactive {
        return Err(PromptError::NotInteractive);
    }
    let prompt = match default {
        Some(d) => format!("{} [{}]: ", message, d),
        None => format!("{}: ", message),
    };
    let answer = read_line(&prompt)?;
    let answer = answer.trim();
    match (answer.is_empty(), default) {
        (true, Some(d)) => Ok(d.to_string()),
        _ => Ok(answer.to_string()),
    }
}

/// Prompt for masked input (e.g., passwords).
///
/// The input is not echoed to the terminal.
pub fn password(message: &str, interactive: bool) -> Result<String, PromptError> {
    if !interactive {
        return Err(PromptError::NotInteractive);
    }
    print!("{}: ", message);
    io::stdout().flush()?;
    Ok(rpassword::read_password()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_answers() {
        assert_eq!(parse_confirm("y", false), Some(true));
        assert_eq!(parse_confirm("YES", false), Some(true));
        assert_eq!(parse_confirm(" n ", true), Some(false));
        assert_eq!(parse_confirm("", true), Some(true));
        assert_eq!(parse_confirm("", false), Some(false));
        assert_eq!(parse_confirm("maybe", true), None);
    }

    #[test]
    fn non_interactive_prompts_fail() {
        assert!(matches!(
            confirm("Delete?", false, false),
            Err(PromptError::NotInteractive)
        ));
        assert!(matches!(
            input("Name", None, false),
            Err(PromptError::NotInteractive)
        ));
        assert!(matches!(
            password("Password", false),
            Err(PromptError::NotInteractive)
        ));
    }
}
