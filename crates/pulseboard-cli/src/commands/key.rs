//! Key command - manage the stored API key.

use std::path::PathBuf;

use colored::Colorize;
use pulseboard::CredentialStore;

use super::{CommandResult, credential_store};
use crate::cli::KeyAction;

pub fn run(action: KeyAction, credentials: Option<PathBuf>) -> CommandResult {
    let store = credential_store(credentials)?;

    match action {
        KeyAction::Set { key } => {
            let key = key.trim();
            if key.is_empty() {
                return Err("API key must not be empty".into());
            }
            store.save(Some(key))?;
            println!("{} {}", "Stored API key in".green(), store.path().display());
        }
        KeyAction::Clear => {
            store.save(None)?;
            println!("{}", "Cleared stored API key".green());
        }
        KeyAction::Show => match store.load()? {
            Some(key) => println!("{} {}", "API key:".cyan(), mask(&key)),
            None => println!("{}", "No API key stored".dimmed()),
        },
    }

    Ok(())
}

/// Keep the last four characters visible.
fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), visible)
}
