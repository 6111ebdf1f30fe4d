//! Operator-facing console output and confirmation prompts.
//!
//! Diagnostics go through `tracing`; the lines here are the product
//! surface the operator reads and answers.

use anyhow::{Context, Result};
use colored::Colorize;
use std::io::{self, Write};

pub fn info(message: &str) {
    println!("{}", message.green());
}

pub fn log(message: &str) {
    println!("{message}");
}

/// A yellow notice that does not go through the escalation policy.
pub fn attention(message: &str) {
    println!("{}", message.yellow());
}

pub fn warn(message: &str) {
    println!("{} {}", "[WARN]".yellow(), message);
}

pub fn die(message: &str) {
    eprintln!("{} {}", "[die]".red(), message);
}

/// Single synchronous yes/no question put to the operator.
pub trait Prompt {
    fn confirm(&mut self, message: &str) -> Result<bool>;
}

/// Reads a `y`/`yes` line from stdin; anything else is a no.
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn confirm(&mut self, message: &str) -> Result<bool> {
        print!("{message} [y/N] ");
        io::stdout().flush().context("flush prompt")?;

        let mut input = String::new();
        io::stdin()
            .read_line(&mut input)
            .context("read confirmation")?;

        let input = input.trim().to_lowercase();
        Ok(input == "y" || input == "yes")
    }
}
