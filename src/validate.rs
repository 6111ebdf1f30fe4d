//! The warn/fatal escalation policy.
//!
//! Classification code never decides on its own whether to block for
//! operator input; it reports through a [`Validator`] and the caller picks
//! the policy: interactive for landings, silent for reporting runs, and
//! null for read-only history scans.
//!
//! The dividing line between the two tiers: `warn` is for surprising but
//! survivable input, and the operator has the final say; `fatal` is for
//! input that is structurally unusable, and nothing gets a say.

use crate::console::{self, Prompt};
use anyhow::{anyhow, Error, Result};

/// Escalation interface threaded through classification and the workflows.
///
/// An `Err` from `warn` means the operator declined to continue; callers
/// propagate it with `?`, so a declined warning unwinds the whole run.
/// `fatal` hands back the terminal error so call sites are written
/// `return Err(validator.fatal(..))` and control never runs past one.
pub trait Validator {
    fn warn(&mut self, message: &str) -> Result<()>;
    fn fatal(&mut self, message: &str) -> Error;

    /// Every warning raised so far, in order.
    fn warnings(&self) -> &[String];
}

/// Interactive policy: every warning blocks on "Proceed anyway?".
pub struct InteractiveValidator {
    warnings: Vec<String>,
    prompt: Box<dyn Prompt>,
}

impl InteractiveValidator {
    pub fn new(prompt: Box<dyn Prompt>) -> Self {
        Self {
            warnings: Vec::new(),
            prompt,
        }
    }
}

impl Validator for InteractiveValidator {
    fn warn(&mut self, message: &str) -> Result<()> {
        self.warnings.push(message.to_string());
        console::warn(message);
        if self.prompt.confirm("Proceed anyway?")? {
            Ok(())
        } else {
            Err(anyhow!("aborted after warning: {message}"))
        }
    }

    fn fatal(&mut self, message: &str) -> Error {
        anyhow!("{message}")
    }

    fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

/// Non-interactive policy: warnings are logged and the run proceeds.
#[derive(Default)]
pub struct SilentValidator {
    warnings: Vec<String>,
}

impl SilentValidator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Validator for SilentValidator {
    fn warn(&mut self, message: &str) -> Result<()> {
        self.warnings.push(message.to_string());
        console::warn(message);
        Ok(())
    }

    fn fatal(&mut self, message: &str) -> Error {
        anyhow!("{message}")
    }

    fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

/// Records nothing and never interrupts. For scans over ancestor history
/// where the anomalies were somebody else's problem years ago.
pub struct NullValidator;

impl Validator for NullValidator {
    fn warn(&mut self, _message: &str) -> Result<()> {
        Ok(())
    }

    fn fatal(&mut self, message: &str) -> Error {
        anyhow!("{message}")
    }

    fn warnings(&self) -> &[String] {
        &[]
    }
}
