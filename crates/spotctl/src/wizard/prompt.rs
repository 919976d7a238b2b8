//! Operator prompts.
//!
//! `Ok(None)` from a prompt means the operator backed out (Esc or `q`);
//! a Ctrl-C keypress surfaces as [`ProvisionError::Cancelled`].

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};

use crate::error::ProvisionError;

/// Source of operator input for the wizard.
pub trait Prompter {
    /// Choose one of `items`, returning its index.
    ///
    /// # Errors
    /// Returns an error when the terminal cannot be read.
    fn select(
        &mut self,
        prompt: &str,
        items: &[String],
        default: usize,
    ) -> Result<Option<usize>, ProvisionError>;

    /// Free-text input. Empty input is returned as an empty string.
    ///
    /// # Errors
    /// Returns an error when the terminal cannot be read.
    fn input(&mut self, prompt: &str, default: Option<&str>)
        -> Result<Option<String>, ProvisionError>;

    /// Yes/no question.
    ///
    /// # Errors
    /// Returns an error when the terminal cannot be read.
    fn confirm(&mut self, prompt: &str, default: bool) -> Result<Option<bool>, ProvisionError>;

    /// Show an informational line.
    fn show(&mut self, message: &str);
}

/// [`Prompter`] backed by the terminal.
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn select(
        &mut self,
        prompt: &str,
        items: &[String],
        default: usize,
    ) -> Result<Option<usize>, ProvisionError> {
        Ok(Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(default)
            .interact_opt()?)
    }

    fn input(
        &mut self,
        prompt: &str,
        default: Option<&str>,
    ) -> Result<Option<String>, ProvisionError> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        Ok(Some(input.interact_text()?))
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<Option<bool>, ProvisionError> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact_opt()?)
    }

    fn show(&mut self, message: &str) {
        println!("{message}");
    }
}
