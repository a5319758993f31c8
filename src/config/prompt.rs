//! Interactive prompt protocol
//!
//! Asking for a missing option is a small blocking loop: read one line,
//! judge it, and either return the converted value or re-prompt. Every
//! rejected answer spends one unit of the option's retry budget and the loop
//! gives up with `TooManyRetries` once the budget drops below zero.

use super::options::ConfigOption;
use crate::error::{ConfVaultError, Result};
use crate::value::Value;
use dialoguer::{theme::ColorfulTheme, Input};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use tracing::debug;

/// Line-oriented I/O surface used by the prompt loop
pub trait Prompter {
    /// Show `message` and read one line of input
    fn read_line(&mut self, message: &str) -> Result<String>;

    /// Show an informational line (help text, rejection reasons)
    fn notify(&mut self, message: &str);
}

/// Run the prompt loop for one option
pub fn ask(option: &ConfigOption, prompter: &mut dyn Prompter) -> Result<Value> {
    let message = option.prompt_message();
    let mut budget = i64::from(option.retries);
    let mut attempts = 0u32;

    loop {
        let answer = prompter.read_line(&message)?;
        attempts += 1;
        let wants_help = answer == "?" && !option.choices.iter().any(|choice| choice == "?");

        if answer.is_empty() || wants_help {
            if let Some(help) = &option.help {
                prompter.notify(&format!("Help for {}:\n\t{}", option.name, help));
            }
        }

        let outcome = if wants_help {
            Err("Please enter a value.".to_string())
        } else {
            option.evaluate(&answer)
        };

        match outcome {
            Ok(value) => {
                debug!(
                    "Accepted answer for '{}' after {} attempt(s)",
                    option.name, attempts
                );
                return Ok(value);
            }
            Err(reason) => {
                prompter.notify(&reason);
                budget -= 1;
                if budget < 0 {
                    return Err(ConfVaultError::too_many_retries(&option.name, attempts));
                }
            }
        }
    }
}

/// Prompter reading from the terminal
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
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
    fn read_line(&mut self, message: &str) -> Result<String> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(message)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| ConfVaultError::prompt(format!("Failed to get user input: {e}")))
    }

    fn notify(&mut self, message: &str) {
        println!("ℹ️  {message}");
    }
}

#[derive(Debug, Default)]
struct Script {
    answers: VecDeque<String>,
    repeat: Option<String>,
    prompts: Vec<String>,
    notices: Vec<String>,
}

/// Prompter answering from a prepared script
///
/// Clones share the same script, so a caller can hand one clone to a
/// `Config` and keep another to inspect what was asked.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompter {
    script: Rc<RefCell<Script>>,
}

impl ScriptedPrompter {
    /// Answer with each item once, in order
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let script = Script {
            answers: answers.into_iter().map(Into::into).collect(),
            ..Default::default()
        };
        Self {
            script: Rc::new(RefCell::new(script)),
        }
    }

    /// Answer every prompt with the same line
    pub fn repeating<S: Into<String>>(answer: S) -> Self {
        let script = Script {
            repeat: Some(answer.into()),
            ..Default::default()
        };
        Self {
            script: Rc::new(RefCell::new(script)),
        }
    }

    /// Every prompt line shown so far
    pub fn prompts(&self) -> Vec<String> {
        self.script.borrow().prompts.clone()
    }

    /// Every notice shown so far
    pub fn notices(&self) -> Vec<String> {
        self.script.borrow().notices.clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn read_line(&mut self, message: &str) -> Result<String> {
        let mut script = self.script.borrow_mut();
        script.prompts.push(message.to_string());
        if let Some(answer) = script.answers.pop_front() {
            return Ok(answer);
        }
        script.repeat.clone().ok_or_else(|| {
            ConfVaultError::prompt(format!("No scripted answer left for '{message}'"))
        })
    }

    fn notify(&mut self, message: &str) {
        self.script.borrow_mut().notices.push(message.to_string());
    }
}
