//! Option descriptors
//!
//! An option describes a key the application expects. It is consulted only
//! when a lookup misses, to drive the interactive prompt or to supply a
//! default in batch mode. Descriptors are validated when they are registered,
//! never at prompt time.

use crate::error::{ConfVaultError, Result};
use crate::value::{Value, ValueKind};
use std::fmt;

/// Retry budget used when none is given
pub const DEFAULT_RETRIES: u32 = 3;

#[derive(Debug, Clone)]
enum KindSpec {
    Kind(ValueKind),
    Named(String),
}

/// Unvalidated option description, built up before registration
#[derive(Debug, Clone)]
pub struct OptionSpec {
    name: String,
    prefix: Option<String>,
    help: Option<String>,
    kind: KindSpec,
    choices: Option<Value>,
    default: Option<Value>,
    retries: u32,
}

impl OptionSpec {
    /// A text option with no choices, no default and the default retry budget
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            prefix: None,
            help: None,
            kind: KindSpec::Kind(ValueKind::Str),
            choices: None,
            default: None,
            retries: DEFAULT_RETRIES,
        }
    }

    /// Text shown at the start of the prompt line
    pub fn prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn help<S: Into<String>>(mut self, help: S) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn kind(mut self, kind: ValueKind) -> Self {
        self.kind = KindSpec::Kind(kind);
        self
    }

    /// Name the type by string; unknown names are rejected at registration
    pub fn type_name<S: Into<String>>(mut self, name: S) -> Self {
        self.kind = KindSpec::Named(name.into());
        self
    }

    /// Allowed answers. Must be a list whose items all match the option type.
    pub fn choices<V: Into<Value>>(mut self, choices: V) -> Self {
        self.choices = Some(choices.into());
        self
    }

    pub fn default<V: Into<Value>>(mut self, default: V) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Check the description and turn it into a registrable option
    pub fn validate(self) -> Result<ConfigOption> {
        if self.name.is_empty() {
            return Err(ConfVaultError::illegal_argument(
                "option name must not be empty",
            ));
        }

        let kind = match self.kind {
            KindSpec::Kind(kind) => kind,
            KindSpec::Named(name) => name.parse::<ValueKind>()?,
        };

        if let Some(default) = &self.default {
            if default.kind() != kind {
                return Err(ConfVaultError::illegal_argument(format!(
                    "'default' must be the same type as 'type': {} ({}) != {}",
                    default,
                    default.type_name(),
                    kind
                )));
            }
        }

        let choices = match self.choices {
            None => Vec::new(),
            Some(Value::Str(s)) => {
                return Err(ConfVaultError::illegal_argument(format!(
                    "'choices' must be a list, not the string '{s}'"
                )));
            }
            Some(Value::List(items)) => {
                if let Some(bad) = items.iter().find(|item| item.kind() != kind) {
                    return Err(ConfVaultError::illegal_argument(format!(
                        "every choice must be of type {}: {} ({}) does not match",
                        kind,
                        bad,
                        bad.type_name()
                    )));
                }
                items.iter().map(Value::to_text).collect()
            }
            Some(other) => {
                return Err(ConfVaultError::type_mismatch(format!(
                    "'choices' must be a list, got {} ({})",
                    other,
                    other.type_name()
                )));
            }
        };

        Ok(ConfigOption {
            prefix: self.prefix.unwrap_or_else(|| self.name.clone()),
            name: self.name,
            help: self.help,
            kind,
            choices,
            default: self.default,
            retries: self.retries,
        })
    }
}

/// A validated, registered option
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigOption {
    pub name: String,
    pub prefix: String,
    pub help: Option<String>,
    pub kind: ValueKind,
    /// Choices in text form; answers are compared as text
    pub choices: Vec<String>,
    pub default: Option<Value>,
    pub retries: u32,
}

impl ConfigOption {
    /// Prompt line: prefix, then `[choices]`, then `(default)`
    pub fn prompt_message(&self) -> String {
        let mut message = self.prefix.clone();
        if !self.choices.is_empty() {
            message.push_str(&format!(" [{}]", self.choices.join(", ")));
        }
        if let Some(default) = &self.default {
            message.push_str(&format!(" ({default})"));
        }
        message
    }

    /// Judge one answer. `Err` carries the message shown before re-prompting.
    pub fn evaluate(&self, answer: &str) -> std::result::Result<Value, String> {
        let (text, defaulted) = if answer.is_empty() {
            match &self.default {
                Some(default) => (default.to_text(), Some(default)),
                None => return Err("Answer must not be empty. Please try again!".to_string()),
            }
        } else {
            (answer.to_string(), None)
        };

        if !self.choices.is_empty() && !self.choices.contains(&text) {
            return Err("You have selected an invalid answer! Please try again.".to_string());
        }

        if let Some(default) = defaulted {
            return Ok(default.clone());
        }

        self.kind.parse(&text).map_err(|_| {
            format!(
                "Could not interpret your answer '{}' as {}. Please try again!",
                text, self.kind
            )
        })
    }
}

impl fmt::Display for ConfigOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {:?}", self.name, self.kind, self.choices)?;
        if let Some(default) = &self.default {
            write!(f, " ({default})")?;
        }
        Ok(())
    }
}
