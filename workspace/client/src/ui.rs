//! Injectable UI capability (`§9` Design Notes): prompts and
//! confirmations go through a trait so core operations are testable
//! with a scripted UI, and non-interactive runs can use a silent one.
use secrecy::SecretString;

use crate::{Error, Result};

/// A capability for the few places core operations need to talk to a
/// human: confirmations before destructive actions, and password
/// prompts when neither the keystore path nor the environment supplies
/// one.
pub trait Ui: Send + Sync {
    /// Ask a yes/no question. Returns the answer.
    fn confirm(&mut self, prompt: &str) -> Result<bool>;

    /// Ask the caller to type back an exact phrase (two-step
    /// confirmations for `delete` and `abandon-registry`).
    fn confirm_phrase(&mut self, prompt: &str, expected: &str) -> Result<bool>;

    /// Prompt for a password.
    fn password(&mut self, prompt: &str) -> Result<SecretString>;

    /// Emit an informational line.
    fn info(&mut self, message: &str);

    /// Emit a warning line.
    fn warn(&mut self, message: &str);
}

/// Interactive UI backed by `rustyline`, used by the real CLI.
pub struct Interactive;

impl Ui for Interactive {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let answer = crate::input::read_line(&format!("{prompt} [y/N] "))?;
        Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
    }

    fn confirm_phrase(&mut self, prompt: &str, expected: &str) -> Result<bool> {
        let answer = crate::input::read_line(prompt)?;
        Ok(answer.trim() == expected)
    }

    fn password(&mut self, prompt: &str) -> Result<SecretString> {
        crate::keystore::prompt_password(Some(prompt))
    }

    fn info(&mut self, message: &str) {
        tracing::info!("{message}");
    }

    fn warn(&mut self, message: &str) {
        tracing::warn!("{message}");
    }
}

/// Non-interactive UI: every confirmation is denied and every password
/// prompt fails, so automated runs never block on stdin. Scripted
/// tests should prefer [`Scripted`] instead, which can answer `true`.
pub struct Silent;

impl Ui for Silent {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(false)
    }

    fn confirm_phrase(&mut self, _prompt: &str, _expected: &str) -> Result<bool> {
        Ok(false)
    }

    fn password(&mut self, _prompt: &str) -> Result<SecretString> {
        Err(Error::EmptyPassword)
    }

    fn info(&mut self, _message: &str) {}

    fn warn(&mut self, _message: &str) {}
}

/// A UI that plays back a fixed script of answers, recording every
/// prompt it was asked. Used by resolver/publisher/access-gate tests
/// that exercise confirmation paths without a terminal.
#[derive(Default)]
pub struct Scripted {
    /// Prompts asked, in order, for test assertions.
    pub asked: Vec<String>,
    confirms: std::collections::VecDeque<bool>,
    passwords: std::collections::VecDeque<SecretString>,
}

impl Scripted {
    /// Build a scripted UI that answers `true`/`false` to confirmations
    /// in order, and returns `EmptyPassword` for any password prompt.
    pub fn with_confirms(answers: impl IntoIterator<Item = bool>) -> Self {
        Scripted {
            confirms: answers.into_iter().collect(),
            ..Default::default()
        }
    }
}

impl Ui for Scripted {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        self.asked.push(prompt.to_string());
        Ok(self.confirms.pop_front().unwrap_or(false))
    }

    fn confirm_phrase(&mut self, prompt: &str, expected: &str) -> Result<bool> {
        self.asked.push(prompt.to_string());
        let next = self.confirms.pop_front().unwrap_or(false);
        Ok(next && !expected.is_empty())
    }

    fn password(&mut self, prompt: &str) -> Result<SecretString> {
        self.asked.push(prompt.to_string());
        self.passwords
            .pop_front()
            .ok_or(Error::EmptyPassword)
    }

    fn info(&mut self, _message: &str) {}

    fn warn(&mut self, _message: &str) {}
}
