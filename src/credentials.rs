//! Credential acquisition
//!
//! The password comes from an environment variable, or from a masked
//! terminal prompt when the variable is unset. Callers depend on
//! [`PasswordSource`] so the pipeline runs without a terminal in tests.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use std::io::Write;
use thiserror::Error;

/// Supplies the backend password
pub trait PasswordSource {
    fn password(&self) -> Result<String, CredentialError>;
}

/// A password already known to the caller
#[derive(Clone)]
pub struct StaticPassword(pub String);

impl PasswordSource for StaticPassword {
    fn password(&self) -> Result<String, CredentialError> {
        Ok(self.0.clone())
    }
}

/// Environment variable first, then an interactive prompt
#[derive(Debug, Clone)]
pub struct EnvOrPrompt {
    pub env_var: String,
    pub prompt: String,
}

impl EnvOrPrompt {
    pub fn new(env_var: impl Into<String>) -> Self {
        Self {
            env_var: env_var.into(),
            prompt: "Enter Password: ".to_string(),
        }
    }
}

impl PasswordSource for EnvOrPrompt {
    fn password(&self) -> Result<String, CredentialError> {
        if let Ok(password) = std::env::var(&self.env_var) {
            tracing::debug!("Using password from {}", self.env_var);
            return Ok(password);
        }
        prompt_masked(&self.prompt)
    }
}

/// Read a line from the terminal, echoing `*` for each character
pub fn prompt_masked(prompt: &str) -> Result<String, CredentialError> {
    let mut stderr = std::io::stderr();
    write!(stderr, "{prompt}")?;
    stderr.flush()?;

    terminal::enable_raw_mode().map_err(CredentialError::Terminal)?;
    let result = read_masked(&mut stderr);
    terminal::disable_raw_mode().map_err(CredentialError::Terminal)?;

    writeln!(stderr)?;
    result
}

fn read_masked(out: &mut impl Write) -> Result<String, CredentialError> {
    let mut password = String::new();

    loop {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind,
            ..
        }) = event::read().map_err(CredentialError::Terminal)?
        else {
            continue;
        };
        if kind == KeyEventKind::Release {
            continue;
        }

        match code {
            KeyCode::Enter => return Ok(password),
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                return Err(CredentialError::Cancelled)
            }
            KeyCode::Esc => return Err(CredentialError::Cancelled),
            KeyCode::Backspace => {
                if password.pop().is_some() {
                    write!(out, "\x08 \x08")?;
                }
            }
            KeyCode::Char(c) => {
                password.push(c);
                write!(out, "*")?;
            }
            _ => {}
        }
        out.flush()?;
    }
}

/// Errors while obtaining credentials
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Password prompt cancelled")]
    Cancelled,

    #[error("Terminal error: {0}")]
    Terminal(#[source] std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_password() {
        let source = StaticPassword("s3cret".to_string());
        assert_eq!(source.password().unwrap(), "s3cret");
    }

    #[test]
    fn test_env_password() {
        let var = "LOGSIFT_TEST_PASSWORD_ENV";
        std::env::set_var(var, "from-env");
        let source = EnvOrPrompt::new(var);
        assert_eq!(source.password().unwrap(), "from-env");
        std::env::remove_var(var);
    }
}
