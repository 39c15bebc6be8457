//! Outcome of one case build.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildMessage {
    pub severity: Severity,
    pub text: String,
}

impl fmt::Display for BuildMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "[{tag}] {}", self.text)
    }
}

/// Success flag plus the ordered log of what the build did. A failed build
/// keeps the messages of every step that completed before the error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildReport {
    pub success: bool,
    pub messages: Vec<BuildMessage>,
    pub case_dir: PathBuf,
}

impl BuildReport {
    pub fn new(case_dir: impl Into<PathBuf>) -> Self {
        Self {
            success: false,
            messages: Vec::new(),
            case_dir: case_dir.into(),
        }
    }

    fn push(&mut self, severity: Severity, text: String) {
        self.messages.push(BuildMessage { severity, text });
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(Severity::Info, text.into());
    }

    pub fn warning(&mut self, text: impl Into<String>) {
        let text = text.into();
        tracing::warn!("{text}");
        self.push(Severity::Warning, text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        let text = text.into();
        tracing::error!("{text}");
        self.push(Severity::Error, text);
    }

    pub fn warnings(&self) -> impl Iterator<Item = &BuildMessage> {
        self.messages
            .iter()
            .filter(|m| m.severity == Severity::Warning)
    }

    pub fn errors(&self) -> impl Iterator<Item = &BuildMessage> {
        self.messages.iter().filter(|m| m.severity == Severity::Error)
    }
}
