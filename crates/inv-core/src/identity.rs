use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lightweight caller identity handed to the policy gate.
///
/// Produced by whatever transport authenticated the request. Carries data
/// only; authentication happens before the engine sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Caller {
    /// Stable subject identifier (login, service account, ...).
    pub subject: String,
    /// Roles carried by the caller; policies may grant by role.
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Caller {
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            roles: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }
}

/// What the caller wants to do with a resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Read,
    Write,
}

impl Intent {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
