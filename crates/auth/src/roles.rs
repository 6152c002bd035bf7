use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role identifier used for role-gated operations.
///
/// Only `Applicant` and `Approver` are issued at registration; tokens carry the
/// role verbatim and route guards compare by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    /// May submit applications and request rebirths.
    pub const APPLICANT: Role = Role(Cow::Borrowed("Applicant"));
    /// May approve or reject applications and rebirths.
    pub const APPROVER: Role = Role(Cow::Borrowed("Approver"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Parse one of the roles that can be granted at registration.
    pub fn parse_known(name: &str) -> Option<Self> {
        [Self::APPLICANT, Self::APPROVER]
            .into_iter()
            .find(|r| r.as_str() == name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
