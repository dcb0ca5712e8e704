//! Authorization outcomes.
//!
//! Every handler returns exactly one of [`Verdict::Allow`] or
//! [`Verdict::Deny`]; there is no abstain state.

use serde::Serialize;

/// Classification of a denial, used for logs and tests.
///
/// The response body only ever carries the reason text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    /// No membership in the target project (includes unauthenticated callers).
    NotMember,
    /// Member, but the role is not in the allowed set.
    RoleMismatch,
    /// The request verb is not in the allowed set.
    MethodNotAllowed,
    /// The caller is not the assignee of the target task.
    NotAssignee,
    /// A record the requirement needs is not present in the request context.
    MissingContext,
    /// The subscription allowance is used up.
    QuotaExceeded,
    /// Seed or plan data is missing or malformed.
    DataIntegrity,
}

/// Why a request was denied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Denial {
    pub kind: DenialKind,
    pub reason: String,
}

impl Denial {
    pub fn new(kind: DenialKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }

    /// Integrity faults get a prefix so they read differently from quota text.
    pub fn data_integrity(detail: impl core::fmt::Display) -> Self {
        Self::new(DenialKind::DataIntegrity, format!("configuration error: {detail}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Verdict {
    Allow,
    Deny(Denial),
}

impl Verdict {
    pub fn deny(kind: DenialKind, reason: impl Into<String>) -> Self {
        Verdict::Deny(Denial::new(kind, reason))
    }

    pub fn is_allow(&self) -> bool {
        matches!(self, Verdict::Allow)
    }

    pub fn denial(&self) -> Option<&Denial> {
        match self {
            Verdict::Allow => None,
            Verdict::Deny(denial) => Some(denial),
        }
    }
}

impl From<Denial> for Verdict {
    fn from(value: Denial) -> Self {
        Verdict::Deny(value)
    }
}
