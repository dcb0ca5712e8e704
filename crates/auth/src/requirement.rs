//! Declarative requirement descriptors.
//!
//! Requirements are plain immutable values attached to endpoints. They carry
//! no logic; each kind is evaluated by exactly one handler in
//! [`crate::handlers`].

use serde::Serialize;

use planboard_core::{ProjectRole, feature_names};

use crate::Method;

/// Role-and-method policy: the caller's project role must be in `roles` and
/// the request verb in `methods`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RolePolicy {
    pub roles: Vec<ProjectRole>,
    pub methods: Vec<Method>,
}

impl RolePolicy {
    pub fn new(roles: impl IntoIterator<Item = ProjectRole>, methods: impl IntoIterator<Item = Method>) -> Self {
        Self {
            roles: roles.into_iter().collect(),
            methods: methods.into_iter().collect(),
        }
    }

    pub fn project_manager_only(methods: impl IntoIterator<Item = Method>) -> Self {
        Self::new([ProjectRole::ProjectManager], methods)
    }

    pub fn manager_or_leader(methods: impl IntoIterator<Item = Method>) -> Self {
        Self::new([ProjectRole::ProjectManager, ProjectRole::Leader], methods)
    }

    pub fn tester_only(methods: impl IntoIterator<Item = Method>) -> Self {
        Self::new([ProjectRole::Tester], methods)
    }

    pub fn allows_role(&self, role: ProjectRole) -> bool {
        self.roles.contains(&role)
    }

    pub fn allows_method(&self, method: Method) -> bool {
        self.methods.contains(&method)
    }
}

/// Assignee policy: non-GET requests require the caller to be the task's
/// assignee and the verb to be in `methods`. When `roles` is set, the
/// caller's project role must also be one of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssigneePolicy {
    pub methods: Vec<Method>,
    pub roles: Option<Vec<ProjectRole>>,
}

impl AssigneePolicy {
    pub fn new(methods: impl IntoIterator<Item = Method>) -> Self {
        Self {
            methods: methods.into_iter().collect(),
            roles: None,
        }
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = ProjectRole>) -> Self {
        self.roles = Some(roles.into_iter().collect());
        self
    }
}

/// Named subscription quota policies.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaPolicy {
    ProjectCount,
    MemberCount,
    Storage,
}

impl QuotaPolicy {
    /// Feature row this policy is measured against.
    pub fn feature_name(&self) -> &'static str {
        match self {
            QuotaPolicy::ProjectCount => feature_names::PROJECT_COUNT,
            QuotaPolicy::MemberCount => feature_names::MEMBER_COUNT,
            QuotaPolicy::Storage => feature_names::FILE_STORAGE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuotaPolicy::ProjectCount => "project_count",
            QuotaPolicy::MemberCount => "member_count",
            QuotaPolicy::Storage => "storage",
        }
    }
}

/// A requirement an endpoint must satisfy before its body runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "policy", rename_all = "snake_case")]
pub enum Requirement {
    /// Any membership in the target project.
    Member,
    Role(RolePolicy),
    Assignee(AssigneePolicy),
    Quota(QuotaPolicy),
}

impl Requirement {
    pub fn name(&self) -> &'static str {
        match self {
            Requirement::Member => "member",
            Requirement::Role(_) => "role",
            Requirement::Assignee(_) => "assignee",
            Requirement::Quota(policy) => policy.as_str(),
        }
    }
}

impl From<RolePolicy> for Requirement {
    fn from(value: RolePolicy) -> Self {
        Requirement::Role(value)
    }
}

impl From<AssigneePolicy> for Requirement {
    fn from(value: AssigneePolicy) -> Self {
        Requirement::Assignee(value)
    }
}

impl From<QuotaPolicy> for Requirement {
    fn from(value: QuotaPolicy) -> Self {
        Requirement::Quota(value)
    }
}
