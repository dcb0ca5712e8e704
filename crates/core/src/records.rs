//! Plain records returned by the entity lookup collaborator.
//!
//! These are read-only snapshots; nothing in the authorization path mutates them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::{FeatureId, PlanId, ProjectId, ProjectRole, TaskId, UserId};

/// Names of the quota dimensions, shared with seed data.
pub mod feature_names {
    pub const PROJECT_COUNT: &str = "Number of projects";
    pub const MEMBER_COUNT: &str = "Number of members";
    pub const FILE_STORAGE: &str = "File Storage Limit";
}

/// Literal plan value meaning "no limit".
pub const UNLIMITED: &str = "Unlimited";

/// A user's membership in a project.
///
/// At most one membership exists per (project, user).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub project_id: ProjectId,
    pub user_id: UserId,
    pub role: ProjectRole,
    pub joined_at: DateTime<Utc>,
}

/// The subset of a task needed for authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub task_id: TaskId,
    pub project_id: ProjectId,
    pub assignee_id: Option<UserId>,
    pub status: String,
}

impl TaskRecord {
    pub fn is_assigned_to(&self, user_id: &UserId) -> bool {
        self.assignee_id.as_ref() == Some(user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub project_id: ProjectId,
    pub name: String,
    pub created_by: Option<UserId>,
}

impl Project {
    /// The owning account, if the row carries a usable one.
    pub fn owner(&self) -> Option<&UserId> {
        self.created_by.as_ref().filter(|id| !id.is_empty())
    }
}

/// Active subscription of an account owner (one per owner).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub owner_id: UserId,
    pub plan_id: PlanId,
}

/// A named quota dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub feature_id: FeatureId,
    pub name: String,
}

/// Allowance of one feature under one plan.
///
/// `value` is either a positive integer string or [`UNLIMITED`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanFeatureValue {
    pub plan_id: PlanId,
    pub feature_id: FeatureId,
    pub value: String,
}

/// Parsed form of a [`PlanFeatureValue`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlanLimit {
    Unlimited,
    Finite(u64),
}

impl PlanLimit {
    /// Whether one more resource may be created at the given usage.
    ///
    /// Strict: usage equal to the limit already consumes the whole allowance.
    pub fn admits(&self, usage: u64) -> bool {
        match self {
            PlanLimit::Unlimited => true,
            PlanLimit::Finite(limit) => usage < *limit,
        }
    }
}

impl PlanFeatureValue {
    pub fn limit(&self) -> Result<PlanLimit, DomainError> {
        let raw = self.value.trim();
        if raw == UNLIMITED {
            return Ok(PlanLimit::Unlimited);
        }
        raw.parse::<u64>()
            .map(PlanLimit::Finite)
            .map_err(|_| DomainError::validation(format!("invalid plan limit value '{}'", self.value)))
    }
}
