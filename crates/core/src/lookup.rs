//! Read-only entity lookup collaborator.
//!
//! The authorization pipeline never talks to storage directly; it goes through
//! this trait. Implementations live in `planboard-infra`.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    Feature, FeatureId, Membership, PlanFeatureValue, PlanId, Project, ProjectId, Subscription,
    TaskId, TaskRecord, UserId,
};

/// A failure of the lookup layer itself.
///
/// This is never an authorization outcome: `Ok(None)` means "resolved, nothing
/// there", while `Err` aborts the request as a server error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("storage error during {operation}: {message}")]
    Storage {
        operation: &'static str,
        message: String,
    },

    #[error("lookup backend unavailable: {0}")]
    Unavailable(String),
}

impl LookupError {
    pub fn storage(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Storage {
            operation,
            message: message.into(),
        }
    }
}

pub type LookupResult<T> = Result<T, LookupError>;

/// Queries the authorization pipeline issues against persistent state.
#[async_trait]
pub trait EntityLookup: Send + Sync {
    async fn membership(&self, project_id: ProjectId, user_id: &UserId) -> LookupResult<Option<Membership>>;

    async fn task(&self, task_id: TaskId) -> LookupResult<Option<TaskRecord>>;

    async fn project(&self, project_id: ProjectId) -> LookupResult<Option<Project>>;

    /// Active subscription of an account owner.
    async fn subscription(&self, owner_id: &UserId) -> LookupResult<Option<Subscription>>;

    /// Exact-name lookup against the feature vocabulary.
    async fn feature_by_name(&self, name: &str) -> LookupResult<Option<Feature>>;

    async fn plan_feature_value(
        &self,
        plan_id: PlanId,
        feature_id: FeatureId,
    ) -> LookupResult<Option<PlanFeatureValue>>;

    async fn count_projects_owned_by(&self, user_id: &UserId) -> LookupResult<u64>;

    async fn count_project_members(&self, project_id: ProjectId) -> LookupResult<u64>;

    /// Precomputed storage usage of an owner, in the unit of the
    /// "File Storage Limit" plan value.
    async fn storage_used(&self, owner_id: &UserId) -> LookupResult<u64>;
}

#[async_trait]
impl<L> EntityLookup for Arc<L>
where
    L: EntityLookup + ?Sized,
{
    async fn membership(&self, project_id: ProjectId, user_id: &UserId) -> LookupResult<Option<Membership>> {
        (**self).membership(project_id, user_id).await
    }

    async fn task(&self, task_id: TaskId) -> LookupResult<Option<TaskRecord>> {
        (**self).task(task_id).await
    }

    async fn project(&self, project_id: ProjectId) -> LookupResult<Option<Project>> {
        (**self).project(project_id).await
    }

    async fn subscription(&self, owner_id: &UserId) -> LookupResult<Option<Subscription>> {
        (**self).subscription(owner_id).await
    }

    async fn feature_by_name(&self, name: &str) -> LookupResult<Option<Feature>> {
        (**self).feature_by_name(name).await
    }

    async fn plan_feature_value(
        &self,
        plan_id: PlanId,
        feature_id: FeatureId,
    ) -> LookupResult<Option<PlanFeatureValue>> {
        (**self).plan_feature_value(plan_id, feature_id).await
    }

    async fn count_projects_owned_by(&self, user_id: &UserId) -> LookupResult<u64> {
        (**self).count_projects_owned_by(user_id).await
    }

    async fn count_project_members(&self, project_id: ProjectId) -> LookupResult<u64> {
        (**self).count_project_members(project_id).await
    }

    async fn storage_used(&self, owner_id: &UserId) -> LookupResult<u64> {
        (**self).storage_used(owner_id).await
    }
}
