//! Subscription quota handler.
//!
//! All quota policies share one algorithm: find the account that owns the
//! project, find its plan's allowance for the policy's feature, and allow iff
//! current usage is strictly below it.

use async_trait::async_trait;
use tracing::{debug, instrument};

use planboard_core::{EntityLookup, LookupError, PlanLimit, UserId};

use super::{NOT_A_MEMBER, RequirementHandler};
use crate::{Denial, DenialKind, QuotaPolicy, RequestContext, Verdict};

#[derive(Debug, Clone)]
pub struct QuotaHandler<L> {
    lookup: L,
}

impl<L> QuotaHandler<L>
where
    L: EntityLookup,
{
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }

    /// Resolve the owning account.
    ///
    /// Creating a project happens outside any project, so the project-count
    /// policy falls back to the caller, who becomes the owner. An anonymous
    /// caller is not a member of anything.
    async fn owner(&self, ctx: &RequestContext, policy: QuotaPolicy) -> Result<Result<UserId, Denial>, LookupError> {
        let Some(project_id) = ctx.project_id() else {
            if policy == QuotaPolicy::ProjectCount {
                return Ok(ctx
                    .principal()
                    .cloned()
                    .ok_or_else(|| Denial::new(DenialKind::NotMember, NOT_A_MEMBER)));
            }
            return Ok(Err(Denial::new(
                DenialKind::MissingContext,
                "Project not found in request context.",
            )));
        };

        let Some(project) = self.lookup.project(project_id).await? else {
            return Ok(Err(Denial::new(DenialKind::MissingContext, "Project not found.")));
        };

        Ok(project
            .owner()
            .cloned()
            .ok_or_else(|| Denial::data_integrity("project owner not found")))
    }

    async fn usage(&self, ctx: &RequestContext, policy: QuotaPolicy, owner: &UserId) -> Result<Result<u64, Denial>, LookupError> {
        match policy {
            QuotaPolicy::ProjectCount => Ok(Ok(self.lookup.count_projects_owned_by(owner).await?)),
            QuotaPolicy::MemberCount => match ctx.project_id() {
                Some(project_id) => Ok(Ok(self.lookup.count_project_members(project_id).await?)),
                None => Ok(Err(Denial::new(
                    DenialKind::MissingContext,
                    "Project not found in request context.",
                ))),
            },
            QuotaPolicy::Storage => Ok(Ok(self.lookup.storage_used(owner).await?)),
        }
    }
}

fn exceeded(policy: QuotaPolicy, limit: u64) -> Denial {
    let reason = match policy {
        QuotaPolicy::ProjectCount => format!(
            "You have reached the maximum number of projects ({limit}) allowed by your subscription plan."
        ),
        QuotaPolicy::MemberCount => format!(
            "This project has reached the maximum number of members ({limit}) allowed by the owner's subscription plan."
        ),
        QuotaPolicy::Storage => format!(
            "The project owner's account has reached the file storage limit ({limit}) of its subscription plan."
        ),
    };
    Denial::new(DenialKind::QuotaExceeded, reason)
}

/// Unwraps a step result, turning a denial into an early verdict.
macro_rules! step {
    ($e:expr) => {
        match $e? {
            Ok(value) => value,
            Err(denial) => return Ok(Verdict::Deny(denial)),
        }
    };
}

#[async_trait]
impl<L> RequirementHandler for QuotaHandler<L>
where
    L: EntityLookup,
{
    type Requirement = QuotaPolicy;

    #[instrument(skip(self, ctx), fields(project_id = ?ctx.project_id().map(|p| p.get())), err)]
    async fn evaluate(&self, ctx: &RequestContext, policy: &QuotaPolicy) -> Result<Verdict, LookupError> {
        let policy = *policy;
        let owner = step!(self.owner(ctx, policy).await);

        let Some(subscription) = self.lookup.subscription(&owner).await? else {
            return Ok(Denial::data_integrity(format!("subscription not found for owner {owner}")).into());
        };

        let Some(feature) = self.lookup.feature_by_name(policy.feature_name()).await? else {
            return Ok(Denial::data_integrity(format!("feature '{}' not found", policy.feature_name())).into());
        };

        let Some(value) = self
            .lookup
            .plan_feature_value(subscription.plan_id, feature.feature_id)
            .await?
        else {
            return Ok(Denial::data_integrity(format!(
                "plan feature '{}' not found for plan {}",
                feature.name, subscription.plan_id
            ))
            .into());
        };

        let limit = match value.limit() {
            Ok(PlanLimit::Unlimited) => {
                debug!(plan_id = %subscription.plan_id, "unlimited plan allowance");
                return Ok(Verdict::Allow);
            }
            Ok(PlanLimit::Finite(limit)) => limit,
            Err(_) => {
                return Ok(Denial::data_integrity(format!(
                    "invalid limit value '{}' for feature '{}'",
                    value.value, feature.name
                ))
                .into());
            }
        };

        let usage = step!(self.usage(ctx, policy, &owner).await);
        debug!(usage, limit, "quota usage resolved");

        if PlanLimit::Finite(limit).admits(usage) {
            Ok(Verdict::Allow)
        } else {
            Ok(exceeded(policy, limit).into())
        }
    }
}
