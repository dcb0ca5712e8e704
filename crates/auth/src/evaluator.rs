//! Conjunctive policy evaluation.

use tracing::{debug, info, instrument};

use planboard_core::{EntityLookup, LookupError};

use crate::handlers::{AssigneeHandler, MembershipHandler, QuotaHandler, RequirementHandler, RolePolicyHandler};
use crate::{RequestContext, Requirement, Verdict};

/// Runs the handlers bound to an endpoint's requirements, in order.
///
/// Every requirement must allow. The first denial stops evaluation and its
/// reason is recorded in the context's failure slot.
#[derive(Debug, Clone)]
pub struct PolicyEvaluator<L> {
    membership: MembershipHandler,
    role: RolePolicyHandler,
    assignee: AssigneeHandler,
    quota: QuotaHandler<L>,
}

impl<L> PolicyEvaluator<L>
where
    L: EntityLookup,
{
    pub fn new(lookup: L) -> Self {
        Self {
            membership: MembershipHandler,
            role: RolePolicyHandler,
            assignee: AssigneeHandler,
            quota: QuotaHandler::new(lookup),
        }
    }

    async fn evaluate_one(&self, ctx: &RequestContext, requirement: &Requirement) -> Result<Verdict, LookupError> {
        match requirement {
            Requirement::Member => self.membership.evaluate(ctx, &()).await,
            Requirement::Role(policy) => self.role.evaluate(ctx, policy).await,
            Requirement::Assignee(policy) => self.assignee.evaluate(ctx, policy).await,
            Requirement::Quota(policy) => self.quota.evaluate(ctx, policy).await,
        }
    }

    #[instrument(
        skip_all,
        fields(
            user_id = ?ctx.principal().map(|p| p.as_str()),
            method = %ctx.method(),
            project_id = ?ctx.project_id().map(|p| p.get()),
        ),
        err
    )]
    pub async fn evaluate(
        &self,
        ctx: &mut RequestContext,
        requirements: &[Requirement],
    ) -> Result<Verdict, LookupError> {
        for requirement in requirements {
            let verdict = self.evaluate_one(ctx, requirement).await?;

            if let Verdict::Deny(denial) = &verdict {
                info!(
                    requirement = requirement.name(),
                    kind = ?denial.kind,
                    reason = %denial.reason,
                    "authorization denied"
                );
                ctx.record_failure(denial.reason.clone());
                return Ok(verdict);
            }

            debug!(requirement = requirement.name(), "requirement satisfied");
        }

        Ok(Verdict::Allow)
    }
}
