use async_trait::async_trait;
use tracing::debug;

use planboard_core::LookupError;

use super::{NOT_A_MEMBER, RequirementHandler};
use crate::{DenialKind, RequestContext, RolePolicy, Verdict};

/// Single evaluator for every role-and-method policy.
///
/// "Project Manager only", "Tester only" and friends are [`RolePolicy`]
/// values, not separate handlers.
#[derive(Debug, Default, Clone, Copy)]
pub struct RolePolicyHandler;

impl RolePolicyHandler {
    pub fn decide(ctx: &RequestContext, policy: &RolePolicy) -> Verdict {
        let Some(membership) = ctx.membership() else {
            return Verdict::deny(DenialKind::NotMember, NOT_A_MEMBER);
        };

        if !policy.allows_role(membership.role) {
            debug!(role = %membership.role, "role not in policy");
            return Verdict::deny(
                DenialKind::RoleMismatch,
                format!(
                    "You do not have permission to perform this action: requires role {}.",
                    join_roles(policy)
                ),
            );
        }

        if !policy.allows_method(ctx.method()) {
            return Verdict::deny(
                DenialKind::MethodNotAllowed,
                format!(
                    "You do not have permission to use {} on this resource.",
                    ctx.method()
                ),
            );
        }

        Verdict::Allow
    }
}

fn join_roles(policy: &RolePolicy) -> String {
    policy
        .roles
        .iter()
        .map(|r| r.as_str())
        .collect::<Vec<_>>()
        .join(" or ")
}

#[async_trait]
impl RequirementHandler for RolePolicyHandler {
    type Requirement = RolePolicy;

    async fn evaluate(&self, ctx: &RequestContext, requirement: &RolePolicy) -> Result<Verdict, LookupError> {
        Ok(Self::decide(ctx, requirement))
    }
}
