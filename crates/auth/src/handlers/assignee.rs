use async_trait::async_trait;

use planboard_core::LookupError;

use super::{NOT_A_MEMBER, RequirementHandler};
use crate::{AssigneePolicy, DenialKind, Method, RequestContext, Verdict};

/// Task assignee gate.
///
/// Reads are always allowed: GET never requires assignment, even when the task
/// record is absent. Every other verb must come from the assignee, be listed
/// in the policy, and, for role-scoped policies, come from an allowed role.
/// Anything not explicitly allowed is denied.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssigneeHandler;

impl AssigneeHandler {
    pub fn decide(ctx: &RequestContext, policy: &AssigneePolicy) -> Verdict {
        if ctx.method() == Method::Get {
            return Verdict::Allow;
        }

        let Some(task) = ctx.task() else {
            return Verdict::deny(DenialKind::MissingContext, "Task not found.");
        };

        let is_assignee = ctx.principal().is_some_and(|user| task.is_assigned_to(user));
        if !is_assignee {
            return Verdict::deny(DenialKind::NotAssignee, "You are not assigned to this task.");
        }

        if !policy.methods.contains(&ctx.method()) {
            return Verdict::deny(
                DenialKind::MethodNotAllowed,
                format!("You do not have permission to use {} on this task.", ctx.method()),
            );
        }

        if let Some(roles) = &policy.roles {
            let Some(membership) = ctx.membership() else {
                return Verdict::deny(DenialKind::NotMember, NOT_A_MEMBER);
            };
            if !roles.contains(&membership.role) {
                return Verdict::deny(
                    DenialKind::RoleMismatch,
                    format!(
                        "You do not have permission to change this task as {}.",
                        membership.role
                    ),
                );
            }
        }

        Verdict::Allow
    }
}

#[async_trait]
impl RequirementHandler for AssigneeHandler {
    type Requirement = AssigneePolicy;

    async fn evaluate(&self, ctx: &RequestContext, requirement: &AssigneePolicy) -> Result<Verdict, LookupError> {
        Ok(Self::decide(ctx, requirement))
    }
}
