use async_trait::async_trait;

use planboard_core::LookupError;

use super::{NOT_A_MEMBER, RequirementHandler};
use crate::{DenialKind, RequestContext, Verdict};

/// Allows any member of the target project, whatever the role or verb.
#[derive(Debug, Default, Clone, Copy)]
pub struct MembershipHandler;

impl MembershipHandler {
    pub fn decide(ctx: &RequestContext) -> Verdict {
        match ctx.membership() {
            Some(_) => Verdict::Allow,
            None => Verdict::deny(DenialKind::NotMember, NOT_A_MEMBER),
        }
    }
}

#[async_trait]
impl RequirementHandler for MembershipHandler {
    type Requirement = ();

    async fn evaluate(&self, ctx: &RequestContext, _requirement: &()) -> Result<Verdict, LookupError> {
        Ok(Self::decide(ctx))
    }
}
